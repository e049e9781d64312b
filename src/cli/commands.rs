use crate::cli::present;
use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, AdvisorResult};
use crate::excel::{read_workbook_file, TemplateWriter};
use crate::normalize::{offered_course_codes, transcript_entries};
use crate::remote::{CourseCatalog, HttpAdvisingService};
use crate::state::{FileStateStore, SessionStateStore};
use crate::types::{CourseDraft, OfferedCourseCode};
use crate::workflow::{WorkflowOrchestrator, WorkflowState};
use colored::Colorize;
use std::path::{Path, PathBuf};

type CliWorkflow = WorkflowOrchestrator<FileStateStore, HttpAdvisingService>;

/// Build the workflow from the state file and the configured service
fn open_workflow(config: &AdvisorConfig) -> AdvisorResult<CliWorkflow> {
    let store = FileStateStore::new(&config.state_file);
    let service = HttpAdvisingService::new(&config.api_url)?;
    WorkflowOrchestrator::resume(store, service)
}

fn print_json(value: &serde_json::Value) -> AdvisorResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn read_offered(offered: Option<&Path>, verbose: bool) -> AdvisorResult<Vec<OfferedCourseCode>> {
    let Some(path) = offered else {
        return Ok(Vec::new());
    };
    if verbose {
        println!("{}", format!("📖 Reading offered courses: {}", path.display()).cyan());
    }
    let workbook = read_workbook_file(path)?;
    offered_course_codes(&workbook)
}

/// Execute the session command - create a new advising session
pub async fn create_session(config: &AdvisorConfig, student_id: String) -> AdvisorResult<()> {
    println!("{}", "🎓 Curricraft - Creating advising session".bold().green());
    println!("   Student ID: {}", student_id.bright_blue().bold());
    println!("   Service: {}\n", config.api_url);

    let mut workflow = open_workflow(config)?;
    let previous = workflow.store().session_id()?;

    let session_id = workflow.create_advising_session(&student_id).await?;

    println!("{}", "✅ Session created".bold().green());
    println!("   Session ID: {}", session_id.to_string().bold());
    if let Some(previous) = previous.filter(|p| *p != session_id) {
        println!(
            "{}",
            format!("   Replaced previous session {}", previous).yellow()
        );
    }
    println!("\n   Next: curricraft upload --transcript <FILE> [--offered <FILE>]");
    Ok(())
}

/// Execute the upload command - normalize uploads, submit transcript, request recommendations
pub async fn upload(
    config: &AdvisorConfig,
    transcript: PathBuf,
    offered: Option<PathBuf>,
    max_credits: Option<u32>,
    dry_run: bool,
    verbose: bool,
) -> AdvisorResult<()> {
    println!("{}", "🎓 Curricraft - Uploading academic data".bold().green());
    println!("   Transcript: {}", transcript.display());
    if let Some(ref path) = offered {
        println!("   Offered courses: {}", path.display());
    }
    println!();

    if dry_run {
        println!("{}", "📋 DRY RUN MODE - Nothing will be submitted\n".yellow());
    }

    if verbose {
        println!("{}", format!("📖 Reading transcript: {}", transcript.display()).cyan());
    }
    let transcript_workbook = read_workbook_file(&transcript)?;
    if verbose {
        println!("   Sheets: {:?}", transcript_workbook.sheet_names());
    }
    let entries = transcript_entries(&transcript_workbook)?;
    let offered_codes = read_offered(offered.as_deref(), verbose)?;

    println!("{}", present::render_transcript_preview(&entries));
    println!("{}", present::render_offered_preview(&offered_codes));

    if dry_run {
        println!("{}", "📋 Dry run complete - nothing submitted".yellow());
        return Ok(());
    }

    let max_credits = max_credits.unwrap_or(config.max_credits);
    let mut workflow = open_workflow(config)?;
    let session_id = workflow.store().session_id()?;

    println!("{}", "🚀 Generating recommendations...".cyan());
    match workflow
        .submit_transcript_and_recommend(session_id.as_ref(), &entries, &offered_codes, max_credits)
        .await
    {
        Ok(result) => {
            println!("{}\n", "✅ Recommendations generated".bold().green());
            print!("{}", present::render_recommendations(&result));
            Ok(())
        }
        Err(e @ AdvisorError::RemoteCall { .. })
            if workflow.state() == WorkflowState::DataIngested =>
        {
            println!(
                "{}",
                "⚠️  Transcript was submitted, but recommendations failed.".yellow()
            );
            println!("   Retry with: curricraft retry-recommend [--offered <FILE>]");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

/// Execute the retry-recommend command - request recommendations for an ingested session
pub async fn retry_recommend(
    config: &AdvisorConfig,
    offered: Option<PathBuf>,
    max_credits: Option<u32>,
    verbose: bool,
) -> AdvisorResult<()> {
    println!("{}", "🎓 Curricraft - Requesting recommendations".bold().green());

    let offered_codes = read_offered(offered.as_deref(), verbose)?;
    let max_credits = max_credits.unwrap_or(config.max_credits);

    let mut workflow = open_workflow(config)?;
    let session_id = workflow.store().session_id()?;
    if let Some(ref id) = session_id {
        println!("   Session ID: {}", id.to_string().bold());
    }
    println!("   Max credits: {}\n", max_credits);

    let result = workflow
        .retry_recommendations(session_id.as_ref(), &offered_codes, max_credits)
        .await?;

    println!("{}\n", "✅ Recommendations generated".bold().green());
    print!("{}", present::render_recommendations(&result));
    Ok(())
}

/// Execute the recommendations command - show the stored result
pub fn recommendations(config: &AdvisorConfig, json: bool) -> AdvisorResult<()> {
    let store = FileStateStore::new(&config.state_file);

    match store.recommendation_result()? {
        Some(result) if json => print_json(&result.0),
        Some(result) => {
            print!("{}", present::render_recommendations(&result));
            Ok(())
        }
        None => {
            print!("{}", present::render_no_recommendations());
            Ok(())
        }
    }
}

/// Execute the audit command - fetch the graduation audit for the active session
pub async fn audit(config: &AdvisorConfig, json: bool) -> AdvisorResult<()> {
    let workflow = open_workflow(config)?;
    let session_id = workflow.store().session_id()?;

    let audit = workflow.fetch_graduation_audit(session_id.as_ref()).await?;

    if json {
        return print_json(&audit.0);
    }
    print!("{}", present::render_audit(&audit));
    Ok(())
}

/// Execute the status command - show what the state file holds
pub fn status(config: &AdvisorConfig) -> AdvisorResult<()> {
    let store = FileStateStore::new(&config.state_file);
    let state = store.load()?;

    println!("{}", "🔍 Curricraft - Status".bold().green());
    println!("   State file: {}", store.path().display());
    println!("   Service: {}", config.api_url);
    match state.session_id {
        Some(id) => println!("   Session ID: {}", id.to_string().bold()),
        None => println!("   Session ID: {}", "none".yellow()),
    }
    println!(
        "   Recommendations: {}",
        if state.recommendation_result.is_some() {
            "stored".green()
        } else {
            "none".yellow()
        }
    );
    if let Some(updated_at) = state.updated_at {
        println!("   Last updated: {}", updated_at.to_rfc3339());
    }
    Ok(())
}

/// Execute the courses list command
pub async fn courses_list(config: &AdvisorConfig) -> AdvisorResult<()> {
    let service = HttpAdvisingService::new(&config.api_url)?;
    let courses = service.list_courses().await?;

    println!("{}", format!("📚 Catalog Courses ({})", courses.len()).bold().green());
    print!("{}", present::render_courses(&courses));
    Ok(())
}

/// Execute the courses create command
pub async fn courses_create(config: &AdvisorConfig, draft: CourseDraft) -> AdvisorResult<()> {
    let service = HttpAdvisingService::new(&config.api_url)?;
    let response = service.create_course(&draft).await?;

    println!("{}", "✅ Course created".bold().green());
    if let Some(id) = response.get("course_id") {
        println!("   Course ID: {}", id.to_string().bold());
    }
    Ok(())
}

/// Execute the courses update command
pub async fn courses_update(
    config: &AdvisorConfig,
    course_id: i64,
    draft: CourseDraft,
) -> AdvisorResult<()> {
    let service = HttpAdvisingService::new(&config.api_url)?;
    service.update_course(course_id, &draft).await?;

    println!("{}", format!("✅ Course {} updated", course_id).bold().green());
    Ok(())
}

/// Execute the template command - write blank upload workbooks
pub fn template(dir: PathBuf) -> AdvisorResult<()> {
    println!("{}", "🎓 Curricraft - Writing upload templates".bold().green());

    for path in TemplateWriter::write_all(&dir)? {
        println!("   ✅ {}", path.display());
    }
    println!("\n   Transcript: fill sheet 2 (Course_Code, Grade, Semester, Year)");
    println!("   Offered courses: fill sheet 1 (Course_Code)");
    Ok(())
}
