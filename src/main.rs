use clap::{Parser, Subcommand};
use curricraft::cli;
use curricraft::config::{AdvisorConfig, ConfigOverrides};
use curricraft::types::CourseDraft;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "curricraft")]
#[command(about = "Advising workflow client: upload transcripts, get course recommendations.")]
#[command(long_about = "Curricraft - Academic advising workflow client

Reads transcript and offered-course spreadsheets, hands them to the advising
service, and shows the recommendations and graduation audit it computes.

WORKFLOW:
  1. curricraft session <STUDENT_ID>          # Create advising session
  2. curricraft upload -t transcript.xlsx -o offered.xlsx
  3. curricraft recommendations               # Show stored recommendations
  4. curricraft audit                         # Graduation audit

FILE LAYOUT:
  Transcript:       sheet 2, columns Course_Code, Grade, Semester, Year
  Offered courses:  sheet 1, column course_code (or Course_Code)
  Run 'curricraft template <DIR>' for blank workbooks.

STATE:
  The active session id and the last recommendations are kept in a state
  file shared by every invocation (see 'curricraft status').")]
#[command(version)]
struct Cli {
    /// YAML config file (api_url, state_file, max_credits)
    #[arg(short, long, global = true, env = "CURRICRAFT_CONFIG")]
    config: Option<PathBuf>,

    /// Advising service base URL
    #[arg(long, global = true, env = "CURRICRAFT_API_URL")]
    api_url: Option<String>,

    /// State file holding the session id and last recommendations
    #[arg(long, global = true, env = "CURRICRAFT_STATE_FILE")]
    state_file: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Create an advising session for a student.

The service issues a session id which becomes the active session for every
later command. Running this again replaces the stored id; data submitted
under the previous session is no longer reachable from this client.")]
    /// Create an advising session
    Session {
        /// Student ID number
        student_id: String,
    },

    #[command(long_about = "Upload academic data and generate recommendations.

Reads the transcript (second sheet) and optional offered courses (first
sheet), previews the normalized rows, then submits the transcript and
requests recommendations for the active session.

Rows without both Course_Code and Grade are skipped. The transcript must
keep at least one row.

If the transcript is accepted but the recommendation request fails, the
transcript stays submitted. Use 'curricraft retry-recommend' instead of
uploading again.

EXAMPLES:
  curricraft upload -t transcript.xlsx
  curricraft upload -t transcript.xlsx -o offered.xlsx --max-credits 21
  curricraft upload -t transcript.xlsx -n      # Preview only")]
    /// Upload transcript/offered courses and generate recommendations
    Upload {
        /// Transcript workbook (.xlsx, .xls, .ods)
        #[arg(short, long)]
        transcript: PathBuf,

        /// Offered courses workbook
        #[arg(short, long)]
        offered: Option<PathBuf>,

        /// Credit cap for the next semester plan
        #[arg(short, long)]
        max_credits: Option<u32>,

        /// Preview normalized rows without submitting
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Request recommendations again for an already-uploaded transcript
    RetryRecommend {
        /// Offered courses workbook
        #[arg(short, long)]
        offered: Option<PathBuf>,

        /// Credit cap for the next semester plan
        #[arg(short, long)]
        max_credits: Option<u32>,
    },

    /// Show the last stored recommendations
    Recommendations {
        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Fetch the graduation audit for the active session
    Audit {
        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Show the stored session state
    Status,

    /// Manage catalog courses
    Courses {
        #[command(subcommand)]
        action: CoursesAction,
    },

    /// Write blank transcript and offered-courses workbooks
    Template {
        /// Output directory
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum CoursesAction {
    /// List all catalog courses
    List,

    /// Create a catalog course
    Create {
        /// Course name
        name: String,

        /// Credits
        #[arg(long, default_value = "3")]
        credits: u32,

        /// Mark as professional ethics seminar
        #[arg(long)]
        seminar: bool,

        /// Create as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Update a catalog course
    Update {
        /// Course ID
        id: i64,

        /// Course name
        name: String,

        /// Credits
        #[arg(long, default_value = "3")]
        credits: u32,

        /// Mark as professional ethics seminar
        #[arg(long)]
        seminar: bool,

        /// Mark as inactive
        #[arg(long)]
        inactive: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "curricraft=info" } else { "curricraft=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let max_credits_override = match &cli.command {
        Commands::Upload { max_credits, .. } | Commands::RetryRecommend { max_credits, .. } => {
            *max_credits
        }
        _ => None,
    };

    let config = AdvisorConfig::resolve(
        cli.config.as_deref(),
        ConfigOverrides {
            api_url: cli.api_url,
            state_file: cli.state_file,
            max_credits: max_credits_override,
        },
    )?;

    match cli.command {
        Commands::Session { student_id } => cli::create_session(&config, student_id).await?,

        Commands::Upload {
            transcript,
            offered,
            max_credits,
            dry_run,
        } => cli::upload(&config, transcript, offered, max_credits, dry_run, cli.verbose).await?,

        Commands::RetryRecommend {
            offered,
            max_credits,
        } => cli::retry_recommend(&config, offered, max_credits, cli.verbose).await?,

        Commands::Recommendations { json } => cli::recommendations(&config, json)?,

        Commands::Audit { json } => cli::audit(&config, json).await?,

        Commands::Status => cli::status(&config)?,

        Commands::Courses { action } => match action {
            CoursesAction::List => cli::courses_list(&config).await?,
            CoursesAction::Create {
                name,
                credits,
                seminar,
                inactive,
            } => {
                let draft = CourseDraft {
                    course_name: name,
                    credits,
                    is_ethics_seminar: seminar,
                    is_active: !inactive,
                };
                cli::courses_create(&config, draft).await?
            }
            CoursesAction::Update {
                id,
                name,
                credits,
                seminar,
                inactive,
            } => {
                let draft = CourseDraft {
                    course_name: name,
                    credits,
                    is_ethics_seminar: seminar,
                    is_active: !inactive,
                };
                cli::courses_update(&config, id, draft).await?
            }
        },

        Commands::Template { dir } => cli::template(dir)?,
    }

    Ok(())
}
