//! Terminal rendering of previews and service payloads
//!
//! Payloads are read defensively: a missing or oddly-typed field renders as
//! `-` instead of failing.

use crate::types::{AuditResult, Course, OfferedCourseCode, RecommendationResult, TranscriptEntry};
use colored::Colorize;
use serde_json::Value;
use std::fmt::Write;

const MISSING: &str = "-";
const PROGRESS_WIDTH: usize = 30;

/// Look up a nested field by path
fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(key))
}

/// Display form of a scalar JSON value
fn scalar(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => MISSING.to_string(),
    }
}

fn field(value: &Value, path: &[&str]) -> String {
    scalar(lookup(value, path))
}

/// Plain left-aligned text table
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h.to_uppercase(), w = *w))
        .collect();
    let _ = writeln!(out, "   {}", header_line.join("  ").bold());

    let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();
    let _ = writeln!(out, "   {}", rule.join("  "));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
            .collect();
        let _ = writeln!(out, "   {}", line.join("  ").trim_end());
    }
    out
}

/// Transcript rows as they will be submitted
pub fn render_transcript_preview(entries: &[TranscriptEntry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| vec![e.course_code.clone(), e.grade.clone(), e.term.clone()])
        .collect();
    format!(
        "{}\n{}",
        format!("📄 Transcript Preview ({} courses)", entries.len()).bold().cyan(),
        render_table(&["Course Code", "Grade", "Term"], &rows)
    )
}

pub fn render_offered_preview(codes: &[OfferedCourseCode]) -> String {
    let tags: Vec<&str> = codes.iter().map(OfferedCourseCode::as_str).collect();
    format!(
        "{}\n   {}\n",
        format!("📚 Offered Courses Preview ({} codes)", codes.len()).bold().cyan(),
        if tags.is_empty() {
            "(none)".to_string()
        } else {
            tags.join(", ")
        }
    )
}

//==============================================================================
// Recommendations
//==============================================================================

pub fn render_recommendations(result: &RecommendationResult) -> String {
    let data = &result.0;
    let mut out = String::new();

    let _ = writeln!(out, "{}", "🎓 Academic Recommendation Dashboard".bold().green());
    let _ = writeln!(out, "   Earned Credits:  {}", field(data, &["earned_credits"]).bold());
    let _ = writeln!(out, "   Elective Status: {}", field(data, &["elective_priority"]));
    let _ = writeln!(out, "   Concentration:   {}", concentration(data));
    out.push('\n');

    let _ = writeln!(out, "{}", "📋 Recommended Next Semester Plan".bold().cyan());
    let courses = lookup(data, &["next_semester_plan", "recommended_courses"])
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    let rows: Vec<Vec<String>> = courses
        .iter()
        .map(|c| {
            vec![
                field(c, &["course_code"]),
                field(c, &["course_name"]),
                field(c, &["credits"]),
                field(c, &["source"]),
            ]
        })
        .collect();
    out.push_str(&render_table(&["Course Code", "Course Name", "Credits", "Source"], &rows));
    let _ = writeln!(
        out,
        "   Total Specialized Credits: {}",
        field(data, &["next_semester_plan", "total_credits"]).bold()
    );

    if let Some(progress) = data.get("elective_progress").filter(|p| p.is_object()) {
        out.push('\n');
        let _ = writeln!(out, "{}", "📈 Elective Progress".bold().cyan());
        let _ = writeln!(
            out,
            "   From Chosen Track: {} / {}",
            field(progress, &["chosen_group_completed"]),
            field(progress, &["min_from_chosen_group"])
        );
        let _ = writeln!(
            out,
            "   From All Groups:   {} / {}",
            field(progress, &["all_groups_completed"]),
            field(progress, &["min_from_all_groups"])
        );
    }

    out
}

fn concentration(data: &Value) -> String {
    let selected = lookup(data, &["elective_progress", "track_status"])
        .and_then(Value::as_str)
        .is_some_and(|status| status == "SELECTED");
    if selected {
        format!("Track {}", field(data, &["elective_progress", "chosen_group_id"]))
    } else {
        "Not Selected".to_string()
    }
}

pub fn render_no_recommendations() -> String {
    format!(
        "{}\n   Upload a transcript and generate recommendations first:\n   curricraft upload --transcript <FILE>\n",
        "⚠️  No recommendation data found".yellow().bold()
    )
}

//==============================================================================
// Graduation Audit
//==============================================================================

pub fn render_audit(audit: &AuditResult) -> String {
    let data = &audit.0;
    let mut out = String::new();

    let _ = writeln!(out, "{}", "🎓 Graduation Audit Dashboard".bold().green());
    out.push('\n');

    let percent = lookup(data, &["credit_audit", "percentage_completed"]).and_then(Value::as_f64);
    let _ = writeln!(out, "{}", "📊 Overall Credit Progress".bold().cyan());
    let _ = writeln!(out, "   {}", progress_bar(percent.unwrap_or(0.0)));
    let _ = writeln!(
        out,
        "   {} / {} Credits Completed ({}%)",
        field(data, &["credit_audit", "earned_credits"]),
        field(data, &["credit_audit", "required_credits"]),
        field(data, &["credit_audit", "percentage_completed"])
    );
    out.push('\n');

    let _ = writeln!(out, "{}", "📚 Main Category Breakdown".bold().cyan());
    let categories = data
        .get("main_category_audit")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for category in categories {
        let _ = writeln!(
            out,
            "   {}: {} / {} Credits",
            field(category, &["main_category"]).bright_blue(),
            field(category, &["earned_credits"]),
            field(category, &["required_credits"])
        );
    }
    out.push('\n');

    let _ = writeln!(out, "{}", "🧭 Professional Ethics Seminar".bold().cyan());
    let _ = writeln!(
        out,
        "   Completed: {} / {}",
        field(data, &["seminar_audit", "completed"]),
        field(data, &["seminar_audit", "required_total"])
    );
    let _ = writeln!(out, "   Status: {}", field(data, &["seminar_audit", "status"]));
    out.push('\n');

    let status = field(data, &["graduation_status"]);
    let badge = if status == "ELIGIBLE" {
        status.green().bold()
    } else {
        status.red().bold()
    };
    let _ = writeln!(out, "{} {}", "Graduation Status:".bold(), badge);

    out
}

fn progress_bar(percent: f64) -> String {
    let clamped = percent.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "█".repeat(filled).blue(),
        "░".repeat(PROGRESS_WIDTH - filled)
    )
}

//==============================================================================
// Course Catalog
//==============================================================================

pub fn render_courses(courses: &[Course]) -> String {
    let yes_no = |b: bool| (if b { "Yes" } else { "No" }).to_string();
    let rows: Vec<Vec<String>> = courses
        .iter()
        .map(|c| {
            vec![
                c.course_id.to_string(),
                c.course_name.clone(),
                c.credits.to_string(),
                yes_no(c.is_ethics_seminar),
                yes_no(c.is_active),
            ]
        })
        .collect();
    render_table(&["ID", "Name", "Credits", "Seminar", "Active"], &rows)
}
