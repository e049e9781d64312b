//! CLI integration tests
//! Run the curricraft binary as a subprocess. Every test gets its own state
//! file; end-to-end tests talk to an axum mock running on a background thread.

#![allow(deprecated)] // Command::cargo_bin deprecation - no stable replacement yet

use assert_cmd::Command;
use axum::extract::Path as UrlPath;
use axum::routing::{get, post};
use axum::{Json, Router};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn curricraft(state_file: &Path) -> Command {
    let mut cmd = Command::cargo_bin("curricraft").unwrap();
    cmd.env_remove("CURRICRAFT_CONFIG")
        .env_remove("CURRICRAFT_API_URL")
        .env_remove("RUST_LOG")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .env("NO_COLOR", "1")
        .arg("--state-file")
        .arg(state_file);
    cmd
}

fn write_transcript(dir: &Path, rows: &[[&str; 4]]) -> PathBuf {
    let mut workbook = rust_xlsxwriter::Workbook::new();

    let student = workbook.add_worksheet();
    student.set_name("Student").unwrap();
    student.write_string(0, 0, "Student_ID").unwrap();
    student.write_number(1, 0, 6531336).unwrap();

    let courses = workbook.add_worksheet();
    courses.set_name("Completed Courses").unwrap();
    for (c, header) in ["Course_Code", "Grade", "Semester", "Year"].iter().enumerate() {
        courses.write_string(0, c as u16, *header).unwrap();
    }
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if !cell.is_empty() {
                courses.write_string(r as u32 + 1, c as u16, *cell).unwrap();
            }
        }
    }

    let path = dir.join("transcript.xlsx");
    workbook.save(&path).unwrap();
    path
}

fn write_offered(dir: &Path, codes: &[&str]) -> PathBuf {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "course_code").unwrap();
    for (r, code) in codes.iter().enumerate() {
        sheet.write_string(r as u32 + 1, 0, *code).unwrap();
    }
    let path = dir.join("offered.xlsx");
    workbook.save(&path).unwrap();
    path
}

/// Start a mock advising service on a background runtime, return its URL
fn spawn_service() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.set_nonblocking(true).unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route(
            "/advising-session",
            post(|| async { Json(json!({"session_id": 21, "curriculum_id": 1})) }),
        )
        .route(
            "/advising-session/:id/transcript",
            post(|Json(body): Json<Value>| async move {
                Json(json!({"received": body.as_array().map(Vec::len)}))
            }),
        )
        .route(
            "/advising-session/:id/recommendations",
            post(|UrlPath(id): UrlPath<String>, Json(body): Json<Value>| async move {
                Json(json!({
                    "earned_credits": 45,
                    "elective_priority": format!("session {}", id),
                    "next_semester_plan": {
                        "recommended_courses": [
                            {"course_code": body["offered_courses"][0], "course_name": "Data Structures", "credits": 3, "source": "CORE"}
                        ],
                        "total_credits": body["max_credits"]
                    }
                }))
            }),
        )
        .route(
            "/advising-session/:id/graduation-audit",
            get(|| async {
                Json(json!({
                    "credit_audit": {"earned_credits": 45, "required_credits": 132, "percentage_completed": 34.1},
                    "main_category_audit": [],
                    "seminar_audit": {"completed": 0, "required_total": 2, "status": "INCOMPLETE"},
                    "graduation_status": "NOT_ELIGIBLE"
                }))
            }),
        );

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

// ═══════════════════════════════════════════════════════════════════════════
// OFFLINE COMMANDS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_help_lists_workflow_commands() {
    Command::cargo_bin("curricraft")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("session"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("audit"));
}

#[test]
fn test_status_without_state_file() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");

    curricraft(&state)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session ID: none"))
        .stdout(predicate::str::contains("Recommendations: none"));
    assert!(!state.exists());
}

#[test]
fn test_recommendations_when_nothing_stored() {
    let dir = TempDir::new().unwrap();

    curricraft(&dir.path().join("state.json"))
        .arg("recommendations")
        .assert()
        .success()
        .stdout(predicate::str::contains("No recommendation data found"));
}

#[test]
fn test_recommendations_json_prints_stored_payload() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(
        &state,
        r#"{"session_id": "3", "recommendation_result": {"earned_credits": 77}}"#,
    )
    .unwrap();

    curricraft(&state)
        .args(["recommendations", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"earned_credits\": 77"));
}

#[test]
fn test_template_writes_workbooks() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("templates");

    curricraft(&dir.path().join("state.json"))
        .arg("template")
        .arg(&out)
        .assert()
        .success();

    let transcript = curricraft::excel::read_workbook_file(
        out.join(curricraft::excel::TRANSCRIPT_TEMPLATE_FILE),
    )
    .unwrap();
    assert_eq!(transcript.sheets.len(), 2);
    assert!(out.join(curricraft::excel::OFFERED_TEMPLATE_FILE).exists());
}

#[test]
fn test_dry_run_previews_without_state() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    let transcript = write_transcript(dir.path(), &[["CS101", "A", "1", "2023"], ["", "B", "1", "2023"]]);

    curricraft(&state)
        .arg("upload")
        .arg("--transcript")
        .arg(&transcript)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Transcript Preview (1 courses)"))
        .stdout(predicate::str::contains("1/2023"));
    assert!(!state.exists());
}

#[test]
fn test_upload_without_session_fails() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), &[["CS101", "A", "1", "2023"]]);

    curricraft(&dir.path().join("state.json"))
        .arg("upload")
        .arg("-t")
        .arg(&transcript)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No advising session found"));
}

#[test]
fn test_upload_empty_transcript_fails() {
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    std::fs::write(&state, r#"{"session_id": "3"}"#).unwrap();
    let transcript = write_transcript(dir.path(), &[["", "A", "1", "2023"]]);

    curricraft(&state)
        .arg("upload")
        .arg("-t")
        .arg(&transcript)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Transcript is empty"));
}

#[test]
fn test_upload_unreadable_file_fails() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("transcript.xlsx");
    std::fs::write(&bogus, "definitely not a spreadsheet").unwrap();

    curricraft(&dir.path().join("state.json"))
        .arg("upload")
        .arg("-t")
        .arg(&bogus)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Spreadsheet decode error"));
}

#[test]
fn test_blank_student_id_rejected() {
    let dir = TempDir::new().unwrap();

    curricraft(&dir.path().join("state.json"))
        .args(["session", " "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Student ID is required"));
}

#[test]
fn test_zero_max_credits_rejected() {
    let dir = TempDir::new().unwrap();
    let transcript = write_transcript(dir.path(), &[["CS101", "A", "1", "2023"]]);

    curricraft(&dir.path().join("state.json"))
        .arg("upload")
        .arg("-t")
        .arg(&transcript)
        .args(["--max-credits", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_credits"));
}

// ═══════════════════════════════════════════════════════════════════════════
// END TO END
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_session_upload_recommendations_audit() {
    let url = spawn_service();
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");
    let transcript = write_transcript(
        dir.path(),
        &[["CS101", "A", "1", "2023"], ["MA101", "B+", "1", "2023"]],
    );
    let offered = write_offered(dir.path(), &["CS201", "CS202"]);

    curricraft(&state)
        .args(["--api-url", &url, "session", "6531336"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Session ID: 21"));

    curricraft(&state)
        .args(["--api-url", &url, "upload"])
        .arg("-t")
        .arg(&transcript)
        .arg("-o")
        .arg(&offered)
        .args(["-m", "15"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Recommendations generated"))
        .stdout(predicate::str::contains("CS201"))
        .stdout(predicate::str::contains("Total Specialized Credits: 15"));

    // A later invocation reads the stored result without the service
    curricraft(&state)
        .arg("recommendations")
        .assert()
        .success()
        .stdout(predicate::str::contains("session 21"));

    curricraft(&state)
        .args(["--api-url", &url, "audit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("45 / 132 Credits Completed"))
        .stdout(predicate::str::contains("NOT_ELIGIBLE"));
}

#[test]
fn test_unreachable_service_reports_remote_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let dir = TempDir::new().unwrap();
    let state = dir.path().join("state.json");

    curricraft(&state)
        .args(["--api-url", &url, "session", "6531336"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Remote call 'create session' failed"));
    assert!(!state.exists());
}
