//! Curricraft - academic advising workflow client
//!
//! Turns loosely-typed transcript and offered-course spreadsheets into
//! canonical records, hands them to a remote advising service, and keeps the
//! minimal state (active session id, last recommendations) that independent
//! invocations share.
//!
//! # Features
//!
//! - Spreadsheet decode (.xlsx, .xls, .ods) with header-keyed rows
//! - Lossy row normalization with an explicit accept/reject decode step
//! - File-backed session state shared across invocations
//! - Ordered, non-idempotent workflow: session → transcript → recommendations
//!
//! # Example
//!
//! ```no_run
//! use curricraft::excel::read_workbook_file;
//! use curricraft::normalize::{offered_course_codes, transcript_entries};
//! use curricraft::remote::HttpAdvisingService;
//! use curricraft::state::FileStateStore;
//! use curricraft::workflow::WorkflowOrchestrator;
//!
//! # async fn run() -> curricraft::AdvisorResult<()> {
//! let transcript = transcript_entries(&read_workbook_file("transcript.xlsx")?)?;
//! let offered = offered_course_codes(&read_workbook_file("offered.xlsx")?)?;
//!
//! let store = FileStateStore::new("state.json");
//! let service = HttpAdvisingService::new("http://127.0.0.1:8000")?;
//! let mut workflow = WorkflowOrchestrator::resume(store, service)?;
//!
//! let session_id = workflow.create_advising_session("6531336").await?;
//! let result = workflow
//!     .submit_transcript_and_recommend(Some(&session_id), &transcript, &offered, 18)
//!     .await?;
//! println!("{}", result.0);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod normalize;
pub mod remote;
pub mod state;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use error::{AdvisorError, AdvisorResult};
pub use types::{OfferedCourseCode, RecommendationResult, SessionId, TranscriptEntry, Workbook};
