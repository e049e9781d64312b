//! Advising service boundary
//!
//! The workflow only depends on [`AdvisingService`]; [`HttpAdvisingService`]
//! is the JSON-over-HTTP implementation. Any non-2xx status, transport
//! failure or undecodable body becomes [`AdvisorError::RemoteCall`].

use crate::error::{AdvisorError, AdvisorResult};
use crate::types::{
    AuditResult, Course, CourseDraft, CreatedSession, RecommendationConfig, RecommendationResult,
    SessionId, TranscriptEntry,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub const OP_CREATE_SESSION: &str = "create session";
pub const OP_SUBMIT_TRANSCRIPT: &str = "submit transcript";
pub const OP_REQUEST_RECOMMENDATIONS: &str = "request recommendations";
pub const OP_GRADUATION_AUDIT: &str = "graduation audit";
pub const OP_LIST_COURSES: &str = "list courses";
pub const OP_CREATE_COURSE: &str = "create course";
pub const OP_UPDATE_COURSE: &str = "update course";

/// Longest slice of an error body quoted back to the user
const MAX_ERROR_BODY: usize = 200;

/// Session-scoped operations of the advising service
#[async_trait]
pub trait AdvisingService: Send + Sync {
    async fn create_session(&self, student_id: &str) -> AdvisorResult<CreatedSession>;

    async fn submit_transcript(
        &self,
        session_id: &SessionId,
        entries: &[TranscriptEntry],
    ) -> AdvisorResult<Value>;

    async fn request_recommendations(
        &self,
        session_id: &SessionId,
        config: &RecommendationConfig,
    ) -> AdvisorResult<RecommendationResult>;

    async fn graduation_audit(&self, session_id: &SessionId) -> AdvisorResult<AuditResult>;
}

/// Catalog administration endpoints
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn list_courses(&self) -> AdvisorResult<Vec<Course>>;

    async fn create_course(&self, draft: &CourseDraft) -> AdvisorResult<Value>;

    async fn update_course(&self, course_id: i64, draft: &CourseDraft) -> AdvisorResult<Value>;
}

/// HTTP client for the advising service.
///
/// No request timeout is configured: a hung call blocks until the service
/// answers or the connection drops.
#[derive(Debug, Clone)]
pub struct HttpAdvisingService {
    client: Client,
    base_url: Url,
}

impl HttpAdvisingService {
    pub fn new(base_url: impl Into<String>) -> AdvisorResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("curricraft/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AdvisorError::Validation(format!("Failed to create HTTP client: {}", e)))?;

        let raw = base_url.into();
        let base_url = Url::parse(raw.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| AdvisorError::Validation(format!("Invalid service URL '{}'", raw)))?;

        Ok(Self { client, base_url })
    }

    /// Base URL plus path segments, each percent-encoded as a single segment
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn session_url(&self, session_id: &SessionId, suffix: &str) -> Url {
        self.url(&["advising-session", session_id.as_str(), suffix])
    }

    /// Send a request and decode its JSON body
    async fn send<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> AdvisorResult<T> {
        let response = request.send().await.map_err(|e| {
            warn!(operation, error = %e, "Advising service unreachable");
            AdvisorError::remote(operation, e.to_string())
        })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AdvisorError::remote(operation, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            let excerpt: String = text.chars().take(MAX_ERROR_BODY).collect();
            warn!(operation, %status, "Advising service returned an error");
            return Err(AdvisorError::remote(operation, format!("HTTP {}: {}", status, excerpt)));
        }

        debug!(operation, %status, bytes = body.len(), "Advising service responded");

        // An empty acknowledgement decodes as JSON null
        let payload: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(payload)
            .map_err(|e| AdvisorError::remote(operation, format!("Invalid response body: {}", e)))
    }
}

/// Numeric student ids go over the wire as numbers, anything else as text
fn student_id_value(student_id: &str) -> Value {
    match student_id.parse::<i64>() {
        Ok(n) => json!(n),
        Err(_) => json!(student_id),
    }
}

#[async_trait]
impl AdvisingService for HttpAdvisingService {
    async fn create_session(&self, student_id: &str) -> AdvisorResult<CreatedSession> {
        info!(student_id, "Creating advising session");
        let request = self
            .client
            .post(self.url(&["advising-session"]))
            .json(&json!({ "student_id_number": student_id_value(student_id) }));
        self.send(OP_CREATE_SESSION, request).await
    }

    async fn submit_transcript(
        &self,
        session_id: &SessionId,
        entries: &[TranscriptEntry],
    ) -> AdvisorResult<Value> {
        info!(%session_id, entries = entries.len(), "Submitting transcript");
        let request = self
            .client
            .post(self.session_url(session_id, "transcript"))
            .json(entries);
        self.send(OP_SUBMIT_TRANSCRIPT, request).await
    }

    async fn request_recommendations(
        &self,
        session_id: &SessionId,
        config: &RecommendationConfig,
    ) -> AdvisorResult<RecommendationResult> {
        info!(
            %session_id,
            max_credits = config.max_credits,
            offered = config.offered_courses.len(),
            "Requesting recommendations"
        );
        let request = self
            .client
            .post(self.session_url(session_id, "recommendations"))
            .json(config);
        self.send(OP_REQUEST_RECOMMENDATIONS, request).await
    }

    async fn graduation_audit(&self, session_id: &SessionId) -> AdvisorResult<AuditResult> {
        info!(%session_id, "Fetching graduation audit");
        let request = self.client.get(self.session_url(session_id, "graduation-audit"));
        self.send(OP_GRADUATION_AUDIT, request).await
    }
}

#[async_trait]
impl CourseCatalog for HttpAdvisingService {
    async fn list_courses(&self) -> AdvisorResult<Vec<Course>> {
        let request = self.client.get(self.url(&["admin", "courses"]));
        self.send(OP_LIST_COURSES, request).await
    }

    async fn create_course(&self, draft: &CourseDraft) -> AdvisorResult<Value> {
        validate_draft(draft)?;
        info!(course_name = %draft.course_name, "Creating catalog course");
        let request = self.client.post(self.url(&["admin", "courses"])).json(draft);
        self.send(OP_CREATE_COURSE, request).await
    }

    async fn update_course(&self, course_id: i64, draft: &CourseDraft) -> AdvisorResult<Value> {
        validate_draft(draft)?;
        info!(course_id, "Updating catalog course");
        let request = self
            .client
            .put(self.url(&["admin", "courses", &course_id.to_string()]))
            .json(draft);
        self.send(OP_UPDATE_COURSE, request).await
    }
}

/// Client-side check before a catalog write
pub fn validate_draft(draft: &CourseDraft) -> AdvisorResult<()> {
    if draft.course_name.trim().is_empty() {
        return Err(AdvisorError::Validation("Course name is required".to_string()));
    }
    Ok(())
}
