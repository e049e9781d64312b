//! Advising workflow state machine
//!
//! ```text
//! NoSession ─create─▶ SessionCreated ─submit─▶ DataIngested ─recommend─▶ RecommendationsReady
//!                                                   │    ▲
//!                                                   └────┘ retry_recommendations
//! ```
//!
//! Every transition is one explicit call awaited to completion. Nothing is
//! retried or deduplicated implicitly: submitting twice submits twice, and
//! creating a session twice orphans the first one.

use crate::error::{AdvisorError, AdvisorResult};
use crate::remote::AdvisingService;
use crate::state::SessionStateStore;
use crate::types::{
    AuditResult, OfferedCourseCode, RecommendationConfig, RecommendationResult, SessionId,
    TranscriptEntry,
};
use tracing::{info, warn};

/// Where the workflow stands for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    NoSession,
    SessionCreated,
    /// Transcript accepted by the service, recommendations not (yet) produced
    DataIngested,
    RecommendationsReady,
}

impl std::fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WorkflowState::NoSession => "no session",
            WorkflowState::SessionCreated => "session created",
            WorkflowState::DataIngested => "data ingested",
            WorkflowState::RecommendationsReady => "recommendations ready",
        };
        f.write_str(name)
    }
}

/// Sequences remote calls against the injected store and service
pub struct WorkflowOrchestrator<S, A> {
    store: S,
    service: A,
    state: WorkflowState,
}

impl<S: SessionStateStore, A: AdvisingService> WorkflowOrchestrator<S, A> {
    /// Start from a clean slate
    pub fn new(store: S, service: A) -> Self {
        Self {
            store,
            service,
            state: WorkflowState::NoSession,
        }
    }

    /// Pick up where a previous invocation left off.
    ///
    /// Only the session id is trusted: a stored recommendation result may
    /// predate the stored session, so it never implies `RecommendationsReady`.
    pub fn resume(store: S, service: A) -> AdvisorResult<Self> {
        let state = match store.session_id()? {
            Some(_) => WorkflowState::SessionCreated,
            None => WorkflowState::NoSession,
        };
        Ok(Self {
            store,
            service,
            state,
        })
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn service(&self) -> &A {
        &self.service
    }

    pub fn into_parts(self) -> (S, A) {
        (self.store, self.service)
    }

    /// Create a new advising session and make it the active one.
    ///
    /// Not idempotent: a second call replaces the stored id.
    pub async fn create_advising_session(&mut self, student_id: &str) -> AdvisorResult<SessionId> {
        let student_id = student_id.trim();
        if student_id.is_empty() {
            return Err(AdvisorError::MissingStudentId);
        }

        let created = self.service.create_session(student_id).await?;
        self.store.set_session_id(created.session_id.clone())?;
        self.state = WorkflowState::SessionCreated;

        info!(session_id = %created.session_id, "Advising session created");
        Ok(created.session_id)
    }

    /// Submit the transcript, then request recommendations for the session.
    ///
    /// Preconditions are checked before any remote call. The recommendation
    /// request is only sent once the transcript was accepted; if it fails,
    /// the transcript stays submitted, the state is left at
    /// [`WorkflowState::DataIngested`] and [`Self::retry_recommendations`] is
    /// the way forward.
    pub async fn submit_transcript_and_recommend(
        &mut self,
        session_id: Option<&SessionId>,
        transcript: &[TranscriptEntry],
        offered_courses: &[OfferedCourseCode],
        max_credits: u32,
    ) -> AdvisorResult<RecommendationResult> {
        let session_id = session_id.ok_or(AdvisorError::MissingSession)?;
        if transcript.is_empty() {
            return Err(AdvisorError::EmptyTranscript);
        }

        self.service.submit_transcript(session_id, transcript).await?;
        self.state = WorkflowState::DataIngested;
        info!(%session_id, entries = transcript.len(), "Transcript ingested");

        self.recommend(session_id, offered_courses, max_credits).await
    }

    /// Request recommendations again for a session whose transcript is
    /// already on the service. Sends a new request every time.
    pub async fn retry_recommendations(
        &mut self,
        session_id: Option<&SessionId>,
        offered_courses: &[OfferedCourseCode],
        max_credits: u32,
    ) -> AdvisorResult<RecommendationResult> {
        let session_id = session_id.ok_or(AdvisorError::MissingSession)?;
        self.recommend(session_id, offered_courses, max_credits).await
    }

    /// Read-only; does not touch the state machine
    pub async fn fetch_graduation_audit(
        &self,
        session_id: Option<&SessionId>,
    ) -> AdvisorResult<AuditResult> {
        let session_id = session_id.ok_or(AdvisorError::MissingSession)?;
        self.service.graduation_audit(session_id).await
    }

    async fn recommend(
        &mut self,
        session_id: &SessionId,
        offered_courses: &[OfferedCourseCode],
        max_credits: u32,
    ) -> AdvisorResult<RecommendationResult> {
        let config = RecommendationConfig {
            max_credits,
            offered_courses: offered_courses.to_vec(),
        };

        let result = match self.service.request_recommendations(session_id, &config).await {
            Ok(result) => result,
            Err(e) => {
                warn!(%session_id, state = %self.state, "Recommendation request failed");
                return Err(e);
            }
        };

        self.store.set_recommendation_result(result.clone())?;
        self.state = WorkflowState::RecommendationsReady;
        info!(%session_id, "Recommendations stored");
        Ok(result)
    }
}
