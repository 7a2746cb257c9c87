//! The upload session controller.
//!
//! Owns the session state, the banner slot, preview tasks and the generation
//! flow (`Idle -> Submitting -> Success | Failed`). All mutation goes through
//! `&mut self`, so at most one request is ever in flight.

use tracing::{debug, error, info, instrument, warn};

use crate::api::{GenerateRequest, RubricApi};
use crate::banner::BannerSlot;
use crate::config::ClientConfig;
use crate::domain::{BucketKind, ImageFile, Subject};
use crate::error::{ApiError, SessionError};
use crate::preview::PreviewTasks;
use crate::protocol::{parse_rubric, GenerateResponse, RubricItem};
use crate::session::{IntakeSource, SessionState};
use crate::view::{project, View};

pub const MSG_ONLY_IMAGES: &str = "Only image files are allowed";
pub const MSG_MISSING_SECTIONS: &str = "Please upload images for all three sections (Question, Rubrics, Solution)";
pub const MSG_GENERATE_FAILED: &str = "Failed to generate rubrics";
pub const MSG_GENERATE_RETRY: &str = "Failed to generate rubrics. Please try again.";
pub const MSG_INVALID_RUBRIC: &str = "Invalid rubric format received";
pub const MSG_CLEAR_FAILED: &str = "Failed to clear session. UI will be cleared anyway.";
pub const MSG_SESSION_CLEARED: &str = "Session cleared successfully";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Submitting,
    Success,
    Failed,
}

/// Result-area state that is not part of the session itself.
#[derive(Clone, Debug)]
pub struct UiState {
    pub flow: FlowState,
    pub rubric: Vec<RubricItem>,
    pub results_visible: bool,
    pub next_visible: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self { flow: FlowState::Idle, rubric: Vec::new(), results_visible: false, next_visible: false }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GenerateOutcome {
    /// Not all three sections had files; nothing was sent.
    Blocked,
    Failed { message: String },
    Rendered { items: usize },
    /// Success status but the rubric was not a sequence.
    InvalidRubric,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetOutcome {
    /// No request id was stored; no network call was made.
    LocalOnly,
    Cleared { message: String },
    ClearFailed,
}

pub struct Controller<A> {
    api: A,
    session: SessionState,
    ui: UiState,
    banners: BannerSlot,
    previews: PreviewTasks,
}

impl<A: RubricApi> Controller<A> {
    pub fn new(api: A, config: &ClientConfig) -> Self {
        Self {
            api,
            session: SessionState::new(config.default_subject),
            ui: UiState::default(),
            banners: BannerSlot::new(config.error_banner_ttl(), config.success_banner_ttl()),
            previews: PreviewTasks::new(),
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn banners(&self) -> &BannerSlot {
        &self.banners
    }

    pub fn previews_mut(&mut self) -> &mut PreviewTasks {
        &mut self.previews
    }

    /// Generate control: all three sections filled and nothing in flight.
    pub fn generate_enabled(&self) -> bool {
        self.session.ready() && self.ui.flow != FlowState::Submitting
    }

    pub fn select_subject(&mut self, subject: Subject) {
        self.session.select_subject(subject);
    }

    /// Select by name; unknown names leave the selection unchanged.
    pub fn select_subject_named(&mut self, name: &str) -> Result<Subject, SessionError> {
        let subject = name.parse::<Subject>()?;
        self.select_subject(subject);
        Ok(subject)
    }

    /// File-picker intake for one section.
    pub fn pick_files(&mut self, kind: BucketKind, files: Vec<ImageFile>) -> Result<(), SessionError> {
        self.intake(kind, IntakeSource::Picker, files)
    }

    /// Drag-and-drop intake; non-images are discarded without a message.
    pub fn drop_files(&mut self, kind: BucketKind, files: Vec<ImageFile>) -> Result<(), SessionError> {
        self.intake(kind, IntakeSource::Drop, files)
    }

    fn intake(&mut self, kind: BucketKind, source: IntakeSource, files: Vec<ImageFile>) -> Result<(), SessionError> {
        match self.session.intake(kind, source, files) {
            Ok(accepted) => {
                self.previews.render(kind, accepted);
                Ok(())
            }
            Err(e) => {
                self.banners.show_error(MSG_ONLY_IMAGES);
                Err(e)
            }
        }
    }

    /// The removal control of preview `index` in `kind`.
    pub fn remove_file(&mut self, kind: BucketKind, index: usize) -> Result<ImageFile, SessionError> {
        let removed = self.session.remove(kind, index)?;
        self.previews.render(kind, self.session.bucket(kind));
        Ok(removed)
    }

    /// Enter `Submitting` and snapshot the request, or refuse when a section is empty.
    pub fn begin_generate(&mut self) -> Option<GenerateRequest> {
        if !self.session.ready() {
            self.banners.show_error(MSG_MISSING_SECTIONS);
            return None;
        }
        if let Some(previous) = self.session.request_id.take() {
            warn!(target: "session", %previous, "Starting a new generation without clearing the previous session");
        }
        self.ui.flow = FlowState::Submitting;
        self.ui.results_visible = false;
        Some(GenerateRequest::from_session(&self.session))
    }

    /// Settle a generation started with `begin_generate`.
    pub fn finish_generate(&mut self, result: Result<GenerateResponse, ApiError>) -> GenerateOutcome {
        match result {
            Ok(body) => {
                self.session.request_id = body.request_id;
                self.ui.flow = FlowState::Success;
                self.ui.rubric.clear();
                let outcome = match parse_rubric(&body.rubric) {
                    Ok(items) => {
                        let n = items.len();
                        self.ui.rubric = items;
                        GenerateOutcome::Rendered { items: n }
                    }
                    Err(_) => {
                        warn!(target: "session", payload = %body.rubric, "Rubric payload is not a sequence");
                        self.banners.show_error(MSG_INVALID_RUBRIC);
                        GenerateOutcome::InvalidRubric
                    }
                };
                self.ui.results_visible = true;
                self.ui.next_visible = true;
                info!(target: "session", request_id = ?self.session.request_id, ?outcome, "Generation finished");
                outcome
            }
            Err(e) => {
                error!(target: "session", error = %e, "Generation failed");
                let message = match &e {
                    ApiError::Status { detail: Some(detail), .. } => detail.clone(),
                    ApiError::Status { detail: None, .. } => MSG_GENERATE_FAILED.to_string(),
                    _ => MSG_GENERATE_RETRY.to_string(),
                };
                self.ui.flow = FlowState::Failed;
                self.banners.show_error(message.clone());
                GenerateOutcome::Failed { message }
            }
        }
    }

    /// The generate action: guard, submit, render.
    #[instrument(level = "info", skip(self), fields(subject = %self.session.subject, files = self.session.buckets().total()))]
    pub async fn generate(&mut self) -> GenerateOutcome {
        let Some(request) = self.begin_generate() else {
            return GenerateOutcome::Blocked;
        };
        let result = self.api.generate(request).await;
        self.finish_generate(result)
    }

    /// The "next question" action. The local reset happens whatever the server says.
    #[instrument(level = "info", skip(self), fields(request_id = ?self.session.request_id))]
    pub async fn next_question(&mut self) -> ResetOutcome {
        let Some(request_id) = self.session.request_id.clone() else {
            self.reset_local();
            return ResetOutcome::LocalOnly;
        };

        let outcome = match self.api.clear_session(&request_id).await {
            Ok(body) => ResetOutcome::Cleared {
                message: body.message.unwrap_or_else(|| MSG_SESSION_CLEARED.to_string()),
            },
            Err(e) => {
                error!(target: "session", %request_id, error = %e, "Failed to clear server session");
                ResetOutcome::ClearFailed
            }
        };

        // Reset before showing the outcome: the reset drops every banner, so the
        // other order would remove the message as soon as it appeared.
        self.reset_local();
        match &outcome {
            ResetOutcome::Cleared { message } => self.banners.show_success(message.clone()),
            ResetOutcome::ClearFailed => self.banners.show_error(MSG_CLEAR_FAILED),
            ResetOutcome::LocalOnly => {}
        }
        outcome
    }

    /// Empty every section, hide results, forget the request id, drop any banner.
    pub fn reset_local(&mut self) {
        self.session.reset();
        self.previews.clear();
        self.ui = UiState::default();
        self.banners.clear();
        debug!(target: "session", "Local session reset");
    }

    /// Pick up finished thumbnails and dismiss an expired banner.
    pub fn poll(&mut self) {
        self.previews.collect_ready();
        self.banners.expire();
    }

    pub fn view(&self) -> View {
        project(&self.session, &self.ui, &self.banners, &self.previews)
    }
}
