//! Rubric Client · upload session controller for the rubric generation service
//!
//! - Three upload sections (question, rubrics, solution) plus a subject
//! - Multipart submission to `/api/generate`, session clearing via `/api/next`
//! - Declarative view projection, rendered as text by the `rubric-client` binary

pub mod api;
pub mod banner;
pub mod config;
pub mod controller;
pub mod domain;
pub mod error;
pub mod preview;
pub mod protocol;
pub mod session;
pub mod telemetry;
pub mod view;

pub use api::{GenerateRequest, HttpRubricApi, RubricApi};
pub use config::ClientConfig;
pub use controller::{Controller, FlowState, GenerateOutcome, ResetOutcome};
pub use domain::{BucketKind, ImageFile, Subject};
pub use error::{ApiError, ConfigError, SessionError};
pub use view::{render_text, View};
