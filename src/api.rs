//! Client for the rubric service.
//!
//! Two calls, both multipart: `/api/generate` with the subject and every image,
//! `/api/next` with the request id. Calls are instrumented and log part counts,
//! byte sizes, statuses and latencies (never file contents).

use std::time::Instant;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{error, info, instrument};

use crate::config::ClientConfig;
use crate::domain::{BucketKind, ImageFile, Subject};
use crate::error::ApiError;
use crate::protocol::{
  extract_detail, GenerateResponse, NextResponse, RequestId, GENERATE_PATH, NEXT_PATH, REQUEST_ID_FIELD,
  SUBJECT_FIELD,
};
use crate::session::SessionState;

/// Everything `/api/generate` needs, in submission order.
#[derive(Clone, Debug)]
pub struct GenerateRequest {
  pub subject: Subject,
  pub files: Vec<(BucketKind, ImageFile)>,
}

impl GenerateRequest {
  /// Snapshot the session: every file of every bucket, tagged with its bucket.
  pub fn from_session(session: &SessionState) -> Self {
    let files = session
      .buckets()
      .iter()
      .flat_map(|(kind, files)| files.iter().cloned().map(move |f| (kind, f)))
      .collect();
    Self { subject: session.subject, files }
  }

  pub fn count(&self, kind: BucketKind) -> usize {
    self.files.iter().filter(|(k, _)| *k == kind).count()
  }

  pub fn total_bytes(&self) -> usize {
    self.files.iter().map(|(_, f)| f.size()).sum()
  }
}

/// The backend seam. The controller only talks to this trait.
#[async_trait]
pub trait RubricApi: Send + Sync {
  async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError>;
  async fn clear_session(&self, request_id: &RequestId) -> Result<NextResponse, ApiError>;
}

#[derive(Clone)]
pub struct HttpRubricApi {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl HttpRubricApi {
  pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
    let client = reqwest::Client::builder()
      .user_agent(config.user_agent.clone())
      .build()?;
    Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.base_url, path)
  }

  fn generate_form(request: &GenerateRequest) -> Result<Form, ApiError> {
    let mut form = Form::new().text(SUBJECT_FIELD, request.subject.as_str());
    for (kind, file) in &request.files {
      let part = Part::bytes(file.bytes.to_vec())
        .file_name(file.name.clone())
        .mime_str(&file.content_type)
        .map_err(|e| ApiError::InvalidPart(format!("{} ({}): {}", file.name, file.content_type, e)))?;
      form = form.part(kind.field_name(), part);
    }
    Ok(form)
  }

  /// POST a form and decode the JSON success body, or turn the failure body into `ApiError::Status`.
  async fn post_form<T: for<'a> serde::Deserialize<'a>>(&self, path: &str, form: Form) -> Result<T, ApiError> {
    let url = self.url(path);
    let start = Instant::now();
    let res = self.client.post(&url).multipart(form).send().await?;
    let status = res.status();
    let body = res.text().await?;
    let elapsed = start.elapsed();

    if !status.is_success() {
      let detail = extract_detail(&body);
      error!(target: "api", %url, status = status.as_u16(), ?elapsed, detail = ?detail, "Request failed");
      return Err(ApiError::Status { status: status.as_u16(), detail });
    }

    info!(target: "api", %url, status = status.as_u16(), ?elapsed, body_len = body.len(), "Response received");
    serde_json::from_str::<T>(&body).map_err(|e| ApiError::Decode(e.to_string()))
  }
}

#[async_trait]
impl RubricApi for HttpRubricApi {
  #[instrument(
    level = "info",
    skip(self, request),
    fields(
      subject = %request.subject,
      question = request.count(BucketKind::Question),
      rubrics = request.count(BucketKind::Rubrics),
      solution = request.count(BucketKind::Solution),
      bytes = request.total_bytes(),
    )
  )]
  async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, ApiError> {
    let form = Self::generate_form(&request)?;
    self.post_form(GENERATE_PATH, form).await
  }

  #[instrument(level = "info", skip(self), fields(%request_id))]
  async fn clear_session(&self, request_id: &RequestId) -> Result<NextResponse, ApiError> {
    let form = Form::new().text(REQUEST_ID_FIELD, request_id.as_str().to_string());
    self.post_form(NEXT_PATH, form).await
  }
}
