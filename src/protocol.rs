//! Wire DTOs for the rubric service (`/api/generate`, `/api/next`), serde ready.
//! Response parsing is lenient: the rubric payload is kept as raw JSON until the
//! controller decides whether it is a usable sequence.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GENERATE_PATH: &str = "/api/generate";
pub const NEXT_PATH: &str = "/api/next";

/// Multipart field carrying the subject on `/api/generate`.
pub const SUBJECT_FIELD: &str = "subject";
/// Multipart field carrying the session id on `/api/next`.
pub const REQUEST_ID_FIELD: &str = "request_id";

/// Opaque session token handed out by `/api/generate`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Success body of `/api/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, deserialize_with = "opaque_id")]
    pub request_id: Option<RequestId>,
    /// Expected to be a sequence of `{Criteria, score}`; validated later.
    #[serde(default)]
    pub rubric: Value,
}

/// Success body of `/api/next`.
#[derive(Debug, Deserialize)]
pub struct NextResponse {
    #[serde(default)]
    pub message: Option<String>,
}

/// Failure body of both endpoints. Only a textual `detail` counts.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn detail_text(&self) -> Option<String> {
        match &self.detail {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            _ => None,
        }
    }
}

/// Try to extract the server's `detail` message from an error body.
pub fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.detail_text())
}

fn opaque_id<'de, D>(deserializer: D) -> Result<Option<RequestId>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) if !s.is_empty() => Some(RequestId(s)),
        Some(Value::Number(n)) => Some(RequestId(n.to_string())),
        _ => None,
    })
}

/// One rendered rubric line.
#[derive(Clone, Debug, PartialEq)]
pub struct RubricItem {
    pub criteria: String,
    pub score: String,
}

impl RubricItem {
    pub fn score_label(&self) -> String {
        format!("Score: {}", self.score)
    }
}

/// The `rubric` field was not a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidRubric;

/// Validate the rubric payload and project every entry to display text.
pub fn parse_rubric(payload: &Value) -> Result<Vec<RubricItem>, InvalidRubric> {
    let items = payload.as_array().ok_or(InvalidRubric)?;
    Ok(items
        .iter()
        .map(|item| RubricItem {
            criteria: display_value(item.get("Criteria")),
            score: display_value(item.get("score")),
        })
        .collect())
}

/// Text for a loosely typed JSON field. Whole floats print without a fraction
/// (`5.0` shows as `5`); absent values show as `n/a`.
fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "n/a".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => format_number(n),
        Some(other) => other.to_string(),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() < 1e15 {
                return format!("{}", f as i64);
            }
            return format!("{}", f);
        }
    }
    n.to_string()
}
