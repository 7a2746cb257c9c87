//! Domain models used by the client: subjects, upload buckets and image file handles.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Which subject the rubric is generated for?
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
  #[default]
  Math,
  Physics,
  Chemistry,
}

impl Subject {
  pub const ALL: [Subject; 3] = [Subject::Math, Subject::Physics, Subject::Chemistry];

  /// Value sent in the `subject` form field.
  pub fn as_str(self) -> &'static str {
    match self {
      Subject::Math => "math",
      Subject::Physics => "physics",
      Subject::Chemistry => "chemistry",
    }
  }
}

impl fmt::Display for Subject {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Subject {
  type Err = SessionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Subject::ALL
      .into_iter()
      .find(|subject| subject.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| SessionError::UnknownSubject(s.to_string()))
  }
}

/// One of the three named upload collections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketKind {
  Question,
  Rubrics,
  Solution,
}

impl BucketKind {
  /// Display / iteration order of the upload sections.
  pub const ALL: [BucketKind; 3] = [BucketKind::Question, BucketKind::Rubrics, BucketKind::Solution];

  pub fn as_str(self) -> &'static str {
    match self {
      BucketKind::Question => "question",
      BucketKind::Rubrics => "rubrics",
      BucketKind::Solution => "solution",
    }
  }

  /// Multipart field name every file of this bucket is tagged with.
  pub fn field_name(self) -> &'static str {
    match self {
      BucketKind::Question => "question_images",
      BucketKind::Rubrics => "rubrics_images",
      BucketKind::Solution => "solution_images",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      BucketKind::Question => "Question",
      BucketKind::Rubrics => "Rubrics",
      BucketKind::Solution => "Solution",
    }
  }

  pub(crate) fn index(self) -> usize {
    match self {
      BucketKind::Question => 0,
      BucketKind::Rubrics => 1,
      BucketKind::Solution => 2,
    }
  }
}

impl fmt::Display for BucketKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for BucketKind {
  type Err = SessionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BucketKind::ALL
      .into_iter()
      .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| SessionError::UnknownBucket(s.to_string()))
  }
}

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle identity; keys preview tasks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(u64);

impl FileId {
  fn next() -> Self {
    FileId(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed))
  }
}

impl fmt::Display for FileId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// A selected file. Cloning shares the underlying bytes.
#[derive(Clone, Debug)]
pub struct ImageFile {
  pub id: FileId,
  pub name: String,
  pub content_type: String,
  pub bytes: Arc<[u8]>,
}

impl PartialEq for ImageFile {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}
impl Eq for ImageFile {}

impl ImageFile {
  pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
    Self {
      id: FileId::next(),
      name: name.into(),
      content_type: content_type.into(),
      bytes: bytes.into(),
    }
  }

  /// Read a file from disk; the content type comes from its extension.
  pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await?;
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| path.display().to_string());
    Ok(Self::new(name, content_type_for_path(path), bytes))
  }

  /// The intake filter: only `image/*` content types are accepted.
  pub fn is_image(&self) -> bool {
    self.content_type.starts_with("image/")
  }

  pub fn size(&self) -> usize {
    self.bytes.len()
  }
}

/// Guess a MIME type from the extension, the way a file picker reports it.
pub fn content_type_for_path(path: &Path) -> &'static str {
  let ext = path
    .extension()
    .map(|e| e.to_string_lossy().to_ascii_lowercase())
    .unwrap_or_default();
  match ext.as_str() {
    "png" => "image/png",
    "jpg" | "jpeg" | "jfif" => "image/jpeg",
    "gif" => "image/gif",
    "webp" => "image/webp",
    "bmp" => "image/bmp",
    "svg" => "image/svg+xml",
    "tif" | "tiff" => "image/tiff",
    "ico" => "image/x-icon",
    "avif" => "image/avif",
    "heic" => "image/heic",
    "heif" => "image/heif",
    _ => "application/octet-stream",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn subject_parsing_is_case_insensitive_and_closed() {
    assert_eq!("Physics".parse::<Subject>().unwrap(), Subject::Physics);
    assert_eq!(" chemistry ".parse::<Subject>().unwrap(), Subject::Chemistry);
    assert!(matches!("biology".parse::<Subject>(), Err(SessionError::UnknownSubject(s)) if s == "biology"));
    assert_eq!(Subject::default(), Subject::Math);
  }

  #[test]
  fn bucket_field_names_match_the_form_contract() {
    assert_eq!(BucketKind::Question.field_name(), "question_images");
    assert_eq!(BucketKind::Rubrics.field_name(), "rubrics_images");
    assert_eq!(BucketKind::Solution.field_name(), "solution_images");
    assert_eq!("RUBRICS".parse::<BucketKind>().unwrap(), BucketKind::Rubrics);
  }

  #[test]
  fn image_filter_uses_content_type_prefix() {
    let png = ImageFile::new("a.png", "image/png", vec![1u8, 2, 3]);
    let pdf = ImageFile::new("a.pdf", "application/pdf", vec![1u8]);
    let blank = ImageFile::new("mystery", "", Vec::<u8>::new());
    assert!(png.is_image());
    assert!(!pdf.is_image());
    assert!(!blank.is_image());
  }

  #[test]
  fn file_ids_are_unique_and_clones_share_identity() {
    let a = ImageFile::new("a.png", "image/png", vec![0u8]);
    let b = ImageFile::new("a.png", "image/png", vec![0u8]);
    assert_ne!(a.id, b.id);
    assert_eq!(a.clone(), a);
  }

  #[test]
  fn extension_table() {
    assert_eq!(content_type_for_path(Path::new("x/PAGE.JPG")), "image/jpeg");
    assert_eq!(content_type_for_path(Path::new("scan.webp")), "image/webp");
    assert_eq!(content_type_for_path(Path::new("notes.txt")), "application/octet-stream");
    assert_eq!(content_type_for_path(Path::new("noext")), "application/octet-stream");
  }
}
