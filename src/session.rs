//! Session state: selected subject, the three upload buckets, the mirrored
//! file-input controls and the active request id.
//!
//! Everything here is synchronous and side-effect free apart from logging, so
//! the controller can be unit tested without a display surface or a backend.

use tracing::{debug, instrument, warn};

use crate::domain::{BucketKind, ImageFile, Subject};
use crate::error::SessionError;
use crate::protocol::RequestId;

/// Ordered files per bucket, indexed by `BucketKind`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Buckets([Vec<ImageFile>; 3]);

impl Buckets {
    pub fn get(&self, kind: BucketKind) -> &[ImageFile] {
        &self.0[kind.index()]
    }

    fn get_mut(&mut self, kind: BucketKind) -> &mut Vec<ImageFile> {
        &mut self.0[kind.index()]
    }

    pub fn all_non_empty(&self) -> bool {
        self.0.iter().all(|files| !files.is_empty())
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BucketKind, &[ImageFile])> {
        BucketKind::ALL.into_iter().map(move |kind| (kind, self.get(kind)))
    }
}

/// Which interaction delivered a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntakeSource {
    /// File picker: a batch with any non-image is rejected as a whole.
    Picker,
    /// Drag-and-drop: non-images are silently discarded before validation.
    Drop,
}

#[derive(Clone, Debug)]
pub struct SessionState {
    pub subject: Subject,
    pub request_id: Option<RequestId>,
    buckets: Buckets,
    /// What each file-input control currently holds.
    inputs: Buckets,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Subject::default())
    }
}

impl SessionState {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            request_id: None,
            buckets: Buckets::default(),
            inputs: Buckets::default(),
        }
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    pub fn bucket(&self, kind: BucketKind) -> &[ImageFile] {
        self.buckets.get(kind)
    }

    /// Contents of the file-input control for `kind`.
    pub fn input(&self, kind: BucketKind) -> &[ImageFile] {
        self.inputs.get(kind)
    }

    /// The generate gate.
    pub fn ready(&self) -> bool {
        self.buckets.all_non_empty()
    }

    pub fn select_subject(&mut self, subject: Subject) {
        debug!(target: "session", %subject, "Subject selected");
        self.subject = subject;
    }

    /// Accept a batch for `kind`, replacing the bucket on success.
    ///
    /// On the picker path the input control keeps whatever was picked even when
    /// the batch is rejected; the bucket is left untouched in that case.
    #[instrument(level = "debug", skip(self, files), fields(%kind, ?source, batch = files.len()))]
    pub fn intake(
        &mut self,
        kind: BucketKind,
        source: IntakeSource,
        files: Vec<ImageFile>,
    ) -> Result<&[ImageFile], SessionError> {
        let files = match source {
            IntakeSource::Picker => files,
            IntakeSource::Drop => {
                let before = files.len();
                let kept: Vec<ImageFile> = files.into_iter().filter(ImageFile::is_image).collect();
                if kept.len() != before {
                    debug!(target: "session", %kind, dropped = before - kept.len(), "Discarded non-image files from drop");
                }
                kept
            }
        };
        *self.inputs.get_mut(kind) = files.clone();

        let total = files.len();
        let rejected = files.iter().filter(|f| !f.is_image()).count();
        if rejected > 0 {
            warn!(target: "session", %kind, rejected, total, "Rejected batch containing non-image files");
            return Err(SessionError::NonImageBatch { bucket: kind, rejected, total });
        }

        *self.buckets.get_mut(kind) = files;
        Ok(self.buckets.get(kind))
    }

    /// Remove the file at `index` and resync the input control to the bucket.
    pub fn remove(&mut self, kind: BucketKind, index: usize) -> Result<ImageFile, SessionError> {
        let bucket = self.buckets.get_mut(kind);
        if index >= bucket.len() {
            return Err(SessionError::IndexOutOfRange { bucket: kind, index, len: bucket.len() });
        }
        let removed = bucket.remove(index);
        let synced = bucket.clone();
        *self.inputs.get_mut(kind) = synced;
        debug!(target: "session", %kind, index, file = %removed.name, "Removed file");
        Ok(removed)
    }

    /// Back to the initial buckets and no request id. The subject is kept.
    pub fn reset(&mut self) {
        self.buckets = Buckets::default();
        self.inputs = Buckets::default();
        self.request_id = None;
    }
}
