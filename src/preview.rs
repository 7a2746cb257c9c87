//! Thumbnail decoding for upload previews.
//!
//! Each file gets its own task keyed by `(bucket, file)`. Tasks finish in any
//! order; a finished thumbnail is only kept if that file is still shown in that
//! bucket when the result is collected.

use std::collections::{HashMap, HashSet};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::domain::{BucketKind, FileId, ImageFile};

type PreviewKey = (BucketKind, FileId);

/// `data:` URL for an image, the form a thumbnail element can display directly.
pub fn data_url(content_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", content_type, STANDARD.encode(bytes))
}

#[derive(Default)]
pub struct PreviewTasks {
    tasks: JoinSet<(PreviewKey, String)>,
    pending: HashSet<PreviewKey>,
    shown: HashSet<PreviewKey>,
    thumbnails: HashMap<PreviewKey, String>,
}

impl PreviewTasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the previews of `kind` mirror `files`, starting decodes for new files.
    ///
    /// Decodes run as tokio tasks; without a runtime they run inline.
    pub fn render(&mut self, kind: BucketKind, files: &[ImageFile]) {
        let in_runtime = Handle::try_current().is_ok();
        let wanted: HashSet<PreviewKey> = files.iter().map(|f| (kind, f.id)).collect();
        self.shown.retain(|key| key.0 != kind);
        self.thumbnails.retain(|key, _| key.0 != kind || wanted.contains(key));
        self.pending.retain(|key| key.0 != kind || wanted.contains(key));

        for file in files {
            let key = (kind, file.id);
            self.shown.insert(key);
            if self.thumbnails.contains_key(&key) || self.pending.contains(&key) {
                continue;
            }
            if !in_runtime {
                self.thumbnails.insert(key, data_url(&file.content_type, &file.bytes));
                continue;
            }
            self.pending.insert(key);
            let content_type = file.content_type.clone();
            let bytes = file.bytes.clone();
            self.tasks.spawn(async move { (key, data_url(&content_type, &bytes)) });
        }
        debug!(target: "session", %kind, files = files.len(), pending = self.pending.len(), "Previews rendered");
    }

    /// Take whatever decodes have completed, without waiting.
    pub fn collect_ready(&mut self) -> usize {
        let mut done = 0;
        while let Some(res) = self.tasks.try_join_next() {
            done += self.accept(res);
        }
        done
    }

    /// Wait for every outstanding decode.
    pub async fn settle(&mut self) -> usize {
        let mut done = 0;
        while let Some(res) = self.tasks.join_next().await {
            done += self.accept(res);
        }
        done
    }

    fn accept(&mut self, res: Result<(PreviewKey, String), tokio::task::JoinError>) -> usize {
        match res {
            Ok((key, url)) => {
                self.pending.remove(&key);
                if self.shown.contains(&key) {
                    self.thumbnails.insert(key, url);
                    1
                } else {
                    0
                }
            }
            Err(e) if e.is_cancelled() => 0,
            Err(e) => {
                warn!(target: "session", error = %e, "Thumbnail decode task failed");
                0
            }
        }
    }

    pub fn thumbnail(&self, kind: BucketKind, id: FileId) -> Option<&str> {
        self.thumbnails.get(&(kind, id)).map(String::as_str)
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Forget all previews and abort outstanding decodes.
    pub fn clear(&mut self) {
        self.tasks.abort_all();
        self.tasks = JoinSet::new();
        self.pending.clear();
        self.shown.clear();
        self.thumbnails.clear();
    }
}
