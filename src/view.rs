//! Declarative view of the controller: what a display surface should show.
//!
//! `project` is a pure function of state, so rendering twice from the same
//! state yields the same view. `render_text` is the terminal surface.

use std::fmt::Write as _;

use serde::Serialize;

use crate::banner::{BannerKind, BannerSlot};
use crate::controller::UiState;
use crate::domain::{BucketKind, Subject};
use crate::preview::PreviewTasks;
use crate::session::SessionState;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct View {
    pub subjects: Vec<SubjectOption>,
    /// Shown immediately before the upload sections.
    pub banner: Option<BannerView>,
    pub sections: Vec<UploadSection>,
    pub generate_enabled: bool,
    pub loading: bool,
    pub results_visible: bool,
    pub rubric: Vec<RubricEntry>,
    pub next_visible: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SubjectOption {
    pub subject: Subject,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BannerView {
    pub kind: &'static str,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UploadSection {
    pub bucket: BucketKind,
    pub previews: Vec<PreviewEntry>,
    /// File names currently held by the section's file-input control.
    pub input_files: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PreviewEntry {
    /// Index the removal control removes.
    pub index: usize,
    pub file_name: String,
    /// `data:` URL once decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RubricEntry {
    pub criteria: String,
    pub score_label: String,
}

pub fn project(session: &SessionState, ui: &UiState, banners: &BannerSlot, previews: &PreviewTasks) -> View {
    let submitting = ui.flow == crate::controller::FlowState::Submitting;

    let subjects = Subject::ALL
        .into_iter()
        .map(|subject| SubjectOption { subject, active: subject == session.subject })
        .collect();

    let banner = banners.visible().map(|b| BannerView { kind: b.kind.as_str(), text: b.text.clone() });

    let sections = BucketKind::ALL
        .into_iter()
        .map(|bucket| UploadSection {
            bucket,
            previews: session
                .bucket(bucket)
                .iter()
                .enumerate()
                .map(|(index, file)| PreviewEntry {
                    index,
                    file_name: file.name.clone(),
                    thumbnail: previews.thumbnail(bucket, file.id).map(str::to_string),
                })
                .collect(),
            input_files: session.input(bucket).iter().map(|f| f.name.clone()).collect(),
        })
        .collect();

    let rubric = ui
        .rubric
        .iter()
        .map(|item| RubricEntry { criteria: item.criteria.clone(), score_label: item.score_label() })
        .collect();

    View {
        subjects,
        banner,
        sections,
        generate_enabled: session.ready() && !submitting,
        loading: submitting,
        results_visible: ui.results_visible,
        rubric,
        next_visible: ui.next_visible,
    }
}

/// Plain-text rendering for terminals.
pub fn render_text(view: &View) -> String {
    let mut out = String::new();

    let subjects: Vec<String> = view
        .subjects
        .iter()
        .map(|o| if o.active { format!("[{}]", o.subject) } else { o.subject.to_string() })
        .collect();
    let _ = writeln!(out, "Subject: {}", subjects.join("  "));

    if let Some(b) = &view.banner {
        let tag = if b.kind == BannerKind::Error.as_str() { "!!" } else { "ok" };
        let _ = writeln!(out, "{} {}", tag, b.text);
    }

    for section in &view.sections {
        let _ = writeln!(out, "{} ({} files)", section.bucket.label(), section.previews.len());
        for p in &section.previews {
            let state = if p.thumbnail.is_some() { "preview ready" } else { "loading preview" };
            let _ = writeln!(out, "  {}. {} [{}] (x)", p.index, p.file_name, state);
        }
    }

    let generate = if view.generate_enabled { "enabled" } else { "disabled" };
    let _ = writeln!(out, "Generate: {}", generate);
    if view.loading {
        let _ = writeln!(out, "Generating rubric...");
    }

    if view.results_visible {
        let _ = writeln!(out, "Rubric:");
        for entry in &view.rubric {
            let _ = writeln!(out, "  - {}  {}", entry.criteria, entry.score_label);
        }
    }
    if view.next_visible {
        let _ = writeln!(out, "Next question available (`next`)");
    }
    out
}
