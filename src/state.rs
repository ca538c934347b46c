//! UI state of the caption form and the transitions that are allowed to touch it.
//!
//! Nothing outside this module mutates [`UiState`] fields directly. Every async
//! operation is started through a transition that hands out a ticket, and its
//! completion is applied through a transition that checks the ticket against
//! the current generation so late results for an older selection are dropped.

use bytes::Bytes;
use serde::Serialize;

use crate::error::{CaptionError, PreviewError, PREVIEW_FAILED_MESSAGE};

pub const SUBMITTING_MESSAGE: &str = "Uploading image and generating caption...";
pub const SUCCESS_MESSAGE: &str = "Caption generated successfully!";

/// A file picked by the user. At most one is held at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, content_type: Option<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type,
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Submitting,
    Succeeded,
    Failed,
}

/// Stamped on a file read when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewTicket(u64);

/// Stamped on a caption request when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitTicket(u64);

#[derive(Debug, Default)]
pub struct UiState {
    phase: Phase,
    status: Option<StatusMessage>,
    preview: Option<String>,
    caption: Option<String>,
    selected: Option<SelectedFile>,
    read_generation: u64,
    submit_generation: u64,
    read_pending: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    /// Identifies the read that produced the current preview. Changes whenever
    /// a different file is previewed.
    pub fn preview_id(&self) -> Option<u64> {
        self.preview.as_ref().map(|_| self.read_generation)
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn result_panel_visible(&self) -> bool {
        self.preview.is_some() || self.caption.is_some()
    }

    /// A file read or a caption request is still outstanding.
    pub fn is_busy(&self) -> bool {
        self.read_pending || self.phase == Phase::Submitting
    }

    /// Replaces the selection. Returns a ticket when a preview read has to be
    /// started for the new file.
    ///
    /// Any submission still in flight is orphaned: its ticket stops matching.
    pub fn select_file(&mut self, file: Option<SelectedFile>) -> Option<PreviewTicket> {
        self.reset_result();
        self.preview = None;
        self.phase = Phase::Idle;
        self.submit_generation += 1;
        self.read_generation += 1;
        self.selected = file;

        if self.selected.is_none() {
            self.read_pending = false;
            return None;
        }
        self.read_pending = true;
        Some(PreviewTicket(self.read_generation))
    }

    /// Applies a finished read. Returns `false` when the read was stale.
    pub fn apply_preview(
        &mut self,
        ticket: PreviewTicket,
        result: Result<String, PreviewError>,
    ) -> bool {
        if ticket.0 != self.read_generation {
            return false;
        }
        self.read_pending = false;
        match result {
            Ok(src) => self.preview = Some(src),
            Err(_) => self.status = Some(StatusMessage::error(PREVIEW_FAILED_MESSAGE)),
        }
        true
    }

    /// Starts a submission cycle. On success the caller must issue exactly one
    /// caption request for the returned file.
    pub fn begin_submit(&mut self) -> Result<(SubmitTicket, SelectedFile), CaptionError> {
        self.phase = Phase::Validating;
        self.reset_result();

        let Some(file) = self.selected.clone() else {
            self.phase = Phase::Rejected;
            self.status = Some(StatusMessage::error(CaptionError::NoFileSelected.to_string()));
            return Err(CaptionError::NoFileSelected);
        };

        self.phase = Phase::Submitting;
        self.status = Some(StatusMessage::info(SUBMITTING_MESSAGE));
        self.submit_generation += 1;
        Ok((SubmitTicket(self.submit_generation), file))
    }

    /// Applies a finished caption request. Returns `false` when it was stale.
    pub fn finish_submit(
        &mut self,
        ticket: SubmitTicket,
        result: Result<String, CaptionError>,
    ) -> bool {
        if ticket.0 != self.submit_generation {
            return false;
        }
        match result {
            Ok(caption) => {
                self.caption = Some(caption);
                self.status = Some(StatusMessage::info(SUCCESS_MESSAGE));
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                self.status = Some(StatusMessage::error(err.to_string()));
                self.phase = Phase::Failed;
            }
        }
        true
    }

    fn reset_result(&mut self) {
        self.status = None;
        self.caption = None;
    }
}
