//! Image caption form: preview a picked image, send it to a caption endpoint,
//! and show the caption or an error.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod preview;
pub mod render;
pub mod state;
pub mod web;

pub use client::{CaptionService, HttpCaptionClient};
pub use config::Config;
pub use controller::FormController;
pub use error::{CaptionError, PreviewError};
pub use render::View;
pub use state::{Phase, SelectedFile, StatusMessage, UiState};
