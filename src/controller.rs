//! The form controller: one task owns [`UiState`] and applies events in order.
//!
//! File reads and caption requests run as their own tasks and report back to
//! the loop as completion events. After every event the loop publishes a fresh
//! [`View`] on a watch channel.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use crate::client::CaptionService;
use crate::error::{CaptionError, PreviewError};
use crate::preview;
use crate::render::View;
use crate::state::{PreviewTicket, SelectedFile, SubmitTicket, UiState};

#[derive(Debug)]
enum FormEvent {
    FileSelected(Option<SelectedFile>),
    Submit,
    PreviewRead {
        ticket: PreviewTicket,
        result: Result<String, PreviewError>,
    },
    CaptionReturned {
        ticket: SubmitTicket,
        result: Result<String, CaptionError>,
    },
}

/// An event plus an optional ack fired once its view has been published.
struct Command {
    event: FormEvent,
    applied: Option<oneshot::Sender<()>>,
}

impl From<FormEvent> for Command {
    fn from(event: FormEvent) -> Self {
        Self {
            event,
            applied: None,
        }
    }
}

/// Handle to a running controller loop. Cheap to clone.
#[derive(Clone)]
pub struct FormController {
    commands: mpsc::UnboundedSender<Command>,
    view: watch::Receiver<View>,
}

impl FormController {
    /// Spawns the controller loop on the current tokio runtime.
    pub fn spawn(service: Arc<dyn CaptionService>) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let state = UiState::new();
        let (view_tx, view_rx) = watch::channel(View::from(&state));

        let event_loop = EventLoop {
            state,
            service,
            commands_tx: commands_tx.clone(),
            commands_rx,
            view_tx,
        };
        tokio::spawn(event_loop.run());

        Self {
            commands: commands_tx,
            view: view_rx,
        }
    }

    /// Returns once the selection is reflected in [`FormController::view`].
    /// The preview read itself may still be running.
    pub async fn select_file(&self, file: Option<SelectedFile>) {
        self.dispatch(FormEvent::FileSelected(file)).await;
    }

    /// Returns once validation has run and the in-progress or rejected status
    /// is visible. The caption request itself may still be running.
    pub async fn submit(&self) {
        self.dispatch(FormEvent::Submit).await;
    }

    /// Snapshot of what is currently on screen.
    pub fn view(&self) -> View {
        self.view.borrow().clone()
    }

    /// Runs `f` against the current view without cloning it.
    pub fn with_view<R>(&self, f: impl FnOnce(&View) -> R) -> R {
        f(&self.view.borrow())
    }

    /// Receiver that is notified after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<View> {
        self.view.clone()
    }

    async fn dispatch(&self, event: FormEvent) {
        let (applied_tx, applied_rx) = oneshot::channel();
        let command = Command {
            event,
            applied: Some(applied_tx),
        };
        if self.commands.send(command).is_err() {
            tracing::error!("form controller loop has stopped; event dropped");
            return;
        }
        if applied_rx.await.is_err() {
            tracing::error!("form controller loop stopped before applying event");
        }
    }
}

struct EventLoop {
    state: UiState,
    service: Arc<dyn CaptionService>,
    commands_tx: mpsc::UnboundedSender<Command>,
    commands_rx: mpsc::UnboundedReceiver<Command>,
    view_tx: watch::Sender<View>,
}

impl EventLoop {
    async fn run(mut self) {
        loop {
            tokio::select! {
                Some(Command { event, applied }) = self.commands_rx.recv() => {
                    self.handle(event);
                    // Receivers may all be gone; closure is picked up next turn.
                    let _ = self.view_tx.send(View::from(&self.state));
                    if let Some(applied) = applied {
                        let _ = applied.send(());
                    }
                }
                _ = self.view_tx.closed() => break,
            }
        }
        tracing::debug!("form controller loop finished");
    }

    fn handle(&mut self, event: FormEvent) {
        match event {
            FormEvent::FileSelected(file) => self.handle_file_selected(file),
            FormEvent::Submit => self.handle_submit(),
            FormEvent::PreviewRead { ticket, result } => {
                if let Err(err) = &result {
                    tracing::warn!("preview read failed: {err}");
                }
                if !self.state.apply_preview(ticket, result) {
                    tracing::debug!(?ticket, "dropping stale preview read");
                }
            }
            FormEvent::CaptionReturned { ticket, result } => {
                match &result {
                    Ok(caption) => tracing::info!(%caption, "caption received"),
                    Err(err) => tracing::warn!("caption request failed: {err}"),
                }
                if !self.state.finish_submit(ticket, result) {
                    tracing::debug!(?ticket, "dropping stale caption result");
                }
            }
        }
    }

    fn handle_file_selected(&mut self, file: Option<SelectedFile>) {
        let ticket = self.state.select_file(file);
        let (Some(ticket), Some(file)) = (ticket, self.state.selected().cloned()) else {
            tracing::debug!("selection cleared");
            return;
        };

        tracing::info!(file = %file.name, bytes = file.bytes.len(), "file selected");
        let commands = self.commands_tx.clone();
        tokio::spawn(async move {
            let result = preview::read_data_url(&file).await;
            let _ = commands.send(FormEvent::PreviewRead { ticket, result }.into());
        });
    }

    fn handle_submit(&mut self) {
        let (ticket, file) = match self.state.begin_submit() {
            Ok(started) => started,
            Err(err) => {
                tracing::warn!("submission rejected: {err}");
                return;
            }
        };

        let service = Arc::clone(&self.service);
        let commands = self.commands_tx.clone();
        tokio::spawn(async move {
            let result = service.caption(&file).await;
            let _ = commands.send(FormEvent::CaptionReturned { ticket, result }.into());
        });
    }
}
