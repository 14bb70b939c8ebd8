//! The save-before-close flow.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::EventIn;
use mgui_core::logging::targets;

use super::Document;
use crate::alert::AlertResponse;
use crate::application::Application;
use crate::error::DocumentError;
use crate::window::Window;

/// The answer to "may this window close now?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Close now.
    Close,
    /// Stay open.
    Cancel,
    /// The user is being asked or a save is running. The window closes
    /// itself later if the outcome allows it.
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SaverState {
    Idle,
    Asking,
    Saving,
    Confirmed,
}

/// Asks to save a modified document before its window closes.
///
/// The flow, driven by [`check_close`](Self::check_close):
///
/// 1. An unmodified document closes at once.
/// 2. Otherwise the `save-changes` alert is shown and the close is pending.
/// 3. *Save* requests a save and closes the window once the document
///    reports `saved`; a failed save keeps it open. A save that cannot
///    start (no path, no saver attached) is shown as an error and the
///    window stays open, ready to ask again. *Don't Save* closes the
///    window. *Cancel* keeps it open.
///
/// The alert response is handled on a later main loop iteration, so a
/// presenter that answers synchronously does not re-enter the close.
pub struct SaverMixin {
    this: Weak<SaverMixin>,
    app: Weak<Application>,
    window: Weak<Window>,
    document: Weak<Document>,
    state: Cell<SaverState>,
    saved_in: EventIn<()>,
    failed_in: EventIn<DocumentError>,
}

impl SaverMixin {
    pub fn new(app: &Rc<Application>, window: &Rc<Window>, document: &Rc<Document>) -> Rc<Self> {
        let saver = Rc::new_cyclic(|weak: &Weak<SaverMixin>| SaverMixin {
            this: weak.clone(),
            app: Rc::downgrade(app),
            window: Rc::downgrade(window),
            document: Rc::downgrade(document),
            state: Cell::new(SaverState::Idle),
            saved_in: EventIn::bind_weak(weak.clone(), SaverMixin::on_saved),
            failed_in: EventIn::bind_weak(weak.clone(), SaverMixin::on_failed),
        });
        document.saved().add_route(&saver.saved_in);
        document.failed().add_route(&saver.failed_in);
        saver
    }

    /// Whether a question or a save is outstanding.
    pub fn is_pending(&self) -> bool {
        matches!(self.state.get(), SaverState::Asking | SaverState::Saving)
    }

    /// Decide whether the window may close, starting the save flow if the
    /// document has unsaved changes.
    pub fn check_close(&self) -> CloseDecision {
        match self.state.get() {
            SaverState::Confirmed => {
                self.state.set(SaverState::Idle);
                return CloseDecision::Close;
            }
            SaverState::Asking | SaverState::Saving => return CloseDecision::Pending,
            SaverState::Idle => {}
        }

        let (Some(document), Some(app)) = (self.document.upgrade(), self.app.upgrade()) else {
            return CloseDecision::Close;
        };
        if !document.is_modified() {
            return CloseDecision::Close;
        }

        self.state.set(SaverState::Asking);
        let this = self.this.clone();
        let loop_app = Rc::downgrade(&app);
        let shown = app.display_alert_with("save-changes", &[&document.title()], move |response| {
            if let Some(app) = loop_app.upgrade() {
                app.post_local(move || {
                    if let Some(saver) = this.upgrade() {
                        saver.respond(response);
                    }
                });
            }
        });
        match shown {
            Ok(()) => {
                tracing::debug!(target: targets::DOCUMENT, title = %document.title(), "asking to save before close");
                CloseDecision::Pending
            }
            Err(err) => {
                self.state.set(SaverState::Idle);
                app.display_error(&err);
                CloseDecision::Cancel
            }
        }
    }

    fn respond(&self, response: AlertResponse) {
        tracing::debug!(target: targets::DOCUMENT, ?response, "save-changes answered");
        match response {
            AlertResponse::Primary => self.save(),
            AlertResponse::Secondary => self.confirm_close(),
            AlertResponse::Cancel => self.state.set(SaverState::Idle),
        }
    }

    fn save(&self) {
        let Some(document) = self.document.upgrade() else {
            self.confirm_close();
            return;
        };
        self.state.set(SaverState::Saving);
        if let Err(err) = document.request_save() {
            self.state.set(SaverState::Idle);
            if let Some(app) = self.app.upgrade() {
                app.display_error(&err);
            }
        }
    }

    fn confirm_close(&self) {
        self.state.set(SaverState::Confirmed);
        match self.window.upgrade() {
            Some(window) => {
                window.close();
            }
            None => self.state.set(SaverState::Idle),
        }
    }

    fn on_saved(&self, _: &()) {
        if self.state.get() == SaverState::Saving {
            self.confirm_close();
        }
    }

    fn on_failed(&self, _: &DocumentError) {
        if self.state.get() == SaverState::Saving {
            self.state.set(SaverState::Idle);
        }
    }
}

impl fmt::Debug for SaverMixin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaverMixin")
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
