//! Error types for mgui.
//!
//! Each subsystem has its own error enum; [`GuiError`] wraps all of them for
//! callers that do not care which layer failed.
//!
//! Failures that happen inside native callbacks or command activations
//! cannot be returned to anyone. They are logged and handed to the
//! [`ErrorReporter`] installed for the current thread (the application
//! installs one that shows an error alert).

use std::cell::RefCell;
use std::error::Error as StdError;
use std::rc::Rc;

use mgui_core::CoreError;
use mgui_core::logging::targets;
use thiserror::Error;

use crate::command::ParameterKind;
use crate::keys::KeyParseError;

/// Boxed error used where the concrete type is not known.
pub type BoxError = Box<dyn StdError + 'static>;

/// The main error type for mgui operations.
#[derive(Error, Debug)]
pub enum GuiError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    Native(#[from] NativeError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    /// An application already exists on this thread.
    #[error("an application is already running on this thread")]
    AlreadyInitialized,

    /// The operation needs the async execute queue, which is disabled.
    #[error("the async execute queue is disabled in the application configuration")]
    AsyncDisabled,

    /// A blocking handoff was requested from the UI thread itself.
    #[error("cannot block the UI thread waiting for itself")]
    WouldBlockUiThread,

    /// The platform backend failed.
    #[error("backend error: {0}")]
    Backend(String),
}

/// A specialized Result type for mgui operations.
pub type Result<T> = std::result::Result<T, GuiError>;

/// Errors from the command and action system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The command was used before `register()`.
    #[error("command `{name}` is not registered")]
    NotRegistered { name: String },

    /// The object the command is bound to has been dropped.
    #[error("the owner of command `{name}` no longer exists")]
    OwnerGone { name: String },

    /// An action with the same name already exists in the registrar.
    #[error("duplicate action name `{name}`")]
    DuplicateAction { name: String },

    /// No action with this name exists.
    #[error("unknown action `{name}`")]
    UnknownAction { name: String },

    /// The activation value does not match the action's parameter type.
    #[error("action `{name}` expects a {expected} parameter, got {got}")]
    ParameterMismatch {
        name: String,
        expected: ParameterKind,
        got: ParameterKind,
    },

    /// The action is disabled.
    #[error("action `{name}` is disabled")]
    Disabled { name: String },
}

/// Errors from the view tree.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// The view id does not exist in this tree.
    #[error("invalid view id")]
    InvalidView,

    /// The root view cannot be removed or reparented.
    #[error("operation not allowed on the root view")]
    RootView,
}

/// Errors from the native-callback adapter.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NativeError {
    /// The native signal delivered the wrong number of arguments.
    #[error("expected {expected} native arguments, got {got}")]
    ArgumentCount { expected: usize, got: usize },

    /// A native argument had the wrong type.
    #[error("native argument {index}: expected {expected}, got {got}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        got: &'static str,
    },

    /// The slot is already connected to a native signal.
    #[error("slot is already connected")]
    AlreadyConnected,

    /// The slot is not connected.
    #[error("slot is not connected")]
    NotConnected,

    /// The native object does not exist (or was destroyed).
    #[error("unknown native object")]
    UnknownObject,

    /// A handler panicked; the panic was contained.
    #[error("native callback `{signal}` panicked: {message}")]
    HandlerPanicked { signal: String, message: String },
}

/// Errors from resource builders (menus, alerts).
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// A required attribute is missing.
    #[error("<{element}> is missing the `{attribute}` attribute")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    /// An element appeared where it is not allowed.
    #[error("unexpected element <{0}>")]
    UnexpectedElement(String),

    /// An attribute value could not be interpreted.
    #[error("invalid value `{value}` for `{attribute}`")]
    InvalidValue { attribute: &'static str, value: String },

    /// A menu item carries an unparsable accelerator.
    #[error("invalid accelerator: {0}")]
    Accelerator(#[from] KeyParseError),

    /// The alert catalog has no entry with this name.
    #[error("unknown alert resource `{0}`")]
    UnknownAlert(String),

    /// The document ended before every element was closed.
    #[error("unexpected end of resource")]
    UnexpectedEof,
}

/// Errors from the document layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// A loader or saver reported a failure.
    #[error("could not access \"{path}\": {message}")]
    Io { path: String, message: String },

    /// The document has no file to save to.
    #[error("the document has never been saved")]
    NoPath,

    /// Nothing is routed to the document's save requests.
    #[error("no saver is attached to the document")]
    NoSaver,

    /// The document was closed.
    #[error("the document is closed")]
    Closed,
}

// ============================================================================
// Error reporting for contained failures
// ============================================================================

/// Receives failures that cannot be returned to a caller.
pub trait ErrorReporter {
    /// Report a contained failure. `context` names where it was caught.
    fn report(&self, context: &str, error: &dyn StdError);
}

thread_local! {
    static REPORTER: RefCell<Option<Rc<dyn ErrorReporter>>> = const { RefCell::new(None) };
}

/// Install the reporter for the current thread, returning the previous one.
pub fn set_error_reporter(
    reporter: Option<Rc<dyn ErrorReporter>>,
) -> Option<Rc<dyn ErrorReporter>> {
    REPORTER.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), reporter))
}

/// Log a contained failure and pass it to the current reporter, if any.
pub fn report_error(context: &str, error: &dyn StdError) {
    tracing::error!(target: targets::APPLICATION, context, %error, "contained failure");
    // Clone out so the reporter may replace itself while running.
    let reporter = REPORTER.with(|slot| slot.borrow().clone());
    if let Some(reporter) = reporter {
        reporter.report(context, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Collect(RefCell<Vec<String>>);

    impl ErrorReporter for Collect {
        fn report(&self, context: &str, error: &dyn StdError) {
            self.0.borrow_mut().push(format!("{context}: {error}"));
        }
    }

    #[test]
    fn test_report_reaches_installed_reporter() {
        let collect = Rc::new(Collect(RefCell::new(Vec::new())));
        let previous = set_error_reporter(Some(collect.clone()));

        report_error("slot", &ViewError::InvalidView);
        assert_eq!(*collect.0.borrow(), vec!["slot: invalid view id".to_string()]);

        set_error_reporter(previous);
        report_error("slot", &ViewError::RootView);
        assert_eq!(collect.0.borrow().len(), 1);
    }

    #[test]
    fn test_wrapping() {
        let err: GuiError = CommandError::NotRegistered { name: "app.quit".into() }.into();
        assert_eq!(err.to_string(), "command `app.quit` is not registered");
        assert!(matches!(err, GuiError::Command(_)));
    }
}
