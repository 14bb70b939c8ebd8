//! Alerts and error display.
//!
//! Alert texts live in an [`AlertCatalog`] keyed by resource name. A text
//! may contain the placeholders `^0` to `^9`, which are replaced by the
//! arguments given when the alert is shown. The backend's
//! [`AlertPresenter`] puts the formatted [`Alert`] on screen and reports
//! which button was pressed.
//!
//! ```
//! use mgui::alert::AlertCatalog;
//!
//! let catalog = AlertCatalog::default();
//! let alert = catalog.format("save-changes", &["notes.txt"]).unwrap();
//! assert_eq!(alert.message, "Save changes to \"notes.txt\" before closing?");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use mgui_core::logging::targets;

use crate::error::ResourceError;
use crate::resource::{ResourceEvent, ResourceReader};

/// Severity/icon of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AlertKind {
    #[default]
    Info,
    Warning,
    Error,
    Question,
}

impl FromStr for AlertKind {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "info" => Ok(AlertKind::Info),
            "warning" => Ok(AlertKind::Warning),
            "error" => Ok(AlertKind::Error),
            "question" => Ok(AlertKind::Question),
            _ => Err(ResourceError::InvalidValue {
                attribute: "kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Which button closed an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertResponse {
    Primary,
    Secondary,
    Cancel,
}

/// An alert template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSpec {
    pub kind: AlertKind,
    pub text: String,
    pub primary: String,
    pub secondary: Option<String>,
    pub cancel: Option<String>,
}

impl AlertSpec {
    /// A single-button alert.
    pub fn new(kind: AlertKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            primary: "OK".to_string(),
            secondary: None,
            cancel: None,
        }
    }

    pub fn with_primary(mut self, label: impl Into<String>) -> Self {
        self.primary = label.into();
        self
    }

    pub fn with_secondary(mut self, label: impl Into<String>) -> Self {
        self.secondary = Some(label.into());
        self
    }

    pub fn with_cancel(mut self, label: impl Into<String>) -> Self {
        self.cancel = Some(label.into());
        self
    }

    /// Substitute the placeholders and produce an alert.
    pub fn format(&self, args: &[&str]) -> Alert {
        Alert {
            kind: self.kind,
            message: substitute(&self.text, args),
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            cancel: self.cancel.clone(),
        }
    }
}

/// Replace `^0`..`^9` with `args`. Missing arguments become empty; a `^`
/// not followed by a digit is kept.
fn substitute(text: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '^'
            && let Some(index) = chars.peek().and_then(|d| d.to_digit(10))
        {
            chars.next();
            out.push_str(args.get(index as usize).copied().unwrap_or(""));
        } else {
            out.push(c);
        }
    }
    out
}

/// A formatted alert, ready to present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub primary: String,
    pub secondary: Option<String>,
    pub cancel: Option<String>,
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Callback receiving the button that closed an alert.
pub type AlertCallback = Box<dyn FnOnce(AlertResponse)>;

/// Shows alerts. Implemented by each backend.
///
/// `respond` is called exactly once, possibly before `present` returns.
pub trait AlertPresenter {
    fn present(&self, alert: Alert, respond: AlertCallback);
}

// ============================================================================
// Catalog
// ============================================================================

/// Alert templates by resource name.
///
/// The default catalog contains `error`, `save-changes` and `save-failed`.
#[derive(Debug, Clone)]
pub struct AlertCatalog {
    specs: HashMap<String, AlertSpec>,
}

impl Default for AlertCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        catalog.insert("error", AlertSpec::new(AlertKind::Error, "^0"));
        catalog.insert(
            "save-changes",
            AlertSpec::new(AlertKind::Question, "Save changes to \"^0\" before closing?")
                .with_primary("Save")
                .with_secondary("Don't Save")
                .with_cancel("Cancel"),
        );
        catalog.insert(
            "save-failed",
            AlertSpec::new(AlertKind::Error, "\"^0\" could not be saved: ^1"),
        );
        catalog
    }
}

impl AlertCatalog {
    /// A catalog without the built-in entries.
    pub fn empty() -> Self {
        Self {
            specs: HashMap::new(),
        }
    }

    /// Built-in entries plus everything in `xml`.
    pub fn from_xml(xml: &str) -> Result<Self, ResourceError> {
        let mut catalog = Self::default();
        catalog.load_xml(xml)?;
        Ok(catalog)
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: impl Into<String>, spec: AlertSpec) -> Option<AlertSpec> {
        self.specs.insert(name.into(), spec)
    }

    pub fn get(&self, name: &str) -> Option<&AlertSpec> {
        self.specs.get(name)
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Format the template `name` with `args`.
    pub fn format(&self, name: &str, args: &[&str]) -> Result<Alert, ResourceError> {
        self.get(name)
            .map(|spec| spec.format(args))
            .ok_or_else(|| ResourceError::UnknownAlert(name.to_string()))
    }

    /// Load templates from
    /// `<alerts><alert id kind primary secondary cancel>text</alert></alerts>`.
    ///
    /// Returns the number of templates loaded. Entries with an existing id
    /// replace the old template.
    pub fn load_xml(&mut self, xml: &str) -> Result<usize, ResourceError> {
        let mut reader = ResourceReader::new(xml);
        let mut loaded = 0;
        let mut current: Option<(String, AlertSpec)> = None;

        while let Some(event) = reader.next()? {
            match event {
                ResourceEvent::Start(element) => match element.name.as_str() {
                    "alerts" if current.is_none() => {}
                    "alert" if current.is_none() => {
                        let id = element.required("id")?.to_string();
                        let kind = element.attr("kind").map_or(Ok(AlertKind::Info), str::parse)?;
                        let mut spec = AlertSpec::new(kind, "");
                        if let Some(primary) = element.attr("primary") {
                            spec = spec.with_primary(primary);
                        }
                        if let Some(secondary) = element.attr("secondary") {
                            spec = spec.with_secondary(secondary);
                        }
                        if let Some(cancel) = element.attr("cancel") {
                            spec = spec.with_cancel(cancel);
                        }
                        current = Some((id, spec));
                    }
                    _ => return Err(element.unexpected()),
                },
                ResourceEvent::Text(text) => {
                    if let Some((_, spec)) = &mut current {
                        spec.text.push_str(&text);
                    }
                }
                ResourceEvent::End(name) => {
                    if name == "alert"
                        && let Some((id, spec)) = current.take()
                    {
                        self.insert(id, spec);
                        loaded += 1;
                    }
                }
            }
        }
        tracing::debug!(target: targets::RESOURCE, loaded, "alert templates loaded");
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitution() {
        assert_eq!(substitute("^0 and ^1", &["a", "b"]), "a and b");
        assert_eq!(substitute("^1^0", &["x", "y"]), "yx");
        assert_eq!(substitute("missing: [^3]", &["a"]), "missing: []");
        assert_eq!(substitute("caret ^ alone ^", &[]), "caret ^ alone ^");
        assert_eq!(substitute("^^0", &["z"]), "^z");
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = AlertCatalog::default();
        let alert = catalog.format("save-failed", &["a.txt", "disk full"]).unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert_eq!(alert.message, "\"a.txt\" could not be saved: disk full");
        assert_eq!(alert.primary, "OK");
        assert!(matches!(
            catalog.format("nope", &[]),
            Err(ResourceError::UnknownAlert(name)) if name == "nope"
        ));
    }

    #[test]
    fn test_load_xml() {
        let xml = r#"
            <alerts>
                <alert id="revert" kind="warning" primary="Revert" cancel="Cancel">
                    Revert "^0" to the saved version?
                </alert>
                <alert id="error">Something went wrong: ^0</alert>
            </alerts>
        "#;
        let catalog = AlertCatalog::from_xml(xml).unwrap();
        let revert = catalog.format("revert", &["doc"]).unwrap();
        assert_eq!(revert.kind, AlertKind::Warning);
        assert_eq!(revert.message, "Revert \"doc\" to the saved version?");
        assert_eq!(revert.cancel.as_deref(), Some("Cancel"));
        assert_eq!(revert.secondary, None);

        let error = catalog.format("error", &["boom"]).unwrap();
        assert_eq!(error.message, "Something went wrong: boom");
        assert!(catalog.get("save-changes").is_some());
    }

    #[test]
    fn test_load_xml_errors() {
        let mut catalog = AlertCatalog::empty();
        assert!(matches!(
            catalog.load_xml("<alerts><alert kind=\"info\">x</alert></alerts>"),
            Err(ResourceError::MissingAttribute { attribute: "id", .. })
        ));
        assert!(matches!(
            catalog.load_xml("<alerts><alert id=\"a\" kind=\"loud\">x</alert></alerts>"),
            Err(ResourceError::InvalidValue { attribute: "kind", .. })
        ));
        assert!(matches!(
            catalog.load_xml("<alerts><button/></alerts>"),
            Err(ResourceError::UnexpectedElement(name)) if name == "button"
        ));
        assert!(catalog.is_empty());
    }
}
