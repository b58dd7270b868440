//! YAML and JSON documents for events and symptom templates.
//!
//! Documents use the camelCase shape of [`Event`] and [`SymptomTemplate`]. Decode failures
//! report the path of the failing field (for example `actions[0]` or `vitals.sbp`).

use crate::event::Event;
use crate::template::SymptomTemplate;
use crate::{AuthoringError, AuthoringResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Serialization format of a document file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension (`.yaml`, `.yml` or `.json`).
    pub fn from_path(path: &Path) -> AuthoringResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(AuthoringError::InvalidInput(format!(
                "cannot tell document format from {} (expected .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }
}

fn schema_error(what: &str, path: String, source: impl std::fmt::Display) -> AuthoringError {
    let path = if path.is_empty() || path == "." {
        "<root>"
    } else {
        path.as_str()
    };
    AuthoringError::Translation(format!("{what} schema mismatch at {path}: {source}"))
}

fn parse_yaml<T: DeserializeOwned>(what: &str, text: &str) -> AuthoringResult<T> {
    let deserializer = serde_yaml::Deserializer::from_str(text);
    serde_path_to_error::deserialize(deserializer).map_err(|err| {
        let path = err.path().to_string();
        schema_error(what, path, err.into_inner())
    })
}

fn parse_json<T: DeserializeOwned>(what: &str, text: &str) -> AuthoringResult<T> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let value = serde_path_to_error::deserialize(&mut deserializer).map_err(|err| {
        let path = err.path().to_string();
        schema_error(what, path, err.into_inner())
    })?;
    deserializer
        .end()
        .map_err(|e| AuthoringError::Translation(format!("{what} has trailing content: {e}")))?;
    Ok(value)
}

fn render<T: Serialize>(what: &str, value: &T, format: DocumentFormat) -> AuthoringResult<String> {
    match format {
        DocumentFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|e| AuthoringError::Translation(format!("Failed to serialize {what}: {e}"))),
        DocumentFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| AuthoringError::Translation(format!("Failed to serialize {what}: {e}"))),
    }
}

fn parse<T: DeserializeOwned>(what: &str, text: &str, format: DocumentFormat) -> AuthoringResult<T> {
    match format {
        DocumentFormat::Yaml => parse_yaml(what, text),
        DocumentFormat::Json => parse_json(what, text),
    }
}

fn read_file(path: &Path) -> AuthoringResult<String> {
    std::fs::read_to_string(path).map_err(|source| AuthoringError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, contents: &str) -> AuthoringResult<()> {
    std::fs::write(path, contents).map_err(|source| AuthoringError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Event document operations.
///
/// This is a zero-sized type used for namespacing; all methods are associated functions.
pub struct EventDocument;

impl EventDocument {
    /// Parses an event from text in the given format.
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::Translation`] naming the failing field path when the text
    /// does not match the event shape, including unknown action types and malformed
    /// action parameters.
    pub fn parse(text: &str, format: DocumentFormat) -> AuthoringResult<Event> {
        parse("Event", text, format)
    }

    pub fn render(event: &Event, format: DocumentFormat) -> AuthoringResult<String> {
        render("event", event, format)
    }

    /// Reads an event file, choosing the format from its extension.
    pub fn read(path: &Path) -> AuthoringResult<Event> {
        let format = DocumentFormat::from_path(path)?;
        let text = read_file(path)?;
        let event = Self::parse(&text, format)?;
        tracing::debug!(path = %path.display(), actions = event.actions.len(), "read event document");
        Ok(event)
    }

    pub fn write(path: &Path, event: &Event) -> AuthoringResult<()> {
        let format = DocumentFormat::from_path(path)?;
        write_file(path, &Self::render(event, format)?)
    }
}

/// Symptom template document operations.
pub struct TemplateDocument;

impl TemplateDocument {
    pub fn parse(text: &str, format: DocumentFormat) -> AuthoringResult<SymptomTemplate> {
        parse("Symptom template", text, format)
    }

    pub fn render(template: &SymptomTemplate, format: DocumentFormat) -> AuthoringResult<String> {
        render("symptom template", template, format)
    }

    pub fn read(path: &Path) -> AuthoringResult<SymptomTemplate> {
        let format = DocumentFormat::from_path(path)?;
        let text = read_file(path)?;
        Self::parse(&text, format)
    }

    pub fn write(path: &Path, template: &SymptomTemplate) -> AuthoringResult<()> {
        let format = DocumentFormat::from_path(path)?;
        write_file(path, &Self::render(template, format)?)
    }
}
