//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into editors and
//! services. Nothing in the core reads environment variables while handling a request.

use crate::constants::{
    DEFAULT_INVITE_EXPIRATION_DAYS, DEFAULT_PAGE_SIZE, MAX_INVITE_EXPIRATION_DAYS, MAX_PAGE_SIZE,
};
use crate::{AuthoringError, AuthoringResult};
use medsim_reference::ReferenceData;
use std::path::PathBuf;
use std::sync::Arc;

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    reference: Arc<ReferenceData>,
    invite_expiration_days: u32,
    page_size: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthoringError::InvalidInput`] if the invite lifetime is outside
    /// `1..=365` days or the page size is outside `1..=200`.
    pub fn new(
        reference: Arc<ReferenceData>,
        invite_expiration_days: u32,
        page_size: usize,
    ) -> AuthoringResult<Self> {
        if !(1..=MAX_INVITE_EXPIRATION_DAYS).contains(&invite_expiration_days) {
            return Err(AuthoringError::InvalidInput(format!(
                "invite_expiration_days must be between 1 and {MAX_INVITE_EXPIRATION_DAYS}, got {invite_expiration_days}"
            )));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AuthoringError::InvalidInput(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }

        Ok(Self {
            reference,
            invite_expiration_days,
            page_size,
        })
    }

    pub fn reference(&self) -> &Arc<ReferenceData> {
        &self.reference
    }

    pub fn invite_expiration_days(&self) -> u32 {
        self.invite_expiration_days
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            reference: ReferenceData::builtin(),
            invite_expiration_days: DEFAULT_INVITE_EXPIRATION_DAYS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Resolve the reference tables without reading environment variables.
///
/// If `overlay_path` is provided, the file is read as a YAML overlay on top of the built-in
/// tables. Otherwise the built-in tables are returned.
pub fn resolve_reference_data(overlay_path: Option<PathBuf>) -> AuthoringResult<Arc<ReferenceData>> {
    let Some(path) = overlay_path else {
        return Ok(ReferenceData::builtin());
    };

    let text = std::fs::read_to_string(&path).map_err(|source| AuthoringError::FileRead {
        path: path.clone(),
        source,
    })?;
    let data = ReferenceData::from_yaml_overlay(&text)?;
    tracing::info!(path = %path.display(), "using reference data overlay");
    Ok(Arc::new(data))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the invite lifetime from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 7 days. Range checks
/// happen in [`CoreConfig::new`].
pub fn invite_expiration_days_from_env_value(value: Option<String>) -> AuthoringResult<u32> {
    match non_blank(value) {
        None => Ok(DEFAULT_INVITE_EXPIRATION_DAYS),
        Some(v) => v.parse::<u32>().map_err(|e| {
            AuthoringError::InvalidInput(format!("invalid invite expiration days {v:?}: {e}"))
        }),
    }
}

/// Parse the list page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns the default of 20.
pub fn page_size_from_env_value(value: Option<String>) -> AuthoringResult<usize> {
    match non_blank(value) {
        None => Ok(DEFAULT_PAGE_SIZE),
        Some(v) => v
            .parse::<usize>()
            .map_err(|e| AuthoringError::InvalidInput(format!("invalid page size {v:?}: {e}"))),
    }
}
