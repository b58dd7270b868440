//! Two-step destructive commands.
//!
//! A request is built first and carries a human-readable prompt; nothing changes until the
//! caller confirms it. Dropping a request cancels it. Removing a single action from an event
//! is deliberately not routed through here.

use crate::context::AccountContext;
use crate::event::AssetSource;
use crate::patient_data::{ExamSection, FindingSection, PatientData};
use crate::store::{Asset, AssetStore};
use crate::{AuthoringError, AuthoringResult};
use medsim_reference::SpecimenGroup;
use std::marker::PhantomData;

/// What a [`ResetRequest`] clears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResetTarget {
    /// Mark an exam section as not assessed.
    Section(ExamSection),
    /// Remove every lab record in a specimen group.
    Labs(SpecimenGroup),
    /// Clear a finding list, or only the findings of one type.
    Findings {
        section: FindingSection,
        kind: Option<String>,
    },
}

#[must_use = "a reset does nothing until it is confirmed"]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetRequest {
    target: ResetTarget,
}

impl ResetRequest {
    pub fn new(target: ResetTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &ResetTarget {
        &self.target
    }

    pub fn prompt(&self) -> String {
        match &self.target {
            ResetTarget::Section(section) => {
                format!("Remove the {} section? Entered values will be lost.", section.as_str())
            }
            ResetTarget::Labs(group) => {
                format!("Remove all {} lab results?", group.label().to_lowercase())
            }
            ResetTarget::Findings {
                section,
                kind: Some(kind),
            } => format!("Remove all {} {} findings?", kind, section.as_str()),
            ResetTarget::Findings {
                section,
                kind: None,
            } => format!("Remove all {} findings?", section.as_str()),
        }
    }

    /// Applies the reset and returns how many entries were removed (0 or 1 for a section).
    pub fn confirm(self, data: &mut PatientData) -> usize {
        let removed = match self.target {
            ResetTarget::Section(section) => usize::from(data.remove_section(section)),
            ResetTarget::Labs(group) => data.reset_labs(group),
            ResetTarget::Findings { section, kind } => {
                data.reset_findings(section, kind.as_deref())
            }
        };
        tracing::debug!(removed, "reset confirmed");
        removed
    }
}

/// A pending deletion of a stored asset.
///
/// Built by [`request_delete`], which checks permissions, existence and that the asset is not
/// a preset before anything is asked of the user.
#[must_use = "a delete does nothing until it is confirmed"]
#[derive(Debug)]
pub struct DeleteRequest<T> {
    id: String,
    display_name: String,
    _asset: PhantomData<fn() -> T>,
}

pub fn request_delete<T, S>(
    store: &S,
    ctx: &AccountContext,
    id: &str,
) -> AuthoringResult<DeleteRequest<T>>
where
    T: Asset,
    S: AssetStore<T> + ?Sized,
{
    ctx.require_authoring()?;
    let record = store.get(id)?.ok_or_else(|| AuthoringError::NotFound {
        kind: T::KIND,
        id: id.to_string(),
    })?;
    if record.source() != AssetSource::Asset {
        tracing::warn!(kind = T::KIND, id, "refusing to delete preset");
        return Err(AuthoringError::ReadOnlyAsset(record.display_name().to_string()));
    }
    Ok(DeleteRequest {
        id: id.to_string(),
        display_name: record.display_name().to_string(),
        _asset: PhantomData,
    })
}

impl<T: Asset> DeleteRequest<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> String {
        let name = if self.display_name.trim().is_empty() {
            self.id.as_str()
        } else {
            self.display_name.as_str()
        };
        format!("Delete {} \"{}\"? This cannot be undone.", T::KIND, name)
    }

    pub fn confirm<S>(self, store: &S) -> AuthoringResult<T>
    where
        S: AssetStore<T> + ?Sized,
    {
        store.delete(&self.id)
    }
}
