//! Symptom templates: reusable patient data referenced from `apply_symptom` actions.

use crate::event::AssetSource;
use crate::patient_data::PatientData;
use crate::store::AssetStore;
use crate::{AuthoringError, AuthoringResult};
use chrono::NaiveDate;
use medsim_reference::ReferenceData;
use medsim_types::PatientType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymptomTemplate {
    pub id: String,
    pub key: String,
    pub display_name: String,
    pub description: String,
    /// Category from the taxonomy of `data.patient_type`. Empty when unset.
    pub category: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<NaiveDate>,
    pub source: AssetSource,
    #[serde(flatten)]
    pub data: PatientData,
}

impl SymptomTemplate {
    pub fn new(patient_type: PatientType) -> Self {
        Self {
            data: PatientData {
                patient_type,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn is_editable(&self) -> bool {
        self.source == AssetSource::Asset
    }

    /// Sets the category, which must belong to the taxonomy for the template's patient type.
    /// An empty string clears it.
    pub fn set_category(&mut self, category: &str, reference: &ReferenceData) -> AuthoringResult<()> {
        if category.trim().is_empty() {
            self.category.clear();
            return Ok(());
        }
        let known = reference.symptom_categories(self.data.patient_type);
        if !known.iter().any(|c| c == category) {
            return Err(AuthoringError::InvalidInput(format!(
                "'{}' is not a symptom category for {}",
                category, self.data.patient_type
            )));
        }
        self.category = category.to_string();
        Ok(())
    }

    /// Changes the patient type. A category that the new type's taxonomy lacks is cleared.
    /// Returns `true` if the category was cleared.
    pub fn set_patient_type(&mut self, patient_type: PatientType, reference: &ReferenceData) -> bool {
        self.data.patient_type = patient_type;
        if self.category.is_empty() {
            return false;
        }
        let still_valid = reference
            .symptom_categories(patient_type)
            .iter()
            .any(|c| *c == self.category);
        if !still_valid {
            self.category.clear();
        }
        !still_valid
    }

    /// Adds a tag. Returns `false` for blank or duplicate tags.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }
}

/// Materialises the patient data of the template stored under `key`.
///
/// The returned value is an independent copy; later edits to the template do not affect it.
pub fn resolve_symptom<S>(store: &S, key: &str) -> AuthoringResult<PatientData>
where
    S: AssetStore<SymptomTemplate> + ?Sized,
{
    let template = store
        .find_by_key(key)?
        .ok_or_else(|| AuthoringError::NotFound {
            kind: "symptom template",
            id: key.to_string(),
        })?;
    tracing::debug!(key, template_id = %template.id, "resolved symptom template");
    Ok(template.data)
}
