//! Read-only reference tables for simulation authoring.
//!
//! This crate holds the lookup data the authoring model reads but never mutates:
//! - lab items with normal ranges per patient classification ([`labs`])
//! - the symptom category taxonomy per classification ([`categories`])
//! - the anatomical spot catalog ([`spots`])
//!
//! The built-in tables are constructed once and shared through an `Arc`. Deployments can
//! replace individual tables with a YAML overlay (see [`ReferenceData::from_yaml_overlay`]);
//! sections omitted from the overlay keep their built-in content.

pub mod categories;
pub mod labs;
pub mod spots;

pub use labs::{LabItem, SpecimenGroup};
pub use spots::{Spot, WHOLE_BODY_SPOT_KEY};

use medsim_types::PatientType;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, OnceLock};

/// Errors returned when loading reference data.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference data schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("duplicate lab item name: {0}")]
    DuplicateLabItem(String),

    #[error("lab item {0} has no Adult_Male range")]
    MissingFallbackRange(String),

    #[error("duplicate spot key: {0}")]
    DuplicateSpot(String),

    #[error("spot catalog must contain the 'whole_body' spot")]
    MissingWholeBodySpot,
}

/// Type alias for Results that can fail with a [`ReferenceError`].
pub type ReferenceResult<T> = Result<T, ReferenceError>;

/// The full set of lookup tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceData {
    lab_items: Vec<LabItem>,
    symptom_categories: BTreeMap<PatientType, Vec<String>>,
    spots: Vec<Spot>,
}

static BUILTIN: OnceLock<Arc<ReferenceData>> = OnceLock::new();

impl ReferenceData {
    /// Returns the built-in tables, constructing them on first use.
    pub fn builtin() -> Arc<ReferenceData> {
        BUILTIN
            .get_or_init(|| {
                Arc::new(ReferenceData {
                    lab_items: labs::builtin_lab_items(),
                    symptom_categories: categories::builtin_symptom_categories(),
                    spots: spots::builtin_spots(),
                })
            })
            .clone()
    }

    /// Builds reference data from a YAML overlay on top of the built-in tables.
    ///
    /// The overlay is a mapping with optional `lab_items`, `symptom_categories` and `spots`
    /// keys. A present key replaces the whole built-in table; unknown keys are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ReferenceError::Schema`] with the failing path when the YAML does not match,
    /// or a consistency error when lab names or spot keys repeat, a lab item lacks the
    /// Adult_Male fallback range, or the whole-body spot is missing.
    pub fn from_yaml_overlay(yaml_text: &str) -> ReferenceResult<ReferenceData> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);
        let overlay: OverlayWire = serde_path_to_error::deserialize(deserializer).map_err(|err| {
            let path = err.path().to_string();
            let path = if path.is_empty() || path == "." {
                "<root>".to_string()
            } else {
                path
            };
            ReferenceError::Schema {
                path,
                message: err.into_inner().to_string(),
            }
        })?;

        let base = Self::builtin();
        let data = ReferenceData {
            lab_items: overlay.lab_items.unwrap_or_else(|| base.lab_items.clone()),
            symptom_categories: overlay
                .symptom_categories
                .unwrap_or_else(|| base.symptom_categories.clone()),
            spots: overlay.spots.unwrap_or_else(|| base.spots.clone()),
        };
        data.check_consistency()?;

        tracing::debug!(
            lab_items = data.lab_items.len(),
            spots = data.spots.len(),
            "loaded reference data overlay"
        );
        Ok(data)
    }

    fn check_consistency(&self) -> ReferenceResult<()> {
        let mut names = HashSet::new();
        for item in &self.lab_items {
            if !names.insert(item.name.as_str()) {
                return Err(ReferenceError::DuplicateLabItem(item.name.clone()));
            }
            if !item.ranges.contains_key(&PatientType::AdultMale) {
                return Err(ReferenceError::MissingFallbackRange(item.name.clone()));
            }
        }

        let mut keys = HashSet::new();
        for spot in &self.spots {
            if !keys.insert(spot.key.as_str()) {
                return Err(ReferenceError::DuplicateSpot(spot.key.clone()));
            }
        }
        if !keys.contains(WHOLE_BODY_SPOT_KEY) {
            return Err(ReferenceError::MissingWholeBodySpot);
        }

        Ok(())
    }

    pub fn lab_items(&self) -> &[LabItem] {
        &self.lab_items
    }

    /// Looks up a lab item by its exact name.
    pub fn lab_item(&self, name: &str) -> Option<&LabItem> {
        self.lab_items.iter().find(|item| item.name == name)
    }

    /// Returns the catalog items collected under `specimen`, in catalog order.
    pub fn lab_items_for_specimen<'a>(
        &'a self,
        specimen: &'a str,
    ) -> impl Iterator<Item = &'a LabItem> + 'a {
        self.lab_items
            .iter()
            .filter(move |item| item.specimen == specimen)
    }

    /// Distinct specimen names in catalog order.
    pub fn specimens(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.lab_items
            .iter()
            .map(|item| item.specimen.as_str())
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Symptom categories a template of `patient_type` may use.
    pub fn symptom_categories(&self, patient_type: PatientType) -> &[String] {
        self.symptom_categories
            .get(&patient_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn spots(&self) -> &[Spot] {
        &self.spots
    }

    pub fn spot(&self, key: &str) -> Option<&Spot> {
        self.spots.iter().find(|spot| spot.key == key)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OverlayWire {
    #[serde(default)]
    lab_items: Option<Vec<LabItem>>,
    #[serde(default)]
    symptom_categories: Option<BTreeMap<PatientType, Vec<String>>>,
    #[serde(default)]
    spots: Option<Vec<Spot>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labs::SPECIMEN_CBC;

    #[test]
    fn builtin_is_shared() {
        let a = ReferenceData::builtin();
        let b = ReferenceData::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn cbc_specimen_lists_seven_items_in_order() {
        let data = ReferenceData::builtin();
        let names: Vec<&str> = data
            .lab_items_for_specimen(SPECIMEN_CBC)
            .map(|item| item.name.as_str())
            .collect();
        assert_eq!(names, ["WBC", "RBC", "Hb", "Hct", "MCV", "MCHC", "PLT"]);
    }

    #[test]
    fn specimens_are_distinct() {
        let data = ReferenceData::builtin();
        let specimens = data.specimens();
        assert_eq!(specimens.first(), Some(&SPECIMEN_CBC));
        let unique: HashSet<_> = specimens.iter().collect();
        assert_eq!(unique.len(), specimens.len());
    }

    #[test]
    fn builtin_passes_consistency_checks() {
        ReferenceData::builtin()
            .check_consistency()
            .expect("builtin tables are consistent");
    }

    #[test]
    fn overlay_replaces_only_present_tables() {
        let yaml = r#"lab_items:
  - name: Troponin I
    specimen: SST -Chemistry
    unit: ng/mL
    ranges:
      Adult_Male: "0-0.04"
"#;
        let data = ReferenceData::from_yaml_overlay(yaml).expect("valid overlay");
        assert_eq!(data.lab_items().len(), 1);
        assert_eq!(
            data.lab_item("Troponin I")
                .and_then(|i| i.normal_range(PatientType::Pregnant)),
            Some("0-0.04")
        );
        assert_eq!(data.spots(), ReferenceData::builtin().spots());
    }

    #[test]
    fn overlay_rejects_unknown_keys_with_path() {
        let yaml = "spotz: []\n";
        let err = ReferenceData::from_yaml_overlay(yaml).expect_err("unknown key");
        match err {
            ReferenceError::Schema { message, .. } => assert!(message.contains("spotz")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn overlay_reports_nested_path() {
        let yaml = r#"lab_items:
  - name: X
    specimen: Urine
    ranges: 12
"#;
        let err = ReferenceData::from_yaml_overlay(yaml).expect_err("bad ranges");
        match err {
            ReferenceError::Schema { path, .. } => assert!(path.contains("ranges")),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn overlay_requires_fallback_range() {
        let yaml = r#"lab_items:
  - name: Ferritin
    specimen: SST -Chemistry
    ranges:
      Adult_Female: "15-150"
"#;
        let err = ReferenceData::from_yaml_overlay(yaml).expect_err("no fallback");
        assert!(matches!(err, ReferenceError::MissingFallbackRange(name) if name == "Ferritin"));
    }

    #[test]
    fn overlay_requires_whole_body_spot() {
        let yaml = r#"spots:
  - key: head
    display_name: Head
    region: head
"#;
        let err = ReferenceData::from_yaml_overlay(yaml).expect_err("no sentinel");
        assert!(matches!(err, ReferenceError::MissingWholeBodySpot));
    }
}
