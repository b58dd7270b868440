//! Lab result records and reference-range lookups.

use super::PatientData;
use crate::{AuthoringError, AuthoringResult};
use medsim_reference::{ReferenceData, SpecimenGroup};
use medsim_uuid::ItemKey;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabResult {
    #[serde(default = "ItemKey::generate")]
    pub key: ItemKey,
    #[serde(default)]
    pub specimen: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub unit: String,
}

/// Partial update for a [`LabResult`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LabResultPatch {
    pub specimen: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
    pub unit: Option<String>,
}

impl PatientData {
    /// Appends an empty lab record for `specimen` and returns its key.
    pub fn add_lab_result(&mut self, specimen: impl Into<String>) -> ItemKey {
        let key = ItemKey::generate();
        self.lab_results.push(LabResult {
            key: key.clone(),
            specimen: specimen.into(),
            name: String::new(),
            value: String::new(),
            unit: String::new(),
        });
        key
    }

    fn lab_result_mut(&mut self, key: &ItemKey) -> AuthoringResult<&mut LabResult> {
        self.lab_results
            .iter_mut()
            .find(|r| &r.key == key)
            .ok_or_else(|| AuthoringError::ItemNotFound(key.to_string()))
    }

    pub fn update_lab_result(&mut self, key: &ItemKey, patch: LabResultPatch) -> AuthoringResult<()> {
        let record = self.lab_result_mut(key)?;
        if let Some(specimen) = patch.specimen {
            record.specimen = specimen;
        }
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(value) = patch.value {
            record.value = value;
        }
        if let Some(unit) = patch.unit {
            record.unit = unit;
        }
        Ok(())
    }

    /// Sets the lab item name on a record and, when the catalog knows the item, fills its
    /// specimen, unit and normal value for this patient's classification.
    ///
    /// Returns `true` when the name matched a catalog item. An unknown name is still stored
    /// so authors can record free-text tests.
    pub fn select_lab_item(
        &mut self,
        key: &ItemKey,
        name: &str,
        reference: &ReferenceData,
    ) -> AuthoringResult<bool> {
        let patient_type = self.patient_type;
        let record = self.lab_result_mut(key)?;
        record.name = name.to_string();

        let Some(item) = reference.lab_item(name) else {
            tracing::debug!(name, "lab item not in catalog");
            return Ok(false);
        };
        record.specimen = item.specimen.clone();
        record.unit = item.unit.clone();
        record.value = item
            .normal_range(patient_type)
            .unwrap_or_default()
            .to_string();
        Ok(true)
    }

    /// Appends one record per catalog item under `specimen` that is not already present,
    /// pre-filled with its normal range. Returns the number of records added.
    pub fn add_specimen_panel(&mut self, specimen: &str, reference: &ReferenceData) -> usize {
        let patient_type = self.patient_type;
        let mut added = 0;
        for item in reference.lab_items_for_specimen(specimen) {
            let present = self
                .lab_results
                .iter()
                .any(|r| r.name == item.name && r.specimen == item.specimen);
            if present {
                continue;
            }
            self.lab_results.push(LabResult {
                key: ItemKey::generate(),
                specimen: item.specimen.clone(),
                name: item.name.clone(),
                value: item
                    .normal_range(patient_type)
                    .unwrap_or_default()
                    .to_string(),
                unit: item.unit.clone(),
            });
            added += 1;
        }
        tracing::debug!(specimen, added, "specimen panel added");
        added
    }

    pub fn remove_lab_result(&mut self, key: &ItemKey) -> AuthoringResult<()> {
        let index = self
            .lab_results
            .iter()
            .position(|r| &r.key == key)
            .ok_or_else(|| AuthoringError::ItemNotFound(key.to_string()))?;
        self.lab_results.remove(index);
        Ok(())
    }

    /// Removes every lab record whose specimen falls in `group`. Returns the number removed.
    ///
    /// [`SpecimenGroup::Blood`] matches anything that is not urine, stool, saliva or blood
    /// sugar, so free-text specimens are cleared by a blood reset.
    pub fn reset_labs(&mut self, group: SpecimenGroup) -> usize {
        let before = self.lab_results.len();
        self.lab_results
            .retain(|r| SpecimenGroup::of(&r.specimen) != group);
        before - self.lab_results.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medsim_reference::labs::{SPECIMEN_CBC, SPECIMEN_STOOL, SPECIMEN_URINE};
    use medsim_types::PatientType;

    #[test]
    fn cbc_panel_adds_seven_adult_male_records() {
        let reference = ReferenceData::builtin();
        let mut data = PatientData::default();
        assert_eq!(data.patient_type, PatientType::AdultMale);

        assert_eq!(data.add_specimen_panel(SPECIMEN_CBC, &reference), 7);

        let rows: Vec<(&str, &str)> = data
            .lab_results
            .iter()
            .map(|r| (r.name.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(
            rows,
            [
                ("WBC", "4.0-10.0"),
                ("RBC", "4.5-5.9"),
                ("Hb", "13.5-17.5"),
                ("Hct", "41-53"),
                ("MCV", "80-100"),
                ("MCHC", "32-36"),
                ("PLT", "150-400"),
            ]
        );
        assert!(data.lab_results.iter().all(|r| r.specimen == SPECIMEN_CBC));
    }

    #[test]
    fn repeated_panel_add_is_a_no_op() {
        let reference = ReferenceData::builtin();
        let mut data = PatientData::default();
        data.add_specimen_panel(SPECIMEN_CBC, &reference);
        let snapshot = data.lab_results.clone();

        assert_eq!(data.add_specimen_panel(SPECIMEN_CBC, &reference), 0);
        assert_eq!(data.lab_results, snapshot);
    }

    #[test]
    fn panel_fills_only_missing_items() {
        let reference = ReferenceData::builtin();
        let mut data = PatientData::default();
        let key = data.add_lab_result(SPECIMEN_CBC);
        data.select_lab_item(&key, "Hb", &reference).unwrap();

        assert_eq!(data.add_specimen_panel(SPECIMEN_CBC, &reference), 6);
        assert_eq!(
            data.lab_results.iter().filter(|r| r.name == "Hb").count(),
            1
        );
    }

    #[test]
    fn select_lab_item_uses_patient_type_range() {
        let reference = ReferenceData::builtin();
        let hb = reference.lab_item("Hb").expect("Hb in catalog");
        let mut data = PatientData {
            patient_type: PatientType::AdultFemale,
            ..Default::default()
        };
        let key = data.add_lab_result("");

        assert!(data.select_lab_item(&key, "Hb", &reference).unwrap());
        let record = &data.lab_results[0];
        assert_eq!(
            Some(record.value.as_str()),
            hb.normal_range(PatientType::AdultFemale)
        );
        assert_eq!(record.unit, hb.unit);
        assert_eq!(record.specimen, SPECIMEN_CBC);
    }

    #[test]
    fn select_lab_item_falls_back_to_adult_male() {
        let reference = ReferenceData::builtin();
        let item = reference
            .lab_items()
            .iter()
            .find(|i| !i.ranges.contains_key(&PatientType::Newborn))
            .expect("some item lacks a newborn range");
        let mut data = PatientData {
            patient_type: PatientType::Newborn,
            ..Default::default()
        };
        let key = data.add_lab_result("");

        data.select_lab_item(&key, &item.name, &reference).unwrap();
        assert_eq!(
            Some(data.lab_results[0].value.as_str()),
            item.ranges.get(&PatientType::AdultMale).map(String::as_str)
        );
    }

    #[test]
    fn unknown_lab_name_is_kept_as_free_text() {
        let reference = ReferenceData::builtin();
        let mut data = PatientData::default();
        let key = data.add_lab_result("Custom");
        assert!(!data.select_lab_item(&key, "Mystery assay", &reference).unwrap());
        assert_eq!(data.lab_results[0].name, "Mystery assay");
        assert_eq!(data.lab_results[0].specimen, "Custom");
    }

    #[test]
    fn blood_reset_is_a_catch_all() {
        let mut data = PatientData::default();
        data.add_lab_result(SPECIMEN_CBC);
        data.add_lab_result("Free text specimen");
        data.add_lab_result(SPECIMEN_URINE);
        data.add_lab_result(SPECIMEN_STOOL);

        assert_eq!(data.reset_labs(SpecimenGroup::Blood), 2);
        let left: Vec<&str> = data.lab_results.iter().map(|r| r.specimen.as_str()).collect();
        assert_eq!(left, [SPECIMEN_URINE, SPECIMEN_STOOL]);

        assert_eq!(data.reset_labs(SpecimenGroup::Urine), 1);
        assert_eq!(data.reset_labs(SpecimenGroup::Saliva), 0);
    }

    #[test]
    fn update_and_remove_require_existing_key() {
        let mut data = PatientData::default();
        let key = data.add_lab_result(SPECIMEN_URINE);
        data.update_lab_result(
            &key,
            LabResultPatch {
                value: Some("Positive".into()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(data.lab_results[0].value, "Positive");

        data.remove_lab_result(&key).unwrap();
        let err = data.remove_lab_result(&key).expect_err("already removed");
        assert!(matches!(err, AuthoringError::ItemNotFound(_)));
    }
}
