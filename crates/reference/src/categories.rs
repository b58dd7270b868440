//! Symptom category taxonomy keyed by patient classification.

use medsim_types::PatientType;
use std::collections::BTreeMap;

const ADULT: &[&str] = &[
    "Cardiovascular",
    "Respiratory",
    "Neurological",
    "Gastrointestinal",
    "Genitourinary",
    "Musculoskeletal",
    "Endocrine",
    "Infectious",
    "Trauma",
    "Psychiatric",
];

const ELDERLY: &[&str] = &[
    "Cardiovascular",
    "Respiratory",
    "Neurological",
    "Gastrointestinal",
    "Genitourinary",
    "Musculoskeletal",
    "Endocrine",
    "Infectious",
    "Trauma",
    "Falls",
    "Delirium",
];

const PREGNANT: &[&str] = &[
    "Obstetric",
    "Hypertensive Disorder",
    "Hemorrhage",
    "Cardiovascular",
    "Respiratory",
    "Infectious",
    "Trauma",
];

const PEDIATRIC: &[&str] = &[
    "Respiratory",
    "Fever",
    "Dehydration",
    "Gastrointestinal",
    "Neurological",
    "Allergic",
    "Trauma",
];

const NEWBORN: &[&str] = &[
    "Neonatal Respiratory",
    "Jaundice",
    "Feeding",
    "Thermoregulation",
    "Neonatal Infection",
    "Congenital",
];

pub(crate) fn builtin_symptom_categories() -> BTreeMap<PatientType, Vec<String>> {
    PatientType::ALL
        .into_iter()
        .map(|pt| {
            let list = match pt {
                PatientType::AdultMale | PatientType::AdultFemale => ADULT,
                PatientType::ElderlyMale | PatientType::ElderlyFemale => ELDERLY,
                PatientType::Pregnant => PREGNANT,
                PatientType::Pediatric => PEDIATRIC,
                PatientType::Newborn => NEWBORN,
            };
            (pt, list.iter().map(|c| c.to_string()).collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_patient_type_has_categories() {
        let table = builtin_symptom_categories();
        for pt in PatientType::ALL {
            assert!(!table[&pt].is_empty(), "{pt} has no categories");
        }
    }

    #[test]
    fn newborn_taxonomy_is_distinct() {
        let table = builtin_symptom_categories();
        assert!(table[&PatientType::Newborn].contains(&"Jaundice".to_string()));
        assert!(!table[&PatientType::AdultMale].contains(&"Jaundice".to_string()));
    }
}
