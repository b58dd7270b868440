//! Lab item catalog and specimen grouping.

use medsim_types::PatientType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SPECIMEN_CBC: &str = "EDTA -CBC";
pub const SPECIMEN_CHEMISTRY: &str = "SST -Chemistry";
pub const SPECIMEN_COAGULATION: &str = "Citrate -Coagulation";
pub const SPECIMEN_ABGA: &str = "Heparin -ABGA";
pub const SPECIMEN_URINE: &str = "Urine";
pub const SPECIMEN_STOOL: &str = "Stool";
pub const SPECIMEN_SALIVA: &str = "Saliva";
pub const SPECIMEN_BLOOD_SUGAR: &str = "Blood Sugar";

/// One orderable lab item with its normal range per patient classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabItem {
    pub name: String,
    pub specimen: String,
    #[serde(default)]
    pub unit: String,
    /// Normal range strings keyed by classification. `Adult_Male` is the fallback column.
    pub ranges: BTreeMap<PatientType, String>,
}

impl LabItem {
    /// Returns the normal range for `patient_type`, falling back to the Adult_Male column.
    pub fn normal_range(&self, patient_type: PatientType) -> Option<&str> {
        self.ranges
            .get(&patient_type)
            .or_else(|| self.ranges.get(&PatientType::AdultMale))
            .map(String::as_str)
    }
}

/// Coarse grouping of specimens used for bulk resets.
///
/// `Blood` is a catch-all: every specimen that is not urine, stool, saliva or a
/// point-of-care blood sugar belongs to it, including free-text specimens typed by an
/// author.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpecimenGroup {
    Blood,
    Urine,
    Stool,
    Saliva,
    BloodSugar,
}

impl SpecimenGroup {
    pub const ALL: [SpecimenGroup; 5] = [
        SpecimenGroup::Blood,
        SpecimenGroup::Urine,
        SpecimenGroup::Stool,
        SpecimenGroup::Saliva,
        SpecimenGroup::BloodSugar,
    ];

    /// Classifies a specimen name.
    pub fn of(specimen: &str) -> Self {
        match specimen.trim() {
            SPECIMEN_URINE => Self::Urine,
            SPECIMEN_STOOL => Self::Stool,
            SPECIMEN_SALIVA => Self::Saliva,
            SPECIMEN_BLOOD_SUGAR => Self::BloodSugar,
            _ => Self::Blood,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Blood => "Blood",
            Self::Urine => SPECIMEN_URINE,
            Self::Stool => SPECIMEN_STOOL,
            Self::Saliva => SPECIMEN_SALIVA,
            Self::BloodSugar => SPECIMEN_BLOOD_SUGAR,
        }
    }

    /// Parses a group label, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|g| g.label().eq_ignore_ascii_case(s.trim()))
    }
}

struct LabRow {
    name: &'static str,
    specimen: &'static str,
    unit: &'static str,
    ranges: &'static [(PatientType, &'static str)],
}

use PatientType::*;

const LAB_ROWS: &[LabRow] = &[
    // Complete blood count
    LabRow {
        name: "WBC",
        specimen: SPECIMEN_CBC,
        unit: "x10^3/uL",
        ranges: &[(AdultMale, "4.0-10.0"), (Pediatric, "5.0-14.5"), (Newborn, "9.0-30.0")],
    },
    LabRow {
        name: "RBC",
        specimen: SPECIMEN_CBC,
        unit: "x10^6/uL",
        ranges: &[
            (AdultMale, "4.5-5.9"),
            (AdultFemale, "4.0-5.2"),
            (ElderlyFemale, "3.8-5.0"),
            (Pregnant, "3.5-5.0"),
            (Newborn, "4.0-6.6"),
        ],
    },
    LabRow {
        name: "Hb",
        specimen: SPECIMEN_CBC,
        unit: "g/dL",
        ranges: &[
            (AdultMale, "13.5-17.5"),
            (AdultFemale, "12.0-16.0"),
            (ElderlyMale, "12.5-17.0"),
            (ElderlyFemale, "11.5-15.5"),
            (Pregnant, "11.0-14.0"),
            (Pediatric, "11.5-15.5"),
            (Newborn, "14.0-24.0"),
        ],
    },
    LabRow {
        name: "Hct",
        specimen: SPECIMEN_CBC,
        unit: "%",
        ranges: &[
            (AdultMale, "41-53"),
            (AdultFemale, "36-46"),
            (Pregnant, "33-42"),
            (Newborn, "44-64"),
        ],
    },
    LabRow {
        name: "MCV",
        specimen: SPECIMEN_CBC,
        unit: "fL",
        ranges: &[(AdultMale, "80-100"), (Newborn, "95-121")],
    },
    LabRow {
        name: "MCHC",
        specimen: SPECIMEN_CBC,
        unit: "g/dL",
        ranges: &[(AdultMale, "32-36")],
    },
    LabRow {
        name: "PLT",
        specimen: SPECIMEN_CBC,
        unit: "x10^3/uL",
        ranges: &[(AdultMale, "150-400"), (Newborn, "150-450")],
    },
    // Chemistry
    LabRow {
        name: "AST",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "U/L",
        ranges: &[(AdultMale, "0-40"), (AdultFemale, "0-32"), (Newborn, "25-75")],
    },
    LabRow {
        name: "ALT",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "U/L",
        ranges: &[(AdultMale, "0-41"), (AdultFemale, "0-33")],
    },
    LabRow {
        name: "BUN",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mg/dL",
        ranges: &[(AdultMale, "8-23"), (Pediatric, "5-18"), (Newborn, "3-12")],
    },
    LabRow {
        name: "Creatinine",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mg/dL",
        ranges: &[
            (AdultMale, "0.7-1.2"),
            (AdultFemale, "0.5-0.9"),
            (ElderlyFemale, "0.5-1.0"),
            (Pregnant, "0.4-0.8"),
            (Pediatric, "0.3-0.7"),
            (Newborn, "0.3-1.0"),
        ],
    },
    LabRow {
        name: "Na",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mmol/L",
        ranges: &[(AdultMale, "135-145"), (Newborn, "133-146")],
    },
    LabRow {
        name: "K",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mmol/L",
        ranges: &[(AdultMale, "3.5-5.1"), (Newborn, "3.7-5.9")],
    },
    LabRow {
        name: "Cl",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mmol/L",
        ranges: &[(AdultMale, "98-107")],
    },
    LabRow {
        name: "Total Bilirubin",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mg/dL",
        ranges: &[(AdultMale, "0.2-1.2"), (Newborn, "1.0-12.0")],
    },
    LabRow {
        name: "Albumin",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "g/dL",
        ranges: &[(AdultMale, "3.5-5.2"), (Pregnant, "2.8-3.7")],
    },
    LabRow {
        name: "CRP",
        specimen: SPECIMEN_CHEMISTRY,
        unit: "mg/dL",
        ranges: &[(AdultMale, "0-0.5")],
    },
    // Coagulation
    LabRow {
        name: "PT",
        specimen: SPECIMEN_COAGULATION,
        unit: "sec",
        ranges: &[(AdultMale, "11.0-13.5"), (Newborn, "10.1-15.9")],
    },
    LabRow {
        name: "INR",
        specimen: SPECIMEN_COAGULATION,
        unit: "",
        ranges: &[(AdultMale, "0.8-1.2")],
    },
    LabRow {
        name: "aPTT",
        specimen: SPECIMEN_COAGULATION,
        unit: "sec",
        ranges: &[(AdultMale, "25-35"), (Newborn, "31-55")],
    },
    // Arterial blood gas
    LabRow {
        name: "pH",
        specimen: SPECIMEN_ABGA,
        unit: "",
        ranges: &[(AdultMale, "7.35-7.45")],
    },
    LabRow {
        name: "pCO2",
        specimen: SPECIMEN_ABGA,
        unit: "mmHg",
        ranges: &[(AdultMale, "35-45"), (Pregnant, "27-32")],
    },
    LabRow {
        name: "pO2",
        specimen: SPECIMEN_ABGA,
        unit: "mmHg",
        ranges: &[(AdultMale, "80-100"), (Newborn, "60-70")],
    },
    LabRow {
        name: "HCO3",
        specimen: SPECIMEN_ABGA,
        unit: "mmol/L",
        ranges: &[(AdultMale, "22-26"), (Pregnant, "18-22")],
    },
    LabRow {
        name: "Lactate",
        specimen: SPECIMEN_ABGA,
        unit: "mmol/L",
        ranges: &[(AdultMale, "0.5-2.2")],
    },
    // Urinalysis
    LabRow {
        name: "U-pH",
        specimen: SPECIMEN_URINE,
        unit: "",
        ranges: &[(AdultMale, "5.0-8.0")],
    },
    LabRow {
        name: "U-Specific Gravity",
        specimen: SPECIMEN_URINE,
        unit: "",
        ranges: &[(AdultMale, "1.005-1.030"), (Newborn, "1.001-1.020")],
    },
    LabRow {
        name: "U-Protein",
        specimen: SPECIMEN_URINE,
        unit: "",
        ranges: &[(AdultMale, "Negative"), (Pregnant, "Negative-Trace")],
    },
    LabRow {
        name: "U-Glucose",
        specimen: SPECIMEN_URINE,
        unit: "",
        ranges: &[(AdultMale, "Negative")],
    },
    LabRow {
        name: "U-Ketone",
        specimen: SPECIMEN_URINE,
        unit: "",
        ranges: &[(AdultMale, "Negative")],
    },
    LabRow {
        name: "U-RBC",
        specimen: SPECIMEN_URINE,
        unit: "/HPF",
        ranges: &[(AdultMale, "0-2")],
    },
    LabRow {
        name: "U-WBC",
        specimen: SPECIMEN_URINE,
        unit: "/HPF",
        ranges: &[(AdultMale, "0-5")],
    },
    // Stool
    LabRow {
        name: "Stool Occult Blood",
        specimen: SPECIMEN_STOOL,
        unit: "",
        ranges: &[(AdultMale, "Negative")],
    },
    LabRow {
        name: "Stool WBC",
        specimen: SPECIMEN_STOOL,
        unit: "/HPF",
        ranges: &[(AdultMale, "Negative")],
    },
    // Saliva
    LabRow {
        name: "Saliva Cortisol",
        specimen: SPECIMEN_SALIVA,
        unit: "ug/dL",
        ranges: &[(AdultMale, "0.1-0.8"), (Pediatric, "0.1-0.6")],
    },
    LabRow {
        name: "Saliva Respiratory PCR",
        specimen: SPECIMEN_SALIVA,
        unit: "",
        ranges: &[(AdultMale, "Negative")],
    },
    // Point of care
    LabRow {
        name: "BST",
        specimen: SPECIMEN_BLOOD_SUGAR,
        unit: "mg/dL",
        ranges: &[(AdultMale, "70-110"), (Pregnant, "60-95"), (Newborn, "40-90")],
    },
];

pub(crate) fn builtin_lab_items() -> Vec<LabItem> {
    LAB_ROWS
        .iter()
        .map(|row| LabItem {
            name: row.name.to_string(),
            specimen: row.specimen.to_string(),
            unit: row.unit.to_string(),
            ranges: row
                .ranges
                .iter()
                .map(|(pt, range)| (*pt, range.to_string()))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> LabItem {
        builtin_lab_items()
            .into_iter()
            .find(|i| i.name == name)
            .expect("item in table")
    }

    #[test]
    fn normal_range_prefers_patient_type_column() {
        assert_eq!(item("Hb").normal_range(PatientType::Pregnant), Some("11.0-14.0"));
    }

    #[test]
    fn normal_range_falls_back_to_adult_male() {
        assert_eq!(item("MCHC").normal_range(PatientType::Newborn), Some("32-36"));
        assert_eq!(item("WBC").normal_range(PatientType::AdultFemale), Some("4.0-10.0"));
    }

    #[test]
    fn every_builtin_item_has_an_adult_male_range() {
        for item in builtin_lab_items() {
            assert!(
                item.ranges.contains_key(&PatientType::AdultMale),
                "{} is missing the fallback column",
                item.name
            );
        }
    }

    #[test]
    fn blood_group_is_the_catch_all() {
        assert_eq!(SpecimenGroup::of(SPECIMEN_CBC), SpecimenGroup::Blood);
        assert_eq!(SpecimenGroup::of(SPECIMEN_ABGA), SpecimenGroup::Blood);
        assert_eq!(SpecimenGroup::of("Serum tube (custom)"), SpecimenGroup::Blood);
        assert_eq!(SpecimenGroup::of(""), SpecimenGroup::Blood);
        assert_eq!(SpecimenGroup::of(SPECIMEN_URINE), SpecimenGroup::Urine);
        assert_eq!(SpecimenGroup::of(SPECIMEN_BLOOD_SUGAR), SpecimenGroup::BloodSugar);
    }

    #[test]
    fn specimen_group_parse_uses_labels() {
        assert_eq!(SpecimenGroup::parse("blood"), Some(SpecimenGroup::Blood));
        assert_eq!(SpecimenGroup::parse("Blood Sugar"), Some(SpecimenGroup::BloodSugar));
        assert_eq!(SpecimenGroup::parse("plasma"), None);
    }
}
