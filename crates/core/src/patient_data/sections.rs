//! Optional assessed exam sections and their canonical normal defaults.
//!
//! Each section is either absent (never assessed) or present with concrete values. Adding a
//! section seeds it with the named normal constant below; there is no "zero" state.

use serde::{Deserialize, Serialize};

/// Vital signs. `*_max` fields bound a range the simulation may drift within.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub sbp: u16,
    pub sbp_max: u16,
    pub dbp: u16,
    pub dbp_max: u16,
    pub hr: u16,
    pub hr_max: u16,
    pub rr: u16,
    pub rr_max: u16,
    pub bt: f64,
    pub spo2: u16,
}

impl Vitals {
    pub const NORMAL: Vitals = Vitals {
        sbp: 120,
        sbp_max: 120,
        dbp: 80,
        dbp_max: 80,
        hr: 80,
        hr_max: 80,
        rr: 16,
        rr_max: 16,
        bt: 36.5,
        spo2: 98,
    };
}

/// Partial update for [`Vitals`]. `None` leaves a field unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VitalsPatch {
    pub sbp: Option<u16>,
    pub sbp_max: Option<u16>,
    pub dbp: Option<u16>,
    pub dbp_max: Option<u16>,
    pub hr: Option<u16>,
    pub hr_max: Option<u16>,
    pub rr: Option<u16>,
    pub rr_max: Option<u16>,
    pub bt: Option<f64>,
    pub spo2: Option<u16>,
}

impl VitalsPatch {
    pub(crate) fn apply_to(&self, vitals: &mut Vitals) {
        macro_rules! merge {
            ($($field:ident),*) => {
                $(if let Some(value) = self.$field {
                    vitals.$field = value;
                })*
            };
        }
        merge!(sbp, sbp_max, dbp, dbp_max, hr, hr_max, rr, rr_max, bt, spo2);
    }
}

/// Level of consciousness reported alongside the GCS score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsciousnessLevel {
    #[default]
    Alert,
    Drowsy,
    Stupor,
    #[serde(rename = "Semi-coma")]
    SemiComa,
    Coma,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentalStatus {
    pub gcs_score: u8,
    pub gcs_status: ConsciousnessLevel,
    pub orientation: String,
}

impl MentalStatus {
    pub const GCS_RANGE: std::ops::RangeInclusive<u8> = 3..=15;

    pub fn normal() -> Self {
        Self {
            gcs_score: 15,
            gcs_status: ConsciousnessLevel::Alert,
            orientation: "Oriented x3".to_string(),
        }
    }
}

/// Partial update for [`MentalStatus`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MentalStatusPatch {
    pub gcs_score: Option<u8>,
    pub gcs_status: Option<ConsciousnessLevel>,
    pub orientation: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PupilReaction {
    #[default]
    Prompt,
    Sluggish,
    Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pupil {
    pub size_mm: f32,
    pub reaction: PupilReaction,
}

impl Pupil {
    pub const NORMAL: Pupil = Pupil {
        size_mm: 3.0,
        reaction: PupilReaction::Prompt,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PupilResponse {
    pub left: Pupil,
    pub right: Pupil,
}

impl PupilResponse {
    pub const NORMAL: PupilResponse = PupilResponse {
        left: Pupil::NORMAL,
        right: Pupil::NORMAL,
    };
}

const CRANIAL_NERVE_NAMES: [&str; 12] = [
    "I Olfactory",
    "II Optic",
    "III Oculomotor",
    "IV Trochlear",
    "V Trigeminal",
    "VI Abducens",
    "VII Facial",
    "VIII Vestibulocochlear",
    "IX Glossopharyngeal",
    "X Vagus",
    "XI Accessory",
    "XII Hypoglossal",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CranialNerveExam {
    pub nerve: String,
    pub finding: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CranialNerves {
    pub nerves: Vec<CranialNerveExam>,
}

impl CranialNerves {
    /// All twelve nerves recorded as "Normal".
    pub fn normal() -> Self {
        Self {
            nerves: CRANIAL_NERVE_NAMES
                .iter()
                .map(|name| CranialNerveExam {
                    nerve: name.to_string(),
                    finding: "Normal".to_string(),
                })
                .collect(),
        }
    }

    /// Sets the finding for one nerve. Returns `false` if no nerve has that name.
    pub fn set_finding(&mut self, nerve: &str, finding: impl Into<String>) -> bool {
        match self.nerves.iter_mut().find(|n| n.nerve == nerve) {
            Some(exam) => {
                exam.finding = finding.into();
                true
            }
            None => false,
        }
    }
}

/// Motor power on the MRC 0-5 scale per limb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MotorPower {
    pub left_upper: u8,
    pub right_upper: u8,
    pub left_lower: u8,
    pub right_lower: u8,
}

impl MotorPower {
    pub const NORMAL: MotorPower = MotorPower {
        left_upper: 5,
        right_upper: 5,
        left_lower: 5,
        right_lower: 5,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vitals_patch_only_touches_set_fields() {
        let mut vitals = Vitals::NORMAL;
        VitalsPatch {
            hr: Some(130),
            bt: Some(38.9),
            ..Default::default()
        }
        .apply_to(&mut vitals);
        assert_eq!(vitals.hr, 130);
        assert_eq!(vitals.bt, 38.9);
        assert_eq!(vitals.sbp, 120);
        assert_eq!(vitals.spo2, 98);
    }

    #[test]
    fn cranial_nerves_normal_has_twelve_entries() {
        let nerves = CranialNerves::normal();
        assert_eq!(nerves.nerves.len(), 12);
        assert!(nerves.nerves.iter().all(|n| n.finding == "Normal"));
    }

    #[test]
    fn set_finding_unknown_nerve_is_reported() {
        let mut nerves = CranialNerves::normal();
        assert!(nerves.set_finding("VII Facial", "Left facial droop"));
        assert!(!nerves.set_finding("XIII", "n/a"));
        assert_eq!(nerves.nerves[6].finding, "Left facial droop");
    }

    #[test]
    fn semi_coma_serializes_with_hyphen() {
        let json = serde_json::to_string(&ConsciousnessLevel::SemiComa).unwrap();
        assert_eq!(json, "\"Semi-coma\"");
    }
}
