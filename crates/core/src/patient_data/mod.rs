//! Patient data: the clinical picture a scenario presents.
//!
//! A [`PatientData`] is built incrementally by an author. Exam sections are optional and
//! absent until explicitly added (absent is not the same as "all zero"); list sections hold
//! keyed items addressed by [`medsim_uuid::ItemKey`].

pub mod findings;
pub mod labs;
pub mod sections;

pub use findings::{Finding, FindingPatch, FindingSection};
pub use labs::{LabResult, LabResultPatch};
pub use sections::{
    ConsciousnessLevel, CranialNerveExam, CranialNerves, MentalStatus, MentalStatusPatch,
    MotorPower, Pupil, PupilReaction, PupilResponse, Vitals, VitalsPatch,
};

use crate::{AuthoringError, AuthoringResult};
use medsim_reference::WHOLE_BODY_SPOT_KEY;
use medsim_types::PatientType;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientData {
    pub patient_type: PatientType,
    pub symptom_name: String,
    pub chief_complaint: String,
    pub prompt: String,
    /// Spot keys. Ordered, but treated as a set by the editing operations.
    pub locations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vitals: Option<Vitals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mental_status: Option<MentalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pupil_response: Option<PupilResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cranial_nerves: Option<CranialNerves>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motor_power: Option<MotorPower>,
    pub imaging_results: Vec<Finding>,
    pub lab_results: Vec<LabResult>,
    pub inspection_results: Vec<Finding>,
    pub palpation_results: Vec<Finding>,
    pub percussion_results: Vec<Finding>,
    pub auscultation_results: Vec<Finding>,
}

/// The optional assessed sections of [`PatientData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExamSection {
    Vitals,
    MentalStatus,
    PupilResponse,
    CranialNerves,
    MotorPower,
}

impl ExamSection {
    pub const ALL: [ExamSection; 5] = [
        ExamSection::Vitals,
        ExamSection::MentalStatus,
        ExamSection::PupilResponse,
        ExamSection::CranialNerves,
        ExamSection::MotorPower,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vitals => "vitals",
            Self::MentalStatus => "mental status",
            Self::PupilResponse => "pupil response",
            Self::CranialNerves => "cranial nerves",
            Self::MotorPower => "motor power",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let normalised = s.trim().replace(['_', '-'], " ");
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(&normalised))
    }
}

impl PatientData {
    pub fn has_section(&self, section: ExamSection) -> bool {
        match section {
            ExamSection::Vitals => self.vitals.is_some(),
            ExamSection::MentalStatus => self.mental_status.is_some(),
            ExamSection::PupilResponse => self.pupil_response.is_some(),
            ExamSection::CranialNerves => self.cranial_nerves.is_some(),
            ExamSection::MotorPower => self.motor_power.is_some(),
        }
    }

    /// Marks a section as assessed, seeding it with the normal defaults.
    ///
    /// Returns `false` and leaves existing values untouched when the section is already
    /// present.
    pub fn add_section(&mut self, section: ExamSection) -> bool {
        if self.has_section(section) {
            return false;
        }
        match section {
            ExamSection::Vitals => self.vitals = Some(Vitals::NORMAL),
            ExamSection::MentalStatus => self.mental_status = Some(MentalStatus::normal()),
            ExamSection::PupilResponse => self.pupil_response = Some(PupilResponse::NORMAL),
            ExamSection::CranialNerves => self.cranial_nerves = Some(CranialNerves::normal()),
            ExamSection::MotorPower => self.motor_power = Some(MotorPower::NORMAL),
        }
        tracing::debug!(section = section.as_str(), "section added");
        true
    }

    /// Marks a section as not assessed. Returns `false` if it was already absent.
    pub fn remove_section(&mut self, section: ExamSection) -> bool {
        let was_present = self.has_section(section);
        match section {
            ExamSection::Vitals => self.vitals = None,
            ExamSection::MentalStatus => self.mental_status = None,
            ExamSection::PupilResponse => self.pupil_response = None,
            ExamSection::CranialNerves => self.cranial_nerves = None,
            ExamSection::MotorPower => self.motor_power = None,
        }
        was_present
    }

    pub fn update_vitals(&mut self, patch: VitalsPatch) -> AuthoringResult<()> {
        let vitals = self
            .vitals
            .as_mut()
            .ok_or(AuthoringError::SectionAbsent(ExamSection::Vitals.as_str()))?;
        patch.apply_to(vitals);
        Ok(())
    }

    pub fn update_mental_status(&mut self, patch: MentalStatusPatch) -> AuthoringResult<()> {
        if let Some(score) = patch.gcs_score {
            if !MentalStatus::GCS_RANGE.contains(&score) {
                return Err(AuthoringError::InvalidInput(format!(
                    "GCS score must be between 3 and 15, got {score}"
                )));
            }
        }
        let status = self
            .mental_status
            .as_mut()
            .ok_or(AuthoringError::SectionAbsent(ExamSection::MentalStatus.as_str()))?;
        if let Some(score) = patch.gcs_score {
            status.gcs_score = score;
        }
        if let Some(level) = patch.gcs_status {
            status.gcs_status = level;
        }
        if let Some(orientation) = patch.orientation {
            status.orientation = orientation;
        }
        Ok(())
    }

    /// Adds a spot key. Returns `false` if it was already present.
    pub fn add_location(&mut self, spot_key: impl Into<String>) -> bool {
        let spot_key = spot_key.into();
        if self.locations.contains(&spot_key) {
            return false;
        }
        self.locations.push(spot_key);
        true
    }

    /// Removes a spot key. Returns `false` if it was not present.
    pub fn remove_location(&mut self, spot_key: &str) -> bool {
        let before = self.locations.len();
        self.locations.retain(|k| k != spot_key);
        self.locations.len() != before
    }

    /// Seeds the whole-body spot when no location is set. Returns `true` if it seeded.
    pub fn ensure_default_location(&mut self) -> bool {
        if !self.locations.is_empty() {
            return false;
        }
        self.locations.push(WHOLE_BODY_SPOT_KEY.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_vitals_yields_canonical_defaults() {
        let mut data = PatientData::default();
        assert!(data.add_section(ExamSection::Vitals));
        assert_eq!(
            data.vitals,
            Some(Vitals {
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
            })
        );
    }

    #[test]
    fn add_section_keeps_existing_values() {
        let mut data = PatientData::default();
        data.add_section(ExamSection::MotorPower);
        if let Some(motor) = data.motor_power.as_mut() {
            motor.left_lower = 2;
        }
        assert!(!data.add_section(ExamSection::MotorPower));
        assert_eq!(data.motor_power.map(|m| m.left_lower), Some(2));
    }

    #[test]
    fn remove_then_add_restores_defaults() {
        let mut data = PatientData::default();
        for section in ExamSection::ALL {
            data.add_section(section);
        }
        data.update_vitals(VitalsPatch {
            hr: Some(150),
            ..Default::default()
        })
        .unwrap();

        for section in ExamSection::ALL {
            assert!(data.remove_section(section));
            assert!(!data.has_section(section));
            assert!(!data.remove_section(section));
        }

        data.add_section(ExamSection::Vitals);
        data.add_section(ExamSection::MentalStatus);
        data.add_section(ExamSection::PupilResponse);
        assert_eq!(data.vitals, Some(Vitals::NORMAL));
        assert_eq!(data.mental_status, Some(MentalStatus::normal()));
        assert_eq!(data.pupil_response, Some(PupilResponse::NORMAL));
    }

    #[test]
    fn updating_absent_section_is_an_error() {
        let mut data = PatientData::default();
        let err = data
            .update_vitals(VitalsPatch::default())
            .expect_err("vitals absent");
        assert!(matches!(err, AuthoringError::SectionAbsent("vitals")));
    }

    #[test]
    fn gcs_score_is_range_checked() {
        let mut data = PatientData::default();
        data.add_section(ExamSection::MentalStatus);
        let err = data
            .update_mental_status(MentalStatusPatch {
                gcs_score: Some(2),
                ..Default::default()
            })
            .expect_err("out of range");
        assert!(matches!(err, AuthoringError::InvalidInput(_)));

        data.update_mental_status(MentalStatusPatch {
            gcs_score: Some(8),
            gcs_status: Some(ConsciousnessLevel::Stupor),
            orientation: None,
        })
        .unwrap();
        let status = data.mental_status.as_ref().unwrap();
        assert_eq!(status.gcs_score, 8);
        assert_eq!(status.gcs_status, ConsciousnessLevel::Stupor);
        assert_eq!(status.orientation, "Oriented x3");
    }

    #[test]
    fn locations_have_set_semantics() {
        let mut data = PatientData::default();
        assert!(data.add_location("chest"));
        assert_eq!(data.locations.len(), 1);
        assert!(!data.add_location("chest"));
        assert_eq!(data.locations.len(), 1);
        assert!(data.add_location("abdomen"));
        assert_eq!(data.locations.len(), 2);

        assert!(data.remove_location("chest"));
        assert!(!data.remove_location("chest"));
        assert_eq!(data.locations, ["abdomen"]);
    }

    #[test]
    fn default_location_is_seeded_only_when_empty() {
        let mut data = PatientData::default();
        assert!(data.ensure_default_location());
        assert_eq!(data.locations, [WHOLE_BODY_SPOT_KEY]);
        assert!(!data.ensure_default_location());
        assert_eq!(data.locations.len(), 1);
    }

    #[test]
    fn absent_sections_are_omitted_from_documents() {
        let mut data = PatientData::default();
        data.add_section(ExamSection::Vitals);
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("vitals").is_some());
        assert!(json.get("mentalStatus").is_none());
        assert_eq!(json["patientType"], "Adult_Male");
        assert!(json["labResults"].as_array().unwrap().is_empty());
    }

    #[test]
    fn missing_document_fields_take_defaults() {
        let data: PatientData =
            serde_json::from_str(r#"{"patientType":"Pregnant","chiefComplaint":"Headache"}"#)
                .unwrap();
        assert_eq!(data.patient_type, PatientType::Pregnant);
        assert_eq!(data.chief_complaint, "Headache");
        assert!(data.vitals.is_none());
        assert!(data.locations.is_empty());
    }

    #[test]
    fn exam_section_parse_accepts_snake_case() {
        assert_eq!(ExamSection::parse("mental_status"), Some(ExamSection::MentalStatus));
        assert_eq!(ExamSection::parse("Vitals"), Some(ExamSection::Vitals));
        assert_eq!(ExamSection::parse("reflexes"), None);
    }
}
