//! Physical exam and imaging findings: keyed list items.

use super::PatientData;
use crate::{AuthoringError, AuthoringResult};
use medsim_uuid::ItemKey;
use serde::{Deserialize, Serialize};

/// One recorded finding. `kind` is the finding type chosen by the author (for imaging, the
/// modality).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    #[serde(default = "ItemKey::generate")]
    pub key: ItemKey,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub finding: String,
}

/// Partial update for a [`Finding`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindingPatch {
    pub kind: Option<String>,
    pub location: Option<String>,
    pub finding: Option<String>,
}

/// The finding lists carried by [`PatientData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FindingSection {
    Imaging,
    Inspection,
    Palpation,
    Percussion,
    Auscultation,
}

impl FindingSection {
    pub const ALL: [FindingSection; 5] = [
        FindingSection::Imaging,
        FindingSection::Inspection,
        FindingSection::Palpation,
        FindingSection::Percussion,
        FindingSection::Auscultation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imaging => "imaging",
            Self::Inspection => "inspection",
            Self::Palpation => "palpation",
            Self::Percussion => "percussion",
            Self::Auscultation => "auscultation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
    }
}

impl PatientData {
    pub fn findings(&self, section: FindingSection) -> &[Finding] {
        match section {
            FindingSection::Imaging => &self.imaging_results,
            FindingSection::Inspection => &self.inspection_results,
            FindingSection::Palpation => &self.palpation_results,
            FindingSection::Percussion => &self.percussion_results,
            FindingSection::Auscultation => &self.auscultation_results,
        }
    }

    fn findings_mut(&mut self, section: FindingSection) -> &mut Vec<Finding> {
        match section {
            FindingSection::Imaging => &mut self.imaging_results,
            FindingSection::Inspection => &mut self.inspection_results,
            FindingSection::Palpation => &mut self.palpation_results,
            FindingSection::Percussion => &mut self.percussion_results,
            FindingSection::Auscultation => &mut self.auscultation_results,
        }
    }

    /// Appends an empty finding of `kind` and returns its key.
    pub fn add_finding(&mut self, section: FindingSection, kind: impl Into<String>) -> ItemKey {
        let key = ItemKey::generate();
        self.findings_mut(section).push(Finding {
            key: key.clone(),
            kind: kind.into(),
            location: String::new(),
            finding: String::new(),
        });
        tracing::debug!(section = section.as_str(), key = %key, "finding added");
        key
    }

    /// Merges `patch` into the finding addressed by `key`.
    pub fn update_finding(
        &mut self,
        section: FindingSection,
        key: &ItemKey,
        patch: FindingPatch,
    ) -> AuthoringResult<()> {
        let finding = self
            .findings_mut(section)
            .iter_mut()
            .find(|f| &f.key == key)
            .ok_or_else(|| AuthoringError::ItemNotFound(key.to_string()))?;

        if let Some(kind) = patch.kind {
            finding.kind = kind;
        }
        if let Some(location) = patch.location {
            finding.location = location;
        }
        if let Some(text) = patch.finding {
            finding.finding = text;
        }
        Ok(())
    }

    /// Removes the finding addressed by `key`.
    pub fn remove_finding(&mut self, section: FindingSection, key: &ItemKey) -> AuthoringResult<()> {
        let list = self.findings_mut(section);
        let index = list
            .iter()
            .position(|f| &f.key == key)
            .ok_or_else(|| AuthoringError::ItemNotFound(key.to_string()))?;
        list.remove(index);
        Ok(())
    }

    /// Clears a finding list, or only the findings of one `kind`. Returns the number removed.
    pub fn reset_findings(&mut self, section: FindingSection, kind: Option<&str>) -> usize {
        let list = self.findings_mut(section);
        let before = list.len();
        match kind {
            Some(kind) => list.retain(|f| f.kind != kind),
            None => list.clear(),
        }
        before - list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_update_remove_by_key() {
        let mut data = PatientData::default();
        let key = data.add_finding(FindingSection::Palpation, "Tenderness");
        data.update_finding(
            FindingSection::Palpation,
            &key,
            FindingPatch {
                location: Some("rlq".into()),
                finding: Some("Rebound tenderness".into()),
                ..Default::default()
            },
        )
        .expect("key exists");

        let finding = &data.findings(FindingSection::Palpation)[0];
        assert_eq!(finding.kind, "Tenderness");
        assert_eq!(finding.location, "rlq");
        assert_eq!(finding.finding, "Rebound tenderness");

        data.remove_finding(FindingSection::Palpation, &key)
            .expect("key exists");
        assert!(data.findings(FindingSection::Palpation).is_empty());
    }

    #[test]
    fn stale_key_is_not_found() {
        let mut data = PatientData::default();
        let stale = ItemKey::from("gone");
        let err = data
            .update_finding(FindingSection::Imaging, &stale, FindingPatch::default())
            .expect_err("stale key");
        assert!(matches!(err, AuthoringError::ItemNotFound(k) if k == "gone"));
        assert!(data.remove_finding(FindingSection::Imaging, &stale).is_err());
    }

    #[test]
    fn keys_are_unique_and_sections_independent() {
        let mut data = PatientData::default();
        let a = data.add_finding(FindingSection::Imaging, "X-ray");
        let b = data.add_finding(FindingSection::Imaging, "X-ray");
        assert_ne!(a, b);
        assert!(data.findings(FindingSection::Auscultation).is_empty());
    }

    #[test]
    fn reset_by_kind_keeps_other_kinds() {
        let mut data = PatientData::default();
        data.add_finding(FindingSection::Imaging, "X-ray");
        data.add_finding(FindingSection::Imaging, "CT");
        data.add_finding(FindingSection::Imaging, "X-ray");

        assert_eq!(data.reset_findings(FindingSection::Imaging, Some("X-ray")), 2);
        assert_eq!(data.findings(FindingSection::Imaging).len(), 1);
        assert_eq!(data.reset_findings(FindingSection::Imaging, None), 1);
    }

    #[test]
    fn finding_type_field_is_renamed() {
        let finding = Finding {
            key: ItemKey::from("k1"),
            kind: "CT".into(),
            location: String::new(),
            finding: "No acute findings".into(),
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["type"], "CT");
        assert_eq!(json["key"], "k1");
    }
}
