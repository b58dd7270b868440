//! Scenario events: metadata plus an ordered list of actions.

use crate::action::EventAction;
use crate::{AuthoringError, AuthoringResult};
use chrono::NaiveDate;
use medsim_types::PatientType;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    #[default]
    PatientEvent,
    NpcEvent,
    EmrUpdate,
    PlayerEvent,
}

const NPC_CLASSIFICATIONS: &[&str] = &["Nurse", "Doctor", "Caregiver", "Paramedic"];
const PLAYER_CLASSIFICATIONS: &[&str] = &["Nurse", "Doctor", "Paramedic"];

impl EventCategory {
    pub const ALL: [EventCategory; 4] = [
        EventCategory::PatientEvent,
        EventCategory::NpcEvent,
        EventCategory::EmrUpdate,
        EventCategory::PlayerEvent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PatientEvent => "patient_event",
            Self::NpcEvent => "npc_event",
            Self::EmrUpdate => "emr_update",
            Self::PlayerEvent => "player_event",
        }
    }

    pub fn parse(s: &str) -> AuthoringResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AuthoringError::InvalidInput(format!("Unknown event category: {}", s)))
    }

    /// Classifications an event of this category may target.
    pub fn classification_options(&self) -> Vec<&'static str> {
        match self {
            Self::PatientEvent => PatientType::ALL.iter().map(PatientType::as_str).collect(),
            Self::NpcEvent => NPC_CLASSIFICATIONS.to_vec(),
            Self::PlayerEvent => PLAYER_CLASSIFICATIONS.to_vec(),
            Self::EmrUpdate => Vec::new(),
        }
    }
}

/// Condition that starts an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    NpcSpawn,
    ScenarioStart,
    TimeElapsed,
    PlayerInteract,
    ItemUsed,
    PatientStateChanged,
    QuizAnswered,
    Manual,
}

/// Trigger given to events created through [`Event::new`].
pub const DEFAULT_TRIGGER: Trigger = Trigger::NpcSpawn;

impl Trigger {
    pub const ALL: [Trigger; 8] = [
        Trigger::NpcSpawn,
        Trigger::ScenarioStart,
        Trigger::TimeElapsed,
        Trigger::PlayerInteract,
        Trigger::ItemUsed,
        Trigger::PatientStateChanged,
        Trigger::QuizAnswered,
        Trigger::Manual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NpcSpawn => "npc_spawn",
            Self::ScenarioStart => "scenario_start",
            Self::TimeElapsed => "time_elapsed",
            Self::PlayerInteract => "player_interact",
            Self::ItemUsed => "item_used",
            Self::PatientStateChanged => "patient_state_changed",
            Self::QuizAnswered => "quiz_answered",
            Self::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> AuthoringResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AuthoringError::InvalidInput(format!("Unknown trigger: {}", s)))
    }
}

/// Accepts `""` and `null` as "no trigger".
fn deserialize_optional_trigger<'de, D>(deserializer: D) -> Result<Option<Trigger>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Trigger::parse(s).map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoleType {
    Nurse,
    Doctor,
    Patient,
    Caregiver,
    Paramedic,
}

impl RoleType {
    pub const ALL: [RoleType; 5] = [
        RoleType::Nurse,
        RoleType::Doctor,
        RoleType::Patient,
        RoleType::Caregiver,
        RoleType::Paramedic,
    ];
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    #[default]
    Active,
    Inactive,
}

/// Where an asset came from. Presets ship with the platform and are read-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetSource {
    #[default]
    Asset,
    Preset,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    /// Empty until the first save.
    pub id: String,
    pub key: String,
    pub display_name: String,
    pub description: String,
    pub category: EventCategory,
    #[serde(deserialize_with = "deserialize_optional_trigger")]
    pub trigger: Option<Trigger>,
    pub role_types: BTreeSet<RoleType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    pub target: Vec<String>,
    pub actions: Vec<EventAction>,
    pub status: AssetStatus,
    pub usage_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<NaiveDate>,
    pub source: AssetSource,
}

impl Event {
    /// A blank event of `category` with [`DEFAULT_TRIGGER`] set. Documents that omit the
    /// trigger decode with none.
    pub fn new(category: EventCategory) -> Self {
        Self {
            category,
            trigger: Some(DEFAULT_TRIGGER),
            ..Default::default()
        }
    }

    pub fn is_editable(&self) -> bool {
        self.source == AssetSource::Asset
    }

    /// Changes the category, clearing any classification chosen for the old one.
    pub fn set_category(&mut self, category: EventCategory) {
        if self.category == category {
            return;
        }
        self.category = category;
        self.classification = None;
        self.target.clear();
    }

    /// Sets the classification, which must be one of the options for the current category.
    /// `target` mirrors it.
    pub fn set_classification(&mut self, classification: &str) -> AuthoringResult<()> {
        let options = self.category.classification_options();
        let Some(option) = options.iter().find(|o| **o == classification) else {
            return Err(AuthoringError::InvalidInput(format!(
                "'{}' is not a classification of {} (expected one of: {})",
                classification,
                self.category.as_str(),
                options.join(", ")
            )));
        };
        self.classification = Some(option.to_string());
        self.target = vec![option.to_string()];
        Ok(())
    }

    pub fn action(&self, id: &str) -> Option<&EventAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn action_mut(&mut self, id: &str) -> Option<&mut EventAction> {
        self.actions.iter_mut().find(|a| a.id == id)
    }

    /// Symptom template keys referenced by `apply_symptom` and `symptom_info` actions.
    pub fn symptom_keys(&self) -> Vec<&str> {
        use crate::action::ActionParams;

        self.actions
            .iter()
            .filter_map(|a| match &a.params {
                ActionParams::ApplySymptom(p) | ActionParams::SymptomInfo(p) => {
                    Some(p.symptom_key.as_str())
                }
                _ => None,
            })
            .filter(|k| !k.is_empty())
            .collect()
    }
}

/// Partial update for event metadata. `None` leaves a field unchanged; `trigger: Some(None)`
/// clears the trigger.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EventPatch {
    pub key: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub trigger: Option<Option<Trigger>>,
    pub status: Option<AssetStatus>,
}

impl EventPatch {
    pub(crate) fn apply_to(self, event: &mut Event) {
        if let Some(key) = self.key {
            event.key = key;
        }
        if let Some(display_name) = self.display_name {
            event.display_name = display_name;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if let Some(trigger) = self.trigger {
            event.trigger = trigger;
        }
        if let Some(status) = self.status {
            event.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionParams, ActionType, EventAction, SymptomRefParams};
    use serde_json::json;

    #[test]
    fn category_change_resets_classification() {
        let mut event = Event::new(EventCategory::NpcEvent);
        event.set_classification("Caregiver").unwrap();
        assert_eq!(event.target, ["Caregiver"]);

        event.set_category(EventCategory::PlayerEvent);
        assert_eq!(event.classification, None);
        assert!(event.target.is_empty());
    }

    #[test]
    fn same_category_keeps_classification() {
        let mut event = Event::new(EventCategory::NpcEvent);
        event.set_classification("Nurse").unwrap();
        event.set_category(EventCategory::NpcEvent);
        assert_eq!(event.classification.as_deref(), Some("Nurse"));
    }

    #[test]
    fn classification_must_belong_to_category() {
        let mut event = Event::new(EventCategory::PlayerEvent);
        let err = event.set_classification("Caregiver").expect_err("not a player role");
        assert!(matches!(err, AuthoringError::InvalidInput(_)));

        let mut patient = Event::new(EventCategory::PatientEvent);
        patient.set_classification("Elderly_Female").unwrap();
        assert_eq!(patient.target, ["Elderly_Female"]);

        assert!(EventCategory::EmrUpdate.classification_options().is_empty());
    }

    #[test]
    fn new_events_start_with_default_trigger() {
        assert_eq!(Event::new(EventCategory::NpcEvent).trigger, Some(DEFAULT_TRIGGER));
        assert_eq!(Event::default().trigger, None);
    }

    #[test]
    fn blank_trigger_decodes_as_unset() {
        let event: Event = serde_json::from_value(json!({"key": "k", "trigger": ""})).unwrap();
        assert_eq!(event.trigger, None);

        let event: Event =
            serde_json::from_value(json!({"trigger": "time_elapsed"})).unwrap();
        assert_eq!(event.trigger, Some(Trigger::TimeElapsed));

        assert!(serde_json::from_value::<Event>(json!({"trigger": "sunrise"})).is_err());
    }

    #[test]
    fn document_shape_is_camel_case() {
        let mut event = Event::new(EventCategory::NpcEvent);
        event.display_name = "Nurse arrives".into();
        event.role_types.insert(RoleType::Nurse);
        event.created_date = NaiveDate::from_ymd_opt(2026, 3, 1);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["displayName"], "Nurse arrives");
        assert_eq!(json["category"], "npc_event");
        assert_eq!(json["roleTypes"], json!(["Nurse"]));
        assert_eq!(json["createdDate"], "2026-03-01");
        assert_eq!(json["status"], "active");
        assert_eq!(json["source"], "asset");
        assert!(json.get("updatedDate").is_none());
    }

    #[test]
    fn symptom_keys_skip_blank_references() {
        let mut event = Event::new(EventCategory::PatientEvent);
        event.actions.push(EventAction::new("1", ActionType::ApplySymptom));
        let mut info = EventAction::new("2", ActionType::SymptomInfo);
        info.params = ActionParams::SymptomInfo(SymptomRefParams {
            symptom_key: "chest_pain".into(),
        });
        event.actions.push(info);
        event.actions.push(EventAction::new("3", ActionType::PlayVoice));

        assert_eq!(event.symptom_keys(), ["chest_pain"]);
    }

    #[test]
    fn patch_can_clear_trigger() {
        let mut event = Event {
            trigger: Some(Trigger::Manual),
            ..Default::default()
        };
        EventPatch {
            trigger: Some(None),
            key: Some("k".into()),
            ..Default::default()
        }
        .apply_to(&mut event);
        assert_eq!(event.trigger, None);
        assert_eq!(event.key, "k");
    }
}
