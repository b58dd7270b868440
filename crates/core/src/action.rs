//! Event actions.
//!
//! An action's kind and its parameters are a single sum type ([`ActionParams`]), so a
//! document can never carry `type: quiz` with voice parameters. On the wire the kind is a
//! separate `type` field next to `params`; decoding dispatches on it and rejects unknown
//! kinds.

use crate::patient_data::{LabResult, PatientData};
use crate::{AuthoringError, AuthoringResult};
use serde::de::DeserializeOwned;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Discriminant of [`ActionParams`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    PlayVoice,
    PlaySound,
    PlayAnimation,
    PlayParticle,
    #[serde(rename = "change_3d_model")]
    Change3dModel,
    ChangeTexture,
    ItemAction,
    SymptomInfo,
    ChangePatientData,
    ApplySymptom,
    EmrUpdate,
    Quiz,
    SendMessage,
}

impl ActionType {
    pub const ALL: [ActionType; 13] = [
        ActionType::PlayVoice,
        ActionType::PlaySound,
        ActionType::PlayAnimation,
        ActionType::PlayParticle,
        ActionType::Change3dModel,
        ActionType::ChangeTexture,
        ActionType::ItemAction,
        ActionType::SymptomInfo,
        ActionType::ChangePatientData,
        ActionType::ApplySymptom,
        ActionType::EmrUpdate,
        ActionType::Quiz,
        ActionType::SendMessage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PlayVoice => "play_voice",
            Self::PlaySound => "play_sound",
            Self::PlayAnimation => "play_animation",
            Self::PlayParticle => "play_particle",
            Self::Change3dModel => "change_3d_model",
            Self::ChangeTexture => "change_texture",
            Self::ItemAction => "item_action",
            Self::SymptomInfo => "symptom_info",
            Self::ChangePatientData => "change_patient_data",
            Self::ApplySymptom => "apply_symptom",
            Self::EmrUpdate => "emr_update",
            Self::Quiz => "quiz",
            Self::SendMessage => "send_message",
        }
    }

    pub fn parse(s: &str) -> AuthoringResult<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AuthoringError::InvalidInput(format!("Unknown action type: {}", s)))
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VoiceParams {
    pub text: String,
    pub voice: String,
    pub volume: f32,
    pub speed: f32,
}

impl Default for VoiceParams {
    fn default() -> Self {
        Self {
            text: String::new(),
            voice: String::new(),
            volume: 1.0,
            speed: 1.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SoundParams {
    pub category: String,
    pub name: String,
    pub trigger_type: String,
    pub target_ids: Vec<String>,
    pub url: String,
}

/// Parameters shared by animation and 3D model changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaParams {
    pub category: String,
    pub name: String,
    pub url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticleParams {
    pub particle_id: String,
    pub spot_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextureParams {
    pub category: String,
    pub name: String,
    pub spot_id: String,
    pub url: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemActionKind {
    #[default]
    Wear,
    Remove,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemParams {
    pub item_key: String,
    pub item_type: String,
    pub category: String,
    pub name: String,
    pub action: ItemActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

/// Reference to a symptom template by key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SymptomRefParams {
    pub symptom_key: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmrParams {
    pub patient_info: String,
    pub order: String,
    pub io: String,
    pub nursing_note: String,
    pub lab_results: Vec<LabResult>,
}

/// Multiple-choice question. Always carries at least two options and an in-range answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuizParams {
    pub question: String,
    pub options: Vec<String>,
    pub answer: usize,
}

impl Default for QuizParams {
    fn default() -> Self {
        Self {
            question: String::new(),
            options: vec![String::new(), String::new()],
            answer: 0,
        }
    }
}

impl QuizParams {
    pub const MIN_OPTIONS: usize = 2;

    pub fn add_option(&mut self, text: impl Into<String>) {
        self.options.push(text.into());
    }

    /// Removes an option. An answer after the removed option shifts down with it.
    ///
    /// Returns `true` when the removed option was the answer; the answer is then reset to
    /// the first option and the caller should ask the author to pick again.
    pub fn remove_option(&mut self, index: usize) -> AuthoringResult<bool> {
        if index >= self.options.len() {
            return Err(AuthoringError::InvalidInput(format!(
                "Quiz option {index} does not exist"
            )));
        }
        if self.options.len() <= Self::MIN_OPTIONS {
            return Err(AuthoringError::InvalidInput(format!(
                "A quiz needs at least {} options",
                Self::MIN_OPTIONS
            )));
        }
        self.options.remove(index);
        if self.answer == index {
            self.answer = 0;
            return Ok(true);
        }
        if self.answer > index {
            self.answer -= 1;
        }
        Ok(false)
    }

    pub fn set_answer(&mut self, index: usize) -> AuthoringResult<()> {
        if index >= self.options.len() {
            return Err(AuthoringError::InvalidInput(format!(
                "Quiz answer {index} is out of range ({} options)",
                self.options.len()
            )));
        }
        self.answer = index;
        Ok(())
    }

    fn check(&self) -> AuthoringResult<()> {
        if self.options.len() < Self::MIN_OPTIONS {
            return Err(AuthoringError::Translation(format!(
                "params.options: a quiz needs at least {} options",
                Self::MIN_OPTIONS
            )));
        }
        if self.answer >= self.options.len() {
            return Err(AuthoringError::Translation(format!(
                "params.answer: {} is out of range for {} options",
                self.answer,
                self.options.len()
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageParams {
    pub message: String,
}

/// Action kind together with its parameters.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionParams {
    PlayVoice(VoiceParams),
    PlaySound(SoundParams),
    PlayAnimation(MediaParams),
    PlayParticle(ParticleParams),
    Change3dModel(MediaParams),
    ChangeTexture(TextureParams),
    ItemAction(ItemParams),
    SymptomInfo(SymptomRefParams),
    ChangePatientData(Box<PatientData>),
    ApplySymptom(SymptomRefParams),
    EmrUpdate(EmrParams),
    Quiz(QuizParams),
    SendMessage(MessageParams),
}

impl ActionParams {
    /// Empty parameters for a freshly added action of `action_type`.
    pub fn default_for(action_type: ActionType) -> Self {
        match action_type {
            ActionType::PlayVoice => Self::PlayVoice(VoiceParams::default()),
            ActionType::PlaySound => Self::PlaySound(SoundParams::default()),
            ActionType::PlayAnimation => Self::PlayAnimation(MediaParams::default()),
            ActionType::PlayParticle => Self::PlayParticle(ParticleParams::default()),
            ActionType::Change3dModel => Self::Change3dModel(MediaParams::default()),
            ActionType::ChangeTexture => Self::ChangeTexture(TextureParams::default()),
            ActionType::ItemAction => Self::ItemAction(ItemParams::default()),
            ActionType::SymptomInfo => Self::SymptomInfo(SymptomRefParams::default()),
            ActionType::ChangePatientData => {
                Self::ChangePatientData(Box::<PatientData>::default())
            }
            ActionType::ApplySymptom => Self::ApplySymptom(SymptomRefParams::default()),
            ActionType::EmrUpdate => Self::EmrUpdate(EmrParams::default()),
            ActionType::Quiz => Self::Quiz(QuizParams::default()),
            ActionType::SendMessage => Self::SendMessage(MessageParams::default()),
        }
    }

    pub fn action_type(&self) -> ActionType {
        match self {
            Self::PlayVoice(_) => ActionType::PlayVoice,
            Self::PlaySound(_) => ActionType::PlaySound,
            Self::PlayAnimation(_) => ActionType::PlayAnimation,
            Self::PlayParticle(_) => ActionType::PlayParticle,
            Self::Change3dModel(_) => ActionType::Change3dModel,
            Self::ChangeTexture(_) => ActionType::ChangeTexture,
            Self::ItemAction(_) => ActionType::ItemAction,
            Self::SymptomInfo(_) => ActionType::SymptomInfo,
            Self::ChangePatientData(_) => ActionType::ChangePatientData,
            Self::ApplySymptom(_) => ActionType::ApplySymptom,
            Self::EmrUpdate(_) => ActionType::EmrUpdate,
            Self::Quiz(_) => ActionType::Quiz,
            Self::SendMessage(_) => ActionType::SendMessage,
        }
    }

    /// One-line description for listings.
    pub fn summary(&self) -> String {
        fn or_dash(s: &str) -> &str {
            if s.trim().is_empty() {
                "-"
            } else {
                s
            }
        }

        match self {
            Self::PlayVoice(p) => format!("say \"{}\"", or_dash(&p.text)),
            Self::PlaySound(p) => format!("sound {}/{}", or_dash(&p.category), or_dash(&p.name)),
            Self::PlayAnimation(p) => format!("animation {}", or_dash(&p.name)),
            Self::PlayParticle(p) => {
                format!("particle {} at {}", or_dash(&p.particle_id), or_dash(&p.spot_id))
            }
            Self::Change3dModel(p) => format!("model {}", or_dash(&p.name)),
            Self::ChangeTexture(p) => {
                format!("texture {} at {}", or_dash(&p.name), or_dash(&p.spot_id))
            }
            Self::ItemAction(p) => {
                let verb = match p.action {
                    ItemActionKind::Wear => "wear",
                    ItemActionKind::Remove => "remove",
                };
                format!("{verb} {}", or_dash(&p.name))
            }
            Self::SymptomInfo(p) => format!("show symptom {}", or_dash(&p.symptom_key)),
            Self::ChangePatientData(data) => format!(
                "patient data ({}, {})",
                data.patient_type,
                or_dash(&data.chief_complaint)
            ),
            Self::ApplySymptom(p) => format!("apply symptom {}", or_dash(&p.symptom_key)),
            Self::EmrUpdate(p) => format!("EMR update ({} lab results)", p.lab_results.len()),
            Self::Quiz(p) => format!(
                "quiz \"{}\" ({} options)",
                or_dash(&p.question),
                p.options.len()
            ),
            Self::SendMessage(p) => format!("message \"{}\"", or_dash(&p.message)),
        }
    }

    /// Decodes the `params` value of a document for the given kind.
    ///
    /// A missing or null value yields the default parameters for that kind.
    pub(crate) fn from_value(
        action_type: ActionType,
        value: serde_json::Value,
    ) -> AuthoringResult<Self> {
        let params = match action_type {
            ActionType::PlayVoice => Self::PlayVoice(decode_params(value)?),
            ActionType::PlaySound => Self::PlaySound(decode_params(value)?),
            ActionType::PlayAnimation => Self::PlayAnimation(decode_params(value)?),
            ActionType::PlayParticle => Self::PlayParticle(decode_params(value)?),
            ActionType::Change3dModel => Self::Change3dModel(decode_params(value)?),
            ActionType::ChangeTexture => Self::ChangeTexture(decode_params(value)?),
            ActionType::ItemAction => Self::ItemAction(decode_params(value)?),
            ActionType::SymptomInfo => Self::SymptomInfo(decode_params(value)?),
            ActionType::ChangePatientData => {
                Self::ChangePatientData(Box::new(decode_params(value)?))
            }
            ActionType::ApplySymptom => Self::ApplySymptom(decode_params(value)?),
            ActionType::EmrUpdate => Self::EmrUpdate(decode_params(value)?),
            ActionType::Quiz => {
                let quiz: QuizParams = decode_params(value)?;
                quiz.check()?;
                Self::Quiz(quiz)
            }
            ActionType::SendMessage => Self::SendMessage(decode_params(value)?),
        };
        Ok(params)
    }
}

fn decode_params<T>(value: serde_json::Value) -> AuthoringResult<T>
where
    T: DeserializeOwned + Default,
{
    if value.is_null() {
        return Ok(T::default());
    }
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        let path = if path.is_empty() || path == "." {
            "params".to_string()
        } else {
            format!("params.{path}")
        };
        AuthoringError::Translation(format!("{path}: {}", err.into_inner()))
    })
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepeatKind {
    #[default]
    None,
    Once,
    Interval,
    Random,
}

/// Repeat timing in seconds. `interval` applies to [`RepeatKind::Interval`];
/// `interval_min`/`interval_max` bound a [`RepeatKind::Random`] delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepeatSettings {
    #[serde(rename = "type")]
    pub kind: RepeatKind,
    pub interval: u32,
    pub interval_min: u32,
    pub interval_max: u32,
}

/// One step of an event.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "EventActionWire")]
pub struct EventAction {
    pub id: String,
    pub params: ActionParams,
    pub repeat_settings: RepeatSettings,
}

impl EventAction {
    pub fn new(id: impl Into<String>, action_type: ActionType) -> Self {
        Self {
            id: id.into(),
            params: ActionParams::default_for(action_type),
            repeat_settings: RepeatSettings::default(),
        }
    }

    pub fn action_type(&self) -> ActionType {
        self.params.action_type()
    }
}

impl Serialize for EventAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EventAction", 4)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("type", &self.action_type())?;
        state.serialize_field("params", &self.params)?;
        state.serialize_field("repeatSettings", &self.repeat_settings)?;
        state.end()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct EventActionWire {
    #[serde(default)]
    id: String,
    #[serde(rename = "type")]
    action_type: ActionType,
    #[serde(default)]
    params: serde_json::Value,
    #[serde(default)]
    repeat_settings: RepeatSettings,
}

impl TryFrom<EventActionWire> for EventAction {
    type Error = AuthoringError;

    fn try_from(wire: EventActionWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: wire.id,
            params: ActionParams::from_value(wire.action_type, wire.params)?,
            repeat_settings: wire.repeat_settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_params_match_their_type() {
        for action_type in ActionType::ALL {
            assert_eq!(ActionParams::default_for(action_type).action_type(), action_type);
        }
    }

    #[test]
    fn type_names_round_trip_through_parse() {
        for action_type in ActionType::ALL {
            assert_eq!(ActionType::parse(action_type.as_str()).unwrap(), action_type);
            let json = serde_json::to_value(action_type).unwrap();
            assert_eq!(json, action_type.as_str());
        }
        assert!(ActionType::parse("dance").is_err());
    }

    #[test]
    fn new_voice_action_serializes_with_type_and_defaults() {
        let action = EventAction::new("a1", ActionType::PlayVoice);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "a1",
                "type": "play_voice",
                "params": {"text": "", "voice": "", "volume": 1.0, "speed": 1.0},
                "repeatSettings": {"type": "None", "interval": 0, "intervalMin": 0, "intervalMax": 0}
            })
        );
    }

    #[test]
    fn decode_dispatches_on_type() {
        let action: EventAction = serde_json::from_value(json!({
            "id": "a2",
            "type": "item_action",
            "params": {"itemKey": "gloves", "name": "Gloves", "action": "remove"},
            "repeatSettings": {"type": "Interval", "interval": 30}
        }))
        .unwrap();

        match &action.params {
            ActionParams::ItemAction(p) => {
                assert_eq!(p.item_key, "gloves");
                assert_eq!(p.action, ItemActionKind::Remove);
                assert_eq!(p.position, None);
            }
            other => panic!("expected item params, got {other:?}"),
        }
        assert_eq!(action.repeat_settings.kind, RepeatKind::Interval);
        assert_eq!(action.repeat_settings.interval, 30);
    }

    #[test]
    fn missing_params_take_defaults() {
        let action: EventAction =
            serde_json::from_value(json!({"id": "a3", "type": "quiz"})).unwrap();
        assert_eq!(action.params, ActionParams::Quiz(QuizParams::default()));
        assert_eq!(action.repeat_settings, RepeatSettings::default());
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let err = serde_json::from_value::<EventAction>(json!({"id": "x", "type": "teleport"}))
            .expect_err("unknown type");
        assert!(err.to_string().contains("teleport"));
    }

    #[test]
    fn param_errors_carry_a_path() {
        let err = serde_json::from_value::<EventAction>(json!({
            "id": "x",
            "type": "play_voice",
            "params": {"volume": "loud"}
        }))
        .expect_err("bad volume");
        assert!(err.to_string().contains("params.volume"));
    }

    #[test]
    fn quiz_documents_must_be_well_formed() {
        let one_option = json!({
            "id": "q", "type": "quiz",
            "params": {"question": "?", "options": ["only"], "answer": 0}
        });
        assert!(serde_json::from_value::<EventAction>(one_option).is_err());

        let bad_answer = json!({
            "id": "q", "type": "quiz",
            "params": {"question": "?", "options": ["a", "b"], "answer": 2}
        });
        let err = serde_json::from_value::<EventAction>(bad_answer).expect_err("answer range");
        assert!(err.to_string().contains("params.answer"));
    }

    #[test]
    fn quiz_option_editing_keeps_invariants() {
        let mut quiz = QuizParams::default();
        quiz.add_option("c");
        quiz.set_answer(2).unwrap();
        assert!(quiz.set_answer(3).is_err());

        assert!(!quiz.remove_option(0).unwrap());
        assert_eq!(quiz.options.len(), 2);
        assert_eq!(quiz.answer, 1);
        assert_eq!(quiz.options[quiz.answer], "c");

        let err = quiz.remove_option(0).expect_err("minimum reached");
        assert!(matches!(err, AuthoringError::InvalidInput(_)));
    }

    #[test]
    fn removing_the_answer_resets_it_and_reports_the_change() {
        let mut quiz = QuizParams {
            question: "First check?".into(),
            options: vec!["Airway".into(), "Breathing".into(), "Circulation".into()],
            answer: 2,
        };
        assert!(quiz.remove_option(2).unwrap());
        assert_eq!(quiz.answer, 0);
        assert_eq!(quiz.options, ["Airway", "Breathing"]);

        quiz.add_option("Disability");
        quiz.set_answer(1).unwrap();
        assert!(quiz.remove_option(1).unwrap());
        assert_eq!(quiz.answer, 0);
        assert_eq!(quiz.options[quiz.answer], "Airway");
    }

    #[test]
    fn change_patient_data_carries_inline_data() {
        let action: EventAction = serde_json::from_value(json!({
            "id": "p",
            "type": "change_patient_data",
            "params": {"patientType": "Newborn", "chiefComplaint": "Poor feeding"}
        }))
        .unwrap();
        let ActionParams::ChangePatientData(data) = &action.params else {
            panic!("expected patient data");
        };
        assert_eq!(data.chief_complaint, "Poor feeding");
        assert!(action.params.summary().contains("Poor feeding"));
    }

    #[test]
    fn summaries_mark_blank_fields() {
        assert_eq!(
            ActionParams::default_for(ActionType::ApplySymptom).summary(),
            "apply symptom -"
        );
        assert_eq!(
            ActionParams::default_for(ActionType::Quiz).summary(),
            "quiz \"-\" (2 options)"
        );
    }
}
