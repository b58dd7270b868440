//! Anatomical spot catalog.

use serde::{Deserialize, Serialize};

/// Sentinel spot meaning "the whole body". Seeded into empty location sets.
pub const WHOLE_BODY_SPOT_KEY: &str = "whole_body";

/// A named anatomical location a finding or effect can be attached to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Spot {
    pub key: String,
    pub display_name: String,
    pub region: String,
}

const SPOT_ROWS: &[(&str, &str, &str)] = &[
    (WHOLE_BODY_SPOT_KEY, "Whole body", "general"),
    ("head", "Head", "head"),
    ("face", "Face", "head"),
    ("left_eye", "Left eye", "head"),
    ("right_eye", "Right eye", "head"),
    ("neck", "Neck", "neck"),
    ("chest", "Chest", "torso"),
    ("left_chest", "Left chest", "torso"),
    ("right_chest", "Right chest", "torso"),
    ("abdomen", "Abdomen", "torso"),
    ("ruq", "Right upper quadrant", "torso"),
    ("luq", "Left upper quadrant", "torso"),
    ("rlq", "Right lower quadrant", "torso"),
    ("llq", "Left lower quadrant", "torso"),
    ("back", "Back", "torso"),
    ("pelvis", "Pelvis", "torso"),
    ("left_arm", "Left arm", "upper_limb"),
    ("right_arm", "Right arm", "upper_limb"),
    ("left_hand", "Left hand", "upper_limb"),
    ("right_hand", "Right hand", "upper_limb"),
    ("left_leg", "Left leg", "lower_limb"),
    ("right_leg", "Right leg", "lower_limb"),
    ("left_foot", "Left foot", "lower_limb"),
    ("right_foot", "Right foot", "lower_limb"),
];

pub(crate) fn builtin_spots() -> Vec<Spot> {
    SPOT_ROWS
        .iter()
        .map(|(key, name, region)| Spot {
            key: key.to_string(),
            display_name: name.to_string(),
            region: region.to_string(),
        })
        .collect()
}
