//! Small validated value types shared across the medsim crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,

    /// The input did not name a known patient classification
    #[error("Unknown patient type: {0}")]
    UnknownPatientType(String),
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Classification of a simulated patient.
///
/// The classification selects which normal-range column applies to labs and which
/// symptom category taxonomy a template may draw from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PatientType {
    #[default]
    #[serde(rename = "Adult_Male")]
    AdultMale,
    #[serde(rename = "Adult_Female")]
    AdultFemale,
    #[serde(rename = "Elderly_Male")]
    ElderlyMale,
    #[serde(rename = "Elderly_Female")]
    ElderlyFemale,
    #[serde(rename = "Pregnant")]
    Pregnant,
    #[serde(rename = "Pediatric")]
    Pediatric,
    #[serde(rename = "Newborn")]
    Newborn,
}

impl PatientType {
    /// Every classification, in display order.
    pub const ALL: [PatientType; 7] = [
        PatientType::AdultMale,
        PatientType::AdultFemale,
        PatientType::ElderlyMale,
        PatientType::ElderlyFemale,
        PatientType::Pregnant,
        PatientType::Pediatric,
        PatientType::Newborn,
    ];

    /// Returns the document representation of this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AdultMale => "Adult_Male",
            Self::AdultFemale => "Adult_Female",
            Self::ElderlyMale => "Elderly_Male",
            Self::ElderlyFemale => "Elderly_Female",
            Self::Pregnant => "Pregnant",
            Self::Pediatric => "Pediatric",
            Self::Newborn => "Newborn",
        }
    }

    /// Parses a classification, ignoring case and accepting `-` or a space for `_`.
    pub fn parse(s: &str) -> Result<Self, TextError> {
        let normalised = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|pt| pt.as_str().to_ascii_lowercase() == normalised)
            .ok_or_else(|| TextError::UnknownPatientType(s.to_string()))
    }
}

impl fmt::Display for PatientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatientType {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientType::parse(s)
    }
}
