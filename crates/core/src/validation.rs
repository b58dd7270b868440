//! Save-time validation of events and symptom templates.
//!
//! Rules are evaluated independently so the report lists every problem at once. There are
//! no cross-field rules; an event with no actions is valid.

use crate::event::Event;
use crate::template::SymptomTemplate;

/// One failed validation rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("Event key is required")]
    MissingKey,
    #[error("Display name is required")]
    MissingDisplayName,
    #[error("Description is required")]
    MissingDescription,
    #[error("Trigger is required")]
    MissingTrigger,
    #[error("Symptom key is required")]
    MissingTemplateKey,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            is_valid: issues.is_empty(),
            issues,
        }
    }

    /// Human-readable messages, one per issue, in rule order.
    pub fn errors(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

pub fn validate(event: &Event) -> ValidationReport {
    let mut issues = Vec::new();
    if blank(&event.key) {
        issues.push(ValidationIssue::MissingKey);
    }
    if blank(&event.display_name) {
        issues.push(ValidationIssue::MissingDisplayName);
    }
    if blank(&event.description) {
        issues.push(ValidationIssue::MissingDescription);
    }
    if event.trigger.is_none() {
        issues.push(ValidationIssue::MissingTrigger);
    }
    ValidationReport::from_issues(issues)
}

pub fn validate_template(template: &SymptomTemplate) -> ValidationReport {
    let mut issues = Vec::new();
    if blank(&template.key) {
        issues.push(ValidationIssue::MissingTemplateKey);
    }
    if blank(&template.display_name) {
        issues.push(ValidationIssue::MissingDisplayName);
    }
    ValidationReport::from_issues(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventCategory, Trigger};

    fn complete_event() -> Event {
        Event {
            key: "nurse_arrives".into(),
            display_name: "Nurse arrives".into(),
            description: "A nurse enters the room".into(),
            trigger: Some(Trigger::NpcSpawn),
            ..Event::new(EventCategory::NpcEvent)
        }
    }

    #[test]
    fn complete_event_is_valid_without_actions() {
        let report = validate(&complete_event());
        assert!(report.is_valid);
        assert!(report.errors().is_empty());
    }

    #[test]
    fn whitespace_only_fields_are_blank() {
        let mut event = complete_event();
        event.key = "   ".into();
        event.description = "\t".into();
        let report = validate(&event);
        assert!(!report.is_valid);
        assert_eq!(
            report.issues,
            [ValidationIssue::MissingKey, ValidationIssue::MissingDescription]
        );
    }

    #[test]
    fn every_rule_is_reported() {
        let report = validate(&Event::default());
        assert_eq!(
            report.errors(),
            [
                "Event key is required",
                "Display name is required",
                "Description is required",
                "Trigger is required",
            ]
        );
    }

    #[test]
    fn missing_trigger_alone_invalidates() {
        let mut event = complete_event();
        event.trigger = None;
        let report = validate(&event);
        assert_eq!(report.issues, [ValidationIssue::MissingTrigger]);
    }

    #[test]
    fn templates_need_key_and_display_name() {
        let mut template = SymptomTemplate::default();
        assert_eq!(validate_template(&template).issues.len(), 2);
        template.key = "fever".into();
        template.display_name = "Fever".into();
        assert!(validate_template(&template).is_valid);
    }
}
