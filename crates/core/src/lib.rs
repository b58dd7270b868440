//! # Medsim Core
//!
//! Authoring logic for medical training simulation scenarios.
//!
//! This crate holds the data model and editing rules for two kinds of authored assets:
//! - Events: a trigger plus an ordered list of typed actions run by the simulator
//! - Symptom templates: reusable patient states (vitals, exam findings, lab results)
//!
//! It also covers class invites, list filtering and YAML/JSON document exchange.
//!
//! **No UI or transport concerns**: rendering, routing and HTTP handling belong in the
//! application that embeds this crate. Storage is reached through the [`AssetStore`] and
//! [`InviteService`] traits.

pub mod action;
pub mod codec;
pub mod config;
pub mod constants;
pub mod context;
pub mod editor;
pub mod error;
pub mod event;
pub mod invite;
pub mod patient_data;
pub mod query;
pub mod reset;
pub mod store;
pub mod template;
pub mod validation;

pub use action::{ActionParams, ActionType, EventAction, RepeatKind, RepeatSettings};
pub use codec::{DocumentFormat, EventDocument, TemplateDocument};
pub use config::CoreConfig;
pub use context::{AccountContext, AccountRole};
pub use editor::{EventEditor, TemplateEditor};
pub use error::{AuthoringError, AuthoringResult};
pub use event::{AssetSource, AssetStatus, Event, EventCategory, EventPatch, RoleType, Trigger};
pub use invite::{create_class_invite, InMemoryInviteService, Invite, InviteAcceptor, InviteService};
pub use patient_data::{ExamSection, FindingSection, PatientData};
pub use query::{list_events, list_templates, EventFilter, Page, TemplateFilter};
pub use reset::{request_delete, DeleteRequest, ResetRequest, ResetTarget};
pub use store::{Asset, AssetStore, InMemoryStore};
pub use template::{resolve_symptom, SymptomTemplate};
pub use validation::{validate, validate_template, ValidationReport};

pub use medsim_reference::ReferenceData;
pub use medsim_types::{NonEmptyText, PatientType};
