//! Editing sessions for events and symptom templates.
//!
//! An editor owns a draft, applies partial patches to it and hands it to an [`AssetStore`] on
//! save. Validation failures and store failures are kept on the editor as a message list so
//! the caller can show them next to the unchanged draft.

use crate::action::{ActionParams, ActionType, EventAction, RepeatKind, RepeatSettings};
use crate::context::AccountContext;
use crate::event::{AssetSource, Event, EventCategory, EventPatch, RoleType};
use crate::patient_data::{LabResultPatch, PatientData};
use crate::store::{Asset, AssetStore};
use crate::template::SymptomTemplate;
use crate::validation::{validate, validate_template, ValidationReport};
use crate::{AuthoringError, AuthoringResult};
use chrono::{NaiveDate, Utc};
use medsim_reference::ReferenceData;
use medsim_types::PatientType;
use medsim_uuid::{AssetId, ItemKey, TimestampId};
use std::sync::Arc;

fn check_editable<T: Asset>(ctx: &AccountContext, record: &T) -> AuthoringResult<()> {
    ctx.require_authoring()?;
    if record.source() != AssetSource::Asset {
        tracing::warn!(kind = T::KIND, id = record.id(), "preset opened for editing");
        return Err(AuthoringError::ReadOnlyAsset(record.display_name().to_string()));
    }
    Ok(())
}

/// Stamps, validates and stores `draft`. Shared by both editors.
fn save_record<T, S>(
    draft: &mut T,
    is_new: &mut bool,
    errors: &mut Vec<String>,
    store: &S,
    today: NaiveDate,
    stamp: impl FnOnce(&mut T, NaiveDate, bool),
    validator: impl FnOnce(&T) -> ValidationReport,
) -> AuthoringResult<T>
where
    T: Asset,
    S: AssetStore<T> + ?Sized,
{
    let mut candidate = draft.clone();
    if candidate.id().is_empty() {
        candidate.assign_id(AssetId::new().to_string());
    }
    stamp(&mut candidate, today, *is_new);

    let report = validator(&candidate);
    if !report.is_valid {
        *errors = report.errors();
        tracing::warn!(kind = T::KIND, errors = errors.len(), "save rejected by validation");
        return Err(AuthoringError::Validation(errors.clone()));
    }

    match store.save(candidate) {
        Ok(saved) => {
            *draft = saved.clone();
            *is_new = false;
            errors.clear();
            Ok(saved)
        }
        Err(err) => {
            tracing::warn!(kind = T::KIND, error = %err, "store rejected save");
            *errors = vec![err.to_string()];
            Err(err)
        }
    }
}

/// Editing session for one [`Event`].
#[derive(Debug)]
pub struct EventEditor {
    draft: Event,
    is_new: bool,
    errors: Vec<String>,
}

impl EventEditor {
    /// Starts a new event of `category`.
    pub fn create(ctx: &AccountContext, category: EventCategory) -> AuthoringResult<Self> {
        ctx.require_authoring()?;
        Ok(Self {
            draft: Event::new(category),
            is_new: true,
            errors: Vec::new(),
        })
    }

    /// Opens an existing event. Presets are refused.
    pub fn open(ctx: &AccountContext, event: Event) -> AuthoringResult<Self> {
        check_editable(ctx, &event)?;
        let mut editor = Self {
            is_new: event.id.is_empty(),
            draft: event,
            errors: Vec::new(),
        };
        for action in &mut editor.draft.actions {
            if let ActionParams::ChangePatientData(data) = &mut action.params {
                data.ensure_default_location();
            }
        }
        Ok(editor)
    }

    pub fn draft(&self) -> &Event {
        &self.draft
    }

    pub fn into_draft(self) -> Event {
        self.draft
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Messages from the last failed save. Empty after a successful save.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn apply(&mut self, patch: EventPatch) {
        patch.apply_to(&mut self.draft);
    }

    pub fn set_category(&mut self, category: EventCategory) {
        self.draft.set_category(category);
    }

    pub fn set_classification(&mut self, classification: &str) -> AuthoringResult<()> {
        self.draft.set_classification(classification)
    }

    /// Adds or removes a role. Returns `true` if the role is now selected.
    pub fn toggle_role(&mut self, role: RoleType) -> bool {
        if self.draft.role_types.remove(&role) {
            false
        } else {
            self.draft.role_types.insert(role);
            true
        }
    }

    /// Appends an action with empty parameters and returns its id.
    pub fn add_action(&mut self, action_type: ActionType) -> String {
        let last = self.draft.actions.last().map(|a| a.id.as_str());
        let id = TimestampId::generate_after_str(last).to_string();
        self.draft
            .actions
            .push(EventAction::new(id.clone(), action_type));
        if let Some(EventAction {
            params: ActionParams::ChangePatientData(data),
            ..
        }) = self.draft.actions.last_mut()
        {
            data.ensure_default_location();
        }
        tracing::debug!(action = %action_type, id = %id, "action added");
        id
    }

    /// Removes an action immediately.
    pub fn remove_action(&mut self, id: &str) -> AuthoringResult<EventAction> {
        let index = self
            .draft
            .actions
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AuthoringError::NotFound {
                kind: "action",
                id: id.to_string(),
            })?;
        Ok(self.draft.actions.remove(index))
    }

    fn action_mut(&mut self, id: &str) -> AuthoringResult<&mut EventAction> {
        self.draft
            .action_mut(id)
            .ok_or_else(|| AuthoringError::NotFound {
                kind: "action",
                id: id.to_string(),
            })
    }

    /// Edits an action's parameters in place. The closure may not change the action's kind;
    /// if it does, the edit is reverted and an error returned.
    pub fn update_params<F>(&mut self, id: &str, edit: F) -> AuthoringResult<()>
    where
        F: FnOnce(&mut ActionParams),
    {
        let action = self.action_mut(id)?;
        let before = action.params.clone();
        edit(&mut action.params);
        if action.params.action_type() != before.action_type() {
            let attempted = action.params.action_type();
            action.params = before;
            return Err(AuthoringError::InvalidInput(format!(
                "action {} is {} and cannot become {}",
                id,
                action.params.action_type(),
                attempted
            )));
        }
        Ok(())
    }

    pub fn set_repeat(&mut self, id: &str, settings: RepeatSettings) -> AuthoringResult<()> {
        if settings.kind == RepeatKind::Random && settings.interval_min > settings.interval_max {
            return Err(AuthoringError::InvalidInput(format!(
                "random repeat minimum {} exceeds maximum {}",
                settings.interval_min, settings.interval_max
            )));
        }
        self.action_mut(id)?.repeat_settings = settings;
        Ok(())
    }

    /// Inline patient data of a `change_patient_data` action, with the default location
    /// seeded.
    pub fn patient_data_mut(&mut self, id: &str) -> AuthoringResult<&mut PatientData> {
        let action = self.action_mut(id)?;
        let found = action.action_type();
        match &mut action.params {
            ActionParams::ChangePatientData(data) => {
                data.ensure_default_location();
                Ok(&mut **data)
            }
            _ => Err(AuthoringError::InvalidInput(format!(
                "action {} is {}, not {}",
                id,
                found,
                ActionType::ChangePatientData
            ))),
        }
    }

    pub fn save<S>(&mut self, store: &S) -> AuthoringResult<Event>
    where
        S: AssetStore<Event> + ?Sized,
    {
        self.save_on(store, Utc::now().date_naive())
    }

    /// Saves with an explicit calendar date for the created/updated stamps.
    pub fn save_on<S>(&mut self, store: &S, today: NaiveDate) -> AuthoringResult<Event>
    where
        S: AssetStore<Event> + ?Sized,
    {
        save_record(
            &mut self.draft,
            &mut self.is_new,
            &mut self.errors,
            store,
            today,
            |event, today, is_new| {
                if is_new || event.created_date.is_none() {
                    event.created_date = Some(today);
                }
                event.updated_date = Some(today);
            },
            validate,
        )
    }
}

/// Editing session for one [`SymptomTemplate`].
#[derive(Debug)]
pub struct TemplateEditor {
    draft: SymptomTemplate,
    is_new: bool,
    errors: Vec<String>,
    reference: Arc<ReferenceData>,
}

impl TemplateEditor {
    pub fn create(
        ctx: &AccountContext,
        patient_type: PatientType,
        reference: Arc<ReferenceData>,
    ) -> AuthoringResult<Self> {
        ctx.require_authoring()?;
        let mut draft = SymptomTemplate::new(patient_type);
        draft.data.ensure_default_location();
        Ok(Self {
            draft,
            is_new: true,
            errors: Vec::new(),
            reference,
        })
    }

    pub fn open(
        ctx: &AccountContext,
        mut template: SymptomTemplate,
        reference: Arc<ReferenceData>,
    ) -> AuthoringResult<Self> {
        check_editable(ctx, &template)?;
        template.data.ensure_default_location();
        Ok(Self {
            is_new: template.id.is_empty(),
            draft: template,
            errors: Vec::new(),
            reference,
        })
    }

    pub fn draft(&self) -> &SymptomTemplate {
        &self.draft
    }

    pub fn into_draft(self) -> SymptomTemplate {
        self.draft
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn set_key(&mut self, key: impl Into<String>) {
        self.draft.key = key.into();
    }

    pub fn set_display_name(&mut self, display_name: impl Into<String>) {
        self.draft.display_name = display_name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.draft.description = description.into();
    }

    pub fn set_category(&mut self, category: &str) -> AuthoringResult<()> {
        self.draft.set_category(category, &self.reference)
    }

    /// Returns `true` if the category was cleared because the new type does not have it.
    pub fn set_patient_type(&mut self, patient_type: PatientType) -> bool {
        self.draft.set_patient_type(patient_type, &self.reference)
    }

    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.draft.add_tag(tag)
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.draft.remove_tag(tag)
    }

    pub fn patient_data(&self) -> &PatientData {
        &self.draft.data
    }

    pub fn patient_data_mut(&mut self) -> &mut PatientData {
        &mut self.draft.data
    }

    pub fn add_lab_result(&mut self, specimen: impl Into<String>) -> ItemKey {
        self.draft.data.add_lab_result(specimen)
    }

    pub fn update_lab_result(&mut self, key: &ItemKey, patch: LabResultPatch) -> AuthoringResult<()> {
        self.draft.data.update_lab_result(key, patch)
    }

    pub fn select_lab_item(&mut self, key: &ItemKey, name: &str) -> AuthoringResult<bool> {
        self.draft.data.select_lab_item(key, name, &self.reference)
    }

    pub fn add_specimen_panel(&mut self, specimen: &str) -> usize {
        self.draft.data.add_specimen_panel(specimen, &self.reference)
    }

    pub fn save<S>(&mut self, store: &S) -> AuthoringResult<SymptomTemplate>
    where
        S: AssetStore<SymptomTemplate> + ?Sized,
    {
        self.save_on(store, Utc::now().date_naive())
    }

    pub fn save_on<S>(&mut self, store: &S, today: NaiveDate) -> AuthoringResult<SymptomTemplate>
    where
        S: AssetStore<SymptomTemplate> + ?Sized,
    {
        save_record(
            &mut self.draft,
            &mut self.is_new,
            &mut self.errors,
            store,
            today,
            |template, today, is_new| {
                if is_new || template.created_date.is_none() {
                    template.created_date = Some(today);
                }
                template.updated_date = Some(today);
            },
            validate_template,
        )
    }
}
