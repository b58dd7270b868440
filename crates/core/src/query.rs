//! Asset list filtering and pagination.

use crate::config::CoreConfig;
use crate::event::{AssetSource, AssetStatus, Event, EventCategory};
use crate::store::AssetStore;
use crate::template::SymptomTemplate;
use crate::AuthoringResult;
use medsim_types::PatientType;
use serde::Serialize;
use std::cmp::Ordering;

fn matches_search(search: Option<&str>, fields: &[&str]) -> bool {
    let Some(needle) = search.map(str::trim).filter(|s| !s.is_empty()) else {
        return true;
    };
    let needle = needle.to_lowercase();
    fields.iter().any(|f| f.to_lowercase().contains(&needle))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Case-insensitive substring over key, display name and description.
    pub search: Option<String>,
    pub category: Option<EventCategory>,
    pub status: Option<AssetStatus>,
    pub source: Option<AssetSource>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        matches_search(
            self.search.as_deref(),
            &[
                event.key.as_str(),
                event.display_name.as_str(),
                event.description.as_str(),
            ],
        ) && self.category.map_or(true, |c| c == event.category)
            && self.status.map_or(true, |s| s == event.status)
            && self.source.map_or(true, |s| s == event.source)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    /// Case-insensitive substring over key, display name and description.
    pub search: Option<String>,
    pub patient_type: Option<PatientType>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

impl TemplateFilter {
    pub fn matches(&self, template: &SymptomTemplate) -> bool {
        matches_search(
            self.search.as_deref(),
            &[
                template.key.as_str(),
                template.display_name.as_str(),
                template.description.as_str(),
            ],
        ) && self
            .patient_type
            .map_or(true, |pt| pt == template.data.patient_type)
            && self
                .category
                .as_deref()
                .map_or(true, |c| c == template.category)
            && self
                .tag
                .as_deref()
                .map_or(true, |t| template.tags.iter().any(|tag| tag == t))
    }
}

/// One page of a listing. `page` is 1-based.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub page_count: usize,
}

/// Cuts `items` into pages of `page_size` and returns page `page`.
///
/// Page 0 is treated as page 1; a page past the end is empty but still reports the totals.
/// A page size of 0 is treated as 1.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page = page.max(1);
    let page_size = page_size.max(1);
    let total = items.len();
    let page_count = total.div_ceil(page_size);
    let start = (page - 1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();
    Page {
        items,
        page,
        page_size,
        total,
        page_count,
    }
}

/// Most recently updated first; undated records last; ties by display name.
fn newest_first(a_date: Option<chrono::NaiveDate>, b_date: Option<chrono::NaiveDate>) -> Ordering {
    b_date.cmp(&a_date)
}

/// Filters, sorts and pages events using the configured page size.
pub fn list_events<S>(
    store: &S,
    filter: &EventFilter,
    page: usize,
    config: &CoreConfig,
) -> AuthoringResult<Page<Event>>
where
    S: AssetStore<Event> + ?Sized,
{
    let mut events: Vec<Event> = store
        .list()?
        .into_iter()
        .filter(|e| filter.matches(e))
        .collect();
    events.sort_by(|a, b| {
        newest_first(a.updated_date, b.updated_date)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    Ok(paginate(events, page, config.page_size()))
}

pub fn list_templates<S>(
    store: &S,
    filter: &TemplateFilter,
    page: usize,
    config: &CoreConfig,
) -> AuthoringResult<Page<SymptomTemplate>>
where
    S: AssetStore<SymptomTemplate> + ?Sized,
{
    let mut templates: Vec<SymptomTemplate> = store
        .list()?
        .into_iter()
        .filter(|t| filter.matches(t))
        .collect();
    templates.sort_by(|a, b| {
        newest_first(a.updated_date, b.updated_date)
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    Ok(paginate(templates, page, config.page_size()))
}
