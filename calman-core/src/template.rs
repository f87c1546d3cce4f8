//! Reusable event blueprints.
//!
//! Templates are an ordered sequence persisted as one JSON collection
//! under the `eventTemplates` key. At most one template is "armed" at a
//! time; clicking an armed template disarms it, clicking a different
//! one swaps the two and disarms.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CalmanError, CalmanResult};
use crate::store::KvStore;

const TEMPLATES_KEY: &str = "eventTemplates";

/// An event blueprint. Carries no remote id; times only matter for
/// their duration and time-of-day when projected onto a calendar slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color_id: i64,
    #[serde(default)]
    pub description: String,
}

impl Template {
    /// Duration in minutes, used to project the template onto a newly
    /// selected slot.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Duplicate check used by import: same title, start, end and
    /// all-day flag.
    pub fn is_duplicate_of(&self, other: &Template) -> bool {
        self.title == other.title
            && self.start == other.start
            && self.end == other.end
            && self.all_day == other.all_day
    }
}

/// Ordered template collection with single-selection semantics.
pub struct TemplateStore<K: KvStore> {
    store: K,
    templates: Vec<Template>,
    selected: Option<usize>,
    loaded: bool,
}

impl<K: KvStore> TemplateStore<K> {
    pub fn new(store: K) -> Self {
        TemplateStore {
            store,
            templates: Vec::new(),
            selected: None,
            loaded: false,
        }
    }

    /// Load the persisted collection. A missing or unreadable blob
    /// yields an empty collection.
    pub fn load_templates(&mut self) -> CalmanResult<()> {
        self.templates = match self.store.get(TEMPLATES_KEY)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| CalmanError::Serialization(e.to_string()))?,
            None => Vec::new(),
        };
        self.selected = None;
        self.loaded = true;
        Ok(())
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The armed template, if any.
    pub fn selected_template(&self) -> Option<(&Template, usize)> {
        self.selected
            .and_then(|i| self.templates.get(i).map(|t| (t, i)))
    }

    pub fn add_template(&mut self, template: Template) -> CalmanResult<()> {
        self.templates.push(template);
        self.persist()
    }

    pub fn update_template(&mut self, index: usize, template: Template) -> CalmanResult<()> {
        if index >= self.templates.len() {
            return Err(CalmanError::TemplateIndex(index));
        }
        self.templates[index] = template;
        self.persist()
    }

    pub fn remove_template(&mut self, index: usize) -> CalmanResult<()> {
        if index >= self.templates.len() {
            return Err(CalmanError::TemplateIndex(index));
        }
        self.templates.remove(index);
        // The collection shifted: removing the armed template disarms,
        // removing one below it moves the armed index down with it.
        self.selected = match self.selected {
            Some(armed) if armed == index => None,
            Some(armed) if armed > index => Some(armed - 1),
            other => other,
        };
        self.persist()
    }

    /// Click-selection state machine:
    /// - nothing armed: arm `index`
    /// - `index` already armed: disarm
    /// - a different index armed: swap the two templates, persist, disarm
    ///
    /// Returns the new selection.
    pub fn select_template(&mut self, index: usize) -> CalmanResult<Option<usize>> {
        if index >= self.templates.len() {
            return Err(CalmanError::TemplateIndex(index));
        }
        match self.selected {
            None => {
                self.selected = Some(index);
            }
            Some(armed) if armed == index => {
                self.selected = None;
            }
            Some(armed) => {
                self.swap_templates(armed, index)?;
                self.selected = None;
            }
        }
        Ok(self.selected)
    }

    pub fn reset_selection(&mut self) {
        self.selected = None;
    }

    pub fn swap_templates(&mut self, i: usize, j: usize) -> CalmanResult<()> {
        let len = self.templates.len();
        if i >= len {
            return Err(CalmanError::TemplateIndex(i));
        }
        if j >= len {
            return Err(CalmanError::TemplateIndex(j));
        }
        self.templates.swap(i, j);
        self.persist()
    }

    fn persist(&mut self) -> CalmanResult<()> {
        let value: Value = serde_json::to_value(&self.templates)
            .map_err(|e| CalmanError::Serialization(e.to_string()))?;
        self.store.set(TEMPLATES_KEY, value)
    }
}
