// Form State - the editable draft with touched/dirty/error tracking and slug derivation

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::debug;

use super::slug::slugify;
use crate::core::EntityId;
use crate::schema::{Draft, FieldErrors, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

impl FormMode {
    pub fn is_create(self) -> bool {
        matches!(self, FormMode::Create)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success,
    Error(String),
}

/// Derive `target` from `source` while creating, until `target` is edited by hand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlugBinding {
    pub source: &'static str,
    pub target: &'static str,
}

#[derive(Debug, Clone)]
pub struct FormState {
    schema: Schema,
    mode: FormMode,
    initial: Draft,
    draft: Draft,
    touched: BTreeSet<String>,
    dirty: BTreeSet<String>,
    errors: FieldErrors,
    submission: SubmissionState,
    slug_binding: Option<SlugBinding>,
    slug_edited: bool,
}

impl FormState {
    pub fn new(schema: Schema, mode: FormMode, initial: Draft) -> Self {
        Self {
            schema,
            mode,
            draft: initial.clone(),
            initial,
            touched: BTreeSet::new(),
            dirty: BTreeSet::new(),
            errors: FieldErrors::new(),
            submission: SubmissionState::Idle,
            slug_binding: None,
            slug_edited: false,
        }
    }

    pub fn with_slug_binding(mut self, binding: SlugBinding) -> Self {
        self.slug_binding = Some(binding);
        self
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn value(&self, path: &str) -> Option<&Value> {
        self.draft.get(path)
    }

    /// Write a field; marks it touched and dirty and clears its stale error
    pub fn set_field(&mut self, path: &str, value: Value) {
        if let Some(binding) = self.slug_binding {
            if path == binding.target {
                self.slug_edited = true;
            } else if path == binding.source && self.mode.is_create() && !self.slug_edited {
                let slug = value.as_str().map(slugify).unwrap_or_default();
                debug!("Derived {} '{}' from {}", binding.target, slug, binding.source);
                self.write(binding.target, Value::String(slug));
            }
        }

        self.touched.insert(path.to_string());
        self.write(path, value);
    }

    fn write(&mut self, path: &str, value: Value) {
        if self.initial.get(path) == Some(&value) {
            self.dirty.remove(path);
        } else {
            self.dirty.insert(path.to_string());
        }
        self.errors.remove(path);
        self.draft.insert(path.to_string(), value);
    }

    pub fn clear_field(&mut self, path: &str) {
        self.touched.insert(path.to_string());
        self.errors.remove(path);
        self.draft.remove(path);
        if self.initial.contains_key(path) {
            self.dirty.insert(path.to_string());
        } else {
            self.dirty.remove(path);
        }
    }

    /// Replace the draft and forget all tracking
    pub fn reset(&mut self, initial: Draft, mode: FormMode) {
        self.draft = initial.clone();
        self.initial = initial;
        self.mode = mode;
        self.touched.clear();
        self.dirty.clear();
        self.errors = FieldErrors::new();
        self.submission = SubmissionState::Idle;
        self.slug_edited = false;
    }

    pub fn validate_field(&mut self, path: &str) -> Option<String> {
        self.errors.remove(path);
        let error = self.schema.validate_field(&self.draft, path);
        if let Some(message) = &error {
            self.errors.insert(path, message.clone());
        }
        error
    }

    /// Validate a subset of fields; errors for other fields are left alone
    pub fn validate_paths(&mut self, paths: &[&str]) -> FieldErrors {
        for path in paths {
            self.errors.remove(path);
        }
        let errors = self.schema.validate_fields(&self.draft, paths);
        self.errors.merge(errors.clone());
        errors
    }

    /// Validate everything, returning the normalized draft on success
    pub fn validate_all(&mut self) -> Result<Draft, FieldErrors> {
        match self.schema.validate_draft(&self.draft) {
            Ok(normalized) => {
                self.errors = FieldErrors::new();
                Ok(normalized)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Attach errors reported from elsewhere, such as a 422 from the server
    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors.merge(errors);
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    pub fn is_touched(&self, path: &str) -> bool {
        self.touched.contains(path)
    }

    pub fn is_dirty(&self, path: &str) -> bool {
        self.dirty.contains(path)
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    pub fn set_submission(&mut self, state: SubmissionState) {
        self.submission = state;
    }
}
