// Schema Framework - declarative field definitions evaluated into a field -> rules table
// Provides draft validation with per-field error collection and typed output

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::models::FileItem;

/// The in-progress, possibly-invalid object a form is editing
pub type Draft = Map<String, Value>;

pub static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));
pub static SLUG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("slug pattern compiles"));
pub static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ()-]{6,20}$").expect("phone pattern compiles"));

/// Mapping from field path to the first validation failure message for that field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Path used for failures that are not attached to a single field
    pub const FORM: &'static str = "_form";

    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error; an existing message for the same path is kept
    pub fn insert(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.entry(path.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.0.remove(path)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (path, message) in other.0 {
            self.insert(path, message);
        }
    }

    /// Drop every error whose path is not in `paths`
    pub fn retain_paths(&mut self, paths: &[&str]) {
        self.0.retain(|path, _| paths.iter().any(|p| *p == path.as_str()));
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(p, m)| format!("{}: {}", p, m)).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Field types understood by the validator
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Integer,
    Number,
    Bool,
    /// RFC 3339 timestamp, normalized to UTC
    Timestamp,
    Enum(Vec<&'static str>),
    /// Deduplicated list of strings; a comma separated string is accepted too
    StringSet,
    File,
    FileList,
    /// Positive numeric ID of another record
    Reference,
}

/// Field validators applied after type coercion
#[derive(Debug, Clone)]
pub enum FieldValidator {
    MinLength(usize),
    MaxLength(usize),
    Pattern { regex: Regex, message: String },
    /// Inclusive numeric bounds
    Range(f64, f64),
    /// Inclusive lower bound only
    Min(f64),
    MinItems(usize),
    MaxItems(usize),
    Email,
}

impl FieldValidator {
    pub fn pattern(regex: &Regex, message: impl Into<String>) -> Self {
        FieldValidator::Pattern {
            regex: regex.clone(),
            message: message.into(),
        }
    }

    fn check(&self, label: &str, value: &Value) -> Result<(), String> {
        match self {
            FieldValidator::MinLength(min) => match value.as_str() {
                Some(s) if s.chars().count() < *min => {
                    Err(format!("{} must be at least {} characters", label, min))
                }
                _ => Ok(()),
            },
            FieldValidator::MaxLength(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => {
                    Err(format!("{} must be at most {} characters", label, max))
                }
                _ => Ok(()),
            },
            FieldValidator::Pattern { regex, message } => match value.as_str() {
                Some(s) if !regex.is_match(s) => Err(message.clone()),
                _ => Ok(()),
            },
            FieldValidator::Range(min, max) => match value.as_f64() {
                Some(n) if n < *min || n > *max => {
                    Err(format!("{} must be between {} and {}", label, min, max))
                }
                _ => Ok(()),
            },
            FieldValidator::Min(min) => match value.as_f64() {
                Some(n) if n < *min => Err(format!("{} must be at least {}", label, min)),
                _ => Ok(()),
            },
            FieldValidator::MinItems(min) => match value.as_array() {
                Some(items) if items.len() < *min => {
                    Err(format!("{} must contain at least {} item(s)", label, min))
                }
                _ => Ok(()),
            },
            FieldValidator::MaxItems(max) => match value.as_array() {
                Some(items) if items.len() > *max => {
                    Err(format!("{} must contain at most {} item(s)", label, max))
                }
                _ => Ok(()),
            },
            FieldValidator::Email => match value.as_str() {
                Some(s) if !EMAIL_PATTERN.is_match(s) => {
                    Err(format!("{} must be a valid email address", label))
                }
                _ => Ok(()),
            },
        }
    }
}

/// One field of a schema
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub optional: bool,
    pub validators: Vec<FieldValidator>,
}

impl FieldDefinition {
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: name.to_string(),
            field_type,
            optional: false,
            validators: Vec::new(),
        }
    }

    /// Mark field as optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Human-readable name used in messages
    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Add field validator
    pub fn validate(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Coerce and check a raw draft value.
    /// `Ok(None)` means the field is absent and allowed to be.
    pub fn check(&self, raw: Option<&Value>) -> Result<Option<Value>, String> {
        let raw = match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) if s.is_empty() => None,
            Some(value) => Some(value),
        };
        let Some(raw) = raw else {
            return if self.optional {
                Ok(None)
            } else {
                Err(format!("{} is required", self.label))
            };
        };

        let value = self.coerce(raw)?;
        for validator in &self.validators {
            validator.check(&self.label, &value)?;
        }
        Ok(Some(value))
    }

    fn coerce(&self, raw: &Value) -> Result<Value, String> {
        let label = &self.label;
        match &self.field_type {
            FieldType::String => match raw {
                Value::String(_) => Ok(raw.clone()),
                _ => Err(format!("{} must be text", label)),
            },
            FieldType::Integer => coerce_integer(raw)
                .map(Value::from)
                .ok_or_else(|| format!("{} must be a whole number", label)),
            FieldType::Number => coerce_number(raw)
                .map(Value::Number)
                .ok_or_else(|| format!("{} must be a number", label)),
            FieldType::Bool => match raw {
                Value::Bool(_) => Ok(raw.clone()),
                Value::String(s) if s == "true" || s == "false" => Ok(Value::Bool(s == "true")),
                _ => Err(format!("{} must be true or false", label)),
            },
            FieldType::Timestamp => raw
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|ts| {
                    Value::String(
                        ts.with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::Secs, true),
                    )
                })
                .ok_or_else(|| format!("{} must be a valid date and time", label)),
            FieldType::Enum(values) => match raw.as_str() {
                Some(s) if values.iter().any(|v| *v == s) => Ok(raw.clone()),
                _ => Err(format!("{} must be one of: {}", label, values.join(", "))),
            },
            FieldType::StringSet => coerce_string_set(raw)
                .ok_or_else(|| format!("{} must be a list of text values", label)),
            FieldType::File => serde_json::from_value::<FileItem>(raw.clone())
                .map(|_| raw.clone())
                .map_err(|_| format!("{} must be a valid file", label)),
            FieldType::FileList => serde_json::from_value::<Vec<FileItem>>(raw.clone())
                .map(|_| raw.clone())
                .map_err(|_| format!("{} must be a list of valid files", label)),
            FieldType::Reference => coerce_integer(raw)
                .filter(|id| *id > 0)
                .map(Value::from)
                .ok_or_else(|| format!("{} must reference an existing record", label)),
        }
    }
}

fn coerce_integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn coerce_number(raw: &Value) -> Option<Number> {
    match raw {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Number::from(i))
            } else {
                s.parse::<f64>().ok().and_then(Number::from_f64)
            }
        }
        _ => None,
    }
}

fn coerce_string_set(raw: &Value) -> Option<Value> {
    let items: Vec<String> = match raw {
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(|s| s.trim().to_string()))
            .collect::<Option<Vec<_>>>()?,
        Value::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => return None,
    };

    let mut unique: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_empty() && !unique.contains(&item) {
            unique.push(item);
        }
    }
    Some(Value::from(unique))
}

/// Object-level check over a set of fields (e.g. password confirmation)
#[derive(Debug, Clone)]
pub struct Refinement {
    pub name: &'static str,
    /// Fields the check reads; it only runs when all of them are being validated
    pub paths: Vec<&'static str>,
    check: fn(&Draft, &mut FieldErrors),
}

impl Refinement {
    pub fn new(name: &'static str, paths: &[&'static str], check: fn(&Draft, &mut FieldErrors)) -> Self {
        Self {
            name,
            paths: paths.to_vec(),
            check,
        }
    }

    fn applies_to(&self, paths: &[&str]) -> bool {
        self.paths.iter().all(|p| paths.contains(p))
    }
}

/// Validation schema: field table plus object-level refinements
#[derive(Debug, Clone, Default)]
pub struct Schema {
    name: String,
    fields: BTreeMap<String, FieldDefinition>,
    refinements: Vec<Refinement>,
}

impl Schema {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(mut self, definition: FieldDefinition) -> Self {
        self.fields.insert(definition.name.clone(), definition);
        self
    }

    pub fn fields(self, definitions: Vec<FieldDefinition>) -> Self {
        definitions.into_iter().fold(self, Schema::field)
    }

    pub fn refine(mut self, refinement: Refinement) -> Self {
        self.refinements.push(refinement);
        self
    }

    /// Structural union: `other` wins on field name collisions, refinements accumulate
    pub fn merge(mut self, other: Schema) -> Self {
        self.fields.extend(other.fields);
        self.refinements.extend(other.refinements);
        self
    }

    /// Every field becomes optional; refinements are kept
    pub fn partial(mut self) -> Self {
        for definition in self.fields.values_mut() {
            definition.optional = true;
        }
        self
    }

    /// Sub-schema over `paths`; refinements survive only if all their fields are kept
    pub fn pick(&self, paths: &[&str]) -> Schema {
        Schema {
            name: self.name.clone(),
            fields: self
                .fields
                .iter()
                .filter(|(name, _)| paths.iter().any(|p| *p == name.as_str()))
                .map(|(name, def)| (name.clone(), def.clone()))
                .collect(),
            refinements: self
                .refinements
                .iter()
                .filter(|r| r.applies_to(paths))
                .cloned()
                .collect(),
        }
    }

    pub fn omit(mut self, paths: &[&str]) -> Schema {
        self.fields.retain(|name, _| !paths.iter().any(|p| *p == name.as_str()));
        self.refinements
            .retain(|r| !r.paths.iter().any(|p| paths.contains(p)));
        self
    }

    pub fn has_field(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn definition(&self, path: &str) -> Option<&FieldDefinition> {
        self.fields.get(path)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.values()
    }

    pub fn refinements(&self) -> &[Refinement] {
        &self.refinements
    }

    /// Every refinement must only read fields the schema defines
    pub fn check_consistency(&self) -> Result<(), Vec<String>> {
        let errors: Vec<String> = self
            .refinements
            .iter()
            .flat_map(|r| {
                r.paths
                    .iter()
                    .filter(|p| !self.fields.contains_key(**p))
                    .map(move |p| {
                        format!(
                            "Schema '{}' refinement '{}' reads undefined field '{}'",
                            self.name, r.name, p
                        )
                    })
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate the whole draft, returning the normalized draft (unknown keys stripped)
    pub fn validate_draft(&self, draft: &Draft) -> Result<Draft, FieldErrors> {
        let paths: Vec<&str> = self.field_names().collect();
        let (normalized, errors) = self.run(draft, &paths);
        if errors.is_empty() {
            Ok(normalized)
        } else {
            Err(errors)
        }
    }

    /// Validate the whole draft and deserialize it into the typed entity
    pub fn validate<T: DeserializeOwned>(&self, draft: &Draft) -> Result<T, FieldErrors> {
        let normalized = self.validate_draft(draft)?;
        serde_json::from_value(Value::Object(normalized)).map_err(|e| {
            let mut errors = FieldErrors::new();
            errors.insert(FieldErrors::FORM, format!("{} is malformed: {}", self.name, e));
            errors
        })
    }

    /// Validate only `paths`; errors are scoped to those fields
    pub fn validate_fields(&self, draft: &Draft, paths: &[&str]) -> FieldErrors {
        let (_, mut errors) = self.run(draft, paths);
        errors.retain_paths(paths);
        errors
    }

    pub fn validate_field(&self, draft: &Draft, path: &str) -> Option<String> {
        self.validate_fields(draft, &[path]).remove(path)
    }

    fn run(&self, draft: &Draft, paths: &[&str]) -> (Draft, FieldErrors) {
        let mut normalized = Draft::new();
        let mut errors = FieldErrors::new();

        // Every field is evaluated; only the first failing rule per field is reported
        for path in paths {
            let Some(definition) = self.fields.get(*path) else {
                continue;
            };
            match definition.check(draft.get(*path)) {
                Ok(Some(value)) => {
                    normalized.insert(path.to_string(), value);
                }
                Ok(None) => {}
                Err(message) => errors.insert(*path, message),
            }
        }

        for refinement in self.refinements.iter().filter(|r| r.applies_to(paths)) {
            if refinement.paths.iter().any(|p| errors.contains(p)) {
                continue;
            }
            (refinement.check)(&normalized, &mut errors);
        }

        (normalized, errors)
    }
}

/// Schema-as-code for one entity form
pub trait EntitySchema {
    /// Typed entity produced by a successful validation
    type Output: DeserializeOwned;

    fn name() -> &'static str;

    fn fields() -> Vec<FieldDefinition>;

    fn refinements() -> Vec<Refinement> {
        Vec::new()
    }

    /// Build the field table once; callers keep the result around
    fn schema() -> Schema {
        Self::refinements()
            .into_iter()
            .fold(Schema::new(Self::name()).fields(Self::fields()), Schema::refine)
    }

    fn validate(draft: &Draft) -> Result<Self::Output, FieldErrors> {
        Self::schema().validate(draft)
    }
}
