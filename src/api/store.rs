// In-memory collections backing the mock REST API

use std::collections::{BTreeMap, HashMap};

use base64::Engine;
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::query::ListParams;
use crate::config::AdminSeedConfig;
use crate::core::{EntityId, Resource};
use crate::error::{AppError, AppResult};
use crate::infrastructure::IdGenerator;
use crate::models::{BulkRequest, LoginRequest, Page, Pagination, Settings, UserRole};
use crate::schema::EntitySchema;
use crate::schemas::{InquirySubmissionSchema, SettingsSchema};

/// Fields clients may never write
const SERVER_FIELDS: [&str; 3] = ["id", "createdAt", "updatedAt"];
const PASSWORD_FIELDS: [&str; 2] = ["password", "confirmPassword"];

#[derive(Default)]
struct StoreState {
    /// Records keyed by ID; generated IDs increase, so iteration is creation order
    collections: HashMap<Resource, BTreeMap<EntityId, Value>>,
    /// Password per user ID, kept apart from the user records
    credentials: HashMap<EntityId, String>,
    settings: Map<String, Value>,
}

pub struct ApiStore {
    state: RwLock<StoreState>,
    ids: IdGenerator,
}

impl ApiStore {
    pub fn new(node_id: u16) -> Self {
        let settings = match serde_json::to_value(Settings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self {
            state: RwLock::new(StoreState {
                settings,
                ..StoreState::default()
            }),
            ids: IdGenerator::new(node_id),
        }
    }

    /// Create the configured administrator account unless the email is taken
    pub async fn seed_admin(&self, admin: &AdminSeedConfig) -> AppResult<()> {
        let body = serde_json::json!({
            "name": admin.name,
            "email": admin.email,
            "role": "ADMIN",
            "status": "active",
            "password": admin.password,
        });
        match self.create(Resource::Users, body).await {
            Ok(user) => {
                info!("Seeded administrator {} (ID: {})", admin.email, user["id"]);
                Ok(())
            }
            Err(AppError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn list(&self, resource: Resource, params: &ListParams) -> Page<Value> {
        let state = self.state.read().await;
        let matching: Vec<&Value> = state
            .collections
            .get(&resource)
            .map(|records| records.values().filter(|r| params.matches(r)).collect())
            .unwrap_or_default();

        let pagination = Pagination::new(params.page, params.limit, matching.len() as u64);
        let data = matching
            .into_iter()
            .skip(pagination.offset())
            .take(params.limit as usize)
            .cloned()
            .collect();

        Page { data, pagination }
    }

    pub async fn get(&self, resource: Resource, id: EntityId) -> AppResult<Value> {
        let state = self.state.read().await;
        state
            .collections
            .get(&resource)
            .and_then(|records| records.get(&id))
            .cloned()
            .ok_or_else(|| not_found(resource, id))
    }

    pub async fn create(&self, resource: Resource, body: Value) -> AppResult<Value> {
        let mut fields = into_object(body)?;
        for key in SERVER_FIELDS {
            fields.remove(key);
        }

        let mut state = self.state.write().await;
        let password = match resource {
            Resource::Users => {
                let password = take_password(&mut fields);
                let email = fields.get("email").and_then(Value::as_str).unwrap_or_default();
                ensure_unique(&state, resource, "email", email, None, true)?;
                apply_permissions(&mut fields)?;
                fields
                    .entry("status")
                    .or_insert_with(|| Value::from("active"));
                password
            }
            Resource::BlogPosts => {
                let slug = fields.get("slug").and_then(Value::as_str).unwrap_or_default();
                ensure_unique(&state, resource, "slug", slug, None, false)?;
                None
            }
            Resource::Inquiries => {
                // Public site submissions are untrusted input
                let submitted = InquirySubmissionSchema::schema()
                    .validate_draft(&fields)
                    .map_err(AppError::Validation)?;
                fields = submitted;
                fields.insert("status".into(), Value::from("new"));
                fields.insert("priority".into(), Value::from("medium"));
                None
            }
            Resource::Properties => None,
        };

        let id = self.ids.next_id();
        let now = timestamp();
        let mut record = Map::new();
        record.insert("id".into(), Value::from(id.value()));
        record.insert("createdAt".into(), Value::from(now.clone()));
        record.insert("updatedAt".into(), Value::from(now));
        record.extend(fields);
        let record = Value::Object(record);

        if let Some(password) = password {
            state.credentials.insert(id, password);
        }
        state
            .collections
            .entry(resource)
            .or_default()
            .insert(id, record.clone());

        info!("Created {} {}", resource.label(), id);
        Ok(record)
    }

    /// Shallow merge of `body` into the stored record
    pub async fn update(&self, resource: Resource, id: EntityId, body: Value) -> AppResult<Value> {
        let mut patch = into_object(body)?;
        for key in SERVER_FIELDS {
            patch.remove(key);
        }

        let mut state = self.state.write().await;
        if !state
            .collections
            .get(&resource)
            .map(|records| records.contains_key(&id))
            .unwrap_or(false)
        {
            return Err(not_found(resource, id));
        }

        let mut new_password = None;
        match resource {
            Resource::Users => {
                new_password = take_password(&mut patch);
                patch.remove("permissions");
                if let Some(email) = patch.get("email").and_then(Value::as_str) {
                    ensure_unique(&state, resource, "email", email, Some(id), true)?;
                }
                if patch.contains_key("role") {
                    apply_permissions(&mut patch)?;
                }
            }
            Resource::BlogPosts => {
                if let Some(slug) = patch.get("slug").and_then(Value::as_str) {
                    ensure_unique(&state, resource, "slug", slug, Some(id), false)?;
                }
            }
            Resource::Properties | Resource::Inquiries => {}
        }

        if let Some(password) = new_password {
            state.credentials.insert(id, password);
        }

        let record = state
            .collections
            .get_mut(&resource)
            .and_then(|records| records.get_mut(&id))
            .and_then(Value::as_object_mut)
            .ok_or_else(|| not_found(resource, id))?;
        record.extend(patch);
        record.insert("updatedAt".into(), Value::from(timestamp()));

        debug!("Updated {} {}", resource.label(), id);
        Ok(Value::Object(record.clone()))
    }

    pub async fn delete(&self, resource: Resource, id: EntityId) -> AppResult<()> {
        let mut state = self.state.write().await;
        let removed = state
            .collections
            .get_mut(&resource)
            .and_then(|records| records.remove(&id));
        match removed {
            Some(_) => {
                state.credentials.remove(&id);
                info!("Deleted {} {}", resource.label(), id);
                Ok(())
            }
            None => Err(not_found(resource, id)),
        }
    }

    /// `delete` removes records, any other action is a status value applied to each record
    pub async fn bulk(&self, resource: Resource, request: BulkRequest) -> AppResult<String> {
        if request.ids.is_empty() {
            return Err(AppError::BadRequest("No ids given".to_string()));
        }
        let action = request.action.trim();
        let is_delete = action.eq_ignore_ascii_case("delete");
        if !is_delete && !resource.status_values().iter().any(|s| *s == action) {
            return Err(AppError::BadRequest(format!(
                "Unknown bulk action '{}' for {}",
                action, resource
            )));
        }

        let mut state = self.state.write().await;
        let now = timestamp();
        let mut applied = 0usize;
        for id in &request.ids {
            let records = state.collections.entry(resource).or_default();
            let hit = if is_delete {
                records.remove(id).is_some()
            } else if let Some(record) = records.get_mut(id).and_then(Value::as_object_mut) {
                record.insert("status".into(), Value::from(action));
                record.insert("updatedAt".into(), Value::from(now.clone()));
                true
            } else {
                false
            };
            if hit {
                applied += 1;
                if is_delete {
                    state.credentials.remove(id);
                }
            }
        }

        let skipped = request.ids.len() - applied;
        if skipped > 0 {
            warn!("Bulk {} on {} skipped {} unknown ids", action, resource, skipped);
        }
        let verb = if is_delete {
            "deleted".to_string()
        } else {
            format!("set to {}", action)
        };
        Ok(format!(
            "{} {} {}{}",
            applied,
            resource,
            verb,
            if skipped > 0 {
                format!(", {} skipped", skipped)
            } else {
                String::new()
            }
        ))
    }

    /// Returns `{user, token}` for active users with matching credentials
    pub async fn login(&self, request: &LoginRequest) -> AppResult<Value> {
        let state = self.state.read().await;
        let user = state
            .collections
            .get(&Resource::Users)
            .and_then(|users| {
                users.iter().find(|(_, user)| {
                    user.get("email")
                        .and_then(Value::as_str)
                        .map(|email| email.eq_ignore_ascii_case(request.email.trim()))
                        .unwrap_or(false)
                })
            });

        let Some((id, user)) = user else {
            warn!("Login failed for unknown email {}", request.email);
            return Err(invalid_credentials());
        };
        if state.credentials.get(id) != Some(&request.password) {
            warn!("Login failed for {}: wrong password", request.email);
            return Err(invalid_credentials());
        }
        if user.get("status").and_then(Value::as_str) != Some("active") {
            return Err(AppError::Unauthorized("Account is not active".to_string()));
        }

        info!("User {} logged in", id);
        Ok(serde_json::json!({
            "user": user,
            "token": new_token(),
        }))
    }

    pub async fn settings(&self) -> Value {
        Value::Object(self.state.read().await.settings.clone())
    }

    pub async fn update_settings(&self, body: Value) -> AppResult<Value> {
        let patch = into_object(body)?;
        let mut state = self.state.write().await;
        let mut merged = state.settings.clone();
        merged.extend(patch);
        let validated = SettingsSchema::schema()
            .validate_draft(&merged)
            .map_err(AppError::Validation)?;
        state.settings = validated;
        info!("Settings updated");
        Ok(Value::Object(state.settings.clone()))
    }

    /// Record count per collection
    pub async fn stats(&self) -> BTreeMap<&'static str, usize> {
        let state = self.state.read().await;
        Resource::ALL
            .into_iter()
            .map(|r| {
                let count = state.collections.get(&r).map(BTreeMap::len).unwrap_or(0);
                (r.segment(), count)
            })
            .collect()
    }
}

fn into_object(body: Value) -> AppResult<Map<String, Value>> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(AppError::BadRequest("Request body must be a JSON object".to_string())),
    }
}

fn not_found(resource: Resource, id: EntityId) -> AppError {
    AppError::NotFound(format!("{} {} not found", capitalize(resource.label()), id))
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn take_password(fields: &mut Map<String, Value>) -> Option<String> {
    let password = fields
        .remove(PASSWORD_FIELDS[0])
        .and_then(|v| v.as_str().map(str::to_string))
        .filter(|p| !p.is_empty());
    fields.remove(PASSWORD_FIELDS[1]);
    password
}

/// Permissions follow the role and are never taken from the request
fn apply_permissions(fields: &mut Map<String, Value>) -> AppResult<()> {
    let permissions = fields
        .get("role")
        .cloned()
        .and_then(|role| serde_json::from_value::<UserRole>(role).ok())
        .map(UserRole::permissions)
        .unwrap_or_default();
    let permissions = serde_json::to_value(permissions)
        .map_err(|e| AppError::Internal(format!("Failed to encode permissions: {}", e)))?;
    fields.insert("permissions".into(), permissions);
    Ok(())
}

fn ensure_unique(
    state: &StoreState,
    resource: Resource,
    field: &str,
    value: &str,
    except: Option<EntityId>,
    case_insensitive: bool,
) -> AppResult<()> {
    if value.is_empty() {
        return Ok(());
    }
    let taken = state
        .collections
        .get(&resource)
        .map(|records| {
            records.iter().any(|(id, record)| {
                Some(*id) != except
                    && record
                        .get(field)
                        .and_then(Value::as_str)
                        .map(|existing| {
                            if case_insensitive {
                                existing.eq_ignore_ascii_case(value)
                            } else {
                                existing == value
                            }
                        })
                        .unwrap_or(false)
            })
        })
        .unwrap_or(false);

    if taken {
        Err(AppError::Conflict(format!(
            "A {} with {} '{}' already exists",
            resource.label(),
            field,
            value
        )))
    } else {
        Ok(())
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}
