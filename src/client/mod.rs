// Mutation/data-fetch layer used by the forms and the admin shell

pub mod auth;
pub mod error;
pub mod resource_client;
pub mod transport;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{info, instrument};

use crate::config::CacheConfig;
use crate::core::Resource;
use crate::infrastructure::QueryCache;
use crate::models::ApiEnvelope;

pub use auth::AuthClient;
pub use error::{ClientError, ClientResult};
pub use resource_client::{ListQuery, ResourceClient, SharedCache};
pub use transport::{ApiRequest, ApiResponse, ApiTransport, HttpMethod, HttpTransport, RouterTransport};

/// Bearer token shared by every client built from one `ApiClient`
pub type SessionToken = Arc<Mutex<Option<String>>>;

/// Builds the per-resource clients over one transport, cache and session
pub struct ApiClient {
    transport: Arc<dyn ApiTransport>,
    cache: SharedCache,
    token: SessionToken,
    resources: HashMap<Resource, Arc<ResourceClient>>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn ApiTransport>, cache_config: &CacheConfig) -> Self {
        let cache: SharedCache = Arc::new(Mutex::new(QueryCache::new(
            cache_config.capacity,
            std::time::Duration::from_secs(cache_config.ttl_secs),
        )));
        let token: SessionToken = Arc::new(Mutex::new(None));
        let resources = Resource::ALL
            .into_iter()
            .map(|resource| {
                let client = ResourceClient::new(
                    resource,
                    transport.clone(),
                    cache.clone(),
                    token.clone(),
                );
                (resource, Arc::new(client))
            })
            .collect();

        Self {
            transport,
            cache,
            token,
            resources,
        }
    }

    /// The client of one collection; the same instance is returned on every call
    pub fn resource(&self, resource: Resource) -> Arc<ResourceClient> {
        match self.resources.get(&resource) {
            Some(client) => client.clone(),
            None => Arc::new(ResourceClient::new(
                resource,
                self.transport.clone(),
                self.cache.clone(),
                self.token.clone(),
            )),
        }
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.transport.clone(), self.token.clone())
    }

    pub fn settings(&self) -> SettingsClient {
        SettingsClient {
            transport: self.transport.clone(),
            token: self.token.clone(),
        }
    }
}

/// Reads and writes the settings singleton
pub struct SettingsClient {
    transport: Arc<dyn ApiTransport>,
    token: SessionToken,
}

impl SettingsClient {
    pub async fn get(&self) -> ClientResult<Value> {
        self.call(ApiRequest::new(HttpMethod::Get, "/api/settings")).await
    }

    #[instrument(skip(self, body))]
    pub async fn update(&self, body: &Value) -> ClientResult<Value> {
        let settings = self
            .call(ApiRequest::new(HttpMethod::Put, "/api/settings").json(body.clone()))
            .await?;
        info!("Settings saved");
        Ok(settings)
    }

    async fn call(&self, request: ApiRequest) -> ClientResult<Value> {
        let token = self.token.lock().ok().and_then(|token| token.clone());
        let response = self.transport.send(request.bearer(token)).await?;
        if !response.is_success() {
            return Err(ClientError::from_response(response.status, &response.body));
        }
        let envelope: ApiEnvelope<Value> = serde_json::from_value(response.body)?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("settings response has no data".to_string()))
    }
}
