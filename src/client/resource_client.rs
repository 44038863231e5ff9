// Resource Client - CRUD calls for one collection with in-flight tracking and cached reads
// One client is shared by every form of a resource; double-submit protection belongs to the form

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, info, instrument};

use super::error::{ClientError, ClientResult};
use super::transport::{ApiRequest, ApiTransport, HttpMethod};
use super::SessionToken;
use crate::core::{EntityId, Resource};
use crate::infrastructure::QueryCache;
use crate::models::{ApiEnvelope, Page};

pub type SharedCache = Arc<Mutex<QueryCache<Value>>>;

/// List parameters sent as the query string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub filters: BTreeMap<String, String>,
}

impl ListQuery {
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Encoded query string without the leading `?`; stable for equal queries
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(String, String)> = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page".into(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".into(), limit.to_string()));
        }
        if let Some(search) = &self.search {
            pairs.push(("search".into(), search.clone()));
        }
        pairs.extend(self.filters.iter().map(|(k, v)| (k.clone(), v.clone())));

        reqwest::Url::parse_with_params("http://localhost/", &pairs)
            .ok()
            .and_then(|url| url.query().map(str::to_string))
            .unwrap_or_default()
    }
}

/// Counts a mutation as in flight until it finishes or its future is dropped
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::AcqRel);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct ResourceClient {
    resource: Resource,
    transport: Arc<dyn ApiTransport>,
    cache: SharedCache,
    token: SessionToken,
    in_flight: AtomicUsize,
}

impl ResourceClient {
    pub fn new(
        resource: Resource,
        transport: Arc<dyn ApiTransport>,
        cache: SharedCache,
        token: SessionToken,
    ) -> Self {
        Self {
            resource,
            transport,
            cache,
            token,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// True while any create or update on this resource is in flight
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) > 0
    }

    #[instrument(skip(self, body), fields(resource = %self.resource))]
    pub async fn create(&self, body: &Value) -> ClientResult<Value> {
        let _in_flight = InFlight::enter(&self.in_flight);
        let request = ApiRequest::new(HttpMethod::Post, self.collection_path()).json(body.clone());
        let record: Value = self.execute(request).await?;
        self.invalidate();
        info!("Created {} {}", self.resource.label(), record["id"]);
        Ok(record)
    }

    #[instrument(skip(self, body), fields(resource = %self.resource))]
    pub async fn update(&self, id: EntityId, body: &Value) -> ClientResult<Value> {
        let _in_flight = InFlight::enter(&self.in_flight);
        let request = ApiRequest::new(HttpMethod::Put, self.item_path(id)).json(body.clone());
        let record: Value = self.execute(request).await?;
        self.invalidate();
        info!("Updated {} {}", self.resource.label(), id);
        Ok(record)
    }

    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn get_by_id(&self, id: EntityId) -> ClientResult<Value> {
        let key = format!("{}:item:{}", self.resource.segment(), id);
        if let Some(cached) = self.cached(&key) {
            return Ok(cached);
        }
        let record: Value = self
            .execute(ApiRequest::new(HttpMethod::Get, self.item_path(id)))
            .await?;
        self.store(key, record.clone());
        Ok(record)
    }

    /// Fetch a record and decode it into a typed entity
    pub async fn get_as<T: DeserializeOwned>(&self, id: EntityId) -> ClientResult<T> {
        let record = self.get_by_id(id).await?;
        serde_json::from_value(record).map_err(ClientError::from)
    }

    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn list(&self, query: &ListQuery) -> ClientResult<Page<Value>> {
        let query_string = query.to_query_string();
        let key = format!("{}:list:{}", self.resource.segment(), query_string);
        if let Some(cached) = self.cached(&key) {
            return serde_json::from_value(cached).map_err(ClientError::from);
        }

        let path = if query_string.is_empty() {
            self.collection_path()
        } else {
            format!("{}?{}", self.collection_path(), query_string)
        };
        let page: Page<Value> = self.execute(ApiRequest::new(HttpMethod::Get, path)).await?;
        self.store(key, serde_json::to_value(&page)?);
        Ok(page)
    }

    #[instrument(skip(self), fields(resource = %self.resource))]
    pub async fn delete(&self, id: EntityId) -> ClientResult<String> {
        let response = self
            .send(ApiRequest::new(HttpMethod::Delete, self.item_path(id)))
            .await?;
        self.invalidate();
        Ok(message_of(&response))
    }

    #[instrument(skip(self, ids), fields(resource = %self.resource, count = ids.len()))]
    pub async fn bulk(&self, action: &str, ids: &[EntityId]) -> ClientResult<String> {
        let request = ApiRequest::new(
            HttpMethod::Post,
            format!("{}/bulk", self.collection_path()),
        )
        .json(json!({"action": action, "ids": ids}));
        let response = self.send(request).await?;
        self.invalidate();
        Ok(message_of(&response))
    }

    fn collection_path(&self) -> String {
        format!("/api/{}", self.resource.segment())
    }

    fn item_path(&self, id: EntityId) -> String {
        format!("/api/{}/{}", self.resource.segment(), id)
    }

    /// Send and return the success body, mapping error statuses
    async fn send(&self, request: ApiRequest) -> ClientResult<Value> {
        let request = request.bearer(self.current_token());
        let response = self.transport.send(request).await?;
        let success = response
            .body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        if !response.is_success() || !success {
            return Err(ClientError::from_response(response.status, &response.body));
        }
        Ok(response.body)
    }

    /// Send and decode the envelope's `data`
    async fn execute<T: DeserializeOwned>(&self, request: ApiRequest) -> ClientResult<T> {
        let body = self.send(request).await?;
        let envelope: ApiEnvelope<T> = serde_json::from_value(body)?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response envelope has no data".to_string()))
    }

    fn current_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|token| token.clone())
    }

    fn cached(&self, key: &str) -> Option<Value> {
        let hit = self.cache.lock().ok()?.get_fresh(key);
        if hit.is_some() {
            debug!("Cache hit for {}", key);
        }
        hit
    }

    fn store(&self, key: String, value: Value) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
    }

    /// Mark every cached read of this resource stale
    fn invalidate(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            let marked = cache.invalidate_prefix(&format!("{}:", self.resource.segment()));
            debug!("Marked {} cached {} queries stale", marked, self.resource.label());
        }
    }
}

fn message_of(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ApiClient, ApiResponse, RouterTransport};
    use crate::{api::create_router, app_state::AppState, config::Config};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Counts requests and yields once before forwarding
    struct CountingTransport {
        inner: RouterTransport,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ApiTransport for CountingTransport {
        async fn send(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            self.inner.send(request).await
        }
    }

    async fn counting_client() -> (Arc<CountingTransport>, ApiClient) {
        let config = Config::default();
        let state = AppState::new(config.clone()).await.unwrap();
        let transport = Arc::new(CountingTransport {
            inner: RouterTransport::new(create_router(state)),
            calls: AtomicUsize::new(0),
        });
        let client = ApiClient::new(transport.clone(), &config.cache);
        (transport, client)
    }

    fn post(title: &str) -> Value {
        json!({"title": title, "slug": crate::forms::slugify(title), "status": "draft"})
    }

    #[test]
    fn test_query_string_is_encoded() {
        let query = ListQuery::default()
            .page(2)
            .search("vila brno")
            .filter("status", "AVAILABLE");
        assert_eq!(query.to_query_string(), "page=2&search=vila+brno&status=AVAILABLE");
        assert_eq!(ListQuery::default().to_query_string(), "");
    }

    #[tokio::test]
    async fn test_reads_are_cached_until_mutation() {
        let (transport, client) = counting_client().await;
        let posts = client.resource(Resource::BlogPosts);

        assert_eq!(posts.list(&ListQuery::default()).await.unwrap().pagination.total, 0);
        posts.list(&ListQuery::default()).await.unwrap();
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        posts.create(&post("Autumn prices")).await.unwrap();
        let page = posts.list(&ListQuery::default()).await.unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_independent_mutations_both_run() {
        let (transport, client) = counting_client().await;
        let posts = client.resource(Resource::BlogPosts);
        let first = post("First post");
        let second = post("Second post");

        let (a, b) = tokio::join!(posts.create(&first), posts.create(&second));
        assert!(a.is_ok());
        assert!(b.is_ok());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 2);
        assert!(!posts.is_submitting());
        assert_eq!(posts.list(&ListQuery::default()).await.unwrap().pagination.total, 2);
    }

    #[tokio::test]
    async fn test_error_statuses_are_mapped() {
        let (_, client) = counting_client().await;
        let posts = client.resource(Resource::BlogPosts);
        assert!(matches!(
            posts.get_by_id(EntityId(99)).await,
            Err(ClientError::NotFound(_))
        ));

        posts.create(&post("Same title")).await.unwrap();
        assert!(matches!(
            posts.create(&post("Same title")).await,
            Err(ClientError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_bulk_and_delete_invalidate() {
        let (_, client) = counting_client().await;
        let posts = client.resource(Resource::BlogPosts);
        let created = posts.create(&post("To archive")).await.unwrap();
        let id = EntityId(created["id"].as_i64().unwrap());

        posts.get_by_id(id).await.unwrap();
        let message = posts.bulk("archived", &[id]).await.unwrap();
        assert_eq!(message, "1 blog-posts set to archived");
        assert_eq!(posts.get_by_id(id).await.unwrap()["status"], "archived");

        posts.delete(id).await.unwrap();
        assert!(matches!(posts.get_by_id(id).await, Err(ClientError::NotFound(_))));
    }
}
