use std::sync::Arc;

use serde_json::json;
use tracing::{info, instrument, warn};

use super::error::{ClientError, ClientResult};
use super::transport::{ApiRequest, ApiTransport, HttpMethod};
use super::SessionToken;
use crate::models::{ApiEnvelope, Session};

pub struct AuthClient {
    transport: Arc<dyn ApiTransport>,
    token: SessionToken,
}

impl AuthClient {
    pub fn new(transport: Arc<dyn ApiTransport>, token: SessionToken) -> Self {
        Self { transport, token }
    }

    /// Log in and remember the session token for later requests
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        let request = ApiRequest::new(HttpMethod::Post, "/api/auth/login")
            .json(json!({"email": email, "password": password}));
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let error = ClientError::from_response(response.status, &response.body);
            warn!("Login failed for {}: {}", email, error);
            return Err(error);
        }

        let envelope: ApiEnvelope<Session> = serde_json::from_value(response.body)?;
        let session = envelope
            .data
            .ok_or_else(|| ClientError::Decode("login response has no session".to_string()))?;

        if let Ok(mut token) = self.token.lock() {
            *token = Some(session.token.clone());
        }
        info!("Logged in as {} ({:?})", session.user.email, session.user.role);
        Ok(session)
    }

    pub fn logout(&self) {
        if let Ok(mut token) = self.token.lock() {
            *token = None;
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token
            .lock()
            .map(|token| token.is_some())
            .unwrap_or(false)
    }
}
