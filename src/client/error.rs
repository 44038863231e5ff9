use std::fmt;

use serde_json::Value;

use crate::schema::FieldErrors;

#[derive(Debug, Clone, PartialEq)]
pub enum ClientError {
    /// Field errors, either from the local schema or a 422 from the server
    Validation(FieldErrors),
    NotFound(String),
    Unauthorized(String),
    Conflict(String),
    Api { status: u16, message: String },
    Transport(String),
    Decode(String),
}

impl ClientError {
    /// Map a non-success response onto an error, reading `message`/`errors` from the body
    pub fn from_response(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        match status {
            404 => ClientError::NotFound(message),
            401 | 403 => ClientError::Unauthorized(message),
            409 => ClientError::Conflict(message),
            422 => match body
                .get("errors")
                .cloned()
                .and_then(|errors| serde_json::from_value::<FieldErrors>(errors).ok())
            {
                Some(errors) if !errors.is_empty() => ClientError::Validation(errors),
                _ => ClientError::Api { status, message },
            },
            _ => ClientError::Api { status, message },
        }
    }

    /// Text shown to the user in a notification
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(errors) => {
                format!("Please fix {} invalid field(s)", errors.len())
            }
            ClientError::NotFound(msg)
            | ClientError::Unauthorized(msg)
            | ClientError::Conflict(msg) => msg.clone(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Transport(_) | ClientError::Decode(_) => {
                "Could not reach the server, please try again".to_string()
            }
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(errors) => write!(f, "Validation error: {}", errors),
            ClientError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ClientError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ClientError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ClientError::Api { status, message } => write!(f, "API error {}: {}", status, message),
            ClientError::Transport(msg) => write!(f, "Transport error: {}", msg),
            ClientError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
