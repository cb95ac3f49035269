//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Orgstore API,
//! plus the uniform response envelope every route answers with.

use crate::models::ServiceInfo;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod orgs;

/// Uniform response envelope.
///
/// Success responses carry `data` and optionally `message`; error responses
/// carry `error`. Absent fields are omitted from the serialized body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Successful envelope wrapping a payload.
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    /// Attaches a human-readable message.
    pub fn with_message<S: Into<String>>(mut self, message: S) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl Envelope<()> {
    /// Successful envelope with a message and no payload.
    pub fn message<S: Into<String>>(message: S) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_omits_absent_fields() {
        let body = serde_json::to_value(Envelope::data(serde_json::json!({"k": "v"}))).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["k"], "v");
        assert!(body.get("message").is_none());
        assert!(body.get("error").is_none());
    }

    #[test]
    fn message_envelope_has_no_data() {
        let body = serde_json::to_value(Envelope::message("Organization deleted")).unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Organization deleted");
        assert!(body.get("data").is_none());
    }
}
