//! Security-gated license endpoints consumed by the license screen
//!
//! Each handler checks the caller's capability and anti-forgery token
//! before touching license state, then answers with a JSON body and an
//! HTTP-equivalent status code (200 or 422). This is the only layer that
//! turns `LicenseError`s into user-facing text.

use crate::client::EntitlementClient;
use crate::error::LicenseError;
use crate::host::{CapabilityCheck, TokenGuard, LICENSE_TOKEN_ACTION, MANAGE_CAPABILITY};
use crate::record::EntitlementRecord;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

pub const TOKEN_FIELD: &str = "_nonce";
pub const LICENSE_KEY_FIELD: &str = "license_key";

pub const MSG_MISSING_KEY: &str = "Please provide a valid license key.";
pub const MSG_ALREADY_ACTIVE: &str = "This license key is already active.";
pub const MSG_ACTIVATION_FAILED: &str = "License activation failed. Please check your license key.";
pub const MSG_ACTIVATED: &str = "License activated successfully.";
pub const MSG_DEACTIVATED: &str = "License deactivated successfully.";

const NOTICE_EXPIRED: &str = "<p>Your license has expired. Please renew your license to continue receiving updates and support.</p>";
const NOTICE_DISABLED: &str =
    "<p>Your license has been disabled. Please contact support for assistance.</p>";

/// Inbound request: the submitted form fields.
#[derive(Debug, Clone, Default)]
pub struct EndpointRequest {
    fields: HashMap<String, String>,
}

impl EndpointRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Trimmed field value, empty when absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(|v| v.trim()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndpointResponse {
    pub status: u16,
    pub body: Value,
}

impl EndpointResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn unprocessable(body: Value) -> Self {
        Self { status: 422, body }
    }

    fn rejected(error: &LicenseError) -> Self {
        Self::unprocessable(json!({ "message": error.to_string() }))
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

/// The three endpoints a license screen talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointAction {
    Activate,
    Deactivate,
    Status,
}

impl EndpointAction {
    pub const ALL: [EndpointAction; 3] = [
        EndpointAction::Activate,
        EndpointAction::Deactivate,
        EndpointAction::Status,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            EndpointAction::Activate => "activate",
            EndpointAction::Deactivate => "deactivate",
            EndpointAction::Status => "status",
        }
    }

    /// Registered action name for a product, e.g. `dark-mode_license_status`.
    pub fn name_for(&self, slug: &str) -> String {
        format!("{}_license_{}", slug, self.suffix())
    }
}

pub struct EndpointController {
    client: Arc<EntitlementClient>,
    capability: Arc<dyn CapabilityCheck>,
    tokens: Arc<dyn TokenGuard>,
}

impl EndpointController {
    pub fn new(
        client: Arc<EntitlementClient>,
        capability: Arc<dyn CapabilityCheck>,
        tokens: Arc<dyn TokenGuard>,
    ) -> Self {
        Self {
            client,
            capability,
            tokens,
        }
    }

    /// Action names to register with the host, with their handlers' kinds.
    pub fn routes(&self) -> Vec<(String, EndpointAction)> {
        EndpointAction::ALL
            .iter()
            .map(|action| (action.name_for(self.client.slug()), *action))
            .collect()
    }

    /// Token a license screen must echo back in `_nonce`.
    pub fn issue_token(&self) -> String {
        self.tokens.issue(LICENSE_TOKEN_ACTION)
    }

    /// Routes a registered action name; `None` if the name is not ours.
    pub fn dispatch(&self, action: &str, request: &EndpointRequest) -> Option<EndpointResponse> {
        let (_, kind) = self.routes().into_iter().find(|(name, _)| name == action)?;
        Some(self.handle(kind, request))
    }

    pub fn handle(&self, action: EndpointAction, request: &EndpointRequest) -> EndpointResponse {
        match action {
            EndpointAction::Activate => self.handle_activate(request),
            EndpointAction::Deactivate => self.handle_deactivate(request),
            EndpointAction::Status => self.handle_status(request),
        }
    }

    fn authorize(&self, request: &EndpointRequest) -> Result<(), LicenseError> {
        if !self.capability.can(MANAGE_CAPABILITY) {
            return Err(LicenseError::Permission);
        }
        if !self
            .tokens
            .verify(request.field(TOKEN_FIELD), LICENSE_TOKEN_ACTION)
        {
            return Err(LicenseError::SecurityToken);
        }
        Ok(())
    }

    pub fn handle_activate(&self, request: &EndpointRequest) -> EndpointResponse {
        if let Err(e) = self.authorize(request) {
            return EndpointResponse::rejected(&e);
        }

        let license_key = request.field(LICENSE_KEY_FIELD);
        if license_key.is_empty() {
            return EndpointResponse::unprocessable(json!({ "message": MSG_MISSING_KEY }));
        }

        let current = match self.client.get_status(false) {
            Ok(current) => current,
            Err(e) => return EndpointResponse::rejected(&e),
        };
        if current.is_valid() && current.license_key == license_key {
            return EndpointResponse::ok(json!({ "message": MSG_ALREADY_ACTIVE }));
        }

        match self.client.activate(license_key) {
            Err(e) => EndpointResponse::unprocessable(json!({
                "message": e.to_string(),
                "status": "api_error"
            })),
            Ok(record) if !record.is_valid() => EndpointResponse::unprocessable(json!({
                "message": MSG_ACTIVATION_FAILED,
                "status": record.status.as_str()
            })),
            Ok(_) => EndpointResponse::ok(json!({
                "message": MSG_ACTIVATED,
                "status": "active"
            })),
        }
    }

    pub fn handle_deactivate(&self, request: &EndpointRequest) -> EndpointResponse {
        if let Err(e) = self.authorize(request) {
            return EndpointResponse::rejected(&e);
        }

        match self.client.deactivate() {
            Ok(outcome) => EndpointResponse::ok(json!({
                "message": MSG_DEACTIVATED,
                "remote_deactivated": outcome.remote_deactivated
            })),
            Err(e) => EndpointResponse::rejected(&e),
        }
    }

    pub fn handle_status(&self, request: &EndpointRequest) -> EndpointResponse {
        if let Err(e) = self.authorize(request) {
            return EndpointResponse::rejected(&e);
        }

        let record = match self.client.get_status(true) {
            Ok(record) => record,
            Err(e) => return EndpointResponse::ok(json!({ "error_notice": e.to_string() })),
        };

        let notice = status_notice(&record);
        EndpointResponse::ok(json!({
            "error_notice": notice,
            "remote_data": public_view(&record)
        }))
    }
}

/// Notice shown above the license form for expired or disabled licenses.
pub fn status_notice(record: &EntitlementRecord) -> String {
    if record.is_expired == Some(true) {
        let mut notice = NOTICE_EXPIRED.to_string();
        if let Some(url) = record.renew_url.as_deref().filter(|u| is_web_url(u)) {
            notice.push_str(&format!(
                "<p><a href=\"{}\" target=\"_blank\" class=\"button button-primary\">Renew License</a></p>",
                escape_attr(url)
            ));
        }
        return notice;
    }

    if record.error_type.as_deref() == Some("disabled") {
        return record
            .error_message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| NOTICE_DISABLED.to_string());
    }

    String::new()
}

/// The record as sent to clients: everything except the license key.
pub fn public_view(record: &EntitlementRecord) -> Value {
    let mut value = serde_json::to_value(record).unwrap_or_else(|_| json!({}));
    if let Some(map) = value.as_object_mut() {
        map.remove("license_key");
    }
    value
}

/// Only absolute http(s) URLs may become links.
fn is_web_url(raw: &str) -> bool {
    Url::parse(raw.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn escape_attr(raw: &str) -> String {
    raw.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            other => other.to_string(),
        })
        .collect()
}
