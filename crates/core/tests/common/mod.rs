//! Shared fixtures: a scripted transport and a recording event sink
#![allow(dead_code)]

use keyward_core::{
    EntitlementClient, EventSink, HttpResponse, LicenseConfig, LicenseEvent, MemoryStore,
    Transport, TransportError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Call {
    pub url: String,
    pub form: Vec<(String, String)>,
    pub timeout: Duration,
}

impl Call {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Transport that replays scripted responses in order and records calls.
/// With nothing scripted, every call fails at the transport level.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
    }

    pub fn fail(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(TransportError(message.to_string())));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for FakeTransport {
    fn post_form(
        &self,
        url: &str,
        form: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(Call {
            url: url.to_string(),
            form: form.to_vec(),
            timeout,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("connection refused".to_string())))
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<LicenseEvent>>,
}

impl RecordingEvents {
    pub fn events(&self) -> Vec<LicenseEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingEvents {
    fn emit(&self, event: &LicenseEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub const SLUG: &str = "dark-mode";

pub fn config() -> LicenseConfig {
    LicenseConfig {
        item_id: "1234".into(),
        plugin_slug: SLUG.into(),
        plugin_name: "Dark Mode Ultimate".into(),
        plugin_version: "2.1.0".into(),
        api_url: "https://licenses.example.com/".into(),
        site_url: "https://blog.example.org".into(),
        ..LicenseConfig::default()
    }
}

pub struct Fixture {
    pub store: Arc<MemoryStore>,
    pub transport: Arc<FakeTransport>,
    pub events: Arc<RecordingEvents>,
    pub client: Arc<EntitlementClient>,
}

pub fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let transport = Arc::new(FakeTransport::new());
    let events = Arc::new(RecordingEvents::default());
    let client = EntitlementClient::new(&config(), store.clone(), transport.clone())
        .unwrap()
        .with_events(events.clone());
    Fixture {
        store,
        transport,
        events,
        client: Arc::new(client),
    }
}
