//! Keyward Core - License Activation and Entitlement Caching
//!
//! This crate provides the license subsystem for a distributed product:
//! - Activation, deactivation and status checks against a remote entitlement API
//! - A locally cached entitlement record per product slug
//! - Fallback to records written by the previous licensing provider
//! - Security-gated endpoints for a license management screen
//!
//! The host supplies storage (`RecordStore`), outbound HTTP (`Transport`),
//! capability checks (`CapabilityCheck`) and anti-forgery tokens
//! (`TokenGuard`).

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod events;
pub mod facade;
pub mod host;
pub mod legacy;
pub mod record;
pub mod registry;
pub mod store;
pub mod transport;

pub use client::{Deactivation, EntitlementClient};
pub use config::LicenseConfig;
pub use endpoint::{EndpointAction, EndpointController, EndpointRequest, EndpointResponse};
pub use error::{LicenseError, Result};
pub use events::{EventSink, LicenseEvent, TracingEvents};
pub use facade::{ActionLink, LicenseFacade, LicenseInfo};
pub use host::{CapabilityCheck, SessionTokenGuard, StaticCapability, TokenGuard};
pub use legacy::LegacyEntitlementAdapter;
pub use record::{EntitlementRecord, LegacyEntitlementRecord, LicenseStatus};
pub use registry::LicenseRegistry;
pub use store::{FileStore, MemoryStore, RecordStore};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};

/// Keyward version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
