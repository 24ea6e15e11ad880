//! Activation lifecycle notifications

use crate::record::EntitlementRecord;

#[derive(Debug, Clone, PartialEq)]
pub enum LicenseEvent {
    Activated {
        slug: String,
        record: EntitlementRecord,
    },
    Deactivated {
        slug: String,
    },
}

impl LicenseEvent {
    pub fn slug(&self) -> &str {
        match self {
            LicenseEvent::Activated { slug, .. } | LicenseEvent::Deactivated { slug } => slug,
        }
    }
}

/// Receives lifecycle events. Hosts hook their own listeners in here.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LicenseEvent);
}

/// Default sink: logs each event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEvents;

impl EventSink for TracingEvents {
    fn emit(&self, event: &LicenseEvent) {
        match event {
            LicenseEvent::Activated { slug, record } => tracing::info!(
                slug = %slug,
                status = %record.status,
                variation = %record.variation_title,
                "license activated"
            ),
            LicenseEvent::Deactivated { slug } => {
                tracing::info!(slug = %slug, "license deactivated")
            }
        }
    }
}
