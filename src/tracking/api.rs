use std::sync::Mutex;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::CFError;

/// Custom dimension the user's roles are reported under.
pub const ROLE_DIMENSION: u32 = 1;

/// Analytics server the tracked events and page views are sent to.
pub trait TrackingApi: Send + Sync {
    fn connect(&self);

    fn track_event(&self, category: &str, action: &str, name: &str);

    fn track_page_view(&self, url: &str, title: &str);

    fn track_role_dimension(&self, roles: &str);
}

/// Source of the roles of the signed in user.
#[async_trait]
pub trait RoleSource: Send + Sync {
    async fn my_roles(&self) -> Result<Vec<String>, CFError>;
}

/// Roles known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticRoles(pub Vec<String>);

#[async_trait]
impl RoleSource for StaticRoles {
    async fn my_roles(&self) -> Result<Vec<String>, CFError> {
        Ok(self.0.clone())
    }
}

/// Writes everything it would track to the log, under the `tracking` target.
#[derive(Debug, Clone)]
pub struct LogTrackingApi {
    url: Option<String>,
    site_id: String,
}

impl LogTrackingApi {
    pub fn new(url: Option<String>, site_id: impl Into<String>) -> Self {
        Self {
            url,
            site_id: site_id.into(),
        }
    }
}

impl TrackingApi for LogTrackingApi {
    fn connect(&self) {
        match &self.url {
            Some(url) => info!(target: "tracking", "Tracking to {url} as site {}", self.site_id),
            None => warn!(target: "tracking", "No tracking server configured, tracking is only logged"),
        }
    }

    fn track_event(&self, category: &str, action: &str, name: &str) {
        info!(target: "tracking", category, action, name, "trackEvent");
    }

    fn track_page_view(&self, url: &str, title: &str) {
        info!(target: "tracking", url, title, "trackPageView");
    }

    fn track_role_dimension(&self, roles: &str) {
        info!(target: "tracking", dimension = ROLE_DIMENSION, roles, "setCustomDimension");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackingCall {
    Connect,
    Event {
        category: String,
        action: String,
        name: String,
    },
    PageView {
        url: String,
        title: String,
    },
    RoleDimension(String),
}

/// Keeps every call in memory so it can be inspected later.
#[derive(Debug, Default)]
pub struct RecordingTrackingApi {
    calls: Mutex<Vec<TrackingCall>>,
}

impl RecordingTrackingApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TrackingCall> {
        match self.calls.lock() {
            Ok(calls) => calls.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, call: TrackingCall) {
        match self.calls.lock() {
            Ok(mut calls) => calls.push(call),
            Err(poisoned) => poisoned.into_inner().push(call),
        }
    }
}

impl TrackingApi for RecordingTrackingApi {
    fn connect(&self) {
        self.record(TrackingCall::Connect);
    }

    fn track_event(&self, category: &str, action: &str, name: &str) {
        self.record(TrackingCall::Event {
            category: category.to_string(),
            action: action.to_string(),
            name: name.to_string(),
        });
    }

    fn track_page_view(&self, url: &str, title: &str) {
        self.record(TrackingCall::PageView {
            url: url.to_string(),
            title: title.to_string(),
        });
    }

    fn track_role_dimension(&self, roles: &str) {
        self.record(TrackingCall::RoleDimension(roles.to_string()));
    }
}
