use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, instrument, trace, warn};

use crate::tracking::api::{RoleSource, TrackingApi};
use crate::tracking::configuration::TrackingConfiguration;

pub const ENTER_ROUTE: &str = "router/ENTER_ROUTE";

/// Page views of paths containing this are not tracked.
pub const GADGET_PATH_MARKER: &str = "gadgets";

/// Page the user is currently on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub pathname: String,
    pub title: String,
}

/// Turns dispatched actions into tracked events and page views.
pub struct Tracker {
    api: Arc<dyn TrackingApi>,
    configuration: Arc<TrackingConfiguration>,
    page: PageContext,
}

impl Tracker {
    pub fn new(api: Arc<dyn TrackingApi>, configuration: Arc<TrackingConfiguration>) -> Self {
        Self {
            api,
            configuration,
            page: PageContext::default(),
        }
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    /// Connects to the server and reports the user's roles. A failed role
    /// lookup leaves the role dimension unset.
    #[instrument(skip_all)]
    pub async fn start(&self, roles: &dyn RoleSource) {
        self.api.connect();
        let roles = match roles.my_roles().await {
            Ok(roles) => roles,
            Err(e) => {
                warn!("Could not fetch the user's roles: {e}");
                Vec::new()
            }
        };
        if !roles.is_empty() {
            self.api.track_role_dimension(&roles.join(", "));
        }
    }

    pub fn track_action(&mut self, action: &Value) {
        let Some(action_type) = action.get("type").and_then(Value::as_str) else {
            trace!("Ignoring action without type");
            return;
        };
        if action_type == ENTER_ROUTE {
            let field = |name: &str| {
                action
                    .get(name)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string()
            };
            self.enter_route(field("pathname"), field("title"));
        }

        let Some(tracked) = self.configuration.find_match(action) else {
            return;
        };
        debug!("Tracking {action_type}");
        if let Some(event) = &tracked.event_definition {
            self.api
                .track_event(&event.event_category, &event.event_action, &event.event_name);
        }
        if let Some(page_view) = &tracked.page_view_definition {
            self.api.track_page_view(
                &format!("{}{}", self.page.pathname, page_view.custom_url),
                &format!("{} {}", self.page.title, page_view.document_title),
            );
        }
    }

    pub fn enter_route(&mut self, pathname: String, title: String) {
        self.page = PageContext { pathname, title };
        if self.page.pathname.contains(GADGET_PATH_MARKER) {
            trace!("Not tracking gadget page {}", self.page.pathname);
            return;
        }
        self.api.track_page_view(&self.page.pathname, &self.page.title);
    }

    /// Starts tracking and follows `actions` until the bus is gone.
    pub async fn run(mut self, roles: impl RoleSource, mut actions: broadcast::Receiver<Value>) {
        self.start(&roles).await;
        info!("Tracking started");
        loop {
            match actions.recv().await {
                Ok(action) => self.track_action(&action),
                Err(RecvError::Lagged(skipped)) => warn!("Tracking fell behind, {skipped} actions skipped"),
                Err(RecvError::Closed) => break,
            }
        }
        info!("Tracking stopped");
    }
}
