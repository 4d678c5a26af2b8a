use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::CFError;

pub const OPS_LINK: &str = "opsRequest";
pub const PLANNING_CANCEL_STEP: &str = "planningCancel";
pub const SAVE_PERMISSION: &str = "SAVE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEffort {
    pub channel_team: String,
    #[serde(default)]
    pub total_effort: Option<f64>,
    #[serde(default)]
    pub total_override_effort: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestType {
    pub id: String,
    #[serde(default)]
    pub team_efforts: Vec<TeamEffort>,
}

/// Detail of a web-dev request as the server returns it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetail {
    pub key: String,
    /// Every request type in a fixed order, `None` where the request has none.
    #[serde(default)]
    pub request_types: IndexMap<String, Option<RequestType>>,
    #[serde(default)]
    pub preferred_lts_date: Option<String>,
    #[serde(default)]
    pub actual_lts_date: Option<String>,
    #[serde(default)]
    pub web_links: IndexMap<String, String>,
    #[serde(default)]
    pub editable: bool,
    #[serde(default)]
    pub change_request: bool,
    #[serde(default)]
    pub workflow_steps: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl RequestDetail {
    pub fn no_request_type_has_efforts(&self) -> bool {
        self.request_types
            .values()
            .flatten()
            .all(|t| t.team_efforts.is_empty())
    }

    /// The last request type the request has.
    pub fn active_request_type(&self) -> Option<&RequestType> {
        self.request_types.values().flatten().last()
    }

    pub fn active_team_efforts(&self) -> Vec<TeamEffort> {
        self.active_request_type()
            .map(|t| t.team_efforts.clone())
            .unwrap_or_default()
    }

    pub fn web_link(&self, name: &str) -> Option<&str> {
        self.web_links
            .get(name)
            .map(String::as_str)
            .filter(|link| !link.is_empty())
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn has_workflow_step(&self, step: &str) -> bool {
        self.workflow_steps.iter().any(|s| s == step)
    }
}

/// Server endpoints editing a web-dev request. Both answer with the updated detail.
#[async_trait]
pub trait WebDevApi: Send + Sync {
    async fn post_request_edit_actual_lts_date(
        &self,
        request_key: &str,
        actual_lts_date: Option<String>,
    ) -> Result<RequestDetail, CFError>;

    async fn post_request_edit_effort(
        &self,
        request_type_id: &str,
        efforts: Vec<TeamEffort>,
    ) -> Result<RequestDetail, CFError>;
}
