use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::domain::CFError;
use crate::tracking::matcher::is_subset;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub event_category: String,
    pub event_action: String,
    pub event_name: String,
}

/// Page view reported relative to the page the user is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewDefinition {
    /// Appended to the current path.
    pub custom_url: String,
    /// Appended to the current title, separated by a space.
    pub document_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedAction {
    pub required_properties_in_action: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_definition: Option<EventDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_view_definition: Option<PageViewDefinition>,
}

impl TrackedAction {
    pub fn matches(&self, action: &Value) -> bool {
        let Value::Object(actual) = action else {
            return false;
        };
        self.required_properties_in_action
            .iter()
            .all(|(key, value)| actual.get(key).is_some_and(|v| is_subset(v, value)))
    }
}

/// Which actions are tracked, keyed by action type. Within one type the
/// first entry whose required properties match wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, Vec<TrackedAction>>", into = "IndexMap<String, Vec<TrackedAction>>")]
pub struct TrackingConfiguration {
    actions: IndexMap<String, Vec<TrackedAction>>,
}

impl TryFrom<IndexMap<String, Vec<TrackedAction>>> for TrackingConfiguration {
    type Error = CFError;

    fn try_from(actions: IndexMap<String, Vec<TrackedAction>>) -> Result<Self, Self::Error> {
        for (action_type, tracked) in actions.iter() {
            if action_type.is_empty() {
                return Err(CFError::InvalidConfiguration(
                    "tracked action type must not be empty".to_string(),
                ));
            }
            if let Some(i) = tracked
                .iter()
                .position(|t| t.event_definition.is_none() && t.page_view_definition.is_none())
            {
                return Err(CFError::InvalidConfiguration(format!(
                    "tracked action {action_type}[{i}] defines neither an event nor a page view"
                )));
            }
        }
        Ok(Self { actions })
    }
}

impl From<TrackingConfiguration> for IndexMap<String, Vec<TrackedAction>> {
    fn from(configuration: TrackingConfiguration) -> Self {
        configuration.actions
    }
}

impl TrackingConfiguration {
    pub fn from_json(json: &str) -> Result<Self, CFError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CFError> {
        let json = std::fs::read_to_string(path)?;
        let configuration = Self::from_json(&json)?;
        debug!(
            "Loaded tracking of {} action types from {}",
            configuration.actions.len(),
            path.display()
        );
        Ok(configuration)
    }

    /// Tracking of the actions this crate dispatches itself.
    pub fn builtin() -> Self {
        let event = |category: &str, action: &str, name: &str| EventDefinition {
            event_category: category.to_string(),
            event_action: action.to_string(),
            event_name: name.to_string(),
        };
        let required = |value: Value| match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut actions = IndexMap::new();
        actions.insert(
            "columns/RESET_COLUMNS".to_string(),
            vec![TrackedAction {
                required_properties_in_action: Map::new(),
                event_definition: Some(event("CF", "clicked", "Reset_Columns")),
                page_view_definition: None,
            }],
        );
        actions.insert(
            "columns/ENABLE_COLUMN".to_string(),
            vec![TrackedAction {
                required_properties_in_action: Map::new(),
                event_definition: Some(event("CF", "selected", "Enable_Column")),
                page_view_definition: None,
            }],
        );
        actions.insert(
            "columns/DISABLE_COLUMN".to_string(),
            vec![TrackedAction {
                required_properties_in_action: Map::new(),
                event_definition: Some(event("CF", "clicked", "Disable_Column")),
                page_view_definition: None,
            }],
        );
        actions.insert(
            "columns/MOVE_COLUMN".to_string(),
            vec![
                TrackedAction {
                    required_properties_in_action: required(json!({"direction": "up"})),
                    event_definition: Some(event("CF", "clicked", "Move_Column_Up")),
                    page_view_definition: None,
                },
                TrackedAction {
                    required_properties_in_action: required(json!({"direction": "down"})),
                    event_definition: Some(event("CF", "clicked", "Move_Column_Down")),
                    page_view_definition: None,
                },
            ],
        );
        Self { actions }
    }

    /// Adds or replaces the entries of one action type.
    pub fn with_action(mut self, action_type: impl Into<String>, tracked: Vec<TrackedAction>) -> Result<Self, CFError> {
        self.actions.insert(action_type.into(), tracked);
        Self::try_from(self.actions)
    }

    pub fn is_tracked(&self, action_type: &str) -> bool {
        self.actions.contains_key(action_type)
    }

    pub fn action_types(&self) -> impl Iterator<Item = &String> {
        self.actions.keys()
    }

    /// First tracked entry matching `action`, if its type is tracked at all.
    pub fn find_match(&self, action: &Value) -> Option<&TrackedAction> {
        let action_type = action.get("type")?.as_str()?;
        self.actions
            .get(action_type)?
            .iter()
            .find(|tracked| tracked.matches(action))
    }
}
