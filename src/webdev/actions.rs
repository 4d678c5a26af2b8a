use serde_json::{Value, json};

use crate::webdev::request::TeamEffort;

/// User intents around the dialogs of one web-dev request.
#[derive(Debug, Clone, PartialEq)]
pub enum WebDevAction {
    ShowEditEffort,
    CloseEditEffort,
    SubmitEditEffort(Vec<TeamEffort>),
    ShowEditActualLtsDate,
    CloseEditActualLtsDate,
    SubmitEditActualLtsDate(Option<String>),
}

impl WebDevAction {
    fn suffix(&self) -> &'static str {
        match self {
            WebDevAction::ShowEditEffort => "REQUEST_DIALOG_EDIT_EFFORT_SHOW",
            WebDevAction::CloseEditEffort => "REQUEST_DIALOG_EDIT_EFFORT_CLOSE",
            WebDevAction::SubmitEditEffort(_) => "REQUEST_DIALOG_EDIT_EFFORT_SUBMIT",
            WebDevAction::ShowEditActualLtsDate => "REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_SHOW",
            WebDevAction::CloseEditActualLtsDate => "REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_CLOSE",
            WebDevAction::SubmitEditActualLtsDate(_) => "REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_SUBMIT",
        }
    }
}

/// Action types of one place the request actions are mounted in. Each place
/// gets its own prefix so their dialogs do not react to each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebDevActions {
    prefix: String,
}

impl WebDevActions {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self { prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn action_type(&self, action: &WebDevAction) -> String {
        format!("{}/{}", self.prefix, action.suffix())
    }

    pub fn to_value(&self, action: &WebDevAction) -> Value {
        let action_type = self.action_type(action);
        match action {
            WebDevAction::SubmitEditEffort(efforts) => json!({"type": action_type, "values": efforts}),
            WebDevAction::SubmitEditActualLtsDate(date) => json!({"type": action_type, "values": date}),
            _ => json!({"type": action_type}),
        }
    }

    /// Reads back an action of this prefix. Actions of other prefixes and
    /// submits with unreadable values are `None`.
    pub fn parse(&self, value: &Value) -> Option<WebDevAction> {
        let action_type = value.get("type")?.as_str()?;
        let suffix = action_type
            .strip_prefix(self.prefix.as_str())?
            .strip_prefix('/')?;
        let values = value.get("values").cloned().unwrap_or(Value::Null);
        let action = match suffix {
            "REQUEST_DIALOG_EDIT_EFFORT_SHOW" => WebDevAction::ShowEditEffort,
            "REQUEST_DIALOG_EDIT_EFFORT_CLOSE" => WebDevAction::CloseEditEffort,
            "REQUEST_DIALOG_EDIT_EFFORT_SUBMIT" => {
                WebDevAction::SubmitEditEffort(serde_json::from_value(values).ok()?)
            }
            "REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_SHOW" => WebDevAction::ShowEditActualLtsDate,
            "REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_CLOSE" => WebDevAction::CloseEditActualLtsDate,
            "REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_SUBMIT" => {
                WebDevAction::SubmitEditActualLtsDate(serde_json::from_value(values).ok()?)
            }
            _ => return None,
        };
        Some(action)
    }
}
