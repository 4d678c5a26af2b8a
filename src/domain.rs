use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A table never shows fewer columns than this.
pub const MINIMUM_NUMBER_OF_ENABLED_COLUMNS: usize = 2;

/// Suffix of the user settings key a table's enabled columns are saved under.
pub const SETTINGS_SUFFIX: &str = "columns";

#[derive(Error, Debug)]
pub enum CFError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("User settings failed: {0}")]
    Settings(String),

    #[error("Controller is no longer running")]
    ControllerClosed,

    #[error("Request failed: {0}")]
    Request(String),

    #[error("No request is loaded")]
    MissingRequest,
}

/// Identifies one table instance: the kind of table and its unique id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableKey {
    pub table_name: String,
    pub table_id: String,
}

impl TableKey {
    pub fn new(table_name: impl Into<String>, table_id: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            table_id: table_id.into(),
        }
    }

    /// Key under which the user's column selection for this table is saved.
    pub fn settings_key(&self) -> String {
        format!("{}-{}-{}", self.table_name, self.table_id, SETTINGS_SUFFIX)
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table_name, self.table_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn step(self) -> isize {
        match self {
            Direction::Up => -1,
            Direction::Down => 1,
        }
    }
}

// Column filter actions. Serialized with their action type so they can be
// published on the action bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "columns/SET_COLUMNS")]
    SetColumns {
        table: TableKey,
        enabled: Vec<String>,
        disabled: Vec<String>,
    },
    #[serde(rename = "columns/RESET_COLUMNS")]
    ResetColumns {
        table: TableKey,
        enabled: Vec<String>,
        disabled: Vec<String>,
    },
    #[serde(rename = "columns/ENABLE_COLUMN")]
    EnableColumn { table: TableKey, column_id: String },
    #[serde(rename = "columns/DISABLE_COLUMN")]
    DisableColumn { table: TableKey, column_id: String },
    #[serde(rename = "columns/MOVE_COLUMN")]
    MoveColumn {
        table: TableKey,
        column_id: String,
        direction: Direction,
    },
}

impl Message {
    pub fn table(&self) -> &TableKey {
        match self {
            Message::SetColumns { table, .. }
            | Message::ResetColumns { table, .. }
            | Message::EnableColumn { table, .. }
            | Message::DisableColumn { table, .. }
            | Message::MoveColumn { table, .. } => table,
        }
    }

    /// Whether the enabled columns must be saved after this message was applied.
    /// Setting columns only seeds the store and is never written back.
    pub fn is_persisted(&self) -> bool {
        !matches!(self, Message::SetColumns { .. })
    }

    pub fn action_type(&self) -> &'static str {
        match self {
            Message::SetColumns { .. } => "columns/SET_COLUMNS",
            Message::ResetColumns { .. } => "columns/RESET_COLUMNS",
            Message::EnableColumn { .. } => "columns/ENABLE_COLUMN",
            Message::DisableColumn { .. } => "columns/DISABLE_COLUMN",
            Message::MoveColumn { .. } => "columns/MOVE_COLUMN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_key_is_built_from_name_and_id() {
        let table = TableKey::new("tableName", "tableId");
        assert_eq!(table.settings_key(), "tableName-tableId-columns");
    }

    #[test]
    fn message_serializes_with_its_action_type() {
        let message = Message::MoveColumn {
            table: TableKey::new("requests", "main"),
            column_id: "dueDate".to_string(),
            direction: Direction::Up,
        };
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value["type"], message.action_type());
        assert_eq!(value["direction"], "up");
        assert_eq!(value["table"]["table_name"], "requests");
    }

    #[test]
    fn only_set_columns_is_not_persisted() {
        let table = TableKey::new("t", "1");
        let set = Message::SetColumns {
            table: table.clone(),
            enabled: vec![],
            disabled: vec![],
        };
        let reset = Message::ResetColumns {
            table: table.clone(),
            enabled: vec![],
            disabled: vec![],
        };
        let enable = Message::EnableColumn {
            table,
            column_id: "a".to_string(),
        };
        assert!(!set.is_persisted());
        assert!(reset.is_persisted());
        assert!(enable.is_persisted());
    }
}
