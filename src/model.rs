use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{Direction, MINIMUM_NUMBER_OF_ENABLED_COLUMNS, Message, TableKey};

/// Enabled (displayed) and disabled (hidden) columns of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnPreference {
    pub enabled: Vec<String>, // display order
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Group {
    Enabled,
    Disabled,
}

/// Column preferences of every table, keyed by table.
#[derive(Debug, Default)]
pub struct Model {
    tables: HashMap<TableKey, ColumnPreference>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `message` and reports whether the table's columns changed.
    pub fn update(&mut self, message: &Message) -> bool {
        let changed = match message {
            Message::SetColumns {
                table,
                enabled,
                disabled,
            }
            | Message::ResetColumns {
                table,
                enabled,
                disabled,
            } => self.set_columns(table, enabled, disabled),
            Message::EnableColumn { table, column_id } => {
                self.update_column(table, column_id, Group::Enabled)
            }
            Message::DisableColumn { table, column_id } => {
                self.update_column(table, column_id, Group::Disabled)
            }
            Message::MoveColumn {
                table,
                column_id,
                direction,
            } => self.move_column(table, column_id, *direction),
        };
        trace!(
            "Update {} for {}: changed={changed}",
            message.action_type(),
            message.table()
        );
        changed
    }

    pub fn enabled_column_ids(&self, table: &TableKey) -> &[String] {
        self.tables
            .get(table)
            .map(|p| p.enabled.as_slice())
            .unwrap_or(&[])
    }

    pub fn disabled_column_ids(&self, table: &TableKey) -> &[String] {
        self.tables
            .get(table)
            .map(|p| p.disabled.as_slice())
            .unwrap_or(&[])
    }

    pub fn preference(&self, table: &TableKey) -> Option<&ColumnPreference> {
        self.tables.get(table)
    }

    pub fn tables(&self) -> impl Iterator<Item = (&TableKey, &ColumnPreference)> {
        self.tables.iter()
    }

    fn set_columns(&mut self, table: &TableKey, enabled: &[String], disabled: &[String]) -> bool {
        let preference = ColumnPreference {
            enabled: enabled.to_vec(),
            disabled: disabled.to_vec(),
        };
        let previous = self.tables.insert(table.clone(), preference);
        previous.as_ref() != self.tables.get(table)
    }

    // Moves one column from one group to the other. Keeps at least
    // MINIMUM_NUMBER_OF_ENABLED_COLUMNS enabled.
    fn update_column(&mut self, table: &TableKey, column_id: &str, to: Group) -> bool {
        let Some(preference) = self.tables.get_mut(table) else {
            return false;
        };
        let (from_group, to_group) = match to {
            Group::Enabled => (&mut preference.disabled, &mut preference.enabled),
            Group::Disabled => (&mut preference.enabled, &mut preference.disabled),
        };

        let Some(idx) = from_group.iter().position(|c| c == column_id) else {
            return false;
        };
        if to == Group::Disabled && from_group.len() <= MINIMUM_NUMBER_OF_ENABLED_COLUMNS {
            trace!("Keeping {column_id} enabled, minimum number of columns reached");
            return false;
        }

        let column = from_group.remove(idx);
        to_group.push(column);
        true
    }

    fn move_column(&mut self, table: &TableKey, column_id: &str, direction: Direction) -> bool {
        let Some(preference) = self.tables.get_mut(table) else {
            return false;
        };
        let reordered = move_value_in_list(&preference.enabled, column_id, direction.step());
        let changed = reordered != preference.enabled;
        preference.enabled = reordered;
        changed
    }
}

/// Moves `value` by `step_count` positions. The target index is clamped to the
/// list, so moving the first entry up or the last one down keeps the order.
pub(crate) fn move_value_in_list(list: &[String], value: &str, step_count: isize) -> Vec<String> {
    let mut moved = list.to_vec();
    let Some(actual_idx) = list.iter().position(|v| v == value) else {
        return moved;
    };
    let new_idx = (actual_idx as isize + step_count).clamp(0, list.len() as isize) as usize;
    let item = moved.remove(actual_idx);
    moved.insert(new_idx.min(moved.len()), item);
    moved
}
