use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::columns::{ColumnConfiguration, ColumnElement};
use crate::controller::ControllerHandle;
use crate::domain::{CFError, Direction, Message, TableKey};
use crate::model::ColumnPreference;
use crate::sync::SyncTrigger;

pub const PLACEHOLDER_MSG: &str = "common.custom.column.placeholder";
pub const NO_ITEMS_MSG: &str = "common.noResults";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnLabel {
    pub id: String,
    pub label_msg: String,
}

/// What the column settings dropdown shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterView {
    pub enabled: Vec<ColumnLabel>,
    pub disabled: Vec<ColumnLabel>, // configuration order
    pub select_disabled: bool,
    pub placeholder_msg: &'static str,
    pub no_items_msg: &'static str,
}

/// Column settings of one table: knows its configuration and the granted
/// requirements and turns user intents into messages for the controller.
#[derive(Debug, Clone)]
pub struct ColumnFilter {
    table: TableKey,
    configuration: Arc<ColumnConfiguration>,
    requirements: Option<Vec<String>>,
}

impl ColumnFilter {
    pub fn new(table: TableKey, configuration: Arc<ColumnConfiguration>, requirements: Option<Vec<String>>) -> Self {
        Self {
            table,
            configuration,
            requirements,
        }
    }

    pub fn table(&self) -> &TableKey {
        &self.table
    }

    pub fn configuration(&self) -> &ColumnConfiguration {
        &self.configuration
    }

    fn allowed(&self, column_ids: &[String]) -> Vec<String> {
        self.configuration
            .filter_by_requirements(column_ids, self.requirements.as_deref())
    }

    /// Default enabled and disabled columns the caller may see.
    pub fn default_columns(&self) -> (Vec<String>, Vec<String>) {
        let enabled = self.configuration.default_column_ids();
        let disabled = self.configuration.calculated_disabled_columns(&enabled);
        (self.allowed(&enabled), self.allowed(&disabled))
    }

    /// Saved columns if there are any, the defaults otherwise. Columns the
    /// caller lacks the requirements for are left out either way.
    #[instrument(skip(self, sync), fields(table = %self.table))]
    pub async fn initial_columns(&self, sync: &SyncTrigger) -> (Vec<String>, Vec<String>) {
        let enabled = match sync.load(&self.table).await {
            Some(saved) => saved,
            None => self.configuration.default_column_ids(),
        };
        let disabled = self.configuration.calculated_disabled_columns(&enabled);
        let initial = (self.allowed(&enabled), self.allowed(&disabled));
        debug!("Initial columns: {:?}", initial.0);
        initial
    }

    /// Seeds the controller with the initial columns of this table.
    pub async fn mount(&self, handle: &ControllerHandle, sync: &SyncTrigger) -> Result<(), CFError> {
        let (enabled, disabled) = self.initial_columns(sync).await;
        handle
            .dispatch(Message::SetColumns {
                table: self.table.clone(),
                enabled,
                disabled,
            })
            .await
    }

    pub fn enable(&self, column_id: &str) -> Option<Message> {
        (!column_id.is_empty()).then(|| Message::EnableColumn {
            table: self.table.clone(),
            column_id: column_id.to_string(),
        })
    }

    pub fn disable(&self, column_id: &str) -> Option<Message> {
        (!column_id.is_empty()).then(|| Message::DisableColumn {
            table: self.table.clone(),
            column_id: column_id.to_string(),
        })
    }

    pub fn move_column(&self, column_id: &str, direction: Direction) -> Option<Message> {
        (!column_id.is_empty()).then(|| Message::MoveColumn {
            table: self.table.clone(),
            column_id: column_id.to_string(),
            direction,
        })
    }

    pub fn reset(&self) -> Message {
        let (enabled, disabled) = self.default_columns();
        Message::ResetColumns {
            table: self.table.clone(),
            enabled,
            disabled,
        }
    }

    pub fn view(&self, preference: &ColumnPreference) -> FilterView {
        let label = |id: &String| ColumnLabel {
            id: id.clone(),
            label_msg: self
                .configuration
                .get(id)
                .map(|c| c.label_msg.clone())
                .unwrap_or_else(|| id.clone()),
        };
        let disabled = self
            .configuration
            .disabled_in_default_order(&preference.disabled);
        FilterView {
            enabled: preference.enabled.iter().map(label).collect(),
            disabled: disabled.iter().map(label).collect(),
            select_disabled: preference.disabled.is_empty(),
            placeholder_msg: PLACEHOLDER_MSG,
            no_items_msg: NO_ITEMS_MSG,
        }
    }

    /// Columns the table renders for `preference`. Falls back to the allowed
    /// defaults when nothing is enabled; gated columns are never rendered.
    pub fn table_columns(&self, preference: &ColumnPreference) -> Vec<ColumnElement> {
        let mut displayed = self.allowed(&preference.enabled);
        if displayed.is_empty() {
            displayed = self.allowed(&self.configuration.default_column_ids());
        }
        self.configuration.column_elements(&displayed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::ColumnDescriptor;
    use crate::settings::MemorySettings;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn configuration() -> Arc<ColumnConfiguration> {
        Arc::new(
            ColumnConfiguration::from_descriptors([
                ColumnDescriptor::new("campaignName", "column.campaignName").default_column(),
                ColumnDescriptor::new("dueDate", "column.dueDate").default_column(),
                ColumnDescriptor::new("ltsWeek", "column.ltsWeek"),
                ColumnDescriptor::new("actions", "column.actions")
                    .requires(["bulkActions"])
                    .default_column(),
            ])
            .unwrap(),
        )
    }

    fn filter(requirements: Option<Vec<String>>) -> ColumnFilter {
        ColumnFilter::new(TableKey::new("campaigns", "dashboard"), configuration(), requirements)
    }

    #[tokio::test]
    async fn initial_columns_default_without_saved_selection() {
        let sync = SyncTrigger::new(Arc::new(MemorySettings::new()));
        let (enabled, disabled) = filter(Some(ids(&["bulkActions"]))).initial_columns(&sync).await;
        assert_eq!(enabled, ids(&["campaignName", "dueDate", "actions"]));
        assert_eq!(disabled, ids(&["ltsWeek"]));
    }

    #[tokio::test]
    async fn initial_columns_use_saved_selection() {
        let settings = MemorySettings::with_entries([("campaigns-dashboard-columns", ids(&["ltsWeek", "campaignName"]))]);
        let sync = SyncTrigger::new(Arc::new(settings));
        let (enabled, disabled) = filter(None).initial_columns(&sync).await;
        assert_eq!(enabled, ids(&["ltsWeek", "campaignName"]));
        assert_eq!(disabled, ids(&["dueDate", "actions"]));
    }

    #[tokio::test]
    async fn gated_columns_stay_hidden_even_when_saved() {
        let settings = MemorySettings::with_entries([("campaigns-dashboard-columns", ids(&["actions", "dueDate"]))]);
        let sync = SyncTrigger::new(Arc::new(settings));
        let (enabled, disabled) = filter(Some(vec![])).initial_columns(&sync).await;
        assert_eq!(enabled, ids(&["dueDate"]));
        assert_eq!(disabled, ids(&["campaignName", "ltsWeek"]));
    }

    #[test]
    fn reset_uses_allowed_defaults() {
        let message = filter(Some(vec![])).reset();
        assert_eq!(
            message,
            Message::ResetColumns {
                table: TableKey::new("campaigns", "dashboard"),
                enabled: ids(&["campaignName", "dueDate"]),
                disabled: ids(&["ltsWeek"]),
            }
        );
    }

    #[test]
    fn empty_column_ids_produce_no_message() {
        let filter = filter(None);
        assert!(filter.enable("").is_none());
        assert!(filter.disable("").is_none());
        assert!(filter.move_column("", Direction::Up).is_none());
        assert!(filter.enable("ltsWeek").is_some());
    }

    #[test]
    fn view_lists_disabled_columns_in_configuration_order() {
        let preference = ColumnPreference {
            enabled: ids(&["dueDate", "campaignName"]),
            disabled: ids(&["actions", "ltsWeek"]),
        };
        let view = filter(None).view(&preference);
        let enabled = view.enabled.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        let disabled = view.disabled.iter().map(|c| c.id.as_str()).collect::<Vec<_>>();
        assert_eq!(enabled, vec!["dueDate", "campaignName"]);
        assert_eq!(disabled, vec!["ltsWeek", "actions"]);
        assert_eq!(view.enabled[0].label_msg, "column.dueDate");
        assert!(!view.select_disabled);
        assert_eq!(view.placeholder_msg, PLACEHOLDER_MSG);
    }

    #[test]
    fn select_is_disabled_when_everything_is_shown() {
        let preference = ColumnPreference {
            enabled: ids(&["campaignName", "dueDate", "ltsWeek", "actions"]),
            disabled: vec![],
        };
        assert!(filter(None).view(&preference).select_disabled);
    }

    #[tokio::test]
    async fn gated_saved_columns_are_not_rendered_through_defaults() {
        let settings = MemorySettings::with_entries([("campaigns-dashboard-columns", ids(&["actions"]))]);
        let sync = SyncTrigger::new(Arc::new(settings));
        let filter = filter(Some(vec![]));

        let (enabled, disabled) = filter.initial_columns(&sync).await;
        assert!(enabled.is_empty());
        let preference = ColumnPreference { enabled, disabled };
        let rendered = filter
            .table_columns(&preference)
            .into_iter()
            .map(|c| c.id)
            .collect::<Vec<_>>();
        assert_eq!(rendered, ids(&["campaignName", "dueDate"]));
    }

    #[test]
    fn fully_gated_defaults_render_nothing() {
        let configuration = Arc::new(
            ColumnConfiguration::from_descriptors([
                ColumnDescriptor::new("actions", "column.actions")
                    .requires(["bulkActions"])
                    .default_column(),
                ColumnDescriptor::new("ltsWeek", "column.ltsWeek"),
            ])
            .unwrap(),
        );
        let filter = ColumnFilter::new(TableKey::new("campaigns", "dashboard"), configuration, Some(vec![]));
        assert!(filter.table_columns(&ColumnPreference::default()).is_empty());
    }

    #[test]
    fn stored_gated_columns_are_not_rendered() {
        let preference = ColumnPreference {
            enabled: ids(&["actions", "dueDate"]),
            disabled: vec![],
        };
        let rendered = filter(Some(vec![])).table_columns(&preference);
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].id, "dueDate");
    }

    #[test]
    fn table_columns_follow_enabled_order() {
        let preference = ColumnPreference {
            enabled: ids(&["ltsWeek", "campaignName"]),
            disabled: vec![],
        };
        let columns = filter(None).table_columns(&preference);
        assert_eq!(columns[0].id, "ltsWeek");
        assert_eq!(columns[1].label_msg, "column.campaignName");
    }
}
