use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::domain::CFError;

/// Static description of one column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub id: String,
    /// Displayed before the user customized the table.
    #[serde(default)]
    pub default_column: bool,
    /// Capabilities that all have to be granted before the column may be shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_to_enable: Option<Vec<String>>,
    pub label_msg: String,
    /// Everything else is handed to the table renderer untouched.
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

impl ColumnDescriptor {
    pub fn new(id: impl Into<String>, label_msg: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default_column: false,
            requirements_to_enable: None,
            label_msg: label_msg.into(),
            props: Map::new(),
        }
    }

    pub fn default_column(mut self) -> Self {
        self.default_column = true;
        self
    }

    pub fn requires<I, S>(mut self, requirements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requirements_to_enable = Some(requirements.into_iter().map(Into::into).collect());
        self
    }

    fn is_granted(&self, requirements: &[String]) -> bool {
        match &self.requirements_to_enable {
            None => true,
            Some(required) => required.iter().all(|r| requirements.contains(r)),
        }
    }
}

/// Renderable column handed to the table: the column id plus its display properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnElement {
    pub id: String,
    pub label_msg: String,
    #[serde(flatten)]
    pub props: Map<String, Value>,
}

/// All columns of one table, in the order they were configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "IndexMap<String, ColumnDescriptor>", into = "IndexMap<String, ColumnDescriptor>")]
pub struct ColumnConfiguration {
    columns: IndexMap<String, ColumnDescriptor>,
}

impl TryFrom<IndexMap<String, ColumnDescriptor>> for ColumnConfiguration {
    type Error = CFError;

    fn try_from(columns: IndexMap<String, ColumnDescriptor>) -> Result<Self, Self::Error> {
        for (key, column) in columns.iter() {
            if key.is_empty() {
                return Err(CFError::InvalidConfiguration(
                    "column key must not be empty".to_string(),
                ));
            }
            if *key != column.id {
                return Err(CFError::InvalidConfiguration(format!(
                    "column \"{key}\" declares id \"{}\"",
                    column.id
                )));
            }
        }
        Ok(Self { columns })
    }
}

impl From<ColumnConfiguration> for IndexMap<String, ColumnDescriptor> {
    fn from(configuration: ColumnConfiguration) -> Self {
        configuration.columns
    }
}

impl ColumnConfiguration {
    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ColumnDescriptor>) -> Result<Self, CFError> {
        let columns = descriptors
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect::<IndexMap<_, _>>();
        Self::try_from(columns)
    }

    pub fn from_json(json: &str) -> Result<Self, CFError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, CFError> {
        let json = std::fs::read_to_string(path)?;
        let configuration = Self::from_json(&json)?;
        debug!("Loaded {} columns from {}", configuration.len(), path.display());
        Ok(configuration)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column_id: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(column_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.columns.keys()
    }

    /// Columns displayed when the user opens the table for the first time.
    pub fn default_column_ids(&self) -> Vec<String> {
        self.columns
            .values()
            .filter(|c| c.default_column)
            .map(|c| c.id.clone())
            .collect()
    }

    /// Every configured column that is not part of `enabled_ids`.
    pub fn calculated_disabled_columns(&self, enabled_ids: &[String]) -> Vec<String> {
        self.columns
            .keys()
            .filter(|id| !enabled_ids.contains(id))
            .cloned()
            .collect()
    }

    /// Sorts `disabled_ids` into configuration order.
    pub fn disabled_in_default_order(&self, disabled_ids: &[String]) -> Vec<String> {
        self.columns
            .keys()
            .filter(|id| disabled_ids.contains(id))
            .cloned()
            .collect()
    }

    /// Drops columns the caller is not allowed to see.
    ///
    /// Without `requirements` the ids are returned unchanged. Otherwise a column is
    /// kept when it is configured and every one of its `requirementsToEnable` is
    /// among the granted `requirements`.
    pub fn filter_by_requirements(&self, column_ids: &[String], requirements: Option<&[String]>) -> Vec<String> {
        let Some(requirements) = requirements else {
            return column_ids.to_vec();
        };
        column_ids
            .iter()
            .filter(|id| {
                self.columns
                    .get(id.as_str())
                    .is_some_and(|c| c.is_granted(requirements))
            })
            .cloned()
            .collect()
    }

    /// Columns to render for `enabled_ids`, falling back to the defaults when
    /// nothing is enabled yet. Unknown ids are skipped.
    pub fn build_column_elements(&self, enabled_ids: &[String]) -> Vec<ColumnElement> {
        let defaults;
        let displayed: &[String] = if enabled_ids.is_empty() {
            defaults = self.default_column_ids();
            &defaults
        } else {
            enabled_ids
        };
        self.column_elements(displayed)
    }

    /// Columns to render for exactly `column_ids`, without any fallback.
    /// Unknown ids are skipped.
    pub fn column_elements(&self, column_ids: &[String]) -> Vec<ColumnElement> {
        let elements = column_ids
            .iter()
            .filter_map(|id| self.columns.get(id))
            .map(|c| ColumnElement {
                id: c.id.clone(),
                label_msg: c.label_msg.clone(),
                props: c.props.clone(),
            })
            .collect::<Vec<_>>();
        trace!("Built {} column elements", elements.len());
        elements
    }

    /// Message key of every column's label.
    pub fn label_messages(&self) -> IndexMap<String, String> {
        self.columns
            .iter()
            .map(|(id, c)| (id.clone(), c.label_msg.clone()))
            .collect()
    }
}
