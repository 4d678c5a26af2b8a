//! Per-table column visibility preferences.
//!
//! Each table keeps an ordered list of enabled columns and the remaining
//! disabled ones. Changes go through a [`Controller`] one message at a time,
//! are saved to the user settings in the background and published on an
//! [`ActionBus`] where usage tracking and other listeners pick them up.

pub mod bus;
pub mod columns;
pub mod config;
pub mod controller;
pub mod domain;
pub mod filter;
pub mod model;
pub mod settings;
pub mod sync;
pub mod tracking;
pub mod webdev;

pub use bus::ActionBus;
pub use columns::{ColumnConfiguration, ColumnDescriptor, ColumnElement};
pub use config::AppConfig;
pub use controller::{Controller, ControllerHandle};
pub use domain::{CFError, Direction, MINIMUM_NUMBER_OF_ENABLED_COLUMNS, Message, TableKey};
pub use filter::{ColumnFilter, FilterView};
pub use model::{ColumnPreference, Model};
pub use settings::{FileSettings, MemorySettings, UserSettings};
pub use sync::{SyncFailure, SyncTrigger};
