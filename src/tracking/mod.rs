//! Usage tracking driven by the dispatched actions.

pub mod api;
pub mod configuration;
pub mod matcher;
pub mod tracker;

pub use api::{LogTrackingApi, RecordingTrackingApi, RoleSource, StaticRoles, TrackingApi, TrackingCall};
pub use configuration::{EventDefinition, PageViewDefinition, TrackedAction, TrackingConfiguration};
pub use tracker::{PageContext, Tracker};
