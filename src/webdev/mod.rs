//! Dialogs and actions menu of a web-dev request.

pub mod actions;
pub mod menu;
pub mod request;
pub mod state;
pub mod workflow;

pub use actions::{WebDevAction, WebDevActions};
pub use menu::{ActionsMenu, ConfirmationDialog, DialogView, MenuAction, MenuItem};
pub use request::{RequestDetail, RequestType, TeamEffort, WebDevApi};
pub use state::DialogState;
pub use workflow::{SuccessActions, WebDevWorkflow};
