use serde::Serialize;

use crate::webdev::request::{OPS_LINK, PLANNING_CANCEL_STEP, RequestDetail, SAVE_PERMISSION};
use crate::webdev::state::DialogState;

pub const ACTIONS_LABEL_MSG: &str = "common.actions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MenuAction {
    OpenLink { href: String },
    ShowEditEffort,
    ShowEditActualLtsDate,
    EditRequest { key: String },
    CancelRequest { confirmation: ConfirmationDialog },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub at: &'static str,
    pub label_msg: &'static str,
    pub action: MenuAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationDialog {
    pub title_msg: &'static str,
    pub body_msg: &'static str,
    pub confirm_msg: &'static str,
    pub cancel_msg: &'static str,
}

impl ConfirmationDialog {
    pub fn cancel_request() -> Self {
        Self {
            title_msg: "planning.webDev.actions.cancel.request.dialog.title",
            body_msg: "planning.webDev.actions.cancel.request.dialog.body",
            confirm_msg: "common.yes",
            cancel_msg: "common.no",
        }
    }
}

/// The actions dropdown shown next to a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionsMenu {
    pub label_msg: &'static str,
    pub items: Vec<MenuItem>,
}

impl ActionsMenu {
    pub fn for_request(detail: &RequestDetail) -> Self {
        let mut items = Vec::new();
        if let Some(href) = detail.web_link(OPS_LINK) {
            items.push(MenuItem {
                at: "request-view-ops-button",
                label_msg: "planning.dashboard.webDev.action.viewOpsRequest",
                action: MenuAction::OpenLink {
                    href: href.to_string(),
                },
            });
        }
        items.push(MenuItem {
            at: "request-edit-effort-button",
            label_msg: "planning.dashboard.webDev.action.editEffort",
            action: MenuAction::ShowEditEffort,
        });
        items.push(MenuItem {
            at: "request-edit-actual-lts-date-button",
            label_msg: "planning.dashboard.webDev.action.editActualLtsDate",
            action: MenuAction::ShowEditActualLtsDate,
        });
        if detail.editable && detail.has_permission(SAVE_PERMISSION) {
            items.push(MenuItem {
                at: "request-edit-button",
                label_msg: if detail.change_request {
                    "planning.webDev.actions.changeRequest"
                } else {
                    "planning.webDev.actions.editRequest"
                },
                action: MenuAction::EditRequest {
                    key: detail.key.clone(),
                },
            });
        }
        if detail.has_workflow_step(PLANNING_CANCEL_STEP) {
            items.push(MenuItem {
                at: "request-cancel-button",
                label_msg: "planning.dashboard.webDev.action.cancelRequest",
                action: MenuAction::CancelRequest {
                    confirmation: ConfirmationDialog::cancel_request(),
                },
            });
        }
        Self {
            label_msg: ACTIONS_LABEL_MSG,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogView {
    pub at: &'static str,
    pub show: bool,
    pub title_msg: &'static str,
    pub submit_msg: &'static str,
    pub cancel_msg: &'static str,
    /// Shown instead of the form when there is nothing to edit.
    pub empty_msg: Option<&'static str>,
    pub disabled: bool,
}

impl DialogView {
    pub fn edit_effort(dialogs: &DialogState, detail: Option<&RequestDetail>, submitting: bool) -> Self {
        let no_efforts = detail.is_none_or(RequestDetail::no_request_type_has_efforts);
        let active_empty = detail.is_none_or(|d| d.active_team_efforts().is_empty());
        Self {
            at: "edit-effort-dialog",
            show: dialogs.edit_effort,
            title_msg: "planning.webDev.actions.editEffort",
            submit_msg: "common.button.submit",
            cancel_msg: "common.button.cancel",
            empty_msg: active_empty.then_some("planning.dashboard.webDev.channelDetail.noEfforts"),
            disabled: no_efforts || submitting,
        }
    }

    pub fn edit_actual_lts_date(dialogs: &DialogState, submitting: bool) -> Self {
        Self {
            at: "edit-actual-lts-date-dialog",
            show: dialogs.edit_actual_lts_date,
            title_msg: "planning.webDev.actions.editActualLtsDate",
            submit_msg: "common.button.submit",
            cancel_msg: "common.button.cancel",
            empty_msg: None,
            disabled: submitting,
        }
    }
}
