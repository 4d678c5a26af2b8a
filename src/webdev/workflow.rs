use std::collections::HashMap;
use std::sync::Arc;

use derive_setters::Setters;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument, trace};

use crate::bus::ActionBus;
use crate::domain::CFError;
use crate::webdev::actions::{WebDevAction, WebDevActions};
use crate::webdev::request::{RequestDetail, TeamEffort, WebDevApi};
use crate::webdev::state::DialogState;

pub const REQUEST_EDIT_ACTUAL_DATE_FORM: &str = "requestEditActualDateForm";
pub const REQUEST_EDIT_EFFORT_FORM: &str = "requestEditEffortForm";

pub const ACTUAL_LTS_DATE_ERROR_MSG: &str = "planning.dashboard.webDev.edit.actualLtsDate.error";
pub const EFFORTS_ERROR_MSG: &str = "planning.dashboard.webDev.edit.efforts.error";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActualLtsDateForm {
    pub preferred_lts_date: Option<String>,
    pub current_actual_lts_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EffortForm {
    pub efforts: Vec<TeamEffort>,
}

/// Actions published after a successful edit, e.g. to reload a dashboard.
#[derive(Debug, Clone, Default, Setters)]
#[setters(prefix = "on_", strip_option)]
pub struct SuccessActions {
    pub edit_lts_date_success: Option<Value>,
    pub edit_effort_success: Option<Value>,
}

/// Dialogs editing the request currently shown in detail.
pub struct WebDevWorkflow {
    actions: WebDevActions,
    api: Arc<dyn WebDevApi>,
    bus: ActionBus,
    on_success: SuccessActions,
    detail: Option<RequestDetail>,
    dialogs: DialogState,
    lts_form: ActualLtsDateForm,
    effort_form: EffortForm,
    form_errors: HashMap<&'static str, String>,
}

impl WebDevWorkflow {
    pub fn new(actions: WebDevActions, api: Arc<dyn WebDevApi>, bus: ActionBus) -> Self {
        Self {
            actions,
            api,
            bus,
            on_success: SuccessActions::default(),
            detail: None,
            dialogs: DialogState::default(),
            lts_form: ActualLtsDateForm::default(),
            effort_form: EffortForm::default(),
            form_errors: HashMap::new(),
        }
    }

    pub fn with_success_actions(mut self, on_success: SuccessActions) -> Self {
        self.on_success = on_success;
        self
    }

    pub fn actions(&self) -> &WebDevActions {
        &self.actions
    }

    pub fn set_detail(&mut self, detail: RequestDetail) {
        self.detail = Some(detail);
    }

    pub fn detail(&self) -> Option<&RequestDetail> {
        self.detail.as_ref()
    }

    pub fn dialogs(&self) -> DialogState {
        self.dialogs
    }

    pub fn lts_form(&self) -> &ActualLtsDateForm {
        &self.lts_form
    }

    pub fn effort_form(&self) -> &EffortForm {
        &self.effort_form
    }

    pub fn form_error(&self, form: &str) -> Option<&str> {
        self.form_errors.get(form).map(String::as_str)
    }

    /// Applies `action` and runs what it triggers. Failed submits are kept as
    /// form errors and leave their dialog open.
    #[instrument(skip(self), fields(prefix = self.actions.prefix()))]
    pub async fn handle(&mut self, action: WebDevAction) {
        self.bus.publish_value(self.actions.to_value(&action));
        if self.dialogs.update(&action) {
            trace!("Dialogs now {:?}", self.dialogs);
        }
        match action {
            WebDevAction::ShowEditActualLtsDate => self.fill_actual_lts_date_form(),
            WebDevAction::ShowEditEffort => self.fill_effort_form(),
            WebDevAction::SubmitEditActualLtsDate(date) => {
                let result = self.submit_actual_lts_date(date).await;
                self.finish_submit(result, REQUEST_EDIT_ACTUAL_DATE_FORM);
            }
            WebDevAction::SubmitEditEffort(efforts) => {
                let result = self.submit_efforts(efforts).await;
                self.finish_submit(result, REQUEST_EDIT_EFFORT_FORM);
            }
            WebDevAction::CloseEditEffort | WebDevAction::CloseEditActualLtsDate => {}
        }
    }

    /// Handles an action read from the bus if it belongs to this prefix.
    pub async fn handle_value(&mut self, value: &Value) -> bool {
        match self.actions.parse(value) {
            Some(action) => {
                self.handle(action).await;
                true
            }
            None => false,
        }
    }

    fn fill_actual_lts_date_form(&mut self) {
        self.form_errors.remove(REQUEST_EDIT_ACTUAL_DATE_FORM);
        self.lts_form = match &self.detail {
            Some(detail) => ActualLtsDateForm {
                preferred_lts_date: detail.preferred_lts_date.clone(),
                current_actual_lts_date: detail.actual_lts_date.clone(),
            },
            None => ActualLtsDateForm::default(),
        };
    }

    fn fill_effort_form(&mut self) {
        let efforts = self
            .detail
            .as_ref()
            .map(RequestDetail::active_team_efforts)
            .unwrap_or_default();
        self.effort_form = EffortForm { efforts };
    }

    async fn submit_actual_lts_date(&mut self, date: Option<String>) -> Result<(), CFError> {
        let key = self.detail.as_ref().ok_or(CFError::MissingRequest)?.key.clone();
        let detail = self.api.post_request_edit_actual_lts_date(&key, date).await?;
        debug!("Actual LTS date of {key} saved");
        self.detail = Some(detail);
        self.close(WebDevAction::CloseEditActualLtsDate);
        if let Some(success) = self.on_success.edit_lts_date_success.clone() {
            self.bus.publish_value(success);
        }
        Ok(())
    }

    async fn submit_efforts(&mut self, efforts: Vec<TeamEffort>) -> Result<(), CFError> {
        let request_type_id = self
            .detail
            .as_ref()
            .ok_or(CFError::MissingRequest)?
            .active_request_type()
            .map(|t| t.id.clone())
            .ok_or(CFError::MissingRequest)?;
        let detail = self
            .api
            .post_request_edit_effort(&request_type_id, efforts)
            .await?;
        debug!("Efforts of request type {request_type_id} saved");
        self.detail = Some(detail);
        self.close(WebDevAction::CloseEditEffort);
        if let Some(success) = self.on_success.edit_effort_success.clone() {
            self.bus.publish_value(success);
        }
        Ok(())
    }

    fn close(&mut self, action: WebDevAction) {
        self.bus.publish_value(self.actions.to_value(&action));
        self.dialogs.update(&action);
    }

    fn finish_submit(&mut self, result: Result<(), CFError>, form: &'static str) {
        let message = match form {
            REQUEST_EDIT_ACTUAL_DATE_FORM => ACTUAL_LTS_DATE_ERROR_MSG,
            _ => EFFORTS_ERROR_MSG,
        };
        match result {
            Ok(()) => {
                self.form_errors.remove(form);
            }
            Err(e) => {
                error!("Submitting {form} failed: {e}");
                self.form_errors.insert(form, message.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webdev::request::RequestType;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockApi {
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl WebDevApi for MockApi {
        async fn post_request_edit_actual_lts_date(
            &self,
            request_key: &str,
            actual_lts_date: Option<String>,
        ) -> Result<RequestDetail, CFError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("lts {request_key} {actual_lts_date:?}"));
            if self.fail {
                return Err(CFError::Request("500".to_string()));
            }
            Ok(RequestDetail {
                actual_lts_date,
                ..detail()
            })
        }

        async fn post_request_edit_effort(
            &self,
            request_type_id: &str,
            efforts: Vec<TeamEffort>,
        ) -> Result<RequestDetail, CFError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("effort {request_type_id} {}", efforts.len()));
            if self.fail {
                return Err(CFError::Request("500".to_string()));
            }
            let mut updated = detail();
            if let Some(Some(update)) = updated.request_types.get_mut("update") {
                update.team_efforts = efforts;
            }
            Ok(updated)
        }
    }

    fn effort(team: &str, total: f64) -> TeamEffort {
        TeamEffort {
            channel_team: team.to_string(),
            total_effort: Some(total),
            total_override_effort: None,
        }
    }

    fn detail() -> RequestDetail {
        RequestDetail {
            key: "WEB-12".to_string(),
            request_types: [
                ("newWebsite".to_string(), None),
                (
                    "update".to_string(),
                    Some(RequestType {
                        id: "77".to_string(),
                        team_efforts: vec![effort("web", 5.0)],
                    }),
                ),
            ]
            .into_iter()
            .collect(),
            preferred_lts_date: Some("2024-06-01".to_string()),
            actual_lts_date: Some("2024-06-10".to_string()),
            ..RequestDetail::default()
        }
    }

    fn workflow(api: Arc<MockApi>, bus: &ActionBus) -> WebDevWorkflow {
        let mut workflow = WebDevWorkflow::new(WebDevActions::new("detail"), api, bus.clone())
            .with_success_actions(SuccessActions::default().on_edit_lts_date_success(json!({"type": "dashboard/RELOAD"})));
        workflow.set_detail(detail());
        workflow
    }

    #[tokio::test]
    async fn showing_the_lts_dialog_fills_its_form() {
        let bus = ActionBus::new(16);
        let mut workflow = workflow(Arc::new(MockApi::default()), &bus);

        workflow.handle(WebDevAction::ShowEditActualLtsDate).await;
        assert!(workflow.dialogs().edit_actual_lts_date);
        assert_eq!(
            workflow.lts_form(),
            &ActualLtsDateForm {
                preferred_lts_date: Some("2024-06-01".to_string()),
                current_actual_lts_date: Some("2024-06-10".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn showing_the_effort_dialog_fills_active_efforts() {
        let bus = ActionBus::new(16);
        let mut workflow = workflow(Arc::new(MockApi::default()), &bus);

        workflow.handle(WebDevAction::ShowEditEffort).await;
        assert!(workflow.dialogs().edit_effort);
        assert_eq!(workflow.effort_form().efforts, vec![effort("web", 5.0)]);
    }

    #[tokio::test]
    async fn successful_lts_submit_updates_detail_and_closes() {
        let bus = ActionBus::new(16);
        let mut published = bus.subscribe();
        let api = Arc::new(MockApi::default());
        let mut workflow = workflow(api.clone(), &bus);

        workflow.handle(WebDevAction::ShowEditActualLtsDate).await;
        workflow
            .handle(WebDevAction::SubmitEditActualLtsDate(Some("2024-07-01".to_string())))
            .await;

        assert_eq!(api.calls.lock().unwrap().as_slice(), ["lts WEB-12 Some(\"2024-07-01\")"]);
        assert_eq!(workflow.detail().unwrap().actual_lts_date.as_deref(), Some("2024-07-01"));
        assert!(!workflow.dialogs().edit_actual_lts_date);
        assert_eq!(workflow.form_error(REQUEST_EDIT_ACTUAL_DATE_FORM), None);

        let mut types = Vec::new();
        while let Ok(action) = published.try_recv() {
            types.push(action["type"].as_str().unwrap_or_default().to_string());
        }
        assert_eq!(
            types,
            vec![
                "detail/REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_SHOW",
                "detail/REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_SUBMIT",
                "detail/REQUEST_DIALOG_EDIT_ACTUAL_LTS_DATE_CLOSE",
                "dashboard/RELOAD",
            ]
        );
    }

    #[tokio::test]
    async fn failed_submit_keeps_dialog_open_with_error() {
        let bus = ActionBus::new(16);
        let api = Arc::new(MockApi {
            fail: true,
            ..MockApi::default()
        });
        let mut workflow = workflow(api, &bus);

        workflow.handle(WebDevAction::ShowEditEffort).await;
        workflow
            .handle(WebDevAction::SubmitEditEffort(vec![effort("web", 6.0)]))
            .await;

        assert!(workflow.dialogs().edit_effort);
        assert_eq!(workflow.form_error(REQUEST_EDIT_EFFORT_FORM), Some(EFFORTS_ERROR_MSG));
        assert_eq!(workflow.detail(), Some(&detail()));
    }

    #[tokio::test]
    async fn effort_submit_goes_to_the_active_request_type() {
        let bus = ActionBus::new(16);
        let api = Arc::new(MockApi::default());
        let mut workflow = workflow(api.clone(), &bus);

        workflow
            .handle(WebDevAction::SubmitEditEffort(vec![effort("web", 6.0), effort("qa", 1.0)]))
            .await;
        assert_eq!(api.calls.lock().unwrap().as_slice(), ["effort 77 2"]);
        assert_eq!(workflow.detail().unwrap().active_team_efforts().len(), 2);
    }

    #[tokio::test]
    async fn reopening_the_lts_dialog_clears_its_error() {
        let bus = ActionBus::new(16);
        let api = Arc::new(MockApi {
            fail: true,
            ..MockApi::default()
        });
        let mut workflow = workflow(api, &bus);

        workflow.handle(WebDevAction::SubmitEditActualLtsDate(None)).await;
        assert_eq!(
            workflow.form_error(REQUEST_EDIT_ACTUAL_DATE_FORM),
            Some(ACTUAL_LTS_DATE_ERROR_MSG)
        );
        workflow.handle(WebDevAction::ShowEditActualLtsDate).await;
        assert_eq!(workflow.form_error(REQUEST_EDIT_ACTUAL_DATE_FORM), None);
    }

    #[tokio::test]
    async fn submitting_without_a_request_is_a_form_error() {
        let bus = ActionBus::new(16);
        let api = Arc::new(MockApi::default());
        let mut workflow = WebDevWorkflow::new(WebDevActions::new("detail"), api.clone(), bus);

        workflow.handle(WebDevAction::SubmitEditActualLtsDate(None)).await;
        assert_eq!(
            workflow.form_error(REQUEST_EDIT_ACTUAL_DATE_FORM),
            Some(ACTUAL_LTS_DATE_ERROR_MSG)
        );
        assert!(api.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn bus_values_of_other_prefixes_are_skipped() {
        let bus = ActionBus::new(16);
        let mut workflow = workflow(Arc::new(MockApi::default()), &bus);
        assert!(!workflow.handle_value(&json!({"type": "form/REQUEST_DIALOG_EDIT_EFFORT_SHOW"})).await);
        assert!(workflow.handle_value(&json!({"type": "detail/REQUEST_DIALOG_EDIT_EFFORT_SHOW"})).await);
        assert!(workflow.dialogs().edit_effort);
    }
}
