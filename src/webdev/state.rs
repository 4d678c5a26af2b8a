use crate::webdev::actions::WebDevAction;

/// Which request dialogs are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialogState {
    pub edit_effort: bool,
    pub edit_actual_lts_date: bool,
}

impl DialogState {
    /// Returns whether a dialog was opened or closed.
    pub fn update(&mut self, action: &WebDevAction) -> bool {
        let before = *self;
        match action {
            WebDevAction::ShowEditEffort => self.edit_effort = true,
            WebDevAction::CloseEditEffort => self.edit_effort = false,
            WebDevAction::ShowEditActualLtsDate => self.edit_actual_lts_date = true,
            WebDevAction::CloseEditActualLtsDate => self.edit_actual_lts_date = false,
            WebDevAction::SubmitEditEffort(_) | WebDevAction::SubmitEditActualLtsDate(_) => {}
        }
        before != *self
    }
}
