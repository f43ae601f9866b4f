use serde_json::Value;

pub const DEFAULT_SUBMIT_LABEL: &str = "Create Game";
pub const DEFAULT_BUSY_LABEL: &str = "Creating...";

/// The two mutually exclusive output regions of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Result,
    Error,
}

/// Which panels are currently visible.
///
/// `show`/`hide` report whether anything changed so views can skip redraws.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PanelVisibility {
    result: bool,
    error: bool,
}

impl PanelVisibility {
    #[allow(dead_code)]
    pub fn is_visible(&self, panel: Panel) -> bool {
        match panel {
            Panel::Result => self.result,
            Panel::Error => self.error,
        }
    }

    pub fn show(&mut self, panel: Panel) -> bool {
        self.set(panel, true)
    }

    pub fn hide(&mut self, panel: Panel) -> bool {
        self.set(panel, false)
    }

    #[allow(dead_code)]
    pub fn visible(&self) -> Option<Panel> {
        match (self.result, self.error) {
            (true, _) => Some(Panel::Result),
            (false, true) => Some(Panel::Error),
            (false, false) => None,
        }
    }

    fn set(&mut self, panel: Panel, visible: bool) -> bool {
        let slot = match panel {
            Panel::Result => &mut self.result,
            Panel::Error => &mut self.error,
        };
        let changed = *slot != visible;
        *slot = visible;
        changed
    }
}

/// State of the submit button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: String,
    submit_label: String,
    busy_label: String,
}

impl SubmitControl {
    pub fn new(submit_label: &str, busy_label: &str) -> Self {
        Self {
            enabled: true,
            label: submit_label.to_string(),
            submit_label: submit_label.to_string(),
            busy_label: busy_label.to_string(),
        }
    }

    /// Returns true if the control changed.
    pub fn set_busy(&mut self, busy: bool) -> bool {
        let label = if busy {
            self.busy_label.clone()
        } else {
            self.submit_label.clone()
        };
        let changed = self.enabled == busy || self.label != label;
        self.enabled = !busy;
        self.label = label;
        changed
    }

    #[allow(dead_code)]
    pub fn is_busy(&self) -> bool {
        !self.enabled
    }
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self::new(DEFAULT_SUBMIT_LABEL, DEFAULT_BUSY_LABEL)
    }
}

/// Everything the form handler needs from the page.
pub trait FormView {
    /// Put the submit control into (or out of) its in-flight state.
    fn set_busy(&mut self, busy: bool);

    /// Fill and reveal the result panel.
    fn show_result(&mut self, game_params: &Value, message: Option<&str>);

    /// Fill and reveal the error panel.
    fn show_error(&mut self, message: &str);

    fn hide_result(&mut self);

    fn hide_error(&mut self);
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// One observable call on a [`RecordingView`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum ViewCall {
        SetBusy(bool),
        ShowResult(String),
        ShowError(String),
        HideResult,
        HideError,
    }

    /// In-memory view that mirrors the page's element state.
    #[derive(Debug, Default)]
    pub struct RecordingView {
        pub calls: Vec<ViewCall>,
        pub panels: PanelVisibility,
        pub control: SubmitControl,
        pub error_message: String,
        pub game_params_text: String,
    }

    impl RecordingView {
        pub fn busy_transitions(&self) -> Vec<bool> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    ViewCall::SetBusy(b) => Some(*b),
                    _ => None,
                })
                .collect()
        }
    }

    impl FormView for RecordingView {
        fn set_busy(&mut self, busy: bool) {
            self.calls.push(ViewCall::SetBusy(busy));
            self.control.set_busy(busy);
        }

        fn show_result(&mut self, game_params: &Value, _message: Option<&str>) {
            self.game_params_text = crate::response::pretty_params(game_params);
            self.calls
                .push(ViewCall::ShowResult(self.game_params_text.clone()));
            self.panels.show(Panel::Result);
        }

        fn show_error(&mut self, message: &str) {
            self.calls.push(ViewCall::ShowError(message.to_string()));
            self.error_message = message.to_string();
            self.panels.show(Panel::Error);
        }

        fn hide_result(&mut self) {
            self.calls.push(ViewCall::HideResult);
            self.panels.hide(Panel::Result);
        }

        fn hide_error(&mut self) {
            self.calls.push(ViewCall::HideError);
            self.panels.hide(Panel::Error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_hidden_panel_is_noop() {
        let mut panels = PanelVisibility::default();
        assert!(!panels.hide(Panel::Result));
        assert!(!panels.hide(Panel::Error));
        assert_eq!(panels, PanelVisibility::default());
    }

    #[test]
    fn test_show_shown_panel_is_noop() {
        let mut panels = PanelVisibility::default();
        assert!(panels.show(Panel::Error));
        let before = panels;
        assert!(!panels.show(Panel::Error));
        assert_eq!(panels, before);
        assert_eq!(panels.visible(), Some(Panel::Error));
    }

    #[test]
    fn test_submit_control_labels() {
        let mut control = SubmitControl::default();
        assert!(control.enabled);
        assert_eq!(control.label, "Create Game");

        assert!(control.set_busy(true));
        assert!(control.is_busy());
        assert_eq!(control.label, "Creating...");

        assert!(control.set_busy(false));
        assert!(!control.set_busy(false));
        assert!(control.enabled);
        assert_eq!(control.label, "Create Game");
    }
}
