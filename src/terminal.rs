use std::io::{self, Write};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::warn;
use serde_json::{Value, json};

use crate::config::{OutputFormat, UIConfig};
use crate::event_bus::Metrics;
use crate::response::pretty_params;
use crate::view::{FormView, Panel, PanelVisibility, SubmitControl};

/// Form view rendered on a terminal.
///
/// Panels are printed when they are shown; hiding only updates state, since
/// printed output cannot be taken back.
pub struct TerminalView {
    format: OutputFormat,
    spinner_enabled: bool,
    panels: PanelVisibility,
    control: SubmitControl,
    spinner: Option<ProgressBar>,
    out: Box<dyn Write + Send>,
}

impl TerminalView {
    pub fn new(ui: &UIConfig) -> Self {
        Self::with_writer(ui, Box::new(io::stdout()))
    }

    pub fn with_writer(ui: &UIConfig, out: Box<dyn Write + Send>) -> Self {
        Self {
            format: ui.output_format,
            spinner_enabled: ui.spinner && ui.output_format == OutputFormat::Terminal,
            panels: PanelVisibility::default(),
            control: SubmitControl::new(&ui.submit_label, &ui.busy_label),
            spinner: None,
            out,
        }
    }

    #[allow(dead_code)]
    pub fn control(&self) -> &SubmitControl {
        &self.control
    }

    #[allow(dead_code)]
    pub fn panels(&self) -> PanelVisibility {
        self.panels
    }

    /// Header shown once at the start of an interactive session.
    pub fn print_banner(&mut self) {
        if self.format != OutputFormat::Terminal {
            return;
        }
        let rule = "=".repeat(60);
        self.write_lines(&[
            rule.bright_blue().to_string(),
            "AI Game Creator".bright_white().bold().to_string(),
            rule.bright_blue().to_string(),
            "Describe the game you want to create (\"quit\" to exit):".to_string(),
        ]);
    }

    pub fn print_prompt(&mut self) {
        if self.format == OutputFormat::Json {
            return;
        }
        let _ = write!(self.out, "{} ", ">".bright_green().bold());
        let _ = self.out.flush();
    }

    pub fn print_summary(&mut self, metrics: &Metrics) {
        match self.format {
            OutputFormat::Json => {
                let line = json!({
                    "summary": {
                        "submissions": metrics.submissions,
                        "games_created": metrics.games_created,
                        "rejected": metrics.rejected,
                        "failed": metrics.failed,
                        "blocked": metrics.blocked,
                    }
                });
                self.write_lines(&[line.to_string()]);
            }
            _ => {
                let rule = "=".repeat(60);
                self.write_lines(&[
                    String::new(),
                    rule.bright_blue().to_string(),
                    "Session Summary".bright_white().bold().to_string(),
                    rule.bright_blue().to_string(),
                    format!("Submissions:    {}", metrics.submissions.to_string().bright_cyan()),
                    format!("Games created:  {}", metrics.games_created.to_string().bright_green()),
                    format!("Rejected:       {}", metrics.rejected.to_string().bright_yellow()),
                    format!("Failed:         {}", metrics.failed.to_string().bright_red()),
                    format!("Blank submits:  {}", metrics.blocked),
                ]);
            }
        }
    }

    fn start_spinner(&mut self) {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        spinner.set_style(style);
        spinner.set_message(self.control.label.clone());
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn write_lines(&mut self, lines: &[String]) {
        for line in lines {
            if let Err(e) = writeln!(self.out, "{}", line) {
                warn!("Failed to write to terminal: {}", e);
                return;
            }
        }
        let _ = self.out.flush();
    }
}

impl FormView for TerminalView {
    fn set_busy(&mut self, busy: bool) {
        if !self.control.set_busy(busy) {
            return;
        }
        if !self.spinner_enabled {
            return;
        }
        if busy {
            self.start_spinner();
        } else {
            self.stop_spinner();
        }
    }

    fn show_result(&mut self, game_params: &Value, message: Option<&str>) {
        // The spinner line must be gone before a panel is printed under it.
        self.stop_spinner();
        self.panels.show(Panel::Result);
        match self.format {
            OutputFormat::Json => {
                let line = json!({
                    "panel": "result",
                    "message": message,
                    "game_params": game_params,
                });
                self.write_lines(&[line.to_string()]);
            }
            OutputFormat::Terminal => {
                let mut lines = vec![format!("{}", "✓ Game Created!".green().bold())];
                if let Some(message) = message {
                    lines.push(message.to_string());
                }
                lines.push("Here's what I understood:".to_string());
                lines.push(pretty_params(game_params));
                self.write_lines(&lines);
            }
            OutputFormat::Plain => {
                let mut lines = vec!["Game Created!".to_string()];
                if let Some(message) = message {
                    lines.push(message.to_string());
                }
                lines.push(pretty_params(game_params));
                self.write_lines(&lines);
            }
        }
    }

    fn show_error(&mut self, message: &str) {
        self.stop_spinner();
        self.panels.show(Panel::Error);
        let line = match self.format {
            OutputFormat::Json => json!({"panel": "error", "message": message}).to_string(),
            OutputFormat::Terminal => format!("{} {}", "✗ Error:".red().bold(), message.white()),
            OutputFormat::Plain => format!("Error: {}", message),
        };
        self.write_lines(&[line]);
    }

    fn hide_result(&mut self) {
        self.panels.hide(Panel::Result);
    }

    fn hide_error(&mut self) {
        self.panels.hide(Panel::Error);
    }
}

impl Drop for TerminalView {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl SharedBuffer {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn view(format: OutputFormat) -> (TerminalView, SharedBuffer) {
        let ui = UIConfig {
            output_format: format,
            spinner: false,
            ..UIConfig::default()
        };
        let buffer = SharedBuffer::default();
        (TerminalView::with_writer(&ui, Box::new(buffer.clone())), buffer)
    }

    #[test]
    fn test_plain_result_panel() {
        let (mut view, buffer) = view(OutputFormat::Plain);
        view.show_result(&json!({"a": 1}), Some("Game created! Check the game window."));
        view.hide_error();

        assert_eq!(
            buffer.contents(),
            "Game Created!\nGame created! Check the game window.\n{\n  \"a\": 1\n}\n"
        );
        assert_eq!(view.panels().visible(), Some(Panel::Result));
    }

    #[test]
    fn test_json_error_panel() {
        let (mut view, buffer) = view(OutputFormat::Json);
        view.show_error("bad input");
        view.hide_result();

        let line: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(line, json!({"panel": "error", "message": "bad input"}));
        assert!(!view.panels().is_visible(Panel::Result));
    }

    #[test]
    fn test_hide_prints_nothing() {
        let (mut view, buffer) = view(OutputFormat::Plain);
        view.hide_result();
        view.hide_error();
        assert!(buffer.contents().is_empty());
    }

    #[test]
    fn test_busy_round_trip_restores_label() {
        let (mut view, _buffer) = view(OutputFormat::Plain);
        view.set_busy(true);
        assert_eq!(view.control().label, "Creating...");
        assert!(!view.control().enabled);
        view.set_busy(false);
        assert_eq!(view.control().label, "Create Game");
        assert!(view.control().enabled);
    }

    #[test]
    fn test_panel_stops_spinner() {
        let ui = UIConfig {
            output_format: OutputFormat::Terminal,
            spinner: true,
            ..UIConfig::default()
        };
        let buffer = SharedBuffer::default();
        let mut view = TerminalView::with_writer(&ui, Box::new(buffer.clone()));

        view.set_busy(true);
        assert!(view.spinner.is_some());
        view.show_result(&json!({"a": 1}), None);
        assert!(view.spinner.is_none());

        view.set_busy(false);
        view.set_busy(true);
        assert!(view.spinner.is_some());
        view.show_error("bad input");
        assert!(view.spinner.is_none());
        assert!(buffer.contents().contains("bad input"));

        view.set_busy(false);
        assert!(view.control().enabled);
    }
}
