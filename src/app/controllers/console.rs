use fltk::app::Sender;

use crate::app::domain::messages::Message;
use crate::app::services::console_history::{ConsoleHistory, HistoryDirection};
use crate::app::services::script_runner::{ProcessEvent, ProcessEventSink, RunRequest, ScriptRunner};
use crate::ui::console_panel::ConsolePanel;

pub const DEBUGGER_PROMPT: &str = "(Pdb) ";
pub const PLAIN_PROMPT: &str = "> ";

impl ProcessEventSink for Sender<Message> {
    fn emit(&self, event: ProcessEvent) {
        self.send(Message::Process(event));
    }
}

/// Connects the script runner to the console panel: output goes in,
/// typed lines go out.
pub struct ConsoleController {
    runner: ScriptRunner,
    history: ConsoleHistory,
    debugging: bool,
}

impl ConsoleController {
    pub fn new() -> Self {
        Self {
            runner: ScriptRunner::new(),
            history: ConsoleHistory::new(),
            debugging: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.runner.is_running()
    }

    pub fn prompt(&self) -> &'static str {
        if self.debugging { DEBUGGER_PROMPT } else { PLAIN_PROMPT }
    }

    /// Clear the panel and start `request`. Returns whether a process is
    /// now running; failures are reported in the panel.
    pub fn run(&mut self, request: &RunRequest, panel: &mut ConsolePanel, sender: Sender<Message>) -> bool {
        panel.clear();
        self.debugging = request.debug;
        match self.runner.start(request, sender) {
            Ok(()) => {
                panel.append(&format!("[Running script: {}]\n", request.command_line()));
                panel.set_input_enabled(true, self.prompt());
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not start script");
                panel.append_line(&format!("Error: {}", e));
                panel.set_input_enabled(false, self.prompt());
                false
            }
        }
    }

    pub fn stop(&mut self) -> bool {
        self.runner.stop()
    }

    /// Route one event from the runner threads into the panel. Returns true
    /// when the process has exited.
    pub fn handle_event(&mut self, event: ProcessEvent, panel: &mut ConsolePanel) -> bool {
        match event {
            ProcessEvent::Output(text) | ProcessEvent::Error(text) => {
                panel.append(&text);
                false
            }
            ProcessEvent::Finished { exit_code, stopped } => {
                if stopped {
                    panel.append_line("[Script terminated]");
                } else {
                    panel.append_line(&format!("[Script finished with exit code {}]", exit_code));
                }
                panel.set_input_enabled(false, self.prompt());
                self.history.reset_navigation();
                true
            }
        }
    }

    /// Echo and forward a line typed in the console input.
    pub fn submit(&mut self, line: &str, panel: &mut ConsolePanel) {
        panel.clear_input();
        if !self.runner.is_running() {
            return;
        }
        panel.append(&format!("{}\n", line));
        self.history.record(line);
        if let Err(e) = self.runner.send_input(line) {
            tracing::warn!(error = %e, "failed to write to script stdin");
            panel.append_line(&format!("Error: {}", e));
        }
    }

    pub fn navigate_history(&mut self, direction: HistoryDirection, panel: &mut ConsolePanel) {
        if let Some(text) = self.history.navigate(direction) {
            panel.set_input_text(&text);
        }
    }
}

impl Default for ConsoleController {
    fn default() -> Self {
        Self::new()
    }
}
