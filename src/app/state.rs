use std::fs;
use std::path::Path;

use fltk::{
    app::Sender,
    dialog,
    group::Flex,
    menu::MenuBar,
    prelude::*,
    text::{TextEditor, WrapMode},
    window::Window,
};

use super::controllers::console::ConsoleController;
use super::controllers::highlight::HighlightController;
use super::controllers::tabs::TabManager;
use super::domain::document::DocumentId;
use super::domain::messages::Message;
use super::domain::settings::{AppSettings, FontChoice, ThemeMode};
use super::infrastructure::buffer::buffer_text_no_leak;
use super::infrastructure::platform::resolve_dark_mode;
use super::services::config_store::{ConfigFile, ConfigStore};
use super::services::console_history::HistoryDirection;
use super::services::recent_files::RecentFiles;
use super::services::script_runner::{ProcessEvent, RunRequest};
use super::services::session::{self, SessionData, SessionRestore, TabSnapshot};
use super::services::status;
use super::services::text_ops::{cursor_line_col, linenumber_width};
use crate::ui::console_panel::ConsolePanel;
use crate::ui::dialogs::find::show_find_replace_dialog;
use crate::ui::dialogs::goto_line::show_goto_line_dialog;
use crate::ui::file_dialogs::{native_open_dialog, native_save_dialog};
use crate::ui::main_window::{set_console_visible, MainWidgets};
use crate::ui::menu::{
    rebuild_recent_menu, set_checked, set_enabled, CONSOLE_ITEM, DARK_MODE_ITEM, HIGHLIGHTING_ITEM,
    LINE_NUMBERS_ITEM, STOP_SCRIPT_ITEM, WORD_WRAP_ITEM,
};
use crate::ui::status_bar::StatusBar;
use crate::ui::tab_bar::TabBar;
use crate::ui::theme::{apply_theme, EditorPalette};
#[cfg(target_os = "windows")]
use crate::ui::theme::set_windows_titlebar_theme;

pub struct AppState {
    pub tab_manager: TabManager,
    pub tab_bar: TabBar,
    pub editor: TextEditor,
    pub window: Window,
    pub menu: MenuBar,
    pub flex: Flex,
    pub console_panel: ConsolePanel,
    pub status_bar: StatusBar,
    pub sender: Sender<Message>,
    pub settings: AppSettings,
    pub recent_files: RecentFiles,
    store: ConfigStore,
    pub dark_mode: bool,
    pub highlight: HighlightController,
    pub console: ConsoleController,
    /// Last directory used in a file open/save dialog.
    pub last_open_directory: Option<String>,
    /// When false the session found at startup is written back untouched.
    session_enabled: bool,
    startup_session: SessionData,
}

impl AppState {
    pub fn new(
        widgets: MainWidgets,
        sender: Sender<Message>,
        config: ConfigFile,
        store: ConfigStore,
        session_enabled: bool,
    ) -> Self {
        let MainWidgets {
            wind,
            flex,
            menu,
            tab_bar,
            text_editor,
            console,
            status_bar,
        } = widgets;
        let ConfigFile {
            settings,
            recent_files,
            session,
        } = config;

        let dark_mode = resolve_dark_mode(settings.theme_mode);
        let highlight = HighlightController::new(
            settings.current_syntax_theme(dark_mode),
            settings.font.to_fltk(),
            settings.font_size as i32,
            settings.highlighting_enabled,
        );

        Self {
            tab_manager: TabManager::new(sender),
            tab_bar,
            editor: text_editor,
            window: wind,
            menu,
            flex,
            console_panel: console,
            status_bar,
            sender,
            settings,
            recent_files,
            store,
            dark_mode,
            highlight,
            console: ConsoleController::new(),
            last_open_directory: session.last_open_directory.clone(),
            session_enabled,
            startup_session: session,
        }
    }

    /// Push the loaded preferences into the widgets. Call once after the
    /// menu is built.
    pub fn apply_settings(&mut self) {
        let font = self.settings.font.to_fltk();
        let size = self.settings.font_size as i32;
        self.editor.set_text_font(font);
        self.editor.set_text_size(size);
        self.console_panel.set_font(font, size);
        self.apply_word_wrap();
        self.apply_appearance();
        self.console_panel.set_input_enabled(false, self.console.prompt());
    }

    // --- Binding & status ---

    /// Bind the active document's buffer to the editor
    pub fn bind_active_buffer(&mut self) {
        if let Some(doc) = self.tab_manager.active_doc() {
            let mut buffer = doc.buffer.clone();
            buffer.set_tab_distance(self.settings.tab_size as i32);
            self.editor.set_buffer(buffer);
        }
        self.highlight.bind_editor(&self.tab_manager, &mut self.editor);
        self.update_linenumber_width();
    }

    pub fn update_window_title(&mut self) {
        let title = match self.tab_manager.active_doc() {
            Some(doc) => status::window_title(&doc.display_name, doc.is_dirty()),
            None => status::window_title("Untitled", false),
        };
        self.window.set_label(&title);
    }

    /// Reset all three status areas from the active document.
    pub fn refresh_status(&mut self) {
        let Some(doc) = self.tab_manager.active_doc() else {
            return;
        };
        let path = doc.file_path.as_deref();
        let message = status::document_status(path, doc.is_dirty());
        let file_type = status::file_type_label(path);
        let text = buffer_text_no_leak(&doc.buffer);
        let (line, col) = cursor_line_col(&text, self.editor.insert_position().max(0) as usize);

        self.status_bar.set_message(&message);
        self.status_bar.set_cursor(&status::cursor_label(line, col));
        self.status_bar.set_file_type(&file_type);
    }

    /// Show a message until the next cursor or buffer update.
    pub fn set_status_message(&mut self, text: &str) {
        self.status_bar.set_message(text);
    }

    pub fn cursor_moved(&mut self) {
        if let Some(doc) = self.tab_manager.active_doc_mut() {
            doc.cursor_position = self.editor.insert_position();
        }
        self.refresh_status();
    }

    fn remember_cursor(&mut self) {
        let pos = self.editor.insert_position();
        if let Some(current) = self.tab_manager.active_doc_mut() {
            current.cursor_position = pos;
        }
    }

    // --- Tabs ---

    /// Switch the editor to display a different document
    pub fn switch_to_document(&mut self, id: DocumentId) {
        self.remember_cursor();
        self.tab_manager.set_active(id);
        self.show_active_document();
    }

    fn show_active_document(&mut self) {
        self.bind_active_buffer();
        if let Some(doc) = self.tab_manager.active_doc() {
            let len = doc.buffer.length();
            self.editor.set_insert_position(doc.cursor_position.clamp(0, len));
            self.editor.show_insert_position();
        }
        self.update_window_title();
        self.rebuild_tab_bar();
        self.refresh_status();
        let _ = self.editor.take_focus();
    }

    pub fn rebuild_tab_bar(&mut self) {
        let active_id = self.tab_manager.active_id();
        self.tab_bar
            .rebuild(self.tab_manager.documents(), active_id, self.dark_mode);
    }

    /// Open an untitled tab if none are left.
    pub fn ensure_tab(&mut self) {
        if self.tab_manager.count() == 0 {
            let id = self.tab_manager.add_untitled();
            self.highlight.detect_and_highlight(id, &mut self.tab_manager);
            self.show_active_document();
        }
    }

    /// Close a tab, asking about unsaved changes. Returns true if it closed.
    pub fn close_tab(&mut self, id: DocumentId) -> bool {
        let Some(doc) = self.tab_manager.doc_by_id(id) else {
            return false;
        };
        if doc.is_dirty() {
            let choice = dialog::choice2_default(
                &format!("\"{}\" has unsaved changes.", doc.display_name),
                "Save",
                "Discard",
                "Cancel",
            );

            match choice {
                Some(0) => {
                    let was_active = self.tab_manager.active_id();
                    if was_active != Some(id) {
                        self.switch_to_document(id);
                    }
                    if !self.file_save() {
                        if let Some(prev) = was_active
                            && prev != id
                        {
                            self.switch_to_document(prev);
                        }
                        return false;
                    }
                }
                Some(1) => {}
                _ => return false,
            }
        }

        let was_active = self.tab_manager.active_id() == Some(id);
        self.tab_manager.remove(id);
        tracing::debug!(doc = id.0, "tab closed");

        if self.tab_manager.count() == 0 {
            self.ensure_tab();
        } else if was_active {
            self.show_active_document();
        } else {
            self.rebuild_tab_bar();
        }
        true
    }

    pub fn close_active_tab(&mut self) {
        if let Some(id) = self.tab_manager.active_id() {
            self.close_tab(id);
        }
    }

    /// Close tabs in order; stops at the first one the user keeps.
    pub fn close_all_tabs(&mut self) {
        for id in self.tab_manager.ids() {
            if !self.close_tab(id) {
                break;
            }
        }
        self.ensure_tab();
    }

    pub fn duplicate_tab(&mut self, source: DocumentId) {
        self.remember_cursor();
        if let Some(id) = self.tab_manager.duplicate(source) {
            self.highlight.detect_and_highlight(id, &mut self.tab_manager);
            self.show_active_document();
        }
    }

    pub fn duplicate_active_tab(&mut self) {
        if let Some(id) = self.tab_manager.active_id() {
            self.duplicate_tab(id);
        }
    }

    pub fn move_tab(&mut self, from: usize, to: usize) {
        self.tab_manager.move_tab(from, to);
        self.rebuild_tab_bar();
    }

    pub fn switch_to_next_tab(&mut self) {
        if let Some(next_id) = self.tab_manager.next_doc_id() {
            self.switch_to_document(next_id);
        }
    }

    pub fn switch_to_previous_tab(&mut self) {
        if let Some(prev_id) = self.tab_manager.prev_doc_id() {
            self.switch_to_document(prev_id);
        }
    }

    // --- File operations ---

    fn remember_directory(&mut self, path: &str) {
        if let Some(parent) = Path::new(path).parent() {
            self.last_open_directory = Some(parent.to_string_lossy().to_string());
        }
    }

    /// The active tab if it is an empty, unmodified untitled buffer.
    fn pristine_active_tab(&self) -> Option<DocumentId> {
        self.tab_manager
            .active_doc()
            .filter(|d| d.is_untitled() && !d.is_dirty() && d.buffer.length() == 0)
            .map(|d| d.id)
    }

    pub fn file_new(&mut self) {
        self.remember_cursor();
        let id = self.tab_manager.add_untitled();
        self.highlight.detect_and_highlight(id, &mut self.tab_manager);
        self.show_active_document();
    }

    pub fn file_open(&mut self) {
        if let Some(path) = native_open_dialog(self.last_open_directory.as_deref()) {
            self.open_file(path);
        }
    }

    /// Open `path` in a tab, or focus it if it is already open. Returns
    /// false if the file could not be read.
    pub fn open_file(&mut self, path: String) -> bool {
        self.remember_directory(&path);

        if let Some(existing_id) = self.tab_manager.find_by_path(&path) {
            self.switch_to_document(existing_id);
            self.set_status_message(&format!("Switched to already open file: {}", path));
            return true;
        }

        match fs::read_to_string(&path) {
            Ok(content) => {
                let replace = self.pristine_active_tab();
                self.remember_cursor();
                let id = self.tab_manager.add_from_file(path.clone(), &content);
                if let Some(old) = replace {
                    self.tab_manager.remove(old);
                }
                self.highlight.detect_and_highlight(id, &mut self.tab_manager);
                self.show_active_document();

                self.recent_files.push(&path);
                rebuild_recent_menu(&mut self.menu, &self.sender, &self.recent_files);
                tracing::info!(path = %path, "opened file");
                self.set_status_message(&format!("Opened: {}", path));
                true
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "failed to open file");
                dialog::alert_default(&format!("Error opening file: {}", e));
                false
            }
        }
    }

    pub fn open_recent(&mut self, path: String) {
        if !Path::new(&path).exists() {
            dialog::alert_default(&session::missing_file_warning(&path));
            self.recent_files.prune_missing();
            rebuild_recent_menu(&mut self.menu, &self.sender, &self.recent_files);
            return;
        }
        self.open_file(path);
    }

    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
        rebuild_recent_menu(&mut self.menu, &self.sender, &self.recent_files);
        self.save_config();
    }

    /// Save the active document. Returns true when it ended up on disk.
    pub fn file_save(&mut self) -> bool {
        let Some((id, path)) = self
            .tab_manager
            .active_doc()
            .map(|d| (d.id, d.file_path.clone()))
        else {
            return false;
        };
        match path {
            Some(path) => self.write_document(id, path),
            None => self.file_save_as(),
        }
    }

    pub fn file_save_as(&mut self) -> bool {
        let Some(doc) = self.tab_manager.active_doc() else {
            return false;
        };
        let id = doc.id;
        let name = doc.display_name.clone();
        match native_save_dialog(self.last_open_directory.as_deref(), &name) {
            Some(path) => {
                self.remember_directory(&path);
                self.write_document(id, path)
            }
            None => false,
        }
    }

    fn write_document(&mut self, id: DocumentId, path: String) -> bool {
        let Some(doc) = self.tab_manager.doc_by_id_mut(id) else {
            return false;
        };
        let text = buffer_text_no_leak(&doc.buffer);
        if let Err(e) = fs::write(&path, &text) {
            tracing::warn!(path = %path, error = %e, "failed to save file");
            dialog::alert_default(&format!("Error saving file: {}", e));
            return false;
        }

        let path_changed = doc.file_path.as_deref() != Some(path.as_str());
        doc.file_path = Some(path.clone());
        doc.update_display_name();
        doc.mark_clean();
        if path_changed {
            self.highlight.detect_and_highlight(id, &mut self.tab_manager);
            self.highlight.bind_editor(&self.tab_manager, &mut self.editor);
        }

        self.recent_files.push(&path);
        rebuild_recent_menu(&mut self.menu, &self.sender, &self.recent_files);
        self.update_window_title();
        self.rebuild_tab_bar();
        self.refresh_status();
        tracing::info!(path = %path, "saved file");
        self.set_status_message(&format!("Saved: {}", path));
        true
    }

    // --- Edit ---

    pub fn undo(&mut self) {
        let _ = self.editor.undo();
    }

    pub fn redo(&mut self) {
        let _ = self.editor.redo();
    }

    pub fn cut(&mut self) {
        self.editor.cut();
    }

    pub fn copy(&mut self) {
        self.editor.copy();
    }

    pub fn paste(&mut self) {
        self.editor.paste();
    }

    pub fn select_all(&mut self) {
        if let Some(mut buf) = self.tab_manager.active_buffer() {
            let len = buf.length();
            buf.select(0, len);
        }
    }

    pub fn show_find(&mut self, replace: bool) {
        let Some(buf) = self.tab_manager.active_buffer() else {
            return;
        };
        let title = if replace { "Replace" } else { "Find" };
        show_find_replace_dialog(&buf, &mut self.editor, title);
        self.cursor_moved();
    }

    pub fn show_goto_line(&mut self) {
        let Some(buf) = self.tab_manager.active_buffer() else {
            return;
        };
        if show_goto_line_dialog(&buf, &mut self.editor) {
            self.cursor_moved();
        }
    }

    // --- View ---

    pub fn update_linenumber_width(&mut self) {
        if !self.settings.line_numbers_enabled {
            self.editor.set_linenumber_width(0);
            return;
        }
        let lines = match self.tab_manager.active_buffer() {
            Some(buf) => buf.count_lines(0, buf.length()).max(0) as usize + 1,
            None => 1,
        };
        self.editor.set_linenumber_width(linenumber_width(lines));
    }

    pub fn toggle_line_numbers(&mut self) {
        self.settings.line_numbers_enabled = !self.settings.line_numbers_enabled;
        self.update_linenumber_width();
        set_checked(&self.menu, LINE_NUMBERS_ITEM, self.settings.line_numbers_enabled);
        self.editor.redraw();
        self.save_config();
    }

    fn apply_word_wrap(&mut self) {
        if self.settings.word_wrap_enabled {
            self.editor.wrap_mode(WrapMode::AtBounds, 0);
        } else {
            self.editor.wrap_mode(WrapMode::None, 0);
        }
        self.editor.redraw();
    }

    pub fn toggle_word_wrap(&mut self) {
        self.settings.word_wrap_enabled = !self.settings.word_wrap_enabled;
        self.apply_word_wrap();
        set_checked(&self.menu, WORD_WRAP_ITEM, self.settings.word_wrap_enabled);
        self.save_config();
    }

    /// Colors for every widget plus the syntax theme for the current mode.
    fn apply_appearance(&mut self) {
        self.highlight
            .set_theme(self.settings.current_syntax_theme(self.dark_mode));
        let palette = self.highlight.is_enabled().then(|| EditorPalette {
            background: self.highlight.highlighter().theme_background(),
            foreground: self.highlight.highlighter().theme_foreground(),
        });
        apply_theme(
            &mut self.editor,
            &mut self.window,
            &mut self.menu,
            palette,
            self.dark_mode,
        );
        self.tab_bar.apply_theme(self.dark_mode);
        self.console_panel.apply_theme(self.dark_mode);
        self.status_bar.apply_theme(self.dark_mode);
        #[cfg(target_os = "windows")]
        set_windows_titlebar_theme(&self.window, self.dark_mode);

        self.highlight.rehighlight_all_documents(&mut self.tab_manager);
        self.highlight.bind_editor(&self.tab_manager, &mut self.editor);
        self.editor.redraw();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.settings.theme_mode = if self.dark_mode {
            ThemeMode::Dark
        } else {
            ThemeMode::Light
        };
        self.apply_appearance();
        set_checked(&self.menu, DARK_MODE_ITEM, self.dark_mode);
        self.save_config();
    }

    pub fn toggle_highlighting(&mut self) {
        self.settings.highlighting_enabled = !self.settings.highlighting_enabled;
        self.highlight.set_enabled(
            self.settings.highlighting_enabled,
            &mut self.tab_manager,
            &mut self.editor,
        );
        set_checked(&self.menu, HIGHLIGHTING_ITEM, self.settings.highlighting_enabled);
        self.apply_appearance();
        self.save_config();
    }

    pub fn set_console_shown(&mut self, visible: bool) {
        self.settings.console_visible = visible;
        set_console_visible(&mut self.flex, &mut self.console_panel, visible);
        set_checked(&self.menu, CONSOLE_ITEM, visible);
        self.window.redraw();
    }

    pub fn toggle_console(&mut self) {
        self.set_console_shown(!self.settings.console_visible);
        self.save_config();
    }

    // --- Format ---

    fn apply_font(&mut self) {
        let font = self.settings.font.to_fltk();
        let size = self.settings.font_size as i32;
        self.editor.set_text_font(font);
        self.editor.set_text_size(size);
        self.console_panel.set_font(font, size);
        self.highlight.set_font(font, size);
        self.highlight.bind_editor(&self.tab_manager, &mut self.editor);
        self.update_linenumber_width();
        self.editor.redraw();
        self.save_config();
    }

    pub fn set_font(&mut self, font: FontChoice) {
        self.settings.font = font;
        self.apply_font();
    }

    pub fn increase_font_size(&mut self) {
        if self.settings.increase_font_size() {
            self.apply_font();
        }
    }

    pub fn decrease_font_size(&mut self) {
        if self.settings.decrease_font_size() {
            self.apply_font();
        }
    }

    // --- Run ---

    pub fn run_script(&mut self, debug: bool) {
        if self.console.is_running() {
            self.set_status_message("A script is already running. Stop it first.");
            return;
        }
        let Some(doc) = self.tab_manager.active_doc() else {
            return;
        };
        let Some(path) = doc.file_path.clone().filter(|_| !doc.is_dirty()) else {
            dialog::alert_default("Please save the file before running.");
            return;
        };
        let name = doc.display_name.clone();

        self.set_console_shown(true);
        let request = RunRequest::new(self.settings.interpreter.clone(), path, debug);
        tracing::info!(command = %request.command_line(), "starting script");
        let started = self
            .console
            .run(&request, &mut self.console_panel, self.sender);
        set_enabled(&self.menu, STOP_SCRIPT_ITEM, started);
        if started {
            let verb = if debug { "Debugging" } else { "Running" };
            self.set_status_message(&format!("{}: {}", verb, name));
        }
    }

    pub fn stop_script(&mut self) {
        if self.console.stop() {
            self.set_status_message("Stopping script...");
        }
    }

    pub fn handle_process_event(&mut self, event: ProcessEvent) {
        if self.console.handle_event(event, &mut self.console_panel) {
            set_enabled(&self.menu, STOP_SCRIPT_ITEM, false);
            self.set_status_message("Script finished");
        }
    }

    pub fn console_submit(&mut self, line: String) {
        self.console.submit(&line, &mut self.console_panel);
    }

    pub fn console_history(&mut self, direction: HistoryDirection) {
        self.console
            .navigate_history(direction, &mut self.console_panel);
    }

    // --- Buffer events ---

    pub fn on_buffer_modified(&mut self, id: DocumentId, pos: i32, inserted: i32) {
        self.highlight.schedule_rehighlight(
            id,
            pos,
            inserted,
            &mut self.tab_manager,
            &self.sender,
            &mut self.editor,
        );
        if self.tab_manager.active_id() == Some(id) {
            self.update_linenumber_width();
            self.update_window_title();
            self.refresh_status();
        }
        self.rebuild_tab_bar();
    }

    pub fn do_pending_rehighlight(&mut self) {
        self.highlight
            .do_pending_rehighlight(&mut self.tab_manager, &mut self.editor);
    }

    // --- Session ---

    fn snapshots(&self) -> Vec<TabSnapshot> {
        self.tab_manager
            .documents()
            .iter()
            .map(|d| TabSnapshot {
                file_path: d.file_path.clone(),
                content: buffer_text_no_leak(&d.buffer),
                cursor_position: d.cursor_position,
                selection: d.selection(),
                is_dirty: d.is_dirty(),
            })
            .collect()
    }

    fn capture(&mut self) -> ConfigFile {
        self.remember_cursor();
        let session = if self.session_enabled {
            session::capture_session(
                &self.snapshots(),
                self.tab_manager.active_index().unwrap_or(0),
                self.settings.session_restore,
                self.last_open_directory.as_deref(),
            )
        } else {
            self.startup_session.clone()
        };
        ConfigFile {
            settings: self.settings.clone(),
            recent_files: self.recent_files.clone(),
            session,
        }
    }

    /// Write preferences, recent files and the session to disk.
    pub fn save_config(&mut self) {
        let config = self.capture();
        if let Err(e) = self.store.save(&config) {
            tracing::warn!(path = %self.store.path().display(), error = %e, "failed to save config");
        }
    }

    pub fn autosave(&mut self) {
        tracing::debug!("autosaving session");
        self.save_config();
    }

    /// Re-open the tabs recorded in `data`. Missing files are reported once.
    pub fn restore_session(&mut self, data: &SessionData) {
        let mode = self.settings.session_restore;
        if mode == SessionRestore::Off {
            return;
        }
        let plan = session::restore_session(data, mode);
        if !plan.warnings.is_empty() {
            for warning in &plan.warnings {
                tracing::warn!("{}", warning);
            }
            dialog::alert_default(&plan.warnings.join("\n"));
        }

        let mut restored = Vec::with_capacity(plan.tabs.len());
        for tab in &plan.tabs {
            let id = self.tab_manager.add_restored(tab);
            self.highlight.detect_and_highlight(id, &mut self.tab_manager);
            restored.push(id);
        }
        tracing::info!(tabs = restored.len(), "session restored");

        if let Some(&id) = plan.active_index.and_then(|i| restored.get(i)) {
            self.tab_manager.set_active(id);
        }
        if !restored.is_empty() {
            self.show_active_document();
        }
    }

    /// Handle quit request. Returns `true` if the app should exit.
    pub fn file_quit(&mut self) -> bool {
        if self.tab_manager.any_dirty() {
            let choice = dialog::choice2_default(
                "You have unsaved changes in one or more tabs.",
                "Save All",
                "Quit Without Saving",
                "Cancel",
            );

            match choice {
                Some(0) => {
                    let dirty_docs: Vec<DocumentId> = self
                        .tab_manager
                        .documents()
                        .iter()
                        .filter(|d| d.is_dirty())
                        .map(|d| d.id)
                        .collect();
                    for id in dirty_docs {
                        self.switch_to_document(id);
                        if !self.file_save() {
                            return false;
                        }
                    }
                }
                Some(1) => {}
                _ => return false,
            }
        }

        if self.console.stop() {
            tracing::info!("stopped running script on quit");
        }
        self.save_config();
        true
    }
}
