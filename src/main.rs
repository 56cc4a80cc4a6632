use std::path::PathBuf;

use clap::Parser;
use fltk::{
    app,
    enums::Event,
    prelude::*,
};

use py_edit::app::domain::messages::Message;
use py_edit::app::infrastructure::logging;
use py_edit::app::infrastructure::platform::resolve_dark_mode;
use py_edit::app::services::config_store::ConfigStore;
use py_edit::app::state::AppState;
use py_edit::ui::main_window::build_main_window;
use py_edit::ui::menu::build_menu;

#[cfg(not(target_os = "windows"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// A tabbed Python editor with a built-in script runner and debugger console
#[derive(Parser, Debug)]
#[command(name = "PyEdit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Files to open after the previous session is restored
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Settings file to use instead of <config_dir>/pyedit/settings.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Start without restoring or overwriting the saved session
    #[arg(long)]
    no_session: bool,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let store = cli
        .config
        .map(ConfigStore::new)
        .unwrap_or_else(ConfigStore::default_location);
    tracing::debug!(path = %store.path().display(), "using config file");
    let config = store.load();
    let session_data = config.session.clone();
    let autosave_secs = config.settings.autosave_interval_secs;

    let app = app::App::default();
    let (s, r) = app::channel::<Message>();

    let mut widgets = build_main_window(&s, config.settings.console_visible);
    build_menu(
        &mut widgets.menu,
        &s,
        &config.settings,
        &config.recent_files,
        resolve_dark_mode(config.settings.theme_mode),
    );

    // Escape must not close the window; only the close button does.
    widgets.wind.set_callback(move |_| {
        if app::event() == Event::Close {
            s.send(Message::WindowClose);
        }
    });

    widgets.text_editor.handle(move |_, ev| {
        if matches!(ev, Event::KeyUp | Event::Released) {
            s.send(Message::CursorMoved);
        }
        false
    });

    let mut state = AppState::new(widgets, s, config, store, !cli.no_session);
    state.window.show();
    state.apply_settings();

    if !cli.no_session {
        state.restore_session(&session_data);
    }
    for path in cli.files {
        let path = std::fs::canonicalize(&path).unwrap_or(path);
        state.open_file(path.to_string_lossy().to_string());
    }
    state.ensure_tab();

    if autosave_secs > 0 {
        let interval = autosave_secs as f64;
        app::add_timeout3(interval, move |handle| {
            s.send(Message::AutosaveSession);
            app::repeat_timeout3(interval, handle);
        });
    }

    while app.wait() {
        let Some(msg) = r.recv() else {
            continue;
        };
        match msg {
            Message::FileNew => state.file_new(),
            Message::FileOpen => state.file_open(),
            Message::FileOpenRecent(path) => state.open_recent(path),
            Message::ClearRecentFiles => state.clear_recent_files(),
            Message::FileSave => {
                state.file_save();
            }
            Message::FileSaveAs => {
                state.file_save_as();
            }
            Message::FileQuit | Message::WindowClose => {
                if state.file_quit() {
                    app.quit();
                }
            }

            Message::TabSwitch(id) => state.switch_to_document(id),
            Message::TabClose(id) => {
                state.close_tab(id);
            }
            Message::TabCloseActive => state.close_active_tab(),
            Message::TabCloseAll => state.close_all_tabs(),
            Message::TabDuplicate(id) => state.duplicate_tab(id),
            Message::TabDuplicateActive => state.duplicate_active_tab(),
            Message::TabMove(from, to) => state.move_tab(from, to),
            Message::TabNext => state.switch_to_next_tab(),
            Message::TabPrevious => state.switch_to_previous_tab(),

            Message::EditUndo => state.undo(),
            Message::EditRedo => state.redo(),
            Message::EditCut => state.cut(),
            Message::EditCopy => state.copy(),
            Message::EditPaste => state.paste(),
            Message::SelectAll => state.select_all(),
            Message::ShowFind => state.show_find(false),
            Message::ShowReplace => state.show_find(true),
            Message::ShowGoToLine => state.show_goto_line(),

            Message::ToggleLineNumbers => state.toggle_line_numbers(),
            Message::ToggleWordWrap => state.toggle_word_wrap(),
            Message::ToggleDarkMode => state.toggle_dark_mode(),
            Message::ToggleHighlighting => state.toggle_highlighting(),
            Message::ToggleConsole => state.toggle_console(),

            Message::SetFont(font) => state.set_font(font),
            Message::IncreaseFontSize => state.increase_font_size(),
            Message::DecreaseFontSize => state.decrease_font_size(),

            Message::RunScript => state.run_script(false),
            Message::RunDebugger => state.run_script(true),
            Message::StopScript => state.stop_script(),
            Message::ConsoleSubmit(line) => state.console_submit(line),
            Message::ConsoleHistory(direction) => state.console_history(direction),
            Message::Process(event) => state.handle_process_event(event),

            Message::BufferModified(id, pos, inserted) => state.on_buffer_modified(id, pos, inserted),
            Message::DoRehighlight => state.do_pending_rehighlight(),
            Message::CursorMoved => state.cursor_moved(),
            Message::AutosaveSession => state.autosave(),
        }
    }
}
