use fltk::{
    app::Sender,
    enums::{Key, Shortcut},
    menu::{MenuBar, MenuFlag},
    prelude::*,
};

use crate::app::domain::messages::Message;
use crate::app::domain::settings::{AppSettings, FontChoice};
use crate::app::services::recent_files::{menu_label, RecentFiles};

pub const RECENT_MENU: &str = "File/Recent Files";
pub const STOP_SCRIPT_ITEM: &str = "Run/Stop Script";
pub const DARK_MODE_ITEM: &str = "View/Dark Mode";
pub const CONSOLE_ITEM: &str = "View/Show Console";
pub const LINE_NUMBERS_ITEM: &str = "View/Line Numbers";
pub const WORD_WRAP_ITEM: &str = "View/Word Wrap";
pub const HIGHLIGHTING_ITEM: &str = "View/Syntax Highlighting";

fn toggle_flag(on: bool) -> MenuFlag {
    if on { MenuFlag::Toggle | MenuFlag::Value } else { MenuFlag::Toggle }
}

fn radio_flag(on: bool) -> MenuFlag {
    if on { MenuFlag::Radio | MenuFlag::Value } else { MenuFlag::Radio }
}

pub fn build_menu(
    menu: &mut MenuBar,
    sender: &Sender<Message>,
    settings: &AppSettings,
    recent: &RecentFiles,
    initial_dark_mode: bool,
) {
    let s = sender;

    // File
    menu.add("File/New", Shortcut::Ctrl | 'n', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileNew) });
    menu.add("File/Open...", Shortcut::Ctrl | 'o', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileOpen) });
    rebuild_recent_menu(menu, sender, recent);
    menu.add("File/Save", Shortcut::Ctrl | 's', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileSave) });
    menu.add("File/Save As...", Shortcut::Ctrl | Shortcut::Shift | 's', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::FileSaveAs) });
    menu.add("File/Close Tab", Shortcut::Ctrl | 'w', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::TabCloseActive) });
    menu.add("File/Close All Tabs", Shortcut::Ctrl | Shortcut::Shift | 'w', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::TabCloseAll) });
    menu.add("File/Duplicate Tab", Shortcut::Ctrl | Shortcut::Shift | 'd', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::TabDuplicateActive) });
    menu.add("File/Next Tab", Shortcut::Ctrl | Key::Tab, MenuFlag::Normal, { let s = *s; move |_| s.send(Message::TabNext) });
    menu.add("File/Previous Tab", Shortcut::Ctrl | Shortcut::Shift | Key::Tab, MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::TabPrevious) });
    menu.add("File/Quit", Shortcut::Ctrl | 'q', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::FileQuit) });

    // Edit
    menu.add("Edit/Undo", Shortcut::Ctrl | 'z', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::EditUndo) });
    menu.add("Edit/Redo", Shortcut::Ctrl | Shortcut::Shift | 'z', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::EditRedo) });
    menu.add("Edit/Cut", Shortcut::Ctrl | 'x', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::EditCut) });
    menu.add("Edit/Copy", Shortcut::Ctrl | 'c', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::EditCopy) });
    menu.add("Edit/Paste", Shortcut::Ctrl | 'v', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::EditPaste) });
    menu.add("Edit/Select All", Shortcut::Ctrl | 'a', MenuFlag::MenuDivider, { let s = *s; move |_| s.send(Message::SelectAll) });
    menu.add("Edit/Find...", Shortcut::Ctrl | 'f', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowFind) });
    menu.add("Edit/Replace...", Shortcut::Ctrl | 'h', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowReplace) });
    menu.add("Edit/Go To Line...", Shortcut::Ctrl | 'g', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::ShowGoToLine) });

    // View
    menu.add(LINE_NUMBERS_ITEM, Shortcut::None, toggle_flag(settings.line_numbers_enabled), { let s = *s; move |_| s.send(Message::ToggleLineNumbers) });
    menu.add(WORD_WRAP_ITEM, Shortcut::None, toggle_flag(settings.word_wrap_enabled), { let s = *s; move |_| s.send(Message::ToggleWordWrap) });
    menu.add(DARK_MODE_ITEM, Shortcut::Ctrl | 't', toggle_flag(initial_dark_mode), { let s = *s; move |_| s.send(Message::ToggleDarkMode) });
    menu.add(HIGHLIGHTING_ITEM, Shortcut::None, toggle_flag(settings.highlighting_enabled), { let s = *s; move |_| s.send(Message::ToggleHighlighting) });
    menu.add(CONSOLE_ITEM, Shortcut::None, toggle_flag(settings.console_visible), { let s = *s; move |_| s.send(Message::ToggleConsole) });

    // Format
    for (label, choice) in [
        ("Format/Font/Screen (Bold)", FontChoice::ScreenBold),
        ("Format/Font/Courier", FontChoice::Courier),
        ("Format/Font/Helvetica Mono", FontChoice::HelveticaMono),
    ] {
        menu.add(label, Shortcut::None, radio_flag(settings.font == choice), { let s = *s; move |_| s.send(Message::SetFont(choice)) });
    }
    menu.add("Format/Increase Font Size", Shortcut::Ctrl | '=', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::IncreaseFontSize) });
    menu.add("Format/Decrease Font Size", Shortcut::Ctrl | '-', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::DecreaseFontSize) });

    // Run
    menu.add("Run/Run Script", Shortcut::Ctrl | 'r', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::RunScript) });
    menu.add("Run/Run with Debugger", Shortcut::Ctrl | Shortcut::Shift | 'r', MenuFlag::Normal, { let s = *s; move |_| s.send(Message::RunDebugger) });
    menu.add(STOP_SCRIPT_ITEM, Shortcut::Ctrl | Shortcut::Shift | 'c', MenuFlag::Inactive, { let s = *s; move |_| s.send(Message::StopScript) });
}

/// Replace the Recent Files submenu with the current list.
pub fn rebuild_recent_menu(menu: &mut MenuBar, sender: &Sender<Message>, recent: &RecentFiles) {
    let idx = menu.find_index(RECENT_MENU);
    if idx >= 0 {
        let _ = menu.clear_submenu(idx);
    } else {
        menu.add(RECENT_MENU, Shortcut::None, MenuFlag::Submenu, |_| {});
    }

    if recent.is_empty() {
        menu.add(&format!("{}/(empty)", RECENT_MENU), Shortcut::None, MenuFlag::Inactive, |_| {});
    } else {
        for (i, path) in recent.paths().iter().enumerate() {
            let label = format!("{}/{}", RECENT_MENU, menu_label(i, path));
            let s = *sender;
            let path = path.clone();
            menu.add(&label, Shortcut::None, MenuFlag::Normal, move |_| s.send(Message::FileOpenRecent(path.clone())));
        }
    }
    menu.add(
        &format!("{}/Clear Recent Files", RECENT_MENU),
        Shortcut::None,
        MenuFlag::Normal,
        { let s = *sender; move |_| s.send(Message::ClearRecentFiles) },
    );
}

/// Set or clear a toggle item's check mark.
pub fn set_checked(menu: &MenuBar, path: &str, checked: bool) {
    let idx = menu.find_index(path);
    if idx >= 0
        && let Some(mut item) = menu.at(idx)
    {
        if checked {
            item.set();
        } else {
            item.clear();
        }
    }
}

pub fn set_enabled(menu: &MenuBar, path: &str, enabled: bool) {
    let idx = menu.find_index(path);
    if idx >= 0
        && let Some(mut item) = menu.at(idx)
    {
        if enabled {
            item.activate();
        } else {
            item.deactivate();
        }
    }
}
