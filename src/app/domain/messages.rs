use super::document::DocumentId;
use super::settings::FontChoice;
use crate::app::services::console_history::HistoryDirection;
use crate::app::services::script_runner::ProcessEvent;

/// All messages that can be sent through the FLTK channel.
/// Menu items, widgets, timers and runner threads send these; the dispatch
/// loop in main routes them to `AppState`.
#[derive(Debug, Clone)]
pub enum Message {
    // File
    FileNew,
    FileOpen,
    FileOpenRecent(String),
    ClearRecentFiles,
    FileSave,
    FileSaveAs,
    FileQuit,
    WindowClose,

    // Tabs
    TabSwitch(DocumentId),
    TabClose(DocumentId),
    TabCloseActive,
    TabCloseAll,
    TabDuplicate(DocumentId),
    TabDuplicateActive,
    TabMove(usize, usize),
    TabNext,
    TabPrevious,

    // Edit
    EditUndo,
    EditRedo,
    EditCut,
    EditCopy,
    EditPaste,
    SelectAll,
    ShowFind,
    ShowReplace,
    ShowGoToLine,

    // View
    ToggleLineNumbers,
    ToggleWordWrap,
    ToggleDarkMode,
    ToggleHighlighting,
    ToggleConsole,

    // Format
    SetFont(FontChoice),
    IncreaseFontSize,
    DecreaseFontSize,

    // Run
    RunScript,
    RunDebugger,
    StopScript,
    ConsoleSubmit(String),
    ConsoleHistory(HistoryDirection),
    Process(ProcessEvent),

    // Editor internals
    /// Edit at byte `pos` inserting `n` bytes.
    BufferModified(DocumentId, i32, i32),
    DoRehighlight,
    CursorMoved,
    AutosaveSession,
}
