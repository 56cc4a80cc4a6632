use fltk::{
    app::Sender,
    enums::Color,
    group::Flex,
    menu::MenuBar,
    prelude::*,
    text::{TextBuffer, TextEditor},
    window::Window,
};

use super::console_panel::{ConsolePanel, CONSOLE_HEIGHT};
use super::status_bar::{StatusBar, STATUS_BAR_HEIGHT};
use super::tab_bar::{TabBar, TAB_BAR_HEIGHT};
use crate::app::domain::messages::Message;

pub struct MainWidgets {
    pub wind: Window,
    pub flex: Flex,
    pub menu: MenuBar,
    pub tab_bar: TabBar,
    pub text_editor: TextEditor,
    pub console: ConsolePanel,
    pub status_bar: StatusBar,
}

pub fn build_main_window(sender: &Sender<Message>, console_visible: bool) -> MainWidgets {
    let mut wind = Window::new(100, 100, 900, 680, "Untitled 1 - PyEdit");
    wind.set_xclass("PyEdit");

    let mut flex = Flex::new(0, 0, 900, 680, None);
    flex.set_type(fltk::group::FlexType::Column);

    let menu = MenuBar::new(0, 0, 0, 30, "");
    flex.fixed(&menu, 30);

    let tab_bar = TabBar::new(0, 30, 900, *sender);
    flex.fixed(&tab_bar.widget, TAB_BAR_HEIGHT);

    let mut text_editor = TextEditor::new(0, 0, 0, 0, "");
    text_editor.set_buffer(TextBuffer::default());
    // Line number styling (set once)
    text_editor.set_linenumber_bgcolor(Color::from_rgb(240, 240, 240));
    text_editor.set_linenumber_fgcolor(Color::from_rgb(100, 100, 100));

    let mut console = ConsolePanel::new(sender);
    set_console_visible(&mut flex, &mut console, console_visible);

    let status_bar = StatusBar::new();
    flex.fixed(&status_bar.row, STATUS_BAR_HEIGHT);

    flex.end();
    wind.resizable(&flex);
    wind.end();

    MainWidgets {
        wind,
        flex,
        menu,
        tab_bar,
        text_editor,
        console,
        status_bar,
    }
}

pub fn set_console_visible(flex: &mut Flex, console: &mut ConsolePanel, visible: bool) {
    if visible {
        console.group.show();
        flex.fixed(&console.group, CONSOLE_HEIGHT);
    } else {
        console.group.hide();
        flex.fixed(&console.group, 0);
    }
    flex.layout();
}
