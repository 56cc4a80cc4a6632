use std::cell::RefCell;
use std::rc::Rc;

use fltk::{
    app::Sender,
    draw,
    enums::{Align, Color, Event, Font, Shortcut},
    menu::{MenuButton, MenuFlag},
    prelude::*,
    widget::Widget,
};

use crate::app::domain::document::{Document, DocumentId};
use crate::app::domain::messages::Message;

pub const TAB_BAR_HEIGHT: i32 = 30;

const MIN_TAB_WIDTH: i32 = 60;
const MAX_TAB_WIDTH: i32 = 200;
const CLOSE_BTN_SIZE: i32 = 14;
const CLOSE_BTN_MARGIN: i32 = 6;
const TAB_H_PADDING: i32 = 10;
const CORNER_RADIUS: i32 = 6;
const TAB_GAP: i32 = 1;
const PLUS_BTN_WIDTH: i32 = 28;
const PLUS_BTN_MARGIN: i32 = 4;

struct TabInfo {
    id: DocumentId,
    label: String,
    is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TabSlot {
    x: i32,
    width: i32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Layout {
    tabs: Vec<TabSlot>,
    plus_x: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HitResult {
    Tab { index: usize, is_close: bool },
    PlusButton,
    None,
}

struct TabBarState {
    tabs: Vec<TabInfo>,
    layout: Layout,
    is_dark: bool,
    hover_tab_index: Option<usize>,
    hover_close: bool,
    hover_plus: bool,
    drag_source: Option<usize>,
    /// Insertion point (0..=len) while dragging.
    drag_target: Option<usize>,
    sender: Sender<Message>,
}

/// Custom-drawn tab strip: click to switch, × or middle-click to close,
/// drag to reorder, right-click for the tab menu, + for a new tab.
pub struct TabBar {
    pub widget: Widget,
    state: Rc<RefCell<TabBarState>>,
}

impl TabBar {
    pub fn new(x: i32, y: i32, w: i32, sender: Sender<Message>) -> Self {
        let state = Rc::new(RefCell::new(TabBarState {
            tabs: Vec::new(),
            layout: Layout::default(),
            is_dark: false,
            hover_tab_index: None,
            hover_close: false,
            hover_plus: false,
            drag_source: None,
            drag_target: None,
            sender,
        }));

        let mut widget = Widget::new(x, y, w, TAB_BAR_HEIGHT, None);

        let draw_state = state.clone();
        widget.draw(move |wid| {
            let mut st = draw_state.borrow_mut();
            // The width changes on window resize, so lay out at draw time.
            st.layout = compute_layout(wid.w(), st.tabs.len());
            draw_tab_bar(wid, &st);
        });

        let handle_state = state.clone();
        widget.handle(move |wid, event| handle_tab_bar(wid, event, &handle_state));

        Self { widget, state }
    }

    pub fn rebuild(&mut self, documents: &[Document], active_id: Option<DocumentId>, is_dark: bool) {
        let mut st = self.state.borrow_mut();
        st.is_dark = is_dark;
        st.tabs = documents
            .iter()
            .map(|doc| TabInfo {
                id: doc.id,
                label: doc.tab_label(),
                is_active: active_id == Some(doc.id),
            })
            .collect();
        st.hover_tab_index = None;
        st.hover_close = false;
        st.layout = compute_layout(self.widget.w(), st.tabs.len());
        drop(st);
        self.widget.redraw();
    }

    pub fn apply_theme(&mut self, is_dark: bool) {
        self.state.borrow_mut().is_dark = is_dark;
        self.widget.redraw();
    }
}

// --- Layout ---

fn compute_layout(widget_w: i32, tab_count: usize) -> Layout {
    if tab_count == 0 {
        return Layout {
            tabs: Vec::new(),
            plus_x: PLUS_BTN_MARGIN,
        };
    }
    let count = tab_count as i32;
    let fixed = PLUS_BTN_WIDTH + PLUS_BTN_MARGIN + TAB_GAP * (count - 1);
    let tab_width = ((widget_w - fixed) / count).clamp(MIN_TAB_WIDTH, MAX_TAB_WIDTH);

    let tabs: Vec<TabSlot> = (0..count)
        .map(|i| TabSlot {
            x: i * (tab_width + TAB_GAP),
            width: tab_width,
        })
        .collect();
    let plus_x = count * (tab_width + TAB_GAP) + PLUS_BTN_MARGIN;
    Layout { tabs, plus_x }
}

/// `mx` is relative to the widget's left edge, `my` absolute.
fn hit_test(layout: &Layout, wy: i32, mx: i32, my: i32) -> HitResult {
    if my < wy || my >= wy + TAB_BAR_HEIGHT {
        return HitResult::None;
    }
    for (index, slot) in layout.tabs.iter().enumerate() {
        if mx >= slot.x && mx < slot.x + slot.width {
            let close_x = slot.x + slot.width - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE;
            let close_y = wy + (TAB_BAR_HEIGHT - CLOSE_BTN_SIZE) / 2;
            let is_close = mx >= close_x
                && mx <= close_x + CLOSE_BTN_SIZE
                && my >= close_y
                && my <= close_y + CLOSE_BTN_SIZE;
            return HitResult::Tab { index, is_close };
        }
    }
    if mx >= layout.plus_x && mx < layout.plus_x + PLUS_BTN_WIDTH {
        return HitResult::PlusButton;
    }
    HitResult::None
}

/// Insertion point for a tab dragged from `source` and hovering at `mx`.
/// `None` when dropping there would not move it.
fn drop_target(layout: &Layout, source: usize, mx: i32) -> Option<usize> {
    let last = layout.tabs.last()?;
    let to = if mx >= last.x + last.width {
        layout.tabs.len()
    } else {
        let (index, slot) = layout
            .tabs
            .iter()
            .enumerate()
            .find(|(_, s)| mx < s.x + s.width)?;
        if mx - slot.x < slot.width / 2 { index } else { index + 1 }
    };
    (to != source && to != source + 1).then_some(to)
}

// --- Colors ---

struct ThemeColors {
    bar_bg: Color,
    active_bg: Color,
    inactive_bg: Color,
    active_text: Color,
    inactive_text: Color,
    close_hover_bg: Color,
    indicator: Color,
}

fn theme_colors(is_dark: bool) -> ThemeColors {
    if is_dark {
        ThemeColors {
            bar_bg: Color::from_rgb(25, 25, 25),
            active_bg: Color::from_rgb(50, 50, 50),
            inactive_bg: Color::from_rgb(35, 35, 35),
            active_text: Color::from_rgb(230, 230, 230),
            inactive_text: Color::from_rgb(140, 140, 140),
            close_hover_bg: Color::from_rgb(70, 70, 70),
            indicator: Color::from_rgb(100, 160, 255),
        }
    } else {
        ThemeColors {
            bar_bg: Color::from_rgb(200, 200, 200),
            active_bg: Color::from_rgb(255, 255, 255),
            inactive_bg: Color::from_rgb(220, 220, 220),
            active_text: Color::from_rgb(0, 0, 0),
            inactive_text: Color::from_rgb(80, 80, 80),
            close_hover_bg: Color::from_rgb(190, 190, 190),
            indicator: Color::from_rgb(30, 100, 220),
        }
    }
}

// --- Drawing ---

fn truncate_to_fit(text: &str, max_width: i32) -> String {
    if max_width <= 0 {
        return String::new();
    }
    draw::set_font(Font::Helvetica, 12);
    let (tw, _) = draw::measure(text, true);
    if tw <= max_width {
        return text.to_string();
    }

    let ellipsis = "...";
    let (ew, _) = draw::measure(ellipsis, true);
    if ew >= max_width {
        return ellipsis.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    for len in (1..chars.len()).rev() {
        let candidate: String = chars[..len].iter().collect();
        let full = format!("{candidate}{ellipsis}");
        let (fw, _) = draw::measure(&full, true);
        if fw <= max_width {
            return full;
        }
    }
    ellipsis.to_string()
}

fn draw_rounded_top_rect(x: i32, y: i32, w: i32, h: i32, r: i32, color: Color) {
    draw::set_draw_color(color);
    draw::draw_rectf(x, y + r, w, h - r);
    draw::draw_rectf(x + r, y, w - 2 * r, r);
    draw::draw_pie(x, y, 2 * r, 2 * r, 90.0, 180.0);
    draw::draw_pie(x + w - 2 * r, y, 2 * r, 2 * r, 0.0, 90.0);
}

fn draw_tab_bar(wid: &Widget, st: &TabBarState) {
    let (wx, wy, ww, wh) = (wid.x(), wid.y(), wid.w(), wid.h());
    let colors = theme_colors(st.is_dark);

    draw::set_draw_color(colors.bar_bg);
    draw::draw_rectf(wx, wy, ww, wh);

    for (index, (tab, slot)) in st.tabs.iter().zip(&st.layout.tabs).enumerate() {
        let tx = wx + slot.x;
        if tab.is_active {
            draw_rounded_top_rect(tx, wy, slot.width, wh, CORNER_RADIUS, colors.active_bg);
        } else {
            draw_rounded_top_rect(tx, wy + 2, slot.width, wh - 2, CORNER_RADIUS, colors.inactive_bg);
        }

        let text_color = if tab.is_active { colors.active_text } else { colors.inactive_text };
        let text_area_width = slot.width - TAB_H_PADDING - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE - TAB_H_PADDING;
        let display_text = truncate_to_fit(&tab.label, text_area_width);
        draw::set_draw_color(text_color);
        draw::set_font(Font::Helvetica, 12);
        draw::draw_text(&display_text, tx + TAB_H_PADDING, wy + (wh + 12) / 2);

        let close_x = tx + slot.width - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE;
        let close_y = wy + (wh - CLOSE_BTN_SIZE) / 2;
        let is_hovered_tab = st.hover_tab_index == Some(index);
        if is_hovered_tab && st.hover_close {
            draw::set_draw_color(colors.close_hover_bg);
            draw::draw_rectf(close_x - 2, close_y - 2, CLOSE_BTN_SIZE + 4, CLOSE_BTN_SIZE + 4);
        }
        draw::set_draw_color(if tab.is_active || is_hovered_tab { text_color } else { colors.inactive_text });
        draw::set_font(Font::HelveticaBold, 20);
        draw::draw_text2("\u{00d7}", close_x, close_y, CLOSE_BTN_SIZE, CLOSE_BTN_SIZE, Align::Center);
    }

    let px = wx + st.layout.plus_x;
    let bg = match (st.hover_plus, st.is_dark) {
        (true, true) => Color::from_rgb(60, 60, 60),
        (true, false) => Color::from_rgb(210, 210, 210),
        (false, true) => Color::from_rgb(35, 35, 35),
        (false, false) => Color::from_rgb(220, 220, 220),
    };
    draw_rounded_top_rect(px, wy + 2, PLUS_BTN_WIDTH, wh - 4, CORNER_RADIUS, bg);
    draw::set_draw_color(if st.hover_plus { colors.active_text } else { colors.inactive_text });
    draw::set_font(Font::HelveticaBold, 16);
    draw::draw_text2("+", px, wy + 2, PLUS_BTN_WIDTH, wh - 4, Align::Center);

    if let (Some(_), Some(to)) = (st.drag_source, st.drag_target) {
        let ix = match st.layout.tabs.get(to) {
            Some(slot) => wx + slot.x,
            None => st.layout.tabs.last().map_or(wx, |s| wx + s.x + s.width),
        };
        draw::set_draw_color(colors.indicator);
        draw::draw_rectf(ix - 1, wy + 2, 3, wh - 4);
    }
}

// --- Context menu ---

fn show_context_menu(sender: Sender<Message>, tab_id: DocumentId) {
    // 1x1 anchor at the mouse so Wayland has a valid rectangle.
    let mx = fltk::app::event_x();
    let my = fltk::app::event_y();
    let mut menu = MenuButton::new(mx, my, 1, 1, None);
    let sc = Shortcut::None;
    let fl = MenuFlag::Normal;

    menu.add_emit("Close Tab", sc, fl, sender, Message::TabClose(tab_id));
    menu.add_emit("Close All Tabs", sc, fl, sender, Message::TabCloseAll);
    menu.add_emit("Duplicate Tab", sc, fl, sender, Message::TabDuplicate(tab_id));
    menu.popup();
}

// --- Event handling ---

fn handle_tab_bar(wid: &mut Widget, event: Event, state: &Rc<RefCell<TabBarState>>) -> bool {
    match event {
        Event::Push => {
            let mx = fltk::app::event_x() - wid.x();
            let my = fltk::app::event_y();
            let button = fltk::app::event_button();

            let mut st = state.borrow_mut();
            let sender = st.sender;
            match hit_test(&st.layout, wid.y(), mx, my) {
                HitResult::PlusButton if button == 1 => {
                    drop(st);
                    sender.send(Message::FileNew);
                    true
                }
                HitResult::Tab { index, is_close } => {
                    let tab_id = st.tabs[index].id;
                    match button {
                        3 => {
                            drop(st);
                            show_context_menu(sender, tab_id);
                        }
                        2 => {
                            drop(st);
                            sender.send(Message::TabClose(tab_id));
                        }
                        1 if is_close => {
                            drop(st);
                            sender.send(Message::TabClose(tab_id));
                        }
                        1 => {
                            st.drag_source = Some(index);
                            st.drag_target = None;
                            drop(st);
                            sender.send(Message::TabSwitch(tab_id));
                        }
                        _ => {}
                    }
                    true
                }
                _ => false,
            }
        }
        Event::Drag => {
            let mut st = state.borrow_mut();
            let Some(source) = st.drag_source else {
                return false;
            };
            let mx = fltk::app::event_x() - wid.x();
            let new_target = drop_target(&st.layout, source, mx);
            if new_target != st.drag_target {
                st.drag_target = new_target;
                drop(st);
                wid.redraw();
            }
            true
        }
        Event::Released => {
            let mut st = state.borrow_mut();
            let source = st.drag_source.take();
            let target = st.drag_target.take();
            let sender = st.sender;
            drop(st);
            wid.redraw();
            if let (Some(from), Some(to)) = (source, target) {
                sender.send(Message::TabMove(from, to));
            }
            false
        }
        Event::Move => {
            let mut st = state.borrow_mut();
            let mx = fltk::app::event_x() - wid.x();
            let my = fltk::app::event_y();
            let (hover, close, plus) = match hit_test(&st.layout, wid.y(), mx, my) {
                HitResult::Tab { index, is_close } => (Some(index), is_close, false),
                HitResult::PlusButton => (None, false, true),
                HitResult::None => (None, false, false),
            };
            if hover != st.hover_tab_index || close != st.hover_close || plus != st.hover_plus {
                st.hover_tab_index = hover;
                st.hover_close = close;
                st.hover_plus = plus;
                drop(st);
                wid.redraw();
            }
            true
        }
        Event::Leave => {
            let mut st = state.borrow_mut();
            st.drag_source = None;
            st.drag_target = None;
            if st.hover_tab_index.is_some() || st.hover_close || st.hover_plus {
                st.hover_tab_index = None;
                st.hover_close = false;
                st.hover_plus = false;
                drop(st);
                wid.redraw();
            }
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_clamps_tab_width() {
        let wide = compute_layout(2000, 2);
        assert_eq!(wide.tabs[0].width, MAX_TAB_WIDTH);
        assert_eq!(wide.tabs[1].x, MAX_TAB_WIDTH + TAB_GAP);

        let narrow = compute_layout(300, 10);
        assert!(narrow.tabs.iter().all(|t| t.width == MIN_TAB_WIDTH));
    }

    #[test]
    fn test_layout_empty_has_plus_button() {
        let layout = compute_layout(640, 0);
        assert!(layout.tabs.is_empty());
        assert_eq!(layout.plus_x, PLUS_BTN_MARGIN);
    }

    #[test]
    fn test_hit_test() {
        let layout = compute_layout(2000, 2);
        let wy = 30;
        let mid_y = wy + TAB_BAR_HEIGHT / 2;
        assert_eq!(hit_test(&layout, wy, 5, mid_y), HitResult::Tab { index: 0, is_close: false });
        let close_x = MAX_TAB_WIDTH - CLOSE_BTN_MARGIN - CLOSE_BTN_SIZE / 2;
        assert_eq!(hit_test(&layout, wy, close_x, mid_y), HitResult::Tab { index: 0, is_close: true });
        assert_eq!(hit_test(&layout, wy, layout.plus_x + 1, mid_y), HitResult::PlusButton);
        assert_eq!(hit_test(&layout, wy, 5, wy - 1), HitResult::None);
    }

    #[test]
    fn test_drop_target() {
        let layout = compute_layout(2000, 3);
        let w = MAX_TAB_WIDTH + TAB_GAP;
        // Left half of the third tab: insert before it.
        assert_eq!(drop_target(&layout, 0, 2 * w + 10), Some(2));
        // Right half of the third tab: append.
        assert_eq!(drop_target(&layout, 0, 2 * w + MAX_TAB_WIDTH - 5), Some(3));
        // Past the last tab.
        assert_eq!(drop_target(&layout, 0, 3 * w + 50), Some(3));
        // Dropping next to itself does nothing.
        assert_eq!(drop_target(&layout, 1, w + 10), None);
        assert_eq!(drop_target(&layout, 1, 2 * w + 10), None);
    }
}
