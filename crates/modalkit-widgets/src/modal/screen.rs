#![forbid(unsafe_code)]

//! Terminal cell-grid surface.
//!
//! [`Screen`] draws each modal as a bordered box centered in the grid, with
//! the title set into the top border and a right-aligned `[ Close ]` button
//! on the last inner row:
//!
//! ```text
//! ┌─ Delete item? ─┐
//! │                │
//! │      [ Close ] │
//! └────────────────┘
//! ```
//!
//! Modals stack as layers in render order. Only the top layer receives
//! input: a left press inside its button, or Escape when enabled, fires its
//! trigger. Everything else is swallowed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use modalkit_core::{Event, MouseButton, MouseEventKind, Rect, Size};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::registry::{DismissTrigger, ModalId};
use super::surface::{CloseTrigger, ModalSurface, ModalView};
use crate::{display_width, ellipsize};

/// Narrowest inner width of a panel.
const MIN_INNER_WIDTH: usize = 16;
/// Border, blank row, button row, border.
const PANEL_HEIGHT: u16 = 4;

/// Identifies one rendered layer of a [`Screen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenLayer(u32);

struct Layer {
    handle: ScreenLayer,
    modal: ModalId,
    rect: Rect,
    button: Rect,
    title: String,
    label: String,
    close_on_escape: bool,
    trigger: CloseTrigger,
}

struct ScreenInner {
    area: Rect,
    layers: Vec<Layer>,
    next_layer: u32,
}

/// Shared handle to a terminal grid that modals render into.
///
/// Clones share the same grid.
#[derive(Clone)]
pub struct Screen {
    inner: Rc<RefCell<ScreenInner>>,
}

impl fmt::Debug for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Screen")
            .field("area", &inner.area)
            .field("layers", &inner.layers.len())
            .finish()
    }
}

impl Screen {
    /// Create an empty screen of `width` x `height` cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ScreenInner {
                area: Rect::from_size(width, height),
                layers: Vec::new(),
                next_layer: 0,
            })),
        }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        self.inner.borrow().area.size()
    }

    /// Number of mounted modals.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.inner.borrow().layers.len()
    }

    /// Id of the modal on top, if any.
    #[must_use]
    pub fn top_modal(&self) -> Option<ModalId> {
        self.inner.borrow().layers.last().map(|l| l.modal)
    }

    /// Panel rectangle of a mounted modal.
    #[must_use]
    pub fn panel_rect(&self, modal: ModalId) -> Option<Rect> {
        self.with_layer(modal, |l| l.rect)
    }

    /// Close button rectangle of a mounted modal.
    #[must_use]
    pub fn close_button_rect(&self, modal: ModalId) -> Option<Rect> {
        self.with_layer(modal, |l| l.button)
    }

    fn with_layer<T>(&self, modal: ModalId, f: impl FnOnce(&Layer) -> T) -> Option<T> {
        self.inner
            .borrow()
            .layers
            .iter()
            .find(|l| l.modal == modal)
            .map(f)
    }

    /// Route an input event to the top layer.
    ///
    /// Returns `true` if the event fired a close trigger.
    pub fn handle_event(&self, event: &Event) -> bool {
        let fired = {
            let inner = self.inner.borrow();
            let Some(top) = inner.layers.last() else {
                return false;
            };
            match event {
                Event::Mouse(mouse)
                    if mouse.kind == MouseEventKind::Down(MouseButton::Left)
                        && top.button.contains(mouse.x, mouse.y) =>
                {
                    Some((top.trigger.clone(), DismissTrigger::CloseControl))
                }
                Event::Key(key) if top.close_on_escape && key.is_escape_press() => {
                    Some((top.trigger.clone(), DismissTrigger::Escape))
                }
                _ => None,
            }
        };
        match fired {
            Some((trigger, kind)) => {
                trigger.fire_as(kind);
                true
            }
            None => false,
        }
    }

    /// Compose all layers into full-width text rows.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        let inner = self.inner.borrow();
        let mut grid = Grid::new(inner.area.width, inner.area.height);
        for layer in &inner.layers {
            draw_layer(&mut grid, layer);
        }
        grid.into_lines()
    }

    /// Composed rows joined with newlines, trailing blanks trimmed.
    #[must_use]
    pub fn to_text(&self) -> String {
        let lines = self.render_lines();
        let mut out: Vec<&str> = lines.iter().map(|l| l.trim_end()).collect();
        while out.last().is_some_and(|l| l.is_empty()) {
            out.pop();
        }
        out.join("\n")
    }
}

impl ModalSurface for Screen {
    type Handle = ScreenLayer;

    fn render(&mut self, view: &ModalView<'_>, trigger: CloseTrigger) -> ScreenLayer {
        let mut inner = self.inner.borrow_mut();
        let area = inner.area;

        let label = format!("[ {} ]", view.close_text);
        let inner_width = (display_width(view.title) + 3)
            .max(display_width(&label) + 2)
            .max(MIN_INNER_WIDTH);
        let width = u16::try_from(inner_width + 2).unwrap_or(u16::MAX);
        let rect = area.centered(Size::new(width, PANEL_HEIGHT));

        let _span = tracing::debug_span!(
            "widget_render",
            widget = "Modal",
            x = rect.x,
            y = rect.y,
            w = rect.width,
            h = rect.height
        )
        .entered();

        let label = ellipsize(&label, usize::from(rect.width.saturating_sub(4))).into_owned();
        let button = button_rect(rect, &label);

        let handle = ScreenLayer(inner.next_layer);
        inner.next_layer += 1;
        inner.layers.push(Layer {
            handle,
            modal: view.id,
            rect,
            button,
            title: view.title.to_owned(),
            label,
            close_on_escape: view.close_on_escape,
            trigger,
        });
        handle
    }

    fn unmount(&mut self, handle: ScreenLayer) {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let idx = inner.layers.iter().position(|l| l.handle == handle);
            idx.map(|idx| inner.layers.remove(idx))
        };
        if removed.is_none() {
            tracing::trace!(target: "modalkit::modal", layer = handle.0, "layer already removed");
        }
        // The layer's trigger is released here, outside the borrow.
        drop(removed);
    }
}

fn button_rect(panel: Rect, label: &str) -> Rect {
    if panel.width < 4 || panel.height < 3 {
        return Rect::default();
    }
    let lw = u16::try_from(display_width(label)).unwrap_or(u16::MAX);
    let x = panel.right().saturating_sub(2).saturating_sub(lw);
    let y = panel.bottom() - 2;
    Rect::new(x, y, lw, 1)
}

fn draw_layer(grid: &mut Grid, layer: &Layer) {
    let r = layer.rect;
    if r.width < 2 || r.height < 2 {
        return;
    }
    let (left, right) = (r.x, r.right() - 1);
    let (top, bottom) = (r.y, r.bottom() - 1);

    for y in top..=bottom {
        for x in left..=right {
            let glyph = match (x == left, x == right, y == top, y == bottom) {
                (true, _, true, _) => "┌",
                (_, true, true, _) => "┐",
                (true, _, _, true) => "└",
                (_, true, _, true) => "┘",
                (_, _, true, _) | (_, _, _, true) => "─",
                (true, _, _, _) | (_, true, _, _) => "│",
                _ => " ",
            };
            grid.put(x, y, glyph);
        }
    }

    if !layer.title.is_empty() && r.width >= 6 {
        let title = ellipsize(&layer.title, usize::from(r.width - 5));
        grid.put_str(left + 2, top, &format!(" {title} "), right);
    }

    if !layer.button.is_empty() {
        grid.put_str(layer.button.x, layer.button.y, &layer.label, right);
    }
}

/// Row-major cells; a wide glyph is followed by an empty continuation cell.
struct Grid {
    width: u16,
    rows: Vec<Vec<String>>,
}

impl Grid {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            rows: vec![vec![" ".to_owned(); usize::from(width)]; usize::from(height)],
        }
    }

    fn put(&mut self, x: u16, y: u16, glyph: &str) {
        let Some(row) = self.rows.get_mut(usize::from(y)) else {
            return;
        };
        let x = usize::from(x);
        if x >= row.len() {
            return;
        }
        // Overwriting half of a wide glyph blanks the other half.
        if row[x].is_empty() && x > 0 {
            row[x - 1] = " ".to_owned();
        }
        if UnicodeWidthStr::width(row[x].as_str()) == 2 && x + 1 < row.len() {
            row[x + 1] = " ".to_owned();
        }
        row[x] = glyph.to_owned();
    }

    /// Write `text` from `x`, stopping before column `limit`.
    fn put_str(&mut self, x: u16, y: u16, text: &str, limit: u16) {
        let limit = limit.min(self.width);
        let mut col = x;
        for g in text.graphemes(true) {
            let w = UnicodeWidthStr::width(g) as u16;
            if w == 0 {
                continue;
            }
            if col + w > limit {
                break;
            }
            self.put(col, y, g);
            if w == 2 {
                self.put(col + 1, y, "");
            }
            col += w;
        }
    }

    fn into_lines(self) -> Vec<String> {
        self.rows.into_iter().map(|row| row.concat()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modal::{DismissalRegistry, ModalConfig, ModalWidget};
    use modalkit_core::{KeyCode, KeyEvent, MouseEvent};

    fn open(screen: &Screen, config: ModalConfig) -> ModalWidget<Screen> {
        ModalWidget::open_in(config, screen.clone(), &DismissalRegistry::new())
    }

    #[test]
    fn box_is_centered() {
        let screen = Screen::new(40, 10);
        let modal = open(&screen, ModalConfig::new("Delete item?"));
        assert_eq!(screen.panel_rect(modal.id()), Some(Rect::new(11, 3, 18, 4)));
        assert_eq!(
            screen.close_button_rect(modal.id()),
            Some(Rect::new(18, 5, 9, 1))
        );
    }

    #[test]
    fn renders_title_and_button() {
        let screen = Screen::new(40, 10);
        open(&screen, ModalConfig::new("Delete item?"));
        let lines = screen.render_lines();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[3].trim(), "┌─ Delete item? ─┐");
        assert_eq!(lines[5].trim(), "│      [ Close ] │");
    }

    #[test]
    fn click_on_button_closes() {
        let screen = Screen::new(40, 10);
        let modal = open(&screen, ModalConfig::new("t"));
        let button = screen.close_button_rect(modal.id()).unwrap();

        assert!(!screen.handle_event(&Event::Mouse(MouseEvent::left_down(0, 0))));
        assert!(modal.is_open());

        assert!(screen.handle_event(&Event::Mouse(MouseEvent::left_down(button.x, button.y))));
        assert!(!modal.is_open());
        assert_eq!(screen.layer_count(), 0);
        assert_eq!(screen.to_text(), "");
    }

    #[test]
    fn right_click_ignored() {
        let screen = Screen::new(40, 10);
        let modal = open(&screen, ModalConfig::new("t"));
        let button = screen.close_button_rect(modal.id()).unwrap();
        let event = MouseEvent::new(
            MouseEventKind::Down(MouseButton::Right),
            button.x,
            button.y,
        );
        assert!(!screen.handle_event(&Event::Mouse(event)));
        assert!(modal.is_open());
    }

    #[test]
    fn escape_requires_opt_in() {
        let screen = Screen::new(40, 10);
        let modal = open(&screen, ModalConfig::new("t"));
        assert!(!screen.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape))));
        assert!(modal.is_open());

        let escapable = open(&screen, ModalConfig::new("u").close_on_escape(true));
        assert!(screen.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape))));
        assert!(!escapable.is_open());
        assert!(modal.is_open());
    }

    #[test]
    fn only_top_layer_receives_input() {
        let screen = Screen::new(40, 10);
        let below = open(&screen, ModalConfig::new("below"));
        let above = open(&screen, ModalConfig::new("above"));
        assert_eq!(screen.top_modal(), Some(above.id()));

        let button = screen.close_button_rect(below.id()).unwrap();
        screen.handle_event(&Event::Mouse(MouseEvent::left_down(button.x, button.y)));
        // Both panels share a button position; the top one takes the press.
        assert!(!above.is_open());
        assert!(below.is_open());
        assert_eq!(screen.layer_count(), 1);
        assert_eq!(screen.top_modal(), Some(below.id()));
    }

    #[test]
    fn long_title_is_ellipsized_on_small_screen() {
        let screen = Screen::new(20, 6);
        open(&screen, ModalConfig::new("A very long confirmation title"));
        let lines = screen.render_lines();
        let top = lines[1].as_str();
        assert!(top.starts_with("┌─ A very long"));
        assert!(top.contains('…'));
        assert!(top.ends_with('┐'));
        assert_eq!(display_width(top), 20);
    }

    #[test]
    fn wide_title_keeps_row_width() {
        let screen = Screen::new(30, 6);
        open(&screen, ModalConfig::new("確認").close_text("閉じる"));
        for line in screen.render_lines() {
            assert_eq!(display_width(&line), 30);
        }
        assert!(screen.to_text().contains("[ 閉じる ]"));
    }

    #[test]
    fn unmount_of_missing_layer_is_noop() {
        let mut screen = Screen::new(10, 4);
        screen.unmount(ScreenLayer(99));
        assert_eq!(screen.layer_count(), 0);
    }
}
