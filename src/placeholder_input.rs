use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    button::*, h_flex, input::InputEvent, input::InputState, v_flex, ActiveTheme as _, Icon,
    Sizable as _,
};
use std::ops::Range;

use crate::field_layout::{self, FieldLayout};
use crate::placeholder;
use crate::popup_geometry::{self, Rect, Size as PopupSize, TOKEN_POPUP_SIZE};
use crate::selection::{self, Selection};
use crate::text_layout::TextLayout;
use crate::token_field::{ConfirmOutcome, DismissReason, TokenField};

const CONTEXT: &str = "PlaceholderInput";

actions!(
    placeholder_input,
    [
        Backspace,
        Delete,
        Left,
        Right,
        Up,
        Down,
        SelectLeft,
        SelectRight,
        SelectUp,
        SelectDown,
        SelectAll,
        Home,
        End,
        Newline,
        Copy,
        Cut,
        Paste,
        ShowCharacterPalette,
    ]
);

pub fn init(cx: &mut App) {
    cx.bind_keys([
        KeyBinding::new("backspace", Backspace, Some(CONTEXT)),
        KeyBinding::new("delete", Delete, Some(CONTEXT)),
        KeyBinding::new("left", Left, Some(CONTEXT)),
        KeyBinding::new("right", Right, Some(CONTEXT)),
        KeyBinding::new("up", Up, Some(CONTEXT)),
        KeyBinding::new("down", Down, Some(CONTEXT)),
        KeyBinding::new("shift-left", SelectLeft, Some(CONTEXT)),
        KeyBinding::new("shift-right", SelectRight, Some(CONTEXT)),
        KeyBinding::new("shift-up", SelectUp, Some(CONTEXT)),
        KeyBinding::new("shift-down", SelectDown, Some(CONTEXT)),
        KeyBinding::new("home", Home, Some(CONTEXT)),
        KeyBinding::new("end", End, Some(CONTEXT)),
        KeyBinding::new("enter", Newline, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-a", SelectAll, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-a", SelectAll, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-c", Copy, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-c", Copy, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-x", Cut, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-x", Cut, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-v", Paste, Some(CONTEXT)),
        #[cfg(not(target_os = "macos"))]
        KeyBinding::new("ctrl-v", Paste, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-left", Home, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("cmd-right", End, Some(CONTEXT)),
        #[cfg(target_os = "macos")]
        KeyBinding::new("ctrl-cmd-space", ShowCharacterPalette, Some(CONTEXT)),
    ]);
}

/// Emitted once per user-visible edit with the complete new text
#[derive(Clone)]
pub struct TextChanged {
    pub text: String,
}

const FIELD_PADDING_X: Pixels = px(12.);
const FIELD_PADDING_Y: Pixels = px(6.);
const LINE_HEIGHT: Pixels = px(20.);
const CARET_WIDTH: Pixels = px(2.);

/// Text field that renders `{{name}}` placeholders as clickable chips.
///
/// The field owns its editing surface. The text is shaped once per frame and each
/// placeholder is a styled run of that same layout, so chips wrap and scroll with the
/// text around them. Clicking a chip opens a small editor that replaces that one
/// placeholder.
pub struct PlaceholderInput {
    field: TokenField,
    layout: FieldLayout,
    focus_handle: FocusHandle,
    placeholder: SharedString,
    selection: Selection,
    marked_range: Option<Range<usize>>,
    is_selecting: bool,
    /// Content offset scrolled out of view.
    scroll: Point<Pixels>,
    /// Scroll the caret into view on the next paint.
    reveal_caret: bool,
    last_layout: Option<TextLayout>,
    last_bounds: Option<Bounds<Pixels>>,
    popup_input: Entity<InputState>,
    icon: Option<SharedString>,
    error: Option<SharedString>,
    _subscriptions: Vec<Subscription>,
}

impl PlaceholderInput {
    pub fn new(layout: FieldLayout, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let popup_input = cx.new(|cx| InputState::new(window, cx));
        let popup_sub = cx.subscribe_in(
            &popup_input,
            window,
            |this, _, event: &InputEvent, window, cx| {
                this.on_popup_input(event, window, cx);
            },
        );

        Self {
            field: TokenField::default(),
            layout,
            focus_handle: cx.focus_handle(),
            placeholder: SharedString::default(),
            selection: Selection::default(),
            marked_range: None,
            is_selecting: false,
            scroll: Point::default(),
            reveal_caret: false,
            last_layout: None,
            last_bounds: None,
            popup_input,
            icon: None,
            error: None,
            _subscriptions: vec![popup_sub],
        }
    }

    pub fn single_line(window: &mut Window, cx: &mut Context<Self>) -> Self {
        Self::new(FieldLayout::SingleLine, window, cx)
    }

    pub fn multi_line(rows: usize, window: &mut Window, cx: &mut Context<Self>) -> Self {
        Self::new(FieldLayout::multi_line(rows), window, cx)
    }

    pub fn placeholder(
        mut self,
        placeholder: impl Into<SharedString>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Asset path of an icon shown at the start of the field
    pub fn icon(mut self, path: impl Into<SharedString>) -> Self {
        self.icon = Some(path.into());
        self
    }

    pub fn value(&self) -> &str {
        self.field.text()
    }

    /// Replace the text from the field's owner. Does not emit `TextChanged`.
    pub fn set_value(&mut self, text: &str, _window: &mut Window, cx: &mut Context<Self>) {
        self.field.set_text(text);
        self.marked_range = None;
        self.selection.move_to(text.len());
        self.scroll = Point::default();
        self.reveal_caret = true;
        cx.notify();
    }

    pub fn set_error(&mut self, error: Option<impl Into<SharedString>>, cx: &mut Context<Self>) {
        self.error = error.map(Into::into);
        cx.notify();
    }

    /// Write an edit made on the surface into the buffer and report it.
    fn commit(&mut self, text: String, cx: &mut Context<Self>) {
        if let Some(text) = self.field.apply_input(&text) {
            cx.emit(TextChanged { text });
        }
        self.reveal_caret = true;
        cx.notify();
    }

    fn replace_selection(&mut self, new_text: &str, cx: &mut Context<Self>) {
        let range = self
            .marked_range
            .take()
            .unwrap_or_else(|| self.selection.range.clone());
        let (text, caret) = selection::replace_range(self.field.text(), &range, new_text);
        self.selection.move_to(caret);
        self.commit(text, cx);
    }

    fn move_to(&mut self, offset: usize, cx: &mut Context<Self>) {
        self.selection.move_to(offset);
        self.reveal_caret = true;
        cx.notify();
    }

    fn select_to(&mut self, offset: usize, cx: &mut Context<Self>) {
        self.selection.select_to(offset);
        self.reveal_caret = true;
        cx.notify();
    }

    /// Start and end of the hard line holding the caret.
    fn line_bounds(&self) -> (usize, usize) {
        let text = self.field.text();
        let starts = field_layout::line_starts(text);
        let ix = field_layout::line_for_offset(&starts, self.selection.head());
        let end = starts
            .get(ix + 1)
            .map(|next| next - 1)
            .unwrap_or(text.len());
        (starts[ix], end)
    }

    /// Caret slot one visual row above (`-1`) or below (`1`) the caret.
    fn vertical_offset(&self, direction: f32) -> Option<usize> {
        let layout = self.last_layout.as_ref()?;
        let caret = layout.position_for_index(self.selection.head());
        let line_height = layout.line_height();
        let target = point(
            caret.x,
            caret.y + line_height / 2. + line_height * direction,
        );
        Some(layout.caret_for_position(target))
    }

    fn backspace(&mut self, _: &Backspace, _: &mut Window, cx: &mut Context<Self>) {
        if self.selection.is_empty() {
            let previous = selection::previous_boundary(self.field.text(), self.selection.head());
            self.selection.select_to(previous);
        }
        self.replace_selection("", cx);
    }

    fn delete(&mut self, _: &Delete, _: &mut Window, cx: &mut Context<Self>) {
        if self.selection.is_empty() {
            let next = selection::next_boundary(self.field.text(), self.selection.head());
            self.selection.select_to(next);
        }
        self.replace_selection("", cx);
    }

    fn left(&mut self, _: &Left, _: &mut Window, cx: &mut Context<Self>) {
        if self.selection.is_empty() {
            let previous = selection::previous_boundary(self.field.text(), self.selection.head());
            self.move_to(previous, cx);
        } else {
            self.move_to(self.selection.range.start, cx);
        }
    }

    fn right(&mut self, _: &Right, _: &mut Window, cx: &mut Context<Self>) {
        if self.selection.is_empty() {
            let next = selection::next_boundary(self.field.text(), self.selection.head());
            self.move_to(next, cx);
        } else {
            self.move_to(self.selection.range.end, cx);
        }
    }

    fn select_left(&mut self, _: &SelectLeft, _: &mut Window, cx: &mut Context<Self>) {
        let previous = selection::previous_boundary(self.field.text(), self.selection.head());
        self.select_to(previous, cx);
    }

    fn select_right(&mut self, _: &SelectRight, _: &mut Window, cx: &mut Context<Self>) {
        let next = selection::next_boundary(self.field.text(), self.selection.head());
        self.select_to(next, cx);
    }

    fn up(&mut self, _: &Up, _: &mut Window, cx: &mut Context<Self>) {
        match self.vertical_offset(-1.).filter(|_| self.layout.is_multi_line()) {
            Some(offset) => self.move_to(offset, cx),
            None => cx.propagate(),
        }
    }

    fn down(&mut self, _: &Down, _: &mut Window, cx: &mut Context<Self>) {
        match self.vertical_offset(1.).filter(|_| self.layout.is_multi_line()) {
            Some(offset) => self.move_to(offset, cx),
            None => cx.propagate(),
        }
    }

    fn select_up(&mut self, _: &SelectUp, _: &mut Window, cx: &mut Context<Self>) {
        match self.vertical_offset(-1.).filter(|_| self.layout.is_multi_line()) {
            Some(offset) => self.select_to(offset, cx),
            None => cx.propagate(),
        }
    }

    fn select_down(&mut self, _: &SelectDown, _: &mut Window, cx: &mut Context<Self>) {
        match self.vertical_offset(1.).filter(|_| self.layout.is_multi_line()) {
            Some(offset) => self.select_to(offset, cx),
            None => cx.propagate(),
        }
    }

    fn select_all(&mut self, _: &SelectAll, _: &mut Window, cx: &mut Context<Self>) {
        self.selection.select_all(self.field.text());
        cx.notify();
    }

    fn home(&mut self, _: &Home, _: &mut Window, cx: &mut Context<Self>) {
        let (start, _) = self.line_bounds();
        self.move_to(start, cx);
    }

    fn end(&mut self, _: &End, _: &mut Window, cx: &mut Context<Self>) {
        let (_, end) = self.line_bounds();
        self.move_to(end, cx);
    }

    fn newline(&mut self, _: &Newline, _: &mut Window, cx: &mut Context<Self>) {
        if self.layout.is_multi_line() {
            self.replace_selection("\n", cx);
        } else {
            cx.propagate();
        }
    }

    fn copy(&mut self, _: &Copy, _: &mut Window, cx: &mut Context<Self>) {
        if !self.selection.is_empty() {
            let text = self.field.text()[self.selection.range.clone()].to_string();
            cx.write_to_clipboard(ClipboardItem::new_string(text));
        }
    }

    fn cut(&mut self, _: &Cut, _: &mut Window, cx: &mut Context<Self>) {
        if !self.selection.is_empty() {
            let text = self.field.text()[self.selection.range.clone()].to_string();
            cx.write_to_clipboard(ClipboardItem::new_string(text));
            self.replace_selection("", cx);
        }
    }

    fn paste(&mut self, _: &Paste, _: &mut Window, cx: &mut Context<Self>) {
        if let Some(text) = cx.read_from_clipboard().and_then(|item| item.text()) {
            let text = self.sanitize(&text);
            self.replace_selection(&text, cx);
        }
    }

    fn show_character_palette(
        &mut self,
        _: &ShowCharacterPalette,
        window: &mut Window,
        _: &mut Context<Self>,
    ) {
        window.show_character_palette();
    }

    /// Single-line fields never hold a line break.
    fn sanitize(&self, text: &str) -> String {
        if self.layout.is_multi_line() {
            text.to_string()
        } else {
            text.replace(['\r', '\n'], " ")
        }
    }

    /// Window position mapped into unscrolled text coordinates.
    fn text_position(&self, position: Point<Pixels>) -> Option<Point<Pixels>> {
        let bounds = self.last_bounds?;
        Some(position - bounds.origin + self.scroll)
    }

    fn caret_for_mouse(&self, position: Point<Pixels>) -> usize {
        match (self.text_position(position), self.last_layout.as_ref()) {
            (Some(position), Some(layout)) if !self.field.text().is_empty() => {
                layout.caret_for_position(position)
            }
            _ => 0,
        }
    }

    /// Match index of the placeholder drawn under `position`, if any.
    fn token_under_mouse(&self, position: Point<Pixels>) -> Option<usize> {
        let position = self.text_position(position)?;
        let layout = self.last_layout.as_ref()?;
        let index = layout.index_for_position(position, false).ok()?;
        placeholder::match_at(&self.field.matches(), index)
    }

    fn on_mouse_down(&mut self, event: &MouseDownEvent, window: &mut Window, cx: &mut Context<Self>) {
        if !event.modifiers.shift {
            if let Some(match_index) = self.token_under_mouse(event.position) {
                cx.stop_propagation();
                self.open_token_editor(match_index, event.position, window, cx);
                return;
            }
        }

        window.focus(&self.focus_handle);
        self.is_selecting = true;
        let offset = self.caret_for_mouse(event.position);
        if event.modifiers.shift {
            self.select_to(offset, cx);
        } else {
            self.move_to(offset, cx);
        }
    }

    fn on_mouse_up(&mut self, _: &MouseUpEvent, _: &mut Window, _: &mut Context<Self>) {
        self.is_selecting = false;
    }

    fn on_mouse_move(&mut self, event: &MouseMoveEvent, _: &mut Window, cx: &mut Context<Self>) {
        if self.is_selecting {
            let offset = self.caret_for_mouse(event.position);
            self.select_to(offset, cx);
        }
    }

    fn on_scroll_wheel(&mut self, event: &ScrollWheelEvent, _: &mut Window, cx: &mut Context<Self>) {
        let (Some(layout), Some(bounds)) = (self.last_layout.as_ref(), self.last_bounds) else {
            return;
        };
        let delta = event.delta.pixel_delta(layout.line_height());
        let previous = self.scroll;

        if self.layout.wraps() {
            self.scroll.y = px(field_layout::clamp_scroll(
                f32::from(self.scroll.y - delta.y),
                f32::from(layout.height()),
                f32::from(bounds.size.height),
            ));
        } else {
            let delta_x = if delta.x == px(0.) { delta.y } else { delta.x };
            self.scroll.x = px(field_layout::clamp_scroll(
                f32::from(self.scroll.x - delta_x),
                f32::from(layout.width() + CARET_WIDTH),
                f32::from(bounds.size.width),
            ));
        }

        if self.scroll != previous {
            cx.stop_propagation();
            cx.notify();
        }
    }

    /// Window rectangle of the first row of the clicked placeholder.
    fn chip_rect(&self, match_index: usize) -> Option<Rect> {
        let token = self.field.matches().into_iter().nth(match_index)?;
        let layout = self.last_layout.as_ref()?;
        let bounds = self.last_bounds?;
        let start = layout.position_for_index(token.start);
        let end = layout.position_for_index(token.end);
        let origin = bounds.origin - self.scroll;

        let (left, top, right, bottom) = field_layout::selection_rects(
            (f32::from(start.x), f32::from(start.y)),
            (f32::from(end.x), f32::from(end.y)),
            f32::from(layout.line_height()),
            f32::from(bounds.size.width),
        )
        .into_iter()
        .next()?;

        Some(Rect::new(
            f32::from(origin.x) + left,
            f32::from(origin.y) + top,
            right - left,
            bottom - top,
        ))
    }

    fn open_token_editor(
        &mut self,
        match_index: usize,
        position: Point<Pixels>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let anchor = self.chip_rect(match_index).unwrap_or_else(|| {
            Rect::new(
                f32::from(position.x),
                f32::from(position.y),
                0.,
                f32::from(LINE_HEIGHT),
            )
        });
        let viewport = window.viewport_size();
        let origin = popup_geometry::popup_origin(
            anchor,
            TOKEN_POPUP_SIZE,
            PopupSize {
                width: f32::from(viewport.width),
                height: f32::from(viewport.height),
            },
        );

        let Some(token_name) = self
            .field
            .open_popup(match_index, origin)
            .map(|popup| popup.token_name.clone())
        else {
            return;
        };

        self.popup_input.update(cx, |input, cx| {
            input.set_value(&token_name, window, cx);
            input.focus(window, cx);
        });
        cx.notify();
    }

    /// Select the prefilled name once the popup input is part of a rendered frame.
    fn select_popup_text(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.field.popup().is_none() {
            return;
        }
        self.popup_input.update(cx, |input, cx| {
            input.focus(window, cx);
        });
        window.dispatch_action(Box::new(gpui_component::input::SelectAll), cx);
    }

    fn on_popup_input(&mut self, event: &InputEvent, window: &mut Window, cx: &mut Context<Self>) {
        match event {
            InputEvent::Change => {
                let value = self.popup_input.read(cx).value().to_string();
                self.field.set_edit_value(value);
            }
            InputEvent::PressEnter { .. } => self.confirm_token_edit(window, cx),
            _ => {}
        }
    }

    fn confirm_token_edit(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        match self.field.confirm() {
            ConfirmOutcome::Applied(text) => {
                self.selection.clamp_to(&text);
                self.reveal_caret = true;
                cx.emit(TextChanged { text });
            }
            ConfirmOutcome::Stale | ConfirmOutcome::Closed => {}
        }
        window.focus(&self.focus_handle);
        cx.notify();
    }

    fn dismiss_token_editor(
        &mut self,
        reason: DismissReason,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if self.field.dismiss(reason) {
            if reason != DismissReason::OutsideClick {
                window.focus(&self.focus_handle);
            }
            cx.notify();
        }
    }

    fn render_popup(&self, cx: &Context<Self>) -> Option<impl IntoElement> {
        let popup = self.field.popup()?;
        let theme = cx.theme();
        let label = format!("{{{{{}}}}}", popup.token_name);

        Some(
            deferred(
                anchored()
                    .position(point(px(popup.anchor.x), px(popup.anchor.y)))
                    .child(
                        v_flex()
                            .id("token-editor-popup")
                            .w(px(TOKEN_POPUP_SIZE.width))
                            .gap_3()
                            .p_4()
                            .bg(theme.background)
                            .border_1()
                            .border_color(theme.border)
                            .rounded(theme.radius)
                            .shadow_lg()
                            .occlude()
                            .on_mouse_down_out(cx.listener(
                                |this, _event: &MouseDownEvent, window, cx| {
                                    this.dismiss_token_editor(
                                        DismissReason::OutsideClick,
                                        window,
                                        cx,
                                    );
                                },
                            ))
                            .on_key_down(cx.listener(
                                |this, event: &KeyDownEvent, window, cx| {
                                    if event.keystroke.key == "escape" {
                                        cx.stop_propagation();
                                        this.dismiss_token_editor(DismissReason::Escape, window, cx);
                                    }
                                },
                            ))
                            .child(
                                h_flex()
                                    .gap_1()
                                    .text_sm()
                                    .text_color(theme.muted_foreground)
                                    .child("Edit placeholder:")
                                    .child(
                                        div()
                                            .font_weight(FontWeight::SEMIBOLD)
                                            .text_color(theme.foreground)
                                            .child(label),
                                    ),
                            )
                            .child(gpui_component::input::Input::new(&self.popup_input))
                            .child(
                                h_flex()
                                    .gap_2()
                                    .child(
                                        Button::new("token-editor-save")
                                            .primary()
                                            .small()
                                            .label("Save")
                                            .on_click(cx.listener(
                                                |this, _event: &ClickEvent, window, cx| {
                                                    this.confirm_token_edit(window, cx);
                                                },
                                            )),
                                    )
                                    .child(
                                        Button::new("token-editor-cancel")
                                            .ghost()
                                            .small()
                                            .label("Cancel")
                                            .on_click(cx.listener(
                                                |this, _event: &ClickEvent, window, cx| {
                                                    this.dismiss_token_editor(
                                                        DismissReason::Cancel,
                                                        window,
                                                        cx,
                                                    );
                                                },
                                            )),
                                    ),
                            ),
                    ),
            )
            .with_priority(1),
        )
    }
}

impl EventEmitter<TextChanged> for PlaceholderInput {}

impl Focusable for PlaceholderInput {
    fn focus_handle(&self, _: &App) -> FocusHandle {
        self.focus_handle.clone()
    }
}

impl EntityInputHandler for PlaceholderInput {
    fn text_for_range(
        &mut self,
        range_utf16: Range<usize>,
        actual_range: &mut Option<Range<usize>>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<String> {
        let text = self.field.text();
        let range = selection::range_from_utf16(text, &range_utf16);
        actual_range.replace(selection::range_to_utf16(text, &range));
        Some(text[range].to_string())
    }

    fn selected_text_range(
        &mut self,
        _ignore_disabled_input: bool,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<UTF16Selection> {
        Some(UTF16Selection {
            range: selection::range_to_utf16(self.field.text(), &self.selection.range),
            reversed: self.selection.reversed,
        })
    }

    fn marked_text_range(
        &self,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Range<usize>> {
        self.marked_range
            .as_ref()
            .map(|range| selection::range_to_utf16(self.field.text(), range))
    }

    fn unmark_text(&mut self, _window: &mut Window, _cx: &mut Context<Self>) {
        self.marked_range = None;
    }

    fn replace_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if let Some(range_utf16) = range_utf16 {
            self.marked_range = Some(selection::range_from_utf16(self.field.text(), &range_utf16));
        }
        let new_text = self.sanitize(new_text);
        self.replace_selection(&new_text, cx);
    }

    fn replace_and_mark_text_in_range(
        &mut self,
        range_utf16: Option<Range<usize>>,
        new_text: &str,
        new_selected_range_utf16: Option<Range<usize>>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let text = self.field.text();
        let range = range_utf16
            .as_ref()
            .map(|range_utf16| selection::range_from_utf16(text, range_utf16))
            .or(self.marked_range.clone())
            .unwrap_or_else(|| self.selection.range.clone());
        let new_text = self.sanitize(new_text);
        let (text, caret) = selection::replace_range(text, &range, &new_text);

        self.marked_range = (!new_text.is_empty()).then(|| range.start..range.start + new_text.len());
        self.selection = match new_selected_range_utf16 {
            Some(selected) => {
                let selected = selection::range_from_utf16(&new_text, &selected);
                Selection {
                    range: range.start + selected.start..range.start + selected.end,
                    reversed: false,
                }
            }
            None => Selection::caret(caret),
        };
        self.commit(text, cx);
    }

    fn bounds_for_range(
        &mut self,
        range_utf16: Range<usize>,
        bounds: Bounds<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<Bounds<Pixels>> {
        let layout = self.last_layout.as_ref()?;
        let range = selection::range_from_utf16(self.field.text(), &range_utf16);
        let origin = bounds.origin - self.scroll;
        let start = layout.position_for_index(range.start);
        let end = layout.position_for_index(range.end);
        let width = if end.y == start.y {
            end.x - start.x
        } else {
            px(0.)
        };
        Some(Bounds::new(
            origin + start,
            size(width, layout.line_height()),
        ))
    }

    fn character_index_for_point(
        &mut self,
        point: Point<Pixels>,
        _window: &mut Window,
        _cx: &mut Context<Self>,
    ) -> Option<usize> {
        let position = self.text_position(point)?;
        let index = self
            .last_layout
            .as_ref()?
            .index_for_position(position, false)
            .ok()?;
        Some(selection::offset_to_utf16(self.field.text(), index))
    }
}

/// The shaped text of a [`PlaceholderInput`], painted with its chips, selection and caret.
struct FieldText {
    input: Entity<PlaceholderInput>,
}

struct FieldPrepaint {
    layout: TextLayout,
    scroll: Point<Pixels>,
    selections: Vec<PaintQuad>,
    caret: Option<PaintQuad>,
}

impl IntoElement for FieldText {
    type Element = Self;

    fn into_element(self) -> Self::Element {
        self
    }
}

impl Element for FieldText {
    type RequestLayoutState = ();
    type PrepaintState = FieldPrepaint;

    fn id(&self) -> Option<ElementId> {
        None
    }

    fn source_location(&self) -> Option<&'static core::panic::Location<'static>> {
        None
    }

    fn request_layout(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        window: &mut Window,
        cx: &mut App,
    ) -> (LayoutId, Self::RequestLayoutState) {
        let rows = self.input.read(cx).layout.rows();
        let mut style = Style::default();
        style.size.width = relative(1.).into();
        style.size.height = (window.line_height() * rows).into();
        (window.request_layout(style, [], cx), ())
    }

    fn prepaint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        window: &mut Window,
        cx: &mut App,
    ) -> Self::PrepaintState {
        let input = self.input.read(cx);
        let theme = cx.theme();
        let style = window.text_style();
        let font_size = style.font_size.to_pixels(window.rem_size());
        let line_height = window.line_height();
        let text = input.field.text();

        let literal = TextRun {
            len: 0,
            font: style.font(),
            color: style.color,
            background_color: None,
            underline: None,
            strikethrough: None,
        };
        let (display_text, runs) = if text.is_empty() {
            let run = TextRun {
                len: input.placeholder.len(),
                color: theme.muted_foreground,
                ..literal
            };
            (input.placeholder.clone(), vec![run])
        } else {
            let chip = TextRun {
                font: Font {
                    weight: FontWeight::MEDIUM,
                    ..style.font()
                },
                background_color: Some(theme.list_active),
                ..literal.clone()
            };
            let matches = input.field.matches();
            let spans = field_layout::styled_spans(&input.field.segments(&matches));
            let mut runs = field_layout::text_runs(&spans, &literal, &chip);
            if let Some(marked) = input.marked_range.as_ref() {
                runs = field_layout::underline_marked(runs, marked, style.color);
            }
            (SharedString::from(text.to_string()), runs)
        };

        let wrap_width = input.layout.wraps().then_some(bounds.size.width);
        let lines = match window
            .text_system()
            .shape_text(display_text, font_size, &runs, wrap_width, None)
        {
            Ok(lines) => lines.into_iter().collect(),
            Err(e) => {
                log::error!("Failed to shape field text: {:#}", e);
                Vec::new()
            }
        };
        let layout = TextLayout::new(lines, line_height);

        let head = if text.is_empty() { 0 } else { input.selection.head() };
        let caret = layout.position_for_index(head);
        let mut scroll = input.scroll;
        if input.layout.wraps() {
            let mut y = f32::from(scroll.y);
            if input.reveal_caret {
                y = field_layout::reveal_offset(
                    y,
                    f32::from(caret.y),
                    f32::from(caret.y + line_height),
                    f32::from(bounds.size.height),
                );
            }
            scroll = point(
                px(0.),
                px(field_layout::clamp_scroll(
                    y,
                    f32::from(layout.height()),
                    f32::from(bounds.size.height),
                )),
            );
        } else {
            let mut x = f32::from(scroll.x);
            if input.reveal_caret {
                x = field_layout::reveal_offset(
                    x,
                    f32::from(caret.x),
                    f32::from(caret.x + CARET_WIDTH),
                    f32::from(bounds.size.width),
                );
            }
            scroll = point(
                px(field_layout::clamp_scroll(
                    x,
                    f32::from(layout.width() + CARET_WIDTH),
                    f32::from(bounds.size.width),
                )),
                px(0.),
            );
        }

        let origin = bounds.origin - scroll;
        let selections = if text.is_empty() || input.selection.is_empty() {
            Vec::new()
        } else {
            let start = layout.position_for_index(input.selection.range.start);
            let end = layout.position_for_index(input.selection.range.end);
            field_layout::selection_rects(
                (f32::from(start.x), f32::from(start.y)),
                (f32::from(end.x), f32::from(end.y)),
                f32::from(line_height),
                f32::from(bounds.size.width),
            )
            .into_iter()
            .map(|(left, top, right, bottom)| {
                fill(
                    Bounds::from_corners(
                        origin + point(px(left), px(top)),
                        origin + point(px(right), px(bottom)),
                    ),
                    theme.selection,
                )
            })
            .collect()
        };
        let caret = input.selection.is_empty().then(|| {
            fill(
                Bounds::new(origin + caret, size(CARET_WIDTH, line_height)),
                theme.caret,
            )
        });

        FieldPrepaint {
            layout,
            scroll,
            selections,
            caret,
        }
    }

    fn paint(
        &mut self,
        _id: Option<&GlobalElementId>,
        _inspector_id: Option<&InspectorElementId>,
        bounds: Bounds<Pixels>,
        _request_layout: &mut Self::RequestLayoutState,
        prepaint: &mut Self::PrepaintState,
        window: &mut Window,
        cx: &mut App,
    ) {
        let focus_handle = self.input.read(cx).focus_handle.clone();
        window.handle_input(
            &focus_handle,
            ElementInputHandler::new(bounds, self.input.clone()),
            cx,
        );

        let origin = bounds.origin - prepaint.scroll;
        let line_height = prepaint.layout.line_height();
        window.with_content_mask(Some(ContentMask { bounds }), |window| {
            for selection in prepaint.selections.drain(..) {
                window.paint_quad(selection);
            }
            for (line, top) in prepaint.layout.lines() {
                let line_origin = point(origin.x, origin.y + top);
                let painted = line
                    .paint_background(line_origin, line_height, TextAlign::Left, None, window, cx)
                    .and_then(|_| {
                        line.paint(line_origin, line_height, TextAlign::Left, None, window, cx)
                    });
                if let Err(e) = painted {
                    log::error!("Failed to paint field text: {:#}", e);
                }
            }
            if focus_handle.is_focused(window) {
                if let Some(caret) = prepaint.caret.take() {
                    window.paint_quad(caret);
                }
            }
        });

        let layout = std::mem::take(&mut prepaint.layout);
        let scroll = prepaint.scroll;
        self.input.update(cx, |input, _cx| {
            input.last_layout = Some(layout);
            input.last_bounds = Some(bounds);
            input.scroll = scroll;
            input.reveal_caret = false;
        });
    }
}

impl Render for PlaceholderInput {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if self.field.take_select_request() {
            cx.on_next_frame(window, |this, window, cx| this.select_popup_text(window, cx));
        }

        let multi_line = self.layout.is_multi_line();
        let focused = self.focus_handle.is_focused(window);
        let error = self.error.clone();
        let icon = self.icon.clone();
        let popup = self.render_popup(cx);
        let theme = cx.theme();

        v_flex()
            .w_full()
            .gap_1()
            .child(
                h_flex()
                    .key_context(CONTEXT)
                    .track_focus(&self.focus_handle)
                    .cursor(CursorStyle::IBeam)
                    .on_action(cx.listener(Self::backspace))
                    .on_action(cx.listener(Self::delete))
                    .on_action(cx.listener(Self::left))
                    .on_action(cx.listener(Self::right))
                    .on_action(cx.listener(Self::up))
                    .on_action(cx.listener(Self::down))
                    .on_action(cx.listener(Self::select_left))
                    .on_action(cx.listener(Self::select_right))
                    .on_action(cx.listener(Self::select_up))
                    .on_action(cx.listener(Self::select_down))
                    .on_action(cx.listener(Self::select_all))
                    .on_action(cx.listener(Self::home))
                    .on_action(cx.listener(Self::end))
                    .on_action(cx.listener(Self::newline))
                    .on_action(cx.listener(Self::copy))
                    .on_action(cx.listener(Self::cut))
                    .on_action(cx.listener(Self::paste))
                    .on_action(cx.listener(Self::show_character_palette))
                    .on_mouse_down(MouseButton::Left, cx.listener(Self::on_mouse_down))
                    .on_mouse_up(MouseButton::Left, cx.listener(Self::on_mouse_up))
                    .on_mouse_up_out(MouseButton::Left, cx.listener(Self::on_mouse_up))
                    .on_mouse_move(cx.listener(Self::on_mouse_move))
                    .on_scroll_wheel(cx.listener(Self::on_scroll_wheel))
                    .w_full()
                    .gap_2()
                    .px(FIELD_PADDING_X)
                    .py(FIELD_PADDING_Y)
                    .when(multi_line, |this| this.items_start())
                    .bg(theme.background)
                    .border_1()
                    .border_color(if focused { theme.ring } else { theme.input })
                    .rounded(theme.radius)
                    .text_sm()
                    .line_height(LINE_HEIGHT)
                    .text_color(theme.foreground)
                    .when_some(icon, |this, path| {
                        this.child(Icon::default().path(path).small())
                    })
                    .child(
                        div()
                            .flex_1()
                            .min_w_0()
                            .child(FieldText { input: cx.entity() }),
                    ),
            )
            .when_some(error, |this, error| {
                this.child(div().text_sm().text_color(theme.danger).child(error))
            })
            .children(popup)
    }
}
