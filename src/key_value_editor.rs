use gpui::*;
use gpui_component::{button::*, h_flex, v_flex, Sizable as _};

use crate::placeholder_input::{PlaceholderInput, TextChanged};
use crate::types::KeyValuePair;

/// Emitted whenever a row is edited, added or removed
#[derive(Clone)]
pub struct PairsChanged {
    pub pairs: Vec<KeyValuePair>,
}

/// Key and value fields of one row
struct PairRow {
    key_input: Entity<PlaceholderInput>,
    value_input: Entity<PlaceholderInput>,
    _subscriptions: [Subscription; 2],
}

/// Editable list of key/value rows used for headers and query parameters.
///
/// Both columns are placeholder-aware, so `{{token}}` values render as chips.
pub struct KeyValueEditor {
    id: SharedString,
    add_label: SharedString,
    key_placeholder: SharedString,
    value_placeholder: SharedString,
    rows: Vec<PairRow>,
    scroll_handle: ScrollHandle,
}

impl KeyValueEditor {
    pub fn new(
        id: impl Into<SharedString>,
        add_label: impl Into<SharedString>,
        key_placeholder: impl Into<SharedString>,
        value_placeholder: impl Into<SharedString>,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let mut editor = Self {
            id: id.into(),
            add_label: add_label.into(),
            key_placeholder: key_placeholder.into(),
            value_placeholder: value_placeholder.into(),
            rows: vec![],
            scroll_handle: ScrollHandle::new(),
        };
        editor.push_row(&KeyValuePair::default(), window, cx);
        editor
    }

    /// Non-blank rows in display order
    pub fn pairs(&self, cx: &App) -> Vec<KeyValuePair> {
        collect_pairs(self.rows.iter().map(|row| {
            KeyValuePair::new(
                row.key_input.read(cx).value(),
                row.value_input.read(cx).value(),
            )
        }))
    }

    /// Replace all rows. Does not emit `PairsChanged`.
    pub fn set_pairs(&mut self, pairs: &[KeyValuePair], window: &mut Window, cx: &mut Context<Self>) {
        self.rows.clear();
        for pair in pairs {
            self.push_row(pair, window, cx);
        }
        if self.rows.is_empty() {
            self.push_row(&KeyValuePair::default(), window, cx);
        }
        cx.notify();
    }

    fn push_row(&mut self, pair: &KeyValuePair, window: &mut Window, cx: &mut Context<Self>) {
        let key_placeholder = self.key_placeholder.clone();
        let value_placeholder = self.value_placeholder.clone();

        let key_input = cx.new(|cx| {
            let mut input =
                PlaceholderInput::single_line(window, cx).placeholder(key_placeholder, window, cx);
            input.set_value(&pair.key, window, cx);
            input
        });
        let value_input = cx.new(|cx| {
            let mut input =
                PlaceholderInput::single_line(window, cx).placeholder(value_placeholder, window, cx);
            input.set_value(&pair.value, window, cx);
            input
        });

        let key_sub = cx.subscribe_in(&key_input, window, |this, _, _: &TextChanged, _window, cx| {
            this.emit_changed(cx);
        });
        let value_sub = cx.subscribe_in(&value_input, window, |this, _, _: &TextChanged, _window, cx| {
            this.emit_changed(cx);
        });

        self.rows.push(PairRow {
            key_input,
            value_input,
            _subscriptions: [key_sub, value_sub],
        });
    }

    fn add_row(&mut self, _event: &ClickEvent, window: &mut Window, cx: &mut Context<Self>) {
        self.push_row(&KeyValuePair::default(), window, cx);

        // Scroll once the new row has been laid out
        let scroll_handle = self.scroll_handle.clone();
        cx.spawn_in(window, async move |_this, cx| {
            cx.background_executor()
                .timer(std::time::Duration::from_millis(16))
                .await;
            let _ = cx.update(|_, _cx| {
                let max_offset = scroll_handle.max_offset();
                scroll_handle.set_offset(point(px(0.), -max_offset.height));
            });
        })
        .detach();

        cx.notify();
    }

    fn remove_row(&mut self, index: usize, window: &mut Window, cx: &mut Context<Self>) {
        if index >= self.rows.len() {
            return;
        }
        self.rows.remove(index);

        // Keep one empty row to type into
        if self.rows.is_empty() {
            self.push_row(&KeyValuePair::default(), window, cx);
        }

        self.emit_changed(cx);
    }

    fn emit_changed(&mut self, cx: &mut Context<Self>) {
        let pairs = self.pairs(cx);
        cx.emit(PairsChanged { pairs });
        cx.notify();
    }
}

/// Drop rows where both key and value are blank
fn collect_pairs(rows: impl IntoIterator<Item = KeyValuePair>) -> Vec<KeyValuePair> {
    rows.into_iter().filter(|pair| !pair.is_blank()).collect()
}

impl EventEmitter<PairsChanged> for KeyValueEditor {}

impl Render for KeyValueEditor {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        v_flex()
            .id(self.id.clone())
            .gap_2()
            .p_2()
            .pb_4()
            .flex_1()
            .track_scroll(&self.scroll_handle)
            .overflow_scroll()
            .children(self.rows.iter().enumerate().map(|(index, row)| {
                h_flex()
                    .gap_2()
                    .items_start()
                    .w_full()
                    .child(div().flex_1().min_w_0().child(row.key_input.clone()))
                    .child(div().flex_1().min_w_0().child(row.value_input.clone()))
                    .child(
                        div().flex_shrink_0().pt_1().child(
                            Button::new(("remove-row", index))
                                .ghost()
                                .xsmall()
                                .label("×")
                                .on_click(cx.listener(move |this, _, window, cx| {
                                    this.remove_row(index, window, cx);
                                })),
                        ),
                    )
            }))
            .child(
                h_flex().child(
                    Button::new("add-row")
                        .ghost()
                        .small()
                        .label(format!("+ {}", self.add_label))
                        .on_click(cx.listener(Self::add_row)),
                ),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::prelude::v1::test;

    #[test]
    fn test_blank_rows_are_dropped() {
        let pairs = collect_pairs(vec![
            KeyValuePair::new("Authorization", "Bearer {{token}}"),
            KeyValuePair::new("  ", ""),
            KeyValuePair::new("", "{{orphan}}"),
        ]);
        assert_eq!(
            pairs,
            vec![
                KeyValuePair::new("Authorization", "Bearer {{token}}"),
                KeyValuePair::new("", "{{orphan}}"),
            ]
        );
    }

    #[test]
    fn test_row_order_is_kept() {
        let pairs = collect_pairs(vec![KeyValuePair::new("b", "2"), KeyValuePair::new("a", "1")]);
        assert_eq!(pairs[0].key, "b");
        assert_eq!(pairs[1].key, "a");
    }
}
