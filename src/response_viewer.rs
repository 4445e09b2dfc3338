use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{button::*, h_flex, input::*, v_flex, ActiveTheme as _};

use crate::types::ResponseData;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseTab {
    Body,
    Headers,
}

/// Read-only view of the last response
pub struct ResponseViewer {
    response: Option<ResponseData>,
    body_view: Entity<InputState>,
    active_tab: ResponseTab,
    headers_scroll_handle: ScrollHandle,
}

impl ResponseViewer {
    pub fn new(window: &mut Window, cx: &mut Context<Self>) -> Self {
        let body_view = cx.new(|cx| {
            InputState::new(window, cx)
                .code_editor("json")
                .line_number(true)
                .multi_line()
        });

        Self {
            response: None,
            body_view,
            active_tab: ResponseTab::Body,
            headers_scroll_handle: ScrollHandle::new(),
        }
    }

    pub fn set_response(
        &mut self,
        response: ResponseData,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let body = display_body(&response.body);
        self.body_view.update(cx, |input, cx| {
            input.set_value(&body, window, cx);
        });

        self.response = Some(response);
        self.active_tab = ResponseTab::Body;
        cx.notify();
    }

    fn select_tab(&mut self, tab: ResponseTab, cx: &mut Context<Self>) {
        self.active_tab = tab;
        cx.notify();
    }

    fn render_status_bar(&self, cx: &App) -> impl IntoElement {
        let theme = cx.theme();
        let Some(response) = &self.response else {
            return h_flex()
                .p_2()
                .bg(theme.muted)
                .border_b_1()
                .border_color(theme.border)
                .child("No response yet");
        };

        let status_color = if response.is_success() {
            theme.success
        } else if response.is_error() {
            theme.danger
        } else {
            theme.accent
        };

        let status_text = match response.status {
            Some(status) => format!("{} {}", status, response.status_text()),
            None => format!("ERROR - {}", response.status_text()),
        };

        h_flex()
            .gap_3()
            .items_center()
            .p_2()
            .bg(theme.muted)
            .border_b_1()
            .border_color(theme.border)
            .child(
                div()
                    .px_2()
                    .py_1()
                    .rounded(theme.radius)
                    .bg(status_color)
                    .text_color(gpui::white())
                    .text_sm()
                    .child(status_text),
            )
            .child(
                div()
                    .text_sm()
                    .child(format!("Time: {} ms", response.duration_ms)),
            )
            .when(!response.is_network_error(), |this| {
                this.child(
                    div()
                        .text_sm()
                        .child(format!("Size: {} bytes", response.body.len())),
                )
            })
    }

    fn render_headers(&self, response: &ResponseData) -> impl IntoElement {
        v_flex()
            .id("response-headers-scroll")
            .flex_1()
            .w_full()
            .min_h_0()
            .gap_1()
            .p_2()
            .track_scroll(&self.headers_scroll_handle)
            .overflow_scroll()
            .when(response.headers.is_empty(), |this| this.child("No headers"))
            .children(response.headers.iter().map(|(key, value)| {
                h_flex()
                    .gap_2()
                    .w_full()
                    .child(
                        div()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_sm()
                            .flex_shrink_0()
                            .child(format!("{}:", key)),
                    )
                    .child(
                        div()
                            .text_sm()
                            .flex_1()
                            .overflow_hidden()
                            .text_ellipsis()
                            .whitespace_nowrap()
                            .child(value.clone()),
                    )
            }))
    }
}

/// Pretty-print JSON bodies, show anything else verbatim
fn display_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| body.to_string())
}

impl Render for ResponseViewer {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let header_count = self.response.as_ref().map_or(0, |r| r.headers.len());

        v_flex()
            .id("response-viewer")
            .size_full()
            .overflow_hidden()
            .bg(theme.background)
            .child(
                v_flex()
                    .gap_3()
                    .p_4()
                    .w_full()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(theme.muted_foreground)
                            .child("RESPONSE"),
                    )
                    .child(self.render_status_bar(cx)),
            )
            .when_some(self.response.as_ref(), |this, response| {
                this.child(
                    v_flex()
                        .gap_2()
                        .flex_1()
                        .min_h_0()
                        .p_4()
                        .w_full()
                        .child(
                            h_flex()
                                .gap_1()
                                .child(
                                    Button::new("response-tab-body")
                                        .ghost()
                                        .label("Body")
                                        .when(self.active_tab == ResponseTab::Body, |btn| {
                                            btn.primary()
                                        })
                                        .on_click(cx.listener(|this, _, _window, cx| {
                                            this.select_tab(ResponseTab::Body, cx);
                                        })),
                                )
                                .child(
                                    Button::new("response-tab-headers")
                                        .ghost()
                                        .label(format!("Headers ({})", header_count))
                                        .when(self.active_tab == ResponseTab::Headers, |btn| {
                                            btn.primary()
                                        })
                                        .on_click(cx.listener(|this, _, _window, cx| {
                                            this.select_tab(ResponseTab::Headers, cx);
                                        })),
                                ),
                        )
                        .map(|this| match self.active_tab {
                            ResponseTab::Body => this.child(
                                div().flex_1().min_h_0().w_full().child(
                                    Input::new(&self.body_view)
                                        .disabled(response.is_network_error())
                                        .w_full()
                                        .h_full(),
                                ),
                            ),
                            ResponseTab::Headers => this.child(self.render_headers(response)),
                        }),
                )
            })
            .when(self.response.is_none(), |this| {
                this.child(
                    div()
                        .flex_1()
                        .flex()
                        .items_center()
                        .justify_center()
                        .text_color(theme.muted_foreground)
                        .child("Send a request to see the response here"),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::prelude::v1::test;

    #[test]
    fn test_json_body_is_pretty_printed() {
        assert_eq!(display_body(r#"{"ok":true}"#), "{\n  \"ok\": true\n}");
    }

    #[test]
    fn test_plain_body_is_untouched() {
        assert_eq!(display_body("Request failed: timeout"), "Request failed: timeout");
    }
}
