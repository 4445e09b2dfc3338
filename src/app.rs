use gpui::*;
use gpui_component::{
    h_flex,
    resizable::{resizable_panel, v_resizable},
    ActiveTheme as _, Icon, Sizable as _,
};
use std::sync::Arc;
use std::time::Duration;

use crate::chat_panel::{ChatPanel, ConfigSuggested};
use crate::config::AppConfig;
use crate::http_client::HttpClient;
use crate::request_editor::{RequestCompleted, RequestEditor};
use crate::response_viewer::ResponseViewer;

/// Main application view
pub struct StencilApp {
    request_editor: Entity<RequestEditor>,
    response_viewer: Entity<ResponseViewer>,
    chat_panel: Entity<ChatPanel>,
    _subscriptions: Vec<Subscription>,
}

impl StencilApp {
    pub fn new(config: Arc<AppConfig>, window: &mut Window, cx: &mut Context<Self>) -> Self {
        let client = HttpClient::new(Duration::from_secs(config.request_timeout_secs))
            .expect("Failed to initialize HTTP client");

        let request_editor = cx.new(|cx| RequestEditor::new(&config, client.clone(), window, cx));
        let response_viewer = cx.new(|cx| ResponseViewer::new(window, cx));
        let chat_panel = cx.new(|cx| ChatPanel::new(&config, client, window, cx));

        let response_viewer_clone = response_viewer.clone();
        let request_sub = cx.subscribe_in(
            &request_editor,
            window,
            move |_this, _, event: &RequestCompleted, window, cx| {
                log::info!(
                    "{} {} -> {}",
                    event.request.method,
                    event.request.url,
                    event
                        .response
                        .status
                        .map_or_else(|| "network error".to_string(), |s| s.to_string())
                );

                response_viewer_clone.update(cx, |viewer, cx| {
                    viewer.set_response(event.response.clone(), window, cx);
                });
            },
        );

        // Fill the form with whatever the assistant suggests
        let request_editor_clone = request_editor.clone();
        let config_sub = cx.subscribe_in(
            &chat_panel,
            window,
            move |_this, _, event: &ConfigSuggested, window, cx| {
                request_editor_clone.update(cx, |editor, cx| {
                    editor.apply_config(&event.0, window, cx);
                });
            },
        );

        Self {
            request_editor,
            response_viewer,
            chat_panel,
            _subscriptions: vec![request_sub, config_sub],
        }
    }
}

impl Render for StencilApp {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        div()
            .size_full()
            .flex()
            .flex_col()
            .bg(theme.background)
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .px_4()
                    .py_2()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(Icon::default().path("icons/logo.svg").small())
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::SEMIBOLD)
                            .child("HTTP Connector"),
                    ),
            )
            .child(
                div()
                    .flex_1()
                    .min_h_0()
                    .flex()
                    .flex_row()
                    .child(
                        // Request editor and response viewer with resizable splitter
                        div().flex_1().h_full().child(
                            v_resizable("request-response-splitter")
                                .child(
                                    resizable_panel()
                                        .size(px(460.))
                                        .size_range(px(240.)..px(900.))
                                        .child(self.request_editor.clone()),
                                )
                                .child(
                                    div()
                                        .flex_1()
                                        .border_t_1()
                                        .border_color(theme.border)
                                        .child(self.response_viewer.clone())
                                        .into_any_element(),
                                ),
                        ),
                    )
                    .child(
                        // Right: assistant chat
                        div()
                            .w(px(384.))
                            .flex_shrink_0()
                            .h_full()
                            .child(self.chat_panel.clone()),
                    ),
            )
    }
}
