use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    button::*, h_flex, select::*, v_flex, ActiveTheme as _, Disableable as _, IndexPath,
    Sizable as _,
};
use std::time::Instant;

use crate::body_format;
use crate::config::AppConfig;
use crate::http_client::HttpClient;
use crate::intent::HttpConfig;
use crate::key_value_editor::{KeyValueEditor, PairsChanged};
use crate::placeholder_input::{PlaceholderInput, TextChanged};
use crate::request_url;
use crate::types::{HttpMethod, RequestData, ResponseData};

/// Rows shown by the body field
const BODY_ROWS: usize = 8;

/// Event emitted when a request is sent and response is received
#[derive(Clone)]
pub struct RequestCompleted {
    pub request: RequestData,
    pub response: ResponseData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestTab {
    Headers,
    Params,
    Body,
}

/// Request form: method, URL, headers, params and body
pub struct RequestEditor {
    client: HttpClient,
    method_select: Entity<SelectState<Vec<&'static str>>>,
    url_input: Entity<PlaceholderInput>,
    headers: Entity<KeyValueEditor>,
    params: Entity<KeyValueEditor>,
    body_input: Entity<PlaceholderInput>,
    active_tab: RequestTab,
    loading: bool,
    _subscriptions: Vec<Subscription>,
}

impl RequestEditor {
    pub fn new(
        config: &AppConfig,
        client: HttpClient,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let method_select = cx.new(|cx| {
            SelectState::new(
                HttpMethod::all().iter().map(HttpMethod::as_str).collect::<Vec<_>>(),
                Some(IndexPath::default().row(config.default_method.index())),
                window,
                cx,
            )
        });

        let url_input = cx.new(|cx| {
            PlaceholderInput::single_line(window, cx)
                .placeholder("https://{{host}}/v1/resource", window, cx)
                .icon("icons/globe.svg")
        });

        let headers = cx.new(|cx| {
            KeyValueEditor::new("headers-list", "Add header", "Header name", "Value", window, cx)
        });
        let params = cx.new(|cx| {
            KeyValueEditor::new("params-list", "Add parameter", "Parameter", "Value", window, cx)
        });

        let body_input = cx.new(|cx| {
            PlaceholderInput::multi_line(BODY_ROWS, window, cx).placeholder(
                r#"{"email": "{{email}}"}"#,
                window,
                cx,
            )
        });

        let url_sub = cx.subscribe_in(
            &url_input,
            window,
            |this, _, event: &TextChanged, _window, cx| {
                this.validate_url(&event.text, cx);
            },
        );
        let body_sub = cx.subscribe_in(
            &body_input,
            window,
            |this, _, _event: &TextChanged, _window, cx| {
                // A fresh edit invalidates the last format error
                this.body_input.update(cx, |input, cx| {
                    input.set_error(None::<SharedString>, cx);
                });
            },
        );
        let params_sub = cx.subscribe_in(
            &params,
            window,
            |_this, _, event: &PairsChanged, _window, _cx| {
                log::debug!("Query params changed: {} set", event.pairs.len());
            },
        );

        Self {
            client,
            method_select,
            url_input,
            headers,
            params,
            body_input,
            active_tab: RequestTab::Headers,
            loading: false,
            _subscriptions: vec![url_sub, body_sub, params_sub],
        }
    }

    /// Replace the whole form with a configuration suggested by the assistant
    pub fn apply_config(&mut self, config: &HttpConfig, window: &mut Window, cx: &mut Context<Self>) {
        self.method_select.update(cx, |select, cx| {
            select.set_selected_index(
                Some(IndexPath::default().row(config.method.index())),
                window,
                cx,
            );
        });
        self.url_input.update(cx, |input, cx| {
            input.set_value(&config.url, window, cx);
        });
        self.validate_url(&config.url, cx);

        self.headers.update(cx, |editor, cx| {
            editor.set_pairs(&config.headers, window, cx);
        });
        self.params.update(cx, |editor, cx| {
            editor.set_pairs(&config.query_params, window, cx);
        });

        let body = body_format::format_json_body(&config.body).unwrap_or_else(|_| config.body.clone());
        self.body_input.update(cx, |input, cx| {
            input.set_value(&body, window, cx);
            input.set_error(None::<SharedString>, cx);
        });

        self.active_tab = if config.method == HttpMethod::GET {
            RequestTab::Params
        } else {
            RequestTab::Body
        };
        cx.notify();
    }

    /// Snapshot of the form as it would be sent
    pub fn request_data(&self, cx: &App) -> RequestData {
        let method_index = self
            .method_select
            .read(cx)
            .selected_index(cx)
            .map(|idx| idx.row)
            .unwrap_or(0);

        let mut request = RequestData::new(HttpMethod::from_index(method_index));
        request.url = self.url_input.read(cx).value().trim().to_string();
        request.headers = self.headers.read(cx).pairs(cx);
        request.query_params = self.params.read(cx).pairs(cx);
        request.body = self.body_input.read(cx).value().to_string();
        request
    }

    fn validate_url(&mut self, url: &str, cx: &mut Context<Self>) {
        let error = request_url::validate_url(url).err();
        self.url_input.update(cx, |input, cx| {
            input.set_error(error, cx);
        });
    }

    fn format_body(&mut self, _event: &ClickEvent, window: &mut Window, cx: &mut Context<Self>) {
        let body = self.body_input.read(cx).value().to_string();
        if body.trim().is_empty() {
            return;
        }

        match body_format::format_json_body(&body) {
            Ok(formatted) => {
                self.body_input.update(cx, |input, cx| {
                    input.set_value(&formatted, window, cx);
                    input.set_error(None::<SharedString>, cx);
                });
            }
            Err(e) => {
                log::debug!("Body is not valid JSON: {}", e);
                self.body_input.update(cx, |input, cx| {
                    input.set_error(Some(format!("Invalid JSON: {}", e)), cx);
                });
            }
        }
    }

    fn send_request(&mut self, _event: &ClickEvent, window: &mut Window, cx: &mut Context<Self>) {
        let request = self.request_data(cx);
        if request.url.is_empty() || self.loading {
            return;
        }

        let unresolved = request.unresolved_tokens();
        if !unresolved.is_empty() {
            log::warn!(
                "Sending request with unresolved placeholders: {}",
                unresolved.join(", ")
            );
        }

        self.loading = true;
        cx.notify();

        let client = self.client.clone();
        cx.spawn_in(window, async move |this, cx| {
            let start = Instant::now();
            let response = match client.send(&request).await {
                Ok(response) => response,
                Err(e) => {
                    let error_message = format!("Request failed: {:#}", e);
                    log::error!("{}", error_message);
                    ResponseData {
                        status: None,
                        duration_ms: start.elapsed().as_millis() as u64,
                        headers: vec![],
                        body: error_message,
                    }
                }
            };

            this.update(cx, |this, cx| {
                this.loading = false;
                cx.emit(RequestCompleted { request, response });
                cx.notify();
            })?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    }

    fn render_tab_button(&self, tab: RequestTab, label: &'static str, cx: &Context<Self>) -> Button {
        let id = match tab {
            RequestTab::Headers => "tab-headers",
            RequestTab::Params => "tab-params",
            RequestTab::Body => "tab-body",
        };

        Button::new(id)
            .ghost()
            .label(label)
            .when(self.active_tab == tab, |btn| btn.primary())
            .on_click(cx.listener(move |this, _event: &ClickEvent, _window, cx| {
                this.active_tab = tab;
                cx.notify();
            }))
    }

    fn render_body_tab(&self, cx: &Context<Self>) -> impl IntoElement {
        v_flex()
            .gap_2()
            .p_2()
            .w_full()
            .flex_1()
            .min_h_0()
            .child(
                h_flex().justify_end().child(
                    Button::new("format-json")
                        .ghost()
                        .small()
                        .label("Format JSON")
                        .on_click(cx.listener(Self::format_body)),
                ),
            )
            .child(self.body_input.clone())
    }
}

impl EventEmitter<RequestCompleted> for RequestEditor {}

impl Render for RequestEditor {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex().size_full().bg(theme.background).child(
            v_flex()
                .gap_3()
                .p_4()
                .size_full()
                .border_b_1()
                .border_color(theme.border)
                .child(
                    div()
                        .text_sm()
                        .font_weight(FontWeight::SEMIBOLD)
                        .text_color(theme.muted_foreground)
                        .child("REQUEST"),
                )
                .child(
                    // Method, URL and Send
                    h_flex()
                        .gap_2()
                        .items_start()
                        .w_full()
                        .child(
                            div()
                                .flex_shrink_0()
                                .w(px(110.))
                                .child(Select::new(&self.method_select)),
                        )
                        .child(
                            v_flex()
                                .flex_1()
                                .min_w_0()
                                .gap_1()
                                .child(self.url_input.clone())
                                .child(
                                    div()
                                        .text_xs()
                                        .text_color(theme.muted_foreground)
                                        .child("Write the full path (https://example.com/path)"),
                                ),
                        )
                        .child(
                            div().flex_shrink_0().child(
                                Button::new("send-btn")
                                    .primary()
                                    .label("Send")
                                    .disabled(self.loading)
                                    .loading(self.loading)
                                    .on_click(cx.listener(Self::send_request)),
                            ),
                        ),
                )
                .child(
                    v_flex()
                        .gap_2()
                        .w_full()
                        .flex_1()
                        .min_h_0()
                        .child(
                            h_flex()
                                .gap_1()
                                .child(self.render_tab_button(RequestTab::Headers, "Headers", cx))
                                .child(self.render_tab_button(RequestTab::Params, "Params", cx))
                                .child(self.render_tab_button(RequestTab::Body, "Body", cx)),
                        )
                        .map(|this| match self.active_tab {
                            RequestTab::Headers => this.child(self.headers.clone()),
                            RequestTab::Params => this.child(self.params.clone()),
                            RequestTab::Body => this.child(self.render_body_tab(cx)),
                        }),
                ),
        )
    }
}
