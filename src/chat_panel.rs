use futures::StreamExt as _;
use gpui::prelude::FluentBuilder as _;
use gpui::*;
use gpui_component::{
    button::*, h_flex, input::*, input::InputEvent, v_flex, ActiveTheme as _, Disableable as _, Icon, Sizable as _,
};

use crate::chat::{ChatMessage, Role, Transcript};
use crate::config::AppConfig;
use crate::http_client::HttpClient;
use crate::intent::{HttpConfig, FAILED_REPLY};
use crate::status_feed;

const THINKING: &str = "Thinking...";

/// Emitted when the assistant turned a prompt into a request
#[derive(Clone)]
pub struct ConfigSuggested(pub HttpConfig);

/// Assistant chat: describe a call in words and get the form filled in
pub struct ChatPanel {
    client: HttpClient,
    assistant_url: String,
    transcript: Transcript,
    prompt_input: Entity<InputState>,
    scroll_handle: ScrollHandle,
    loading: bool,
    _status_feed: Option<Task<anyhow::Result<()>>>,
    _subscriptions: Vec<Subscription>,
}

impl ChatPanel {
    pub fn new(
        config: &AppConfig,
        client: HttpClient,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) -> Self {
        let prompt_input = cx.new(|cx| {
            InputState::new(window, cx).placeholder("Create a Stripe customer with an email")
        });

        let prompt_sub = cx.subscribe_in(
            &prompt_input,
            window,
            |this, _, event: &InputEvent, window, cx| {
                if let InputEvent::PressEnter { .. } = event {
                    this.send_prompt(window, cx);
                }
            },
        );

        let status_feed = config.status_feed_url.clone().map(|url| {
            let mut lines = status_feed::subscribe(url);
            cx.spawn_in(window, async move |this, cx| {
                while let Some(line) = lines.next().await {
                    this.update(cx, |this, cx| this.show_status(line, cx))?;
                }
                Ok::<_, anyhow::Error>(())
            })
        });

        Self {
            client,
            assistant_url: config.assistant_url.clone(),
            transcript: Transcript::new(),
            prompt_input,
            scroll_handle: ScrollHandle::new(),
            loading: false,
            _status_feed: status_feed,
            _subscriptions: vec![prompt_sub],
        }
    }

    /// Mirror a server status line while a prompt is being processed
    fn show_status(&mut self, line: String, cx: &mut Context<Self>) {
        if !self.loading {
            log::debug!("Status line outside a request: {}", line);
            return;
        }
        self.transcript.set_status(line);
        self.scroll_to_bottom();
        cx.notify();
    }

    fn send_prompt(&mut self, window: &mut Window, cx: &mut Context<Self>) {
        if self.loading {
            return;
        }

        let prompt = self.prompt_input.read(cx).value().trim().to_string();
        if prompt.is_empty() {
            return;
        }

        self.prompt_input.update(cx, |input, cx| {
            input.set_value("", window, cx);
        });
        self.transcript.push_user(prompt.clone());
        self.transcript.set_status(THINKING);
        self.loading = true;
        self.scroll_to_bottom();
        cx.notify();

        let client = self.client.clone();
        let endpoint = self.assistant_url.clone();
        cx.spawn_in(window, async move |this, cx| {
            let result = client.parse_intent(&endpoint, &prompt).await;

            this.update(cx, |this, cx| {
                this.loading = false;
                this.transcript.clear_status();

                match result {
                    Ok(response) => {
                        log::info!("Assistant replied (success: {})", response.success);
                        this.transcript
                            .push_assistant(response.reply(), response.citations());
                        if let Some(config) = response.http_config() {
                            cx.emit(ConfigSuggested(config));
                        }
                    }
                    Err(e) => {
                        log::error!("Assistant request failed: {:#}", e);
                        this.transcript.push_assistant(FAILED_REPLY, vec![]);
                    }
                }

                this.scroll_to_bottom();
                cx.notify();
            })?;

            Ok::<_, anyhow::Error>(())
        })
        .detach();
    }

    fn scroll_to_bottom(&self) {
        self.scroll_handle.scroll_to_bottom();
    }

    fn render_message(&self, message: &ChatMessage, cx: &App) -> impl IntoElement {
        let theme = cx.theme();
        let time = message
            .timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string();

        match message.role {
            Role::Status => h_flex()
                .id(("chat-message", message.id as usize))
                .gap_2()
                .items_center()
                .text_sm()
                .italic()
                .text_color(theme.muted_foreground)
                .child(Icon::default().path("icons/sparkles.svg").small())
                .child(message.content.clone()),
            Role::User | Role::Assistant => {
                let is_user = message.role == Role::User;
                h_flex()
                    .id(("chat-message", message.id as usize))
                    .w_full()
                    .when(is_user, |this| this.justify_end())
                    .child(
                        v_flex()
                            .max_w(px(300.))
                            .gap_1()
                            .px_3()
                            .py_2()
                            .rounded(theme.radius)
                            .text_sm()
                            .when(is_user, |this| {
                                this.bg(theme.accent).text_color(theme.accent_foreground)
                            })
                            .when(!is_user, |this| {
                                this.bg(theme.muted).text_color(theme.foreground)
                            })
                            .child(message.content.clone())
                            .when(!message.citations.is_empty(), |this| {
                                this.child(
                                    v_flex()
                                        .pt_1()
                                        .gap_1()
                                        .text_xs()
                                        .text_color(theme.muted_foreground)
                                        .child("Sources:")
                                        .children(
                                            message.citations.iter().map(|c| div().child(c.clone())),
                                        ),
                                )
                            })
                            .child(
                                div()
                                    .text_xs()
                                    .text_color(theme.muted_foreground)
                                    .child(time),
                            ),
                    )
            }
        }
    }
}

impl EventEmitter<ConfigSuggested> for ChatPanel {}

impl Render for ChatPanel {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();

        v_flex()
            .size_full()
            .bg(theme.background)
            .border_l_1()
            .border_color(theme.border)
            .child(
                h_flex()
                    .gap_2()
                    .items_center()
                    .p_4()
                    .border_b_1()
                    .border_color(theme.border)
                    .child(Icon::default().path("icons/sparkles.svg").small())
                    .child(
                        div()
                            .text_sm()
                            .font_weight(FontWeight::SEMIBOLD)
                            .text_color(theme.muted_foreground)
                            .child("ASSISTANT"),
                    ),
            )
            .child(
                v_flex()
                    .id("chat-transcript")
                    .flex_1()
                    .min_h_0()
                    .gap_3()
                    .p_4()
                    .track_scroll(&self.scroll_handle)
                    .overflow_scroll()
                    .when(self.transcript.is_empty(), |this| {
                        this.child(
                            div()
                                .text_sm()
                                .text_color(theme.muted_foreground)
                                .child("Describe the API call you want to make."),
                        )
                    })
                    .children(
                        self.transcript
                            .messages()
                            .map(|message| self.render_message(message, cx)),
                    ),
            )
            .child(
                h_flex()
                    .gap_2()
                    .p_4()
                    .border_t_1()
                    .border_color(theme.border)
                    .child(
                        div()
                            .flex_1()
                            .child(Input::new(&self.prompt_input).disabled(self.loading)),
                    )
                    .child(
                        Button::new("chat-send")
                            .primary()
                            .label("Send")
                            .disabled(self.loading)
                            .loading(self.loading)
                            .on_click(cx.listener(|this, _event: &ClickEvent, window, cx| {
                                this.send_prompt(window, cx);
                            })),
                    ),
            )
    }
}
