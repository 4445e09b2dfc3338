mod app;
mod body_format;
mod chat;
mod chat_panel;
mod config;
mod field_layout;
mod http_client;
mod intent;
mod key_value_editor;
mod placeholder;
mod placeholder_input;
mod popup_geometry;
mod request_editor;
mod request_url;
mod response_viewer;
mod selection;
mod status_feed;
mod text_layout;
mod token_field;
mod types;

use anyhow::anyhow;
use gpui::*;
use gpui_component::Root;
use rust_embed::RustEmbed;
use std::borrow::Cow;
use std::sync::Arc;

use crate::app::StencilApp;
use crate::config::AppConfig;

/// An asset source that loads assets from the `./assets` folder.
#[derive(RustEmbed)]
#[folder = "./assets"]
#[include = "icons/**/*.svg"]
pub struct Assets;

impl AssetSource for Assets {
    fn load(&self, path: &str) -> Result<Option<Cow<'static, [u8]>>> {
        if path.is_empty() {
            return Ok(None);
        }

        Self::get(path)
            .map(|f| Some(f.data))
            .ok_or_else(|| anyhow!("could not find asset at path \"{path}\""))
    }

    fn list(&self, path: &str) -> Result<Vec<SharedString>> {
        Ok(Self::iter()
            .filter_map(|p| p.starts_with(path).then(|| p.into()))
            .collect())
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Arc::new(AppConfig::load());
    log::info!(
        "Assistant endpoint: {}, status feed: {}",
        config.assistant_url,
        config.status_feed_url.as_deref().unwrap_or("disabled")
    );

    let app = Application::new().with_assets(Assets);

    app.run(move |cx| {
        gpui_component::init(cx);
        placeholder_input::init(cx);

        cx.spawn(async move |cx| {
            cx.open_window(WindowOptions::default(), |window, cx| {
                let view = cx.new(|cx| StencilApp::new(config, window, cx));
                cx.new(|cx| Root::new(view, window, cx))
            })?;
            Ok::<_, anyhow::Error>(())
        })
        .detach();
    });
}
