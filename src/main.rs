#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

mod app;
mod domain;
mod infra;
mod ui;
mod util;
mod workflow;

use std::{process, sync::Arc};

use dioxus::prelude::*;

#[cfg(feature = "desktop")]
use dioxus_desktop::{tao::window::WindowBuilder, Config as DesktopConfig};

use crate::{
    app::Services,
    domain::LinearRegression,
    infra::store::DatasetBackend,
    util::{
        config::{load_config, AppConfig},
        logging::{default_log_dir, init_logging},
        version::APP_NAME,
    },
    workflow::EstimationWorkflow,
};

fn main() {
    // Wayland explicit-sync crashes on some drivers; fall back to GL unless the caller opts in.
    if std::env::var("WAYLAND_DISPLAY").is_ok() && std::env::var("WGPU_BACKEND").is_err() {
        std::env::set_var("WGPU_BACKEND", "gl");
    }

    // WebKit's DMABUF renderer opts into explicit sync; disable it unless the user overrides.
    if std::env::var("WAYLAND_DISPLAY").is_ok()
        && std::env::var("WEBKIT_DISABLE_DMABUF_RENDERER").is_err()
    {
        std::env::set_var("WEBKIT_DISABLE_DMABUF_RENDERER", "1");
    }

    let (config, config_error) = match load_config() {
        Ok(config) => (config, None),
        Err(err) => (
            AppConfig::default().with_env_overrides(|key| std::env::var(key).ok()),
            Some(err),
        ),
    };

    if let Err(err) = init_logging(&config.log_level, &default_log_dir()) {
        eprintln!("Failed to initialise logging: {err}");
    }
    if let Some(err) = config_error {
        log::warn!("event=config_load status=error error={err}; using defaults");
    }

    let services = match build_services(&config) {
        Ok(services) => services,
        Err(message) => {
            log::error!("event=startup status=error {message}");
            eprintln!("{APP_NAME}: {message}");
            process::exit(1);
        }
    };

    let builder = LaunchBuilder::new().with_context(services);

    #[cfg(feature = "desktop")]
    let builder = {
        let config = desktop! {
            DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title(APP_NAME)
            )
        };
        builder.with_cfg(config)
    };

    #[cfg(not(feature = "desktop"))]
    let builder = builder;

    builder.launch(app::App);
}

/// Loads the model and opens the store once for the whole process.
/// Either failing is fatal.
fn build_services(config: &AppConfig) -> Result<Services, String> {
    let model = LinearRegression::load(&config.model_path).map_err(|err| {
        format!(
            "cannot load model {}: {err}",
            config.model_path.display()
        )
    })?;
    let store = DatasetBackend::from_config(&config.store)
        .map_err(|err| format!("cannot open dataset store: {err}"))?;

    log::info!(
        "event=startup status=ok model={} store={} worksheet={:?}",
        config.model_path.display(),
        store.describe(),
        config.worksheet
    );

    Ok(Services {
        workflow: Arc::new(EstimationWorkflow::new(
            model,
            store,
            config.worksheet.clone(),
        )),
    })
}
