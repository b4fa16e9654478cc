use anyhow::{anyhow, Result};
use axum::{middleware, routing::get, Router};
use axum_messages::MessagesManagerLayer;
use base64::prelude::*;
use tokio::signal;
use tower_http::services::ServeDir;
use tower_sessions::{
    cookie::{self, Key},
    Expiry, MemoryStore, SessionManagerLayer,
};
use tracing::{info, warn};

pub mod asset;
pub mod augment;
pub mod cli;
pub mod config;
pub mod context;
mod controller;
pub mod error;
pub mod extract;
pub mod fragment;
pub mod layout;
pub mod view;

pub use {
    config::Config,
    context::{AppContext, Message, RenderContext, Severity},
    error::BaseplateError,
    layout::{Composer, LayoutRegistry, Node, Predicate, Template},
};

use crate::{
    asset::AssetManifest,
    augment::ClientScript,
    fragment::{Fragments, MessageList, Navbar, SidePanel, Sidebar},
};

pub const APP_TITLE: &str = "Dashboard";

/// The fragments the base layout refers to.
pub fn fragments(config: &Config) -> Fragments {
    Fragments::new()
        .with(
            fragment::NAVBAR,
            Navbar {
                title: APP_TITLE.to_string(),
            },
        )
        .with(fragment::SIDEBAR, Sidebar)
        .with(fragment::MESSAGES, MessageList)
        .with(fragment::SIDEPANEL, SidePanel)
        .with(fragment::ASSETS, AssetManifest::from_config(&config.assets))
        .with(fragment::CSRF_SCRIPT, ClientScript)
}

#[derive(Clone)]
pub struct Baseplate {
    context: AppContext,
}

impl Baseplate {
    /// Registers and validates every layout template. A broken chain or a dangling fragment
    /// reference fails here rather than on the first request.
    pub fn boot(config: Config) -> Result<Self> {
        let composer = Composer::new(
            view::templates()?,
            fragments(&config),
            config.max_chain_depth,
        )?;
        info!(
            templates = composer.templates().ids().count(),
            "layout templates validated"
        );

        Ok(Self {
            context: AppContext::new(composer, config),
        })
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    pub fn router(&self) -> Result<Router> {
        let session_key = match self.context.config().session_key.as_deref() {
            Some(session_key) => {
                let session_key = BASE64_STANDARD.decode(session_key)?;
                Key::try_from(session_key.as_slice())
                    .map_err(|e| anyhow!("invalid session key: {e}"))?
            }
            None => {
                warn!("No session key configured. Falling back to generated key. This will invalidate any sessions when the server is stopped.");
                Key::generate()
            }
        };

        let session_layer = SessionManagerLayer::new(MemoryStore::default())
            .with_secure(false) // @TODO
            .with_expiry(Expiry::OnInactivity(cookie::time::Duration::days(1)))
            .with_signed(session_key);

        let router = Router::new()
            .route("/", get(controller::dashboard))
            .route(
                "/sidepanel",
                get(controller::sidepanel)
                    .put(controller::sidepanel)
                    .post(controller::sidepanel)
                    .delete(controller::sidepanel),
            )
            .route(
                "/login",
                get(controller::auth::form).post(controller::auth::login),
            )
            .route("/logout", get(controller::auth::logout))
            // Static assets.
            .nest_service(
                "/static",
                ServeDir::new(&self.context.config().assets.static_dir),
            )
            .layer(middleware::map_response_with_state(
                self.context.clone(),
                view::render_view,
            ))
            .layer(MessagesManagerLayer)
            .layer(session_layer);

        Ok(router.with_state(self.context.clone()))
    }

    pub async fn serve(self) -> Result<()> {
        let router = self.router()?;

        let listener = tokio::net::TcpListener::bind(&self.context.config().listen).await?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
