//! roost-server: the hotel/room/stay REST API.
//!
//! [`build`] wires settings, grants, repositories and the notifier into an
//! [`AxumApp`]; `main.rs` only adds logging and `listen`.

pub mod services;
pub mod settings;
pub mod state;

use std::sync::Arc;

use anyhow::Result;
use roost_auth::{GuestTokens, JwtVerifier};
use roost_axum::AxumApp;
use roost_queue::{MemoryQueue, NotificationQueue, Notifier};
use roost_rbac::{builtin_grants, load_grants, Rbac};
use roost_store::{KvStore, MemoryStore, Repositories};

pub use settings::Settings;
pub use state::AppState;

/// Build the app on in-process backends.
pub fn build(settings: &Settings) -> Result<AxumApp> {
    build_with(
        settings,
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryQueue::new(settings.dedup_window)),
    )
}

pub fn build_with(
    settings: &Settings,
    store: Arc<dyn KvStore>,
    queue: Arc<dyn NotificationQueue>,
) -> Result<AxumApp> {
    let grants = match &settings.roles_dir {
        Some(dir) => load_grants(dir)?,
        None => builtin_grants()?,
    };

    let state = AppState {
        repos: Repositories::new(store, settings.index_retry),
        rbac: Rbac::new(grants),
        verifier: Arc::new(JwtVerifier::new(settings.jwt.clone())),
        guest: GuestTokens::new(settings.guest_secret.clone()),
        notifier: Notifier::new(queue),
        exclusive_open: settings.exclusive_open,
    };

    let router = services::router().with_state(state);

    Ok(AxumApp::new(router)
        .service("/health", || async { "ok" })
        .with_standard_layers())
}
