use std::sync::Arc;

use roost_auth::{GuestTokens, TokenVerifier};
use roost_axum::{HasGuestTokens, HasVerifier};
use roost_queue::Notifier;
use roost_rbac::Rbac;
use roost_store::Repositories;

/// Shared by every handler. Cheap to clone; nothing in here is mutated
/// after startup.
#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub rbac: Rbac,
    pub verifier: Arc<dyn TokenVerifier>,
    pub guest: GuestTokens,
    pub notifier: Notifier,
    pub exclusive_open: bool,
}

impl HasVerifier for AppState {
    fn verifier(&self) -> &Arc<dyn TokenVerifier> {
        &self.verifier
    }
}

impl HasGuestTokens for AppState {
    fn guest_tokens(&self) -> &GuestTokens {
        &self.guest
    }
}
