// src/middleware/session.rs

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    services::session_service::SessionContext,
};

// A sessão da identidade autenticada (com ou sem estúdio selecionado).
// Substitui o antigo cabeçalho X-Tenant-ID: o estúdio agora vem da seleção.
#[derive(Debug, Clone)]
pub struct CurrentSession(pub Arc<SessionContext>);

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let AuthenticatedUser(identity) = AuthenticatedUser::from_request_parts(parts, state).await?;

        Ok(CurrentSession(app_state.sessions.session_for(identity.id)))
    }
}
