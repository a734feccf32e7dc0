// src/handlers/session.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, session::CurrentSession},
    models::tenancy::{SessionSnapshot, TenantMembership},
};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectTenantPayload {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub tenant_id: Uuid,
}

// GET /api/session/tenants
#[utoipa::path(
    get,
    path = "/api/session/tenants",
    tag = "Session",
    responses(
        (status = 200, description = "Estúdios em que a identidade é membro", body = Vec<TenantMembership>),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_tenants(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let tenants = app_state.tenant_selector.list_tenants(identity.id).await?;
    Ok(Json(tenants))
}

// POST /api/session/tenant
#[utoipa::path(
    post,
    path = "/api/session/tenant",
    tag = "Session",
    request_body = SelectTenantPayload,
    responses(
        (status = 200, description = "Estúdio ativo trocado", body = SessionSnapshot),
        (status = 403, description = "A identidade não é membro do estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn select_tenant(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Json(payload): Json<SelectTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    let active = app_state
        .tenant_selector
        .select(&session, payload.tenant_id)
        .await?;

    // Monta a resposta com o par que acabou de ser gravado
    Ok(Json(SessionSnapshot::new(session.identity_id(), Some(active))))
}

// GET /api/session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Session",
    responses(
        (status = 200, description = "Sessão atual e permissões resolvidas", body = SessionSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_session(CurrentSession(session): CurrentSession) -> Json<SessionSnapshot> {
    Json(session.snapshot().await)
}

// DELETE /api/session
#[utoipa::path(
    delete,
    path = "/api/session",
    tag = "Session",
    responses(
        (status = 204, description = "Estúdio e cargo descartados")
    ),
    security(("api_jwt" = []))
)]
pub async fn sign_out(
    State(app_state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
) -> StatusCode {
    app_state.sessions.sign_out(identity.id).await;
    StatusCode::NO_CONTENT
}
