// src/handlers/crm.rs

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        rbac::{CanAddClient, CanCreateSession, CanEditClient, CanViewClientProfile, RequireCapability},
        session::CurrentSession,
    },
    models::{
        client_list::{ClientListQuery, ClientListView},
        crm::{ClientRecord, ClientUpdatePayload, ClientWithMetrics, NewClientPayload, NewVisitPayload, VisitRecord},
    },
    services::client_list::project,
};

// =============================================================================
//  ÁREA 1: LISTA DE CLIENTES (Leitura)
// =============================================================================

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    params(ClientListQuery),
    responses(
        (status = 200, description = "Clientes do estúdio com métricas, filtrados e ordenados", body = ClientListView),
        (status = 409, description = "Nenhum estúdio selecionado"),
        (status = 503, description = "Clientes indisponíveis")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<ClientListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let active = session.require_tenant().await?;

    let records = app_state.aggregator.aggregate(active.tenant_id).await?;
    let view = project(
        records,
        &query,
        &active.role.capabilities(),
        &app_state.thresholds,
    );

    Ok(Json(view))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Ficha do cliente com métricas", body = ClientWithMetrics),
        (status = 403, description = "Sem permissão para ver o perfil"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    guard: RequireCapability<CanViewClientProfile>,
    Path(client_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state
        .aggregator
        .aggregate_one(guard.active.tenant_id, client_id)
        .await?;

    Ok(Json(client))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientListRevision {
    pub revision: u64,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RevisionQuery {
    /// Revisão que a tela já tem. Com ela, a resposta espera até a lista mudar.
    pub after: Option<u64>,
}

const REVISION_LONG_POLL: Duration = Duration::from_secs(25);

// GET /api/clients/revision
// Sem `after` responde na hora; com `after` segura a requisição até a revisão mudar
#[utoipa::path(
    get,
    path = "/api/clients/revision",
    tag = "Clients",
    params(RevisionQuery),
    responses(
        (status = 200, description = "Revisão atual da lista do estúdio ativo", body = ClientListRevision),
        (status = 409, description = "Nenhum estúdio selecionado")
    ),
    security(("api_jwt" = []))
)]
pub async fn client_list_revision(
    State(app_state): State<AppState>,
    CurrentSession(session): CurrentSession,
    Query(query): Query<RevisionQuery>,
) -> Result<impl IntoResponse, AppError> {
    let active = session.require_tenant().await?;

    let revision = match query.after {
        Some(after) => {
            app_state
                .invalidation
                .wait_for_change(active.tenant_id, after, REVISION_LONG_POLL)
                .await
        }
        None => app_state.invalidation.revision(active.tenant_id),
    };

    Ok(Json(ClientListRevision { revision }))
}

// =============================================================================
//  ÁREA 2: CADASTRO E EDIÇÃO
// =============================================================================

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = NewClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = ClientRecord),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão para cadastrar")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    guard: RequireCapability<CanAddClient>,
    Json(payload): Json<NewClientPayload>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state
        .crm_service
        .enroll_client(guard.active.tenant_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    request_body = ClientUpdatePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = ClientRecord),
        (status = 403, description = "Sem permissão para editar"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    guard: RequireCapability<CanEditClient>,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<ClientUpdatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let client = app_state
        .crm_service
        .edit_client(guard.active.tenant_id, client_id, payload)
        .await?;

    Ok(Json(client))
}

// =============================================================================
//  ÁREA 3: SESSÕES (ATENDIMENTOS)
// =============================================================================

// POST /api/visits
#[utoipa::path(
    post,
    path = "/api/visits",
    tag = "Clients",
    request_body = NewVisitPayload,
    responses(
        (status = 201, description = "Sessão registrada", body = VisitRecord),
        (status = 403, description = "Sem permissão para registrar sessões"),
        (status = 404, description = "Cliente não encontrado neste estúdio")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_visit(
    State(app_state): State<AppState>,
    guard: RequireCapability<CanCreateSession>,
    Json(payload): Json<NewVisitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let visit = app_state
        .crm_service
        .record_visit(guard.active.tenant_id, payload)
        .await?;

    Ok((StatusCode::CREATED, Json(visit)))
}
