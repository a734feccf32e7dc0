// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CrmRepository, TenantRepository},
    models::{
        crm::{ClientRecord, ClientUpdatePayload, NewClientPayload, NewVisitPayload, VisitRecord},
        tenancy::TenantMembership,
    },
};

/// O contrato do armazenamento visto pelo núcleo (sessão + agregação).
///
/// As três leituras são usadas pelos algoritmos; as escritas só pelos
/// handlers com permissão, e cada uma invalida a lista do estúdio.
#[async_trait]
pub trait StudioStore: Send + Sync {
    async fn list_clients(&self, tenant_id: Uuid) -> Result<Vec<ClientRecord>, AppError>;

    async fn list_visits(&self, tenant_id: Uuid) -> Result<Vec<VisitRecord>, AppError>;

    async fn list_tenants_for_identity(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<TenantMembership>, AppError>;

    async fn find_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<ClientRecord>, AppError>;

    async fn create_client(
        &self,
        tenant_id: Uuid,
        payload: &NewClientPayload,
    ) -> Result<ClientRecord, AppError>;

    async fn update_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
        payload: &ClientUpdatePayload,
    ) -> Result<Option<ClientRecord>, AppError>;

    async fn record_visit(
        &self,
        tenant_id: Uuid,
        payload: &NewVisitPayload,
    ) -> Result<VisitRecord, AppError>;
}

// ---
// Implementação Postgres: só delega para os repositórios
// ---
#[derive(Clone)]
pub struct PgStudioStore {
    crm_repo: CrmRepository,
    tenant_repo: TenantRepository,
}

impl PgStudioStore {
    pub fn new(crm_repo: CrmRepository, tenant_repo: TenantRepository) -> Self {
        Self { crm_repo, tenant_repo }
    }
}

#[async_trait]
impl StudioStore for PgStudioStore {
    async fn list_clients(&self, tenant_id: Uuid) -> Result<Vec<ClientRecord>, AppError> {
        self.crm_repo.list_clients(self.crm_repo.pool(), tenant_id).await
    }

    async fn list_visits(&self, tenant_id: Uuid) -> Result<Vec<VisitRecord>, AppError> {
        self.crm_repo.list_visits(self.crm_repo.pool(), tenant_id).await
    }

    async fn list_tenants_for_identity(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<TenantMembership>, AppError> {
        self.tenant_repo
            .list_memberships(self.tenant_repo.pool(), identity_id)
            .await
    }

    async fn find_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<ClientRecord>, AppError> {
        self.crm_repo
            .find_client(self.crm_repo.pool(), tenant_id, client_id)
            .await
    }

    async fn create_client(
        &self,
        tenant_id: Uuid,
        payload: &NewClientPayload,
    ) -> Result<ClientRecord, AppError> {
        self.crm_repo
            .create_client(self.crm_repo.pool(), tenant_id, payload)
            .await
    }

    async fn update_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
        payload: &ClientUpdatePayload,
    ) -> Result<Option<ClientRecord>, AppError> {
        self.crm_repo
            .update_client(self.crm_repo.pool(), tenant_id, client_id, payload)
            .await
    }

    async fn record_visit(
        &self,
        tenant_id: Uuid,
        payload: &NewVisitPayload,
    ) -> Result<VisitRecord, AppError> {
        self.crm_repo
            .record_visit(self.crm_repo.pool(), tenant_id, payload)
            .await
    }
}
