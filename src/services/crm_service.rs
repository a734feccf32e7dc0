// src/services/crm_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::StudioStore,
    models::crm::{ClientRecord, ClientUpdatePayload, NewClientPayload, NewVisitPayload, VisitRecord},
    services::invalidation::InvalidationHub,
};

/// Escritas da tela de clientes. Toda escrita bem-sucedida invalida a lista do estúdio.
#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn StudioStore>,
    invalidation: Arc<InvalidationHub>,
}

impl CrmService {
    pub fn new(store: Arc<dyn StudioStore>, invalidation: Arc<InvalidationHub>) -> Self {
        Self { store, invalidation }
    }

    pub async fn enroll_client(
        &self,
        tenant_id: Uuid,
        payload: NewClientPayload,
    ) -> Result<ClientRecord, AppError> {
        payload.validate()?;

        let client = self.store.create_client(tenant_id, &payload).await?;
        self.invalidation.invalidate(tenant_id);

        tracing::info!("Cliente {} cadastrado no estúdio {}", client.id, tenant_id);
        Ok(client)
    }

    pub async fn edit_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
        payload: ClientUpdatePayload,
    ) -> Result<ClientRecord, AppError> {
        payload.validate()?;

        let client = self
            .store
            .update_client(tenant_id, client_id, &payload)
            .await?
            .ok_or(AppError::ClientNotFound(client_id))?;
        self.invalidation.invalidate(tenant_id);

        Ok(client)
    }

    pub async fn record_visit(
        &self,
        tenant_id: Uuid,
        payload: NewVisitPayload,
    ) -> Result<VisitRecord, AppError> {
        payload.validate()?;

        // O cliente (se informado) precisa ser deste estúdio
        if let Some(client_id) = payload.client_id {
            self.store
                .find_client(tenant_id, client_id)
                .await?
                .ok_or(AppError::ClientNotFound(client_id))?;
        }

        let visit = self.store.record_visit(tenant_id, &payload).await?;
        self.invalidation.invalidate(tenant_id);

        Ok(visit)
    }
}
