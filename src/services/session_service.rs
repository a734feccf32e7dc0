// src/services/session_service.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StudioStore,
    models::tenancy::{ActiveTenant, SessionSnapshot, TenantMembership},
};

// ---
// 1. SessionContext (Identidade + estúdio ativo + cargo)
// ---
// O par (estúdio, cargo) vive num único Option atrás do lock:
// quem lê vê os dois ou nenhum.
#[derive(Debug, Default)]
struct SessionState {
    active: Option<ActiveTenant>,
    // Incrementado a cada logout; seleções iniciadas antes não são aplicadas
    epoch: u64,
}

#[derive(Debug)]
pub struct SessionContext {
    identity_id: Uuid,
    state: RwLock<SessionState>,
}

impl SessionContext {
    pub fn new(identity_id: Uuid) -> Self {
        Self {
            identity_id,
            state: RwLock::new(SessionState::default()),
        }
    }

    pub fn identity_id(&self) -> Uuid {
        self.identity_id
    }

    pub async fn active(&self) -> Option<ActiveTenant> {
        self.state.read().await.active
    }

    /// Para operações que precisam do id do estúdio (ex.: listar clientes).
    pub async fn require_tenant(&self) -> Result<ActiveTenant, AppError> {
        self.active().await.ok_or(AppError::TenantNotSelected)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::new(self.identity_id, self.active().await)
    }

    async fn epoch(&self) -> u64 {
        self.state.read().await.epoch
    }

    // Troca o par inteiro de uma vez. O cargo vem sempre do vínculo escolhido.
    async fn commit(&self, membership: &TenantMembership, started_at: u64) -> Result<ActiveTenant, AppError> {
        let mut state = self.state.write().await;
        if state.epoch != started_at {
            return Err(AppError::SessionChanged);
        }

        let active = ActiveTenant {
            tenant_id: membership.tenant_id,
            role: membership.role,
        };
        state.active = Some(active);
        Ok(active)
    }

    /// Logout: descarta estúdio e cargo juntos.
    pub async fn sign_out(&self) {
        let mut state = self.state.write().await;
        state.active = None;
        state.epoch += 1;
        tracing::info!("Sessão encerrada para a identidade {}", self.identity_id);
    }
}

// ---
// 2. SessionRegistry (Uma sessão por identidade, entre requisições)
// ---
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<Uuid, Arc<SessionContext>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessão da identidade. Criada no estado "sem estúdio" na primeira vez.
    pub fn session_for(&self, identity_id: Uuid) -> Arc<SessionContext> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions
            .entry(identity_id)
            .or_insert_with(|| Arc::new(SessionContext::new(identity_id)))
            .clone()
    }

    /// Logout: tira a sessão do registro e limpa quem ainda segura o Arc.
    /// A próxima requisição da identidade começa do zero, sem estúdio.
    pub async fn sign_out(&self, identity_id: Uuid) {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&identity_id);

        if let Some(session) = removed {
            session.sign_out().await;
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

// ---
// 3. TenantSelector (Lista os estúdios e ativa um deles)
// ---
#[derive(Clone)]
pub struct TenantSelector {
    store: Arc<dyn StudioStore>,
}

impl TenantSelector {
    pub fn new(store: Arc<dyn StudioStore>) -> Self {
        Self { store }
    }

    pub async fn list_tenants(&self, identity_id: Uuid) -> Result<Vec<TenantMembership>, AppError> {
        self.store.list_tenants_for_identity(identity_id).await
    }

    /// Seleciona (ou troca) o estúdio ativo. O cargo é sempre re-derivado do vínculo.
    /// Em qualquer erro a sessão continua como estava.
    pub async fn select(
        &self,
        session: &SessionContext,
        tenant_id: Uuid,
    ) -> Result<ActiveTenant, AppError> {
        let started_at = session.epoch().await;

        let memberships = self.list_tenants(session.identity_id()).await?;
        let membership = memberships
            .iter()
            .find(|m| m.tenant_id == tenant_id)
            .ok_or(AppError::TenantAccessDenied(tenant_id))?;

        let active = session.commit(membership, started_at).await?;

        tracing::info!(
            "Identidade {} entrou no estúdio '{}' como {} ({})",
            session.identity_id(),
            membership.tenant_name,
            active.role,
            active.role.capabilities().granted().join(", ")
        );

        Ok(active)
    }
}
