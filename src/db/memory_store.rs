// src/db/memory_store.rs
//
// Store em memória para os testes, com injeção de falhas por operação.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Barrier;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::StudioStore,
    models::{
        crm::{ClientRecord, ClientUpdatePayload, NewClientPayload, NewVisitPayload, VisitRecord},
        rbac::Role,
        tenancy::TenantMembership,
    },
};

#[derive(Default)]
struct Tables {
    clients: Vec<ClientRecord>,
    visits: Vec<VisitRecord>,
    memberships: Vec<(Uuid, TenantMembership)>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    pub fail_clients: AtomicBool,
    pub fail_visits: AtomicBool,
    pub fail_memberships: AtomicBool,
    // Quando presente, list_clients e list_visits só retornam juntas
    read_barrier: Option<Arc<Barrier>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// As duas leituras da agregação precisam estar em andamento ao mesmo tempo.
    pub fn with_read_barrier() -> Self {
        Self {
            read_barrier: Some(Arc::new(Barrier::new(2))),
            ..Self::default()
        }
    }

    pub fn add_membership(&self, identity_id: Uuid, tenant_id: Uuid, name: &str, role: Role) {
        self.tables.lock().unwrap().memberships.push((
            identity_id,
            TenantMembership {
                tenant_id,
                tenant_name: name.to_string(),
                role,
            },
        ));
    }

    pub fn add_client(&self, tenant_id: Uuid, full_name: &str, email: Option<&str>) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.tables.lock().unwrap().clients.push(ClientRecord {
            id,
            tenant_id,
            full_name: full_name.to_string(),
            email: email.map(str::to_string),
            phone: None,
            birth_date: None,
            instagram: None,
            notes: None,
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_visit(
        &self,
        tenant_id: Uuid,
        client_id: Option<Uuid>,
        price: Option<&str>,
        performed_date: Option<&str>,
    ) {
        self.tables.lock().unwrap().visits.push(VisitRecord {
            id: Uuid::new_v4(),
            tenant_id,
            client_id,
            professional_id: None,
            description: None,
            price: price.map(str::to_string),
            performed_date: performed_date.map(str::to_string),
            created_at: None,
        });
    }

    pub fn set_failing(&self, flag: &AtomicBool, failing: bool) {
        flag.store(failing, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> Result<(), AppError> {
        if flag.load(Ordering::SeqCst) {
            return Err(AppError::StoreUnavailable(format!("{what} offline")));
        }
        Ok(())
    }

    async fn rendezvous(&self) {
        if let Some(barrier) = &self.read_barrier {
            barrier.wait().await;
        }
    }
}

#[async_trait]
impl StudioStore for MemoryStore {
    async fn list_clients(&self, tenant_id: Uuid) -> Result<Vec<ClientRecord>, AppError> {
        self.rendezvous().await;
        Self::check(&self.fail_clients, "clients")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .clients
            .iter()
            .filter(|c| c.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn list_visits(&self, tenant_id: Uuid) -> Result<Vec<VisitRecord>, AppError> {
        self.rendezvous().await;
        Self::check(&self.fail_visits, "visits")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .visits
            .iter()
            .filter(|v| v.tenant_id == tenant_id)
            .cloned()
            .collect())
    }

    async fn list_tenants_for_identity(
        &self,
        identity_id: Uuid,
    ) -> Result<Vec<TenantMembership>, AppError> {
        Self::check(&self.fail_memberships, "memberships")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .memberships
            .iter()
            .filter(|(identity, _)| *identity == identity_id)
            .map(|(_, membership)| membership.clone())
            .collect())
    }

    async fn find_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<ClientRecord>, AppError> {
        Self::check(&self.fail_clients, "clients")?;
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .clients
            .iter()
            .find(|c| c.tenant_id == tenant_id && c.id == client_id)
            .cloned())
    }

    async fn create_client(
        &self,
        tenant_id: Uuid,
        payload: &NewClientPayload,
    ) -> Result<ClientRecord, AppError> {
        let id = self.add_client(tenant_id, payload.full_name.trim(), payload.email.as_deref());
        let mut tables = self.tables.lock().unwrap();
        let client = tables.clients.iter_mut().find(|c| c.id == id).unwrap();
        client.phone = payload.phone.clone();
        client.birth_date = payload.birth_date;
        client.instagram = payload.instagram.clone();
        client.notes = payload.notes.clone();
        Ok(client.clone())
    }

    async fn update_client(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
        payload: &ClientUpdatePayload,
    ) -> Result<Option<ClientRecord>, AppError> {
        let mut tables = self.tables.lock().unwrap();
        let Some(client) = tables
            .clients
            .iter_mut()
            .find(|c| c.tenant_id == tenant_id && c.id == client_id)
        else {
            return Ok(None);
        };

        if let Some(name) = &payload.full_name {
            client.full_name = name.trim().to_string();
        }
        if payload.email.is_some() {
            client.email = payload.email.clone();
        }
        if payload.phone.is_some() {
            client.phone = payload.phone.clone();
        }
        if payload.birth_date.is_some() {
            client.birth_date = payload.birth_date;
        }
        if payload.instagram.is_some() {
            client.instagram = payload.instagram.clone();
        }
        if payload.notes.is_some() {
            client.notes = payload.notes.clone();
        }
        client.updated_at = Utc::now();
        Ok(Some(client.clone()))
    }

    async fn record_visit(
        &self,
        tenant_id: Uuid,
        payload: &NewVisitPayload,
    ) -> Result<VisitRecord, AppError> {
        let visit = VisitRecord {
            id: Uuid::new_v4(),
            tenant_id,
            client_id: payload.client_id,
            professional_id: payload.professional_id,
            description: payload.description.clone(),
            price: payload.price.map(|p| p.to_string()),
            performed_date: payload.performed_date.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at: Some(Utc::now()),
        };
        self.tables.lock().unwrap().visits.push(visit.clone());
        Ok(visit)
    }
}
