// src/models/tenancy.rs

use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::rbac::{CapabilitySet, Role};

// ---
// 1. TenantMembership (O vínculo Identidade-Estúdio)
// ---
// É daqui que sai o cargo da sessão. O usuário escolhe o estúdio, nunca o cargo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantMembership {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub tenant_id: Uuid,
    #[schema(example = "Estúdio Agulha de Ouro")]
    pub tenant_name: String,
    pub role: Role,
}

// Linha crua do banco: o cargo é TEXT e pode vir com valor desconhecido.
#[derive(Debug, FromRow)]
pub struct MembershipRow {
    pub tenant_id: Uuid,
    pub tenant_name: String,
    pub role: String,
}

impl From<MembershipRow> for TenantMembership {
    fn from(row: MembershipRow) -> Self {
        let role = Role::parse(&row.role).unwrap_or_else(|| {
            tracing::warn!(
                "Cargo desconhecido '{}' no estúdio {}, usando {}",
                row.role,
                row.tenant_id,
                Role::MOST_RESTRICTIVE
            );
            Role::MOST_RESTRICTIVE
        });

        Self {
            tenant_id: row.tenant_id,
            tenant_name: row.tenant_name,
            role,
        }
    }
}

// ---
// 2. ActiveTenant (O par estúdio + cargo)
// ---
// Os dois campos andam sempre juntos: não existe estúdio sem cargo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTenant {
    pub tenant_id: Uuid,
    pub role: Role,
}

// ---
// 3. SessionSnapshot (O que a API devolve em GET /api/session)
// ---
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub identity_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub role: Option<Role>,
    pub capabilities: CapabilitySet,
}

impl SessionSnapshot {
    pub fn new(identity_id: Uuid, active: Option<ActiveTenant>) -> Self {
        let role = active.map(|a| a.role);
        Self {
            identity_id,
            tenant_id: active.map(|a| a.tenant_id),
            role,
            capabilities: role.unwrap_or(Role::MOST_RESTRICTIVE).capabilities(),
        }
    }
}
