// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::tenancy::{MembershipRow, TenantMembership};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Lista os estúdios em que a identidade é membro, com o cargo de cada vínculo.
    pub async fn list_memberships<'e, E>(
        &self,
        executor: E,
        identity_id: Uuid,
    ) -> Result<Vec<TenantMembership>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, MembershipRow>(
            r#"
            SELECT t.id AS tenant_id, t.name AS tenant_name, m.role
            FROM tenant_members m
            INNER JOIN tenants t ON t.id = m.tenant_id
            WHERE m.identity_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(identity_id)
        .fetch_all(executor)
        .await?;

        Ok(rows.into_iter().map(TenantMembership::from).collect())
    }
}
