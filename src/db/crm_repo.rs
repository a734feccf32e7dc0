// src/db/crm_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::crm::{ClientRecord, ClientUpdatePayload, NewClientPayload, NewVisitPayload, VisitRecord},
};

const CLIENT_COLUMNS: &str = r#"
    id, tenant_id, full_name, email, phone, birth_date,
    instagram, notes, created_at, updated_at
"#;

const VISIT_COLUMNS: &str = r#"
    id, tenant_id, client_id, professional_id, description,
    price, performed_date, created_at
"#;

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    //  CLIENTES
    // =========================================================================

    /// Todos os clientes do estúdio, na ordem de cadastro
    pub async fn list_clients<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<ClientRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE tenant_id = $1 ORDER BY created_at ASC, id ASC"
        );

        let clients = sqlx::query_as::<_, ClientRecord>(&sql)
            .bind(tenant_id)
            .fetch_all(executor)
            .await?;

        Ok(clients)
    }

    pub async fn find_client<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<Option<ClientRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE tenant_id = $1 AND id = $2");

        let client = sqlx::query_as::<_, ClientRecord>(&sql)
            .bind(tenant_id)
            .bind(client_id)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    /// Cadastro (matrícula) de um cliente
    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &NewClientPayload,
    ) -> Result<ClientRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO clients (tenant_id, full_name, email, phone, birth_date, instagram, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, ClientRecord>(&sql)
            .bind(tenant_id)
            .bind(payload.full_name.trim())
            .bind(payload.email.as_deref())
            .bind(payload.phone.as_deref())
            .bind(payload.birth_date)
            .bind(payload.instagram.as_deref())
            .bind(payload.notes.as_deref())
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    /// Edição de perfil. Campos ausentes no payload mantêm o valor atual.
    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        client_id: Uuid,
        payload: &ClientUpdatePayload,
    ) -> Result<Option<ClientRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE clients SET
                full_name  = COALESCE($3, full_name),
                email      = COALESCE($4, email),
                phone      = COALESCE($5, phone),
                birth_date = COALESCE($6, birth_date),
                instagram  = COALESCE($7, instagram),
                notes      = COALESCE($8, notes),
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING {CLIENT_COLUMNS}
            "#
        );

        let client = sqlx::query_as::<_, ClientRecord>(&sql)
            .bind(tenant_id)
            .bind(client_id)
            .bind(payload.full_name.as_deref().map(str::trim))
            .bind(payload.email.as_deref())
            .bind(payload.phone.as_deref())
            .bind(payload.birth_date)
            .bind(payload.instagram.as_deref())
            .bind(payload.notes.as_deref())
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    // =========================================================================
    //  SESSÕES (ATENDIMENTOS)
    // =========================================================================

    pub async fn list_visits<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<VisitRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {VISIT_COLUMNS} FROM visits WHERE tenant_id = $1");

        let visits = sqlx::query_as::<_, VisitRecord>(&sql)
            .bind(tenant_id)
            .fetch_all(executor)
            .await?;

        Ok(visits)
    }

    /// Registra uma sessão. Preço e data são gravados no formato canônico.
    pub async fn record_visit<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &NewVisitPayload,
    ) -> Result<VisitRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO visits (tenant_id, client_id, professional_id, description, price, performed_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {VISIT_COLUMNS}
            "#
        );

        let visit = sqlx::query_as::<_, VisitRecord>(&sql)
            .bind(tenant_id)
            .bind(payload.client_id)
            .bind(payload.professional_id)
            .bind(payload.description.as_deref())
            .bind(payload.price.map(|p| p.to_string()))
            .bind(payload.performed_date.map(|d| d.format("%Y-%m-%d").to_string()))
            .fetch_one(executor)
            .await?;

        Ok(visit)
    }
}
