// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{CrmRepository, PgStudioStore, StudioStore, TenantRepository},
    models::client_list::ListThresholds,
    services::{
        auth::AuthService,
        crm_service::CrmService,
        invalidation::InvalidationHub,
        metrics_service::ClientMetricsAggregator,
        session_service::{SessionRegistry, TenantSelector},
    },
};

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub thresholds: ListThresholds,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = ListThresholds::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: optional_var("DB_MAX_CONNECTIONS")?.unwrap_or(5),
            thresholds: ListThresholds {
                vip_spend: optional_var::<Decimal>("VIP_SPEND_THRESHOLD")?
                    .unwrap_or(defaults.vip_spend),
                new_client_max_visits: optional_var("NEW_CLIENT_MAX_VISITS")?
                    .unwrap_or(defaults.new_client_max_visits),
            },
        })
    }
}

// Variável opcional: ausente vira None, presente mas inválida é erro de inicialização
fn optional_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{} inválida ('{}'): {}", name, raw, e)),
        Err(_) => Ok(None),
    }
}

/// Abre a pool do Postgres. Falhar aqui impede a aplicação de iniciar.
pub async fn connect_database(config: &Config) -> anyhow::Result<PgPool> {
    let db_pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;

    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
    Ok(db_pool)
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub sessions: Arc<SessionRegistry>,
    pub tenant_selector: TenantSelector,
    pub aggregator: ClientMetricsAggregator,
    pub crm_service: CrmService,
    pub invalidation: Arc<InvalidationHub>,
    pub thresholds: ListThresholds,
}

impl AppState {
    pub fn new(db_pool: PgPool, config: &Config) -> Self {
        let store: Arc<dyn StudioStore> = Arc::new(PgStudioStore::new(
            CrmRepository::new(db_pool.clone()),
            TenantRepository::new(db_pool),
        ));

        Self::with_store(
            store,
            AuthService::new(config.jwt_secret.clone()),
            config.thresholds,
        )
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(
        store: Arc<dyn StudioStore>,
        auth_service: AuthService,
        thresholds: ListThresholds,
    ) -> Self {
        let invalidation = Arc::new(InvalidationHub::new());

        Self {
            auth_service,
            sessions: Arc::new(SessionRegistry::new()),
            tenant_selector: TenantSelector::new(store.clone()),
            aggregator: ClientMetricsAggregator::new(store.clone()),
            crm_service: CrmService::new(store, invalidation.clone()),
            invalidation,
            thresholds,
        }
    }
}
