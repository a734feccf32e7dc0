// src/models/client_list.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::models::crm::ClientWithMetrics;

// --- ENUMS ---

// Filtro de escolha única, aplicado depois da busca e antes da ordenação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientFilter {
    #[default]
    All,
    Vip,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientSort {
    #[default]
    Name,
    Visits,
    Spend,
    Recent,
}

// Query string de GET /api/clients
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClientListQuery {
    /// Busca por nome ou e-mail (sem diferenciar maiúsculas)
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub filter: ClientFilter,
    #[serde(default)]
    pub sort: ClientSort,
}

// Limites dos filtros VIP / NOVO. Vêm da configuração.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListThresholds {
    /// VIP: gasto total estritamente maior que isto
    pub vip_spend: Decimal,
    /// NOVO: total de sessões menor ou igual a isto
    pub new_client_max_visits: u32,
}

impl Default for ListThresholds {
    fn default() -> Self {
        Self {
            vip_spend: Decimal::new(1000, 0),
            new_client_max_visits: 1,
        }
    }
}

// --- RESPOSTA ---

// As permissões liberam ações, nunca escondem clientes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRowActions {
    pub can_view_profile: bool,
    pub can_edit: bool,
    pub can_create_session: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientListItem {
    #[serde(flatten)]
    pub record: ClientWithMetrics,
    pub actions: ClientRowActions,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientListView {
    pub items: Vec<ClientListItem>,
    pub can_add_client: bool,
    pub can_filter_by_professional: bool,
}
