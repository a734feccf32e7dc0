// src/models/crm.rs

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- CLIENTE (O Dado) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientRecord {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)] // Vem da sessão, não precisa aparecer na doc
    pub tenant_id: Uuid,

    #[schema(example = "Ana Beatriz")]
    pub full_name: String,
    #[schema(example = "ana@exemplo.com")]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    #[schema(example = "@ana.ink")]
    pub instagram: Option<String>,
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- SESSÃO (O atendimento cobrado) ---

// Preço e data vêm como texto livre do formulário antigo, por isso podem estar mal formados.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,

    // Sessões órfãs (sem cliente) ficam fora da agregação
    pub client_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,
    #[schema(example = "Fechamento de braço - sessão 2")]
    pub description: Option<String>,

    #[schema(example = "450.00")]
    pub price: Option<String>,
    #[schema(example = "2024-03-01")]
    pub performed_date: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl VisitRecord {
    /// Preço numérico. Texto ausente ou inválido conta como zero.
    pub fn parsed_price(&self) -> Decimal {
        self.price
            .as_deref()
            .and_then(parse_price)
            .unwrap_or(Decimal::ZERO)
    }

    /// Data efetiva da sessão: data de realização e, se ausente ou inválida, a data de criação.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        self.performed_date
            .as_deref()
            .and_then(parse_visit_date)
            .or(self.created_at)
    }
}

// Aceita "30", "12.50", notação científica ("1e3") e o formato brasileiro
// ("30,00", "1.234,56", com ou sem "R$").
fn parse_price(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    let raw = raw.strip_prefix("R$").map(str::trim).unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }

    if let Ok(price) = Decimal::from_str(raw) {
        return Some(price);
    }
    if let Ok(price) = Decimal::from_scientific(raw) {
        return Some(price);
    }

    // Vírgula decimal: pontos são separadores de milhar
    if raw.contains(',') {
        let normalized = raw.replace('.', "").replace(',', ".");
        return Decimal::from_str(&normalized).ok();
    }

    None
}

fn parse_visit_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }

    // Só a data: "2024-03-01" ou o formato brasileiro "01/03/2024"
    ["%Y-%m-%d", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// --- MÉTRICAS (Derivadas, nunca salvas) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientMetrics {
    #[schema(example = 3)]
    pub total_visits: u32,
    #[schema(example = 1250.5)]
    pub total_spent: Decimal,
    pub last_visit: Option<DateTime<Utc>>,
}

// Cliente + métricas (o que a lista consome)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientWithMetrics {
    #[serde(flatten)]
    pub client: ClientRecord,
    #[serde(flatten)]
    pub metrics: ClientMetrics,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewClientPayload {
    #[validate(length(min = 1, message = "O nome do cliente é obrigatório."))]
    #[schema(example = "Ana Beatriz")]
    pub full_name: String,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub instagram: Option<String>,
    pub notes: Option<String>,
}

// Edição de perfil: só os campos enviados são alterados
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientUpdatePayload {
    #[validate(length(min = 1, message = "O nome do cliente não pode ficar vazio."))]
    pub full_name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub instagram: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewVisitPayload {
    pub client_id: Option<Uuid>,
    pub professional_id: Option<Uuid>,

    #[validate(length(max = 500, message = "Descrição muito longa."))]
    pub description: Option<String>,

    #[schema(example = 450.0)]
    pub price: Option<Decimal>,
    #[schema(example = "2024-03-01")]
    pub performed_date: Option<NaiveDate>,
}
