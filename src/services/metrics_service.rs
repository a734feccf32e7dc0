// src/services/metrics_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StudioStore,
    models::crm::{ClientMetrics, ClientRecord, ClientWithMetrics, VisitRecord},
};

/// Agrega as sessões de cada cliente (quantidade, gasto total, última visita).
///
/// Nada é guardado entre chamadas: toda agregação lê o store de novo.
#[derive(Clone)]
pub struct ClientMetricsAggregator {
    store: Arc<dyn StudioStore>,
}

impl ClientMetricsAggregator {
    pub fn new(store: Arc<dyn StudioStore>) -> Self {
        Self { store }
    }

    pub async fn aggregate(&self, tenant_id: Uuid) -> Result<Vec<ClientWithMetrics>, AppError> {
        // 1. As duas leituras saem juntas; nenhuma depende da outra
        let (clients, visits) = tokio::join!(
            self.store.list_clients(tenant_id),
            self.store.list_visits(tenant_id),
        );

        // 2. Sem clientes não há o que mostrar: erro, nada parcial
        let clients = clients?;
        let visits = self.visits_or_empty(tenant_id, visits);

        // 3. Fold + left join
        let metrics = fold_visits(&visits);
        Ok(merge(clients, &metrics))
    }

    /// Mesma regra da lista, para a ficha de um cliente só.
    pub async fn aggregate_one(
        &self,
        tenant_id: Uuid,
        client_id: Uuid,
    ) -> Result<ClientWithMetrics, AppError> {
        let (client, visits) = tokio::join!(
            self.store.find_client(tenant_id, client_id),
            self.store.list_visits(tenant_id),
        );

        let client = client?.ok_or(AppError::ClientNotFound(client_id))?;
        let visits = self.visits_or_empty(tenant_id, visits);

        let mut metrics = fold_visits(visits.iter().filter(|v| v.client_id == Some(client_id)));
        Ok(ClientWithMetrics {
            metrics: metrics.remove(&client_id).unwrap_or_default(),
            client,
        })
    }

    // Sessões são enriquecimento: se a leitura falhar, todo mundo fica com métricas zeradas
    fn visits_or_empty(
        &self,
        tenant_id: Uuid,
        visits: Result<Vec<VisitRecord>, AppError>,
    ) -> Vec<VisitRecord> {
        visits.unwrap_or_else(|e| {
            if e.is_store_failure() {
                tracing::warn!(
                    "Falha ao ler sessões do estúdio {}: {}. Métricas zeradas.",
                    tenant_id,
                    e
                );
            } else {
                tracing::error!("Erro inesperado nas sessões do estúdio {}: {:?}", tenant_id, e);
            }
            Vec::new()
        })
    }
}

/// Dobra as sessões num mapa cliente -> métricas. Sessões sem cliente são ignoradas.
pub fn fold_visits<'a, I>(visits: I) -> HashMap<Uuid, ClientMetrics>
where
    I: IntoIterator<Item = &'a VisitRecord>,
{
    let mut metrics: HashMap<Uuid, ClientMetrics> = HashMap::new();

    for visit in visits {
        let Some(client_id) = visit.client_id else {
            continue;
        };

        let entry = metrics.entry(client_id).or_default();
        // Conta sempre, mesmo com preço inválido
        entry.total_visits += 1;
        // Soma saturada: preço legado gigante não derruba a agregação
        let price = visit.parsed_price();
        entry.total_spent = entry.total_spent.checked_add(price).unwrap_or_else(|| {
            tracing::warn!(
                "Gasto total do cliente {} estourou o limite decimal. Valor saturado.",
                client_id
            );
            if price.is_sign_negative() { Decimal::MIN } else { Decimal::MAX }
        });

        if let Some(date) = visit.effective_date() {
            entry.last_visit = Some(entry.last_visit.map_or(date, |current| current.max(date)));
        }
    }

    metrics
}

/// Left join: todo cliente sai na resposta, com ou sem sessões, na ordem de entrada.
pub fn merge(clients: Vec<ClientRecord>, metrics: &HashMap<Uuid, ClientMetrics>) -> Vec<ClientWithMetrics> {
    clients
        .into_iter()
        .map(|client| ClientWithMetrics {
            metrics: metrics.get(&client.id).copied().unwrap_or_default(),
            client,
        })
        .collect()
}
