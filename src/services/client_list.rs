// src/services/client_list.rs

use std::cmp::Ordering;

use crate::models::{
    client_list::{
        ClientFilter, ClientListItem, ClientListQuery, ClientListView, ClientRowActions, ClientSort,
        ListThresholds,
    },
    crm::ClientWithMetrics,
    rbac::CapabilitySet,
};

/// Monta a lista da tela de clientes: busca -> filtro -> ordenação.
///
/// As permissões só decidem as ações de cada linha; nenhum cliente some da lista
/// por causa do cargo (o escopo por estúdio já vem do store).
pub fn project(
    records: Vec<ClientWithMetrics>,
    query: &ClientListQuery,
    capabilities: &CapabilitySet,
    thresholds: &ListThresholds,
) -> ClientListView {
    let term = query.search.trim().to_lowercase();

    let mut rows: Vec<ClientWithMetrics> = records
        .into_iter()
        .filter(|r| matches_search(r, &term))
        .filter(|r| matches_filter(r, query.filter, thresholds))
        .collect();

    // sort_by é estável: empates mantêm a ordem de entrada
    rows.sort_by(|a, b| compare(a, b, query.sort));

    let actions = ClientRowActions {
        can_view_profile: capabilities.can_view_client_profile,
        can_edit: capabilities.can_edit_client,
        can_create_session: capabilities.can_create_session,
    };

    ClientListView {
        items: rows
            .into_iter()
            .map(|record| ClientListItem { record, actions })
            .collect(),
        can_add_client: capabilities.can_add_client,
        can_filter_by_professional: capabilities.can_filter_by_professional,
    }
}

fn matches_search(record: &ClientWithMetrics, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }

    let client = &record.client;
    client.full_name.to_lowercase().contains(term)
        || client
            .email
            .as_deref()
            .is_some_and(|email| email.to_lowercase().contains(term))
}

fn matches_filter(record: &ClientWithMetrics, filter: ClientFilter, thresholds: &ListThresholds) -> bool {
    match filter {
        ClientFilter::All => true,
        ClientFilter::Vip => record.metrics.total_spent > thresholds.vip_spend,
        ClientFilter::New => record.metrics.total_visits <= thresholds.new_client_max_visits,
    }
}

fn compare(a: &ClientWithMetrics, b: &ClientWithMetrics, sort: ClientSort) -> Ordering {
    match sort {
        ClientSort::Name => compare_names(&a.client.full_name, &b.client.full_name),
        ClientSort::Visits => b.metrics.total_visits.cmp(&a.metrics.total_visits),
        ClientSort::Spend => b.metrics.total_spent.cmp(&a.metrics.total_spent),
        // Quem nunca veio fica no fim
        ClientSort::Recent => match (a.metrics.last_visit, b.metrics.last_visit) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
    }
}

// Comparação "de dicionário": ignora acento e caixa, depois desempata pelo texto original.
fn compare_names(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn collation_key(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        crm::{ClientMetrics, ClientRecord},
        rbac::Role,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn row(name: &str, email: Option<&str>, visits: u32, spent: i64, last: Option<(i32, u32, u32)>) -> ClientWithMetrics {
        let now = Utc::now();
        ClientWithMetrics {
            client: ClientRecord {
                id: Uuid::new_v4(),
                tenant_id: Uuid::nil(),
                full_name: name.to_string(),
                email: email.map(str::to_string),
                phone: None,
                birth_date: None,
                instagram: None,
                notes: None,
                created_at: now,
                updated_at: now,
            },
            metrics: ClientMetrics {
                total_visits: visits,
                total_spent: Decimal::new(spent, 0),
                last_visit: last.map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()),
            },
        }
    }

    fn query(search: &str, filter: ClientFilter, sort: ClientSort) -> ClientListQuery {
        ClientListQuery {
            search: search.to_string(),
            filter,
            sort,
        }
    }

    fn names(view: &ClientListView) -> Vec<&str> {
        view.items
            .iter()
            .map(|i| i.record.client.full_name.as_str())
            .collect()
    }

    fn master() -> CapabilitySet {
        Role::Master.capabilities()
    }

    #[test]
    fn test_sort_by_spend_descending() {
        let records = vec![row("Z", None, 1, 10, None), row("A", None, 1, 50, None)];
        let view = project(
            records,
            &query("", ClientFilter::All, ClientSort::Spend),
            &master(),
            &ListThresholds::default(),
        );
        assert_eq!(names(&view), ["A", "Z"]);
    }

    #[test]
    fn test_search_then_vip_filter() {
        let records = vec![
            row("Ana", None, 3, 1000, None),
            row("Mariana", None, 8, 2400, None),
            row("Bruno", Some("ana.bruno@ink.com"), 2, 1500, None),
            row("Carlos", None, 9, 5000, None),
        ];
        let view = project(
            records,
            &query("ana", ClientFilter::Vip, ClientSort::Name),
            &master(),
            &ListThresholds::default(),
        );
        assert_eq!(names(&view), ["Bruno", "Mariana"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_empty_matches_all() {
        let records = vec![
            row("ANA PAULA", None, 0, 0, None),
            row("Pedro", Some("PEDRO@ESTUDIO.COM"), 0, 0, None),
        ];
        let thresholds = ListThresholds::default();

        let by_name = project(records.clone(), &query("ana p", ClientFilter::All, ClientSort::Name), &master(), &thresholds);
        assert_eq!(names(&by_name), ["ANA PAULA"]);

        let by_email = project(records.clone(), &query("estudio.com", ClientFilter::All, ClientSort::Name), &master(), &thresholds);
        assert_eq!(names(&by_email), ["Pedro"]);

        let blank = project(records, &query("   ", ClientFilter::All, ClientSort::Name), &master(), &thresholds);
        assert_eq!(blank.items.len(), 2);
    }

    #[test]
    fn test_new_filter_uses_visit_threshold() {
        let records = vec![
            row("Primeira vez", None, 1, 200, None),
            row("Nunca veio", None, 0, 0, None),
            row("Fiel", None, 4, 900, None),
        ];
        let view = project(
            records,
            &query("", ClientFilter::New, ClientSort::Visits),
            &master(),
            &ListThresholds::default(),
        );
        assert_eq!(names(&view), ["Primeira vez", "Nunca veio"]);
    }

    #[test]
    fn test_sort_by_name_ignores_accents_and_case() {
        let records = vec![
            row("Otávio", None, 0, 0, None),
            row("álvaro", None, 0, 0, None),
            row("Beatriz", None, 0, 0, None),
            row("Alice", None, 0, 0, None),
        ];
        let view = project(
            records,
            &query("", ClientFilter::All, ClientSort::Name),
            &master(),
            &ListThresholds::default(),
        );
        assert_eq!(names(&view), ["Alice", "álvaro", "Beatriz", "Otávio"]);
    }

    #[test]
    fn test_sort_by_recent_puts_missing_dates_last() {
        let records = vec![
            row("Sem data 1", None, 0, 0, None),
            row("Janeiro", None, 1, 0, Some((2024, 1, 10))),
            row("Sem data 2", None, 0, 0, None),
            row("Março", None, 1, 0, Some((2024, 3, 1))),
        ];
        let view = project(
            records,
            &query("", ClientFilter::All, ClientSort::Recent),
            &master(),
            &ListThresholds::default(),
        );
        assert_eq!(names(&view), ["Março", "Janeiro", "Sem data 1", "Sem data 2"]);
    }

    #[test]
    fn test_sort_by_visits_is_stable() {
        let records = vec![
            row("Primeiro", None, 2, 0, None),
            row("Top", None, 7, 0, None),
            row("Segundo", None, 2, 0, None),
        ];
        let view = project(
            records,
            &query("", ClientFilter::All, ClientSort::Visits),
            &master(),
            &ListThresholds::default(),
        );
        assert_eq!(names(&view), ["Top", "Primeiro", "Segundo"]);
    }

    #[test]
    fn test_capabilities_gate_actions_not_rows() {
        let records = vec![row("Ana", None, 1, 10, None), row("Bia", None, 1, 10, None)];
        let q = query("", ClientFilter::All, ClientSort::Name);
        let thresholds = ListThresholds::default();

        let as_client = project(records.clone(), &q, &Role::Client.capabilities(), &thresholds);
        assert_eq!(as_client.items.len(), 2);
        assert!(!as_client.can_add_client);
        assert!(as_client.items.iter().all(|i| !i.actions.can_edit && !i.actions.can_view_profile));

        let as_reception = project(records, &q, &Role::Receptionist.capabilities(), &thresholds);
        assert_eq!(as_reception.items.len(), 2);
        assert!(as_reception.can_add_client);
        assert!(as_reception.can_filter_by_professional);
        assert!(as_reception.items.iter().all(|i| i.actions.can_edit && !i.actions.can_create_session));
    }
}
