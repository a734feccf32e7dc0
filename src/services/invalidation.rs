// src/services/invalidation.rs

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use uuid::Uuid;

/// Sinal de "a lista de clientes mudou", separado por estúdio.
///
/// Cada estúdio tem um canal `watch` com um número de revisão. Escritas
/// incrementam a revisão do próprio estúdio; quem mostra a lista assina o
/// estúdio que está vendo e reagrega quando a revisão muda.
#[derive(Debug, Default)]
pub struct InvalidationHub {
    channels: Mutex<HashMap<Uuid, watch::Sender<u64>>>,
}

impl InvalidationHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, tenant_id: Uuid) -> watch::Receiver<u64> {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels
            .entry(tenant_id)
            .or_insert_with(|| watch::channel(0).0)
            .subscribe()
    }

    pub fn invalidate(&self, tenant_id: Uuid) {
        let mut channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        let sender = channels
            .entry(tenant_id)
            .or_insert_with(|| watch::channel(0).0);
        sender.send_modify(|revision| *revision += 1);
        tracing::debug!("Lista de clientes do estúdio {} invalidada (rev {})", tenant_id, *sender.borrow());
    }

    /// Long-poll: devolve assim que a revisão do estúdio for diferente de `after`,
    /// ou a revisão atual quando `max_wait` esgotar.
    pub async fn wait_for_change(&self, tenant_id: Uuid, after: u64, max_wait: Duration) -> u64 {
        let mut rx = self.subscribe(tenant_id);

        let waiting = async {
            while *rx.borrow_and_update() == after {
                if rx.changed().await.is_err() {
                    break;
                }
            }
        };
        if tokio::time::timeout(max_wait, waiting).await.is_err() {
            tracing::debug!("Long-poll do estúdio {} expirou na rev {}", tenant_id, after);
        }

        let revision = *rx.borrow();
        revision
    }

    pub fn revision(&self, tenant_id: Uuid) -> u64 {
        let channels = self.channels.lock().unwrap_or_else(PoisonError::into_inner);
        channels.get(&tenant_id).map(|s| *s.borrow()).unwrap_or(0)
    }
}
