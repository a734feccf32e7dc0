// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::session::CurrentSession,
    models::{
        rbac::Capability,
        tenancy::ActiveTenant,
    },
};

/// 1. O Trait que define qual permissão o handler exige
pub trait CapabilityDef: Send + Sync + 'static {
    const CAPABILITY: Capability;
}

/// 2. O Extractor (Guardião)
///
/// Só passa com estúdio selecionado e com a permissão no cargo ativo.
/// Devolve o par (estúdio, cargo) que foi checado, para o handler usar o mesmo.
pub struct RequireCapability<T> {
    pub active: ActiveTenant,
    _marker: PhantomData<T>,
}

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;

        // Uma leitura só: estúdio e cargo do mesmo instante
        let active = session.require_tenant().await?;
        let capabilities = active.role.capabilities();

        if !capabilities.allows(T::CAPABILITY) {
            tracing::warn!(
                "Identidade {} ({}) sem permissão '{}' no estúdio {}",
                session.identity_id(),
                active.role,
                T::CAPABILITY.slug(),
                active.tenant_id
            );
            return Err(AppError::CapabilityDenied(T::CAPABILITY.slug()));
        }

        Ok(RequireCapability {
            active,
            _marker: PhantomData,
        })
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct CanViewClientProfile;
impl CapabilityDef for CanViewClientProfile {
    const CAPABILITY: Capability = Capability::ViewClientProfile;
}

pub struct CanAddClient;
impl CapabilityDef for CanAddClient {
    const CAPABILITY: Capability = Capability::AddClient;
}

pub struct CanEditClient;
impl CapabilityDef for CanEditClient {
    const CAPABILITY: Capability = Capability::EditClient;
}

pub struct CanCreateSession;
impl CapabilityDef for CanCreateSession {
    const CAPABILITY: Capability = Capability::CreateSession;
}
