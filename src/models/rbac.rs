// src/models/rbac.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---
// 1. Role (O "Cargo" dentro de um estúdio)
// ---
// O cargo pertence ao vínculo (identidade, estúdio), nunca à identidade global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Master,
    Artist,
    Piercer,
    Receptionist,
    Client,
}

impl Role {
    /// Cargo mais restritivo. Usado sempre que nenhum cargo foi resolvido.
    pub const MOST_RESTRICTIVE: Role = Role::Client;

    /// Lê o cargo como vem do banco (TEXT). Retorna None para valores desconhecidos.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "MASTER" => Some(Self::Master),
            "ARTIST" => Some(Self::Artist),
            "PIERCER" => Some(Self::Piercer),
            "RECEPTIONIST" => Some(Self::Receptionist),
            "CLIENT" => Some(Self::Client),
            _ => None,
        }
    }

    /// Versão tolerante do `parse`: valor desconhecido vira o cargo mais restritivo.
    pub fn parse_or_restrictive(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::MOST_RESTRICTIVE)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Master => "MASTER",
            Self::Artist => "ARTIST",
            Self::Piercer => "PIERCER",
            Self::Receptionist => "RECEPTIONIST",
            Self::Client => "CLIENT",
        }
    }

    pub fn capabilities(&self) -> CapabilitySet {
        resolve(*self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---
// 2. CapabilitySet (As permissões resolvidas)
// ---
// Derivado do cargo, nunca persistido. É `Copy`: cada resolução é um valor novo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    pub can_view_financials: bool,
    pub can_view_all_appointments: bool,
    pub can_view_all_agenda: bool,
    pub can_view_all_sessions: bool,
    pub can_create_session: bool,
    pub can_filter_by_professional: bool,
    pub can_view_client_profile: bool,
    pub can_edit_client: bool,
    pub can_add_client: bool,
    pub can_access_marketing: bool,
    pub can_access_loyalty: bool,
    pub can_access_settings: bool,
}

/// Nome de cada permissão, para checagem individual (ex.: extractor de handlers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ViewFinancials,
    ViewAllAppointments,
    ViewAllAgenda,
    ViewAllSessions,
    CreateSession,
    FilterByProfessional,
    ViewClientProfile,
    EditClient,
    AddClient,
    AccessMarketing,
    AccessLoyalty,
    AccessSettings,
}

impl Capability {
    pub const ALL: [Capability; 12] = [
        Capability::ViewFinancials,
        Capability::ViewAllAppointments,
        Capability::ViewAllAgenda,
        Capability::ViewAllSessions,
        Capability::CreateSession,
        Capability::FilterByProfessional,
        Capability::ViewClientProfile,
        Capability::EditClient,
        Capability::AddClient,
        Capability::AccessMarketing,
        Capability::AccessLoyalty,
        Capability::AccessSettings,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Self::ViewFinancials => "can_view_financials",
            Self::ViewAllAppointments => "can_view_all_appointments",
            Self::ViewAllAgenda => "can_view_all_agenda",
            Self::ViewAllSessions => "can_view_all_sessions",
            Self::CreateSession => "can_create_session",
            Self::FilterByProfessional => "can_filter_by_professional",
            Self::ViewClientProfile => "can_view_client_profile",
            Self::EditClient => "can_edit_client",
            Self::AddClient => "can_add_client",
            Self::AccessMarketing => "can_access_marketing",
            Self::AccessLoyalty => "can_access_loyalty",
            Self::AccessSettings => "can_access_settings",
        }
    }
}

impl CapabilitySet {
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewFinancials => self.can_view_financials,
            Capability::ViewAllAppointments => self.can_view_all_appointments,
            Capability::ViewAllAgenda => self.can_view_all_agenda,
            Capability::ViewAllSessions => self.can_view_all_sessions,
            Capability::CreateSession => self.can_create_session,
            Capability::FilterByProfessional => self.can_filter_by_professional,
            Capability::ViewClientProfile => self.can_view_client_profile,
            Capability::EditClient => self.can_edit_client,
            Capability::AddClient => self.can_add_client,
            Capability::AccessMarketing => self.can_access_marketing,
            Capability::AccessLoyalty => self.can_access_loyalty,
            Capability::AccessSettings => self.can_access_settings,
        }
    }

    /// Slugs das permissões concedidas, na ordem da tabela.
    pub fn granted(&self) -> Vec<&'static str> {
        Capability::ALL
            .into_iter()
            .filter(|capability| self.allows(*capability))
            .map(|capability| capability.slug())
            .collect()
    }
}

// ---
// 3. O Resolver (Tabela estática Cargo -> Permissões)
// ---
// Um cargo novo ou uma permissão nova não compila até todas as linhas serem preenchidas.
pub fn resolve(role: Role) -> CapabilitySet {
    match role {
        Role::Master => CapabilitySet {
            can_view_financials: true,
            can_view_all_appointments: true,
            can_view_all_agenda: true,
            can_view_all_sessions: true,
            can_create_session: true,
            can_filter_by_professional: true,
            can_view_client_profile: true,
            can_edit_client: true,
            can_add_client: true,
            can_access_marketing: true,
            can_access_loyalty: true,
            can_access_settings: true,
        },
        // Tatuador e piercer só enxergam a própria agenda
        Role::Artist | Role::Piercer => CapabilitySet {
            can_view_financials: false,
            can_view_all_appointments: false,
            can_view_all_agenda: false,
            can_view_all_sessions: false,
            can_create_session: true,
            can_filter_by_professional: false,
            can_view_client_profile: true,
            can_edit_client: true,
            can_add_client: true,
            can_access_marketing: false,
            can_access_loyalty: false,
            can_access_settings: false,
        },
        Role::Receptionist => CapabilitySet {
            can_view_financials: false,
            can_view_all_appointments: true,
            can_view_all_agenda: true,
            can_view_all_sessions: false,
            can_create_session: false,
            can_filter_by_professional: true,
            can_view_client_profile: true,
            can_edit_client: true,
            can_add_client: true,
            can_access_marketing: false,
            can_access_loyalty: true,
            can_access_settings: false,
        },
        Role::Client => CapabilitySet {
            can_view_financials: false,
            can_view_all_appointments: false,
            can_view_all_agenda: false,
            can_view_all_sessions: false,
            can_create_session: false,
            can_filter_by_professional: false,
            can_view_client_profile: false,
            can_edit_client: false,
            can_add_client: false,
            can_access_marketing: false,
            can_access_loyalty: false,
            can_access_settings: false,
        },
    }
}

/// Entrada tolerante: qualquer string fora do conjunto vira o conjunto de CLIENT.
pub fn resolve_str(role: &str) -> CapabilitySet {
    resolve(Role::parse_or_restrictive(role))
}
