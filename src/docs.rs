// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Session ---
        handlers::session::list_my_tenants,
        handlers::session::select_tenant,
        handlers::session::get_session,
        handlers::session::sign_out,

        // --- RBAC ---
        handlers::rbac::get_role_capabilities,

        // --- Clients ---
        handlers::crm::list_clients,
        handlers::crm::get_client,
        handlers::crm::client_list_revision,
        handlers::crm::create_client,
        handlers::crm::update_client,
        handlers::crm::record_visit,
    ),
    components(
        schemas(
            // --- RBAC ---
            models::rbac::Role,
            models::rbac::CapabilitySet,

            // --- TENANCY ---
            models::tenancy::TenantMembership,
            models::tenancy::SessionSnapshot,
            handlers::session::SelectTenantPayload,

            // --- CRM ---
            models::crm::ClientRecord,
            models::crm::VisitRecord,
            models::crm::ClientMetrics,
            models::crm::ClientWithMetrics,
            models::crm::NewClientPayload,
            models::crm::ClientUpdatePayload,
            models::crm::NewVisitPayload,

            // --- Lista ---
            models::client_list::ClientFilter,
            models::client_list::ClientSort,
            models::client_list::ClientRowActions,
            models::client_list::ClientListItem,
            models::client_list::ClientListView,
            handlers::crm::ClientListRevision,
        )
    ),
    tags(
        (name = "Session", description = "Seleção de estúdio e sessão"),
        (name = "RBAC", description = "Permissões por cargo"),
        (name = "Clients", description = "Clientes, métricas e sessões de atendimento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
