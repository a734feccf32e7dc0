// src/handlers/rbac.rs

use axum::{extract::Path, Json};

use crate::models::rbac::{resolve_str, CapabilitySet};

// GET /api/capabilities/{role} (Para o frontend saber o que mostrar para cada cargo)
#[utoipa::path(
    get,
    path = "/api/capabilities/{role}",
    tag = "RBAC",
    params(
        ("role" = String, Path, description = "Cargo (MASTER, ARTIST, PIERCER, RECEPTIONIST, CLIENT)")
    ),
    responses(
        (status = 200, description = "Permissões do cargo. Cargo desconhecido recebe as de CLIENT.", body = CapabilitySet)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_role_capabilities(Path(role): Path<String>) -> Json<CapabilitySet> {
    Json(resolve_str(&role))
}
