// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Token inválido")]
    InvalidToken,

    // Sessão ainda no estado "sem estúdio" (UNSELECTED)
    #[error("Nenhum estúdio selecionado")]
    TenantNotSelected,

    // Logout aconteceu enquanto a seleção estava em andamento
    #[error("Sessão encerrada durante a seleção do estúdio")]
    SessionChanged,

    #[error("Sem acesso ao estúdio {0}")]
    TenantAccessDenied(Uuid),

    #[error("Permissão '{0}' necessária")]
    CapabilityDenied(&'static str),

    #[error("Cliente {0} não encontrado")]
    ClientNotFound(Uuid),

    // Banco fora do ar ou inalcançável (pool, rede, TLS)
    #[error("Armazenamento indisponível: {0}")]
    StoreUnavailable(String),

    #[error("Erro de banco de dados")]
    DatabaseError(sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// Falhas de conexão viram "indisponível" (503); o resto é erro de banco (500).
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_) => AppError::StoreUnavailable(error.to_string()),
            other => AppError::DatabaseError(other),
        }
    }
}

impl AppError {
    /// Falhas de leitura do store (categoria "store unavailable").
    pub fn is_store_failure(&self) -> bool {
        matches!(self, AppError::DatabaseError(_) | AppError::StoreUnavailable(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidToken | AppError::JwtError(_) => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::TenantNotSelected => (
                StatusCode::CONFLICT,
                "Selecione um estúdio antes de continuar.".to_string(),
            ),
            AppError::SessionChanged => (
                StatusCode::CONFLICT,
                "A sessão foi encerrada durante a troca de estúdio. Entre novamente.".to_string(),
            ),
            AppError::TenantAccessDenied(_) => (
                StatusCode::FORBIDDEN,
                "Você não é membro deste estúdio.".to_string(),
            ),
            AppError::CapabilityDenied(capability) => (
                StatusCode::FORBIDDEN,
                format!("Você precisa da permissão '{}' para realizar esta ação.", capability),
            ),
            AppError::ClientNotFound(_) => {
                (StatusCode::NOT_FOUND, "Cliente não encontrado.".to_string())
            }
            AppError::StoreUnavailable(ref reason) => {
                tracing::error!("Armazenamento indisponível: {}", reason);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Dados temporariamente indisponíveis. Tente novamente.".to_string(),
                )
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
