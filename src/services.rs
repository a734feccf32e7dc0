pub mod auth;
pub mod client_list;
pub mod crm_service;
pub mod invalidation;
pub mod metrics_service;
pub mod session_service;
