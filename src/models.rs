pub mod auth;
pub mod client_list;
pub mod crm;
pub mod rbac;
pub mod tenancy;
