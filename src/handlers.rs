pub mod crm;
pub mod rbac;
pub mod session;
