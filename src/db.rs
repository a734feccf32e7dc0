pub mod crm_repo;
pub use crm_repo::CrmRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod store;
pub use store::{PgStudioStore, StudioStore};

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub use memory_store::MemoryStore;
