pub mod enums;
pub mod models;
pub mod schema;
pub mod services;
pub mod store;

#[cfg(test)]
pub mod memory_store;
#[cfg(test)]
pub mod test_support;

pub use store::{CatalogStore, PgCatalogStore};
