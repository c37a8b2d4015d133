pub mod error;
pub mod reaper;
pub mod store;
pub mod testing;

pub use error::CatalogError;
pub use reaper::{ReapReport, reap_expired, spawn_reaper};
pub use store::{MediaCatalog, MediaPage};
