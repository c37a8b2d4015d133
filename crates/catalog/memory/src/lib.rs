mod store;

pub use store::MemoryMediaCatalog;
