//! Driven adapters: the in-memory document store, the outbound HTTP image
//! fetcher, and the uploads-directory asset store.

pub mod assets;
pub mod fetch;
pub mod memory;

pub use self::assets::DirAssetStore;
pub use self::fetch::HttpImageFetcher;
pub use self::memory::MemoryStore;
