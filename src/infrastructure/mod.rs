// Infrastructure - ID generation and caching shared by the API and the client

pub mod cache;
pub mod id_generator;

pub use cache::{CacheEntry, QueryCache};
pub use id_generator::IdGenerator;
