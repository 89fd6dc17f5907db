pub mod cache_evict_worker;

pub use cache_evict_worker::CacheEvictWorker;
