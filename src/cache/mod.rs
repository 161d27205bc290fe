//! Cache module
//!
//! Key/value storage with expiry backing the session store: Redis in
//! production, an in-process map when no Redis URL is configured.

pub mod in_memory;
pub mod redis;

pub use self::in_memory::InMemoryCache;
pub use self::redis::RedisCache;
