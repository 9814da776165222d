pub mod redis_store;
