pub mod changes;
pub mod config;
pub mod schema;
pub mod storage;
pub mod sync;
