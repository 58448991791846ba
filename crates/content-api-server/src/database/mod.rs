pub mod pool;
pub mod schema;

pub use pool::DbPool;
pub use schema::SchemaManager;
