// Service exports
pub mod cache;
pub mod campus;
pub mod postgres;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use campus::{CampusClient, CampusError};
pub use postgres::{InteractionCounts, InteractionKind, PostgresClient, PostgresError};
