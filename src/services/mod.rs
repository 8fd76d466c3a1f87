// Service exports
pub mod cache;
pub mod groups;
pub mod identity;
pub mod matching;
pub mod memory;
pub mod postgres;
pub mod profiles;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager, CacheStats};
pub use groups::GroupService;
pub use identity::{Claims, IdentityResolver, JwtVerifier, RemoteIdentityClient};
pub use matching::{LikeOutcome, MatchService};
pub use memory::{MemoryStore, MemoryTx};
pub use postgres::{PgStore, PgTx};
pub use profiles::ProfileService;
pub use store::{pair_lock_key, RecordStore, StoreError, StoreTx};
