pub mod cache;
pub mod lookup;
pub mod pool;
pub mod preprocess;

pub use cache::ResultCache;
pub use lookup::{Lookup, LookupError, LookupStats, StatsSnapshot, ThrottleGate};
pub use pool::WorkerPool;
