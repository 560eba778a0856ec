//! Statement interpretation: fingerprinting and the cache of lowered,
//! rendered statements shared across executions.

mod cache;
mod fingerprint;


// re-exports
pub use cache::{CacheStats, Interpretation, InterpretationCache};
pub use fingerprint::{StatementFingerprint, fingerprint};
