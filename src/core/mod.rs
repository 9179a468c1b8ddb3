//! Record-store core: normalization, matching, caching, writes and auth.

pub mod audit;
pub mod auth;
pub mod cache;
pub mod columns;
pub mod matcher;
pub mod mirror;
pub mod normalize;
pub mod store;
pub mod upsert;
pub mod users;

pub use audit::AuditLog;
pub use auth::{AuthGate, PasswordVerifier, role_at_least};
pub use cache::TableCache;
pub use matcher::{KeyMatcher, RowRef};
pub use mirror::TableMirror;
pub use normalize::FieldNormalizer;
pub use store::RecordStore;
pub use upsert::{Degradation, MirrorOutcome, UpsertEngine, UpsertOutcome};
pub use users::{UserChange, UserStore};
