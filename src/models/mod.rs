pub mod audit;
pub mod identity;
pub mod record;
pub mod user;
pub mod value;

pub use audit::{AuditAction, AuditEntry};
pub use identity::{Identity, IdentityKey};
pub use record::{Record, TableSnapshot};
pub use user::{Role, UserRecord};
pub use value::FieldValue;
