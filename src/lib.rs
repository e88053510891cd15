//! CourtIQ relationship-based access control
//!
//! Grants or denies a viewer's access to another user's resources based on
//! the relationships between them, and guards operations with declarative
//! relationship conditions.
//!
//! ## Features
//!
//! - **Policy evaluation** with owner/PUBLIC/PRIVATE short-circuits, BLOCKED
//!   relationship denial and role inference over relationship records
//! - **Decision cache** with per-outcome TTLs and per-identity invalidation
//! - **Guards** compiling role, existence and non-existence conditions into
//!   relationship store queries
//! - **Flexible configuration** via TOML files and environment variables
//!
//! ## Example Configuration
//!
//! ```toml
//! [cache]
//! max_entries = 10000
//! ttl_secs = 300
//!
//! [identifiers]
//! pattern = "^[0-9a-f]{24}$"      # Document ids
//!
//! [guards.accept_friend_request.roles]
//! require_receiver = true
//!
//! [guards.accept_friend_request.existence]
//! relationship_type = "FRIENDSHIP"
//! relationship_status = "PENDING"
//! ```

pub mod access_control;
pub mod auth;
pub mod config;
pub mod error;
pub mod filter;
pub mod guard;
pub mod model;
pub mod request;
pub mod store;

// Re-export main types
pub use access_control::{AccessResult, CheckConfig, Checker, PolicyEvaluator};
pub use config::{AppConfig, load_config};
pub use error::{AccessError, AppError, Result};
pub use guard::{ConditionSpec, Guard};
pub use store::{MemoryRelationshipStore, RelationshipStore};
