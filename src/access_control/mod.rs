//! Access control module
//!
//! Decides whether a viewer may see another user's resource based on the
//! relationships between them.
//!
//! ## Access Model
//!
//! A resource requires an [`AccessLevel`](crate::model::AccessLevel). The
//! owner always has access, PUBLIC resources are open to everyone and PRIVATE
//! resources to nobody else. Every other level is satisfied by a role the
//! viewer holds towards the owner:
//!
//! | Level                | Qualifying roles            |
//! |----------------------|-----------------------------|
//! | `FRIENDS`            | `FRIEND`                    |
//! | `COACHES`            | `COACH`                     |
//! | `CLUB_MEMBERS`       | `CLUB_MEMBER`               |
//! | `MATCH_PARTICIPANTS` | `MATCH_PLAYER`, `MATCH_TRACKER` |
//! | `DOUBLES_PARTNERS`   | `DOUBLES_PARTNER`           |
//! | `FRIENDS_AND_COACHES`| `FRIEND`, `COACH`           |
//!
//! A check can also name `allowed_roles`, any of which grants access on its
//! own. A BLOCKED relationship in either direction denies everything except
//! the owner and PUBLIC short-circuits.
//!
//! Roles are inferred from relationship records by [`RoleResolver`] and
//! decisions are cached by [`AccessCache`].

pub mod cache;
pub mod checker;
pub mod evaluator;
pub mod patterns;
pub mod roles;
pub mod types;

pub use cache::{AccessCache, CacheKey};
pub use checker::{Checker, SharedChecker};
pub use evaluator::{CacheTtls, PolicyEvaluator};
pub use patterns::IdentifierPattern;
pub use roles::{RoleResolution, RoleResolver};
pub use types::{AccessResult, CheckConfig};
