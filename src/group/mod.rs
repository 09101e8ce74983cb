//! Group Membership
//!
//! Read-only membership lookup, owned by the group administration service.
//! The admission rules use it to enforce plan group exclusions.

pub mod repository;

pub use repository::{GroupMembership, GroupMembershipRepository};
