//! Rolelist Common
//!
//! Domain types shared by the GraphQL client, the role list store and the
//! browse binary, plus structured logging setup.

pub mod logging;
mod model;

pub use model::{
    CircleId, GroupId, LocalGroup, Role, RoleId, RoleInput, TimeCommitmentRange, WorkingCircle,
};
