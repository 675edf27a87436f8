use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Server-assigned role identifier
    RoleId
);
id_type!(
    /// Local group identifier
    GroupId
);
id_type!(
    /// Working circle identifier
    CircleId
);

/// A role as returned by the server.
///
/// Fields the client does not know about are kept in `extra` so a role can be
/// sent back in an update without dropping server-side data. Two roles are
/// equal when their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_circle_id: Option<CircleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_commitment_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_commitment_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PartialEq for Role {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Role {}

impl Role {
    /// Build a role from an input payload and the id the server assigned
    pub fn from_input(id: RoleId, input: RoleInput) -> Self {
        Self {
            id,
            name: input.name,
            description: input.description,
            local_group_id: input.local_group_id,
            working_circle_id: input.working_circle_id,
            time_commitment_min: input.time_commitment_min,
            time_commitment_max: input.time_commitment_max,
            created_at: None,
            extra: input.extra,
        }
    }

    /// The update payload for this role (everything but the id and server timestamps)
    pub fn to_input(&self) -> RoleInput {
        RoleInput {
            name: self.name.clone(),
            description: self.description.clone(),
            local_group_id: self.local_group_id,
            working_circle_id: self.working_circle_id,
            time_commitment_min: self.time_commitment_min,
            time_commitment_max: self.time_commitment_max,
            extra: self.extra.clone(),
        }
    }
}

/// Payload for creating or updating a role
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoleInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_group_id: Option<GroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_circle_id: Option<CircleId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_commitment_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_commitment_max: Option<u32>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RoleInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_local_group(mut self, id: GroupId) -> Self {
        self.local_group_id = Some(id);
        self
    }

    pub fn with_working_circle(mut self, id: CircleId) -> Self {
        self.working_circle_id = Some(id);
        self
    }

    /// Set the expected time commitment in hours
    pub fn with_time_commitment(mut self, min: u32, max: u32) -> Self {
        self.time_commitment_min = Some(min);
        self.time_commitment_max = Some(max);
        self
    }
}

/// A local group a role can belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalGroup {
    pub id: GroupId,
    pub name: String,
}

/// A working circle a role can belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingCircle {
    pub id: CircleId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_group_id: Option<GroupId>,
}

/// Inclusive time commitment range in hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeCommitmentRange {
    pub min: u32,
    pub max: u32,
}

impl TimeCommitmentRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }
}

impl Default for TimeCommitmentRange {
    fn default() -> Self {
        Self { min: 0, max: 40 }
    }
}
