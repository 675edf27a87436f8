//! Role list filters

use crate::groups::GroupsProvider;
use rl_client::PageQuery;
use rl_common::{CircleId, GroupId, TimeCommitmentRange};
use serde_json::Value;
use thiserror::Error;

/// Filters selected in the role list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleFilters {
    /// Free text matched against role names
    pub search: String,
    /// Empty means every local group
    pub local_groups: Vec<GroupId>,
    /// Empty means every working circle
    pub working_circles: Vec<CircleId>,
    pub time_commitment: TimeCommitmentRange,
}

impl RoleFilters {
    /// Filters that match everything within `time_commitment`
    pub fn with_time_commitment(time_commitment: TimeCommitmentRange) -> Self {
        Self {
            search: String::new(),
            local_groups: Vec::new(),
            working_circles: Vec::new(),
            time_commitment,
        }
    }

    pub fn apply(&mut self, change: FilterChange) {
        match change {
            FilterChange::Search(search) => self.search = search,
            FilterChange::LocalGroups(ids) => self.local_groups = ids,
            FilterChange::WorkingCircles(ids) => self.working_circles = ids,
            FilterChange::TimeCommitment(range) => self.time_commitment = range,
        }
    }

    /// Variables for the page at `offset`, with empty group and circle
    /// selections widened to every known id
    pub fn to_page_query(
        &self,
        limit: u32,
        offset: u32,
        groups: &dyn GroupsProvider,
    ) -> PageQuery {
        let local_group_ids = if self.local_groups.is_empty() {
            groups.local_group_ids()
        } else {
            self.local_groups.clone()
        };
        let working_circle_ids = if self.working_circles.is_empty() {
            groups.working_circle_ids()
        } else {
            self.working_circles.clone()
        };

        PageQuery {
            limit,
            offset,
            local_group_ids,
            working_circle_ids,
            time_commitment_min: self.time_commitment.min,
            time_commitment_max: self.time_commitment.max,
            search: PageQuery::search_pattern(&self.search),
        }
    }
}

/// A single filter update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Search(String),
    LocalGroups(Vec<GroupId>),
    WorkingCircles(Vec<CircleId>),
    TimeCommitment(TimeCommitmentRange),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Unknown filter: {0}")]
    UnknownFilter(String),

    #[error("Invalid value for filter {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

impl FilterChange {
    pub fn name(&self) -> &'static str {
        match self {
            FilterChange::Search(_) => "search",
            FilterChange::LocalGroups(_) => "localGroups",
            FilterChange::WorkingCircles(_) => "workingCircles",
            FilterChange::TimeCommitment(_) => "timeCommitment",
        }
    }

    /// Build a change from a filter name and a JSON value, as sent by a UI.
    ///
    /// Names are accepted in camelCase or snake_case. The time commitment is a
    /// `[min, max]` pair.
    pub fn parse(name: &str, value: Value) -> Result<Self, FilterError> {
        match name {
            "search" => match value {
                Value::String(search) => Ok(FilterChange::Search(search)),
                Value::Null => Ok(FilterChange::Search(String::new())),
                other => Err(invalid("search", format!("expected a string, got {}", other))),
            },
            "localGroups" | "local_groups" => {
                let ids = parse_ids("localGroups", value)?;
                Ok(FilterChange::LocalGroups(ids.into_iter().map(GroupId).collect()))
            }
            "workingCircles" | "working_circles" => {
                let ids = parse_ids("workingCircles", value)?;
                Ok(FilterChange::WorkingCircles(ids.into_iter().map(CircleId).collect()))
            }
            "timeCommitment" | "time_commitment" => {
                let bounds: Vec<u32> = serde_json::from_value(value)
                    .map_err(|e| invalid("timeCommitment", e.to_string()))?;
                match bounds.as_slice() {
                    [min, max] if min <= max => Ok(FilterChange::TimeCommitment(
                        TimeCommitmentRange::new(*min, *max),
                    )),
                    [min, max] => Err(invalid(
                        "timeCommitment",
                        format!("min {} exceeds max {}", min, max),
                    )),
                    _ => Err(invalid("timeCommitment", "expected [min, max]".to_string())),
                }
            }
            other => Err(FilterError::UnknownFilter(other.to_string())),
        }
    }
}

fn invalid(name: &'static str, reason: String) -> FilterError {
    FilterError::InvalidValue { name, reason }
}

fn parse_ids(name: &'static str, value: Value) -> Result<Vec<i64>, FilterError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value).map_err(|e| invalid(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rl_common::{LocalGroup, WorkingCircle};
    use serde_json::json;

    struct FixedGroups;

    #[async_trait]
    impl GroupsProvider for FixedGroups {
        fn local_groups(&self) -> Vec<LocalGroup> {
            vec![
                LocalGroup { id: GroupId(1), name: "Berlin".into() },
                LocalGroup { id: GroupId(2), name: "Hamburg".into() },
            ]
        }

        fn working_circles(&self) -> Vec<WorkingCircle> {
            vec![WorkingCircle { id: CircleId(7), name: "Finance".into(), local_group_id: None }]
        }

        async fn load_groups(&self) -> rl_client::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_empty_selection_widens_to_all_ids() {
        let filters = RoleFilters::with_time_commitment(TimeCommitmentRange::new(1, 10));
        let query = filters.to_page_query(20, 40, &FixedGroups);

        assert_eq!(query.local_group_ids, vec![GroupId(1), GroupId(2)]);
        assert_eq!(query.working_circle_ids, vec![CircleId(7)]);
        assert_eq!(query.offset, 40);
        assert_eq!(query.time_commitment_min, 1);
        assert_eq!(query.time_commitment_max, 10);
        assert_eq!(query.search, "%%");
    }

    #[test]
    fn test_explicit_selection_is_kept() {
        let mut filters = RoleFilters::with_time_commitment(TimeCommitmentRange::default());
        filters.apply(FilterChange::LocalGroups(vec![GroupId(2)]));
        filters.apply(FilterChange::Search("treasurer".into()));

        let query = filters.to_page_query(20, 0, &FixedGroups);
        assert_eq!(query.local_group_ids, vec![GroupId(2)]);
        assert_eq!(query.working_circle_ids, vec![CircleId(7)]);
        assert_eq!(query.search, "%treasurer%");
    }

    #[test]
    fn test_parse_filter_changes() {
        assert_eq!(
            FilterChange::parse("search", json!("garden")).unwrap(),
            FilterChange::Search("garden".into())
        );
        assert_eq!(
            FilterChange::parse("localGroups", json!([1, 2])).unwrap(),
            FilterChange::LocalGroups(vec![GroupId(1), GroupId(2)])
        );
        assert_eq!(
            FilterChange::parse("working_circles", json!(null)).unwrap(),
            FilterChange::WorkingCircles(Vec::new())
        );
        assert_eq!(
            FilterChange::parse("timeCommitment", json!([2, 8])).unwrap(),
            FilterChange::TimeCommitment(TimeCommitmentRange::new(2, 8))
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(
            FilterChange::parse("colour", json!("red")),
            Err(FilterError::UnknownFilter("colour".into()))
        );
        assert!(matches!(
            FilterChange::parse("timeCommitment", json!([8, 2])),
            Err(FilterError::InvalidValue { name: "timeCommitment", .. })
        ));
        assert!(matches!(
            FilterChange::parse("timeCommitment", json!([1])),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            FilterChange::parse("localGroups", json!(["x"])),
            Err(FilterError::InvalidValue { .. })
        ));
        assert!(matches!(
            FilterChange::parse("search", json!(5)),
            Err(FilterError::InvalidValue { .. })
        ));
    }
}
