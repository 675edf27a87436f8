//! In-memory role service for tests and offline use

use crate::error::{Error, Result};
use crate::service::{GroupService, PageQuery, RoleService};
use async_trait::async_trait;
use parking_lot::Mutex;
use rl_common::{LocalGroup, Role, RoleId, RoleInput, WorkingCircle};
use std::collections::VecDeque;
use std::time::Duration;

/// A request the service received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create(RoleInput),
    Update(RoleId),
    Delete(RoleId),
    QueryPage(PageQuery),
    QueryAllIds,
    LocalGroups,
    WorkingCircles,
}

#[derive(Debug, Default)]
struct Inner {
    /// Newest first, matching the page query's ordering
    roles: Vec<Role>,
    next_id: i64,
    local_groups: Vec<LocalGroup>,
    working_circles: Vec<WorkingCircle>,
    calls: Vec<Call>,
    failures: VecDeque<Failure>,
    latency: Option<Duration>,
}

#[derive(Debug)]
struct Failure {
    /// `None` fails whichever call comes next
    matcher: Option<fn(&Call) -> bool>,
    message: String,
}

/// Role and group service backed by vectors.
///
/// Filtering follows SQL semantics: a role with no local group never matches
/// a local group filter, and so on.
#[derive(Debug, Default)]
pub struct InMemoryService {
    inner: Mutex<Inner>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_groups(self, local_groups: Vec<LocalGroup>, working_circles: Vec<WorkingCircle>) -> Self {
        {
            let mut inner = self.inner.lock();
            inner.local_groups = local_groups;
            inner.working_circles = working_circles;
        }
        self
    }

    /// Store a role directly, bypassing the call log
    pub fn seed(&self, input: RoleInput) -> Role {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let role = Role::from_input(RoleId(inner.next_id), input);
        inner.roles.insert(0, role.clone());
        role
    }

    /// Make the next call fail with a server error
    pub fn fail_next(&self, message: impl Into<String>) {
        self.inner.lock().failures.push_back(Failure {
            matcher: None,
            message: message.into(),
        });
    }

    /// Make the next call accepted by `matcher` fail with a server error
    pub fn fail_next_matching(&self, matcher: fn(&Call) -> bool, message: impl Into<String>) {
        self.inner.lock().failures.push_back(Failure {
            matcher: Some(matcher),
            message: message.into(),
        });
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().latency = Some(latency);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().calls.clone()
    }

    pub fn page_queries(&self) -> Vec<PageQuery> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::QueryPage(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.inner.lock().roles.clone()
    }

    async fn begin(&self, call: Call) -> Result<()> {
        let (latency, failure) = {
            let mut inner = self.inner.lock();
            let failure = inner
                .failures
                .iter()
                .position(|f| f.matcher.map_or(true, |matcher| matcher(&call)))
                .and_then(|index| inner.failures.remove(index))
                .map(|f| f.message);
            inner.calls.push(call);
            (inner.latency, failure)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        match failure {
            Some(message) => Err(Error::Server(message)),
            None => Ok(()),
        }
    }
}

fn matches(role: &Role, query: &PageQuery) -> bool {
    let in_group = role
        .local_group_id
        .is_some_and(|id| query.local_group_ids.contains(&id));
    let in_circle = role
        .working_circle_id
        .is_some_and(|id| query.working_circle_ids.contains(&id));
    let min_ok = role
        .time_commitment_min
        .is_some_and(|min| min >= query.time_commitment_min);
    let max_ok = role
        .time_commitment_max
        .is_some_and(|max| max <= query.time_commitment_max);

    in_group && in_circle && min_ok && max_ok && ilike(&query.search, &role.name)
}

/// Case-insensitive `LIKE` with `%` wildcards
fn ilike(pattern: &str, value: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let value = value.to_lowercase();
    let parts: Vec<&str> = pattern.split('%').collect();

    let (first, rest) = match parts.split_first() {
        Some(split) => split,
        None => return value.is_empty(),
    };
    if !value.starts_with(first) {
        return false;
    }
    if rest.is_empty() {
        return value == *first;
    }

    let mut remaining = &value[first.len()..];
    let (last, middle) = match rest.split_last() {
        Some(split) => split,
        None => return true,
    };
    for part in middle {
        match remaining.find(part) {
            Some(pos) => remaining = &remaining[pos + part.len()..],
            None => return false,
        }
    }
    remaining.ends_with(last)
}

#[async_trait]
impl RoleService for InMemoryService {
    async fn create(&self, input: &RoleInput) -> Result<Role> {
        self.begin(Call::Create(input.clone())).await?;
        Ok(self.seed(input.clone()))
    }

    async fn update(&self, id: RoleId, input: &RoleInput) -> Result<Role> {
        self.begin(Call::Update(id)).await?;

        let mut inner = self.inner.lock();
        let role = inner
            .roles
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("role {}", id)))?;

        let created_at = role.created_at;
        *role = Role::from_input(id, input.clone());
        role.created_at = created_at;
        Ok(role.clone())
    }

    async fn delete(&self, id: RoleId) -> Result<()> {
        self.begin(Call::Delete(id)).await?;
        self.inner.lock().roles.retain(|r| r.id != id);
        Ok(())
    }

    async fn query_page(&self, query: &PageQuery) -> Result<Vec<Role>> {
        self.begin(Call::QueryPage(query.clone())).await?;

        let inner = self.inner.lock();
        Ok(inner
            .roles
            .iter()
            .filter(|role| matches(role, query))
            .skip(query.offset as usize)
            .take(query.limit as usize)
            .cloned()
            .collect())
    }

    async fn query_all_ids(&self) -> Result<Vec<RoleId>> {
        self.begin(Call::QueryAllIds).await?;
        Ok(self.inner.lock().roles.iter().map(|r| r.id).collect())
    }
}

#[async_trait]
impl GroupService for InMemoryService {
    async fn local_groups(&self) -> Result<Vec<LocalGroup>> {
        self.begin(Call::LocalGroups).await?;
        Ok(self.inner.lock().local_groups.clone())
    }

    async fn working_circles(&self) -> Result<Vec<WorkingCircle>> {
        self.begin(Call::WorkingCircles).await?;
        Ok(self.inner.lock().working_circles.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_common::{CircleId, GroupId};

    fn query(search: &str) -> PageQuery {
        PageQuery {
            limit: 10,
            offset: 0,
            local_group_ids: vec![GroupId(1)],
            working_circle_ids: vec![CircleId(1)],
            time_commitment_min: 0,
            time_commitment_max: 40,
            search: PageQuery::search_pattern(search),
        }
    }

    fn role_input(name: &str) -> RoleInput {
        RoleInput::new(name)
            .with_local_group(GroupId(1))
            .with_working_circle(CircleId(1))
            .with_time_commitment(2, 8)
    }

    #[test]
    fn test_ilike() {
        assert!(ilike("%%", "anything"));
        assert!(ilike("%%", ""));
        assert!(ilike("%gard%", "Community Gardener"));
        assert!(ilike("com%", "Community"));
        assert!(ilike("%ty", "Community"));
        assert!(ilike("c%m%y", "Community"));
        assert!(!ilike("%xyz%", "Community"));
        assert!(!ilike("exact", "exactly"));
        assert!(ilike("exact", "EXACT"));
    }

    #[tokio::test]
    async fn test_query_page_filters_and_orders_newest_first() {
        let service = InMemoryService::new();
        service.seed(role_input("Gardener"));
        service.seed(role_input("Treasurer"));
        service.seed(RoleInput::new("Ungrouped Gardener"));

        let roles = service.query_page(&query("garden")).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Gardener");

        let roles = service.query_page(&query("")).await.unwrap();
        let names: Vec<_> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Treasurer", "Gardener"]);
    }

    #[tokio::test]
    async fn test_pagination_offsets() {
        let service = InMemoryService::new();
        for i in 0..5 {
            service.seed(role_input(&format!("Role {}", i)));
        }

        let mut q = query("");
        q.limit = 2;
        q.offset = 4;
        let roles = service.query_page(&q).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert_eq!(roles[0].name, "Role 0");
    }

    #[tokio::test]
    async fn test_fail_next_fails_once() {
        let service = InMemoryService::new();
        service.fail_next("down");

        assert!(matches!(service.query_all_ids().await, Err(Error::Server(_))));
        assert!(service.query_all_ids().await.is_ok());
        assert_eq!(service.calls(), vec![Call::QueryAllIds, Call::QueryAllIds]);
    }

    #[tokio::test]
    async fn test_fail_next_matching_skips_other_calls() {
        let service = InMemoryService::new();
        service.fail_next_matching(|call| matches!(call, Call::QueryAllIds), "count down");

        assert!(service.query_page(&query("")).await.is_ok());
        assert!(matches!(service.query_all_ids().await, Err(Error::Server(msg)) if msg == "count down"));
        assert!(service.query_all_ids().await.is_ok());
    }

    #[tokio::test]
    async fn test_update_missing_role_is_not_found() {
        let service = InMemoryService::new();
        let result = service.update(RoleId(99), &RoleInput::new("Ghost")).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
