//! Local groups and working circles the role list filters by

use async_trait::async_trait;
use parking_lot::RwLock;
use rl_client::{GroupService, Result};
use rl_common::{CircleId, GroupId, LocalGroup, WorkingCircle};
use std::sync::Arc;
use tracing::info;

/// Read access to the group collections plus a way to (re)load them
#[async_trait]
pub trait GroupsProvider: Send + Sync {
    fn local_groups(&self) -> Vec<LocalGroup>;

    fn working_circles(&self) -> Vec<WorkingCircle>;

    fn local_group_ids(&self) -> Vec<GroupId> {
        self.local_groups().into_iter().map(|g| g.id).collect()
    }

    fn working_circle_ids(&self) -> Vec<CircleId> {
        self.working_circles().into_iter().map(|c| c.id).collect()
    }

    /// Both collections are populated
    fn is_loaded(&self) -> bool {
        !self.local_groups().is_empty() && !self.working_circles().is_empty()
    }

    async fn load_groups(&self) -> Result<()>;
}

#[derive(Debug, Default)]
struct GroupsState {
    local_groups: Vec<LocalGroup>,
    working_circles: Vec<WorkingCircle>,
}

/// Caches both collections as fetched from a [`GroupService`]
pub struct GroupsStore {
    service: Arc<dyn GroupService>,
    state: RwLock<GroupsState>,
}

impl GroupsStore {
    pub fn new(service: Arc<dyn GroupService>) -> Self {
        Self {
            service,
            state: RwLock::new(GroupsState::default()),
        }
    }
}

#[async_trait]
impl GroupsProvider for GroupsStore {
    fn local_groups(&self) -> Vec<LocalGroup> {
        self.state.read().local_groups.clone()
    }

    fn working_circles(&self) -> Vec<WorkingCircle> {
        self.state.read().working_circles.clone()
    }

    fn is_loaded(&self) -> bool {
        let state = self.state.read();
        !state.local_groups.is_empty() && !state.working_circles.is_empty()
    }

    async fn load_groups(&self) -> Result<()> {
        let local_groups = self.service.local_groups().await?;
        let working_circles = self.service.working_circles().await?;

        info!(
            local_groups = local_groups.len(),
            working_circles = working_circles.len(),
            "Loaded groups"
        );

        let mut state = self.state.write();
        state.local_groups = local_groups;
        state.working_circles = working_circles;
        Ok(())
    }
}
