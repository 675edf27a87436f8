//! Role list store

use crate::defaults::DefaultsProvider;
use crate::filter::{FilterChange, RoleFilters};
use crate::groups::GroupsProvider;
use crate::scroll::ScrollController;
use crate::state::RoleListState;
use crate::throttle::Throttle;
use rl_client::{Result, RoleService};
use rl_common::{Role, RoleId, RoleInput};
use rl_config::StoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::field::Empty;
use tracing::{debug, error, info, instrument, warn, Span};

/// Tunables for [`RoleListStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    /// Roles fetched per page
    pub page_limit: u32,
    /// Minimum spacing between page loads
    pub throttle_interval: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            page_limit: 20,
            throttle_interval: Duration::from_millis(500),
        }
    }
}

impl StoreOptions {
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            page_limit: config.page_limit,
            throttle_interval: config.throttle_interval(),
        }
    }
}

/// What a call to [`RoleListStore::load_page`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    /// Rows were stored; `complete` when the page came back short
    Loaded { rows: usize, complete: bool },
    /// The page was empty
    Exhausted,
    /// The list was reset while the page was in flight; the rows were dropped
    Stale,
    /// A later call took this call's slot
    Superseded,
}

/// Paginated, filterable list of roles kept in step with the role service.
///
/// Mutations patch the local list with the server's canonical copy instead of
/// refetching. Page loads are throttled and never run concurrently.
pub struct RoleListStore {
    service: Arc<dyn RoleService>,
    groups: Arc<dyn GroupsProvider>,
    defaults: Arc<dyn DefaultsProvider>,
    state: watch::Sender<RoleListState>,
    throttle: Throttle,
}

impl RoleListStore {
    pub fn new(
        service: Arc<dyn RoleService>,
        groups: Arc<dyn GroupsProvider>,
        defaults: Arc<dyn DefaultsProvider>,
    ) -> Self {
        Self::with_options(service, groups, defaults, StoreOptions::default())
    }

    pub fn with_options(
        service: Arc<dyn RoleService>,
        groups: Arc<dyn GroupsProvider>,
        defaults: Arc<dyn DefaultsProvider>,
        options: StoreOptions,
    ) -> Self {
        let filters = RoleFilters::with_time_commitment(defaults.time_commitment_range());
        let (state, _) = watch::channel(RoleListState::new(options.page_limit, filters));

        Self {
            service,
            groups,
            defaults,
            state,
            throttle: Throttle::new(options.throttle_interval),
        }
    }

    /// Create a role and put the server's copy at the top of the list.
    ///
    /// A missing role is logged and ignored.
    #[instrument(skip_all, name = "create_role")]
    pub async fn create(&self, role: Option<RoleInput>) -> Result<Option<Role>> {
        let Some(input) = role else {
            error!("New role not provided");
            return Ok(None);
        };

        let created = self.service.create(&input).await?;
        info!(role_id = %created.id, name = %created.name, "Role created");

        self.state.send_modify(|state| state.add_role(created.clone()));
        Ok(Some(created))
    }

    /// Save `role` and replace the loaded entry with the server's copy
    #[instrument(skip_all, name = "update_role", fields(role_id = %role.id))]
    pub async fn update(&self, role: Role) -> Result<Role> {
        let updated = self.service.update(role.id, &role.to_input()).await?;

        let replaced = self
            .state
            .send_if_modified(|state| state.edit_role(updated.clone()));
        if replaced {
            debug!("Role updated");
        } else {
            warn!("Updated role is not in the loaded list");
        }

        Ok(updated)
    }

    /// Delete a role. Returns whether it was in the loaded list.
    ///
    /// The count only drops when a loaded entry was removed.
    #[instrument(skip(self), name = "delete_role")]
    pub async fn delete(&self, role_id: RoleId) -> Result<bool> {
        self.service.delete(role_id).await?;

        let removed = self.state.send_if_modified(|state| state.delete_role(role_id));
        if removed {
            debug!("Role deleted");
        } else {
            warn!("Deleted role is not in the loaded list");
        }

        Ok(removed)
    }

    /// Fetch the next page for the current filters.
    ///
    /// Calls made within one throttle window collapse into a single fetch by
    /// the latest caller; the others return [`PageOutcome::Superseded`].
    pub async fn load_page(&self, scroll: &dyn ScrollController) -> Result<PageOutcome> {
        match self.throttle.run(|| self.load_page_now(scroll)).await {
            Some(result) => result,
            None => Ok(PageOutcome::Superseded),
        }
    }

    #[instrument(skip_all, name = "load_page", fields(offset = Empty, limit = Empty))]
    async fn load_page_now(&self, scroll: &dyn ScrollController) -> Result<PageOutcome> {
        let _loading = LoadingGuard::start(&self.state);
        {
            let state = self.state.borrow();
            let span = Span::current();
            span.record("offset", state.pagination_offset);
            span.record("limit", state.pagination_limit);
        }

        if !self.groups.is_loaded() {
            debug!("Groups not loaded yet, loading");
            self.groups.load_groups().await?;
        }

        let (query, epoch) = {
            let state = self.state.borrow();
            let query = state.selected_filters.to_page_query(
                state.pagination_limit,
                state.pagination_offset,
                self.groups.as_ref(),
            );
            (query, state.reset_epoch)
        };
        debug!(search = %query.search, "Querying roles");

        let roles = self.service.query_page(&query).await?;
        let rows = roles.len();

        let applied = self.state.send_if_modified(|state| {
            if state.reset_epoch != epoch {
                return false;
            }
            if state.is_new_query() {
                state.set_roles(roles);
            } else {
                state.add_roles(roles);
            }
            true
        });
        if !applied {
            info!(rows, "Role list was reset during load, dropping page");
            return Ok(PageOutcome::Stale);
        }

        let num_roles = self.service.query_all_ids().await?.len();
        self.state.send_modify(|state| state.set_roles_count(num_roles));

        if rows == 0 {
            scroll.complete();
            return Ok(PageOutcome::Exhausted);
        }

        let advanced = self.state.send_if_modified(|state| {
            if state.reset_epoch != epoch {
                return false;
            }
            state.next_pagination();
            true
        });
        if !advanced {
            info!(rows, "Role list was reset during count, not advancing");
            return Ok(PageOutcome::Stale);
        }

        scroll.loaded();
        let complete = rows < query.limit as usize;
        if complete {
            scroll.complete();
        }

        debug!(rows, num_roles, complete, "Page loaded");
        Ok(PageOutcome::Loaded { rows, complete })
    }

    /// Change one filter and reset the list for a fresh query
    pub fn set_filter(&self, change: FilterChange) {
        debug!(filter = change.name(), "Filter changed");
        self.state.send_modify(|state| {
            state.set_filter(change);
            state.reload();
        });
    }

    /// Reset every filter to its default and the list for a fresh query
    pub fn set_default_filters(&self) {
        let time_commitment = self.defaults.time_commitment_range();
        debug!(?time_commitment, "Filters reset to defaults");
        self.state.send_modify(|state| {
            state.set_filter(FilterChange::Search(String::new()));
            state.set_filter(FilterChange::LocalGroups(Vec::new()));
            state.set_filter(FilterChange::WorkingCircles(Vec::new()));
            state.set_filter(FilterChange::TimeCommitment(time_commitment));
            state.reload();
        });
    }

    pub fn get_by_id(&self, id: RoleId) -> Option<Role> {
        self.state.borrow().get_by_id(id).cloned()
    }

    pub fn is_new_query(&self) -> bool {
        self.state.borrow().is_new_query()
    }

    pub fn roles(&self) -> Vec<Role> {
        self.state.borrow().roles.clone()
    }

    pub fn num_roles(&self) -> usize {
        self.state.borrow().num_roles
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn filters(&self) -> RoleFilters {
        self.state.borrow().selected_filters.clone()
    }

    pub fn snapshot(&self) -> RoleListState {
        self.state.borrow().clone()
    }

    /// Watch the state; the receiver is notified after every transition
    pub fn subscribe(&self) -> watch::Receiver<RoleListState> {
        self.state.subscribe()
    }
}

/// Holds the loading flag up for as long as it lives
struct LoadingGuard<'a> {
    state: &'a watch::Sender<RoleListState>,
}

impl<'a> LoadingGuard<'a> {
    fn start(state: &'a watch::Sender<RoleListState>) -> Self {
        state.send_modify(|s| s.set_loading(true));
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.set_loading(false));
    }
}
