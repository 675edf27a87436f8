//! Role list state and its transitions

use crate::filter::{FilterChange, RoleFilters};
use rl_common::{Role, RoleId};

/// Everything the role list view renders from.
///
/// Only [`RoleListStore`](crate::RoleListStore) mutates this; consumers get
/// clones or watch the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleListState {
    /// Loaded roles, newest created first
    pub roles: Vec<Role>,
    /// Total roles on the server as of the last count
    pub num_roles: usize,
    pub is_loading: bool,
    pub pagination_limit: u32,
    pub pagination_offset: u32,
    /// Flipped on every reset so the infinite-scroll widget restarts
    pub infinite_scroll_identifier: bool,
    pub selected_filters: RoleFilters,
    /// Bumped on every reset; responses from an older epoch are dropped
    pub reset_epoch: u64,
}

impl RoleListState {
    pub fn new(pagination_limit: u32, selected_filters: RoleFilters) -> Self {
        Self {
            roles: Vec::new(),
            num_roles: 0,
            is_loading: true,
            pagination_limit,
            pagination_offset: 0,
            infinite_scroll_identifier: false,
            selected_filters,
            reset_epoch: 0,
        }
    }

    pub fn get_by_id(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.id == id)
    }

    /// No page has been loaded since the last reset
    pub fn is_new_query(&self) -> bool {
        self.pagination_offset == 0
    }

    pub(crate) fn add_role(&mut self, role: Role) {
        self.roles.insert(0, role);
        self.num_roles += 1;
    }

    /// Remove the first role with `id`. Returns whether one was found.
    pub(crate) fn delete_role(&mut self, id: RoleId) -> bool {
        match self.roles.iter().position(|role| role.id == id) {
            Some(index) => {
                self.roles.remove(index);
                self.num_roles = self.num_roles.saturating_sub(1);
                true
            }
            None => false,
        }
    }

    pub(crate) fn add_roles(&mut self, roles: Vec<Role>) {
        self.num_roles += roles.len();
        self.roles.extend(roles);
    }

    /// Replace the entry with the same id. Returns whether one was found.
    pub(crate) fn edit_role(&mut self, role: Role) -> bool {
        match self.roles.iter_mut().find(|existing| existing.id == role.id) {
            Some(existing) => {
                *existing = role;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_roles(&mut self, roles: Vec<Role>) {
        self.roles = roles;
    }

    pub(crate) fn set_roles_count(&mut self, num_roles: usize) {
        self.num_roles = num_roles;
    }

    pub(crate) fn set_loading(&mut self, is_loading: bool) {
        self.is_loading = is_loading;
    }

    pub(crate) fn reload(&mut self) {
        self.roles.clear();
        self.pagination_offset = 0;
        self.infinite_scroll_identifier = !self.infinite_scroll_identifier;
        self.reset_epoch += 1;
    }

    pub(crate) fn next_pagination(&mut self) {
        self.pagination_offset += self.pagination_limit;
    }

    pub(crate) fn set_filter(&mut self, change: FilterChange) {
        self.selected_filters.apply(change);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_common::{RoleInput, TimeCommitmentRange};

    fn role(id: i64, name: &str) -> Role {
        Role::from_input(RoleId(id), RoleInput::new(name))
    }

    fn state() -> RoleListState {
        RoleListState::new(20, RoleFilters::with_time_commitment(TimeCommitmentRange::default()))
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert!(state.is_loading);
        assert!(state.roles.is_empty());
        assert!(state.is_new_query());
        assert_eq!(state.pagination_limit, 20);
    }

    #[test]
    fn test_add_role_prepends() {
        let mut state = state();
        state.add_roles(vec![role(1, "a"), role(2, "b")]);
        state.add_role(role(3, "c"));

        let ids: Vec<_> = state.roles.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(state.num_roles, 3);
    }

    #[test]
    fn test_delete_role_preserves_order() {
        let mut state = state();
        state.add_roles(vec![role(1, "a"), role(2, "b"), role(3, "c")]);

        assert!(state.delete_role(RoleId(2)));
        let ids: Vec<_> = state.roles.iter().map(|r| r.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(state.num_roles, 2);
    }

    #[test]
    fn test_delete_missing_role_keeps_count() {
        let mut state = state();
        state.add_roles(vec![role(1, "a")]);
        state.set_roles_count(10);

        assert!(!state.delete_role(RoleId(99)));
        assert_eq!(state.num_roles, 10);
        assert_eq!(state.roles.len(), 1);
    }

    #[test]
    fn test_edit_role_replaces_in_place() {
        let mut state = state();
        state.add_roles(vec![role(1, "a"), role(2, "b")]);

        assert!(state.edit_role(role(2, "renamed")));
        assert_eq!(state.roles[1].name, "renamed");
        assert!(!state.edit_role(role(5, "ghost")));
        assert_eq!(state.roles.len(), 2);
    }

    #[test]
    fn test_reload_resets_pagination_and_flips_identifier() {
        let mut state = state();
        state.add_roles(vec![role(1, "a")]);
        state.next_pagination();
        assert_eq!(state.pagination_offset, 20);
        assert!(!state.is_new_query());

        state.reload();
        assert!(state.roles.is_empty());
        assert!(state.is_new_query());
        assert!(state.infinite_scroll_identifier);
        assert_eq!(state.reset_epoch, 1);

        state.reload();
        assert!(!state.infinite_scroll_identifier);
    }

    #[test]
    fn test_get_by_id() {
        let mut state = state();
        state.add_roles(vec![role(1, "a"), role(2, "b")]);

        assert_eq!(state.get_by_id(RoleId(2)).map(|r| r.name.as_str()), Some("b"));
        assert!(state.get_by_id(RoleId(3)).is_none());
    }
}
