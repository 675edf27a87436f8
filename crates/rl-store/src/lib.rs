//! Role List Store
//!
//! Client-side state for a paginated, filterable list of roles backed by the
//! role service:
//!
//! - create, update and delete patch the loaded list with the server's copy
//! - `load_page` drives infinite scrolling, throttled and never overlapping
//! - filter changes reset the list so the next page starts a fresh query
//!
//! The store's collaborators are injected: a [`RoleService`](rl_client::RoleService)
//! for data, a [`GroupsProvider`] for the local group and working circle
//! universe, and a [`DefaultsProvider`] for filter defaults.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rl_client::InMemoryService;
//! use rl_store::{GroupsStore, RoleListStore, ScrollCounter, StaticDefaults};
//!
//! # async fn example() -> rl_client::Result<()> {
//! let service = Arc::new(InMemoryService::new());
//! let store = RoleListStore::new(
//!     service.clone(),
//!     Arc::new(GroupsStore::new(service)),
//!     Arc::new(StaticDefaults::default()),
//! );
//!
//! store.set_default_filters();
//! let scroll = ScrollCounter::new();
//! store.load_page(&scroll).await?;
//! println!("{} of {} roles loaded", store.roles().len(), store.num_roles());
//! # Ok(())
//! # }
//! ```

pub mod defaults;
pub mod filter;
pub mod groups;
pub mod scroll;
pub mod state;
mod store;
pub mod throttle;

pub use defaults::{DefaultsProvider, StaticDefaults};
pub use filter::{FilterChange, FilterError, RoleFilters};
pub use groups::{GroupsProvider, GroupsStore};
pub use scroll::{ScrollController, ScrollCounter};
pub use state::RoleListState;
pub use store::{PageOutcome, RoleListStore, StoreOptions};
pub use throttle::Throttle;
