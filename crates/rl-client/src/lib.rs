//! # Role Service Client
//!
//! GraphQL client for the role service, plus the service traits the role list
//! store is written against.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rl_client::{Client, Config, PageQuery, RoleService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("https://roles.example.org/v1/graphql")
//!         .with_bearer_token("token");
//!     let client = Client::new(config)?;
//!
//!     let ids = client.query_all_ids().await?;
//!     println!("{} roles on the server", ids.len());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod graphql;
pub mod memory;
pub mod service;

pub use client::Client;
pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use memory::InMemoryService;
pub use service::{GroupService, PageQuery, RoleService};
