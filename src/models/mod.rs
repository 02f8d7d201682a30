//! Core data models for the application
//!
//! This module contains the primary data structures used throughout the application,
//! separated from the logic that operates on them.
//!
//! # Usage
//!
//! ```rust
//! use subpanel::models::{Node, Protocol, User};
//!
//! let node = Node::new(1, "HK-1", Protocol::Trojan, "hk.example.com");
//! let user = User {
//!     passwd: "secret".to_string(),
//!     ..Default::default()
//! };
//! assert_eq!(node.protocol.as_str(), "trojan");
//! assert!(!user.is_quota_exhausted());
//! ```

mod app_state;
mod endpoint;
mod node;
mod output;
pub mod proxy_group_config;
mod target;
mod user;

pub use app_state::AppState;
pub use endpoint::*;
pub use node::*;
pub use output::*;
pub use proxy_group_config::{ProxyGroupConfig, ProxyGroupConfigs, ProxyGroupType};
pub use target::*;
pub use user::*;
