//! File-backed user and node store
//!
//! Lets the server run without the panel's database. The data file is YAML
//! or JSON (picked by extension) with the shape
//!
//! ```yaml
//! users:
//!   - { id: 1, token: abc, uuid: ..., passwd: ..., transfer_enable: 0 }
//! nodes:
//!   - { id: 1, name: HK-1, type: trojan, server: hk.example.com, raw_config: {...} }
//! access:
//!   1: [1]
//! ```
//!
//! A user without an `access` entry may use every node.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interfaces::{NodeRepository, SubscribeError, UserRepository};
use crate::models::{Node, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read data file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON data file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML data file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn default_enabled() -> bool {
    true
}

/// A user record together with its subscription token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub token: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub user: User,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub users: Vec<StoredUser>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Node ids each user may use, keyed by user id
    #[serde(default)]
    pub access: HashMap<i64, Vec<i64>>,
}

/// In-memory view of a data file
#[derive(Debug, Clone, Default)]
pub struct FileStore {
    data: StoreData,
}

impl FileStore {
    pub fn new(data: StoreData) -> Self {
        FileStore { data }
    }

    /// Parse data text; `.json` is read as JSON, anything else as YAML
    pub fn from_str_with_extension(content: &str, extension: &str) -> Result<Self, StoreError> {
        let data: StoreData = if extension.eq_ignore_ascii_case("json") {
            serde_json::from_str(content)?
        } else if content.trim().is_empty() {
            StoreData::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Ok(FileStore::new(data))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let content = fs::read_to_string(path)?;
        let store = Self::from_str_with_extension(&content, extension)?;
        info!(
            "Loaded {} users and {} nodes from {}",
            store.data.users.len(),
            store.data.nodes.len(),
            path.display()
        );
        Ok(store)
    }

    pub fn data(&self) -> &StoreData {
        &self.data
    }
}

impl UserRepository for FileStore {
    fn find_by_token(&self, token: &str) -> Result<Option<User>, SubscribeError> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self
            .data
            .users
            .iter()
            .find(|stored| stored.enabled && stored.token == token)
            .map(|stored| stored.user.clone()))
    }
}

impl NodeRepository for FileStore {
    fn accessible_nodes(&self, user_id: i64) -> Result<Vec<Node>, SubscribeError> {
        let nodes = match self.data.access.get(&user_id) {
            Some(allowed) => self
                .data
                .nodes
                .iter()
                .filter(|node| allowed.contains(&node.id))
                .cloned()
                .collect(),
            None => self.data.nodes.clone(),
        };
        Ok(nodes)
    }
}
