//! Remark (node display name) bookkeeping
//!
//! Grouped profiles refer to proxies by name, so every emitted name must be
//! unique and must not shadow a group or a built-in outbound.

use std::collections::HashSet;

use super::group::{purpose_group_names, DIRECT, REJECT};
use super::region::RegionTag;

/// Tags of the built-in sing-box outbounds
pub const BUILTIN_OUTBOUNDS: [&str; 3] = ["direct", "block", "dns-out"];

/// Names already taken within one render
#[derive(Debug, Clone)]
pub struct RemarkRegistry {
    taken: HashSet<String>,
}

impl Default for RemarkRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RemarkRegistry {
    /// A registry with group names and built-in outbounds reserved
    pub fn new() -> Self {
        let taken = purpose_group_names()
            .chain(RegionTag::ALL.iter().map(|tag| tag.group_name()))
            .chain([DIRECT, REJECT])
            .chain(BUILTIN_OUTBOUNDS)
            .map(str::to_string)
            .collect();
        RemarkRegistry { taken }
    }

    /// First free name among `remark`, `remark 2`, `remark 3`, ...
    ///
    /// Does not reserve it; call [`RemarkRegistry::claim`] once the name is used.
    pub fn propose(&self, remark: &str) -> String {
        if !self.taken.contains(remark) {
            return remark.to_string();
        }
        (2..)
            .map(|n| format!("{} {}", remark, n))
            .find(|candidate| !self.taken.contains(candidate))
            .unwrap_or_default()
    }

    pub fn claim(&mut self, remark: &str) {
        self.taken.insert(remark.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::config::group::NODE_SELECT;

    #[test]
    fn test_repeated_remarks_get_suffixes() {
        let mut registry = RemarkRegistry::new();
        for expected in ["HK-1", "HK-1 2", "HK-1 3"] {
            let name = registry.propose("HK-1");
            assert_eq!(name, expected);
            registry.claim(&name);
        }
    }

    #[test]
    fn test_suffix_skips_names_already_taken() {
        let mut registry = RemarkRegistry::new();
        registry.claim("JP");
        registry.claim("JP 2");
        assert_eq!(registry.propose("JP"), "JP 3");
    }

    #[test]
    fn test_reserved_names() {
        let registry = RemarkRegistry::new();
        assert_eq!(registry.propose("direct"), "direct 2");
        assert_eq!(registry.propose("dns-out"), "dns-out 2");
        assert_eq!(registry.propose("REJECT"), "REJECT 2");
        assert_eq!(registry.propose(NODE_SELECT), format!("{} 2", NODE_SELECT));
        assert_eq!(
            registry.propose(RegionTag::Japan.group_name()),
            format!("{} 2", RegionTag::Japan.group_name())
        );
        assert_eq!(registry.propose("Direct"), "Direct");
    }

    #[test]
    fn test_propose_does_not_reserve() {
        let registry = RemarkRegistry::new();
        assert_eq!(registry.propose("SG-1"), "SG-1");
        assert_eq!(registry.propose("SG-1"), "SG-1");
    }
}
