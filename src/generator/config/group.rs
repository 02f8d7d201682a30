//! Proxy group topology
//!
//! Grouped targets share one fixed table of purpose groups. Members of those
//! groups are references that get expanded against the nodes of one render:
//! region references disappear when the region has no node, so no group ever
//! points at a group that was not emitted.

use super::region::{RegionGroups, RegionTag};
use crate::models::{ProxyGroupConfig, ProxyGroupConfigs, ProxyGroupType};

pub const NODE_SELECT: &str = "🚀 节点选择";
pub const MANUAL_SWITCH: &str = "🚀 手动切换";
pub const AUTO_SELECT: &str = "♻️ 自动选择";
pub const TELEGRAM: &str = "📲 电报消息";
pub const AI_SERVICES: &str = "💬 Ai平台";
pub const YOUTUBE: &str = "📹 油管视频";
pub const NETFLIX: &str = "🎥 奈飞视频";
pub const GAMING: &str = "🎮 游戏平台";
pub const MICROSOFT: &str = "Ⓜ️ 微软服务";
pub const APPLE: &str = "🍎 苹果服务";
pub const GLOBAL_DIRECT: &str = "🎯 全球直连";
pub const AD_BLOCK: &str = "🛑 广告拦截";
pub const FINAL: &str = "🐟 漏网之鱼";

pub const DIRECT: &str = "DIRECT";
pub const REJECT: &str = "REJECT";

/// A reference inside a purpose group's member list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMember {
    /// Another purpose group
    Group(&'static str),
    /// One region group, dropped when the region is empty
    Region(RegionTag),
    /// Every non-empty geographic region group
    AllRegions,
    /// Every encoded node, or `DIRECT` when there is none
    AllNodes,
    Direct,
    Reject,
}

use GroupMember::*;

#[derive(Debug, Clone, Copy)]
struct PurposeGroup {
    name: &'static str,
    group_type: ProxyGroupType,
    members: &'static [GroupMember],
}

/// Names of every purpose group, in table order
pub fn purpose_group_names() -> impl Iterator<Item = &'static str> {
    PURPOSE_GROUPS.iter().map(|group| group.name)
}

const fn select(name: &'static str, members: &'static [GroupMember]) -> PurposeGroup {
    PurposeGroup {
        name,
        group_type: ProxyGroupType::Select,
        members,
    }
}

const PURPOSE_GROUPS: [PurposeGroup; 13] = [
    select(
        NODE_SELECT,
        &[Group(AUTO_SELECT), Group(MANUAL_SWITCH), AllRegions, Direct],
    ),
    select(MANUAL_SWITCH, &[AllNodes]),
    PurposeGroup {
        name: AUTO_SELECT,
        group_type: ProxyGroupType::URLTest,
        members: &[AllNodes],
    },
    select(
        TELEGRAM,
        &[Group(NODE_SELECT), Group(AUTO_SELECT), AllRegions, Group(MANUAL_SWITCH), Direct],
    ),
    select(
        AI_SERVICES,
        &[
            Group(NODE_SELECT),
            Region(RegionTag::UnitedStates),
            Region(RegionTag::Japan),
            Region(RegionTag::Singapore),
            Region(RegionTag::Taiwan),
            Region(RegionTag::Korea),
            Group(MANUAL_SWITCH),
        ],
    ),
    select(
        YOUTUBE,
        &[Group(NODE_SELECT), Group(AUTO_SELECT), AllRegions, Group(MANUAL_SWITCH), Direct],
    ),
    select(
        NETFLIX,
        &[
            Region(RegionTag::Streaming),
            Group(NODE_SELECT),
            Group(AUTO_SELECT),
            AllRegions,
            Group(MANUAL_SWITCH),
            Direct,
        ],
    ),
    select(
        GAMING,
        &[Direct, Group(NODE_SELECT), AllRegions, Group(MANUAL_SWITCH)],
    ),
    select(
        MICROSOFT,
        &[Direct, Group(NODE_SELECT), AllRegions, Group(MANUAL_SWITCH)],
    ),
    select(
        APPLE,
        &[Direct, Group(NODE_SELECT), AllRegions, Group(MANUAL_SWITCH)],
    ),
    select(GLOBAL_DIRECT, &[Direct, Group(NODE_SELECT), Group(AUTO_SELECT)]),
    select(AD_BLOCK, &[Reject, Direct]),
    select(
        FINAL,
        &[Group(NODE_SELECT), Group(AUTO_SELECT), Direct, AllRegions, Group(MANUAL_SWITCH)],
    ),
];

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|existing| existing == name) {
        list.push(name.to_string());
    }
}

fn expand(
    member: GroupMember,
    node_names: &[String],
    regions: &RegionGroups,
    out: &mut Vec<String>,
) {
    match member {
        Group(name) => push_unique(out, name),
        Region(tag) => {
            if regions.contains(tag) {
                push_unique(out, tag.group_name());
            }
        }
        AllRegions => {
            for tag in regions.tags().filter(|tag| *tag != RegionTag::Streaming) {
                push_unique(out, tag.group_name());
            }
        }
        AllNodes => {
            if node_names.is_empty() {
                push_unique(out, DIRECT);
            }
            for name in node_names {
                push_unique(out, name);
            }
        }
        Direct => push_unique(out, DIRECT),
        Reject => push_unique(out, REJECT),
    }
}

/// Full group list for one render: purpose groups first, then one selector per
/// non-empty region, each in table order.
///
/// `node_names` are the names of the encoded entries, in output order.
pub fn assemble_groups(node_names: &[String], regions: &RegionGroups) -> ProxyGroupConfigs {
    let mut groups: ProxyGroupConfigs = PURPOSE_GROUPS
        .iter()
        .map(|group| {
            let mut proxies = Vec::new();
            for member in group.members {
                expand(*member, node_names, regions, &mut proxies);
            }
            ProxyGroupConfig::new(group.name, group.group_type, proxies)
        })
        .collect();

    groups.extend(regions.iter().map(|(tag, members)| {
        ProxyGroupConfig::new(tag.group_name(), ProxyGroupType::Select, members.to_vec())
    }));
    groups
}
