use log::error;
use serde_json::{json, Value};

use crate::generator::config::group::NODE_SELECT;
use crate::generator::config::ruleset::{singbox_outbound_tag, singbox_route, Rule};
use crate::models::{EntryFields, ProxyEntry, ProxyGroupConfig, ProxyGroupConfigs, ProxyGroupType};

fn group_to_outbound(group: &ProxyGroupConfig) -> Value {
    let outbounds: Vec<&str> = group
        .proxies
        .iter()
        .map(|member| singbox_outbound_tag(member))
        .collect();

    match group.group_type {
        ProxyGroupType::Select => json!({
            "type": "selector",
            "tag": group.name,
            "outbounds": outbounds,
        }),
        ProxyGroupType::URLTest => json!({
            "type": "urltest",
            "tag": group.name,
            "outbounds": outbounds,
            "url": group.url,
            "interval": format!("{}s", group.interval),
            "tolerance": group.tolerance,
        }),
    }
}

fn dns() -> Value {
    json!({
        "servers": [
            {
                "tag": "dns-remote",
                "address": "https://1.1.1.1/dns-query",
                "detour": NODE_SELECT,
            },
            {
                "tag": "dns-local",
                "address": "https://223.5.5.5/dns-query",
            },
        ],
        "rules": [
            { "outbound": "any", "server": "dns-local" },
            { "rule_set": ["geoip-cn"], "server": "dns-local" },
        ],
        "final": "dns-remote",
        "strategy": "prefer_ipv4",
    })
}

/// Build the sing-box profile object
pub fn proxy_to_singbox_json(
    entries: &[ProxyEntry],
    groups: &ProxyGroupConfigs,
    rules: &[Rule],
) -> Value {
    let mut outbounds: Vec<Value> = groups.iter().map(group_to_outbound).collect();
    outbounds.extend(entries.iter().filter_map(|entry| match &entry.fields {
        EntryFields::SingBox(outbound) => Some(outbound.clone()),
        _ => None,
    }));
    outbounds.push(json!({ "type": "direct", "tag": "direct" }));
    outbounds.push(json!({ "type": "block", "tag": "block" }));
    outbounds.push(json!({ "type": "dns", "tag": "dns-out" }));

    let route = singbox_route(rules);
    let mut dns = dns();
    let has_geoip_cn = route["rule_set"]
        .as_array()
        .is_some_and(|sets| sets.iter().any(|set| set["tag"] == "geoip-cn"));
    if !has_geoip_cn {
        if let Some(dns_rules) = dns["rules"].as_array_mut() {
            dns_rules.retain(|rule| rule.get("rule_set").is_none());
        }
    }

    json!({
        "log": { "level": "info", "timestamp": true },
        "dns": dns,
        "inbounds": [
            {
                "type": "mixed",
                "tag": "mixed-in",
                "listen": "127.0.0.1",
                "listen_port": 2080,
            },
        ],
        "outbounds": outbounds,
        "route": route,
    })
}

/// Convert entries to a sing-box JSON profile
///
/// Groups come first in `outbounds` so clients list them on top, followed by
/// the nodes in entry order and the built-in direct/block/dns outbounds.
pub fn proxy_to_singbox(entries: &[ProxyEntry], groups: &ProxyGroupConfigs, rules: &[Rule]) -> String {
    let config = proxy_to_singbox_json(entries, groups, rules);
    match serde_json::to_string_pretty(&config) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize sing-box profile: {}", e);
            String::new()
        }
    }
}
