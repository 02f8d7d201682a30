use log::error;

use crate::generator::config::ruleset::{clash_rules, Rule};
use crate::generator::yaml::clash_output::{
    ClashDns, ClashDnsFallbackFilter, ClashProxyGroup, ClashYamlOutput,
};
use crate::models::{EntryFields, ProxyEntry, ProxyGroupConfigs, ProxyGroupType};

fn default_dns() -> ClashDns {
    ClashDns {
        enable: true,
        ipv6: false,
        enhanced_mode: "fake-ip".to_string(),
        fake_ip_range: "198.18.0.1/16".to_string(),
        default_nameserver: vec!["223.5.5.5".to_string(), "119.29.29.29".to_string()],
        nameserver: vec![
            "https://doh.pub/dns-query".to_string(),
            "https://dns.alidns.com/dns-query".to_string(),
        ],
        fallback: vec![
            "https://1.1.1.1/dns-query".to_string(),
            "https://dns.google/dns-query".to_string(),
        ],
        fallback_filter: ClashDnsFallbackFilter {
            geoip: true,
            geoip_code: "CN".to_string(),
            ipcidr: vec!["240.0.0.0/4".to_string()],
        },
    }
}

fn to_clash_group(group: &crate::models::ProxyGroupConfig) -> ClashProxyGroup {
    let url_test = group.group_type == ProxyGroupType::URLTest;
    ClashProxyGroup {
        name: group.name.clone(),
        group_type: group.type_str().to_string(),
        proxies: group.proxies.clone(),
        url: url_test.then(|| group.url.clone()),
        interval: url_test.then_some(group.interval),
        tolerance: url_test.then_some(group.tolerance),
    }
}

/// Build the Clash document for already encoded entries
pub fn proxy_to_clash_yaml(
    entries: &[ProxyEntry],
    groups: &ProxyGroupConfigs,
    rules: &[Rule],
) -> ClashYamlOutput {
    ClashYamlOutput {
        mixed_port: 7890,
        allow_lan: false,
        mode: "rule".to_string(),
        log_level: "info".to_string(),
        external_controller: "127.0.0.1:9090".to_string(),
        dns: default_dns(),
        proxies: entries
            .iter()
            .filter_map(|entry| match &entry.fields {
                EntryFields::Clash(proxy) => Some(proxy.clone()),
                _ => None,
            })
            .collect(),
        proxy_groups: groups.iter().map(to_clash_group).collect(),
        rules: clash_rules(rules),
    }
}

/// Convert entries to a Clash YAML profile
///
/// # Arguments
/// * `entries` - Encoded entries, expected to carry Clash proxies
/// * `groups` - Assembled proxy groups
/// * `rules` - Static rules
pub fn proxy_to_clash(entries: &[ProxyEntry], groups: &ProxyGroupConfigs, rules: &[Rule]) -> String {
    let output = proxy_to_clash_yaml(entries, groups, rules);
    match serde_yaml::to_string(&output) {
        Ok(yaml) => yaml,
        Err(e) => {
            error!("Failed to serialize Clash profile: {}", e);
            String::new()
        }
    }
}
