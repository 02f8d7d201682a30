use crate::generator::config::ruleset::{surge_rules, Rule};
use crate::models::{EntryFields, ProxyEntry, ProxyGroupConfigs, ProxyGroupType};

const GENERAL_SECTION: &str = "[General]
loglevel = notify
skip-proxy = 127.0.0.1, 192.168.0.0/16, 10.0.0.0/8, 172.16.0.0/12, 100.64.0.0/10, localhost, *.local
dns-server = 223.5.5.5, 119.29.29.29, system
encrypted-dns-server = https://doh.pub/dns-query
ipv6 = false
internet-test-url = http://www.gstatic.com/generate_204
proxy-test-url = http://www.gstatic.com/generate_204
";

/// Convert entries to a Surge profile
///
/// Sections are written as `[General]`, `[Proxy]`, `[Proxy Group]` and
/// `[Rule]`; proxies and groups keep their declaration order.
///
/// # Arguments
/// * `entries` - Encoded entries, expected to carry Surge lines
/// * `groups` - Assembled proxy groups
/// * `rules` - Static rules
/// * `managed_url` - Subscription URL for the `#!MANAGED-CONFIG` header, if known
pub fn proxy_to_surge(
    entries: &[ProxyEntry],
    groups: &ProxyGroupConfigs,
    rules: &[Rule],
    managed_url: Option<&str>,
) -> String {
    let mut config = String::new();
    if let Some(url) = managed_url {
        config.push_str(&format!(
            "#!MANAGED-CONFIG {} interval=86400 strict=false\n\n",
            url
        ));
    }
    config.push_str(GENERAL_SECTION);

    config.push_str("\n[Proxy]\n");
    for entry in entries {
        if let EntryFields::Line(line) = &entry.fields {
            config.push_str(line);
            config.push('\n');
        }
    }

    config.push_str("\n[Proxy Group]\n");
    for group in groups {
        config.push_str(&format!(
            "{} = {}, {}",
            group.name,
            group.type_str(),
            group.proxies.join(", ")
        ));
        if group.group_type == ProxyGroupType::URLTest {
            config.push_str(&format!(
                ", url={}, interval={}, tolerance={}",
                group.url, group.interval, group.tolerance
            ));
        }
        config.push('\n');
    }

    config.push_str("\n[Rule]\n");
    for rule in surge_rules(rules) {
        config.push_str(&rule);
        config.push('\n');
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::config::ruleset::parse_rules;
    use crate::models::{Protocol, ProxyGroupConfig};

    #[test]
    fn test_sections_and_final_rule() {
        let entries = vec![ProxyEntry {
            name: "HK-1".to_string(),
            protocol: Protocol::Trojan,
            fields: EntryFields::Line(
                "HK-1 = trojan, hk.example.com, 443, password=secret, sni=hk.example.com"
                    .to_string(),
            ),
        }];
        let groups = vec![
            ProxyGroupConfig::new(
                "Proxy",
                ProxyGroupType::Select,
                vec!["HK-1".to_string(), "DIRECT".to_string()],
            ),
            ProxyGroupConfig::new("Auto", ProxyGroupType::URLTest, vec!["HK-1".to_string()]),
        ];
        let rules = parse_rules("DOMAIN-SUFFIX,cn,DIRECT\nMATCH,Proxy");
        let conf = proxy_to_surge(&entries, &groups, &rules, None);

        let general = conf.find("[General]").unwrap();
        let proxy = conf.find("[Proxy]").unwrap();
        let group = conf.find("[Proxy Group]").unwrap();
        let rule = conf.find("[Rule]").unwrap();
        assert!(general < proxy && proxy < group && group < rule);

        assert!(conf.contains("\nHK-1 = trojan, hk.example.com, 443"));
        assert!(conf.contains("\nProxy = select, HK-1, DIRECT\n"));
        assert!(conf.contains(
            "\nAuto = url-test, HK-1, url=http://www.gstatic.com/generate_204, interval=300, tolerance=50\n"
        ));
        assert!(conf.ends_with("DOMAIN-SUFFIX,cn,DIRECT\nFINAL,Proxy\n"));
        assert!(!conf.starts_with("#!MANAGED-CONFIG"));
    }

    #[test]
    fn test_managed_header() {
        let conf = proxy_to_surge(&[], &Vec::new(), &[], Some("https://example.com/sub/abc"));
        assert!(conf.starts_with(
            "#!MANAGED-CONFIG https://example.com/sub/abc interval=86400 strict=false\n"
        ));
    }
}
