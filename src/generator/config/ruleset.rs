//! Static routing rules
//!
//! The rules ship as `assets/rules.list`, one `TYPE,VALUE,GROUP[,OPTION]` rule
//! per line and a closing `MATCH,GROUP`. This module parses the asset once and
//! translates it for each grouped target.

use lazy_static::lazy_static;
use log::warn;
use serde_json::{json, Map, Value};

use super::group::{AUTO_SELECT, DIRECT, NODE_SELECT, REJECT};

const RULES_ASSET: &str = include_str!("../../../assets/rules.list");

/// Base URL of the sing-box GeoIP rule sets
const SINGBOX_GEOIP_URL: &str = "https://raw.githubusercontent.com/SagerNet/sing-geoip/rule-set";

/// One rule of the asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub rule_type: String,
    /// Empty for `MATCH`
    pub value: String,
    pub group: String,
    pub options: Vec<String>,
}

impl Rule {
    pub fn is_match(&self) -> bool {
        self.rule_type == "MATCH"
    }

    /// Parse one asset line; comments and blank lines yield `None`
    pub fn parse(line: &str) -> Option<Rule> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            return None;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let rule_type = parts[0].to_uppercase();
        match (rule_type.as_str(), parts.len()) {
            ("MATCH" | "FINAL", 2) => Some(Rule {
                rule_type: "MATCH".to_string(),
                value: String::new(),
                group: parts[1].to_string(),
                options: Vec::new(),
            }),
            (_, n) if n >= 3 => Some(Rule {
                rule_type,
                value: parts[1].to_string(),
                group: parts[2].to_string(),
                options: parts[3..].iter().map(|s| s.to_string()).collect(),
            }),
            _ => {
                warn!("Ignoring malformed rule line: {}", line);
                None
            }
        }
    }

    /// `TYPE,VALUE,GROUP[,OPTION]` with `final_keyword` standing in for `MATCH`
    fn to_line(&self, final_keyword: &str) -> String {
        if self.is_match() {
            return format!("{},{}", final_keyword, self.group);
        }
        let mut line = format!("{},{},{}", self.rule_type, self.value, self.group);
        for option in &self.options {
            line.push(',');
            line.push_str(option);
        }
        line
    }
}

pub fn parse_rules(content: &str) -> Vec<Rule> {
    content.lines().filter_map(Rule::parse).collect()
}

lazy_static! {
    static ref STATIC_RULES: Vec<Rule> = parse_rules(RULES_ASSET);
}

/// Version line of the bundled asset, for logging
pub fn rules_version() -> &'static str {
    RULES_ASSET
        .lines()
        .find_map(|line| line.trim().strip_prefix("# version:"))
        .map(str::trim)
        .unwrap_or("unknown")
}

pub fn static_rules() -> &'static [Rule] {
    &STATIC_RULES
}

/// Clash rules: the asset verbatim
pub fn clash_rules(rules: &[Rule]) -> Vec<String> {
    rules.iter().map(|rule| rule.to_line("MATCH")).collect()
}

/// Surge rules: `MATCH` is spelled `FINAL`
pub fn surge_rules(rules: &[Rule]) -> Vec<String> {
    rules.iter().map(|rule| rule.to_line("FINAL")).collect()
}

/// sing-box outbound tag for a rule group
pub fn singbox_outbound_tag(group: &str) -> &str {
    match group {
        DIRECT => "direct",
        REJECT => "block",
        other => other,
    }
}

/// sing-box `route` object: rules, remote rule sets and the final outbound
pub fn singbox_route(rules: &[Rule]) -> Value {
    let mut route_rules = vec![json!({ "protocol": "dns", "outbound": "dns-out" })];
    let mut rule_sets: Vec<Value> = Vec::new();
    let mut final_outbound = NODE_SELECT.to_string();

    for rule in rules {
        let outbound = singbox_outbound_tag(&rule.group);
        let mut entry = Map::new();
        match rule.rule_type.as_str() {
            "MATCH" => {
                final_outbound = outbound.to_string();
                continue;
            }
            "DOMAIN" => {
                entry.insert("domain".to_string(), json!([rule.value]));
            }
            "DOMAIN-SUFFIX" => {
                entry.insert("domain_suffix".to_string(), json!([rule.value]));
            }
            "DOMAIN-KEYWORD" => {
                entry.insert("domain_keyword".to_string(), json!([rule.value]));
            }
            "IP-CIDR" | "IP-CIDR6" => {
                entry.insert("ip_cidr".to_string(), json!([rule.value]));
            }
            "GEOIP" => {
                let tag = format!("geoip-{}", rule.value.to_lowercase());
                if !rule_sets.iter().any(|set| set["tag"] == tag.as_str()) {
                    rule_sets.push(json!({
                        "tag": tag,
                        "type": "remote",
                        "format": "binary",
                        "url": format!("{}/{}.srs", SINGBOX_GEOIP_URL, tag),
                        "download_detour": AUTO_SELECT,
                    }));
                }
                entry.insert("rule_set".to_string(), json!([tag]));
            }
            other => {
                warn!("Rule type {} has no sing-box equivalent, skipped", other);
                continue;
            }
        }
        entry.insert("outbound".to_string(), json!(outbound));
        route_rules.push(Value::Object(entry));
    }

    json!({
        "rules": route_rules,
        "rule_set": rule_sets,
        "final": final_outbound,
        "auto_detect_interface": true,
    })
}
