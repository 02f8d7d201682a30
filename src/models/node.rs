//! Node model definitions
//!
//! A node is one row of the panel's node inventory as handed to the generator.

use serde::{Deserialize, Serialize};

/// Protocol spoken by a node.
///
/// This is the canonical closed set used for dispatch across every encoder and
/// renderer. The serialized names are the ones stored by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "v2ray")]
    VMess,
    #[serde(rename = "vless")]
    Vless,
    #[serde(rename = "trojan")]
    Trojan,
    #[serde(rename = "ss")]
    Shadowsocks,
    #[serde(rename = "ssr")]
    ShadowsocksR,
    #[serde(rename = "hysteria")]
    Hysteria2,
    #[serde(rename = "anytls")]
    AnyTls,
}

impl Protocol {
    /// Parse the stored node type name
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "v2ray" | "vmess" => Some(Protocol::VMess),
            "vless" => Some(Protocol::Vless),
            "trojan" => Some(Protocol::Trojan),
            "ss" | "shadowsocks" => Some(Protocol::Shadowsocks),
            "ssr" | "shadowsocksr" => Some(Protocol::ShadowsocksR),
            "hysteria" | "hysteria2" | "hy2" => Some(Protocol::Hysteria2),
            "anytls" => Some(Protocol::AnyTls),
            _ => None,
        }
    }

    /// Stored node type name
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::VMess => "v2ray",
            Protocol::Vless => "vless",
            Protocol::Trojan => "trojan",
            Protocol::Shadowsocks => "ss",
            Protocol::ShadowsocksR => "ssr",
            Protocol::Hysteria2 => "hysteria",
            Protocol::AnyTls => "anytls",
        }
    }
}

/// A proxy node as stored by the panel.
///
/// `raw_config` is the per-node configuration blob; it is either a JSON object
/// or a JSON document encoded as a string. Nothing in it is trusted until it has
/// gone through [`crate::parser::resolve_node`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub protocol: Protocol,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub tls_host: Option<String>,
    #[serde(default)]
    pub node_class: i32,
    #[serde(default)]
    pub raw_config: serde_json::Value,
}

impl Node {
    pub fn new(id: i64, name: &str, protocol: Protocol, server: &str) -> Self {
        Node {
            id,
            name: name.to_string(),
            protocol,
            server: server.to_string(),
            port: 0,
            tls_host: None,
            node_class: 0,
            raw_config: serde_json::Value::Null,
        }
    }

    pub fn with_config(mut self, raw_config: serde_json::Value) -> Self {
        self.raw_config = raw_config;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_names() {
        assert_eq!(Protocol::from_str("V2Ray"), Some(Protocol::VMess));
        assert_eq!(Protocol::from_str("hysteria"), Some(Protocol::Hysteria2));
        assert_eq!(Protocol::from_str("wireguard"), None);
        assert_eq!(Protocol::Shadowsocks.as_str(), "ss");
    }

    #[test]
    fn test_node_deserialize() {
        let node: Node = serde_json::from_str(
            r#"{"id": 3, "name": "JP-1", "type": "anytls", "server": "jp.example.com"}"#,
        )
        .unwrap();
        assert_eq!(node.protocol, Protocol::AnyTls);
        assert_eq!(node.port, 0);
        assert!(node.raw_config.is_null());
    }
}
