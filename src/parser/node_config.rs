//! Node configuration resolution
//!
//! Turns the stored `raw_config` blob of a node into an [`EndpointDescriptor`]
//! and a [`ProtocolConfig`]. The blob has the shape
//! `{ "basic": {...}, "config": {...}, "client": {...} }` with every section
//! optional; `client` holds the client-facing overrides of the server-side
//! `config`.

use log::debug;
use serde_json::{Map, Value};

use super::fields;
use super::protocol_config::ProtocolConfig;
use crate::models::{EndpointDescriptor, Node, Security, Transport};

/// Port used when neither the sections nor the node row name one
pub const DEFAULT_PORT: u16 = 443;

/// A node together with everything derived from its stored configuration
#[derive(Debug, Clone)]
pub struct ResolvedNode<'a> {
    pub node: &'a Node,
    pub endpoint: EndpointDescriptor,
    pub config: ProtocolConfig,
}

/// The sections of a stored node configuration the generator reads, each defaulting to `{}`.
/// `basic` only carries server-side scheduling data and is not consulted.
#[derive(Debug, Clone)]
struct ConfigSections {
    config: Value,
    client: Value,
}

impl ConfigSections {
    fn parse(raw: &Value) -> Self {
        let root = match raw {
            Value::Object(_) => raw.clone(),
            Value::String(text) => match serde_json::from_str::<Value>(text) {
                Ok(value @ Value::Object(_)) => value,
                Ok(_) => Value::Object(Map::new()),
                Err(e) => {
                    debug!("Node config is not valid JSON, using defaults: {}", e);
                    Value::Object(Map::new())
                }
            },
            _ => Value::Object(Map::new()),
        };

        let section = |name: &str| match root.get(name) {
            Some(value @ Value::Object(_)) => value.clone(),
            _ => Value::Object(Map::new()),
        };

        ConfigSections {
            config: section("config"),
            client: section("client"),
        }
    }

    /// `client` keys laid over `config` keys
    fn merged(&self) -> Value {
        let mut merged = match &self.config {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        if let Value::Object(client) = &self.client {
            for (key, value) in client {
                merged.insert(key.clone(), value.clone());
            }
        }
        Value::Object(merged)
    }
}

/// Resolve a node's stored configuration.
///
/// This never fails: malformed or missing configuration yields a descriptor
/// with default fields, and it is up to the encoders to drop nodes that lack
/// something they need.
pub fn resolve_node(node: &Node) -> ResolvedNode<'_> {
    let sections = ConfigSections::parse(&node.raw_config);
    let endpoint = resolve_endpoint(node, &sections);
    let config = ProtocolConfig::decode(node.protocol, &sections.merged());

    ResolvedNode {
        node,
        endpoint,
        config,
    }
}

fn resolve_endpoint(node: &Node, sections: &ConfigSections) -> EndpointDescriptor {
    let client = &sections.client;
    let config = &sections.config;

    let server = fields::string(client, &["server"]).unwrap_or_else(|| node.server.clone());
    let port = fields::port(client, &["port"])
        .or_else(|| fields::port(config, &["port"]))
        .or(Some(node.port).filter(|port| *port > 0))
        .unwrap_or(DEFAULT_PORT);
    let tls_host = fields::string(client, &["tls_host"])
        .or_else(|| fields::string(config, &["host"]))
        .or_else(|| node.tls_host.clone().filter(|host| !host.is_empty()))
        .unwrap_or_else(|| server.clone());

    let security = match fields::string(config, &["security"])
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("reality") => Security::Reality,
        Some("tls") | Some("xtls") => Security::Tls,
        _ if fields::flag(config, &["tls"]) => Security::Tls,
        _ => Security::None,
    };

    let transport = match fields::string(config, &["network", "transport"])
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("ws") | Some("websocket") => Transport::Ws,
        Some("grpc") => Transport::Grpc,
        Some("http") | Some("h2") => Transport::Http,
        _ => Transport::Tcp,
    };

    let path = fields::string(client, &["path"])
        .or_else(|| fields::string(config, &["path"]))
        .or_else(|| fields::string(config, &["service_name", "serviceName"]));

    let host_header =
        fields::string(client, &["host"]).or_else(|| fields::string(config, &["host"]));

    let sni = fields::string(client, &["sni"])
        .or_else(|| fields::string(config, &["sni", "server_name"]));

    let mut alpn = fields::list(client, &["alpn"]);
    if alpn.is_empty() {
        alpn = fields::list(config, &["alpn"]);
    }

    let reality_pubkey = fields::string(client, &["publickey", "public_key"])
        .or_else(|| fields::string(config, &["public_key"]));

    let mut reality_short_ids = fields::list(config, &["short_ids"]);
    if reality_short_ids.is_empty() {
        reality_short_ids = fields::list(config, &["short_id"]);
    }

    let fingerprint = fields::string(client, &["fingerprint"])
        .or_else(|| fields::string(config, &["fingerprint"]));

    let allow_insecure = fields::flag(client, &["allow_insecure", "insecure"])
        || fields::flag(config, &["allow_insecure", "insecure"]);

    EndpointDescriptor {
        server,
        port,
        tls_host,
        security,
        transport,
        path,
        host_header,
        sni,
        alpn,
        reality_pubkey,
        reality_short_ids,
        fingerprint,
        allow_insecure,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;
    use crate::parser::protocol_config::VlessConfig;
    use serde_json::json;

    fn vless_node(raw: Value) -> Node {
        Node::new(1, "US-Reality", Protocol::Vless, "node.example.com").with_config(raw)
    }

    #[test]
    fn test_client_section_takes_precedence() {
        let node = vless_node(json!({
            "config": {"port": 8443, "host": "cfg.example.com"},
            "client": {"server": "edge.example.com", "port": "2053", "tls_host": "tls.example.com"}
        }));
        let resolved = resolve_node(&node);
        assert_eq!(resolved.endpoint.server, "edge.example.com");
        assert_eq!(resolved.endpoint.port, 2053);
        assert_eq!(resolved.endpoint.tls_host, "tls.example.com");
    }

    #[test]
    fn test_node_row_fills_missing_port_and_tls_host() {
        let mut node = vless_node(json!({}));
        node.port = 8443;
        node.tls_host = Some("row.example.com".to_string());
        let endpoint = resolve_node(&node).endpoint;
        assert_eq!(endpoint.port, 8443);
        assert_eq!(endpoint.tls_host, "row.example.com");

        let node = vless_node(json!({"config": {"port": 2083, "host": "cfg.example.com"}}));
        let mut node = Node {
            port: 8443,
            tls_host: Some("row.example.com".to_string()),
            ..node
        };
        let endpoint = resolve_node(&node).endpoint;
        assert_eq!(endpoint.port, 2083);
        assert_eq!(endpoint.tls_host, "cfg.example.com");

        node.raw_config = json!({});
        node.port = 0;
        node.tls_host = Some(String::new());
        let endpoint = resolve_node(&node).endpoint;
        assert_eq!(endpoint.port, DEFAULT_PORT);
        assert_eq!(endpoint.tls_host, "node.example.com");
    }

    #[test]
    fn test_fallbacks() {
        let node = vless_node(json!({"config": {"port": 8443, "host": "cfg.example.com"}}));
        let endpoint = resolve_node(&node).endpoint;
        assert_eq!(endpoint.server, "node.example.com");
        assert_eq!(endpoint.port, 8443);
        assert_eq!(endpoint.tls_host, "cfg.example.com");

        let node = vless_node(json!({}));
        let endpoint = resolve_node(&node).endpoint;
        assert_eq!(endpoint.port, DEFAULT_PORT);
        assert_eq!(endpoint.tls_host, "node.example.com");
    }

    #[test]
    fn test_malformed_json_yields_defaults() {
        let node = vless_node(Value::String("{not json".to_string()));
        let resolved = resolve_node(&node);
        assert_eq!(resolved.endpoint.server, "node.example.com");
        assert_eq!(resolved.endpoint.port, DEFAULT_PORT);
        assert_eq!(resolved.endpoint.security, Security::None);
        assert_eq!(resolved.endpoint.transport, Transport::Tcp);
        assert_eq!(resolved.config, ProtocolConfig::Vless(VlessConfig::default()));
    }

    #[test]
    fn test_string_encoded_config() {
        let raw = r#"{"config":{"security":"reality","public_key":"pk","short_ids":"a1,b2","flow":"xtls-rprx-vision"}}"#;
        let node = vless_node(Value::String(raw.to_string()));
        let resolved = resolve_node(&node);
        assert_eq!(resolved.endpoint.security, Security::Reality);
        assert_eq!(resolved.endpoint.reality_pubkey.as_deref(), Some("pk"));
        assert_eq!(resolved.endpoint.reality_short_ids, vec!["a1", "b2"]);
        assert_eq!(
            resolved.config,
            ProtocolConfig::Vless(VlessConfig {
                flow: Some("xtls-rprx-vision".to_string())
            })
        );
    }

    #[test]
    fn test_transport_and_grpc_service_name() {
        let node = vless_node(json!({
            "config": {"network": "grpc", "serviceName": "tunnel", "tls": true, "alpn": "h2,http/1.1"}
        }));
        let endpoint = resolve_node(&node).endpoint;
        assert_eq!(endpoint.transport, Transport::Grpc);
        assert_eq!(endpoint.path.as_deref(), Some("tunnel"));
        assert_eq!(endpoint.security, Security::Tls);
        assert_eq!(endpoint.alpn, vec!["h2", "http/1.1"]);
    }
}
