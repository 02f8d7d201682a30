//! Transport and TLS fragments shared by several encoders

use serde_json::{json, Value};

use crate::generator::yaml::clash_output::{GrpcOpts, H2Opts, TransportOpts, WsHeaders, WsOpts};
use crate::models::{EndpointDescriptor, Security, Transport};

/// Fingerprint sent when a Reality node does not name one
pub const DEFAULT_FINGERPRINT: &str = "chrome";

/// Transports that the line-oriented clients can carry
pub fn is_tcp_or_ws(endpoint: &EndpointDescriptor) -> bool {
    matches!(endpoint.transport, Transport::Tcp | Transport::Ws)
}

/// Transport name as used in share links and VMess JSON
pub fn link_network(transport: Transport) -> &'static str {
    match transport {
        Transport::Http => "h2",
        other => other.as_str(),
    }
}

pub fn alpn_list(endpoint: &EndpointDescriptor) -> Option<Vec<String>> {
    if endpoint.alpn.is_empty() {
        None
    } else {
        Some(endpoint.alpn.clone())
    }
}

/// Query parameters describing the transport of a share link
pub fn link_transport_params(endpoint: &EndpointDescriptor) -> Vec<(&'static str, Option<&str>)> {
    match endpoint.transport {
        Transport::Tcp => Vec::new(),
        Transport::Ws | Transport::Http => vec![
            ("path", Some(endpoint.path_or_default())),
            ("host", endpoint.host_header.as_deref()),
        ],
        Transport::Grpc => vec![("serviceName", endpoint.path.as_deref())],
    }
}

/// Clash `network` plus its options block
pub fn clash_transport(endpoint: &EndpointDescriptor) -> TransportOpts {
    match endpoint.transport {
        Transport::Tcp => TransportOpts::default(),
        Transport::Ws => TransportOpts {
            network: Some("ws".to_string()),
            ws_opts: Some(WsOpts {
                path: endpoint.path_or_default().to_string(),
                headers: endpoint.host_header.as_ref().map(|host| WsHeaders {
                    host: host.clone(),
                }),
            }),
            ..Default::default()
        },
        Transport::Grpc => TransportOpts {
            network: Some("grpc".to_string()),
            grpc_opts: Some(GrpcOpts {
                grpc_service_name: endpoint.path.clone().unwrap_or_default(),
            }),
            ..Default::default()
        },
        Transport::Http => TransportOpts {
            network: Some("h2".to_string()),
            h2_opts: Some(H2Opts {
                host: vec![endpoint
                    .host_header
                    .clone()
                    .unwrap_or_else(|| endpoint.tls_host.clone())],
                path: endpoint.path_or_default().to_string(),
            }),
            ..Default::default()
        },
    }
}

/// sing-box `transport` object, `None` for plain TCP
pub fn singbox_transport(endpoint: &EndpointDescriptor) -> Option<Value> {
    match endpoint.transport {
        Transport::Tcp => None,
        Transport::Ws => {
            let mut transport = json!({
                "type": "ws",
                "path": endpoint.path_or_default(),
            });
            if let Some(host) = &endpoint.host_header {
                transport["headers"] = json!({ "Host": host });
            }
            Some(transport)
        }
        Transport::Grpc => Some(json!({
            "type": "grpc",
            "service_name": endpoint.path.clone().unwrap_or_default(),
        })),
        Transport::Http => {
            let mut transport = json!({
                "type": "http",
                "path": endpoint.path_or_default(),
            });
            if let Some(host) = &endpoint.host_header {
                transport["host"] = json!([host]);
            }
            Some(transport)
        }
    }
}

/// sing-box `tls` object.
///
/// `force` enables TLS for protocols that always run over it regardless of
/// the resolved security mode. Reality without a public key yields `None`.
pub fn singbox_tls(
    endpoint: &EndpointDescriptor,
    short_id: Option<&str>,
    force: bool,
) -> Option<Value> {
    match endpoint.security {
        Security::None if !force => None,
        Security::Reality => {
            let public_key = endpoint.reality_pubkey.as_deref()?;
            Some(json!({
                "enabled": true,
                "server_name": endpoint.server_name(),
                "utls": {
                    "enabled": true,
                    "fingerprint": endpoint.fingerprint.as_deref().unwrap_or(DEFAULT_FINGERPRINT),
                },
                "reality": {
                    "enabled": true,
                    "public_key": public_key,
                    "short_id": short_id.unwrap_or_default(),
                },
            }))
        }
        _ => {
            let mut tls = json!({
                "enabled": true,
                "server_name": endpoint.server_name(),
            });
            if endpoint.allow_insecure {
                tls["insecure"] = json!(true);
            }
            if !endpoint.alpn.is_empty() {
                tls["alpn"] = json!(endpoint.alpn);
            }
            if let Some(fingerprint) = &endpoint.fingerprint {
                tls["utls"] = json!({ "enabled": true, "fingerprint": fingerprint });
            }
            Some(tls)
        }
    }
}

/// Base sing-box outbound: `type`, `tag`, `server`, `server_port`
pub fn singbox_outbound(kind: &str, tag: &str, endpoint: &EndpointDescriptor) -> Value {
    json!({
        "type": kind,
        "tag": tag,
        "server": endpoint.server,
        "server_port": endpoint.port,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ws_endpoint() -> EndpointDescriptor {
        EndpointDescriptor {
            server: "example.com".to_string(),
            tls_host: "example.com".to_string(),
            transport: Transport::Ws,
            path: Some("/ray".to_string()),
            host_header: Some("cdn.example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clash_ws_transport() {
        let opts = clash_transport(&ws_endpoint());
        assert_eq!(opts.network.as_deref(), Some("ws"));
        let ws = opts.ws_opts.unwrap();
        assert_eq!(ws.path, "/ray");
        assert_eq!(ws.headers.unwrap().host, "cdn.example.com");
        assert!(opts.grpc_opts.is_none());
    }

    #[test]
    fn test_singbox_transport_and_tls() {
        let endpoint = ws_endpoint();
        let transport = singbox_transport(&endpoint).unwrap();
        assert_eq!(transport["type"], "ws");
        assert_eq!(transport["headers"]["Host"], "cdn.example.com");

        assert!(singbox_tls(&endpoint, None, false).is_none());
        let tls = singbox_tls(&endpoint, None, true).unwrap();
        assert_eq!(tls["server_name"], "example.com");
        assert!(tls.get("reality").is_none());
    }

    #[test]
    fn test_singbox_reality_requires_public_key() {
        let mut endpoint = EndpointDescriptor {
            security: Security::Reality,
            tls_host: "www.microsoft.com".to_string(),
            ..Default::default()
        };
        assert!(singbox_tls(&endpoint, Some("ab"), false).is_none());

        endpoint.reality_pubkey = Some("pbk".to_string());
        let tls = singbox_tls(&endpoint, Some("ab"), false).unwrap();
        assert_eq!(tls["reality"]["public_key"], "pbk");
        assert_eq!(tls["reality"]["short_id"], "ab");
        assert_eq!(tls["utls"]["fingerprint"], DEFAULT_FINGERPRINT);
    }

    #[test]
    fn test_link_params_for_grpc() {
        let endpoint = EndpointDescriptor {
            transport: Transport::Grpc,
            path: Some("svc".to_string()),
            ..Default::default()
        };
        assert_eq!(link_transport_params(&endpoint), vec![("serviceName", Some("svc"))]);
    }
}
