use serde_json::json;

use super::common::{
    alpn_list, clash_transport, is_tcp_or_ws, link_network, link_transport_params,
    singbox_outbound, singbox_tls, singbox_transport, DEFAULT_FINGERPRINT,
};
use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions, RealityOpts};
use crate::models::{EntryFields, Security, SubscriptionTarget, Transport};
use crate::parser::VlessConfig;
use crate::utils::url::{build_query, url_encode};

pub fn encode(
    ctx: &EncodeContext<'_>,
    config: &VlessConfig,
    target: SubscriptionTarget,
) -> Option<EntryFields> {
    if ctx.user.uuid.is_empty() {
        return None;
    }
    // Reality cannot be expressed without the server's public key
    if ctx.endpoint.security == Security::Reality && ctx.endpoint.reality_pubkey.is_none() {
        return None;
    }

    match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            Some(EntryFields::Link(link(ctx, config)))
        }
        SubscriptionTarget::Clash => Some(EntryFields::Clash(clash(ctx, config))),
        SubscriptionTarget::SingBox => singbox(ctx, config).map(EntryFields::SingBox),
        SubscriptionTarget::QuantumultX => quanx(ctx).map(EntryFields::Line),
        SubscriptionTarget::Surge => None,
    }
}

fn fingerprint<'a>(ctx: &'a EncodeContext<'_>) -> &'a str {
    ctx.endpoint
        .fingerprint
        .as_deref()
        .unwrap_or(DEFAULT_FINGERPRINT)
}

/// `vless://{uuid}@{host}:{port}?encryption=none&type=..&security=..#{name}`
pub fn link(ctx: &EncodeContext<'_>, config: &VlessConfig) -> String {
    let endpoint = ctx.endpoint;
    let network = match endpoint.transport {
        Transport::Http => "http",
        other => link_network(other),
    };

    let mut params: Vec<(&str, Option<&str>)> = vec![
        ("encryption", Some("none")),
        ("type", Some(network)),
        ("security", Some(endpoint.security.as_str())),
        ("flow", config.flow.as_deref()),
    ];

    let alpn = endpoint.alpn_joined();
    match endpoint.security {
        Security::Reality => {
            params.push(("pbk", endpoint.reality_pubkey.as_deref()));
            params.push(("fp", Some(fingerprint(ctx))));
            params.push(("sid", ctx.short_id));
            params.push(("sni", Some(endpoint.server_name())));
        }
        Security::Tls => {
            params.push(("sni", Some(endpoint.server_name())));
            params.push(("alpn", alpn.as_deref()));
            params.push(("fp", endpoint.fingerprint.as_deref()));
            if endpoint.allow_insecure {
                params.push(("allowInsecure", Some("1")));
            }
        }
        Security::None => {}
    }
    params.extend(link_transport_params(endpoint));

    format!(
        "vless://{}@{}?{}#{}",
        ctx.user.uuid,
        endpoint.authority(),
        build_query(&params),
        url_encode(ctx.name)
    )
}

fn clash(ctx: &EncodeContext<'_>, config: &VlessConfig) -> ClashProxy {
    let endpoint = ctx.endpoint;
    let security = endpoint.security;
    ClashProxy::Vless {
        common: CommonProxyOptions::new(ctx.name, &endpoint.server, endpoint.port)
            .udp(true)
            .skip_cert_verify(endpoint.allow_insecure),
        uuid: ctx.user.uuid.clone(),
        tls: security != Security::None,
        servername: (security != Security::None).then(|| endpoint.server_name().to_string()),
        flow: config.flow.clone(),
        client_fingerprint: match security {
            Security::Reality => Some(fingerprint(ctx).to_string()),
            _ => endpoint.fingerprint.clone(),
        },
        reality_opts: match security {
            Security::Reality => Some(RealityOpts {
                public_key: endpoint.reality_pubkey.clone().unwrap_or_default(),
                short_id: ctx.short_id.unwrap_or_default().to_string(),
            }),
            _ => None,
        },
        alpn: match security {
            Security::Tls => alpn_list(endpoint),
            _ => None,
        },
        transport: clash_transport(endpoint),
    }
}

fn singbox(ctx: &EncodeContext<'_>, config: &VlessConfig) -> Option<serde_json::Value> {
    let endpoint = ctx.endpoint;
    let mut outbound = singbox_outbound("vless", ctx.name, endpoint);
    outbound["uuid"] = json!(ctx.user.uuid);
    if let Some(flow) = &config.flow {
        outbound["flow"] = json!(flow);
    }
    if endpoint.security != Security::None {
        outbound["tls"] = singbox_tls(endpoint, ctx.short_id, false)?;
    }
    if let Some(transport) = singbox_transport(endpoint) {
        outbound["transport"] = transport;
    }
    Some(outbound)
}

fn quanx(ctx: &EncodeContext<'_>) -> Option<String> {
    let endpoint = ctx.endpoint;
    if !is_tcp_or_ws(endpoint) || endpoint.security == Security::Reality {
        return None;
    }

    let mut line = format!(
        "vless={}, method=none, password={}",
        endpoint.authority(),
        ctx.user.uuid
    );
    let tls = endpoint.security == Security::Tls;
    match (endpoint.transport, tls) {
        (Transport::Ws, true) => line.push_str(", obfs=wss"),
        (Transport::Ws, false) => line.push_str(", obfs=ws"),
        (_, true) => line.push_str(", obfs=over-tls"),
        _ => {}
    }
    if endpoint.transport == Transport::Ws {
        line.push_str(&format!(", obfs-uri={}", endpoint.path_or_default()));
        if let Some(host) = &endpoint.host_header {
            line.push_str(&format!(", obfs-host={}", host));
        }
    }
    if tls {
        line.push_str(&format!(", tls-host={}", endpoint.server_name()));
    }
    line.push_str(&format!(", tag={}", ctx.name));
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointDescriptor, User};

    fn user() -> User {
        User {
            uuid: "b831381d-6324-4d53-ad4f-8cda48b30811".to_string(),
            ..Default::default()
        }
    }

    fn reality_endpoint() -> EndpointDescriptor {
        EndpointDescriptor {
            server: "us.example.com".to_string(),
            port: 443,
            tls_host: "www.microsoft.com".to_string(),
            security: Security::Reality,
            reality_pubkey: Some("Z84J2IelR9ch3k8VtlVhhs5ycBUlXA7wHBWcBrjqnAw".to_string()),
            reality_short_ids: vec!["6ba85179e30d4fc2".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_reality_link() {
        let user = user();
        let endpoint = reality_endpoint();
        let ctx = EncodeContext {
            name: "US Reality",
            endpoint: &endpoint,
            user: &user,
            short_id: Some("6ba85179e30d4fc2"),
        };
        let config = VlessConfig {
            flow: Some("xtls-rprx-vision".to_string()),
        };
        assert_eq!(
            link(&ctx, &config),
            format!(
                "vless://{}@us.example.com:443?encryption=none&type=tcp&security=reality\
                 &flow=xtls-rprx-vision&pbk=Z84J2IelR9ch3k8VtlVhhs5ycBUlXA7wHBWcBrjqnAw\
                 &fp=chrome&sid=6ba85179e30d4fc2&sni=www.microsoft.com#US%20Reality",
                user.uuid
            )
        );
    }

    #[test]
    fn test_reality_without_public_key_is_skipped() {
        let user = user();
        let mut endpoint = reality_endpoint();
        endpoint.reality_pubkey = None;
        let ctx = EncodeContext {
            name: "US Reality",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        for target in [
            SubscriptionTarget::V2Ray,
            SubscriptionTarget::Clash,
            SubscriptionTarget::SingBox,
        ] {
            assert!(encode(&ctx, &VlessConfig::default(), target).is_none());
        }
    }

    #[test]
    fn test_clash_reality_opts() {
        let user = user();
        let endpoint = reality_endpoint();
        let ctx = EncodeContext {
            name: "US Reality",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        let ClashProxy::Vless {
            tls,
            servername,
            client_fingerprint,
            reality_opts,
            ..
        } = clash(&ctx, &VlessConfig::default())
        else {
            panic!("expected vless proxy");
        };
        assert!(tls);
        assert_eq!(servername.as_deref(), Some("www.microsoft.com"));
        assert_eq!(client_fingerprint.as_deref(), Some("chrome"));
        let reality = reality_opts.unwrap();
        assert!(reality.short_id.is_empty());
        let yaml = serde_yaml::to_string(&reality).unwrap();
        assert!(!yaml.contains("short-id"));
    }

    #[test]
    fn test_quanx_and_surge_support() {
        let user = user();
        let endpoint = reality_endpoint();
        let ctx = EncodeContext {
            name: "US Reality",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        assert!(encode(&ctx, &VlessConfig::default(), SubscriptionTarget::QuantumultX).is_none());
        assert!(encode(&ctx, &VlessConfig::default(), SubscriptionTarget::Surge).is_none());

        let tls_endpoint = EndpointDescriptor {
            security: Security::Tls,
            ..reality_endpoint()
        };
        let ctx = EncodeContext {
            endpoint: &tls_endpoint,
            ..ctx
        };
        let line = quanx(&ctx).unwrap();
        assert!(line.starts_with("vless=us.example.com:443, method=none"));
        assert!(line.contains("obfs=over-tls"));
        assert!(line.ends_with("tag=US Reality"));
    }
}
