use serde_json::json;

use super::common::{
    alpn_list, clash_transport, is_tcp_or_ws, link_network, link_transport_params,
    singbox_outbound, singbox_tls, singbox_transport,
};
use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions};
use crate::models::{EntryFields, SubscriptionTarget, Transport};
use crate::utils::url::{build_query, url_encode};

pub fn encode(ctx: &EncodeContext<'_>, target: SubscriptionTarget) -> Option<EntryFields> {
    if ctx.user.passwd.is_empty() {
        return None;
    }

    match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            Some(EntryFields::Link(link(ctx)))
        }
        SubscriptionTarget::Clash => Some(EntryFields::Clash(clash(ctx))),
        SubscriptionTarget::SingBox => singbox(ctx).map(EntryFields::SingBox),
        SubscriptionTarget::QuantumultX => quanx(ctx).map(EntryFields::Line),
        SubscriptionTarget::Surge => surge(ctx).map(EntryFields::Line),
    }
}

/// `trojan://{password}@{host}:{port}?sni=..#{name}`
pub fn link(ctx: &EncodeContext<'_>) -> String {
    let endpoint = ctx.endpoint;
    let alpn = endpoint.alpn_joined();
    let mut params: Vec<(&str, Option<&str>)> = vec![
        ("security", Some("tls")),
        ("sni", Some(endpoint.server_name())),
        ("alpn", alpn.as_deref()),
    ];
    if endpoint.transport != Transport::Tcp {
        params.push(("type", Some(link_network(endpoint.transport))));
        params.extend(link_transport_params(endpoint));
    }
    if endpoint.allow_insecure {
        params.push(("allowInsecure", Some("1")));
    }

    format!(
        "trojan://{}@{}?{}#{}",
        url_encode(&ctx.user.passwd),
        endpoint.authority(),
        build_query(&params),
        url_encode(ctx.name)
    )
}

fn clash(ctx: &EncodeContext<'_>) -> ClashProxy {
    let endpoint = ctx.endpoint;
    ClashProxy::Trojan {
        common: CommonProxyOptions::new(ctx.name, &endpoint.server, endpoint.port)
            .udp(true)
            .skip_cert_verify(endpoint.allow_insecure),
        password: ctx.user.passwd.clone(),
        sni: endpoint.server_name().to_string(),
        alpn: alpn_list(endpoint),
        transport: clash_transport(endpoint),
    }
}

fn singbox(ctx: &EncodeContext<'_>) -> Option<serde_json::Value> {
    let endpoint = ctx.endpoint;
    let mut outbound = singbox_outbound("trojan", ctx.name, endpoint);
    outbound["password"] = json!(ctx.user.passwd);
    outbound["tls"] = singbox_tls(endpoint, ctx.short_id, true)?;
    if let Some(transport) = singbox_transport(endpoint) {
        outbound["transport"] = transport;
    }
    Some(outbound)
}

fn quanx(ctx: &EncodeContext<'_>) -> Option<String> {
    let endpoint = ctx.endpoint;
    if !is_tcp_or_ws(endpoint) {
        return None;
    }

    let mut line = format!(
        "trojan={}, password={}",
        endpoint.authority(),
        ctx.user.passwd
    );
    if endpoint.transport == Transport::Ws {
        line.push_str(&format!(
            ", obfs=wss, obfs-uri={}",
            endpoint.path_or_default()
        ));
        if let Some(host) = &endpoint.host_header {
            line.push_str(&format!(", obfs-host={}", host));
        }
    } else {
        line.push_str(", over-tls=true");
    }
    line.push_str(&format!(", tls-host={}", endpoint.server_name()));
    if endpoint.allow_insecure {
        line.push_str(", tls-verification=false");
    }
    line.push_str(&format!(", udp-relay=true, tag={}", ctx.name));
    Some(line)
}

fn surge(ctx: &EncodeContext<'_>) -> Option<String> {
    let endpoint = ctx.endpoint;
    if !is_tcp_or_ws(endpoint) {
        return None;
    }

    let mut line = format!(
        "{} = trojan, {}, {}, password={}, sni={}",
        ctx.name,
        endpoint.server,
        endpoint.port,
        ctx.user.passwd,
        endpoint.server_name()
    );
    if endpoint.transport == Transport::Ws {
        line.push_str(&format!(", ws=true, ws-path={}", endpoint.path_or_default()));
        if let Some(host) = &endpoint.host_header {
            line.push_str(&format!(", ws-headers=Host:{}", host));
        }
    }
    if endpoint.allow_insecure {
        line.push_str(", skip-cert-verify=true");
    }
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointDescriptor, User};

    fn user() -> User {
        User {
            passwd: "p@ss word".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_with_ws() {
        let user = user();
        let endpoint = EndpointDescriptor {
            server: "jp.example.com".to_string(),
            port: 443,
            tls_host: "jp.example.com".to_string(),
            transport: Transport::Ws,
            path: Some("/tj".to_string()),
            host_header: Some("cdn.example.com".to_string()),
            ..Default::default()
        };
        let ctx = EncodeContext {
            name: "JP-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        assert_eq!(
            link(&ctx),
            "trojan://p%40ss%20word@jp.example.com:443?security=tls&sni=jp.example.com\
             &type=ws&path=%2Ftj&host=cdn.example.com#JP-1"
        );
    }

    #[test]
    fn test_grpc_skipped_for_line_targets() {
        let user = user();
        let endpoint = EndpointDescriptor {
            server: "jp.example.com".to_string(),
            tls_host: "jp.example.com".to_string(),
            transport: Transport::Grpc,
            path: Some("svc".to_string()),
            ..Default::default()
        };
        let ctx = EncodeContext {
            name: "JP-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        assert!(encode(&ctx, SubscriptionTarget::QuantumultX).is_none());
        assert!(encode(&ctx, SubscriptionTarget::Surge).is_none());
        let Some(EntryFields::SingBox(outbound)) = encode(&ctx, SubscriptionTarget::SingBox)
        else {
            panic!("expected sing-box outbound");
        };
        assert_eq!(outbound["transport"]["service_name"], "svc");
        assert_eq!(outbound["tls"]["enabled"], true);
    }

    #[test]
    fn test_surge_line() {
        let user = User {
            passwd: "secret".to_string(),
            ..Default::default()
        };
        let endpoint = EndpointDescriptor {
            server: "jp.example.com".to_string(),
            port: 443,
            tls_host: "jp.example.com".to_string(),
            allow_insecure: true,
            ..Default::default()
        };
        let ctx = EncodeContext {
            name: "JP-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        assert_eq!(
            surge(&ctx).unwrap(),
            "JP-1 = trojan, jp.example.com, 443, password=secret, sni=jp.example.com, skip-cert-verify=true"
        );
    }
}
