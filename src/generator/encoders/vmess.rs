use serde_json::json;

use super::common::{
    alpn_list, clash_transport, is_tcp_or_ws, link_network, singbox_outbound, singbox_tls,
    singbox_transport,
};
use super::EncodeContext;
use crate::generator::yaml::clash_output::{ClashProxy, CommonProxyOptions};
use crate::models::{EntryFields, Security, SubscriptionTarget, Transport};
use crate::parser::VmessConfig;
use crate::utils::base64::base64_encode;

pub fn encode(
    ctx: &EncodeContext<'_>,
    config: &VmessConfig,
    target: SubscriptionTarget,
) -> Option<EntryFields> {
    if ctx.user.uuid.is_empty() {
        return None;
    }

    match target {
        SubscriptionTarget::V2Ray | SubscriptionTarget::Shadowrocket => {
            Some(EntryFields::Link(link(ctx, config)))
        }
        SubscriptionTarget::Clash => Some(EntryFields::Clash(clash(ctx, config))),
        SubscriptionTarget::SingBox => Some(EntryFields::SingBox(singbox(ctx, config))),
        SubscriptionTarget::QuantumultX => quanx(ctx, config).map(EntryFields::Line),
        SubscriptionTarget::Surge => surge(ctx, config).map(EntryFields::Line),
    }
}

fn is_tls(ctx: &EncodeContext<'_>) -> bool {
    ctx.endpoint.security != Security::None
}

/// `vmess://` followed by the base64 of the v2rayN JSON object
pub fn link(ctx: &EncodeContext<'_>, config: &VmessConfig) -> String {
    let endpoint = ctx.endpoint;
    let tls = is_tls(ctx);
    let path = match endpoint.transport {
        Transport::Tcp => String::new(),
        Transport::Grpc => endpoint.path.clone().unwrap_or_default(),
        Transport::Ws | Transport::Http => endpoint.path_or_default().to_string(),
    };

    let vmess_json = json!({
        "v": "2",
        "ps": ctx.name,
        "add": endpoint.server,
        "port": endpoint.port.to_string(),
        "id": ctx.user.uuid,
        "aid": config.alter_id.to_string(),
        "net": link_network(endpoint.transport),
        "type": "none",
        "host": endpoint.host_header.clone().unwrap_or_default(),
        "path": path,
        "tls": if tls { "tls" } else { "" },
        "sni": if tls { endpoint.server_name() } else { "" },
        "alpn": endpoint.alpn_joined().unwrap_or_default(),
    });

    format!("vmess://{}", base64_encode(&vmess_json.to_string()))
}

fn clash(ctx: &EncodeContext<'_>, config: &VmessConfig) -> ClashProxy {
    let endpoint = ctx.endpoint;
    let tls = is_tls(ctx);
    ClashProxy::VMess {
        common: CommonProxyOptions::new(ctx.name, &endpoint.server, endpoint.port)
            .udp(true)
            .skip_cert_verify(endpoint.allow_insecure),
        uuid: ctx.user.uuid.clone(),
        alter_id: config.alter_id,
        cipher: config.cipher.clone().unwrap_or_else(|| "auto".to_string()),
        tls: tls.then_some(true),
        servername: tls.then(|| endpoint.server_name().to_string()),
        alpn: if tls { alpn_list(endpoint) } else { None },
        transport: clash_transport(endpoint),
    }
}

fn singbox(ctx: &EncodeContext<'_>, config: &VmessConfig) -> serde_json::Value {
    let endpoint = ctx.endpoint;
    let mut outbound = singbox_outbound("vmess", ctx.name, endpoint);
    outbound["uuid"] = json!(ctx.user.uuid);
    outbound["security"] = json!(config.cipher.as_deref().unwrap_or("auto"));
    outbound["alter_id"] = json!(config.alter_id);
    if let Some(tls) = singbox_tls(endpoint, None, false) {
        outbound["tls"] = tls;
    }
    if let Some(transport) = singbox_transport(endpoint) {
        outbound["transport"] = transport;
    }
    outbound
}

fn quanx(ctx: &EncodeContext<'_>, config: &VmessConfig) -> Option<String> {
    let endpoint = ctx.endpoint;
    if !is_tcp_or_ws(endpoint) {
        return None;
    }

    let method = match config.cipher.as_deref() {
        None | Some("auto") => "chacha20-poly1305",
        Some(cipher) => cipher,
    };
    let mut line = format!(
        "vmess={}, method={}, password={}",
        endpoint.authority(),
        method,
        ctx.user.uuid
    );

    let tls = is_tls(ctx);
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
        if endpoint.allow_insecure {
            line.push_str(", tls-verification=false");
        }
    }
    if config.alter_id == 0 {
        line.push_str(", aead=true");
    }
    line.push_str(&format!(", tag={}", ctx.name));
    Some(line)
}

fn surge(ctx: &EncodeContext<'_>, config: &VmessConfig) -> Option<String> {
    let endpoint = ctx.endpoint;
    if !is_tcp_or_ws(endpoint) {
        return None;
    }

    let mut line = format!(
        "{} = vmess, {}, {}, username={}",
        ctx.name, endpoint.server, endpoint.port, ctx.user.uuid
    );
    if endpoint.transport == Transport::Ws {
        line.push_str(&format!(", ws=true, ws-path={}", endpoint.path_or_default()));
        if let Some(host) = &endpoint.host_header {
            line.push_str(&format!(", ws-headers=Host:{}", host));
        }
    }
    if is_tls(ctx) {
        line.push_str(&format!(", tls=true, sni={}", endpoint.server_name()));
        if endpoint.allow_insecure {
            line.push_str(", skip-cert-verify=true");
        }
    }
    if config.alter_id == 0 {
        line.push_str(", vmess-aead=true");
    }
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointDescriptor, User};
    use crate::utils::base64::base64_decode;

    fn user() -> User {
        User {
            uuid: "b831381d-6324-4d53-ad4f-8cda48b30811".to_string(),
            ..Default::default()
        }
    }

    fn endpoint(transport: Transport) -> EndpointDescriptor {
        EndpointDescriptor {
            server: "hk.example.com".to_string(),
            port: 8443,
            tls_host: "hk.example.com".to_string(),
            security: Security::Tls,
            transport,
            path: Some("/ray".to_string()),
            host_header: Some("cdn.example.com".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_json_fields() {
        let user = user();
        let endpoint = endpoint(Transport::Ws);
        let ctx = EncodeContext {
            name: "HK-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        let link = link(&ctx, &VmessConfig::default());
        let blob = link.strip_prefix("vmess://").unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&base64_decode(blob)).unwrap();
        assert_eq!(decoded["add"], "hk.example.com");
        assert_eq!(decoded["port"], "8443");
        assert_eq!(decoded["id"], user.uuid.as_str());
        assert_eq!(decoded["net"], "ws");
        assert_eq!(decoded["tls"], "tls");
        assert_eq!(decoded["sni"], "hk.example.com");
        assert_eq!(decoded["host"], "cdn.example.com");
    }

    #[test]
    fn test_quanx_skips_grpc() {
        let user = user();
        let endpoint = endpoint(Transport::Grpc);
        let ctx = EncodeContext {
            name: "HK-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        assert!(encode(&ctx, &VmessConfig::default(), SubscriptionTarget::QuantumultX).is_none());
        assert!(encode(&ctx, &VmessConfig::default(), SubscriptionTarget::Surge).is_none());
        assert!(encode(&ctx, &VmessConfig::default(), SubscriptionTarget::Clash).is_some());
    }

    #[test]
    fn test_quanx_ws_tls_line() {
        let user = user();
        let endpoint = endpoint(Transport::Ws);
        let ctx = EncodeContext {
            name: "HK-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        let line = quanx(&ctx, &VmessConfig::default()).unwrap();
        assert_eq!(
            line,
            format!(
                "vmess=hk.example.com:8443, method=chacha20-poly1305, password={}, obfs=wss, \
                 obfs-uri=/ray, obfs-host=cdn.example.com, tls-host=hk.example.com, aead=true, tag=HK-1",
                user.uuid
            )
        );
    }

    #[test]
    fn test_missing_uuid_is_skipped() {
        let user = User::default();
        let endpoint = endpoint(Transport::Tcp);
        let ctx = EncodeContext {
            name: "HK-1",
            endpoint: &endpoint,
            user: &user,
            short_id: None,
        };
        assert!(encode(&ctx, &VmessConfig::default(), SubscriptionTarget::V2Ray).is_none());
    }
}
