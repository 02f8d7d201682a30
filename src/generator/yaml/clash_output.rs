use serde::Serialize;

/// Represents a complete Clash configuration output.
///
/// Field order here is the key order of the emitted YAML document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashYamlOutput {
    pub mixed_port: u16,
    pub allow_lan: bool,
    pub mode: String,
    pub log_level: String,
    pub external_controller: String,
    pub dns: ClashDns,
    pub proxies: Vec<ClashProxy>,
    pub proxy_groups: Vec<ClashProxyGroup>,
    pub rules: Vec<String>,
}

/// DNS configuration for Clash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashDns {
    pub enable: bool,
    pub ipv6: bool,
    pub enhanced_mode: String,
    pub fake_ip_range: String,
    pub default_nameserver: Vec<String>,
    pub nameserver: Vec<String>,
    pub fallback: Vec<String>,
    pub fallback_filter: ClashDnsFallbackFilter,
}

/// DNS fallback filter configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClashDnsFallbackFilter {
    pub geoip: bool,
    pub geoip_code: String,
    pub ipcidr: Vec<String>,
}

/// Proxy group in Clash configuration
#[derive(Debug, Clone, Serialize)]
pub struct ClashProxyGroup {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: String,
    pub proxies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<u32>,
}

/// Common proxy options that can be used across different proxy types
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommonProxyOptions {
    pub name: String,
    pub server: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub udp: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_cert_verify: Option<bool>,
}

impl CommonProxyOptions {
    pub fn new(name: &str, server: &str, port: u16) -> Self {
        Self {
            name: name.to_string(),
            server: server.to_string(),
            port,
            udp: None,
            skip_cert_verify: None,
        }
    }

    pub fn udp(mut self, value: bool) -> Self {
        self.udp = Some(value);
        self
    }

    /// Only written when verification is actually disabled
    pub fn skip_cert_verify(mut self, value: bool) -> Self {
        self.skip_cert_verify = if value { Some(true) } else { None };
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WsHeaders {
    #[serde(rename = "Host")]
    pub host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WsOpts {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<WsHeaders>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrpcOpts {
    #[serde(rename = "grpc-service-name")]
    pub grpc_service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct H2Opts {
    pub host: Vec<String>,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RealityOpts {
    pub public_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObfsPluginOpts {
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Transport options shared by the V2Ray family of protocols
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportOpts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ws_opts: Option<WsOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grpc_opts: Option<GrpcOpts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h2_opts: Option<H2Opts>,
}

/// Represents a single proxy in Clash configuration
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all_fields = "kebab-case")]
pub enum ClashProxy {
    #[serde(rename = "vmess")]
    VMess {
        #[serde(flatten)]
        common: CommonProxyOptions,
        uuid: String,
        #[serde(rename = "alterId")]
        alter_id: u32,
        cipher: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tls: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        servername: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        alpn: Option<Vec<String>>,
        #[serde(flatten)]
        transport: TransportOpts,
    },
    #[serde(rename = "vless")]
    Vless {
        #[serde(flatten)]
        common: CommonProxyOptions,
        uuid: String,
        tls: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        servername: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        flow: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        client_fingerprint: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        reality_opts: Option<RealityOpts>,
        #[serde(skip_serializing_if = "Option::is_none")]
        alpn: Option<Vec<String>>,
        #[serde(flatten)]
        transport: TransportOpts,
    },
    #[serde(rename = "trojan")]
    Trojan {
        #[serde(flatten)]
        common: CommonProxyOptions,
        password: String,
        sni: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alpn: Option<Vec<String>>,
        #[serde(flatten)]
        transport: TransportOpts,
    },
    #[serde(rename = "ss")]
    Shadowsocks {
        #[serde(flatten)]
        common: CommonProxyOptions,
        cipher: String,
        password: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        plugin_opts: Option<ObfsPluginOpts>,
    },
    #[serde(rename = "ssr")]
    ShadowsocksR {
        #[serde(flatten)]
        common: CommonProxyOptions,
        cipher: String,
        password: String,
        protocol: String,
        protocol_param: String,
        obfs: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        obfs_param: Option<String>,
    },
    #[serde(rename = "hysteria2")]
    Hysteria2 {
        #[serde(flatten)]
        common: CommonProxyOptions,
        password: String,
        sni: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        up: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        down: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        obfs: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        obfs_password: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        alpn: Option<Vec<String>>,
    },
    #[serde(rename = "anytls")]
    AnyTls {
        #[serde(flatten)]
        common: CommonProxyOptions,
        password: String,
        sni: String,
        client_fingerprint: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alpn: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        idle_session_check_interval: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        idle_session_timeout: Option<u32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        min_idle_session: Option<u32>,
    },
}

impl ClashProxy {
    /// Options shared by every proxy type
    pub fn common(&self) -> &CommonProxyOptions {
        match self {
            ClashProxy::VMess { common, .. }
            | ClashProxy::Vless { common, .. }
            | ClashProxy::Trojan { common, .. }
            | ClashProxy::Shadowsocks { common, .. }
            | ClashProxy::ShadowsocksR { common, .. }
            | ClashProxy::Hysteria2 { common, .. }
            | ClashProxy::AnyTls { common, .. } => common,
        }
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }
}
