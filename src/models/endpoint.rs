//! Normalized connection parameters of a node

/// Transport-layer security mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Security {
    #[default]
    None,
    Tls,
    Reality,
}

impl Security {
    pub fn as_str(self) -> &'static str {
        match self {
            Security::None => "none",
            Security::Tls => "tls",
            Security::Reality => "reality",
        }
    }
}

/// Stream framing carrying the proxy protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    #[default]
    Tcp,
    Ws,
    Grpc,
    Http,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Ws => "ws",
            Transport::Grpc => "grpc",
            Transport::Http => "http",
        }
    }
}

/// Where and how to reach a node.
///
/// Derived once per node by the resolver and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub server: String,
    pub port: u16,
    pub tls_host: String,
    pub security: Security,
    pub transport: Transport,
    pub path: Option<String>,
    pub host_header: Option<String>,
    pub sni: Option<String>,
    pub alpn: Vec<String>,
    pub reality_pubkey: Option<String>,
    pub reality_short_ids: Vec<String>,
    pub fingerprint: Option<String>,
    pub allow_insecure: bool,
}

impl Default for EndpointDescriptor {
    fn default() -> Self {
        EndpointDescriptor {
            server: String::new(),
            port: 443,
            tls_host: String::new(),
            security: Security::None,
            transport: Transport::Tcp,
            path: None,
            host_header: None,
            sni: None,
            alpn: Vec::new(),
            reality_pubkey: None,
            reality_short_ids: Vec::new(),
            fingerprint: None,
            allow_insecure: false,
        }
    }
}

impl EndpointDescriptor {
    /// SNI to present: the explicit one, else the TLS host
    pub fn server_name(&self) -> &str {
        self.sni
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.tls_host)
    }

    /// `host:port` with IPv6 literals bracketed
    pub fn authority(&self) -> String {
        if self.server.contains(':') && !self.server.starts_with('[') {
            format!("[{}]:{}", self.server, self.port)
        } else {
            format!("{}:{}", self.server, self.port)
        }
    }

    pub fn path_or_default(&self) -> &str {
        self.path.as_deref().unwrap_or("/")
    }

    pub fn alpn_joined(&self) -> Option<String> {
        if self.alpn.is_empty() {
            None
        } else {
            Some(self.alpn.join(","))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_brackets_ipv6() {
        let mut endpoint = EndpointDescriptor {
            server: "2001:db8::1".to_string(),
            port: 8443,
            ..Default::default()
        };
        assert_eq!(endpoint.authority(), "[2001:db8::1]:8443");
        endpoint.server = "example.com".to_string();
        assert_eq!(endpoint.authority(), "example.com:8443");
    }

    #[test]
    fn test_server_name_falls_back_to_tls_host() {
        let mut endpoint = EndpointDescriptor {
            tls_host: "cdn.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(endpoint.server_name(), "cdn.example.com");
        endpoint.sni = Some("sni.example.com".to_string());
        assert_eq!(endpoint.server_name(), "sni.example.com");
    }
}
