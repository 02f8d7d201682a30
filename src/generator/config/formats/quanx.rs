use crate::models::{EntryFields, ProxyEntry};

/// Convert entries to a Quantumult X server list
///
/// Quantumult X imports subscriptions as bare `[server_local]` lines, one
/// per node in entry order.
pub fn proxy_to_quanx(entries: &[ProxyEntry]) -> String {
    let mut proxy_config = String::new();
    for entry in entries {
        if let EntryFields::Line(line) = &entry.fields {
            proxy_config.push_str(line);
            proxy_config.push('\n');
        }
    }
    proxy_config
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Protocol;

    #[test]
    fn test_lines_in_order() {
        let entries = vec![
            ProxyEntry {
                name: "B".to_string(),
                protocol: Protocol::Shadowsocks,
                fields: EntryFields::Line("shadowsocks=b.com:1, tag=B".to_string()),
            },
            ProxyEntry {
                name: "A".to_string(),
                protocol: Protocol::Trojan,
                fields: EntryFields::Line("trojan=a.com:2, tag=A".to_string()),
            },
        ];
        assert_eq!(
            proxy_to_quanx(&entries),
            "shadowsocks=b.com:1, tag=B\ntrojan=a.com:2, tag=A\n"
        );
    }
}
