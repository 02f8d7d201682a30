use serde::{Deserialize, Serialize};

/// Credential view of a subscriber.
///
/// `uuid` doubles as the VMess/VLESS id and `passwd` as the Trojan,
/// Shadowsocks, Hysteria2 and AnyTLS password.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: i64,
    pub uuid: String,
    pub passwd: String,
    /// Traffic quota in bytes, 0 means unlimited
    pub transfer_enable: u64,
    pub transfer_total: u64,
    pub upload_traffic: u64,
    pub download_traffic: u64,
    /// Unix timestamp in seconds, 0 means never
    pub expire_time: i64,
}

impl User {
    pub fn used_traffic(&self) -> u64 {
        self.upload_traffic.saturating_add(self.download_traffic)
    }

    pub fn is_expired(&self, now: i64) -> bool {
        self.expire_time > 0 && self.expire_time <= now
    }

    pub fn is_quota_exhausted(&self) -> bool {
        self.transfer_enable > 0 && self.used_traffic() >= self.transfer_enable
    }

    /// Value of the `Subscription-Userinfo` header
    pub fn userinfo_header(&self) -> String {
        format!(
            "upload={}; download={}; total={}; expire={}",
            self.upload_traffic,
            self.download_traffic,
            self.transfer_enable,
            self.expire_time.max(0)
        )
    }
}
