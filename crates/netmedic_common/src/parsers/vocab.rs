//! Bilingual vocabulary for console output (Simplified Chinese / English).
//!
//! Every localized keyword the parsers match on lives here. Matching is done on
//! lowercased lines, so the English entries are lowercase.

/// Section markers in `ipconfig /all`, tried in order
pub const ADAPTER_SECTION_MARKERS: &[&str] = &["适配器", "adapter"];

pub const DHCP_KEY: &str = "dhcp";
pub const AFFIRMATIVE: &[&str] = &["是", "yes"];

pub const IPV4_KEYS: &[&str] = &["ipv4", "ip address"];
pub const SUBNET_MASK_KEYS: &[&str] = &["子网掩码", "subnet mask"];
pub const GATEWAY_KEYS: &[&str] = &["默认网关", "default gateway"];
pub const DNS_KEY: &str = "dns";

/// `netsh interface show interface` admin-state column
pub const ADMIN_ENABLED: &[&str] = &["enabled", "已启用"];
pub const ADMIN_DISABLED: &[&str] = &["disabled", "已禁用"];

/// `netsh interface show interface` connection-state column
pub const STATE_CONNECTED: &[&str] = &["connected", "已连接"];
pub const STATE_DISCONNECTED: &[&str] = &["disconnected", "已断开连接"];

/// `netsh interface show interface` type column
pub const TYPE_LOOPBACK: &[&str] = &["loopback", "环回"];

/// Domains whose redirection away from loopback is treated as hijacking
pub const WELL_KNOWN_DOMAINS: &[&str] = &[
    "www.baidu.com",
    "www.google.com",
    "www.qq.com",
    "www.taobao.com",
    "www.jd.com",
    "www.163.com",
    "www.sina.com.cn",
    "www.weibo.com",
    "www.alipay.com",
    "www.tmall.com",
];

pub const LOOPBACK_ADDRESSES: &[&str] = &["127.0.0.1", "::1"];

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| haystack.contains(needle))
}

pub fn matches_any(word: &str, words: &[&str]) -> bool {
    let lower = word.to_lowercase();
    words.iter().any(|candidate| *candidate == lower)
}
