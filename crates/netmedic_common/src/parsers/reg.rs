//! Parser for `reg query` output.
//!
//! ```text
//! HKEY_CURRENT_USER\Software\Microsoft\Windows\CurrentVersion\Internet Settings
//!     ProxyEnable    REG_DWORD    0x1
//!     ProxyServer    REG_SZ    127.0.0.1:7890
//! ```

use serde::{Deserialize, Serialize};

/// A registry value as printed by `reg query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum RegValue {
    Dword(u32),
    /// REG_SZ, REG_EXPAND_SZ and anything else, kept as printed
    Text(String),
}

impl RegValue {
    pub fn as_dword(&self) -> Option<u32> {
        match self {
            RegValue::Dword(value) => Some(*value),
            RegValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RegValue::Text(value) => Some(value),
            RegValue::Dword(_) => None,
        }
    }
}

/// All `name REG_TYPE data` rows, in output order
pub fn parse_reg_values(output: &str) -> Vec<(String, RegValue)> {
    output.lines().filter_map(parse_row).collect()
}

/// The named value, matched case-insensitively like the registry does
pub fn find_reg_value(output: &str, name: &str) -> Option<RegValue> {
    parse_reg_values(output)
        .into_iter()
        .find(|(value_name, _)| value_name.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}

fn parse_row(line: &str) -> Option<(String, RegValue)> {
    let line = line.trim();
    let mut tokens = line.split_whitespace();
    let name = tokens.next()?;
    let kind = tokens.next()?;
    if !kind.starts_with("REG_") {
        return None;
    }

    let after_name = &line[name.len()..];
    let data_start = after_name.find(kind)? + kind.len();
    let data = after_name[data_start..].trim();

    let value = if kind == "REG_DWORD" {
        RegValue::Dword(parse_dword(data)?)
    } else {
        RegValue::Text(data.to_string())
    };
    Some((name.to_string(), value))
}

fn parse_dword(data: &str) -> Option<u32> {
    match data.strip_prefix("0x").or_else(|| data.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => data.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUERY: &str = "\r\n\
HKEY_CURRENT_USER\\Software\\Microsoft\\Windows\\CurrentVersion\\Internet Settings\r\n\
    ProxyEnable    REG_DWORD    0x1\r\n\
    ProxyServer    REG_SZ    127.0.0.1:7890\r\n\
    ProxyOverride    REG_SZ    localhost;127.*;<local>\r\n\
    AutoConfigURL    REG_SZ    \r\n\
    User Agent    REG_SZ    Mozilla/4.0 (compatible; MSIE 8.0)\r\n";

    #[test]
    fn test_dword_and_strings() {
        assert_eq!(find_reg_value(QUERY, "ProxyEnable"), Some(RegValue::Dword(1)));
        assert_eq!(
            find_reg_value(QUERY, "proxyserver").and_then(|v| v.as_text().map(String::from)),
            Some("127.0.0.1:7890".to_string())
        );
        assert_eq!(
            find_reg_value(QUERY, "ProxyOverride"),
            Some(RegValue::Text("localhost;127.*;<local>".to_string()))
        );
    }

    #[test]
    fn test_empty_string_value() {
        assert_eq!(find_reg_value(QUERY, "AutoConfigURL"), Some(RegValue::Text(String::new())));
    }

    #[test]
    fn test_key_line_and_missing_value() {
        let values = parse_reg_values(QUERY);
        assert!(values.iter().all(|(name, _)| !name.starts_with("HKEY_")));
        assert_eq!(find_reg_value(QUERY, "ProxyBypass"), None);
    }

    #[test]
    fn test_dword_zero() {
        let output = "    ProxyEnable    REG_DWORD    0x0\n";
        assert_eq!(find_reg_value(output, "ProxyEnable").and_then(|v| v.as_dword()), Some(0));
    }
}
