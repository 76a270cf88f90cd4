//! Parser for `netsh interface show interface`.
//!
//! ```text
//! Admin State    State          Type             Interface Name
//! -------------------------------------------------------------------------
//! Enabled        Connected      Dedicated        Ethernet
//! Disabled       Disconnected   Dedicated        Wi-Fi 2
//! ```
//!
//! The Chinese locale prints the same four columns (已启用 / 已连接 / 专用 / 以太网).
//! Rows are recognised by their admin-state word, which skips the header and the
//! dashed separator in either language.

use super::vocab::{
    matches_any, ADMIN_DISABLED, ADMIN_ENABLED, STATE_CONNECTED, STATE_DISCONNECTED,
    TYPE_LOOPBACK,
};
use crate::types::AdapterStatus;
use serde::{Deserialize, Serialize};

/// One row of the interface table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetshInterface {
    pub name: String,
    pub admin_enabled: bool,
    /// Administratively disabled interfaces are always Down
    pub status: AdapterStatus,
    pub loopback: bool,
}

pub fn parse_interface_table(output: &str) -> Vec<NetshInterface> {
    output.lines().filter_map(parse_row).collect()
}

fn parse_row(line: &str) -> Option<NetshInterface> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 4 {
        return None;
    }

    let admin_enabled = if matches_any(fields[0], ADMIN_ENABLED) {
        true
    } else if matches_any(fields[0], ADMIN_DISABLED) {
        false
    } else {
        return None;
    };

    let status = if !admin_enabled {
        AdapterStatus::Down
    } else if matches_any(fields[1], STATE_CONNECTED) {
        AdapterStatus::Up
    } else if matches_any(fields[1], STATE_DISCONNECTED) {
        AdapterStatus::Down
    } else {
        AdapterStatus::Unknown
    };

    Some(NetshInterface {
        name: fields[3..].join(" "),
        admin_enabled,
        status,
        loopback: matches_any(fields[2], TYPE_LOOPBACK),
    })
}
