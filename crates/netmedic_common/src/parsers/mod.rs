//! Text extraction for console output and system files.
//!
//! Pure functions over already-decoded text. Nothing here runs commands or
//! touches the filesystem, so every parser is tested against literal fixtures.
//!
//! # Supported inputs
//!
//! - `ipconfig /all`: per-adapter IP configuration → `Vec<AdapterConfig>`
//! - hosts file: mapping lines → `Vec<HostsEntry>` with the redirect classifier applied
//! - `netsh interface show interface`: interface table → `Vec<NetshInterface>`
//! - `reg query`: registry values → `RegValue`
//!
//! Localized keywords for both supported languages are in `vocab`.

pub mod hosts;
pub mod ipconfig;
pub mod netsh;
pub mod reg;
mod vocab;

pub use hosts::{is_loopback, is_suspicious, parse_hosts};
pub use ipconfig::parse_ipconfig;
pub use netsh::{parse_interface_table, NetshInterface};
pub use reg::{find_reg_value, parse_reg_values, RegValue};
pub use vocab::WELL_KNOWN_DOMAINS;

use once_cell::sync::Lazy;
use regex::Regex;

static DOTTED_QUAD: Lazy<Regex> =
    Lazy::new(|| {
        Regex::new(r"\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}").expect("valid dotted quad pattern")
    });

/// First IPv4-looking token on the line. No range check on the octets.
pub fn first_dotted_quad(line: &str) -> Option<&str> {
    DOTTED_QUAD.find(line).map(|m| m.as_str())
}
