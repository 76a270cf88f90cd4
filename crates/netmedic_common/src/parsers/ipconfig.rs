//! Parser for `ipconfig /all` output.
//!
//! Sections are split on the localized adapter marker. Each line is matched
//! against the bilingual key tables independently, so one line may feed more
//! than one field (a "DNS" line that also says "IPv4" lands in both lists).
//! Extra DNS servers are printed on unlabelled lines right after the
//! "DNS Servers" line; those are collected too.

use super::first_dotted_quad;
use super::vocab::{
    contains_any, ADAPTER_SECTION_MARKERS, AFFIRMATIVE, DHCP_KEY, DNS_KEY, GATEWAY_KEYS, IPV4_KEYS,
    SUBNET_MASK_KEYS,
};
use crate::types::AdapterConfig;

/// Parse decoded `ipconfig /all` text into per-adapter configurations, in output order.
///
/// Returns an empty list when no adapter marker is found.
pub fn parse_ipconfig(output: &str) -> Vec<AdapterConfig> {
    let Some(sections) = split_sections(output) else {
        return Vec::new();
    };

    sections
        .into_iter()
        .skip(1)
        .filter_map(parse_section)
        .collect()
}

fn split_sections(output: &str) -> Option<Vec<&str>> {
    ADAPTER_SECTION_MARKERS
        .iter()
        .map(|marker| output.split(marker).collect::<Vec<_>>())
        .find(|sections| sections.len() > 1)
}

fn parse_section(section: &str) -> Option<AdapterConfig> {
    let first_line = section.lines().next().unwrap_or("");
    let name = first_line.split(':').next().unwrap_or("").trim();
    if name.is_empty() {
        return None;
    }

    let mut config = AdapterConfig {
        name: name.to_string(),
        ..Default::default()
    };

    let mut in_dns_list = false;
    for line in section.lines() {
        let line = line.trim();
        if in_dns_list {
            if is_continuation(line) {
                push_quad(&mut config.dns_servers, line);
                continue;
            }
            in_dns_list = false;
        }
        let lower = line.to_lowercase();

        if lower.contains(DHCP_KEY) && contains_any(&lower, AFFIRMATIVE) {
            config.dhcp_enabled = true;
        }
        if contains_any(&lower, IPV4_KEYS) {
            push_quad(&mut config.ip_addresses, line);
        }
        if contains_any(&lower, SUBNET_MASK_KEYS) {
            push_quad(&mut config.subnet_masks, line);
        }
        if contains_any(&lower, GATEWAY_KEYS) {
            push_quad(&mut config.gateways, line);
        }
        if lower.contains(DNS_KEY) && push_quad(&mut config.dns_servers, line) {
            in_dns_list = true;
        }
    }

    Some(config)
}

/// Returns whether an address was found
fn push_quad(list: &mut Vec<String>, line: &str) -> bool {
    match first_dotted_quad(line) {
        Some(quad) => {
            list.push(quad.to_string());
            true
        }
        None => false,
    }
}

/// A bare address line with no "key . . . :" label
fn is_continuation(line: &str) -> bool {
    !line.is_empty() && !line.contains(':') && first_dotted_quad(line).is_some()
}
