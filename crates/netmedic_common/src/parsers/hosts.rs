//! Hosts file parser and the suspicious-redirect classifier

use super::vocab::{LOOPBACK_ADDRESSES, WELL_KNOWN_DOMAINS};
use crate::types::HostsEntry;

/// Parse hosts file content into mapping entries.
///
/// Line numbers are physical and 1-based. Blank lines, full-line comments and
/// lines with fewer than two tokens produce no entry.
pub fn parse_hosts(content: &str) -> Vec<HostsEntry> {
    content
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| parse_line(line, idx + 1))
        .collect()
}

fn parse_line(line: &str, line_num: usize) -> Option<HostsEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let (mapping, comment) = match line.split_once('#') {
        Some((mapping, comment)) => {
            let comment = comment.trim();
            (mapping.trim(), (!comment.is_empty()).then(|| comment.to_string()))
        }
        None => (line, None),
    };

    let mut tokens = mapping.split_whitespace();
    let ip = tokens.next()?;
    let hostname = tokens.next()?;

    Some(HostsEntry {
        ip: ip.to_string(),
        hostname: hostname.to_string(),
        comment,
        line_num,
        suspicious: is_suspicious(ip, hostname),
    })
}

pub fn is_loopback(ip: &str) -> bool {
    LOOPBACK_ADDRESSES.contains(&ip)
}

/// A well-known domain pointed anywhere but loopback.
///
/// A well-known domain pointed at a loopback address is not flagged.
pub fn is_suspicious(ip: &str, hostname: &str) -> bool {
    if is_loopback(ip) {
        return false;
    }
    WELL_KNOWN_DOMAINS.contains(&hostname)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_entries_only_redirect_flagged() {
        let entries = parse_hosts("127.0.0.1 localhost\n1.2.3.4 www.baidu.com\n::1 localhost\n");

        assert_eq!(entries.len(), 3);
        let flags: Vec<bool> = entries.iter().map(|e| e.suspicious).collect();
        assert_eq!(flags, [false, true, false]);
        assert_eq!(entries[1].ip, "1.2.3.4");
        assert_eq!(entries[1].hostname, "www.baidu.com");
    }

    #[test]
    fn test_well_known_to_loopback_not_flagged() {
        let entries = parse_hosts("127.0.0.1 www.baidu.com");
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].suspicious);
    }

    #[test]
    fn test_line_numbers_count_skipped_lines() {
        let content = "# header\n\n   \n10.0.0.2 nas.lan   # storage box\n";
        let entries = parse_hosts(content);

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line_num, 4);
        assert_eq!(entries[0].comment.as_deref(), Some("storage box"));
    }

    #[test]
    fn test_incomplete_lines_discarded() {
        let entries = parse_hosts("10.0.0.1\n10.0.0.2 # only a comment\n\t10.0.0.3\tbox\n");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].hostname, "box");
        assert_eq!(entries[0].line_num, 3);
        assert!(entries[0].comment.is_none());
    }

    #[test]
    fn test_empty_trailing_comment_dropped() {
        let entries = parse_hosts("10.0.0.2 nas.lan #");
        assert!(entries[0].comment.is_none());
    }

    #[test]
    fn test_crlf_content() {
        let entries = parse_hosts("127.0.0.1 localhost\r\n8.8.8.8 www.google.com\r\n");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].hostname, "www.google.com");
        assert!(entries[1].suspicious);
    }

    #[test]
    fn test_classifier() {
        assert!(!is_suspicious("127.0.0.1", "localhost"));
        assert!(!is_suspicious("::1", "www.qq.com"));
        assert!(is_suspicious("10.0.0.1", "www.taobao.com"));
        assert!(!is_suspicious("10.0.0.1", "www.baidu.com.evil"));
        assert!(!is_suspicious("10.0.0.1", "intranet.corp"));
    }
}
