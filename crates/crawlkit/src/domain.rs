//! Primary-domain extraction for the single-origin admission gate.
//!
//! Every discovered request is checked against the seed host's primary
//! domain: the longest registrable suffix from a fixed ccTLD/gTLD table plus
//! one label to its left. Dotted-quad hosts pass through unchanged.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{CrawlerError, ErrorKind};

fn ip_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"((?:(?:25[0-5]|2[0-4]\d|[01]?\d?\d)\.){3}(?:25[0-5]|2[0-4]\d|[01]?\d?\d))")
            .expect("ip pattern compiles")
    })
}

/// Suffix table, probed in order. Each named TLD also admits a trailing
/// two-letter country code (`.com.cn`, `.co.uk`, …); the bare two-letter
/// ccTLD probe comes last as the catch-all.
fn domain_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        const TLDS: &[&str] = &[
            "com", "gov", "net", "org", "me", "biz", "info", "name", "mobi", "so", "asia",
            "tel", "tv", "cc", "co",
        ];
        let mut patterns: Vec<Regex> = TLDS
            .iter()
            .map(|tld| {
                Regex::new(&format!(r"\.({tld}|{tld}\.\w{{2}})$")).expect("tld pattern compiles")
            })
            .collect();
        patterns.push(Regex::new(r"\.\w{2}$").expect("cctld pattern compiles"));
        patterns
    })
}

/// Derives the primary domain of `host`.
///
/// Whitespace is trimmed first. An empty host, or a host no table entry
/// matches, is an error.
pub fn get_primary_domain(host: &str) -> Result<String, CrawlerError> {
    let host = host.trim();
    if host.is_empty() {
        return Err(CrawlerError::new(ErrorKind::Scheduler, "the host is empty"));
    }
    if ip_pattern().is_match(host) {
        return Ok(host.to_string());
    }

    let suffix_start = domain_patterns()
        .iter()
        .filter_map(|pattern| pattern.find(host))
        .map(|matched| matched.start())
        .find(|&start| start > 0);

    match suffix_start {
        Some(start) => {
            let prefix = &host[..start];
            let domain_start = match prefix.rfind('.') {
                Some(dot) => dot + 1,
                None => 0,
            };
            Ok(host[domain_start..].to_string())
        }
        None => Err(CrawlerError::new(
            ErrorKind::Scheduler,
            format!("unrecognized host: {host}"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_quad_passes_through() {
        assert_eq!(get_primary_domain("192.168.1.10").expect("ip"), "192.168.1.10");
    }

    #[test]
    fn test_subdomains_are_stripped() {
        assert_eq!(get_primary_domain("a.b.example.com").expect("com"), "example.com");
        assert_eq!(get_primary_domain("www.example.org").expect("org"), "example.org");
    }

    #[test]
    fn test_country_suffixed_tlds() {
        assert_eq!(get_primary_domain("news.bbc.co.uk").expect("co.uk"), "bbc.co.uk");
        assert_eq!(get_primary_domain("foo.gov.cn").expect("gov.cn"), "foo.gov.cn");
    }

    #[test]
    fn test_bare_cctld_fallback() {
        assert_eq!(get_primary_domain("www.example.de").expect("de"), "example.de");
    }

    #[test]
    fn test_host_without_subdomain_is_its_own_primary_domain() {
        assert_eq!(get_primary_domain("example.com").expect("com"), "example.com");
    }

    #[test]
    fn test_empty_host_errors() {
        assert!(get_primary_domain("").is_err());
        assert!(get_primary_domain("   ").is_err());
    }

    #[test]
    fn test_unrecognized_host_errors() {
        assert!(get_primary_domain("localhost").is_err());
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        assert_eq!(get_primary_domain("  example.com  ").expect("com"), "example.com");
    }
}
