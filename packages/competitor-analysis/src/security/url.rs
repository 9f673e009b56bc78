//! URL guard for SSRF protection.

use std::collections::HashSet;
use std::net::IpAddr;

use ipnet::IpNet;
use url::{Host, Url};

use crate::error::ValidationError;

const BLOCKED_CIDRS: [&str; 9] = [
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "169.254.0.0/16", // link-local / cloud metadata
    "127.0.0.0/8",
    "0.0.0.0/8",
    "::1/128",
    "fc00::/7",
    "fe80::/10",
];

const BLOCKED_HOSTS: [&str; 5] = [
    "localhost",
    "metadata.google.internal",
    "metadata.gke.internal",
    "metadata",
    "instance-data",
];

/// Validates webpage URLs before any network access.
///
/// Rejects:
/// - non-HTTP(S) schemes (`file://`, `ftp://`, `javascript:`)
/// - URLs without a host
/// - loopback, private and link-local addresses
/// - cloud metadata hostnames
///
/// Private-network checks can be switched off for local development.
#[derive(Debug, Clone)]
pub struct UrlGuard {
    blocked_hosts: HashSet<String>,
    blocked_cidrs: Vec<IpNet>,
    allow_private: bool,
}

impl Default for UrlGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlGuard {
    pub fn new() -> Self {
        Self {
            blocked_hosts: BLOCKED_HOSTS.iter().map(|h| h.to_string()).collect(),
            blocked_cidrs: BLOCKED_CIDRS.iter().filter_map(|c| c.parse().ok()).collect(),
            allow_private: false,
        }
    }

    /// Skip the host and address checks; scheme and host presence still apply.
    pub fn allow_private_hosts(mut self, allow: bool) -> Self {
        self.allow_private = allow;
        self
    }

    /// Block an additional hostname.
    pub fn block_host(mut self, host: impl Into<String>) -> Self {
        self.blocked_hosts.insert(host.into().to_ascii_lowercase());
        self
    }

    /// Block an additional CIDR range.
    pub fn block_cidr(mut self, cidr: IpNet) -> Self {
        self.blocked_cidrs.push(cidr);
        self
    }

    /// Parse and validate a URL, returning the parsed form.
    pub fn check(&self, raw: &str) -> Result<Url, ValidationError> {
        let invalid = |reason: String| ValidationError::InvalidUrl {
            url: raw.to_string(),
            reason,
        };

        let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("scheme '{}' is not allowed", url.scheme())));
        }

        let host = url
            .host()
            .ok_or_else(|| invalid("URL has no host".to_string()))?;

        if self.allow_private {
            return Ok(url);
        }

        let ip = match host {
            Host::Domain(domain) => {
                let domain = domain.trim_end_matches('.').to_ascii_lowercase();
                if self.blocked_hosts.contains(&domain) || domain.ends_with(".localhost") {
                    return Err(invalid(format!("host '{}' is blocked", domain)));
                }
                None
            }
            Host::Ipv4(v4) => Some(IpAddr::V4(v4)),
            Host::Ipv6(v6) => Some(
                v6.to_ipv4_mapped()
                    .map(IpAddr::V4)
                    .unwrap_or(IpAddr::V6(v6)),
            ),
        };

        if let Some(ip) = ip {
            if let Some(cidr) = self.blocked_cidrs.iter().find(|cidr| cidr.contains(&ip)) {
                return Err(invalid(format!("address {} is in blocked range {}", ip, cidr)));
            }
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected(guard: &UrlGuard, url: &str) -> bool {
        matches!(guard.check(url), Err(ValidationError::InvalidUrl { .. }))
    }

    #[test]
    fn test_accepts_public_urls() {
        let guard = UrlGuard::new();
        assert!(guard.check("https://example.com").is_ok());
        assert!(guard.check("http://shop.example.org/catalog?page=2").is_ok());
        assert!(guard.check("https://93.184.216.34/").is_ok());
    }

    #[test]
    fn test_blocks_loopback() {
        let guard = UrlGuard::new();
        assert!(rejected(&guard, "http://localhost/"));
        assert!(rejected(&guard, "http://127.0.0.1:8000/"));
        assert!(rejected(&guard, "http://[::1]/"));
        assert!(rejected(&guard, "http://app.localhost/"));
        assert!(rejected(&guard, "http://[::ffff:127.0.0.1]/"));
    }

    #[test]
    fn test_blocks_private_ranges_and_metadata() {
        let guard = UrlGuard::new();
        assert!(rejected(&guard, "http://10.1.2.3/"));
        assert!(rejected(&guard, "http://172.16.0.1/"));
        assert!(rejected(&guard, "http://192.168.1.1/"));
        assert!(rejected(&guard, "http://169.254.169.254/latest/meta-data"));
        assert!(rejected(&guard, "http://metadata.google.internal/"));
    }

    #[test]
    fn test_blocks_other_schemes_and_garbage() {
        let guard = UrlGuard::new();
        assert!(rejected(&guard, "file:///etc/passwd"));
        assert!(rejected(&guard, "ftp://example.com/"));
        assert!(rejected(&guard, "not a url"));
        assert!(rejected(&guard, ""));
    }

    #[test]
    fn test_private_hosts_allowed_when_configured() {
        let guard = UrlGuard::new().allow_private_hosts(true);
        assert!(guard.check("http://127.0.0.1:3000/").is_ok());
        assert!(guard.check("http://localhost/").is_ok());
        assert!(rejected(&guard, "file:///etc/passwd"));
    }

    #[test]
    fn test_custom_block_list() {
        let guard = UrlGuard::new()
            .block_host("Competitor.Internal")
            .block_cidr("203.0.113.0/24".parse().unwrap());
        assert!(rejected(&guard, "https://competitor.internal/"));
        assert!(rejected(&guard, "https://203.0.113.7/"));
    }
}
