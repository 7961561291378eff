/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};
use std::str::FromStr;

use anyhow::anyhow;
use arcstr::ArcStr;

/// Normalize a domain key: drop the optional trailing dot, then apply
/// IDNA ascii conversion (which also case-folds).
pub(crate) fn normalize_domain(domain: &str) -> anyhow::Result<ArcStr> {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return Err(anyhow!("empty domain"));
    }
    let domain = idna::domain_to_ascii(domain).map_err(|e| anyhow!("invalid domain: {e}"))?;
    Ok(ArcStr::from(domain))
}

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Host {
    Ip(IpAddr),
    Domain(ArcStr),
}

impl Host {
    pub(crate) fn from_maybe_mapped_ip6(ip6: Ipv6Addr) -> Self {
        if let Some(ip4) = ip6.to_ipv4_mapped() {
            Host::Ip(IpAddr::V4(ip4))
        } else {
            Host::Ip(IpAddr::V6(ip6))
        }
    }

    pub(crate) fn from_domain_str(domain: &str) -> anyhow::Result<Self> {
        Ok(Host::Domain(normalize_domain(domain)?))
    }
}

impl fmt::Display for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Host::Ip(ip) => write!(f, "{ip}"),
            Host::Domain(domain) => write!(f, "{domain}"),
        }
    }
}

impl FromStr for Host {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(anyhow!("empty string"));
        }
        match s.as_bytes()[0] {
            b'[' => {
                let pos_last = s.len() - 1;
                if s.as_bytes()[pos_last] == b']'
                    && let Ok(ip6) = Ipv6Addr::from_str(&s[1..pos_last])
                {
                    return Ok(Host::from_maybe_mapped_ip6(ip6));
                }
                return Err(anyhow!("invalid ipv6 ip in squared brackets"));
            }
            b':' => {
                return if let Ok(ip6) = Ipv6Addr::from_str(s) {
                    Ok(Host::from_maybe_mapped_ip6(ip6))
                } else {
                    Err(anyhow!("invalid ipv6 ip"))
                };
            }
            b'0'..=b'9' => {
                if let Ok(ip) = IpAddr::from_str(s) {
                    return match ip {
                        IpAddr::V4(_) => Ok(Host::Ip(ip)),
                        IpAddr::V6(ip6) => Ok(Host::from_maybe_mapped_ip6(ip6)),
                    };
                }
            }
            b'a'..=b'f' | b'A'..=b'F' => {
                if let Ok(ip6) = Ipv6Addr::from_str(s) {
                    // won't be ipv4 mapped
                    return Ok(Host::Ip(IpAddr::V6(ip6)));
                }
            }
            _ => {}
        }

        Host::from_domain_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn parse_ip() {
        assert_eq!(
            Host::from_str("192.0.2.1").unwrap(),
            Host::Ip(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))
        );
        assert_eq!(
            Host::from_str("[2001:db8::1]").unwrap(),
            Host::Ip(IpAddr::from_str("2001:db8::1").unwrap())
        );
        assert_eq!(
            Host::from_str("::ffff:192.0.2.1").unwrap(),
            Host::Ip(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)))
        );
        assert!(Host::from_str("[2001:db8::1").is_err());
        assert_eq!(
            Host::from_str("192.0.2.1").unwrap().to_string(),
            "192.0.2.1"
        );
    }

    #[test]
    fn parse_domain() {
        assert_eq!(
            Host::from_str("www.example.com").unwrap(),
            Host::Domain(arcstr::literal!("www.example.com"))
        );
        // digits-first names that are not addresses stay domains
        assert_eq!(
            Host::from_str("1example.com").unwrap(),
            Host::Domain(arcstr::literal!("1example.com"))
        );
        assert!(Host::from_str("").is_err());
    }

    #[test]
    fn normalize() {
        assert_eq!(
            Host::from_str("WWW.Example.COM.").unwrap(),
            Host::Domain(arcstr::literal!("www.example.com"))
        );
        assert!(normalize_domain(".").is_err());
    }
}
