use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const DEFAULT_HOST: &str = "0.0.0.0";
const SOCKS_DEFAULT_HOST: &str = "127.0.0.1";
const SOCKS_DEFAULT_PORT: &str = "1080";

/// A decoded tunnel spec: where to bind locally and where traffic goes.
///
/// Shorthand forms, all colon-separated:
///
/// - `3000`                          -> bind 0.0.0.0:3000, forward to 0.0.0.0:3000
/// - `example.com:80`                -> bind 0.0.0.0:80, forward to example.com:80
/// - `3000:example.com:80`           -> bind 0.0.0.0:3000, forward to example.com:80
/// - `10.0.0.1:3000:example.com:80`  -> bind 10.0.0.1:3000, forward to example.com:80
/// - `socks`                         -> local SOCKS proxy on 127.0.0.1:1080
/// - `80@relay`                      -> as `80`, routed through the client named `relay`
///
/// Ports stay strings: the grammar accepts any all-digit token and never
/// range-checks, and the empty string doubles as "not set" during the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remote {
    pub local_host: String,
    pub local_port: String,
    pub remote_host: String,
    pub remote_port: String,
    pub socks: bool,
    pub proxy: String,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Wrong token count: the spec split into zero or five-plus parts.
    #[error("invalid remote spec")]
    InvalidRemote,
    /// A host-like token showed up before any port was resolved.
    #[error("missing ports")]
    MissingPorts,
    /// A token in a host position that the (permissive) host check rejects.
    #[error("invalid host '{0}'")]
    InvalidHost(String),
}

/// States of the right-to-left token walk. Token meaning is positional
/// relative to the *last* token, so the scan runs back-to-front and each
/// state names what the next (more-left) token may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    ExpectLastTokenOrPort,
    ExpectRemotePort,
    ExpectRemoteHostOrLocalPort,
    ExpectLocalHost,
}

impl FromStr for Remote {
    type Err = DecodeError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = spec.split(':').collect();
        if parts.is_empty() || parts.len() >= 5 {
            return Err(DecodeError::InvalidRemote);
        }

        let mut r = Remote::default();
        let mut state = Scan::ExpectLastTokenOrPort;

        for (i, raw) in parts.iter().enumerate().rev() {
            let mut token = *raw;

            if state == Scan::ExpectLastTokenOrPort {
                // Only the literal last token can flip SOCKS mode; `socks`
                // anywhere else is an ordinary host token.
                if i == parts.len() - 1 && token == "socks" {
                    r.socks = true;
                    state = Scan::ExpectLocalHost;
                    continue;
                }
                state = Scan::ExpectRemotePort;
            }

            if let Some((head, name)) = split_proxy(token) {
                token = head;
                r.proxy = name.to_string();
            }

            if is_port(token) {
                match state {
                    Scan::ExpectLastTokenOrPort | Scan::ExpectRemotePort => {
                        // A lone port means "same port both sides", so the
                        // first port binds local and remote at once.
                        r.remote_port = token.to_string();
                        r.local_port = token.to_string();
                        state = Scan::ExpectRemoteHostOrLocalPort;
                    }
                    Scan::ExpectRemoteHostOrLocalPort | Scan::ExpectLocalHost => {
                        r.local_port = token.to_string();
                    }
                }
                continue;
            }

            match state {
                Scan::ExpectLastTokenOrPort | Scan::ExpectRemotePort => {
                    return Err(DecodeError::MissingPorts);
                }
                Scan::ExpectRemoteHostOrLocalPort => {
                    if !is_host(token) {
                        return Err(DecodeError::InvalidHost(token.to_string()));
                    }
                    r.remote_host = token.to_string();
                    state = Scan::ExpectLocalHost;
                }
                Scan::ExpectLocalHost => {
                    if !is_host(token) {
                        return Err(DecodeError::InvalidHost(token.to_string()));
                    }
                    r.local_host = token.to_string();
                }
            }
        }

        if r.local_host.is_empty() {
            r.local_host = if r.socks { SOCKS_DEFAULT_HOST } else { DEFAULT_HOST }.to_string();
        }
        if r.local_port.is_empty() && r.socks {
            r.local_port = SOCKS_DEFAULT_PORT.to_string();
        }
        if !r.socks && r.remote_host.is_empty() {
            r.remote_host = DEFAULT_HOST.to_string();
        }

        Ok(r)
    }
}

impl Remote {
    /// Render the remote side alone: `socks`, `host:port`, or `host:port@proxy`.
    pub fn remote(&self) -> String {
        if self.socks {
            return "socks".to_string();
        }
        if self.proxy.is_empty() {
            format!("{}:{}", self.remote_host, self.remote_port)
        } else {
            format!("{}:{}@{}", self.remote_host, self.remote_port, self.proxy)
        }
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}=>{}", self.local_host, self.local_port, self.remote())
    }
}

/// A port token is a non-empty run of ASCII digits. No range check: the
/// grammar has always taken any digit string at face value.
fn is_port(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Split `PORT@NAME` into the port-or-host head and the proxy name.
/// Anything past a second `@` is dropped, matching the historical decode.
fn split_proxy(token: &str) -> Option<(&str, &str)> {
    let mut parts = token.split('@');
    let head = parts.next()?;
    let name = parts.next()?;
    Some((head, name))
}

/// Deliberately lax: hosts are whatever a generic URL parse would let
/// through, which for a scheme-less token is nearly anything. Only ASCII
/// control characters are rejected. The empty string passes and later gets
/// the unspecified-host default.
fn is_host(token: &str) -> bool {
    !token.bytes().any(|b| b.is_ascii_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(spec: &str) -> Remote {
        spec.parse::<Remote>().unwrap()
    }

    #[test]
    fn single_port() {
        let r = decode("3000");
        assert_eq!(r.local_host, "0.0.0.0");
        assert_eq!(r.local_port, "3000");
        assert_eq!(r.remote_host, "0.0.0.0");
        assert_eq!(r.remote_port, "3000");
        assert!(!r.socks);
        assert_eq!(r.proxy, "");
    }

    #[test]
    fn host_and_port() {
        let r = decode("example.com:80");
        assert_eq!(r.local_host, "0.0.0.0");
        assert_eq!(r.local_port, "80");
        assert_eq!(r.remote_host, "example.com");
        assert_eq!(r.remote_port, "80");
    }

    #[test]
    fn port_host_port() {
        let r = decode("3000:google.com:80");
        assert_eq!(r.local_host, "0.0.0.0");
        assert_eq!(r.local_port, "3000");
        assert_eq!(r.remote_host, "google.com");
        assert_eq!(r.remote_port, "80");
    }

    #[test]
    fn full_four_tokens() {
        let r = decode("192.168.0.1:3000:google.com:80");
        assert_eq!(r.local_host, "192.168.0.1");
        assert_eq!(r.local_port, "3000");
        assert_eq!(r.remote_host, "google.com");
        assert_eq!(r.remote_port, "80");
    }

    #[test]
    fn proxy_on_last_token() {
        let r = decode("127.0.0.1:80:127.0.0.1:80@B");
        assert_eq!(r.local_host, "127.0.0.1");
        assert_eq!(r.local_port, "80");
        assert_eq!(r.remote_host, "127.0.0.1");
        assert_eq!(r.remote_port, "80");
        assert_eq!(r.proxy, "B");
    }

    #[test]
    fn proxy_on_single_port() {
        // Not SOCKS, so the local host default is 0.0.0.0 even with a proxy.
        let r = decode("80@B");
        assert_eq!(r.local_host, "0.0.0.0");
        assert_eq!(r.local_port, "80");
        assert_eq!(r.remote_host, "0.0.0.0");
        assert_eq!(r.remote_port, "80");
        assert_eq!(r.proxy, "B");
    }

    #[test]
    fn proxy_consumed_from_middle_position() {
        let r = decode("3000@relay:example.com:80");
        assert_eq!(r.local_port, "3000");
        assert_eq!(r.remote_host, "example.com");
        assert_eq!(r.remote_port, "80");
        assert_eq!(r.proxy, "relay");
    }

    #[test]
    fn proxy_extra_at_parts_dropped() {
        let r = decode("80@a@b");
        assert_eq!(r.local_port, "80");
        assert_eq!(r.proxy, "a");
    }

    #[test]
    fn socks_bare() {
        let r = decode("socks");
        assert!(r.socks);
        assert_eq!(r.local_host, "127.0.0.1");
        assert_eq!(r.local_port, "1080");
        assert_eq!(r.remote_host, "");
        assert_eq!(r.remote_port, "");
    }

    #[test]
    fn socks_with_local_port() {
        let r = decode("9050:socks");
        assert!(r.socks);
        assert_eq!(r.local_host, "127.0.0.1");
        assert_eq!(r.local_port, "9050");
    }

    #[test]
    fn socks_with_local_host_and_port() {
        let r = decode("192.168.0.1:9050:socks");
        assert!(r.socks);
        assert_eq!(r.local_host, "192.168.0.1");
        assert_eq!(r.local_port, "9050");
    }

    #[test]
    fn socks_only_matches_last_token() {
        // In any other position it is just a host.
        let r = decode("socks:80");
        assert!(!r.socks);
        assert_eq!(r.remote_host, "socks");
        assert_eq!(r.remote_port, "80");
    }

    #[test]
    fn socks_with_proxy_suffix_is_not_socks() {
        // Exact match only, so `socks@B` strips the proxy, fails the port
        // check, and there is no port anywhere in the spec.
        assert_eq!(
            "socks@B".parse::<Remote>().unwrap_err(),
            DecodeError::MissingPorts
        );
    }

    #[test]
    fn permissive_host_accepts_bare_names() {
        let r = decode("abc:80");
        assert_eq!(r.remote_host, "abc");
        assert_eq!(r.remote_port, "80");
    }

    #[test]
    fn later_ports_rebind_local() {
        // All three tokens are ports; the middle one is consumed as a local
        // port and then overwritten by the leftmost.
        let r = decode("1:2:3");
        assert_eq!(r.local_port, "1");
        assert_eq!(r.remote_port, "3");
        assert_eq!(r.remote_host, "0.0.0.0");
    }

    #[test]
    fn no_port_range_check() {
        let r = decode("99999");
        assert_eq!(r.local_port, "99999");
        assert_eq!(r.remote_port, "99999");
    }

    #[test]
    fn empty_remote_host_gets_default() {
        let r = decode(":3000");
        assert_eq!(r.remote_host, "0.0.0.0");
        assert_eq!(r.remote_port, "3000");
    }

    #[test]
    fn too_many_tokens() {
        assert_eq!(
            "a:b:c:d:e".parse::<Remote>().unwrap_err(),
            DecodeError::InvalidRemote
        );
    }

    #[test]
    fn empty_spec() {
        // "" splits into one empty token, which is not a port, so the scan
        // fails on ports rather than on token count.
        assert_eq!("".parse::<Remote>().unwrap_err(), DecodeError::MissingPorts);
    }

    #[test]
    fn host_before_any_port() {
        assert_eq!(
            "example.com".parse::<Remote>().unwrap_err(),
            DecodeError::MissingPorts
        );
        assert_eq!(
            "3000:".parse::<Remote>().unwrap_err(),
            DecodeError::MissingPorts
        );
    }

    #[test]
    fn control_characters_rejected_as_host() {
        assert_eq!(
            "bad\u{1}host:80".parse::<Remote>().unwrap_err(),
            DecodeError::InvalidHost("bad\u{1}host".to_string())
        );
    }

    #[test]
    fn decode_is_deterministic() {
        assert_eq!(decode("3000:google.com:80"), decode("3000:google.com:80"));
    }

    #[test]
    fn display_plain() {
        assert_eq!(decode("3000:google.com:80").to_string(), "0.0.0.0:3000=>google.com:80");
    }

    #[test]
    fn display_socks() {
        assert_eq!(decode("socks").to_string(), "127.0.0.1:1080=>socks");
    }

    #[test]
    fn display_with_proxy() {
        assert_eq!(
            decode("127.0.0.1:80:10.0.0.1:80@B").to_string(),
            "127.0.0.1:80=>10.0.0.1:80@B"
        );
    }

    #[test]
    fn classify_ports() {
        assert!(is_port("0"));
        assert!(is_port("65536"));
        assert!(!is_port(""));
        assert!(!is_port("80a"));
        assert!(!is_port("-1"));
    }

    #[test]
    fn classify_hosts() {
        assert!(is_host("example.com"));
        assert!(is_host("10.0.0.1"));
        assert!(is_host("under_score"));
        assert!(is_host(""));
        assert!(!is_host("tab\there"));
    }

    #[test]
    fn classify_proxy_suffix() {
        assert_eq!(split_proxy("80@B"), Some(("80", "B")));
        assert_eq!(split_proxy("80@"), Some(("80", "")));
        assert_eq!(split_proxy("@B"), Some(("", "B")));
        assert_eq!(split_proxy("80"), None);
    }
}
