//! Subject Alternative Names for the self-signed certificate.

use crate::net::{determine_lan_ip, InterfaceSource, NetError, Platform};

/// Always present: the host seen from itself.
const STATIC_SANS: [&str; 2] = ["localhost", "127.0.0.1"];

/// Suffixes of names commonly handed out by home routers and mDNS.
const LOCAL_DOMAINS: [&str; 3] = ["local", "lan", "home"];

/// DNS names and IP addresses that might be used to reach the current host,
/// either from the host itself or from other machines in the local network.
///
/// A missing hostname or an undeterminable LAN IP only shortens the list. A
/// failed address lookup on the favorite interface is returned as an error.
pub fn default_sans<S: InterfaceSource + ?Sized>(
    source: &S,
    platform: Platform,
) -> Result<Vec<String>, NetError> {
    let hostname = match hostname::get() {
        Ok(name) => name.into_string().ok(),
        Err(e) => {
            tracing::debug!(error = %e, "Could not read hostname");
            None
        }
    };

    let lan_ip = match determine_lan_ip(source, platform) {
        Ok(ip) => Some(ip),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "Could not determine LAN IP");
            None
        }
    };

    Ok(assemble_sans(hostname.as_deref(), lan_ip.as_deref()))
}

/// Build the SAN list from an optional hostname and an optional LAN IP.
///
/// Order is fixed: static entries, hostname entries, LAN IP. Empty values are
/// skipped; nothing is de-duplicated.
pub fn assemble_sans(hostname: Option<&str>, lan_ip: Option<&str>) -> Vec<String> {
    let mut sans: Vec<String> = STATIC_SANS.iter().map(|s| s.to_string()).collect();

    if let Some(host) = hostname.filter(|h| !h.is_empty()) {
        sans.push(host.to_string());
        for domain in LOCAL_DOMAINS {
            sans.push(format!("{}.{}", host, domain));
            sans.push(format!("*.{}.{}", host, domain));
        }
    }

    if let Some(ip) = lan_ip.filter(|ip| !ip.is_empty()) {
        sans.push(ip.to_string());
    }

    sans
}
