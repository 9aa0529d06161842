//! Host network address discovery.
//!
//! Finds the interface most likely to face the LAN (the "favorite" interface)
//! and extracts the addresses worth showing to the user. The favorite is chosen
//! by a per-platform naming rule, so the result is only a best guess: hosts with
//! unusual interface names simply have no favorite.

mod table;

pub use table::{InterfaceRow, InterfaceTable};

use std::io;
use std::net::IpAddr;

/// A host network interface as reported by the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
}

impl Interface {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// First IPv4 and first IPv6 address found on an interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressPair {
    pub ipv4: Option<String>,
    pub ipv6: Option<String>,
}

impl AddressPair {
    /// Build a pair from raw, possibly CIDR-suffixed, address strings.
    ///
    /// Addresses are visited in the given order. Each family keeps the first
    /// address seen; later addresses of the same family are ignored. Interfaces
    /// can expose many addresses (Windows in particular), so iteration stops as
    /// soon as both families are known.
    pub fn from_addresses<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pair = Self::default();

        for raw in addresses {
            if pair.is_complete() {
                break;
            }

            let raw = raw.as_ref();
            let addr = raw.split('/').next().unwrap_or(raw);
            let slot = if addr.contains(':') {
                &mut pair.ipv6
            } else {
                &mut pair.ipv4
            };
            if slot.is_none() {
                *slot = Some(addr.to_string());
            }
        }

        pair
    }

    pub fn is_complete(&self) -> bool {
        self.ipv4.is_some() && self.ipv6.is_some()
    }
}

/// Operating system family, used to pick the favorite interface naming rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

/// Matches an interface name against a favorite naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteRule {
    Exact(&'static str),
    Prefix(&'static str),
}

impl FavoriteRule {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            FavoriteRule::Exact(expected) => name == *expected,
            FavoriteRule::Prefix(prefix) => {
                name.len() >= prefix.len() && name.starts_with(prefix)
            }
        }
    }
}

const WINDOWS_RULES: &[FavoriteRule] = &[FavoriteRule::Exact("WiFi"), FavoriteRule::Prefix("Ethernet")];
const MACOS_RULES: &[FavoriteRule] = &[FavoriteRule::Exact("en0"), FavoriteRule::Exact("en1")];
const LINUX_RULES: &[FavoriteRule] = &[FavoriteRule::Exact("eth0"), FavoriteRule::Exact("wlan0")];

impl Platform {
    /// The platform this binary is running on.
    pub fn current() -> Self {
        Self::from_os(std::env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a platform.
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Platform::Windows,
            "macos" => Platform::MacOs,
            "linux" => Platform::Linux,
            _ => Platform::Other,
        }
    }

    pub fn favorite_rules(&self) -> &'static [FavoriteRule] {
        match self {
            Platform::Windows => WINDOWS_RULES,
            Platform::MacOs => MACOS_RULES,
            Platform::Linux => LINUX_RULES,
            Platform::Other => &[],
        }
    }
}

/// Check whether an interface name is a typical primary adapter on `platform`
/// (like "eth0" on Linux).
pub fn is_favorite_interface(name: &str, platform: Platform) -> bool {
    platform.favorite_rules().iter().any(|rule| rule.matches(name))
}

/// Address discovery errors.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error("Failed to list network interfaces: {0}")]
    ListInterfaces(#[source] io::Error),

    #[error("Failed to read addresses of interface {name}: {source}")]
    InterfaceAddresses {
        name: String,
        #[source]
        source: io::Error,
    },
}

impl NetError {
    /// Whether the error must stop the program.
    ///
    /// A failed address lookup on an interface that was already selected would
    /// produce misleading URLs, so it is fatal. Not being able to list
    /// interfaces at all only leaves the output blank.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NetError::InterfaceAddresses { .. })
    }
}

/// Source of network interfaces and their addresses.
pub trait InterfaceSource {
    /// All interfaces, in the order the operating system reports them.
    fn interfaces(&self) -> io::Result<Vec<Interface>>;

    /// Raw addresses bound to `iface`, in OS order, each as `ip/prefixlen`.
    fn addresses(&self, iface: &Interface) -> io::Result<Vec<String>>;
}

/// Reads interfaces from the host with `getifaddrs` (or its Windows equivalent).
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceSource for SystemInterfaces {
    fn interfaces(&self) -> io::Result<Vec<Interface>> {
        let mut interfaces: Vec<Interface> = Vec::new();
        for iface in if_addrs::get_if_addrs()? {
            // One entry per address; keep the first occurrence of each name.
            if !interfaces.iter().any(|known| known.name == iface.name) {
                interfaces.push(Interface::new(iface.name));
            }
        }
        Ok(interfaces)
    }

    fn addresses(&self, iface: &Interface) -> io::Result<Vec<String>> {
        let addresses = if_addrs::get_if_addrs()?
            .into_iter()
            .filter(|entry| entry.name == iface.name)
            .map(|entry| {
                let (ip, prefix_len) = match entry.addr {
                    if_addrs::IfAddr::V4(v4) => {
                        (IpAddr::V4(v4.ip), u32::from(v4.netmask).count_ones())
                    }
                    if_addrs::IfAddr::V6(v6) => {
                        (IpAddr::V6(v6.ip), u128::from(v6.netmask).count_ones())
                    }
                };
                format!("{}/{}", ip, prefix_len)
            })
            .collect();
        Ok(addresses)
    }
}

/// Resolve the first IPv4 and first IPv6 address of an interface.
///
/// A lookup failure is reported as [`NetError::InterfaceAddresses`], which
/// callers must treat as fatal.
pub fn resolve_interface_addresses<S: InterfaceSource + ?Sized>(
    source: &S,
    iface: &Interface,
) -> Result<AddressPair, NetError> {
    let addresses = source
        .addresses(iface)
        .map_err(|source| NetError::InterfaceAddresses {
            name: iface.name.clone(),
            source,
        })?;
    Ok(AddressPair::from_addresses(addresses))
}

/// Determine the IPv4 address of this machine in the LAN.
///
/// Uses the first favorite interface in listing order. Returns an empty string
/// when no interface qualifies, or when the favorite has no IPv4 address.
pub fn determine_lan_ip<S: InterfaceSource + ?Sized>(
    source: &S,
    platform: Platform,
) -> Result<String, NetError> {
    let interfaces = source.interfaces().map_err(NetError::ListInterfaces)?;

    let Some(favorite) = interfaces
        .iter()
        .find(|iface| is_favorite_interface(&iface.name, platform))
    else {
        tracing::debug!(?platform, "No favorite network interface found");
        return Ok(String::new());
    };

    let pair = resolve_interface_addresses(source, favorite)?;
    tracing::debug!(interface = %favorite.name, ipv4 = ?pair.ipv4, "Selected favorite interface");
    Ok(pair.ipv4.unwrap_or_default())
}
