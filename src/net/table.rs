//! Console table of interfaces and their addresses.

use std::fmt;

use super::{is_favorite_interface, resolve_interface_addresses, InterfaceSource, NetError, Platform};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceRow {
    pub name: String,
    pub ipv4: String,
    pub ipv6: String,
    pub favorite: bool,
}

/// Interface name -> IPv4 -> IPv6, in OS listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceTable {
    pub rows: Vec<InterfaceRow>,
}

impl InterfaceTable {
    /// Collect every interface of `source`.
    ///
    /// A failed listing yields an empty table. A failed address lookup on a
    /// listed interface is returned as an error.
    pub fn collect<S: InterfaceSource + ?Sized>(
        source: &S,
        platform: Platform,
    ) -> Result<Self, NetError> {
        let interfaces = match source.interfaces() {
            Ok(interfaces) => interfaces,
            Err(e) => {
                tracing::warn!(error = %e, "Could not list network interfaces");
                return Ok(Self::default());
            }
        };

        let rows = interfaces
            .iter()
            .map(|iface| {
                let pair = resolve_interface_addresses(source, iface)?;
                Ok(InterfaceRow {
                    name: iface.name.clone(),
                    ipv4: pair.ipv4.unwrap_or_default(),
                    ipv6: pair.ipv6.unwrap_or_default(),
                    favorite: is_favorite_interface(&iface.name, platform),
                })
            })
            .collect::<Result<Vec<_>, NetError>>()?;

        Ok(Self { rows })
    }
}

impl fmt::Display for InterfaceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const HEADER: [&str; 3] = ["Interface", "IPv4", "IPv6"];

        // Widths in chars, matching how `{:<width$}` pads. Favorite marker
        // takes two columns in front of the name
        let name_width = self
            .rows
            .iter()
            .map(|row| row.name.chars().count() + 2)
            .chain([HEADER[0].len()])
            .max()
            .unwrap_or_default();
        let ipv4_width = self
            .rows
            .iter()
            .map(|row| row.ipv4.chars().count())
            .chain([HEADER[1].len()])
            .max()
            .unwrap_or_default();

        writeln!(f, "{:<name_width$} | {:<ipv4_width$} | {}", HEADER[0], HEADER[1], HEADER[2])?;
        writeln!(f, "{}-+-{}-+-{}", "-".repeat(name_width), "-".repeat(ipv4_width), "-".repeat(HEADER[2].len().max(4)))?;
        for row in &self.rows {
            let marker = if row.favorite { "* " } else { "  " };
            let name = format!("{}{}", marker, row.name);
            writeln!(f, "{:<name_width$} | {:<ipv4_width$} | {}", name, row.ipv4, row.ipv6)?;
        }
        Ok(())
    }
}
