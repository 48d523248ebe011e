//! Link-layer hardware addresses.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A 6-byte link-layer hardware address.
///
/// A transport session tracks two of these: its own address, used to
/// recognize and drop looped-back copies of its transmissions, and the peer
/// address outgoing frames are sent to.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; 6]);

impl MacAddr {
    /// The all-ones broadcast address.
    ///
    /// Serves as the peer placeholder until a concrete instrument address
    /// has been pinned; a DTB answers frames addressed to it either way.
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    /// Construct an address from raw octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// The raw octets.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// True for the all-ones broadcast address.
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xff; 6]
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddr({self})")
    }
}

/// Error parsing a textual hardware address.
#[derive(Error, Debug)]
#[error("invalid hardware address '{input}': expected six colon-separated hex octets")]
pub struct ParseMacError {
    input: String,
}

impl FromStr for MacAddr {
    type Err = ParseMacError;

    /// Parses the conventional `aa:bb:cc:dd:ee:ff` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = || ParseMacError {
            input: s.to_string(),
        };
        let mut octets = [0u8; 6];
        let mut parts = s.split(':');
        for slot in &mut octets {
            let part = parts.next().ok_or_else(reject)?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(reject());
            }
            *slot = u8::from_str_radix(part, 16).map_err(|_| reject())?;
        }
        if parts.next().is_some() {
            return Err(reject());
        }
        Ok(MacAddr(octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_lowercase_colon_hex() {
        let addr = MacAddr::new([0x00, 0x90, 0xF5, 0x0A, 0xBB, 0xCC]);
        assert_eq!(addr.to_string(), "00:90:f5:0a:bb:cc");
    }

    #[test]
    fn parse_round_trips_display() {
        let addr: MacAddr = "d4:3d:7e:00:12:fe".parse().unwrap();
        assert_eq!(addr.octets(), [0xd4, 0x3d, 0x7e, 0x00, 0x12, 0xfe]);
        assert_eq!(addr.to_string().parse::<MacAddr>().unwrap(), addr);
    }

    #[test]
    fn parse_accepts_uppercase() {
        let addr: MacAddr = "D4:3D:7E:00:12:FE".parse().unwrap();
        assert_eq!(addr.octets()[0], 0xd4);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        for bad in [
            "",
            "d4:3d:7e:00:12",
            "d4:3d:7e:00:12:fe:01",
            "d4-3d-7e-00-12-fe",
            "d4:3d:7e:00:12:f",
            "d4:3d:7e:00:12:zz",
            "d4:3d:7e:00:12: e",
            "+4:3d:7e:00:12:fe",
        ] {
            assert!(bad.parse::<MacAddr>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn broadcast_is_all_ones() {
        assert_eq!(MacAddr::BROADCAST.octets(), [0xff; 6]);
        assert!(MacAddr::BROADCAST.is_broadcast());
        assert!(!MacAddr::new([0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]).is_broadcast());
    }
}
