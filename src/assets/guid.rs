//! Globally unique asset and object identifiers
//!
//! GUIDs are random version-4 style 128-bit values rendered in the usual
//! `8-4-4-4-12` hex form. They are stable across save/load, which is what lets
//! scene documents reference assets without embedding them.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 128-bit unique identifier
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Guid(u128);

impl Guid {
    /// The all-zero identifier, never produced by [`Guid::new`]
    pub const NIL: Self = Self(0);

    /// Generate a fresh random identifier
    #[must_use]
    pub fn new() -> Self {
        let mut rng = rand::rng();
        loop {
            let bits: u128 = rng.random();
            // Version nibble (4) and RFC 4122 variant bits
            let bits = (bits & !(0xF_u128 << 76)) | (0x4_u128 << 76);
            let bits = (bits & !(0b11_u128 << 62)) | (0b10_u128 << 62);
            if bits != 0 {
                return Self(bits);
            }
        }
    }

    /// Build an identifier from its raw value
    #[must_use]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Raw 128-bit value
    #[must_use]
    pub const fn as_u128(self) -> u128 {
        self.0
    }

    /// Whether this is the nil identifier
    #[must_use]
    pub const fn is_nil(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = self.0;
        write!(
            f,
            "{:08x}-{:04x}-{:04x}-{:04x}-{:012x}",
            (v >> 96) as u32,
            (v >> 80) as u16,
            (v >> 64) as u16,
            (v >> 48) as u16,
            v & 0xFFFF_FFFF_FFFF
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({self})")
    }
}

/// Error returned when a string is not a valid GUID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid GUID '{0}'")]
pub struct ParseGuidError(pub String);

impl FromStr for Guid {
    type Err = ParseGuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex: String = s.trim().chars().filter(|&c| c != '-').collect();
        if hex.len() != 32 {
            return Err(ParseGuidError(s.to_string()));
        }
        u128::from_str_radix(&hex, 16)
            .map(Self)
            .map_err(|_| ParseGuidError(s.to_string()))
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_unique() {
        let a = Guid::new();
        let b = Guid::new();
        assert_ne!(a, b);
        assert!(!a.is_nil());
    }

    #[test]
    fn test_guid_text_form() {
        let guid = Guid::from_u128(0x0123_4567_89ab_cdef_0011_2233_4455_6677);
        let text = guid.to_string();
        assert_eq!(text, "01234567-89ab-cdef-0011-223344556677");
        assert_eq!(text.parse::<Guid>().unwrap(), guid);
    }

    #[test]
    fn test_guid_rejects_garbage() {
        assert!("null".parse::<Guid>().is_err());
        assert!("0123".parse::<Guid>().is_err());
    }

    #[test]
    fn test_guid_json() {
        let guid = Guid::new();
        let json = serde_json::to_string(&guid).unwrap();
        assert_eq!(json, format!("\"{guid}\""));
        let back: Guid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, guid);
    }
}
