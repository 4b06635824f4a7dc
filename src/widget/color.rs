/// `widget/color.rs` — RGB triples and `#rrggbb` parsing
use serde::Serialize;

use crate::error::{BridgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Channels are stored in 8 bits, larger or negative inputs wrap.
    pub fn from_ints(red: i64, green: i64, blue: i64) -> Self {
        Self {
            red: red as u8,
            green: green as u8,
            blue: blue as u8,
        }
    }

    /// Parse a `#` prefixed hex code.
    ///
    /// The rest is read like `strtol(.., 16)`: leading whitespace, an
    /// optional sign and an optional `0x` are skipped, parsing stops at the
    /// first non-hex character, an empty run yields black, overflow
    /// saturates to the `long` range and negative values wrap.
    pub fn parse_hex(code: &str) -> Result<Self> {
        let rest = code
            .strip_prefix('#')
            .ok_or_else(|| BridgeError::InvalidColor(code.to_string()))?;

        let rest = rest.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r'));
        let (negative, rest) = match rest.as_bytes().first() {
            Some(b'-') => (true, &rest[1..]),
            Some(b'+') => (false, &rest[1..]),
            _ => (false, rest),
        };
        let digits = match rest.get(..2) {
            Some("0x" | "0X") if rest[2..].starts_with(|c: char| c.is_ascii_hexdigit()) => &rest[2..],
            _ => rest,
        };

        let mut acc: u64 = 0;
        for c in digits.chars() {
            let Some(d) = c.to_digit(16) else { break };
            acc = acc.saturating_mul(16).saturating_add(u64::from(d));
        }
        let magnitude = i128::from(acc);
        let value = if negative {
            (-magnitude).max(i128::from(i64::MIN)) as i64
        } else {
            magnitude.min(i128::from(i64::MAX)) as i64
        };
        let color = value as u32;

        Ok(Self {
            red: (color >> 16) as u8,
            green: (color >> 8) as u8,
            blue: color as u8,
        })
    }
}

/// Which half of the color pair a mutator targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSlot {
    Foreground,
    Background,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Colors {
    pub fg: Option<Rgb>,
    pub bg: Option<Rgb>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_splits_channels() {
        assert_eq!(Rgb::parse_hex("#102030").ok(), Some(Rgb::new(16, 32, 48)));
        assert_eq!(Rgb::parse_hex("#ff00FF").ok(), Some(Rgb::new(255, 0, 255)));
    }

    #[test]
    fn parse_hex_requires_hash_prefix() {
        assert!(matches!(
            Rgb::parse_hex("102030"),
            Err(BridgeError::InvalidColor(code)) if code == "102030"
        ));
    }

    #[test]
    fn parse_hex_stops_at_garbage() {
        // "#12zz" reads as 0x12
        assert_eq!(Rgb::parse_hex("#12zz").ok(), Some(Rgb::new(0, 0, 0x12)));
        assert_eq!(Rgb::parse_hex("#").ok(), Some(Rgb::default()));
    }

    #[test]
    fn parse_hex_keeps_low_24_bits_of_long_codes() {
        assert_eq!(Rgb::parse_hex("#ff102030").ok(), Some(Rgb::new(16, 32, 48)));
        assert_eq!(
            Rgb::parse_hex("#ffffffffffffffffffff").ok(),
            Some(Rgb::new(255, 255, 255))
        );
    }

    #[test]
    fn parse_hex_accepts_strtol_prefixes() {
        assert_eq!(Rgb::parse_hex("#0x102030").ok(), Some(Rgb::new(16, 32, 48)));
        assert_eq!(Rgb::parse_hex("#0X102030").ok(), Some(Rgb::new(16, 32, 48)));
        assert_eq!(Rgb::parse_hex("# 102030").ok(), Some(Rgb::new(16, 32, 48)));
        assert_eq!(Rgb::parse_hex("#\t+102030").ok(), Some(Rgb::new(16, 32, 48)));
        // "0x" without digits reads as 0
        assert_eq!(Rgb::parse_hex("#0xzz").ok(), Some(Rgb::default()));
    }

    #[test]
    fn parse_hex_negative_values_wrap() {
        assert_eq!(Rgb::parse_hex("#-1").ok(), Some(Rgb::new(255, 255, 255)));
        assert_eq!(Rgb::parse_hex("#-102030").ok(), Some(Rgb::new(0xef, 0xdf, 0xd0)));
        // saturates at LONG_MIN, whose low 32 bits are zero
        assert_eq!(Rgb::parse_hex("#-ffffffffffffffffffff").ok(), Some(Rgb::default()));
    }

    #[test]
    fn from_ints_wraps_modulo_256() {
        assert_eq!(Rgb::from_ints(256, 300, -1), Rgb::new(0, 44, 255));
    }
}
