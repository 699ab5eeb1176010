//! # Serde Helpers
//!
//! The wallet speaks JavaScript, which means 256-bit numbers show up as
//! JSON integers when they are small, decimal strings when they are not,
//! and `0x` strings whenever somebody felt like it. These helpers accept
//! all three on the way in and emit one canonical form on the way out.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::U256;
use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

/// Parse a `U256` from either a `0x`-prefixed hex string or a decimal string.
pub fn parse_u256(s: &str) -> Result<U256, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty numeric string".to_string());
    }
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) if hex.is_empty() => Ok(U256::ZERO),
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("invalid hex number {s}: {e}")),
        None => U256::from_str(s).map_err(|e| format!("invalid decimal number {s}: {e}")),
    }
}

/// Render a `U256` as a zero-padded 32-byte `0x` hex word.
///
/// Used anywhere two values are printed side by side (mismatch errors,
/// proof identifiers) so they line up and diff cleanly.
pub fn to_hex_word(value: &U256) -> String {
    format!("0x{}", hex::encode(value.to_be_bytes::<32>()))
}

struct U256Visitor;

impl<'de> Visitor<'de> for U256Visitor {
    type Value = U256;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an unsigned integer, a decimal string, or a 0x-prefixed hex string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<U256, E> {
        Ok(U256::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<U256, E> {
        u64::try_from(v)
            .map(U256::from)
            .map_err(|_| E::custom(format!("negative value {v} is not a uint256")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<U256, E> {
        parse_u256(v).map_err(E::custom)
    }
}

/// `U256` as a JSON number when it fits in a `u64`, a decimal string otherwise.
///
/// This is how claim values travel: `"value": 1` in the common case.
pub mod value_u256 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        match u64::try_from(*value) {
            Ok(small) => serializer.serialize_u64(small),
            Err(_) => serializer.serialize_str(&value.to_string()),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(U256Visitor)
    }

    /// Optional variant for partially specified request inputs.
    pub mod option {
        use super::*;
        use serde::Deserialize;

        pub fn serialize<S: Serializer>(
            value: &Option<U256>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<U256>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] U256);

            let wrapped: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(wrapped.map(|Wrapper(v)| v))
        }
    }
}

/// `U256` as a `0x`-prefixed hex string; decimal input is accepted too.
///
/// Account identifiers (`userId`) use this form.
pub mod hex_u256 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{value:#x}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        deserializer.deserialize_any(U256Visitor)
    }

    pub mod option {
        use super::*;
        use serde::Deserialize;

        pub fn serialize<S: Serializer>(
            value: &Option<U256>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<U256>, D::Error> {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] U256);

            let wrapped: Option<Wrapper> = Option::deserialize(deserializer)?;
            Ok(wrapped.map(|Wrapper(v)| v))
        }
    }
}
