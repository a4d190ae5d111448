//! Big-integer-safe JSON codec for smart-query responses.
//!
//! Contract state regularly carries token amounts above 2^53; the crate
//! enables `serde_json`'s `arbitrary_precision` feature so numbers are kept
//! as digit strings internally and survive a parse/stringify round trip
//! bit-exact instead of being forced through an `f64`.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse raw smart-query response bytes, preserving integer precision.
pub fn parse(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Serialize a value back to a JSON string, preserving integer precision.
pub fn stringify(value: &Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(value)
}

/// Deserialize smart-query response bytes into a typed value.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(bytes)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn integers_above_2_pow_53_round_trip_exactly() {
        // 10^21, the S5 balance
        let raw = br#"{"balance":1000000000000000000000}"#;
        let value = parse(raw).unwrap();
        assert_eq!(
            value["balance"].to_string(),
            "1000000000000000000000",
            "precision must not be lost"
        );
        assert_eq!(
            stringify(&value).unwrap(),
            r#"{"balance":1000000000000000000000}"#
        );
    }

    #[test]
    fn u128_values_round_trip() {
        let big: u128 = 1 << 100;
        let serialized = serde_json::to_string(&big).unwrap();
        assert_eq!(serialized, big.to_string());
        let parsed: u128 = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, big);
    }

    #[test]
    fn negative_big_integers_round_trip() {
        let big: i128 = -(1i128 << 90);
        let serialized = serde_json::to_string(&big).unwrap();
        let parsed: i128 = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed, big);
    }

    #[test]
    fn string_balances_stay_strings() {
        let raw = br#"{"balance":"1000000000000000000000"}"#;
        let value = parse(raw).unwrap();
        assert_eq!(value["balance"].as_str(), Some("1000000000000000000000"));
    }
}
