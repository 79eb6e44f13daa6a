//! Decimal amounts, which the service may send as numbers or strings.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Number(f64),
    Text(String),
}

fn parse<E: de::Error>(raw: Raw) -> Result<f64, E> {
    match raw {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) if s.trim().is_empty() => Ok(0.0),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| E::custom(format!("invalid amount: {s:?}"))),
    }
}

/// Deserialize an amount; `null` reads as zero.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Option::<Raw>::deserialize(deserializer)?
        .map(parse)
        .unwrap_or(Ok(0.0))
}

/// Deserialize an optional amount.
pub fn deserialize_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Option::<Raw>::deserialize(deserializer)?
        .map(parse)
        .transpose()
}

/// Render an amount with two decimals.
pub fn format(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize")]
        value: f64,
    }

    #[test]
    fn test_number_and_string() {
        let a: Holder = serde_json::from_value(json!({"value": 12.5})).unwrap();
        let b: Holder = serde_json::from_value(json!({"value": "12.50"})).unwrap();
        let c: Holder = serde_json::from_value(json!({"value": null})).unwrap();
        assert_eq!(a.value, 12.5);
        assert_eq!(b.value, 12.5);
        assert_eq!(c.value, 0.0);
        assert!(serde_json::from_value::<Holder>(json!({"value": "abc"})).is_err());
    }

    #[test]
    fn test_format() {
        assert_eq!(format(3.0), "3.00");
        assert_eq!(format(1299.5), "1299.50");
    }
}
