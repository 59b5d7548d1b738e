//! Seed utility nodes

use serde_json::Value;

use super::NodeError;

/// Passes a seed through; the host's widget handles randomize and increment
#[derive(Debug, Clone, Copy, Default)]
pub struct Seed;

impl Seed {
    pub fn execute(&self, seed: u64) -> u64 {
        seed
    }
}

/// Reads the seed out of a noise object
///
/// The noise arrives as JSON: an object with a `seed` field holding an integer, an
/// integral float, or a string of digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoiseToSeed;

impl NoiseToSeed {
    pub fn extract_seed(&self, noise: &Value) -> Result<u64, NodeError> {
        let seed = match noise.get("seed") {
            None | Some(Value::Null) => return Err(NodeError::MissingNoiseSeed),
            Some(seed) => seed,
        };

        let invalid = || NodeError::InvalidNoiseSeed(seed.to_string());
        match seed {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && *f >= 0.0 && *f <= u64::MAX as f64)
                        .map(|f| f.trunc() as u64)
                })
                .ok_or_else(invalid),
            Value::String(s) => s.trim().parse::<u64>().map_err(|_| invalid()),
            Value::Bool(b) => Ok(u64::from(*b)),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seed_passthrough() {
        assert_eq!(Seed.execute(42), 42);
    }

    #[test]
    fn test_integer_seed() {
        assert_eq!(NoiseToSeed.extract_seed(&json!({ "seed": 1234 })), Ok(1234));
    }

    #[test]
    fn test_float_and_string_seeds() {
        assert_eq!(NoiseToSeed.extract_seed(&json!({ "seed": 7.9 })), Ok(7));
        assert_eq!(NoiseToSeed.extract_seed(&json!({ "seed": " 99 " })), Ok(99));
    }

    #[test]
    fn test_missing_seed() {
        assert_eq!(
            NoiseToSeed.extract_seed(&json!({ "sigma": 1.0 })),
            Err(NodeError::MissingNoiseSeed)
        );
        assert_eq!(
            NoiseToSeed.extract_seed(&json!({ "seed": null })),
            Err(NodeError::MissingNoiseSeed)
        );
        assert_eq!(
            NoiseToSeed.extract_seed(&json!("not noise")),
            Err(NodeError::MissingNoiseSeed)
        );
    }

    #[test]
    fn test_invalid_seed() {
        assert!(matches!(
            NoiseToSeed.extract_seed(&json!({ "seed": -3 })),
            Err(NodeError::InvalidNoiseSeed(_))
        ));
        assert!(matches!(
            NoiseToSeed.extract_seed(&json!({ "seed": "abc" })),
            Err(NodeError::InvalidNoiseSeed(_))
        ));
        assert!(matches!(
            NoiseToSeed.extract_seed(&json!({ "seed": [1] })),
            Err(NodeError::InvalidNoiseSeed(_))
        ));
    }
}
