//! Enumerated recovery settings: multipliers and rounding modes.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ProfileError, SettingKind};
use crate::numbers::{clamp_f64_to_i64, i64_to_f64};

/// Share of a resource restored by a long rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecoveryMultiplier {
    None,
    Quarter,
    Half,
    Full,
}

impl RecoveryMultiplier {
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Quarter => 0.25,
            Self::Half => 0.5,
            Self::Full => 1.0,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Quarter => "quarter",
            Self::Half => "half",
            Self::Full => "full",
        }
    }

    /// Decode the stored setting value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SettingParse`] unless `value` is one of the
    /// recognised multiplier strings.
    pub fn from_setting(key: &str, value: &Value) -> Result<Self, ProfileError> {
        value
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| parse_error(key, SettingKind::RecoveryMultiplier, value))
    }
}

impl FromStr for RecoveryMultiplier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "quarter" => Ok(Self::Quarter),
            "half" => Ok(Self::Half),
            "full" => Ok(Self::Full),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RecoveryMultiplier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How fractional recovery amounts become whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundingMethod {
    /// Always round down (floor)
    Down,
    /// Always round up (ceiling)
    Up,
    /// Round to the nearest integer, halves away from zero
    Round,
}

impl RoundingMethod {
    #[must_use]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Down => value.floor(),
            Self::Up => value.ceil(),
            Self::Round => value.round(),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
            Self::Round => "round",
        }
    }

    /// Decode the stored setting value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::SettingParse`] unless `value` is one of the
    /// recognised rounding strings.
    pub fn from_setting(key: &str, value: &Value) -> Result<Self, ProfileError> {
        value
            .as_str()
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| parse_error(key, SettingKind::Rounding, value))
    }
}

impl FromStr for RoundingMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "down" => Ok(Self::Down),
            "up" => Ok(Self::Up),
            "round" => Ok(Self::Round),
            _ => Err(()),
        }
    }
}

impl fmt::Display for RoundingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Amount of a `maximum` pool restored under the given multiplier and rounding.
#[must_use]
pub fn recovered_amount(maximum: i64, multiplier: RecoveryMultiplier, rounding: RoundingMethod) -> i64 {
    let scaled = i64_to_f64(maximum) * multiplier.factor();
    clamp_f64_to_i64(rounding.apply(scaled))
}

fn parse_error(key: &str, kind: SettingKind, value: &Value) -> ProfileError {
    ProfileError::SettingParse {
        key: key.to_string(),
        kind,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn multipliers_decode_every_case() {
        for (raw, factor) in [("none", 0.0), ("quarter", 0.25), ("half", 0.5), ("full", 1.0)] {
            let multiplier = RecoveryMultiplier::from_setting("k", &json!(raw)).unwrap();
            assert!((multiplier.factor() - factor).abs() < f64::EPSILON);
            assert_eq!(multiplier.to_string(), raw);
        }
    }

    #[test]
    fn unknown_multiplier_is_a_parse_error() {
        let err = RecoveryMultiplier::from_setting("hp", &json!("double")).unwrap_err();
        assert!(matches!(
            err,
            ProfileError::SettingParse {
                kind: SettingKind::RecoveryMultiplier,
                ..
            }
        ));
        assert!(RecoveryMultiplier::from_setting("hp", &json!(1)).is_err());
        assert!(RecoveryMultiplier::from_setting("hp", &Value::Null).is_err());
    }

    #[test]
    fn rounding_methods_match_floor_ceil_round() {
        let down = RoundingMethod::from_setting("k", &json!("down")).unwrap();
        let up = RoundingMethod::from_setting("k", &json!("up")).unwrap();
        let round = RoundingMethod::from_setting("k", &json!("round")).unwrap();
        assert!((down.apply(2.5) - 2.0).abs() < f64::EPSILON);
        assert!((up.apply(2.1) - 3.0).abs() < f64::EPSILON);
        assert!((round.apply(2.5) - 3.0).abs() < f64::EPSILON);
        assert!(RoundingMethod::from_setting("k", &json!("Down")).is_err());
    }

    #[test]
    fn recovered_amount_combines_both_settings() {
        assert_eq!(
            recovered_amount(5, RecoveryMultiplier::Half, RoundingMethod::Down),
            2
        );
        assert_eq!(
            recovered_amount(5, RecoveryMultiplier::Half, RoundingMethod::Up),
            3
        );
        assert_eq!(
            recovered_amount(7, RecoveryMultiplier::Quarter, RoundingMethod::Round),
            2
        );
        assert_eq!(
            recovered_amount(9, RecoveryMultiplier::None, RoundingMethod::Up),
            0
        );
    }

    #[test]
    fn recovered_amount_saturates_huge_pools() {
        assert_eq!(
            recovered_amount(i64::MAX, RecoveryMultiplier::Full, RoundingMethod::Down),
            i64::MAX
        );
        assert!(recovered_amount(i64::MAX, RecoveryMultiplier::Half, RoundingMethod::Up) > 0);
    }
}
