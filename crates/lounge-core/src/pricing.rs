//! Price table and the pure cost calculation.
//!
//! Cost math stays at full precision across extensions and is rounded
//! to two decimals only at the final billing point, so intermediate
//! rounding error cannot compound.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::device::DeviceType;
use crate::error::LoungeError;

/// Milliseconds per billable hour.
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Player-count mode. Selects the price-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    Single,
    Double,
    Quad,
}

impl GameType {
    pub const ALL: [Self; 3] = [Self::Single, Self::Double, Self::Quad];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::Quad => "quad",
        }
    }
}

impl std::fmt::Display for GameType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(Self::Single),
            "double" => Ok(Self::Double),
            "quad" => Ok(Self::Quad),
            _ => Err(format!("invalid game type: {s}")),
        }
    }
}

/// One configured tier: an hourly rate for a (device type, game type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRate {
    pub device_type: DeviceType,
    pub game_type: GameType,
    pub rate_per_hour: f64,
}

/// Hourly rates keyed by (device type, player-count mode).
///
/// Mutated only by administrative price updates; read by the cost
/// calculation. An absent tier is a configuration error at billing
/// time, never a free session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    rates: HashMap<(DeviceType, GameType), f64>,
}

impl PriceTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a table from stored tiers.
    #[must_use]
    pub fn from_rates(rates: impl IntoIterator<Item = PriceRate>) -> Self {
        let mut table = Self::new();
        for rate in rates {
            table.set_rate(rate.device_type, rate.game_type, rate.rate_per_hour);
        }
        table
    }

    pub fn set_rate(&mut self, device_type: DeviceType, game_type: GameType, rate_per_hour: f64) {
        self.rates
            .insert((device_type, game_type), rate_per_hour.max(0.0));
    }

    #[must_use]
    pub fn rate(&self, device_type: DeviceType, game_type: GameType) -> Option<f64> {
        self.rates.get(&(device_type, game_type)).copied()
    }

    /// All configured tiers, ordered by device type then game type.
    #[must_use]
    pub fn rates(&self) -> Vec<PriceRate> {
        let mut rates: Vec<PriceRate> = self
            .rates
            .iter()
            .map(|(&(device_type, game_type), &rate_per_hour)| PriceRate {
                device_type,
                game_type,
                rate_per_hour,
            })
            .collect();
        rates.sort_by_key(|r| (r.device_type.as_str(), r.game_type.as_str()));
        rates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Rounds a monetary amount to two decimals, half away from zero.
#[must_use]
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Computes the billed cost for elapsed play time.
///
/// Pure and deterministic: no clock access, the caller supplies the
/// elapsed milliseconds. Rounding happens here and nowhere else.
pub fn compute_cost(
    table: &PriceTable,
    device_type: DeviceType,
    game_type: GameType,
    elapsed_ms: i64,
) -> Result<f64, LoungeError> {
    let rate = table
        .rate(device_type, game_type)
        .ok_or(LoungeError::Configuration {
            device_type,
            game_type,
        })?;
    #[allow(clippy::cast_precision_loss)]
    let hours = elapsed_ms.max(0) as f64 / MS_PER_HOUR;
    Ok(round_money(rate * hours))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriceTable {
        let mut table = PriceTable::new();
        table.set_rate(DeviceType::Ps4, GameType::Single, 20.0);
        table.set_rate(DeviceType::Ps4, GameType::Double, 25.0);
        table.set_rate(DeviceType::Ps5, GameType::Double, 30.0);
        table
    }

    #[test]
    fn test_cost_one_hour_at_rate() {
        let cost = compute_cost(&table(), DeviceType::Ps4, GameType::Single, 3_600_000).unwrap();
        assert!((cost - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_rounds_to_two_decimals() {
        // 95 minutes at 20/hr = 31.666..., billed as 31.67
        let elapsed_ms = 95 * 60_000;
        let cost = compute_cost(&table(), DeviceType::Ps4, GameType::Single, elapsed_ms).unwrap();
        assert!((cost - 31.67).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_45_minutes_ps5_double() {
        let elapsed_ms = 45 * 60_000;
        let cost = compute_cost(&table(), DeviceType::Ps5, GameType::Double, elapsed_ms).unwrap();
        assert!((cost - 22.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_zero_elapsed_is_zero() {
        let cost = compute_cost(&table(), DeviceType::Ps4, GameType::Single, 0).unwrap();
        assert!((cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cost_negative_elapsed_clamps_to_zero() {
        let cost = compute_cost(&table(), DeviceType::Ps4, GameType::Single, -60_000).unwrap();
        assert!((cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_tier_is_configuration_error() {
        let err = compute_cost(&table(), DeviceType::Ps5, GameType::Quad, 3_600_000).unwrap_err();
        assert_eq!(
            err,
            LoungeError::Configuration {
                device_type: DeviceType::Ps5,
                game_type: GameType::Quad,
            }
        );
    }

    #[test]
    fn test_cost_monotonic_in_elapsed_time() {
        let table = table();
        let mut last = 0.0;
        for minutes in [0, 1, 15, 44, 45, 60, 95, 240, 1440] {
            let cost =
                compute_cost(&table, DeviceType::Ps4, GameType::Single, minutes * 60_000).unwrap();
            assert!(cost >= last, "cost should not decrease: {cost} < {last}");
            last = cost;
        }
    }

    #[test]
    fn test_set_rate_clamps_negative() {
        let mut table = PriceTable::new();
        table.set_rate(DeviceType::Ps4, GameType::Quad, -5.0);
        assert_eq!(table.rate(DeviceType::Ps4, GameType::Quad), Some(0.0));
    }

    #[test]
    fn test_rates_ordering_stable() {
        let rates = table().rates();
        let keys: Vec<(&str, &str)> = rates
            .iter()
            .map(|r| (r.device_type.as_str(), r.game_type.as_str()))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_from_rates_roundtrip() {
        let original = table();
        let rebuilt = PriceTable::from_rates(original.rates());
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_round_money_rounds_not_truncates() {
        assert!((round_money(31.666_666) - 31.67).abs() < f64::EPSILON);
        assert!((round_money(22.504) - 22.5).abs() < f64::EPSILON);
        assert!((round_money(0.996) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_game_type_roundtrip() {
        for gt in GameType::ALL {
            let parsed: GameType = gt.as_str().parse().unwrap();
            assert_eq!(parsed, gt);
            assert_eq!(gt.to_string(), gt.as_str());
        }
        assert!("triple".parse::<GameType>().is_err());
    }
}
