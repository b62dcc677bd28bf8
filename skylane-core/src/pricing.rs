use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::flight::Flight;

/// Reasons a fare can exceed the base price.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SurchargeReason {
    /// Grows with the square of the occupancy ratio.
    Occupancy,
    /// Step function of whole days until departure.
    DepartureProximity,
    /// Flat premium, placeholder for future fare classes.
    ClassPremium,
}

/// A priced fare: base plus itemized surcharges, all in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareBreakdown {
    pub base_cents: i64,
    pub surcharges: BTreeMap<SurchargeReason, i64>,
    pub total_cents: i64,
}

/// Tunables for the fare engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Weight applied to the squared occupancy ratio.
    #[serde(default = "default_occupancy_coefficient")]
    pub occupancy_coefficient: f64,
    /// Flat premium rate applied to every fare.
    #[serde(default = "default_class_premium_rate")]
    pub class_premium_rate: f64,
}

fn default_occupancy_coefficient() -> f64 {
    0.8
}

fn default_class_premium_rate() -> f64 {
    0.10
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            occupancy_coefficient: default_occupancy_coefficient(),
            class_premium_rate: default_class_premium_rate(),
        }
    }
}

/// Computes fares from live flight state.
///
/// Pure: every input is explicit, including `now`, so callers decide when a
/// quote is advisory (search display) and when it is binding (the ledger's
/// commit scope, where the total freezes into the booking).
#[derive(Debug, Clone, Default)]
pub struct FareEngine {
    config: PricingConfig,
}

impl FareEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Price one seat on `flight` as of `now`.
    ///
    /// All rounding is toward the seller: every surcharge is ceil-rounded
    /// so the total never under-collects.
    pub fn quote(&self, flight: &Flight, now: DateTime<Utc>) -> FareBreakdown {
        let base = flight.base_price_cents;
        let mut surcharges = BTreeMap::new();

        let occupancy = flight.occupancy();
        surcharges.insert(
            SurchargeReason::Occupancy,
            ceil_cents(base as f64 * occupancy * occupancy * self.config.occupancy_coefficient),
        );

        let days_out = (flight.departure_time - now).num_days();
        let proximity_rate = if days_out < 2 {
            0.35
        } else if days_out < 7 {
            0.15
        } else if days_out < 30 {
            0.05
        } else {
            0.0
        };
        surcharges.insert(
            SurchargeReason::DepartureProximity,
            ceil_cents(base as f64 * proximity_rate),
        );

        surcharges.insert(
            SurchargeReason::ClassPremium,
            ceil_cents(base as f64 * self.config.class_premium_rate),
        );

        let total = base + surcharges.values().sum::<i64>();
        FareBreakdown {
            base_cents: base,
            surcharges,
            total_cents: total,
        }
    }
}

fn ceil_cents(amount: f64) -> i64 {
    amount.max(0.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn flight_at(total: u32, available: u32, days_out: i64, now: DateTime<Utc>) -> Flight {
        let departure = now + Duration::days(days_out);
        let mut f = Flight::new(
            "SK900",
            "Chicago (ORD)",
            "Miami (MIA)",
            departure,
            departure + Duration::hours(4),
            1_000,
            total,
        );
        f.seats_available = available;
        f
    }

    #[test]
    fn test_empty_flight_far_out_charges_class_premium_only() {
        let now = Utc::now();
        let engine = FareEngine::default();
        let fare = engine.quote(&flight_at(100, 100, 60, now), now);

        assert_eq!(fare.surcharges[&SurchargeReason::Occupancy], 0);
        assert_eq!(fare.surcharges[&SurchargeReason::DepartureProximity], 0);
        assert_eq!(fare.surcharges[&SurchargeReason::ClassPremium], 100);
        assert_eq!(fare.total_cents, 1_100);
    }

    #[test]
    fn test_occupancy_surcharge_is_ceiled_square() {
        let now = Utc::now();
        let engine = FareEngine::default();
        // 50% occupancy: 1000 * 0.25 * 0.8 = 200 exactly.
        let fare = engine.quote(&flight_at(100, 50, 60, now), now);
        assert_eq!(fare.surcharges[&SurchargeReason::Occupancy], 200);

        // 90% occupancy: 1000 * 0.81 * 0.8 = 648.
        let fare = engine.quote(&flight_at(100, 10, 60, now), now);
        assert_eq!(fare.surcharges[&SurchargeReason::Occupancy], 648);
    }

    #[test]
    fn test_departure_proximity_breakpoints() {
        let now = Utc::now();
        let engine = FareEngine::default();
        let proximity = |days: i64| {
            engine.quote(&flight_at(100, 100, days, now), now).surcharges
                [&SurchargeReason::DepartureProximity]
        };

        assert_eq!(proximity(1), 350);
        assert_eq!(proximity(2), 150);
        assert_eq!(proximity(10), 50);
        assert_eq!(proximity(45), 0);
    }

    #[test]
    fn test_monotonic_in_occupancy_and_proximity() {
        let now = Utc::now();
        let engine = FareEngine::default();

        let mut last = 0;
        for available in (0..=100).rev().step_by(10) {
            let fare = engine.quote(&flight_at(100, available, 10, now), now);
            assert!(fare.total_cents >= last, "occupancy must not lower the fare");
            last = fare.total_cents;
        }

        // 40% occupancy at 10 days out vs 90% at 1 day out.
        let calm = engine.quote(&flight_at(100, 60, 10, now), now);
        let rush = engine.quote(&flight_at(100, 10, 1, now), now);
        assert!(rush.total_cents > calm.total_cents);
    }

    #[test]
    fn test_zero_capacity_prices_as_full_without_panicking() {
        let now = Utc::now();
        let engine = FareEngine::default();
        let fare = engine.quote(&flight_at(0, 0, 60, now), now);
        // o clamps to 1.0: 1000 * 1.0 * 0.8 = 800.
        assert_eq!(fare.surcharges[&SurchargeReason::Occupancy], 800);
    }

    #[test]
    fn test_total_never_undercuts_base() {
        let now = Utc::now();
        let engine = FareEngine::default();
        for days in [-1, 0, 1, 5, 20, 90] {
            let fare = engine.quote(&flight_at(100, 37, days, now), now);
            assert!(fare.total_cents >= fare.base_cents);
            assert!(fare.surcharges.values().all(|s| *s >= 0));
        }
    }
}
