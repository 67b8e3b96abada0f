//! # Currency Calculator
//!
//! Flight miles: `score * per_score_point + unlocked_cities * per_unlocked_city`.
//!
//! Monotonic non-decreasing in both arguments, which the route evaluator's
//! monotonicity guarantee depends on. Saturating arithmetic keeps that true
//! at the numeric ceiling.

use crate::config::MilesRates;

/// Miles earned for a score and an unlocked-city count.
#[must_use]
pub fn flight_miles(score: u8, unlocked_city_count: usize, rates: &MilesRates) -> u64 {
    u64::from(score)
        .saturating_mul(rates.per_score_point)
        .saturating_add((unlocked_city_count as u64).saturating_mul(rates.per_unlocked_city))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example() {
        assert_eq!(flight_miles(67, 8, &MilesRates::default()), 8700);
    }

    #[test]
    fn zero_inputs_earn_nothing() {
        assert_eq!(flight_miles(0, 0, &MilesRates::default()), 0);
    }

    #[test]
    fn monotonic_in_both_arguments() {
        let rates = MilesRates::default();
        for score in 0..100u8 {
            assert!(flight_miles(score + 1, 3, &rates) >= flight_miles(score, 3, &rates));
        }
        for cities in 0..20usize {
            assert!(flight_miles(50, cities + 1, &rates) >= flight_miles(50, cities, &rates));
        }
    }
}
