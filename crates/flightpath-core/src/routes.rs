//! # Route Unlock Evaluator
//!
//! Derives a three-state unlock status and a partial-progress percentage for
//! every capability-pair route from the current score and flight miles.
//!
//! ## Status Rules
//!
//! | Score met | Miles met | Status |
//! |-----------|-----------|--------|
//! | yes | yes | `Unlocked` |
//! | yes | no  | `Partial` |
//! | no  | yes | `Partial` |
//! | no  | no  | `Locked` |
//!
//! Statuses are recomputed on every call and never cached: they are a view
//! over score and miles, not a stored fact.
//!
//! ## City States
//!
//! A city is `Unlocked` if any touching route is unlocked, `Partial` if any
//! touching route is partial and none unlocked, else `Locked`.

use crate::FlightpathError;
use crate::config::MilesRates;
use crate::miles::flight_miles;
use crate::types::{City, CityId, Route, RouteId, RouteStatus, UnlockState};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// SINGLE ROUTE
// =============================================================================

/// Average of the two capped threshold ratios, floored, in percent.
///
/// A zero requirement counts as fully met. When both requirements are zero
/// the progress is 0.
#[must_use]
pub fn current_progress(route: &Route, score: u8, miles: u64) -> u8 {
    if route.required_score == 0 && route.required_miles == 0 {
        return 0;
    }

    // Each ratio as an exact fraction n/d of a percent.
    let ratio = |value: u128, required: u128| -> (u128, u128) {
        if required == 0 {
            (100, 1)
        } else {
            (value.min(required) * 100, required)
        }
    };

    let (n1, d1) = ratio(u128::from(score), u128::from(route.required_score));
    let (n2, d2) = ratio(u128::from(miles), u128::from(route.required_miles));

    let numerator = n1 * d2 + n2 * d1;
    let denominator = 2 * d1 * d2;
    (numerator / denominator).min(100) as u8
}

/// Evaluate one route against a score and a miles balance.
#[must_use]
pub fn evaluate(route: &Route, score: u8, miles: u64) -> RouteStatus {
    let score_met = score >= route.required_score;
    let miles_met = miles >= route.required_miles;

    let status = match (score_met, miles_met) {
        (true, true) => UnlockState::Unlocked,
        (true, false) | (false, true) => UnlockState::Partial,
        (false, false) => UnlockState::Locked,
    };

    RouteStatus {
        status,
        current_progress: current_progress(route, score, miles),
    }
}

/// Evaluate every route. Always computed fresh.
#[must_use]
pub fn evaluate_all(routes: &[Route], score: u8, miles: u64) -> BTreeMap<RouteId, RouteStatus> {
    routes
        .iter()
        .map(|route| (route.id.clone(), evaluate(route, score, miles)))
        .collect()
}

/// Ids of the unlocked routes, in id order.
#[must_use]
pub fn unlocked_routes(statuses: &BTreeMap<RouteId, RouteStatus>) -> Vec<RouteId> {
    statuses
        .iter()
        .filter(|(_, status)| status.status == UnlockState::Unlocked)
        .map(|(id, _)| id.clone())
        .collect()
}

// =============================================================================
// CITY STATES
// =============================================================================

/// Derived unlock state of one city.
#[must_use]
pub fn city_state(
    city: &CityId,
    routes: &[Route],
    statuses: &BTreeMap<RouteId, RouteStatus>,
) -> UnlockState {
    routes
        .iter()
        .filter(|route| route.touches(city))
        .filter_map(|route| statuses.get(&route.id))
        .map(|status| status.status)
        .max()
        .unwrap_or(UnlockState::Locked)
}

/// Derived unlock state of every city in the network.
#[must_use]
pub fn city_states(
    network: &RouteNetwork,
    statuses: &BTreeMap<RouteId, RouteStatus>,
) -> BTreeMap<CityId, UnlockState> {
    network
        .cities()
        .iter()
        .map(|city| {
            (
                city.id.clone(),
                city_state(&city.id, network.routes(), statuses),
            )
        })
        .collect()
}

// =============================================================================
// ROUTE NETWORK
// =============================================================================

#[derive(Deserialize)]
struct RawNetwork {
    cities: Vec<City>,
    routes: Vec<Route>,
}

/// Validated static reference data: cities and the routes between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNetwork")]
pub struct RouteNetwork {
    cities: Vec<City>,
    routes: Vec<Route>,
}

impl TryFrom<RawNetwork> for RouteNetwork {
    type Error = FlightpathError;

    fn try_from(raw: RawNetwork) -> Result<Self, Self::Error> {
        Self::new(raw.cities, raw.routes)
    }
}

impl RouteNetwork {
    /// Build a network, rejecting duplicate ids and dangling endpoints.
    ///
    /// Routes with both thresholds at zero are accepted but logged: they are
    /// unlocked for everyone and report 0 progress.
    pub fn new(cities: Vec<City>, routes: Vec<Route>) -> Result<Self, FlightpathError> {
        let mut city_ids = BTreeSet::new();
        for city in &cities {
            if !city_ids.insert(&city.id) {
                return Err(FlightpathError::InvalidReferenceData(format!(
                    "duplicate city id '{}'",
                    city.id
                )));
            }
        }

        let mut route_ids = BTreeSet::new();
        for route in &routes {
            if !route_ids.insert(&route.id) {
                return Err(FlightpathError::InvalidReferenceData(format!(
                    "duplicate route id '{}'",
                    route.id
                )));
            }
            for endpoint in [&route.from, &route.to] {
                if !city_ids.contains(endpoint) {
                    return Err(FlightpathError::InvalidReferenceData(format!(
                        "route '{}' references unknown city '{}'",
                        route.id, endpoint
                    )));
                }
            }
            if route.required_score == 0 && route.required_miles == 0 {
                tracing::warn!(route = %route.id, "route has zero score and miles thresholds");
            }
        }

        Ok(Self { cities, routes })
    }

    /// Parse a network from its JSON form (`{"cities": [...], "routes": [...]}`).
    pub fn from_json(json: &str) -> Result<Self, FlightpathError> {
        serde_json::from_str(json).map_err(|e| FlightpathError::DeserializationError(e.to_string()))
    }

    #[must_use]
    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.iter().find(|route| &route.id == id)
    }
}

// =============================================================================
// UNLOCKED-CITY RESOLUTION
// =============================================================================

/// Mutually consistent miles, route statuses and city states for one score.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub flight_miles: u64,
    pub unlocked_city_count: usize,
    pub route_statuses: BTreeMap<RouteId, RouteStatus>,
    pub city_states: BTreeMap<CityId, UnlockState>,
}

/// Resolve miles against the cities they help unlock.
///
/// Miles depend on the unlocked-city count and city states depend on miles.
/// Starting from zero cities, each round recomputes miles, route statuses and
/// the unlocked-city count until the count stops growing. Every step is
/// monotone, so the count never shrinks and at most `cities + 1` rounds run.
#[must_use]
pub fn resolve(score: u8, network: &RouteNetwork, rates: &MilesRates) -> Resolution {
    let mut unlocked_city_count = 0usize;
    let mut resolution = Resolution::default();

    for _ in 0..=network.cities().len() {
        let miles = flight_miles(score, unlocked_city_count, rates);
        let route_statuses = evaluate_all(network.routes(), score, miles);
        let city_states = city_states(network, &route_statuses);
        let unlocked = city_states
            .values()
            .filter(|state| **state == UnlockState::Unlocked)
            .count();

        resolution = Resolution {
            flight_miles: miles,
            unlocked_city_count,
            route_statuses,
            city_states,
        };

        if unlocked <= unlocked_city_count {
            break;
        }
        unlocked_city_count = unlocked;
    }

    resolution
}

// =============================================================================
// TESTS
// =============================================================================
