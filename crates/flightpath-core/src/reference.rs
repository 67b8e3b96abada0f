//! # Built-in Reference Network
//!
//! The capability cities and routes shipped with the journey map. Pages may
//! load their own network instead; this one is used when none is configured.

use crate::routes::RouteNetwork;
use crate::types::{City, Route};
use crate::FlightpathError;

/// Capability cities of the default journey map.
#[must_use]
pub fn default_cities() -> Vec<City> {
    vec![
        City::new("brand", "Brand Strategy"),
        City::new("content", "Content Marketing"),
        City::new("seo", "Search Optimization"),
        City::new("social", "Social Media"),
        City::new("email", "Email Marketing"),
        City::new("paid", "Paid Media"),
        City::new("analytics", "Marketing Analytics"),
        City::new("automation", "Marketing Automation"),
        City::new("personalization", "Personalization"),
        City::new("ai", "AI-Driven Marketing"),
    ]
}

/// Routes of the default journey map, roughly ordered by difficulty.
#[must_use]
pub fn default_routes() -> Vec<Route> {
    vec![
        Route::new("brand-content", "brand", "content", 15, 1500),
        Route::new("content-seo", "content", "seo", 25, 2500),
        Route::new("content-social", "content", "social", 25, 3000),
        Route::new("social-paid", "social", "paid", 35, 4000),
        Route::new("content-email", "content", "email", 35, 4000),
        Route::new("seo-analytics", "seo", "analytics", 45, 5500),
        Route::new("email-automation", "email", "automation", 55, 6500),
        Route::new("paid-analytics", "paid", "analytics", 50, 6000),
        Route::new("analytics-personalization", "analytics", "personalization", 65, 8000),
        Route::new("automation-personalization", "automation", "personalization", 70, 8500),
        Route::new("personalization-ai", "personalization", "ai", 80, 10000),
        Route::new("analytics-ai", "analytics", "ai", 85, 11000),
    ]
}

/// The validated default network.
pub fn default_network() -> Result<RouteNetwork, FlightpathError> {
    RouteNetwork::new(default_cities(), default_routes())
}
