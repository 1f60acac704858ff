//! Place-name resolution for GPS coordinates.
//!
//! The actual reverse-geocoding lookup is an external collaborator; this
//! module owns only its interface ([`PlaceResolver`]) and the assembly of
//! a single human-readable string from the structured result.
//!
//! The display string concatenates country code and administrative levels
//! coarse-to-fine, skipping empty parts and parts that repeat the previous
//! one ("US, California, San Francisco, San Francisco" collapses the
//! duplicate).

/// Structured result of a reverse-geocoding lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedPlace {
    /// ISO country code, e.g. `"JP"`.
    pub country_code: String,
    /// First-level administrative division (state/prefecture).
    pub admin1: String,
    /// Second-level administrative division (county/district).
    pub admin2: String,
    /// Locality name.
    pub name: String,
}

/// Reverse-geocoding lookup: decimal degrees to a structured place.
///
/// `Sync` so the derivative-free metadata pass can share one resolver
/// across threads.
pub trait PlaceResolver: Sync {
    /// Resolve a coordinate pair, or `None` when the lookup has no answer.
    fn resolve(&self, lat: f64, lng: f64) -> Option<ResolvedPlace>;
}

/// Resolver used when no lookup service is configured: every coordinate
/// stays unnamed. `location.lat`/`lng` are still recorded.
pub struct NullResolver;

impl PlaceResolver for NullResolver {
    fn resolve(&self, _lat: f64, _lng: f64) -> Option<ResolvedPlace> {
        None
    }
}

/// Assemble the display string for a resolved place.
///
/// Starts from the country code, then appends each non-empty
/// administrative level that differs from the immediately preceding part.
pub fn format_place_name(place: &ResolvedPlace) -> String {
    let mut result = place.country_code.clone();
    let mut last = "";
    for part in [&place.admin1, &place.admin2, &place.name] {
        if !part.is_empty() && last != part.as_str() {
            result.push_str(", ");
            result.push_str(part);
            last = part;
        }
    }
    result
}
