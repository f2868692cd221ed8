use log::{info, warn};
use thiserror::Error;

use crate::config::settings::LocationConfig;
use crate::location::presets::nearest_city;
use crate::models::{Coordinate, Place};

pub const DEFAULT_CITY: &str = "London";
pub const DEFAULT_COORDINATE: Coordinate = Coordinate::new(51.5074, -0.1278);
const UNNAMED_PLACE: &str = "Current Location";
const GEOCODE_RADIUS_KM: f64 = 75.0;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
    #[error("timed out waiting for a position")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

pub trait LocationProvider {
    fn permission(&self) -> Permission;
    fn request_permission(&mut self) -> Permission;
    fn current_position(&mut self) -> Result<Coordinate, LocationError>;
    fn reverse_geocode(&self, coordinate: &Coordinate) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    PermissionDenied,
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSource {
    Device,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub place: Place,
    pub source: LocationSource,
}

impl ResolvedLocation {
    fn fallback(reason: FallbackReason) -> Self {
        warn!("Using {} as location: {:?}", DEFAULT_CITY, reason);
        Self {
            place: Place::new(DEFAULT_CITY, DEFAULT_COORDINATE),
            source: LocationSource::Fallback(reason),
        }
    }
}

/// Check permission, request it if needed, then fetch a position. Every
/// failure ends at the default city.
pub fn acquire(provider: &mut impl LocationProvider) -> ResolvedLocation {
    let permission = match provider.permission() {
        Permission::Granted => Permission::Granted,
        Permission::Denied => provider.request_permission(),
    };
    if permission == Permission::Denied {
        return ResolvedLocation::fallback(FallbackReason::PermissionDenied);
    }

    match provider.current_position() {
        Ok(coordinate) => {
            let name = provider
                .reverse_geocode(&coordinate)
                .unwrap_or_else(|| UNNAMED_PLACE.to_string());
            info!(
                "Location {} ({:.4}, {:.4})",
                name, coordinate.latitude, coordinate.longitude
            );
            ResolvedLocation {
                place: Place::new(name, coordinate),
                source: LocationSource::Device,
            }
        }
        Err(LocationError::PermissionDenied) => {
            ResolvedLocation::fallback(FallbackReason::PermissionDenied)
        }
        Err(e) => ResolvedLocation::fallback(FallbackReason::Unavailable(e.to_string())),
    }
}

/// Location from `config.toml`: consent is `allow_location`, the position
/// is the configured coordinate.
#[derive(Debug, Clone)]
pub struct ConfiguredProvider {
    config: LocationConfig,
}

impl ConfiguredProvider {
    pub fn new(config: LocationConfig) -> Self {
        Self { config }
    }
}

impl LocationProvider for ConfiguredProvider {
    fn permission(&self) -> Permission {
        if self.config.allow_location {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }

    fn request_permission(&mut self) -> Permission {
        // No one to ask in a terminal; the config is the answer.
        self.permission()
    }

    fn current_position(&mut self) -> Result<Coordinate, LocationError> {
        match (self.config.latitude, self.config.longitude) {
            (Some(lat), Some(lng)) if valid(lat, lng) => Ok(Coordinate::new(lat, lng)),
            (Some(lat), Some(lng)) => Err(LocationError::Unavailable(format!(
                "({}, {}) is not a valid coordinate",
                lat, lng
            ))),
            _ => Err(LocationError::Unavailable(
                "no coordinates configured".to_string(),
            )),
        }
    }

    fn reverse_geocode(&self, coordinate: &Coordinate) -> Option<String> {
        self.config
            .name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| nearest_city(coordinate, GEOCODE_RADIUS_KM).map(|c| c.name.to_string()))
    }
}

fn valid(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedProvider {
        initial: Permission,
        on_request: Permission,
        position: Option<Result<Coordinate, LocationError>>,
        name: Option<String>,
        requested: bool,
    }

    impl ScriptedProvider {
        fn new(initial: Permission, on_request: Permission) -> Self {
            Self {
                initial,
                on_request,
                position: Some(Ok(Coordinate::new(30.0444, 31.2357))),
                name: Some("Cairo".to_string()),
                requested: false,
            }
        }
    }

    impl LocationProvider for ScriptedProvider {
        fn permission(&self) -> Permission {
            self.initial
        }
        fn request_permission(&mut self) -> Permission {
            self.requested = true;
            self.on_request
        }
        fn current_position(&mut self) -> Result<Coordinate, LocationError> {
            self.position.take().unwrap_or(Err(LocationError::Timeout))
        }
        fn reverse_geocode(&self, _: &Coordinate) -> Option<String> {
            self.name.clone()
        }
    }

    #[test]
    fn granted_permission_is_not_requested_again() {
        let mut p = ScriptedProvider::new(Permission::Granted, Permission::Denied);
        let resolved = acquire(&mut p);
        assert!(!p.requested);
        assert_eq!(resolved.source, LocationSource::Device);
        assert_eq!(resolved.place.name, "Cairo");
    }

    #[test]
    fn request_can_grant() {
        let mut p = ScriptedProvider::new(Permission::Denied, Permission::Granted);
        let resolved = acquire(&mut p);
        assert!(p.requested);
        assert_eq!(resolved.source, LocationSource::Device);
    }

    #[test]
    fn denied_falls_back_to_london() {
        let mut p = ScriptedProvider::new(Permission::Denied, Permission::Denied);
        let resolved = acquire(&mut p);
        assert_eq!(
            resolved.source,
            LocationSource::Fallback(FallbackReason::PermissionDenied)
        );
        assert_eq!(resolved.place.name, "London");
        assert_eq!(resolved.place.coordinate, DEFAULT_COORDINATE);
    }

    #[test]
    fn position_error_falls_back() {
        let mut p = ScriptedProvider::new(Permission::Granted, Permission::Granted);
        p.position = Some(Err(LocationError::Timeout));
        let resolved = acquire(&mut p);
        assert!(matches!(
            resolved.source,
            LocationSource::Fallback(FallbackReason::Unavailable(_))
        ));
        assert_eq!(resolved.place.name, "London");
    }

    #[test]
    fn missing_geocode_gets_generic_name() {
        let mut p = ScriptedProvider::new(Permission::Granted, Permission::Granted);
        p.name = None;
        assert_eq!(acquire(&mut p).place.name, "Current Location");
    }

    #[test]
    fn configured_provider_follows_config() {
        let mut config = LocationConfig::default();
        let resolved = acquire(&mut ConfiguredProvider::new(config.clone()));
        assert!(matches!(resolved.source, LocationSource::Fallback(FallbackReason::Unavailable(_))));

        config.latitude = Some(21.4230);
        config.longitude = Some(39.8250);
        let resolved = acquire(&mut ConfiguredProvider::new(config.clone()));
        assert_eq!(resolved.source, LocationSource::Device);
        assert_eq!(resolved.place.name, "Mecca");

        config.name = Some("Masjid al-Haram".to_string());
        let resolved = acquire(&mut ConfiguredProvider::new(config.clone()));
        assert_eq!(resolved.place.name, "Masjid al-Haram");

        config.allow_location = false;
        let resolved = acquire(&mut ConfiguredProvider::new(config));
        assert_eq!(
            resolved.source,
            LocationSource::Fallback(FallbackReason::PermissionDenied)
        );
    }

    #[test]
    fn out_of_range_coordinates_fall_back() {
        let config = LocationConfig {
            latitude: Some(123.0),
            longitude: Some(10.0),
            ..LocationConfig::default()
        };
        let resolved = acquire(&mut ConfiguredProvider::new(config));
        assert_eq!(resolved.place.name, "London");
    }
}
