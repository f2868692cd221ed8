use crate::models::{Coordinate, Place};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetCity {
    pub name: &'static str,
    pub coordinate: Coordinate,
    /// Standard offset from UTC, in minutes.
    pub utc_offset: i32,
}

impl PresetCity {
    pub fn place(&self) -> Place {
        Place::new(self.name, self.coordinate)
    }
}

const fn city(name: &'static str, lat: f64, lng: f64, utc_offset: i32) -> PresetCity {
    PresetCity {
        name,
        coordinate: Coordinate::new(lat, lng),
        utc_offset,
    }
}

pub const PRESET_CITIES: &[PresetCity] = &[
    city("Auckland", -36.8509, 174.7645, 720),
    city("Berlin", 52.5200, 13.4050, 60),
    city("Cairo", 30.0444, 31.2357, 120),
    city("Chicago", 41.8781, -87.6298, -360),
    city("Dhaka", 23.8103, 90.4125, 360),
    city("Dubai", 25.2048, 55.2708, 240),
    city("Hong Kong", 22.3193, 114.1694, 480),
    city("Houston", 29.7604, -95.3698, -360),
    city("Istanbul", 41.0082, 28.9784, 180),
    city("Jakarta", -6.2088, 106.8456, 420),
    city("Johannesburg", -26.2041, 28.0473, 120),
    city("Karachi", 24.8607, 67.0011, 300),
    city("Kuala Lumpur", 3.1390, 101.6869, 480),
    city("Lagos", 6.5244, 3.3792, 60),
    city("Lahore", 31.5204, 74.3587, 300),
    city("London", 51.5074, -0.1278, 0),
    city("Los Angeles", 34.0522, -118.2437, -480),
    city("Mecca", 21.4225, 39.8262, 180),
    city("Medina", 24.5247, 39.5692, 180),
    city("Nairobi", -1.2921, 36.8219, 180),
    city("New York", 40.7128, -74.0060, -300),
    city("Paris", 48.8566, 2.3522, 60),
    city("Perth", -31.9505, 115.8605, 480),
    city("Riyadh", 24.7136, 46.6753, 180),
    city("Singapore", 1.3521, 103.8198, 480),
    city("Sydney", -33.8688, 151.2093, 600),
    city("Tokyo", 35.6762, 139.6503, 540),
    city("Toronto", 43.6532, -79.3832, -300),
    city("Vancouver", 49.2827, -123.1207, -480),
];

pub fn find_city(name: &str) -> Option<&'static PresetCity> {
    let name = name.trim();
    PRESET_CITIES
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
}

/// The closest preset within `max_km`, if any.
pub fn nearest_city(coordinate: &Coordinate, max_km: f64) -> Option<&'static PresetCity> {
    PRESET_CITIES
        .iter()
        .map(|c| (c, c.coordinate.distance_km(coordinate)))
        .filter(|(_, d)| *d <= max_km)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_cities_ignoring_case() {
        assert_eq!(find_city("kuala lumpur").unwrap().name, "Kuala Lumpur");
        assert_eq!(find_city(" MECCA ").unwrap().utc_offset, 180);
        assert!(find_city("Atlantis").is_none());
    }

    #[test]
    fn nearest_city_respects_radius() {
        let greenwich = Coordinate::new(51.4769, 0.0005);
        assert_eq!(nearest_city(&greenwich, 75.0).unwrap().name, "London");
        let mid_atlantic = Coordinate::new(30.0, -40.0);
        assert!(nearest_city(&mid_atlantic, 75.0).is_none());
    }

    #[test]
    fn table_is_sorted_by_name() {
        assert!(PRESET_CITIES.windows(2).all(|w| w[0].name < w[1].name));
    }
}
