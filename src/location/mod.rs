pub mod acquire;
pub mod presets;

pub use acquire::{acquire, ConfiguredProvider, LocationSource, ResolvedLocation};
pub use presets::{find_city, PresetCity, PRESET_CITIES};
