pub mod detector;
pub mod sensor;

pub use detector::{ShakeConfig, ShakeDetector, ShakeEvent};
pub use sensor::{AccelSample, Accelerometer, ReplayAccelerometer, RestingAccelerometer};
