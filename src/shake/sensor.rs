use anyhow::{Context, Result};
use log::warn;
use std::collections::VecDeque;
use std::path::Path;

/// One accelerometer reading, in g, stamped with milliseconds since the
/// stream started.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub timestamp_ms: u64,
}

impl AccelSample {
    pub fn new(x: f64, y: f64, z: f64, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ms,
        }
    }

    /// Vector length; NaN or infinite readings count as zero.
    pub fn magnitude(&self) -> f64 {
        let m = (self.x * self.x + self.y * self.y + self.z * self.z).sqrt();
        if m.is_finite() { m } else { 0.0 }
    }
}

/// A source of raw (x, y, z) readings, polled at the configured interval.
pub trait Accelerometer: Send {
    /// `None` once the stream has ended.
    fn read(&mut self) -> Option<(f64, f64, f64)>;
}

/// A device lying still: gravity only.
#[derive(Debug, Default)]
pub struct RestingAccelerometer;

impl Accelerometer for RestingAccelerometer {
    fn read(&mut self) -> Option<(f64, f64, f64)> {
        Some((0.0, 0.0, 1.0))
    }
}

/// Plays back a recorded trace, one `x,y,z` reading per line.
///
/// Blank lines and `#` comments are skipped. Lines that do not parse are
/// kept as NaN readings so the timing of the trace is preserved.
#[derive(Debug, Default)]
pub struct ReplayAccelerometer {
    readings: VecDeque<(f64, f64, f64)>,
}

impl ReplayAccelerometer {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Reading accelerometer trace {:?}", path))?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let readings = text
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
            .map(|(n, line)| {
                parse_reading(line).unwrap_or_else(|| {
                    warn!("Unreadable accelerometer line {}: {:?}", n, line);
                    (f64::NAN, f64::NAN, f64::NAN)
                })
            })
            .collect();
        Self { readings }
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

impl Accelerometer for ReplayAccelerometer {
    fn read(&mut self) -> Option<(f64, f64, f64)> {
        self.readings.pop_front()
    }
}

fn parse_reading(line: &str) -> Option<(f64, f64, f64)> {
    let mut parts = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>());
    let x = parts.next()?.ok()?;
    let y = parts.next()?.ok()?;
    let z = parts.next()?.ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some((x, y, z))
}
