// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use log::info;
use serde::{Deserialize, Serialize};
use crate::gates::{
    CanvasSize, ChannelSettings, DistanceUnits, Gate, GateSet, ScopeError, TimeDistance,
    MAX_DAC_GATES,
};
/// Environment variable consulted when no path is given on the command line.
pub const CONFIG_ENV: &str = "UTSCOPE_CONFIG";
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GateConfig {
    pub title: String,
    pub start_us: f64,
    pub width_us: f64,
    pub level: f64,
}
impl GateConfig {
    fn new(title: &str, start_us: f64, width_us: f64, level: f64) -> Self {
        Self {
            title: title.to_owned(),
            start_us,
            width_us,
            level,
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub canvas: CanvasSize,
    pub channel: ChannelSettings,
    /// First entry is the interface gate.
    pub gates: Vec<GateConfig>,
    pub dac_capacity: usize,
    pub units: DistanceUnits,
    /// Sound velocity in the selected distance unit per μs.
    pub velocity: f64,
}
impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasSize::default(),
            channel: ChannelSettings::default(),
            gates: vec![
                GateConfig::new("Interface", 5.0, 4.0, 40.0),
                GateConfig::new("Flaw 1", 20.0, 10.0, 50.0),
                GateConfig::new("Flaw 2", 35.0, 10.0, 30.0),
            ],
            dac_capacity: MAX_DAC_GATES,
            units: DistanceUnits::Time,
            velocity: TimeDistance::default().velocity_per_us,
        }
    }
}
impl ScopeConfig {
    pub fn load(path: &Path) -> Result<Self, ScopeError> {
        let text = fs::read_to_string(path)?;
        let config: ScopeConfig = serde_json::from_str(&text)?;
        config.validate()?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }
    /// Path from the first CLI argument, else from [`CONFIG_ENV`].
    pub fn locate(arg: Option<String>) -> Option<PathBuf> {
        arg.or_else(|| std::env::var(CONFIG_ENV).ok())
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
    pub fn validate(&self) -> Result<(), ScopeError> {
        if self.canvas.width <= 0 || self.canvas.height <= 0 {
            return Err(ScopeError::InvalidCanvas {
                width: self.canvas.width,
                height: self.canvas.height,
            });
        }
        if self.gates.is_empty() {
            return Err(ScopeError::NoGates);
        }
        if self.dac_capacity == 0 || self.dac_capacity > MAX_DAC_GATES {
            return Err(ScopeError::DacCapacity {
                max: MAX_DAC_GATES,
                actual: self.dac_capacity,
            });
        }
        if !(self.channel.us_per_sample > 0.0) {
            return Err(ScopeError::InvalidSamplePeriod);
        }
        Ok(())
    }
    pub fn gate_set(&self) -> GateSet {
        GateSet::new(
            self.gates
                .iter()
                .map(|g| Gate::new(g.title.clone(), g.start_us, g.width_us, g.level))
                .collect(),
        )
    }
    pub fn time_distance(&self) -> TimeDistance {
        TimeDistance {
            units: self.units,
            velocity_per_us: self.velocity,
        }
    }
}
