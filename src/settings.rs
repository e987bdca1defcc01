//! Slider controls and the configs built from them
//!
//! The UI layer only produces values; configs are assembled here and
//! handed to the simulation at launch/reset time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{ConfigError, OscillatorConfig, SimulationConfig};

/// Definition of one slider
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub initial: f32,
    pub unit: &'static str,
    /// Decimal places shown next to the slider
    pub precision: usize,
}

impl ControlSpec {
    /// Clamp into range and snap to the nearest step from `min`
    pub fn snap(&self, value: f32) -> f32 {
        let clamped = value.clamp(self.min, self.max);
        let steps = ((clamped - self.min) / self.step).round();
        (self.min + steps * self.step).min(self.max)
    }

    pub fn format(&self, value: f32) -> String {
        format!("{:.*}{}", self.precision, value, self.unit)
    }
}

pub const PROJECTILE_CONTROLS: &[ControlSpec] = &[
    ControlSpec {
        key: "gravity",
        label: "Gravity:",
        min: 0.05,
        max: 0.5,
        step: 0.01,
        initial: DEFAULT_GRAVITY,
        unit: " m/s²",
        precision: 2,
    },
    ControlSpec {
        key: "initialSpeed",
        label: "Initial speed:",
        min: 5.0,
        max: 25.0,
        step: 1.0,
        initial: DEFAULT_INITIAL_SPEED,
        unit: " m/s",
        precision: 0,
    },
];

pub const OSCILLATOR_CONTROLS: &[ControlSpec] = &[
    ControlSpec {
        key: "mass",
        label: "Mass:",
        min: 1.0,
        max: 10.0,
        step: 0.1,
        initial: 5.0,
        unit: " kg",
        precision: 1,
    },
    ControlSpec {
        key: "springConstant",
        label: "Spring constant:",
        min: 0.5,
        max: 10.0,
        step: 0.1,
        initial: 2.0,
        unit: " N/m",
        precision: 1,
    },
];

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("unknown control \"{0}\"")]
    UnknownControl(String),

    #[error("missing value for control \"{0}\"")]
    MissingValue(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid controls JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Current slider values
#[derive(Debug, Clone)]
pub struct Controls {
    specs: &'static [ControlSpec],
    values: BTreeMap<String, f32>,
}

impl Controls {
    pub fn new(specs: &'static [ControlSpec]) -> Self {
        let values = specs
            .iter()
            .map(|s| (s.key.to_string(), s.initial))
            .collect();
        Self { specs, values }
    }

    pub fn projectile() -> Self {
        Self::new(PROJECTILE_CONTROLS)
    }

    pub fn oscillator() -> Self {
        Self::new(OSCILLATOR_CONTROLS)
    }

    pub fn specs(&self) -> &'static [ControlSpec] {
        self.specs
    }

    pub fn spec(&self, key: &str) -> Option<&'static ControlSpec> {
        self.specs.iter().find(|s| s.key == key)
    }

    pub fn get(&self, key: &str) -> Option<f32> {
        self.values.get(key).copied()
    }

    /// Store a slider value. Returns the snapped value actually kept.
    pub fn set(&mut self, key: &str, value: f32) -> Result<f32, SettingsError> {
        let spec = self
            .spec(key)
            .ok_or_else(|| SettingsError::UnknownControl(key.to_string()))?;
        let snapped = spec.snap(value);
        self.values.insert(spec.key.to_string(), snapped);
        log::debug!("Control {} = {}", key, spec.format(snapped));
        Ok(snapped)
    }

    /// Formatted value for the label next to a slider
    pub fn display(&self, key: &str) -> Option<String> {
        Some(self.spec(key)?.format(self.get(key)?))
    }

    fn require(&self, key: &'static str) -> Result<f32, SettingsError> {
        self.get(key).ok_or(SettingsError::MissingValue(key))
    }

    pub fn simulation_config(&self) -> Result<SimulationConfig, SettingsError> {
        let config = SimulationConfig::new(self.require("gravity")?, self.require("initialSpeed")?);
        config.validate()?;
        Ok(config)
    }

    pub fn oscillator_config(&self) -> Result<OscillatorConfig, SettingsError> {
        let config = OscillatorConfig {
            mass: self.require("mass")?,
            spring_constant: self.require("springConstant")?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(&self.values)?)
    }

    /// Values pushed from the page as `{"key": value, ...}`; unknown keys are rejected
    pub fn from_json(specs: &'static [ControlSpec], json: &str) -> Result<Self, SettingsError> {
        let incoming: BTreeMap<String, f32> = serde_json::from_str(json)?;
        let mut controls = Self::new(specs);
        for (key, value) in incoming {
            controls.set(&key, value)?;
        }
        Ok(controls)
    }
}
