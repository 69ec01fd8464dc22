use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::catalog::{self, CoupledFanTable, ModeSentinels, Scheme};
use crate::types::*;
use crate::{Error, Result};

pub const PRECISION_WHOLE: f64 = 1.0;
pub const PRECISION_HALVES: f64 = 0.5;
pub const PRECISION_TENTHS: f64 = 0.1;

const ALLOWED_PRECISIONS: [f64; 3] = [PRECISION_WHOLE, PRECISION_HALVES, PRECISION_TENTHS];

pub const DEFAULT_PRECISION: f64 = PRECISION_TENTHS;
pub const DEFAULT_TEMPERATURE_STEP: f64 = PRECISION_HALVES;
pub const DEFAULT_ECO_VALUE: &str = "ECO";

/// Climate entry as stored by the host. Only `id`, the power datapoint, is required.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClimateConfig {
    pub id: DpId,
    pub target_temperature_dp: Option<DpId>,
    pub current_temperature_dp: Option<DpId>,
    pub min_temperature_dp: Option<DpId>,
    pub max_temperature_dp: Option<DpId>,
    pub temperature_step: Option<f64>,
    pub precision: Option<f64>,
    pub target_precision: Option<f64>,
    pub temperature_unit: Option<TemperatureUnit>,
    pub hvac_mode_dp: Option<DpId>,
    pub hvac_mode_set: Option<String>,
    pub hvac_action_dp: Option<DpId>,
    pub hvac_action_set: Option<String>,
    pub preset_dp: Option<DpId>,
    pub preset_set: Option<String>,
    pub eco_dp: Option<DpId>,
    pub eco_value: Option<Value>,
    pub fan_mode_dp: Option<DpId>,
    pub fan_mode_set: Option<String>,
    #[serde(default)]
    pub heuristic_action: bool,
}

impl ClimateConfig {
    pub fn new(power_dp: DpId) -> Self {
        Self {
            id: power_dp,
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))
    }

    /// Validate against the catalog and build the per-device axis configuration.
    pub fn resolve(&self) -> Result<DeviceAxisConfig> {
        let precision = check_precision("precision", self.precision.unwrap_or(DEFAULT_PRECISION))?;
        let target_precision =
            check_precision("target_precision", self.target_precision.unwrap_or(precision))?;
        let temperature_step = check_precision(
            "temperature_step",
            self.temperature_step.unwrap_or(DEFAULT_TEMPERATURE_STEP),
        )?;

        check_name("hvac_mode_set", self.hvac_mode_set.as_deref(), catalog::mode_scheme_names())?;
        check_name(
            "hvac_action_set",
            self.hvac_action_set.as_deref(),
            catalog::action_scheme_names(),
        )?;
        check_name("preset_set", self.preset_set.as_deref(), catalog::preset_scheme_names())?;
        check_name("fan_mode_set", self.fan_mode_set.as_deref(), catalog::fan_scheme_names())?;

        let action_set = self.hvac_action_set.as_deref().unwrap_or("");
        let mode = self.hvac_mode_dp.map(|dp| ModeAxis {
            dp,
            scheme: catalog::mode_scheme(self.hvac_mode_set.as_deref().unwrap_or("")),
            strategy: match catalog::mode_sentinels(action_set) {
                Some(sentinels) => ModeStrategy::Coupled(sentinels),
                None => ModeStrategy::Table,
            },
        });

        let action = self.hvac_action_dp.map(|dp| ActionAxis {
            dp,
            scheme: catalog::action_scheme(action_set),
        });

        let preset = self.preset_dp.map(|dp| PresetAxis {
            dp,
            scheme: catalog::preset_scheme(self.preset_set.as_deref().unwrap_or("")),
        });

        let eco = self.eco_dp.map(|dp| EcoAxis {
            dp,
            on_value: self
                .eco_value
                .clone()
                .unwrap_or_else(|| Value::from(DEFAULT_ECO_VALUE)),
        });

        let fan_set = self.fan_mode_set.as_deref().unwrap_or("");
        let fan = match catalog::coupled_fan_table(fan_set) {
            Some(table) => Some(FanAxis {
                dp: self.fan_mode_dp,
                strategy: FanStrategy::ModeCoupled(table),
            }),
            None => self.fan_mode_dp.map(|dp| FanAxis {
                dp: Some(dp),
                strategy: FanStrategy::Table(catalog::fan_scheme(fan_set)),
            }),
        };

        let resolved = DeviceAxisConfig {
            power_dp: self.id,
            mode,
            action,
            preset,
            eco,
            fan,
            target_temperature_dp: self.target_temperature_dp,
            current_temperature_dp: self.current_temperature_dp,
            min_temperature_dp: self.min_temperature_dp,
            max_temperature_dp: self.max_temperature_dp,
            precision,
            target_precision,
            temperature_step,
            temperature_unit: self.temperature_unit.unwrap_or_default(),
            heuristic_action: self.heuristic_action,
        };

        debug!(
            power_dp = resolved.power_dp,
            mode = ?resolved.mode.as_ref().map(|m| m.scheme.name()),
            action = ?resolved.action.as_ref().map(|a| a.scheme.name()),
            fan = ?resolved.fan.as_ref().map(|f| f.strategy.name()),
            heuristic = resolved.heuristic_action,
            "resolved climate configuration"
        );

        Ok(resolved)
    }
}

fn check_precision(field: &str, value: f64) -> Result<f64> {
    if ALLOWED_PRECISIONS.contains(&value) {
        Ok(value)
    } else {
        Err(Error::Config(format!(
            "{field} must be one of {ALLOWED_PRECISIONS:?}, got {value}"
        )))
    }
}

fn check_name<'a>(
    field: &str,
    name: Option<&str>,
    mut known: impl Iterator<Item = &'a str>,
) -> Result<()> {
    match name {
        Some(name) if !known.any(|k| k == name) => {
            Err(Error::Config(format!("unknown {field}: {name}")))
        }
        _ => Ok(()),
    }
}

/// How non-`Off` modes are written to the mode datapoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeStrategy {
    /// Look the mode up in the mode scheme.
    Table,
    /// Heat and cool are entered through fixed sentinels that also pick the
    /// initial fan state.
    Coupled(ModeSentinels),
}

#[derive(Debug, Clone, Copy)]
pub struct ModeAxis {
    pub dp: DpId,
    pub scheme: Scheme<HvacMode>,
    pub strategy: ModeStrategy,
}

#[derive(Debug, Clone, Copy)]
pub struct ActionAxis {
    pub dp: DpId,
    pub scheme: Scheme<HvacAction>,
}

#[derive(Debug, Clone, Copy)]
pub struct PresetAxis {
    pub dp: DpId,
    pub scheme: Scheme<Preset>,
}

#[derive(Debug, Clone)]
pub struct EcoAxis {
    pub dp: DpId,
    pub on_value: Value,
}

#[derive(Debug, Clone, Copy)]
pub enum FanStrategy {
    /// Dedicated fan datapoint with a generic table.
    Table(Scheme<FanSpeed>),
    /// Fan speed shares the mode datapoint, keyed by the current mode.
    ModeCoupled(&'static CoupledFanTable),
}

impl FanStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            FanStrategy::Table(scheme) => scheme.name(),
            FanStrategy::ModeCoupled(table) => table.name,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FanAxis {
    pub dp: Option<DpId>,
    pub strategy: FanStrategy,
}

/// Feature flags a host uses to decide which controls to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub target_temperature: bool,
    pub target_temperature_range: bool,
    pub fan_mode: bool,
    pub preset_mode: bool,
}

/// Immutable per-device axis configuration. Rebuild it to change anything.
#[derive(Debug, Clone)]
pub struct DeviceAxisConfig {
    pub power_dp: DpId,
    pub mode: Option<ModeAxis>,
    pub action: Option<ActionAxis>,
    pub preset: Option<PresetAxis>,
    pub eco: Option<EcoAxis>,
    pub fan: Option<FanAxis>,
    pub target_temperature_dp: Option<DpId>,
    pub current_temperature_dp: Option<DpId>,
    pub min_temperature_dp: Option<DpId>,
    pub max_temperature_dp: Option<DpId>,
    pub precision: f64,
    pub target_precision: f64,
    pub temperature_step: f64,
    pub temperature_unit: TemperatureUnit,
    pub heuristic_action: bool,
}

impl DeviceAxisConfig {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            target_temperature: self.target_temperature_dp.is_some(),
            target_temperature_range: self.max_temperature_dp.is_some(),
            fan_mode: self.fan.is_some_and(|f| f.dp.is_some()),
            preset_mode: self.has_presets(),
        }
    }

    pub fn has_presets(&self) -> bool {
        self.preset.is_some() || self.eco.is_some()
    }

    /// True when the action comes from the temperature heuristic rather than a datapoint.
    pub fn infers_action(&self) -> bool {
        self.heuristic_action && !self.action.is_some_and(|a| !a.scheme.is_empty())
    }

    /// Mode and preset on the same datapoint make unmatched mode values ambiguous.
    pub fn mode_shares_preset_dp(&self) -> bool {
        matches!((&self.mode, &self.preset), (Some(m), Some(p)) if m.dp == p.dp)
    }

    pub fn hvac_modes(&self) -> Option<Vec<HvacMode>> {
        let mode = self.mode.as_ref()?;
        let mut modes: Vec<HvacMode> = mode.scheme.keys().collect();
        modes.push(HvacMode::Off);
        Some(modes)
    }

    pub fn preset_modes(&self) -> Option<Vec<Preset>> {
        if !self.has_presets() {
            return None;
        }
        let mut presets: Vec<Preset> = self
            .preset
            .as_ref()
            .map(|p| p.scheme.keys().collect())
            .unwrap_or_default();
        if self.eco.is_some() {
            presets.push(Preset::Eco);
        }
        Some(presets)
    }

    pub fn fan_modes(&self) -> Option<Vec<FanSpeed>> {
        match self.fan.as_ref()?.strategy {
            FanStrategy::Table(scheme) if scheme.is_empty() => None,
            FanStrategy::Table(scheme) => Some(scheme.keys().collect()),
            FanStrategy::ModeCoupled(table) => Some(table.speeds()),
        }
    }
}
