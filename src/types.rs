use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Datapoint index on the device.
pub type DpId = u8;

/// Raw datapoint values keyed by index, as last reported by the device.
pub type Dps = BTreeMap<DpId, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    Auto,
    HeatCool,
    Dry,
    FanOnly,
}

impl HvacMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacMode::Off => "off",
            HvacMode::Heat => "heat",
            HvacMode::Cool => "cool",
            HvacMode::Auto => "auto",
            HvacMode::HeatCool => "heat_cool",
            HvacMode::Dry => "dry",
            HvacMode::FanOnly => "fan_only",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "off" => Some(HvacMode::Off),
            "heat" => Some(HvacMode::Heat),
            "cool" => Some(HvacMode::Cool),
            "auto" => Some(HvacMode::Auto),
            "heat_cool" => Some(HvacMode::HeatCool),
            "dry" => Some(HvacMode::Dry),
            "fan_only" => Some(HvacMode::FanOnly),
            _ => None,
        }
    }
}

/// What the device is doing right now, as opposed to what it was told to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Off,
    Heating,
    Cooling,
    Idle,
}

impl HvacAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HvacAction::Off => "off",
            HvacAction::Heating => "heating",
            HvacAction::Cooling => "cooling",
            HvacAction::Idle => "idle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    None,
    Eco,
    Away,
    Boost,
    Comfort,
    Home,
    Sleep,
    Activity,
}

impl Preset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::None => "none",
            Preset::Eco => "eco",
            Preset::Away => "away",
            Preset::Boost => "boost",
            Preset::Comfort => "comfort",
            Preset::Home => "home",
            Preset::Sleep => "sleep",
            Preset::Activity => "activity",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Preset::None),
            "eco" => Some(Preset::Eco),
            "away" => Some(Preset::Away),
            "boost" => Some(Preset::Boost),
            "comfort" => Some(Preset::Comfort),
            "home" => Some(Preset::Home),
            "sleep" => Some(Preset::Sleep),
            "activity" => Some(Preset::Activity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FanSpeed {
    Low,
    Medium,
    High,
}

impl FanSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanSpeed::Low => "low",
            FanSpeed::Medium => "medium",
            FanSpeed::High => "high",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "low" => Some(FanSpeed::Low),
            "medium" => Some(FanSpeed::Medium),
            "high" => Some(FanSpeed::High),
            _ => None,
        }
    }
}

/// Writable dimension of the climate state, named in encode errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Mode,
    Preset,
    Eco,
    Fan,
    TargetTemperature,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::Mode => "hvac mode",
            Axis::Preset => "preset",
            Axis::Eco => "eco",
            Axis::Fan => "fan mode",
            Axis::TargetTemperature => "target temperature",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

/// Decoded climate state. `None` means "not known yet", never zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ClimateState {
    pub power: Option<bool>,
    pub mode: Option<HvacMode>,
    pub action: Option<HvacAction>,
    pub preset: Option<Preset>,
    pub fan: Option<FanSpeed>,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub min_temperature: Option<f64>,
    pub max_temperature: Option<f64>,
}

/// A single datapoint write produced by the encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWrite {
    pub dp: DpId,
    pub value: Value,
    /// Delay to observe after this write before issuing the next one.
    pub settle: Option<Duration>,
}

impl RawWrite {
    pub fn new(dp: DpId, value: impl Into<Value>) -> Self {
        Self {
            dp,
            value: value.into(),
            settle: None,
        }
    }

    pub fn then_wait(mut self, delay: Duration) -> Self {
        self.settle = Some(delay);
        self
    }
}

/// Events emitted when a decoded field changes between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PowerChanged { on: bool },
    ModeChanged { mode: Option<HvacMode> },
    ActionChanged { action: Option<HvacAction> },
    PresetChanged { preset: Option<Preset> },
    FanChanged { speed: Option<FanSpeed> },
    CurrentTemperatureChanged { temp: f64 },
    TargetTemperatureChanged { temp: f64 },
    TemperatureLimitsChanged { min: Option<f64>, max: Option<f64> },
}
