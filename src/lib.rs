mod action;
pub mod catalog;
mod client;
mod config;
mod decode;
mod diff;
mod encode;
mod error;
mod logger;
mod protocol;
mod types;

pub use action::infer_action;
pub use client::{ClimateDevice, ClimateDeviceBuilder, DEFAULT_MAX_TEMP, DEFAULT_MIN_TEMP, Transport};
pub use config::{
    ActionAxis, Capabilities, ClimateConfig, DeviceAxisConfig, EcoAxis, FanAxis, FanStrategy,
    ModeAxis, ModeStrategy, PRECISION_HALVES, PRECISION_TENTHS, PRECISION_WHOLE, PresetAxis,
};
pub use decode::decode;
pub use encode::{MODE_SETTLE_DELAY, encode_fan, encode_mode, encode_preset, encode_temperature};
pub use error::{Error, Result, TransportError};
pub use logger::MessageLogMode;
pub use protocol::{dps_from_json, dps_to_json, parse_status};
pub use types::*;
