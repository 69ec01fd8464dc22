use std::time::Duration;

use tracing::debug;

use crate::config::{DeviceAxisConfig, FanStrategy, ModeStrategy};
use crate::types::*;
use crate::{Error, Result};

/// Devices reject a mode write that arrives right after power-on.
pub const MODE_SETTLE_DELAY: Duration = Duration::from_millis(100);

fn unknown(axis: Axis, value: impl Into<String>) -> Error {
    Error::UnknownValue {
        axis,
        value: value.into(),
    }
}

/// Plan the writes for a mode change.
///
/// `Off` only clears the power datapoint. Any other mode powers the device on
/// first when it is not known to be on, unless the mode datapoint doubles as
/// the power datapoint.
pub fn encode_mode(
    target: HvacMode,
    current: &ClimateState,
    config: &DeviceAxisConfig,
) -> Result<Vec<RawWrite>> {
    if target == HvacMode::Off {
        return Ok(vec![RawWrite::new(config.power_dp, false)]);
    }

    let axis = config.mode.as_ref().ok_or(Error::UnsupportedAxis(Axis::Mode))?;
    let mode_write = match (axis.strategy, target) {
        (ModeStrategy::Coupled(sentinels), HvacMode::Heat) => RawWrite::new(axis.dp, sentinels.heat),
        (ModeStrategy::Coupled(sentinels), HvacMode::Cool) => RawWrite::new(axis.dp, sentinels.cool),
        _ => {
            if axis.scheme.is_empty() {
                return Err(Error::UnsupportedAxis(Axis::Mode));
            }
            let value = axis
                .scheme
                .encode(target)
                .ok_or_else(|| unknown(Axis::Mode, target.as_str()))?;
            RawWrite::new(axis.dp, value)
        }
    };

    let mut writes = Vec::with_capacity(2);
    if current.power != Some(true) && axis.dp != config.power_dp {
        writes.push(RawWrite::new(config.power_dp, true).then_wait(MODE_SETTLE_DELAY));
    }
    writes.push(mode_write);

    debug!(mode = target.as_str(), writes = writes.len(), "planned mode change");
    Ok(writes)
}

pub fn encode_preset(preset: Preset, config: &DeviceAxisConfig) -> Result<Vec<RawWrite>> {
    if preset == Preset::Eco {
        let eco = config.eco.as_ref().ok_or(Error::UnsupportedAxis(Axis::Eco))?;
        return Ok(vec![RawWrite::new(eco.dp, eco.on_value.clone())]);
    }

    let axis = config
        .preset
        .as_ref()
        .filter(|p| !p.scheme.is_empty())
        .ok_or(Error::UnsupportedAxis(Axis::Preset))?;
    let value = axis
        .scheme
        .encode(preset)
        .ok_or_else(|| unknown(Axis::Preset, preset.as_str()))?;
    Ok(vec![RawWrite::new(axis.dp, value)])
}

/// Plan a fan speed write. Mode-coupled devices need the current mode to pick
/// both the raw code and the datapoint.
pub fn encode_fan(
    speed: FanSpeed,
    current: &ClimateState,
    config: &DeviceAxisConfig,
) -> Result<Vec<RawWrite>> {
    let fan = config.fan.as_ref().ok_or(Error::UnsupportedAxis(Axis::Fan))?;

    match fan.strategy {
        FanStrategy::Table(scheme) => {
            let dp = fan
                .dp
                .filter(|_| !scheme.is_empty())
                .ok_or(Error::UnsupportedAxis(Axis::Fan))?;
            let value = scheme
                .encode(speed)
                .ok_or_else(|| unknown(Axis::Fan, speed.as_str()))?;
            Ok(vec![RawWrite::new(dp, value)])
        }
        FanStrategy::ModeCoupled(table) => {
            let mode = current.mode.unwrap_or(HvacMode::Off);
            let code = table.encode(mode, speed).ok_or_else(|| {
                unknown(Axis::Fan, format!("{} in {} mode", speed.as_str(), mode.as_str()))
            })?;
            let dp = match mode {
                HvacMode::Cool => fan.dp.ok_or(Error::UnsupportedAxis(Axis::Fan))?,
                _ => config
                    .mode
                    .as_ref()
                    .map(|m| m.dp)
                    .ok_or(Error::UnsupportedAxis(Axis::Mode))?,
            };
            Ok(vec![RawWrite::new(dp, code)])
        }
    }
}

/// Target temperature as the device integer. Range limits are not enforced here.
pub fn encode_temperature(value: f64, config: &DeviceAxisConfig) -> Result<RawWrite> {
    let dp = config
        .target_temperature_dp
        .ok_or(Error::UnsupportedAxis(Axis::TargetTemperature))?;
    if !value.is_finite() {
        return Err(unknown(Axis::TargetTemperature, value.to_string()));
    }
    let raw = (value * config.target_precision.recip()).round() as i64;
    Ok(RawWrite::new(dp, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClimateConfig;
    use serde_json::json;

    fn powered(mode: HvacMode) -> ClimateState {
        ClimateState {
            power: Some(true),
            mode: Some(mode),
            ..Default::default()
        }
    }

    #[test]
    fn off_only_touches_power() {
        let config = ClimateConfig::new(1).resolve().unwrap();
        let writes = encode_mode(HvacMode::Off, &powered(HvacMode::Heat), &config).unwrap();
        assert_eq!(writes, vec![RawWrite::new(1, false)]);
    }

    #[test]
    fn coupled_sentinels_target_mode_datapoint() {
        let config = ClimateConfig {
            hvac_mode_dp: Some(4),
            hvac_mode_set: Some("Breville".into()),
            hvac_action_dp: Some(5),
            hvac_action_set: Some("Breville".into()),
            fan_mode_dp: Some(6),
            fan_mode_set: Some("Breville".into()),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let cool = encode_mode(HvacMode::Cool, &powered(HvacMode::Heat), &config).unwrap();
        assert_eq!(cool, vec![RawWrite::new(4, "NatureWind_High")]);
        let heat = encode_mode(HvacMode::Heat, &powered(HvacMode::Cool), &config).unwrap();
        assert_eq!(heat, vec![RawWrite::new(4, "heat_high")]);
    }

    #[test]
    fn mode_without_axis_is_unsupported() {
        let config = ClimateConfig::new(1).resolve().unwrap();
        let err = encode_mode(HvacMode::Heat, &powered(HvacMode::Off), &config).unwrap_err();
        assert!(matches!(err, Error::UnsupportedAxis(Axis::Mode)));
    }

    #[test]
    fn shared_power_and_mode_dp_skips_power_write() {
        let config = ClimateConfig {
            hvac_mode_dp: Some(1),
            hvac_mode_set: Some("True/False".into()),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let writes = encode_mode(HvacMode::Heat, &ClimateState::default(), &config).unwrap();
        assert_eq!(writes, vec![RawWrite::new(1, true)]);
    }

    #[test]
    fn powered_device_gets_single_mode_write() {
        let config = ClimateConfig {
            hvac_mode_dp: Some(4),
            hvac_mode_set: Some("Manual/Auto".into()),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let writes = encode_mode(HvacMode::Auto, &powered(HvacMode::Heat), &config).unwrap();
        assert_eq!(writes, vec![RawWrite::new(4, "Auto")]);
    }

    #[test]
    fn temperature_divides_by_target_precision() {
        let config = ClimateConfig {
            target_temperature_dp: Some(2),
            precision: Some(0.5),
            target_precision: Some(0.1),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let write = encode_temperature(21.5, &config).unwrap();
        assert_eq!(write, RawWrite::new(2, 215));
        let write = encode_temperature(21.46, &config).unwrap();
        assert_eq!(write.value, json!(215));
    }

    #[test]
    fn temperature_is_not_range_checked() {
        let config = ClimateConfig {
            target_temperature_dp: Some(2),
            precision: Some(1.0),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        assert_eq!(encode_temperature(99.0, &config).unwrap().value, json!(99));
        assert!(encode_temperature(f64::NAN, &config).is_err());
    }

    #[test]
    fn temperature_without_dp_is_unsupported() {
        let config = ClimateConfig::new(1).resolve().unwrap();
        assert!(matches!(
            encode_temperature(20.0, &config),
            Err(Error::UnsupportedAxis(Axis::TargetTemperature))
        ));
    }
}
