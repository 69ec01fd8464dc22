use serde_json::Value;
use tracing::trace;

use crate::action::infer_action;
use crate::config::{DeviceAxisConfig, FanStrategy, ModeStrategy};
use crate::types::*;

/// Fold a raw snapshot into the previous state.
///
/// Datapoints missing from `dps` leave their fields untouched, so an empty
/// snapshot returns `previous` unchanged. Values that no configured scheme
/// recognises decode to `None`.
pub fn decode(previous: &ClimateState, dps: &Dps, config: &DeviceAxisConfig) -> ClimateState {
    let mut next = previous.clone();

    if let Some(on) = dps.get(&config.power_dp).and_then(Value::as_bool) {
        next.power = Some(on);
    }

    if let Some(temp) = scaled(dps, config.current_temperature_dp, config.precision) {
        next.current_temperature = Some(temp);
    }
    if let Some(temp) = scaled(dps, config.target_temperature_dp, config.target_precision) {
        next.target_temperature = Some(temp);
    }
    if let Some(min) = number(dps, config.min_temperature_dp) {
        next.min_temperature = Some(min);
    }
    if let Some(max) = number(dps, config.max_temperature_dp) {
        next.max_temperature = Some(max);
    }

    if let Some(preset) = decode_preset(previous.preset, dps, config) {
        next.preset = Some(preset);
    }

    decode_mode(&mut next, dps, config);

    if config.infers_action() {
        next.action = infer_action(
            next.mode,
            next.current_temperature,
            next.target_temperature,
            config.precision,
            previous.action,
        );
    } else if let Some(axis) = &config.action
        && let Some(raw) = dps.get(&axis.dp)
    {
        next.action = axis.scheme.decode(raw);
    }

    decode_fan(&mut next, dps, config);

    trace!(?next, "decoded climate state");
    next
}

// Multiplying by the reciprocal keeps tenths exact: 215 / 10.0 is 21.5, while
// 215 * 0.1 is not.
fn scaled(dps: &Dps, dp: Option<DpId>, precision: f64) -> Option<f64> {
    number(dps, dp).map(|raw| raw / precision.recip())
}

fn number(dps: &Dps, dp: Option<DpId>) -> Option<f64> {
    dps.get(&dp?).and_then(Value::as_f64)
}

/// `None` when the snapshot carries neither the eco nor the preset datapoint.
fn decode_preset(previous: Option<Preset>, dps: &Dps, config: &DeviceAxisConfig) -> Option<Preset> {
    let eco_raw = config.eco.as_ref().and_then(|eco| dps.get(&eco.dp));
    let preset_raw = config
        .preset
        .as_ref()
        .and_then(|p| dps.get(&p.dp).map(|raw| (p, raw)));

    if eco_raw.is_none() && preset_raw.is_none() {
        return None;
    }

    if let (Some(eco), Some(raw)) = (&config.eco, eco_raw)
        && *raw == eco.on_value
    {
        return Some(Preset::Eco);
    }

    match preset_raw {
        Some((axis, raw)) => Some(axis.scheme.decode(raw).unwrap_or(Preset::None)),
        // Eco went off but the preset datapoint was not reported.
        None if config.preset.is_some() => match previous {
            Some(Preset::Eco) | None => Some(Preset::None),
            kept => kept,
        },
        None => Some(Preset::None),
    }
}

/// Mode scheme first, then the coupled sentinels, then the coupled fan table,
/// then `Auto` when the mode datapoint also carries presets.
fn decode_mode(next: &mut ClimateState, dps: &Dps, config: &DeviceAxisConfig) {
    match (next.power, &config.mode) {
        (Some(false), _) => next.mode = Some(HvacMode::Off),
        (Some(true), Some(axis)) => {
            if let Some(raw) = dps.get(&axis.dp) {
                next.mode = axis
                    .scheme
                    .decode(raw)
                    .or_else(|| sentinel_mode(raw, axis.strategy))
                    .or_else(|| coupled_mode(raw, config))
                    .or_else(|| {
                        // Preset codes on a shared datapoint mean the device runs its program.
                        config
                            .mode_shares_preset_dp()
                            .then_some(HvacMode::Auto)
                    });
            } else if next.mode == Some(HvacMode::Off) {
                next.mode = None;
            }
        }
        (Some(true), None) => next.mode = None,
        (None, _) => {}
    }
}

fn sentinel_mode(raw: &Value, strategy: ModeStrategy) -> Option<HvacMode> {
    let ModeStrategy::Coupled(sentinels) = strategy else {
        return None;
    };
    match raw.as_str()? {
        code if code == sentinels.heat => Some(HvacMode::Heat),
        code if code == sentinels.cool => Some(HvacMode::Cool),
        _ => None,
    }
}

/// Joint mode/fan codes written by fan changes on a mode-coupled device.
fn coupled_mode(raw: &Value, config: &DeviceAxisConfig) -> Option<HvacMode> {
    match config.fan.as_ref()?.strategy {
        FanStrategy::ModeCoupled(table) => table.mode_of(raw),
        FanStrategy::Table(_) => None,
    }
}

fn decode_fan(next: &mut ClimateState, dps: &Dps, config: &DeviceAxisConfig) {
    let Some(fan) = &config.fan else {
        return;
    };

    match fan.strategy {
        FanStrategy::Table(scheme) => {
            if let Some(raw) = fan.dp.and_then(|dp| dps.get(&dp)) {
                next.fan = scheme.decode(raw);
            }
        }
        FanStrategy::ModeCoupled(table) => {
            let source = match next.mode {
                Some(HvacMode::Cool) => fan.dp,
                _ => config.mode.as_ref().map(|m| m.dp),
            };
            if let Some(raw) = source.and_then(|dp| dps.get(&dp)) {
                next.fan = next.mode.and_then(|mode| table.decode(mode, raw));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClimateConfig;
    use serde_json::json;

    fn dps(pairs: &[(DpId, Value)]) -> Dps {
        pairs.iter().cloned().collect()
    }

    fn thermostat() -> DeviceAxisConfig {
        ClimateConfig {
            target_temperature_dp: Some(2),
            current_temperature_dp: Some(3),
            hvac_mode_dp: Some(4),
            hvac_mode_set: Some("manual/auto".into()),
            precision: Some(0.5),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn scales_temperatures() {
        let config = thermostat();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(2, json!(42)), (3, json!(41))]),
            &config,
        );
        assert_eq!(state.target_temperature, Some(21.0));
        assert_eq!(state.current_temperature, Some(20.5));
    }

    #[test]
    fn tenths_scale_cleanly() {
        let config = ClimateConfig {
            current_temperature_dp: Some(3),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(&ClimateState::default(), &dps(&[(3, json!(215))]), &config);
        assert_eq!(state.current_temperature, Some(21.5));
    }

    #[test]
    fn power_off_wins_over_mode_value() {
        let config = thermostat();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(1, json!(false)), (4, json!("manual"))]),
            &config,
        );
        assert_eq!(state.mode, Some(HvacMode::Off));
        assert_eq!(state.power, Some(false));
    }

    #[test]
    fn unmatched_mode_is_unset_unless_shared_with_preset() {
        let config = thermostat();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(1, json!(true)), (4, json!("Program"))]),
            &config,
        );
        assert_eq!(state.mode, None);

        let shared = ClimateConfig {
            hvac_mode_dp: Some(4),
            hvac_mode_set: Some("Manual/Auto".into()),
            preset_dp: Some(4),
            preset_set: Some("Manual/Holiday/Program".into()),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(1, json!(true)), (4, json!("Program"))]),
            &shared,
        );
        assert_eq!(state.mode, Some(HvacMode::Auto));
        assert_eq!(state.preset, Some(Preset::Home));
    }

    #[test]
    fn power_on_without_mode_value_clears_off() {
        let config = thermostat();
        let off = decode(&ClimateState::default(), &dps(&[(1, json!(false))]), &config);
        let on = decode(&off, &dps(&[(1, json!(true))]), &config);
        assert_eq!(on.mode, None);
    }

    #[test]
    fn missing_temperatures_stay_unset() {
        let config = thermostat();
        let state = decode(&ClimateState::default(), &dps(&[(1, json!(true))]), &config);
        assert_eq!(state.current_temperature, None);
        assert_eq!(state.target_temperature, None);
    }

    #[test]
    fn limits_are_raw_numbers() {
        let config = ClimateConfig {
            min_temperature_dp: Some(9),
            max_temperature_dp: Some(10),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(9, json!(5)), (10, json!(30))]),
            &config,
        );
        assert_eq!(state.min_temperature, Some(5.0));
        assert_eq!(state.max_temperature, Some(30.0));
    }

    #[test]
    fn action_scheme_decodes_from_its_datapoint() {
        let config = ClimateConfig {
            hvac_action_dp: Some(5),
            hvac_action_set: Some("open/close".into()),
            heuristic_action: true,
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(&ClimateState::default(), &dps(&[(5, json!("open"))]), &config);
        assert_eq!(state.action, Some(HvacAction::Heating));
        let state = decode(&state, &dps(&[(5, json!("close"))]), &config);
        assert_eq!(state.action, Some(HvacAction::Off));
    }

    #[test]
    fn eco_takes_priority_over_preset_table() {
        let config = ClimateConfig {
            preset_dp: Some(7),
            preset_set: Some("Manual/Holiday/Program".into()),
            eco_dp: Some(8),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(7, json!("Holiday")), (8, json!("ECO"))]),
            &config,
        );
        assert_eq!(state.preset, Some(Preset::Eco));

        let state = decode(
            &state,
            &dps(&[(7, json!("Holiday")), (8, json!("NORMAL"))]),
            &config,
        );
        assert_eq!(state.preset, Some(Preset::Away));

        let state = decode(&state, &dps(&[(7, json!("Party"))]), &config);
        assert_eq!(state.preset, Some(Preset::None));
    }

    #[test]
    fn eco_off_alone_keeps_table_preset() {
        let config = ClimateConfig {
            preset_dp: Some(7),
            preset_set: Some("Manual/Holiday/Program".into()),
            eco_dp: Some(8),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let away = decode(
            &ClimateState::default(),
            &dps(&[(7, json!("Holiday")), (8, json!("NORMAL"))]),
            &config,
        );
        assert_eq!(away.preset, Some(Preset::Away));

        let state = decode(&away, &dps(&[(8, json!("NORMAL"))]), &config);
        assert_eq!(state.preset, Some(Preset::Away));

        let eco = decode(&state, &dps(&[(8, json!("ECO"))]), &config);
        assert_eq!(eco.preset, Some(Preset::Eco));
        let state = decode(&eco, &dps(&[(8, json!("NORMAL"))]), &config);
        assert_eq!(state.preset, Some(Preset::None));
    }

    #[test]
    fn eco_off_without_preset_table_is_none() {
        let config = ClimateConfig {
            eco_dp: Some(8),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(&ClimateState::default(), &dps(&[(8, json!("NORMAL"))]), &config);
        assert_eq!(state.preset, Some(Preset::None));
    }

    #[test]
    fn coupled_sentinels_decode_without_coupled_fan() {
        let config = ClimateConfig {
            hvac_mode_dp: Some(4),
            hvac_mode_set: Some("manual/auto".into()),
            hvac_action_dp: Some(5),
            hvac_action_set: Some("Breville".into()),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(
            &ClimateState::default(),
            &dps(&[(1, json!(true)), (4, json!("NatureWind_High"))]),
            &config,
        );
        assert_eq!(state.mode, Some(HvacMode::Cool));
        let state = decode(&state, &dps(&[(4, json!("heat_high"))]), &config);
        assert_eq!(state.mode, Some(HvacMode::Heat));
    }

    #[test]
    fn generic_fan_table() {
        let config = ClimateConfig {
            fan_mode_dp: Some(6),
            fan_mode_set: Some("High/Medium/Low".into()),
            ..ClimateConfig::new(1)
        }
        .resolve()
        .unwrap();
        let state = decode(&ClimateState::default(), &dps(&[(6, json!("Medium"))]), &config);
        assert_eq!(state.fan, Some(FanSpeed::Medium));
    }
}
