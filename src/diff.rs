use serde_json::Value;

use crate::types::*;

pub(crate) fn diff_json(
    previous: &Value,
    current: &Value,
    path_prefix: &str,
    changes: &mut Vec<(String, Value, Value)>,
) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = if path_prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{path_prefix}.{key}")
                };
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None => {
                        if curr_val.is_object() {
                            diff_json(&Value::Object(serde_json::Map::new()), curr_val, &path, changes);
                        } else {
                            changes.push((path, Value::Null, curr_val.clone()));
                        }
                    }
                }
            }
        }
        (prev, curr) if prev != curr => {
            changes.push((path_prefix.to_string(), prev.clone(), curr.clone()));
        }
        _ => {}
    }
}

/// Events for every field that differs between two decoded states.
pub(crate) fn diff_state(previous: &ClimateState, current: &ClimateState) -> Vec<Event> {
    let mut events = Vec::new();

    if previous.power != current.power
        && let Some(on) = current.power
    {
        events.push(Event::PowerChanged { on });
    }
    if previous.mode != current.mode {
        events.push(Event::ModeChanged { mode: current.mode });
    }
    if previous.action != current.action {
        events.push(Event::ActionChanged {
            action: current.action,
        });
    }
    if previous.preset != current.preset {
        events.push(Event::PresetChanged {
            preset: current.preset,
        });
    }
    if previous.fan != current.fan {
        events.push(Event::FanChanged { speed: current.fan });
    }
    if previous.current_temperature != current.current_temperature
        && let Some(temp) = current.current_temperature
    {
        events.push(Event::CurrentTemperatureChanged { temp });
    }
    if previous.target_temperature != current.target_temperature
        && let Some(temp) = current.target_temperature
    {
        events.push(Event::TargetTemperatureChanged { temp });
    }
    if previous.min_temperature != current.min_temperature
        || previous.max_temperature != current.max_temperature
    {
        events.push(Event::TemperatureLimitsChanged {
            min: current.min_temperature,
            max: current.max_temperature,
        });
    }

    events
}
