//! Running-action inference for devices that do not report one.

use crate::types::{HvacAction, HvacMode};

// Scaled temperatures are compared with this tolerance so the hold band is
// not lost to floating point noise.
const EPSILON: f64 = 1e-9;

/// Derive the current action from the heating setpoint gap.
///
/// Only heating is modelled. Any other mode yields `None`. When either
/// temperature is unknown the previous action is kept, and so it is when the
/// current temperature sits exactly one precision step below the target, which
/// keeps the output from flapping at the boundary.
pub fn infer_action(
    mode: Option<HvacMode>,
    current: Option<f64>,
    target: Option<f64>,
    precision: f64,
    previous: Option<HvacAction>,
) -> Option<HvacAction> {
    if mode != Some(HvacMode::Heat) {
        return None;
    }
    let (Some(current), Some(target)) = (current, target) else {
        return previous;
    };

    let threshold = target - precision;
    if (current - threshold).abs() < EPSILON {
        previous
    } else if current < threshold {
        Some(HvacAction::Heating)
    } else if current + precision > target {
        Some(HvacAction::Off)
    } else {
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEAT: Option<HvacMode> = Some(HvacMode::Heat);

    #[test]
    fn below_band_heats() {
        let action = infer_action(HEAT, Some(20.0), Some(21.0), 0.5, None);
        assert_eq!(action, Some(HvacAction::Heating));
    }

    #[test]
    fn boundary_holds_previous() {
        for previous in [None, Some(HvacAction::Heating), Some(HvacAction::Off)] {
            let action = infer_action(HEAT, Some(20.5), Some(21.0), 0.5, previous);
            assert_eq!(action, previous);
        }
    }

    #[test]
    fn above_band_turns_off() {
        let action = infer_action(HEAT, Some(21.5), Some(21.0), 0.5, Some(HvacAction::Heating));
        assert_eq!(action, Some(HvacAction::Off));
        let action = infer_action(HEAT, Some(20.7), Some(21.0), 0.5, Some(HvacAction::Heating));
        assert_eq!(action, Some(HvacAction::Off));
    }

    #[test]
    fn tenths_boundary_survives_rounding() {
        let current = 204.0 / 10.0;
        let action = infer_action(HEAT, Some(current), Some(20.5), 0.1, Some(HvacAction::Off));
        assert_eq!(action, Some(HvacAction::Off));
    }

    #[test]
    fn other_modes_leave_action_unset() {
        for mode in [HvacMode::Cool, HvacMode::Auto, HvacMode::Off] {
            let action = infer_action(Some(mode), Some(15.0), Some(21.0), 0.5, Some(HvacAction::Heating));
            assert_eq!(action, None);
        }
        assert_eq!(infer_action(None, Some(15.0), Some(21.0), 0.5, None), None);
    }

    #[test]
    fn missing_temperature_keeps_previous() {
        let action = infer_action(HEAT, None, Some(21.0), 0.5, Some(HvacAction::Heating));
        assert_eq!(action, Some(HvacAction::Heating));
    }
}
