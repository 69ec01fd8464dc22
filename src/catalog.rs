//! Fixed catalog of raw encodings, one namespace per axis.
//!
//! Every lookup is total: an unknown name yields an empty [`Scheme`], which
//! disables the axis instead of failing. Entry order inside a table is
//! significant. Some tables reuse a raw value for more than one abstract
//! value, and decoding always resolves to the first entry that matches.

use serde_json::Value;

use crate::types::{FanSpeed, HvacAction, HvacMode, Preset};

/// Raw encoding of one abstract value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawCode {
    Bool(bool),
    Str(&'static str),
    /// Equivalent raw strings. Any of them decodes; the first one is written.
    OneOf(&'static [&'static str]),
}

impl RawCode {
    pub fn matches(&self, raw: &Value) -> bool {
        match (self, raw) {
            (RawCode::Bool(b), Value::Bool(r)) => b == r,
            (RawCode::Str(s), Value::String(r)) => s == r,
            (RawCode::OneOf(set), Value::String(r)) => set.contains(&r.as_str()),
            _ => false,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            RawCode::Bool(b) => Value::Bool(*b),
            RawCode::Str(s) => Value::from(*s),
            RawCode::OneOf(set) => set.first().map_or(Value::Null, |s| Value::from(*s)),
        }
    }
}

type Table<K> = &'static [(K, RawCode)];

/// Named, immutable mapping between one axis's abstract values and raw codes.
#[derive(Debug, Clone, Copy)]
pub struct Scheme<K: 'static> {
    name: &'static str,
    entries: Table<K>,
}

impl<K: Copy + PartialEq> Scheme<K> {
    pub const fn empty() -> Self {
        Self {
            name: "",
            entries: &[],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    /// First entry whose raw code matches wins.
    pub fn decode(&self, raw: &Value) -> Option<K> {
        self.entries
            .iter()
            .find(|(_, code)| code.matches(raw))
            .map(|(k, _)| *k)
    }

    pub fn encode(&self, key: K) -> Option<Value> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, code)| code.to_value())
    }
}

const MODE_SCHEMES: &[(&str, Table<HvacMode>)] = &[
    (
        "manual/auto",
        &[
            (HvacMode::Heat, RawCode::Str("manual")),
            (HvacMode::Auto, RawCode::Str("auto")),
        ],
    ),
    (
        "Manual/Auto",
        &[
            (HvacMode::Heat, RawCode::Str("Manual")),
            (HvacMode::Auto, RawCode::Str("Auto")),
        ],
    ),
    ("True/False", &[(HvacMode::Heat, RawCode::Bool(true))]),
    (
        "Breville",
        &[
            (HvacMode::Cool, RawCode::Str("heat_low")),
            (HvacMode::Heat, RawCode::OneOf(&["heat_high", "heat_0"])),
        ],
    ),
];

const ACTION_SCHEMES: &[(&str, Table<HvacAction>)] = &[
    (
        "Breville",
        &[
            (HvacAction::Heating, RawCode::OneOf(&["heat_high", "heat_0"])),
            (HvacAction::Cooling, RawCode::Str("Cooling")),
        ],
    ),
    (
        "True/False",
        &[
            (HvacAction::Heating, RawCode::Bool(true)),
            (HvacAction::Off, RawCode::Bool(false)),
        ],
    ),
    (
        "open/close",
        &[
            (HvacAction::Heating, RawCode::Str("open")),
            (HvacAction::Off, RawCode::Str("close")),
        ],
    ),
    (
        "heating/no_heating",
        &[
            (HvacAction::Heating, RawCode::Str("heating")),
            (HvacAction::Off, RawCode::Str("no_heating")),
        ],
    ),
];

const PRESET_SCHEMES: &[(&str, Table<Preset>)] = &[(
    "Manual/Holiday/Program",
    &[
        (Preset::None, RawCode::Str("Manual")),
        (Preset::Away, RawCode::Str("Holiday")),
        (Preset::Home, RawCode::Str("Program")),
    ],
)];

const FAN_SCHEMES: &[(&str, Table<FanSpeed>)] = &[(
    "High/Medium/Low",
    &[
        (FanSpeed::High, RawCode::Str("High")),
        (FanSpeed::Medium, RawCode::Str("Medium")),
        (FanSpeed::Low, RawCode::Str("Low")),
    ],
)];

fn lookup<K: Copy + PartialEq>(tables: &'static [(&'static str, Table<K>)], name: &str) -> Scheme<K> {
    tables
        .iter()
        .find(|(n, _)| *n == name)
        .map_or(Scheme::empty(), |(n, entries)| Scheme {
            name: *n,
            entries: *entries,
        })
}

pub fn mode_scheme(name: &str) -> Scheme<HvacMode> {
    lookup(MODE_SCHEMES, name)
}

pub fn action_scheme(name: &str) -> Scheme<HvacAction> {
    lookup(ACTION_SCHEMES, name)
}

pub fn preset_scheme(name: &str) -> Scheme<Preset> {
    lookup(PRESET_SCHEMES, name)
}

/// Generic fan tables written to a dedicated fan datapoint.
pub fn fan_scheme(name: &str) -> Scheme<FanSpeed> {
    lookup(FAN_SCHEMES, name)
}

pub fn mode_scheme_names() -> impl Iterator<Item = &'static str> {
    MODE_SCHEMES.iter().map(|(n, _)| *n)
}

pub fn action_scheme_names() -> impl Iterator<Item = &'static str> {
    ACTION_SCHEMES.iter().map(|(n, _)| *n)
}

pub fn preset_scheme_names() -> impl Iterator<Item = &'static str> {
    PRESET_SCHEMES.iter().map(|(n, _)| *n)
}

pub fn fan_scheme_names() -> impl Iterator<Item = &'static str> {
    FAN_SCHEMES
        .iter()
        .map(|(n, _)| *n)
        .chain(COUPLED_FAN_TABLES.iter().map(|t| t.name))
}

type FanSubTable = &'static [(FanSpeed, &'static str)];

/// Fan speed encoded jointly with the heat/cool sub-mode.
///
/// Cool speeds live on the fan datapoint, every other sub-table on the mode
/// datapoint.
#[derive(Debug, PartialEq, Eq)]
pub struct CoupledFanTable {
    pub name: &'static str,
    modes: &'static [(HvacMode, FanSubTable)],
}

impl CoupledFanTable {
    pub fn sub_table(&self, mode: HvacMode) -> Option<FanSubTable> {
        self.modes
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, table)| *table)
    }

    pub fn decode(&self, mode: HvacMode, raw: &Value) -> Option<FanSpeed> {
        let raw = raw.as_str()?;
        self.sub_table(mode)?
            .iter()
            .find(|(_, code)| *code == raw)
            .map(|(speed, _)| *speed)
    }

    pub fn encode(&self, mode: HvacMode, speed: FanSpeed) -> Option<&'static str> {
        self.sub_table(mode)?
            .iter()
            .find(|(s, _)| *s == speed)
            .map(|(_, code)| *code)
    }

    /// Mode whose sub-table contains `raw`, searching sub-tables in order.
    pub fn mode_of(&self, raw: &Value) -> Option<HvacMode> {
        let raw = raw.as_str()?;
        self.modes
            .iter()
            .find(|(_, table)| table.iter().any(|(_, code)| *code == raw))
            .map(|(mode, _)| *mode)
    }

    /// Distinct speeds across all sub-tables, in table order.
    pub fn speeds(&self) -> Vec<FanSpeed> {
        let mut speeds = Vec::new();
        for (_, table) in self.modes {
            for (speed, _) in *table {
                if !speeds.contains(speed) {
                    speeds.push(*speed);
                }
            }
        }
        speeds
    }
}

static COUPLED_FAN_TABLES: &[CoupledFanTable] = &[CoupledFanTable {
    name: "Breville",
    modes: &[
        (
            HvacMode::Heat,
            &[
                (FanSpeed::Low, "Heat_High"),
                (FanSpeed::Medium, "Heat_High"),
                (FanSpeed::High, "Heat_0"),
            ],
        ),
        (
            HvacMode::Cool,
            &[
                (FanSpeed::Low, "NatureWind_Low"),
                (FanSpeed::Medium, "NatureWind_High"),
                (FanSpeed::High, "CoolWind_0"),
            ],
        ),
    ],
}];

pub fn coupled_fan_table(name: &str) -> Option<&'static CoupledFanTable> {
    COUPLED_FAN_TABLES.iter().find(|t| t.name == name)
}

/// Raw values written when entering heat or cool on a mode-coupled device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSentinels {
    pub heat: &'static str,
    pub cool: &'static str,
}

const MODE_SENTINELS: &[(&str, ModeSentinels)] = &[(
    "Breville",
    ModeSentinels {
        heat: "heat_high",
        cool: "NatureWind_High",
    },
)];

/// Sentinels for devices whose action scheme implies mode coupling.
pub fn mode_sentinels(action_scheme: &str) -> Option<ModeSentinels> {
    MODE_SENTINELS
        .iter()
        .find(|(n, _)| *n == action_scheme)
        .map(|(_, s)| *s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_name_yields_empty_scheme() {
        assert!(mode_scheme("nope").is_empty());
        assert!(action_scheme("").is_empty());
        assert!(preset_scheme("Breville").is_empty());
        assert!(fan_scheme("Breville").is_empty());
        assert_eq!(mode_scheme("nope").decode(&json!("manual")), None);
    }

    #[test]
    fn namespaces_are_per_axis() {
        let mode = mode_scheme("True/False");
        let action = action_scheme("True/False");
        assert_eq!(mode.decode(&json!(true)), Some(HvacMode::Heat));
        assert_eq!(mode.decode(&json!(false)), None);
        assert_eq!(action.decode(&json!(false)), Some(HvacAction::Off));
    }

    #[test]
    fn one_of_matches_any_member_and_writes_first() {
        let scheme = mode_scheme("Breville");
        assert_eq!(scheme.decode(&json!("heat_0")), Some(HvacMode::Heat));
        assert_eq!(scheme.decode(&json!("heat_high")), Some(HvacMode::Heat));
        assert_eq!(scheme.encode(HvacMode::Heat), Some(json!("heat_high")));
        assert_eq!(scheme.decode(&json!("heat_low")), Some(HvacMode::Cool));
    }

    #[test]
    fn string_codes_do_not_match_substrings() {
        let scheme = mode_scheme("manual/auto");
        assert_eq!(scheme.decode(&json!("man")), None);
        assert_eq!(scheme.decode(&json!("Manual")), None);
    }

    #[test]
    fn raw_type_mismatch_never_matches() {
        assert!(!RawCode::Bool(true).matches(&json!("true")));
        assert!(!RawCode::Str("1").matches(&json!(1)));
    }

    #[test]
    fn coupled_table_first_match_wins() {
        let table = coupled_fan_table("Breville").unwrap();
        assert_eq!(
            table.decode(HvacMode::Heat, &json!("Heat_High")),
            Some(FanSpeed::Low)
        );
        assert_eq!(table.encode(HvacMode::Heat, FanSpeed::Medium), Some("Heat_High"));
        assert_eq!(table.decode(HvacMode::Auto, &json!("Heat_High")), None);
        assert_eq!(table.mode_of(&json!("Heat_0")), Some(HvacMode::Heat));
        assert_eq!(table.mode_of(&json!("CoolWind_0")), Some(HvacMode::Cool));
        assert_eq!(table.mode_of(&json!("heat_high")), None);
        assert_eq!(
            table.speeds(),
            vec![FanSpeed::Low, FanSpeed::Medium, FanSpeed::High]
        );
    }

    #[test]
    fn fan_names_include_coupled_tables() {
        let names: Vec<_> = fan_scheme_names().collect();
        assert_eq!(names, vec!["High/Medium/Low", "Breville"]);
    }

    #[test]
    fn sentinels_only_for_coupled_devices() {
        assert_eq!(mode_sentinels("Breville").unwrap().heat, "heat_high");
        assert!(mode_sentinels("open/close").is_none());
    }
}
