use serde_json::{Map, Value};

use crate::types::{DpId, Dps, RawWrite};

/// Parse a status payload body. Malformed input yields an empty snapshot.
pub fn parse_status(body: &str) -> Dps {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => dps_from_json(&v),
        Err(_) => Dps::new(),
    }
}

/// Accepts `{"dps": {"1": true}}` or a bare `{"1": true}` object.
/// Keys that are not datapoint indices are skipped.
pub fn dps_from_json(payload: &Value) -> Dps {
    let map = match payload.get("dps").unwrap_or(payload) {
        Value::Object(m) => m,
        _ => return Dps::new(),
    };
    map.iter()
        .filter_map(|(key, value)| {
            let dp = key.parse::<DpId>().ok()?;
            Some((dp, value.clone()))
        })
        .collect()
}

pub fn dps_to_json(dps: &Dps) -> Value {
    let map: Map<String, Value> = dps
        .iter()
        .map(|(dp, value)| (dp.to_string(), value.clone()))
        .collect();
    Value::Object(map)
}

/// Body of a set request for one write, in the `dps` shape the device reports.
pub fn set_dps_data(write: &RawWrite) -> Value {
    let mut dps = Dps::new();
    dps.insert(write.dp, write.value.clone());
    serde_json::json!({ "dps": dps_to_json(&dps) })
}
