use std::env;

use serde_json::{Value, json};
use tuya_climate::{
    ClimateConfig, ClimateDevice, DpId, Dps, FanSpeed, HvacMode, Preset, Transport, TransportError,
};

/// In-memory device that reflects every write into its next snapshot.
struct SimulatedDevice {
    dps: Dps,
}

impl Transport for SimulatedDevice {
    async fn read_snapshot(&mut self) -> Result<Dps, TransportError> {
        Ok(self.dps.clone())
    }

    async fn write(&mut self, dp: DpId, value: Value) -> Result<(), TransportError> {
        println!("  -> dp {dp} = {value}");
        self.dps.insert(dp, value);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> tuya_climate::Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let arg = |i: usize, default: &'static str| args.get(i).map_or(default, String::as_str);
    let usage = "usage: simulate [mode] [fan] [preset]";
    let mode = HvacMode::from_str_opt(arg(1, "heat")).expect(usage);
    let fan = FanSpeed::from_str_opt(arg(2, "high")).expect(usage);
    let preset = Preset::from_str_opt(arg(3, "eco")).expect(usage);

    let config = ClimateConfig::from_json(
        r#"{
            "id": 1,
            "target_temperature_dp": 2,
            "current_temperature_dp": 3,
            "hvac_mode_dp": 4,
            "hvac_mode_set": "manual/auto",
            "eco_dp": 5,
            "fan_mode_dp": 6,
            "fan_mode_set": "High/Medium/Low",
            "precision": 0.5,
            "heuristic_action": true
        }"#,
    )?;

    let transport = SimulatedDevice {
        dps: tuya_climate::dps_from_json(&json!({
            "1": false, "2": 40, "3": 38, "4": "manual", "5": "NORMAL", "6": "Low"
        })),
    };

    let mut device = ClimateDevice::builder(config, transport)
        .on_event(|event| println!("{event:?}"))
        .build()?;

    println!("capabilities: {:?}", device.capabilities());
    device.refresh().await?;

    println!("set_mode {}", mode.as_str());
    device.set_mode(mode).await?;
    device.refresh().await?;

    println!("set_temperature 22.5");
    device.set_temperature(22.5).await?;
    device.refresh().await?;

    println!("set_fan {}", fan.as_str());
    device.set_fan(fan).await?;
    println!("set_preset {}", preset.as_str());
    device.set_preset(preset).await?;
    device.refresh().await?;

    let state = device.current_state();
    println!(
        "mode: {:?} | action: {:?} | preset: {:?} | fan: {:?} | {:?} -> {:?}",
        state.mode,
        state.action,
        state.preset,
        state.fan,
        state.current_temperature,
        state.target_temperature,
    );
    Ok(())
}
