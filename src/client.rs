use std::future::Future;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::config::{Capabilities, ClimateConfig, DeviceAxisConfig};
use crate::decode::decode;
use crate::diff::diff_state;
use crate::encode::{encode_fan, encode_mode, encode_preset, encode_temperature};
use crate::error::TransportError;
use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::dps_to_json;
use crate::types::*;
use crate::{Error, Result};

pub const DEFAULT_MIN_TEMP: f64 = 7.0;
pub const DEFAULT_MAX_TEMP: f64 = 35.0;

/// Raw datapoint access to one device. Connection handling and retries live
/// behind this trait.
pub trait Transport: Send {
    fn read_snapshot(
        &mut self,
    ) -> impl Future<Output = std::result::Result<Dps, TransportError>> + Send;

    fn write(
        &mut self,
        dp: DpId,
        value: Value,
    ) -> impl Future<Output = std::result::Result<(), TransportError>> + Send;
}

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;
type StateCallback = Box<dyn Fn(&ClimateState) + Send + Sync>;

pub struct ClimateDeviceBuilder<T> {
    config: ClimateConfig,
    transport: T,
    event_callbacks: Vec<EventCallback>,
    state_callbacks: Vec<StateCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
}

impl<T: Transport> ClimateDeviceBuilder<T> {
    pub fn new(config: ClimateConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            event_callbacks: Vec::new(),
            state_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn on_state(mut self, f: impl Fn(&ClimateState) + Send + Sync + 'static) -> Self {
        self.state_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<ClimateDevice<T>> {
        let config = self.config.resolve()?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        Ok(ClimateDevice {
            transport: self.transport,
            config,
            dps: Dps::new(),
            state: ClimateState::default(),
            last_update: None,
            event_callbacks: self.event_callbacks,
            state_callbacks: self.state_callbacks,
            logger,
        })
    }
}

/// Climate session for one device: caches the last decoded state and turns
/// requested changes into ordered datapoint writes.
pub struct ClimateDevice<T> {
    transport: T,
    config: DeviceAxisConfig,
    dps: Dps,
    state: ClimateState,
    last_update: Option<DateTime<Utc>>,
    event_callbacks: Vec<EventCallback>,
    state_callbacks: Vec<StateCallback>,
    logger: Option<MessageLogger>,
}

impl<T: Transport> ClimateDevice<T> {
    pub fn builder(config: ClimateConfig, transport: T) -> ClimateDeviceBuilder<T> {
        ClimateDeviceBuilder::new(config, transport)
    }

    pub fn config(&self) -> &DeviceAxisConfig {
        &self.config
    }

    pub fn capabilities(&self) -> Capabilities {
        self.config.capabilities()
    }

    /// Last decoded state. All fields are unset until the first snapshot.
    pub fn current_state(&self) -> &ClimateState {
        &self.state
    }

    pub fn last_update(&self) -> Result<DateTime<Utc>> {
        self.last_update.ok_or(Error::StaleSnapshot)
    }

    pub fn min_temp(&self) -> f64 {
        self.state.min_temperature.unwrap_or(DEFAULT_MIN_TEMP)
    }

    pub fn max_temp(&self) -> f64 {
        self.state.max_temperature.unwrap_or(DEFAULT_MAX_TEMP)
    }

    /// Feed a snapshot pushed by the transport. Partial snapshots are merged
    /// into what is already known.
    pub fn apply_snapshot(&mut self, dps: &Dps) {
        for (dp, value) in dps {
            self.dps.insert(*dp, value.clone());
        }
        self.last_update = Some(Utc::now());

        if let Some(ref mut logger) = self.logger {
            logger.log_snapshot(&dps_to_json(&self.dps));
        }

        let next = decode(&self.state, &self.dps, &self.config);
        let events = diff_state(&self.state, &next);
        self.state = next;

        for event in &events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
        for cb in &self.state_callbacks {
            cb(&self.state);
        }

        if !events.is_empty() {
            debug!(count = events.len(), "climate state changed");
        }
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let dps = self.transport.read_snapshot().await?;
        trace!(count = dps.len(), "read snapshot");
        self.apply_snapshot(&dps);
        Ok(())
    }

    // -- Command methods --

    pub async fn set_temperature(&mut self, value: f64) -> Result<()> {
        let write = encode_temperature(value, &self.config)?;
        self.issue("set_temperature", &value.to_string(), vec![write])
            .await
    }

    /// Set the operating mode, powering the device on first when needed.
    pub async fn set_mode(&mut self, mode: HvacMode) -> Result<()> {
        let writes = encode_mode(mode, &self.state, &self.config)?;
        self.issue("set_mode", mode.as_str(), writes).await
    }

    pub async fn set_preset(&mut self, preset: Preset) -> Result<()> {
        let writes = encode_preset(preset, &self.config)?;
        self.issue("set_preset", preset.as_str(), writes).await
    }

    pub async fn set_fan(&mut self, speed: FanSpeed) -> Result<()> {
        let writes = encode_fan(speed, &self.state, &self.config)?;
        self.issue("set_fan", speed.as_str(), writes).await
    }

    // -- Helpers --

    /// Issue writes in order. Returns once the last write was handed to the
    /// transport; nothing is retried or rolled back.
    async fn issue(&mut self, action: &str, argument: &str, writes: Vec<RawWrite>) -> Result<()> {
        let sequence = Uuid::new_v4();
        debug!(%sequence, action, argument, writes = writes.len(), "issuing write sequence");

        if let Some(ref mut logger) = self.logger {
            logger.log_command(action, sequence, argument);
        }

        for write in writes {
            if let Some(ref mut logger) = self.logger {
                logger.log_write(sequence, &write);
            }
            trace!(dp = write.dp, value = %write.value, "writing datapoint");
            self.transport.write(write.dp, write.value).await?;

            if let Some(delay) = write.settle {
                tokio::time::sleep(delay).await;
            }
        }
        Ok(())
    }
}
