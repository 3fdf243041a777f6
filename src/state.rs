use crate::types::{Event, FanRate, Mode};

/// Snapshot of the device attributes the host observes. Temperatures and
/// setpoints are in the configured display unit; the codec converts to
/// Celsius at encode time.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    pub mode: Option<Mode>,
    pub status_text: String,
    pub switch_on: bool,
    pub heating_setpoint: f64,
    pub cooling_setpoint: f64,
    pub fan_rate: FanRate,
    pub inside_temperature: Option<f64>,
    /// Marks that this device talks over the local transport.
    pub connection: &'static str,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            mode: None,
            status_text: "idle".to_string(),
            switch_on: false,
            heating_setpoint: 20.0,
            cooling_setpoint: 21.0,
            fan_rate: FanRate::Auto,
            inside_temperature: None,
            connection: "local",
        }
    }
}

/// A single attribute write. User intents and reconciled responses both
/// reduce to batches of these.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Update {
    Mode(Mode),
    HeatingSetpoint(f64),
    CoolingSetpoint(f64),
    FanRate(FanRate),
    InsideTemperature(f64),
}

#[derive(Debug, Default)]
pub(crate) struct StateStore {
    state: DeviceState,
}

impl StateStore {
    pub fn snapshot(&self) -> DeviceState {
        self.state.clone()
    }

    /// Apply a batch of updates, returning change events for attributes
    /// that actually moved. Re-applying an identical batch is a no-op.
    pub fn apply(&mut self, updates: Vec<Update>) -> Vec<Event> {
        let mut events = Vec::new();
        for update in updates {
            self.apply_one(update, &mut events);
        }
        events
    }

    fn apply_one(&mut self, update: Update, events: &mut Vec<Event>) {
        let state = &mut self.state;
        match update {
            // mode, statusText and switch always move together
            Update::Mode(mode) => {
                if state.mode != Some(mode) {
                    state.mode = Some(mode);
                    state.status_text = mode.as_str().to_string();
                    events.push(Event::ModeChanged { mode });
                    events.push(Event::StatusTextChanged {
                        text: state.status_text.clone(),
                    });
                }
                let on = mode != Mode::Off;
                if state.switch_on != on {
                    state.switch_on = on;
                    events.push(Event::SwitchChanged { on });
                }
            }
            Update::HeatingSetpoint(value) => {
                if state.heating_setpoint != value {
                    state.heating_setpoint = value;
                    events.push(Event::HeatingSetpointChanged { value });
                }
            }
            Update::CoolingSetpoint(value) => {
                if state.cooling_setpoint != value {
                    state.cooling_setpoint = value;
                    events.push(Event::CoolingSetpointChanged { value });
                }
            }
            Update::FanRate(rate) => {
                if state.fan_rate != rate {
                    state.fan_rate = rate;
                    events.push(Event::FanRateChanged { rate });
                }
            }
            Update::InsideTemperature(value) => {
                if state.inside_temperature != Some(value) {
                    state.inside_temperature = Some(value);
                    // one measurement, two observers
                    events.push(Event::TemperatureChanged { value });
                    events.push(Event::PlenumTemperatureChanged { value });
                }
            }
        }
    }
}
