use std::collections::HashMap;

use tracing::debug;

use crate::state::DeviceState;
use crate::types::{DisplayUnit, Mode};
use crate::units::to_device_unit;

pub const SET_CONTROL_INFO: &str = "/skyfi/aircon/set_control_info";
pub const GET_CONTROL_INFO: &str = "/skyfi/aircon/get_control_info";
pub const GET_SENSOR_INFO: &str = "/skyfi/aircon/get_sensor_info";

/// Wire `mode` value sent when the recorded mode has no code of its own
/// (off, or never set). The device ignores it while `pow=0`.
const DEFAULT_MODE_CODE: u8 = 0;

/// Placeholder `stemp` sent when no setpoint applies (dry/fan/off).
const DEFAULT_SETPOINT_C: i32 = 20;

/// Build the `set_control_info` query string from the recorded state.
/// Parameter order is fixed: pow, mode, stemp, shum, f_rate, f_dir.
/// Never fails; unmapped values fall back to their defaults.
pub fn encode_control(state: &DeviceState, unit: DisplayUnit) -> String {
    let power = match state.mode {
        Some(Mode::Off) => 0,
        _ => 1,
    };

    let mode_code = match state.mode.and_then(|m| m.wire_code()) {
        Some(code) => code,
        None => {
            debug!(mode = ?state.mode, "mode has no wire code, encoding default");
            DEFAULT_MODE_CODE
        }
    };

    let setpoint_c = match state.mode {
        Some(Mode::Heat) => to_device_unit(state.heating_setpoint, unit).round() as i32,
        Some(Mode::Cool) => to_device_unit(state.cooling_setpoint, unit).round() as i32,
        _ => DEFAULT_SETPOINT_C,
    };

    format!(
        "pow={power}&mode={mode_code}&stemp={setpoint_c}&shum=0&f_rate={}&f_dir=0",
        state.fan_rate.wire_code()
    )
}

/// Parse a response body of comma-separated `key=value` tokens.
/// Tokens without exactly one `=` are ignored; duplicate keys: last wins.
pub fn decode_response(body: &str) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    for token in body.trim().split(',') {
        let parts: Vec<&str> = token.split('=').collect();
        if parts.len() == 2 {
            fields.insert(parts[0].to_string(), parts[1].to_string());
        }
    }
    fields
}
