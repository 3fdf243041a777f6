use std::collections::HashMap;

use tracing::debug;

use crate::state::Update;
use crate::types::{DisplayUnit, FanRate, Mode};
use crate::units::to_display_unit;

/// Turn a decoded device response into a batch of state updates.
///
/// Responses are uncorrelated with the request that triggered them, so this
/// is purely response-driven: every rule looks only at the map itself.
/// Malformed or unrecognized fields are dropped one by one rather than
/// failing the batch.
pub(crate) fn updates_from_response(
    fields: &HashMap<String, String>,
    unit: DisplayUnit,
) -> Vec<Update> {
    let mut updates = Vec::new();

    let reported_mode = fields.get("mode").and_then(|c| Mode::from_wire_code(c));

    if fields.get("pow").map(String::as_str) == Some("0") {
        // power-off wins the display; stored setpoints stay put
        updates.push(Update::Mode(Mode::Off));
    } else if let Some(mode) = reported_mode {
        updates.push(Update::Mode(mode));
    } else if let Some(code) = fields.get("mode") {
        debug!(code = %code, "unrecognized mode code in response, dropped");
    }

    if let Some(t) = fields.get("htemp").and_then(|v| v.parse::<f64>().ok()) {
        updates.push(Update::InsideTemperature(to_display_unit(t, unit)));
    }

    if let Some(sp) = fields.get("stemp").and_then(|v| v.parse::<f64>().ok()) {
        let display = to_display_unit(sp, unit);
        // attributed by the mode reported in the same response; without a
        // heat/cool mode there is no safe target, so the value is dropped
        match reported_mode {
            Some(Mode::Heat) => updates.push(Update::HeatingSetpoint(display)),
            Some(Mode::Cool) => updates.push(Update::CoolingSetpoint(display)),
            _ => debug!(stemp = sp, "setpoint without heat/cool mode, dropped"),
        }
    }

    if let Some(code) = fields.get("f_rate") {
        match FanRate::from_wire_code(code) {
            Some(rate) => updates.push(Update::FanRate(rate)),
            None => debug!(code = %code, "unrecognized fan rate code, dropped"),
        }
    }

    updates
}
