use crate::types::DisplayUnit;

/// Convert a device-native Celsius value to the configured display unit.
/// Fahrenheit values are rounded to the nearest whole degree (half away
/// from zero, matching the device's integer-degree protocol).
pub fn to_display_unit(celsius: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Celsius => celsius,
        DisplayUnit::Fahrenheit => (celsius * 9.0 / 5.0 + 32.0).round(),
    }
}

/// Convert a display-unit value back to device Celsius, with the same
/// rounding. Round-trips are only exact to within one degree.
pub fn to_device_unit(value: f64, unit: DisplayUnit) -> f64 {
    match unit {
        DisplayUnit::Celsius => value,
        DisplayUnit::Fahrenheit => ((value - 32.0) * 5.0 / 9.0).round(),
    }
}
