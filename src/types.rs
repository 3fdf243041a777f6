use std::time::Duration;

use crate::{Error, Result};

/// Operating mode as recorded by the driver. `Off` is a driver-side state;
/// the wire protocol expresses it through the power flag instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Heat,
    Cool,
    Dry,
    Fan,
    Off,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Heat => "heat",
            Mode::Cool => "cool",
            Mode::Dry => "dry",
            Mode::Fan => "fan",
            Mode::Off => "off",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "heat" => Some(Mode::Heat),
            "cool" => Some(Mode::Cool),
            "dry" => Some(Mode::Dry),
            "fan" => Some(Mode::Fan),
            "off" => Some(Mode::Off),
            _ => None,
        }
    }

    /// SkyFi `mode` parameter value. `Off` has no wire code; the encoder
    /// falls back to the default and signals power-off via `pow`.
    pub fn wire_code(&self) -> Option<u8> {
        match self {
            Mode::Heat => Some(1),
            Mode::Cool => Some(2),
            Mode::Dry => Some(7),
            Mode::Fan => Some(0),
            Mode::Off => None,
        }
    }

    pub fn from_wire_code(code: &str) -> Option<Self> {
        match code {
            "1" => Some(Mode::Heat),
            "2" => Some(Mode::Cool),
            "7" => Some(Mode::Dry),
            "0" => Some(Mode::Fan),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanRate {
    #[default]
    Auto,
    Low,
    Medium,
    High,
}

impl FanRate {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanRate::Auto => "auto",
            FanRate::Low => "low",
            FanRate::Medium => "medium",
            FanRate::High => "high",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "auto" => Some(FanRate::Auto),
            "low" => Some(FanRate::Low),
            "medium" => Some(FanRate::Medium),
            "high" => Some(FanRate::High),
            _ => None,
        }
    }

    pub fn wire_code(&self) -> u8 {
        match self {
            FanRate::Auto => 0,
            FanRate::Low => 1,
            FanRate::Medium => 3,
            FanRate::High => 5,
        }
    }

    pub fn from_wire_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(FanRate::Auto),
            "1" => Some(FanRate::Low),
            "3" => Some(FanRate::Medium),
            "5" => Some(FanRate::High),
            _ => None,
        }
    }
}

/// Temperature unit shown to the user. The device itself is Celsius-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl DisplayUnit {
    pub fn is_fahrenheit(&self) -> bool {
        matches!(self, DisplayUnit::Fahrenheit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollInterval {
    Min1,
    #[default]
    Min5,
    Min10,
    Min15,
    Min30,
}

impl PollInterval {
    pub fn from_minutes(minutes: u32) -> Result<Self> {
        match minutes {
            1 => Ok(PollInterval::Min1),
            5 => Ok(PollInterval::Min5),
            10 => Ok(PollInterval::Min10),
            15 => Ok(PollInterval::Min15),
            30 => Ok(PollInterval::Min30),
            other => Err(Error::InvalidPollInterval(other)),
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            PollInterval::Min1 => 1,
            PollInterval::Min5 => 5,
            PollInterval::Min10 => 10,
            PollInterval::Min15 => 15,
            PollInterval::Min30 => 30,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(u64::from(self.minutes()) * 60)
    }
}

/// Attribute change events emitted after a batch of state updates.
/// Temperatures and setpoints are in the configured display unit.
#[derive(Debug, Clone)]
pub enum Event {
    SwitchChanged { on: bool },
    ModeChanged { mode: Mode },
    StatusTextChanged { text: String },
    TemperatureChanged { value: f64 },
    PlenumTemperatureChanged { value: f64 },
    HeatingSetpointChanged { value: f64 },
    CoolingSetpointChanged { value: f64 },
    FanRateChanged { rate: FanRate },
}
