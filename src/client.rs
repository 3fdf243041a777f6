use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    GET_CONTROL_INFO, GET_SENSOR_INFO, SET_CONTROL_INFO, decode_response, encode_control,
};
use crate::reconcile::updates_from_response;
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::state::{DeviceState, StateStore, Update};
use crate::transport::{HttpTransport, ResponseSink, Transport};
use crate::types::{DisplayUnit, Event, FanRate, Mode, PollInterval};
use crate::{Error, Result};

const RECONFIGURE_DEBOUNCE: Duration = Duration::from_secs(5);

type EventCallback = Box<dyn Fn(&Event) + Send + Sync>;

/// Delays in the intent -> send -> poll sequence. Command < control poll
/// < sensor poll, so follow-ups cannot be requested out of order.
#[derive(Debug, Clone, Copy)]
pub struct Delays {
    pub command: Duration,
    pub control_poll: Duration,
    pub sensor_poll: Duration,
}

impl Default for Delays {
    fn default() -> Self {
        Self {
            command: Duration::from_secs(1),
            control_poll: Duration::from_secs(3),
            sensor_poll: Duration::from_secs(6),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DriverConfig {
    pub ip: String,
    pub port: u16,
    pub poll_interval: PollInterval,
    pub unit: DisplayUnit,
}

pub struct SkyfiClientBuilder {
    ip: String,
    port: u16,
    poll_interval: PollInterval,
    unit: DisplayUnit,
    delays: Delays,
    event_callbacks: Vec<EventCallback>,
    log_mode: Option<MessageLogMode>,
    log_path: Option<String>,
    scheduler: Option<Arc<dyn Scheduler>>,
    transport: Option<Arc<dyn Transport>>,
}

impl SkyfiClientBuilder {
    pub fn new(ip: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            port: 80,
            poll_interval: PollInterval::default(),
            unit: DisplayUnit::default(),
            delays: Delays::default(),
            event_callbacks: Vec::new(),
            log_mode: None,
            log_path: None,
            scheduler: None,
            transport: None,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn poll_interval(mut self, interval: PollInterval) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn display_unit(mut self, unit: DisplayUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn delays(mut self, delays: Delays) -> Self {
        self.delays = delays;
        self
    }

    pub fn on_event(mut self, f: impl Fn(&Event) + Send + Sync + 'static) -> Self {
        self.event_callbacks.push(Box::new(f));
        self
    }

    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<String>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client and start its periodic poll chain. Must be called
    /// inside a tokio runtime (the reconcile loop is a spawned task).
    pub fn build(self) -> SkyfiClient {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let sink = ResponseSink::new(tx);

        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::default()));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(HttpTransport::new()));

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(Mutex::new(
                MessageLogger::new(mode, &path).expect("failed to open log file"),
            )),
            _ => None,
        };

        let inner = Arc::new_cyclic(|weak| Inner {
            weak: weak.clone(),
            store: Mutex::new(StateStore::default()),
            config: Mutex::new(DriverConfig {
                ip: self.ip,
                port: self.port,
                poll_interval: self.poll_interval,
                unit: self.unit,
            }),
            delays: self.delays,
            scheduler,
            transport,
            sink,
            logger,
            event_callbacks: self.event_callbacks,
            last_restart: Mutex::new(None),
        });

        // Inbound response stream. Holds only a weak reference so dropping
        // the client drops Inner, which closes the sink and ends the loop.
        let weak = Arc::downgrade(&inner);
        tokio::spawn(async move {
            while let Some(body) = rx.recv().await {
                let Some(inner) = weak.upgrade() else { break };
                inner.handle_response(&body);
            }
        });

        inner.schedule_periodic_poll();
        SkyfiClient { inner }
    }
}

/// Driver for a single Daikin SkyFi unit. Commands record their intent in
/// the attribute store synchronously, then actuate via scheduled delayed
/// tasks which re-read the store at send time, so the latest intent always
/// wins even when command sequences interleave.
pub struct SkyfiClient {
    inner: Arc<Inner>,
}

struct Inner {
    /// Self-reference handed to scheduled tasks, so a pending task never
    /// keeps a dropped client alive.
    weak: Weak<Inner>,
    store: Mutex<StateStore>,
    config: Mutex<DriverConfig>,
    delays: Delays,
    scheduler: Arc<dyn Scheduler>,
    transport: Arc<dyn Transport>,
    sink: ResponseSink,
    logger: Option<Mutex<MessageLogger>>,
    event_callbacks: Vec<EventCallback>,
    last_restart: Mutex<Option<Instant>>,
}

impl SkyfiClient {
    pub fn builder(ip: impl Into<String>) -> SkyfiClientBuilder {
        SkyfiClientBuilder::new(ip)
    }

    pub fn heat(&self) {
        self.set_mode(Mode::Heat);
    }

    pub fn cool(&self) {
        self.set_mode(Mode::Cool);
    }

    pub fn dry(&self) {
        self.set_mode(Mode::Dry);
    }

    pub fn fan(&self) {
        self.set_mode(Mode::Fan);
    }

    /// Records mode=off; the encoder derives `pow=0` from it while the
    /// status text keeps showing "off".
    pub fn off(&self) {
        self.set_mode(Mode::Off);
    }

    /// Resumes whatever mode is currently recorded; does not change it.
    pub fn on(&self) {
        let mode = self.inner.snapshot().mode;
        debug!(mode = ?mode, "on: resuming recorded mode");
        self.inner.log_command("on", None);
        self.inner.schedule_command_send();
    }

    pub fn set_mode(&self, mode: Mode) {
        debug!(mode = mode.as_str(), "mode intent recorded");
        self.inner.log_command("set_mode", Some(mode.as_str()));
        self.inner.apply_and_emit(vec![Update::Mode(mode)]);
        self.inner.schedule_command_send();
    }

    pub fn set_mode_by_name(&self, name: &str) -> Result<()> {
        let mode = Mode::from_name(name).ok_or_else(|| Error::InvalidMode(name.to_string()))?;
        self.set_mode(mode);
        Ok(())
    }

    /// Value is in the configured display unit.
    pub fn set_heating_setpoint(&self, value: f64) {
        debug!(value, "heating setpoint intent recorded");
        self.inner.log_command("set_heating_setpoint", None);
        self.inner.apply_and_emit(vec![Update::HeatingSetpoint(value)]);
        self.inner.schedule_command_send();
    }

    /// Value is in the configured display unit.
    pub fn set_cooling_setpoint(&self, value: f64) {
        debug!(value, "cooling setpoint intent recorded");
        self.inner.log_command("set_cooling_setpoint", None);
        self.inner.apply_and_emit(vec![Update::CoolingSetpoint(value)]);
        self.inner.schedule_command_send();
    }

    pub fn set_fan_rate(&self, rate: FanRate) {
        debug!(rate = rate.as_str(), "fan rate intent recorded");
        self.inner.log_command("set_fan_rate", Some(rate.as_str()));
        self.inner.apply_and_emit(vec![Update::FanRate(rate)]);
        self.inner.schedule_command_send();
    }

    pub fn set_fan_rate_by_name(&self, name: &str) -> Result<()> {
        let rate =
            FanRate::from_name(name).ok_or_else(|| Error::InvalidFanRate(name.to_string()))?;
        self.set_fan_rate(rate);
        Ok(())
    }

    pub fn temp_up(&self) {
        self.nudge_setpoint(1.0);
    }

    pub fn temp_down(&self) {
        self.nudge_setpoint(-1.0);
    }

    /// Bumps the setpoint matching the current mode; a no-op in any other
    /// mode.
    fn nudge_setpoint(&self, delta: f64) {
        let state = self.inner.snapshot();
        match state.mode {
            Some(Mode::Heat) => self.set_heating_setpoint(state.heating_setpoint + delta),
            Some(Mode::Cool) => self.set_cooling_setpoint(state.cooling_setpoint + delta),
            other => debug!(mode = ?other, "setpoint nudge ignored"),
        }
    }

    /// Immediately requests control and sensor info from the device.
    pub fn refresh(&self) {
        self.inner.log_command("refresh", None);
        self.inner.poll_device();
    }

    /// Store a new configuration and restart the periodic poll chain,
    /// unscheduling every pending delayed task. The restart (not the
    /// config write) is debounced to once per five seconds to absorb
    /// rapid repeated configuration writes.
    pub fn reconfigure(&self, config: DriverConfig) {
        debug!(ip = %config.ip, port = config.port, "reconfigure");
        *self.inner.config.lock().unwrap() = config;

        {
            let mut last = self.inner.last_restart.lock().unwrap();
            if let Some(at) = *last
                && at.elapsed() < RECONFIGURE_DEBOUNCE
            {
                debug!("poll restart debounced");
                return;
            }
            *last = Some(Instant::now());
        }

        self.inner.scheduler.cancel_all();
        self.inner.schedule_periodic_poll();
    }

    pub fn state(&self) -> DeviceState {
        self.inner.snapshot()
    }

    pub fn config(&self) -> DriverConfig {
        self.inner.config.lock().unwrap().clone()
    }
}

impl Inner {
    fn snapshot(&self) -> DeviceState {
        self.store.lock().unwrap().snapshot()
    }

    fn base_url(&self) -> String {
        let config = self.config.lock().unwrap();
        format!("http://{}:{}", config.ip, config.port)
    }

    fn apply_and_emit(&self, updates: Vec<Update>) {
        let events = self.store.lock().unwrap().apply(updates);
        self.emit(&events);
    }

    fn emit(&self, events: &[Event]) {
        for event in events {
            for cb in &self.event_callbacks {
                cb(event);
            }
        }
    }

    /// Phase two of every command: the actual send is deferred so it reads
    /// the store at actuation time, not at intent time.
    fn schedule_command_send(&self) {
        let weak = self.weak.clone();
        self.scheduler.schedule(
            self.delays.command,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.send_control();
                }
            }),
        );
    }

    fn send_control(&self) {
        let query = {
            let config = self.config.lock().unwrap();
            let state = self.store.lock().unwrap().snapshot();
            encode_control(&state, config.unit)
        };
        let url = format!("{}{}?{}", self.base_url(), SET_CONTROL_INFO, query);
        debug!(query = %query, "sending control command");
        self.log_request("control", &url);
        self.transport.send(url, self.sink.clone());

        // pull back device-confirmed state
        self.schedule_poll(self.delays.control_poll, GET_CONTROL_INFO, "control-poll");
        self.schedule_poll(self.delays.sensor_poll, GET_SENSOR_INFO, "sensor-poll");
    }

    fn schedule_poll(&self, delay: Duration, path: &'static str, kind: &'static str) {
        let weak = self.weak.clone();
        self.scheduler.schedule(
            delay,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.send_get(path, kind);
                }
            }),
        );
    }

    fn send_get(&self, path: &str, kind: &str) {
        let url = format!("{}{}", self.base_url(), path);
        trace!(url = %url, "polling device");
        self.log_request(kind, &url);
        self.transport.send(url, self.sink.clone());
    }

    fn poll_device(&self) {
        self.send_get(GET_CONTROL_INFO, "control-poll");
        self.send_get(GET_SENSOR_INFO, "sensor-poll");
    }

    fn schedule_periodic_poll(&self) {
        let interval = self.config.lock().unwrap().poll_interval.duration();
        let weak = self.weak.clone();
        self.scheduler.schedule(
            interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.poll_device();
                    inner.schedule_periodic_poll();
                }
            }),
        );
    }

    fn handle_response(&self, body: &str) {
        let fields = decode_response(body);
        if let Some(ref logger) = self.logger {
            logger.lock().unwrap().log_response(body, &fields);
        }

        let unit = self.config.lock().unwrap().unit;
        let updates = updates_from_response(&fields, unit);
        if updates.is_empty() {
            trace!("response produced no updates");
            return;
        }

        let events = self.store.lock().unwrap().apply(updates);
        if !events.is_empty() {
            debug!(count = events.len(), "reconciled device response");
        }
        self.emit(&events);
    }

    fn log_command(&self, action: &str, detail: Option<&str>) {
        if let Some(ref logger) = self.logger {
            logger.lock().unwrap().log_command(action, detail);
        }
    }

    fn log_request(&self, kind: &str, url: &str) {
        if let Some(ref logger) = self.logger {
            logger.lock().unwrap().log_request(kind, url);
        }
    }
}
