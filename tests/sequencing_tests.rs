use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use daikin_skyfi::{
    DisplayUnit, DriverConfig, FanRate, ManualScheduler, Mode, PollInterval, ResponseSink,
    SkyfiClient, Transport,
};

/// Transport test double: records every URL and optionally answers with a
/// canned body, delivered straight into the inbound stream.
#[derive(Default)]
struct RecordingTransport {
    urls: Mutex<Vec<String>>,
    responses: Mutex<HashMap<String, String>>,
}

impl RecordingTransport {
    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    fn respond_with(&self, path_fragment: &str, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(path_fragment.to_string(), body.to_string());
    }
}

impl Transport for RecordingTransport {
    fn send(&self, url: String, sink: ResponseSink) {
        let body = self
            .responses
            .lock()
            .unwrap()
            .iter()
            .find(|(fragment, _)| url.contains(fragment.as_str()))
            .map(|(_, body)| body.clone());
        self.urls.lock().unwrap().push(url);
        if let Some(body) = body {
            sink.deliver(body);
        }
    }
}

fn test_client(
    scheduler: Arc<ManualScheduler>,
    transport: Arc<RecordingTransport>,
) -> SkyfiClient {
    SkyfiClient::builder("10.0.0.5")
        .scheduler(scheduler)
        .transport(transport)
        .build()
}

#[tokio::test]
async fn intent_recorded_before_any_request() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.heat();

    let state = client.state();
    assert_eq!(state.mode, Some(Mode::Heat));
    assert_eq!(state.status_text, "heat");
    assert!(state.switch_on);
    assert!(transport.urls().is_empty(), "nothing sent before actuation");
    // periodic poll + command send
    assert_eq!(scheduler.pending(), 2);
}

#[tokio::test]
async fn actuation_runs_command_then_polls_in_order() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.heat();
    assert!(scheduler.run_next()); // command send
    assert!(scheduler.run_next()); // control poll
    assert!(scheduler.run_next()); // sensor poll

    let urls = transport.urls();
    assert_eq!(
        urls[0],
        "http://10.0.0.5:80/skyfi/aircon/set_control_info?pow=1&mode=1&stemp=20&shum=0&f_rate=0&f_dir=0"
    );
    assert_eq!(urls[1], "http://10.0.0.5:80/skyfi/aircon/get_control_info");
    assert_eq!(urls[2], "http://10.0.0.5:80/skyfi/aircon/get_sensor_info");
}

#[tokio::test]
async fn later_intent_wins_even_for_earlier_send() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.heat();
    client.cool();

    // the send queued by heat() fires first, but encodes the store as it
    // is at actuation time
    assert!(scheduler.run_next());
    let urls = transport.urls();
    assert!(urls[0].contains("mode=2"), "got {}", urls[0]);
    assert!(urls[0].contains("stemp=21"), "got {}", urls[0]);
}

#[tokio::test]
async fn off_then_on_resumes_recorded_mode() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.off();
    assert!(scheduler.run_next());
    assert!(transport.urls()[0].contains("pow=0"));

    // on() does not pick a mode; the recorded one is still off
    client.on();
    assert!(scheduler.run_next());
    let urls = transport.urls();
    assert!(urls.last().unwrap().contains("set_control_info?pow=0"));
    assert_eq!(client.state().mode, Some(Mode::Off));
}

#[tokio::test]
async fn temp_up_follows_active_mode() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.cool();
    client.temp_up();

    let state = client.state();
    assert_eq!(state.cooling_setpoint, 22.0);
    assert_eq!(state.heating_setpoint, 20.0);

    client.heat();
    client.temp_down();
    assert_eq!(client.state().heating_setpoint, 19.0);
    assert_eq!(client.state().cooling_setpoint, 22.0);
}

#[tokio::test]
async fn temp_up_is_noop_without_heat_or_cool() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.temp_up();
    let state = client.state();
    assert_eq!(state.heating_setpoint, 20.0);
    assert_eq!(state.cooling_setpoint, 21.0);
    // only the periodic poll is scheduled; no command was queued
    assert_eq!(scheduler.pending(), 1);

    client.off();
    client.temp_down();
    assert_eq!(client.state().heating_setpoint, 20.0);
    assert_eq!(client.state().cooling_setpoint, 21.0);
}

#[tokio::test]
async fn fan_rate_encodes_vendor_code() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.set_fan_rate(FanRate::High);
    assert!(scheduler.run_next());
    assert!(transport.urls()[0].contains("f_rate=5"));
}

#[tokio::test]
async fn reconfigure_cancels_pending_actions() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    client.heat();
    assert_eq!(scheduler.pending(), 2);

    client.reconfigure(DriverConfig {
        ip: "10.0.0.6".to_string(),
        port: 80,
        poll_interval: PollInterval::Min1,
        unit: DisplayUnit::Celsius,
    });

    // the queued command send is gone; only the fresh periodic poll remains
    assert_eq!(scheduler.pending(), 1);
    assert!(scheduler.run_next());
    let urls = transport.urls();
    assert!(
        urls.iter()
            .all(|u| !u.contains("set_control_info")),
        "cancelled command must not fire: {urls:?}"
    );
    assert!(urls[0].starts_with("http://10.0.0.6:80/skyfi/aircon/get_control_info"));
}

#[tokio::test]
async fn rapid_reconfigure_keeps_config_but_debounces_restart() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let client = test_client(scheduler.clone(), transport.clone());

    let config = |interval| DriverConfig {
        ip: "10.0.0.5".to_string(),
        port: 80,
        poll_interval: interval,
        unit: DisplayUnit::Celsius,
    };

    client.reconfigure(config(PollInterval::Min1));
    client.reconfigure(config(PollInterval::Min30));

    // the second write landed in the config
    assert_eq!(client.config().poll_interval, PollInterval::Min30);
    // but the poll chain was not restarted again: the next poll still fires
    // at the 1-minute mark scheduled by the first reconfigure
    assert_eq!(scheduler.pending(), 1);
    assert!(scheduler.run_next());
    assert_eq!(scheduler.now(), Duration::from_secs(60));
}

#[tokio::test]
async fn periodic_poll_reschedules_itself() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    let _client = test_client(scheduler.clone(), transport.clone());

    assert_eq!(scheduler.pending(), 1);
    assert!(scheduler.run_next());
    assert_eq!(transport.urls().len(), 2); // control + sensor
    assert_eq!(scheduler.pending(), 1);
    assert!(scheduler.run_next());
    assert_eq!(scheduler.now(), Duration::from_secs(600));
}

#[tokio::test]
async fn canned_responses_reconcile_through_inbound_stream() {
    let scheduler = Arc::new(ManualScheduler::new());
    let transport = Arc::new(RecordingTransport::default());
    transport.respond_with("get_control_info", "ret=OK,pow=1,mode=2,stemp=25.0,f_rate=1");
    transport.respond_with("get_sensor_info", "ret=OK,htemp=22.5");
    let client = test_client(scheduler.clone(), transport.clone());

    client.refresh();
    // responses travel through the async inbound stream
    tokio::time::sleep(Duration::from_millis(100)).await;

    let state = client.state();
    assert_eq!(state.mode, Some(Mode::Cool));
    assert_eq!(state.cooling_setpoint, 25.0);
    assert_eq!(state.fan_rate, FanRate::Low);
    assert_eq!(state.inside_temperature, Some(22.5));
}
