use std::env;
use std::time::Duration;

use daikin_skyfi::SkyfiClient;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let ip = args.get(1).expect("usage: monitor <ip> [port]");
    let port = args
        .get(2)
        .and_then(|p| p.parse().ok())
        .unwrap_or(80u16);

    let client = SkyfiClient::builder(ip.clone())
        .port(port)
        .on_event(|event| {
            println!("{event:?}");
        })
        .build();

    println!("Watching {ip}:{port}...");
    loop {
        client.refresh();
        tokio::time::sleep(Duration::from_secs(30)).await;

        let state = client.state();
        println!(
            "mode: {} | inside: {} | heat sp: {:.1} | cool sp: {:.1} | fan: {}",
            state.status_text,
            state
                .inside_temperature
                .map_or("?".to_string(), |t| format!("{t:.1}")),
            state.heating_setpoint,
            state.cooling_setpoint,
            state.fan_rate.as_str(),
        );
    }
}
