// Author: Jacques Murray
//
// Sends one watchdog heartbeat using settings from the environment.
//
//   MONIBOT_API_KEY=... cargo run --example heartbeat -- <watchdogId>
//
// Press Ctrl-C while it is retrying to cancel the call.

use monibot::{Api, CancellationToken, Config, Error, HttpTransport, Logger, Sender};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    let Some(watchdog_id) = std::env::args().nth(1) else {
        eprintln!("usage: heartbeat <watchdogId>");
        std::process::exit(2);
    };

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    // Print every trial and exchange to stderr
    let logger: Arc<dyn Logger> = Arc::new(|args: fmt::Arguments<'_>| eprintln!("DEBUG: {args}"));
    let transport = match HttpTransport::new(&config, Arc::clone(&logger)) {
        Ok(transport) => transport,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };
    let api = Api::with_sender(Sender::new(transport, config.policy()).with_logger(logger));

    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_ctrl_c.cancel();
        }
    });

    println!("--- Sending heartbeat for watchdog {watchdog_id} ---");
    let start = Instant::now();

    match api.post_watchdog_heartbeat(&watchdog_id, &cancel).await {
        Ok(()) => println!("Success"),
        Err(Error::Cancelled) => println!("Cancelled"),
        Err(e) => {
            println!("Failed: {e}");
            std::process::exit(1);
        }
    }
    println!("Total time: {:?}", start.elapsed());
}
