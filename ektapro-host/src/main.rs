//! Ektapro dissolve controller
//!
//! Usage: `ektapro [config.toml]`
//!
//! Probes the serial ports for Kodak Ektapro projectors and reads operator
//! commands from stdin. Type `help` for the command list.

mod app;
mod config;
mod console;
mod serial;
mod timer;

use std::path::PathBuf;
use std::sync::mpsc::RecvTimeoutError;
use std::time::Instant;

use anyhow::Result;
use log::{error, info};

use crate::app::{App, Flow};
use crate::config::HostConfig;
use crate::console::{ConsoleCommand, HELP};
use crate::serial::SerialOpener;

fn main() -> Result<()> {
    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = HostConfig::load(config_path.as_deref())?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log.level.as_str()),
    )
    .init();
    info!("timing {:?}", config.timing);

    let opener = SerialOpener::new(&config.link.ports, config.link.uart())?;
    let mut app = App::new(opener, config.timing);
    app.connect();
    println!("{}", HELP);

    let input = console::spawn_reader();
    loop {
        let received = match app.wait_time(Instant::now()) {
            Some(wait) => input.recv_timeout(wait),
            None => input.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) if line.trim().is_empty() => {}
            Ok(line) => match line.parse::<ConsoleCommand>() {
                Ok(command) => match app.handle(command) {
                    Ok(Flow::Quit) => break,
                    Ok(Flow::Continue) => {}
                    Err(e) => {
                        error!("{:#}", e);
                        println!("error: {:#}", e);
                    }
                },
                Err(e) => println!("{}", e),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        app.run_due_tick(Instant::now());
    }

    info!("shutting down");
    app.shutdown();
    Ok(())
}
