//! Console commands mapped onto the registry and the fade engine

use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Result};
use ektapro_core::{Direction, FadeEngine, Registry, TimingConfig};
use ektapro_hal::ChannelId;
use ektapro_protocol::{describe, parse_hex_triplet};
use log::{error, info};

use crate::console::{ConsoleCommand, HELP};
use crate::serial::{LinkError, SerialLink, SerialOpener, SleepDelay};
use crate::timer::DeadlineTimer;

type CoreError = ektapro_core::Error<LinkError>;

fn core_error(e: CoreError) -> anyhow::Error {
    anyhow!("{}", e)
}

/// What the main loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    opener: SerialOpener,
    registry: Registry<SerialLink, SleepDelay>,
    engine: FadeEngine,
    timer: DeadlineTimer,
}

impl App {
    pub fn new(opener: SerialOpener, timing: TimingConfig) -> Self {
        Self {
            opener,
            registry: Registry::new(),
            engine: FadeEngine::new(timing),
            timer: DeadlineTimer::new(),
        }
    }

    /// Probe every configured port
    pub fn connect(&mut self) {
        let channels: Vec<ChannelId> = self.opener.channels().collect();
        info!("probing {} serial port(s)", channels.len());
        self.registry
            .discover(&mut self.opener, &SleepDelay, channels);
        self.print_projectors();
    }

    /// Time until the engine wants its next tick
    pub fn wait_time(&self, now: Instant) -> Option<Duration> {
        self.timer.remaining(now)
    }

    /// Run the engine if its deadline has passed
    pub fn run_due_tick(&mut self, now: Instant) {
        if !self.timer.take_due(now) {
            return;
        }
        if let Err(e) = self.engine.tick(&mut self.registry, &mut self.timer) {
            error!("fade step failed: {}", e);
            println!("error: {}", e);
        }
    }

    /// Reset every projector and close the ports
    pub fn shutdown(&mut self) {
        self.registry.shutdown(&mut self.opener);
    }

    pub fn handle(&mut self, command: ConsoleCommand) -> Result<Flow> {
        match command {
            ConsoleCommand::List => self.print_projectors(),
            ConsoleCommand::Select(index) => {
                if !self.registry.select_active(Some(index)) {
                    bail!("no projector {}", index);
                }
                self.print_active();
            }
            ConsoleCommand::Init => self.registry.reset_all().map_err(core_error)?,
            ConsoleCommand::Next => self.advance(Direction::Forward)?,
            ConsoleCommand::Prev => self.advance(Direction::Backward)?,
            ConsoleCommand::Start => {
                let timing = self.engine.timing();
                self.engine
                    .start_continuous(
                        &mut self.registry,
                        &mut self.timer,
                        timing.interval_s,
                        timing.fade_s,
                    )
                    .map_err(core_error)?;
            }
            ConsoleCommand::Pause => self.engine.pause(),
            ConsoleCommand::Resume => self.engine.resume(&mut self.timer),
            ConsoleCommand::Stop => self.engine.stop(&mut self.registry).map_err(core_error)?,
            ConsoleCommand::Brightness(level) => {
                let session = self
                    .registry
                    .active_mut()
                    .ok_or_else(|| anyhow!("no active projector"))?;
                session.set_brightness(level).map_err(core_error)?;
            }
            ConsoleCommand::Goto(slide) => {
                let session = self
                    .registry
                    .active_mut()
                    .ok_or_else(|| anyhow!("no active projector"))?;
                session.goto_slide(slide).map_err(core_error)?;
            }
            ConsoleCommand::Sync => {
                self.registry.sync_all().map_err(core_error)?;
                self.print_projectors();
            }
            ConsoleCommand::Standby => {
                if self.engine.is_slideshow_active() && !self.engine.is_slideshow_paused() {
                    self.engine.pause();
                }
                let on = self.registry.toggle_standby().map_err(core_error)?;
                println!("standby {}", if on { "on" } else { "off" });
            }
            ConsoleCommand::Cycle(on) => self.engine.set_cycle(on),
            ConsoleCommand::Fade(seconds) => self
                .engine
                .set_fade_duration(seconds)
                .map_err(|e| anyhow!("{}", e))?,
            ConsoleCommand::Interval(seconds) => self
                .engine
                .set_interval(seconds)
                .map_err(|e| anyhow!("{}", e))?,
            ConsoleCommand::Hex(text) => {
                let bytes = parse_hex_triplet(&text).map_err(|e| anyhow!("{}", e))?;
                println!("{}", describe(bytes));
            }
            ConsoleCommand::Reconnect => {
                self.registry.shutdown(&mut self.opener);
                self.engine.stop(&mut self.registry).map_err(core_error)?;
                self.connect();
            }
            ConsoleCommand::Help => println!("{}", HELP),
            ConsoleCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn advance(&mut self, direction: Direction) -> Result<()> {
        if self.registry.is_empty() {
            bail!("no projectors connected");
        }
        self.engine
            .advance(&mut self.registry, &mut self.timer, direction)
            .map_err(core_error)?;
        self.print_active();
        Ok(())
    }

    fn print_active(&self) {
        if let (Some(index), Some(session)) = (self.registry.active_index(), self.registry.active()) {
            println!(
                "active [{}] slide {} brightness {}% ({:?})",
                index,
                session.slide(),
                session.brightness(),
                self.engine.state()
            );
        }
    }

    fn print_projectors(&self) {
        if self.registry.is_empty() {
            println!("no projectors found");
            return;
        }
        let names = self.opener.port_names();
        for (index, session) in self.registry.iter().enumerate() {
            let marker = if self.registry.active_index() == Some(index) {
                '*'
            } else {
                ' '
            };
            let port = names
                .get(session.channel() as usize)
                .map(String::as_str)
                .unwrap_or("?");
            println!(
                "{}[{}] {} on {} - slide {} brightness {}%",
                marker,
                index,
                session.identity(),
                port,
                session.slide(),
                session.brightness()
            );
            println!("     {}", session.identity().details());
        }
    }
}
