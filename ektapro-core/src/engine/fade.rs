//! Fade engine
//!
//! A single-projector transition dims the active projector, changes its
//! slide in the dark and brings it back up. With cycling enabled and more
//! than one projector, the active projector cross-fades into a neighbour
//! which then becomes active.
//!
//! Brightness follows the elapsed time of the transition:
//!
//! | phase     | level after `t` ms         | running while  |
//! |-----------|----------------------------|----------------|
//! | fade down | `0.2 * t / fade`           | level < 100    |
//! | fade up   | `0.2 * t / (fade + 1)`     | level < 100    |
//! | dissolve  | `0.1 * t / (fade + 1)`     | level < 100    |
//!
//! Levels are truncated, so they are computed as integer divisions.

use core::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use ektapro_hal::{TimerHost, Uart};

use super::state::{Direction, FadeState, Promotion, SlideAction};
use crate::config::{validate_fade, validate_interval, ConfigError, TimingConfig};
use crate::error::{Error, PortError};
use crate::registry::Registry;
use crate::session::{DeviceSession, FULL_BRIGHTNESS};

/// Delay before the first tick of a transition
pub const FIRST_TICK_MS: u32 = 50;

/// Delay between transition ticks, also the elapsed time each tick adds
pub const TICK_MS: u32 = 100;

/// Delay before the first tick after a resume
pub const RESUME_DELAY_MS: u32 = 50;

/// `t / (SINGLE_FADE_DIVISOR * fade)` is `0.2 * t / fade`
const SINGLE_FADE_DIVISOR: u32 = 5;

/// `t / (DUAL_FADE_DIVISOR * (fade + 1))` is `0.1 * t / (fade + 1)`
const DUAL_FADE_DIVISOR: u32 = 10;

const FULL: u32 = FULL_BRIGHTNESS as u32;

type EngineResult<C> = Result<(), Error<PortError<C>>>;

/// Transition and slideshow state
#[derive(Debug)]
pub struct FadeEngine {
    state: FadeState,
    elapsed_ms: u32,
    timing: TimingConfig,
    /// Fade duration captured when the running transition started
    sequence_fade_s: u8,
    slideshow_active: bool,
    slideshow_paused: bool,
    fade_paused: bool,
    timer_scheduled: AtomicBool,
    /// Projector that was active when the running transition started
    origin: Option<usize>,
    following: Option<usize>,
    slide_action: SlideAction,
    promotion: Promotion,
}

impl Default for FadeEngine {
    fn default() -> Self {
        Self::new(TimingConfig::default())
    }
}

fn step<C: Uart, D: DelayNs>(
    session: &mut DeviceSession<C, D>,
    action: SlideAction,
) -> EngineResult<C> {
    match action {
        SlideAction::NoOp => Ok(()),
        SlideAction::AdvanceForward => session.goto_next_slide(),
        SlideAction::AdvanceBackward => session.goto_prev_slide(),
    }
}

fn level_byte(level: u32) -> u8 {
    level.min(FULL) as u8
}

impl FadeEngine {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            state: FadeState::Idle,
            elapsed_ms: 0,
            timing,
            sequence_fade_s: timing.fade_s,
            slideshow_active: false,
            slideshow_paused: false,
            fade_paused: false,
            timer_scheduled: AtomicBool::new(false),
            origin: None,
            following: None,
            slide_action: SlideAction::NoOp,
            promotion: Promotion::NoOp,
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn timing(&self) -> TimingConfig {
        self.timing
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Projector being faded in during a dissolve
    pub fn following(&self) -> Option<usize> {
        self.following
    }

    pub fn is_slideshow_active(&self) -> bool {
        self.slideshow_active
    }

    pub fn is_slideshow_paused(&self) -> bool {
        self.slideshow_paused
    }

    pub fn is_fade_paused(&self) -> bool {
        self.fade_paused
    }

    /// A tick has been requested and has not run yet
    pub fn is_timer_scheduled(&self) -> bool {
        self.timer_scheduled.load(Ordering::Acquire)
    }

    /// Takes effect with the next transition
    pub fn set_fade_duration(&mut self, fade_s: u8) -> Result<(), ConfigError> {
        validate_fade(fade_s)?;
        self.timing.fade_s = fade_s;
        Ok(())
    }

    pub fn set_interval(&mut self, interval_s: u8) -> Result<(), ConfigError> {
        validate_interval(interval_s)?;
        self.timing.interval_s = interval_s;
        Ok(())
    }

    pub fn set_cycle(&mut self, cycle: bool) {
        self.timing.cycle = cycle;
    }

    /// Replace the whole timing configuration if it validates
    pub fn set_timing(&mut self, timing: TimingConfig) -> Result<(), ConfigError> {
        timing.validate()?;
        self.timing = timing;
        Ok(())
    }

    fn interval_ms(&self) -> u32 {
        self.timing.interval_s as u32 * 1000
    }

    /// Request a tick unless one is already pending
    fn arm<T: TimerHost>(&self, timer: &mut T, delay_ms: u32) {
        if self
            .timer_scheduled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            timer.call_after(delay_ms);
        } else {
            trace!("tick already pending");
        }
    }

    fn clear_sequence(&mut self) {
        self.state = FadeState::Idle;
        self.elapsed_ms = 0;
        self.origin = None;
        self.following = None;
        self.slide_action = SlideAction::NoOp;
        self.promotion = Promotion::NoOp;
    }

    fn finish<T: TimerHost>(&mut self, timer: &mut T) {
        self.clear_sequence();
        debug!("transition complete");
        if self.slideshow_active {
            self.arm(timer, self.interval_ms());
        }
    }

    /// Change slide on the active projector, fading if configured
    ///
    /// Ignored while a transition is running.
    pub fn advance<C, D, T>(
        &mut self,
        registry: &mut Registry<C, D>,
        timer: &mut T,
        direction: Direction,
    ) -> EngineResult<C>
    where
        C: Uart,
        D: DelayNs,
        T: TimerHost,
    {
        let Some(active) = registry.active_index() else {
            return Ok(());
        };
        if self.state.is_fading() {
            debug!("advance ignored during {:?}", self.state);
            return Ok(());
        }
        self.fade_paused = false;

        let dual = self.timing.cycle && registry.len() > 1;
        let neighbour = match direction {
            Direction::Forward => registry.next_of(),
            Direction::Backward => registry.previous_of(),
        };

        if self.timing.fade_s == 0 {
            match (dual, neighbour) {
                (true, Some(following)) => {
                    Self::switch_instantly(registry, active, following, direction)?
                }
                _ => {
                    if let Some(session) = registry.active_mut() {
                        step(session, direction.into())?;
                    }
                }
            }
            if self.slideshow_active {
                self.arm(timer, self.interval_ms());
            }
            return Ok(());
        }

        self.clear_sequence();
        self.sequence_fade_s = self.timing.fade_s;
        self.origin = Some(active);
        if dual {
            self.following = neighbour;
            match direction {
                Direction::Forward => {
                    self.slide_action = SlideAction::AdvanceForward;
                    self.promotion = Promotion::PromoteNext;
                }
                Direction::Backward => {
                    // the neighbour shows the previous slide as it fades in
                    if let Some(session) = neighbour.and_then(|i| registry.get_mut(i)) {
                        session.goto_prev_slide()?;
                    }
                    self.slide_action = SlideAction::NoOp;
                    self.promotion = Promotion::PromotePrevious;
                }
            }
            self.state = FadeState::DualFade;
        } else {
            self.slide_action = direction.into();
            self.state = FadeState::SingleFadingDown;
        }

        info!(
            "{:?} {:?} over {}s",
            self.state, direction, self.sequence_fade_s
        );
        self.arm(timer, FIRST_TICK_MS);
        Ok(())
    }

    fn switch_instantly<C: Uart, D: DelayNs>(
        registry: &mut Registry<C, D>,
        active: usize,
        following: usize,
        direction: Direction,
    ) -> EngineResult<C> {
        let Some((current, next)) = registry.pair_mut(active, following) else {
            return Ok(());
        };
        match direction {
            Direction::Forward => {
                current.set_brightness(0)?;
                current.goto_next_slide()?;
                next.set_brightness(FULL_BRIGHTNESS)?;
                registry.activate_next();
            }
            Direction::Backward => {
                next.goto_prev_slide()?;
                current.set_brightness(0)?;
                next.set_brightness(FULL_BRIGHTNESS)?;
                registry.activate_previous();
            }
        }
        Ok(())
    }

    /// Show the active projector and start advancing every `interval_s`
    ///
    /// Both values are validated first; on error the previous timing is kept.
    pub fn start_continuous<C, D, T>(
        &mut self,
        registry: &mut Registry<C, D>,
        timer: &mut T,
        interval_s: u8,
        fade_s: u8,
    ) -> EngineResult<C>
    where
        C: Uart,
        D: DelayNs,
        T: TimerHost,
    {
        validate_interval(interval_s)?;
        validate_fade(fade_s)?;
        self.timing.interval_s = interval_s;
        self.timing.fade_s = fade_s;

        let Some(session) = registry.active_mut() else {
            return Ok(());
        };
        session.set_brightness(FULL_BRIGHTNESS)?;

        self.clear_sequence();
        self.slideshow_active = true;
        self.slideshow_paused = false;
        self.fade_paused = false;
        info!("slideshow started, every {}s", interval_s);
        self.arm(timer, self.interval_ms());
        Ok(())
    }

    /// Freeze the slideshow and any running transition
    pub fn pause(&mut self) {
        self.fade_paused = true;
        self.slideshow_paused = true;
        info!("paused");
    }

    pub fn resume<T: TimerHost>(&mut self, timer: &mut T) {
        self.fade_paused = false;
        self.slideshow_paused = false;
        info!("resumed");
        self.arm(timer, RESUME_DELAY_MS);
    }

    /// End the slideshow and home every projector
    ///
    /// A tick that is already pending still arrives and does nothing.
    pub fn stop<C: Uart, D: DelayNs>(&mut self, registry: &mut Registry<C, D>) -> EngineResult<C> {
        self.clear_sequence();
        self.slideshow_active = false;
        self.slideshow_paused = false;
        self.fade_paused = false;
        info!("slideshow stopped");
        registry.reset_all()
    }

    /// Run one step of the current transition or slideshow
    ///
    /// A failing projector ends the transition; the engine is Idle afterwards.
    /// So does clearing the selection while a transition runs.
    pub fn tick<C, D, T>(&mut self, registry: &mut Registry<C, D>, timer: &mut T) -> EngineResult<C>
    where
        C: Uart,
        D: DelayNs,
        T: TimerHost,
    {
        self.timer_scheduled.store(false, Ordering::Release);
        if registry.active_index().is_none() {
            if self.state.is_fading() {
                warn!("selection cleared, {:?} dropped", self.state);
                self.clear_sequence();
            }
            return Ok(());
        }
        if self.fade_paused {
            return Ok(());
        }
        trace!("tick {:?} at {} ms", self.state, self.elapsed_ms);

        let result = match self.state {
            FadeState::Idle => {
                if self.slideshow_active && !self.slideshow_paused {
                    self.advance(registry, timer, Direction::Forward)
                } else {
                    Ok(())
                }
            }
            FadeState::SingleFadingDown => self.fade_down(registry, timer),
            FadeState::SingleFadingUp => self.fade_up(registry, timer),
            FadeState::DualFade => self.dissolve(registry, timer),
        };
        if let Err(e) = &result {
            error!("transition aborted: {:?}", e.kind());
            self.clear_sequence();
        }
        result
    }

    fn fade_down<C: Uart, D: DelayNs, T: TimerHost>(
        &mut self,
        registry: &mut Registry<C, D>,
        timer: &mut T,
    ) -> EngineResult<C> {
        let Some(session) = self.origin.and_then(|index| registry.get_mut(index)) else {
            warn!("faded projector gone, transition dropped");
            self.finish(timer);
            return Ok(());
        };
        self.elapsed_ms += TICK_MS;
        let level = self.elapsed_ms / (SINGLE_FADE_DIVISOR * self.sequence_fade_s as u32);

        if level < FULL {
            session.set_brightness(level_byte(FULL - level))?;
        } else {
            session.set_brightness(0)?;
            step(session, self.slide_action)?;
            self.elapsed_ms = 0;
            self.state = FadeState::SingleFadingUp;
        }
        self.arm(timer, TICK_MS);
        Ok(())
    }

    fn fade_up<C: Uart, D: DelayNs, T: TimerHost>(
        &mut self,
        registry: &mut Registry<C, D>,
        timer: &mut T,
    ) -> EngineResult<C> {
        let Some(session) = self.origin.and_then(|index| registry.get_mut(index)) else {
            warn!("faded projector gone, transition dropped");
            self.finish(timer);
            return Ok(());
        };
        self.elapsed_ms += TICK_MS;
        let level = self.elapsed_ms / (SINGLE_FADE_DIVISOR * (self.sequence_fade_s as u32 + 1));

        if level < FULL {
            session.set_brightness(level_byte(level))?;
            self.arm(timer, TICK_MS);
        } else {
            session.set_brightness(FULL_BRIGHTNESS)?;
            self.finish(timer);
        }
        Ok(())
    }

    fn dissolve<C: Uart, D: DelayNs, T: TimerHost>(
        &mut self,
        registry: &mut Registry<C, D>,
        timer: &mut T,
    ) -> EngineResult<C> {
        let (Some(origin), Some(following)) = (self.origin, self.following) else {
            self.finish(timer);
            return Ok(());
        };
        let Some((current, next)) = registry.pair_mut(origin, following) else {
            warn!("dissolve partner gone, transition dropped");
            self.finish(timer);
            return Ok(());
        };

        self.elapsed_ms += TICK_MS;
        let level = self.elapsed_ms / (DUAL_FADE_DIVISOR * (self.sequence_fade_s as u32 + 1));

        if level < FULL {
            current.set_brightness(level_byte(FULL - level))?;
            next.set_brightness(level_byte(level))?;
            self.arm(timer, TICK_MS);
            return Ok(());
        }

        current.set_brightness(0)?;
        next.set_brightness(FULL_BRIGHTNESS)?;
        step(current, self.slide_action)?;
        // the faded-in projector takes over even if the selection moved meanwhile
        match self.promotion {
            Promotion::NoOp => {}
            Promotion::PromoteNext | Promotion::PromotePrevious => {
                registry.select_active(Some(following));
            }
        }
        self.finish(timer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::tests::{registry_with, SimRegistry};
    use crate::sim::RecordingTimer;
    use ektapro_protocol::DirectAction;

    fn engine(fade_s: u8, cycle: bool) -> FadeEngine {
        FadeEngine::new(TimingConfig {
            fade_s,
            interval_s: 5,
            cycle,
        })
    }

    /// Run one tick and return the delays it requested
    fn tick(engine: &mut FadeEngine, registry: &mut SimRegistry, timer: &mut RecordingTimer) -> Vec<u32> {
        engine.tick(registry, timer).unwrap();
        timer.take()
    }

    fn brightness(registry: &SimRegistry, index: usize) -> u8 {
        registry.get(index).map(|s| s.brightness()).unwrap()
    }

    fn moves(registry: &SimRegistry, index: usize, action: DirectAction) -> usize {
        registry.get(index).map(|s| s.port().count(action)).unwrap()
    }

    #[test]
    fn test_single_fade_sequence() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, false);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(engine.state(), FadeState::SingleFadingDown);
        assert_eq!(timer.take(), [FIRST_TICK_MS]);

        for _ in 0..24 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
            assert_eq!(engine.state(), FadeState::SingleFadingDown);
        }
        assert_eq!(brightness(&registry, 0), 4);
        assert_eq!(moves(&registry, 0, DirectAction::SlideForward), 0);

        // 25th tick reaches level 100: dark, then change slide
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        assert_eq!(engine.state(), FadeState::SingleFadingUp);
        assert_eq!(brightness(&registry, 0), 0);
        assert_eq!(moves(&registry, 0, DirectAction::SlideForward), 1);
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(1));

        for _ in 0..29 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
            assert_eq!(engine.state(), FadeState::SingleFadingUp);
        }
        assert_eq!(brightness(&registry, 0), 96);

        // slideshow not running, so nothing further is scheduled
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(engine.state(), FadeState::Idle);
        assert_eq!(brightness(&registry, 0), 100);
        assert_eq!(moves(&registry, 0, DirectAction::SlideForward), 1);
        assert!(!engine.is_timer_scheduled());
    }

    #[test]
    fn test_dual_fade_forward() {
        let mut registry = registry_with(2);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, true);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(engine.state(), FadeState::DualFade);
        assert_eq!(engine.following(), Some(1));
        assert_eq!(timer.take(), [FIRST_TICK_MS]);

        for _ in 0..30 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        }
        assert_eq!(brightness(&registry, 0), 50);
        assert_eq!(brightness(&registry, 1), 50);

        for _ in 30..59 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
            assert_eq!(engine.state(), FadeState::DualFade);
        }

        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(engine.state(), FadeState::Idle);
        assert_eq!(registry.active_index(), Some(1));
        assert_eq!(brightness(&registry, 0), 0);
        assert_eq!(brightness(&registry, 1), 100);
        assert_eq!(moves(&registry, 0, DirectAction::SlideForward), 1);
        assert_eq!(moves(&registry, 1, DirectAction::SlideForward), 0);
    }

    #[test]
    fn test_dual_fade_backward_moves_neighbour_first() {
        let mut registry = registry_with(3);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(1, true);

        engine.advance(&mut registry, &mut timer, Direction::Backward).unwrap();
        assert_eq!(engine.following(), Some(2));
        assert_eq!(moves(&registry, 2, DirectAction::SlideBackward), 1);
        timer.take();

        // 0.1 * t / 2 reaches 100 at t = 2000
        for _ in 0..19 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        }
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());

        assert_eq!(registry.active_index(), Some(2));
        assert_eq!(brightness(&registry, 0), 0);
        assert_eq!(brightness(&registry, 2), 100);
        assert_eq!(moves(&registry, 0, DirectAction::SlideBackward), 0);
        assert_eq!(moves(&registry, 0, DirectAction::SlideForward), 0);
        assert_eq!(moves(&registry, 2, DirectAction::SlideBackward), 1);
    }

    #[test]
    fn test_zero_fade_single() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(0, false);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(engine.state(), FadeState::Idle);
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(1));

        engine.advance(&mut registry, &mut timer, Direction::Backward).unwrap();
        engine.advance(&mut registry, &mut timer, Direction::Backward).unwrap();
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(80));
        assert!(timer.calls.is_empty());
    }

    #[test]
    fn test_zero_fade_dual_forward() {
        let mut registry = registry_with(2);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(0, true);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(registry.active_index(), Some(1));
        assert_eq!(brightness(&registry, 0), 0);
        assert_eq!(brightness(&registry, 1), 100);
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(1));
        assert!(timer.calls.is_empty());
    }

    #[test]
    fn test_zero_fade_dual_backward() {
        let mut registry = registry_with(3);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(0, true);

        engine.advance(&mut registry, &mut timer, Direction::Backward).unwrap();
        assert_eq!(registry.active_index(), Some(2));
        assert_eq!(brightness(&registry, 0), 0);
        assert_eq!(brightness(&registry, 2), 100);
        assert_eq!(registry.get(2).map(|s| s.slide()), Some(80));
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(0));
    }

    #[test]
    fn test_cycle_with_one_projector_fades_single() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(2, true);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(engine.state(), FadeState::SingleFadingDown);
    }

    #[test]
    fn test_advance_ignored_while_fading() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, false);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        timer.take();
        for _ in 0..5 {
            tick(&mut engine, &mut registry, &mut timer);
        }
        engine.advance(&mut registry, &mut timer, Direction::Backward).unwrap();
        assert_eq!(engine.state(), FadeState::SingleFadingDown);
        assert_eq!(engine.elapsed_ms(), 500);
        assert!(timer.calls.is_empty());
    }

    #[test]
    fn test_pause_freezes_and_resume_continues() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, false);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        timer.take();
        for _ in 0..10 {
            tick(&mut engine, &mut registry, &mut timer);
        }
        assert_eq!(brightness(&registry, 0), 60);

        engine.pause();
        assert!(engine.is_fade_paused());
        assert!(engine.is_slideshow_paused());

        // the pending tick arrives and changes nothing
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(brightness(&registry, 0), 60);
        assert_eq!(engine.elapsed_ms(), 1000);

        engine.resume(&mut timer);
        assert_eq!(timer.take(), [RESUME_DELAY_MS]);
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        assert_eq!(brightness(&registry, 0), 56);
    }

    #[test]
    fn test_pause_during_fade_up() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, false);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        timer.take();
        for _ in 0..35 {
            tick(&mut engine, &mut registry, &mut timer);
        }
        assert_eq!(engine.state(), FadeState::SingleFadingUp);
        assert_eq!(brightness(&registry, 0), 33);

        engine.pause();
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(engine.state(), FadeState::SingleFadingUp);
        assert_eq!(brightness(&registry, 0), 33);
        assert_eq!(engine.elapsed_ms(), 1000);

        engine.resume(&mut timer);
        assert_eq!(timer.take(), [RESUME_DELAY_MS]);
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        assert_eq!(brightness(&registry, 0), 36);
    }

    #[test]
    fn test_pause_during_dissolve() {
        let mut registry = registry_with(2);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, true);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        timer.take();
        for _ in 0..10 {
            tick(&mut engine, &mut registry, &mut timer);
        }
        assert_eq!(brightness(&registry, 0), 84);
        assert_eq!(brightness(&registry, 1), 16);

        engine.pause();
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(engine.state(), FadeState::DualFade);
        assert_eq!(engine.following(), Some(1));
        assert_eq!(brightness(&registry, 0), 84);
        assert_eq!(brightness(&registry, 1), 16);

        engine.resume(&mut timer);
        assert_eq!(timer.take(), [RESUME_DELAY_MS]);
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        assert_eq!(brightness(&registry, 0), 82);
        assert_eq!(brightness(&registry, 1), 18);
    }

    #[test]
    fn test_selection_change_mid_dissolve_keeps_pair() {
        let mut registry = registry_with(2);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(1, true);

        engine
            .start_continuous(&mut registry, &mut timer, 2, 1)
            .unwrap();
        assert_eq!(timer.take(), [2000]);
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [FIRST_TICK_MS]);
        for _ in 0..6 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        }
        assert_eq!(brightness(&registry, 0), 70);
        assert_eq!(brightness(&registry, 1), 30);

        assert!(registry.select_active(Some(1)));
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        assert_eq!(brightness(&registry, 0), 65);
        assert_eq!(brightness(&registry, 1), 35);

        for _ in 7..19 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        }
        // finished, and the slideshow still has its next step pending
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [2000]);
        assert!(engine.is_timer_scheduled());
        assert_eq!(engine.state(), FadeState::Idle);
        assert_eq!(registry.active_index(), Some(1));
        assert_eq!(brightness(&registry, 0), 0);
        assert_eq!(brightness(&registry, 1), 100);
        assert_eq!(moves(&registry, 0, DirectAction::SlideForward), 1);
    }

    #[test]
    fn test_clearing_selection_mid_fade_releases_engine() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(1, false);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(timer.take(), [FIRST_TICK_MS]);
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);

        registry.select_active(None);
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(engine.state(), FadeState::Idle);
        assert!(!engine.is_timer_scheduled());

        registry.select_active(Some(0));
        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        assert_eq!(engine.state(), FadeState::SingleFadingDown);
        assert_eq!(timer.take(), [FIRST_TICK_MS]);
    }

    #[test]
    fn test_at_most_one_pending_tick() {
        let mut engine = engine(5, false);
        let mut timer = RecordingTimer::default();
        engine.resume(&mut timer);
        engine.resume(&mut timer);
        assert_eq!(timer.calls, [RESUME_DELAY_MS]);
        assert!(engine.is_timer_scheduled());
    }

    #[test]
    fn test_slideshow_runs_dissolves() {
        let mut registry = registry_with(2);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(1, true);

        engine
            .start_continuous(&mut registry, &mut timer, 2, 1)
            .unwrap();
        assert!(engine.is_slideshow_active());
        assert_eq!(brightness(&registry, 0), 100);
        assert_eq!(timer.take(), [2000]);

        // interval elapsed: the idle tick starts a dissolve
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [FIRST_TICK_MS]);
        assert_eq!(engine.state(), FadeState::DualFade);

        for _ in 0..19 {
            assert_eq!(tick(&mut engine, &mut registry, &mut timer), [TICK_MS]);
        }
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [2000]);
        assert_eq!(engine.state(), FadeState::Idle);
        assert_eq!(registry.active_index(), Some(1));
    }

    #[test]
    fn test_zero_fade_slideshow_rearms_interval() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(0, false);

        engine
            .start_continuous(&mut registry, &mut timer, 3, 0)
            .unwrap();
        assert_eq!(timer.take(), [3000]);
        assert_eq!(tick(&mut engine, &mut registry, &mut timer), [3000]);
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(1));
    }

    #[test]
    fn test_paused_slideshow_does_not_advance() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(0, false);

        engine
            .start_continuous(&mut registry, &mut timer, 3, 0)
            .unwrap();
        timer.take();
        engine.pause();
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(registry.get(0).map(|s| s.slide()), Some(0));
    }

    #[test]
    fn test_start_continuous_rejects_bad_timing() {
        let mut registry = registry_with(1);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(1, false);

        assert_eq!(
            engine.start_continuous(&mut registry, &mut timer, 0, 1),
            Err(Error::Configuration(ConfigError::IntervalOutOfRange))
        );
        assert_eq!(
            engine.start_continuous(&mut registry, &mut timer, 5, 60),
            Err(Error::Configuration(ConfigError::FadeOutOfRange))
        );
        assert_eq!(engine.timing().interval_s, 5);
        assert_eq!(engine.timing().fade_s, 1);
        assert!(!engine.is_slideshow_active());
        assert!(timer.calls.is_empty());
    }

    #[test]
    fn test_setters_validate() {
        let mut engine = engine(1, false);
        assert_eq!(engine.set_fade_duration(60), Err(ConfigError::FadeOutOfRange));
        assert_eq!(engine.set_interval(0), Err(ConfigError::IntervalOutOfRange));
        assert_eq!(engine.set_fade_duration(0), Ok(()));
        assert_eq!(engine.set_interval(30), Ok(()));
        engine.set_cycle(true);
        assert_eq!(
            engine.timing(),
            TimingConfig {
                fade_s: 0,
                interval_s: 30,
                cycle: true,
            }
        );
    }

    #[test]
    fn test_stop_homes_every_projector() {
        let mut registry = registry_with(2);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, true);

        engine
            .start_continuous(&mut registry, &mut timer, 5, 5)
            .unwrap();
        timer.take();
        tick(&mut engine, &mut registry, &mut timer);
        for _ in 0..10 {
            tick(&mut engine, &mut registry, &mut timer);
        }
        assert_eq!(engine.state(), FadeState::DualFade);

        engine.stop(&mut registry).unwrap();
        assert_eq!(engine.state(), FadeState::Idle);
        assert!(!engine.is_slideshow_active());
        assert!(!engine.is_slideshow_paused());
        assert!(!engine.is_fade_paused());
        for session in registry.iter() {
            assert!(!session.standby());
            assert_eq!(session.slide(), 1);
            assert_eq!(session.brightness(), 0);
        }

        // the stray tick still pending is inert
        assert!(tick(&mut engine, &mut registry, &mut timer).is_empty());
        assert_eq!(engine.state(), FadeState::Idle);
    }

    #[test]
    fn test_no_active_projector_is_a_no_op() {
        let mut registry = registry_with(0);
        let mut timer = RecordingTimer::default();
        let mut engine = engine(5, true);

        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        engine.tick(&mut registry, &mut timer).unwrap();
        engine
            .start_continuous(&mut registry, &mut timer, 5, 1)
            .unwrap();
        engine.stop(&mut registry).unwrap();

        assert_eq!(engine.state(), FadeState::Idle);
        assert!(!engine.is_slideshow_active());
        assert!(timer.calls.is_empty());
    }

    #[test]
    fn test_failed_motion_aborts_transition() {
        use crate::sim::{MockOpener, NoopDelay, SimProjector};

        let mut sim = SimProjector::new(0, 7, false);
        sim.set_busy_polls(u32::MAX);
        let mut opener = MockOpener::new().attach(0, sim);
        let mut registry: SimRegistry = Registry::new();
        registry.discover(&mut opener, &NoopDelay::default(), 0..1);

        let mut timer = RecordingTimer::default();
        let mut engine = engine(1, false);
        engine.advance(&mut registry, &mut timer, Direction::Forward).unwrap();
        timer.take();

        // 0.2 * t / 1 reaches 100 at t = 500, where the slide change times out
        for _ in 0..4 {
            tick(&mut engine, &mut registry, &mut timer);
        }
        assert_eq!(
            engine.tick(&mut registry, &mut timer),
            Err(Error::BusyTimeout)
        );
        assert_eq!(engine.state(), FadeState::Idle);
        assert!(timer.calls.is_empty());
    }
}
