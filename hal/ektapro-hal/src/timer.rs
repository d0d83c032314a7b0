//! Deferred callbacks
//!
//! The fade engine does not own an event loop. When it needs to run again
//! later it asks the host, which calls back into the engine's `tick()` once
//! the delay has elapsed.

/// Host-side scheduler
pub trait TimerHost {
    /// Arrange for the engine's `tick()` to be called after `delay_ms`
    ///
    /// The engine guarantees at most one outstanding request, so a host may
    /// keep a single deadline.
    fn call_after(&mut self, delay_ms: u32);
}
