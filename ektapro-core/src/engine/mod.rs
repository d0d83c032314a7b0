//! Fade and slideshow engine
//!
//! Transitions are driven by `tick()` calls that the host makes whenever a
//! delay requested through [`ektapro_hal::TimerHost`] has elapsed. Between
//! ticks the engine holds no resources; the registry and the timer are
//! passed into every operation.

pub mod fade;
pub mod state;

pub use fade::{FadeEngine, FIRST_TICK_MS, RESUME_DELAY_MS, TICK_MS};
pub use state::{Direction, FadeState, Promotion, SlideAction};
