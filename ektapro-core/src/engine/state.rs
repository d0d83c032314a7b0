//! Fade engine states and deferred actions

/// Where the engine is within a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeState {
    /// No transition running
    #[default]
    Idle,
    /// Dimming the active projector before it changes slide
    SingleFadingDown,
    /// Bringing the active projector back up on its new slide
    SingleFadingUp,
    /// Cross-fading from the active projector to a neighbour
    DualFade,
}

impl FadeState {
    pub fn is_fading(&self) -> bool {
        !matches!(self, FadeState::Idle)
    }
}

/// Direction of a slide change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Forward,
    Backward,
}

/// Slide change applied to the active projector once it is dark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlideAction {
    #[default]
    NoOp,
    AdvanceForward,
    AdvanceBackward,
}

impl From<Direction> for SlideAction {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Forward => SlideAction::AdvanceForward,
            Direction::Backward => SlideAction::AdvanceBackward,
        }
    }
}

/// Change of active projector at the end of a cross-fade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Promotion {
    #[default]
    NoOp,
    PromoteNext,
    PromotePrevious,
}
