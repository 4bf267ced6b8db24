use crate::collaborators::LayoutHandle;
use netvis_core::{NetvisError, Rect};
use serde::{Deserialize, Serialize};

/// Where the canvas is in its layout/draw cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayoutState {
    /// Positions are current and drawn.
    Stable,
    /// A layout pass has been requested but not started.
    LayoutRequired,
    /// A pass is in flight; graph mutation is rejected.
    LayingOut,
    /// A pass finished; positions are applied but the cycle has not drawn yet.
    LayoutCompleted,
    /// The surface resized; existing positions must be rescaled, not relaid.
    TransformRequired,
}

/// Bookkeeping for the layout cycle.  The canvas drives the transitions; this
/// struct only holds the state and the in-flight handle.
#[derive(Debug)]
pub(crate) struct LayoutCoordinator {
    pub state: LayoutState,
    pub handle: Option<LayoutHandle>,
    /// Rectangle the in-flight pass is targeting.
    pub pass_rect: Option<Rect>,
    /// Rectangle the current positions correspond to, once any pass has
    /// completed.
    pub laid_out_rect: Option<Rect>,
}

impl LayoutCoordinator {
    pub fn new() -> Self {
        Self {
            state: LayoutState::Stable,
            handle: None,
            pass_rect: None,
            laid_out_rect: None,
        }
    }

    pub fn set_state(&mut self, state: LayoutState) {
        if self.state != state {
            tracing::debug!("layout state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    pub fn is_laying_out(&self) -> bool {
        self.state == LayoutState::LayingOut
    }

    pub fn has_layout(&self) -> bool {
        self.laid_out_rect.is_some()
    }

    /// Guard called at the top of every mutating operation.
    pub fn check_not_laying_out(&self, operation: &'static str) -> Result<(), NetvisError> {
        if self.is_laying_out() {
            Err(NetvisError::LayoutInProgress { operation })
        } else {
            Ok(())
        }
    }
}
