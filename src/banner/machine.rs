//! Pure state machine for one banner placement slot.
//!
//! DESIGN
//! ======
//! Re-arming rotation timers implicitly from reactive state invites
//! duplicate timers. Here every transition is explicit: an [`Event`] goes
//! in, the phase updates, and a list of [`Effect`]s comes out for the
//! driver to execute. Arming effects mean
//! "cancel the current timer, then schedule" — the machine never asks for
//! two live timers at once.
//!
//! Impressions are emitted exactly when a banner *becomes* the displayed
//! one (fetch success, rotation, manual selection, failure advance), never
//! on re-render and never after dismissal.

use crate::model::Banner;

// =============================================================================
// TYPES
// =============================================================================

/// Lifecycle phase of a mounted banner slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fetch in flight (initial load, retry, or manual reload).
    Loading,
    /// Nothing to show: empty slot, or retries exhausted. Only a manual
    /// reload leaves this phase.
    Empty,
    /// A banner is current. `image_failed` marks the broken-image sub-state
    /// during which the reload affordance is rendered instead.
    Showing { index: usize, image_failed: bool },
    /// User closed the slot. Terminal: every later event is ignored.
    Dismissed,
}

/// Input to the machine. Tick variants are delivered by the driver when the
/// matching timer fires with a current sequence number.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    FetchOk(Vec<Banner>),
    FetchErr,
    RotateTick,
    RetryTick,
    FailureAdvanceTick,
    Select(usize),
    ImageError,
    Dismiss,
    Reload,
}

/// Side effect the driver must execute after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Start a banner fetch for the slot's position.
    StartFetch,
    /// Cancel the live timer and schedule a rotation tick.
    ArmRotation,
    /// Cancel the live timer and schedule a retry tick (fixed backoff).
    ArmRetry,
    /// Cancel the live timer and schedule a failure-advance tick.
    ArmFailureAdvance,
    /// Cancel the live timer without scheduling a replacement.
    CancelTimer,
    /// Fire-and-forget impression telemetry for the banner id.
    RecordImpression(String),
}

/// What the host should render right now.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderState {
    /// Render nothing (loading, empty, or dismissed).
    Hidden,
    /// Render the banner with its pager state.
    Banner { banner: Banner, index: usize, total: usize },
    /// Current image failed to load: render the manual-reload affordance.
    LoadFailed { index: usize, total: usize },
}

// =============================================================================
// MACHINE
// =============================================================================

#[derive(Debug, Clone)]
pub struct BannerMachine {
    phase: Phase,
    banners: Vec<Banner>,
    /// Consecutive failed fetch attempts since the last success or reload.
    failed_attempts: u8,
    /// Failed attempts tolerated before the slot goes quiet.
    retry_limit: u8,
}

impl BannerMachine {
    /// Fresh machine in `Loading`. The driver issues the initial
    /// [`Effect::StartFetch`] through [`Event::Reload`] or its own `load`.
    #[must_use]
    pub fn new(retry_limit: u8) -> Self {
        Self { phase: Phase::Loading, banners: Vec::new(), failed_attempts: 0, retry_limit }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn banners(&self) -> &[Banner] {
        &self.banners
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.phase == Phase::Dismissed
    }

    /// Banner currently displayed, if any.
    #[must_use]
    pub fn current(&self) -> Option<&Banner> {
        match self.phase {
            Phase::Showing { index, .. } => self.banners.get(index),
            _ => None,
        }
    }

    #[must_use]
    pub fn render(&self) -> RenderState {
        match self.phase {
            Phase::Loading | Phase::Empty | Phase::Dismissed => RenderState::Hidden,
            Phase::Showing { index, image_failed } => {
                let total = self.banners.len();
                if image_failed {
                    RenderState::LoadFailed { index, total }
                } else {
                    match self.banners.get(index) {
                        Some(banner) => RenderState::Banner { banner: banner.clone(), index, total },
                        None => RenderState::Hidden,
                    }
                }
            }
        }
    }

    /// Apply one event and return the effects the driver must execute.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        if self.phase == Phase::Dismissed {
            return Vec::new();
        }
        match event {
            Event::Dismiss => {
                self.phase = Phase::Dismissed;
                vec![Effect::CancelTimer]
            }
            Event::Reload => {
                self.phase = Phase::Loading;
                self.banners.clear();
                self.failed_attempts = 0;
                vec![Effect::CancelTimer, Effect::StartFetch]
            }
            Event::FetchOk(banners) => self.on_fetch_ok(banners),
            Event::FetchErr => self.on_fetch_err(),
            Event::RetryTick => {
                if self.phase == Phase::Loading {
                    vec![Effect::StartFetch]
                } else {
                    Vec::new()
                }
            }
            Event::RotateTick => self.on_rotate_tick(),
            Event::FailureAdvanceTick => self.on_failure_advance(),
            Event::Select(target) => self.on_select(target),
            Event::ImageError => self.on_image_error(),
        }
    }

    fn on_fetch_ok(&mut self, banners: Vec<Banner>) -> Vec<Effect> {
        if self.phase != Phase::Loading {
            return Vec::new();
        }
        self.failed_attempts = 0;
        if banners.is_empty() {
            self.banners.clear();
            self.phase = Phase::Empty;
            return vec![Effect::CancelTimer];
        }
        self.banners = banners;
        self.phase = Phase::Showing { index: 0, image_failed: false };
        let mut effects = vec![Effect::RecordImpression(self.banners[0].id.clone())];
        if self.banners.len() > 1 {
            effects.push(Effect::ArmRotation);
        }
        effects
    }

    fn on_fetch_err(&mut self) -> Vec<Effect> {
        if self.phase != Phase::Loading {
            return Vec::new();
        }
        self.failed_attempts = self.failed_attempts.saturating_add(1);
        if self.failed_attempts < self.retry_limit {
            vec![Effect::ArmRetry]
        } else {
            // Retries exhausted: the slot renders nothing until a manual
            // reload re-enters Loading with a fresh budget.
            self.phase = Phase::Empty;
            vec![Effect::CancelTimer]
        }
    }

    fn on_rotate_tick(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Showing { index, image_failed: false } if self.banners.len() > 1 => {
                self.show((index + 1) % self.banners.len())
            }
            _ => Vec::new(),
        }
    }

    fn on_failure_advance(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Showing { index, image_failed: true } if self.banners.len() > 1 => {
                self.show((index + 1) % self.banners.len())
            }
            _ => Vec::new(),
        }
    }

    fn on_select(&mut self, target: usize) -> Vec<Effect> {
        match self.phase {
            Phase::Showing { index, .. } if target < self.banners.len() && target != index => {
                self.show(target)
            }
            _ => Vec::new(),
        }
    }

    fn on_image_error(&mut self) -> Vec<Effect> {
        match self.phase {
            Phase::Showing { index, image_failed: false } => {
                self.phase = Phase::Showing { index, image_failed: true };
                if self.banners.len() > 1 {
                    // Let the user perceive the failure, then rotate away.
                    vec![Effect::ArmFailureAdvance]
                } else {
                    // Sole banner: stop timers and offer the manual reload.
                    vec![Effect::CancelTimer]
                }
            }
            _ => Vec::new(),
        }
    }

    /// Make `index` current: fresh impression, failure flag cleared,
    /// rotation re-armed when there is something to rotate to.
    fn show(&mut self, index: usize) -> Vec<Effect> {
        self.phase = Phase::Showing { index, image_failed: false };
        let mut effects = vec![Effect::RecordImpression(self.banners[index].id.clone())];
        if self.banners.len() > 1 {
            effects.push(Effect::ArmRotation);
        }
        effects
    }
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod tests;
