//! Async driver for one banner placement slot.
//!
//! DESIGN
//! ======
//! The driver owns a [`BannerMachine`] behind a mutex and translates its
//! effects into tokio tasks. Two guards keep concurrent completions honest:
//!
//! - a **fetch generation**: each `load()` (and `dismiss()`) bumps it, and a
//!   fetch result is discarded when its generation is stale — the latest
//!   load is authoritative;
//! - a **timer sequence**: arming cancels the previous timer task and bumps
//!   the sequence, and a tick that fires with a stale sequence is a no-op.
//!   At most one timer is live per slot.
//!
//! Telemetry (impressions, clicks) is spawned fire-and-forget; failures are
//! logged at debug level and dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;
use tracing::debug;

use crate::banner::machine::{BannerMachine, Effect, Event, RenderState};
use crate::config::ClientConfig;
use crate::model::BannerPosition;
use crate::net::BannerBackend;

// =============================================================================
// TYPES
// =============================================================================

struct DriverState {
    machine: BannerMachine,
    timer: Option<JoinHandle<()>>,
    timer_seq: u64,
    fetch_gen: u64,
}

struct Shared<B> {
    backend: B,
    config: ClientConfig,
    position: BannerPosition,
    state: Mutex<DriverState>,
}

impl<B> Shared<B> {
    fn lock(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One engine per mounted placement slot. A position change on the host
/// side means constructing a new engine; slots share nothing but the
/// backend client.
pub struct BannerEngine<B: BannerBackend> {
    shared: Arc<Shared<B>>,
}

impl<B: BannerBackend> BannerEngine<B> {
    /// Build an engine for a placement slot. Call [`BannerEngine::load`] to
    /// start the initial fetch.
    #[must_use]
    pub fn new(backend: B, config: ClientConfig, position: BannerPosition) -> Self {
        let machine = BannerMachine::new(config.fetch_retry_limit);
        Self {
            shared: Arc::new(Shared {
                backend,
                config,
                position,
                state: Mutex::new(DriverState { machine, timer: None, timer_seq: 0, fetch_gen: 0 }),
            }),
        }
    }

    /// Start (or manually restart) the banner fetch for this slot.
    ///
    /// Invalidates any in-flight fetch: only the newest load's result is
    /// applied. Also used as the manual reload after an image failure or
    /// exhausted retries.
    pub fn load(&self) {
        self.shared.lock().fetch_gen += 1;
        dispatch(&self.shared, Event::Reload);
    }

    /// Close the slot. Irreversible: no further fetch, rotation, render, or
    /// telemetry for this instance.
    pub fn dismiss(&self) {
        self.shared.lock().fetch_gen += 1;
        dispatch(&self.shared, Event::Dismiss);
    }

    /// Manual pager selection.
    pub fn select(&self, index: usize) {
        dispatch(&self.shared, Event::Select(index));
    }

    /// Report that the current banner's image failed to load.
    pub fn image_failed(&self) {
        dispatch(&self.shared, Event::ImageError);
    }

    /// Activate the current banner: records click telemetry and returns the
    /// destination for the host to open in a new browsing context. `None`
    /// when the banner has no link (no telemetry either) or nothing is
    /// showing.
    pub fn click(&self) -> Option<String> {
        let (banner_id, target) = {
            let state = self.shared.lock();
            let banner = state.machine.current()?;
            let target = banner.click_target()?.to_owned();
            (banner.id.clone(), target)
        };
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            if let Err(err) = shared.backend.record_click(&banner_id).await {
                debug!(%err, banner_id, "click telemetry dropped");
            }
        });
        Some(target)
    }

    /// Snapshot for the rendering layer, with the banner's media URL
    /// resolved against the configured backend origin.
    #[must_use]
    pub fn render(&self) -> RenderState {
        let state = self.shared.lock();
        match state.machine.render() {
            RenderState::Banner { mut banner, index, total } => {
                banner.image_url = self.shared.config.resolve_media_url(&banner.image_url);
                RenderState::Banner { banner, index, total }
            }
            other => other,
        }
    }

    #[must_use]
    pub fn position(&self) -> BannerPosition {
        self.shared.position
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.shared.lock().machine.is_dismissed()
    }
}

impl<B: BannerBackend> Drop for BannerEngine<B> {
    fn drop(&mut self) {
        // Outstanding tasks hold Arc clones; dismissing makes every late
        // completion a no-op before the timer is aborted.
        let mut state = self.shared.lock();
        state.fetch_gen += 1;
        state.machine.apply(Event::Dismiss);
        state.timer_seq += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Single entry point for state changes: apply the event, then execute the
/// effects outside the lock.
fn dispatch<B: BannerBackend>(shared: &Arc<Shared<B>>, event: Event) {
    let effects = shared.lock().machine.apply(event);
    run_effects(shared, effects);
}

fn run_effects<B: BannerBackend>(shared: &Arc<Shared<B>>, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::StartFetch => spawn_fetch(shared),
            Effect::ArmRotation => arm_timer(shared, shared.config.rotate_interval, Event::RotateTick),
            Effect::ArmRetry => arm_timer(shared, shared.config.fetch_retry_backoff, Event::RetryTick),
            Effect::ArmFailureAdvance => {
                arm_timer(shared, shared.config.failure_advance_delay, Event::FailureAdvanceTick);
            }
            Effect::CancelTimer => cancel_timer(shared),
            Effect::RecordImpression(banner_id) => spawn_impression(shared, banner_id),
        }
    }
}

fn spawn_fetch<B: BannerBackend>(shared: &Arc<Shared<B>>) {
    let generation = shared.lock().fetch_gen;
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let result = shared.backend.active_banners(shared.position).await;
        let event = match result {
            Ok(banners) => Event::FetchOk(banners),
            Err(err) => {
                debug!(%err, position = shared.position.as_str(), "banner fetch failed");
                Event::FetchErr
            }
        };
        // A newer load() owns the slot now; this result is stale.
        if shared.lock().fetch_gen != generation {
            return;
        }
        dispatch(&shared, event);
    });
}

/// Cancel-then-schedule: abort the live timer, bump the sequence, arm a
/// fresh one. A tick whose sequence is stale by firing time does nothing.
fn arm_timer<B: BannerBackend>(shared: &Arc<Shared<B>>, delay: std::time::Duration, event: Event) {
    let mut state = shared.lock();
    if let Some(timer) = state.timer.take() {
        timer.abort();
    }
    state.timer_seq += 1;
    let seq = state.timer_seq;
    let task_shared = Arc::clone(shared);
    // Spawned under the lock so the handle is stored before the tick can
    // possibly run.
    state.timer = Some(tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if task_shared.lock().timer_seq != seq {
            return;
        }
        dispatch(&task_shared, event);
    }));
}

fn cancel_timer<B: BannerBackend>(shared: &Arc<Shared<B>>) {
    let mut state = shared.lock();
    state.timer_seq += 1;
    if let Some(timer) = state.timer.take() {
        timer.abort();
    }
}

fn spawn_impression<B: BannerBackend>(shared: &Arc<Shared<B>>, banner_id: String) {
    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        if let Err(err) = shared.backend.record_view(&banner_id).await {
            debug!(%err, banner_id, "impression telemetry dropped");
        }
    });
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
