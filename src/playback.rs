use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};

// ========================================================================
// PLAYBACK SOURCE
// ========================================================================

/// Anything the cursor can follow: a current-time read, a duration, and a
/// subscribable position-changed notification.
pub trait PlaybackSource {
    /// Current playback position in seconds.
    fn current_time(&self) -> f32;

    /// Total duration in seconds.
    fn duration(&self) -> f32;

    /// Subscribe to position-changed events. Dropping the returned handle
    /// removes the listener from the source -- unsubscription is tied to the
    /// value's lifetime, so repeated attach/detach cycles cannot leak
    /// listeners.
    fn subscribe(&self) -> PositionEvents;
}

/// A live position-event stream plus its RAII unsubscribe guard.
pub struct PositionEvents {
    rx: Receiver<f32>,
    _guard: Subscription,
}

impl PositionEvents {
    /// Drain pending events, returning the most recent position if any.
    pub fn latest(&self) -> Option<f32> {
        let mut last = None;
        while let Ok(pos) = self.rx.try_recv() {
            last = Some(pos);
        }
        last
    }
}

/// Removes its listener from the source registry on drop.
struct Subscription {
    registry: Weak<Mutex<Listeners>>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if let Ok(mut listeners) = registry.lock() {
                listeners.senders.retain(|(id, _)| *id != self.id);
            }
        }
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    senders: Vec<(u64, Sender<f32>)>,
}

impl Listeners {
    fn register(registry: &Arc<Mutex<Self>>) -> PositionEvents {
        let (tx, rx) = unbounded();
        let id = {
            let mut listeners = registry.lock().unwrap_or_else(|e| e.into_inner());
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.senders.push((id, tx));
            id
        };
        PositionEvents {
            rx,
            _guard: Subscription {
                registry: Arc::downgrade(registry),
                id,
            },
        }
    }

    fn publish(&self, position: f32) {
        for (_, tx) in &self.senders {
            // A receiver that lagged or disconnected just misses the event
            let _ = tx.try_send(position);
        }
    }
}

// ========================================================================
// TRANSPORT CLOCK
// ========================================================================

/// A playback source driven by a monotonic clock: play/pause/seek over a
/// fixed duration, publishing the position to subscribers on every `tick()`.
///
/// This is a transport timeline only. It never touches the audio samples
/// (no decoding happens client-side), it just gives the cursor something
/// to follow.
pub struct TransportClock {
    state: Mutex<ClockState>,
    listeners: Arc<Mutex<Listeners>>,
}

struct ClockState {
    duration: f32,
    /// Position accumulated up to the last pause/seek.
    base_position: f32,
    /// Set while playing.
    playing_since: Option<Instant>,
}

impl TransportClock {
    pub fn new(duration: f32) -> Self {
        Self {
            state: Mutex::new(ClockState {
                duration: duration.max(0.0),
                base_position: 0.0,
                playing_since: None,
            }),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        }
    }

    pub fn play(&self) {
        let mut state = self.lock_state();
        if state.playing_since.is_none() {
            // Restart from the top when play is hit at the end
            if state.duration > 0.0 && state.base_position >= state.duration {
                state.base_position = 0.0;
            }
            state.playing_since = Some(Instant::now());
        }
    }

    pub fn pause(&self) {
        let mut state = self.lock_state();
        state.base_position = Self::position_of(&state);
        state.playing_since = None;
    }

    pub fn toggle(&self) {
        if self.is_playing() {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn seek(&self, position: f32) {
        let mut state = self.lock_state();
        state.base_position = position.clamp(0.0, state.duration);
        if state.playing_since.is_some() {
            state.playing_since = Some(Instant::now());
        }
    }

    pub fn is_playing(&self) -> bool {
        self.lock_state().playing_since.is_some()
    }

    /// Advance the transport and notify subscribers. Called once per GUI
    /// frame; pauses itself when the end of the timeline is reached.
    pub fn tick(&self) {
        let position = {
            let mut state = self.lock_state();
            let position = Self::position_of(&state);
            if state.playing_since.is_some() && position >= state.duration {
                state.base_position = state.duration;
                state.playing_since = None;
            }
            position
        };

        if let Ok(listeners) = self.listeners.lock() {
            listeners.publish(position);
        }
    }

    /// Number of live subscriptions. Drops back to zero once every
    /// `PositionEvents` handle is gone.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .lock()
            .map(|l| l.senders.len())
            .unwrap_or(0)
    }

    fn position_of(state: &ClockState) -> f32 {
        let elapsed = state
            .playing_since
            .map(|since| since.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        (state.base_position + elapsed).min(state.duration)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl PlaybackSource for TransportClock {
    fn current_time(&self) -> f32 {
        Self::position_of(&self.lock_state())
    }

    fn duration(&self) -> f32 {
        self.lock_state().duration
    }

    fn subscribe(&self) -> PositionEvents {
        Listeners::register(&self.listeners)
    }
}

// ========================================================================
// CURSOR TRACKER
// ========================================================================

/// Follows a playback source and turns its position into an overlay cursor.
///
/// Two states: Idle (not attached; the ratio stays frozen at the last known
/// value, 0 initially) and Tracking (subscribed to a source). Detaching
/// drops the subscription guard, which removes the listener from the source;
/// the tracker can be re-attached any number of times.
#[derive(Default)]
pub struct CursorTracker {
    current_time: f32,
    duration: f32,
    events: Option<PositionEvents>,
}

impl CursorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Tracking. Replaces any prior subscription.
    pub fn attach(&mut self, source: &dyn PlaybackSource) {
        self.duration = source.duration();
        self.current_time = source.current_time();
        self.events = Some(source.subscribe());
    }

    /// Tracking -> Idle. The subscription guard is dropped here, which is
    /// what guarantees the listener is gone.
    pub fn detach(&mut self) {
        self.events = None;
    }

    pub fn is_tracking(&self) -> bool {
        self.events.is_some()
    }

    /// Drain position events from the source, keeping the most recent.
    pub fn poll(&mut self) {
        if let Some(events) = &self.events {
            if let Some(position) = events.latest() {
                self.current_time = position;
            }
        }
    }

    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// Progress in [0, 1]. Defined as 0 when the duration is not positive,
    /// so a missing or zero-length timeline never divides by zero.
    pub fn ratio(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Pixel position of the overlay cursor on a panel of the given width.
    pub fn cursor_x(&self, width: f32) -> f32 {
        self.ratio() * width
    }
}
