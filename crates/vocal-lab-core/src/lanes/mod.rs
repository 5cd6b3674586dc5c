//! Result lanes: two playback engines kept in lock-step
//!
//! The result screen shows a "vocals" and an "instrumental" lane. Each lane
//! owns its own playback/visualisation engine; `LanePair` keeps them in sync
//! by forwarding seeks from one lane to the other and by starting and
//! stopping both together.
//!
//! Both lanes are fed the same source audio. The stem labels are a mock.

mod gain;

use gain::LaneGain;

/// Which lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneId {
    Vocals,
    Instrumental,
}

impl LaneId {
    pub const ALL: [LaneId; 2] = [LaneId::Vocals, LaneId::Instrumental];

    /// The opposite lane
    pub fn other(self) -> LaneId {
        match self {
            LaneId::Vocals => LaneId::Instrumental,
            LaneId::Instrumental => LaneId::Vocals,
        }
    }

    /// Label shown above the lane
    pub fn label(self) -> &'static str {
        match self {
            LaneId::Vocals => "VOCALS.wav",
            LaneId::Instrumental => "INSTRUMENTAL.wav",
        }
    }

    /// Suffix used when exporting the lane
    pub fn file_suffix(self) -> &'static str {
        match self {
            LaneId::Vocals => "vocals",
            LaneId::Instrumental => "instrumental",
        }
    }

    fn index(self) -> usize {
        match self {
            LaneId::Vocals => 0,
            LaneId::Instrumental => 1,
        }
    }
}

/// Notifications drained from an engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    /// Audio decoded and ready; duration in seconds
    Ready { duration: f64 },
    /// Playback position moved while playing
    TimeUpdate(f64),
    /// The user moved the position on the engine's own surface
    Interaction(f64),
    /// Playback reached the end
    Finished,
}

/// Playback/visualisation engine contract
///
/// Times are in seconds. `set_time` is a programmatic seek and must not be
/// reported back as an `Interaction`.
pub trait WaveEngine {
    fn duration(&self) -> f64;
    fn current_time(&self) -> f64;
    fn set_time(&mut self, seconds: f64);
    fn play_pause(&mut self);
    fn is_playing(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
    /// Drain pending events
    fn poll_events(&mut self) -> Vec<EngineEvent>;
    /// Release decoded audio and any output resources
    fn destroy(&mut self);
}

/// Tolerance when matching an echoed interaction to a forwarded seek
const ECHO_TOLERANCE: f64 = 1e-3;

/// Positions this close to the duration count as the end of the track
const END_TOLERANCE: f64 = 1e-3;

struct Lane<E> {
    engine: E,
    gain: LaneGain,
    /// Position forwarded into this lane, awaiting a possible echo
    pending_echo: Option<f64>,
}

/// Vocals + instrumental lanes with shared transport
pub struct LanePair<E: WaveEngine> {
    lanes: [Lane<E>; 2],
    playing: bool,
    duration: Option<f64>,
    current_time: f64,
    /// Set while a seek is being forwarded; blocks re-entrant forwarding
    forwarding: bool,
    destroyed: bool,
}

impl<E: WaveEngine> LanePair<E> {
    /// Build the pair; the instrumental lane starts at `instrumental_volume`
    pub fn new(vocals: E, instrumental: E, instrumental_volume: f32) -> Self {
        let mut pair = Self {
            lanes: [
                Lane {
                    engine: vocals,
                    gain: LaneGain::new(1.0),
                    pending_echo: None,
                },
                Lane {
                    engine: instrumental,
                    gain: LaneGain::new(instrumental_volume),
                    pending_echo: None,
                },
            ],
            playing: false,
            duration: None,
            current_time: 0.0,
            forwarding: false,
            destroyed: false,
        };
        pair.apply_gains();
        pair
    }

    /// Engine for a lane
    pub fn engine(&self, id: LaneId) -> &E {
        &self.lanes[id.index()].engine
    }

    /// Duration reported by the vocals lane once ready
    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Shared transport position
    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// Playback progress in 0..=1
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if d > 0.0 => (self.current_time / d).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_ready(&self) -> bool {
        self.duration.is_some()
    }

    /// Transport parked at the end of the track
    pub fn is_at_end(&self) -> bool {
        self.duration
            .is_some_and(|d| self.current_time >= d - END_TOLERANCE)
    }

    pub fn is_muted(&self, id: LaneId) -> bool {
        self.lanes[id.index()].gain.muted
    }

    pub fn is_soloed(&self, id: LaneId) -> bool {
        self.lanes[id.index()].gain.soloed
    }

    /// User seek on one lane; the other lane follows
    pub fn interact(&mut self, id: LaneId, seconds: f64) {
        if self.destroyed {
            return;
        }
        let t = self.clamp_time(seconds);
        let lane = &mut self.lanes[id.index()];
        lane.engine.set_time(t);
        lane.pending_echo = Some(t);
        self.forward(id, t);
    }

    /// User seek as a fraction of the duration
    pub fn interact_fraction(&mut self, id: LaneId, fraction: f64) {
        if let Some(duration) = self.duration {
            self.interact(id, fraction.clamp(0.0, 1.0) * duration);
        }
    }

    /// Toggle both lanes together
    ///
    /// Each engine is driven to the new state rather than blindly toggled,
    /// so lanes that drifted apart are realigned. Starting from the end
    /// rewinds both lanes to the top first.
    pub fn toggle_playback(&mut self) {
        if self.destroyed {
            return;
        }
        let target = !self.playing;
        if target && self.is_at_end() {
            log::debug!("LanePair: restarting from the top");
            self.interact(LaneId::Vocals, 0.0);
        }
        for lane in &mut self.lanes {
            if lane.engine.is_playing() != target {
                lane.engine.play_pause();
            }
        }
        self.playing = target;
        log::debug!("LanePair: playback {}", if target { "started" } else { "paused" });
    }

    /// Mute or unmute a lane
    pub fn toggle_mute(&mut self, id: LaneId) {
        let gain = &mut self.lanes[id.index()].gain;
        gain.muted = !gain.muted;
        self.apply_gains();
    }

    /// Solo or unsolo a lane
    pub fn toggle_solo(&mut self, id: LaneId) {
        let gain = &mut self.lanes[id.index()].gain;
        gain.soloed = !gain.soloed;
        self.apply_gains();
    }

    /// Drain both engines and react to their events
    pub fn pump(&mut self) {
        if self.destroyed {
            return;
        }
        for id in LaneId::ALL {
            let events = self.lanes[id.index()].engine.poll_events();
            for event in events {
                self.handle_event(id, event);
            }
        }
    }

    /// Destroy both engines now
    pub fn release(mut self) {
        self.destroy();
    }

    fn handle_event(&mut self, id: LaneId, event: EngineEvent) {
        match event {
            EngineEvent::Ready { duration } => {
                if id == LaneId::Vocals {
                    log::info!("LanePair: ready, duration {:.2}s", duration);
                    self.duration = Some(duration);
                }
            }
            EngineEvent::TimeUpdate(t) => {
                if id == LaneId::Vocals {
                    self.current_time = t;
                }
            }
            EngineEvent::Interaction(t) => {
                let lane = &mut self.lanes[id.index()];
                if let Some(echo) = lane.pending_echo.take() {
                    if (echo - t).abs() < ECHO_TOLERANCE {
                        log::debug!("LanePair: swallowed echo on {:?} at {:.3}s", id, t);
                        return;
                    }
                }
                self.forward(id, t);
            }
            EngineEvent::Finished => {
                if self.playing {
                    log::debug!("LanePair: {:?} finished, pausing both lanes", id);
                    self.toggle_playback();
                }
                // The other lane stopped a little short; park both at the end
                let end = self
                    .duration
                    .unwrap_or_else(|| self.lanes[id.index()].engine.duration());
                self.interact(id, end);
            }
        }
    }

    /// Copy a position from `source` into the other lane
    fn forward(&mut self, source: LaneId, t: f64) {
        if self.forwarding {
            return;
        }
        self.forwarding = true;

        let target = &mut self.lanes[source.other().index()];
        target.engine.set_time(t);
        target.pending_echo = Some(t);
        self.current_time = t;

        self.forwarding = false;
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        let t = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        match self.duration {
            Some(d) => t.min(d),
            None => t,
        }
    }

    fn apply_gains(&mut self) {
        let soloed = [self.lanes[0].gain.soloed, self.lanes[1].gain.soloed];
        for (i, lane) in self.lanes.iter_mut().enumerate() {
            let volume = lane.gain.effective(soloed[1 - i]);
            lane.engine.set_volume(volume);
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.playing = false;
        for lane in &mut self.lanes {
            lane.engine.destroy();
        }
        log::debug!("LanePair: engines destroyed");
    }
}

impl<E: WaveEngine> Drop for LanePair<E> {
    fn drop(&mut self) {
        self.destroy();
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}
