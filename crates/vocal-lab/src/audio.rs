//! cpal playback for the result lanes
//!
//! Lock-free architecture, one output stream per lane:
//! - Commands sent via `rtrb` SPSC ringbuffer (UI → Audio)
//! - Position and end-of-track read via atomics (Audio → UI)
//! - The decoded buffer is shared read-only; the callback owns its cursor
//!
//! Without an output device the engine runs on a wall clock, so the
//! transport and waveforms still move.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};
use vocal_lab_core::{DecodedAudio, EngineEvent, LaneId, WaveEngine};

/// Commands sent from UI to audio thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewCommand {
    Play,
    Pause,
    /// Seek to a source frame
    Seek(u64),
}

const COMMAND_CAPACITY: usize = 64;

/// Where a lane's audio goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Default cpal output device, wall clock if none
    #[default]
    Device,
    /// Wall clock only
    Headless,
}

/// Lock-free atomics shared with the audio callback
pub struct PreviewAtomics {
    /// Playback position in source frames
    position: AtomicU64,
    /// Set by the callback when the end of the buffer is reached
    finished: AtomicBool,
    /// Gain as `f32` bits
    volume: AtomicU32,
    /// Seek commands applied by the callback, published after `position`
    seeks_applied: AtomicU64,
}

impl PreviewAtomics {
    fn new() -> Self {
        Self {
            position: AtomicU64::new(0),
            finished: AtomicBool::new(false),
            volume: AtomicU32::new(1.0f32.to_bits()),
            seeks_applied: AtomicU64::new(0),
        }
    }

    pub fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }
}

/// Audio-thread half of a lane
struct PreviewProcessor {
    audio: Arc<DecodedAudio>,
    command_rx: rtrb::Consumer<PreviewCommand>,
    atomics: Arc<PreviewAtomics>,
    /// Read position in source frames
    cursor: f64,
    /// Source frames per output frame (naive rate conversion)
    step: f64,
    playing: bool,
}

impl PreviewProcessor {
    fn process(&mut self, data: &mut [f32], channels: usize) {
        let mut seeks = 0;
        while let Ok(cmd) = self.command_rx.pop() {
            match cmd {
                PreviewCommand::Play => self.playing = true,
                PreviewCommand::Pause => self.playing = false,
                PreviewCommand::Seek(frame) => {
                    self.cursor = frame as f64;
                    seeks += 1;
                }
            }
        }

        let volume = self.atomics.volume();
        let total = self.audio.frames();

        for frame in data.chunks_mut(channels.max(1)) {
            let (left, right) = if self.playing {
                let index = self.cursor as usize;
                if index >= total {
                    self.playing = false;
                    self.atomics.finished.store(true, Ordering::Relaxed);
                    (0.0, 0.0)
                } else {
                    self.cursor += self.step;
                    self.audio.stereo_frame(index)
                }
            } else {
                (0.0, 0.0)
            };

            frame[0] = left * volume;
            if frame.len() > 1 {
                frame[1] = right * volume;
            }
            // Fill additional channels with silence
            for ch in frame.iter_mut().skip(2) {
                *ch = 0.0;
            }
        }

        let position = (self.cursor as u64).min(total as u64);
        self.atomics.position.store(position, Ordering::Relaxed);
        if seeks > 0 {
            self.atomics.seeks_applied.fetch_add(seeks, Ordering::Release);
        }
    }
}

/// UI-side view of seeks still in flight to the callback
///
/// Until the callback has applied every seek sent, it may still publish
/// positions from its old cursor, so the requested frame is reported instead.
#[derive(Debug, Default)]
struct SeekTracker {
    sent: u64,
    frame: u64,
}

impl SeekTracker {
    fn request(&mut self, frame: u64) {
        self.sent += 1;
        self.frame = frame;
    }

    fn position(&self, atomics: &PreviewAtomics) -> u64 {
        if atomics.seeks_applied.load(Ordering::Acquire) < self.sent {
            self.frame
        } else {
            atomics.position()
        }
    }
}

/// Playback clock used when no device is available
#[derive(Debug, Default)]
struct WallClock {
    anchor: Option<Instant>,
    offset: f64,
}

impl WallClock {
    fn time(&self) -> f64 {
        self.offset + self.anchor.map_or(0.0, |a| a.elapsed().as_secs_f64())
    }

    fn start(&mut self) {
        if self.anchor.is_none() {
            self.anchor = Some(Instant::now());
        }
    }

    fn stop(&mut self) {
        self.offset = self.time();
        self.anchor = None;
    }

    fn seek(&mut self, seconds: f64) {
        self.offset = seconds;
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
    }
}

enum Output {
    Device {
        /// Keeps the stream alive; dropping it stops audio
        _stream: Stream,
        commands: rtrb::Producer<PreviewCommand>,
        atomics: Arc<PreviewAtomics>,
        seek: SeekTracker,
        sample_rate: u32,
    },
    Clock(WallClock),
    Released,
}

/// One lane's playback engine
pub struct PreviewEngine {
    lane: LaneId,
    output: Output,
    duration: f64,
    playing: bool,
    ready_reported: bool,
    last_reported: Option<f64>,
}

impl PreviewEngine {
    /// Engine for `lane` playing `audio`
    pub fn new(lane: LaneId, audio: Arc<DecodedAudio>, mode: OutputMode) -> Self {
        let duration = audio.duration_seconds();
        let output = match mode {
            OutputMode::Headless => Output::Clock(WallClock::default()),
            OutputMode::Device => open_output(lane, audio).unwrap_or_else(|e| {
                log::warn!(
                    "PreviewEngine: {:?} has no audio output ({:#}), using wall clock",
                    lane,
                    e
                );
                Output::Clock(WallClock::default())
            }),
        };

        Self {
            lane,
            output,
            duration,
            playing: false,
            ready_reported: false,
            last_reported: None,
        }
    }

    fn send(&mut self, cmd: PreviewCommand) {
        if let Output::Device { commands, .. } = &mut self.output {
            if commands.push(cmd).is_err() {
                log::warn!("PreviewEngine: {:?} command queue full, dropped {:?}", self.lane, cmd);
            }
        }
    }

    /// End reached since the last poll
    fn take_finished(&mut self) -> bool {
        match &mut self.output {
            Output::Device { atomics, .. } => atomics.finished.swap(false, Ordering::Relaxed),
            Output::Clock(clock) => {
                if self.playing && clock.time() >= self.duration {
                    clock.stop();
                    clock.offset = self.duration;
                    true
                } else {
                    false
                }
            }
            Output::Released => false,
        }
    }
}

impl WaveEngine for PreviewEngine {
    fn duration(&self) -> f64 {
        self.duration
    }

    fn current_time(&self) -> f64 {
        let t = match &self.output {
            Output::Device {
                atomics,
                seek,
                sample_rate,
                ..
            } => seek.position(atomics) as f64 / (*sample_rate).max(1) as f64,
            Output::Clock(clock) => clock.time(),
            Output::Released => 0.0,
        };
        t.clamp(0.0, self.duration)
    }

    fn set_time(&mut self, seconds: f64) {
        let t = seconds.clamp(0.0, self.duration);
        match &mut self.output {
            Output::Device {
                seek,
                sample_rate,
                commands,
                ..
            } => {
                let frame = (t * *sample_rate as f64) as u64;
                match commands.push(PreviewCommand::Seek(frame)) {
                    Ok(()) => seek.request(frame),
                    Err(_) => {
                        log::warn!("PreviewEngine: {:?} command queue full, dropped seek", self.lane)
                    }
                }
            }
            Output::Clock(clock) => clock.seek(t),
            Output::Released => {}
        }
    }

    fn play_pause(&mut self) {
        if matches!(self.output, Output::Released) {
            return;
        }

        if self.playing {
            self.playing = false;
            if let Output::Clock(clock) = &mut self.output {
                clock.stop();
            }
            self.send(PreviewCommand::Pause);
        } else {
            self.playing = true;
            if let Output::Clock(clock) = &mut self.output {
                clock.start();
            }
            self.send(PreviewCommand::Play);
        }
        log::debug!("PreviewEngine: {:?} playing={}", self.lane, self.playing);
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn set_volume(&mut self, volume: f32) {
        if let Output::Device { atomics, .. } = &self.output {
            atomics.set_volume(volume);
        }
    }

    fn poll_events(&mut self) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if matches!(self.output, Output::Released) {
            return events;
        }

        if !self.ready_reported {
            self.ready_reported = true;
            events.push(EngineEvent::Ready {
                duration: self.duration,
            });
        }

        let finished = self.take_finished();

        let t = self.current_time();
        if self.last_reported != Some(t) {
            self.last_reported = Some(t);
            events.push(EngineEvent::TimeUpdate(t));
        }

        if finished && self.playing {
            self.playing = false;
            events.push(EngineEvent::Finished);
        }

        events
    }

    fn destroy(&mut self) {
        if !matches!(self.output, Output::Released) {
            log::debug!("PreviewEngine: {:?} released", self.lane);
        }
        self.output = Output::Released;
        self.playing = false;
    }
}

/// Open the default output device and start a stream for one lane
fn open_output(lane: LaneId, audio: Arc<DecodedAudio>) -> anyhow::Result<Output> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .context("no default output device")?;
    let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

    let supported = output_config(&device)?;
    let stream_config: StreamConfig = supported.config();
    let channels = stream_config.channels as usize;
    let device_rate = stream_config.sample_rate.0;

    let (producer, consumer) = rtrb::RingBuffer::new(COMMAND_CAPACITY);
    let atomics = Arc::new(PreviewAtomics::new());
    let sample_rate = audio.sample_rate;

    let mut processor = PreviewProcessor {
        audio,
        command_rx: consumer,
        atomics: atomics.clone(),
        cursor: 0.0,
        step: sample_rate as f64 / device_rate.max(1) as f64,
        playing: false,
    };

    let stream = device
        .build_output_stream(
            &stream_config,
            move |data: &mut [f32], _info: &cpal::OutputCallbackInfo| {
                processor.process(data, channels);
            },
            move |err| {
                log::error!("PreviewEngine: {:?} stream error: {}", lane, err);
            },
            None,
        )
        .context("failed to build output stream")?;
    stream.play().context("failed to start output stream")?;

    log::info!(
        "PreviewEngine: {:?} on {} ({} ch, {} Hz, source {} Hz)",
        lane,
        device_name,
        channels,
        device_rate,
        sample_rate
    );

    Ok(Output::Device {
        _stream: stream,
        commands: producer,
        atomics,
        seek: SeekTracker::default(),
        sample_rate,
    })
}

/// Pick an f32 output configuration, preferring the device default
fn output_config(device: &cpal::Device) -> anyhow::Result<cpal::SupportedStreamConfig> {
    let default = device
        .default_output_config()
        .context("no default output configuration")?;
    if default.sample_format() == SampleFormat::F32 {
        return Ok(default);
    }

    let rate = default.sample_rate();
    device
        .supported_output_configs()
        .context("failed to query output configurations")?
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .find(|c| c.min_sample_rate() <= rate && rate <= c.max_sample_rate())
        .map(|c| c.with_sample_rate(rate))
        .context("device has no f32 output configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vocal_lab_core::LanePair;

    fn audio(frames: usize, sample_rate: u32) -> Arc<DecodedAudio> {
        let samples = (0..frames)
            .flat_map(|i| [i as f32 / frames as f32, -(i as f32) / frames as f32])
            .collect();
        Arc::new(DecodedAudio {
            samples,
            sample_rate,
            channels: 2,
        })
    }

    fn processor(audio: Arc<DecodedAudio>) -> (PreviewProcessor, rtrb::Producer<PreviewCommand>) {
        let (producer, consumer) = rtrb::RingBuffer::new(COMMAND_CAPACITY);
        let processor = PreviewProcessor {
            audio,
            command_rx: consumer,
            atomics: Arc::new(PreviewAtomics::new()),
            cursor: 0.0,
            step: 1.0,
            playing: false,
        };
        (processor, producer)
    }

    #[test]
    fn test_processor_is_silent_until_play() {
        let (mut p, _tx) = processor(audio(8, 8));
        let mut out = vec![1.0f32; 8];
        p.process(&mut out, 2);
        assert!(out.iter().all(|&s| s == 0.0));
        assert_eq!(p.atomics.position(), 0);
    }

    #[test]
    fn test_processor_plays_to_end_and_flags_finish() {
        let (mut p, mut tx) = processor(audio(4, 4));
        p.atomics.set_volume(0.5);
        tx.push(PreviewCommand::Play).unwrap();

        // Six output frames for a four-frame source
        let mut out = vec![9.0f32; 12];
        p.process(&mut out, 2);

        assert_eq!(&out[0..4], &[0.0, 0.0, 0.125, -0.125]);
        assert_eq!(&out[8..12], &[0.0, 0.0, 0.0, 0.0]);
        assert!(p.atomics.finished.load(Ordering::Relaxed));
        assert_eq!(p.atomics.position(), 4);
        assert!(!p.playing);
    }

    #[test]
    fn test_processor_seek_and_extra_channels() {
        let (mut p, mut tx) = processor(audio(4, 4));
        tx.push(PreviewCommand::Seek(2)).unwrap();
        tx.push(PreviewCommand::Play).unwrap();

        let mut out = vec![9.0f32; 4];
        p.process(&mut out, 4);
        assert_eq!(out, vec![0.5, -0.5, 0.0, 0.0]);
        assert_eq!(p.atomics.position(), 3);
    }

    #[test]
    fn test_headless_reports_ready_once() {
        let mut engine = PreviewEngine::new(LaneId::Vocals, audio(44_100, 44_100), OutputMode::Headless);
        let first = engine.poll_events();
        assert_eq!(first[0], EngineEvent::Ready { duration: 1.0 });
        assert!(engine
            .poll_events()
            .iter()
            .all(|e| !matches!(e, EngineEvent::Ready { .. })));
    }

    #[test]
    fn test_headless_clock_advances_and_pauses() {
        let mut engine = PreviewEngine::new(LaneId::Vocals, audio(44_100 * 10, 44_100), OutputMode::Headless);
        engine.play_pause();
        std::thread::sleep(Duration::from_millis(30));
        engine.play_pause();

        let paused_at = engine.current_time();
        assert!(paused_at > 0.0);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(engine.current_time(), paused_at);

        engine.set_time(4.0);
        assert_eq!(engine.current_time(), 4.0);
        engine.set_time(99.0);
        assert_eq!(engine.current_time(), 10.0);
    }

    #[test]
    fn test_headless_finishes_at_end() {
        // 10 ms of audio
        let mut engine = PreviewEngine::new(LaneId::Instrumental, audio(441, 44_100), OutputMode::Headless);
        engine.play_pause();
        std::thread::sleep(Duration::from_millis(30));

        let events = engine.poll_events();
        assert!(events.contains(&EngineEvent::Finished));
        assert!(!engine.is_playing());
        assert!((engine.current_time() - engine.duration()).abs() < 1e-9);
    }

    #[test]
    fn test_lane_pair_restarts_together_after_finish() {
        // 10 ms of audio
        let source = audio(441, 44_100);
        let mut lanes = LanePair::new(
            PreviewEngine::new(LaneId::Vocals, source.clone(), OutputMode::Headless),
            PreviewEngine::new(LaneId::Instrumental, source, OutputMode::Headless),
            0.5,
        );
        lanes.pump();
        lanes.toggle_playback();
        std::thread::sleep(Duration::from_millis(30));
        lanes.pump();

        assert!(!lanes.is_playing());
        assert!(lanes.is_at_end());
        let end = lanes.duration().unwrap();
        assert_eq!(lanes.engine(LaneId::Vocals).current_time(), end);
        assert_eq!(lanes.engine(LaneId::Instrumental).current_time(), end);

        lanes.toggle_playback();
        assert!(lanes.is_playing());
        assert_eq!(lanes.current_time(), 0.0);
        assert!(lanes.engine(LaneId::Vocals).current_time() < end);
        assert!(lanes.engine(LaneId::Instrumental).current_time() < end);
    }

    #[test]
    fn test_seek_reported_until_callback_applies_it() {
        let (mut p, mut tx) = processor(audio(64, 64));
        tx.push(PreviewCommand::Play).unwrap();
        let mut out = vec![0.0f32; 8];
        p.process(&mut out, 2);
        assert_eq!(p.atomics.position(), 4);

        let mut seek = SeekTracker::default();
        seek.request(40);

        // A callback that has not seen the seek yet publishes its old cursor
        p.process(&mut out, 2);
        assert_eq!(p.atomics.position(), 8);
        assert_eq!(seek.position(&p.atomics), 40);

        tx.push(PreviewCommand::Seek(40)).unwrap();
        p.process(&mut out, 2);
        assert_eq!(seek.position(&p.atomics), 44);
    }

    #[test]
    fn test_destroyed_engine_is_inert() {
        let mut engine = PreviewEngine::new(LaneId::Vocals, audio(100, 100), OutputMode::Headless);
        engine.destroy();
        engine.play_pause();
        assert!(!engine.is_playing());
        assert!(engine.poll_events().is_empty());
        assert_eq!(engine.current_time(), 0.0);
    }

    #[test]
    fn test_lane_pair_seek_reaches_both_engines() {
        let source = audio(44_100 * 5, 44_100);
        let mut lanes = LanePair::new(
            PreviewEngine::new(LaneId::Vocals, source.clone(), OutputMode::Headless),
            PreviewEngine::new(LaneId::Instrumental, source, OutputMode::Headless),
            0.5,
        );
        lanes.pump();
        assert_eq!(lanes.duration(), Some(5.0));

        lanes.interact(LaneId::Instrumental, 2.5);
        assert_eq!(lanes.engine(LaneId::Vocals).current_time(), 2.5);
        assert_eq!(lanes.engine(LaneId::Instrumental).current_time(), 2.5);
        assert_eq!(lanes.current_time(), 2.5);
    }
}
