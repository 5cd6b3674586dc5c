//! Processing choreography
//!
//! The processing screen shows four pseudo-steps advancing on a fixed timer.
//! No work is gated behind them: it is a fixed-duration animation that ends
//! with a single completion signal.
//!
//! `Choreography` is the pure step list. `choreograph` drives it on tokio
//! deadlines and exposes the result as a stream; dropping the stream cancels
//! both the repeating deadline and the pending completion.

use std::time::Duration;

use futures::stream::{self, Stream};
use tokio::time::Instant;

/// Messages shown for each step, in order
pub const STEP_MESSAGES: [&str; 4] = [
    "INITIALIZING_CORE...",
    "ANALYZING_SPECTRUM...",
    "ISOLATING_VOCALS...",
    "RENDERING_WAVEFORMS...",
];

/// Default interval between steps
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(1200);

/// Default pause between the last step and completion
pub const DEFAULT_COMPLETION_DELAY: Duration = Duration::from_millis(800);

/// Status of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

/// One row of the processing list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStep {
    pub id: u8,
    pub message: &'static str,
    pub status: StepStatus,
}

/// Ordered step list with a cursor
///
/// Exactly one step is active until all are completed. Progress never
/// regresses and a finished choreography stays finished.
#[derive(Debug, Clone)]
pub struct Choreography {
    steps: Vec<ProcessingStep>,
    cursor: usize,
}

impl Choreography {
    /// Fresh choreography with the first step active
    pub fn new() -> Self {
        let steps = STEP_MESSAGES
            .iter()
            .enumerate()
            .map(|(i, message)| ProcessingStep {
                id: i as u8 + 1,
                message: *message,
                status: if i == 0 { StepStatus::Active } else { StepStatus::Pending },
            })
            .collect();

        Self { steps, cursor: 0 }
    }

    /// Complete the current step and activate the next one
    ///
    /// Returns true if this tick finished the choreography. Ticks after
    /// completion have no effect and return false.
    pub fn tick(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        self.steps[self.cursor].status = StepStatus::Completed;
        self.cursor += 1;

        if let Some(next) = self.steps.get_mut(self.cursor) {
            next.status = StepStatus::Active;
            false
        } else {
            true
        }
    }

    /// All steps completed
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }
}

impl Default for Choreography {
    fn default() -> Self {
        Self::new()
    }
}

/// Timer settings for the choreography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoreographyTiming {
    pub step_interval: Duration,
    pub completion_delay: Duration,
}

impl Default for ChoreographyTiming {
    fn default() -> Self {
        Self {
            step_interval: DEFAULT_STEP_INTERVAL,
            completion_delay: DEFAULT_COMPLETION_DELAY,
        }
    }
}

impl ChoreographyTiming {
    /// Time from mount to completion
    pub fn total(&self) -> Duration {
        self.step_interval * STEP_MESSAGES.len() as u32 + self.completion_delay
    }
}

/// Events produced by `choreograph`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoreographyEvent {
    /// A tick advanced the list; carries the new snapshot
    Advanced(Vec<ProcessingStep>),
    /// The completion delay elapsed after the last step
    Completed,
}

enum Phase {
    Mounted,
    Ticking {
        choreography: Choreography,
        deadline: Instant,
    },
    Settling {
        deadline: Instant,
    },
    Done,
}

/// Run the choreography on tokio time
///
/// Deadlines are fixed-rate from the first poll: tick `k` fires at
/// `mount + k * step_interval`, completion at the last tick plus
/// `completion_delay`. `Completed` is yielded once, then the stream ends.
pub fn choreograph(timing: ChoreographyTiming) -> impl Stream<Item = ChoreographyEvent> + Send {
    stream::unfold(Phase::Mounted, move |phase| async move {
        let (choreography, deadline) = match phase {
            Phase::Mounted => (Choreography::new(), Instant::now() + timing.step_interval),
            Phase::Ticking {
                choreography,
                deadline,
            } => (choreography, deadline),
            Phase::Settling { deadline } => {
                tokio::time::sleep_until(deadline).await;
                log::debug!("Choreography: completed");
                return Some((ChoreographyEvent::Completed, Phase::Done));
            }
            Phase::Done => return None,
        };

        let mut choreography = choreography;
        tokio::time::sleep_until(deadline).await;
        let finished = choreography.tick();
        let snapshot = choreography.steps().to_vec();

        let next = if finished {
            log::debug!("Choreography: all steps completed, settling");
            Phase::Settling {
                deadline: deadline + timing.completion_delay,
            }
        } else {
            Phase::Ticking {
                choreography,
                deadline: deadline + timing.step_interval,
            }
        };

        Some((ChoreographyEvent::Advanced(snapshot), next))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// Virtual-time deadlines land on millisecond ticks
    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "elapsed {:?}, expected {:?}",
            actual,
            expected
        );
    }

    fn statuses(steps: &[ProcessingStep]) -> Vec<StepStatus> {
        steps.iter().map(|s| s.status).collect()
    }

    #[test]
    fn test_new_has_first_step_active() {
        let c = Choreography::new();
        assert_eq!(
            statuses(c.steps()),
            vec![StepStatus::Active, StepStatus::Pending, StepStatus::Pending, StepStatus::Pending]
        );
        assert_eq!(c.steps()[0].id, 1);
    }

    #[test]
    fn test_exactly_one_active_until_finished() {
        let mut c = Choreography::new();
        for tick in 1..=4 {
            let finished = c.tick();
            let active = c.steps().iter().filter(|s| s.status == StepStatus::Active).count();
            let completed = c.steps().iter().filter(|s| s.status == StepStatus::Completed).count();
            assert_eq!(completed, tick);
            if tick < 4 {
                assert!(!finished);
                assert_eq!(active, 1);
            } else {
                assert!(finished);
                assert_eq!(active, 0);
            }
        }
    }

    #[test]
    fn test_finished_choreography_never_restarts() {
        let mut c = Choreography::new();
        while !c.tick() {}
        assert!(c.is_finished());
        assert!(!c.tick());
        assert!(c.steps().iter().all(|s| s.status == StepStatus::Completed));
    }

    #[test]
    fn test_default_timing_total() {
        assert_eq!(ChoreographyTiming::default().total(), Duration::from_millis(5600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_timing() {
        let timing = ChoreographyTiming::default();
        let start = Instant::now();
        let mut events = Box::pin(choreograph(timing));

        for tick in 1..=4u32 {
            let event = events.next().await;
            assert_near(start.elapsed(), timing.step_interval * tick);
            match event {
                Some(ChoreographyEvent::Advanced(steps)) => {
                    let completed = steps.iter().filter(|s| s.status == StepStatus::Completed).count();
                    assert_eq!(completed, tick as usize);
                }
                other => panic!("expected Advanced, got {:?}", other),
            }
        }

        let fourth_tick = start.elapsed();
        assert_eq!(events.next().await, Some(ChoreographyEvent::Completed));
        assert!(start.elapsed() - fourth_tick >= timing.completion_delay);
        assert_near(start.elapsed(), Duration::from_millis(5600));

        // Completion fires exactly once
        assert_eq!(events.next().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_steps_are_monotonic_across_stream() {
        let mut events = Box::pin(choreograph(ChoreographyTiming::default()));
        let mut previous = statuses(Choreography::new().steps());

        while let Some(event) = events.next().await {
            if let ChoreographyEvent::Advanced(steps) = event {
                let current = statuses(&steps);
                for (before, after) in previous.iter().zip(current.iter()) {
                    let rank = |s: &StepStatus| match s {
                        StepStatus::Pending => 0,
                        StepStatus::Active => 1,
                        StepStatus::Completed => 2,
                    };
                    assert!(rank(after) >= rank(before));
                }
                previous = current;
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_before_last_tick_never_completes() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let run = tokio::spawn(async move {
            let mut events = Box::pin(choreograph(ChoreographyTiming::default()));
            while let Some(event) = events.next().await {
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        // Let three ticks through, then tear the screen down
        for _ in 0..3 {
            assert!(matches!(rx.recv().await, Some(ChoreographyEvent::Advanced(_))));
        }
        run.abort();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_during_settle_never_completes() {
        let mut events = Box::pin(choreograph(ChoreographyTiming::default()));
        for _ in 0..4 {
            assert!(matches!(events.next().await, Some(ChoreographyEvent::Advanced(_))));
        }

        let pending = tokio::time::timeout(Duration::from_millis(500), events.next()).await;
        assert!(pending.is_err());
        drop(events);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_timing() {
        let timing = ChoreographyTiming {
            step_interval: Duration::from_millis(100),
            completion_delay: Duration::from_millis(50),
        };
        let start = Instant::now();
        let events: Vec<_> = choreograph(timing).collect().await;

        assert_eq!(events.len(), 5);
        assert_eq!(events.last(), Some(&ChoreographyEvent::Completed));
        assert_near(start.elapsed(), Duration::from_millis(450));
    }
}
