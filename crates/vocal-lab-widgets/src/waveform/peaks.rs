//! Peak reduction for bar waveforms
//!
//! Audio is reduced once to a fixed number of absolute peaks, then resampled
//! to however many bars fit the canvas width at draw time.

/// Peak columns computed per decoded file
pub const DEFAULT_RESOLUTION: usize = 1024;

/// Absolute peak heights in 0.0..=1.0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformPeaks {
    peaks: Vec<f32>,
}

impl WaveformPeaks {
    /// No peaks yet
    pub const EMPTY: Self = Self { peaks: Vec::new() };

    /// Reduce mono samples to `resolution` peak columns
    ///
    /// With `normalize` the loudest column is scaled to 1.0; otherwise peaks
    /// are only clamped. Silence stays flat either way.
    pub fn from_samples(mono: &[f32], resolution: usize, normalize: bool) -> Self {
        if mono.is_empty() || resolution == 0 {
            return Self::default();
        }

        let columns = resolution.min(mono.len());
        let mut peaks: Vec<f32> = (0..columns)
            .map(|col| {
                let start = col * mono.len() / columns;
                let end = ((col + 1) * mono.len() / columns).max(start + 1);
                mono[start..end]
                    .iter()
                    .fold(0.0f32, |peak, s| peak.max(s.abs()))
            })
            .collect();

        let loudest = peaks.iter().copied().fold(0.0f32, f32::max);
        if normalize && loudest > f32::EPSILON {
            for peak in &mut peaks {
                *peak /= loudest;
            }
        }
        for peak in &mut peaks {
            *peak = peak.clamp(0.0, 1.0);
        }

        log::debug!(
            "WaveformPeaks: {} samples -> {} columns (loudest {:.3})",
            mono.len(),
            columns,
            loudest
        );

        Self { peaks }
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    /// Resample to `count` bars, taking the max over each bar's span
    pub fn bars(&self, count: usize) -> Vec<f32> {
        if self.peaks.is_empty() || count == 0 {
            return vec![0.0; count];
        }

        let len = self.peaks.len();
        (0..count)
            .map(|bar| {
                let start = bar * len / count;
                let end = ((bar + 1) * len / count).max(start + 1).min(len);
                self.peaks[start.min(len - 1)..end]
                    .iter()
                    .copied()
                    .fold(0.0f32, f32::max)
            })
            .collect()
    }
}
