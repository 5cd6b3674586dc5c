//! Per-lane gain with mute and solo

#[derive(Debug, Clone, Copy)]
pub(super) struct LaneGain {
    /// Volume when neither muted nor silenced by a solo
    pub base: f32,
    pub muted: bool,
    pub soloed: bool,
}

impl LaneGain {
    pub fn new(base: f32) -> Self {
        Self {
            base: base.clamp(0.0, 1.0),
            muted: false,
            soloed: false,
        }
    }

    /// Volume to send to the engine
    ///
    /// A soloed lane silences every lane that is not soloed itself.
    pub fn effective(&self, other_soloed: bool) -> f32 {
        if self.muted || (other_soloed && !self.soloed) {
            0.0
        } else {
            self.base
        }
    }
}
