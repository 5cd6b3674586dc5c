//! Drag-event coalescing
//!
//! Drag enter/leave notifications arrive in bursts (one per element or per
//! hovered file). The coalescer folds them into a single "a file is being
//! dragged over the drop target" flag.

/// Counts unmatched drag-enter events
///
/// The flag is active whenever the counter is above zero. A drop or an
/// external reset forces it back to zero, since a missed leave would
/// otherwise leave the flag stuck.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragCoalescer {
    counter: u32,
}

impl DragCoalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a drag-enter
    pub fn enter(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }

    /// Register a drag-leave
    ///
    /// Returns true when this leave brought the counter back to zero.
    pub fn leave(&mut self) -> bool {
        if self.counter == 0 {
            return false;
        }
        self.counter -= 1;
        self.counter == 0
    }

    /// Force the counter to zero (drop, cancel, session reset)
    pub fn reset(&mut self) {
        self.counter = 0;
    }

    /// Whether a drag is currently over the target
    pub fn is_active(&self) -> bool {
        self.counter > 0
    }

    /// Current net enter count
    pub fn depth(&self) -> u32 {
        self.counter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nested_enter_leave() {
        let mut drag = DragCoalescer::new();
        drag.enter(); // root
        drag.enter(); // child
        assert!(drag.is_active());

        // Leaving the root into the child keeps the drag alive
        assert!(!drag.leave());
        assert!(drag.is_active());

        assert!(drag.leave());
        assert!(!drag.is_active());
    }

    #[test]
    fn test_leave_without_enter_saturates() {
        let mut drag = DragCoalescer::new();
        assert!(!drag.leave());
        assert_eq!(drag.depth(), 0);
        assert!(!drag.is_active());
    }

    #[test]
    fn test_reset_clears_stuck_counter() {
        let mut drag = DragCoalescer::new();
        for _ in 0..5 {
            drag.enter();
        }
        drag.leave();
        drag.reset();
        assert_eq!(drag.depth(), 0);
        assert!(!drag.is_active());
    }

    proptest! {
        /// The flag is active exactly when unmatched enters remain
        #[test]
        fn prop_flag_tracks_net_count(ops in prop::collection::vec(any::<bool>(), 0..128)) {
            let mut drag = DragCoalescer::new();
            let mut net: u32 = 0;

            for enter in ops {
                if enter {
                    drag.enter();
                    net += 1;
                } else {
                    let emptied = drag.leave();
                    prop_assert_eq!(emptied, net == 1);
                    net = net.saturating_sub(1);
                }
                prop_assert_eq!(drag.is_active(), net > 0);
                prop_assert_eq!(drag.depth(), net);
            }

            drag.reset();
            prop_assert!(!drag.is_active());
        }
    }
}
