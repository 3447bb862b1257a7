use super::Edge;

/// Settled level of an input sampled after its debounce delay.
///
/// Bounces that return to the previous level produce `changed == false`,
/// which the edge handler ignores.
#[derive(Clone, Copy, Debug)]
pub struct DebouncedLevel {
    stable: bool,
}

impl DebouncedLevel {
    pub const fn new(initial: bool) -> Self {
        Self { stable: initial }
    }

    /// Feed a post-debounce sample; returns `(level, changed)`.
    pub fn settle(&mut self, sample: bool) -> (bool, bool) {
        let changed = Edge::between(self.stable, sample).is_some();
        self.stable = sample;
        (sample, changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_change_once() {
        let mut level = DebouncedLevel::new(false);
        assert_eq!(level.settle(true), (true, true));
        assert_eq!(level.settle(true), (true, false));
        assert_eq!(level.settle(false), (false, true));
        assert_eq!(level.settle(false), (false, false));
    }

    #[test]
    fn bounce_back_is_not_a_change() {
        let mut level = DebouncedLevel::new(true);
        assert_eq!(level.settle(true), (true, false));
    }

    #[test]
    fn settle_agrees_with_edge_table() {
        for (previous, sample) in [(false, false), (false, true), (true, false), (true, true)] {
            let mut level = DebouncedLevel::new(previous);
            let (settled, changed) = level.settle(sample);
            assert_eq!(settled, sample);
            assert_eq!(changed, Edge::between(previous, sample).is_some());
            assert_eq!(Edge::classify(settled, changed), Edge::between(previous, sample));
        }
    }
}
