//! Landmark identifier generation

use crate::data::LandmarkId;

/// Wall clock used to stamp new landmarks
pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// The real clock (works on wasm through `js_sys::Date`)
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hands out creation timestamps as ids, bumped by one millisecond whenever the
/// clock has not moved past the last issued (or loaded) id.
pub struct IdGenerator {
    clock: Box<dyn Clock>,
    last: Option<i64>,
}

impl IdGenerator {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self { clock, last: None }
    }

    /// Make sure future ids are greater than every id in `existing`
    pub fn observe<'a>(&mut self, existing: impl IntoIterator<Item = &'a LandmarkId>) {
        if let Some(max) = existing.into_iter().map(|id| id.0).max() {
            self.last = Some(self.last.map_or(max, |last| last.max(max)));
        }
    }

    pub fn next_id(&mut self) -> LandmarkId {
        let now = self.clock.now_millis();
        let id = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(id);
        LandmarkId(id)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Clock that only moves when told to
    #[derive(Clone)]
    pub(crate) struct FrozenClock(pub Rc<Cell<i64>>);

    impl FrozenClock {
        pub(crate) fn at(millis: i64) -> Self {
            Self(Rc::new(Cell::new(millis)))
        }
    }

    impl Clock for FrozenClock {
        fn now_millis(&self) -> i64 {
            self.0.get()
        }
    }

    #[test]
    fn test_uses_clock_when_it_advances() {
        let clock = FrozenClock::at(1_000);
        let mut ids = IdGenerator::new(Box::new(clock.clone()));

        assert_eq!(ids.next_id(), LandmarkId(1_000));
        clock.0.set(5_000);
        assert_eq!(ids.next_id(), LandmarkId(5_000));
    }

    #[test]
    fn test_same_millisecond_gets_distinct_ids() {
        let mut ids = IdGenerator::new(Box::new(FrozenClock::at(1_000)));

        let first = ids.next_id();
        let second = ids.next_id();
        assert_ne!(first, second);
        assert_eq!(second, LandmarkId(1_001));
    }

    #[test]
    fn test_observed_ids_push_generator_forward() {
        let mut ids = IdGenerator::new(Box::new(FrozenClock::at(1_000)));
        ids.observe(&[LandmarkId(3), LandmarkId(9_000), LandmarkId(20)]);

        assert_eq!(ids.next_id(), LandmarkId(9_001));
    }

    #[test]
    fn test_system_clock_is_after_2020() {
        assert!(SystemClock.now_millis() > 1_577_836_800_000);
    }
}
