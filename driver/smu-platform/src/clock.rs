use core::time::Duration;

/// A monotonic time source.
///
/// Only differences between two readings are meaningful.
pub trait MonotonicClock {
    fn now(&self) -> Duration;
}

impl<T: MonotonicClock + ?Sized> MonotonicClock for &T {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}
