//! Bounded single-producer / single-consumer queue of line slots
//!
//! Two free-running counters partition the slots: lines in
//! `[consumed, produced)` belong to the consumer, every other slot to the
//! producer. Only the producer stores `produced` and only the consumer
//! stores `consumed`, so no read-modify-write atomics are needed and the
//! queue works on cores without CAS.
//!
//! Counters wrap at 2^32. The capacity must be a power of two so that slot
//! indices stay continuous across the wrap.

#![allow(unsafe_code)]

use core::cell::UnsafeCell;

use portable_atomic::{AtomicU32, Ordering};

use super::{HandoffError, LineSink, LineSource};
use crate::line::Line;

/// Slot count used by the firmware
pub const DEFAULT_CAPACITY: usize = 4;

/// Bounded SPSC handoff of raster lines
///
/// Create it in static storage and [`split`](Self::split) it once into a
/// producer half for the capture path and a consumer half for the Arbiter.
pub struct LineQueue<const N: usize> {
    slots: [UnsafeCell<Line>; N],
    /// `line_count_in`, stored by the producer only
    produced: AtomicU32,
    /// `line_count_out`, stored by the consumer only
    consumed: AtomicU32,
    /// Refused publishes, stored by the producer only
    dropped: AtomicU32,
}

// SAFETY: slot access is partitioned by the counters (see module docs) and
// `split` hands out exactly one producer and one consumer.
unsafe impl<const N: usize> Sync for LineQueue<N> {}

impl<const N: usize> Default for LineQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LineQueue<N> {
    const CAPACITY_IS_POWER_OF_TWO: () = assert!(
        N >= 2 && N.is_power_of_two() && N <= (1 << 31),
        "LineQueue capacity must be a power of two, at least 2"
    );

    /// Create an empty queue with zeroed slots
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_IS_POWER_OF_TWO;
        Self {
            slots: [const { UnsafeCell::new(Line::blank()) }; N],
            produced: AtomicU32::new(0),
            consumed: AtomicU32::new(0),
            dropped: AtomicU32::new(0),
        }
    }

    /// Split into producer and consumer halves
    ///
    /// The exclusive borrow guarantees a single pair of halves exists.
    pub fn split(&mut self) -> (LineProducer<'_, N>, LineConsumer<'_, N>) {
        let queue: &Self = self;
        (LineProducer { queue }, LineConsumer { queue })
    }

    /// Number of line slots
    pub const fn capacity(&self) -> usize {
        N
    }

    fn slot(&self, count: u32) -> &UnsafeCell<Line> {
        &self.slots[count as usize % N]
    }
}

/// Producer half, owned by the capture path
pub struct LineProducer<'a, const N: usize> {
    queue: &'a LineQueue<N>,
}

impl<'a, const N: usize> LineProducer<'a, N> {
    /// Fill the next free slot in place and publish it
    ///
    /// `fill` receives the slot as left by its previous line; it must write
    /// every byte it cares about. The produced counter is only advanced after
    /// `fill` returns. When every slot is outstanding the line is refused,
    /// counted as dropped, and `fill` is not called.
    pub fn try_publish_with<F>(&mut self, fill: F) -> Result<u32, HandoffError>
    where
        F: FnOnce(&mut Line),
    {
        let produced = self.queue.produced.load(Ordering::Relaxed);
        let consumed = self.queue.consumed.load(Ordering::Acquire);

        if produced.wrapping_sub(consumed) as usize >= N {
            let dropped = self.queue.dropped.load(Ordering::Relaxed);
            self.queue
                .dropped
                .store(dropped.wrapping_add(1), Ordering::Relaxed);
            return Err(HandoffError::Full);
        }

        // SAFETY: `produced` is outside the consumer window
        // `[consumed, produced)`, and the Acquire load above orders the
        // consumer's last read of this slot before our write.
        fill(unsafe { &mut *self.queue.slot(produced).get() });

        let next = produced.wrapping_add(1);
        self.queue.produced.store(next, Ordering::Release);
        Ok(next)
    }

    /// Check if every slot holds an undrained line
    pub fn is_full(&self) -> bool {
        let produced = self.queue.produced.load(Ordering::Relaxed);
        let consumed = self.queue.consumed.load(Ordering::Acquire);
        produced.wrapping_sub(consumed) as usize >= N
    }

    /// Lines refused because the queue was full
    pub fn dropped(&self) -> u32 {
        self.queue.dropped.load(Ordering::Relaxed)
    }
}

impl<'a, const N: usize> LineSink for LineProducer<'a, N> {
    fn publish(&mut self, line: &Line) -> Result<u32, HandoffError> {
        self.try_publish_with(|slot| *slot = *line)
    }
}

/// Consumer half, owned by the Arbiter
pub struct LineConsumer<'a, const N: usize> {
    queue: &'a LineQueue<N>,
}

impl<'a, const N: usize> LineConsumer<'a, N> {
    /// Lines the producer had to drop
    pub fn dropped(&self) -> u32 {
        self.queue.dropped.load(Ordering::Relaxed)
    }

    /// Number of line slots
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<'a, const N: usize> LineSource for LineConsumer<'a, N> {
    fn front(&self) -> Option<&Line> {
        let consumed = self.queue.consumed.load(Ordering::Relaxed);
        let produced = self.queue.produced.load(Ordering::Acquire);

        if produced == consumed {
            return None;
        }

        // SAFETY: `consumed` is inside the consumer window, the Acquire load
        // above pairs with the producer's Release store after the write, and
        // the producer cannot reuse the slot until `advance` takes `&mut self`,
        // which ends this borrow.
        Some(unsafe { &*self.queue.slot(consumed).get() })
    }

    fn advance(&mut self) -> Result<u32, HandoffError> {
        let consumed = self.queue.consumed.load(Ordering::Relaxed);
        let produced = self.queue.produced.load(Ordering::Acquire);

        if produced == consumed {
            return Err(HandoffError::Empty);
        }

        let next = consumed.wrapping_add(1);
        self.queue.consumed.store(next, Ordering::Release);
        Ok(next)
    }

    fn produced(&self) -> u32 {
        self.queue.produced.load(Ordering::Acquire)
    }

    fn consumed(&self) -> u32 {
        self.queue.consumed.load(Ordering::Relaxed)
    }
}
