//! LED streaming jobs
//!
//! A job keeps one indicator lit on one target by re-sending the LED-on
//! frame every few ticks. Each channel has a fixed slot table scanned
//! round-robin, so every due job gets a turn before any repeats.
//!
//! The host link starts and stops jobs; the tick emits them. Slots are
//! atomics so neither side takes a lock.

use portable_atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use crate::config::MIN_PERIOD_TICKS;
use crate::scheduler::state::is_due;

const ACTIVE: u32 = 1 << 16;

const fn pack(target: u8, indicator: u8) -> u32 {
    ACTIVE | ((indicator as u32) << 8) | target as u32
}

/// An active job handed to the emitter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Job {
    pub target: u8,
    pub indicator: u8,
}

impl Job {
    fn from_meta(meta: u32) -> Option<Self> {
        if meta & ACTIVE == 0 {
            return None;
        }
        Some(Self {
            target: meta as u8,
            indicator: (meta >> 8) as u8,
        })
    }
}

/// Result of [`JobTable::start`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StartOutcome {
    /// Job placed in a free slot
    Started,
    /// Identical job already running
    AlreadyRunning,
    /// No free slot; the request was discarded
    Dropped,
}

struct JobSlot {
    meta: AtomicU32,
    next_allowed: AtomicU32,
}

impl JobSlot {
    const fn new() -> Self {
        Self {
            meta: AtomicU32::new(0),
            next_allowed: AtomicU32::new(0),
        }
    }

    fn job(&self) -> Option<Job> {
        Job::from_meta(self.meta.load(Ordering::Acquire))
    }

    /// Deactivate if still holding `meta`
    fn retire(&self, meta: u32) -> bool {
        self.meta
            .compare_exchange(meta, 0, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Fixed table of `N` job slots
pub struct JobTable<const N: usize> {
    slots: [JobSlot; N],
    cursor: AtomicUsize,
    streaming: AtomicBool,
}

impl<const N: usize> Default for JobTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> JobTable<N> {
    pub const fn new() -> Self {
        Self {
            slots: [const { JobSlot::new() }; N],
            cursor: AtomicUsize::new(0),
            streaming: AtomicBool::new(false),
        }
    }

    /// Start showing `indicator` on `target`
    pub fn start(&self, target: u8, indicator: u8, now: u32) -> StartOutcome {
        let meta = pack(target, indicator);
        if self
            .slots
            .iter()
            .any(|slot| slot.meta.load(Ordering::Acquire) == meta)
        {
            return StartOutcome::AlreadyRunning;
        }

        for slot in &self.slots {
            if slot.meta.load(Ordering::Acquire) != 0 {
                continue;
            }
            slot.next_allowed.store(now, Ordering::Release);
            if slot
                .meta
                .compare_exchange(0, meta, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return StartOutcome::Started;
            }
        }
        StartOutcome::Dropped
    }

    /// Stop every job showing `indicator`; returns how many stopped
    pub fn stop_by_indicator(&self, indicator: u8) -> usize {
        self.retire_where(|job| job.indicator == indicator)
    }

    /// Stop every job
    pub fn stop_all(&self) -> usize {
        self.retire_where(|_| true)
    }

    /// Stop jobs on `target` showing anything other than `keep`
    pub fn remove_by_target_except(&self, target: u8, keep: u8) -> usize {
        self.retire_where(|job| job.target == target && job.indicator != keep)
    }

    fn retire_where(&self, mut pred: impl FnMut(&Job) -> bool) -> usize {
        let mut stopped = 0;
        for slot in &self.slots {
            let meta = slot.meta.load(Ordering::Acquire);
            if let Some(job) = Job::from_meta(meta) {
                if pred(&job) && slot.retire(meta) {
                    stopped += 1;
                }
            }
        }
        stopped
    }

    pub fn any_active(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.meta.load(Ordering::Acquire) & ACTIVE != 0)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.job().is_some()).count()
    }

    /// True when the last [`emit_one`](Self::emit_one) scan found an active job
    pub fn is_streaming(&self) -> bool {
        self.streaming.load(Ordering::Acquire)
    }

    /// Emit at most one due job, starting at the round-robin cursor
    ///
    /// Returns true when `emit` was called.
    pub fn emit_one(&self, now: u32, mut emit: impl FnMut(Job)) -> bool {
        if !self.any_active() {
            self.streaming.store(false, Ordering::Release);
            return false;
        }
        self.streaming.store(true, Ordering::Release);

        let start = self.cursor.load(Ordering::Acquire) % N;
        for offset in 0..N {
            let index = (start + offset) % N;
            let slot = &self.slots[index];
            let Some(job) = slot.job() else {
                continue;
            };
            if !is_due(now, slot.next_allowed.load(Ordering::Acquire)) {
                continue;
            }

            emit(job);
            slot.next_allowed
                .store(now.wrapping_add(MIN_PERIOD_TICKS), Ordering::Release);
            self.cursor.store((index + 1) % N, Ordering::Release);
            return true;
        }
        false
    }
}
