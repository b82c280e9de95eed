//! Transmit queues
//!
//! Fixed-capacity rings of fixed-size frames. The tick context owns the
//! producer half and the main loop owns the consumer half, so no lock is
//! ever taken. Pushes that cannot be stored are refused and counted; queued
//! frames are never overwritten.

use heapless::spsc::{Consumer, Producer, Queue};
use portable_atomic::{AtomicU32, Ordering};

use crate::config::{PIXEL_TXQ_SLOTS, PIXEL_TX_FRAME, SLAVE_TXQ_SLOTS, SLAVE_TX_FRAME};

/// Reasons a push was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QueueError {
    /// Every usable slot holds an unread frame
    Full,
    /// Frame is larger than a slot
    Oversize,
}

/// One queued frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxFrame<const F: usize> {
    data: [u8; F],
    len: usize,
}

impl<const F: usize> TxFrame<F> {
    /// Copy `bytes` into a slot-sized frame
    pub fn from_slice(bytes: &[u8]) -> Result<Self, QueueError> {
        if bytes.len() > F {
            return Err(QueueError::Oversize);
        }
        let mut data = [0u8; F];
        data[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            data,
            len: bytes.len(),
        })
    }

    /// Frame bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Backing storage for one transmit channel
///
/// `N` is the slot count; one slot stays free, so `N - 1` frames fit.
pub struct TxQueue<const F: usize, const N: usize> {
    queue: Queue<TxFrame<F>, N>,
    drops: AtomicU32,
}

impl<const F: usize, const N: usize> Default for TxQueue<F, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const F: usize, const N: usize> TxQueue<F, N> {
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
            drops: AtomicU32::new(0),
        }
    }

    /// Frames the queue can hold at once
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Split into the producer and consumer halves
    pub fn split(&mut self) -> (TxProducer<'_, F, N>, TxConsumer<'_, F, N>) {
        let drops = &self.drops;
        let (producer, consumer) = self.queue.split();
        (
            TxProducer {
                inner: producer,
                drops,
            },
            TxConsumer {
                inner: consumer,
                drops,
            },
        )
    }
}

/// Producer half, owned by the tick context
pub struct TxProducer<'a, const F: usize, const N: usize> {
    inner: Producer<'a, TxFrame<F>, N>,
    drops: &'a AtomicU32,
}

impl<'a, const F: usize, const N: usize> TxProducer<'a, F, N> {
    /// Queue a copy of `bytes`
    ///
    /// On failure the drop counter is incremented and the queue is left as it
    /// was.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), QueueError> {
        let frame = match TxFrame::from_slice(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                self.drops.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };
        self.inner.enqueue(frame).map_err(|_| {
            self.drops.fetch_add(1, Ordering::Relaxed);
            QueueError::Full
        })
    }

    pub fn is_full(&self) -> bool {
        !self.inner.ready()
    }

    /// Frames refused so far
    pub fn drops(&self) -> u32 {
        self.drops.load(Ordering::Relaxed)
    }
}

/// Consumer half, owned by the main loop
pub struct TxConsumer<'a, const F: usize, const N: usize> {
    inner: Consumer<'a, TxFrame<F>, N>,
    drops: &'a AtomicU32,
}

impl<'a, const F: usize, const N: usize> TxConsumer<'a, F, N> {
    /// Oldest queued frame, if any
    pub fn pop(&mut self) -> Option<TxFrame<F>> {
        self.inner.dequeue()
    }

    pub fn is_empty(&self) -> bool {
        !self.inner.ready()
    }

    /// Frames waiting to be sent
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Frames refused so far
    pub fn drops(&self) -> u32 {
        self.drops.load(Ordering::Relaxed)
    }
}

/// Slave-link queue storage
pub type SlaveTxQueue = TxQueue<SLAVE_TX_FRAME, SLAVE_TXQ_SLOTS>;
/// Slave-link producer
pub type SlaveProducer<'a> = TxProducer<'a, SLAVE_TX_FRAME, SLAVE_TXQ_SLOTS>;
/// Slave-link consumer
pub type SlaveConsumer<'a> = TxConsumer<'a, SLAVE_TX_FRAME, SLAVE_TXQ_SLOTS>;

/// Pixel-strip queue storage
pub type PixelTxQueue = TxQueue<PIXEL_TX_FRAME, PIXEL_TXQ_SLOTS>;
/// Pixel-strip producer
pub type PixelProducer<'a> = TxProducer<'a, PIXEL_TX_FRAME, PIXEL_TXQ_SLOTS>;
/// Pixel-strip consumer
pub type PixelConsumer<'a> = TxConsumer<'a, PIXEL_TX_FRAME, PIXEL_TXQ_SLOTS>;
