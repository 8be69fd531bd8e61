//! Counters published by the interrupt handlers
//!
//! Each handler keeps its own counts and stores a copy here. Plain stores
//! only, so the handlers never take a critical section.

use portable_atomic::{AtomicU32, Ordering};

use ledbridge_core::SlaveStats;

static PASSES: AtomicU32 = AtomicU32::new(0);
static TRANSACTIONS: AtomicU32 = AtomicU32::new(0);
static STORED: AtomicU32 = AtomicU32::new(0);
static DROPPED: AtomicU32 = AtomicU32::new(0);
static SENT: AtomicU32 = AtomicU32::new(0);
static BUS_ERRORS: AtomicU32 = AtomicU32::new(0);

/// Point-in-time copy of every counter
#[derive(Debug, Clone, Copy, Default, defmt::Format)]
pub struct Snapshot {
    /// Frames sent to the strip
    pub passes: u32,
    /// Bus transactions addressed to us
    pub transactions: u32,
    /// Bytes written into the frame
    pub stored: u32,
    /// Bytes accepted but not stored
    pub dropped: u32,
    /// Bytes returned to reads
    pub sent: u32,
    /// Bus errors cleared
    pub bus_errors: u32,
}

impl Snapshot {
    /// Frames sent since `earlier`
    pub fn passes_since(&self, earlier: &Snapshot) -> u32 {
        self.passes.wrapping_sub(earlier.passes)
    }
}

/// Output side: completed frame passes
#[inline]
pub fn publish_passes(passes: u32) {
    PASSES.store(passes, Ordering::Relaxed);
}

/// Bus side: slave counters
#[inline]
pub fn publish_slave(stats: &SlaveStats) {
    TRANSACTIONS.store(stats.transactions, Ordering::Relaxed);
    STORED.store(stats.stored, Ordering::Relaxed);
    DROPPED.store(stats.dropped, Ordering::Relaxed);
    SENT.store(stats.sent, Ordering::Relaxed);
}

/// Bus side: error count
#[inline]
pub fn publish_bus_errors(count: u32) {
    BUS_ERRORS.store(count, Ordering::Relaxed);
}

/// Read every counter
pub fn snapshot() -> Snapshot {
    Snapshot {
        passes: PASSES.load(Ordering::Relaxed),
        transactions: TRANSACTIONS.load(Ordering::Relaxed),
        stored: STORED.load(Ordering::Relaxed),
        dropped: DROPPED.load(Ordering::Relaxed),
        sent: SENT.load(Ordering::Relaxed),
        bus_errors: BUS_ERRORS.load(Ordering::Relaxed),
    }
}
