//! Engine Concurrency Gate
//!
//! Bounds how many recognitions run at once against the shared engine.
//!
//! # Design
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                         EngineGate                             │
//! │                                                                │
//! │  acquire() ──► [active < max?] ──no──► wait on condvar         │
//! │                      │ yes                                     │
//! │                [active++, peak]                                │
//! │                      ▼                                         │
//! │                 GatePermit ──► engine.recognize()              │
//! │                      ▼                                         │
//! │                 drop(permit) ──► [active--, completed++]       │
//! │                                  notify one waiter             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A gate of size 1 fully serializes the engine.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::{DetectionGroup, OcrEngine};
use crate::ocr::OcrError;

#[derive(Debug, Default)]
struct GateState {
    active: usize,
    peak: usize,
    completed: usize,
}

/// Counting gate for blocking engine calls
pub struct EngineGate {
    state: Mutex<GateState>,
    released: Condvar,
    max_active: usize,
}

impl EngineGate {
    /// Create a gate admitting `max_active` callers (at least one).
    pub fn new(max_active: usize) -> Self {
        Self {
            state: Mutex::new(GateState::default()),
            released: Condvar::new(),
            max_active: max_active.max(1),
        }
    }

    /// Block until a slot is free. The slot is released when the permit drops.
    pub fn acquire(&self) -> GatePermit<'_> {
        let mut state = self.state.lock();
        while state.active >= self.max_active {
            self.released.wait(&mut state);
        }
        state.active += 1;
        state.peak = state.peak.max(state.active);

        GatePermit { gate: self }
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.active -= 1;
        state.completed += 1;
        drop(state);
        self.released.notify_one();
    }

    /// Get gate statistics
    pub fn stats(&self) -> GateStats {
        let state = self.state.lock();
        GateStats {
            active: state.active,
            peak: state.peak,
            completed: state.completed,
            max_active: self.max_active,
        }
    }
}

/// RAII guard - frees the slot on drop
pub struct GatePermit<'a> {
    gate: &'a EngineGate,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// Gate statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateStats {
    /// Calls currently inside the engine
    pub active: usize,
    /// Highest concurrent count observed
    pub peak: usize,
    /// Calls finished, successfully or not
    pub completed: usize,
    pub max_active: usize,
}

/// An engine whose calls pass through an [`EngineGate`]
pub struct GatedEngine {
    inner: Arc<dyn OcrEngine>,
    gate: EngineGate,
}

impl GatedEngine {
    pub fn new(inner: Arc<dyn OcrEngine>, max_active: usize) -> Self {
        Self {
            inner,
            gate: EngineGate::new(max_active),
        }
    }

    pub fn stats(&self) -> GateStats {
        self.gate.stats()
    }
}

impl OcrEngine for GatedEngine {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn recognize(&self, image: &Path) -> Result<Vec<DetectionGroup>, OcrError> {
        let _permit = self.gate.acquire();
        self.inner.recognize(image)
    }
}
