// Cell-indexed energy deposition tally.
//
// Workers add concurrently during a step and readers only look after the
// step barrier, so the accumulator needs nothing stronger than relaxed
// atomic adds. Values are f64 bit patterns stored in AtomicU64 cells; the
// addition itself is a compare-and-swap loop, which also covers targets
// without a native floating-point fetch-add.

use std::sync::atomic::{AtomicU64, Ordering};

/// Accumulated energy deposition per local mesh cell.
#[derive(Debug)]
pub struct EnergyTally {
    nx: usize,
    ny: usize,
    cells: Vec<AtomicU64>,
}

impl EnergyTally {
    /// Zeroed tally over an `nx × ny` local tile.
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut cells = Vec::with_capacity(nx * ny);
        // 0u64 is the bit pattern of 0.0f64
        cells.resize_with(nx * ny, || AtomicU64::new(0));
        Self { nx, ny, cells }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Atomically add `delta` to cell `(cellx, celly)` in local coordinates.
    #[inline]
    pub fn add(&self, cellx: usize, celly: usize, delta: f64) {
        let cell = &self.cells[celly * self.nx + cellx];
        let mut current = cell.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match cell.compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
    }

    /// Deposition accumulated in cell `(cellx, celly)`.
    pub fn get(&self, cellx: usize, celly: usize) -> f64 {
        f64::from_bits(self.cells[celly * self.nx + cellx].load(Ordering::Relaxed))
    }

    /// Total deposition over the tile.
    pub fn sum(&self) -> f64 {
        self.cells
            .iter()
            .map(|c| f64::from_bits(c.load(Ordering::Relaxed)))
            .sum()
    }

    /// Snapshot of the tile in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.cells
            .iter()
            .map(|c| f64::from_bits(c.load(Ordering::Relaxed)))
            .collect()
    }

    /// Zero every cell.
    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(0, Ordering::Relaxed);
        }
    }
}
