//! Growable table of normalized parameter values with a global dirty flag.

/*
Parameter Store
===============

The store is a flat array of floats indexed by parameter id. Every value is
normalized to [0.0, 1.0]; scaling into Hz, milliseconds or enum ordinals is
the job of the module that reads it (see `params::scale`).

    id:     0     1     2     3    ...   capacity-1
          ┌─────┬─────┬─────┬─────┬─────┬─────┐
          │0.50 │0.00 │1.00 │0.25 │ ... │0.00 │
          └─────┴─────┴─────┴─────┴─────┴─────┘
                                       dirty = true

Writes set `dirty`; the scheduler checks it once per block and, if set,
clears it and asks the instrument to re-read everything. A burst of CC
messages inside one block therefore costs one recompute.

Growth
------

Writing past the end grows the table to max(id + 1, 2 × capacity), rounded up
to the allocation block and capped at a hard ceiling. Writes beyond the
ceiling are dropped. Growth happens on the control path (patch load, CC
handling) which runs inside the audio task, so it is bounded and rare.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sizing policy for [`ParamStore`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamStoreConfig {
    /// Initial capacity and growth granularity.
    pub alloc_block: usize,
    /// Hard ceiling on capacity.
    pub max_capacity: usize,
    /// Grow on out-of-range writes. When false those writes are dropped.
    pub auto_grow: bool,
}

impl Default for ParamStoreConfig {
    fn default() -> Self {
        Self {
            alloc_block: 64,
            max_capacity: 256,
            auto_grow: true,
        }
    }
}

pub struct ParamStore {
    values: Vec<f32>,
    dirty: bool,
    config: ParamStoreConfig,
}

impl ParamStore {
    pub fn new(config: ParamStoreConfig) -> Self {
        let initial = config.alloc_block.min(config.max_capacity);
        Self {
            values: vec![0.0; initial],
            dirty: false,
            config,
        }
    }

    /// Store a normalized value.
    ///
    /// # Panics
    /// Panics if `value` is outside [0.0, 1.0]. That is a programming error
    /// in the caller, not a runtime condition.
    pub fn set(&mut self, id: impl Into<u16>, value: f32) {
        assert!(
            (0.0..=1.0).contains(&value),
            "parameter value {value} outside [0, 1]"
        );

        let index = id.into() as usize;
        if index >= self.values.len() && !self.grow_to_fit(index) {
            return;
        }

        self.values[index] = value;
        self.dirty = true;
    }

    /// Store a 7-bit controller value as `value / 127`.
    ///
    /// # Panics
    /// Panics if `value` exceeds 127.
    pub fn set_from_midi(&mut self, id: impl Into<u16>, value: u8) {
        assert!(value <= 127, "MIDI value {value} exceeds 127");
        self.set(id, value as f32 / 127.0);
    }

    /// Read a value. Unknown ids read as 0.0.
    #[inline]
    pub fn get(&self, id: impl Into<u16>) -> f32 {
        self.values.get(id.into() as usize).copied().unwrap_or(0.0)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag, returning whether it was set.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Zero every slot and clear the dirty flag. Capacity is kept.
    pub fn reset(&mut self) {
        self.values.fill(0.0);
        self.dirty = false;
    }

    fn grow_to_fit(&mut self, index: usize) -> bool {
        if !self.config.auto_grow || index >= self.config.max_capacity {
            return false;
        }

        let block = self.config.alloc_block.max(1);
        let wanted = (index + 1).max(self.values.len() * 2);
        let rounded = wanted.div_ceil(block) * block;
        let new_len = rounded.min(self.config.max_capacity);

        self.values.resize(new_len, 0.0);
        true
    }
}

impl Default for ParamStore {
    fn default() -> Self {
        Self::new(ParamStoreConfig::default())
    }
}
