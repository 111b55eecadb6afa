// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Open-addressing storage for uniq sketch values.

use crate::error::Error;
use crate::uniq::MAX_BUFFER_SIZE_DEGREE;
use crate::uniq::MIN_SIZE_DEGREE;

/// A power-of-two array of 32-bit slots used as a linear-probing hash set.
///
/// Slot value `0` marks an empty slot, so the value zero is never stored here.
/// A value's home slot is given by its top `size_degree` bits, which keeps
/// placement independent of the low bits consumed by the sampling filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SketchBuffer {
    size_degree: u8,
    num_occupied: usize,
    slots: Vec<u32>,
}

impl SketchBuffer {
    /// Allocates an empty buffer of `1 << size_degree` slots.
    pub fn new(size_degree: u8) -> Result<Self, Error> {
        ensure_size_degree(size_degree)?;
        Ok(Self {
            size_degree,
            num_occupied: 0,
            slots: alloc_slots(1 << size_degree)?,
        })
    }

    /// Allocates a small buffer the way `Vec` does, aborting on exhaustion.
    pub(crate) fn zeroed(size_degree: u8) -> Self {
        debug_assert!((MIN_SIZE_DEGREE..=MAX_BUFFER_SIZE_DEGREE).contains(&size_degree));
        Self {
            size_degree,
            num_occupied: 0,
            slots: vec![0; 1 << size_degree],
        }
    }

    /// Clears this buffer and resizes it to `1 << size_degree` slots.
    ///
    /// The backing storage is reused when its capacity suffices; otherwise it is
    /// released and a fresh buffer is returned in its place.
    pub fn reset_or_reallocate(mut self, size_degree: u8) -> Result<Self, Error> {
        ensure_size_degree(size_degree)?;
        if self.try_reset(size_degree) {
            Ok(self)
        } else {
            drop(self);
            Self::new(size_degree)
        }
    }

    /// Clears in place if the storage can hold `1 << size_degree` slots.
    pub(crate) fn try_reset(&mut self, size_degree: u8) -> bool {
        let len = 1usize << size_degree;
        if self.slots.capacity() < len {
            return false;
        }
        self.slots.clear();
        self.slots.resize(len, 0);
        self.size_degree = size_degree;
        self.num_occupied = 0;
        true
    }

    /// Returns log2 of the number of slots.
    pub fn size_degree(&self) -> u8 {
        self.size_degree
    }

    /// Returns the number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no slot is occupied.
    pub fn is_empty(&self) -> bool {
        self.num_occupied == 0
    }

    /// Returns the number of occupied slots.
    pub fn num_occupied(&self) -> usize {
        self.num_occupied
    }

    /// Returns the largest occupancy allowed before the buffer must grow.
    pub fn max_fill(&self) -> usize {
        1 << (self.size_degree - 1)
    }

    /// Returns the raw slots, empty ones included.
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    /// Returns an iterator over the stored values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().copied().filter(|&slot| slot != 0)
    }

    /// Returns true if `value` is stored.
    pub fn contains(&self, value: u32) -> bool {
        value != 0 && self.slots[self.probe(value)] == value
    }

    /// Places `value` without any filtering or growth.
    ///
    /// Returns false if the value was already present. The caller guarantees a
    /// free slot exists.
    pub fn reinsert(&mut self, value: u32) -> bool {
        debug_assert_ne!(value, 0, "zero is the empty slot marker");
        let index = self.probe(value);
        if self.slots[index] == value {
            return false;
        }
        self.slots[index] = value;
        self.num_occupied += 1;
        true
    }

    /// Moves every value accepted by `keep` into fresh storage of
    /// `1 << size_degree` slots, dropping the rest.
    ///
    /// On allocation failure the buffer is left untouched.
    pub(crate) fn rebuild(
        &mut self,
        size_degree: u8,
        keep: impl Fn(u32) -> bool,
    ) -> Result<(), Error> {
        ensure_size_degree(size_degree)?;
        let fresh = alloc_slots(1 << size_degree)?;
        let old = std::mem::replace(&mut self.slots, fresh);
        self.size_degree = size_degree;
        self.num_occupied = 0;
        for value in old {
            if value != 0 && keep(value) {
                self.reinsert(value);
            }
        }
        Ok(())
    }

    fn place(&self, value: u32) -> usize {
        (value >> (32 - u32::from(self.size_degree))) as usize
    }

    /// Returns the slot holding `value`, or the empty slot where it belongs.
    fn probe(&self, value: u32) -> usize {
        let mask = self.slots.len() - 1;
        let mut index = self.place(value);
        let mut drift = 0usize;
        while self.slots[index] != 0 && self.slots[index] != value {
            index = (index + 1) & mask;
            drift += 1;
            debug_assert!(drift < self.slots.len(), "no free slot for {value}");
        }
        index
    }
}

fn ensure_size_degree(size_degree: u8) -> Result<(), Error> {
    if (MIN_SIZE_DEGREE..=MAX_BUFFER_SIZE_DEGREE).contains(&size_degree) {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "size degree must be in [{MIN_SIZE_DEGREE}, {MAX_BUFFER_SIZE_DEGREE}], got {size_degree}"
        )))
    }
}

fn alloc_slots(len: usize) -> Result<Vec<u32>, Error> {
    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|_| Error::resource_exhausted("sketch buffer", len))?;
    slots.resize(len, 0);
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = SketchBuffer::new(4).unwrap();
        assert_eq!(buffer.len(), 16);
        assert_eq!(buffer.max_fill(), 8);
        assert!(buffer.is_empty());
        assert!(buffer.slots().iter().all(|&slot| slot == 0));
    }

    #[test]
    fn test_size_degree_out_of_range() {
        let err = SketchBuffer::new(3).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = SketchBuffer::new(MAX_BUFFER_SIZE_DEGREE + 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_reinsert_dedups() {
        let mut buffer = SketchBuffer::new(4).unwrap();
        assert!(buffer.reinsert(7));
        assert!(!buffer.reinsert(7));
        assert!(buffer.reinsert(0x8000_0000));
        assert_eq!(buffer.num_occupied(), 2);
        assert!(buffer.contains(7));
        assert!(buffer.contains(0x8000_0000));
        assert!(!buffer.contains(8));
        assert!(!buffer.contains(0));
    }

    #[test]
    fn test_collisions_probe_linearly() {
        let mut buffer = SketchBuffer::new(4).unwrap();
        // same top four bits, so the same home slot
        for value in 1..=5u32 {
            assert!(buffer.reinsert(value));
        }
        assert_eq!(buffer.slots()[..6], [1u32, 2, 3, 4, 5, 0]);
        for value in 1..=5u32 {
            assert!(buffer.contains(value));
        }
    }

    #[test]
    fn test_probe_wraps_around() {
        let mut buffer = SketchBuffer::new(4).unwrap();
        assert!(buffer.reinsert(0xf000_0001));
        assert!(buffer.reinsert(0xf000_0002));
        assert_eq!(buffer.slots()[15], 0xf000_0001);
        assert_eq!(buffer.slots()[0], 0xf000_0002);
        assert!(buffer.contains(0xf000_0002));
    }

    #[test]
    fn test_rebuild_filters_and_grows() {
        let mut buffer = SketchBuffer::new(4).unwrap();
        for value in [2u32, 3, 4, 0x4000_0000, 0x4000_0001] {
            buffer.reinsert(value);
        }
        buffer.rebuild(5, |value| value & 1 == 0).unwrap();
        assert_eq!(buffer.size_degree(), 5);
        assert_eq!(buffer.len(), 32);
        let mut values: Vec<u32> = buffer.iter().collect();
        values.sort_unstable();
        assert_eq!(values, vec![2, 4, 0x4000_0000]);
        assert_eq!(buffer.num_occupied(), 3);
    }

    #[test]
    fn test_reset_or_reallocate_reuses_storage() {
        let mut buffer = SketchBuffer::new(6).unwrap();
        buffer.reinsert(42);
        let ptr = buffer.slots().as_ptr();

        let buffer = buffer.reset_or_reallocate(5).unwrap();
        assert_eq!(buffer.len(), 32);
        assert!(buffer.is_empty());
        assert!(buffer.slots().iter().all(|&slot| slot == 0));
        assert_eq!(buffer.slots().as_ptr(), ptr);

        let buffer = buffer.reset_or_reallocate(8).unwrap();
        assert_eq!(buffer.len(), 256);
        assert_eq!(buffer.size_degree(), 8);
    }
}
