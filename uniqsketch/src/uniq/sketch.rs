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

//! Uniq sketch implementation.

use tracing::debug;
use tracing::warn;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::codec::assert::ensure_fully_consumed;
use crate::codec::assert::insufficient_data;
use crate::error::Error;
use crate::hash::uniq_hash;
use crate::uniq::DEFAULT_MAX_SIZE_DEGREE;
use crate::uniq::MAX_SKIP_DEGREE;
use crate::uniq::MIN_SIZE_DEGREE;
use crate::uniq::buffer::SketchBuffer;
use crate::uniq::serialization::ITEM_BYTES;
use crate::uniq::serialization::MAX_HEADER_BYTES;
use crate::uniq::serialization::WireHeader;

/// Approximate distinct-count sketch over 32-bit hash values.
///
/// The sketch keeps every value whose low `skip_degree` bits are zero. When the
/// retained set outgrows its limit, `skip_degree` is raised by one, halving the
/// sampling rate and purging the values that no longer qualify.
///
/// See [`crate::uniq`] for an overview.
#[derive(Debug, Clone)]
pub struct UniqSketch {
    has_zero_item: bool,
    skip_degree: u8,
    items_count: u32,
    initial_size_degree: u8,
    max_size_degree: u8,
    buffer: SketchBuffer,
}

impl Default for UniqSketch {
    fn default() -> Self {
        Self::new()
    }
}

impl UniqSketch {
    /// Creates an empty sketch with the default size limits.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a new [`UniqSketchBuilder`].
    pub fn builder() -> UniqSketchBuilder {
        UniqSketchBuilder::default()
    }

    /// Returns true if the zero value has been seen.
    pub fn has_zero_item(&self) -> bool {
        self.has_zero_item
    }

    /// Returns the sampling filter strength.
    pub fn skip_degree(&self) -> u8 {
        self.skip_degree
    }

    /// Returns log2 of the buffer capacity.
    pub fn size_degree(&self) -> u8 {
        self.buffer.size_degree()
    }

    /// Returns the number of retained items, the zero item included.
    pub fn items_count(&self) -> u32 {
        self.items_count
    }

    /// Returns true if no item is retained.
    pub fn is_empty(&self) -> bool {
        self.items_count == 0
    }

    /// Returns the underlying open-addressing buffer.
    pub fn buffer(&self) -> &SketchBuffer {
        &self.buffer
    }

    /// Returns an iterator over the retained values, the zero item first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.has_zero_item
            .then_some(0)
            .into_iter()
            .chain(self.buffer.iter())
    }

    /// Returns true if `value` passes the sampling filter of the current skip degree.
    pub fn passes_filter(&self, value: u32) -> bool {
        value & skip_mask(self.skip_degree) == 0
    }

    /// Inserts a 32-bit hash value.
    ///
    /// Values rejected by the sampling filter are dropped. The buffer grows, or
    /// the filter tightens, once occupancy exceeds the load factor.
    pub fn insert(&mut self, value: u32) -> Result<(), Error> {
        if !self.passes_filter(value) {
            return Ok(());
        }
        if value == 0 {
            if !self.has_zero_item {
                self.has_zero_item = true;
                self.items_count += 1;
                self.maybe_grow()?;
            }
            return Ok(());
        }
        if self.buffer.reinsert(value) {
            self.items_count += 1;
            self.maybe_grow()?;
        }
        Ok(())
    }

    /// Hashes a raw integer and inserts the result.
    pub fn update_u64(&mut self, value: u64) -> Result<(), Error> {
        self.insert(uniq_hash(value))
    }

    /// Hashes a raw signed integer and inserts the result.
    pub fn update_i64(&mut self, value: i64) -> Result<(), Error> {
        self.update_u64(value as u64)
    }

    /// Restores the retention limit and the load factor bound after items were
    /// added.
    ///
    /// The skip degree is raised until the items fit under the retention limit,
    /// whatever the buffer size; a decoded buffer may be larger than growth
    /// would ever make it. The buffer then doubles while over-full.
    pub fn maybe_grow(&mut self) -> Result<(), Error> {
        while self.items_count as usize > self.retention_limit() {
            self.apply_filter(self.skip_degree + 1)?;
        }
        while self.items_count as usize > self.buffer.max_fill() {
            self.grow()?;
        }
        Ok(())
    }

    /// Raises the skip degree to `skip_degree` and purges the values that no
    /// longer pass the filter.
    ///
    /// Lower or equal degrees are a no-op: the filter never loosens.
    pub fn apply_filter(&mut self, skip_degree: u8) -> Result<(), Error> {
        if skip_degree <= self.skip_degree {
            return Ok(());
        }
        if skip_degree > MAX_SKIP_DEGREE {
            return Err(Error::invalid_argument(format!(
                "skip degree must be at most {MAX_SKIP_DEGREE}, got {skip_degree}"
            )));
        }
        let mask = skip_mask(skip_degree);
        let size_degree = self.buffer.size_degree();
        self.buffer.rebuild(size_degree, |value| value & mask == 0)?;
        let before = self.items_count;
        self.skip_degree = skip_degree;
        self.items_count = self.num_retained();
        debug!(
            skip_degree,
            size_degree,
            items_before = before,
            items_after = self.items_count,
            "tightened sampling filter"
        );
        Ok(())
    }

    /// Merges another sketch into this one.
    ///
    /// The result retains the union of both value sets under the stricter of the
    /// two filters. `other` is not modified.
    pub fn merge(&mut self, other: &Self) -> Result<(), Error> {
        if other.skip_degree > self.skip_degree {
            self.apply_filter(other.skip_degree)?;
        }
        if other.has_zero_item {
            self.insert(0)?;
        }
        for value in other.buffer.iter() {
            self.insert(value)?;
        }
        Ok(())
    }

    /// Returns the approximate number of distinct values seen.
    ///
    /// This is the retained count scaled by the inverse sampling rate `2^skip_degree`.
    pub fn estimate(&self) -> u64 {
        u64::from(self.num_retained()) << self.skip_degree
    }

    /// Returns [`UniqSketch::estimate`] adjusted for collisions among 32-bit hashes.
    ///
    /// Sampled sketches stand for far more values than they retain, and distinct
    /// inputs then collide in the 32-bit hash space often enough to bias the raw
    /// estimate low. Unsampled sketches are returned as is.
    pub fn corrected_estimate(&self) -> u64 {
        let raw = self.estimate();
        if self.skip_degree == 0 {
            return raw;
        }
        let p32 = (1u64 << 32) as f64;
        let n = raw as f64;
        if n >= p32 {
            return raw;
        }
        // p32 * (ln(p32) - ln(p32 - n))
        (-p32 * (-n / p32).ln_1p()).round() as u64
    }

    /// Resets the sketch to an empty state, keeping its buffer storage.
    pub fn reset(&mut self) {
        let reused = self.buffer.try_reset(self.initial_size_degree);
        debug_assert!(reused, "buffer never shrinks below its initial size");
        self.has_zero_item = false;
        self.skip_degree = 0;
        self.items_count = 0;
    }

    /// Serializes this sketch into a byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out =
            SketchBytes::with_capacity(MAX_HEADER_BYTES + self.items_count as usize * ITEM_BYTES);
        self.write_to(&mut out);
        out.into_bytes()
    }

    /// Appends the wire image of this sketch to `out`.
    pub fn write_to(&self, out: &mut SketchBytes) {
        out.write_u8(self.skip_degree);
        out.write_var_u64(u64::from(self.items_count));
        for value in self.iter() {
            out.write_u32_le(value);
        }
    }

    /// Deserializes a sketch from exactly one wire image.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = SketchSlice::new(bytes);
        let sketch = Self::decode(&mut cursor)?;
        ensure_fully_consumed(cursor.remaining())?;
        Ok(sketch)
    }

    /// Decodes the next wire image from `input` into a new sketch.
    pub fn decode(input: &mut SketchSlice<'_>) -> Result<Self, Error> {
        let header = WireHeader::read(input)?;
        let buffer = SketchBuffer::new(header.size_degree(MIN_SIZE_DEGREE))?;
        let mut sketch = Self {
            has_zero_item: false,
            skip_degree: header.skip_degree,
            items_count: 0,
            initial_size_degree: MIN_SIZE_DEGREE,
            max_size_degree: DEFAULT_MAX_SIZE_DEGREE,
            buffer,
        };
        sketch.read_items(input, header)?;
        Ok(sketch)
    }

    /// Decodes the next wire image from `input` into this sketch, replacing its
    /// state and reusing its buffer storage when large enough.
    ///
    /// On failure the sketch is left empty.
    pub fn read_from(&mut self, input: &mut SketchSlice<'_>) -> Result<(), Error> {
        let result = self.read_from_inner(input);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn read_from_inner(&mut self, input: &mut SketchSlice<'_>) -> Result<(), Error> {
        let header = WireHeader::read(input)?;
        let size_degree = header.size_degree(self.initial_size_degree);
        if !self.buffer.try_reset(size_degree) {
            self.buffer = SketchBuffer::new(size_degree)?;
        }
        self.has_zero_item = false;
        self.skip_degree = header.skip_degree;
        self.items_count = 0;
        self.read_items(input, header)
    }

    /// Places the items of a wire image into an empty, presized buffer.
    ///
    /// Items of a valid image already pass its filter and fit under the load
    /// factor, so neither is checked.
    fn read_items(&mut self, input: &mut SketchSlice<'_>, header: WireHeader) -> Result<(), Error> {
        for _ in 0..header.items_count {
            let value = input.read_u32_le().map_err(insufficient_data("items"))?;
            if value == 0 {
                self.has_zero_item = true;
                continue;
            }
            self.buffer.reinsert(value);
        }
        self.items_count = self.num_retained();
        if self.items_count != header.items_count {
            warn!(
                expected = header.items_count,
                retained = self.items_count,
                "duplicate items in uniq sketch image"
            );
        }
        Ok(())
    }

    fn grow(&mut self) -> Result<(), Error> {
        let size_degree = self.buffer.size_degree() + 1;
        self.buffer.rebuild(size_degree, |_| true)?;
        debug!(
            size_degree,
            skip_degree = self.skip_degree,
            items = self.items_count,
            "grew uniq sketch buffer"
        );
        Ok(())
    }

    fn num_retained(&self) -> u32 {
        self.buffer.num_occupied() as u32 + u32::from(self.has_zero_item)
    }

    fn retention_limit(&self) -> usize {
        1 << (self.max_size_degree - 1)
    }
}

/// Builder for [`UniqSketch`].
#[derive(Debug)]
pub struct UniqSketchBuilder {
    initial_size_degree: u8,
    max_size_degree: u8,
}

impl Default for UniqSketchBuilder {
    fn default() -> Self {
        Self {
            initial_size_degree: MIN_SIZE_DEGREE,
            max_size_degree: DEFAULT_MAX_SIZE_DEGREE,
        }
    }
}

impl UniqSketchBuilder {
    /// Sets log2 of the starting buffer capacity.
    ///
    /// # Panics
    ///
    /// If `size_degree` is not in range [4, 17].
    pub fn initial_size_degree(mut self, size_degree: u8) -> Self {
        assert!(
            (MIN_SIZE_DEGREE..=DEFAULT_MAX_SIZE_DEGREE).contains(&size_degree),
            "initial_size_degree must be in [{}, {}], got {}",
            MIN_SIZE_DEGREE,
            DEFAULT_MAX_SIZE_DEGREE,
            size_degree
        );
        self.initial_size_degree = size_degree;
        self
    }

    /// Sets log2 of the largest buffer capacity reached by growth.
    ///
    /// The sketch retains at most half that many items before raising its skip
    /// degree.
    ///
    /// # Panics
    ///
    /// If `size_degree` is not in range [4, 17].
    pub fn max_size_degree(mut self, size_degree: u8) -> Self {
        assert!(
            (MIN_SIZE_DEGREE..=DEFAULT_MAX_SIZE_DEGREE).contains(&size_degree),
            "max_size_degree must be in [{}, {}], got {}",
            MIN_SIZE_DEGREE,
            DEFAULT_MAX_SIZE_DEGREE,
            size_degree
        );
        self.max_size_degree = size_degree;
        self
    }

    /// Builds the [`UniqSketch`].
    ///
    /// # Panics
    ///
    /// If the initial size degree exceeds the maximum size degree.
    pub fn build(self) -> UniqSketch {
        assert!(
            self.initial_size_degree <= self.max_size_degree,
            "initial_size_degree {} exceeds max_size_degree {}",
            self.initial_size_degree,
            self.max_size_degree
        );
        UniqSketch {
            has_zero_item: false,
            skip_degree: 0,
            items_count: 0,
            initial_size_degree: self.initial_size_degree,
            max_size_degree: self.max_size_degree,
            buffer: SketchBuffer::zeroed(self.initial_size_degree),
        }
    }
}

fn skip_mask(skip_degree: u8) -> u32 {
    (1u32 << skip_degree) - 1
}
