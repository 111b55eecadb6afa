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

//! Wire image layout of a uniq sketch.
//!
//! | Field | Encoding |
//! |-------|----------|
//! | skip degree | 1 byte |
//! | items count | unsigned base-128 var int |
//! | items | `items count` x 4 bytes, little-endian `u32` |
//!
//! An item equal to `0` records that the zero value was seen. No value repeats
//! and every value passes the sampling filter of the encoded skip degree.

use crate::codec::SketchSlice;
use crate::codec::assert::ensure_items_count_at_most;
use crate::codec::assert::ensure_skip_degree_at_most;
use crate::codec::assert::insufficient_data;
use crate::error::Error;
use crate::uniq::MAX_ITEMS;
use crate::uniq::MAX_SKIP_DEGREE;

/// Width of one encoded item.
pub(super) const ITEM_BYTES: usize = 4;

/// Upper bound of the header length: one byte plus a var int.
pub(super) const MAX_HEADER_BYTES: usize = 1 + crate::codec::MAX_VAR_UINT_BYTES;

/// The fields preceding the items of a wire image.
#[derive(Debug, Clone, Copy)]
pub(super) struct WireHeader {
    pub skip_degree: u8,
    pub items_count: u32,
}

impl WireHeader {
    /// Reads and validates a header, checking that the input holds every item.
    /// Nothing is allocated for the items yet.
    pub fn read(input: &mut SketchSlice<'_>) -> Result<Self, Error> {
        let skip_degree = input.read_u8().map_err(insufficient_data("skip_degree"))?;
        ensure_skip_degree_at_most(MAX_SKIP_DEGREE, skip_degree)?;
        let items_count = input
            .read_var_u64()
            .map_err(insufficient_data("items_count"))?;
        ensure_items_count_at_most(MAX_ITEMS as u64, items_count)?;
        if input.remaining() < items_count as usize * ITEM_BYTES {
            return Err(Error::insufficient_data("items"));
        }
        Ok(Self {
            skip_degree,
            items_count: items_count as u32,
        })
    }

    /// Returns the buffer size degree that holds every item below the load factor.
    pub fn size_degree(&self, min_size_degree: u8) -> u8 {
        size_degree_for(self.items_count, min_size_degree)
    }
}

/// Smallest buffer size degree, not below `min_size_degree`, that keeps
/// `items_count` items at most half full.
pub(super) fn size_degree_for(items_count: u32, min_size_degree: u8) -> u8 {
    if items_count <= 1 {
        return min_size_degree;
    }
    let floor_log2 = 31 - items_count.leading_zeros() as u8;
    (floor_log2 + 2).max(min_size_degree)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_degree_for() {
        assert_eq!(size_degree_for(0, 4), 4);
        assert_eq!(size_degree_for(1, 4), 4);
        assert_eq!(size_degree_for(2, 4), 4);
        assert_eq!(size_degree_for(8, 4), 5);
        assert_eq!(size_degree_for(15, 4), 5);
        assert_eq!(size_degree_for(16, 4), 6);
        assert_eq!(size_degree_for(65536, 4), 18);
        assert_eq!(size_degree_for(MAX_ITEMS, 4), 28);
        assert_eq!(size_degree_for(3, 7), 7);
    }
}
