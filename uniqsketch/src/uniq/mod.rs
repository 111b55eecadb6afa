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

//! Uniq sketch for approximate distinct counting.
//!
//! # Overview
//!
//! A uniq sketch is an adaptive sample of 32-bit hash values held in an
//! open-addressing hash set. It keeps every value whose low `skip_degree` bits
//! are zero, a sample of rate `2^-skip_degree`. While the sample is small the
//! buffer doubles as it fills; once more than `1 << (max_size_degree - 1)`
//! values are retained the skip degree is raised instead, purging the values
//! that fail the stricter filter.
//!
//! The distinct-count estimate is the retained count scaled by `2^skip_degree`.
//! It is exact as long as the skip degree is zero.
//!
//! The sketch reads and writes the serialized state of the `uniq` aggregate
//! function of columnar databases, so states fetched from a server can be merged
//! and estimated on the client. The value zero is the empty slot marker of the
//! buffer and is tracked by a separate flag.
//!
//! # Examples
//!
//! ```
//! # use uniqsketch::uniq::UniqSketch;
//! let mut sketch = UniqSketch::new();
//! for value in 1..=100u32 {
//!     sketch.insert(value).unwrap();
//! }
//! sketch.insert(42).unwrap();
//! assert_eq!(sketch.estimate(), 100);
//! ```
//!
//! # Merging
//!
//! ```
//! # use uniqsketch::uniq::UniqSketch;
//! let a = UniqSketch::deserialize(&[0, 3, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]).unwrap();
//! let b = UniqSketch::deserialize(&[0, 2, 3, 0, 0, 0, 4, 0, 0, 0]).unwrap();
//!
//! let mut merged = a.clone();
//! merged.merge(&b).unwrap();
//! assert_eq!(merged.estimate(), 4);
//!
//! let bytes = merged.serialize();
//! assert_eq!(UniqSketch::deserialize(&bytes).unwrap().estimate(), 4);
//! ```

mod buffer;
mod column;
mod serialization;
mod sketch;

pub use self::buffer::SketchBuffer;
pub use self::column::ColumnResult;
pub use self::column::UniqColumn;
pub use self::sketch::UniqSketch;
pub use self::sketch::UniqSketchBuilder;

/// Smallest buffer size degree.
pub const MIN_SIZE_DEGREE: u8 = 4;

/// Default largest size degree reached by growth; it bounds the retained
/// items at `1 << 16`.
pub const DEFAULT_MAX_SIZE_DEGREE: u8 = 17;

/// Largest buffer size degree; a decoded image of [`MAX_ITEMS`] items needs it.
pub const MAX_BUFFER_SIZE_DEGREE: u8 = 28;

/// Largest supported skip degree.
pub const MAX_SKIP_DEGREE: u8 = 31;

/// Largest items count accepted from a wire image.
pub const MAX_ITEMS: u32 = 100_000_000;
