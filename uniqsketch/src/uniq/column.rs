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

//! Decoding uniq sketches column by column.
//!
//! A result column of aggregate states carries one wire image per row, back to
//! back. [`UniqColumn`] decodes such a column into sketches and keeps them
//! pooled between batches so their buffers are reused.

use tracing::trace;

use crate::codec::SketchBytes;
use crate::codec::SketchSlice;
use crate::error::Error;
use crate::uniq::UniqSketch;

/// A column of decoded values that a result reader can fill batch by batch.
pub trait ColumnResult {
    /// Returns the server-side type name of the column.
    fn column_type(&self) -> &'static str;

    /// Returns the number of rows currently held.
    fn rows(&self) -> usize;

    /// Replaces the column contents with `rows` values read from `input`.
    fn decode_column(&mut self, input: &mut SketchSlice<'_>, rows: usize) -> Result<(), Error>;

    /// Drops all rows, keeping allocations for the next batch.
    fn reset(&mut self);
}

/// A column of `AggregateFunction(uniq, Int32)` states.
#[derive(Debug, Default, Clone)]
pub struct UniqColumn {
    sketches: Vec<UniqSketch>,
    rows: usize,
}

impl UniqColumn {
    /// Server-side type name of the column.
    pub const COLUMN_TYPE: &'static str = "AggregateFunction(uniq, Int32)";

    /// Creates an empty column.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the column holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Returns the sketch of `row`, if present.
    pub fn get(&self, row: usize) -> Option<&UniqSketch> {
        self.as_slice().get(row)
    }

    /// Returns the sketches of the current rows.
    pub fn as_slice(&self) -> &[UniqSketch] {
        &self.sketches[..self.rows]
    }

    /// Returns an iterator over the sketches of the current rows.
    pub fn iter(&self) -> std::slice::Iter<'_, UniqSketch> {
        self.as_slice().iter()
    }

    /// Appends a sketch as a new row.
    pub fn push(&mut self, sketch: UniqSketch) {
        self.sketches.truncate(self.rows);
        self.sketches.push(sketch);
        self.rows += 1;
    }

    /// Appends the wire image of every row to `out`.
    pub fn encode_column(&self, out: &mut SketchBytes) {
        for sketch in self.iter() {
            sketch.write_to(out);
        }
    }

    /// Folds every row into a single sketch.
    pub fn merged(&self) -> Result<UniqSketch, Error> {
        let mut merged = UniqSketch::new();
        for sketch in self.iter() {
            merged.merge(sketch)?;
        }
        Ok(merged)
    }
}

impl ColumnResult for UniqColumn {
    fn column_type(&self) -> &'static str {
        Self::COLUMN_TYPE
    }

    fn rows(&self) -> usize {
        self.rows
    }

    /// Decodes `rows` sketches in order.
    ///
    /// If a row fails, the rows decoded before it stay available and the error
    /// names the failing row. The input position is then unspecified.
    fn decode_column(&mut self, input: &mut SketchSlice<'_>, rows: usize) -> Result<(), Error> {
        trace!(rows, pooled = self.sketches.len(), "decoding uniq column");
        self.rows = 0;
        for row in 0..rows {
            let decoded = if row < self.sketches.len() {
                self.sketches[row].read_from(input)
            } else {
                UniqSketch::decode(input).map(|sketch| self.sketches.push(sketch))
            };
            decoded.map_err(|err| err.with_context("row", row))?;
            self.rows = row + 1;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.rows = 0;
    }
}

impl<'a> IntoIterator for &'a UniqColumn {
    type Item = &'a UniqSketch;
    type IntoIter = std::slice::Iter<'a, UniqSketch>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
