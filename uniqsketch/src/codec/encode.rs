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

/// A growable little-endian byte sink for sketch images.
#[derive(Debug, Default, Clone)]
pub struct SketchBytes {
    bytes: Vec<u8>,
}

impl SketchBytes {
    /// Creates an empty sink with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Consumes the sink, returning its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Writes one byte.
    pub fn write_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32_le(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    /// Writes `value` in the base-128 form read by [`super::SketchSlice::read_var_u64`].
    pub fn write_var_u64(&mut self, mut value: u64) {
        while value >= 0x80 {
            self.bytes.push((value as u8 & 0x7f) | 0x80);
            value >>= 7;
        }
        self.bytes.push(value as u8);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::SketchSlice;

    #[test]
    fn test_write_var_u64() {
        let mut out = SketchBytes::default();
        out.write_var_u64(0);
        out.write_var_u64(300);
        out.write_var_u64(u64::MAX);
        assert_eq!(out.as_slice()[..3], [0x00u8, 0xac, 0x02]);
        assert_eq!(out.len(), 13);

        let mut cursor = SketchSlice::new(out.as_slice());
        assert_eq!(cursor.read_var_u64().unwrap(), 0);
        assert_eq!(cursor.read_var_u64().unwrap(), 300);
        assert_eq!(cursor.read_var_u64().unwrap(), u64::MAX);
    }
}
