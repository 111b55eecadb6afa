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

use std::io;

use crate::codec::MAX_VAR_UINT_BYTES;

/// A forward-only cursor over a borrowed byte slice.
///
/// Every read either consumes exactly the bytes it needs or fails with
/// [`io::ErrorKind::UnexpectedEof`] without advancing. Several sketch images may
/// be read back to back from one cursor, as a column of aggregate states is.
#[derive(Debug, Clone)]
pub struct SketchSlice<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SketchSlice<'a> {
    /// Creates a cursor positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns the number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Returns true if every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Fills `buf` completely from the input.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> io::Result<()> {
        let end = self.pos + buf.len();
        if end > self.bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "need {} bytes, {} remaining",
                    buf.len(),
                    self.remaining()
                ),
            ));
        }
        buf.copy_from_slice(&self.bytes[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads an unsigned base-128 integer: seven payload bits per byte, least
    /// significant group first, high bit set on every byte but the last.
    pub fn read_var_u64(&mut self) -> io::Result<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for i in 0..MAX_VAR_UINT_BYTES {
            let byte = match self.read_u8() {
                Ok(byte) => byte,
                Err(err) => {
                    self.pos = start;
                    return Err(err);
                }
            };
            if i == MAX_VAR_UINT_BYTES - 1 && byte > 1 {
                self.pos = start;
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "var uint overflows 64 bits",
                ));
            }
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        self.pos = start;
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "var uint overflows 64 bits",
        ))
    }
}
