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

//! Integer mixing used to turn raw values into sketch values.

/// The 64-bit finalizer of MurmurHash3.
///
/// Every input bit affects every output bit, so the truncated low and high words
/// are both usable as uniformly distributed 32-bit values.
#[inline]
pub fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51afd7ed558ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ceb9fe1a85ec53);
    k ^= k >> 33;
    k
}

/// Hashes a raw integer down to the 32-bit value stored by a uniq sketch.
#[inline]
pub fn uniq_hash(value: u64) -> u32 {
    fmix64(value) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmix64() {
        assert_eq!(fmix64(0), 0);
        assert_ne!(fmix64(1), 1);
        assert_ne!(uniq_hash(1), uniq_hash(2));
    }
}
