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

#![allow(dead_code)]

use uniqsketch::codec::SketchBytes;
use uniqsketch::uniq::UniqSketch;

/// Builds a wire image holding `values` in the given order.
pub fn wire_image(skip_degree: u8, values: &[u32]) -> Vec<u8> {
    let mut out = SketchBytes::default();
    out.write_u8(skip_degree);
    out.write_var_u64(values.len() as u64);
    for value in values {
        out.write_u32_le(*value);
    }
    out.into_bytes()
}

/// Returns the retained values of `sketch` in ascending order.
pub fn sorted_values(sketch: &UniqSketch) -> Vec<u32> {
    let mut values: Vec<u32> = sketch.iter().collect();
    values.sort_unstable();
    values
}
