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

//! Byte-level readers and writers shared by sketch codecs.

pub(crate) mod assert;

mod decode;
pub use self::decode::SketchSlice;

mod encode;
pub use self::encode::SketchBytes;

/// Maximum number of bytes of a base-128 encoded `u64`.
pub(crate) const MAX_VAR_UINT_BYTES: usize = 10;
