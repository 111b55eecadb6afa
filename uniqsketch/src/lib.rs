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

//! Client-side decoding, merging and estimation of `uniq` aggregate states.
//!
//! The [`uniq`] module holds the sketch itself; [`codec`] provides the byte
//! cursor that column readers hand to it.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod codec;
pub mod error;
pub mod hash;
pub mod uniq;
