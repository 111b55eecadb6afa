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

use crate::error::Error;

/// Maps a cursor failure into a sketch error tagged with the field being read.
///
/// Running out of input is [`Error::insufficient_data`]; anything else the cursor
/// rejects (such as an overlong var uint) is malformed data.
pub(crate) fn insufficient_data(tag: &'static str) -> impl FnOnce(io::Error) -> Error {
    move |err| match err.kind() {
        io::ErrorKind::UnexpectedEof => Error::insufficient_data(tag),
        _ => Error::deserial(format!("malformed {tag}: {err}")),
    }
}

pub(crate) fn ensure_items_count_at_most(max: u64, actual: u64) -> Result<(), Error> {
    if actual <= max {
        Ok(())
    } else {
        Err(Error::too_many_items(max, actual))
    }
}

pub(crate) fn ensure_skip_degree_at_most(max: u8, actual: u8) -> Result<(), Error> {
    if actual <= max {
        Ok(())
    } else {
        Err(Error::deserial(format!(
            "unsupported skip degree: expected at most {max}, got {actual}"
        )))
    }
}

pub(crate) fn ensure_fully_consumed(remaining: usize) -> Result<(), Error> {
    if remaining == 0 {
        Ok(())
    } else {
        Err(Error::deserial(format!(
            "{remaining} trailing bytes after sketch image"
        )))
    }
}
