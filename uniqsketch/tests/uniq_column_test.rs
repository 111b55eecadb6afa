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

mod common;

use common::wire_image;
use uniqsketch::codec::SketchBytes;
use uniqsketch::codec::SketchSlice;
use uniqsketch::error::ErrorKind;
use uniqsketch::uniq::ColumnResult;
use uniqsketch::uniq::UniqColumn;

fn column_bytes(rows: &[(u8, &[u32])]) -> Vec<u8> {
    rows.iter()
        .flat_map(|(skip_degree, values)| wire_image(*skip_degree, values))
        .collect()
}

#[test]
fn test_column_type() {
    let column = UniqColumn::new();
    assert_eq!(column.column_type(), "AggregateFunction(uniq, Int32)");
    assert_eq!(column.rows(), 0);
    assert!(column.is_empty());
}

#[test]
fn test_decode_column() {
    let bytes = column_bytes(&[(0, &[1, 2]), (0, &[2, 3]), (1, &[0, 4])]);
    let mut cursor = SketchSlice::new(&bytes);
    let mut column = UniqColumn::new();
    column.decode_column(&mut cursor, 3).unwrap();
    assert!(cursor.is_empty());

    assert_eq!(column.rows(), 3);
    let estimates: Vec<u64> = column.iter().map(|sketch| sketch.estimate()).collect();
    assert_eq!(estimates, vec![2, 2, 4]);
    assert!(column.get(2).unwrap().has_zero_item());
    assert!(column.get(3).is_none());

    // {0, 2, 4} at skip degree 1; 1 and 3 are sampled out
    let merged = column.merged().unwrap();
    assert_eq!(merged.skip_degree(), 1);
    assert_eq!(merged.estimate(), 6);
}

#[test]
fn test_decode_column_reuses_rows() {
    let bytes = column_bytes(&[(0, &[1]), (0, &[1, 2]), (0, &[1, 2, 3])]);
    let mut column = UniqColumn::new();
    column
        .decode_column(&mut SketchSlice::new(&bytes), 3)
        .unwrap();

    let bytes = column_bytes(&[(0, &[7, 8, 9, 10]), (0, &[])]);
    column.reset();
    assert_eq!(column.rows(), 0);
    column
        .decode_column(&mut SketchSlice::new(&bytes), 2)
        .unwrap();
    assert_eq!(column.rows(), 2);
    assert_eq!(column.get(0).unwrap().estimate(), 4);
    assert!(column.get(1).unwrap().is_empty());
    assert!(column.get(2).is_none());
    assert_eq!(column.as_slice().len(), 2);
}

#[test]
fn test_decode_column_failure() {
    let mut bytes = column_bytes(&[(0, &[1, 2]), (0, &[3, 4])]);
    bytes.truncate(bytes.len() - 2);
    let mut column = UniqColumn::new();
    let err = column
        .decode_column(&mut SketchSlice::new(&bytes), 2)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientData);
    insta::assert_snapshot!(err.to_string(), @"InsufficientData, context: { row: 1 } => insufficient data: items");
    assert_eq!(column.rows(), 1);
    assert_eq!(column.get(0).unwrap().estimate(), 2);
}

#[test]
fn test_encode_column_round_trip() {
    let bytes = column_bytes(&[(0, &[0, 5]), (2, &[4, 8, 12]), (0, &[])]);
    let mut column = UniqColumn::new();
    column
        .decode_column(&mut SketchSlice::new(&bytes), 3)
        .unwrap();

    let mut out = SketchBytes::default();
    column.encode_column(&mut out);

    let mut restored = UniqColumn::new();
    restored
        .decode_column(&mut SketchSlice::new(out.as_slice()), 3)
        .unwrap();
    for (a, b) in column.iter().zip(&restored) {
        assert_eq!(a.estimate(), b.estimate());
        assert_eq!(a.skip_degree(), b.skip_degree());
        assert_eq!(a.has_zero_item(), b.has_zero_item());
    }
}
