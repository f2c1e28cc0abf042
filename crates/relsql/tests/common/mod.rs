//! Shared tables for conversion tests

#![allow(dead_code)]

use once_cell::sync::Lazy;
use relsql::builder::RelBuilder;
use relsql::rel::{DataType, Field, RelNode, RowType};
use relsql::DialectType;

pub static TABLE_ONE: Lazy<RowType> = Lazy::new(|| {
    RowType::new(vec![
        Field::new("icol", DataType::Integer),
        Field::new("dcol", DataType::Double),
        Field::new("scol", DataType::varchar()),
        Field::new("tcol", DataType::Timestamp { precision: None }),
        Field::new("acol", DataType::array(DataType::Integer)),
    ])
});

pub static TABLE_TWO: Lazy<RowType> = Lazy::new(|| {
    RowType::new(vec![
        Field::new("ifield", DataType::Integer),
        Field::new("dfield", DataType::Double),
        Field::new("sfield", DataType::varchar()),
    ])
});

pub static TABLE_THREE: Lazy<RowType> = Lazy::new(|| {
    RowType::new(vec![
        Field::new("binaryfield", DataType::Binary { length: Some(8) }),
        Field::new("varbinaryfield", DataType::VarBinary { length: Some(16) }),
    ])
});

pub static STRUCT: Lazy<DataType> = Lazy::new(|| {
    DataType::Row(vec![
        Field::new("IFIELD", DataType::Integer),
        Field::new("SFIELD", DataType::varchar()),
    ])
});

pub static TABLE_FOUR: Lazy<RowType> = Lazy::new(|| {
    RowType::new(vec![
        Field::new("icol", DataType::Integer),
        Field::new("scol", DataType::varchar()),
        Field::new("mcol", DataType::map(DataType::varchar(), STRUCT.clone())),
    ])
});

pub fn scan(name: &str, row_type: &RowType) -> RelBuilder {
    RelBuilder::scan(name, row_type.fields.clone())
}

pub fn table_one() -> RelBuilder {
    scan("tableOne", &TABLE_ONE)
}

pub fn table_two() -> RelBuilder {
    scan("tableTwo", &TABLE_TWO)
}

pub fn table_three() -> RelBuilder {
    scan("tableThree", &TABLE_THREE)
}

pub fn table_four() -> RelBuilder {
    scan("tableFour", &TABLE_FOUR)
}

/// Trino SQL for `rel`; panics on conversion errors.
pub fn trino(rel: &RelNode) -> String {
    match relsql::convert(rel, DialectType::Trino) {
        Ok(sql) => sql,
        Err(e) => panic!("conversion of {} failed: {}", rel.kind_name(), e),
    }
}
