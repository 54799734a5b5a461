//! Warehouse table schema inference for staged CSV files.
//!
//! Reads the head of a CSV export, lets polars infer a dtype per column and
//! maps each dtype to the column type of the table the parts are loaded into.
//! Nothing is sent to the warehouse.

mod error;
mod infer;
mod types;

pub use error::{Result, SchemaError};
pub use infer::{
    ColumnSchema, DEFAULT_SAMPLE_ROWS, SchemaOptions, TableSchema, infer_table_schema,
    stage_name_for, table_name_for,
};
pub use types::{TYPE_MAPPING, WarehouseType, source_type_name, warehouse_type_for};
