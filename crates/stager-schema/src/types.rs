//! Source dtype to warehouse column type mapping.

use std::fmt;

use polars::prelude::DataType;
use serde::Serialize;

/// Column types of the target warehouse table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarehouseType {
    Number,
    Float,
    Boolean,
    Timestamp,
    String,
}

impl WarehouseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "NUMBER",
            Self::Float => "FLOAT",
            Self::Boolean => "BOOLEAN",
            Self::Timestamp => "TIMESTAMP",
            Self::String => "STRING",
        }
    }
}

impl fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source type names and the warehouse type each one loads as.
///
/// Names not listed here load as `STRING`.
pub const TYPE_MAPPING: &[(&str, WarehouseType)] = &[
    ("int64", WarehouseType::Number),
    ("Int64", WarehouseType::Number),
    ("float64", WarehouseType::Float),
    ("bool", WarehouseType::Boolean),
    ("boolean", WarehouseType::Boolean),
    ("datetime64[ns]", WarehouseType::Timestamp),
    ("object", WarehouseType::String),
    ("string", WarehouseType::String),
    ("category", WarehouseType::String),
];

/// Looks a source type name up in [`TYPE_MAPPING`].
pub fn warehouse_type_for(source_type: &str) -> WarehouseType {
    TYPE_MAPPING
        .iter()
        .find(|(name, _)| *name == source_type)
        .map_or(WarehouseType::String, |(_, ty)| *ty)
}

/// Names an inferred polars dtype with its source type name.
pub fn source_type_name(dtype: &DataType) -> &'static str {
    if dtype.is_integer() {
        "int64"
    } else if dtype.is_float() {
        "float64"
    } else {
        match dtype {
            DataType::Boolean => "bool",
            DataType::Date | DataType::Datetime(..) => "datetime64[ns]",
            _ => "object",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::TimeUnit;

    #[test]
    fn test_mapping_table() {
        assert_eq!(warehouse_type_for("int64"), WarehouseType::Number);
        assert_eq!(warehouse_type_for("Int64"), WarehouseType::Number);
        assert_eq!(warehouse_type_for("float64"), WarehouseType::Float);
        assert_eq!(warehouse_type_for("boolean"), WarehouseType::Boolean);
        assert_eq!(warehouse_type_for("datetime64[ns]"), WarehouseType::Timestamp);
        assert_eq!(warehouse_type_for("category"), WarehouseType::String);
    }

    #[test]
    fn test_unknown_types_load_as_string() {
        assert_eq!(warehouse_type_for("timedelta64[ns]"), WarehouseType::String);
        assert_eq!(warehouse_type_for(""), WarehouseType::String);
    }

    #[test]
    fn test_source_type_names() {
        assert_eq!(source_type_name(&DataType::Int32), "int64");
        assert_eq!(source_type_name(&DataType::UInt64), "int64");
        assert_eq!(source_type_name(&DataType::Float32), "float64");
        assert_eq!(source_type_name(&DataType::Boolean), "bool");
        assert_eq!(source_type_name(&DataType::Date), "datetime64[ns]");
        assert_eq!(
            source_type_name(&DataType::Datetime(TimeUnit::Microseconds, None)),
            "datetime64[ns]"
        );
        assert_eq!(source_type_name(&DataType::String), "object");
    }

    #[test]
    fn test_display_matches_serde() {
        for ty in [
            WarehouseType::Number,
            WarehouseType::Float,
            WarehouseType::Boolean,
            WarehouseType::Timestamp,
            WarehouseType::String,
        ] {
            let json = serde_json::to_string(&ty).unwrap();
            assert_eq!(json, format!("\"{ty}\""));
        }
    }
}
