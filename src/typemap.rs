//! MySQL column types to Kotlin types.
//!
//! Follows the Connector/J type conversions, see
//! https://dev.mysql.com/doc/connector-j/5.1/en/connector-j-reference-type-conversions.html

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::error::GeneratorError;
use crate::schema::ColumnDescriptor;

pub const BOOLEAN_PREFIX: &str = "is_";
pub const ZERO_TIMESTAMP: &str = "0000-00-00 00:00:00";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KotlinType {
    Boolean,
    Int,
    Long,
    BigDecimal,
    Float,
    Double,
    String,
    ZonedDateTime,
    ByteArray,
}

impl KotlinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KotlinType::Boolean => "Boolean",
            KotlinType::Int => "Int",
            KotlinType::Long => "Long",
            KotlinType::BigDecimal => "java.math.BigDecimal",
            KotlinType::Float => "Float",
            KotlinType::Double => "Double",
            KotlinType::String => "String",
            KotlinType::ZonedDateTime => "java.time.ZonedDateTime",
            KotlinType::ByteArray => "ByteArray",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MappedType {
    pub kotlin_type: KotlinType,
    /// Maximum length for bounded text columns.
    pub length: Option<u32>,
    /// Declared nullability, possibly overridden by a sentinel default.
    pub nullable: bool,
}

/// Maps one column of `table`. Unknown database types are an error.
pub fn map_column(column: &ColumnDescriptor, table: &str) -> Result<MappedType, GeneratorError> {
    let db_type = column.db_type.as_str();
    let mut mapped = MappedType {
        kotlin_type: KotlinType::String,
        length: None,
        nullable: column.nullable,
    };

    if column.name.starts_with(BOOLEAN_PREFIX) {
        mapped.kotlin_type = KotlinType::Boolean;
        return Ok(mapped);
    }

    let lossy = |kotlin_type: KotlinType| {
        let qualified = format!("{table}.{}", column.name);
        warn!(
            column = %qualified,
            db_type,
            kotlin_type = kotlin_type.as_str(),
            "lossy type mapping"
        );
        kotlin_type
    };

    mapped.kotlin_type = match db_type {
        _ if starts_with_any(db_type, &["int", "tinyint", "smallint"]) => KotlinType::Int,
        _ if db_type.starts_with("bigint") => lossy(KotlinType::Long),
        _ if db_type.starts_with("decimal") => lossy(KotlinType::BigDecimal),
        _ if db_type.starts_with("float") => KotlinType::Float,
        _ if db_type.starts_with("double") => lossy(KotlinType::Double),
        _ if starts_with_any(db_type, &["varchar", "char"]) => {
            mapped.length = type_length(db_type);
            KotlinType::String
        }
        _ if db_type.starts_with("enum") => lossy(KotlinType::String),
        "timestamp" => {
            if column.default.as_deref() == Some(ZERO_TIMESTAMP) {
                mapped.nullable = true;
            }
            KotlinType::ZonedDateTime
        }
        "date" | "datetime" => lossy(KotlinType::ZonedDateTime),
        "tinytext" => {
            mapped.length = Some(255);
            KotlinType::String
        }
        "text" => {
            mapped.length = Some(65_535);
            KotlinType::String
        }
        "mediumtext" => {
            mapped.length = Some(16_777_215);
            KotlinType::String
        }
        // 4294967295 doesn't fit a Kotlin Int length
        "longtext" => KotlinType::String,
        _ if db_type == "longblob" || db_type.starts_with("binary") => {
            lossy(KotlinType::ByteArray)
        }
        _ => {
            return Err(GeneratorError::UnsupportedType {
                db_type: db_type.to_string(),
                column: format!("{table}.{}", column.name),
            })
        }
    };

    Ok(mapped)
}

fn starts_with_any(db_type: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| db_type.starts_with(*prefix))
}

/// Size from a parenthesized suffix, `varchar(255)` gives 255.
pub fn type_length(db_type: &str) -> Option<u32> {
    static LENGTH: OnceLock<Regex> = OnceLock::new();
    let re = LENGTH.get_or_init(|| Regex::new(r"\((\d+)\)").expect("valid length regex"));

    re.captures(db_type)
        .and_then(|captures| captures.get(1))
        .and_then(|length| length.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, db_type: &str, nullable: bool) -> ColumnDescriptor {
        ColumnDescriptor {
            nullable,
            ..ColumnDescriptor::new(name, db_type)
        }
    }

    fn map(db_type: &str) -> MappedType {
        map_column(&column("value", db_type, false), "t").unwrap()
    }

    #[test]
    fn integer_family() {
        for db_type in ["int", "int(11)", "int unsigned", "tinyint(4)", "smallint(6)"] {
            let mapped = map(db_type);
            assert_eq!(mapped.kotlin_type, KotlinType::Int, "{db_type}");
            assert_eq!(mapped.length, None, "{db_type}");
        }
        assert_eq!(map("bigint(20)").kotlin_type, KotlinType::Long);
    }

    #[test]
    fn numeric_family() {
        assert_eq!(map("decimal(10,2)").kotlin_type, KotlinType::BigDecimal);
        assert_eq!(map("decimal(10,2)").length, None);
        assert_eq!(map("float").kotlin_type, KotlinType::Float);
        assert_eq!(map("double").kotlin_type, KotlinType::Double);
    }

    #[test]
    fn bounded_text_takes_suffix_length() {
        let mapped = map("varchar(255)");
        assert_eq!(mapped.kotlin_type, KotlinType::String);
        assert_eq!(mapped.length, Some(255));

        assert_eq!(map("char(2)").length, Some(2));
        assert_eq!(map("char").length, None);
    }

    #[test]
    fn text_tiers() {
        assert_eq!(map("tinytext").length, Some(255));
        assert_eq!(map("text").length, Some(65_535));
        assert_eq!(map("mediumtext").length, Some(16_777_215));

        let longtext = map("longtext");
        assert_eq!(longtext.kotlin_type, KotlinType::String);
        assert_eq!(longtext.length, None);
    }

    #[test]
    fn enum_temporal_and_binary() {
        assert_eq!(map("enum('a','b')").kotlin_type, KotlinType::String);
        assert_eq!(map("enum('a','b')").length, None);
        for db_type in ["timestamp", "date", "datetime"] {
            assert_eq!(map(db_type).kotlin_type, KotlinType::ZonedDateTime);
        }
        assert_eq!(map("longblob").kotlin_type, KotlinType::ByteArray);
        assert_eq!(map("binary(16)").kotlin_type, KotlinType::ByteArray);
        assert_eq!(map("binary(16)").length, None);
    }

    #[test]
    fn only_bounded_text_carries_a_length() {
        let unbounded = [
            "int(11)",
            "tinyint(1)",
            "smallint(6)",
            "bigint(20)",
            "decimal(10,2)",
            "float",
            "double",
            "enum('a','b')",
            "timestamp",
            "date",
            "datetime",
            "longtext",
            "longblob",
            "binary(16)",
        ];
        for db_type in unbounded {
            assert_eq!(map(db_type).length, None, "{db_type}");
        }

        for (db_type, length) in [("varchar(255)", 255), ("char(36)", 36)] {
            assert_eq!(map(db_type).length, Some(length), "{db_type}");
        }
    }

    #[test]
    fn boolean_prefix_wins_over_declared_type() {
        for db_type in ["tinyint(1)", "int", "varchar(3)", "geometry"] {
            let mapped = map_column(&column("is_active", db_type, false), "users").unwrap();
            assert_eq!(mapped.kotlin_type, KotlinType::Boolean, "{db_type}");
            assert_eq!(mapped.length, None);
            assert!(!mapped.nullable);
        }
    }

    #[test]
    fn zero_timestamp_default_forces_nullable() {
        let mut created = column("created_at", "timestamp", false);
        created.default = Some(ZERO_TIMESTAMP.to_string());
        assert!(map_column(&created, "users").unwrap().nullable);

        created.default = Some("CURRENT_TIMESTAMP".to_string());
        assert!(!map_column(&created, "users").unwrap().nullable);
    }

    #[test]
    fn declared_nullability_is_kept() {
        let mapped = map_column(&column("email", "varchar(255)", true), "users").unwrap();
        assert!(mapped.nullable);
    }

    #[test]
    fn unknown_type_is_an_error() {
        let err = map_column(&column("shape", "geometry", false), "places").unwrap_err();
        match err {
            GeneratorError::UnsupportedType { db_type, column } => {
                assert_eq!(db_type, "geometry");
                assert_eq!(column, "places.shape");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn length_without_suffix() {
        assert_eq!(type_length("varchar(64)"), Some(64));
        assert_eq!(type_length("varchar"), None);
        assert_eq!(type_length("decimal(10,2)"), None);
    }
}
