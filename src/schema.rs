use smallvec::SmallVec;

use crate::error::GeneratorError;

pub const AUTO_INCREMENT: &str = "auto_increment";

/// Key designation of a column, as reported by `DESCRIBE`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnKey {
    Primary,
    Unique,
    Multiple,
    None,
}

impl ColumnKey {
    pub fn from_describe(key: &str) -> Self {
        match key {
            "PRI" => ColumnKey::Primary,
            "UNI" => ColumnKey::Unique,
            "MUL" => ColumnKey::Multiple,
            _ => ColumnKey::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type, lower-case, e.g. `varchar(255)` or `int unsigned`.
    pub db_type: String,
    pub nullable: bool,
    pub key: ColumnKey,
    pub default: Option<String>,
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, db_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            db_type: db_type.into(),
            nullable: true,
            key: ColumnKey::None,
            default: None,
            extra: String::new(),
        }
    }

    /// Builds a descriptor out of the six `DESCRIBE` columns
    /// (Field, Type, Null, Key, Default, Extra).
    pub fn from_describe_row(
        table: &str,
        name: Option<String>,
        db_type: Option<String>,
        null: Option<String>,
        key: Option<String>,
        default: Option<String>,
        extra: Option<String>,
    ) -> Result<Self, GeneratorError> {
        let name = name.ok_or_else(|| GeneratorError::MalformedColumn {
            table: table.to_string(),
            reason: "missing column name",
        })?;
        let db_type = db_type.ok_or_else(|| GeneratorError::MalformedColumn {
            table: table.to_string(),
            reason: "missing column type",
        })?;

        Ok(Self {
            name,
            db_type: db_type.to_lowercase(),
            nullable: null.as_deref() == Some("YES"),
            key: ColumnKey::from_describe(key.as_deref().unwrap_or_default()),
            default,
            extra: extra.unwrap_or_default(),
        })
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra
            .split_whitespace()
            .any(|word| word.eq_ignore_ascii_case(AUTO_INCREMENT))
    }
}

pub type ColumnList = SmallVec<[ColumnDescriptor; 16]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: ColumnList,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: ColumnList::new(),
        }
    }

    pub fn with_columns(
        name: impl Into<String>,
        columns: impl IntoIterator<Item = ColumnDescriptor>,
    ) -> Self {
        Self {
            name: name.into(),
            columns: columns.into_iter().collect(),
        }
    }

    pub fn column_mut(&mut self, name: &str) -> Result<&mut ColumnDescriptor, GeneratorError> {
        let table = &self.name;
        self.columns
            .iter_mut()
            .find(|column| column.name == name)
            .ok_or_else(|| GeneratorError::ColumnNotExist {
                table: table.clone(),
                column: name.to_string(),
            })
    }
}
