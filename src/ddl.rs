//! Offline schema source: a MySQL DDL script, e.g. `mysqldump --no-data`.

use rustc_hash::FxHashMap;
use sqlparser::ast::{
    AlterTableOperation, ColumnDef, ColumnOption, ColumnOptionDef, Expr, ObjectName, ObjectType,
    Statement, TableConstraint, Value,
};
use sqlparser::dialect::MySqlDialect;
use sqlparser::parser::Parser;
use tracing::debug;

use crate::error::GeneratorError;
use crate::schema::{ColumnDescriptor, ColumnKey, TableSchema, AUTO_INCREMENT};

/// Parses `sql` and returns the tables it leaves behind, in creation order.
pub fn parse_ddl(sql: &str) -> Result<Vec<TableSchema>, GeneratorError> {
    let statements = Parser::parse_sql(&MySqlDialect {}, sql)?;
    let mut schema = DdlSchema::default();
    for statement in &statements {
        schema.process_statement(statement)?;
    }

    Ok(schema.into_tables())
}

#[derive(Default)]
struct DdlSchema {
    tables: Vec<TableSchema>,
    index: FxHashMap<String, usize>,
}

impl DdlSchema {
    fn into_tables(self) -> Vec<TableSchema> {
        self.tables
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut TableSchema, GeneratorError> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| GeneratorError::TableNotExist(name.to_string()))?;
        Ok(&mut self.tables[idx])
    }

    fn insert(&mut self, table: TableSchema) {
        match self.index.get(&table.name) {
            Some(&idx) => self.tables[idx] = table,
            None => {
                self.index.insert(table.name.clone(), self.tables.len());
                self.tables.push(table);
            }
        }
    }

    fn remove(&mut self, name: &str) -> Option<TableSchema> {
        let idx = self.index.remove(name)?;
        let table = self.tables.remove(idx);
        for position in self.index.values_mut() {
            if *position > idx {
                *position -= 1;
            }
        }
        Some(table)
    }

    fn process_statement(&mut self, statement: &Statement) -> Result<(), GeneratorError> {
        match statement {
            Statement::CreateTable {
                name,
                columns,
                constraints,
                ..
            } => {
                let mut table = TableSchema::new(object_name(name)?);
                for column in columns {
                    table.columns.push(column_descriptor(column));
                }
                for constraint in constraints {
                    apply_constraint(&mut table, constraint)?;
                }
                self.insert(table);
            }
            Statement::AlterTable {
                name, operations, ..
            } => {
                let table = self.table_mut(&object_name(name)?)?;
                for operation in operations {
                    alter_table(table, operation)?;
                }
            }
            Statement::Drop {
                object_type: ObjectType::Table,
                if_exists,
                names,
                ..
            } => {
                for name in names {
                    let name = object_name(name)?;
                    if self.remove(&name).is_none() && !*if_exists {
                        return Err(GeneratorError::TableNotExist(name));
                    }
                }
            }
            other => debug!(statement = %other, "ignoring statement"),
        }

        Ok(())
    }
}

fn object_name(name: &ObjectName) -> Result<String, GeneratorError> {
    name.0
        .last()
        .map(|ident| ident.value.clone())
        .ok_or(GeneratorError::Base("unexpected table name doesn't have elements"))
}

fn column_descriptor(column: &ColumnDef) -> ColumnDescriptor {
    let mut descriptor = ColumnDescriptor::new(
        column.name.value.clone(),
        mysql_type_name(&column.data_type.to_string()),
    );
    apply_options(&mut descriptor, &column.options);
    descriptor
}

// Synonyms MySQL rewrites on CREATE TABLE, longest first.
const TYPE_SYNONYMS: &[(&str, &str)] = &[
    ("double precision", "double"),
    ("character varying", "varchar"),
    ("boolean", "tinyint(1)"),
    ("bool", "tinyint(1)"),
    ("integer", "int"),
    ("numeric", "decimal"),
    ("fixed", "decimal"),
    ("dec", "decimal"),
    ("real", "double"),
];

/// The type as `DESCRIBE` would report it after MySQL resolved synonyms.
fn mysql_type_name(declared: &str) -> String {
    // DESCRIBE prints `decimal(10,2)` and `enum('a','b')` without spaces
    let declared = declared.to_lowercase().replace(", ", ",");
    for &(synonym, canonical) in TYPE_SYNONYMS {
        let Some(rest) = declared.strip_prefix(synonym) else {
            continue;
        };
        if !(rest.is_empty() || rest.starts_with('(') || rest.starts_with(' ')) {
            continue;
        }

        // DECIMAL without precision is DECIMAL(10,0)
        if canonical == "decimal" && !rest.starts_with('(') {
            return format!("decimal(10,0){rest}");
        }
        return format!("{canonical}{rest}");
    }

    declared
}

fn apply_options(descriptor: &mut ColumnDescriptor, options: &[ColumnOptionDef]) {
    for option in options {
        match &option.option {
            ColumnOption::NotNull => descriptor.nullable = false,
            ColumnOption::Null => descriptor.nullable = true,
            ColumnOption::Default(expr) => descriptor.default = default_value(expr),
            ColumnOption::Unique { is_primary } => {
                if *is_primary {
                    // primary keys are implicitly NOT NULL in MySQL
                    descriptor.key = ColumnKey::Primary;
                    descriptor.nullable = false;
                } else if descriptor.key != ColumnKey::Primary {
                    descriptor.key = ColumnKey::Unique;
                }
            }
            ColumnOption::DialectSpecific(tokens) => {
                let auto_increment = tokens
                    .iter()
                    .any(|token| token.to_string().eq_ignore_ascii_case(AUTO_INCREMENT));
                if auto_increment {
                    descriptor.extra = AUTO_INCREMENT.to_string();
                }
            }
            _ => {}
        }
    }
}

fn default_value(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Value(Value::Null) => None,
        Expr::Value(Value::SingleQuotedString(value))
        | Expr::Value(Value::DoubleQuotedString(value)) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

fn apply_constraint(
    table: &mut TableSchema,
    constraint: &TableConstraint,
) -> Result<(), GeneratorError> {
    if let TableConstraint::Unique {
        columns,
        is_primary,
        ..
    } = constraint
    {
        for ident in columns {
            let column = table.column_mut(&ident.value)?;
            if *is_primary {
                column.key = ColumnKey::Primary;
                column.nullable = false;
            } else if column.key == ColumnKey::None {
                column.key = ColumnKey::Unique;
            }
        }
    }

    Ok(())
}

fn alter_table(
    table: &mut TableSchema,
    operation: &AlterTableOperation,
) -> Result<(), GeneratorError> {
    match operation {
        AlterTableOperation::AddColumn { column_def, .. } => {
            table.columns.push(column_descriptor(column_def));
        }
        AlterTableOperation::RenameColumn {
            old_column_name,
            new_column_name,
        } => {
            table.column_mut(&old_column_name.value)?.name = new_column_name.value.clone();
        }
        AlterTableOperation::DropColumn { column_name, .. } => {
            let idx = table
                .columns
                .iter()
                .position(|column| column.name == column_name.value)
                .ok_or_else(|| GeneratorError::ColumnNotExist {
                    table: table.name.clone(),
                    column: column_name.value.clone(),
                })?;
            table.columns.remove(idx);
        }
        AlterTableOperation::AddConstraint(constraint) => apply_constraint(table, constraint)?,
        other => debug!(table = %table.name, operation = %other, "ignoring ALTER TABLE operation"),
    }

    Ok(())
}
