use sqlx::mysql::MySqlConnectOptions;
use sqlx::{Connection, MySqlConnection, Row};
use tracing::{debug, info};

use crate::error::GeneratorError;
use crate::schema::{ColumnDescriptor, ColumnList, TableSchema};

const CURRENT_DATABASE: &str = "SELECT CAST(DATABASE() AS CHAR)";

// Same set as SHOW TABLES.
const LIST_TABLES: &str = "SELECT CAST(TABLE_NAME AS CHAR) \
     FROM information_schema.TABLES \
     WHERE TABLE_SCHEMA = ? \
     ORDER BY TABLE_NAME";

// Same six columns as DESCRIBE, cast so every server version hands back text.
const DESCRIBE_TABLE: &str = "SELECT \
     CAST(COLUMN_NAME AS CHAR), \
     CAST(COLUMN_TYPE AS CHAR), \
     CAST(IS_NULLABLE AS CHAR), \
     CAST(COLUMN_KEY AS CHAR), \
     CAST(COLUMN_DEFAULT AS CHAR), \
     CAST(EXTRA AS CHAR) \
     FROM information_schema.COLUMNS \
     WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? \
     ORDER BY ORDINAL_POSITION";

pub struct Introspector {
    conn: MySqlConnection,
}

impl Introspector {
    pub async fn connect(options: &MySqlConnectOptions) -> Result<Self, GeneratorError> {
        let conn = MySqlConnection::connect_with(options).await?;
        Ok(Self { conn })
    }

    /// Fails like `SHOW TABLES` when the connection has no default database.
    pub async fn current_database(&mut self) -> Result<String, GeneratorError> {
        let row = sqlx::query(CURRENT_DATABASE)
            .fetch_one(&mut self.conn)
            .await?;
        selected_database(row.try_get(0)?)
    }

    pub async fn list_tables(&mut self) -> Result<Vec<String>, GeneratorError> {
        let database = self.current_database().await?;
        let rows = sqlx::query(LIST_TABLES)
            .bind(&database)
            .fetch_all(&mut self.conn)
            .await?;
        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            tables.push(row.try_get::<String, _>(0)?);
        }

        debug!(database = %database, count = tables.len(), "listed tables");
        Ok(tables)
    }

    pub async fn describe_table(&mut self, table: &str) -> Result<TableSchema, GeneratorError> {
        let rows = sqlx::query(DESCRIBE_TABLE)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await?;

        let mut columns = ColumnList::new();
        for row in rows {
            columns.push(ColumnDescriptor::from_describe_row(
                table,
                row.try_get(0)?,
                row.try_get(1)?,
                row.try_get(2)?,
                row.try_get(3)?,
                row.try_get(4)?,
                row.try_get(5)?,
            )?);
        }

        debug!(table, columns = columns.len(), "described table");
        Ok(TableSchema {
            name: table.to_string(),
            columns,
        })
    }

    pub async fn close(self) -> Result<(), GeneratorError> {
        self.conn.close().await?;
        Ok(())
    }
}

fn selected_database(database: Option<String>) -> Result<String, GeneratorError> {
    database
        .filter(|database| !database.is_empty())
        .ok_or(GeneratorError::NoDatabaseSelected)
}

/// Reads every table of the database `options` point at.
pub async fn load_schema(
    options: &MySqlConnectOptions,
) -> Result<Vec<TableSchema>, GeneratorError> {
    let mut introspector = Introspector::connect(options).await?;

    let names = introspector.list_tables().await?;
    let mut tables = Vec::with_capacity(names.len());
    for name in &names {
        tables.push(introspector.describe_table(name).await?);
    }

    introspector.close().await?;
    info!(tables = tables.len(), "loaded schema from database");
    Ok(tables)
}
