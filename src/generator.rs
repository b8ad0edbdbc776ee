use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::entity;
use crate::error::GeneratorError;
use crate::render;
use crate::schema::TableSchema;

/// Generates one file per table. The first error aborts the run, unless
/// `skip_unsupported` is set and the table only failed on a column type.
pub fn generate(
    tables: &[TableSchema],
    config: &GeneratorConfig,
) -> Result<Vec<PathBuf>, GeneratorError> {
    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let class = match entity::assemble(table, config) {
            Ok(class) => class,
            Err(err) if config.skip_unsupported && err.is_unsupported_type() => {
                warn!(table = %table.name, error = %err, "skipping table");
                continue;
            }
            Err(err) => return Err(err),
        };

        let path = render::write_entity(&class, &config.output_dir)?;
        info!(table = %table.name, path = %path.display(), "generated {}", class.class_name);
        written.push(path);
    }

    Ok(written)
}
