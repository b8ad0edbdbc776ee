use std::path::{Path, PathBuf};

use crate::entity::EntityClass;
use crate::error::GeneratorError;

pub const GENERATOR_NAME: &str = env!("CARGO_PKG_NAME");
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const EXTENSION: &str = "kt";

pub fn render(class: &EntityClass) -> String {
    let properties: String = class
        .properties
        .iter()
        .map(|property| format!("\n    {}\n    {}\n", property.annotation, property.field))
        .collect();

    format!(
        "package {package}\n\
         \n\
         // Generated by {GENERATOR_NAME} v{GENERATOR_VERSION}\n\
         \n\
         import io.requery.*\n\
         \n\
         @Table(name = \"{table}\")\n\
         @Entity(model = \"{model}\")\n\
         {begin}\n\
         {properties}\n\
         {end}\n",
        package = class.package,
        table = class.table_name,
        model = class.model,
        begin = class.class_begin,
        end = class.class_end,
    )
}

pub fn output_path(class: &EntityClass, dir: &Path) -> PathBuf {
    dir.join(format!("{}.{EXTENSION}", class.class_name))
}

/// Writes `<dir>/<ClassName>.kt`, replacing whatever was there.
pub fn write_entity(class: &EntityClass, dir: &Path) -> Result<PathBuf, GeneratorError> {
    std::fs::create_dir_all(dir).map_err(|source| GeneratorError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = output_path(class, dir);
    std::fs::write(&path, render(class)).map_err(|source| GeneratorError::Io {
        path: path.clone(),
        source,
    })?;

    Ok(path)
}
