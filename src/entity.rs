use convert_case::{Case, Casing};
use inflector::string::singularize::to_singular;

use crate::config::GeneratorConfig;
use crate::error::GeneratorError;
use crate::schema::{ColumnDescriptor, ColumnKey, TableSchema};
use crate::typemap::{self, KotlinType, BOOLEAN_PREFIX};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub annotation: String,
    pub field: String,
}

/// One generated Kotlin entity, ready for the renderer.
#[derive(Debug, Clone)]
pub struct EntityClass {
    pub package: String,
    pub class_begin: String,
    pub class_end: &'static str,
    pub model: &'static str,
    pub table_name: String,
    pub class_name: String,
    pub properties: Vec<Property>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EntityShape {
    DataClass,
    Interface,
}

impl EntityShape {
    pub fn from_config(config: &GeneratorConfig) -> Self {
        if config.interface {
            EntityShape::Interface
        } else {
            EntityShape::DataClass
        }
    }

    fn class_begin(&self, class_name: &str) -> String {
        match self {
            EntityShape::DataClass => format!("data class {class_name} constructor("),
            EntityShape::Interface => format!("interface {class_name} {{"),
        }
    }

    fn class_end(&self) -> &'static str {
        match self {
            EntityShape::DataClass => ")",
            EntityShape::Interface => "}",
        }
    }

    /// requery model tag.
    fn model(&self) -> &'static str {
        match self {
            EntityShape::DataClass => "ktdata",
            EntityShape::Interface => "kt",
        }
    }

    fn separator(&self) -> &'static str {
        match self {
            EntityShape::DataClass => ",",
            EntityShape::Interface => "",
        }
    }
}

const KOTLIN_HARD_KEYWORDS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun", "if", "in",
    "interface", "is", "null", "object", "package", "return", "super", "this", "throw", "true",
    "try", "typealias", "typeof", "val", "var", "when", "while",
];

/// Backtick-quotes names Kotlin reserves.
fn kotlin_identifier(name: &str) -> String {
    if KOTLIN_HARD_KEYWORDS.contains(&name) {
        format!("`{name}`")
    } else {
        name.to_string()
    }
}

pub fn class_name(table_name: &str) -> String {
    to_singular(table_name).to_case(Case::Pascal)
}

pub fn assemble(
    table: &TableSchema,
    config: &GeneratorConfig,
) -> Result<EntityClass, GeneratorError> {
    let shape = EntityShape::from_config(config);
    let class_name = class_name(&table.name);

    let mut properties = Vec::with_capacity(table.columns.len());
    for column in &table.columns {
        properties.push(property(column, &table.name, shape)?);
    }

    let last = properties
        .last_mut()
        .ok_or_else(|| GeneratorError::EmptyTable(table.name.clone()))?;
    let trimmed_len = last.field.trim_end_matches(',').len();
    last.field.truncate(trimmed_len);

    Ok(EntityClass {
        package: config.package.clone(),
        class_begin: shape.class_begin(&class_name),
        class_end: shape.class_end(),
        model: shape.model(),
        table_name: table.name.clone(),
        class_name,
        properties,
    })
}

fn property(
    column: &ColumnDescriptor,
    table_name: &str,
    shape: EntityShape,
) -> Result<Property, GeneratorError> {
    let mapped = typemap::map_column(column, table_name)?;

    let mut annotations = Vec::with_capacity(3);
    if column.key == ColumnKey::Primary {
        annotations.push("@get:Key".to_string());
    }
    if column.is_auto_increment() {
        annotations.push("@get:Generated".to_string());
    }

    let mut column_annotation = format!("@get:Column(name=\"{}\", ", column.name);
    if let Some(length) = mapped.length {
        column_annotation.push_str(&format!("length={length}, "));
    }
    column_annotation.push_str(&format!("nullable={})", mapped.nullable));
    annotations.push(column_annotation);

    let mut field_name = column.name.as_str();
    if mapped.kotlin_type == KotlinType::Boolean {
        field_name = field_name
            .strip_prefix(BOOLEAN_PREFIX)
            .filter(|rest| !rest.is_empty())
            .unwrap_or(field_name);
    }

    let field = format!(
        "var {}: {}{}{}",
        kotlin_identifier(&field_name.to_case(Case::Camel)),
        mapped.kotlin_type.as_str(),
        if mapped.nullable { "?" } else { "" },
        shape.separator(),
    );

    Ok(Property {
        annotation: annotations.join(" "),
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AUTO_INCREMENT;

    fn users() -> TableSchema {
        TableSchema::with_columns(
            "users",
            [
                ColumnDescriptor {
                    nullable: false,
                    key: ColumnKey::Primary,
                    extra: AUTO_INCREMENT.to_string(),
                    ..ColumnDescriptor::new("id", "int")
                },
                ColumnDescriptor {
                    nullable: false,
                    ..ColumnDescriptor::new("is_active", "tinyint(1)")
                },
                ColumnDescriptor {
                    nullable: false,
                    ..ColumnDescriptor::new("email", "varchar(255)")
                },
            ],
        )
    }

    fn interface_config() -> GeneratorConfig {
        GeneratorConfig {
            interface: true,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn class_names_are_singular_pascal_case() {
        assert_eq!(class_name("users"), "User");
        assert_eq!(class_name("user_roles"), "UserRole");
    }

    #[test]
    fn users_data_class() {
        let class = assemble(&users(), &GeneratorConfig::default()).unwrap();

        assert_eq!(class.class_name, "User");
        assert_eq!(class.table_name, "users");
        assert_eq!(class.package, "model");
        assert_eq!(class.model, "ktdata");
        assert_eq!(class.class_begin, "data class User constructor(");
        assert_eq!(class.class_end, ")");
        assert_eq!(
            class.properties,
            vec![
                Property {
                    annotation: "@get:Key @get:Generated @get:Column(name=\"id\", nullable=false)"
                        .to_string(),
                    field: "var id: Int,".to_string(),
                },
                Property {
                    annotation: "@get:Column(name=\"is_active\", nullable=false)".to_string(),
                    field: "var active: Boolean,".to_string(),
                },
                Property {
                    annotation: "@get:Column(name=\"email\", length=255, nullable=false)"
                        .to_string(),
                    field: "var email: String".to_string(),
                },
            ]
        );
    }

    #[test]
    fn interface_has_no_separators() {
        let class = assemble(&users(), &interface_config()).unwrap();

        assert_eq!(class.model, "kt");
        assert_eq!(class.class_begin, "interface User {");
        assert_eq!(class.class_end, "}");
        assert!(!class.class_begin.contains("constructor"));
        assert!(class.properties.iter().all(|p| !p.field.ends_with(',')));
    }

    #[test]
    fn one_property_per_column_and_last_has_no_comma() {
        let mut table = users();
        table.columns.push(ColumnDescriptor::new("created_at", "timestamp"));
        let class = assemble(&table, &GeneratorConfig::default()).unwrap();

        assert_eq!(class.properties.len(), 4);
        let (last, rest) = class.properties.split_last().unwrap();
        assert_eq!(last.field, "var createdAt: java.time.ZonedDateTime?");
        assert!(rest.iter().all(|p| p.field.ends_with(',')));
    }

    #[test]
    fn nullable_columns_get_question_mark() {
        let table = TableSchema::with_columns(
            "profiles",
            [ColumnDescriptor::new("display_name", "varchar(64)")],
        );
        let class = assemble(&table, &GeneratorConfig::default()).unwrap();

        assert_eq!(class.class_name, "Profile");
        assert_eq!(class.properties[0].field, "var displayName: String?");
        assert_eq!(
            class.properties[0].annotation,
            "@get:Column(name=\"display_name\", length=64, nullable=true)"
        );
    }

    #[test]
    fn bare_boolean_prefix_keeps_its_name() {
        let table = TableSchema::with_columns(
            "flags",
            [ColumnDescriptor {
                nullable: false,
                ..ColumnDescriptor::new("is_", "tinyint(1)")
            }],
        );
        let class = assemble(&table, &GeneratorConfig::default()).unwrap();

        assert_eq!(class.properties[0].field, "var `is`: Boolean");
        assert_eq!(
            class.properties[0].annotation,
            "@get:Column(name=\"is_\", nullable=false)"
        );
    }

    #[test]
    fn reserved_field_names_are_quoted() {
        let table = TableSchema::with_columns(
            "events",
            [
                ColumnDescriptor::new("when", "datetime"),
                ColumnDescriptor::new("object_id", "int"),
            ],
        );
        let class = assemble(&table, &GeneratorConfig::default()).unwrap();

        assert_eq!(class.properties[0].field, "var `when`: java.time.ZonedDateTime?,");
        assert_eq!(class.properties[1].field, "var objectId: Int?");
    }

    #[test]
    fn unsupported_type_fails_assembly() {
        let mut table = users();
        table.columns.push(ColumnDescriptor::new("location", "point"));

        let err = assemble(&table, &GeneratorConfig::default()).unwrap_err();
        assert!(err.is_unsupported_type());
    }

    #[test]
    fn empty_table_is_an_error() {
        let err = assemble(&TableSchema::new("ghosts"), &GeneratorConfig::default()).unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyTable(name) if name == "ghosts"));
    }
}
