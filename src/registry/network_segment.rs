//! The `network_segment` entity.

use crate::error::RegistryError;
use crate::registry::{EntityTable, FieldConfig, FieldType, Operator, RegistryCatalog, SqlType};

pub const ENTITY: &str = "network_segment";

pub fn table() -> EntityTable {
    use SqlType::*;
    EntityTable::new(ENTITY, "network_segment", "id")
        .column("id", BigInt)
        .column("name", Text)
        .column("network", Text)
        .column("gateway", Text)
        .column("dns", Text)
        .column("description", Text)
        .column("created_by", Text)
        .column("created_date", Timestamp)
        .column("last_modified_by", Text)
        .column("last_modified_date", Timestamp)
        .column("is_valid", Boolean)
}

pub fn fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig::new("id", FieldType::Integer, "network segment id")
            .operators(&[Operator::Eq, Operator::Ne, Operator::In])
            .multi_select(),
        FieldConfig::new("name", FieldType::String, "segment name"),
        FieldConfig::new("network", FieldType::String, "network address"),
        FieldConfig::new("gateway", FieldType::String, "gateway address"),
        FieldConfig::new("dns", FieldType::String, "DNS servers"),
        FieldConfig::new("description", FieldType::String, "description"),
        FieldConfig::new("created_date", FieldType::Datetime, "creation time"),
        FieldConfig::new("is_valid", FieldType::Boolean, "record is valid"),
    ]
}

pub fn register(catalog: &mut RegistryCatalog) -> Result<(), RegistryError> {
    catalog.add_entity(table())?;
    for field in fields() {
        let name = field.name.clone();
        catalog.register(ENTITY, &name, field)?;
    }
    Ok(())
}
