//! Process-wide catalog: entity name -> table description and field registry.
//! Built once before serving, then shared read-only.

use crate::error::{QueryError, RegistryError};
use crate::registry::{network_segment, server, EntityTable, FieldConfig, FieldRegistry};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug)]
pub struct RegisteredEntity {
    pub table: EntityTable,
    pub fields: FieldRegistry,
}

#[derive(Clone, Debug, Default)]
pub struct RegistryCatalog {
    entities: HashMap<String, RegisteredEntity>,
}

impl RegistryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with the shipped entities: `server` and `network_segment`.
    pub fn with_defaults() -> Result<Self, RegistryError> {
        let mut catalog = RegistryCatalog::new();
        server::register(&mut catalog)?;
        network_segment::register(&mut catalog)?;
        Ok(catalog)
    }

    pub fn add_entity(&mut self, table: EntityTable) -> Result<(), RegistryError> {
        table.check()?;
        if self.entities.contains_key(&table.entity) {
            return Err(RegistryError::DuplicateEntity(table.entity.clone()));
        }
        let fields = FieldRegistry::new(table.entity.clone());
        self.entities
            .insert(table.entity.clone(), RegisteredEntity { table, fields });
        Ok(())
    }

    pub fn register(
        &mut self,
        entity: &str,
        name: &str,
        config: FieldConfig,
    ) -> Result<(), RegistryError> {
        let entry = self
            .entities
            .get_mut(entity)
            .ok_or_else(|| RegistryError::UnknownEntity(entity.to_string()))?;
        entry.fields.register(&entry.table, name, config)
    }

    pub fn entity(&self, entity: &str) -> Result<&RegisteredEntity, QueryError> {
        self.entities
            .get(entity)
            .ok_or_else(|| QueryError::UnknownEntity(entity.to_string()))
    }

    pub fn fields(&self, entity: &str) -> Result<&FieldRegistry, QueryError> {
        Ok(&self.entity(entity)?.fields)
    }

    pub fn table(&self, entity: &str) -> Result<&EntityTable, QueryError> {
        Ok(&self.entity(entity)?.table)
    }

    pub fn get(&self, entity: &str, name: &str) -> Result<&FieldConfig, QueryError> {
        self.fields(entity)?.get(name)
    }

    pub fn all_fields(&self, entity: &str) -> Result<&BTreeMap<String, FieldConfig>, QueryError> {
        Ok(self.fields(entity)?.all_fields())
    }

    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{FieldType, SqlType};

    #[test]
    fn defaults_ship_server_and_network_segment() {
        let catalog = RegistryCatalog::with_defaults().unwrap();
        assert_eq!(catalog.entity_names(), vec!["network_segment", "server"]);
        let tag = catalog.get("server", "service_tag").unwrap();
        assert_eq!(tag.field_type, FieldType::String);
        assert!(catalog.get("network_segment", "service_tag").is_err());
    }

    #[test]
    fn entities_are_independent() {
        let mut catalog = RegistryCatalog::new();
        for entity in ["a", "b"] {
            catalog
                .add_entity(
                    EntityTable::new(entity, entity, "id")
                        .column("id", SqlType::BigInt)
                        .column("name", SqlType::Text),
                )
                .unwrap();
        }
        catalog
            .register("a", "name", FieldConfig::new("name", FieldType::String, ""))
            .unwrap();
        let choice = FieldConfig::new("name", FieldType::Enum, "").enum_values(&["x"]);
        catalog.register("b", "name", choice).unwrap();
        assert_eq!(catalog.get("a", "name").unwrap().field_type, FieldType::String);
        assert_eq!(catalog.get("b", "name").unwrap().field_type, FieldType::Enum);
        assert!(catalog.all_fields("a").unwrap().contains_key("name"));
    }

    #[test]
    fn unknown_entity() {
        let mut catalog = RegistryCatalog::new();
        assert_eq!(
            catalog.get("rack", "id").unwrap_err(),
            QueryError::UnknownEntity("rack".into())
        );
        assert_eq!(
            catalog
                .register("rack", "id", FieldConfig::new("id", FieldType::Integer, ""))
                .unwrap_err(),
            RegistryError::UnknownEntity("rack".into())
        );
    }

    #[test]
    fn duplicate_entity() {
        let mut catalog = RegistryCatalog::with_defaults().unwrap();
        let table = catalog.table("server").unwrap().clone();
        assert_eq!(
            catalog.add_entity(table).unwrap_err(),
            RegistryError::DuplicateEntity("server".into())
        );
    }
}
