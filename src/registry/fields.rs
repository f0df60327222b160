//! Per-entity catalog of queryable fields.

use crate::error::{QueryError, RegistryError};
use crate::registry::{EntityTable, FieldConfig, FieldType};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default)]
pub struct FieldRegistry {
    entity: String,
    fields: BTreeMap<String, FieldConfig>,
}

impl FieldRegistry {
    pub fn new(entity: impl Into<String>) -> Self {
        FieldRegistry {
            entity: entity.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Add a field. Identical re-registration is a no-op; a changed config is rejected.
    pub fn register(
        &mut self,
        table: &EntityTable,
        name: &str,
        config: FieldConfig,
    ) -> Result<(), RegistryError> {
        check_config(table, name, &config)?;
        if let Some(existing) = self.fields.get(name) {
            if *existing == config {
                return Ok(());
            }
            return Err(RegistryError::DuplicateField {
                entity: self.entity.clone(),
                field: name.to_string(),
            });
        }
        self.fields.insert(name.to_string(), config);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&FieldConfig, QueryError> {
        self.fields.get(name).ok_or_else(|| QueryError::UnknownField {
            field: name.to_string(),
        })
    }

    pub fn all_fields(&self) -> &BTreeMap<String, FieldConfig> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn check_config(
    table: &EntityTable,
    name: &str,
    config: &FieldConfig,
) -> Result<(), RegistryError> {
    let invalid = |reason: String| RegistryError::InvalidFieldConfig {
        field: name.to_string(),
        reason,
    };
    if config.name != name {
        return Err(invalid(format!("config is named '{}'", config.name)));
    }
    if !table.has_column(name) {
        return Err(invalid(format!("no such column in table '{}'", table.table_name)));
    }
    if config.operators.is_empty() {
        return Err(invalid("operators must not be empty".into()));
    }
    if let Some(op) = config.operators.iter().find(|op| !config.field_type.supports(**op)) {
        return Err(invalid(format!(
            "operator '{}' is not valid for {} fields",
            op, config.field_type
        )));
    }
    if matches!(config.field_type, FieldType::Enum | FieldType::MultiSelect)
        && config.enum_values.as_ref().map_or(true, |v| v.is_empty())
    {
        return Err(invalid("enum_values must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Operator, SqlType};

    fn table() -> EntityTable {
        EntityTable::new("host", "host", "id")
            .column("id", SqlType::BigInt)
            .column("name", SqlType::Text)
            .column("state", SqlType::Text)
    }

    #[test]
    fn identical_reregistration_is_a_no_op() {
        let table = table();
        let mut reg = FieldRegistry::new("host");
        let cfg = FieldConfig::new("name", FieldType::String, "host name");
        reg.register(&table, "name", cfg.clone()).unwrap();
        reg.register(&table, "name", cfg).unwrap();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn changed_reregistration_is_rejected() {
        let table = table();
        let mut reg = FieldRegistry::new("host");
        reg.register(&table, "name", FieldConfig::new("name", FieldType::String, "host name"))
            .unwrap();
        let err = reg
            .register(&table, "name", FieldConfig::new("name", FieldType::Integer, "host name"))
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateField {
                entity: "host".into(),
                field: "name".into()
            }
        );
    }

    #[test]
    fn unknown_field_lookup() {
        let reg = FieldRegistry::new("host");
        assert_eq!(
            reg.get("rack").unwrap_err(),
            QueryError::UnknownField { field: "rack".into() }
        );
    }

    #[test]
    fn rejects_invalid_configs() {
        let table = table();
        let mut reg = FieldRegistry::new("host");
        let empty_ops = FieldConfig::new("name", FieldType::String, "").operators(&[]);
        assert!(reg.register(&table, "name", empty_ops).is_err());

        let like_on_int =
            FieldConfig::new("id", FieldType::Integer, "").operators(&[Operator::Like]);
        assert!(reg.register(&table, "id", like_on_int).is_err());

        let enum_without_values = FieldConfig::new("state", FieldType::Enum, "");
        assert!(reg.register(&table, "state", enum_without_values).is_err());

        let not_a_column = FieldConfig::new("rack", FieldType::String, "");
        assert!(reg.register(&table, "rack", not_a_column).is_err());

        let misnamed = FieldConfig::new("state", FieldType::String, "");
        assert!(reg.register(&table, "name", misnamed).is_err());
        assert!(reg.is_empty());
    }
}
