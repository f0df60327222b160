//! Store-facing description of an entity's table: the columns the engine may read,
//! filter and sort on.

use crate::error::RegistryError;
use regex::Regex;
use std::sync::OnceLock;

/// Column storage type. Drives SQL casts on select and value decoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    Integer,
    Numeric,
    Text,
    Boolean,
    Timestamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityTable {
    /// Entity name used by callers (e.g. "server").
    pub entity: String,
    pub table_name: String,
    pub primary_key: String,
    pub columns: Vec<ColumnDef>,
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").expect("static identifier pattern"))
}

/// Table, column and entity names end up quoted in SQL; only plain lowercase identifiers
/// are accepted.
pub fn check_identifier(name: &str) -> Result<(), RegistryError> {
    if identifier_re().is_match(name) {
        Ok(())
    } else {
        Err(RegistryError::InvalidIdentifier(name.to_string()))
    }
}

impl EntityTable {
    pub fn new(entity: &str, table_name: &str, primary_key: &str) -> Self {
        EntityTable {
            entity: entity.to_string(),
            table_name: table_name.to_string(),
            primary_key: primary_key.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, sql_type: SqlType) -> Self {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            sql_type,
        });
        self
    }

    pub fn column_def(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_def(name).is_some()
    }

    /// Identifiers are well-formed and the primary key is one of the columns.
    pub fn check(&self) -> Result<(), RegistryError> {
        check_identifier(&self.entity)?;
        check_identifier(&self.table_name)?;
        for c in &self.columns {
            check_identifier(&c.name)?;
        }
        if !self.has_column(&self.primary_key) {
            return Err(RegistryError::InvalidFieldConfig {
                field: self.primary_key.clone(),
                reason: format!("primary key is not a column of table '{}'", self.table_name),
            });
        }
        Ok(())
    }
}
