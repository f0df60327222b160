//! CMDB query engine: schema-driven filtering, sorting and pagination over entity tables.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod query;
pub mod registry;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, QueryError, RegistryError, StoreError};
pub use query::{
    compile, validate, GroupOperator, Pagination, QueryNode, QueryRequest, QueryValue, Scalar,
};
pub use registry::{
    EntityTable, FieldConfig, FieldRegistry, FieldType, Operator, RegistryCatalog,
};
pub use response::{success_one_ok, success_page};
pub use routes::{app, common_routes, query_routes};
pub use service::{QueryExecutor, QueryPage};
pub use settings::Settings;
pub use state::AppState;
pub use store::{EntityStore, MemoryStore, PgStore};
