//! Bind typed literals to a sqlx PostgreSQL query.

use crate::query::Literal;
use sqlx::postgres::{PgArguments, Postgres};
use sqlx::query::Query;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Bind one literal with its native PostgreSQL type.
pub fn bind_literal<'q>(query: PgQuery<'q>, value: &'q Literal) -> PgQuery<'q> {
    match value {
        Literal::Bool(b) => query.bind(*b),
        Literal::Int(n) => query.bind(*n),
        Literal::Float(n) => query.bind(*n),
        Literal::Text(s) => query.bind(s.as_str()),
        Literal::DateTime(d) => query.bind(*d),
    }
}

/// Prepare `sql` and bind every parameter in order.
pub fn bind_all<'q>(sql: &'q str, params: &'q [Literal]) -> PgQuery<'q> {
    params
        .iter()
        .fold(sqlx::query(sql), |query, p| bind_literal(query, p))
}
