//! Builds parameterized COUNT and page SELECTs from an entity table and a compiled predicate.

use crate::query::{Literal, Predicate};
use crate::registry::{EntityTable, SqlType};
use crate::store::{OrderBy, SelectPlan};

/// Quote identifier for PostgreSQL (safe: only from the registry).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Literal>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: Literal) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// SELECT list: numeric columns as float8 so they decode as JSON numbers.
fn select_column_list(table: &EntityTable) -> String {
    table
        .columns
        .iter()
        .map(|c| {
            let q = quoted(&c.name);
            match c.sql_type {
                SqlType::Numeric => format!("{}::float8 AS {}", q, q),
                _ => q,
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a predicate into `q.sql`, pushing every literal as a `$n` parameter.
fn push_predicate(q: &mut QueryBuf, predicate: &Predicate) {
    match predicate {
        Predicate::All => q.sql.push_str("TRUE"),
        Predicate::Compare { column, op, value } => {
            let n = q.push_param(value.clone());
            q.sql.push_str(&format!("{} {} ${}", quoted(column), op.sql(), n));
        }
        Predicate::Like { column, pattern } => {
            let n = q.push_param(Literal::Text(pattern.clone()));
            q.sql.push_str(&format!("{} LIKE ${}", quoted(column), n));
        }
        Predicate::In { values, .. } if values.is_empty() => q.sql.push_str("FALSE"),
        Predicate::In { column, values } => {
            let placeholders: Vec<String> = values
                .iter()
                .map(|v| format!("${}", q.push_param(v.clone())))
                .collect();
            q.sql
                .push_str(&format!("{} IN ({})", quoted(column), placeholders.join(", ")));
        }
        Predicate::And(children) | Predicate::Or(children) => {
            let sep = if matches!(predicate, Predicate::And(_)) { " AND " } else { " OR " };
            q.sql.push('(');
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    q.sql.push_str(sep);
                }
                push_predicate(q, child);
            }
            q.sql.push(')');
        }
    }
}

fn push_where(q: &mut QueryBuf, predicate: &Predicate) {
    if *predicate != Predicate::All {
        q.sql.push_str(" WHERE ");
        push_predicate(q, predicate);
    }
}

/// Requested sort column first, then the primary key so pages are stable.
fn order_clause(table: &EntityTable, order: Option<&OrderBy>) -> String {
    let pk = quoted(&table.primary_key);
    match order {
        Some(o) if o.column == table.primary_key => {
            format!(" ORDER BY {} {}", pk, if o.descending { "DESC" } else { "ASC" })
        }
        Some(o) => format!(
            " ORDER BY {} {}, {} ASC",
            quoted(&o.column),
            if o.descending { "DESC" } else { "ASC" },
            pk
        ),
        None => format!(" ORDER BY {} ASC", pk),
    }
}

/// SELECT COUNT(*) of rows matching the predicate; ignores the window.
pub fn select_count(table: &EntityTable, schema: &str, predicate: &Predicate) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!("SELECT COUNT(*) FROM {}", qualified_table(schema, &table.table_name));
    push_where(&mut q, predicate);
    q
}

/// SELECT the plan's page: filter, order, then optional LIMIT/OFFSET.
pub fn select_page(table: &EntityTable, schema: &str, plan: &SelectPlan) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {}",
        select_column_list(table),
        qualified_table(schema, &table.table_name)
    );
    push_where(&mut q, &plan.predicate);
    q.sql.push_str(&order_clause(table, plan.order.as_ref()));
    if let Some(window) = plan.window {
        q.sql
            .push_str(&format!(" LIMIT {} OFFSET {}", window.limit, window.offset));
    }
    q
}
