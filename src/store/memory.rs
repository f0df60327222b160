//! In-process store over JSON rows. Evaluates predicates the way PostgreSQL would:
//! NULL or missing cells never satisfy a comparison, LIKE honours `%` and `_`,
//! ascending sorts put NULLs last.

use super::{EntityStore, OrderBy, SelectPlan, StorePage};
use crate::error::StoreError;
use crate::query::{parse_datetime, Literal, Predicate};
use crate::registry::EntityTable;
use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    rows: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(self, entity: &str, rows: Vec<Value>) -> Self {
        self.insert_all(entity, rows);
        self
    }

    pub fn insert(&self, entity: &str, row: Value) {
        self.insert_all(entity, vec![row]);
    }

    fn insert_all(&self, entity: &str, rows: Vec<Value>) {
        let mut guard = self.rows.write().unwrap_or_else(|e| e.into_inner());
        guard.entry(entity.to_string()).or_default().extend(rows);
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn run(&self, table: &EntityTable, plan: &SelectPlan) -> Result<StorePage, StoreError> {
        let guard = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        let mut matched: Vec<&Value> = guard
            .get(&table.entity)
            .map(|rows| rows.iter().filter(|r| eval(&plan.predicate, r)).collect())
            .unwrap_or_default();
        let total = matched.len() as u64;

        matched.sort_by(|a, b| compare_rows(a, b, plan.order.as_ref(), &table.primary_key));

        let rows = match plan.window {
            Some(w) => matched
                .into_iter()
                .skip(usize::try_from(w.offset).unwrap_or(usize::MAX))
                .take(w.limit as usize)
                .cloned()
                .collect(),
            None => matched.into_iter().cloned().collect(),
        };
        Ok(StorePage { rows, total })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

fn eval(predicate: &Predicate, row: &Value) -> bool {
    match predicate {
        Predicate::All => true,
        Predicate::Compare { column, op, value } => cell_cmp(row.get(column), value)
            .map(|ord| op.holds(ord))
            .unwrap_or(false),
        Predicate::Like { column, pattern } => match row.get(column).and_then(Value::as_str) {
            Some(s) => {
                let value: Vec<char> = s.chars().collect();
                let pattern: Vec<char> = pattern.chars().collect();
                like_match(&value, &pattern)
            }
            None => false,
        },
        Predicate::In { column, values } => {
            let cell = row.get(column);
            values
                .iter()
                .any(|v| cell_cmp(cell, v) == Some(Ordering::Equal))
        }
        Predicate::And(children) => children.iter().all(|c| eval(c, row)),
        Predicate::Or(children) => children.iter().any(|c| eval(c, row)),
    }
}

/// Order of a cell relative to a literal; None when NULL, missing or incomparable.
fn cell_cmp(cell: Option<&Value>, literal: &Literal) -> Option<Ordering> {
    let cell = cell.filter(|v| !v.is_null())?;
    match literal {
        Literal::Bool(b) => cell.as_bool().map(|c| c.cmp(b)),
        Literal::Int(n) => match cell.as_i64() {
            Some(c) => Some(c.cmp(n)),
            None => cell.as_f64()?.partial_cmp(&(*n as f64)),
        },
        Literal::Float(n) => cell.as_f64()?.partial_cmp(n),
        Literal::Text(s) => cell.as_str().map(|c| c.cmp(s.as_str())),
        Literal::DateTime(d) => parse_datetime(cell.as_str()?).map(|c| c.cmp(d)),
    }
}

/// SQL LIKE over chars: `%` any run, `_` exactly one. Greedy with a single backtrack point,
/// linear in `value.len() * pattern.len()` at worst.
fn like_match(value: &[char], pattern: &[char]) -> bool {
    let (mut v, mut p) = (0, 0);
    // Last `%` seen in the pattern and the value position it was resumed from.
    let mut star: Option<(usize, usize)> = None;
    while v < value.len() {
        match pattern.get(p) {
            Some('%') => {
                star = Some((p, v));
                p += 1;
            }
            Some(c) if *c == '_' || *c == value[v] => {
                v += 1;
                p += 1;
            }
            _ => match star {
                Some((sp, sv)) => {
                    star = Some((sp, sv + 1));
                    p = sp + 1;
                    v = sv + 1;
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|c| *c == '%')
}

fn compare_rows(a: &Value, b: &Value, order: Option<&OrderBy>, primary_key: &str) -> Ordering {
    let by_sort = match order {
        Some(o) => {
            let ord = compare_cells(a.get(&o.column), b.get(&o.column));
            if o.descending {
                ord.reverse()
            } else {
                ord
            }
        }
        None => Ordering::Equal,
    };
    by_sort.then_with(|| compare_cells(a.get(primary_key), b.get(primary_key)))
}

/// Total order for sorting; NULL sorts after every value.
fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
        },
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
