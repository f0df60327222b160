//! Compiled, store-evaluable predicate.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparison {
    pub fn sql(self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Ne => "<>",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
        }
    }

    pub fn holds(self, ord: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Comparison::Eq => ord == Equal,
            Comparison::Ne => ord != Equal,
            Comparison::Gt => ord == Greater,
            Comparison::Lt => ord == Less,
            Comparison::Ge => ord != Less,
            Comparison::Le => ord != Greater,
        }
    }
}

/// A value typed by its field, ready to bind as a statement parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(n) => write!(f, "{}", n),
            Literal::Float(n) => write!(f, "{}", n),
            Literal::Text(s) => write!(f, "{:?}", s),
            Literal::DateTime(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S%.f")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// Matches every row; only produced for an absent query.
    All,
    Compare {
        column: String,
        op: Comparison,
        value: Literal,
    },
    /// SQL LIKE with `%`/`_` wildcards.
    Like { column: String, pattern: String },
    /// Set membership. An empty set matches nothing.
    In { column: String, values: Vec<Literal> },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Columns referenced, left to right.
    pub fn columns(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Predicate::All => {}
            Predicate::Compare { column, .. }
            | Predicate::Like { column, .. }
            | Predicate::In { column, .. } => out.push(column.as_str()),
            Predicate::And(children) | Predicate::Or(children) => {
                for c in children {
                    c.collect_columns(out);
                }
            }
        }
    }
}

/// Readable form for logs: `(a = 1 AND (b = 2 OR b = 3))`.
impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::All => f.write_str("TRUE"),
            Predicate::Compare { column, op, value } => {
                write!(f, "{} {} {}", column, op.sql(), value)
            }
            Predicate::Like { column, pattern } => write!(f, "{} LIKE {:?}", column, pattern),
            Predicate::In { column, values } => {
                let parts: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "{} IN ({})", column, parts.join(", "))
            }
            Predicate::And(children) | Predicate::Or(children) => {
                let sep = if matches!(self, Predicate::And(_)) { " AND " } else { " OR " };
                let parts: Vec<String> = children.iter().map(|c| c.to_string()).collect();
                write!(f, "({})", parts.join(sep))
            }
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD[T ]HH:MM:SS[.fff]`, and bare dates (midnight).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(d) = DateTime::parse_from_rfc3339(s) {
        return Some(d.naive_utc());
    }
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    for fmt in FORMATS {
        if let Ok(d) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_formats() {
        let midnight = parse_datetime("2024-03-01").unwrap();
        assert_eq!(midnight.to_string(), "2024-03-01 00:00:00");
        assert_eq!(
            parse_datetime("2024-03-01T10:30:00").unwrap().to_string(),
            "2024-03-01 10:30:00"
        );
        assert_eq!(
            parse_datetime("2024-03-01 10:30:00.250").unwrap().to_string(),
            "2024-03-01 10:30:00.250"
        );
        assert_eq!(
            parse_datetime("2024-03-01T10:30:00+02:00").unwrap().to_string(),
            "2024-03-01 08:30:00"
        );
        assert!(parse_datetime("yesterday").is_none());
        assert!(parse_datetime("2024-13-01").is_none());
    }

    #[test]
    fn display_keeps_child_order() {
        let p = Predicate::And(vec![
            Predicate::Compare {
                column: "a".into(),
                op: Comparison::Eq,
                value: Literal::Int(1),
            },
            Predicate::Or(vec![
                Predicate::Compare {
                    column: "b".into(),
                    op: Comparison::Eq,
                    value: Literal::Int(2),
                },
                Predicate::In {
                    column: "c".into(),
                    values: vec![],
                },
            ]),
        ]);
        assert_eq!(p.to_string(), "(a = 1 AND (b = 2 OR c IN ()))");
        assert_eq!(p.columns(), vec!["a", "b", "c"]);
    }

    #[test]
    fn comparison_holds() {
        use std::cmp::Ordering::*;
        assert!(Comparison::Ge.holds(Equal));
        assert!(Comparison::Ge.holds(Greater));
        assert!(!Comparison::Gt.holds(Equal));
        assert!(Comparison::Ne.holds(Less));
    }
}
