//! Query filters over document fields.
//!
//! A [`Filter`] compiles to a SQL predicate on the `body` column plus its
//! bind values:
//!
//! ```text
//! Filter::Or([ContainsIgnoreCase(nombre, "caf"), ContainsIgnoreCase(categoria, "caf")])
//!   ──► (instr(lower(json_extract(body, '$.nombre')), lower(?)) > 0
//!        OR instr(lower(json_extract(body, '$.categoria')), lower(?)) > 0)
//! ```
//!
//! `lower()` folds ASCII only.

use serde_json::Value;

use crate::error::{DbError, DbResult};

/// Predicate over top-level document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document.
    All,
    /// Field equals the value.
    Eq { field: String, value: Value },
    /// Field is a string containing `needle`, ignoring case.
    ContainsIgnoreCase { field: String, needle: String },
    /// `from <= field <= to`.
    Between { field: String, from: Value, to: Value },
    /// Any of the inner filters. An empty list matches nothing.
    Or(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn contains_ignore_case(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Filter::ContainsIgnoreCase {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn between(field: impl Into<String>, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Filter::Between {
            field: field.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    /// Compiles to a SQL predicate and its bind values, in order.
    pub(crate) fn compile(&self) -> DbResult<(String, Vec<Bind>)> {
        let mut sql = String::new();
        let mut binds = Vec::new();
        self.write(&mut sql, &mut binds)?;
        Ok((sql, binds))
    }

    fn write(&self, sql: &mut String, binds: &mut Vec<Bind>) -> DbResult<()> {
        match self {
            Filter::All => sql.push_str("1 = 1"),

            Filter::Eq { field, value } => {
                let path = field_path(field)?;
                match Bind::from_value(value) {
                    Some(bind) => {
                        sql.push_str(&format!("json_extract(body, '{path}') = ?"));
                        binds.push(bind);
                    }
                    None => sql.push_str(&format!("json_extract(body, '{path}') IS NULL")),
                }
            }

            Filter::ContainsIgnoreCase { field, needle } => {
                let path = field_path(field)?;
                sql.push_str(&format!(
                    "instr(lower(json_extract(body, '{path}')), lower(?)) > 0"
                ));
                binds.push(Bind::Text(needle.clone()));
            }

            Filter::Between { field, from, to } => {
                let path = field_path(field)?;
                let (Some(from), Some(to)) = (Bind::from_value(from), Bind::from_value(to)) else {
                    return Err(DbError::QueryFailed(format!(
                        "range bounds on '{field}' must not be null"
                    )));
                };
                sql.push_str(&format!("json_extract(body, '{path}') BETWEEN ? AND ?"));
                binds.push(from);
                binds.push(to);
            }

            Filter::Or(filters) if filters.is_empty() => sql.push_str("1 = 0"),

            Filter::Or(filters) => {
                sql.push('(');
                for (i, filter) in filters.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" OR ");
                    }
                    filter.write(sql, binds)?;
                }
                sql.push(')');
            }
        }
        Ok(())
    }
}

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Bind {
    Text(String),
    Int(i64),
    Real(f64),
}

impl Bind {
    /// `None` for JSON null. Booleans compare as 0/1, the way `json_extract`
    /// returns them; arrays and objects compare as JSON text.
    fn from_value(value: &Value) -> Option<Bind> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Bind::Int(i64::from(*b))),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Bind::Int(i),
                None => Bind::Real(n.as_f64().unwrap_or(0.0)),
            }),
            Value::String(s) => Some(Bind::Text(s.clone())),
            other => Some(Bind::Text(other.to_string())),
        }
    }
}

/// JSON path for a top-level field. Field names are inlined into SQL so
/// they are restricted to `[A-Za-z0-9_]`.
pub(crate) fn field_path(field: &str) -> DbResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(DbError::QueryFailed(format!("invalid field name '{field}'")));
    }
    Ok(format!("$.{field}"))
}
