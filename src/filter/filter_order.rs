use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;

use super::error::FilterError;
use super::types::{validate_field, FieldSource, FilterOrderInfo, SortDirection, ROW_COLUMNS};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `"price desc, created_at"` style specs. Direction defaults to ascending.
    pub fn parse(spec: &str) -> Result<Vec<FilterOrderInfo>, FilterError> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let mut it = trimmed.split_whitespace();
            let column = it.next().unwrap_or_default();
            validate_field(column)?;
            let sort = match it.next() {
                None => SortDirection::Asc,
                Some(d) if d.eq_ignore_ascii_case("asc") => SortDirection::Asc,
                Some(d) if d.eq_ignore_ascii_case("desc") => SortDirection::Desc,
                Some(other) => return Err(FilterError::InvalidDirection(other.to_string())),
            };
            if let Some(extra) = it.next() {
                return Err(FilterError::InvalidDirection(extra.to_string()));
            }
            out.push(FilterOrderInfo {
                column: column.to_string(),
                sort,
            });
        }
        Ok(out)
    }

    pub fn generate(infos: &[FilterOrderInfo]) -> String {
        if infos.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = infos
            .iter()
            .map(|i| format!("{} {}", Self::sql_expression(&i.column), i.sort.to_sql()))
            .collect();
        format!("ORDER BY {}", parts.join(", "))
    }

    /// Row columns sort natively; document fields sort by their JSONB value,
    /// which orders numbers numerically.
    fn sql_expression(column: &str) -> String {
        if ROW_COLUMNS.contains(&column) {
            format!("\"{}\"", column)
        } else {
            format!("doc->'{}'", column)
        }
    }

    /// In-memory counterpart of `generate`. Missing values sort last when
    /// ascending, like SQL NULLs.
    pub fn compare<S: FieldSource>(infos: &[FilterOrderInfo], a: &S, b: &S) -> Ordering {
        for info in infos {
            let ordering = compare_values(a.field(&info.column), b.field(&info.column));
            let ordering = match info.sort {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
