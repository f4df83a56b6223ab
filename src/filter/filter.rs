use serde_json::{Map, Value};
use std::cmp::Ordering;

use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::types::{validate_field, FieldSource, FilterOrderInfo, FilterSearch, SqlResult};

/// Query description shared by every collection backend.
///
/// ```ignore
/// let filter = Filter::new()
///     .eq("status", "published")?
///     .search("spanish", &["title", "description"])?
///     .order("price desc")?
///     .limit(20, Some(40))?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    conditions: Map<String, Value>,
    search: Option<FilterSearch>,
    order_data: Vec<FilterOrderInfo>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single equality condition on a known-good field.
    pub fn by(field: &str, value: impl Into<Value>) -> Result<Self, FilterError> {
        Self::new().eq(field, value)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Result<Self, FilterError> {
        validate_field(field)?;
        self.conditions.insert(field.to_string(), value.into());
        Ok(self)
    }

    /// Blank terms are ignored.
    pub fn search(mut self, term: &str, fields: &[&str]) -> Result<Self, FilterError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(self);
        }
        for field in fields {
            validate_field(field)?;
        }
        self.search = Some(FilterSearch {
            term: term.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        });
        Ok(self)
    }

    pub fn order(mut self, spec: &str) -> Result<Self, FilterError> {
        self.order_data = FilterOrder::parse(spec)?;
        Ok(self)
    }

    pub fn limit(mut self, limit: i64, offset: Option<i64>) -> Result<Self, FilterError> {
        if limit < 0 {
            return Err(FilterError::InvalidLimit("Limit must be non-negative".to_string()));
        }
        if let Some(off) = offset {
            if off < 0 {
                return Err(FilterError::InvalidOffset("Offset must be non-negative".to_string()));
            }
        }
        self.limit = Some(limit);
        self.offset = offset;
        Ok(self)
    }

    /// Copy of this filter without ordering or paging, for counts.
    pub fn without_paging(&self) -> Self {
        Self {
            conditions: self.conditions.clone(),
            search: self.search.clone(),
            order_data: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn to_sql(&self, table_name: &str) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, self.search.as_ref(), 0);
        let query = [
            format!("SELECT doc FROM \"{}\"", table_name),
            format!("WHERE {}", where_clause),
            FilterOrder::generate(&self.order_data),
            self.build_limit_clause(),
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        SqlResult { query, params }
    }

    pub fn to_count_sql(&self, table_name: &str) -> SqlResult {
        let (where_clause, params) = FilterWhere::generate(&self.conditions, self.search.as_ref(), 0);
        SqlResult {
            query: format!(
                "SELECT COUNT(*) AS count FROM \"{}\" WHERE {}",
                table_name, where_clause
            ),
            params,
        }
    }

    pub fn matches<S: FieldSource>(&self, source: &S) -> bool {
        FilterWhere::matches(&self.conditions, self.search.as_ref(), source)
    }

    pub fn compare<S: FieldSource>(&self, a: &S, b: &S) -> Ordering {
        FilterOrder::compare(&self.order_data, a, b)
    }

    /// Apply offset and limit to an already sorted in-memory result.
    pub fn paginate<T>(&self, items: Vec<T>) -> Vec<T> {
        let offset = self.offset.unwrap_or(0).max(0) as usize;
        let iter = items.into_iter().skip(offset);
        match self.limit {
            Some(limit) => iter.take(limit.max(0) as usize).collect(),
            None => iter.collect(),
        }
    }

    fn build_limit_clause(&self) -> String {
        match (self.limit, self.offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }
}
