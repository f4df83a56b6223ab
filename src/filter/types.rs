use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOrderInfo {
    pub column: String,
    pub sort: SortDirection,
}

/// Case-insensitive substring match over any of `fields`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSearch {
    pub term: String,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

/// Anything a filter can be evaluated against in memory.
pub trait FieldSource {
    fn field(&self, name: &str) -> Option<&Value>;
}

impl FieldSource for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Columns that live beside the JSONB document rather than inside it.
pub const ROW_COLUMNS: &[&str] = &["id", "created_at", "updated_at"];

pub(crate) fn validate_field(name: &str) -> Result<(), super::FilterError> {
    let mut chars = name.chars();
    let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(super::FilterError::InvalidField(name.to_string()));
    }
    Ok(())
}
