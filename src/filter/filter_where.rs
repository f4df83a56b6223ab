use serde_json::{Map, Value};

use super::types::{FieldSource, FilterSearch};

/// WHERE clause generation and its in-memory twin. Equality conditions compile
/// to a single JSONB containment test, the search term to an OR of ILIKEs.
pub struct FilterWhere;

impl FilterWhere {
    pub fn generate(
        conditions: &Map<String, Value>,
        search: Option<&FilterSearch>,
        starting_param_index: usize,
    ) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        let mut index = starting_param_index;

        if !conditions.is_empty() {
            index += 1;
            clauses.push(format!("doc @> ${}", index));
            params.push(Value::Object(conditions.clone()));
        }

        if let Some(search) = search.filter(|s| !s.fields.is_empty()) {
            index += 1;
            let ors: Vec<String> = search
                .fields
                .iter()
                .map(|f| format!("doc->>'{}' ILIKE ${}", f, index))
                .collect();
            clauses.push(format!("({})", ors.join(" OR ")));
            params.push(Value::String(format!("%{}%", escape_like(&search.term))));
        }

        let where_clause = if clauses.is_empty() {
            "1=1".to_string()
        } else {
            clauses.join(" AND ")
        };
        (where_clause, params)
    }

    pub fn matches<S: FieldSource>(
        conditions: &Map<String, Value>,
        search: Option<&FilterSearch>,
        source: &S,
    ) -> bool {
        let equal = conditions
            .iter()
            .all(|(field, expected)| source.field(field).is_some_and(|v| json_eq(v, expected)));
        if !equal {
            return false;
        }

        match search.filter(|s| !s.fields.is_empty()) {
            None => true,
            Some(search) => {
                let needle = search.term.to_lowercase();
                search.fields.iter().any(|f| match source.field(f) {
                    Some(Value::String(s)) => s.to_lowercase().contains(&needle),
                    Some(v @ (Value::Number(_) | Value::Bool(_))) => v.to_string().contains(&needle),
                    _ => false,
                })
            }
        }
    }
}

/// Numbers compare by value so `1` and `1.0` match, as they do under `@>`.
fn json_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conditions(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn empty_filter_is_tautology() {
        let (sql, params) = FilterWhere::generate(&Map::new(), None, 0);
        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn containment_and_search_number_params_in_order() {
        let search = FilterSearch {
            term: "50%_off".into(),
            fields: vec!["title".into(), "description".into()],
        };
        let (sql, params) =
            FilterWhere::generate(&conditions(json!({"status": "published"})), Some(&search), 0);
        assert_eq!(
            sql,
            "doc @> $1 AND (doc->>'title' ILIKE $2 OR doc->>'description' ILIKE $2)"
        );
        assert_eq!(params[0], json!({"status": "published"}));
        assert_eq!(params[1], json!("%50\\%\\_off%"));
    }

    #[test]
    fn in_memory_matching() {
        let doc = json!({"status": "published", "title": "Spanish for Travel", "price": 10.0});
        assert!(FilterWhere::matches(&conditions(json!({"price": 10})), None, &doc));
        assert!(!FilterWhere::matches(&conditions(json!({"status": "draft"})), None, &doc));

        let search = FilterSearch {
            term: "TRAVEL".into(),
            fields: vec!["title".into()],
        };
        assert!(FilterWhere::matches(&Map::new(), Some(&search), &doc));
        let miss = FilterSearch {
            term: "german".into(),
            fields: vec!["title".into()],
        };
        assert!(!FilterWhere::matches(&Map::new(), Some(&miss), &doc));
    }
}
