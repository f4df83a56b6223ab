use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::marker::PhantomData;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::collection::{Collection, Document};
use super::DatabaseError;
use crate::filter::{FieldSource, Filter, ROW_COLUMNS};

/// Stored document plus the row columns a SQL table would carry.
struct MemoryRow {
    doc: Value,
    meta: Value,
}

impl FieldSource for MemoryRow {
    fn field(&self, name: &str) -> Option<&Value> {
        if ROW_COLUMNS.contains(&name) {
            self.meta.get(name)
        } else {
            self.doc.get(name)
        }
    }
}

/// In-process collection used in development without a database and in tests.
pub struct MemoryCollection<T> {
    rows: RwLock<HashMap<Uuid, MemoryRow>>,
    _phantom: PhantomData<T>,
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
            _phantom: PhantomData,
        }
    }

    fn check_unique(rows: &HashMap<Uuid, MemoryRow>, id: Uuid, doc: &Value) -> Result<(), DatabaseError> {
        for field in T::UNIQUE_FIELDS {
            let Some(wanted) = doc.get(*field).and_then(Value::as_str) else {
                continue;
            };
            let wanted = wanted.to_lowercase();
            let taken = rows.iter().any(|(other_id, row)| {
                *other_id != id
                    && row
                        .doc
                        .get(*field)
                        .and_then(Value::as_str)
                        .is_some_and(|v| v.to_lowercase() == wanted)
            });
            if taken {
                return Err(DatabaseError::Conflict(T::conflict_message(field)));
            }
        }
        Ok(())
    }

    fn decode(row: &MemoryRow) -> Result<T, DatabaseError> {
        Ok(serde_json::from_value(row.doc.clone())?)
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Document> Collection<T> for MemoryCollection<T> {
    async fn find(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<&MemoryRow> = rows.values().filter(|row| filter.matches(*row)).collect();
        matched.sort_by(|a, b| filter.compare(*a, *b));
        filter
            .paginate(matched)
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<T>, DatabaseError> {
        let rows = self.rows.read().await;
        rows.get(&id).map(Self::decode).transpose()
    }

    async fn count(&self, filter: &Filter) -> Result<u64, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|row| filter.matches(*row)).count() as u64)
    }

    async fn insert(&self, doc: T) -> Result<T, DatabaseError> {
        let id = doc.id();
        let value = serde_json::to_value(&doc)?;
        let mut rows = self.rows.write().await;
        if rows.contains_key(&id) {
            return Err(DatabaseError::Conflict(format!("Duplicate id {}", id)));
        }
        Self::check_unique(&rows, id, &value)?;
        let now = Utc::now();
        rows.insert(
            id,
            MemoryRow {
                doc: value,
                meta: json!({ "id": id, "created_at": now, "updated_at": now }),
            },
        );
        debug!("Inserted {} into {}", id, T::COLLECTION);
        Ok(doc)
    }

    async fn replace(&self, doc: T) -> Result<T, DatabaseError> {
        let id = doc.id();
        let value = serde_json::to_value(&doc)?;
        let mut rows = self.rows.write().await;
        Self::check_unique(&rows, id, &value)?;
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::COLLECTION, id)))?;
        row.doc = value;
        row.meta["updated_at"] = json!(Utc::now());
        Ok(doc)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DatabaseError> {
        let mut rows = self.rows.write().await;
        Ok(rows.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::coupon::CouponInput;
    use crate::database::models::Coupon;
    use chrono::Duration;

    fn coupon(code: &str, percent: f64) -> Coupon {
        CouponInput {
            code: Some(code.into()),
            discount_percent: Some(percent),
            expiry_date: Some(Utc::now() + Duration::days(7)),
            is_active: None,
        }
        .into_coupon()
        .unwrap()
    }

    #[tokio::test]
    async fn unique_fields_conflict_case_insensitively() {
        let coupons = MemoryCollection::<Coupon>::new();
        coupons.insert(coupon("WELCOME", 10.0)).await.unwrap();

        let err = coupons.insert(coupon("welcome", 20.0)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)));
        assert_eq!(coupons.count(&Filter::new()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn replace_keeps_own_unique_value_but_not_others() {
        let coupons = MemoryCollection::<Coupon>::new();
        let first = coupons.insert(coupon("ONE", 10.0)).await.unwrap();
        coupons.insert(coupon("TWO", 10.0)).await.unwrap();

        let mut same = first.clone();
        same.discount_percent = 15;
        assert!(coupons.replace(same).await.is_ok());

        let mut clash = first.clone();
        clash.code = "TWO".into();
        assert!(matches!(coupons.replace(clash).await, Err(DatabaseError::Conflict(_))));
    }

    #[tokio::test]
    async fn replace_and_delete_missing() {
        let coupons = MemoryCollection::<Coupon>::new();
        let ghost = coupon("GHOST", 5.0);
        assert!(matches!(coupons.replace(ghost.clone()).await, Err(DatabaseError::NotFound(_))));
        assert!(!coupons.delete(ghost.id).await.unwrap());
    }

    #[tokio::test]
    async fn find_filters_sorts_and_pages() {
        let coupons = MemoryCollection::<Coupon>::new();
        for (code, pct) in [("A", 30.0), ("B", 10.0), ("C", 20.0)] {
            coupons.insert(coupon(code, pct)).await.unwrap();
        }
        let filter = Filter::new()
            .eq("isActive", true)
            .unwrap()
            .order("discountPercent desc")
            .unwrap()
            .limit(2, None)
            .unwrap();
        let found = coupons.find(&filter).await.unwrap();
        let codes: Vec<_> = found.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "C"]);

        let one = coupons.find_one(&Filter::by("code", "B").unwrap()).await.unwrap();
        assert_eq!(one.map(|c| c.discount_percent), Some(10));
    }

    #[tokio::test]
    async fn created_at_orders_by_insertion() {
        let coupons = MemoryCollection::<Coupon>::new();
        let first = coupons.insert(coupon("FIRST", 1.0)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = coupons.insert(coupon("SECOND", 1.0)).await.unwrap();

        let newest = coupons
            .find(&Filter::new().order("created_at desc").unwrap())
            .await
            .unwrap();
        assert_eq!(newest[0].id, second.id);
        assert_eq!(newest[1].id, first.id);
    }
}
