use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{require, ValidationError};
use crate::database::collection::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    pub id: Uuid,
    /// Stored upper-cased; unique across the collection.
    pub code: String,
    pub discount_percent: u8,
    pub expiry_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Coupon {
    const COLLECTION: &'static str = "coupons";
    const UNIQUE_FIELDS: &'static [&'static str] = &["code"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn conflict_message(_field: &str) -> String {
        "Coupon code already exists".to_string()
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponInput {
    pub code: Option<String>,
    pub discount_percent: Option<f64>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

fn discount(value: f64) -> Result<u8, ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) || value.fract() != 0.0 {
        return Err(ValidationError::field(
            "discountPercent",
            "Discount percent must be a whole number between 0 and 100",
        ));
    }
    Ok(value as u8)
}

impl CouponInput {
    pub fn into_coupon(self) -> Result<Coupon, ValidationError> {
        let code = require(self.code, "code", "Coupon code is required")?;
        let discount_percent = self
            .discount_percent
            .ok_or_else(|| ValidationError::field("discountPercent", "Discount percent is required"))
            .and_then(discount)?;
        let expiry_date = self
            .expiry_date
            .ok_or_else(|| ValidationError::field("expiryDate", "Expiry date is required"))?;
        let now = Utc::now();
        Ok(Coupon {
            id: Uuid::new_v4(),
            code: normalize_code(&code),
            discount_percent,
            expiry_date,
            is_active: self.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn overlay(self, coupon: &Coupon) -> Result<Coupon, ValidationError> {
        let mut updated = coupon.clone();
        if let Some(code) = self.code {
            updated.code = normalize_code(&require(Some(code), "code", "Coupon code is required")?);
        }
        if let Some(percent) = self.discount_percent {
            updated.discount_percent = discount(percent)?;
        }
        if let Some(expiry_date) = self.expiry_date {
            updated.expiry_date = expiry_date;
        }
        if let Some(is_active) = self.is_active {
            updated.is_active = is_active;
        }
        updated.touch();
        Ok(updated)
    }
}
