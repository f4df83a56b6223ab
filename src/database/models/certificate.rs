use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{non_blank, require, ValidationError};
use crate::database::collection::Document;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub recipient: Uuid,
    pub issued_by: Uuid,
    pub issue_date: DateTime<Utc>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credential_id: Option<String>,
    #[serde(default)]
    pub status: CertificateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Certificate {
    const COLLECTION: &'static str = "certificates";

    fn id(&self) -> Uuid {
        self.id
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateStatus {
    #[default]
    Active,
    Revoked,
    Expired,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub recipient: Option<Uuid>,
    pub issue_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub credential_id: Option<String>,
    pub status: Option<CertificateStatus>,
}

impl CertificateInput {
    pub fn into_certificate(self, issued_by: Uuid) -> Result<Certificate, ValidationError> {
        let title = require(self.title, "title", "Title is required")?;
        let recipient = self
            .recipient
            .ok_or_else(|| ValidationError::field("recipient", "Recipient is required"))?;
        let now = Utc::now();
        let certificate = Certificate {
            id: Uuid::new_v4(),
            title,
            description: non_blank(self.description),
            recipient,
            issued_by,
            issue_date: self.issue_date.unwrap_or(now),
            expiry_date: self.expiry_date,
            credential_id: non_blank(self.credential_id),
            status: self.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        check_dates(&certificate)?;
        Ok(certificate)
    }

    /// `issued_by` is not part of the input, so ownership cannot be reassigned.
    pub fn overlay(self, certificate: &Certificate) -> Result<Certificate, ValidationError> {
        let mut updated = certificate.clone();
        if let Some(title) = self.title {
            updated.title = require(Some(title), "title", "Title is required")?;
        }
        if let Some(description) = self.description {
            updated.description = non_blank(Some(description));
        }
        if let Some(recipient) = self.recipient {
            updated.recipient = recipient;
        }
        if let Some(issue_date) = self.issue_date {
            updated.issue_date = issue_date;
        }
        if let Some(expiry_date) = self.expiry_date {
            updated.expiry_date = Some(expiry_date);
        }
        if let Some(credential_id) = self.credential_id {
            updated.credential_id = non_blank(Some(credential_id));
        }
        if let Some(status) = self.status {
            updated.status = status;
        }
        check_dates(&updated)?;
        updated.touch();
        Ok(updated)
    }
}

fn check_dates(certificate: &Certificate) -> Result<(), ValidationError> {
    match certificate.expiry_date {
        Some(expiry) if expiry < certificate.issue_date => Err(ValidationError::field(
            "expiry_date",
            "Expiry date must not precede the issue date",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn requires_title_and_recipient() {
        let issuer = Uuid::new_v4();
        let err = CertificateInput {
            title: Some("B1 Spanish".into()),
            ..Default::default()
        }
        .into_certificate(issuer)
        .unwrap_err();
        assert_eq!(err.message, "Recipient is required");

        let cert = CertificateInput {
            title: Some("B1 Spanish".into()),
            recipient: Some(Uuid::new_v4()),
            ..Default::default()
        }
        .into_certificate(issuer)
        .unwrap();
        assert_eq!(cert.issued_by, issuer);
        assert_eq!(cert.status, CertificateStatus::Active);
    }

    #[test]
    fn rejects_expiry_before_issue() {
        let now = Utc::now();
        let err = CertificateInput {
            title: Some("A2".into()),
            recipient: Some(Uuid::new_v4()),
            issue_date: Some(now),
            expiry_date: Some(now - Duration::days(1)),
            ..Default::default()
        }
        .into_certificate(Uuid::new_v4())
        .unwrap_err();
        assert!(err.field_errors.unwrap().contains_key("expiry_date"));
    }
}
