//! Wire types for the customer API

use serde::{Deserialize, Deserializer};

/// CSV column order for customer records.
pub const CSV_COLUMNS: [&str; 7] = ["id", "uuid", "name", "email", "status", "signup_date", "ltv"];

/// One customer entity as returned by `/customers`.
///
/// Every field is optional in the wire JSON; absent or null fields
/// become empty strings at the sink boundary. Numeric values (ids, ltv)
/// are carried as their string rendering.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Record {
    #[serde(deserialize_with = "scalar_string")]
    pub id: String,
    #[serde(deserialize_with = "scalar_string")]
    pub uuid: String,
    #[serde(deserialize_with = "scalar_string")]
    pub name: String,
    #[serde(deserialize_with = "scalar_string")]
    pub email: String,
    #[serde(deserialize_with = "scalar_string")]
    pub status: String,
    #[serde(deserialize_with = "scalar_string")]
    pub signup_date: String,
    #[serde(deserialize_with = "scalar_string")]
    pub ltv: String,
}

impl Record {
    /// Row in [`CSV_COLUMNS`] order.
    pub fn csv_row(&self) -> [&str; 7] {
        [
            &self.id,
            &self.uuid,
            &self.name,
            &self.email,
            &self.status,
            &self.signup_date,
            &self.ltv,
        ]
    }
}

/// Accept any JSON scalar for a record field and keep its string form.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Pagination metadata from the customers endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PageMetadata {
    pub total_pages: u32,
}

/// One page of customer records, consumed immediately by the sink.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Page {
    pub metadata: PageMetadata,
    pub data: Vec<Record>,
}
