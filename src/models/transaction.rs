use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{PaymentMethod, TransactionType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    pub amount: i64,
    pub method: PaymentMethod,
    pub description: Option<String>,
    pub appointment_id: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
