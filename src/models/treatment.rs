use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::{StageStatus, TreatmentPlanStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentPlan {
    pub id: String,
    pub patient_id: String,
    pub name: String,
    pub description: Option<String>,
    pub stages: Vec<TreatmentStage>,
    pub total_price: i64,
    pub discount: i64,
    pub final_price: i64,
    pub status: TreatmentPlanStatus,
    /// Percent, 0..=100.
    pub progress: u8,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreatmentStage {
    pub id: String,
    pub name: String,
    pub procedures: Vec<String>,
    pub price: i64,
    pub status: StageStatus,
    pub order: u32,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}
