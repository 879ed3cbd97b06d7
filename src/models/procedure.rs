use serde::{Deserialize, Serialize};

use super::enums::ProcedureCategory;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Procedure {
    pub id: String,
    pub name: String,
    pub category: ProcedureCategory,
    pub price: i64,
    /// Minutes.
    pub duration: u32,
    pub description: Option<String>,
    pub code: Option<String>,
}
