use serde::{Deserialize, Serialize};

use super::enums::{Quadrant, ToothStatus};

/// One tooth on the dental chart, numbered in FDI notation (11..48).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooth {
    pub id: String,
    pub number: u8,
    pub name: String,
    pub quadrant: Quadrant,
    pub status: ToothStatus,
    pub condition: Option<String>,
    pub treatment: Option<String>,
}
