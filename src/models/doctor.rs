use serde::{Deserialize, Serialize};

use super::enums::DoctorStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub status: DoctorStatus,
    pub load_percent: u8,
    pub rating: f32,
    pub appointments_today: u32,
    /// Years.
    pub experience: u32,
    pub education: Option<String>,
    pub category: Option<String>,
}

impl Doctor {
    /// "Last First", as shown on appointment cards.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.last_name, self.first_name)
    }
}
