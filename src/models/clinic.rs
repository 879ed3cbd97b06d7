use serde::{Deserialize, Serialize};

use super::enums::Theme;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicSettings {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub inn: String,
    pub ogrn: Option<String>,
    pub director_name: String,
    pub work_schedule: Vec<WorkSchedule>,
    /// Default slot length in minutes.
    pub appointment_duration: u32,
    pub reminder_hours: u32,
    pub theme: Theme,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSchedule {
    /// 0 = Sunday, 1 = Monday, ...
    pub day: u8,
    pub is_working: bool,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub breaks: Vec<BreakPeriod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakPeriod {
    pub start: String,
    pub end: String,
}
