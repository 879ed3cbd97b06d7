use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the serde wire form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(PatientStatus {
    Active => "active",
    Inactive => "inactive",
    New => "new",
});

str_enum!(AppointmentType {
    Consultation => "consultation",
    Treatment => "treatment",
    Procedure => "procedure",
    Surgery => "surgery",
    Checkup => "checkup",
    Cleaning => "cleaning",
    Imaging => "imaging",
    Emergency => "emergency",
});

str_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

str_enum!(ProcedureCategory {
    Diagnostics => "diagnostics",
    Therapeutic => "therapeutic",
    Surgical => "surgical",
    Orthodontic => "orthodontic",
    Prosthetic => "prosthetic",
    Esthetic => "esthetic",
    Hygiene => "hygiene",
    Implant => "implant",
});

str_enum!(TreatmentPlanStatus {
    Draft => "draft",
    Active => "active",
    Paused => "paused",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(StageStatus {
    Planned => "planned",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

str_enum!(TransactionType {
    Income => "income",
    Expense => "expense",
});

str_enum!(PaymentMethod {
    Cash => "cash",
    Card => "card",
    Transfer => "transfer",
    Insurance => "insurance",
    Installment => "installment",
    Online => "online",
});

str_enum!(DoctorStatus {
    Online => "online",
    Offline => "offline",
    Busy => "busy",
    OnBreak => "on_break",
});

str_enum!(NotificationType {
    Appointment => "appointment",
    Payment => "payment",
    Task => "task",
    System => "system",
});

str_enum!(NotificationPriority {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(Theme {
    Light => "light",
    Dark => "dark",
    System => "system",
});

str_enum!(Quadrant {
    UpperRight => "upper_right",
    UpperLeft => "upper_left",
    LowerLeft => "lower_left",
    LowerRight => "lower_right",
});

str_enum!(ToothStatus {
    Healthy => "healthy",
    Caries => "caries",
    Pulpitis => "pulpitis",
    Periodontitis => "periodontitis",
    Extraction => "extraction",
    Implant => "implant",
    Crown => "crown",
    Filling => "filling",
    Absent => "absent",
    Braces => "braces",
});

str_enum!(Language {
    Ru => "ru",
    En => "en",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn appointment_status_uses_snake_case_strings() {
        assert_eq!(AppointmentStatus::InProgress.as_str(), "in_progress");
        assert_eq!(AppointmentStatus::NoShow.as_str(), "no_show");
        assert_eq!(
            AppointmentStatus::from_str("no_show").unwrap(),
            AppointmentStatus::NoShow
        );
    }

    #[test]
    fn serde_form_matches_as_str() {
        for status in DoctorStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = PatientStatus::from_str("archived").unwrap_err();
        match err {
            DatabaseError::InvalidEnum { field, value } => {
                assert_eq!(field, "PatientStatus");
                assert_eq!(value, "archived");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn all_lists_every_variant() {
        assert_eq!(AppointmentType::ALL.len(), 8);
        assert_eq!(ProcedureCategory::ALL.len(), 8);
        assert_eq!(ToothStatus::ALL.len(), 10);
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(TransactionType::Expense.to_string(), "expense");
    }
}
