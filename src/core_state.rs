//! Shared application state.
//!
//! One `CoreState` is built at startup and shared with every request
//! handler through `Arc`. The clinic dataset is held in memory behind a
//! `RwLock`; local storage opens a short-lived SQLite connection per call.

use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::config::AppConfig;
use crate::db;
use crate::format::format_phone;
use crate::mock_data::{generate_clinic, ClinicData};
use crate::models::{Patient, PatientFormData, PatientStatus};
use crate::relay::{RelayClient, RelayError, DEFAULT_TIMEOUT_SECS};

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    clinic: RwLock<ClinicData>,
    storage_path: PathBuf,
    relay: RelayClient,
    pub started_at: DateTime<Utc>,
}

impl CoreState {
    /// Build state from configuration: generate the dataset, prepare the
    /// storage file, and set up the upstream client.
    pub fn from_config(config: &AppConfig) -> Result<Self, CoreError> {
        let now = Utc::now();
        let relay = RelayClient::new(&config.ai_url, config.ai_key.clone(), DEFAULT_TIMEOUT_SECS)?;
        if !relay.has_api_key() {
            tracing::warn!("DENTADESK_AI_KEY is not set; upstream may reject relay requests");
        }

        let state = Self::new(generate_clinic(config.seed, now), config.storage_path(), relay);
        // Creates the file and applies migrations up front.
        state.open_db()?;
        Ok(state)
    }

    pub fn new(clinic: ClinicData, storage_path: PathBuf, relay: RelayClient) -> Self {
        Self {
            clinic: RwLock::new(clinic),
            storage_path,
            relay,
            started_at: Utc::now(),
        }
    }

    pub fn read_clinic(&self) -> Result<RwLockReadGuard<'_, ClinicData>, CoreError> {
        self.clinic.read().map_err(|_| CoreError::LockPoisoned)
    }

    pub fn write_clinic(&self) -> Result<RwLockWriteGuard<'_, ClinicData>, CoreError> {
        self.clinic.write().map_err(|_| CoreError::LockPoisoned)
    }

    /// Open a local storage connection.
    pub fn open_db(&self) -> Result<rusqlite::Connection, CoreError> {
        db::open_database(&self.storage_path).map_err(CoreError::Database)
    }

    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    pub fn relay(&self) -> &RelayClient {
        &self.relay
    }

    /// Register a new patient with the next free `p-NNN` id.
    pub fn create_patient(&self, form: PatientFormData) -> Result<Patient, CoreError> {
        let mut clinic = self.write_clinic()?;
        let now = Utc::now();

        let next = clinic
            .patients
            .iter()
            .filter_map(|p| p.id.strip_prefix("p-")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;

        let patient = Patient {
            id: format!("p-{next:03}"),
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            middle_name: form
                .middle_name
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            birth_date: form.birth_date,
            phone: format_phone(&form.phone),
            email: form.email,
            address: form.address,
            blood_type: form.blood_type,
            allergies: form.allergies,
            chronic_diseases: form.chronic_diseases,
            insurance_number: form.insurance_number,
            balance: 0,
            status: PatientStatus::New,
            last_visit: None,
            next_appointment: None,
            assigned_doctor: None,
            notes: form.notes,
            created_at: now,
            updated_at: now,
        };

        clinic.patients.push(patient.clone());
        tracing::info!(id = %patient.id, "Patient registered");
        Ok(patient)
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Relay error: {0}")]
    Relay(#[from] RelayError),
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use chrono::TimeZone;

    /// Reference time used by every state built for tests.
    pub fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 28, 9, 0, 0).unwrap()
    }

    /// State backed by a temporary storage file and the given upstream URL.
    pub fn test_state(dir: &tempfile::TempDir, ai_url: &str) -> CoreState {
        let relay = RelayClient::new(ai_url, Some("sk-test".into()), 5).unwrap();
        CoreState::new(
            generate_clinic(7, fixed_now()),
            dir.path().join("local_storage.db"),
            relay,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use chrono::NaiveDate;

    fn form() -> PatientFormData {
        PatientFormData {
            first_name: " Ирина ".into(),
            last_name: "Орлова".into(),
            middle_name: Some("".into()),
            birth_date: NaiveDate::from_ymd_opt(1991, 5, 4).unwrap(),
            phone: "79031112233".into(),
            email: None,
            address: None,
            blood_type: Some("A(II)".into()),
            allergies: vec![],
            chronic_diseases: vec![],
            insurance_number: None,
            notes: None,
        }
    }

    #[test]
    fn test_open_db_creates_storage_file() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, "http://127.0.0.1:9/v1");
        let conn = state.open_db().unwrap();
        db::set_item(&conn, "theme", "light").unwrap();
        assert!(state.storage_path().exists());

        let again = state.open_db().unwrap();
        assert_eq!(db::get_item(&again, "theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn test_create_patient_assigns_next_id() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir, "http://127.0.0.1:9/v1");

        let patient = state.create_patient(form()).unwrap();
        assert_eq!(patient.id, "p-051");
        assert_eq!(patient.first_name, "Ирина");
        assert_eq!(patient.middle_name, None);
        assert_eq!(patient.phone, "+7 (903) 111-22-33");
        assert_eq!(patient.status, PatientStatus::New);

        let second = state.create_patient(form()).unwrap();
        assert_eq!(second.id, "p-052");
        assert_eq!(state.read_clinic().unwrap().patients.len(), 52);
    }

    #[test]
    fn test_from_config_prepares_storage() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            listen: "127.0.0.1:0".parse().unwrap(),
            data_dir: dir.path().join("data"),
            ai_url: "http://127.0.0.1:9/v1".into(),
            ai_key: None,
            seed: 3,
        };
        let state = CoreState::from_config(&config).unwrap();
        assert!(config.storage_path().exists());
        assert_eq!(state.read_clinic().unwrap().appointments.len(), 200);
        assert!(!state.relay().has_api_key());
    }
}
