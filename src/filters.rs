//! List filtering and aggregation behind the patient, appointment,
//! finance and dashboard screens.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;
use crate::models::*;

/// Number of upcoming appointments shown on the dashboard.
pub const UPCOMING_LIMIT: usize = 6;

/// Header row of the finance CSV export.
pub const CSV_HEADER: &str = "Дата,Категория,Описание,Тип,Сумма";

/// Parse a status tab value. `"all"` or an empty string selects everything.
pub fn parse_tab<T>(raw: Option<&str>) -> Result<Option<T>, DatabaseError>
where
    T: FromStr<Err = DatabaseError>,
{
    match raw.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

// ─── Patients ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    pub search: Option<String>,
    pub status: Option<PatientStatus>,
}

impl PatientFilter {
    pub fn matches(&self, patient: &Patient) -> bool {
        let status_ok = self.status.map_or(true, |s| patient.status == s);
        status_ok && self.matches_search(patient)
    }

    fn matches_search(&self, patient: &Patient) -> bool {
        let query = match self.search.as_deref() {
            Some(q) if !q.is_empty() => q,
            _ => return true,
        };

        let haystack = format!(
            "{} {} {}",
            patient.last_name,
            patient.first_name,
            patient.middle_name.as_deref().unwrap_or("")
        )
        .to_lowercase();

        haystack.contains(&query.to_lowercase()) || patient.phone.contains(query)
    }

    pub fn apply<'a>(&self, patients: &'a [Patient]) -> Vec<&'a Patient> {
        patients.iter().filter(|p| self.matches(p)).collect()
    }
}

// ─── Appointments ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub status: Option<AppointmentStatus>,
    pub doctor_id: Option<String>,
    pub patient_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl AppointmentFilter {
    pub fn matches(&self, appt: &Appointment) -> bool {
        self.status.map_or(true, |s| appt.status == s)
            && self.doctor_id.as_deref().map_or(true, |id| appt.doctor_id == id)
            && self.patient_id.as_deref().map_or(true, |id| appt.patient_id == id)
            && self.date_from.map_or(true, |from| appt.date >= from)
            && self.date_to.map_or(true, |to| appt.date <= to)
    }

    pub fn apply<'a>(&self, appointments: &'a [Appointment]) -> Vec<&'a Appointment> {
        appointments.iter().filter(|a| self.matches(a)).collect()
    }
}

// ─── Finance ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub kind: Option<TransactionType>,
}

impl TransactionFilter {
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions
            .iter()
            .filter(|t| self.kind.map_or(true, |k| t.kind == k))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSummary {
    pub total_income: i64,
    pub total_expense: i64,
    pub profit: i64,
    pub income_count: usize,
    pub expense_count: usize,
}

pub fn finance_summary(transactions: &[Transaction]) -> FinanceSummary {
    let mut summary = FinanceSummary {
        total_income: 0,
        total_expense: 0,
        profit: 0,
        income_count: 0,
        expense_count: 0,
    };

    for t in transactions {
        match t.kind {
            TransactionType::Income => {
                summary.total_income += t.amount;
                summary.income_count += 1;
            }
            TransactionType::Expense => {
                summary.total_expense += t.amount;
                summary.expense_count += 1;
            }
        }
    }

    summary.profit = summary.total_income - summary.total_expense;
    summary
}

/// Render transactions as CSV (no BOM; the HTTP layer prepends one).
pub fn transactions_csv(transactions: &[Transaction]) -> String {
    let mut lines = Vec::with_capacity(transactions.len() + 1);
    lines.push(CSV_HEADER.to_string());

    for t in transactions {
        let kind = match t.kind {
            TransactionType::Income => "Доход",
            TransactionType::Expense => "Расход",
        };
        lines.push(
            [
                t.date.to_string(),
                csv_field(&t.category),
                csv_field(t.description.as_deref().unwrap_or("")),
                kind.to_string(),
                t.amount.to_string(),
            ]
            .join(","),
        );
    }

    lines.join("\n")
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

// ─── Plans & team ─────────────────────────────────────────────────────────────

pub fn plans_by_status(
    plans: &[TreatmentPlan],
    status: Option<TreatmentPlanStatus>,
) -> Vec<&TreatmentPlan> {
    plans
        .iter()
        .filter(|p| status.map_or(true, |s| p.status == s))
        .collect()
}

pub fn doctors_by_status(doctors: &[Doctor], status: Option<DoctorStatus>) -> Vec<&Doctor> {
    doctors
        .iter()
        .filter(|d| status.map_or(true, |s| d.status == s))
        .collect()
}

/// Tab badge counts: `"all"` plus one entry per status value present.
pub fn status_counts<T, F>(items: &[T], status_of: F) -> BTreeMap<String, usize>
where
    F: Fn(&T) -> &'static str,
{
    let mut counts = BTreeMap::new();
    counts.insert("all".to_string(), items.len());
    for item in items {
        *counts.entry(status_of(item).to_string()).or_insert(0) += 1;
    }
    counts
}

// ─── Dashboard ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodaySummary<'a> {
    pub date: NaiveDate,
    pub appointments: Vec<&'a Appointment>,
    pub revenue: i64,
}

/// Non-cancelled appointments on `date` and the sum of their prices.
pub fn today_appointments(appointments: &[Appointment], date: NaiveDate) -> TodaySummary<'_> {
    let appointments: Vec<&Appointment> = appointments
        .iter()
        .filter(|a| a.date == date && a.status != AppointmentStatus::Cancelled)
        .collect();
    let revenue = appointments.iter().map(|a| a.price).sum();

    TodaySummary {
        date,
        appointments,
        revenue,
    }
}

/// Scheduled appointments on or after `today`, in list order, capped at `limit`.
pub fn upcoming_appointments(
    appointments: &[Appointment],
    today: NaiveDate,
    limit: usize,
) -> Vec<&Appointment> {
    appointments
        .iter()
        .filter(|a| a.date >= today && a.status == AppointmentStatus::Scheduled)
        .take(limit)
        .collect()
}
