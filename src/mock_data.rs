//! Mock clinic dataset: hand-authored records plus seeded random fill.
//!
//! Everything the dashboard shows (patients, procedures, doctors,
//! appointments, transactions, treatment plans, settings, analytics)
//! is built once at startup by [`generate_clinic`]. The same seed and
//! reference time always produce the same dataset.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::models::*;

/// Number of generated patients appended after the hand-authored ones.
pub const GENERATED_PATIENTS: usize = 40;
/// Number of generated appointments.
pub const GENERATED_APPOINTMENTS: usize = 200;
/// Number of generated finance transactions.
pub const GENERATED_TRANSACTIONS: usize = 150;

// ═══════════════════════════════════════════════════════════
// Dataset
// ═══════════════════════════════════════════════════════════

/// The whole in-memory clinic dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicData {
    pub patients: Vec<Patient>,
    pub procedures: Vec<Procedure>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub transactions: Vec<Transaction>,
    pub treatment_plans: Vec<TreatmentPlan>,
    pub settings: ClinicSettings,
    pub analytics: AnalyticsData,
}

impl ClinicData {
    pub fn patient(&self, id: &str) -> Option<&Patient> {
        self.patients.iter().find(|p| p.id == id)
    }

    pub fn doctor(&self, id: &str) -> Option<&Doctor> {
        self.doctors.iter().find(|d| d.id == id)
    }

    pub fn appointment(&self, id: &str) -> Option<&Appointment> {
        self.appointments.iter().find(|a| a.id == id)
    }

    pub fn procedure(&self, id: &str) -> Option<&Procedure> {
        self.procedures.iter().find(|p| p.id == id)
    }

    /// Names for a list of procedure ids; unknown ids render as "Процедура".
    pub fn procedure_names(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.procedure(id)
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Процедура".to_string())
            })
            .collect()
    }

    /// Patient display name for a plan or appointment card.
    pub fn patient_name(&self, patient_id: &str) -> String {
        self.patient(patient_id)
            .map(Patient::short_name)
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

/// Build the full clinic dataset.
///
/// `now` anchors every relative date (appointments 30–90 days back,
/// transactions within the last 90 days, generated last visits).
pub fn generate_clinic(seed: u64, now: DateTime<Utc>) -> ClinicData {
    let mut rng = StdRng::seed_from_u64(seed);
    let today = now.date_naive();

    let mut patients = authored_patients();
    patients.extend(generate_additional_patients(
        &mut rng,
        GENERATED_PATIENTS,
        now,
    ));
    let procedures = procedures();
    let doctors = doctors();
    let appointments = generate_appointments(&mut rng, &patients, &doctors, &procedures, now);
    let transactions = generate_transactions(&mut rng, &patients, now);

    tracing::debug!(
        seed,
        %today,
        patients = patients.len(),
        appointments = appointments.len(),
        transactions = transactions.len(),
        "Mock clinic data generated"
    );

    ClinicData {
        patients,
        procedures,
        doctors,
        appointments,
        transactions,
        treatment_plans: treatment_plans(),
        settings: clinic_settings(),
        analytics: analytics_data(),
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn ts(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn at_time_of(date: NaiveDate, now: DateTime<Utc>) -> DateTime<Utc> {
    date.and_time(now.time()).and_utc()
}

// ═══════════════════════════════════════════════════════════
// Patients
// ═══════════════════════════════════════════════════════════

struct PatientSeed {
    id: &'static str,
    first: &'static str,
    last: &'static str,
    middle: Option<&'static str>,
    birth: (i32, u32, u32),
    phone: &'static str,
}

fn base_patient(seed: PatientSeed, created: &str, updated: &str) -> Patient {
    Patient {
        id: seed.id.to_string(),
        first_name: seed.first.to_string(),
        last_name: seed.last.to_string(),
        middle_name: seed.middle.map(str::to_string),
        birth_date: ymd(seed.birth.0, seed.birth.1, seed.birth.2),
        phone: seed.phone.to_string(),
        email: None,
        address: None,
        blood_type: None,
        allergies: Vec::new(),
        chronic_diseases: Vec::new(),
        insurance_number: None,
        balance: 0,
        status: PatientStatus::Active,
        last_visit: None,
        next_appointment: None,
        assigned_doctor: None,
        notes: None,
        created_at: ts(created),
        updated_at: ts(updated),
    }
}

fn authored_patients() -> Vec<Patient> {
    vec![
        Patient {
            email: Some("petrov@example.com".into()),
            address: Some("г. Москва, ул. Тверская, д. 10, кв. 5".into()),
            blood_type: Some("O(I)".into()),
            allergies: strings(&["Лидокаин"]),
            chronic_diseases: strings(&["Гипертония"]),
            insurance_number: Some("1234567890123456".into()),
            last_visit: Some(ymd(2024, 12, 20)),
            next_appointment: Some(ymd(2024, 12, 30)),
            assigned_doctor: Some("d-001".into()),
            notes: Some("Предпочитает лечение в утренние часы".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-001",
                    first: "Александр",
                    last: "Петров",
                    middle: Some("Сергеевич"),
                    birth: (1985, 3, 15),
                    phone: "+7 (916) 123-45-67",
                },
                "2023-01-15T10:00:00Z",
                "2024-12-20T14:30:00Z",
            )
        },
        Patient {
            email: Some("smirnova@example.com".into()),
            address: Some("г. Москва, ул. Ленина, д. 25".into()),
            blood_type: Some("A(II)".into()),
            balance: 15_000,
            last_visit: Some(ymd(2024, 12, 18)),
            assigned_doctor: Some("d-002".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-002",
                    first: "Елена",
                    last: "Смирнова",
                    middle: Some("Ивановна"),
                    birth: (1990, 7, 22),
                    phone: "+7 (917) 234-56-78",
                },
                "2023-03-20T09:00:00Z",
                "2024-12-18T11:20:00Z",
            )
        },
        Patient {
            address: Some("г. Москва, пр. Мира, д. 100".into()),
            blood_type: Some("B(III)".into()),
            allergies: strings(&["Пенициллин"]),
            balance: -5_000,
            last_visit: Some(ymd(2024, 12, 10)),
            assigned_doctor: Some("d-003".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-003",
                    first: "Михаил",
                    last: "Козлов",
                    middle: Some("Александрович"),
                    birth: (1978, 11, 8),
                    phone: "+7 (918) 345-67-89",
                },
                "2022-11-10T15:00:00Z",
                "2024-12-10T16:45:00Z",
            )
        },
        Patient {
            email: Some("novikova@example.com".into()),
            address: Some("г. Москва, ул. Садовая, д. 5".into()),
            blood_type: Some("AB(IV)".into()),
            last_visit: Some(ymd(2024, 12, 22)),
            assigned_doctor: Some("d-001".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-004",
                    first: "Анна",
                    last: "Новикова",
                    middle: Some("Петровна"),
                    birth: (1995, 4, 30),
                    phone: "+7 (919) 456-78-90",
                },
                "2024-01-15T10:00:00Z",
                "2024-12-22T09:15:00Z",
            )
        },
        Patient {
            balance: 25_000,
            last_visit: Some(ymd(2024, 12, 15)),
            assigned_doctor: Some("d-004".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-005",
                    first: "Дмитрий",
                    last: "Морозов",
                    middle: None,
                    birth: (1982, 9, 12),
                    phone: "+7 (920) 567-89-01",
                },
                "2023-06-20T14:00:00Z",
                "2024-12-15T12:00:00Z",
            )
        },
        Patient {
            email: Some("kovaleva@example.com".into()),
            blood_type: Some("O(I)".into()),
            last_visit: Some(ymd(2024, 12, 19)),
            assigned_doctor: Some("d-002".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-006",
                    first: "Ольга",
                    last: "Ковалева",
                    middle: Some("Сергеевна"),
                    birth: (1988, 12, 25),
                    phone: "+7 (921) 678-90-12",
                },
                "2023-08-10T11:00:00Z",
                "2024-12-19T15:30:00Z",
            )
        },
        Patient {
            address: Some("г. Москва, ул. Пушкина, д. 30".into()),
            blood_type: Some("A(II)".into()),
            allergies: strings(&["Новокаин"]),
            balance: 8_000,
            last_visit: Some(ymd(2024, 12, 8)),
            assigned_doctor: Some("d-003".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-007",
                    first: "Сергей",
                    last: "Лебедев",
                    middle: Some("Викторович"),
                    birth: (1975, 6, 18),
                    phone: "+7 (922) 789-01-23",
                },
                "2022-05-12T09:00:00Z",
                "2024-12-08T10:45:00Z",
            )
        },
        Patient {
            email: Some("popova@example.com".into()),
            blood_type: Some("B(III)".into()),
            last_visit: Some(ymd(2024, 12, 21)),
            assigned_doctor: Some("d-001".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-008",
                    first: "Мария",
                    last: "Попова",
                    middle: None,
                    birth: (1992, 2, 14),
                    phone: "+7 (923) 890-12-34",
                },
                "2024-03-25T16:00:00Z",
                "2024-12-21T14:20:00Z",
            )
        },
        Patient {
            blood_type: Some("AB(IV)".into()),
            balance: 12_000,
            status: PatientStatus::Inactive,
            last_visit: Some(ymd(2024, 10, 15)),
            assigned_doctor: Some("d-004".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-009",
                    first: "Андрей",
                    last: "Соколов",
                    middle: Some("Петрович"),
                    birth: (1980, 8, 7),
                    phone: "+7 (924) 901-23-45",
                },
                "2023-02-08T10:00:00Z",
                "2024-10-15T11:30:00Z",
            )
        },
        Patient {
            email: Some("volkova@example.com".into()),
            blood_type: Some("O(I)".into()),
            status: PatientStatus::New,
            assigned_doctor: Some("d-002".into()),
            ..base_patient(
                PatientSeed {
                    id: "p-010",
                    first: "Екатерина",
                    last: "Волкова",
                    middle: Some("Алексеевна"),
                    birth: (1998, 1, 29),
                    phone: "+7 (925) 012-34-56",
                },
                "2024-12-25T09:00:00Z",
                "2024-12-25T09:00:00Z",
            )
        },
    ]
}

const GENERATED_NAMES: &[(&str, &str)] = &[
    ("Иван", "Кузнецов"),
    ("Наталья", "Павлова"),
    ("Павел", "Соловьев"),
    ("Татьяна", "Васильева"),
    ("Роман", "Зайцев"),
    ("Людмила", "Полякова"),
    ("Виктор", "Орлов"),
    ("Светлана", "Андреева"),
    ("Константин", "Кузьмин"),
    ("Ирина", "Макарова"),
    ("Николай", "Новиков"),
    ("Алиса", "Морозова"),
    ("Борис", "Петров"),
    ("Галина", "Соколова"),
    ("Денис", "Волков"),
    ("Ева", "Козлова"),
    ("Федор", "Соловьев"),
    ("Вера", "Лебедева"),
    ("Георгий", "Кузнецов"),
    ("Дарья", "Павлова"),
    ("Захар", "Соколов"),
    ("Инна", "Волкова"),
    ("Игорь", "Зайцев"),
    ("Карина", "Попова"),
    ("Кирилл", "Морозов"),
    ("Лидия", "Смирнова"),
    ("Максим", "Новиков"),
    ("Маргарита", "Ковалева"),
    ("Олег", "Поляков"),
    ("Полина", "Андреева"),
    ("Станислав", "Орлов"),
    ("Ульяна", "Макарова"),
    ("Эдуард", "Кузьмин"),
    ("Юлия", "Васильева"),
    ("Ярослав", "Лебедев"),
    ("Арина", "Зайцева"),
    ("Владимир", "Павлов"),
    ("Глафира", "Соколова"),
    ("Даниил", "Новиков"),
];

const BLOOD_TYPES: &[&str] = &["O(I)", "A(II)", "B(III)", "AB(IV)"];
const DOCTOR_IDS: &[&str] = &["d-001", "d-002", "d-003", "d-004"];
const GENERATED_STATUSES: &[PatientStatus] = &[
    PatientStatus::Active,
    PatientStatus::Active,
    PatientStatus::Active,
    PatientStatus::Inactive,
];

fn generate_additional_patients(rng: &mut StdRng, count: usize, now: DateTime<Utc>) -> Vec<Patient> {
    let today = now.date_naive();

    (0..count)
        .map(|i| {
            let (first, last) = GENERATED_NAMES[i % GENERATED_NAMES.len()];
            let birth_date = ymd(
                1960 + rng.gen_range(0..45),
                rng.gen_range(1..=12),
                rng.gen_range(1..=28),
            );
            let phone = format!(
                "+7 (9{:02}) {:03}-{:02}-{:02}",
                rng.gen_range(10..100),
                rng.gen_range(100..1000),
                rng.gen_range(10..100),
                rng.gen_range(10..100),
            );
            let sign = if rng.gen_bool(0.7) { 1 } else { -1 };
            let balance = rng.gen_range(0..50_000) * sign;
            let months_back = rng.gen_range(0..6);
            let last_visit = today
                .checked_sub_months(Months::new(months_back))
                .unwrap_or(today);

            Patient {
                id: format!("p-{:03}", i + 11),
                first_name: first.to_string(),
                last_name: last.to_string(),
                middle_name: None,
                birth_date,
                phone,
                email: None,
                address: None,
                blood_type: BLOOD_TYPES.choose(rng).map(|s| s.to_string()),
                allergies: Vec::new(),
                chronic_diseases: Vec::new(),
                insurance_number: None,
                balance,
                status: GENERATED_STATUSES
                    .choose(rng)
                    .copied()
                    .unwrap_or(PatientStatus::Active),
                last_visit: Some(last_visit),
                next_appointment: None,
                assigned_doctor: DOCTOR_IDS.choose(rng).map(|s| s.to_string()),
                notes: None,
                created_at: ts("2024-01-01T00:00:00Z"),
                updated_at: at_time_of(last_visit, now),
            }
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Procedures & doctors
// ═══════════════════════════════════════════════════════════

fn procedures() -> Vec<Procedure> {
    use ProcedureCategory::*;

    let rows: &[(&str, &str, ProcedureCategory, i64, u32, &str)] = &[
        ("pr-001", "Консультация стоматолога", Diagnostics, 1_500, 30, "Первичный осмотр и консультация"),
        ("pr-002", "Панорамный снимок (ОПТГ)", Diagnostics, 2_000, 15, "Панорамный рентгеновский снимок челюстей"),
        ("pr-003", "Прицельный снимок", Diagnostics, 800, 10, "Рентгеновский снимок одного зуба"),
        ("pr-004", "КТ челюстей", Diagnostics, 3_500, 20, "Компьютерная томография челюстей"),
        ("pr-005", "Лечение кариеса (поверхностный)", Therapeutic, 3_500, 40, "Пломбирование при поверхностном кариесе"),
        ("pr-006", "Лечение кариеса (средний)", Therapeutic, 5_000, 50, "Пломбирование при среднем кариесе"),
        ("pr-007", "Лечение кариеса (глубокий)", Therapeutic, 7_000, 60, "Пломбирование при глубоком кариесе"),
        ("pr-008", "Лечение пульпита (1 канал)", Therapeutic, 8_000, 90, "Эндодонтическое лечение одного канала"),
        ("pr-009", "Лечение пульпита (2-3 канала)", Therapeutic, 12_000, 120, "Эндодонтическое лечение нескольких каналов"),
        ("pr-010", "Удаление зуба (простое)", Surgical, 4_000, 30, "Удаление подвижного зуба"),
        ("pr-011", "Удаление зуба (сложное)", Surgical, 8_000, 60, "Удаление ретинированного зуба"),
        ("pr-012", "Удаление зуба мудрости", Surgical, 12_000, 90, "Хирургическое удаление зуба мудрости"),
        ("pr-013", "Имплантация (Nobel)", Implant, 45_000, 120, "Установка импланта Nobel Biocare"),
        ("pr-014", "Имплантация (Straumann)", Implant, 55_000, 120, "Установка импланта Straumann"),
        ("pr-015", "Керамическая коронка", Prosthetic, 25_000, 60, "Изготовление и установка керамической коронки"),
        ("pr-016", "Металлокерамическая коронка", Prosthetic, 15_000, 60, "Изготовление и установка металлокерамической коронки"),
        ("pr-017", "Циркониевая коронка", Prosthetic, 35_000, 60, "Изготовление и установка циркониевой коронки"),
        ("pr-018", "Съёмный протез (частичный)", Prosthetic, 25_000, 90, "Изготовление частичного съёмного протеза"),
        ("pr-019", "Съёмный протез (полный)", Prosthetic, 35_000, 90, "Изготовление полного съёмного протеза"),
        ("pr-020", "Брекет-система (металл)", Orthodontic, 80_000, 45, "Установка металлической брекет-системы на одну челюсть"),
        ("pr-021", "Брекет-система (сапфир)", Orthodontic, 120_000, 45, "Установка сапфировой брекет-системы на одну челюсть"),
        ("pr-022", "Элайнеры (Star Smile)", Orthodontic, 150_000, 30, "Курс лечения элайнерами Star Smile"),
        ("pr-023", "Отбеливание ZOOM 4", Esthetic, 25_000, 90, "Профессиональное отбеливание ZOOM 4"),
        ("pr-024", "Отбеливание Opalescence", Esthetic, 15_000, 60, "Кабинетное отбеливание Opalescence"),
        ("pr-025", "Виниры (1 зуб)", Esthetic, 30_000, 60, "Изготовление и установка керамического винира"),
        ("pr-026", "Профессиональная чистка", Hygiene, 5_000, 45, "Ультразвуковая чистка + AirFlow"),
        ("pr-027", "Фторирование (челюсть)", Hygiene, 2_000, 20, "Глубокое фторирование эмали"),
        ("pr-028", "Реминерализация", Hygiene, 1_500, 15, "Реминерализация эмали препаратами"),
        ("pr-029", "Герметизация фиссур", Hygiene, 2_500, 30, "Герметизация фиссур у детей и взрослых"),
        ("pr-030", "Слепок + диагностика", Diagnostics, 3_000, 30, "Снятие слепков и диагностика"),
    ];

    rows.iter()
        .map(|(id, name, category, price, duration, description)| Procedure {
            id: id.to_string(),
            name: name.to_string(),
            category: *category,
            price: *price,
            duration: *duration,
            description: Some(description.to_string()),
            code: None,
        })
        .collect()
}

fn doctors() -> Vec<Doctor> {
    vec![
        Doctor {
            id: "d-001".into(),
            first_name: "Андрей".into(),
            last_name: "Иванов".into(),
            specialization: "Терапевт-стоматолог".into(),
            phone: "+7 (901) 111-11-11".into(),
            email: Some("ivanov@dentalpro.ru".into()),
            photo: Some("https://images.unsplash.com/photo-1612349317150-e413f6a5b16d?w=200&h=200&fit=crop".into()),
            status: DoctorStatus::Online,
            load_percent: 75,
            rating: 4.9,
            appointments_today: 8,
            experience: 12,
            education: Some("МГМУ им. Сеченова, ординатура МГМСУ".into()),
            category: Some("Высшая".into()),
        },
        Doctor {
            id: "d-002".into(),
            first_name: "Мария".into(),
            last_name: "Петрова".into(),
            specialization: "Ортодонт".into(),
            phone: "+7 (901) 222-22-22".into(),
            email: Some("petrova@dentalpro.ru".into()),
            photo: Some("https://images.unsplash.com/photo-1594824476967-48c8b964273f?w=200&h=200&fit=crop".into()),
            status: DoctorStatus::Busy,
            load_percent: 90,
            rating: 4.8,
            appointments_today: 10,
            experience: 8,
            education: Some("СПбГМУ им. Павлова, специализация по ортодонтии".into()),
            category: Some("Первая".into()),
        },
        Doctor {
            id: "d-003".into(),
            first_name: "Дмитрий".into(),
            last_name: "Соколов".into(),
            specialization: "Хирург-имплантолог".into(),
            phone: "+7 (901) 333-33-33".into(),
            email: Some("sokolov@dentalpro.ru".into()),
            photo: Some("https://images.unsplash.com/photo-1622253692010-333f2da6031d?w=200&h=200&fit=crop".into()),
            status: DoctorStatus::Online,
            load_percent: 60,
            rating: 4.95,
            appointments_today: 5,
            experience: 15,
            education: Some("РНИМУ им. Пирогова, магистратура по имплантологии".into()),
            category: Some("Высшая".into()),
        },
        Doctor {
            id: "d-004".into(),
            first_name: "Елена".into(),
            last_name: "Кузнецова".into(),
            specialization: "Ортопед".into(),
            phone: "+7 (901) 444-44-44".into(),
            email: Some("kuznetsova@dentalpro.ru".into()),
            photo: Some("https://images.unsplash.com/photo-1559839734-2b71ea197ec2?w=200&h=200&fit=crop".into()),
            status: DoctorStatus::Offline,
            load_percent: 0,
            rating: 4.7,
            appointments_today: 0,
            experience: 10,
            education: Some("Казанский ГМУ, специализация по ортопедической стоматологии".into()),
            category: Some("Высшая".into()),
        },
    ]
}

// ═══════════════════════════════════════════════════════════
// Appointments & transactions
// ═══════════════════════════════════════════════════════════

fn generate_appointments(
    rng: &mut StdRng,
    patients: &[Patient],
    doctors: &[Doctor],
    procedures: &[Procedure],
    now: DateTime<Utc>,
) -> Vec<Appointment> {
    let today = now.date_naive();
    let mut appointments = Vec::with_capacity(GENERATED_APPOINTMENTS);

    if patients.is_empty() || doctors.is_empty() || procedures.is_empty() {
        return appointments;
    }

    for i in 0..GENERATED_APPOINTMENTS {
        let days_back = rng.gen_range(0..60) + 30;
        let date = today.checked_sub_days(Days::new(days_back)).unwrap_or(today);
        let hour = 8 + rng.gen_range(0..10);
        let minute = if rng.gen_bool(0.5) { "00" } else { "30" };
        let patient = &patients[rng.gen_range(0..patients.len())];
        let doctor = &doctors[rng.gen_range(0..doctors.len())];

        let procedure_count = rng.gen_range(1..=3);
        let picked: Vec<&Procedure> = (0..procedure_count)
            .map(|_| &procedures[rng.gen_range(0..procedures.len())])
            .collect();
        let price = picked.iter().map(|p| p.price).sum();
        let procedure_ids = picked.iter().map(|p| p.id.clone()).collect();

        let status = if date > today {
            AppointmentStatus::Scheduled
        } else {
            AppointmentStatus::ALL[rng.gen_range(0..AppointmentStatus::ALL.len())]
        };
        let appointment_type = AppointmentType::ALL[rng.gen_range(0..AppointmentType::ALL.len())];
        let is_paid = status == AppointmentStatus::Completed && rng.gen_bool(0.8);
        let day_start = date.and_time(chrono::NaiveTime::MIN).and_utc();

        appointments.push(Appointment {
            id: format!("a-{:04}", i + 1),
            patient_id: patient.id.clone(),
            patient_name: patient.full_name(),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.display_name(),
            date,
            time: format!("{hour:02}:{minute}"),
            duration: 30 + rng.gen_range(0..90),
            appointment_type,
            status,
            procedure_ids,
            notes: None,
            price,
            is_paid,
            created_at: day_start - chrono::Duration::days(7),
            updated_at: day_start,
        });
    }

    appointments.sort_by(|a, b| (b.date, &b.time).cmp(&(a.date, &a.time)));
    appointments
}

const INCOME_CATEGORIES: &[&str] = &[
    "Лечение",
    "Консультация",
    "Протезирование",
    "Имплантация",
    "Чистка",
    "Отбеливание",
];

const EXPENSE_CATEGORIES: &[&str] = &[
    "Аренда",
    "Зарплата",
    "Материалы",
    "Оборудование",
    "Налоги",
    "Коммуналка",
    "Маркетинг",
];

fn generate_transactions(
    rng: &mut StdRng,
    patients: &[Patient],
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let today = now.date_naive();

    let mut transactions: Vec<Transaction> = (0..GENERATED_TRANSACTIONS)
        .map(|i| {
            let date = today
                .checked_sub_days(Days::new(rng.gen_range(0..90)))
                .unwrap_or(today);
            let is_income = rng.gen_bool(0.7);
            let categories = if is_income {
                INCOME_CATEGORIES
            } else {
                EXPENSE_CATEGORIES
            };
            let category = categories[rng.gen_range(0..categories.len())].to_string();
            let patient = if is_income { patients.choose(rng) } else { None };
            let amount = if is_income {
                rng.gen_range(0..50_000) + 1_000
            } else {
                rng.gen_range(0..100_000) + 5_000
            };
            let method = PaymentMethod::ALL[rng.gen_range(0..PaymentMethod::ALL.len())];
            let description = if is_income {
                format!("{category} от пациента")
            } else {
                category.clone()
            };

            Transaction {
                id: format!("t-{:05}", i + 1),
                patient_id: patient.map(|p| p.id.clone()),
                patient_name: patient.map(Patient::short_name),
                kind: if is_income {
                    TransactionType::Income
                } else {
                    TransactionType::Expense
                },
                category,
                amount,
                method,
                description: Some(description),
                appointment_id: None,
                date,
                created_at: at_time_of(date, now),
            }
        })
        .collect();

    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    transactions
}

// ═══════════════════════════════════════════════════════════
// Plans, settings, analytics
// ═══════════════════════════════════════════════════════════

fn stage(
    id: &str,
    name: &str,
    procedures: &[&str],
    price: i64,
    status: StageStatus,
    order: u32,
    date: Option<NaiveDate>,
) -> TreatmentStage {
    TreatmentStage {
        id: id.to_string(),
        name: name.to_string(),
        procedures: strings(procedures),
        price,
        status,
        order,
        date,
        notes: None,
    }
}

fn treatment_plans() -> Vec<TreatmentPlan> {
    vec![
        TreatmentPlan {
            id: "tp-001".into(),
            patient_id: "p-001".into(),
            name: "Полная санация полости рта".into(),
            description: Some("Комплексное лечение кариеса и профессиональная гигиена".into()),
            stages: vec![
                stage("s-001", "Диагностика и планирование", &["pr-001", "pr-002", "pr-030"], 6_500, StageStatus::Completed, 1, Some(ymd(2024, 12, 1))),
                stage("s-002", "Лечение кариеса", &["pr-005", "pr-006"], 8_500, StageStatus::InProgress, 2, None),
                stage("s-003", "Профессиональная чистка", &["pr-026"], 5_000, StageStatus::Planned, 3, None),
            ],
            total_price: 20_000,
            discount: 2_000,
            final_price: 18_000,
            status: TreatmentPlanStatus::Active,
            progress: 40,
            start_date: ymd(2024, 12, 1),
            end_date: None,
            created_at: ts("2024-11-28T10:00:00Z"),
            updated_at: ts("2024-12-15T14:00:00Z"),
        },
        TreatmentPlan {
            id: "tp-002".into(),
            patient_id: "p-003".into(),
            name: "Имплантация и протезирование".into(),
            description: Some("Установка 2 имплантов и коронок".into()),
            stages: vec![
                stage("s-004", "Удаление зубов", &["pr-011"], 8_000, StageStatus::Completed, 1, Some(ymd(2024, 11, 15))),
                stage("s-005", "Имплантация", &["pr-013", "pr-013"], 90_000, StageStatus::InProgress, 2, None),
                stage("s-006", "Протезирование", &["pr-017", "pr-017"], 70_000, StageStatus::Planned, 3, None),
            ],
            total_price: 168_000,
            discount: 10_000,
            final_price: 158_000,
            status: TreatmentPlanStatus::Active,
            progress: 30,
            start_date: ymd(2024, 11, 15),
            end_date: None,
            created_at: ts("2024-11-10T09:00:00Z"),
            updated_at: ts("2024-12-10T16:00:00Z"),
        },
    ]
}

fn clinic_settings() -> ClinicSettings {
    let lunch = || {
        vec![BreakPeriod {
            start: "14:00".into(),
            end: "14:30".into(),
        }]
    };
    let weekday = |day: u8| WorkSchedule {
        day,
        is_working: true,
        start_time: "08:00".into(),
        end_time: "20:00".into(),
        breaks: lunch(),
    };

    ClinicSettings {
        name: "DENTAL PRO".into(),
        address: "г. Москва, ул. Тверская, д. 1, офис 100".into(),
        phone: "+7 (495) 123-45-67".into(),
        email: "info@dentalpro.ru".into(),
        inn: "1234567890".into(),
        ogrn: Some("1234567890123".into()),
        director_name: "Иванов Иван Иванович".into(),
        work_schedule: vec![
            weekday(1),
            weekday(2),
            weekday(3),
            weekday(4),
            weekday(5),
            WorkSchedule {
                day: 6,
                is_working: true,
                start_time: "09:00".into(),
                end_time: "18:00".into(),
                breaks: Vec::new(),
            },
            WorkSchedule {
                day: 0,
                is_working: false,
                start_time: "00:00".into(),
                end_time: "00:00".into(),
                breaks: Vec::new(),
            },
        ],
        appointment_duration: 30,
        reminder_hours: 24,
        theme: Theme::Light,
        currency: "RUB".into(),
    }
}

fn analytics_data() -> AnalyticsData {
    let daily = [
        145_000, 168_000, 132_000, 189_000, 156_000, 198_000, 167_000, 145_000, 178_000,
        192_000, 165_000, 201_000, 213_000, 187_000,
    ];

    AnalyticsData {
        revenue: RevenueStats {
            total: 4_580_000,
            change: 12.5,
            data: daily
                .iter()
                .zip(1u32..)
                .map(|(value, day)| RevenuePoint {
                    date: ymd(2024, 12, day),
                    value: *value,
                })
                .collect(),
        },
        patients: PatientStats {
            total: 1_247,
            new: 89,
            returning: 312,
        },
        appointments: AppointmentStats {
            total: 456,
            completed: 398,
            cancelled: 42,
            no_show: 16,
        },
        procedures: ProcedureStats {
            top: vec![
                TopProcedure { name: "Консультация".into(), count: 145, revenue: 217_500 },
                TopProcedure { name: "Лечение кариеса".into(), count: 89, revenue: 445_000 },
                TopProcedure { name: "Чистка".into(), count: 67, revenue: 335_000 },
                TopProcedure { name: "Имплантация".into(), count: 23, revenue: 1_035_000 },
                TopProcedure { name: "Коронки".into(), count: 34, revenue: 850_000 },
            ],
            by_category: vec![
                CategoryCount { category: "Терапия".into(), count: 234 },
                CategoryCount { category: "Хирургия".into(), count: 89 },
                CategoryCount { category: "Ортопедия".into(), count: 67 },
                CategoryCount { category: "Ортодонтия".into(), count: 34 },
                CategoryCount { category: "Гигиена".into(), count: 78 },
            ],
        },
        doctors: DoctorStats {
            performance: vec![
                DoctorPerformance { name: "Иванов А.П.".into(), revenue: 1_250_000, count: 89 },
                DoctorPerformance { name: "Петрова М.С.".into(), revenue: 980_000, count: 76 },
                DoctorPerformance { name: "Соколов Д.В.".into(), revenue: 1_420_000, count: 65 },
                DoctorPerformance { name: "Кузнецова Е.А.".into(), revenue: 890_000, count: 71 },
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        ts("2024-12-28T12:00:00Z")
    }

    #[test]
    fn test_dataset_sizes() {
        let data = generate_clinic(1, fixed_now());
        assert_eq!(data.patients.len(), 10 + GENERATED_PATIENTS);
        assert_eq!(data.procedures.len(), 30);
        assert_eq!(data.doctors.len(), 4);
        assert_eq!(data.appointments.len(), GENERATED_APPOINTMENTS);
        assert_eq!(data.transactions.len(), GENERATED_TRANSACTIONS);
        assert_eq!(data.treatment_plans.len(), 2);
    }

    #[test]
    fn test_same_seed_same_data() {
        let a = generate_clinic(42, fixed_now());
        let b = generate_clinic(42, fixed_now());
        assert_eq!(a.appointments, b.appointments);
        assert_eq!(a.transactions, b.transactions);
        assert_eq!(a.patients, b.patients);
    }

    #[test]
    fn test_different_seed_different_data() {
        let a = generate_clinic(1, fixed_now());
        let b = generate_clinic(2, fixed_now());
        assert_ne!(a.appointments, b.appointments);
    }

    #[test]
    fn test_generated_patient_ids_continue_numbering() {
        let data = generate_clinic(1, fixed_now());
        assert_eq!(data.patients[10].id, "p-011");
        assert_eq!(data.patients.last().unwrap().id, "p-050");
        assert_eq!(data.patients[10].first_name, "Иван");
    }

    #[test]
    fn test_appointments_are_in_the_past_window() {
        let now = fixed_now();
        let today = now.date_naive();
        let data = generate_clinic(3, now);
        for appt in &data.appointments {
            let age = (today - appt.date).num_days();
            assert!((30..90).contains(&age), "{} is {age} days old", appt.id);
            assert!(!appt.procedure_ids.is_empty() && appt.procedure_ids.len() <= 3);
            assert!((30..120).contains(&appt.duration));
        }
    }

    #[test]
    fn test_appointment_price_is_sum_of_procedures() {
        let data = generate_clinic(5, fixed_now());
        for appt in &data.appointments {
            let expected: i64 = appt
                .procedure_ids
                .iter()
                .map(|id| data.procedure(id).unwrap().price)
                .sum();
            assert_eq!(appt.price, expected);
        }
    }

    #[test]
    fn test_only_completed_appointments_are_paid() {
        let data = generate_clinic(6, fixed_now());
        assert!(data
            .appointments
            .iter()
            .filter(|a| a.is_paid)
            .all(|a| a.status == AppointmentStatus::Completed));
    }

    #[test]
    fn test_appointments_sorted_newest_first() {
        let data = generate_clinic(7, fixed_now());
        for pair in data.appointments.windows(2) {
            assert!((pair[0].date, &pair[0].time) >= (pair[1].date, &pair[1].time));
        }
    }

    #[test]
    fn test_appointment_names_match_records() {
        let data = generate_clinic(8, fixed_now());
        for appt in data.appointments.iter().take(20) {
            let patient = data.patient(&appt.patient_id).unwrap();
            let doctor = data.doctor(&appt.doctor_id).unwrap();
            assert_eq!(appt.patient_name, patient.full_name());
            assert_eq!(appt.doctor_name, doctor.display_name());
        }
    }

    #[test]
    fn test_transactions_have_consistent_shape() {
        let data = generate_clinic(9, fixed_now());
        let today = fixed_now().date_naive();
        for t in &data.transactions {
            assert!((today - t.date).num_days() < 90);
            match t.kind {
                TransactionType::Income => {
                    assert!((1_000..51_000).contains(&t.amount));
                    assert!(t.patient_id.is_some());
                    assert!(INCOME_CATEGORIES.contains(&t.category.as_str()));
                }
                TransactionType::Expense => {
                    assert!((5_000..105_000).contains(&t.amount));
                    assert!(t.patient_id.is_none());
                    assert!(EXPENSE_CATEGORIES.contains(&t.category.as_str()));
                }
            }
        }
        for pair in data.transactions.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
    }

    #[test]
    fn test_procedure_names_fall_back_for_unknown_ids() {
        let data = generate_clinic(1, fixed_now());
        let names = data.procedure_names(&["pr-026".to_string(), "pr-999".to_string()]);
        assert_eq!(names, vec!["Профессиональная чистка", "Процедура"]);
    }

    #[test]
    fn test_patient_name_lookup() {
        let data = generate_clinic(1, fixed_now());
        assert_eq!(data.patient_name("p-003"), "Козлов Михаил");
        assert_eq!(data.patient_name("p-999"), "Unknown");
    }

    #[test]
    fn test_sunday_is_a_day_off() {
        let settings = clinic_settings();
        let sunday = settings.work_schedule.iter().find(|d| d.day == 0).unwrap();
        assert!(!sunday.is_working);
        assert_eq!(settings.work_schedule.len(), 7);
    }

    #[test]
    fn test_analytics_revenue_series_is_first_half_of_december() {
        let analytics = analytics_data();
        assert_eq!(analytics.revenue.data.len(), 14);
        assert_eq!(analytics.revenue.data[0].date, ymd(2024, 12, 1));
        assert_eq!(analytics.revenue.data[13].date, ymd(2024, 12, 14));
    }
}
