//! Russian-locale display helpers: money, phones, ages, relative times,
//! status labels and FDI tooth numbering.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use regex::Regex;

use crate::models::{AppointmentType, ProcedureCategory, Quadrant, Tooth, ToothStatus};

static NON_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\D").unwrap());
static RU_MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^7(\d{3})(\d{3})(\d{2})(\d{2})$").unwrap());

/// Group separator used by ru-RU number formatting.
const NBSP: char = '\u{00A0}';

pub const WEEK_DAYS: [&str; 7] = ["Пн", "Вт", "Ср", "Чт", "Пт", "Сб", "Вс"];

pub const MONTHS: [&str; 12] = [
    "Январь", "Февраль", "Март", "Апрель", "Май", "Июнь",
    "Июль", "Август", "Сентябрь", "Октябрь", "Ноябрь", "Декабрь",
];

const MONTHS_GENITIVE: [&str; 12] = [
    "января", "февраля", "марта", "апреля", "мая", "июня",
    "июля", "августа", "сентября", "октября", "ноября", "декабря",
];

const MONTHS_SHORT: [&str; 12] = [
    "янв.", "февр.", "мар.", "апр.", "мая", "июн.",
    "июл.", "авг.", "сент.", "окт.", "нояб.", "дек.",
];

// ─── Numbers & money ──────────────────────────────────────────────────────────

/// `15000` → `15 000` (non-breaking space groups).
pub fn format_number(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 * 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(NBSP);
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Whole roubles: `4580000` → `4 580 000 ₽`.
pub fn format_currency(amount: i64) -> String {
    format!("{}{NBSP}₽", format_number(amount))
}

// ─── Contacts & people ────────────────────────────────────────────────────────

/// Normalise an 11-digit Russian number to `+7 (XXX) XXX-XX-XX`.
/// Anything else is returned unchanged.
pub fn format_phone(phone: &str) -> String {
    let cleaned = NON_DIGIT.replace_all(phone, "");
    match RU_MOBILE.captures(&cleaned) {
        Some(c) => format!("+7 ({}) {}-{}-{}", &c[1], &c[2], &c[3], &c[4]),
        None => phone.to_string(),
    }
}

/// Full years between `birth` and `today`.
pub fn calculate_age(birth: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    age
}

/// Last-name initial followed by first-name initial, upper-cased.
pub fn initials(first_name: &str, last_name: &str) -> String {
    last_name
        .chars()
        .take(1)
        .chain(first_name.chars().take(1))
        .flat_map(char::to_uppercase)
        .collect()
}

// ─── Dates & relative time ────────────────────────────────────────────────────

/// Pick the Russian plural form: `[one, few, many]`.
pub fn declension<'a>(n: u64, forms: [&'a str; 3]) -> &'a str {
    const CASES: [usize; 6] = [2, 0, 1, 1, 1, 2];
    let rem100 = n % 100;
    if rem100 > 4 && rem100 < 20 {
        forms[2]
    } else {
        forms[CASES[(n % 10).min(5) as usize]]
    }
}

/// `2024-03-15` → `15 марта 2024 г.`
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {} {} г.",
        date.day(),
        MONTHS_GENITIVE[date.month0() as usize],
        date.year()
    )
}

/// `2024-12-30` → `30 дек.`
pub fn format_short_date(date: NaiveDate) -> String {
    format!("{} {}", date.day(), MONTHS_SHORT[date.month0() as usize])
}

/// Month heading for the calendar: `Декабрь 2024`.
pub fn month_title(year: i32, month: u32) -> Option<String> {
    let name = MONTHS.get(month.checked_sub(1)? as usize)?;
    Some(format!("{name} {year}"))
}

/// "5 минут назад" style label; falls back to the full date after a week.
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if mins < 1 {
        "только что".to_string()
    } else if mins < 60 {
        let n = mins as u64;
        format!("{n} {} назад", declension(n, ["минуту", "минуты", "минут"]))
    } else if hours < 24 {
        let n = hours as u64;
        format!("{n} {} назад", declension(n, ["час", "часа", "часов"]))
    } else if days < 7 {
        let n = days as u64;
        format!("{n} {} назад", declension(n, ["день", "дня", "дней"]))
    } else {
        format_date(then.date_naive())
    }
}

/// Compact label for the notification bell: "Только что", "12 мин назад".
pub fn notification_time_label(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now - then;
    let mins = elapsed.num_minutes();

    if mins < 1 {
        "Только что".to_string()
    } else if mins < 60 {
        format!("{mins} мин назад")
    } else if elapsed.num_hours() < 24 {
        format!("{} ч назад", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{} д назад", elapsed.num_days())
    } else {
        format_short_date(then.date_naive())
    }
}

// ─── Labels & colours ─────────────────────────────────────────────────────────

pub fn appointment_type_label(kind: AppointmentType) -> &'static str {
    match kind {
        AppointmentType::Consultation => "Консультация",
        AppointmentType::Treatment => "Лечение",
        AppointmentType::Procedure => "Процедура",
        AppointmentType::Surgery => "Хирургия",
        AppointmentType::Checkup => "Осмотр",
        AppointmentType::Cleaning => "Чистка",
        AppointmentType::Imaging => "Снимок",
        AppointmentType::Emergency => "Экстренный",
    }
}

pub fn procedure_category_label(category: ProcedureCategory) -> &'static str {
    match category {
        ProcedureCategory::Diagnostics => "Диагностика",
        ProcedureCategory::Therapeutic => "Терапия",
        ProcedureCategory::Surgical => "Хирургия",
        ProcedureCategory::Orthodontic => "Ортодонтия",
        ProcedureCategory::Prosthetic => "Протезирование",
        ProcedureCategory::Esthetic => "Эстетика",
        ProcedureCategory::Hygiene => "Гигиена",
        ProcedureCategory::Implant => "Имплантация",
    }
}

/// Badge colour for any status string (appointment, patient, doctor).
pub fn status_color(status: &str) -> &'static str {
    match status {
        "scheduled" | "on_break" => "#3B82F6",
        "confirmed" | "completed" | "active" | "online" => "#10B981",
        "in_progress" | "busy" => "#F59E0B",
        "cancelled" => "#EF4444",
        "new" => "#8B5CF6",
        _ => "#6B7280",
    }
}

// ─── Dental chart ─────────────────────────────────────────────────────────────

/// FDI number for a chart slot id such as `ur-3` or `ll-8`; 0 when unknown.
///
/// Upper-right slots run 1..8 from the wisdom tooth inward (18..11);
/// the other quadrants run outward from the midline.
pub fn tooth_number(tooth_id: &str) -> u8 {
    let Some((quadrant, position)) = tooth_id.split_once('-') else {
        return 0;
    };
    let position: u8 = match position.parse() {
        Ok(p @ 1..=8) => p,
        _ => return 0,
    };

    match quadrant {
        "ur" => 19 - position,
        "ul" => 20 + position,
        "ll" => 30 + position,
        "lr" => 40 + position,
        _ => 0,
    }
}

pub fn tooth_quadrant(number: u8) -> Option<Quadrant> {
    match number {
        11..=18 => Some(Quadrant::UpperRight),
        21..=28 => Some(Quadrant::UpperLeft),
        31..=38 => Some(Quadrant::LowerLeft),
        41..=48 => Some(Quadrant::LowerRight),
        _ => None,
    }
}

pub fn tooth_name(number: u8) -> String {
    if tooth_quadrant(number).is_none() {
        return format!("Зуб {number}");
    }
    let name = match number % 10 {
        1 => "Центральный резец",
        2 => "Боковой резец",
        3 => "Клык",
        4 => "Первый премоляр",
        5 => "Второй премоляр",
        6 => "Первый моляр",
        7 => "Второй моляр",
        _ => "Третий моляр (зуб мудрости)",
    };
    name.to_string()
}

pub fn tooth_status_label(status: ToothStatus) -> &'static str {
    match status {
        ToothStatus::Healthy => "Здоров",
        ToothStatus::Caries => "Кариес",
        ToothStatus::Pulpitis => "Пульпит",
        ToothStatus::Periodontitis => "Пародонтит",
        ToothStatus::Extraction => "Удалён",
        ToothStatus::Implant => "Имплант",
        ToothStatus::Crown => "Коронка",
        ToothStatus::Filling => "Пломба",
        ToothStatus::Absent => "Отсутствует",
        ToothStatus::Braces => "Брекеты",
    }
}

pub fn tooth_status_color(status: ToothStatus) -> &'static str {
    match status {
        ToothStatus::Healthy => "#FFFFFF",
        ToothStatus::Caries => "#FEF3C7",
        ToothStatus::Pulpitis => "#FDE68A",
        ToothStatus::Periodontitis => "#FBBF24",
        ToothStatus::Extraction => "#F3F4F6",
        ToothStatus::Implant => "#00D4AA",
        ToothStatus::Crown => "#6366F1",
        ToothStatus::Filling => "#8B5CF6",
        ToothStatus::Absent => "#E5E7EB",
        ToothStatus::Braces => "#EC4899",
    }
}

/// All 32 permanent teeth, healthy, in chart order: upper right, upper
/// left, lower left, lower right, each slot `1..=8`.
pub fn blank_dental_chart() -> Vec<Tooth> {
    const QUADRANTS: [(&str, Quadrant); 4] = [
        ("ur", Quadrant::UpperRight),
        ("ul", Quadrant::UpperLeft),
        ("ll", Quadrant::LowerLeft),
        ("lr", Quadrant::LowerRight),
    ];

    QUADRANTS
        .iter()
        .flat_map(|&(code, quadrant)| {
            (1..=8).map(move |position| {
                let id = format!("{code}-{position}");
                let number = tooth_number(&id);
                Tooth {
                    name: tooth_name(number),
                    id,
                    number,
                    quadrant,
                    status: ToothStatus::Healthy,
                    condition: None,
                    treatment: None,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(4_580_000), "4\u{a0}580\u{a0}000\u{a0}₽");
        assert_eq!(format_currency(999), "999\u{a0}₽");
        assert_eq!(format_currency(0), "0\u{a0}₽");
        assert_eq!(format_currency(-5_000), "-5\u{a0}000\u{a0}₽");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(15_000), "15\u{a0}000");
        assert_eq!(format_number(100_000), "100\u{a0}000");
        assert_eq!(format_number(1_000_000), "1\u{a0}000\u{a0}000");
    }

    #[test]
    fn test_format_phone() {
        assert_eq!(format_phone("79161234567"), "+7 (916) 123-45-67");
        assert_eq!(format_phone("7 916 123 45 67"), "+7 (916) 123-45-67");
        assert_eq!(format_phone("89161234567"), "89161234567");
        assert_eq!(format_phone("12345"), "12345");
    }

    #[test]
    fn test_calculate_age() {
        let birth = d(1985, 3, 15);
        assert_eq!(calculate_age(birth, d(2024, 3, 14)), 38);
        assert_eq!(calculate_age(birth, d(2024, 3, 15)), 39);
        assert_eq!(calculate_age(birth, d(2024, 12, 30)), 39);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("александр", "петров"), "ПА");
        assert_eq!(initials("Елена", ""), "Е");
    }

    #[test]
    fn test_declension() {
        let forms = ["минуту", "минуты", "минут"];
        assert_eq!(declension(1, forms), "минуту");
        assert_eq!(declension(3, forms), "минуты");
        assert_eq!(declension(5, forms), "минут");
        assert_eq!(declension(11, forms), "минут");
        assert_eq!(declension(21, forms), "минуту");
        assert_eq!(declension(112, forms), "минут");
        assert_eq!(declension(0, forms), "минут");
    }

    #[test]
    fn test_format_relative_time() {
        let now = at("2024-12-30T12:00:00Z");
        assert_eq!(format_relative_time(at("2024-12-30T11:59:30Z"), now), "только что");
        assert_eq!(format_relative_time(at("2024-12-30T11:55:00Z"), now), "5 минут назад");
        assert_eq!(format_relative_time(at("2024-12-30T10:00:00Z"), now), "2 часа назад");
        assert_eq!(format_relative_time(at("2024-12-29T12:00:00Z"), now), "1 день назад");
        assert_eq!(format_relative_time(at("2024-12-01T12:00:00Z"), now), "1 декабря 2024 г.");
    }

    #[test]
    fn test_notification_time_label() {
        let now = at("2024-12-30T12:00:00Z");
        assert_eq!(notification_time_label(now, now), "Только что");
        assert_eq!(notification_time_label(at("2024-12-30T11:30:00Z"), now), "30 мин назад");
        assert_eq!(notification_time_label(at("2024-12-30T09:00:00Z"), now), "3 ч назад");
        assert_eq!(notification_time_label(at("2024-12-27T12:00:00Z"), now), "3 д назад");
        assert_eq!(notification_time_label(at("2024-12-01T12:00:00Z"), now), "1 дек.");
    }

    #[test]
    fn test_month_title() {
        assert_eq!(month_title(2024, 12).as_deref(), Some("Декабрь 2024"));
        assert_eq!(month_title(2024, 0), None);
        assert_eq!(month_title(2024, 13), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(appointment_type_label(AppointmentType::Imaging), "Снимок");
        assert_eq!(procedure_category_label(ProcedureCategory::Esthetic), "Эстетика");
        assert_eq!(status_color("cancelled"), "#EF4444");
        assert_eq!(status_color("new"), "#8B5CF6");
        assert_eq!(status_color("whatever"), "#6B7280");
    }

    #[test]
    fn test_tooth_number() {
        assert_eq!(tooth_number("ur-1"), 18);
        assert_eq!(tooth_number("ur-8"), 11);
        assert_eq!(tooth_number("ul-1"), 21);
        assert_eq!(tooth_number("ll-8"), 38);
        assert_eq!(tooth_number("lr-3"), 43);
        assert_eq!(tooth_number("lr-9"), 0);
        assert_eq!(tooth_number("xx-1"), 0);
        assert_eq!(tooth_number("ur"), 0);
    }

    #[test]
    fn test_tooth_name() {
        assert_eq!(tooth_name(18), "Третий моляр (зуб мудрости)");
        assert_eq!(tooth_name(21), "Центральный резец");
        assert_eq!(tooth_name(43), "Клык");
        assert_eq!(tooth_name(19), "Зуб 19");
        assert_eq!(tooth_quadrant(36), Some(Quadrant::LowerLeft));
    }

    #[test]
    fn test_blank_dental_chart() {
        let chart = blank_dental_chart();
        assert_eq!(chart.len(), 32);
        assert_eq!(chart[0].id, "ur-1");
        assert_eq!(chart[0].number, 18);
        assert_eq!(chart[8].id, "ul-1");
        assert_eq!(chart[8].number, 21);
        assert_eq!(chart[31].number, 48);
        assert!(chart.iter().all(|t| t.status == ToothStatus::Healthy));
        assert!(chart
            .iter()
            .all(|t| tooth_quadrant(t.number) == Some(t.quadrant)));
        assert_eq!(chart[2].name, "Первый моляр");

        let mut numbers: Vec<u8> = chart.iter().map(|t| t.number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        assert_eq!(numbers.len(), 32);
    }

    #[test]
    fn test_tooth_status_labels_cover_every_status() {
        assert_eq!(tooth_status_label(ToothStatus::Extraction), "Удалён");
        assert_eq!(tooth_status_color(ToothStatus::Implant), "#00D4AA");
        assert!(ToothStatus::ALL
            .iter()
            .all(|s| tooth_status_color(*s).starts_with('#')));
    }
}
