//! Business assistant and Telegram sales bot on top of the relay.
//!
//! Both personas are plain system prompts. Replies are stripped of
//! markdown emphasis before they reach the chat bubble, and any failure
//! becomes a fixed apology for the user.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::format::{format_currency, format_number};
use crate::models::{AnalyticsData, Doctor, DoctorStatus};
use crate::relay::{ChatCompletionRequest, ChatMessage, RelayClient, RelayError};

pub const ASSISTANT_MAX_TOKENS: u32 = 4096;
pub const ASSISTANT_TEMPERATURE: f64 = 0.7;

pub const EMPTY_REPLY: &str = "Не удалось получить ответ";
pub const APOLOGY: &str = "Извините, произошла ошибка. Попробуйте позже.";

/// Load above which a doctor is flagged as overloaded.
const OVERLOAD_PERCENT: u8 = 85;

static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*#_]+").unwrap());

pub const TELEGRAM_SALES_PROMPT: &str = "Ты — AI-продавец стоматологической клиники DENTAL PRO в Telegram. Твои задачи:

1. Запись на приём: помогай пользователям записаться на консультацию или лечение
2. Консультация по услугам: объясняй виды услуг и их стоимость
3. Ответы на вопросы: отвечай на частые вопросы о лечении
4. Сбор контактов: вежливо запрашивай контактные данные для связи

Стиль общения:
- Дружелюбный и профессиональный
- Не агрессивные продажи
- Эмпатия к проблемам пациентов
- Быстрые и чёткие ответы

Если не можешь ответить на вопрос — предложи связаться с администратором клиники.";

const BUSINESS_RULES: &str = "Ты — АГЕНТНЫЙ AI-ассистент CRM системы DENTAL PRO. Ты ИНТЕГРИРОВАН в систему и ВИДИШЬ все данные.

## ТВОИ ПРАВИЛА:
1. НЕ ИСПОЛЬЗУЙ звёздочки (*) и markdown форматирование. Пиши простым текстом.
2. НЕ ЗАДАВАЙ лишних вопросов - ДЕЙСТВУЙ и давай конкретные рекомендации сразу.
3. ВСЕГДА опирайся на реальные цифры из CRM (они даны ниже).
4. Отвечай КРАТКО и ПО ДЕЛУ. Максимум 300 слов.
5. Давай КОНКРЕТНЫЕ рекомендации с цифрами.

## ТЫ МОЖЕШЬ:
- Анализировать выручку-расходы и давать финансовые советы
- Оценивать загрузку врачей и предлагать оптимизацию
- Выявлять проблемных пациентов (долги, неявки)
- Рекомендовать маркетинговые активности
- Консультировать по НДС для медицины (с 2025-2026 новые правила)
- Помогать с планированием записей

## НДС 2025-2026 ДЛЯ МЕДИЦИНЫ:
- Мед. услуги с лицензией ОСВОБОЖДЕНЫ от НДС
- С 2026: УСН до 20 млн/год = без НДС
- Превышение: ставка 5% (20-272.5 млн) или 7% (272.5-490.5 млн)
- Продажа товаров (щётки, пасты) = НДС обязателен";

const BUSINESS_CLOSING: &str =
    "Отвечай на русском, кратко, без звёздочек и лишних вопросов. Сразу давай ответ.";

// ═══════════════════════════════════════════════════════════
// Prompts
// ═══════════════════════════════════════════════════════════

fn percent(part: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(part) * 100.0 / f64::from(total)
    }
}

/// Live CRM figures block embedded in the business prompt.
pub fn crm_context(analytics: &AnalyticsData, doctors: &[Doctor], today: NaiveDate) -> String {
    let revenue = &analytics.revenue;
    let appts = &analytics.appointments;
    let patients = &analytics.patients;
    let average_check = if appts.total == 0 {
        0
    } else {
        (revenue.total as f64 / f64::from(appts.total)).round() as i64
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "## АКТУАЛЬНЫЕ ДАННЫЕ CRM DENTAL PRO ({})\n",
        today.format("%d.%m.%Y")
    );

    let _ = writeln!(out, "### ФИНАНСЫ:");
    let _ = writeln!(
        out,
        "- Общая выручка: {} (рост {:+.1}% к прошлому месяцу)",
        format_currency(revenue.total),
        revenue.change
    );
    let _ = writeln!(out, "- Средний чек: ~{}", format_currency(average_check));

    let _ = writeln!(out, "\n### ПАЦИЕНТЫ:");
    let _ = writeln!(out, "- Всего: {} пациентов", format_number(i64::from(patients.total)));
    let _ = writeln!(out, "- Новых за месяц: {}", patients.new);
    let _ = writeln!(out, "- Вернувшихся: {}", patients.returning);
    let _ = writeln!(
        out,
        "- Конверсия возврата: {:.0}%",
        percent(patients.returning, patients.total)
    );

    let _ = writeln!(out, "\n### ЗАПИСИ:");
    let _ = writeln!(out, "- Всего за месяц: {}", appts.total);
    let _ = writeln!(
        out,
        "- Завершено: {} ({:.1}%)",
        appts.completed,
        percent(appts.completed, appts.total)
    );
    let _ = writeln!(
        out,
        "- Отменено: {} ({:.1}%)",
        appts.cancelled,
        percent(appts.cancelled, appts.total)
    );
    let _ = writeln!(
        out,
        "- Неявки: {} ({:.1}%)",
        appts.no_show,
        percent(appts.no_show, appts.total)
    );

    let _ = writeln!(out, "\n### ВРАЧИ И ЗАГРУЗКА:");
    for (i, perf) in analytics.doctors.performance.iter().enumerate() {
        let doctor = matching_doctor(doctors, &perf.name);
        let load = match doctor {
            Some(d) if d.status == DoctorStatus::Offline => ", сейчас offline".to_string(),
            Some(d) => format!(", загрузка {}%", d.load_percent),
            None => String::new(),
        };
        let role = doctor
            .map(|d| format!(" ({})", d.specialization))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}. {}{} - выручка {}, {} приёмов{}",
            i + 1,
            perf.name,
            role,
            format_currency(perf.revenue),
            perf.count,
            load
        );
    }

    let _ = writeln!(out, "\n### ТОП ПРОЦЕДУР:");
    for (i, top) in analytics.procedures.top.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}: {} шт, {}",
            i + 1,
            top.name,
            top.count,
            format_currency(top.revenue)
        );
    }

    let mut problems = Vec::new();
    for d in doctors {
        if d.load_percent >= OVERLOAD_PERCENT {
            problems.push(format!(
                "- {} перегружен(а) на {}% - нужно перераспределение записей",
                d.display_name(),
                d.load_percent
            ));
        }
        if d.status == DoctorStatus::Offline {
            problems.push(format!("- {} offline - нужно уточнить причину", d.display_name()));
        }
    }
    if appts.no_show > 0 {
        problems.push(format!(
            "- {} неявок за месяц - потеря ~{}",
            appts.no_show,
            format_currency(i64::from(appts.no_show) * average_check)
        ));
    }
    if !problems.is_empty() {
        let _ = writeln!(out, "\n### ПРОБЛЕМЫ ТРЕБУЮЩИЕ ВНИМАНИЯ:");
        for p in problems {
            let _ = writeln!(out, "{p}");
        }
    }

    out
}

/// Performance rows are keyed "Фамилия И.О."; match on the last name.
fn matching_doctor<'a>(doctors: &'a [Doctor], performance_name: &str) -> Option<&'a Doctor> {
    let last_name = performance_name.split_whitespace().next()?;
    doctors.iter().find(|d| d.last_name == last_name)
}

pub fn business_system_prompt(crm_context: &str) -> String {
    format!("{BUSINESS_RULES}\n\n{crm_context}\n{BUSINESS_CLOSING}")
}

/// Sales prompt, extended with the clinic's saved bot instructions.
pub fn telegram_prompt(custom_instructions: Option<&str>) -> String {
    match custom_instructions.map(str::trim).filter(|s| !s.is_empty()) {
        Some(extra) => format!("{TELEGRAM_SALES_PROMPT}\n\nДополнительные инструкции клиники:\n{extra}"),
        None => TELEGRAM_SALES_PROMPT.to_string(),
    }
}

// ═══════════════════════════════════════════════════════════
// Conversations
// ═══════════════════════════════════════════════════════════

/// Drop `*`, `#` and `_` runs the model may still emit.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

pub async fn send_message(
    relay: &RelayClient,
    history: &[ChatMessage],
    system_prompt: &str,
) -> Result<String, RelayError> {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ChatMessage::system(system_prompt));
    messages.extend_from_slice(history);

    let request =
        ChatCompletionRequest::new(&messages, ASSISTANT_MAX_TOKENS, ASSISTANT_TEMPERATURE);
    let response = relay.complete(&request).await?;
    let content = response.first_content().unwrap_or(EMPTY_REPLY);

    Ok(strip_markup(content))
}

/// Collapse a failed exchange into the chat-bubble apology.
pub fn reply_or_apology(result: Result<String, RelayError>) -> String {
    match result {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(error = %e, "Assistant request failed");
            APOLOGY.to_string()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetrics {
    pub revenue: Option<i64>,
    pub patients: Option<u32>,
    pub appointments: Option<u32>,
    pub average_check: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientProfile {
    pub age: Option<i32>,
    pub last_visit: Option<String>,
    #[serde(default)]
    pub treatment_history: Vec<String>,
}

fn money_or(value: Option<i64>, missing: &str) -> String {
    value
        .map(format_currency)
        .unwrap_or_else(|| missing.to_string())
}

fn count_or<T: ToString>(value: Option<T>, missing: &str) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| missing.to_string())
}

pub fn business_recommendations_message(metrics: &BusinessMetrics) -> String {
    format!(
        "Текущие показатели клиники:\n\
         - Выручка: {}\n\
         - Количество пациентов: {}\n\
         - Записей: {}\n\
         - Средний чек: {}\n\n\
         На основе этих данных, дай 3-5 конкретных рекомендаций для роста бизнеса.",
        money_or(metrics.revenue, "не указана"),
        count_or(metrics.patients, "не указано"),
        count_or(metrics.appointments, "не указано"),
        money_or(metrics.average_check, "не указан"),
    )
}

pub fn vat_analysis_message(revenue: i64) -> String {
    format!(
        "С 2025 года вступает в силу новый закон о НДС для медицинских услуг.\n\n\
         Текущая выручка клиники: {}\n\n\
         Объясни:\n\
         1. Какие медицинские услуги теперь облагаются НДС\n\
         2. Как это повлияет на ценообразование\n\
         3. Какие шаги нужно предпринять для соответствия новым требованиям\n\
         4. Примерный расчёт НДС при текущей выручки",
        format_currency(revenue)
    )
}

pub fn patient_recommendations_message(profile: &PatientProfile) -> String {
    let history = if profile.treatment_history.is_empty() {
        "не указана".to_string()
    } else {
        profile.treatment_history.join(", ")
    };
    format!(
        "Данные пациента:\n\
         - Возраст: {}\n\
         - Последний визит: {}\n\
         - История лечения: {}\n\n\
         Дай рекомендации:\n\
         1. Какие услуги предложить этому пациенту\n\
         2. Когда рекомендовать следующий визит\n\
         3. Как повысить лояльность этого пациента",
        count_or(profile.age, "не указан"),
        profile.last_visit.as_deref().unwrap_or("не указан"),
        history
    )
}

pub async fn business_recommendations(
    relay: &RelayClient,
    system_prompt: &str,
    metrics: &BusinessMetrics,
) -> Result<String, RelayError> {
    let message = ChatMessage::user(business_recommendations_message(metrics));
    send_message(relay, &[message], system_prompt).await
}

pub async fn vat_analysis(
    relay: &RelayClient,
    system_prompt: &str,
    revenue: i64,
) -> Result<String, RelayError> {
    let message = ChatMessage::user(vat_analysis_message(revenue));
    send_message(relay, &[message], system_prompt).await
}

pub async fn patient_recommendations(
    relay: &RelayClient,
    system_prompt: &str,
    profile: &PatientProfile,
) -> Result<String, RelayError> {
    let message = ChatMessage::user(patient_recommendations_message(profile));
    send_message(relay, &[message], system_prompt).await
}

pub async fn telegram_response(
    relay: &RelayClient,
    custom_instructions: Option<&str>,
    user_message: &str,
) -> Result<String, RelayError> {
    let prompt = telegram_prompt(custom_instructions);
    send_message(relay, &[ChatMessage::user(user_message)], &prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data::generate_clinic;
    use crate::relay::mock_upstream::{self, MockReply};
    use chrono::{TimeZone, Utc};

    fn relay(url: &str) -> RelayClient {
        RelayClient::new(url, Some("sk-test".into()), 5).unwrap()
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("**Совет:** _увеличить_ ## запись"), "Совет: увеличить  запись");
        assert_eq!(strip_markup("snake_case"), "snakecase");
        assert_eq!(strip_markup("без разметки"), "без разметки");
    }

    #[test]
    fn test_crm_context_uses_analytics_figures() {
        let data = generate_clinic(1, Utc.with_ymd_and_hms(2024, 12, 28, 9, 0, 0).unwrap());
        let today = NaiveDate::from_ymd_opt(2024, 12, 28).unwrap();
        let ctx = crm_context(&data.analytics, &data.doctors, today);

        assert!(ctx.contains("(28.12.2024)"));
        assert!(ctx.contains("4\u{a0}580\u{a0}000\u{a0}₽ (рост +12.5%"));
        assert!(ctx.contains("Средний чек: ~10\u{a0}044\u{a0}₽"));
        assert!(ctx.contains("Всего: 1\u{a0}247 пациентов"));
        assert!(ctx.contains("Конверсия возврата: 25%"));
        assert!(ctx.contains("Завершено: 398 (87.3%)"));
        assert!(ctx.contains("Иванов А.П. (Терапевт-стоматолог)"));
        assert!(ctx.contains("Кузнецова Е.А. (Ортопед) - выручка 890\u{a0}000\u{a0}₽, 71 приёмов, сейчас offline"));
        assert!(ctx.contains("Петрова Мария перегружен(а) на 90%"));
        assert!(ctx.contains("16 неявок за месяц - потеря ~160\u{a0}704\u{a0}₽"));
    }

    #[test]
    fn test_business_prompt_wraps_context() {
        let prompt = business_system_prompt("CTX");
        assert!(prompt.starts_with("Ты — АГЕНТНЫЙ AI-ассистент"));
        assert!(prompt.contains("\n\nCTX\n"));
        assert!(prompt.ends_with("Сразу давай ответ."));
    }

    #[test]
    fn test_telegram_prompt_appends_instructions() {
        assert_eq!(telegram_prompt(None), TELEGRAM_SALES_PROMPT);
        assert_eq!(telegram_prompt(Some("   ")), TELEGRAM_SALES_PROMPT);
        let prompt = telegram_prompt(Some("Скидка 10% на чистку"));
        assert!(prompt.starts_with(TELEGRAM_SALES_PROMPT));
        assert!(prompt.ends_with("Скидка 10% на чистку"));
    }

    #[test]
    fn test_prompt_messages() {
        let msg = business_recommendations_message(&BusinessMetrics {
            revenue: Some(4_580_000),
            patients: None,
            appointments: Some(456),
            average_check: None,
        });
        assert!(msg.contains("- Выручка: 4\u{a0}580\u{a0}000\u{a0}₽"));
        assert!(msg.contains("- Количество пациентов: не указано"));
        assert!(msg.contains("- Записей: 456"));
        assert!(msg.contains("- Средний чек: не указан"));

        let msg = patient_recommendations_message(&PatientProfile {
            age: Some(39),
            last_visit: None,
            treatment_history: vec!["Чистка".into(), "Пломба".into()],
        });
        assert!(msg.contains("- Возраст: 39"));
        assert!(msg.contains("- Последний визит: не указан"));
        assert!(msg.contains("- История лечения: Чистка, Пломба"));

        assert!(vat_analysis_message(1_000_000).contains("1\u{a0}000\u{a0}000\u{a0}₽"));
    }

    #[test]
    fn test_reply_or_apology() {
        assert_eq!(reply_or_apology(Ok("Готово".into())), "Готово");
        let err = RelayError::Transport("connection refused".into());
        assert_eq!(reply_or_apology(Err(err)), APOLOGY);
    }

    #[tokio::test]
    async fn test_send_message_prepends_system_and_strips() {
        let url = mock_upstream::spawn(MockReply::Content("**Совет:** _звоните_ пациентам")).await;
        let reply = send_message(&relay(&url), &[ChatMessage::user("Что делать?")], "SYS")
            .await
            .unwrap();
        assert_eq!(reply, "Совет: звоните пациентам");
    }

    #[tokio::test]
    async fn test_send_message_empty_choices_fallback() {
        let url = mock_upstream::spawn(MockReply::NoChoices).await;
        let reply = send_message(&relay(&url), &[], "SYS").await.unwrap();
        assert_eq!(reply, EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_telegram_response_failure_becomes_apology() {
        let url = mock_upstream::spawn(MockReply::Error(500, "upstream down")).await;
        let result = telegram_response(&relay(&url), None, "Здравствуйте").await;
        assert!(matches!(result, Err(RelayError::Upstream { status: 500, .. })));
        assert_eq!(reply_or_apology(result), APOLOGY);
    }
}
