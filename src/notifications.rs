//! Notification bell storage.
//!
//! The whole list lives as one JSON array under [`STORAGE_KEY`], newest
//! first. Every mutation is a read-modify-write of that array inside an
//! immediate transaction. Unknown ids are ignored but the array is still
//! written back.

use chrono::{Duration, Utc};
use rand::distributions::Uniform;
use rand::Rng;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::db::{self, DatabaseError};
use crate::format::{format_number, notification_time_label};
use crate::models::{NewNotification, Notification, NotificationPriority, NotificationType};

pub const STORAGE_KEY: &str = "dental_notifications";

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// The three notifications a fresh install starts with.
pub fn initial_notifications() -> Vec<Notification> {
    let now = Utc::now();
    vec![
        Notification {
            id: "n-001".into(),
            kind: NotificationType::Appointment,
            title: "Новая запись".into(),
            message: "Петров А.С. записан на 30 декабря в 10:00".into(),
            time: "30 мин назад".into(),
            unread: true,
            priority: NotificationPriority::Medium,
            action_url: Some("/appointments".into()),
            appointment_id: Some("a-0001".into()),
            patient_id: Some("p-001".into()),
            created_at: now - Duration::minutes(30),
        },
        Notification {
            id: "n-002".into(),
            kind: NotificationType::Payment,
            title: "Платёж получен".into(),
            message: "Поступила оплата от Смирновой Е.И. — 15 000 ₽".into(),
            time: "2 часа назад".into(),
            unread: true,
            priority: NotificationPriority::Low,
            action_url: Some("/finance".into()),
            appointment_id: None,
            patient_id: Some("p-002".into()),
            created_at: now - Duration::hours(2),
        },
        Notification {
            id: "n-003".into(),
            kind: NotificationType::Task,
            title: "Напоминание".into(),
            message: "Необходимо связаться с Козловым М.А.".into(),
            time: "1 день назад".into(),
            unread: false,
            priority: NotificationPriority::High,
            action_url: Some("/patients".into()),
            appointment_id: None,
            patient_id: Some("p-003".into()),
            created_at: now - Duration::days(1),
        },
    ]
}

/// `n-<unix millis>-<9 random base36 chars>`
fn new_notification_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(Uniform::from(0..BASE36.len()))
        .take(9)
        .map(|i| BASE36[i] as char)
        .collect();
    format!("n-{millis}-{suffix}")
}

// ═══════════════════════════════════════════════════════════
// Storage operations
// ═══════════════════════════════════════════════════════════

/// The stored list, or `None` when the key is absent or unreadable.
fn load(conn: &Connection) -> Result<Option<Vec<Notification>>, DatabaseError> {
    match db::get_json::<Vec<Notification>>(conn, STORAGE_KEY) {
        Ok(list) => Ok(list),
        Err(DatabaseError::MalformedValue { reason, .. }) => {
            tracing::warn!(%reason, "Stored notifications unreadable, reseeding");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Read, edit and write back the list under one `BEGIN IMMEDIATE`
/// transaction. Writers on other connections wait on the SQLite write
/// lock, so no edit is overwritten by a stale copy.
fn update<T, F>(conn: &Connection, edit: F) -> Result<T, DatabaseError>
where
    F: FnOnce(&mut Vec<Notification>) -> T,
{
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let mut list = load(&tx)?.unwrap_or_else(initial_notifications);
    let out = edit(&mut list);
    save_notifications(&tx, &list)?;
    tx.commit()?;
    Ok(out)
}

/// Stored notifications. Seeds and persists the initial set when the key
/// is absent or its value is unreadable.
pub fn get_notifications(conn: &Connection) -> Result<Vec<Notification>, DatabaseError> {
    match load(conn)? {
        Some(list) => Ok(list),
        None => update(conn, |list| list.clone()),
    }
}

pub fn save_notifications(
    conn: &Connection,
    notifications: &[Notification],
) -> Result<(), DatabaseError> {
    db::set_json(conn, STORAGE_KEY, &notifications)
}

/// Assign id and creation time, then insert at the front.
pub fn add_notification(
    conn: &Connection,
    new: NewNotification,
) -> Result<Notification, DatabaseError> {
    let created_at = Utc::now();
    let notification = Notification {
        id: new_notification_id(),
        kind: new.kind,
        title: new.title,
        message: new.message,
        time: new
            .time
            .unwrap_or_else(|| notification_time_label(created_at, created_at)),
        unread: new.unread,
        priority: new.priority,
        action_url: new.action_url,
        appointment_id: new.appointment_id,
        patient_id: new.patient_id,
        created_at,
    };

    update(conn, |list| list.insert(0, notification.clone()))?;

    tracing::debug!(id = %notification.id, kind = %notification.kind, "Notification added");
    Ok(notification)
}

pub fn mark_as_read(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    update(conn, |list| {
        for n in list.iter_mut().filter(|n| n.id == id) {
            n.unread = false;
        }
    })
}

pub fn mark_all_as_read(conn: &Connection) -> Result<(), DatabaseError> {
    update(conn, |list| {
        for n in list.iter_mut() {
            n.unread = false;
        }
    })
}

pub fn delete_notification(conn: &Connection, id: &str) -> Result<(), DatabaseError> {
    update(conn, |list| list.retain(|n| n.id != id))
}

/// Leaves an empty array behind, so the initial set is not reseeded.
pub fn clear_all(conn: &Connection) -> Result<(), DatabaseError> {
    save_notifications(conn, &[])
}

pub fn unread_count(conn: &Connection) -> Result<usize, DatabaseError> {
    Ok(get_notifications(conn)?.iter().filter(|n| n.unread).count())
}

pub fn by_type(
    conn: &Connection,
    kind: NotificationType,
) -> Result<Vec<Notification>, DatabaseError> {
    select(conn, |n| n.kind == kind)
}

pub fn by_patient(conn: &Connection, patient_id: &str) -> Result<Vec<Notification>, DatabaseError> {
    select(conn, |n| n.patient_id.as_deref() == Some(patient_id))
}

pub fn by_appointment(
    conn: &Connection,
    appointment_id: &str,
) -> Result<Vec<Notification>, DatabaseError> {
    select(conn, |n| n.appointment_id.as_deref() == Some(appointment_id))
}

fn select<F>(conn: &Connection, keep: F) -> Result<Vec<Notification>, DatabaseError>
where
    F: Fn(&Notification) -> bool,
{
    Ok(get_notifications(conn)?
        .into_iter()
        .filter(|n| keep(n))
        .collect())
}

// ─── Typed constructors ───────────────────────────────────────────────────────

pub fn create_appointment_notification(
    conn: &Connection,
    patient_name: &str,
    date: &str,
    time: &str,
    appointment_id: &str,
    patient_id: &str,
) -> Result<Notification, DatabaseError> {
    add_notification(
        conn,
        NewNotification {
            kind: NotificationType::Appointment,
            title: "Новая запись".into(),
            message: format!("{patient_name} записан на {date} в {time}"),
            time: None,
            unread: true,
            priority: NotificationPriority::Medium,
            action_url: Some(format!(
                "/appointments?date={date}&appointment={appointment_id}"
            )),
            appointment_id: Some(appointment_id.to_string()),
            patient_id: Some(patient_id.to_string()),
        },
    )
}

pub fn create_payment_notification(
    conn: &Connection,
    patient_name: &str,
    amount: i64,
    patient_id: &str,
) -> Result<Notification, DatabaseError> {
    add_notification(
        conn,
        NewNotification {
            kind: NotificationType::Payment,
            title: "Платёж получен".into(),
            message: format!(
                "Поступила оплата от {patient_name} — {} ₽",
                format_number(amount)
            ),
            time: None,
            unread: true,
            priority: NotificationPriority::Low,
            action_url: Some("/finance".into()),
            appointment_id: None,
            patient_id: Some(patient_id.to_string()),
        },
    )
}

pub fn create_task_notification(
    conn: &Connection,
    title: &str,
    message: &str,
    patient_id: Option<&str>,
) -> Result<Notification, DatabaseError> {
    let action_url = if patient_id.is_some() {
        "/patients"
    } else {
        "/dashboard"
    };
    add_notification(
        conn,
        NewNotification {
            kind: NotificationType::Task,
            title: title.to_string(),
            message: message.to_string(),
            time: None,
            unread: true,
            priority: NotificationPriority::High,
            action_url: Some(action_url.into()),
            appointment_id: None,
            patient_id: patient_id.map(str::to_string),
        },
    )
}

pub fn create_system_notification(
    conn: &Connection,
    title: &str,
    message: &str,
    priority: NotificationPriority,
) -> Result<Notification, DatabaseError> {
    add_notification(
        conn,
        NewNotification {
            kind: NotificationType::System,
            title: title.to_string(),
            message: message.to_string(),
            time: None,
            unread: true,
            priority,
            action_url: None,
            appointment_id: None,
            patient_id: None,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    fn stored(conn: &Connection) -> Vec<Notification> {
        db::get_json(conn, STORAGE_KEY).unwrap().unwrap()
    }

    #[test]
    fn test_first_read_seeds_and_persists() {
        let conn = open_memory_database().unwrap();
        let list = get_notifications(&conn).unwrap();
        let ids: Vec<&str> = list.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["n-001", "n-002", "n-003"]);
        assert_eq!(stored(&conn).len(), 3);
        assert!(!list[2].unread);
        assert_eq!(list[2].priority, NotificationPriority::High);
    }

    #[test]
    fn test_malformed_value_is_reseeded() {
        let conn = open_memory_database().unwrap();
        db::set_item(&conn, STORAGE_KEY, "{broken").unwrap();
        assert_eq!(get_notifications(&conn).unwrap().len(), 3);
        assert_eq!(stored(&conn).len(), 3);
    }

    #[test]
    fn test_mark_as_read_persists() {
        let conn = open_memory_database().unwrap();
        assert_eq!(unread_count(&conn).unwrap(), 2);

        mark_as_read(&conn, "n-001").unwrap();
        let list = stored(&conn);
        assert!(!list.iter().find(|n| n.id == "n-001").unwrap().unread);
        assert!(list.iter().find(|n| n.id == "n-002").unwrap().unread);
        assert_eq!(unread_count(&conn).unwrap(), 1);
    }

    #[test]
    fn test_mark_as_read_unknown_id_is_noop() {
        let conn = open_memory_database().unwrap();
        mark_as_read(&conn, "n-999").unwrap();
        assert_eq!(unread_count(&conn).unwrap(), 2);
        assert_eq!(stored(&conn).len(), 3);
    }

    #[test]
    fn test_mark_all_as_read_persists() {
        let conn = open_memory_database().unwrap();
        mark_all_as_read(&conn).unwrap();
        assert!(stored(&conn).iter().all(|n| !n.unread));
        assert_eq!(unread_count(&conn).unwrap(), 0);
    }

    #[test]
    fn test_delete_notification_persists() {
        let conn = open_memory_database().unwrap();
        delete_notification(&conn, "n-002").unwrap();
        let ids: Vec<String> = stored(&conn).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec!["n-001".to_string(), "n-003".to_string()]);
    }

    #[test]
    fn test_clear_all_does_not_reseed() {
        let conn = open_memory_database().unwrap();
        clear_all(&conn).unwrap();
        assert!(get_notifications(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_add_inserts_at_front_with_generated_id() {
        let conn = open_memory_database().unwrap();
        let added = create_system_notification(
            &conn,
            "Обновление",
            "Система обновлена",
            NotificationPriority::Low,
        )
        .unwrap();

        let parts: Vec<&str> = added.id.splitn(3, '-').collect();
        assert_eq!(parts[0], "n");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2].bytes().all(|b| BASE36.contains(&b)));
        assert_eq!(added.time, "Только что");
        assert!(added.action_url.is_none());

        let list = get_notifications(&conn).unwrap();
        assert_eq!(list.len(), 4);
        assert_eq!(list[0].id, added.id);
    }

    #[test]
    fn test_typed_constructors() {
        let conn = open_memory_database().unwrap();

        let appt = create_appointment_notification(
            &conn,
            "Новикова А.П.",
            "2024-12-30",
            "10:00",
            "a-0042",
            "p-004",
        )
        .unwrap();
        assert_eq!(appt.message, "Новикова А.П. записан на 2024-12-30 в 10:00");
        assert_eq!(
            appt.action_url.as_deref(),
            Some("/appointments?date=2024-12-30&appointment=a-0042")
        );
        assert_eq!(appt.priority, NotificationPriority::Medium);

        let pay = create_payment_notification(&conn, "Морозов Д.", 25_000, "p-005").unwrap();
        assert_eq!(pay.message, "Поступила оплата от Морозов Д. — 25\u{a0}000 ₽");
        assert_eq!(pay.action_url.as_deref(), Some("/finance"));

        let task = create_task_notification(&conn, "Позвонить", "Напомнить о визите", None).unwrap();
        assert_eq!(task.action_url.as_deref(), Some("/dashboard"));
        let task = create_task_notification(&conn, "Позвонить", "Уточнить аллергию", Some("p-007")).unwrap();
        assert_eq!(task.action_url.as_deref(), Some("/patients"));
    }

    #[test]
    fn test_concurrent_adds_are_all_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.db");
        drop(db::open_database(&path).unwrap());

        let workers: Vec<_> = (0..16)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let conn = db::open_database(&path).unwrap();
                    create_task_notification(&conn, &format!("Звонок {i}"), "Перезвонить", None)
                        .unwrap()
                })
            })
            .collect();
        let mut added: Vec<String> = workers.into_iter().map(|w| w.join().unwrap().id).collect();

        let conn = db::open_database(&path).unwrap();
        let list = get_notifications(&conn).unwrap();
        assert_eq!(list.len(), 3 + 16);

        let mut stored_ids: Vec<String> = list
            .into_iter()
            .map(|n| n.id)
            .filter(|id| !id.starts_with("n-00"))
            .collect();
        added.sort();
        stored_ids.sort();
        assert_eq!(stored_ids, added);
    }

    #[test]
    fn test_concurrent_read_and_delete_keep_list_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local_storage.db");
        let conn = db::open_database(&path).unwrap();
        get_notifications(&conn).unwrap();

        let writer = {
            let path = path.clone();
            std::thread::spawn(move || {
                let conn = db::open_database(&path).unwrap();
                delete_notification(&conn, "n-002").unwrap();
            })
        };
        mark_all_as_read(&conn).unwrap();
        writer.join().unwrap();

        let list = get_notifications(&conn).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|n| !n.unread));
    }

    #[test]
    fn test_lookups() {
        let conn = open_memory_database().unwrap();
        assert_eq!(by_type(&conn, NotificationType::Payment).unwrap().len(), 1);
        assert_eq!(by_patient(&conn, "p-003").unwrap()[0].id, "n-003");
        assert_eq!(by_appointment(&conn, "a-0001").unwrap().len(), 1);
        assert!(by_appointment(&conn, "a-9999").unwrap().is_empty());
    }
}
