//! Store operations behind the member roster, the lesson log and the payment log.
//!
//! Everything is keyed by the owning tutor (`user_id`) and the member's display
//! name. Names are not unique per owner, so updates and deletes touch every
//! matching member row, the same as a plain `WHERE name = ? AND user_id = ?`.
//!
//! The single-statement functions mirror one HTTP call each and do not know
//! about one another: `set_lesson_balance` + `log_lesson` and
//! `charge_lessons(+1)` + `undo_last_lesson` are independent. The
//! [`complete_lesson`] / [`uncomplete_lesson`] pair performs each workflow in
//! one transaction instead.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension};

use crate::error::{AppError, AppResult};
use crate::models::{LessonName, LessonRecord, Member, PaymentRecord};

const MEMBER_COLS: &str = "member_id, user_id, name, phone, lesson";
const LESSON_COLS: &str = "lesson_id, user_id, name, phone, lesson_day";
const PAYMENT_COLS: &str = "pay_id, user_id, name, pay, pay_day";

#[derive(Debug, Clone)]
pub struct NewMember {
    pub user_id: String,
    pub name: String,
    pub phone: String,
    pub lesson: i64,
}

fn row_to_member(row: &rusqlite::Row) -> rusqlite::Result<Member> {
    Ok(Member {
        member_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        lesson: row.get(4)?,
    })
}

fn row_to_lesson(row: &rusqlite::Row) -> rusqlite::Result<LessonRecord> {
    Ok(LessonRecord {
        lesson_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        phone: row.get(3)?,
        lesson_day: row.get(4)?,
    })
}

fn row_to_payment(row: &rusqlite::Row) -> rusqlite::Result<PaymentRecord> {
    Ok(PaymentRecord {
        pay_id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        pay: row.get(3)?,
        pay_day: row.get(4)?,
    })
}

/// Validates a calendar month and renders it the way `strftime('%m', ..)` does.
/// The year is deliberately not part of the filter.
pub fn month_key(month: u32) -> AppResult<String> {
    if !(1..=12).contains(&month) {
        return Err(AppError::BadRequest(format!(
            "month must be between 1 and 12, got {month}"
        )));
    }
    Ok(format!("{month:02}"))
}

pub fn list_members(conn: &Connection, user_id: &str) -> AppResult<Vec<Member>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {MEMBER_COLS} FROM members WHERE user_id = ?1 ORDER BY member_id"
    ))?;
    let rows = stmt.query_map(rusqlite::params![user_id], row_to_member)?;
    let members: Result<Vec<_>, _> = rows.collect();
    Ok(members?)
}

/// First matching member by insertion order.
pub fn find_member(conn: &Connection, name: &str, user_id: &str) -> AppResult<Option<Member>> {
    let member = conn
        .query_row(
            &format!(
                "SELECT {MEMBER_COLS} FROM members WHERE name = ?1 AND user_id = ?2
                 ORDER BY member_id LIMIT 1"
            ),
            rusqlite::params![name, user_id],
            row_to_member,
        )
        .optional()?;
    Ok(member)
}

pub fn register_member(conn: &Connection, member: &NewMember) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO members (user_id, name, phone, lesson) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![member.user_id, member.name, member.phone, member.lesson],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Adds `delta` to the balance in a single `lesson = lesson + ?` statement,
/// so concurrent charges never lose an update. Returns rows touched.
pub fn charge_lessons(conn: &Connection, name: &str, user_id: &str, delta: i64) -> AppResult<usize> {
    let affected = conn.execute(
        "UPDATE members SET lesson = lesson + ?1 WHERE name = ?2 AND user_id = ?3",
        rusqlite::params![delta, name, user_id],
    )?;
    Ok(affected)
}

/// Overwrites the balance with a caller-computed value.
pub fn set_lesson_balance(conn: &Connection, name: &str, user_id: &str, lesson: i64) -> AppResult<usize> {
    let affected = conn.execute(
        "UPDATE members SET lesson = ?1 WHERE name = ?2 AND user_id = ?3",
        rusqlite::params![lesson, name, user_id],
    )?;
    Ok(affected)
}

pub fn cancel_lesson(conn: &Connection, name: &str, user_id: &str) -> AppResult<usize> {
    charge_lessons(conn, name, user_id, 1)
}

/// Lesson and payment rows for the member are left in place.
pub fn remove_member(conn: &Connection, name: &str, user_id: &str) -> AppResult<usize> {
    let affected = conn.execute(
        "DELETE FROM members WHERE name = ?1 AND user_id = ?2",
        rusqlite::params![name, user_id],
    )?;
    Ok(affected)
}

pub fn log_lesson(conn: &Connection, user_id: &str, name: &str, phone: &str) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO lesson_records (user_id, name, phone) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, name, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Deletes the newest lesson row for the member. Rows sharing a timestamp
/// are ordered by insertion. No rows is not an error.
pub fn undo_last_lesson(conn: &Connection, name: &str, user_id: &str) -> AppResult<usize> {
    let affected = conn.execute(
        "DELETE FROM lesson_records WHERE lesson_id = (
             SELECT lesson_id FROM lesson_records
             WHERE name = ?1 AND user_id = ?2
             ORDER BY lesson_day DESC, lesson_id DESC
             LIMIT 1
         )",
        rusqlite::params![name, user_id],
    )?;
    Ok(affected)
}

pub fn lessons_for_member(conn: &Connection, name: &str, user_id: &str) -> AppResult<Vec<LessonRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LESSON_COLS} FROM lesson_records WHERE name = ?1 AND user_id = ?2
         ORDER BY lesson_day, lesson_id"
    ))?;
    let rows = stmt.query_map(rusqlite::params![name, user_id], row_to_lesson)?;
    let lessons: Result<Vec<_>, _> = rows.collect();
    Ok(lessons?)
}

pub fn lessons_for_month(conn: &Connection, month: u32, user_id: &str) -> AppResult<Vec<LessonRecord>> {
    let key = month_key(month)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {LESSON_COLS} FROM lesson_records
         WHERE strftime('%m', lesson_day) = ?1 AND user_id = ?2
         ORDER BY lesson_day, lesson_id"
    ))?;
    let rows = stmt.query_map(rusqlite::params![key, user_id], row_to_lesson)?;
    let lessons: Result<Vec<_>, _> = rows.collect();
    Ok(lessons?)
}

pub fn lesson_names_on(conn: &Connection, date: NaiveDate, user_id: &str) -> AppResult<Vec<LessonName>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM lesson_records WHERE date(lesson_day) = ?1 AND user_id = ?2
         ORDER BY lesson_day, lesson_id",
    )?;
    let day = date.format("%Y-%m-%d").to_string();
    let rows = stmt.query_map(rusqlite::params![day, user_id], |row| {
        Ok(LessonName { name: row.get(0)? })
    })?;
    let names: Result<Vec<_>, _> = rows.collect();
    Ok(names?)
}

pub fn record_payment(conn: &Connection, user_id: &str, name: &str, pay: i64) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO payments (user_id, name, pay) VALUES (?1, ?2, ?3)",
        rusqlite::params![user_id, name, pay],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn payments_for_member(conn: &Connection, name: &str, user_id: &str) -> AppResult<Vec<PaymentRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLS} FROM payments WHERE name = ?1 AND user_id = ?2
         ORDER BY pay_day, pay_id"
    ))?;
    let rows = stmt.query_map(rusqlite::params![name, user_id], row_to_payment)?;
    let payments: Result<Vec<_>, _> = rows.collect();
    Ok(payments?)
}

pub fn payments_for_month(conn: &Connection, month: u32, user_id: &str) -> AppResult<Vec<PaymentRecord>> {
    let key = month_key(month)?;
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAYMENT_COLS} FROM payments
         WHERE strftime('%m', pay_day) = ?1 AND user_id = ?2
         ORDER BY pay_day, pay_id"
    ))?;
    let rows = stmt.query_map(rusqlite::params![key, user_id], row_to_payment)?;
    let payments: Result<Vec<_>, _> = rows.collect();
    Ok(payments?)
}

/// Decrements the balance and logs the session in one transaction.
pub fn complete_lesson(conn: &mut Connection, name: &str, user_id: &str) -> AppResult<Member> {
    let tx = conn.transaction()?;

    let member = find_member(&tx, name, user_id)?
        .ok_or_else(|| AppError::NotFound("Member not found".into()))?;
    charge_lessons(&tx, name, user_id, -1)?;
    log_lesson(&tx, user_id, name, &member.phone)?;
    let updated = find_member(&tx, name, user_id)?
        .ok_or_else(|| AppError::Internal("member vanished mid-transaction".into()))?;

    tx.commit()?;
    Ok(updated)
}

/// Gives the credit back and drops the newest session log in one transaction.
pub fn uncomplete_lesson(conn: &mut Connection, name: &str, user_id: &str) -> AppResult<Member> {
    let tx = conn.transaction()?;

    if find_member(&tx, name, user_id)?.is_none() {
        return Err(AppError::NotFound("Member not found".into()));
    }
    cancel_lesson(&tx, name, user_id)?;
    undo_last_lesson(&tx, name, user_id)?;
    let updated = find_member(&tx, name, user_id)?
        .ok_or_else(|| AppError::Internal("member vanished mid-transaction".into()))?;

    tx.commit()?;
    Ok(updated)
}
