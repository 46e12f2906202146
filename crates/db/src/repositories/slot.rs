use crate::models::{DbSlot, into_slots};
use chrono::NaiveDate;
use eyre::Result;
use mentormesh_core::booking::Transition;
use mentormesh_core::models::slot::{MentorStats, NewSlot, Slot, SlotFilter, SlotStatus};
use mentormesh_core::time::ClockTime;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{InsertOutcome, SaveOutcome};

const SLOT_COLUMNS: &str = "id, mentor_id, slot_date, start_minute, end_minute, status, booked_by, \
     booking_id, meeting_link, timezone, notes, version, created_at, updated_at";

fn minute(time: ClockTime) -> i32 {
    i32::from(time.minutes())
}

fn status_names(statuses: &[SlotStatus]) -> Vec<String> {
    statuses.iter().map(|s| s.as_str().to_string()).collect()
}

/// Serializes slot writes for one mentor until the transaction ends
async fn lock_mentor(conn: &mut PgConnection, mentor_id: Uuid) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(mentor_id.to_string())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Earliest blocking slot of the mentor that overlaps `[start, end)` on `date`
async fn find_overlapping(
    conn: &mut PgConnection,
    mentor_id: Uuid,
    date: NaiveDate,
    start: ClockTime,
    end: ClockTime,
    exclude: Option<Uuid>,
) -> Result<Option<Slot>> {
    let sql = format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM availability_slots
        WHERE mentor_id = $1
          AND slot_date = $2
          AND status IN ('available', 'booked')
          AND start_minute < $4
          AND $3 < end_minute
          AND ($5::uuid IS NULL OR id <> $5)
        ORDER BY start_minute ASC
        LIMIT 1
        "#
    );

    let row = sqlx::query_as::<_, DbSlot>(&sql)
        .bind(mentor_id)
        .bind(date)
        .bind(minute(start))
        .bind(minute(end))
        .bind(exclude)
        .fetch_optional(&mut *conn)
        .await?;

    row.map(Slot::try_from).transpose()
}

pub async fn insert_slots(pool: &Pool<Postgres>, slots: &[NewSlot]) -> Result<InsertOutcome> {
    let mut tx = pool.begin().await?;

    let mut mentors: Vec<Uuid> = slots.iter().map(|s| s.mentor_id).collect();
    mentors.sort();
    mentors.dedup();
    for mentor_id in mentors {
        lock_mentor(&mut tx, mentor_id).await?;
    }

    let sql = format!(
        r#"
        INSERT INTO availability_slots
            (id, mentor_id, slot_date, start_minute, end_minute, status, timezone, notes, version, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, 'available', $6, $7, 1, NOW(), NOW())
        RETURNING {SLOT_COLUMNS}
        "#
    );

    let mut inserted = Vec::with_capacity(slots.len());
    for (index, new_slot) in slots.iter().enumerate() {
        // Checked one by one so earlier rows of the same batch are seen too
        let existing = find_overlapping(
            &mut tx,
            new_slot.mentor_id,
            new_slot.date,
            new_slot.start_time,
            new_slot.end_time,
            None,
        )
        .await?;
        if let Some(existing) = existing {
            tx.rollback().await?;
            tracing::debug!(
                "Slot insert rejected: batch index {} overlaps slot {}",
                index, existing.id
            );
            return Ok(InsertOutcome::Overlap { index, existing });
        }

        let row = sqlx::query_as::<_, DbSlot>(&sql)
            .bind(Uuid::new_v4())
            .bind(new_slot.mentor_id)
            .bind(new_slot.date)
            .bind(minute(new_slot.start_time))
            .bind(minute(new_slot.end_time))
            .bind(&new_slot.timezone)
            .bind(&new_slot.notes)
            .fetch_one(&mut *tx)
            .await?;
        inserted.push(Slot::try_from(row)?);
    }

    tx.commit().await?;
    Ok(InsertOutcome::Inserted(inserted))
}

pub async fn get_slot_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Slot>> {
    let sql = format!("SELECT {SLOT_COLUMNS} FROM availability_slots WHERE id = $1");

    let row = sqlx::query_as::<_, DbSlot>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(Slot::try_from).transpose()
}

pub async fn get_slots_by_mentor(
    pool: &Pool<Postgres>,
    mentor_id: Uuid,
    filter: &SlotFilter,
) -> Result<Vec<Slot>> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {SLOT_COLUMNS} FROM availability_slots WHERE mentor_id = "
    ));
    query.push_bind(mentor_id);

    if let Some(start_date) = filter.start_date {
        query.push(" AND slot_date >= ").push_bind(start_date);
    }
    if let Some(end_date) = filter.end_date {
        query.push(" AND slot_date <= ").push_bind(end_date);
    }
    if !filter.statuses.is_empty() {
        query
            .push(" AND status = ANY(")
            .push_bind(status_names(&filter.statuses))
            .push(")");
    }
    query.push(" ORDER BY slot_date ASC, start_minute ASC");

    let rows = query.build_query_as::<DbSlot>().fetch_all(pool).await?;
    into_slots(rows)
}

pub async fn get_open_slots_by_date(pool: &Pool<Postgres>, date: NaiveDate) -> Result<Vec<Slot>> {
    let sql = format!(
        r#"
        SELECT {SLOT_COLUMNS}
        FROM availability_slots
        WHERE slot_date = $1 AND status = 'available'
        ORDER BY start_minute ASC, mentor_id ASC
        "#
    );

    let rows = sqlx::query_as::<_, DbSlot>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;

    into_slots(rows)
}

pub async fn get_slots_by_mentee(
    pool: &Pool<Postgres>,
    mentee_id: Uuid,
    statuses: &[SlotStatus],
    from_date: Option<NaiveDate>,
) -> Result<Vec<Slot>> {
    let mut query = QueryBuilder::<Postgres>::new(format!(
        "SELECT {SLOT_COLUMNS} FROM availability_slots WHERE booked_by = "
    ));
    query.push_bind(mentee_id);
    query
        .push(" AND status = ANY(")
        .push_bind(status_names(statuses))
        .push(")");
    if let Some(from_date) = from_date {
        query.push(" AND slot_date >= ").push_bind(from_date);
    }
    query.push(" ORDER BY slot_date ASC, start_minute ASC");

    let rows = query.build_query_as::<DbSlot>().fetch_all(pool).await?;
    into_slots(rows)
}

pub async fn count_mentor_slots(
    pool: &Pool<Postgres>,
    mentor_id: Uuid,
    today: NaiveDate,
) -> Result<MentorStats> {
    let (total, booked, available, completed) = sqlx::query_as::<_, (i64, i64, i64, i64)>(
        r#"
        SELECT
            COUNT(*),
            COUNT(*) FILTER (WHERE status = 'booked'),
            COUNT(*) FILTER (WHERE status = 'available' AND slot_date >= $2),
            COUNT(*) FILTER (WHERE status = 'completed')
        FROM availability_slots
        WHERE mentor_id = $1
        "#,
    )
    .bind(mentor_id)
    .bind(today)
    .fetch_one(pool)
    .await?;

    let count = |n: i64| u64::try_from(n).unwrap_or_default();
    Ok(MentorStats {
        total_slots: count(total),
        booked_slots: count(booked),
        available_slots: count(available),
        completed_slots: count(completed),
    })
}

pub async fn update_slot(pool: &Pool<Postgres>, slot: &Slot) -> Result<SaveOutcome> {
    let mut tx = pool.begin().await?;
    lock_mentor(&mut tx, slot.mentor_id).await?;

    if slot.status.blocks_calendar() {
        let existing = find_overlapping(
            &mut tx,
            slot.mentor_id,
            slot.date,
            slot.start_time,
            slot.end_time,
            Some(slot.id),
        )
        .await?;
        if let Some(existing) = existing {
            tx.rollback().await?;
            return Ok(SaveOutcome::Overlap(existing));
        }
    }

    let sql = format!(
        r#"
        UPDATE availability_slots
        SET slot_date = $3,
            start_minute = $4,
            end_minute = $5,
            status = $6,
            meeting_link = $7,
            timezone = $8,
            notes = $9,
            version = version + 1,
            updated_at = NOW()
        WHERE id = $1 AND version = $2
        RETURNING {SLOT_COLUMNS}
        "#
    );

    let row = sqlx::query_as::<_, DbSlot>(&sql)
        .bind(slot.id)
        .bind(slot.version)
        .bind(slot.date)
        .bind(minute(slot.start_time))
        .bind(minute(slot.end_time))
        .bind(slot.status.as_str())
        .bind(&slot.meeting_link)
        .bind(&slot.timezone)
        .bind(&slot.notes)
        .fetch_optional(&mut *tx)
        .await?;

    let Some(row) = row else {
        tx.rollback().await?;
        return Ok(SaveOutcome::Stale);
    };

    tx.commit().await?;
    Ok(SaveOutcome::Saved(Slot::try_from(row)?))
}

pub async fn delete_slot(pool: &Pool<Postgres>, id: Uuid, expected_version: i64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM availability_slots
        WHERE id = $1 AND version = $2
        "#,
    )
    .bind(id)
    .bind(expected_version)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Compare-and-swap on version and status
pub async fn transition_slot(
    pool: &Pool<Postgres>,
    id: Uuid,
    expected_version: i64,
    transition: &Transition,
) -> Result<Option<Slot>> {
    let expected_status = transition.expected_status().as_str();

    let row = match transition {
        Transition::Book {
            mentee_id,
            booking_id,
            meeting_link,
        } => {
            let sql = format!(
                r#"
                UPDATE availability_slots
                SET status = 'booked',
                    booked_by = $4,
                    booking_id = $5,
                    meeting_link = $6,
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $1 AND version = $2 AND status = $3
                RETURNING {SLOT_COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbSlot>(&sql)
                .bind(id)
                .bind(expected_version)
                .bind(expected_status)
                .bind(mentee_id)
                .bind(booking_id)
                .bind(meeting_link)
                .fetch_optional(pool)
                .await?
        }
        Transition::Cancel => {
            let sql = format!(
                r#"
                UPDATE availability_slots
                SET status = 'available',
                    booked_by = NULL,
                    booking_id = NULL,
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $1 AND version = $2 AND status = $3
                RETURNING {SLOT_COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbSlot>(&sql)
                .bind(id)
                .bind(expected_version)
                .bind(expected_status)
                .fetch_optional(pool)
                .await?
        }
        Transition::Complete => {
            let sql = format!(
                r#"
                UPDATE availability_slots
                SET status = 'completed',
                    version = version + 1,
                    updated_at = NOW()
                WHERE id = $1 AND version = $2 AND status = $3
                RETURNING {SLOT_COLUMNS}
                "#
            );
            sqlx::query_as::<_, DbSlot>(&sql)
                .bind(id)
                .bind(expected_version)
                .bind(expected_status)
                .fetch_optional(pool)
                .await?
        }
    };

    row.map(Slot::try_from).transpose()
}
