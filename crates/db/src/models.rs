use chrono::{DateTime, NaiveDate, Utc};
use eyre::{Result, eyre};
use mentormesh_core::models::slot::{Slot, SlotStatus};
use mentormesh_core::models::user::{AccountStatus, MentorProfile, Role, UserRecord};
use mentormesh_core::time::ClockTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbSlot {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_minute: i32,
    pub end_minute: i32,
    pub status: String,
    pub booked_by: Option<Uuid>,
    pub booking_id: Option<String>,
    pub meeting_link: Option<String>,
    pub timezone: String,
    pub notes: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn clock_time(minutes: i32) -> Result<ClockTime> {
    u16::try_from(minutes)
        .ok()
        .and_then(ClockTime::from_minutes)
        .ok_or_else(|| eyre!("Stored minute value {} is out of range", minutes))
}

impl TryFrom<DbSlot> for Slot {
    type Error = eyre::Report;

    fn try_from(row: DbSlot) -> Result<Self> {
        let status = row
            .status
            .parse::<SlotStatus>()
            .map_err(|e| eyre!("Invalid stored slot status: {}", e))?;

        Ok(Slot {
            id: row.id,
            mentor_id: row.mentor_id,
            date: row.slot_date,
            start_time: clock_time(row.start_minute)?,
            end_time: clock_time(row.end_minute)?,
            status,
            booked_by: row.booked_by,
            booking_id: row.booking_id,
            meeting_link: row.meeting_link,
            timezone: row.timezone,
            notes: row.notes,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn into_slots(rows: Vec<DbSlot>) -> Result<Vec<Slot>> {
    rows.into_iter().map(Slot::try_from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub expertise: Option<String>,
    pub experience: Option<i32>,
    pub is_verified: bool,
    pub account_status: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl TryFrom<DbUser> for UserRecord {
    type Error = eyre::Report;

    fn try_from(row: DbUser) -> Result<Self> {
        let roles = row
            .roles
            .iter()
            .map(|r| r.parse::<Role>().map_err(|e| eyre!(e)))
            .collect::<Result<Vec<_>>>()?;
        let account_status = row
            .account_status
            .parse::<AccountStatus>()
            .map_err(|e| eyre!(e))?;

        Ok(UserRecord {
            id: row.id,
            full_name: row.full_name,
            email: row.email,
            roles,
            mentor_profile: MentorProfile {
                skills: row.skills,
                bio: row.bio,
                expertise: row.expertise,
                experience: row.experience,
            },
            is_verified: row.is_verified,
            account_status,
            created_at: row.created_at,
            last_login: row.last_login,
        })
    }
}

pub fn into_users(rows: Vec<DbUser>) -> Result<Vec<UserRecord>> {
    rows.into_iter().map(UserRecord::try_from).collect()
}
