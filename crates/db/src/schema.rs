use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // The directory table is owned by the account service; it is created here
    // only so a fresh database can serve reads.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            full_name VARCHAR(100) NOT NULL,
            email VARCHAR(255) NOT NULL UNIQUE,
            roles TEXT[] NOT NULL DEFAULT '{}',
            skills TEXT[] NOT NULL DEFAULT '{}',
            bio TEXT NULL,
            expertise TEXT NULL,
            experience INTEGER NULL CHECK (experience IS NULL OR experience >= 0),
            is_verified BOOLEAN NOT NULL DEFAULT FALSE,
            account_status VARCHAR(16) NOT NULL DEFAULT 'pending'
                CHECK (account_status IN ('pending', 'active', 'suspended')),
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            last_login TIMESTAMP WITH TIME ZONE NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create availability_slots table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS availability_slots (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            mentor_id UUID NOT NULL,
            slot_date DATE NOT NULL,
            start_minute INTEGER NOT NULL CHECK (start_minute >= 0 AND start_minute < 1440),
            end_minute INTEGER NOT NULL CHECK (end_minute > 0 AND end_minute < 1440),
            status VARCHAR(16) NOT NULL DEFAULT 'available'
                CHECK (status IN ('available', 'booked', 'completed', 'cancelled')),
            booked_by UUID NULL,
            booking_id VARCHAR(255) NULL,
            meeting_link TEXT NULL,
            timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
            notes VARCHAR(500) NOT NULL DEFAULT '',
            version BIGINT NOT NULL DEFAULT 1,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            CONSTRAINT valid_time_range CHECK (end_minute > start_minute),
            CONSTRAINT booked_has_mentee CHECK (status <> 'booked' OR booked_by IS NOT NULL),
            CONSTRAINT open_has_no_mentee CHECK (
                status NOT IN ('available', 'cancelled') OR (booked_by IS NULL AND booking_id IS NULL)
            )
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes, one statement per query for the extended protocol
    for statement in [
        "CREATE INDEX IF NOT EXISTS idx_slots_mentor_date ON availability_slots(mentor_id, slot_date)",
        "CREATE INDEX IF NOT EXISTS idx_slots_date_status ON availability_slots(slot_date, status)",
        "CREATE INDEX IF NOT EXISTS idx_slots_booked_by ON availability_slots(booked_by)",
        "CREATE INDEX IF NOT EXISTS idx_users_roles ON users USING GIN (roles)",
    ] {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema initialized successfully.");
    Ok(())
}
