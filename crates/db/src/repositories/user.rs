use crate::models::{DbUser, into_users};
use eyre::Result;
use mentormesh_core::models::user::{MentorSearch, MentorSort, UserRecord};
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, full_name, email, roles, skills, bio, expertise, experience, \
     is_verified, account_status, created_at, last_login";

/// `%term%` with LIKE wildcards in `term` matched literally
fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub async fn get_user_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<UserRecord>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

    let row = sqlx::query_as::<_, DbUser>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(UserRecord::try_from).transpose()
}

pub async fn get_users_by_ids(pool: &Pool<Postgres>, ids: &[Uuid]) -> Result<Vec<UserRecord>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)");

    let rows = sqlx::query_as::<_, DbUser>(&sql)
        .bind(ids)
        .fetch_all(pool)
        .await?;

    into_users(rows)
}

fn push_search_filters(query: &mut QueryBuilder<'_, Postgres>, search: &MentorSearch) {
    query.push(
        " WHERE 'mentor' = ANY(roles) AND is_verified = TRUE AND account_status = 'active'",
    );

    if !search.skills.is_empty() {
        let patterns: Vec<String> = search.skills.iter().map(|s| contains_pattern(s)).collect();
        query
            .push(" AND EXISTS (SELECT 1 FROM unnest(skills) AS skill WHERE skill ILIKE ANY(")
            .push_bind(patterns)
            .push("))");
    }
    if let Some(min) = search.min_experience {
        query.push(" AND experience >= ").push_bind(min);
    }
    if let Some(max) = search.max_experience {
        query.push(" AND experience <= ").push_bind(max);
    }
    if let Some(expertise) = &search.expertise {
        query
            .push(" AND expertise ILIKE ")
            .push_bind(contains_pattern(expertise));
    }
    if let Some(term) = &search.search {
        let pattern = contains_pattern(term);
        query
            .push(" AND (full_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR bio ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

pub async fn search_mentors(
    pool: &Pool<Postgres>,
    search: &MentorSearch,
) -> Result<(Vec<UserRecord>, u64)> {
    let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    push_search_filters(&mut count_query, search);
    let (total,): (i64,) = count_query.build_query_as().fetch_one(pool).await?;

    let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_search_filters(&mut query, search);
    query.push(match search.sort {
        MentorSort::Experience => {
            " ORDER BY experience DESC NULLS LAST, LOWER(full_name) COLLATE \"C\", full_name COLLATE \"C\""
        }
        MentorSort::Name => " ORDER BY LOWER(full_name) COLLATE \"C\", full_name COLLATE \"C\"",
        MentorSort::Newest => " ORDER BY created_at DESC",
    });
    query
        .push(" LIMIT ")
        .push_bind(i64::from(search.limit))
        .push(" OFFSET ")
        .push_bind(i64::try_from(search.offset()).unwrap_or(i64::MAX));

    let rows = query.build_query_as::<DbUser>().fetch_all(pool).await?;
    tracing::debug!("Mentor search matched {} of {} mentors", rows.len(), total);

    Ok((into_users(rows)?, u64::try_from(total).unwrap_or_default()))
}
