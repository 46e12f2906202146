//! Read-only view of the user directory.
//!
//! Users are owned by the account service; this crate only reads mentor and
//! mentee records to resolve references, filter by skills and search mentors.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Mentor => "mentor",
            Role::Mentee => "mentee",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mentor" => Ok(Role::Mentor),
            "mentee" => Ok(Role::Mentee),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Pending => "pending",
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(AccountStatus::Pending),
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            other => Err(format!("unknown account status '{}'", other)),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorProfile {
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub expertise: Option<String>,
    /// Years of experience
    pub experience: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<Role>,
    pub mentor_profile: MentorProfile,
    pub is_verified: bool,
    pub account_status: AccountStatus,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl UserRecord {
    pub fn is_mentor(&self) -> bool {
        self.roles.contains(&Role::Mentor)
    }

    pub fn is_mentee(&self) -> bool {
        self.roles.contains(&Role::Mentee)
    }

    /// Active, verified mentors are the only ones listed in search
    pub fn is_listed_mentor(&self) -> bool {
        self.is_mentor() && self.is_verified && self.account_status == AccountStatus::Active
    }
}

/// Name and email of a user, as embedded in slot responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

impl From<&UserRecord> for UserRef {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Mentor card shown next to slots and in search results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentorSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mentor_profile: MentorProfile,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<&UserRecord> for MentorSummary {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            mentor_profile: user.mentor_profile.clone(),
            created_at: user.created_at,
            last_login: user.last_login,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentorSort {
    /// Most experienced first
    #[default]
    Experience,
    /// Alphabetical by full name
    Name,
    /// Most recently registered first
    Newest,
}

impl MentorSort {
    /// Unknown sort keys fall back to experience
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => MentorSort::Name,
            Some("newest") => MentorSort::Newest,
            _ => MentorSort::Experience,
        }
    }
}

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
pub const MAX_SEARCH_LIMIT: u32 = 100;

/// Normalized mentor search criteria
#[derive(Debug, Clone, PartialEq)]
pub struct MentorSearch {
    pub skills: Vec<String>,
    pub min_experience: Option<i32>,
    pub max_experience: Option<i32>,
    pub expertise: Option<String>,
    pub search: Option<String>,
    pub sort: MentorSort,
    pub limit: u32,
    pub page: u32,
}

impl Default for MentorSearch {
    fn default() -> Self {
        Self {
            skills: Vec::new(),
            min_experience: None,
            max_experience: None,
            expertise: None,
            search: None,
            sort: MentorSort::Experience,
            limit: DEFAULT_SEARCH_LIMIT,
            page: 1,
        }
    }
}

impl MentorSearch {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Whether a directory record satisfies every filter
    ///
    /// Mirrors the SQL used by the Postgres directory so both stores return
    /// the same set.
    pub fn matches(&self, user: &UserRecord) -> bool {
        if !user.is_listed_mentor() {
            return false;
        }
        let profile = &user.mentor_profile;

        if !self.skills.is_empty() && !skills_match(&profile.skills, &self.skills) {
            return false;
        }
        if let Some(min) = self.min_experience
            && profile.experience.is_none_or(|exp| exp < min)
        {
            return false;
        }
        if let Some(max) = self.max_experience
            && profile.experience.is_none_or(|exp| exp > max)
        {
            return false;
        }
        if let Some(expertise) = &self.expertise
            && !profile
                .expertise
                .as_deref()
                .is_some_and(|value| contains_ignore_case(value, expertise))
        {
            return false;
        }
        if let Some(search) = &self.search {
            let in_name = contains_ignore_case(&user.full_name, search);
            let in_bio = profile
                .bio
                .as_deref()
                .is_some_and(|bio| contains_ignore_case(bio, search));
            if !in_name && !in_bio {
                return false;
            }
        }
        true
    }

    /// Orders records the way the search endpoint returns them
    ///
    /// Names compare lowercased and bytewise, matching the Postgres
    /// `LOWER(full_name) COLLATE "C"` ordering.
    pub fn sort_records(&self, users: &mut [UserRecord]) {
        match self.sort {
            MentorSort::Experience => users.sort_by(|a, b| {
                b.mentor_profile
                    .experience
                    .unwrap_or(-1)
                    .cmp(&a.mentor_profile.experience.unwrap_or(-1))
                    .then_with(|| by_name(a, b))
            }),
            MentorSort::Name => users.sort_by(by_name),
            MentorSort::Newest => users.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

fn by_name(a: &UserRecord, b: &UserRecord) -> std::cmp::Ordering {
    a.full_name
        .to_lowercase()
        .cmp(&b.full_name.to_lowercase())
        .then_with(|| a.full_name.cmp(&b.full_name))
}

/// Splits a comma-separated skills parameter into trimmed, non-empty tokens
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when any mentor skill contains any requested token, ignoring case
pub fn skills_match(mentor_skills: &[String], requested: &[String]) -> bool {
    requested.iter().any(|token| {
        mentor_skills
            .iter()
            .any(|skill| contains_ignore_case(skill, token))
    })
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
