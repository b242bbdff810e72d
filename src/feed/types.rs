// src/feed/types.rs
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Location arrangement of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WorkType {
    #[serde(rename = "On-site")]
    OnSite,
    Remote,
    Hybrid,
}

impl WorkType {
    pub const ALL: [WorkType; 3] = [WorkType::OnSite, WorkType::Remote, WorkType::Hybrid];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkType::OnSite => "On-site",
            WorkType::Remote => "Remote",
            WorkType::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for WorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWorkType(pub String);

impl fmt::Display for UnknownWorkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown work type '{}'", self.0)
    }
}

impl std::error::Error for UnknownWorkType {}

impl FromStr for WorkType {
    type Err = UnknownWorkType;

    /// Case-insensitive; accepts "On-site", "onsite" and "on_site" for on-site work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "onsite" => Ok(WorkType::OnSite),
            "remote" => Ok(WorkType::Remote),
            "hybrid" => Ok(WorkType::Hybrid),
            _ => Err(UnknownWorkType(s.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    BDT,
    USD,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostingStatus {
    Active,
    Expired,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSource {
    pub provider: String, // "LinkedIn", "BdJobs", "Glassdoor"
    pub url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    pub tags: Vec<String>, // "MNC", "Unicorn", "Startup", ...
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLocation {
    pub city: String, // "Dhaka"
    pub area: String, // "Banani"
    #[serde(rename = "type")]
    pub work_type: WorkType,
}

/// Salary band. `min <= max` holds for generated records but is not enforced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u64,
    pub max: u64,
    pub currency: Currency,
    pub is_negotiable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDates {
    pub posted: DateTime<Utc>,
    pub extracted: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Canonical job posting record. Immutable once it enters the feed, apart
/// from source merging on a fingerprint collision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: String,
    pub fingerprint: String,
    pub title: String,
    pub normalized_title: String,
    pub company: CompanyInfo,
    pub location: JobLocation,
    pub salary: SalaryRange,
    pub dates: JobDates,
    pub sources: Vec<JobSource>,
    pub status: PostingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JobPosting {
    /// Status as observed at `now`. The stored `status` is never transitioned;
    /// an active posting past its `expires` date reads as expired.
    pub fn effective_status(&self, now: DateTime<Utc>) -> PostingStatus {
        match self.status {
            PostingStatus::Active if now >= self.dates.expires => PostingStatus::Expired,
            other => other,
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.company.tags.iter().any(|t| t == tag)
    }
}
