// src/filter.rs
//! Filter predicate over feed postings.
//!
//! Four stages, AND-combined and short-circuiting in this order: text search,
//! work type, company tags, salary floor. Every stage treats an empty/zero
//! criterion as "no constraint".

use serde::{Deserialize, Serialize};

use crate::feed::types::{JobPosting, WorkType};

/// Company classes offered as tag filters.
pub const COMPANY_CLASSES: [&str; 5] = ["Unicorn", "MNC", "Startup", "FinTech", "Govt"];

/// Salary floor slider bounds (BDT) for UI consumers.
pub const SALARY_SLIDER_MAX: u64 = 200_000;
pub const SALARY_SLIDER_STEP: u64 = 10_000;

/// How a set-valued criterion with nothing selected behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptySelection {
    AcceptAll,
}

/// Nothing selected means no restriction on that dimension.
pub const EMPTY_SELECTION: EmptySelection = EmptySelection::AcceptAll;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryBounds {
    pub min: u64,
    pub max: u64,
    pub step: u64,
}

/// Choices a filter UI offers, served by `GET /filters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub work_types: [WorkType; 3],
    pub company_classes: [&'static str; 5],
    pub salary: SalaryBounds,
    pub empty_selection: EmptySelection,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            work_types: WorkType::ALL,
            company_classes: COMPANY_CLASSES,
            salary: SalaryBounds {
                min: 0,
                max: SALARY_SLIDER_MAX,
                step: SALARY_SLIDER_STEP,
            },
            empty_selection: EMPTY_SELECTION,
        }
    }
}

/// Criteria as chosen in the UI. Empty sets and a zero floor constrain nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub job_types: Vec<WorkType>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub min_salary: u64,
}

impl FilterCriteria {
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_job_types(mut self, types: impl IntoIterator<Item = WorkType>) -> Self {
        self.job_types = types.into_iter().collect();
        self
    }

    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_min_salary(mut self, floor: u64) -> Self {
        self.min_salary = floor;
        self
    }

    /// Add the work type if absent, remove it if present.
    pub fn toggle_job_type(&mut self, wt: WorkType) {
        if let Some(i) = self.job_types.iter().position(|t| *t == wt) {
            self.job_types.remove(i);
        } else {
            self.job_types.push(wt);
        }
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(i) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(i);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.search.is_empty()
            && self.job_types.is_empty()
            && self.tags.is_empty()
            && self.min_salary == 0
    }
}

/// Apply the empty-selection policy, then `admits` to a non-empty selection.
fn selection_admits<T>(selected: &[T], admits: impl FnOnce(&[T]) -> bool) -> bool {
    if selected.is_empty() {
        return match EMPTY_SELECTION {
            EmptySelection::AcceptAll => true,
        };
    }
    admits(selected)
}

fn search_matches(posting: &JobPosting, search: &str) -> bool {
    if search.is_empty() {
        return true;
    }
    let q = search.to_lowercase();
    posting.normalized_title.contains(&q) || posting.company.name.to_lowercase().contains(&q)
}

/// Whether `posting` passes all four stages of `criteria`. Pure.
pub fn matches(posting: &JobPosting, criteria: &FilterCriteria) -> bool {
    if !search_matches(posting, &criteria.search) {
        return false;
    }
    if !selection_admits(&criteria.job_types, |types| {
        types.contains(&posting.location.work_type)
    }) {
        return false;
    }
    if !selection_admits(&criteria.tags, |tags| {
        tags.iter().any(|t| posting.has_tag(t))
    }) {
        return false;
    }
    // Floor is compared against the band's max, inclusive.
    if criteria.min_salary > 0 && posting.salary.max < criteria.min_salary {
        return false;
    }
    true
}

/// Order-preserving subset of `postings` passing `criteria`.
pub fn visible<'a, I>(postings: I, criteria: &FilterCriteria) -> Vec<JobPosting>
where
    I: IntoIterator<Item = &'a JobPosting>,
{
    postings
        .into_iter()
        .filter(|p| matches(p, criteria))
        .cloned()
        .collect()
}
