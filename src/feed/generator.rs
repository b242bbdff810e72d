// src/feed/generator.rs
//! Synthetic job posting generator over fixed reference tables.
//!
//! Randomness and time are injected: `JobGenerator` owns an `Rng` and a
//! `Clock`, so a seeded `StdRng` plus a `FixedClock` reproduces a feed exactly.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::feed::clock::{Clock, SystemClock};
use crate::feed::types::{
    CompanyInfo, Currency, JobDates, JobLocation, JobPosting, JobSource, PostingStatus,
    SalaryRange, WorkType,
};

pub struct CompanyRef {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub logo: &'static str,
}

pub struct LocationRef {
    pub city: &'static str,
    pub area: &'static str,
}

pub const COMPANIES: &[CompanyRef] = &[
    CompanyRef {
        name: "Pathao",
        tags: &["Unicorn", "Tech", "Startup"],
        logo: "https://picsum.photos/40/40?random=1",
    },
    CompanyRef {
        name: "bKash",
        tags: &["Unicorn", "FinTech", "MNC"],
        logo: "https://picsum.photos/40/40?random=2",
    },
    CompanyRef {
        name: "ShopUp",
        tags: &["Startup", "Tech", "Supply Chain"],
        logo: "https://picsum.photos/40/40?random=3",
    },
    CompanyRef {
        name: "Grameenphone",
        tags: &["MNC", "Telco"],
        logo: "https://picsum.photos/40/40?random=4",
    },
    CompanyRef {
        name: "Berger Paints",
        tags: &["MNC", "Manufacturing"],
        logo: "https://picsum.photos/40/40?random=5",
    },
    CompanyRef {
        name: "Chaldal",
        tags: &["Startup", "Tech"],
        logo: "https://picsum.photos/40/40?random=6",
    },
    CompanyRef {
        name: "Brain Station 23",
        tags: &["Tech", "Software"],
        logo: "https://picsum.photos/40/40?random=7",
    },
    CompanyRef {
        name: "British American Tobacco",
        tags: &["MNC", "FMCG"],
        logo: "https://picsum.photos/40/40?random=8",
    },
    CompanyRef {
        name: "Unilever BD",
        tags: &["MNC", "FMCG"],
        logo: "https://picsum.photos/40/40?random=9",
    },
    CompanyRef {
        name: "10 Minute School",
        tags: &["Startup", "EdTech"],
        logo: "https://picsum.photos/40/40?random=10",
    },
];

pub const ROLES: &[&str] = &[
    "Senior Software Engineer",
    "Product Manager",
    "Data Analyst",
    "DevOps Engineer",
    "Marketing Executive",
    "Sales Associate",
    "Human Resources Manager",
    "Full Stack Developer",
    "UX/UI Designer",
    "Supply Chain Officer",
    "Account Manager",
    "React Developer",
];

/// City name of the location that always yields remote work.
pub const REMOTE_CITY: &str = "Remote";

pub const LOCATIONS: &[LocationRef] = &[
    LocationRef { city: "Dhaka", area: "Gulshan 1" },
    LocationRef { city: "Dhaka", area: "Banani" },
    LocationRef { city: "Dhaka", area: "Uttara" },
    LocationRef { city: "Dhaka", area: "Dhanmondi" },
    LocationRef { city: "Dhaka", area: "Karwan Bazar" },
    LocationRef { city: "Chittagong", area: "Agrabad" },
    LocationRef { city: "Sylhet", area: "Zindabazar" },
    LocationRef { city: REMOTE_CITY, area: "Anywhere" },
];

pub const PROVIDERS: &[&str] = &["LinkedIn", "BdJobs", "Glassdoor", "Company Site", "Facebook"];

/// Provider appended as a non-primary source when a multi-source posting lacks it.
pub const MERGE_PROVIDER: &str = "BdJobs";

const REMOTE_PROBABILITY: f64 = 0.2;
const HYBRID_PROBABILITY: f64 = 0.3;
const SALARY_STEP: u64 = 10_000;
const POSTED_WINDOW_MS: i64 = 24 * 60 * 60 * 1000;
const EXPIRY_DAYS: i64 = 30;
const TOKEN_LEN: usize = 9;
const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub struct JobGenerator<R = StdRng, C = SystemClock> {
    rng: R,
    clock: C,
}

impl JobGenerator<StdRng, SystemClock> {
    /// OS-seeded generator on the wall clock; `Send`, so it can live in a task.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng(), SystemClock)
    }
}

impl<C: Clock> JobGenerator<StdRng, C> {
    pub fn seeded(seed: u64, clock: C) -> Self {
        Self::new(StdRng::seed_from_u64(seed), clock)
    }
}

impl<R: Rng, C: Clock> JobGenerator<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    pub fn generate(&mut self) -> JobPosting {
        let now = self.clock.now();
        generate_posting(&mut self.rng, now)
    }

    /// `n` postings in generation order.
    pub fn generate_batch(&mut self, n: usize) -> Vec<JobPosting> {
        (0..n).map(|_| self.generate()).collect()
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// Build one posting from the reference tables. Total: never fails.
pub fn generate_posting<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> JobPosting {
    let company = &COMPANIES[rng.random_range(0..COMPANIES.len())];
    let role = ROLES[rng.random_range(0..ROLES.len())];
    let loc = &LOCATIONS[rng.random_range(0..LOCATIONS.len())];

    let work_type = pick_work_type(rng, loc.city == REMOTE_CITY);

    let min = (3 + rng.random_range(0..8u64)) * SALARY_STEP;
    let max = min + (2 + rng.random_range(0..5u64)) * SALARY_STEP;

    let sources = pick_sources(rng);

    let posted_offset = Duration::milliseconds(rng.random_range(0..POSTED_WINDOW_MS));

    JobPosting {
        id: random_token(rng),
        fingerprint: random_token(rng),
        title: role.to_string(),
        normalized_title: role.to_lowercase(),
        company: CompanyInfo {
            name: company.name.to_string(),
            logo_url: Some(company.logo.to_string()),
            tags: company.tags.iter().map(|t| t.to_string()).collect(),
        },
        location: JobLocation {
            city: loc.city.to_string(),
            area: loc.area.to_string(),
            work_type,
        },
        salary: SalaryRange {
            min,
            max,
            currency: Currency::BDT,
            is_negotiable: rng.random_bool(0.5),
        },
        dates: JobDates {
            posted: now - posted_offset,
            extracted: now,
            expires: now + Duration::days(EXPIRY_DAYS),
        },
        sources,
        status: PostingStatus::Active,
        description: Some(format!(
            "We are looking for a talented {role} to join our team at {}. \
             This is an exciting opportunity to work on large-scale systems \
             serving millions of users in Bangladesh.",
            company.name
        )),
    }
}

/// Remote when the location forces it or with p=0.2; otherwise hybrid with p=0.3.
fn pick_work_type<R: Rng>(rng: &mut R, remote_location: bool) -> WorkType {
    if remote_location || rng.random_bool(REMOTE_PROBABILITY) {
        WorkType::Remote
    } else if rng.random_bool(HYBRID_PROBABILITY) {
        WorkType::Hybrid
    } else {
        WorkType::OnSite
    }
}

fn pick_sources<R: Rng>(rng: &mut R) -> Vec<JobSource> {
    let count = rng.random_range(1..=2usize);
    let mut sources: Vec<JobSource> = (0..count)
        .map(|i| JobSource {
            provider: PROVIDERS[rng.random_range(0..PROVIDERS.len())].to_string(),
            url: "#".to_string(),
            is_primary: i == 0,
        })
        .collect();

    // Simulated cross-source merge.
    if count > 1 && !sources.iter().any(|s| s.provider == MERGE_PROVIDER) {
        sources.push(JobSource {
            provider: MERGE_PROVIDER.to_string(),
            url: "#".to_string(),
            is_primary: false,
        });
    }
    sources
}

fn random_token<R: Rng>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.random_range(0..TOKEN_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::clock::FixedClock;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn seeded_generators_are_reproducible() {
        let mut a = JobGenerator::seeded(7, FixedClock::new(fixed_now()));
        let mut b = JobGenerator::seeded(7, FixedClock::new(fixed_now()));
        assert_eq!(a.generate_batch(5), b.generate_batch(5));
    }

    #[test]
    fn remote_location_always_yields_remote_work() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            assert_eq!(pick_work_type(&mut rng, true), WorkType::Remote);
        }
    }

    #[test]
    fn multi_source_postings_carry_bdjobs() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let s = pick_sources(&mut rng);
            assert!((1..=3).contains(&s.len()));
            assert!(s[0].is_primary);
            if s.len() > 1 {
                assert!(s.iter().any(|x| x.provider == MERGE_PROVIDER));
            }
            if s.len() == 3 {
                assert_eq!(s[2].provider, MERGE_PROVIDER);
                assert!(!s[2].is_primary);
            }
        }
    }

    #[test]
    fn tokens_are_base36_of_fixed_length() {
        let mut rng = StdRng::seed_from_u64(3);
        let t = random_token(&mut rng);
        assert_eq!(t.len(), TOKEN_LEN);
        assert!(t.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn description_and_normalized_title_follow_role() {
        let mut g = JobGenerator::seeded(11, FixedClock::new(fixed_now()));
        let p = g.generate();
        assert_eq!(p.normalized_title, p.title.to_lowercase());
        let d = p.description.as_deref().unwrap_or_default();
        assert!(d.contains(&p.title));
        assert!(d.contains(&p.company.name));
        assert_eq!(p.dates.extracted, fixed_now());
        assert_eq!(p.dates.expires, fixed_now() + Duration::days(30));
    }
}
