//! Random input generation for benchmark runs.

use std::collections::HashSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::types::author::NewAuthor;

const FIRST_NAMES: &[&str] = &[
    "Ada", "Bram", "Chinua", "Doris", "Elena", "Fyodor", "Gabriel", "Haruki", "Iris", "Jorge",
    "Kazuo", "Leo", "Margaret", "Naguib", "Octavia", "Primo", "Quentin", "Rainer", "Sylvia",
    "Toni", "Ursula", "Virginia", "Wislawa", "Xu", "Yasunari", "Zadie",
];

const LAST_NAMES: &[&str] = &[
    "Achebe", "Borges", "Calvino", "Dostoevsky", "Eco", "Ferrante", "Garcia", "Hurston",
    "Ishiguro", "Joyce", "Kafka", "Lessing", "Murakami", "Nabokov", "Oates", "Pamuk",
    "Rilke", "Smith", "Tolstoy", "Updike", "Vonnegut", "Woolf", "Yourcenar", "Zola",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "example.org", "example.net"];

const BIO_SUBJECTS: &[&str] = &[
    "short stories", "epic poetry", "historical novels", "essays", "science fiction",
    "children's books", "literary criticism", "memoirs",
];

const BIO_CHANCE: f64 = 0.8;
const EMAIL_CHANCE: f64 = 0.9;
const BIRTHDATE_CHANCE: f64 = 0.9;
const MAX_RANGE_YEARS: u64 = 20;

pub fn earliest_birthdate() -> DateTime<Utc> {
    midnight(NaiveDate::from_ymd_opt(1940, 1, 1).expect("valid date"))
}

pub fn latest_birthdate() -> DateTime<Utc> {
    midnight(NaiveDate::from_ymd_opt(2005, 12, 31).expect("valid date"))
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0).expect("midnight exists").and_utc()
}

/// Emails handed out during one run. Keeps generated authors clear of the
/// unique constraint on `email`.
#[derive(Debug, Default, Clone)]
pub struct EmailRegistry {
    used: HashSet<String>,
}

impl EmailRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the email was handed out before.
    pub fn claim(&mut self, email: &str) -> bool {
        self.used.insert(email.to_string())
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

#[derive(Debug)]
pub struct AuthorFactory {
    rng:    StdRng,
    emails: EmailRegistry,
}

impl AuthorFactory {
    /// A factory seeded from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            emails: EmailRegistry::new(),
        }
    }

    pub fn emails(&self) -> &EmailRegistry {
        &self.emails
    }

    pub fn author(&mut self) -> NewAuthor {
        let first = pick(&mut self.rng, FIRST_NAMES);
        let last = pick(&mut self.rng, LAST_NAMES);
        let bio = self.rng.gen_bool(BIO_CHANCE).then(|| {
            let subject = pick(&mut self.rng, BIO_SUBJECTS);
            format!("{first} {last} writes {subject}.")
        });
        let email = self
            .rng
            .gen_bool(EMAIL_CHANCE)
            .then(|| self.unique_email(first, last));
        let date_of_birth = self
            .rng
            .gen_bool(BIRTHDATE_CHANCE)
            .then(|| self.birthdate());
        NewAuthor {
            name: format!("{first} {last}"),
            bio,
            email,
            date_of_birth,
        }
    }

    /// A random midnight between [`earliest_birthdate`] and [`latest_birthdate`].
    pub fn birthdate(&mut self) -> DateTime<Utc> {
        let span = (latest_birthdate() - earliest_birthdate()).num_days() as u64;
        earliest_birthdate() + Days::new(self.rng.gen_range(0..=span))
    }

    /// An inclusive window of one to [`MAX_RANGE_YEARS`] years inside the
    /// birthdate interval.
    pub fn birthdate_range(&mut self) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = self.birthdate();
        let width = Days::new(self.rng.gen_range(365..=MAX_RANGE_YEARS * 365));
        let end = (start + width).min(latest_birthdate());
        (start, end)
    }

    fn unique_email(&mut self, first: &str, last: &str) -> String {
        let domain = pick(&mut self.rng, EMAIL_DOMAINS);
        let local = format!("{}.{}", first.to_lowercase(), last.to_lowercase());
        let mut candidate = format!("{local}{}@{domain}", self.rng.gen_range(0..1000));
        let mut suffix = 1000;
        while !self.emails.claim(&candidate) {
            candidate = format!("{local}{suffix}@{domain}");
            suffix += 1;
        }
        candidate
    }
}

fn pick<'a>(rng: &mut StdRng, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}
