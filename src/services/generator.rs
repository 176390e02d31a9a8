use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use crate::models::clock::ClockRecord;

const BUNDLED_WORDLIST: &str = include_str!("../../assets/wordlist.txt");

pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("Wordlist contains no words")]
    EmptyWordlist,

    #[error("No free clock id found after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Ordered list of short words that clock ids are drawn from.
#[derive(Debug, Clone)]
pub struct Wordlist {
    words: Vec<String>,
}

impl Wordlist {
    /// One word per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, GeneratorError> {
        let words: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(String::from)
            .collect();
        if words.is_empty() {
            return Err(GeneratorError::EmptyWordlist);
        }
        Ok(Self { words })
    }

    /// The word list compiled into the binary.
    pub fn bundled() -> Result<Self, GeneratorError> {
        Self::parse(BUNDLED_WORDLIST)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::parse(&text)?)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Three uniform draws with replacement, joined by hyphens.
pub fn generate_candidate<R: Rng + ?Sized>(words: &Wordlist, rng: &mut R) -> String {
    (0..3)
        .map(|_| words.words[rng.gen_range(0..words.words.len())].as_str())
        .collect::<Vec<_>>()
        .join("-")
}

/// Read access to stored clock records, as seen by an id generator.
#[async_trait]
pub trait ClockLookup: Send + Sync {
    /// `Ok(None)` when nothing is stored under `clock_id`.
    async fn fetch(&self, clock_id: &str) -> anyhow::Result<Option<ClockRecord>>;
}

#[async_trait]
impl<T: ClockLookup + ?Sized> ClockLookup for Arc<T> {
    async fn fetch(&self, clock_id: &str) -> anyhow::Result<Option<ClockRecord>> {
        (**self).fetch(clock_id).await
    }
}

/// How a failed availability lookup is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AvailabilityPolicy {
    /// A lookup error marks the candidate as taken and another one is drawn.
    #[default]
    FailClosed,
    /// A lookup error marks the candidate as free. Can hand out an id already in use.
    FailOpen,
}

/// Draws clock ids until one is not in use.
///
/// The check and the later first write are separate requests, so two
/// generators running at once can both accept the same id.
pub struct ClockIdGenerator<L> {
    lookup: L,
    words: Wordlist,
    policy: AvailabilityPolicy,
    max_attempts: u32,
}

impl<L: ClockLookup> ClockIdGenerator<L> {
    pub fn new(lookup: L, words: Wordlist) -> Self {
        Self {
            lookup,
            words,
            policy: AvailabilityPolicy::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_policy(mut self, policy: AvailabilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Free when nothing is stored or the stored record shows no message.
    pub async fn is_available(&self, candidate: &str) -> bool {
        match self.lookup.fetch(candidate).await {
            Ok(None) => true,
            Ok(Some(record)) => !record.has_message(),
            Err(e) => {
                tracing::warn!(candidate, error = %e, policy = ?self.policy, "Availability lookup failed");
                self.policy == AvailabilityPolicy::FailOpen
            }
        }
    }

    pub async fn generate_unique(&self) -> Result<String, GeneratorError> {
        self.generate_unique_with(&mut StdRng::from_entropy()).await
    }

    pub async fn generate_unique_with<R: Rng + Send + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<String, GeneratorError> {
        for attempt in 1..=self.max_attempts {
            let candidate = generate_candidate(&self.words, rng);
            if self.is_available(&candidate).await {
                tracing::debug!(attempt, "Accepted clock id {candidate}");
                return Ok(candidate);
            }
            tracing::warn!("Generated id '{candidate}' is already in use. Trying a new one.");
        }
        Err(GeneratorError::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::clock::{DayCode, DayMessages, MessageContent};
    use chrono::Utc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Lookup double: the first `taken` calls see a record with a message,
    /// later calls see nothing. `broken` makes every call fail.
    struct FakeLookup {
        calls: AtomicU32,
        taken: u32,
        broken: bool,
        record: Option<ClockRecord>,
    }

    impl FakeLookup {
        fn taken_for(taken: u32) -> Self {
            Self {
                calls: AtomicU32::new(0),
                taken,
                broken: false,
                record: None,
            }
        }

        fn broken() -> Self {
            Self {
                broken: true,
                ..Self::taken_for(0)
            }
        }

        fn with_record(record: ClockRecord) -> Self {
            Self {
                record: Some(record),
                ..Self::taken_for(0)
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ClockLookup for FakeLookup {
        async fn fetch(&self, clock_id: &str) -> anyhow::Result<Option<ClockRecord>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.broken {
                anyhow::bail!("connection refused");
            }
            if n < self.taken {
                let content = MessageContent::Simple("in use".into());
                return Ok(Some(ClockRecord::new(clock_id, content, None, Utc::now())));
            }
            Ok(self.record.clone())
        }
    }

    fn words() -> Wordlist {
        Wordlist::parse("cat\ndog\nsun\n").unwrap()
    }

    #[test]
    fn test_wordlist_parsing() {
        let list = Wordlist::parse("# header\n\n cat \ndog\n").unwrap();
        assert_eq!(list.len(), 2);
        assert!(matches!(
            Wordlist::parse("# only comments\n\n"),
            Err(GeneratorError::EmptyWordlist)
        ));
        assert!(Wordlist::bundled().unwrap().len() > 100);
    }

    #[test]
    fn test_candidate_is_three_listed_words() {
        let list = words();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let candidate = generate_candidate(&list, &mut rng);
            let parts: Vec<&str> = candidate.split('-').collect();
            assert_eq!(parts.len(), 3);
            assert!(parts.iter().all(|p| ["cat", "dog", "sun"].contains(p)));
        }
    }

    #[test]
    fn test_candidate_draws_with_replacement() {
        let list = Wordlist::parse("solo").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_candidate(&list, &mut rng), "solo-solo-solo");
    }

    #[tokio::test]
    async fn test_first_free_candidate_is_returned() {
        let lookup = Arc::new(FakeLookup::taken_for(0));
        let generator = ClockIdGenerator::new(lookup.clone(), words());
        let id = generator.generate_unique().await.unwrap();
        assert_eq!(id.split('-').count(), 3);
        assert_eq!(lookup.calls(), 1);
    }

    #[tokio::test]
    async fn test_taken_candidates_are_retried() {
        let lookup = Arc::new(FakeLookup::taken_for(3));
        let generator = ClockIdGenerator::new(lookup.clone(), words());
        assert!(generator.generate_unique().await.is_ok());
        assert_eq!(lookup.calls(), 4);
    }

    #[tokio::test]
    async fn test_always_taken_stops_after_max_attempts() {
        let lookup = Arc::new(FakeLookup::taken_for(u32::MAX));
        let generator = ClockIdGenerator::new(lookup.clone(), words());
        let err = generator.generate_unique().await.unwrap_err();
        assert!(matches!(err, GeneratorError::Exhausted { attempts: DEFAULT_MAX_ATTEMPTS }));
        assert_eq!(lookup.calls(), DEFAULT_MAX_ATTEMPTS);

        let lookup = Arc::new(FakeLookup::taken_for(u32::MAX));
        let generator = ClockIdGenerator::new(lookup.clone(), words()).with_max_attempts(5);
        assert!(generator.generate_unique().await.is_err());
        assert_eq!(lookup.calls(), 5);
    }

    #[tokio::test]
    async fn test_lookup_errors_fail_closed_by_default() {
        let lookup = Arc::new(FakeLookup::broken());
        let generator = ClockIdGenerator::new(lookup.clone(), words()).with_max_attempts(3);
        assert!(!generator.is_available("cat-dog-sun").await);
        assert!(matches!(
            generator.generate_unique().await,
            Err(GeneratorError::Exhausted { attempts: 3 })
        ));
    }

    #[tokio::test]
    async fn test_fail_open_accepts_on_error() {
        let lookup = Arc::new(FakeLookup::broken());
        let generator =
            ClockIdGenerator::new(lookup.clone(), words()).with_policy(AvailabilityPolicy::FailOpen);
        assert!(generator.is_available("cat-dog-sun").await);
    }

    #[tokio::test]
    async fn test_record_without_message_counts_as_free() {
        let empty = ClockRecord::new("x", MessageContent::Empty, None, Utc::now());
        let generator = ClockIdGenerator::new(FakeLookup::with_record(empty), words());
        assert!(generator.is_available("x").await);

        let blank_days = DayMessages::from([(DayCode::Mon, String::new())]);
        let record = ClockRecord::new("x", MessageContent::PerDay(blank_days), None, Utc::now());
        let generator = ClockIdGenerator::new(FakeLookup::with_record(record), words());
        assert!(generator.is_available("x").await);
    }
}
