//! Conditional logging predicates
//!
//! Three predicate shapes gate emission beyond the logger's level check:
//!
//! - [`Condition`]: nullary, e.g. environment, clock, sampling, rate limits
//! - [`ContextCondition`]: evaluated against an optional [`Context`]
//! - [`LevelCondition`]: evaluated against the message level and logger fields
//!
//! Stateful predicates ([`RateLimit`], [`CountBased`], [`SampleEveryN`],
//! [`RandomSample`]) own their counters behind a mutex and are safe to share
//! across threads.
//!
//! # Example
//!
//! ```
//! use rust_structured_logger::condition::{and, not, rate_limit, in_production};
//!
//! let gate = and([not(in_production()), rate_limit(10)]);
//! let _ = gate.check();
//! ```

use super::context::{Context, ContextKey};
use super::fields::{FieldValue, Fields};
use super::log_level::LogLevel;
use chrono::{Datelike, Local, Timelike, Weekday};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Nullary predicate
pub trait Condition: Send + Sync {
    fn check(&self) -> bool;
}

/// Predicate over an optional context
pub trait ContextCondition: Send + Sync {
    fn check(&self, ctx: Option<&Context>) -> bool;
}

/// Predicate over a message level and the logger's fields
pub trait LevelCondition: Send + Sync {
    fn check(&self, level: LogLevel, fields: &Fields) -> bool;
}

pub type SharedCondition = Arc<dyn Condition>;
pub type SharedContextCondition = Arc<dyn ContextCondition>;
pub type SharedLevelCondition = Arc<dyn LevelCondition>;

impl<F> Condition for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn check(&self) -> bool {
        self()
    }
}

impl<F> ContextCondition for F
where
    F: Fn(Option<&Context>) -> bool + Send + Sync,
{
    fn check(&self, ctx: Option<&Context>) -> bool {
        self(ctx)
    }
}

impl<F> LevelCondition for F
where
    F: Fn(LogLevel, &Fields) -> bool + Send + Sync,
{
    fn check(&self, level: LogLevel, fields: &Fields) -> bool {
        self(level, fields)
    }
}

// ============================================================================
// Constant and environment conditions
// ============================================================================

pub fn always() -> SharedCondition {
    Arc::new(|| true)
}

pub fn never() -> SharedCondition {
    Arc::new(|| false)
}

/// True when environment variable `key` equals `value`.
pub fn env_equals(key: impl Into<String>, value: impl Into<String>) -> SharedCondition {
    let key = key.into();
    let value = value.into();
    Arc::new(move || std::env::var(&key).is_ok_and(|current| current == value))
}

/// True when environment variable `key` is set, whatever its value.
pub fn env_exists(key: impl Into<String>) -> SharedCondition {
    let key = key.into();
    Arc::new(move || std::env::var_os(&key).is_some())
}

pub fn in_production() -> SharedCondition {
    env_equals("ENV", "production")
}

pub fn in_development() -> SharedCondition {
    env_equals("ENV", "development")
}

pub fn in_testing() -> SharedCondition {
    env_equals("ENV", "test")
}

pub fn in_staging() -> SharedCondition {
    env_equals("ENV", "staging")
}

pub fn debug_enabled() -> SharedCondition {
    env_equals("DEBUG", "true")
}

pub fn verbose_mode() -> SharedCondition {
    env_equals("VERBOSE", "true")
}

// ============================================================================
// Clock conditions
// ============================================================================

/// True while the local hour lies in `start..=end`.
///
/// When `start > end` the range wraps midnight, so `time_range(22, 6)`
/// covers 22:00 through 06:59.
pub fn time_range(start_hour: u32, end_hour: u32) -> SharedCondition {
    Arc::new(move || hour_in_range(Local::now().hour(), start_hour, end_hour))
}

fn hour_in_range(hour: u32, start_hour: u32, end_hour: u32) -> bool {
    if start_hour <= end_hour {
        hour >= start_hour && hour <= end_hour
    } else {
        hour >= start_hour || hour <= end_hour
    }
}

/// Local hours 9 through 17.
pub fn working_hours() -> SharedCondition {
    time_range(9, 17)
}

pub fn weekend() -> SharedCondition {
    Arc::new(is_weekend_now)
}

pub fn weekday() -> SharedCondition {
    Arc::new(|| !is_weekend_now())
}

fn is_weekend_now() -> bool {
    matches!(Local::now().weekday(), Weekday::Sat | Weekday::Sun)
}

// ============================================================================
// Combinators
// ============================================================================

/// Short-circuit conjunction; empty input is true.
#[derive(Clone)]
pub struct And(Vec<SharedCondition>);

impl Condition for And {
    fn check(&self) -> bool {
        self.0.iter().all(|condition| condition.check())
    }
}

/// Short-circuit disjunction; empty input is false.
#[derive(Clone)]
pub struct Or(Vec<SharedCondition>);

impl Condition for Or {
    fn check(&self) -> bool {
        self.0.iter().any(|condition| condition.check())
    }
}

#[derive(Clone)]
pub struct Not(SharedCondition);

impl Condition for Not {
    fn check(&self) -> bool {
        !self.0.check()
    }
}

pub fn and(conditions: impl IntoIterator<Item = SharedCondition>) -> SharedCondition {
    Arc::new(And(conditions.into_iter().collect()))
}

pub fn or(conditions: impl IntoIterator<Item = SharedCondition>) -> SharedCondition {
    Arc::new(Or(conditions.into_iter().collect()))
}

pub fn not(condition: SharedCondition) -> SharedCondition {
    Arc::new(Not(condition))
}

/// Alias of [`and`].
pub fn all(conditions: impl IntoIterator<Item = SharedCondition>) -> SharedCondition {
    and(conditions)
}

/// Alias of [`or`].
pub fn any(conditions: impl IntoIterator<Item = SharedCondition>) -> SharedCondition {
    or(conditions)
}

// ============================================================================
// Stateful conditions
// ============================================================================

struct RateWindow {
    started: Option<Instant>,
    count: u64,
}

/// Admits at most `max_per_second` calls per one-second window.
///
/// The window restarts on the first call made a second or more after the
/// previous restart.
pub struct RateLimit {
    max_per_second: u64,
    window: Mutex<RateWindow>,
}

impl RateLimit {
    pub fn new(max_per_second: u64) -> Self {
        Self {
            max_per_second,
            window: Mutex::new(RateWindow {
                started: None,
                count: 0,
            }),
        }
    }
}

impl Condition for RateLimit {
    fn check(&self) -> bool {
        let mut window = self.window.lock();
        let now = Instant::now();
        let expired = window
            .started
            .map_or(true, |started| now.duration_since(started) >= Duration::from_secs(1));
        if expired {
            window.started = Some(now);
            window.count = 0;
        }

        if window.count < self.max_per_second {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Admits exactly `max_count` calls over its whole lifetime.
pub struct CountBased {
    max_count: u64,
    count: Mutex<u64>,
}

impl CountBased {
    pub fn new(max_count: u64) -> Self {
        Self {
            max_count,
            count: Mutex::new(0),
        }
    }
}

impl Condition for CountBased {
    fn check(&self) -> bool {
        let mut count = self.count.lock();
        if *count < self.max_count {
            *count += 1;
            true
        } else {
            false
        }
    }
}

/// Admits the 1st call and every `n`th call after it.
pub struct SampleEveryN {
    n: u64,
    count: Mutex<u64>,
}

impl SampleEveryN {
    pub fn new(n: u64) -> Self {
        Self {
            n: n.max(1),
            count: Mutex::new(0),
        }
    }
}

impl Condition for SampleEveryN {
    fn check(&self) -> bool {
        let mut count = self.count.lock();
        *count += 1;
        (*count - 1) % self.n == 0
    }
}

/// Admits roughly `percentage` percent of calls.
///
/// The generator is seeded from the wall clock; it is not suitable for
/// anything beyond log sampling.
pub struct RandomSample {
    percentage: u32,
    rng: Mutex<StdRng>,
}

impl RandomSample {
    pub fn new(percentage: u32) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self {
            percentage: percentage.min(100),
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Condition for RandomSample {
    fn check(&self) -> bool {
        self.rng.lock().gen_range(0..100) < self.percentage
    }
}

/// See [`RateLimit`]. Zero or negative limits never admit.
pub fn rate_limit(max_per_second: i64) -> SharedCondition {
    if max_per_second <= 0 {
        return never();
    }
    Arc::new(RateLimit::new(max_per_second as u64))
}

/// See [`CountBased`]. Zero or negative counts never admit.
pub fn count_based(max_count: i64) -> SharedCondition {
    Arc::new(CountBased::new(max_count.max(0) as u64))
}

/// See [`SampleEveryN`]. `n <= 1` admits every call.
pub fn sample_every_n(n: i64) -> SharedCondition {
    if n <= 1 {
        return always();
    }
    Arc::new(SampleEveryN::new(n as u64))
}

/// See [`RandomSample`]. `<= 0` never admits, `>= 100` always admits.
pub fn random_sample(percentage: i64) -> SharedCondition {
    if percentage <= 0 {
        return never();
    }
    if percentage >= 100 {
        return always();
    }
    Arc::new(RandomSample::new(percentage as u32))
}

// ============================================================================
// Context conditions
// ============================================================================

/// True when the context carries a non-nil value for `key`.
pub fn has_context_value(key: impl Into<ContextKey>) -> SharedContextCondition {
    let key = key.into();
    Arc::new(move |ctx: Option<&Context>| ctx.is_some_and(|ctx| ctx.value(&key).is_some()))
}

/// True when the value under `key` equals `expected`.
///
/// `expected = None` matches an explicit nil and an absent key alike, unlike
/// [`has_context_value`] which treats a present nil as missing. A missing
/// context never matches.
pub fn context_value_equals<T>(key: impl Into<ContextKey>, expected: Option<T>) -> SharedContextCondition
where
    T: Any + PartialEq + Send + Sync,
{
    let key = key.into();
    Arc::new(move |ctx: Option<&Context>| {
        let Some(ctx) = ctx else {
            return false;
        };
        match (ctx.value(&key), expected.as_ref()) {
            (None, None) => true,
            (Some(actual), Some(expected)) => actual.downcast_ref::<T>() == Some(expected),
            _ => false,
        }
    })
}

// ============================================================================
// Level and field conditions
// ============================================================================

pub fn only_level(target: LogLevel) -> SharedLevelCondition {
    Arc::new(move |level: LogLevel, _: &Fields| level == target)
}

/// Independent of the logger's own minimum level; both must pass when both are used.
pub fn min_level(min: LogLevel) -> SharedLevelCondition {
    Arc::new(move |level: LogLevel, _: &Fields| level >= min)
}

pub fn has_field(name: impl Into<String>) -> SharedLevelCondition {
    let name = name.into();
    Arc::new(move |_: LogLevel, fields: &Fields| fields.contains_key(&name))
}

pub fn field_equals(name: impl Into<String>, expected: impl Into<FieldValue>) -> SharedLevelCondition {
    let name = name.into();
    let expected = expected.into();
    Arc::new(move |_: LogLevel, fields: &Fields| fields.get(&name) == Some(&expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn counting(result: bool, counter: Arc<Mutex<u32>>) -> SharedCondition {
        Arc::new(move || {
            *counter.lock() += 1;
            result
        })
    }

    #[test]
    fn test_always_never() {
        assert!(always().check());
        assert!(!never().check());
    }

    #[test]
    fn test_env_conditions() {
        std::env::set_var("RSL_CONDITION_TEST_VAR", "debug");
        assert!(env_equals("RSL_CONDITION_TEST_VAR", "debug").check());
        assert!(!env_equals("RSL_CONDITION_TEST_VAR", "info").check());
        assert!(env_exists("RSL_CONDITION_TEST_VAR").check());
        std::env::remove_var("RSL_CONDITION_TEST_VAR");
        assert!(!env_exists("RSL_CONDITION_TEST_VAR").check());
        assert!(!env_equals("RSL_CONDITION_TEST_VAR", "debug").check());
    }

    #[test]
    fn test_hour_in_range() {
        assert!(hour_in_range(9, 9, 17));
        assert!(hour_in_range(17, 9, 17));
        assert!(!hour_in_range(18, 9, 17));
        assert!(hour_in_range(23, 22, 6));
        assert!(hour_in_range(3, 22, 6));
        assert!(!hour_in_range(12, 22, 6));
    }

    #[test]
    fn test_weekend_and_weekday_are_complementary() {
        assert_ne!(weekend().check(), weekday().check());
    }

    #[test]
    fn test_and_or_identities() {
        assert!(and(Vec::new()).check());
        assert!(!or(Vec::new()).check());
        assert!(all(Vec::new()).check());
        assert!(!any(Vec::new()).check());
    }

    #[test]
    fn test_and_short_circuits() {
        let calls = Arc::new(Mutex::new(0));
        let gate = and([never(), counting(true, Arc::clone(&calls))]);
        assert!(!gate.check());
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_or_short_circuits() {
        let calls = Arc::new(Mutex::new(0));
        let gate = or([always(), counting(false, Arc::clone(&calls))]);
        assert!(gate.check());
        assert_eq!(*calls.lock(), 0);
    }

    #[test]
    fn test_not() {
        assert!(not(never()).check());
        assert!(!not(always()).check());
    }

    #[test]
    fn test_rate_limit_window() {
        let limit = rate_limit(3);
        assert!(limit.check());
        assert!(limit.check());
        assert!(limit.check());
        for _ in 0..5 {
            assert!(!limit.check());
        }

        thread::sleep(Duration::from_millis(1100));
        assert!(limit.check());
    }

    #[test]
    fn test_rate_limit_non_positive_is_never() {
        assert!(!rate_limit(0).check());
        assert!(!rate_limit(-5).check());
    }

    #[test]
    fn test_count_based() {
        let gate = count_based(2);
        assert!(gate.check());
        assert!(gate.check());
        assert!(!gate.check());
        assert!(!gate.check());
        assert!(!count_based(0).check());
    }

    #[test]
    fn test_sample_every_n() {
        let gate = sample_every_n(3);
        let results: Vec<bool> = (0..7).map(|_| gate.check()).collect();
        assert_eq!(results, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_sample_every_n_degenerates_to_always() {
        let gate = sample_every_n(1);
        assert!((0..10).all(|_| gate.check()));
        let gate = sample_every_n(0);
        assert!((0..10).all(|_| gate.check()));
    }

    #[test]
    fn test_random_sample_bounds() {
        assert!(!random_sample(0).check());
        assert!(random_sample(100).check());
        assert!(random_sample(250).check());
    }

    #[test]
    fn test_random_sample_produces_both_outcomes() {
        let gate = random_sample(50);
        let admitted = (0..1000).filter(|_| gate.check()).count();
        assert!(admitted > 0 && admitted < 1000, "admitted {}", admitted);
    }

    #[test]
    fn test_has_context_value() {
        let gate = has_context_value("request_id");
        assert!(!gate.check(None));
        assert!(!gate.check(Some(&Context::background())));
        assert!(!gate.check(Some(&Context::background().with_nil("request_id"))));
        assert!(gate.check(Some(&Context::background().with_value("request_id", "abc"))));
    }

    #[test]
    fn test_context_value_equals() {
        let gate = context_value_equals("role", Some("admin"));
        let admin = Context::background().with_value("role", "admin");
        let guest = Context::background().with_value("role", "guest");

        assert!(!gate.check(None));
        assert!(gate.check(Some(&admin)));
        assert!(!gate.check(Some(&guest)));
        assert!(!gate.check(Some(&Context::background())));
    }

    #[test]
    fn test_context_value_equals_explicit_nil() {
        let gate = context_value_equals::<&str>("role", None);
        let nil = Context::background().with_nil("role");

        assert!(gate.check(Some(&nil)));
        assert!(!has_context_value("role").check(Some(&nil)));
        assert!(!gate.check(Some(&Context::background().with_value("role", "admin"))));
        assert!(!gate.check(None));
    }

    #[test]
    fn test_level_conditions() {
        let fields = Fields::new();
        assert!(only_level(LogLevel::Error).check(LogLevel::Error, &fields));
        assert!(!only_level(LogLevel::Error).check(LogLevel::Fatal, &fields));
        assert!(min_level(LogLevel::Warning).check(LogLevel::Error, &fields));
        assert!(min_level(LogLevel::Warning).check(LogLevel::Warning, &fields));
        assert!(!min_level(LogLevel::Warning).check(LogLevel::Info, &fields));
    }

    #[test]
    fn test_field_conditions() {
        let fields = Fields::new().with("user_id", 123).with("env", "production");
        assert!(has_field("user_id").check(LogLevel::Info, &fields));
        assert!(!has_field("missing").check(LogLevel::Info, &fields));
        assert!(field_equals("env", "production").check(LogLevel::Info, &fields));
        assert!(!field_equals("env", "staging").check(LogLevel::Info, &fields));
        assert!(!field_equals("missing", "x").check(LogLevel::Info, &fields));
    }
}
