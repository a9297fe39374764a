//! Scripted upstream sources and durable tiers for orchestration tests.
//!
//! Each fake replays a script of outcomes, repeating the last one once the
//! script runs out, and counts how often it was called.

use async_trait::async_trait;
use parkpal_common::{
    Coordinates, ParkConfig, ParkFeed, ParkPalError, ParkPalResult, Units, WeatherSnapshot,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use storage::{DurableStore, MemoryStore};
use upstream::{RideSource, WeatherSource};

/// One scripted upstream outcome.
#[derive(Debug, Clone)]
pub enum Scripted<T> {
    Ok(T),
    Status(u16),
    Timeout,
    Malformed,
    /// Succeed after sleeping, for exercising caller-side deadlines.
    Slow(Duration, T),
}

impl<T> Scripted<T> {
    async fn resolve(self) -> ParkPalResult<T> {
        match self {
            Scripted::Ok(value) => Ok(value),
            Scripted::Status(code) => Err(ParkPalError::UpstreamStatus(code)),
            Scripted::Timeout => Err(ParkPalError::Timeout),
            Scripted::Malformed => {
                Err(ParkPalError::MalformedResponse("scripted malformed body".to_string()))
            }
            Scripted::Slow(delay, value) => {
                tokio::time::sleep(delay).await;
                Ok(value)
            }
        }
    }
}

/// Replays a script, repeating the final entry.
struct Script<T> {
    steps: Vec<Scripted<T>>,
    next: usize,
}

impl<T: Clone> Script<T> {
    fn new(steps: Vec<Scripted<T>>) -> Self {
        assert!(!steps.is_empty(), "script needs at least one step");
        Self { steps, next: 0 }
    }

    fn advance(&mut self) -> Scripted<T> {
        let idx = self.next.min(self.steps.len() - 1);
        self.next += 1;
        self.steps[idx].clone()
    }
}

/// Ride source with a script per park id.
///
/// Parks without a script answer with HTTP 404.
#[derive(Default)]
pub struct FakeRides {
    scripts: Mutex<HashMap<i64, Script<ParkFeed>>>,
    calls: Mutex<HashMap<i64, usize>>,
}

impl FakeRides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `feed` for `park_id`.
    pub fn with_park(self, park_id: i64, feed: ParkFeed) -> Self {
        self.with_script(park_id, vec![Scripted::Ok(feed)])
    }

    /// Replay `steps` for `park_id`.
    pub fn with_script(self, park_id: i64, steps: Vec<Scripted<ParkFeed>>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(park_id, Script::new(steps));
        self
    }

    /// Calls made for one park.
    pub fn calls_for(&self, park_id: i64) -> usize {
        self.calls.lock().unwrap().get(&park_id).copied().unwrap_or(0)
    }

    /// Calls made across all parks.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl RideSource for FakeRides {
    async fn fetch_rides(&self, park: &ParkConfig) -> ParkPalResult<ParkFeed> {
        *self.calls.lock().unwrap().entry(park.id).or_insert(0) += 1;

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&park.id)
            .map(Script::advance)
            .unwrap_or(Scripted::Status(404));
        step.resolve().await
    }
}

/// Weather source replaying one script regardless of location.
pub struct FakeWeather {
    script: Mutex<Script<WeatherSnapshot>>,
    calls: AtomicUsize,
    last_units: Mutex<Option<Units>>,
}

impl FakeWeather {
    pub fn new(steps: Vec<Scripted<WeatherSnapshot>>) -> Self {
        Self {
            script: Mutex::new(Script::new(steps)),
            calls: AtomicUsize::new(0),
            last_units: Mutex::new(None),
        }
    }

    /// Always answer `snapshot`.
    pub fn always(snapshot: WeatherSnapshot) -> Self {
        Self::new(vec![Scripted::Ok(snapshot)])
    }

    /// Always fail with `outcome`.
    pub fn failing(outcome: Scripted<WeatherSnapshot>) -> Self {
        Self::new(vec![outcome])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Units requested by the most recent call.
    pub fn last_units(&self) -> Option<Units> {
        *self.last_units.lock().unwrap()
    }
}

#[async_trait]
impl WeatherSource for FakeWeather {
    async fn fetch_weather(
        &self,
        _coords: Coordinates,
        units: Units,
    ) -> ParkPalResult<WeatherSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_units.lock().unwrap() = Some(units);

        let step = self.script.lock().unwrap().advance();
        step.resolve().await
    }
}

/// Durable tier that can refuse reads and/or writes, and counts both.
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: bool,
    fail_writes: bool,
    loads: AtomicUsize,
    stores: AtomicUsize,
}

impl FlakyStore {
    /// A store that behaves like [`MemoryStore`].
    pub fn healthy() -> Self {
        Self::default()
    }

    /// A store whose writes always fail.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// A store where every operation fails.
    pub fn unavailable() -> Self {
        Self {
            fail_reads: true,
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Write attempts, including refused ones.
    pub fn stores(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    /// Write a raw value directly, bypassing failure injection.
    pub async fn seed(&self, key: &str, raw: impl Into<String>) {
        self.inner
            .store(key, raw.into(), Duration::from_secs(3600))
            .await
            .unwrap();
    }
}

#[async_trait]
impl DurableStore for FlakyStore {
    async fn load(&self, key: &str) -> ParkPalResult<Option<String>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(ParkPalError::CacheError("connection refused".to_string()));
        }
        self.inner.load(key).await
    }

    async fn store(&self, key: &str, value: String, retention: Duration) -> ParkPalResult<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(ParkPalError::CacheError("connection refused".to_string()));
        }
        self.inner.store(key, value, retention).await
    }

    fn backend_name(&self) -> &'static str {
        "flaky"
    }
}
