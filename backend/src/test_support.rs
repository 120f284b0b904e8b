//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`). Compiled for tests and behind the `test-support` feature.

use std::sync::{Arc, Mutex, MutexGuard};

use argon2::Params;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::CredentialHasher;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::{InMemorySnippetRepository, InMemoryUserRepository};
use crate::server::build_http_state;

/// Clock whose current time is set and advanced by the test.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock forward.
    pub fn advance(&self, delta: TimeDelta) {
        *self.lock_clock() += delta;
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex poisoned"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Argon2id hasher with minimal cost so tests do not spend seconds hashing.
pub fn fast_credential_hasher() -> CredentialHasher {
    match Params::new(Params::MIN_M_COST, Params::MIN_T_COST, Params::MIN_P_COST, None) {
        Ok(params) => CredentialHasher::new(params),
        Err(error) => panic!("minimal argon2 params rejected: {error}"),
    }
}

/// HTTP state over in-memory repositories, with handles to inspect them.
pub struct MemoryHarness {
    pub state: HttpState,
    pub snippets: Arc<InMemorySnippetRepository>,
    pub users: Arc<InMemoryUserRepository>,
    pub clock: Arc<MutableClock>,
}

/// In-memory state at 2024-03-01 12:00 UTC with the cheap hasher.
pub fn memory_harness() -> MemoryHarness {
    let Some(start) = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single() else {
        panic!("fixed start time is valid");
    };
    let clock = Arc::new(MutableClock::new(start));
    let snippets = Arc::new(InMemorySnippetRepository::default());
    let users = Arc::new(InMemoryUserRepository::default());
    let state = match build_http_state(
        Arc::clone(&snippets),
        Arc::clone(&users),
        fast_credential_hasher(),
        clock.clone(),
    ) {
        Ok(state) => state,
        Err(error) => panic!("HTTP state failed to build: {error}"),
    };
    MemoryHarness {
        state,
        snippets,
        users,
        clock,
    }
}
