use std::net::IpAddr;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use log::{debug, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const BURST: NonZeroU32 = nonzero(5);
const VISITOR_RATE: NonZeroU32 = nonzero(10);
const AUTH_VISITOR_RATE: NonZeroU32 = nonzero(5);
const AUTH_STARTING_SCORE: u32 = 2;
const TIGHTEN_EVERY: u32 = 10;
const TIGHTENED_PERIOD: Duration = Duration::from_secs(5 * 60);
pub const BAN_SCORE: u32 = 50;
const SCORE_DECAY: u32 = 5;
const IDLE_EVICTION: Duration = Duration::from_secs(5 * 60);
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

const fn nonzero(n: u32) -> NonZeroU32 {
    match NonZeroU32::new(n) {
        Some(n) => n,
        None => panic!("rate must be non-zero"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Throttled,
    Banned,
}

struct Visitor {
    limiter: DefaultDirectRateLimiter,
    last_request: Instant,
    // > 0 means the visitor has been poking at auth
    behavior_score: u32,
}

impl Visitor {
    fn fresh(auth: bool, now: Instant) -> Self {
        // first contact through auth is trusted less
        let (rate, behavior_score) = if auth {
            (AUTH_VISITOR_RATE, AUTH_STARTING_SCORE)
        } else {
            (VISITOR_RATE, 0)
        };

        Self {
            limiter: RateLimiter::direct(Quota::per_second(rate).allow_burst(BURST)),
            last_request: now,
            behavior_score,
        }
    }

    fn record_auth(&mut self, ip: IpAddr) {
        self.behavior_score += 1;
        if self.behavior_score % TIGHTEN_EVERY == 0 {
            let quota = Quota::with_period(TIGHTENED_PERIOD)
                .unwrap_or_else(|| Quota::per_minute(nonzero(1)))
                .allow_burst(BURST);
            self.limiter = RateLimiter::direct(quota);
            info!(
                "Tightened rate for {ip} to one request per {}s (behavior score {})",
                TIGHTENED_PERIOD.as_secs(),
                self.behavior_score
            );
        }
    }
}

/// Per-IP admission control for the REST API.
#[derive(Default)]
pub struct VisitorRegistry {
    visitors: DashMap<IpAddr, Visitor>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&self, ip: IpAddr, auth: bool) -> Admission {
        self.admit_at(ip, auth, Instant::now())
    }

    fn admit_at(&self, ip: IpAddr, auth: bool, now: Instant) -> Admission {
        let visitor = match self.visitors.entry(ip) {
            Entry::Occupied(entry) => {
                let mut visitor = entry.into_ref();
                visitor.last_request = now;
                if auth {
                    visitor.record_auth(ip);
                }
                visitor
            }
            Entry::Vacant(entry) => entry.insert(Visitor::fresh(auth, now)),
        };

        debug!("{ip} visited with behavior score of {}", visitor.behavior_score);

        if visitor.behavior_score >= BAN_SCORE {
            Admission::Banned
        } else if visitor.limiter.check().is_err() {
            Admission::Throttled
        } else {
            Admission::Allowed
        }
    }

    /// Forgives a little bad behaviour and forgets visitors gone quiet.
    pub fn sweep(&self, now: Instant) {
        self.visitors.retain(|_, visitor| {
            visitor.behavior_score = visitor.behavior_score.saturating_sub(SCORE_DECAY);
            now.saturating_duration_since(visitor.last_request) < IDLE_EVICTION
        });
    }

    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }

    fn behavior_score(&self, ip: IpAddr) -> Option<u32> {
        self.visitors.get(&ip).map(|visitor| visitor.behavior_score)
    }

    /// Sweeps once a minute until `shutdown` fires.
    pub fn spawn_janitor(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        self.sweep(Instant::now());
                        debug!("Visitor sweep done, {} tracked", self.len());
                    }
                    _ = shutdown.cancelled() => break,
                }
            }
        })
    }
}
