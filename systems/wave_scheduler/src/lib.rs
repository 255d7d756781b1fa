#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave scheduler responsible for emitting enemy spawn commands.
//!
//! The scheduler owns a single countdown timer. Elapsed time reported through
//! [`Event::TimeAdvanced`] is subtracted from the countdown and every expiry
//! performs one state transition: spawn the next enemy of the current wave,
//! or leave the pause between waves. Overshoot carries into the next
//! countdown, so large time steps fire every expiry they cover in order.

use std::{collections::VecDeque, time::Duration};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use waypoint_defence_core::{
    Command, EnemyKind, Event, Wave, WaveTiming, MIN_INTER_WAVE_DELAY, MIN_INTRA_WAVE_DELAY,
};

/// Stream of the shared seed reserved for spawn interval jitter.
const SCHEDULER_RNG_STREAM: u64 = 2;

/// Logical state of the scheduler between two timer expiries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Enemies of the current wave remain to be spawned.
    AwaitingIntraSpawn,
    /// The current wave is exhausted and the pause before the next wave runs.
    AwaitingInterWave,
    /// Every wave has been spawned; no timer is armed.
    LevelFinished,
}

/// Pure system that turns elapsed time into spawn commands for a level.
#[derive(Debug)]
pub struct WaveScheduler<R = ChaCha8Rng> {
    timing: WaveTiming,
    waves: Vec<Wave>,
    wave_index: usize,
    pending: VecDeque<EnemyKind>,
    inter_wave_wait: bool,
    finished: bool,
    remaining: Option<Duration>,
    rng: R,
}

impl WaveScheduler {
    /// Creates an idle scheduler whose jitter is drawn from a stream of `seed`.
    #[must_use]
    pub fn new(timing: WaveTiming, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(SCHEDULER_RNG_STREAM);
        Self::with_rng(timing, rng)
    }
}

impl<R: Rng> WaveScheduler<R> {
    /// Creates an idle scheduler drawing jitter from the provided source.
    ///
    /// The scheduler reports [`SchedulerState::LevelFinished`] until
    /// [`WaveScheduler::start_level`] loads a wave list.
    #[must_use]
    pub fn with_rng(timing: WaveTiming, rng: R) -> Self {
        Self {
            timing,
            waves: Vec::new(),
            wave_index: 0,
            pending: VecDeque::new(),
            inter_wave_wait: false,
            finished: true,
            remaining: None,
            rng,
        }
    }

    /// Loads `waves`, rewinds to the first wave and arms the intra-wave timer.
    ///
    /// Any previously armed timer is discarded. An empty wave list finishes
    /// immediately.
    pub fn start_level(&mut self, waves: &[Wave]) {
        self.waves = waves.to_vec();
        self.wave_index = 0;
        self.pending.clear();
        self.inter_wave_wait = false;
        self.finished = false;
        self.remaining = None;

        if self.load_wave() {
            self.arm_intra();
        } else {
            self.finish();
        }
    }

    /// Performs the transition due when the armed timer expires.
    ///
    /// Spawns at most one enemy through `spawn`. Calling this while the level
    /// is finished, or in any state without pending work, changes nothing.
    pub fn on_timer_fire<F>(&mut self, mut spawn: F)
    where
        F: FnMut(EnemyKind),
    {
        if let Some(kind) = self.pending.pop_front() {
            debug!(wave = self.wave_index, ?kind, "wave spawn");
            spawn(kind);
            if self.pending.is_empty() {
                self.inter_wave_wait = true;
                self.arm_inter();
            } else {
                self.arm_intra();
            }
        } else if self.inter_wave_wait {
            self.inter_wave_wait = false;
            self.wave_index += 1;
            if self.load_wave() {
                info!(wave = self.wave_index, "next wave starting");
                self.arm_intra();
            } else {
                self.finish();
            }
        }
    }

    /// Counts `dt` down from the armed timer, firing every expiry it covers.
    pub fn advance<F>(&mut self, dt: Duration, mut spawn: F)
    where
        F: FnMut(EnemyKind),
    {
        let mut budget = dt;
        while let Some(remaining) = self.remaining {
            if budget < remaining {
                self.remaining = Some(remaining - budget);
                return;
            }

            budget -= remaining;
            self.remaining = None;
            self.on_timer_fire(&mut spawn);
        }
    }

    /// Consumes time events and emits spawn commands for every expiry.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.advance(accumulated, |kind| out.push(Command::SpawnEnemy { kind }));
    }

    /// Current logical state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.finished {
            SchedulerState::LevelFinished
        } else if self.inter_wave_wait {
            SchedulerState::AwaitingInterWave
        } else {
            SchedulerState::AwaitingIntraSpawn
        }
    }

    /// Reports whether every enemy of every wave has been spawned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Index of the wave being spawned or waited on.
    #[must_use]
    pub fn wave_index(&self) -> usize {
        self.wave_index
    }

    /// Number of enemies of the current wave that are still queued.
    #[must_use]
    pub fn pending_in_wave(&self) -> usize {
        self.pending.len()
    }

    /// Time left on the armed timer, or `None` when no timer is armed.
    #[must_use]
    pub fn time_until_fire(&self) -> Option<Duration> {
        self.remaining
    }

    /// Fills the spawn queue from the current wave, skipping empty waves.
    fn load_wave(&mut self) -> bool {
        while let Some(wave) = self.waves.get(self.wave_index) {
            if wave.count > 0 {
                self.pending
                    .extend(std::iter::repeat(wave.kind).take(wave.count as usize));
                return true;
            }
            self.wave_index += 1;
        }
        false
    }

    fn finish(&mut self) {
        self.finished = true;
        self.remaining = None;
        info!(waves = self.waves.len(), "all waves spawned");
    }

    fn arm_intra(&mut self) {
        let delay = self.jittered(
            self.timing.intra_base_ms,
            self.timing.intra_jitter_ms,
            MIN_INTRA_WAVE_DELAY,
        );
        self.remaining = Some(delay);
    }

    fn arm_inter(&mut self) {
        let delay = self.jittered(
            self.timing.inter_base_ms,
            self.timing.inter_jitter_ms,
            MIN_INTER_WAVE_DELAY,
        );
        self.remaining = Some(delay);
    }

    fn jittered(&mut self, base_ms: u64, jitter_ms: u64, floor: Duration) -> Duration {
        let base = i128::from(base_ms);
        let jitter = i128::from(jitter_ms);
        let offset = if jitter == 0 {
            0
        } else {
            self.rng.gen_range(0..=2 * jitter) - jitter
        };
        let millis = u64::try_from((base + offset).max(0)).unwrap_or(u64::MAX);
        Duration::from_millis(millis).max(floor)
    }
}
