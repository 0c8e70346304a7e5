//! Spin session controller
//!
//! One `SlotSession` owns everything a player session mutates: gameplay PRNG,
//! reels, credits, counters and the persistence handle. Nothing is global.
//!
//! A spin moves `Idle -> Spinning -> Settled -> Idle`:
//!
//! 1. [`SlotSession::begin_spin`] debits the bet, installs freshly drawn
//!    strips and returns a [`SpinTicket`] with each reel's target.
//! 2. The presentation layer animates and calls [`SlotSession::settle_reel`]
//!    once per reel with the pixel offset it came to rest at.
//! 3. The call that settles the last reel evaluates the grid, credits the
//!    win and returns the [`SpinResult`].
//!
//! [`SlotSession::request_spin`] runs all three steps at once for headless
//! callers. Only one spin can be in flight; there is no cancel and no
//! settle timeout.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use lr_state::{AccountStore, MemoryStore, SEED_KEY};

use crate::config::{ConfigError, MachineConfig};
use crate::error::{SlotError, SlotResult};
use crate::paytable::{LineHit, PayTable};
use crate::reel::{Grid, Reel, advance_top_index, fill_strip, offset_for_index, visible_grid};
use crate::rng::{CosmeticRng, SeededRng};
use crate::symbols::{SymbolId, WeightedSampler};
use crate::timing::{ReelTiming, autoplay_delay, plan_reel_timings};

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub spins: u64,
    pub wins: u64,
    pub total_wagered: u64,
    pub total_paid: u64,
    pub biggest_win: u64,
}

impl SessionStats {
    /// Paid / wagered; `None` before the first bet
    pub fn return_to_player(&self) -> Option<f64> {
        if self.total_wagered > 0 {
            Some(self.total_paid as f64 / self.total_wagered as f64)
        } else {
            None
        }
    }

    /// Share of settled spins that paid anything
    pub fn hit_rate(&self) -> Option<f64> {
        if self.spins > 0 {
            Some(self.wins as f64 / self.spins as f64)
        } else {
            None
        }
    }

    fn record_wager(&mut self, bet: u64) {
        self.total_wagered = self.total_wagered.saturating_add(bet);
    }

    fn record_settle(&mut self, win: u64) {
        self.spins += 1;
        if win > 0 {
            self.wins += 1;
        }
        self.total_paid = self.total_paid.saturating_add(win);
        self.biggest_win = self.biggest_win.max(win);
    }
}

/// Read-only values for the status bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    pub credits: u64,
    pub last_win: u64,
    /// Display only; odds come from weights and the pay table
    pub return_to_player: Option<f64>,
    pub seed: String,
}

impl DisplayState {
    /// "96.3%" or "–" before anything was wagered
    pub fn rtp_label(&self) -> String {
        match self.return_to_player {
            Some(ratio) => format!("{:.1}%", ratio * 100.0),
            None => "–".to_string(),
        }
    }
}

/// Gameplay draws for one spin: strips first (reel order), then one stop
/// advance per reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinPlan {
    pub strips: Vec<Vec<SymbolId>>,
    pub advances: Vec<usize>,
}

/// Where one reel must come to rest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReelStop {
    pub reel: usize,
    pub target_top_index: usize,
    /// `target_top_index * symbol_height_px`
    pub target_offset_px: f64,
    pub timing: ReelTiming,
}

/// Handed to the presentation layer when a spin is accepted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinTicket {
    pub spin_id: String,
    pub bet: u64,
    pub credits_after_debit: u64,
    pub stops: Vec<ReelStop>,
}

impl SpinTicket {
    /// Stops sorted by the moment their reel settles
    pub fn stops_by_settle_time(&self) -> Vec<ReelStop> {
        let mut stops = self.stops.clone();
        stops.sort_by(|a, b| a.timing.settle_at_ms().total_cmp(&b.timing.settle_at_ms()));
        stops
    }
}

/// Outcome of a settled spin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinResult {
    pub spin_id: String,
    pub bet: u64,
    pub grid: Grid,
    pub total_win: u64,
    pub hits: Vec<LineHit>,
    pub credits_after: u64,
}

impl SpinResult {
    pub fn is_win(&self) -> bool {
        self.total_win > 0
    }
}

#[derive(Debug, Clone)]
struct InFlight {
    spin_id: String,
    bet: u64,
    settled: Vec<bool>,
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    Spinning(InFlight),
}

/// Normalize free-form bet input: non-numeric, non-finite or below one
/// becomes 1, fractions are floored.
///
/// Bad bet input is coerced on purpose, never rejected.
pub fn parse_bet(input: &str) -> u64 {
    let value = input.trim().parse::<f64>().unwrap_or(0.0);
    let bet = if value.is_finite() && value >= 1.0 {
        value.floor() as u64
    } else {
        1
    };
    if bet.to_string() != input.trim() {
        log::debug!("Bet input {:?} coerced to {}", input, bet);
    }
    bet
}

/// A player session
#[derive(Debug)]
pub struct SlotSession {
    config: MachineConfig,
    paytable: PayTable,
    sampler: WeightedSampler,
    rng: SeededRng,
    cosmetic: CosmeticRng,
    reels: Vec<Reel>,
    account: AccountStore,
    credits: u64,
    seed: String,
    last_win: u64,
    stats: SessionStats,
    autoplay: bool,
    phase: Phase,
    pending_plan: Option<SpinPlan>,
    spin_count: u64,
}

impl SlotSession {
    /// Reference machine with an in-memory account
    pub fn new() -> Self {
        Self::reference(AccountStore::in_memory())
    }

    /// Reference machine with an in-memory account seeded with `seed`
    pub fn with_seed(seed: &str) -> Self {
        Self::reference(AccountStore::new(MemoryStore::with_values([(SEED_KEY, seed)])))
    }

    fn reference(account: AccountStore) -> Self {
        Self::open(MachineConfig::reference(), account)
            .unwrap_or_else(|e| unreachable!("reference config is valid: {e}"))
    }

    /// Open a session, restoring credits and seed from `account`
    pub fn open(config: MachineConfig, mut account: AccountStore) -> Result<Self, ConfigError> {
        config.validate()?;
        let sampler = WeightedSampler::new(&config.symbols)
            .ok_or_else(|| ConfigError::Validation("symbol catalog has no weight".into()))?;

        let mut cosmetic = CosmeticRng::new();
        let restored = account.load(config.default_credits, || cosmetic.seed_string());

        log::info!(
            "Session opened: {} credits, seed {:?}",
            restored.credits,
            restored.seed
        );

        let mut session = Self {
            paytable: PayTable::new(config.symbols.clone(), config.paylines.clone()),
            sampler,
            rng: SeededRng::from_seed(&restored.seed),
            cosmetic,
            reels: Vec::new(),
            account,
            credits: restored.credits,
            seed: restored.seed,
            last_win: 0,
            stats: SessionStats::default(),
            autoplay: false,
            phase: Phase::Idle,
            pending_plan: None,
            spin_count: 0,
            config,
        };
        session.populate_reels();
        Ok(session)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn paytable(&self) -> &PayTable {
        &self.paytable
    }

    pub fn reels(&self) -> &[Reel] {
        &self.reels
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn credits(&self) -> u64 {
        self.credits
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn is_spinning(&self) -> bool {
        matches!(self.phase, Phase::Spinning(_))
    }

    /// True once the persistence substrate has failed this session
    pub fn persistence_degraded(&self) -> bool {
        self.account.is_degraded()
    }

    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            credits: self.credits,
            last_win: self.last_win,
            return_to_player: self.stats.return_to_player(),
            seed: self.seed.clone(),
        }
    }

    /// Snapshot of what is showing right now
    pub fn visible_grid(&self) -> Grid {
        visible_grid(&self.reels, self.config.rows)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SPIN
    // ═══════════════════════════════════════════════════════════════════════

    /// Accept a spin and hand out reel targets.
    ///
    /// A bet of 0 is treated as 1. Rejections leave the session untouched.
    pub fn begin_spin(&mut self, bet: u64) -> SlotResult<SpinTicket> {
        if self.is_spinning() {
            log::info!("Spin request ignored: spin already in progress");
            return Err(SlotError::SpinInProgress);
        }

        let bet = bet.max(1);
        if self.credits < bet {
            log::info!("Spin rejected: bet {} exceeds {} credits", bet, self.credits);
            return Err(SlotError::InsufficientFunds {
                bet,
                credits: self.credits,
            });
        }

        self.credits -= bet;
        self.stats.record_wager(bet);
        self.account.save_credits(self.credits);

        let plan = match self.pending_plan.take() {
            Some(plan) => plan,
            None => self.draw_plan(),
        };

        let strip_len = self.config.strip_len;
        let mut targets = Vec::with_capacity(self.reels.len());
        for ((reel, strip), advance) in self.reels.iter_mut().zip(plan.strips).zip(plan.advances) {
            reel.replace_strip(strip);
            targets.push((reel.top_index() + advance % strip_len) % strip_len);
        }

        let timings = plan_reel_timings(&self.config.timing, self.reels.len(), &mut self.cosmetic);
        let stops = targets
            .iter()
            .zip(timings)
            .enumerate()
            .map(|(reel, (&target, timing))| ReelStop {
                reel,
                target_top_index: target,
                target_offset_px: offset_for_index(target, self.config.symbol_height_px),
                timing,
            })
            .collect();

        self.spin_count += 1;
        let spin_id = format!("spin-{:06}", self.spin_count);

        log::debug!("{} accepted: bet {}, targets {:?}", spin_id, bet, targets);

        self.phase = Phase::Spinning(InFlight {
            spin_id: spin_id.clone(),
            bet,
            settled: vec![false; self.reels.len()],
        });

        Ok(SpinTicket {
            spin_id,
            bet,
            credits_after_debit: self.credits,
            stops,
        })
    }

    /// Report that `reel` came to rest at `offset_px`.
    ///
    /// Returns the spin result once every reel has settled.
    pub fn settle_reel(&mut self, reel: usize, offset_px: f64) -> SlotResult<Option<SpinResult>> {
        if !self.is_spinning() {
            return Err(SlotError::NotSpinning);
        }
        let top = advance_top_index(offset_px, self.config.symbol_height_px, self.config.strip_len)?;
        Ok(self.mark_settled(reel, top)?.map(|flight| self.finish_spin(flight)))
    }

    /// Spin and settle every reel on its target in one call
    pub fn request_spin(&mut self, bet: u64) -> SlotResult<SpinResult> {
        let ticket = self.begin_spin(bet)?;
        let mut finished = None;
        for stop in &ticket.stops {
            finished = self.mark_settled(stop.reel, stop.target_top_index)?;
        }
        match finished {
            Some(flight) => Ok(self.finish_spin(flight)),
            None => Err(SlotError::SpinIncomplete(ticket.spin_id)),
        }
    }

    /// Record one settled reel. The last one closes the barrier and hands
    /// back the spin it belonged to.
    fn mark_settled(&mut self, reel: usize, top: usize) -> SlotResult<Option<InFlight>> {
        let reels = self.reels.len();
        let Phase::Spinning(flight) = &mut self.phase else {
            return Err(SlotError::NotSpinning);
        };
        let Some(done) = flight.settled.get_mut(reel) else {
            return Err(SlotError::UnknownReel { reel, reels });
        };
        if *done {
            return Err(SlotError::ReelAlreadySettled(reel));
        }
        *done = true;
        let all_settled = flight.settled.iter().all(|&s| s);

        self.reels[reel].set_top_index(top);
        log::debug!("Reel {} settled at index {}", reel, top);

        if !all_settled {
            return Ok(None);
        }
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Spinning(flight) => Ok(Some(flight)),
            Phase::Idle => Err(SlotError::NotSpinning),
        }
    }

    /// Settled -> Idle: evaluate, credit, persist
    fn finish_spin(&mut self, flight: InFlight) -> SpinResult {
        let InFlight { spin_id, bet, .. } = flight;

        let grid = self.visible_grid();
        let eval = self.paytable.evaluate(&grid, bet);

        self.credits = self.credits.saturating_add(eval.total_win);
        self.last_win = eval.total_win;
        self.stats.record_settle(eval.total_win);
        self.account.save_credits(self.credits);

        if eval.is_win() {
            for hit in &eval.hits {
                log::info!(
                    "{} line {}: {} x{} (x{}) pays {}",
                    spin_id,
                    hit.line_index + 1,
                    self.paytable.catalog.key_of(hit.symbol),
                    hit.run_length,
                    hit.multiplier,
                    hit.win
                );
            }
        } else {
            log::info!("{} settled: no win", spin_id);
        }

        if self.config.lookahead {
            self.pending_plan = Some(self.draw_plan());
        }

        SpinResult {
            spin_id,
            bet,
            grid,
            total_win: eval.total_win,
            hits: eval.hits,
            credits_after: self.credits,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SEED
    // ═══════════════════════════════════════════════════════════════════════

    /// Replace the gameplay PRNG. `None` or a blank seed picks a random one.
    ///
    /// Only allowed while idle. Visible strips stay as they are; pre-drawn
    /// content is discarded and redrawn from the new seed.
    pub fn request_reseed(&mut self, seed: Option<&str>) -> SlotResult<String> {
        if self.is_spinning() {
            return Err(SlotError::SpinInProgress);
        }

        let seed = match seed.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => self.cosmetic.seed_string(),
        };
        self.install_seed(seed.clone());
        log::info!("Reseeded: {:?}", seed);
        Ok(seed)
    }

    fn install_seed(&mut self, seed: String) {
        self.rng = SeededRng::from_seed(&seed);
        self.account.save_seed(&seed);
        self.seed = seed;

        self.pending_plan = None;
        if self.config.lookahead {
            self.pending_plan = Some(self.draw_plan());
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // AUTOPLAY
    // ═══════════════════════════════════════════════════════════════════════

    pub fn autoplay(&self) -> bool {
        self.autoplay
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        self.autoplay = enabled;
    }

    /// Pause before the next automatic spin, if autoplay should issue one
    pub fn autoplay_delay(&mut self) -> Option<Duration> {
        if self.autoplay && !self.is_spinning() {
            Some(autoplay_delay(&self.config.timing, &mut self.cosmetic))
        } else {
            None
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // DRAWS
    // ═══════════════════════════════════════════════════════════════════════

    /// Initial strips, then optional look-ahead
    fn populate_reels(&mut self) {
        let len = self.config.strip_len;
        self.reels = (0..self.config.reels)
            .map(|_| Reel::new(fill_strip(&self.sampler, &mut self.rng, len)))
            .collect();

        if self.config.lookahead {
            self.pending_plan = Some(self.draw_plan());
        }
    }

    fn draw_plan(&mut self) -> SpinPlan {
        let len = self.config.strip_len;
        let strips = (0..self.config.reels)
            .map(|_| fill_strip(&self.sampler, &mut self.rng, len))
            .collect();
        let advances = (0..self.config.reels)
            .map(|_| self.config.min_spin_steps + (self.rng.next_f64() * len as f64) as usize)
            .collect();
        SpinPlan { strips, advances }
    }
}

impl Default for SlotSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lr_state::{CREDITS_KEY, KeyValueStore};
    use std::sync::Arc;

    fn session_with(credits: u64, seed: &str, lookahead: bool) -> SlotSession {
        let store = MemoryStore::with_values([
            (CREDITS_KEY, credits.to_string()),
            (SEED_KEY, seed.to_string()),
        ]);
        let config = MachineConfig {
            lookahead,
            ..MachineConfig::reference()
        };
        SlotSession::open(config, AccountStore::new(store)).unwrap()
    }

    #[test]
    fn test_session_creation() {
        let session = session_with(1000, "12345", true);
        assert_eq!(session.credits(), 1000);
        assert_eq!(session.seed(), "12345");
        assert!(!session.is_spinning());
        assert_eq!(session.reels().len(), 5);
        assert!(session.reels().iter().all(|r| r.len() == 40));
    }

    #[test]
    fn test_initial_strips_come_from_seed() {
        let session = session_with(1000, "12345", false);
        let sampler = WeightedSampler::new(&session.config().symbols).unwrap();
        let expected = fill_strip(&sampler, &mut SeededRng::from_seed("12345"), 40);
        assert_eq!(session.reels()[0].strip(), expected.as_slice());
    }

    #[test]
    fn test_request_spin_accounting() {
        let mut session = session_with(100, "acc", true);
        let result = session.request_spin(10).unwrap();

        assert_eq!(result.bet, 10);
        assert_eq!(result.credits_after, 100 - 10 + result.total_win);
        assert_eq!(session.credits(), result.credits_after);
        assert_eq!(session.stats().total_wagered, 10);
        assert_eq!(session.stats().total_paid, result.total_win);
        assert_eq!(session.stats().spins, 1);
        assert!(!session.is_spinning());
        assert_eq!(result.grid, session.visible_grid());
        assert_eq!(result.spin_id, "spin-000001");
    }

    #[test]
    fn test_result_matches_evaluation_of_grid() {
        let mut session = session_with(10_000, "eval", true);
        for _ in 0..50 {
            let result = session.request_spin(3).unwrap();
            let eval = session.paytable().evaluate(&result.grid, 3);
            assert_eq!(eval.total_win, result.total_win);
            assert_eq!(eval.hits, result.hits);
        }
    }

    #[test]
    fn test_zero_bet_is_coerced_to_one() {
        let mut session = session_with(5, "zero", true);
        let result = session.request_spin(0).unwrap();
        assert_eq!(result.bet, 1);
        assert_eq!(session.stats().total_wagered, 1);
    }

    #[test]
    fn test_insufficient_funds_leaves_state_untouched() {
        let mut session = session_with(5, "poor", true);
        let before = session.display_state();
        let grid = session.visible_grid();

        let err = session.request_spin(10).unwrap_err();
        assert_eq!(err, SlotError::InsufficientFunds { bet: 10, credits: 5 });
        assert!(err.is_rejection());
        assert!(!session.is_spinning());
        assert_eq!(session.display_state(), before);
        assert_eq!(session.visible_grid(), grid);
        assert_eq!(session.stats().total_wagered, 0);
    }

    #[test]
    fn test_second_spin_while_spinning_is_rejected() {
        let mut session = session_with(100, "busy", true);
        session.begin_spin(10).unwrap();
        let credits = session.credits();

        assert_eq!(session.begin_spin(10), Err(SlotError::SpinInProgress));
        assert_eq!(session.request_spin(10), Err(SlotError::SpinInProgress));
        assert_eq!(session.credits(), credits);
    }

    #[test]
    fn test_two_phase_barrier() {
        let mut session = session_with(100, "barrier", true);
        let ticket = session.begin_spin(5).unwrap();
        assert_eq!(ticket.credits_after_debit, 95);
        assert_eq!(ticket.stops.len(), 5);

        let stops = ticket.stops_by_settle_time();
        let (last, rest) = stops.split_last().unwrap();
        for stop in rest {
            assert_eq!(session.settle_reel(stop.reel, stop.target_offset_px).unwrap(), None);
            assert!(session.is_spinning());
        }

        let result = session.settle_reel(last.reel, last.target_offset_px).unwrap().unwrap();
        assert!(!session.is_spinning());
        for stop in &ticket.stops {
            assert_eq!(session.reels()[stop.reel].top_index(), stop.target_top_index);
        }
        assert_eq!(result.credits_after, 95 + result.total_win);
    }

    #[test]
    fn test_settle_errors() {
        let mut session = session_with(100, "errs", true);
        assert_eq!(session.settle_reel(0, 0.0), Err(SlotError::NotSpinning));

        session.begin_spin(1).unwrap();
        assert_eq!(
            session.settle_reel(9, 0.0),
            Err(SlotError::UnknownReel { reel: 9, reels: 5 })
        );
        assert!(matches!(session.settle_reel(0, f64::NAN), Err(SlotError::InvalidOffset(_))));

        session.settle_reel(0, 60.0).unwrap();
        assert_eq!(session.settle_reel(0, 60.0), Err(SlotError::ReelAlreadySettled(0)));
        assert_eq!(session.reels()[0].top_index(), 1);
    }

    #[test]
    fn test_idle_settle_is_not_spinning_even_with_bad_offset() {
        let mut session = session_with(100, "idle", true);
        assert_eq!(session.settle_reel(0, f64::NAN), Err(SlotError::NotSpinning));
        assert_eq!(session.settle_reel(0, f64::INFINITY), Err(SlotError::NotSpinning));
    }

    #[test]
    fn test_settle_after_finish_does_not_pay_again() {
        let mut session = session_with(100, "once", true);
        let ticket = session.begin_spin(5).unwrap();

        let mut results = Vec::new();
        for stop in &ticket.stops {
            if let Some(result) = session.settle_reel(stop.reel, stop.target_offset_px).unwrap() {
                results.push(result);
            }
        }
        assert_eq!(results.len(), 1);
        let credits = session.credits();
        let stats = session.stats().clone();

        assert_eq!(session.settle_reel(0, 0.0), Err(SlotError::NotSpinning));
        assert_eq!(session.credits(), credits);
        assert_eq!(session.stats(), &stats);
    }

    #[test]
    fn test_spin_steps_wrap_without_changing_stops() {
        let config = |min_spin_steps| MachineConfig {
            min_spin_steps,
            ..MachineConfig::reference()
        };
        let account = || {
            AccountStore::new(MemoryStore::with_values([(CREDITS_KEY, "1000"), (SEED_KEY, "wrap")]))
        };
        // 100_000 is a whole number of 40-symbol turns.
        let mut short = SlotSession::open(config(0), account()).unwrap();
        let mut long = SlotSession::open(config(100_000), account()).unwrap();

        for _ in 0..20 {
            assert_eq!(short.request_spin(1).unwrap(), long.request_spin(1).unwrap());
        }
    }

    #[test]
    fn test_settle_uses_reported_offset() {
        let mut session = session_with(100, "offset", true);
        session.begin_spin(1).unwrap();
        // Off by 20px from a symbol boundary snaps back onto it.
        session.settle_reel(2, 7.0 * 60.0 + 20.0).unwrap();
        assert_eq!(session.reels()[2].top_index(), 7);
    }

    #[test]
    fn test_lookahead_does_not_change_outcomes() {
        let mut eager = session_with(10_000, "same-seed", true);
        let mut lazy = session_with(10_000, "same-seed", false);

        for _ in 0..25 {
            let a = eager.request_spin(2).unwrap();
            let b = lazy.request_spin(2).unwrap();
            assert_eq!(a.grid, b.grid);
            assert_eq!(a.total_win, b.total_win);
        }
        assert_eq!(eager.credits(), lazy.credits());
    }

    #[test]
    fn test_reseed_changes_future_outcomes_deterministically() {
        let mut a = session_with(10_000, "first", true);
        let mut b = session_with(10_000, "other", false);
        a.request_spin(1).unwrap();

        a.request_reseed(Some("second")).unwrap();
        b.request_reseed(Some("second")).unwrap();

        // Rest positions differ, strip content must not.
        for _ in 0..10 {
            a.request_spin(1).unwrap();
            b.request_spin(1).unwrap();
            for (ra, rb) in a.reels().iter().zip(b.reels()) {
                assert_eq!(ra.strip(), rb.strip());
            }
        }
    }

    #[test]
    fn test_with_seed_matches_stored_seed() {
        let mut a = SlotSession::with_seed("12345");
        let mut b = session_with(1000, "12345", true);
        assert_eq!(a.visible_grid(), b.visible_grid());
        assert_eq!(a.request_spin(1).unwrap(), b.request_spin(1).unwrap());
    }

    #[test]
    fn test_reseed_keeps_visible_grid() {
        let mut session = session_with(100, "keep", true);
        let grid = session.visible_grid();
        session.request_reseed(Some("changed")).unwrap();
        assert_eq!(session.visible_grid(), grid);
        assert_eq!(session.seed(), "changed");
    }

    #[test]
    fn test_reseed_blocked_while_spinning() {
        let mut session = session_with(100, "spin", true);
        session.begin_spin(1).unwrap();
        assert_eq!(session.request_reseed(Some("x")), Err(SlotError::SpinInProgress));
        assert_eq!(session.seed(), "spin");
    }

    #[test]
    fn test_random_reseed() {
        let mut session = session_with(100, "fixed", true);
        let seed = session.request_reseed(None).unwrap();
        assert!(seed.parse::<u32>().is_ok());
        assert_eq!(session.seed(), seed);

        let blank = session.request_reseed(Some("  ")).unwrap();
        assert!(blank.parse::<u32>().is_ok());
    }

    #[test]
    fn test_persistence_writes() {
        let store = Arc::new(MemoryStore::with_values([(CREDITS_KEY, "50"), (SEED_KEY, "p")]));
        let mut session =
            SlotSession::open(MachineConfig::reference(), AccountStore::new(store.clone())).unwrap();

        let result = session.request_spin(7).unwrap();
        assert_eq!(
            store.get(CREDITS_KEY).unwrap(),
            Some(result.credits_after.to_string())
        );

        session.request_reseed(Some("new-seed")).unwrap();
        assert_eq!(store.get(SEED_KEY).unwrap().as_deref(), Some("new-seed"));
    }

    #[test]
    fn test_display_state() {
        let mut session = session_with(100, "display", true);
        let idle = session.display_state();
        assert_eq!(idle.return_to_player, None);
        assert_eq!(idle.rtp_label(), "–");
        assert_eq!(idle, session.display_state());

        let result = session.request_spin(4).unwrap();
        let state = session.display_state();
        assert_eq!(state.last_win, result.total_win);
        assert_eq!(state.return_to_player, Some(result.total_win as f64 / 4.0));
    }

    #[test]
    fn test_rtp_label_format() {
        let state = DisplayState {
            credits: 0,
            last_win: 0,
            return_to_player: Some(0.9634),
            seed: String::new(),
        };
        assert_eq!(state.rtp_label(), "96.3%");
    }

    #[test]
    fn test_autoplay_delay_only_when_enabled_and_idle() {
        let mut session = session_with(100, "auto", true);
        assert_eq!(session.autoplay_delay(), None);

        session.set_autoplay(true);
        assert!(session.autoplay());
        let delay = session.autoplay_delay().unwrap();
        assert!(delay >= Duration::from_millis(160));

        session.begin_spin(1).unwrap();
        assert_eq!(session.autoplay_delay(), None);
    }

    #[test]
    fn test_targets_advance_from_rest_position() {
        let mut session = session_with(100, "advance", false);
        let before: Vec<usize> = session.reels().iter().map(|r| r.top_index()).collect();

        let mut rng = SeededRng::from_seed("advance");
        let sampler = WeightedSampler::new(&session.config().symbols).unwrap();
        // initial strips + this spin's strips
        for _ in 0..10 {
            fill_strip(&sampler, &mut rng, 40);
        }
        let expected: Vec<usize> = before
            .iter()
            .map(|top| (top + 40 + (rng.next_f64() * 40.0) as usize) % 40)
            .collect();

        let ticket = session.begin_spin(1).unwrap();
        let targets: Vec<usize> = ticket.stops.iter().map(|s| s.target_top_index).collect();
        assert_eq!(targets, expected);
    }

    #[test]
    fn test_parse_bet() {
        assert_eq!(parse_bet("10"), 10);
        assert_eq!(parse_bet(" 2.7 "), 2);
        assert_eq!(parse_bet("0"), 1);
        assert_eq!(parse_bet("-5"), 1);
        assert_eq!(parse_bet("abc"), 1);
        assert_eq!(parse_bet(""), 1);
        assert_eq!(parse_bet("NaN"), 1);
        assert_eq!(parse_bet("inf"), 1);
    }

    #[test]
    fn test_hit_rate() {
        let mut stats = SessionStats::default();
        assert_eq!(stats.hit_rate(), None);
        stats.record_wager(2);
        stats.record_settle(0);
        stats.record_wager(2);
        stats.record_settle(6);
        assert_eq!(stats.hit_rate(), Some(0.5));
        assert_eq!(stats.biggest_win, 6);
        assert_eq!(stats.return_to_player(), Some(1.5));
    }
}
