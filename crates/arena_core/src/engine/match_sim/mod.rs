//! Match engine: the per-match state machine.
//!
//! `Preparing → FirstHalf → Halftime → SecondHalf → Completed`, with a
//! `paused` flag that freezes the clock in any running state. One call to
//! [`MatchEngine::tick`] advances the match by one simulated step and
//! returns the events it emitted.
//!
//! Every event goes through the same pipeline before it is appended:
//! resolve → attribute → apply to ledger → commentary → pacing. An event the
//! pipeline cannot attribute or apply degrades to `GeneralPlay`.

pub mod resolution;
pub mod selection;

use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use self::resolution::{kickoff_draft, Play, Resolver, GOAL_LINE};
use super::attribution;
use super::commentary::{CommentaryContext, CommentarySelector};
use super::config::EngineConfig;
use super::draft::EventDraft;
use super::pacing;
use super::performance::{apply_tick_race_effects, drain_team_stamina, race_profile, RaceEffectOutcome};
use crate::error::{ControlConflict, MatchError};
use crate::models::{
    mvp_candidates, winner_of, EventCategory, MatchEvent, MatchResult, MatchSnapshot, MvpCandidate,
    Player, Race, StatLedger, Team, TeamSide, TeamView,
};

pub use crate::models::{MatchKind, MatchStatus};

/// Team that receives the opening kickoff; the other side receives after
/// halftime.
const FIRST_RECEIVER: TeamSide = TeamSide::Home;

pub struct MatchEngine {
    id: String,
    kind: MatchKind,
    config: EngineConfig,
    seed: u64,
    rng: ChaCha8Rng,
    commentary: CommentarySelector,

    home: Team,
    away: Team,

    status: MatchStatus,
    paused: bool,
    tick: u64,
    clock_secs: u32,
    halftime_ticks_left: u32,
    possession: TeamSide,
    ball_line: i32,

    ledger: StatLedger,
    events: Vec<MatchEvent>,
    mvp: Vec<MvpCandidate>,
    terminated_early: bool,

    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl MatchEngine {
    /// Validates both rosters and prepares a match. A missing seed draws a
    /// random one; the seed actually used is available through [`seed`].
    ///
    /// [`seed`]: MatchEngine::seed
    pub fn new(
        id: impl Into<String>,
        home: Team,
        away: Team,
        kind: MatchKind,
        config: EngineConfig,
        seed: Option<u64>,
    ) -> Result<Self, MatchError> {
        home.validate()?;
        away.validate()?;
        if let Some(dup) = home.players.iter().find(|p| away.player(&p.id).is_some()) {
            return Err(MatchError::DuplicatePlayer(dup.id.clone()));
        }

        let seed = seed.unwrap_or_else(rand::random);
        let now = Utc::now();
        let ledger = StatLedger::new(&home, &away);

        Ok(Self {
            id: id.into(),
            kind,
            commentary: CommentarySelector::new(config.commentary.clone()),
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            home,
            away,
            status: MatchStatus::Preparing,
            paused: false,
            tick: 0,
            clock_secs: 0,
            halftime_ticks_left: 0,
            possession: FIRST_RECEIVER,
            ball_line: 0,
            ledger,
            events: Vec::new(),
            mvp: Vec::new(),
            terminated_early: false,
            created_at: now,
            updated_at: now,
            completed_at: None,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn clock(&self) -> u32 {
        self.clock_secs
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn possession(&self) -> TeamSide {
        self.possession
    }

    pub fn ball_line(&self) -> i32 {
        self.ball_line
    }

    pub fn ledger(&self) -> &StatLedger {
        &self.ledger
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn team(&self, side: TeamSide) -> &Team {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn max_duration(&self) -> u32 {
        self.config.simulation.max_duration(self.kind)
    }

    /// Match progress 0.0 ..= 1.0 by clock.
    pub fn progress(&self) -> f32 {
        let max = self.max_duration().max(1);
        (self.clock_secs as f32 / max as f32).clamp(0.0, 1.0)
    }

    pub fn last_sequence(&self) -> u64 {
        self.events.last().map(|e| e.sequence).unwrap_or(0)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Preparing → FirstHalf with the opening kickoff.
    pub fn start(&mut self) -> Result<Vec<MatchEvent>, ControlConflict> {
        match self.status {
            MatchStatus::Preparing => {}
            MatchStatus::Completed => return Err(ControlConflict::Finished),
            _ => return Err(ControlConflict::AlreadyStarted),
        }
        let mark = self.events.len();
        self.status = MatchStatus::FirstHalf;
        info!(match_id = %self.id, seed = self.seed, kind = ?self.kind, "match started");
        self.kickoff(FIRST_RECEIVER.opponent());
        self.touch();
        Ok(self.events[mark..].to_vec())
    }

    pub fn pause(&mut self) -> Result<(), ControlConflict> {
        match self.status {
            MatchStatus::Preparing => Err(ControlConflict::NotStarted),
            MatchStatus::Completed => Err(ControlConflict::Finished),
            _ if self.paused => Err(ControlConflict::AlreadyPaused),
            _ => {
                self.paused = true;
                info!(match_id = %self.id, clock = self.clock_secs, "match paused");
                self.touch();
                Ok(())
            }
        }
    }

    pub fn resume(&mut self) -> Result<(), ControlConflict> {
        match self.status {
            MatchStatus::Completed => Err(ControlConflict::Finished),
            _ if !self.paused => Err(ControlConflict::NotPaused),
            _ => {
                self.paused = false;
                info!(match_id = %self.id, clock = self.clock_secs, "match resumed");
                self.touch();
                Ok(())
            }
        }
    }

    /// Ends the match now. Emits `Fulltime`, freezes the ledger and marks the
    /// result as terminated early.
    pub fn terminate(&mut self) -> Result<Vec<MatchEvent>, ControlConflict> {
        if self.status == MatchStatus::Completed {
            return Err(ControlConflict::Finished);
        }
        let mark = self.events.len();
        self.paused = false;
        self.finish(true);
        Ok(self.events[mark..].to_vec())
    }

    /// Advances one tick and returns the events it emitted. No-op while
    /// paused, before kickoff and after the final whistle.
    pub fn tick(&mut self) -> Vec<MatchEvent> {
        if self.paused || !self.status.is_running() {
            return Vec::new();
        }
        let mark = self.events.len();
        self.tick += 1;

        if self.status == MatchStatus::Halftime {
            self.halftime_ticks_left = self.halftime_ticks_left.saturating_sub(1);
            if self.halftime_ticks_left == 0 {
                self.status = MatchStatus::SecondHalf;
                info!(match_id = %self.id, "second half");
                self.kickoff(FIRST_RECEIVER);
            }
        } else {
            self.live_tick();
        }

        self.touch();
        self.events[mark..].to_vec()
    }

    /// Starts (or resumes) the match and ticks it to the final whistle.
    pub fn run_to_completion(&mut self) -> MatchResult {
        if self.status == MatchStatus::Preparing {
            let _ = self.start();
        }
        self.paused = false;

        let sim = &self.config.simulation;
        let budget = (self.max_duration() / sim.tick_seconds.max(1)) as u64 + sim.halftime_break_ticks as u64 + 16;
        for _ in 0..budget {
            if self.status == MatchStatus::Completed {
                break;
            }
            self.tick();
        }
        if self.status != MatchStatus::Completed {
            warn!(match_id = %self.id, "tick budget exhausted, terminating");
            self.finish(true);
        }
        self.build_result()
    }

    // ========================================================================
    // Tick internals
    // ========================================================================

    fn live_tick(&mut self) {
        let sim = &self.config.simulation;
        let max = sim.max_duration(self.kind);
        let cap = if self.status == MatchStatus::FirstHalf { sim.half_duration(self.kind) } else { max };
        self.clock_secs = self.clock_secs.saturating_add(sim.tick_seconds.max(1)).min(cap);

        let progress = self.progress();
        for side in [TeamSide::Home, TeamSide::Away] {
            let team = match side {
                TeamSide::Home => &mut self.home,
                TeamSide::Away => &mut self.away,
            };
            let outcomes = apply_tick_race_effects(team, &self.config.stamina, &mut self.rng);
            drain_team_stamina(team, &self.config.stamina, &self.config.thresholds, progress);

            for outcome in outcomes {
                if let RaceEffectOutcome::Radiance { player_id, .. } = outcome {
                    let draft = EventDraft::new(EventCategory::SkillUse)
                        .team(side)
                        .primary(player_id)
                        .skill(race_profile(Race::Lumina).signature_skill);
                    self.emit(draft);
                }
            }
        }
        self.ledger.record_possession_tick(self.possession);

        if self.status == MatchStatus::FirstHalf && self.clock_secs >= self.config.simulation.half_duration(self.kind) {
            self.enter_halftime();
            return;
        }
        if self.clock_secs >= max {
            self.finish(false);
            return;
        }

        if self.rng.gen_bool(self.config.simulation.event_probability.clamp(0.0, 1.0)) {
            self.run_play();
        }
    }

    fn run_play(&mut self) {
        let call = selection::draw_play_call(&self.config.weights, self.ball_line, &mut self.rng);
        let (offense, defense) = match self.possession {
            TeamSide::Home => (&self.home, &self.away),
            TeamSide::Away => (&self.away, &self.home),
        };
        let resolver = Resolver {
            offense,
            defense,
            offense_side: self.possession,
            config: &self.config,
            progress: self.progress(),
            ball_line: self.ball_line,
        };
        let play: Play = resolver.resolve(call, &mut self.rng);
        debug!(
            match_id = %self.id,
            clock = self.clock_secs,
            call = ?call,
            chain = ?play.categories(),
            "play resolved"
        );

        for draft in play.drafts {
            if !self.emit(draft) {
                break;
            }
        }
        for change in play.stamina {
            if let Some(player) = self.team_mut(change.side).player_mut(&change.player_id) {
                player.adjust_stamina(change.delta);
            }
        }
    }

    fn enter_halftime(&mut self) {
        self.status = MatchStatus::Halftime;
        self.halftime_ticks_left = self.config.simulation.halftime_break_ticks;
        self.emit(EventDraft::new(EventCategory::Halftime));

        let recovery = self.config.stamina.halftime_recovery;
        for player in self.home.players.iter_mut().chain(self.away.players.iter_mut()) {
            if player.is_available() {
                player.adjust_stamina(recovery);
            }
        }
        let (home, away) = self.ledger.score();
        info!(match_id = %self.id, home, away, "halftime");
    }

    fn finish(&mut self, early: bool) {
        self.emit(EventDraft::new(EventCategory::Fulltime));
        self.status = MatchStatus::Completed;
        self.terminated_early = early;
        self.ledger.freeze();
        self.mvp = mvp_candidates(&self.ledger, self.config.simulation.mvp_candidates);
        self.completed_at = Some(Utc::now());

        let (home, away) = self.ledger.score();
        info!(match_id = %self.id, home, away, early, events = self.events.len(), "match completed");
    }

    fn kickoff(&mut self, kicking: TeamSide) {
        let draft = kickoff_draft(self.team(kicking), kicking);
        self.emit(draft);
    }

    fn team_mut(&mut self, side: TeamSide) -> &mut Team {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    // ========================================================================
    // Emission pipeline
    // ========================================================================

    /// Attributes, applies and appends one draft. Returns false when the
    /// draft had to be degraded to `GeneralPlay`, which ends its chain.
    fn emit(&mut self, draft: EventDraft) -> bool {
        let (draft, deltas, intact) = match attribution::deltas_for(&draft) {
            Ok(deltas) => match self.ledger.apply_deltas(&deltas) {
                Ok(()) => (draft, deltas, true),
                Err(err) => {
                    warn!(match_id = %self.id, category = ?draft.category, error = %err, "ledger rejected event, degrading");
                    (EventDraft::general_play(draft.team), Vec::new(), false)
                }
            },
            Err(err) => {
                warn!(match_id = %self.id, error = %err, "unattributable play, degrading");
                (EventDraft::general_play(draft.team), Vec::new(), false)
            }
        };

        if intact {
            self.apply_side_effects(&draft);
        }

        let (home_score, away_score) = self.ledger.score();
        let primary = draft.primary.as_deref().and_then(|id| lookup(&self.home, &self.away, id));
        let secondary = draft.secondary.as_deref().and_then(|id| lookup(&self.home, &self.away, id));
        let team_name = |side: TeamSide| match side {
            TeamSide::Home => self.home.name.as_str(),
            TeamSide::Away => self.away.name.as_str(),
        };
        let ctx = CommentaryContext {
            home: &self.home.name,
            away: &self.away.name,
            team: draft.team.map(team_name),
            opponent: draft.team.map(|side| team_name(side.opponent())),
            player: primary.map(|p| p.name.as_str()),
            player_race: primary.map(|p| p.race),
            target: secondary.map(|p| p.name.as_str()),
            home_score,
            away_score,
            clock_secs: self.clock_secs,
        };
        let commentary = self.commentary.select(&draft, &ctx, &mut self.rng);

        let event = MatchEvent {
            id: uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid(),
            match_id: self.id.clone(),
            sequence: self.last_sequence() + 1,
            tick: self.tick,
            clock_secs: self.clock_secs,
            half: self.status.half(),
            category: draft.category,
            team: draft.team,
            actors: draft.actors(),
            deltas,
            yards: draft.yards,
            long_gain: draft.long_gain,
            injury: draft.injury,
            commentary,
            pacing: pacing::classify(draft.category),
            timestamp: Utc::now(),
        };
        debug!(match_id = %self.id, seq = event.sequence, category = event.category.as_str(), "event");
        self.events.push(event);
        intact
    }

    /// Field state implied by an emitted event.
    fn apply_side_effects(&mut self, draft: &EventDraft) {
        match draft.category {
            EventCategory::Run | EventCategory::PassComplete => {
                if draft.team == Some(self.possession) {
                    self.ball_line = (self.ball_line + draft.yards.unwrap_or(0)).clamp(0, GOAL_LINE);
                }
            }
            EventCategory::Kickoff => {
                if let Some(kicking) = draft.team {
                    self.possession = kicking.opponent();
                    self.ball_line = self.config.simulation.kickoff_return_line.clamp(1, GOAL_LINE - 1);
                }
            }
            EventCategory::Interception | EventCategory::FumbleRecovery => {
                if let Some(side) = draft.team.filter(|side| *side != self.possession) {
                    self.possession = side;
                    self.ball_line = GOAL_LINE - self.ball_line.clamp(0, GOAL_LINE);
                    debug!(match_id = %self.id, possession = ?side, ball_line = self.ball_line, "turnover");
                }
            }
            EventCategory::Injury => {
                if let (Some(side), Some(id), Some(severity)) = (draft.team, draft.primary.as_deref(), draft.injury) {
                    let match_id = self.id.clone();
                    if let Some(player) = self.team_mut(side).player_mut(id) {
                        player.injury = player.injury.worsen_to(severity);
                        if !player.is_available() {
                            info!(match_id = %match_id, player = %player.id, "player out for the match");
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // ========================================================================
    // Views
    // ========================================================================

    pub fn snapshot(&self) -> MatchSnapshot {
        let (home_score, away_score) = self.ledger.score();
        MatchSnapshot {
            match_id: self.id.clone(),
            kind: self.kind,
            status: self.status,
            paused: self.paused,
            tick: self.tick,
            clock_secs: self.clock_secs,
            max_duration_secs: self.max_duration(),
            half: self.status.half(),
            possession: self.possession,
            ball_line: self.ball_line,
            home: TeamView::from_team(&self.home, home_score),
            away: TeamView::from_team(&self.away, away_score),
            ledger: self.ledger.clone(),
            last_sequence: self.last_sequence(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Final export; `None` until the match is completed.
    pub fn result(&self) -> Option<MatchResult> {
        (self.status == MatchStatus::Completed).then(|| self.build_result())
    }

    fn build_result(&self) -> MatchResult {
        let (home_score, away_score) = self.ledger.score();
        MatchResult {
            match_id: self.id.clone(),
            kind: self.kind,
            home_team: self.home.name.clone(),
            away_team: self.away.name.clone(),
            home_score,
            away_score,
            winner: winner_of(home_score, away_score),
            ledger: self.ledger.clone(),
            events: self.events.clone(),
            mvp_candidates: self.mvp.clone(),
            terminated_early: self.terminated_early,
            completed_at: self.completed_at.unwrap_or(self.updated_at),
        }
    }
}

fn lookup<'a>(home: &'a Team, away: &'a Team, id: &str) -> Option<&'a Player> {
    home.player(id).or_else(|| away.player(id))
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("status", &self.status)
            .field("paused", &self.paused)
            .field("clock_secs", &self.clock_secs)
            .field("score", &self.ledger.score())
            .field("events", &self.events.len())
            .finish()
    }
}
