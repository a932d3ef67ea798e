//! Session State Definitions
//!
//! The level session owns everything with a lifetime: the loaded map, the
//! epoch timeline, objective progress, the player, the RNG, and the pending
//! event queue. ObjectiveState and PlayerState are invalidated together at
//! session end; `reset` rebuilds them all from the pristine map.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::rng::DeterministicRng;
use crate::core::vec2::FixedVec2;
use crate::game::epoch::{Epoch, EpochTimeline};
use crate::game::events::GameEvent;
use crate::game::hazard::DeathReason;
use crate::game::map::{LevelData, LevelError, LevelMap};
use crate::game::objective::{self, ObjectiveState};

/// Player spawn used when the level has no `player` marker
/// (the original game's hard-coded spawn).
const FALLBACK_SPAWN: FixedVec2 = FixedVec2::from_ints(50, 100);

// =============================================================================
// PLAYER STATE
// =============================================================================

/// The single playable character.
///
/// `alive` transitions true -> false at most once per session; only a
/// session reset brings the player back.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    /// Continuous world position (not tile-quantized).
    pub position: FixedVec2,
    /// Current velocity in world units/sec.
    pub velocity: FixedVec2,
    /// Is the player still alive?
    pub alive: bool,
    /// Why the player died, once dead.
    pub death: Option<DeathReason>,
}

impl PlayerState {
    /// Create a live player at the given spawn.
    pub fn new(position: FixedVec2) -> Self {
        Self {
            position,
            velocity: FixedVec2::ZERO,
            alive: true,
            death: None,
        }
    }
}

// =============================================================================
// SESSION PHASE & OUTCOME
// =============================================================================

/// Lifecycle phase of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Normal play.
    Playing,
    /// Outcome decided; counting down the fixed end-of-level delay. Not
    /// cancellable, and terminal transitions cannot re-fire during it.
    Closing {
        /// Ticks left before the session ends.
        ticks_remaining: u32,
    },
    /// Session over; ticking is a no-op.
    Ended,
}

/// How the session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionOutcome {
    /// The player walked through the unlocked door.
    Completed,
    /// The player died.
    Died(DeathReason),
}

/// End-of-session summary for the outcome screen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionReport {
    /// Level the session ran on.
    pub level: String,
    /// Seed the session ran with.
    pub seed: u64,
    /// How it ended.
    pub outcome: SessionOutcome,
    /// Ticks played.
    pub duration_ticks: u64,
    /// Time travels performed.
    pub travels: u32,
    /// Keys collected.
    pub keys_collected: u32,
    /// Player-facing message.
    pub message: String,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Complete state of one level session.
#[derive(Clone, Debug)]
pub struct SessionState {
    /// The loaded level geometry (live copy, mutated only by the door
    /// rewrite and the layer activation flags).
    pub map: LevelMap,
    /// Untouched copy of the map for `reset`.
    pristine: LevelMap,
    /// The epoch state machine.
    pub timeline: EpochTimeline,
    /// Objective progress.
    pub objective: ObjectiveState,
    /// The player.
    pub player: PlayerState,
    /// Seed this session's RNG started from.
    pub seed: u64,
    /// Deterministic RNG; all session randomness flows through it.
    pub rng: DeterministicRng,
    /// Current simulation tick.
    pub tick: u64,
    /// Lifecycle phase.
    pub phase: SessionPhase,
    /// Final outcome, set when the closing phase begins.
    outcome: Option<SessionOutcome>,
    /// Events generated since the last `take_events`.
    pending_events: Vec<GameEvent>,
}

impl SessionState {
    /// Build a session from level data. Applies initial layer visibility and
    /// performs the session-start objective refresh.
    pub fn new(data: &LevelData, seed: u64) -> Result<Self, LevelError> {
        let mut map = LevelMap::from_data(data)?;
        let pristine = map.clone();

        let timeline = EpochTimeline::new();
        timeline.sync(&mut map);

        let spawn = map.player_spawn.unwrap_or(FALLBACK_SPAWN);
        let objective = ObjectiveState::new(map.required_keys, map.door_position);

        let mut state = Self {
            map,
            pristine,
            timeline,
            objective,
            player: PlayerState::new(spawn),
            seed,
            rng: DeterministicRng::new(seed),
            tick: 0,
            phase: SessionPhase::Playing,
            outcome: None,
            pending_events: Vec::new(),
        };

        info!(level = %state.map.name, seed, "session started");
        let start_epoch = state.timeline.current();
        objective::refresh_for_epoch(&mut state, start_epoch);
        Ok(state)
    }

    /// Start a fresh session on the same level with a new seed: pristine
    /// geometry, default epoch, re-rolled objective, live player.
    pub fn reset(&mut self, seed: u64) {
        self.map = self.pristine.clone();
        self.timeline.reset(&mut self.map);
        self.objective = ObjectiveState::new(self.map.required_keys, self.map.door_position);
        self.player = PlayerState::new(self.map.player_spawn.unwrap_or(FALLBACK_SPAWN));
        self.seed = seed;
        self.rng = DeterministicRng::new(seed);
        self.tick = 0;
        self.phase = SessionPhase::Playing;
        self.outcome = None;
        self.pending_events.clear();

        info!(level = %self.map.name, seed, "session reset");
        let start_epoch = self.timeline.current();
        objective::refresh_for_epoch(self, start_epoch);
    }

    // =========================================================================
    // Query surface for the surrounding session/UI layer
    // =========================================================================

    /// The active epoch.
    pub fn current_epoch(&self) -> Epoch {
        self.timeline.current()
    }

    /// Travels performed this session.
    pub fn travel_count(&self) -> u32 {
        self.timeline.travel_count()
    }

    /// Keys collected so far.
    pub fn collected_count(&self) -> u32 {
        self.objective.collected
    }

    /// Is the door open?
    pub fn is_door_unlocked(&self) -> bool {
        self.objective.door_unlocked
    }

    /// Is the player alive?
    pub fn is_alive(&self) -> bool {
        self.player.alive
    }

    /// Has the session fully ended (closing delay elapsed)?
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended)
    }

    /// The final outcome, once decided.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    /// Build the end-of-session summary. `None` while no outcome is decided.
    pub fn report(&self) -> Option<SessionReport> {
        let outcome = self.outcome?;
        let message = match outcome {
            SessionOutcome::Completed => format!(
                "Level complete in {} travels",
                self.timeline.travel_count()
            ),
            SessionOutcome::Died(reason) => reason.message().to_string(),
        };
        Some(SessionReport {
            level: self.map.name.clone(),
            seed: self.seed,
            outcome,
            duration_ticks: self.tick,
            travels: self.timeline.travel_count(),
            keys_collected: self.objective.collected,
            message,
        })
    }

    // =========================================================================
    // Internal plumbing
    // =========================================================================

    /// Begin the end-of-level delay with the given outcome.
    ///
    /// A no-op unless the session is still playing, so a death and a
    /// completion in the same session can never both fire.
    pub(crate) fn begin_closing(&mut self, outcome: SessionOutcome) {
        if self.phase != SessionPhase::Playing {
            return;
        }
        self.outcome = Some(outcome);
        self.phase = SessionPhase::Closing {
            ticks_remaining: crate::END_TRANSITION_TICKS,
        };
    }

    /// Split borrows for the objective roll.
    pub(crate) fn objective_parts(
        &mut self,
    ) -> (&mut ObjectiveState, &mut DeterministicRng, &LevelMap) {
        (&mut self.objective, &mut self.rng, &self.map)
    }

    /// Push a session event.
    pub fn push_event(&mut self, event: GameEvent) {
        self.pending_events.push(event);
    }

    /// Take pending events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }
}

// =============================================================================
// TESTS
// =============================================================================
