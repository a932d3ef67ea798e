//! Hazard & Transition-Safety Checker
//!
//! Two read-only checks against the geometry store, plus the terminal death
//! transition. Both checks are no-ops once the player is dead.
//!
//! The standing-hazard check runs every tick; the entombment check runs
//! immediately after a toggle, before any further movement, because the
//! solidity it inspects is exactly what the toggle just flipped.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::epoch::Epoch;
use crate::game::events::GameEvent;
use crate::game::map::{DeathKind, LayerRole};
use crate::game::state::{SessionOutcome, SessionState};

/// Why the player died. Carries the player-facing message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathReason {
    /// Stood on a water hazard.
    Drowned,
    /// Stood on a lava hazard.
    Burned,
    /// Stood on a spike hazard.
    Impaled,
    /// A toggle placed the player inside now-solid geometry.
    Entombed,
    /// Lethal tile with no mapped death kind.
    Hazard,
}

impl DeathReason {
    /// Player-facing death message for the end-of-level report.
    pub fn message(self) -> &'static str {
        match self {
            DeathReason::Drowned => "You drowned in the depths of time",
            DeathReason::Burned => "You burned in the flows of time",
            DeathReason::Impaled => "You were impaled by the spikes of time",
            DeathReason::Entombed => "You materialized inside solid rock",
            DeathReason::Hazard => "The timeline claimed you",
        }
    }

    fn from_kind(kind: Option<DeathKind>) -> Self {
        match kind {
            Some(DeathKind::Water) => DeathReason::Drowned,
            Some(DeathKind::Lava) => DeathReason::Burned,
            Some(DeathKind::Spikes) => DeathReason::Impaled,
            None => DeathReason::Hazard,
        }
    }
}

/// Standing-hazard check: the tile under the player in the active epoch's
/// Background and Principal layers, every tick.
pub fn check_standing_hazard(state: &mut SessionState) {
    if !state.player.alive {
        return;
    }

    let epoch = state.timeline.current();
    let pos = state.player.position;

    for role in [LayerRole::Background, LayerRole::Principal] {
        let lethal = state
            .map
            .tile_at(epoch, role, pos)
            .filter(|tile| tile.kills)
            .map(|tile| DeathReason::from_kind(tile.death_kind));
        if let Some(reason) = lethal {
            kill(state, reason);
            return;
        }
    }
}

/// Entombment check: run immediately after a toggle into `new_epoch`, at the
/// player's unchanged position. If the newly active principal layer is solid
/// there, the player traveled into a wall.
pub fn check_entombment(state: &mut SessionState, new_epoch: Epoch) {
    if !state.player.alive {
        return;
    }

    let entombed = state
        .map
        .tile_at(new_epoch, LayerRole::Principal, state.player.position)
        .is_some_and(|tile| tile.collides);

    if entombed {
        kill(state, DeathReason::Entombed);
    }
}

/// The sole terminal transition of the player: Alive -> Dead.
///
/// Idempotent: a no-op if the player is already dead. Freezes movement,
/// records the reason, emits the death event, and starts the end-of-level
/// closing delay.
pub fn kill(state: &mut SessionState, reason: DeathReason) {
    if !state.player.alive {
        return;
    }

    state.player.alive = false;
    state.player.velocity = crate::core::vec2::FixedVec2::ZERO;
    state.player.death = Some(reason);

    info!(?reason, tick = state.tick, "player died: {}", reason.message());
    let event = GameEvent::player_died(state.tick, reason);
    state.push_event(event);
    state.begin_closing(SessionOutcome::Died(reason));
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::to_fixed;
    use crate::core::vec2::FixedVec2;
    use crate::game::events::GameEventData;
    use crate::game::state::SessionPhase;
    use crate::game::testutil::{tiny_session, LAVA_POS, SAFE_POS, WALL_POS};

    #[test]
    fn test_standing_on_lava_burns() {
        let mut state = tiny_session();
        state.player.position = LAVA_POS;

        check_standing_hazard(&mut state);

        assert!(!state.player.alive);
        assert_eq!(state.player.death, Some(DeathReason::Burned));
        let events = state.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e.data, GameEventData::PlayerDied { reason: DeathReason::Burned })));
    }

    #[test]
    fn test_safe_tile_never_kills() {
        let mut state = tiny_session();
        state.player.position = SAFE_POS;

        for _ in 0..10 {
            check_standing_hazard(&mut state);
        }
        assert!(state.player.alive);
    }

    #[test]
    fn test_entombment_on_toggle() {
        let mut state = tiny_session();
        // WALL_POS is open in the Future but solid in the Past principal layer
        state.player.position = WALL_POS;

        check_entombment(&mut state, Epoch::Future);
        assert!(state.player.alive);

        check_entombment(&mut state, Epoch::Past);
        assert!(!state.player.alive);
        assert_eq!(state.player.death, Some(DeathReason::Entombed));
    }

    #[test]
    fn test_kill_is_idempotent() {
        let mut state = tiny_session();
        state.player.velocity = FixedVec2::new(to_fixed(10.0), 0);

        kill(&mut state, DeathReason::Drowned);
        assert_eq!(state.player.velocity, FixedVec2::ZERO);
        assert!(matches!(state.phase, SessionPhase::Closing { .. }));
        let first_events = state.take_events().len();

        // Second kill with a different reason changes nothing
        kill(&mut state, DeathReason::Burned);
        assert_eq!(state.player.death, Some(DeathReason::Drowned));
        assert_eq!(state.take_events().len(), 0);
        assert!(first_events > 0);
    }

    #[test]
    fn test_checks_noop_when_dead() {
        let mut state = tiny_session();
        kill(&mut state, DeathReason::Hazard);
        state.take_events();

        state.player.position = LAVA_POS;
        check_standing_hazard(&mut state);
        check_entombment(&mut state, Epoch::Past);
        assert!(state.take_events().is_empty());
        assert_eq!(state.player.death, Some(DeathReason::Hazard));
    }

    #[test]
    fn test_death_messages() {
        assert!(DeathReason::Drowned.message().contains("drowned"));
        assert!(DeathReason::Burned.message().contains("burned"));
        assert!(DeathReason::Impaled.message().contains("impaled"));
        assert!(DeathReason::Entombed.message().contains("solid"));
    }
}
