//! Presentation hooks.
//!
//! Actions and phases never touch rendering or audio. They describe what
//! should be seen or heard as [`Cue`] values handed to a [`Presenter`] at
//! fixed lifecycle points; what a presenter does with a cue is opaque to the
//! game.

use crate::battle::PlayerId;
use crate::protocol::{SpellAccuracy, SpellElement};

/// Full-screen displays and overlays the game switches on and off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DisplayId {
    Lobby,
    Instructions,
    Battlefield,
    PartyHealth,
    EnemyHealth,
    Countdown,
    WaitingForSpells,
    PlayerVictory,
    EnemyVictory,
    Paused,
}

/// Where a player sprite is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// Lobby line-up, with the player name shown.
    Lobby,
    /// Battle position facing the enemy.
    Battle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Sound {
    Attack,
    Heal,
    Shield,
    ShieldDisrupt,
}

/// A single presentation hook invocation.
#[derive(Clone, Debug, PartialEq)]
pub enum Cue {
    ActivateDisplay(DisplayId),
    DeactivateDisplay(DisplayId),
    DisplayText {
        display: DisplayId,
        text: &'static str,
    },

    ShowPlayer {
        player: PlayerId,
        placement: Placement,
    },
    HidePlayer(PlayerId),
    MoveForward(PlayerId),
    MoveBackward(PlayerId),
    /// Alpha applied to every party sprite while the party fades out.
    PartyAlpha(f32),

    /// Enemy idle animation for its element.
    ShowEnemy(SpellElement),
    EnemyAlpha(f32),
    EnemyAttackAnimation(SpellElement),
    RemoveEnemy,

    /// Player spell flying from the caster to the enemy.
    LaunchPlayerSpell {
        caster: PlayerId,
        element: SpellElement,
        /// Sprite scale, larger with better accuracy and an attack bonus.
        scale: f32,
        flight_ms: u64,
        /// Whether an explosion plays on impact.
        explodes: bool,
    },
    /// Enemy projectile flying toward a party member.
    LaunchEnemySpell {
        target: PlayerId,
        element: SpellElement,
        strength: u32,
        flight_ms: u64,
    },
    DeactivateSpell,

    ShieldUp {
        value: u32,
        accuracy: SpellAccuracy,
        bonus: bool,
    },
    ShieldDown,
    HealOn(SpellAccuracy),
    HealOff,

    PartyHealth {
        health: u32,
        max: u32,
    },
    EnemyHealth {
        health: u32,
        max: u32,
    },

    Sound(Sound),
}

/// Receiver of presentation cues.
pub trait Presenter {
    fn cue(&mut self, cue: Cue);
}

/// Discards every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn cue(&mut self, _cue: Cue) {}
}

/// Records cues in order.
impl Presenter for Vec<Cue> {
    fn cue(&mut self, cue: Cue) {
        self.push(cue);
    }
}

impl<P: Presenter + ?Sized> Presenter for &mut P {
    fn cue(&mut self, cue: Cue) {
        (**self).cue(cue);
    }
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn cue(&mut self, cue: Cue) {
        (**self).cue(cue);
    }
}
