//! Wire message shapes exchanged with player senders.
//!
//! Enums serialize as their `SCREAMING_SNAKE_CASE` names and structs use
//! camelCase field names, matching what sender applications put on the wire.
//! Missing fields fall back to the same defaults the senders assume.

/// Difficulty chosen by the host player when starting the game.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum DifficultySetting {
    #[default]
    Easy,
    Normal,
    Hard,
}

/// Per-round bonus randomly assigned to each player.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PlayerBonus {
    #[default]
    None,
    Attack,
    Heal,
    Shield,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SpellType {
    #[cfg_attr(feature = "serde", serde(alias = "BASIC_ATTACK"))]
    #[strum(to_string = "ATTACK", serialize = "BASIC_ATTACK")]
    Attack,
    Heal,
    Shield,
}

/// Elemental affinity of a spell or of the enemy.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SpellElement {
    #[default]
    None,
    Air,
    Water,
    Fire,
    Earth,
}

impl SpellElement {
    /// Elements an enemy can be assigned.
    pub const ENEMY_ELEMENTS: [SpellElement; 4] = [
        SpellElement::Air,
        SpellElement::Water,
        SpellElement::Fire,
        SpellElement::Earth,
    ];

    /// The element that deals damage against `self`.
    ///
    /// Elements form two opposing pairs, FIRE/WATER and AIR/EARTH.
    pub const fn foil(self) -> Option<SpellElement> {
        match self {
            SpellElement::Air => Some(SpellElement::Earth),
            SpellElement::Earth => Some(SpellElement::Air),
            SpellElement::Fire => Some(SpellElement::Water),
            SpellElement::Water => Some(SpellElement::Fire),
            SpellElement::None => None,
        }
    }
}

/// How well the player drew the spell gesture.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum SpellAccuracy {
    #[default]
    Good,
    Great,
    Perfect,
}

/// Identity of a game phase, broadcast to senders on every transition.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum PhaseId {
    WaitingForPlayers,
    Instructions,
    PlayerAction,
    PlayerResolution,
    EnemyResolution,
    PlayerVictory,
    EnemyVictory,
    Paused,
}

/// Game-wide data pushed to every sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GameData {
    pub game_state_id: PhaseId,
}

/// Payload of a PLAYER_READY event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PlayerReadyData {
    pub player_name: String,
    pub avatar_index: u32,
}

/// Payload of a PLAYER_PLAYING event sent by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PlayerPlayingData {
    pub difficulty_setting: DifficultySetting,
}

/// Round-start notification sent to each playing player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct PlayerMessage {
    pub player_bonus: PlayerBonus,
    #[cfg_attr(feature = "serde", serde(alias = "castSpellsDurationMillis"))]
    pub cast_duration_millis: u64,
}

/// A single drawn spell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Spell {
    pub spell_type: SpellType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spell_element: SpellElement,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spell_accuracy: SpellAccuracy,
}

impl Spell {
    pub const fn new(
        spell_type: SpellType,
        spell_element: SpellElement,
        spell_accuracy: SpellAccuracy,
    ) -> Self {
        Self {
            spell_type,
            spell_element,
            spell_accuracy,
        }
    }

    pub const fn attack(element: SpellElement, accuracy: SpellAccuracy) -> Self {
        Self::new(SpellType::Attack, element, accuracy)
    }

    pub const fn heal(accuracy: SpellAccuracy) -> Self {
        Self::new(SpellType::Heal, SpellElement::None, accuracy)
    }

    pub const fn shield(accuracy: SpellAccuracy) -> Self {
        Self::new(SpellType::Shield, SpellElement::None, accuracy)
    }
}

/// Ordered list of spells a player submits for one round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpellMessage {
    pub spells: Vec<Spell>,
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spell_message_uses_wire_names() {
        let message = SpellMessage {
            spells: vec![
                Spell::attack(SpellElement::Fire, SpellAccuracy::Perfect),
                Spell::shield(SpellAccuracy::Good),
            ],
        };

        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "spells": [
                    {"spellType": "ATTACK", "spellElement": "FIRE", "spellAccuracy": "PERFECT"},
                    {"spellType": "SHIELD", "spellElement": "NONE", "spellAccuracy": "GOOD"},
                ]
            })
        );
        let back: SpellMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back, message);
    }

    #[test]
    fn basic_attack_alias_is_accepted() {
        let spell: Spell = serde_json::from_value(json!({
            "spellType": "BASIC_ATTACK",
            "spellElement": "AIR",
        }))
        .unwrap();

        assert_eq!(spell.spell_type, SpellType::Attack);
        assert_eq!(spell.spell_accuracy, SpellAccuracy::Good);
    }

    #[test]
    fn player_message_accepts_legacy_duration_key() {
        let message: PlayerMessage = serde_json::from_value(json!({
            "playerBonus": "HEAL",
            "castSpellsDurationMillis": 9000,
        }))
        .unwrap();

        assert_eq!(message.player_bonus, PlayerBonus::Heal);
        assert_eq!(message.cast_duration_millis, 9000);
        assert_eq!(
            serde_json::to_value(message).unwrap(),
            json!({"playerBonus": "HEAL", "castDurationMillis": 9000})
        );
    }

    #[test]
    fn missing_ready_fields_default() {
        let data: PlayerReadyData = serde_json::from_value(json!({"playerName": "Ann"})).unwrap();
        assert_eq!(data.player_name, "Ann");
        assert_eq!(data.avatar_index, 0);

        let playing: PlayerPlayingData = serde_json::from_value(json!({})).unwrap();
        assert_eq!(playing.difficulty_setting, DifficultySetting::Easy);
    }

    #[test]
    fn foil_pairs_are_symmetric() {
        for element in SpellElement::ENEMY_ELEMENTS {
            let foil = element.foil().unwrap();
            assert_eq!(foil.foil(), Some(element));
        }
        assert_eq!(SpellElement::None.foil(), None);
    }
}
