//! Interaction states and the transient context carried between them.

use questbot_core::{EnemyId, NpcId, QuestId};

use crate::menu;

/// Where a conversation currently is. Each state accepts its own set of
/// inputs; `Completed` and `Dead` accept nothing but `/start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InteractionState {
    /// Waiting for the hero's name.
    #[default]
    Naming,
    /// Welcome text shown, waiting for "Start game".
    Welcome,
    /// Standing in a location, main menu shown.
    LocationIdle,
    /// Choosing where to travel.
    DirectionList,
    /// Choosing whom to talk to.
    ConversationNpcList,
    /// Talking to the selected character.
    ConversationActions,
    /// Browsing the selected character's quests.
    QuestList,
    /// Looking at one of those quests.
    QuestDetail,
    /// A quest was just handed in.
    QuestReward,
    /// Choosing which enemy to inspect.
    CombatEnemyList,
    /// Looking at the selected enemy.
    CombatDescription,
    /// Fighting the selected enemy.
    CombatActive,
    /// The selected enemy just died.
    CombatVictory,
    /// Hero menu.
    ProfileMenu,
    /// Browsing held quests.
    ProfileQuestList,
    /// Looking at one held quest.
    ProfileQuestDetail,
    /// A final quest was completed.
    Completed,
    /// The hero died.
    Dead,
}

impl InteractionState {
    /// Whether the game is over for this conversation.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Dead)
    }

    /// Logical parent reached by this state's back/cancel action.
    #[must_use]
    pub fn parent(self) -> Option<Self> {
        match self {
            Self::DirectionList
            | Self::ConversationNpcList
            | Self::ConversationActions
            | Self::CombatEnemyList
            | Self::CombatDescription
            | Self::CombatActive
            | Self::CombatVictory
            | Self::ProfileMenu => Some(Self::LocationIdle),
            Self::QuestList | Self::QuestReward => Some(Self::ConversationActions),
            Self::QuestDetail => Some(Self::QuestList),
            Self::ProfileQuestList => Some(Self::ProfileMenu),
            Self::ProfileQuestDetail => Some(Self::ProfileQuestList),
            Self::Naming | Self::Welcome | Self::LocationIdle | Self::Completed | Self::Dead => None,
        }
    }

    /// Button label that returns to [`Self::parent`] without side effects.
    ///
    /// Fleeing combat and acknowledging a reward also lead to the parent
    /// but carry their own replies, so they are not listed here.
    #[must_use]
    pub fn back_label(self) -> Option<&'static str> {
        match self {
            Self::DirectionList
            | Self::ConversationNpcList
            | Self::QuestList
            | Self::CombatEnemyList
            | Self::ProfileQuestList => Some(menu::CANCEL),
            Self::ConversationActions
            | Self::QuestDetail
            | Self::CombatDescription
            | Self::ProfileMenu
            | Self::ProfileQuestDetail => Some(menu::BACK),
            _ => None,
        }
    }
}

impl std::fmt::Display for InteractionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

/// Selections carried across states. Cleared on return to
/// [`InteractionState::LocationIdle`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    /// Character being talked to.
    pub npc: Option<NpcId>,
    /// Quest being looked at.
    pub quest: Option<QuestId>,
    /// Enemy being inspected or fought.
    pub enemy: Option<EnemyId>,
}

impl Context {
    /// Forget every selection.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Whether nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.npc.is_none() && self.quest.is_none() && self.enemy.is_none()
    }
}
