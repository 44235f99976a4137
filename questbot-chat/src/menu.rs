//! Button labels and menu layouts.
//!
//! A menu is a list of rows, each row a list of button labels. The
//! transport decides how to draw them; the state machine only ever
//! compares the text that comes back.

use questbot_core::{DirectionDef, EnemyEncounter, GoalKind, NpcDef, PlayerSession, QuestDef, QuestState};

/// Rows of button labels.
pub type Menu = Vec<Vec<String>>;

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Restart command, accepted in every state.
pub const RESTART: &str = "/start";
/// Leave the welcome screen.
pub const START_GAME: &str = "Start game";
/// Open the list of characters.
pub const TALK: &str = "Talk";
/// Open the list of enemies.
pub const INSPECT: &str = "Inspect enemies";
/// Open the list of directions.
pub const TRAVEL: &str = "Travel";
/// Open the hero menu.
pub const HERO_MENU: &str = "Hero menu";
/// Open a character's quest list.
pub const QUESTS: &str = "Quests";
/// Prefix of message-delivery buttons.
pub const DELIVER_PREFIX: &str = "Deliver message from ";
/// Take the shown quest.
pub const TAKE_QUEST: &str = "Take quest";
/// Hand in a Bring quest.
pub const HAND_OVER: &str = "Hand over item";
/// Hand in a Kill quest.
pub const REPORT_KILL: &str = "Report kill";
/// Start fighting the inspected enemy.
pub const ENGAGE: &str = "Engage";
/// One combat exchange.
pub const ATTACK: &str = "Attack";
/// Leave combat.
pub const FLEE: &str = "Flee";
/// Go back one step.
pub const BACK: &str = "Back";
/// Close a list.
pub const CANCEL: &str = "Cancel";
/// Acknowledge a reward or victory.
pub const GREAT: &str = "Great";
/// Show vitals and inventory.
pub const PROFILE: &str = "Profile";
/// Show held quests.
pub const QUEST_LOG: &str = "Quest log";

const TALK_PREFIX: &str = "Talk to ";
const LOCK_MARKER: &str = " (locked, level ";

fn row(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|l| (*l).to_string()).collect()
}

// ---------------------------------------------------------------------------
// Fixed menus
// ---------------------------------------------------------------------------

/// Welcome screen.
#[must_use]
pub fn welcome() -> Menu {
    vec![row(&[START_GAME])]
}

/// Main location menu.
#[must_use]
pub fn location() -> Menu {
    vec![row(&[TALK, INSPECT]), row(&[TRAVEL, HERO_MENU])]
}

/// After a quest reward or a victory.
#[must_use]
pub fn congratulation() -> Menu {
    vec![row(&[GREAT])]
}

/// Looking at an enemy.
#[must_use]
pub fn enemy_description() -> Menu {
    vec![row(&[ENGAGE, BACK])]
}

/// During combat.
#[must_use]
pub fn battle() -> Menu {
    vec![row(&[ATTACK, FLEE])]
}

/// Hero menu.
#[must_use]
pub fn hero() -> Menu {
    vec![row(&[PROFILE, QUEST_LOG]), row(&[BACK])]
}

/// A single back button.
#[must_use]
pub fn back_only() -> Menu {
    vec![row(&[BACK])]
}

/// Terminal states offer nothing.
#[must_use]
pub fn none() -> Menu {
    Vec::new()
}

// ---------------------------------------------------------------------------
// Dynamic menus
// ---------------------------------------------------------------------------

/// One "Talk to X" button per character.
#[must_use]
pub fn npc_list(npcs: &[NpcDef]) -> Menu {
    npcs.iter()
        .map(|n| vec![format!("{TALK_PREFIX}{}", n.name)])
        .chain(std::iter::once(row(&[CANCEL])))
        .collect()
}

/// Actions while talking to `npc`: quests, pending deliveries, back.
#[must_use]
pub fn npc_actions(session: &PlayerSession, npc: &NpcDef) -> Menu {
    let mut menu = vec![row(&[QUESTS])];
    for giver in session.messages_for(npc.id) {
        menu.push(vec![format!("{DELIVER_PREFIX}{giver}")]);
    }
    menu.push(row(&[BACK]));
    menu
}

/// Quest label: name followed by a goal marker.
#[must_use]
pub fn quest_label(quest: &QuestDef) -> String {
    let marker = match quest.goal.kind() {
        GoalKind::Kill => "⚔️",
        GoalKind::Bring => "💍",
        GoalKind::Talk => "💬",
    };
    format!("{} {marker}", quest.name)
}

/// A character's quests, annotated with the player's progress.
#[must_use]
pub fn npc_quests(session: &PlayerSession, quests: &[QuestDef]) -> Menu {
    quests
        .iter()
        .map(|q| {
            let mut label = quest_label(q);
            match session.quest_state(q) {
                QuestState::Completable => label.push_str(" (ready)"),
                QuestState::Taken => label.push_str(" (taken)"),
                QuestState::Offered | QuestState::Completed => {}
            }
            vec![label]
        })
        .chain(std::iter::once(row(&[CANCEL])))
        .collect()
}

/// Held quests, without progress notes.
#[must_use]
pub fn quest_log(quests: &[QuestDef]) -> Menu {
    quests
        .iter()
        .map(|q| vec![quest_label(q)])
        .chain(std::iter::once(row(&[CANCEL])))
        .collect()
}

/// Actions on one of a character's quests.
#[must_use]
pub fn quest_actions(session: &PlayerSession, quest: &QuestDef) -> Menu {
    if !session.has_quest(quest.id) {
        return vec![row(&[TAKE_QUEST, BACK])];
    }
    if session.can_complete(quest) {
        let hand_in = match quest.goal.kind() {
            GoalKind::Bring => Some(HAND_OVER),
            GoalKind::Kill => Some(REPORT_KILL),
            GoalKind::Talk => None,
        };
        if let Some(label) = hand_in {
            return vec![row(&[label]), row(&[BACK])];
        }
    }
    back_only()
}

/// Enemies to inspect.
#[must_use]
pub fn enemy_list(enemies: &[EnemyEncounter]) -> Menu {
    enemies
        .iter()
        .map(|e| vec![e.def.name.clone()])
        .chain(std::iter::once(row(&[CANCEL])))
        .collect()
}

/// Directions, gated ones marked with their level.
#[must_use]
pub fn directions(directions: &[DirectionDef], level: u32) -> Menu {
    directions
        .iter()
        .map(|d| {
            if d.is_open_for(level) {
                vec![d.name.clone()]
            } else {
                vec![format!("{}{LOCK_MARKER}{})", d.name, d.target_level)]
            }
        })
        .chain(std::iter::once(row(&[CANCEL])))
        .collect()
}

/// Strip the lock marker [`directions`] appends to gated entries.
#[must_use]
pub fn strip_lock_marker(label: &str) -> &str {
    let label = label.trim();
    match label.rfind(LOCK_MARKER) {
        Some(idx) if label.ends_with(')') => &label[..idx],
        _ => label,
    }
}
