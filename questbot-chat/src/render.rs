//! Display text for every screen.
//!
//! Pure functions of engine state; nothing here mutates a session.

use std::fmt::Write as _;

use questbot_core::{
    AttackOutcome, DirectionDef, EnemyEncounter, Exchange, Inventory, NpcDef, PlayerSession,
    QuestCompletion, QuestDef, Vitals,
};

use crate::menu;

/// Asked on first contact and after `/start`.
#[must_use]
pub fn name_prompt() -> String {
    "Enter your hero's name:".to_string()
}

/// Greeting with a short command reference.
#[must_use]
pub fn welcome(name: &str) -> String {
    format!(
        "Welcome, {name}!\n\n\
         Complete quests, fight monsters and travel the land.\n\n\
         Commands\n  {restart} - start over\n\n\
         Actions\n  {talk} - speak to the characters here\n  {inspect} - size up the enemies here\n  \
         {travel} - go somewhere else\n  {hero} - your profile and quests",
        restart = menu::RESTART,
        talk = menu::TALK,
        inspect = menu::INSPECT,
        travel = menu::TRAVEL,
        hero = menu::HERO_MENU,
    )
}

/// Location overview with characters and enemies.
///
/// A `?` marks a character the player can hand a quest in to, a `!` one
/// with quests not yet taken.
#[must_use]
pub fn location(session: &PlayerSession) -> String {
    let loc = session.location();
    let mut out = format!("Location: {}\n\n{}\n", loc.name, loc.description);

    if !loc.npcs.is_empty() {
        out.push_str("\nCharacters:\n");
        for npc in &loc.npcs {
            let mark = if session.npc_has_completable_quests(npc) {
                "? "
            } else if session.npc_has_untaken_quests(npc) {
                "! "
            } else {
                "  "
            };
            let _ = writeln!(out, "  {mark}{}", npc.name);
        }
    }

    if !loc.enemies.is_empty() {
        out.push_str("\nEnemies:\n");
        for enemy in &loc.enemies {
            let _ = writeln!(out, "    {} (level {})", enemy.def.name, enemy.def.level);
        }
    }
    out
}

/// Nobody to talk to.
#[must_use]
pub fn no_npcs() -> String {
    "There is nobody to talk to here.".to_string()
}

/// Nothing to fight.
#[must_use]
pub fn no_enemies() -> String {
    "There are no enemies here.".to_string()
}

/// Empty quest log.
#[must_use]
pub fn no_quests() -> String {
    "You have no quests.".to_string()
}

/// Choosing a character.
#[must_use]
pub fn talk_prompt() -> String {
    "Who do you want to talk to?".to_string()
}

/// Choosing a quest.
#[must_use]
pub fn quest_prompt() -> String {
    "Choose a quest.".to_string()
}

/// Choosing an enemy.
#[must_use]
pub fn inspect_prompt() -> String {
    "Who are you interested in?".to_string()
}

/// Choosing a direction.
#[must_use]
pub fn travel_prompt() -> String {
    "Where to?".to_string()
}

/// Hero menu prompt.
#[must_use]
pub fn hero_prompt() -> String {
    "Choose an option.".to_string()
}

/// Input the current state does not accept.
#[must_use]
pub fn not_understood() -> String {
    "I did not understand that. Please use the buttons.".to_string()
}

/// A hand-in that failed its check.
#[must_use]
pub fn cannot_complete(quest: &QuestDef) -> String {
    format!("The quest \"{}\" cannot be handed in yet.", quest.name)
}

/// Portrait of a character.
#[must_use]
pub fn npc_intro(npc: &NpcDef) -> String {
    format!("{}:\n    {}\n\n    \"{}\"", npc.name, npc.description, npc.phrase)
}

/// Portrait of an enemy.
#[must_use]
pub fn enemy_intro(enemy: &EnemyEncounter) -> String {
    format!(
        "{}:\n    {}\n\n    \"{}\"",
        enemy.def.name, enemy.def.description, enemy.def.phrase
    )
}

/// Quest card.
#[must_use]
pub fn quest_detail(quest: &QuestDef) -> String {
    format!("Quest:\n    {}\nDescription:\n    {}", quest.name, quest.description)
}

/// Quest accepted.
#[must_use]
pub fn quest_taken(quest: &QuestDef) -> String {
    format!("Quest \"{}\" taken.", quest.name)
}

/// Quest handed in, with the new vitals and any unlocked locations.
#[must_use]
pub fn quest_done(done: &QuestCompletion, vitals: &Vitals, unlocked: &[String]) -> String {
    let mut out = format!(
        "{}\n\nQuest \"{}\" complete!\n\nYou reached level {}\nHealth raised to {}\nDamage raised to {}\n",
        done.quest.congratulation, done.quest.name, vitals.level, vitals.hp, vitals.damage
    );
    if !unlocked.is_empty() {
        out.push_str("\nNew locations available:");
        for name in unlocked {
            let _ = write!(out, "\n    {name}");
        }
    }
    out
}

/// Ten-cell health bar.
#[must_use]
pub fn health_bar(hp: i32, max_hp: i32) -> String {
    let filled = if max_hp <= 0 {
        0
    } else {
        (i64::from(hp.max(0)) * 10 / i64::from(max_hp)).clamp(0, 10)
    };
    let filled = usize::try_from(filled).unwrap_or(0);
    format!("{}{}", "🟩".repeat(filled), "🟥".repeat(10 - filled))
}

/// Both combatants side by side.
#[must_use]
pub fn battle(vitals: &Vitals, enemy: &EnemyEncounter) -> String {
    format!(
        "{} (level {})\nHealth: {} | Damage: {}\n{}\n\n{} (level {})\nHealth: {} | Damage: {}\n{}",
        enemy.def.name,
        enemy.def.level,
        enemy.hp,
        enemy.def.damage,
        health_bar(enemy.hp, enemy.def.health),
        vitals.name,
        vitals.level,
        vitals.hp,
        vitals.damage,
        health_bar(vitals.hp, vitals.max_hp),
    )
}

/// Rolls and result of one exchange.
#[must_use]
pub fn attack_result(outcome: &AttackOutcome, player_level: u32, enemy_level: u32) -> String {
    let roll = outcome.roll();
    let result = match roll.exchange {
        Exchange::AttackerHit { damage, .. } => format!("You hit the enemy for {damage} damage"),
        Exchange::DefenderHit { damage } => format!("The enemy hits you for {damage} damage"),
        Exchange::Draw => "Miss!".to_string(),
    };
    format!(
        "Your roll: {} + {player_level} = {}\nEnemy roll: {} + {enemy_level} = {}\n    {result}",
        roll.attacker_roll.saturating_sub(player_level),
        roll.attacker_roll,
        roll.defender_roll.saturating_sub(enemy_level),
        roll.defender_roll,
    )
}

/// Victory, with the loot received.
#[must_use]
pub fn enemy_defeated(name: &str, loot: &[String]) -> String {
    let mut out = format!("Congratulations! {name} is defeated!");
    if !loot.is_empty() {
        out.push_str("\n\nYou received:");
        for item in loot {
            let _ = write!(out, "\n    {item}");
        }
    }
    out
}

/// Fled from combat.
#[must_use]
pub fn ran_away(name: &str) -> String {
    format!("You ran away from {name}.")
}

/// Setting off along a direction.
#[must_use]
pub fn going(direction: &DirectionDef) -> String {
    format!("Heading off: {}", direction.name)
}

/// Profile card.
#[must_use]
pub fn profile(vitals: &Vitals, inventory: &Inventory, killed: &[String]) -> String {
    let mut out = format!(
        "Profile\nName:    {}\nLevel:   {}\nHealth:  {}/{}\nDamage:  {}\nItems:",
        vitals.name, vitals.level, vitals.hp, vitals.max_hp, vitals.damage
    );
    for (item, count) in inventory.iter() {
        if count > 1 {
            let _ = write!(out, "\n    {item} x{count}");
        } else {
            let _ = write!(out, "\n    {item}");
        }
    }
    out.push_str("\nKilled enemies:");
    for name in killed {
        let _ = write!(out, "\n    {name}");
    }
    out
}

/// Held quests as text.
#[must_use]
pub fn quest_log(quests: &[QuestDef]) -> String {
    let mut out = "Quest log:\n".to_string();
    for quest in quests {
        let _ = writeln!(out, "    {}", menu::quest_label(quest));
    }
    out
}

/// Game over.
#[must_use]
pub fn dead() -> String {
    format!("You died. Send {} to try again.", menu::RESTART)
}

/// Game won.
#[must_use]
pub fn completed() -> String {
    format!("Congratulations! You finished the game. Send {} to play again.", menu::RESTART)
}
