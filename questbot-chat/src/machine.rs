//! The interaction state machine.
//!
//! One [`Conversation`] per player key. Each text event is resolved against
//! the current [`InteractionState`]; the resulting transition mutates the
//! player session and yields zero or more replies. If a step fails with an
//! integrity fault, the conversation is restored to how it was before the
//! event.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use questbot_core::{
    AttackOutcome, CoreError, DiceRoller, EngineConfig, GoalKind, LocationId, PlayerKey,
    PlayerSession, QuestDef, WorldStore,
};

use crate::error::Result;
use crate::menu::{self, Menu};
use crate::render;
use crate::state::{Context, InteractionState};

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Message text.
    pub text: String,
    /// Optional image reference to attach.
    pub image: Option<String>,
    /// Buttons to show; empty means no keyboard.
    pub menu: Menu,
}

impl Reply {
    /// Text reply with a menu.
    #[must_use]
    pub fn new(text: impl Into<String>, menu: Menu) -> Self {
        Self {
            text: text.into(),
            image: None,
            menu,
        }
    }

    /// Text reply without buttons.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, menu::none())
    }

    /// Attach an image.
    #[must_use]
    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }
}

/// Everything a step needs besides the conversation itself.
pub struct Env<'a> {
    /// Player the event came from.
    pub key: PlayerKey,
    /// World definitions.
    pub world: &'a dyn WorldStore,
    /// Combat dice.
    pub dice: &'a dyn DiceRoller,
    /// Time of the event.
    pub now: DateTime<Utc>,
    /// Engine configuration.
    pub config: &'a EngineConfig,
}

/// Result of one transition.
struct Step {
    next: InteractionState,
    replies: Vec<Reply>,
}

impl Step {
    fn to(next: InteractionState, replies: Vec<Reply>) -> Self {
        Self { next, replies }
    }

    fn stay(state: InteractionState, replies: Vec<Reply>) -> Self {
        Self::to(state, replies)
    }
}

/// Per-player conversation: state, transient context and the session.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    state: InteractionState,
    ctx: Context,
    session: Option<PlayerSession>,
}

impl Conversation {
    /// Fresh conversation waiting for a name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> InteractionState {
        self.state
    }

    /// Current selections.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// The player session, once a name has been given.
    #[must_use]
    pub fn session(&self) -> Option<&PlayerSession> {
        self.session.as_ref()
    }

    /// Handle one text event.
    ///
    /// # Errors
    /// Integrity faults from the world store. The conversation is left
    /// exactly as it was before the event.
    pub fn handle(&mut self, text: &str, env: &Env<'_>) -> Result<Vec<Reply>> {
        let backup = self.clone();
        match self.step(text.trim(), env) {
            Ok(replies) => Ok(replies),
            Err(e) => {
                let integrity = e.is_integrity_fault();
                warn!(player = %env.key, state = %backup.state, integrity, error = %e, "interaction aborted");
                *self = backup;
                Err(e)
            }
        }
    }

    fn step(&mut self, text: &str, env: &Env<'_>) -> Result<Vec<Reply>> {
        if text == menu::RESTART {
            info!(player = %env.key, "conversation restarted");
            self.session = None;
            self.ctx.clear();
            self.state = InteractionState::Naming;
            return Ok(vec![Reply::plain(render::name_prompt())]);
        }

        let state = self.state;
        if state.is_terminal() {
            debug!(player = %env.key, %state, "input after game over ignored");
            return Ok(Vec::new());
        }

        if state == InteractionState::Naming {
            return self.on_naming(text, env);
        }

        let Some(session) = self.session.as_mut() else {
            // No hero yet outside of naming: start over.
            self.state = InteractionState::Naming;
            return Ok(vec![Reply::plain(render::name_prompt())]);
        };
        let ctx = &mut self.ctx;

        let step = if state.back_label() == Some(text) {
            match state.parent() {
                Some(parent) => Step::to(parent, enter(parent, session, ctx, env)),
                None => Step::stay(state, vec![not_understood(state, session, ctx)]),
            }
        } else {
            match state {
                InteractionState::Welcome => on_welcome(text, session, ctx),
                InteractionState::LocationIdle => on_location(text, session),
                InteractionState::DirectionList => on_direction(text, session, ctx, env)?,
                InteractionState::ConversationNpcList => on_npc_list(text, session, ctx),
                InteractionState::ConversationActions => on_npc_actions(text, session, ctx, env)?,
                InteractionState::QuestList => on_quest_list(text, session, ctx),
                InteractionState::QuestDetail => on_quest_detail(text, session, ctx, env)?,
                InteractionState::QuestReward => on_acknowledge(state, text, session, ctx, env),
                InteractionState::CombatEnemyList => on_enemy_list(text, session, ctx),
                InteractionState::CombatDescription => on_enemy_description(text, session, ctx, env),
                InteractionState::CombatActive => on_combat(text, session, ctx, env)?,
                InteractionState::CombatVictory => on_acknowledge(state, text, session, ctx, env),
                InteractionState::ProfileMenu => on_profile_menu(text, session, ctx, env)?,
                InteractionState::ProfileQuestList => on_profile_quest_list(text, session, ctx),
                InteractionState::ProfileQuestDetail => {
                    Step::stay(state, vec![not_understood(state, session, ctx)])
                }
                InteractionState::Naming | InteractionState::Completed | InteractionState::Dead => {
                    Step::stay(state, Vec::new())
                }
            }
        };

        if step.next == InteractionState::LocationIdle {
            ctx.clear();
        }
        if step.next != state {
            debug!(player = %env.key, from = %state, to = %step.next, "transition");
        }
        self.state = step.next;
        Ok(step.replies)
    }

    fn on_naming(&mut self, text: &str, env: &Env<'_>) -> Result<Vec<Reply>> {
        if text.is_empty() {
            return Ok(vec![Reply::plain(render::name_prompt())]);
        }
        let session = PlayerSession::new(
            env.key,
            text,
            env.world,
            LocationId(env.config.player.starting_location),
            env.config.player.rules()?,
            env.now,
        )?;
        self.session = Some(session);
        self.ctx.clear();
        self.state = InteractionState::Welcome;
        Ok(vec![Reply::new(render::welcome(text), menu::welcome())])
    }
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

fn location_reply(session: &PlayerSession) -> Reply {
    Reply::new(render::location(session), menu::location())
        .with_image(session.location().image.clone())
}

fn npc_actions_reply(session: &PlayerSession, ctx: &Context) -> Option<Reply> {
    let npc = session.location().npc(ctx.npc?)?;
    Some(
        Reply::new(render::npc_intro(npc), menu::npc_actions(session, npc))
            .with_image(npc.image.clone()),
    )
}

fn npc_quests_reply(session: &PlayerSession, ctx: &Context) -> Option<Reply> {
    let npc = session.location().npc(ctx.npc?)?;
    Some(Reply::new(render::quest_prompt(), menu::npc_quests(session, &npc.quests)))
}

fn quest_log_reply(session: &PlayerSession) -> Reply {
    let quests = session.active_quests();
    Reply::new(render::quest_log(quests), menu::quest_log(quests))
}

/// Replies shown when arriving at `state` through navigation.
fn enter(
    state: InteractionState,
    session: &mut PlayerSession,
    ctx: &mut Context,
    env: &Env<'_>,
) -> Vec<Reply> {
    match state {
        InteractionState::LocationIdle => {
            ctx.clear();
            vec![location_reply(session)]
        }
        InteractionState::ConversationActions => {
            ctx.quest = None;
            npc_actions_reply(session, ctx).into_iter().collect()
        }
        InteractionState::QuestList => npc_quests_reply(session, ctx).into_iter().collect(),
        InteractionState::ProfileMenu => vec![Reply::new(render::hero_prompt(), menu::hero())],
        InteractionState::ProfileQuestList => vec![quest_log_reply(session)],
        other => {
            debug!(player = %env.key, state = %other, "no entry screen");
            Vec::new()
        }
    }
}

/// Menu the player is currently looking at, repeated with a "not
/// understood" reply.
fn current_menu(state: InteractionState, session: &PlayerSession, ctx: &Context) -> Menu {
    match state {
        InteractionState::Welcome => menu::welcome(),
        InteractionState::LocationIdle => menu::location(),
        InteractionState::DirectionList => {
            menu::directions(&session.location().directions, session.level())
        }
        InteractionState::ConversationNpcList => menu::npc_list(&session.location().npcs),
        InteractionState::ConversationActions => ctx
            .npc
            .and_then(|id| session.location().npc(id))
            .map_or_else(menu::back_only, |npc| menu::npc_actions(session, npc)),
        InteractionState::QuestList => ctx
            .npc
            .and_then(|id| session.location().npc(id))
            .map_or_else(menu::back_only, |npc| menu::npc_quests(session, &npc.quests)),
        InteractionState::QuestDetail => selected_npc_quest(session, ctx)
            .map_or_else(menu::back_only, |q| menu::quest_actions(session, &q)),
        InteractionState::QuestReward | InteractionState::CombatVictory => menu::congratulation(),
        InteractionState::CombatEnemyList => menu::enemy_list(&session.location().enemies),
        InteractionState::CombatDescription => menu::enemy_description(),
        InteractionState::CombatActive => menu::battle(),
        InteractionState::ProfileMenu => menu::hero(),
        InteractionState::ProfileQuestList => menu::quest_log(session.active_quests()),
        InteractionState::ProfileQuestDetail => menu::back_only(),
        InteractionState::Naming | InteractionState::Completed | InteractionState::Dead => menu::none(),
    }
}

fn not_understood(state: InteractionState, session: &PlayerSession, ctx: &Context) -> Reply {
    Reply::new(render::not_understood(), current_menu(state, session, ctx))
}

fn selected_npc_quest(session: &PlayerSession, ctx: &Context) -> Option<QuestDef> {
    let npc = session.location().npc(ctx.npc?)?;
    let id = ctx.quest?;
    npc.quests.iter().find(|q| q.id == id).cloned()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn on_welcome(text: &str, session: &PlayerSession, ctx: &Context) -> Step {
    if text == menu::START_GAME {
        Step::to(InteractionState::LocationIdle, vec![location_reply(session)])
    } else {
        Step::stay(
            InteractionState::Welcome,
            vec![not_understood(InteractionState::Welcome, session, ctx)],
        )
    }
}

fn on_location(text: &str, session: &PlayerSession) -> Step {
    let here = InteractionState::LocationIdle;
    let loc = session.location();
    match text {
        menu::TALK if loc.npcs.is_empty() => {
            Step::stay(here, vec![Reply::new(render::no_npcs(), menu::location())])
        }
        menu::TALK => Step::to(
            InteractionState::ConversationNpcList,
            vec![Reply::new(render::talk_prompt(), menu::npc_list(&loc.npcs))],
        ),
        menu::INSPECT if loc.enemies.is_empty() => {
            Step::stay(here, vec![Reply::new(render::no_enemies(), menu::location())])
        }
        menu::INSPECT => Step::to(
            InteractionState::CombatEnemyList,
            vec![Reply::new(render::inspect_prompt(), menu::enemy_list(&loc.enemies))],
        ),
        menu::TRAVEL => Step::to(
            InteractionState::DirectionList,
            vec![Reply::new(
                render::travel_prompt(),
                menu::directions(&loc.directions, session.level()),
            )],
        ),
        menu::HERO_MENU => Step::to(
            InteractionState::ProfileMenu,
            vec![Reply::new(render::hero_prompt(), menu::hero())],
        ),
        _ => Step::stay(here, vec![Reply::new(render::not_understood(), menu::location())]),
    }
}

fn on_direction(
    text: &str,
    session: &mut PlayerSession,
    ctx: &Context,
    env: &Env<'_>,
) -> Result<Step> {
    let here = InteractionState::DirectionList;
    let Some(direction) = session.find_direction(menu::strip_lock_marker(text)).cloned() else {
        return Ok(Step::stay(here, vec![not_understood(here, session, ctx)]));
    };
    if !session.go_to(&direction, env.world)? {
        // Gated: silently ignored.
        return Ok(Step::stay(here, Vec::new()));
    }
    Ok(Step::to(
        InteractionState::LocationIdle,
        vec![Reply::plain(render::going(&direction)), location_reply(session)],
    ))
}

fn on_npc_list(text: &str, session: &PlayerSession, ctx: &mut Context) -> Step {
    let here = InteractionState::ConversationNpcList;
    let Some(npc) = session.find_npc(text) else {
        return Step::stay(here, vec![not_understood(here, session, ctx)]);
    };
    ctx.npc = Some(npc.id);
    ctx.quest = None;
    Step::to(
        InteractionState::ConversationActions,
        npc_actions_reply(session, ctx).into_iter().collect(),
    )
}

fn completion_replies(
    done: &questbot_core::QuestCompletion,
    session: &mut PlayerSession,
    env: &Env<'_>,
    buttons: Menu,
) -> Result<Vec<Reply>> {
    let unlocked = session.unlocked_location_names(env.world)?;
    let vitals = session.vitals(env.now);
    let mut replies = vec![Reply::new(render::quest_done(done, &vitals, &unlocked), buttons)];
    if done.is_final {
        replies.push(Reply::plain(render::completed()));
    }
    Ok(replies)
}

fn on_npc_actions(
    text: &str,
    session: &mut PlayerSession,
    ctx: &mut Context,
    env: &Env<'_>,
) -> Result<Step> {
    let here = InteractionState::ConversationActions;
    if text == menu::QUESTS {
        return Ok(Step::to(
            InteractionState::QuestList,
            npc_quests_reply(session, ctx).into_iter().collect(),
        ));
    }
    if text.starts_with(menu::DELIVER_PREFIX) {
        if let Some(npc) = ctx.npc {
            if let Some(done) = session.deliver_message(text, npc) {
                if done.is_final {
                    let replies = completion_replies(&done, session, env, menu::none())?;
                    return Ok(Step::to(InteractionState::Completed, replies));
                }
                let actions = current_menu(here, session, ctx);
                let replies = completion_replies(&done, session, env, actions)?;
                return Ok(Step::stay(here, replies));
            }
        }
    }
    Ok(Step::stay(here, vec![not_understood(here, session, ctx)]))
}

fn on_quest_list(text: &str, session: &PlayerSession, ctx: &mut Context) -> Step {
    let here = InteractionState::QuestList;
    let found = ctx.npc.and_then(|npc| session.find_npc_quest(npc, text));
    let Some(quest) = found else {
        return Step::stay(here, vec![not_understood(here, session, ctx)]);
    };
    ctx.quest = Some(quest.id);
    Step::to(
        InteractionState::QuestDetail,
        vec![Reply::new(render::quest_detail(quest), menu::quest_actions(session, quest))],
    )
}

fn on_quest_detail(
    text: &str,
    session: &mut PlayerSession,
    ctx: &mut Context,
    env: &Env<'_>,
) -> Result<Step> {
    let here = InteractionState::QuestDetail;
    let Some(quest) = selected_npc_quest(session, ctx) else {
        return Ok(Step::stay(here, vec![not_understood(here, session, ctx)]));
    };

    match text {
        menu::TAKE_QUEST if session.take_quest(&quest) => {
            let mut replies = vec![Reply::plain(render::quest_taken(&quest))];
            replies.extend(npc_quests_reply(session, ctx));
            ctx.quest = None;
            Ok(Step::to(InteractionState::QuestList, replies))
        }
        menu::HAND_OVER | menu::REPORT_KILL => {
            let wanted = if text == menu::HAND_OVER {
                GoalKind::Bring
            } else {
                GoalKind::Kill
            };
            if quest.goal.kind() != wanted {
                return Ok(Step::stay(here, vec![not_understood(here, session, ctx)]));
            }
            match session.complete_quest(quest.id) {
                Ok(done) if done.is_final => {
                    let replies = completion_replies(&done, session, env, menu::none())?;
                    Ok(Step::to(InteractionState::Completed, replies))
                }
                Ok(done) => {
                    let replies = completion_replies(&done, session, env, menu::congratulation())?;
                    Ok(Step::to(InteractionState::QuestReward, replies))
                }
                Err(e @ (CoreError::NotCompletable(_) | CoreError::ItemNotHeld(_))) => {
                    debug!(player = %env.key, error = %e, "hand-in refused");
                    Ok(Step::stay(
                        here,
                        vec![Reply::new(render::cannot_complete(&quest), menu::quest_actions(session, &quest))],
                    ))
                }
                Err(e) => Err(e.into()),
            }
        }
        _ => Ok(Step::stay(here, vec![not_understood(here, session, ctx)])),
    }
}

/// "Great" after a reward or a victory returns to the parent screen.
fn on_acknowledge(
    state: InteractionState,
    text: &str,
    session: &mut PlayerSession,
    ctx: &mut Context,
    env: &Env<'_>,
) -> Step {
    match state.parent() {
        Some(parent) if text == menu::GREAT => Step::to(parent, enter(parent, session, ctx, env)),
        _ => Step::stay(state, vec![not_understood(state, session, ctx)]),
    }
}

fn on_enemy_list(text: &str, session: &PlayerSession, ctx: &mut Context) -> Step {
    let here = InteractionState::CombatEnemyList;
    let Some(enemy) = session.find_enemy(text) else {
        return Step::stay(here, vec![not_understood(here, session, ctx)]);
    };
    ctx.enemy = Some(enemy.id());
    Step::to(
        InteractionState::CombatDescription,
        vec![Reply::new(render::enemy_intro(enemy), menu::enemy_description())
            .with_image(enemy.def.image.clone())],
    )
}

fn on_enemy_description(
    text: &str,
    session: &mut PlayerSession,
    ctx: &Context,
    env: &Env<'_>,
) -> Step {
    let here = InteractionState::CombatDescription;
    if text != menu::ENGAGE {
        return Step::stay(here, vec![not_understood(here, session, ctx)]);
    }
    let vitals = session.vitals(env.now);
    match ctx.enemy.and_then(|id| session.location().encounter(id)) {
        Some(enemy) => Step::to(
            InteractionState::CombatActive,
            vec![Reply::new(render::battle(&vitals, enemy), menu::battle())],
        ),
        None => Step::to(InteractionState::LocationIdle, vec![location_reply(session)]),
    }
}

fn on_combat(
    text: &str,
    session: &mut PlayerSession,
    ctx: &Context,
    env: &Env<'_>,
) -> Result<Step> {
    let here = InteractionState::CombatActive;
    let Some(enemy_id) = ctx.enemy else {
        return Ok(Step::to(InteractionState::LocationIdle, vec![location_reply(session)]));
    };

    if text == menu::FLEE {
        let name = session
            .location()
            .encounter(enemy_id)
            .map(|e| e.def.name.clone())
            .unwrap_or_default();
        return Ok(Step::to(
            InteractionState::LocationIdle,
            vec![Reply::plain(render::ran_away(&name)), location_reply(session)],
        ));
    }
    if text != menu::ATTACK {
        return Ok(Step::stay(here, vec![not_understood(here, session, ctx)]));
    }

    let Some(encounter) = session.location().encounter(enemy_id) else {
        // Already defeated: a late duplicate attack is a no-op.
        debug!(player = %env.key, enemy = %enemy_id, "attack on missing encounter ignored");
        return Ok(Step::stay(here, Vec::new()));
    };
    let enemy_name = encounter.def.name.clone();
    let enemy_level = encounter.def.level;

    session.regenerate(env.now);
    let outcome = match session.attack(enemy_id, env.dice, env.config.combat.die_sides) {
        Ok(outcome) => outcome,
        Err(CoreError::EncounterAlreadyDead(_) | CoreError::EncounterNotFound(_)) => {
            return Ok(Step::stay(here, Vec::new()));
        }
        Err(e) => return Err(e.into()),
    };
    let exchange = Reply::plain(render::attack_result(&outcome, session.level(), enemy_level));

    let step = match outcome {
        AttackOutcome::Killed { ref loot, .. } => Step::to(
            InteractionState::CombatVictory,
            vec![
                exchange,
                Reply::new(render::enemy_defeated(&enemy_name, loot), menu::congratulation()),
            ],
        ),
        AttackOutcome::PlayerDied { .. } => {
            Step::to(InteractionState::Dead, vec![exchange, Reply::plain(render::dead())])
        }
        AttackOutcome::Hit { .. } | AttackOutcome::Draw { .. } | AttackOutcome::Struck { .. } => {
            let vitals = session.vitals(env.now);
            let status = session
                .location()
                .encounter(enemy_id)
                .map(|enemy| Reply::new(render::battle(&vitals, enemy), menu::battle()));
            let mut replies = vec![exchange];
            replies.extend(status);
            Step::stay(here, replies)
        }
    };
    Ok(step)
}

fn on_profile_menu(
    text: &str,
    session: &mut PlayerSession,
    ctx: &Context,
    env: &Env<'_>,
) -> Result<Step> {
    let here = InteractionState::ProfileMenu;
    match text {
        menu::PROFILE => {
            let killed = session.killed_enemy_names(env.world)?;
            let vitals = session.vitals(env.now);
            let text = render::profile(&vitals, session.inventory(), &killed);
            Ok(Step::stay(here, vec![Reply::new(text, menu::hero())]))
        }
        menu::QUEST_LOG if session.active_quests().is_empty() => {
            Ok(Step::stay(here, vec![Reply::new(render::no_quests(), menu::hero())]))
        }
        menu::QUEST_LOG => Ok(Step::to(
            InteractionState::ProfileQuestList,
            vec![quest_log_reply(session)],
        )),
        _ => Ok(Step::stay(here, vec![not_understood(here, session, ctx)])),
    }
}

fn on_profile_quest_list(text: &str, session: &PlayerSession, ctx: &mut Context) -> Step {
    let here = InteractionState::ProfileQuestList;
    let Some(quest) = session.find_active_quest(text) else {
        return Step::stay(here, vec![not_understood(here, session, ctx)]);
    };
    ctx.quest = Some(quest.id);
    Step::to(
        InteractionState::ProfileQuestDetail,
        vec![Reply::new(render::quest_detail(quest), menu::back_only())],
    )
}
