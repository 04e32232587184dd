//! A thin orchestrator loop for built-in bots.
//!
//! The real contest orchestrator runs bot subprocesses under wall-clock
//! budgets; this driver only exercises the engine API surface the same
//! way: setup blocks, per-turn views, triaged order submissions, and the
//! replay at the end.

use formic::game::{Game, GameConfig, GameStats, Map, PlayerId};
use formic::replay::Replay;

use super::CliError;
use super::bots::{BotKind, ScriptedBot};

/// Everything a finished driver run produces.
#[derive(Debug)]
pub(crate) struct PlayedGame {
    /// Final stats snapshot.
    pub(crate) stats: GameStats,
    /// The full replay summary.
    pub(crate) replay: Replay,
    /// Players sharing the top final score.
    pub(crate) winners: Vec<PlayerId>,
    /// Turns actually played.
    pub(crate) turns_played: u32,
}

/// Run one complete game between built-in bots.
///
/// `bot_kinds` must name one bot per player, or a single bot replicated
/// for everyone.
pub(crate) fn play_game(
    map_text: &str,
    config: GameConfig,
    bot_kinds: &[BotKind],
) -> Result<PlayedGame, CliError> {
    let parsed = Map::parse(map_text)?;
    let players = parsed.players;

    let kinds: Vec<BotKind> = match bot_kinds {
        [single] => vec![*single; players],
        kinds if kinds.len() == players => kinds.to_vec(),
        kinds => {
            return Err(CliError::new(format!(
                "map declares {players} players but {} bots were given",
                kinds.len()
            )));
        }
    };

    let mut game = Game::new(parsed, config)?;
    let mut bots: Vec<ScriptedBot> = kinds
        .iter()
        .enumerate()
        .map(|(index, &kind)| ScriptedBot::new(kind, index))
        .collect();

    for (p, bot) in bots.iter_mut().enumerate() {
        #[allow(clippy::cast_possible_truncation)]
        bot.setup(&game.get_player_start(p as PlayerId));
    }
    game.start_game();

    // finish_turn flags the turn limit itself; the extra bound is a
    // backstop against a misconfigured limit of zero
    for _ in 0..=config.turns {
        if game.game_over() {
            break;
        }
        game.start_turn();
        for (p, bot) in bots.iter_mut().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let player = p as PlayerId;
            if !game.is_alive(player) {
                continue;
            }
            let view = game.get_player_state(player);
            let lines = bot.orders(&view);
            let outcome = game.do_moves(player, &lines);
            if !outcome.invalid.is_empty() {
                log::warn!(
                    "player {player} submitted {} invalid orders: {:?}",
                    outcome.invalid.len(),
                    outcome.invalid.first()
                );
            }
        }
        game.finish_turn();
    }

    game.finish_game();

    let scores = game.get_scores(None);
    let top = scores.iter().max().copied().unwrap_or(0);
    let winners: Vec<PlayerId> = scores
        .iter()
        .enumerate()
        .filter(|&(_, score)| *score == top)
        .map(|(p, _)| PlayerId::try_from(p).unwrap_or(PlayerId::MAX))
        .collect();

    Ok(PlayedGame {
        stats: game.get_stats(),
        replay: game.get_replay(),
        winners,
        turns_played: game.turn(),
    })
}
