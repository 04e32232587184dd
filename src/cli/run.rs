//! Run command implementation.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;

use formic::game::GameConfig;

use super::bots::BotKind;
use super::driver::play_game;
use super::{CliError, CombatArg, FoodArg, OutputFormat};

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
struct JsonGameResult {
    engine_seed: u64,
    player_seed: u64,
    turns_played: u32,
    cutoff: String,
    winners: Vec<u8>,
    players: Vec<JsonPlayerResult>,
}

/// JSON-serializable player result.
#[derive(Debug, Serialize)]
struct JsonPlayerResult {
    id: u8,
    bot: String,
    score: i64,
    ants: usize,
    alive: bool,
}

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the map cannot be read or the game cannot start.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    map: PathBuf,
    bots: Vec<BotKind>,
    seed: Option<u64>,
    player_seed: Option<u64>,
    turns: Option<u32>,
    combat: CombatArg,
    food: FoodArg,
    format: OutputFormat,
    save_replay: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let map_text = fs::read_to_string(&map)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", map.display())))?;

    // The two streams stay independent: separate clock reads, never one
    // derived from the other
    let engine_seed = seed.unwrap_or_else(time_seed);
    let player_seed = player_seed.unwrap_or_else(time_seed);

    let mut config = GameConfig {
        engine_seed,
        player_seed,
        combat: combat.into(),
        food_placement: food.into(),
        ..GameConfig::default()
    };
    if let Some(turns) = turns {
        config.turns = turns;
    }

    if !quiet {
        println!("Running {} with engine seed {engine_seed}...", map.display());
    }

    let played = play_game(&map_text, config, &bots)?;

    if let Some(path) = save_replay {
        played.replay.save(&path).map_err(|e| {
            CliError::new(format!("Failed to save replay: {e}"))
        })?;
        if !quiet {
            println!("Replay saved to {}", path.display());
        }
    }

    match format {
        OutputFormat::Text => {
            println!("Game over after {} turns: {}", played.turns_played, played.stats.cutoff.as_deref().unwrap_or("unknown"));
            if let [winner] = played.winners.as_slice() {
                println!("Winner: player {winner}");
            } else {
                let list: Vec<String> =
                    played.winners.iter().map(ToString::to_string).collect();
                println!("Draw between players {}", list.join(", "));
            }
            println!();
            println!("{:>6} {:>12} {:>8} {:>6} {:>6}", "player", "bot", "score", "ants", "alive");
            for (p, score) in played.stats.scores.iter().enumerate() {
                println!(
                    "{:>6} {:>12} {:>8} {:>6} {:>6}",
                    p,
                    bot_name(&bots, p),
                    score,
                    played.stats.ant_count[p],
                    played.stats.alive[p]
                );
            }
        }
        OutputFormat::Json => {
            let result = JsonGameResult {
                engine_seed,
                player_seed,
                turns_played: played.turns_played,
                cutoff: played.stats.cutoff.clone().unwrap_or_default(),
                winners: played.winners.clone(),
                players: played
                    .stats
                    .scores
                    .iter()
                    .enumerate()
                    .map(|(p, score)| {
                        #[allow(clippy::cast_possible_truncation)]
                        let id = p as u8;
                        JsonPlayerResult {
                            id,
                            bot: bot_name(&bots, p),
                            score: *score,
                            ants: played.stats.ant_count[p],
                            alive: played.stats.alive[p],
                        }
                    })
                    .collect(),
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

fn bot_name(bots: &[BotKind], player: usize) -> String {
    let kind = if bots.len() == 1 { bots[0] } else { bots[player] };
    format!("{kind:?}").to_lowercase()
}

fn time_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(42)
}
