//! Selfplay command: mass parallel games with aggregate statistics.
//!
//! Each game is an independent engine instance, so the whole batch runs
//! embarrassingly parallel under rayon. Seeds increment from the base so a
//! batch is reproducible and any single game can be re-run alone.

use std::fs;
use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use formic::game::GameConfig;

use super::bots::BotKind;
use super::driver::play_game;
use super::{CliError, CombatArg, FoodArg};

/// Execute the selfplay command.
///
/// # Errors
///
/// Returns an error if the map cannot be read, the thread pool cannot be
/// built, or every game fails.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    map: PathBuf,
    bots: Vec<BotKind>,
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    combat: CombatArg,
    food: FoodArg,
    progress: bool,
) -> Result<(), CliError> {
    let map_text = fs::read_to_string(&map)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", map.display())))?;
    let base_seed = seed.unwrap_or(1);

    if let Some(threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| CliError::new(format!("Failed to build thread pool: {e}")))?;
    }

    let bar = if progress {
        let bar = ProgressBar::new(games);
        bar.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} games {eta}")
                .map_err(|e| CliError::new(e.to_string()))?,
        );
        bar
    } else {
        ProgressBar::hidden()
    };

    let results: Vec<_> = (0..games)
        .into_par_iter()
        .map(|i| {
            // Both streams increment per game but come from unrelated bases
            let config = GameConfig {
                engine_seed: base_seed.wrapping_add(i),
                player_seed: 0x9e37_79b9_7f4a_7c15u64.wrapping_add(i),
                combat: combat.into(),
                food_placement: food.into(),
                ..GameConfig::default()
            };
            let outcome = play_game(&map_text, config, &bots);
            bar.inc(1);
            outcome
        })
        .collect();
    bar.finish_and_clear();

    let mut wins: Vec<u64> = Vec::new();
    let mut draws = 0u64;
    let mut failures = 0u64;
    let mut total_turns = 0u64;
    let mut finished = 0u64;

    for result in results {
        match result {
            Ok(played) => {
                if wins.is_empty() {
                    wins = vec![0; played.stats.scores.len()];
                }
                match played.winners.as_slice() {
                    [single] => wins[usize::from(*single)] += 1,
                    _ => draws += 1,
                }
                total_turns += u64::from(played.turns_played);
                finished += 1;
            }
            Err(e) => {
                log::warn!("game failed: {e}");
                failures += 1;
            }
        }
    }

    if finished == 0 {
        return Err(CliError::new("every game in the batch failed"));
    }

    println!("{finished} games finished ({failures} failed)");
    #[allow(clippy::cast_precision_loss)]
    let avg = total_turns as f64 / finished as f64;
    println!("average length: {avg:.1} turns");
    println!();
    println!("{:>6} {:>12} {:>6} {:>7}", "player", "bot", "wins", "rate");
    for (p, wins) in wins.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let rate = *wins as f64 / finished as f64 * 100.0;
        let kind = if bots.len() == 1 { bots[0] } else { bots[p] };
        println!(
            "{:>6} {:>12} {:>6} {:>6.1}%",
            p,
            format!("{kind:?}").to_lowercase(),
            wins,
            rate
        );
    }
    println!("{draws} draws");

    Ok(())
}
