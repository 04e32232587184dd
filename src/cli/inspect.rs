//! Inspect command: summarize a saved replay.

use std::path::PathBuf;

use formic::replay::Replay;

use super::CliError;

/// Execute the inspect command.
///
/// # Errors
///
/// Returns an error if the replay cannot be read or parsed.
pub(crate) fn execute(replay: PathBuf, turn: Option<u32>) -> Result<(), CliError> {
    let replay = Replay::load(&replay)
        .map_err(|e| CliError::new(format!("Failed to load replay: {e}")))?;

    if let Some(turn) = turn {
        // Reconstruct and print one turn's full state
        print!("{}", replay.render_state(turn));
        return Ok(());
    }

    println!(
        "{} players on {}x{}, ended turn {}: {}",
        replay.players, replay.map.rows, replay.map.cols, replay.winning_turn, replay.cutoff
    );
    println!(
        "{} ants lived, {} food items, {} hills ({} razed)",
        replay.ants.len(),
        replay.food.len(),
        replay.hills.len(),
        replay.hills.iter().filter(|h| h.razed_turn.is_some()).count()
    );
    println!();
    println!("{:>6} {:>8} {:>6}", "player", "score", "bonus");
    for (p, score) in replay.final_scores().iter().enumerate() {
        println!("{:>6} {:>8} {:>6}", p, score, replay.bonus[p]);
    }

    Ok(())
}
