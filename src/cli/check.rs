//! Check command: validate a map file.

use std::fs;
use std::path::PathBuf;

use formic::game::{Game, GameConfig, Map, detect_translations};

use super::CliError;

/// Execute the check command.
///
/// # Errors
///
/// Returns an error describing the first fatal problem with the map.
pub(crate) fn execute(map: PathBuf) -> Result<(), CliError> {
    let text = fs::read_to_string(&map)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", map.display())))?;

    let parsed = Map::parse(&text)?;
    let translations = detect_translations(&parsed.map, &parsed.hills, parsed.players);

    // Constructing the game runs the full fatal-validation path
    let summary = (
        parsed.map.rows(),
        parsed.map.cols(),
        parsed.players,
        parsed.hills.len(),
        parsed.map.land_area(),
    );
    Game::new(parsed, GameConfig::default())?;

    let (rows, cols, players, hills, land) = summary;
    println!("{}: ok", map.display());
    println!("  {rows}x{cols}, {players} players, {hills} hills, {land} land cells");
    match translations {
        Some(t) => println!("  translation symmetry: {t:?}"),
        None => println!("  no translation symmetry (symmetric food falls back to random)"),
    }

    Ok(())
}
