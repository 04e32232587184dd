//! Translation-symmetry detection over hills.
//!
//! A pure setup-time function: the food spawner consumes the result, and
//! nothing here runs on the turn-critical path. Only torus translations are
//! searched; maps built by the contest generators carry at least one, and a
//! map without one simply falls back to random food placement.

use std::collections::HashSet;

use crate::game::PlayerId;
use crate::game::map::{Cell, Loc, Map};

/// A torus translation, in cells, normalized to `0..rows` / `0..cols`.
pub type Translation = (i32, i32);

/// Find per-player translations mapping player 0's hills onto each other
/// player's hills while leaving terrain invariant.
///
/// Returns one translation per player (player 0's is `(0, 0)`), or `None`
/// when the map has no such symmetry (including unequal hill counts).
#[must_use]
pub fn detect_translations(
    map: &Map,
    hills: &[(Loc, PlayerId)],
    players: usize,
) -> Option<Vec<Translation>> {
    let mut per_player: Vec<Vec<Loc>> = vec![Vec::new(); players];
    for &(loc, owner) in hills {
        per_player[usize::from(owner)].push(loc);
    }
    let base = per_player.first()?.clone();
    if base.is_empty() || per_player.iter().any(|h| h.len() != base.len()) {
        return None;
    }

    let mut translations = Vec::with_capacity(players);
    translations.push((0, 0));
    for theirs in per_player.iter().skip(1) {
        let delta = find_translation(map, &base, theirs)?;
        translations.push(delta);
    }
    Some(translations)
}

/// Try every anchor pairing of `base[0]` against `theirs` and return the
/// first translation that maps the whole set and preserves terrain.
fn find_translation(map: &Map, base: &[Loc], theirs: &[Loc]) -> Option<Translation> {
    let target: HashSet<Loc> = theirs.iter().copied().collect();
    for &anchor in theirs {
        let delta = (
            (i32::from(anchor.row) - i32::from(base[0].row)).rem_euclid(i32::from(map.rows())),
            (i32::from(anchor.col) - i32::from(base[0].col)).rem_euclid(i32::from(map.cols())),
        );
        let maps_hills = base
            .iter()
            .all(|&loc| target.contains(&map.translate(loc, delta)));
        if maps_hills && terrain_invariant(map, delta) {
            return Some(delta);
        }
    }
    None
}

/// Water must map to water and land to land under the translation.
fn terrain_invariant(map: &Map, delta: Translation) -> bool {
    map.iter().all(|(loc, cell)| {
        let image = map.get(map.translate(loc, delta));
        (cell == Cell::Water) == (image == Cell::Water)
    })
}
