//! Order parsing, validation, and the movement resolver.
//!
//! Two-phase contract: the parse phase classifies raw lines and never
//! fails; the validate phase checks a parsed order against the current
//! board. The triage (`valid`, `ignored`, `invalid`) is reported back per
//! submission so bots can see their own mistakes. Only valid orders reach
//! the movement resolver.

use std::collections::HashMap;

use crate::game::PlayerId;
use crate::game::entities::Ants;
use crate::game::map::{Cell, Direction, Loc, Map};
use crate::game::vision::VisionEvent;

/// Triage result of one `do_moves` submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Accepted order lines, echoed back verbatim.
    pub valid: Vec<String>,
    /// Dropped-but-harmless lines with reasons (water/food destination).
    pub ignored: Vec<(String, String)>,
    /// Rejected lines with reasons.
    pub invalid: Vec<(String, String)>,
}

/// Parse and validate one submission for `player`.
///
/// `accepted` carries orders already accepted for this player this turn
/// (for duplicate detection across submissions) and receives the new ones,
/// keyed by source cell index.
pub(crate) fn triage_moves(
    map: &Map,
    ants: &Ants,
    player: PlayerId,
    lines: &[String],
    accepted: &mut HashMap<usize, Direction>,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();

    for raw in lines {
        let line = raw.trim();
        if line.is_empty() || line == "go" {
            continue;
        }
        // Bots may interleave comments; the engine skips them silently.
        if line.starts_with('#') {
            continue;
        }

        let order = match parse_line(line) {
            Ok(order) => order,
            Err(reason) => {
                outcome.invalid.push((line.to_string(), reason));
                continue;
            }
        };
        let (row, col, dir) = order;

        if row >= u32::from(map.rows()) || col >= u32::from(map.cols()) {
            outcome
                .invalid
                .push((line.to_string(), "out of bounds".to_string()));
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let loc = Loc::new(row as u16, col as u16);

        match ants.at(loc, map) {
            None => {
                outcome
                    .invalid
                    .push((line.to_string(), "no ant at location".to_string()));
                continue;
            }
            Some(id) if ants.get(id).owner != player => {
                outcome
                    .invalid
                    .push((line.to_string(), "not player's ant".to_string()));
                continue;
            }
            Some(_) => {}
        }

        let index = map.index(loc);
        if accepted.contains_key(&index) {
            outcome
                .invalid
                .push((line.to_string(), "duplicate order".to_string()));
            continue;
        }

        match map.get(map.destination(loc, dir)) {
            Cell::Water => {
                outcome
                    .ignored
                    .push((line.to_string(), "moving into water".to_string()));
                continue;
            }
            Cell::Food => {
                outcome
                    .ignored
                    .push((line.to_string(), "moving onto food".to_string()));
                continue;
            }
            Cell::Land | Cell::Ant(_) => {}
        }

        accepted.insert(index, dir);
        outcome.valid.push(line.to_string());
    }

    outcome
}

/// Parse `o <row> <col> <direction>`; errors are reasons, never panics.
fn parse_line(line: &str) -> Result<(u32, u32, Direction), String> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first() != Some(&"o") {
        return Err("unknown action".to_string());
    }
    if tokens.len() != 4 {
        return Err("incorrectly formatted order".to_string());
    }
    let row: u32 = tokens[1]
        .parse()
        .map_err(|_| "invalid row".to_string())?;
    let col: u32 = tokens[2]
        .parse()
        .map_err(|_| "invalid col".to_string())?;
    let mut chars = tokens[3].chars();
    let (ch, rest) = (chars.next(), chars.next());
    let dir = match (ch, rest) {
        (Some(ch), None) => Direction::from_char(ch),
        _ => None,
    }
    .ok_or_else(|| "invalid direction".to_string())?;
    Ok((row, col, dir))
}

/// Outcome of the movement phase.
#[derive(Debug, Clone, Default)]
pub(crate) struct MovementResult {
    /// Death records `(loc, owner)` from collisions, at the contested cell.
    pub(crate) deaths: Vec<(Loc, PlayerId)>,
    /// Vision changes in application order.
    pub(crate) events: Vec<VisionEvent>,
}

/// Resolve all movement simultaneously.
///
/// Every live ant computes its destination from its pre-move position; an
/// ant without an accepted order holds. Any destination claimed by more
/// than one ant (holders included) kills the whole group. Map cells are
/// rewritten only after every group is resolved, so the rule is symmetric
/// and order-independent.
pub(crate) fn resolve_movement(
    map: &mut Map,
    ants: &mut Ants,
    orders: &[HashMap<usize, Direction>],
    turn: u32,
) -> MovementResult {
    let mut result = MovementResult::default();

    struct Move {
        id: crate::game::entities::AntId,
        from: Loc,
        dest: Loc,
        dir: Option<Direction>,
    }

    // Phase 1: everyone picks a destination from pre-move state.
    let mut moves: Vec<Move> = Vec::new();
    for id in ants.live_ids().collect::<Vec<_>>() {
        let (from, owner) = {
            let ant = ants.get(id);
            (ant.loc, ant.owner)
        };
        let dir = orders[usize::from(owner)].get(&map.index(from)).copied();
        let dest = dir.map_or(from, |d| map.destination(from, d));
        ants.get_mut(id).orders.push(dir);
        moves.push(Move {
            id,
            from,
            dest,
            dir,
        });
    }

    // Phase 2: vacate all source cells.
    for m in &moves {
        ants.clear_cell(m.from, map);
        map.set(m.from, Cell::Land);
    }

    // Phase 3: group by destination; singletons survive, groups die.
    let mut claims: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, m) in moves.iter().enumerate() {
        claims.entry(map.index(m.dest)).or_default().push(i);
    }

    for m in &moves {
        let group = &claims[&map.index(m.dest)];
        let owner = ants.get(m.id).owner;
        if let Some(dir) = m.dir {
            result.events.push(VisionEvent::Moved {
                owner,
                from: m.from,
                dir,
            });
        }
        if group.len() == 1 {
            ants.get_mut(m.id).loc = m.dest;
            ants.set_cell(m.dest, m.id, map);
            map.set(m.dest, Cell::Ant(owner));
        } else {
            ants.get_mut(m.id).loc = m.dest;
            ants.kill(m.id, turn, map);
            result.deaths.push((m.dest, owner));
            result.events.push(VisionEvent::Died {
                owner,
                loc: m.dest,
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> (Map, Ants) {
        let map = Map::new(6, 6).unwrap();
        let ants = Ants::new(map.len());
        (map, ants)
    }

    fn place(map: &mut Map, ants: &mut Ants, loc: Loc, owner: PlayerId) {
        ants.spawn(loc, owner, 0, map);
        map.set(loc, Cell::Ant(owner));
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_triage_classifies() {
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(2, 2), 0);
        map.set(Loc::new(2, 3), Cell::Water);

        let mut accepted = HashMap::new();
        let outcome = triage_moves(
            &map,
            &ants,
            0,
            &lines(&[
                "o 2 2 n",     // valid
                "o 2 2 e",     // duplicate source... but also into water
                "o 9 9 n",     // out of bounds
                "o 1 1 n",     // no ant there
                "o two 2 n",   // bad row
                "o 2 2 q",     // bad direction
                "go",          // terminator, skipped
                "attack 2 2",  // unknown action
            ]),
            &mut accepted,
        );

        assert_eq!(outcome.valid, vec!["o 2 2 n"]);
        assert_eq!(accepted.len(), 1);
        // The duplicate is rejected before its water destination is looked at
        assert_eq!(outcome.invalid.len(), 6);
        assert!(outcome.invalid.iter().any(|(_, r)| r == "duplicate order"));
        assert!(outcome.invalid.iter().any(|(_, r)| r == "invalid direction"));
        assert!(outcome.invalid.iter().any(|(_, r)| r == "out of bounds"));
        assert!(outcome.invalid.iter().any(|(_, r)| r == "no ant at location"));
        assert!(outcome.invalid.iter().any(|(_, r)| r == "invalid row"));
        assert!(outcome.invalid.iter().any(|(_, r)| r == "unknown action"));
        assert!(outcome.ignored.is_empty());
    }

    #[test]
    fn test_water_and_food_destinations_are_ignored_not_invalid() {
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(2, 2), 0);
        map.set(Loc::new(1, 2), Cell::Water);
        map.set(Loc::new(3, 2), Cell::Food);

        let mut accepted = HashMap::new();
        let outcome = triage_moves(
            &map,
            &ants,
            0,
            &lines(&["o 2 2 n", "o 2 2 s"]),
            &mut accepted,
        );
        assert!(outcome.valid.is_empty());
        assert_eq!(outcome.ignored.len(), 2);
        assert!(accepted.is_empty());
    }

    #[test]
    fn test_foreign_ant_is_invalid() {
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(2, 2), 1);

        let mut accepted = HashMap::new();
        let outcome = triage_moves(&map, &ants, 0, &lines(&["o 2 2 n"]), &mut accepted);
        assert_eq!(outcome.invalid.len(), 1);
        assert_eq!(outcome.invalid[0].1, "not player's ant");
    }

    #[test]
    fn test_same_destination_kills_both() {
        // Two ants stepping onto the same middle cell both die
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(2, 1), 0);
        place(&mut map, &mut ants, Loc::new(2, 3), 1);

        let mut orders = vec![HashMap::new(), HashMap::new()];
        orders[0].insert(map.index(Loc::new(2, 1)), Direction::East);
        orders[1].insert(map.index(Loc::new(2, 3)), Direction::West);

        let result = resolve_movement(&mut map, &mut ants, &orders, 1);
        assert_eq!(result.deaths.len(), 2);
        assert!(result.deaths.iter().all(|&(loc, _)| loc == Loc::new(2, 2)));
        assert_eq!(map.get(Loc::new(2, 2)), Cell::Land);
        assert_eq!(ants.live_count(0), 0);
        assert_eq!(ants.live_count(1), 0);
    }

    #[test]
    fn test_holder_dies_with_incoming_ant() {
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(2, 2), 0); // holds
        place(&mut map, &mut ants, Loc::new(2, 3), 1); // moves west onto it
        place(&mut map, &mut ants, Loc::new(5, 5), 1); // bystander

        let mut orders = vec![HashMap::new(), HashMap::new()];
        orders[1].insert(map.index(Loc::new(2, 3)), Direction::West);

        let result = resolve_movement(&mut map, &mut ants, &orders, 1);
        assert_eq!(result.deaths.len(), 2);
        assert_eq!(ants.live_count(0), 0);
        // The bystander is unaffected
        assert_eq!(ants.live_count(1), 1);
        assert_eq!(map.get(Loc::new(5, 5)), Cell::Ant(1));
    }

    #[test]
    fn test_follow_the_leader_survives() {
        // A column of ants all stepping north is collision-free
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(1, 0), 0);
        place(&mut map, &mut ants, Loc::new(2, 0), 0);
        place(&mut map, &mut ants, Loc::new(3, 0), 0);

        let mut orders = vec![HashMap::new()];
        for row in [1u16, 2, 3] {
            orders[0].insert(map.index(Loc::new(row, 0)), Direction::North);
        }

        let result = resolve_movement(&mut map, &mut ants, &orders, 1);
        assert!(result.deaths.is_empty());
        assert_eq!(ants.live_count(0), 3);
        assert_eq!(map.get(Loc::new(0, 0)), Cell::Ant(0));
        assert_eq!(map.get(Loc::new(3, 0)), Cell::Land);
    }

    #[test]
    fn test_hold_records_dash_in_order_history() {
        let (mut map, mut ants) = board();
        place(&mut map, &mut ants, Loc::new(4, 4), 0);
        let orders = vec![HashMap::new()];
        resolve_movement(&mut map, &mut ants, &orders, 1);
        let id = ants.at(Loc::new(4, 4), &map).unwrap();
        assert_eq!(ants.get(id).order_string(), "-");
    }
}
