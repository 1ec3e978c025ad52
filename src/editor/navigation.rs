//! Which cached units surround the one being edited

use super::cache::UnitPageCache;
use crate::model::UnitId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Neighbors {
    /// Units shown above the edit row, in document order
    pub before: Vec<UnitId>,
    pub after: Vec<UnitId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    /// Message reported when there is no unit in this direction
    pub fn end_message(&self) -> &'static str {
        match self {
            Self::Previous => "You reached the beginning of the list",
            Self::Next => "You reached the end of the list",
        }
    }
}

/// Context rows per side for a page size
pub fn context_limit(per_page: u32) -> usize {
    (per_page.saturating_sub(1) / 2) as usize
}

fn step(cache: &UnitPageCache, uid: UnitId, direction: Direction) -> Option<UnitId> {
    let unit = cache.unit(uid)?;
    let link = match direction {
        Direction::Previous => unit.prev,
        Direction::Next => unit.next,
    }?;
    cache.contains(link).then_some(link)
}

fn walk(
    cache: &UnitPageCache,
    from: UnitId,
    direction: Direction,
    count: usize,
    out: &mut Vec<UnitId>,
) {
    let mut current = from;
    for _ in 0..count {
        match step(cache, current, direction) {
            Some(next) => {
                out.push(next);
                current = next;
            }
            None => break,
        }
    }
}

/// Up to `limit` cached neighbours per side; a short side lends its unused rows to the other
pub fn neighbors(cache: &UnitPageCache, uid: UnitId, per_page: u32) -> Neighbors {
    let limit = context_limit(per_page);
    let mut before = Vec::new();
    let mut after = Vec::new();

    if !cache.contains(uid) {
        return Neighbors::default();
    }

    walk(cache, uid, Direction::Previous, limit, &mut before);
    walk(cache, uid, Direction::Next, limit, &mut after);

    if cache.len() > limit {
        if after.len() < limit {
            let deficit = limit - after.len();
            let from = before.last().copied().unwrap_or(uid);
            walk(cache, from, Direction::Previous, deficit, &mut before);
        }
        if before.len() < limit {
            let deficit = limit - before.len();
            let from = after.last().copied().unwrap_or(uid);
            walk(cache, from, Direction::Next, deficit, &mut after);
        }
    }

    before.reverse();
    Neighbors { before, after }
}

/// Linked unit in `direction`, or `None` at the edge of the result set
pub fn adjacent(cache: &UnitPageCache, uid: UnitId, direction: Direction) -> Option<UnitId> {
    let unit = cache.unit(uid)?;
    match direction {
        Direction::Previous => unit.prev,
        Direction::Next => unit.next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Unit;

    fn chain(cache: &mut UnitPageCache, page: u32, ids: &[UnitId], first: Option<UnitId>, last: Option<UnitId>) {
        let units = ids
            .iter()
            .enumerate()
            .map(|(i, &id)| Unit {
                id,
                prev: if i == 0 { first } else { Some(ids[i - 1]) },
                next: if i + 1 == ids.len() { last } else { Some(ids[i + 1]) },
                ..Default::default()
            })
            .collect();
        cache.record_page(page, units);
    }

    #[test]
    fn test_context_limit() {
        assert_eq!(context_limit(10), 4);
        assert_eq!(context_limit(9), 4);
        assert_eq!(context_limit(1), 0);
        assert_eq!(context_limit(0), 0);
    }

    #[test]
    fn test_neighbors_in_the_middle() {
        let mut cache = UnitPageCache::new();
        chain(&mut cache, 1, &[1, 2, 3, 4, 5, 6, 7, 8, 9], None, None);
        let n = neighbors(&cache, 5, 5);
        assert_eq!(n.before, vec![3, 4]);
        assert_eq!(n.after, vec![6, 7]);
    }

    #[test]
    fn test_short_side_lends_rows_from_cache() {
        let mut cache = UnitPageCache::new();
        chain(&mut cache, 1, &[1, 2, 3, 4, 5, 6], None, None);
        let n = neighbors(&cache, 1, 5);
        assert!(n.before.is_empty());
        assert_eq!(n.after, vec![2, 3, 4, 5]);

        let n = neighbors(&cache, 6, 5);
        assert_eq!(n.before, vec![2, 3, 4, 5]);
        assert!(n.after.is_empty());
    }

    #[test]
    fn test_unknown_links_are_not_followed() {
        let mut cache = UnitPageCache::new();
        // Unit 3 points at 4 which has not been fetched
        chain(&mut cache, 1, &[1, 2, 3], None, Some(4));
        let n = neighbors(&cache, 3, 5);
        assert_eq!(n.before, vec![1, 2]);
        assert!(n.after.is_empty());
    }

    #[test]
    fn test_adjacent() {
        let mut cache = UnitPageCache::new();
        chain(&mut cache, 1, &[1, 2], None, None);
        assert_eq!(adjacent(&cache, 1, Direction::Next), Some(2));
        assert_eq!(adjacent(&cache, 2, Direction::Next), None);
        assert_eq!(adjacent(&cache, 1, Direction::Previous), None);
    }
}
