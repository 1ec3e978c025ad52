//! In-memory cache of fetched view pages

use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::model::{Unit, UnitId};

#[derive(Debug, Default)]
pub struct UnitPageCache {
    /// Page number -> unit ids in display order
    pages: BTreeMap<u32, Vec<UnitId>>,
    units: HashMap<UnitId, Unit>,
    page_of: HashMap<UnitId, u32>,
}

impl UnitPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a fetched page; units already known are merged rather than duplicated
    pub fn record_page(&mut self, page: u32, units: Vec<Unit>) {
        let mut ids = Vec::with_capacity(units.len());

        for unit in units {
            let id = unit.id;
            if let Some(old_page) = self.page_of.insert(id, page)
                && old_page != page
                && let Some(old_ids) = self.pages.get_mut(&old_page)
            {
                old_ids.retain(|u| *u != id);
            }

            match self.units.get_mut(&id) {
                Some(existing) => existing.merge(unit),
                None => {
                    self.units.insert(id, unit);
                }
            }
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        if let Some(stale) = self.pages.get(&page) {
            for id in stale.iter().filter(|id| !ids.contains(id)) {
                if self.page_of.get(id) == Some(&page) {
                    self.page_of.remove(id);
                }
            }
        }

        debug!("cached page {} with {} units", page, ids.len());
        self.pages.insert(page, ids);
        self.pages.retain(|_, ids| !ids.is_empty());
    }

    /// Fills missing prev/next links across page boundaries where both pages are cached
    pub fn link_adjacent_pages(&mut self, num_pages: u32) {
        let mut links: Vec<(UnitId, Option<UnitId>, Option<UnitId>)> = Vec::new();

        for (&page, ids) in &self.pages {
            let (Some(&first), Some(&last)) = (ids.first(), ids.last()) else {
                continue;
            };

            if page > 1
                && self.units.get(&first).is_some_and(|u| u.prev.is_none())
                && let Some(prev_last) = self.pages.get(&(page - 1)).and_then(|p| p.last())
            {
                links.push((first, Some(*prev_last), None));
            }

            if page < num_pages
                && self.units.get(&last).is_some_and(|u| u.next.is_none())
                && let Some(next_first) = self.pages.get(&(page + 1)).and_then(|p| p.first())
            {
                links.push((last, None, Some(*next_first)));
            }
        }

        for (id, prev, next) in links {
            if let Some(unit) = self.units.get_mut(&id) {
                if prev.is_some() {
                    unit.prev = prev;
                }
                if next.is_some() {
                    unit.next = next;
                }
            }
        }
    }

    pub fn evict_all(&mut self) {
        self.pages.clear();
        self.units.clear();
        self.page_of.clear();
    }

    pub fn has_page(&self, page: u32) -> bool {
        self.pages.contains_key(&page)
    }

    pub fn page(&self, page: u32) -> Option<&[UnitId]> {
        self.pages.get(&page).map(Vec::as_slice)
    }

    pub fn page_of(&self, uid: UnitId) -> Option<u32> {
        self.page_of.get(&uid).copied()
    }

    pub fn unit(&self, uid: UnitId) -> Option<&Unit> {
        self.units.get(&uid)
    }

    pub fn unit_mut(&mut self, uid: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&uid)
    }

    pub fn contains(&self, uid: UnitId) -> bool {
        self.units.contains_key(&uid)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn cached_pages(&self) -> Vec<u32> {
        self.pages.keys().copied().collect()
    }

    /// Neighbouring pages worth prefetching around `current`, in fetch order
    pub fn pages_to_fetch(&self, current: u32, num_pages: u32) -> Vec<u32> {
        [Some(current), current.checked_add(1), current.checked_sub(1)]
            .into_iter()
            .flatten()
            .filter(|&p| p > 0 && p <= num_pages && !self.has_page(p))
            .collect()
    }
}
