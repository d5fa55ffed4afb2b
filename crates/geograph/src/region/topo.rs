use std::collections::VecDeque;

use ahash::AHashSet;

use crate::unit::UnitId;

use super::Region;

impl Region {
    /// Units of `units` reachable from `seed` by stepping between touching
    /// units that are themselves in `units`.  The result is sorted and
    /// includes `seed`.
    ///
    /// Returns `None` if `seed` is not a member of `units`.
    pub fn reachable_from(&self, seed: UnitId, units: impl IntoIterator<Item = UnitId>) -> Option<Vec<UnitId>> {
        let members: AHashSet<UnitId> = units.into_iter().collect();
        if !members.contains(&seed) { return None }

        let touching = self.touching();
        let mut seen = AHashSet::from_iter([seed]);
        let mut queue = VecDeque::from([seed]);
        while let Some(unit) = queue.pop_front() {
            for &next in touching.neighbors(unit) {
                if members.contains(&next) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        let mut out: Vec<UnitId> = seen.into_iter().collect();
        out.sort_unstable();
        Some(out)
    }

    /// Returns `true` if all units in `units` form a single connected
    /// component under contact adjacency.  An empty subset is contiguous.
    pub fn is_contiguous(&self, units: impl IntoIterator<Item = UnitId>) -> bool {
        self.connected_components(units).len() <= 1
    }

    /// Partition `units` into maximal connected components under contact
    /// adjacency.  Components are sorted internally and ordered by their
    /// smallest member.
    pub fn connected_components(&self, units: impl IntoIterator<Item = UnitId>) -> Vec<Vec<UnitId>> {
        let mut members: Vec<UnitId> = units.into_iter().collect();
        members.sort_unstable();
        members.dedup();

        let mut assigned = AHashSet::new();
        let mut components = Vec::new();
        for &unit in &members {
            if assigned.contains(&unit) { continue }
            let component = self.reachable_from(unit, members.iter().copied())
                .unwrap_or_default();
            assigned.extend(component.iter().copied());
            components.push(component);
        }
        components
    }
}
