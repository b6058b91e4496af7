//! Cached division order.
//!
//! Divisions are kept in load order; the sorted view is an index permutation
//! computed on first read and dropped by any load.
//!
//! Ordering is `sortIndex` ascending, then load position descending: of two
//! divisions with the same index, the one loaded later comes first, so a later
//! override file takes precedence.

use super::division::Division;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum SortState {
    #[default]
    Stale,
    Fresh(Vec<usize>),
}

impl SortState {
    pub(crate) fn invalidate(&mut self) {
        *self = SortState::Stale;
    }

    pub(crate) fn is_fresh(&self) -> bool {
        matches!(self, SortState::Fresh(_))
    }

    /// Returns the cached order, sorting first if stale.
    pub(crate) fn ensure(&mut self, divisions: &[Division]) -> &[usize] {
        if let SortState::Stale = self {
            let order = sort_order(divisions);
            tracing::debug!(divisions = order.len(), "sorted divisions");
            *self = SortState::Fresh(order);
        }

        match self {
            SortState::Fresh(order) => order,
            SortState::Stale => unreachable!("sort state refreshed above"),
        }
    }
}

pub(crate) fn sort_order(divisions: &[Division]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..divisions.len()).collect();
    order.sort_by(|&a, &b| divisions[a].sort_index.cmp(&divisions[b].sort_index).then_with(|| b.cmp(&a)));
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn division(name: &str, sort_index: i64) -> Division {
        Division { name: name.to_string(), sort_index, lite: false, versions: Vec::new(), user_agents: Vec::new() }
    }

    #[test]
    fn lower_index_first_then_latest_load() {
        let divisions = [division("D1", 5), division("D2", 5), division("D3", 1)];
        assert_eq!(sort_order(&divisions), [2, 1, 0]);
    }

    #[test]
    fn ensure_caches_until_invalidated() {
        let divisions = [division("A", 2), division("B", 1)];
        let mut state = SortState::default();
        assert!(!state.is_fresh());

        assert_eq!(state.ensure(&divisions), [1, 0]);
        assert!(state.is_fresh());
        assert_eq!(state, SortState::Fresh(vec![1, 0]));

        state.invalidate();
        assert_eq!(state, SortState::Stale);
    }
}
