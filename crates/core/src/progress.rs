//! Module lock rule and course progress percentage.
//!
//! A module at position `i` (modules sorted by order index ascending) is
//! locked iff `i > 0` and some module before it is not completed. Progress
//! is `round(100 * completed / total)` over the whole course, `0` for an
//! empty course.

use std::collections::HashSet;

use serde::Serialize;

use crate::types::DbId;

/// Position data needed to evaluate the lock rule for one module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleOrder {
    pub module_id: DbId,
    pub order_index: i32,
}

/// Lock and completion state of one module for one learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleLockState {
    pub module_id: DbId,
    pub order_index: i32,
    pub locked: bool,
    pub completed: bool,
}

/// Evaluate the lock rule for every module of a course.
///
/// `modules` may arrive in any order; the result is sorted by order index
/// (row key breaks ties). Completion of a module does not unlock it: a
/// module completed out of sequence is still reported locked if an earlier
/// one is incomplete.
pub fn lock_state(modules: &[ModuleOrder], completed: &HashSet<DbId>) -> Vec<ModuleLockState> {
    let mut ordered = modules.to_vec();
    ordered.sort_by_key(|m| (m.order_index, m.module_id));

    let mut all_previous_completed = true;
    ordered
        .into_iter()
        .map(|m| {
            let is_completed = completed.contains(&m.module_id);
            let state = ModuleLockState {
                module_id: m.module_id,
                order_index: m.order_index,
                locked: !all_previous_completed,
                completed: is_completed,
            };
            all_previous_completed &= is_completed;
            state
        })
        .collect()
}

/// Percentage of completed modules, rounded half up. `0` when `total == 0`.
pub fn progress_percentage(completed: usize, total: usize) -> i16 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total) as u64;
    let total = total as u64;
    ((200 * completed + total) / (2 * total)) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modules(ids: &[(DbId, i32)]) -> Vec<ModuleOrder> {
        ids.iter()
            .map(|&(module_id, order_index)| ModuleOrder {
                module_id,
                order_index,
            })
            .collect()
    }

    #[test]
    fn first_module_is_never_locked() {
        let states = lock_state(&modules(&[(1, 0), (2, 1)]), &HashSet::new());
        assert!(!states[0].locked);
        assert!(states[1].locked);
    }

    #[test]
    fn completing_out_of_order_keeps_later_modules_locked() {
        // A, B, C with only B completed.
        let completed: HashSet<DbId> = [20].into_iter().collect();
        let states = lock_state(&modules(&[(10, 0), (20, 1), (30, 2)]), &completed);

        assert!(!states[0].locked);
        assert!(!states[0].completed);
        assert!(states[1].completed);
        assert!(states[2].locked);
    }

    #[test]
    fn sequential_completion_unlocks_next() {
        let completed: HashSet<DbId> = [10, 20].into_iter().collect();
        let states = lock_state(&modules(&[(30, 2), (10, 0), (20, 1), (40, 3)]), &completed);

        let locked: Vec<bool> = states.iter().map(|s| s.locked).collect();
        assert_eq!(locked, vec![false, false, false, true]);
        assert_eq!(states[0].module_id, 10);
    }

    #[test]
    fn gaps_in_order_index_do_not_matter() {
        let completed: HashSet<DbId> = [1].into_iter().collect();
        let states = lock_state(&modules(&[(1, 5), (2, 50), (3, 500)]), &completed);
        assert!(!states[1].locked);
        assert!(states[2].locked);
    }

    #[test]
    fn lock_rule_matches_definition_exhaustively() {
        // Every completion subset of a four-module course.
        let ms = modules(&[(1, 0), (2, 1), (3, 2), (4, 3)]);
        for mask in 0u8..16 {
            let completed: HashSet<DbId> = (0..4i64)
                .filter(|b| mask & (1u8 << *b) != 0)
                .map(|b| b + 1)
                .collect();
            let states = lock_state(&ms, &completed);
            for (i, state) in states.iter().enumerate() {
                let expected = states[..i].iter().any(|s| !s.completed);
                assert_eq!(state.locked, expected, "mask {mask:04b}, position {i}");
            }
        }
    }

    #[test]
    fn empty_course_has_zero_progress() {
        assert_eq!(progress_percentage(0, 0), 0);
        assert!(lock_state(&[], &HashSet::new()).is_empty());
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(progress_percentage(1, 3), 33);
        assert_eq!(progress_percentage(2, 3), 67);
        assert_eq!(progress_percentage(1, 8), 13);
        assert_eq!(progress_percentage(3, 3), 100);
    }

    #[test]
    fn percentage_is_clamped_to_total() {
        assert_eq!(progress_percentage(5, 4), 100);
    }
}
