// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Minimal unsatisfiable subsets.

use std::collections::HashMap;

use crate::clause::{AuxVars, HS_PREFIX};
use crate::deadline::Deadline;
use crate::error::{EngineError, Result};
use crate::formula::Formula;
use crate::maxsat::{self, MaxSatAlgorithm};
use crate::sat::is_satisfiable;

/// MUS extraction strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MusAlgorithm {
    /// Drop formulas one by one while the rest stays unsatisfiable.
    Deletion,
    /// Grow a core by adding the formula that makes a prefix unsatisfiable.
    Insertion,
}

/// Indices of a minimal unsatisfiable subset of `formulas`, ascending.
pub fn mus(formulas: &[Formula], algorithm: MusAlgorithm, deadline: &Deadline) -> Result<Vec<usize>> {
    if is_satisfiable(formulas, deadline)? {
        return Err(EngineError::rejected("formula set is satisfiable"));
    }
    let mut core = match algorithm {
        MusAlgorithm::Deletion => deletion(formulas, deadline)?,
        MusAlgorithm::Insertion => insertion(formulas, deadline)?,
    };
    core.sort_unstable();
    Ok(core)
}

fn subset_satisfiable(formulas: &[Formula], indices: &[usize], deadline: &Deadline) -> Result<bool> {
    let subset: Vec<Formula> = indices.iter().map(|&i| formulas[i].clone()).collect();
    is_satisfiable(&subset, deadline)
}

fn deletion(formulas: &[Formula], deadline: &Deadline) -> Result<Vec<usize>> {
    let mut core: Vec<usize> = (0..formulas.len()).collect();
    let mut i = 0;
    while i < core.len() {
        let mut candidate = core.clone();
        candidate.remove(i);
        if subset_satisfiable(formulas, &candidate, deadline)? {
            i += 1;
        } else {
            core = candidate;
        }
    }
    Ok(core)
}

fn insertion(formulas: &[Formula], deadline: &Deadline) -> Result<Vec<usize>> {
    let mut core: Vec<usize> = Vec::new();
    let mut remaining: Vec<usize> = (0..formulas.len()).collect();
    while subset_satisfiable(formulas, &core, deadline)? {
        let mut prefix = core.clone();
        let mut transition = None;
        for (position, &index) in remaining.iter().enumerate() {
            prefix.push(index);
            if !subset_satisfiable(formulas, &prefix, deadline)? {
                transition = Some(position);
                break;
            }
        }
        let Some(position) = transition else {
            // the whole set is unsatisfiable, so a transition always exists
            return Err(EngineError::rejected("formula set is satisfiable"));
        };
        core.push(remaining[position]);
        remaining.truncate(position);
    }
    Ok(core)
}

/// Indices of a smallest unsatisfiable subset of `formulas`, ascending.
///
/// Implicit hitting set search: a minimum hitting set of the correction
/// sets found so far is either unsatisfiable, and then smallest, or grows
/// into a maximal satisfiable subset whose complement is a new correction
/// set.
pub fn smus(formulas: &[Formula], deadline: &Deadline) -> Result<Vec<usize>> {
    if is_satisfiable(formulas, deadline)? {
        return Err(EngineError::rejected("formula set is satisfiable"));
    }
    let picks = AuxVars::new(HS_PREFIX).fresh_n(formulas.len());
    let index: HashMap<&str, usize> = picks
        .iter()
        .enumerate()
        .map(|(i, pick)| (pick.name.as_str(), i))
        .collect();
    let soft: Vec<(Formula, i64)> = picks
        .iter()
        .map(|pick| (Formula::Lit(pick.negate()), 1))
        .collect();
    let mut corrections: Vec<Formula> = Vec::new();
    loop {
        let hitting = maxsat::solve(&corrections, &soft, MaxSatAlgorithm::LinearSu, deadline)?;
        let mut chosen: Vec<usize> = hitting
            .model
            .iter()
            .filter(|l| l.phase)
            .filter_map(|l| index.get(l.name.as_str()).copied())
            .collect();
        chosen.sort_unstable();
        if !subset_satisfiable(formulas, &chosen, deadline)? {
            return Ok(chosen);
        }
        let mut satisfiable = chosen;
        for i in 0..formulas.len() {
            if satisfiable.contains(&i) {
                continue;
            }
            satisfiable.push(i);
            if !subset_satisfiable(formulas, &satisfiable, deadline)? {
                satisfiable.pop();
            }
        }
        let correction = (0..formulas.len())
            .filter(|i| !satisfiable.contains(i))
            .map(|i| Formula::Lit(picks[i].clone()));
        corrections.push(Formula::or(correction));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_all;

    fn formulas(texts: &[&str]) -> Vec<Formula> {
        parse_all(texts.iter().copied()).unwrap()
    }

    #[test]
    fn test_deletion_and_insertion_agree() {
        let fs = formulas(&["~(A & B) => C | ~D", "~A | E", "A", "~E"]);
        let d = Deadline::unbounded();
        assert_eq!(mus(&fs, MusAlgorithm::Deletion, &d).unwrap(), vec![1, 2, 3]);
        assert_eq!(mus(&fs, MusAlgorithm::Insertion, &d).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_result_is_minimal() {
        let fs = formulas(&["A", "B", "~A | ~B", "~A", "C"]);
        let d = Deadline::unbounded();
        for algorithm in [MusAlgorithm::Deletion, MusAlgorithm::Insertion] {
            let core = mus(&fs, algorithm, &d).unwrap();
            let subset: Vec<Formula> = core.iter().map(|&i| fs[i].clone()).collect();
            assert!(!is_satisfiable(&subset, &d).unwrap());
            for skip in 0..subset.len() {
                let mut smaller = subset.clone();
                smaller.remove(skip);
                assert!(is_satisfiable(&smaller, &d).unwrap());
            }
        }
    }

    #[test]
    fn test_satisfiable_set_is_rejected() {
        let err = mus(&formulas(&["A", "B"]), MusAlgorithm::Deletion, &Deadline::unbounded())
            .unwrap_err();
        assert_eq!(err.to_string(), "formula set is satisfiable");
        let err = smus(&formulas(&["A", "B"]), &Deadline::unbounded()).unwrap_err();
        assert_eq!(err.to_string(), "formula set is satisfiable");
    }

    #[test]
    fn test_smallest_mus() {
        let fs = formulas(&["D", "~D", "A", "A => B", "B => C", "~C", "E"]);
        let d = Deadline::unbounded();
        assert_eq!(mus(&fs, MusAlgorithm::Deletion, &d).unwrap(), vec![2, 3, 4, 5]);
        assert_eq!(smus(&fs, &d).unwrap(), vec![0, 1]);
    }
}
