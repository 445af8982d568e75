// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Variable renaming and substitution.

use std::collections::HashMap;

use crate::error::{EngineError, Result};
use crate::formula::{Formula, Literal};

/// Renames variables to `<prefix><n>`, numbered by first occurrence.
///
/// One anonymizer keeps its numbering across calls, so the same variable
/// gets the same name in every formula it processes.
#[derive(Debug, Clone)]
pub struct Anonymizer {
    prefix: String,
    names: HashMap<String, String>,
}

impl Anonymizer {
    /// Anonymizer with an empty numbering.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            names: HashMap::new(),
        }
    }

    /// Anonymize one formula.
    pub fn anonymize(&mut self, formula: &Formula) -> Formula {
        for name in formula.variables() {
            let next = self.names.len();
            let prefix = &self.prefix;
            self.names
                .entry(name)
                .or_insert_with(|| format!("{prefix}{next}"));
        }
        rename(formula, &|literal| {
            let name = self.names.get(&literal.name).unwrap_or(&literal.name);
            Formula::lit(name.clone(), literal.phase)
        })
    }
}

/// Replacement of variables by formulas.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    map: HashMap<String, Formula>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `replace`, which must be a single positive variable, to `with`.
    pub fn insert(&mut self, replace: &Formula, with: Formula) -> Result<()> {
        match replace {
            Formula::Lit(Literal { name, phase: true }) => {
                self.map.insert(name.clone(), with);
                Ok(())
            }
            _ => Err(EngineError::rejected("replace must be a single variable")),
        }
    }

    /// Apply to a formula. Negative literals receive the negated replacement.
    pub fn apply(&self, formula: &Formula) -> Formula {
        rename(formula, &|literal| match self.map.get(&literal.name) {
            Some(with) if literal.phase => with.clone(),
            Some(with) => Formula::not(with.clone()),
            None => Formula::Lit(literal.clone()),
        })
    }
}

/// Rebuild `formula` with every literal replaced by `f(literal)`.
fn rename(formula: &Formula, f: &impl Fn(&Literal) -> Formula) -> Formula {
    match formula {
        Formula::True | Formula::False => formula.clone(),
        Formula::Lit(l) => f(l),
        Formula::Not(op) => Formula::not(rename(op, f)),
        Formula::Impl(a, b) => Formula::implication(rename(a, f), rename(b, f)),
        Formula::Equiv(a, b) => Formula::equivalence(rename(a, f), rename(b, f)),
        Formula::And(ops) => Formula::and(ops.iter().map(|op| rename(op, f))),
        Formula::Or(ops) => Formula::or(ops.iter().map(|op| rename(op, f))),
        Formula::Pbc(pbc) => {
            // PB terms can only hold literals; anything else goes through expansion
            let mut terms = Vec::with_capacity(pbc.terms.len());
            for (coefficient, literal) in &pbc.terms {
                match f(literal) {
                    Formula::Lit(l) => terms.push((*coefficient, l)),
                    _ => return rename(&crate::pseudo::expand(pbc), f),
                }
            }
            Formula::pbc(terms, pbc.comparator, pbc.rhs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_anonymize() {
        let mut anonymizer = Anonymizer::new("v");
        let f = parse("~(A & B => ~C <=> D)").unwrap();
        assert_eq!(anonymizer.anonymize(&f).to_string(), "~(v0 & v1 => ~v2 <=> v3)");
        let g = parse("E | A").unwrap();
        assert_eq!(anonymizer.anonymize(&g).to_string(), "v4 | v0");
    }

    #[test]
    fn test_anonymize_prefix_and_pbc() {
        let mut anonymizer = Anonymizer::new("var");
        let f = parse("2*B + ~A >= 1").unwrap();
        assert_eq!(anonymizer.anonymize(&f).to_string(), "2*var0 + ~var1 >= 1");
    }

    #[test]
    fn test_substitute() {
        let mut substitution = Substitution::new();
        substitution.insert(&parse("A").unwrap(), parse("X & ~Y").unwrap()).unwrap();
        substitution.insert(&parse("D").unwrap(), parse("~P").unwrap()).unwrap();
        let f = parse("~(A & B) => C <=> ~D").unwrap();
        assert_eq!(substitution.apply(&f).to_string(), "~(X & ~Y & B) => C <=> P");
    }

    #[test]
    fn test_replace_must_be_variable() {
        let mut substitution = Substitution::new();
        for replace in ["~A", "A & B", "$true"] {
            let err = substitution
                .insert(&parse(replace).unwrap(), Formula::True)
                .unwrap_err();
            assert_eq!(err.to_string(), "replace must be a single variable");
        }
    }

    #[test]
    fn test_substitution_into_pbc() {
        let mut substitution = Substitution::new();
        substitution.insert(&parse("A").unwrap(), parse("B").unwrap()).unwrap();
        assert_eq!(
            substitution.apply(&parse("A + C <= 1").unwrap()).to_string(),
            "B + C <= 1"
        );
        substitution.insert(&parse("C").unwrap(), parse("X & Y").unwrap()).unwrap();
        assert!(!substitution.apply(&parse("A + C <= 1").unwrap()).to_string().contains('+'));
    }
}
