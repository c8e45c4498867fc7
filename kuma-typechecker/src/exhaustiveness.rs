//! Exhaustiveness analysis for switch expressions
//!
//! A switch over a union either has a default branch or covers every declared
//! case exactly once. A default branch next to full coverage is rejected as
//! unreachable.

use crate::error::ExprError;
use crate::types::{Symbol, Union};
use miette::SourceSpan;

/// Result of exhaustiveness analysis
#[derive(Debug, Clone, PartialEq)]
pub enum ExhaustivenessResult {
    /// Every case is handled by its own branch
    Exhaustive,
    /// A default branch handles what the case branches leave out
    CoveredByDefault,
    /// Cases with no branch and no default to fall back on
    Missing(Vec<Symbol>),
    /// A default branch that no value can reach
    SuperfluousDefault,
}

/// Branch coverage of one switch, filled in branch by branch
#[derive(Debug, Clone)]
pub struct CaseCoverage<'u> {
    union: &'u Union,
    checked: Vec<bool>,
    default_span: Option<Option<SourceSpan>>,
}

impl<'u> CaseCoverage<'u> {
    pub fn new(union: &'u Union) -> Self {
        Self {
            union,
            checked: vec![false; union.case_types.len()],
            default_span: None,
        }
    }

    /// Case index of `sym` within the union
    pub fn case_index(&self, sym: &Symbol) -> Option<usize> {
        self.union.case_types.iter().position(|c| &c.name == sym)
    }

    pub fn cover_case(&mut self, index: usize, span: Option<SourceSpan>) -> Result<(), ExprError> {
        match self.checked.get_mut(index) {
            Some(true) => Err(ExprError::CheckedBranch {
                case_name: self.union.case_types[index].name.to_string(),
                span,
            }),
            Some(slot) => {
                *slot = true;
                Ok(())
            }
            None => Err(ExprError::CheckedBranch {
                case_name: format!("#{}", index),
                span,
            }),
        }
    }

    pub fn cover_default(&mut self, span: Option<SourceSpan>) -> Result<(), ExprError> {
        if self.default_span.is_some() {
            return Err(ExprError::DuplicateDefaultBranch { span });
        }
        self.default_span = Some(span);
        Ok(())
    }

    pub fn analyze(&self) -> ExhaustivenessResult {
        let missing: Vec<Symbol> = self
            .union
            .case_types
            .iter()
            .zip(self.checked.iter())
            .filter(|(_, checked)| !**checked)
            .map(|(case, _)| case.name.clone())
            .collect();
        match (self.default_span.is_some(), missing.is_empty()) {
            (false, true) => ExhaustivenessResult::Exhaustive,
            (false, false) => ExhaustivenessResult::Missing(missing),
            (true, true) => ExhaustivenessResult::SuperfluousDefault,
            (true, false) => ExhaustivenessResult::CoveredByDefault,
        }
    }

    /// Turn the analysis into the diagnostic a switch at `switch_span` reports
    pub fn finish(&self, switch_span: Option<SourceSpan>) -> Result<(), ExprError> {
        match self.analyze() {
            ExhaustivenessResult::Exhaustive | ExhaustivenessResult::CoveredByDefault => Ok(()),
            ExhaustivenessResult::Missing(missing) => Err(ExprError::IncompleteMatch {
                missing: missing.iter().map(Symbol::to_string).collect(),
                span: switch_span,
            }),
            ExhaustivenessResult::SuperfluousDefault => Err(ExprError::SuperfluousDefaultBranch {
                span: self.default_span.flatten(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CaseType;
    use pretty_assertions::assert_eq;

    fn abc() -> Union {
        Union {
            case_types: ["A", "B", "C"]
                .iter()
                .map(|name| CaseType {
                    name: Symbol::new("m", *name),
                    params: Vec::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_missing_case_is_listed() {
        let union = abc();
        let mut coverage = CaseCoverage::new(&union);
        coverage.cover_case(0, None).unwrap();
        coverage.cover_case(1, None).unwrap();
        assert_eq!(
            coverage.analyze(),
            ExhaustivenessResult::Missing(vec![Symbol::new("m", "C")])
        );
        coverage.cover_case(2, None).unwrap();
        assert_eq!(coverage.analyze(), ExhaustivenessResult::Exhaustive);
    }

    #[test]
    fn test_default_completes_coverage() {
        let union = abc();
        let mut coverage = CaseCoverage::new(&union);
        coverage.cover_case(0, None).unwrap();
        coverage.cover_default(None).unwrap();
        assert_eq!(coverage.analyze(), ExhaustivenessResult::CoveredByDefault);
        assert!(matches!(
            coverage.cover_default(None),
            Err(ExprError::DuplicateDefaultBranch { .. })
        ));
    }

    #[test]
    fn test_duplicate_and_superfluous() {
        let union = abc();
        let mut coverage = CaseCoverage::new(&union);
        for i in 0..3 {
            coverage.cover_case(i, None).unwrap();
        }
        assert!(matches!(
            coverage.cover_case(1, None),
            Err(ExprError::CheckedBranch { .. })
        ));
        coverage.cover_default(None).unwrap();
        assert!(matches!(
            coverage.finish(None),
            Err(ExprError::SuperfluousDefaultBranch { .. })
        ));
    }
}
