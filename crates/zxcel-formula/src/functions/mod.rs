//! Built-in aggregate functions

pub mod aggregate;
pub mod criteria;

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{EvaluationContext, FormulaValue};
use ahash::AHashMap;

/// Signature shared by every built-in
pub type FunctionImpl = fn(&[FormulaValue], &EvaluationContext) -> FormulaResult<FormulaValue>;

/// A built-in function and its calling convention
#[derive(Clone, Copy)]
pub struct FunctionDef {
    /// Canonical uppercase name
    pub name: &'static str,
    pub min_args: usize,
    /// `None` when the function is variadic
    pub max_args: Option<usize>,
    pub implementation: FunctionImpl,
    /// Index of the criteria argument, where a bare word is taken as text
    pub criteria_arg: Option<usize>,
}

impl FunctionDef {
    /// Reject a call with too few or too many arguments
    pub fn check_arity(&self, given: usize) -> FormulaResult<()> {
        let expected = if given < self.min_args {
            format!("at least {}", self.min_args)
        } else if let Some(max) = self.max_args.filter(|max| given > *max) {
            format!("at most {}", max)
        } else {
            return Ok(());
        };

        Err(FormulaError::ArgumentCount {
            function: self.name.to_string(),
            expected,
            actual: given,
        })
    }
}

const fn variadic(name: &'static str, implementation: FunctionImpl) -> FunctionDef {
    FunctionDef {
        name,
        min_args: 1,
        max_args: None,
        implementation,
        criteria_arg: None,
    }
}

const fn conditional(name: &'static str, implementation: FunctionImpl) -> FunctionDef {
    FunctionDef {
        name,
        min_args: 2,
        max_args: Some(2),
        implementation,
        criteria_arg: Some(1),
    }
}

const BUILTINS: [FunctionDef; 7] = [
    variadic("SUM", aggregate::fn_sum),
    variadic("AVERAGE", aggregate::fn_average),
    variadic("MIN", aggregate::fn_min),
    variadic("MAX", aggregate::fn_max),
    variadic("COUNT", aggregate::fn_count),
    conditional("SUMIF", aggregate::fn_sumif),
    conditional("COUNTIF", aggregate::fn_countif),
];

/// Other spellings accepted for the built-ins: legacy editor names, then Russian
const ALIASES: [(&str, &str); 11] = [
    ("AVRG", "AVERAGE"),
    ("AVG", "AVERAGE"),
    ("СУММ", "SUM"),
    ("СРЗНАЧ", "AVERAGE"),
    ("МИН", "MIN"),
    ("МАКС", "MAX"),
    ("СЧЁТ", "COUNT"),
    ("СЧЕТ", "COUNT"),
    ("СУММЕСЛИ", "SUMIF"),
    ("СЧЁТЕСЛИ", "COUNTIF"),
    ("СЧЕТЕСЛИ", "COUNTIF"),
];

/// Name to definition lookup
///
/// Names are stored uppercased, so lookups ignore case in any script.
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Registry holding every built-in under each of its names
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::with_capacity(BUILTINS.len() + ALIASES.len()),
        };

        for def in BUILTINS {
            registry.register(def);
        }
        for (alias, target) in ALIASES {
            let registered = registry.alias(alias, target);
            debug_assert!(registered, "alias {} points at unknown {}", alias, target);
        }

        registry
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Make `alias` call the already registered `target`
    ///
    /// Returns `false` if `target` is unknown.
    pub fn alias(&mut self, alias: &str, target: &str) -> bool {
        let Some(def) = self.get(target).copied() else {
            return false;
        };
        self.functions.insert(alias.to_uppercase(), def);
        true
    }

    /// Number of registered names, aliases included
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert!(registry.get("sum").is_some());
        assert!(registry.get("Sum").is_some());
        assert!(registry.get("VLOOKUP").is_none());
    }

    #[test]
    fn test_aliases_resolve() {
        let registry = FunctionRegistry::new();

        let avrg = registry.get("avrg").unwrap();
        assert_eq!(avrg.name, "AVERAGE");

        assert_eq!(registry.get("сумм").unwrap().name, "SUM");
        assert_eq!(registry.get("СЧЁТЕСЛИ").unwrap().name, "COUNTIF");
        assert_eq!(registry.get("счетесли").unwrap().criteria_arg, Some(1));
    }

    #[test]
    fn test_check_arity() {
        let registry = FunctionRegistry::new();
        let sumif = registry.get("СУММЕСЛИ").unwrap();

        assert!(sumif.check_arity(2).is_ok());
        assert!(matches!(
            sumif.check_arity(3),
            Err(FormulaError::ArgumentCount { ref function, actual: 3, .. }) if function == "SUMIF"
        ));
        assert!(registry.get("SUM").unwrap().check_arity(0).is_err());
        assert!(registry.get("SUM").unwrap().check_arity(40).is_ok());
    }

    #[test]
    fn test_every_name_registered() {
        assert_eq!(FunctionRegistry::new().len(), BUILTINS.len() + ALIASES.len());
    }

    #[test]
    fn test_alias_to_unknown() {
        let mut registry = FunctionRegistry::new();
        let before = registry.len();
        assert!(!registry.alias("NOPE", "MISSING"));
        assert_eq!(registry.len(), before);
    }
}
