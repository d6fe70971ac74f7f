//! Whitelisted math functions

pub mod math;

use crate::error::EvalResult;
use crate::evaluator::Value;
use ahash::AHashMap;

/// Function implementation signature
pub type FunctionImpl = fn(&[Value]) -> EvalResult<Value>;

/// Function definition
pub struct FunctionDef {
    /// Function name (lowercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
///
/// The only functions a formula can call. Names are matched
/// case-insensitively; anything not registered is rejected by the parser.
pub struct FunctionRegistry {
    functions: AHashMap<&'static str, FunctionDef>,
}

impl FunctionRegistry {
    /// Create a new registry with the whitelisted functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_math_functions();

        registry
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(name.to_ascii_lowercase().as_str())
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.functions.keys().copied().collect();
        names.sort_unstable();
        names
    }

    fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name, def);
    }

    fn register_math_functions(&mut self) {
        // ROUND
        self.register(FunctionDef {
            name: "round",
            min_args: 1,
            max_args: Some(2),
            implementation: math::fn_round,
        });

        // CEIL
        self.register(FunctionDef {
            name: "ceil",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_ceil,
        });

        // FLOOR
        self.register(FunctionDef {
            name: "floor",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_floor,
        });

        // ABS
        self.register(FunctionDef {
            name: "abs",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_abs,
        });

        // MAX
        self.register(FunctionDef {
            name: "max",
            min_args: 1,
            max_args: None,
            implementation: math::fn_max,
        });

        // MIN
        self.register(FunctionDef {
            name: "min",
            min_args: 1,
            max_args: None,
            implementation: math::fn_min,
        });

        // POW
        self.register(FunctionDef {
            name: "pow",
            min_args: 2,
            max_args: Some(2),
            implementation: math::fn_pow,
        });

        // SQRT
        self.register(FunctionDef {
            name: "sqrt",
            min_args: 1,
            max_args: Some(1),
            implementation: math::fn_sqrt,
        });
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitelist() {
        let registry = FunctionRegistry::new();
        assert_eq!(
            registry.names(),
            vec!["abs", "ceil", "floor", "max", "min", "pow", "round", "sqrt"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = FunctionRegistry::new();
        assert_eq!(registry.get("ROUND").map(|f| f.name), Some("round"));
        assert_eq!(registry.get("Sqrt").map(|f| f.name), Some("sqrt"));
        assert!(registry.get("constant").is_none());
        assert!(registry.get("exec").is_none());
    }
}
