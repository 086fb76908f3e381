//! Global variable resolution
//!
//! Variables are resolved once, before any task runs, into a flat map. A
//! variable may refer to others with `${name}`; definition order does not
//! matter.

use crate::error::{InterpolationError, InterpolationResult};
use crate::runner::interpolate_with;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Fully resolved global variables
pub type Variables = HashMap<String, String>;

/// Resolve variable definitions into their final values
///
/// `overrides` replace the definition of a declared variable with a literal
/// value, so variables derived from it see the override. Overriding an
/// undeclared variable is an error.
pub fn resolve_variables(
    definitions: &BTreeMap<String, String>,
    overrides: &HashMap<String, String>,
) -> InterpolationResult<Variables> {
    if let Some(unknown) = overrides.keys().find(|k| !definitions.contains_key(*k)) {
        return Err(InterpolationError::UndefinedVariable(unknown.clone()));
    }

    let mut resolved: Variables = overrides.clone();
    let mut stack = Vec::new();

    for name in definitions.keys() {
        resolve_one(name, definitions, &mut resolved, &mut stack)?;
    }

    debug!(count = resolved.len(), "resolved variables");
    Ok(resolved)
}

fn resolve_one(
    name: &str,
    definitions: &BTreeMap<String, String>,
    resolved: &mut Variables,
    stack: &mut Vec<String>,
) -> InterpolationResult<String> {
    if let Some(value) = resolved.get(name) {
        return Ok(value.clone());
    }

    if stack.iter().any(|n| n == name) {
        stack.push(name.to_string());
        let start = stack.iter().position(|n| n == name).unwrap_or(0);
        return Err(InterpolationError::CyclicVariable(stack[start..].join(" -> ")));
    }

    let template = definitions
        .get(name)
        .ok_or_else(|| InterpolationError::UndefinedVariable(name.to_string()))?;

    stack.push(name.to_string());
    let value = interpolate_with(template, |dep| resolve_one(dep, definitions, resolved, stack))?;
    stack.pop();

    resolved.insert(name.to_string(), value.clone());
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_derived_variable() {
        let definitions = defs(&[("root", "/x"), ("dir", "${root}/y")]);
        let vars = resolve_variables(&definitions, &HashMap::new()).unwrap();
        assert_eq!(vars.get("dir").unwrap(), "/x/y");
    }

    #[test]
    fn test_definition_order_does_not_matter() {
        // BTreeMap visits "a_out" before "z_root"
        let definitions = defs(&[
            ("a_out", "${m_build}/bin"),
            ("m_build", "${z_root}/build"),
            ("z_root", "/src"),
        ]);
        let vars = resolve_variables(&definitions, &HashMap::new()).unwrap();
        assert_eq!(vars.get("a_out").unwrap(), "/src/build/bin");
    }

    #[test]
    fn test_override_flows_into_derived() {
        let definitions = defs(&[("root", "/x"), ("dir", "${root}/y")]);
        let mut overrides = HashMap::new();
        overrides.insert("root".to_string(), "/z".to_string());

        let vars = resolve_variables(&definitions, &overrides).unwrap();
        assert_eq!(vars.get("root").unwrap(), "/z");
        assert_eq!(vars.get("dir").unwrap(), "/z/y");
    }

    #[test]
    fn test_override_of_unknown_variable() {
        let mut overrides = HashMap::new();
        overrides.insert("nope".to_string(), "1".to_string());

        let result = resolve_variables(&BTreeMap::new(), &overrides);
        assert!(matches!(result, Err(InterpolationError::UndefinedVariable(n)) if n == "nope"));
    }

    #[test]
    fn test_undefined_reference() {
        let definitions = defs(&[("dir", "${missing}/y")]);
        let result = resolve_variables(&definitions, &HashMap::new());
        assert!(matches!(result, Err(InterpolationError::UndefinedVariable(n)) if n == "missing"));
    }

    #[test]
    fn test_cycle_detected() {
        let definitions = defs(&[("a", "${b}"), ("b", "${c}"), ("c", "${a}")]);
        let result = resolve_variables(&definitions, &HashMap::new());
        match result {
            Err(InterpolationError::CyclicVariable(chain)) => {
                assert_eq!(chain, "a -> b -> c -> a");
            }
            other => panic!("expected cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_self_reference_detected() {
        let definitions = defs(&[("a", "x${a}")]);
        let result = resolve_variables(&definitions, &HashMap::new());
        assert!(matches!(result, Err(InterpolationError::CyclicVariable(_))));
    }
}
