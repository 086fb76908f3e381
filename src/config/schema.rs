//! Configuration validation
//!
//! Everything that can go wrong before a process is spawned is caught here:
//! unknown tasks, parameter mistakes, dependency cycles and undefined
//! variables.

use crate::config::types::{Config, Task};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::{placeholders, resolve_variables};
use std::collections::{HashMap, HashSet};

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name a program".to_string(),
            ));
        }
    }

    if let Some(default) = &config.default {
        if !config.tasks.contains_key(default) {
            return Err(ConfigError::UnknownTask {
                name: default.clone(),
                referenced_by: "the default setting".to_string(),
            });
        }
    }

    // Variables must resolve on their own
    resolve_variables(&config.variables, &HashMap::new())?;

    for (name, task) in &config.tasks {
        validate_task(name, task)?;
        validate_dependencies(config, name, task)?;
        validate_placeholders(config, name, task)?;
    }

    // Check for circular dependencies between tasks
    detect_circular_task_dependencies(config)?;

    Ok(())
}

/// Validate a single task's parameter list
pub fn validate_task(name: &str, task: &Task) -> ConfigResult<()> {
    let mut seen = HashSet::new();
    let mut optional_seen = false;

    for param in &task.params {
        if !seen.insert(param.name()) {
            return Err(ConfigError::DuplicateParameter {
                task: name.to_string(),
                param: param.name().to_string(),
            });
        }

        match param.default() {
            Some(_) => optional_seen = true,
            None if optional_seen => {
                return Err(ConfigError::RequiredAfterOptional {
                    task: name.to_string(),
                    param: param.name().to_string(),
                })
            }
            None => {}
        }
    }

    Ok(())
}

/// Check that every dependency names a task and fits its parameters
fn validate_dependencies(config: &Config, name: &str, task: &Task) -> ConfigResult<()> {
    for dep in &task.deps {
        let (dep_name, args) = dep.parts();

        let target = config
            .tasks
            .get(dep_name)
            .ok_or_else(|| ConfigError::UnknownTask {
                name: dep_name.to_string(),
                referenced_by: format!("task '{}'", name),
            })?;

        if args.len() > target.params.len() {
            return Err(ConfigError::DependencyArity {
                task: name.to_string(),
                dependency: dep_name.to_string(),
                expected: target.params.len(),
                got: args.len(),
            });
        }

        if let Some(missing) = target.params[args.len()..]
            .iter()
            .find(|p| p.default().is_none())
        {
            return Err(ConfigError::MissingDependencyArgument {
                task: name.to_string(),
                dependency: dep_name.to_string(),
                param: missing.name().to_string(),
            });
        }
    }

    Ok(())
}

/// Check that every placeholder is a parameter of the task or a global
fn validate_placeholders(config: &Config, name: &str, task: &Task) -> ConfigResult<()> {
    let params: HashSet<&str> = task.params.iter().map(|p| p.name()).collect();

    let dep_templates = task.deps.iter().flat_map(|dep| dep.parts().1);
    let step_templates = task.run.iter().flat_map(|step| step.templates());

    for template in dep_templates.chain(step_templates) {
        for var in placeholders(template)? {
            if !params.contains(var.as_str()) && !config.variables.contains_key(&var) {
                return Err(ConfigError::UndefinedVariable {
                    name: var,
                    context: format!("task '{}'", name),
                });
            }
        }
    }

    Ok(())
}

/// Detect circular dependencies between task names
///
/// A cycle between names either revisits an invocation or never terminates,
/// so it is rejected before anything runs.
fn detect_circular_task_dependencies(config: &Config) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for task_name in config.tasks.keys() {
        let mut stack = Vec::new();
        check_task_cycle(config, task_name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in task dependencies
fn check_task_cycle(
    config: &Config,
    task_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    // Check if we've found a cycle
    if let Some(start) = stack.iter().position(|t| t == task_name) {
        let mut chain = stack[start..].to_vec();
        chain.push(task_name.to_string());
        return Err(ConfigError::CyclicDependency(chain.join(" -> ")));
    }

    // Skip if already fully processed
    if visited.contains(task_name) {
        return Ok(());
    }

    let task = config
        .tasks
        .get(task_name)
        .ok_or_else(|| ConfigError::UnknownTask {
            name: task_name.to_string(),
            referenced_by: stack
                .last()
                .map(|t| format!("task '{}'", t))
                .unwrap_or_else(|| "the command line".to_string()),
        })?;

    stack.push(task_name.to_string());

    for dep in &task.deps {
        check_task_cycle(config, dep.task_name(), visited, stack)?;
    }

    // Remove from stack and mark as visited
    stack.pop();
    visited.insert(task_name.to_string());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::error::InterpolationError;

    fn validate_yaml(yaml: &str) -> ConfigResult<()> {
        validate_config(&parse_config(yaml).unwrap())
    }

    #[test]
    fn test_validate_valid_config() {
        let yaml = r#"
variables:
  root: .
  build_dir: "${root}/build"
tasks:
  build:
    params: [name]
    run: cc ${name}.c -o ${build_dir}/${name}
  run:
    params: [name]
    deps: build ${name}
    run: ${build_dir}/${name}
"#;
        assert!(validate_yaml(yaml).is_ok());
    }

    #[test]
    fn test_duplicate_parameter() {
        let yaml = r#"
tasks:
  bad:
    params: [name, name]
    run: echo ${name}
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_required_after_optional() {
        let yaml = r#"
tasks:
  bad:
    params:
      - { name: opt, default: x }
      - name
    run: echo ${name} ${opt}
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::RequiredAfterOptional { param, .. }) if param == "name"
        ));
    }

    #[test]
    fn test_unknown_dependency() {
        let yaml = r#"
tasks:
  a:
    deps: [ghost]
    run: echo a
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::UnknownTask { name, .. }) if name == "ghost"
        ));
    }

    #[test]
    fn test_unknown_default_task() {
        let yaml = r#"
default: ghost
tasks:
  a:
    run: echo a
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::UnknownTask { name, .. }) if name == "ghost"
        ));
    }

    #[test]
    fn test_dependency_arity() {
        let yaml = r#"
tasks:
  build:
    params: [name]
    run: cc ${name}
  too_many:
    deps: ["build a b"]
    run: echo
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::DependencyArity { expected: 1, got: 2, .. })
        ));

        let yaml = r#"
tasks:
  build:
    params: [name]
    run: cc ${name}
  too_few:
    deps: [build]
    run: echo
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::MissingDependencyArgument { param, .. }) if param == "name"
        ));
    }

    #[test]
    fn test_undefined_variable_in_step() {
        let yaml = r#"
tasks:
  a:
    params: [name]
    run: echo ${name} ${nope}
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::UndefinedVariable { name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn test_undefined_variable_in_dependency_args() {
        let yaml = r#"
tasks:
  build:
    params: [name]
    run: cc ${name}
  a:
    deps: ["build ${nope}"]
    run: echo a
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::UndefinedVariable { name, .. }) if name == "nope"
        ));
    }

    #[test]
    fn test_cyclic_variables() {
        let yaml = r#"
variables:
  a: "${b}"
  b: "${a}"
tasks: {}
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::Interpolation(InterpolationError::CyclicVariable(_)))
        ));
    }

    #[test]
    fn test_detect_circular_dependency() {
        let yaml = r#"
tasks:
  a:
    deps: [b]
    run: echo a
  b:
    deps: [a]
    run: echo b
"#;
        match validate_yaml(yaml) {
            Err(ConfigError::CyclicDependency(chain)) => assert_eq!(chain, "a -> b -> a"),
            other => panic!("expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_self_dependency() {
        let yaml = r#"
tasks:
  loop:
    deps: [loop]
    run: echo
"#;
        assert!(matches!(
            validate_yaml(yaml),
            Err(ConfigError::CyclicDependency(_))
        ));
    }

    #[test]
    fn test_empty_interpreter() {
        let yaml = r#"
interpreter: []
tasks: {}
"#;
        assert!(matches!(validate_yaml(yaml), Err(ConfigError::Invalid(_))));
    }
}
