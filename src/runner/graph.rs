//! Prerequisite resolution
//!
//! Expands a requested task into the ordered list of invocations that must
//! run: prerequisites first, in declaration order, each distinct invocation
//! exactly once.

use crate::config::{self, Config};
use crate::error::{InterpolationResult, ResolveError, ResolveResult};
use crate::runner::{interpolate, Variables};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, trace};

/// A concrete (task, arguments) pair
///
/// `args` always holds one value per declared parameter, with defaults
/// filled in, so `build` and `build hello` compare equal when `hello` is
/// the default.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Invocation {
    pub task: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Bind `args` to the parameters of task `name`
    pub fn bind(config: &Config, name: &str, args: &[String]) -> ResolveResult<Self> {
        let task = config
            .tasks
            .get(name)
            .ok_or_else(|| ResolveError::UnknownTask(name.to_string()))?;

        if args.len() > task.params.len() {
            return Err(ResolveError::TooManyArguments {
                task: name.to_string(),
                expected: task.params.len(),
                got: args.len(),
            });
        }

        let mut bound = args.to_vec();
        for param in &task.params[args.len()..] {
            match param.default() {
                Some(default) => bound.push(default.to_string()),
                None => {
                    return Err(ResolveError::MissingParameter {
                        task: name.to_string(),
                        param: param.name().to_string(),
                    })
                }
            }
        }

        Ok(Invocation {
            task: name.to_string(),
            args: bound,
        })
    }

    /// Parameter name to value map for this invocation
    pub fn bindings(&self, task: &config::Task) -> HashMap<String, String> {
        task.params
            .iter()
            .map(|p| p.name().to_string())
            .zip(self.args.iter().cloned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.task)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Resolve a requested task into an ordered, deduplicated invocation list
pub fn resolve(
    config: &Config,
    vars: &Variables,
    task: &str,
    args: &[String],
) -> ResolveResult<Vec<Invocation>> {
    let root = Invocation::bind(config, task, args)?;

    let mut walk = Walk {
        config,
        vars,
        stack: Vec::new(),
        done: HashSet::new(),
        order: Vec::new(),
    };
    walk.visit(root)?;

    let summary = walk
        .order
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    debug!(order = %summary, "resolved invocations");
    Ok(walk.order)
}

/// State of one depth-first traversal
struct Walk<'a> {
    config: &'a Config,
    vars: &'a Variables,
    /// Invocations currently being expanded
    stack: Vec<Invocation>,
    /// Invocations already placed in `order`
    done: HashSet<Invocation>,
    order: Vec<Invocation>,
}

impl Walk<'_> {
    fn visit(&mut self, invocation: Invocation) -> ResolveResult<()> {
        if self.done.contains(&invocation) {
            trace!(%invocation, "already scheduled");
            return Ok(());
        }

        if let Some(start) = self.stack.iter().position(|i| *i == invocation) {
            let chain = self.stack[start..]
                .iter()
                .chain(std::iter::once(&invocation))
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" -> ");
            return Err(ResolveError::CyclicDependency(chain));
        }

        let (config, vars) = (self.config, self.vars);
        let task = config
            .tasks
            .get(&invocation.task)
            .ok_or_else(|| ResolveError::UnknownTask(invocation.task.clone()))?;
        let bindings = invocation.bindings(task);

        self.stack.push(invocation.clone());

        for dep in &task.deps {
            let (name, templates) = dep.parts();
            let args = templates
                .iter()
                .map(|t| interpolate(t, &bindings, vars))
                .collect::<InterpolationResult<Vec<_>>>()?;
            let child = Invocation::bind(config, name, &args)?;
            self.visit(child)?;
        }

        self.stack.pop();
        self.done.insert(invocation.clone());
        self.order.push(invocation);
        Ok(())
    }
}
