//! Task graph execution
//!
//! [`Executor::execute`] resolves the requested task, substitutes every step
//! of every invocation up front, then runs the steps strictly in order and
//! stops at the first failure.

use crate::config::Config;
use crate::error::{ExecutionError, InterpolationResult, ResolveError, Result};
use crate::runner::{clean_dir, execute_command, resolve, Context, Invocation, Step, Variables};
use tracing::{debug, info};

/// An invocation together with its substituted steps
#[derive(Debug, Clone)]
pub struct PlannedInvocation {
    pub invocation: Invocation,
    pub steps: Vec<Step>,
}

/// Runs tasks from a loaded configuration
pub struct Executor<'a> {
    config: &'a Config,
    vars: Variables,
    ctx: Context,
}

impl<'a> Executor<'a> {
    /// Create an executor over resolved global variables
    pub fn new(config: &'a Config, vars: Variables, ctx: Context) -> Self {
        Executor { config, vars, ctx }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Ordered, deduplicated invocations needed to run `task`
    pub fn resolve(&self, task: &str, args: &[String]) -> Result<Vec<Invocation>> {
        Ok(resolve(self.config, &self.vars, task, args)?)
    }

    /// Substitute parameters and globals into every step of `invocation`
    pub fn render(&self, invocation: &Invocation) -> Result<Vec<Step>> {
        let task = self
            .config
            .tasks
            .get(&invocation.task)
            .ok_or_else(|| ResolveError::UnknownTask(invocation.task.clone()))?;
        let bindings = invocation.bindings(task);

        let steps = task
            .run
            .iter()
            .map(|step| Step::render(step, &bindings, &self.vars, task.quiet))
            .collect::<InterpolationResult<Vec<_>>>()?;
        Ok(steps)
    }

    /// Resolve `task` and substitute all steps, without running anything
    pub fn plan(&self, task: &str, args: &[String]) -> Result<Vec<PlannedInvocation>> {
        self.resolve(task, args)?
            .into_iter()
            .map(|invocation| {
                let steps = self.render(&invocation)?;
                Ok(PlannedInvocation { invocation, steps })
            })
            .collect()
    }

    /// Run every step of a single invocation, stopping at the first failure
    pub fn run(&self, invocation: &Invocation) -> Result<()> {
        let steps = self.render(invocation)?;
        self.run_steps(invocation, &steps)
    }

    /// Resolve `task` and run each invocation in order
    ///
    /// Nothing is spawned unless the whole plan resolves. The first failing
    /// invocation aborts the rest, including the requested task itself.
    pub fn execute(&self, task: &str, args: &[String]) -> Result<()> {
        let plan = self.plan(task, args)?;
        info!(task, invocations = plan.len(), "executing");

        for planned in &plan {
            self.run_steps(&planned.invocation, &planned.steps)?;
        }

        Ok(())
    }

    fn run_steps(&self, invocation: &Invocation, steps: &[Step]) -> Result<()> {
        self.ctx.print_task_start(&invocation.to_string());

        for step in steps {
            if !step.is_quiet() || self.ctx.dry_run {
                self.ctx.print_command(&step.print());
            }
            if self.ctx.dry_run {
                continue;
            }

            self.run_step(step).map_err(|e| {
                debug!(%invocation, error = %e, "step failed");
                e
            })?;
        }

        Ok(())
    }

    fn run_step(&self, step: &Step) -> std::result::Result<(), ExecutionError> {
        match step {
            Step::Command { exec, dir, .. } => execute_command(exec, dir.as_deref(), &self.ctx),
            Step::Clean { dir, keep } => {
                let removed = clean_dir(&self.ctx.working_dir.join(dir), keep)?;
                self.ctx
                    .print_info(&format!("removed {} file(s) from {}", removed, dir));
                Ok(())
            }
        }
    }
}
