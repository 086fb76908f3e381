//! Main CLI application

use crate::config::{self, load_dotenv, parse_config_auto, parse_config_file, validate_config, Config};
use crate::error::{ConfigError, RunbookError};
use crate::logging;
use crate::runner::{resolve_variables, Context, Executor, Verbosity};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
    /// Parsed configuration
    config: Config,
    /// Config file path
    config_path: PathBuf,
}

impl App {
    /// Create a new app from the discovered configuration file
    pub fn new() -> Result<Self, RunbookError> {
        let (config, config_path) = parse_config_auto()?;
        Self::from_parts(config, config_path)
    }

    /// Create app with a specific config file
    pub fn with_config_file(path: PathBuf) -> Result<Self, RunbookError> {
        let config = parse_config_file(&path)?;
        Self::from_parts(config, path)
    }

    fn from_parts(config: Config, config_path: PathBuf) -> Result<Self, RunbookError> {
        validate_config(&config)?;
        let command = build_command(&config);

        Ok(App {
            command,
            config,
            config_path,
        })
    }

    /// Run the application with command line arguments
    pub fn run(self) -> Result<(), RunbookError> {
        let matches = self.command.clone().get_matches();

        // Handle global flags first
        let verbosity = get_verbosity(&matches);
        if let Err(err) = logging::init_logging(verbosity) {
            eprintln!("{} {err:#}", "warning:".yellow());
        }

        if let Some(shell) = matches.get_one::<Shell>("completions").copied() {
            let mut cmd = self.command.clone();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut io::stdout());
            return Ok(());
        }

        if matches.get_flag("list") {
            print_task_list(&self.config);
            return Ok(());
        }

        let overrides = parse_overrides(&matches)?;
        let vars = resolve_variables(&self.config.variables, &overrides)?;

        if self.config.dotenv {
            load_dotenv(&self.config_path)?;
        }

        // Work out which task to run
        let (task_name, args) = match matches.subcommand() {
            Some((name, sub_matches)) => (
                name.to_string(),
                task_args(self.config.tasks.get(name), sub_matches),
            ),
            None => match &self.config.default {
                Some(default) => (default.clone(), Vec::new()),
                None => {
                    // No task specified, show help
                    self.command.clone().print_help()?;
                    println!();
                    return Ok(());
                }
            },
        };

        // Create execution context
        let mut ctx = Context::new()
            .with_config_path(self.config_path.clone())
            .with_verbosity(verbosity)
            .with_dry_run(matches.get_flag("dry-run"));

        // Set interpreter if specified in config
        if let Some(interpreter) = &self.config.interpreter {
            ctx = ctx.with_interpreter(interpreter.clone());
        }

        let executor = Executor::new(&self.config, vars, ctx);
        executor.execute(&task_name, &args)
    }
}

/// Id under which a task parameter is registered with clap
///
/// Prefixed so a parameter can share a name with a global flag.
fn param_id(name: &str) -> String {
    format!("param-{}", name)
}

/// Build the clap command from configuration
fn build_command(config: &Config) -> Command {
    let mut cmd = Command::new(config.name.clone().unwrap_or_else(|| "runbook".to_string()))
        .version(env!("CARGO_PKG_VERSION"))
        .about(
            config
                .usage
                .clone()
                .unwrap_or_else(|| "A YAML task runner with prerequisite tasks".to_string()),
        )
        .disable_help_subcommand(true)
        // Unknown task names reach the executor so they fail like any other
        // resolution error.
        .allow_external_subcommands(true)
        .external_subcommand_value_parser(value_parser!(String))
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to runbook.yml config file")
                .global(true),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List available tasks")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("dry-run")
                .short('n')
                .long("dry-run")
                .help("Print the commands that would run without running them")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("NAME=VALUE")
                .help("Override a variable")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .help("Print a shell completion script")
                .value_parser(value_parser!(Shell)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    // Add subcommands for each task
    for (task_name, task) in &config.tasks {
        // Private tasks stay runnable through the external subcommand path
        if task.private {
            continue;
        }

        let mut task_cmd = Command::new(task_name).about(task.usage.clone().unwrap_or_default());

        // Add long description if available
        if let Some(desc) = &task.description {
            task_cmd = task_cmd.long_about(desc.clone());
        }

        // Parameters become optional positionals; missing ones are reported
        // by resolution so the error names the parameter.
        for param in &task.params {
            let mut arg_def = Arg::new(param_id(param.name()))
                .value_name(param.name().to_uppercase())
                .help(param.usage().unwrap_or_default().to_string());

            if let Some(default) = param.default() {
                arg_def = arg_def.help(format!(
                    "{} [default: {}]",
                    param.usage().unwrap_or_default(),
                    default
                ));
            }

            task_cmd = task_cmd.arg(arg_def);
        }

        cmd = cmd.subcommand(task_cmd);
    }

    cmd
}

/// Positional arguments given to the selected task
fn task_args(task: Option<&config::Task>, matches: &ArgMatches) -> Vec<String> {
    match task {
        Some(task) if !task.private => task
            .params
            .iter()
            .map_while(|p| matches.get_one::<String>(&param_id(p.name())).cloned())
            .collect(),
        // Unknown or private task, parsed as an external subcommand
        _ => matches
            .get_many::<String>("")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    }
}

/// Parse `--set NAME=VALUE` overrides
fn parse_overrides(matches: &ArgMatches) -> Result<HashMap<String, String>, ConfigError> {
    let mut overrides = HashMap::new();

    for raw in matches.get_many::<String>("set").into_iter().flatten() {
        let (name, value) = raw.split_once('=').ok_or_else(|| {
            ConfigError::Invalid(format!("expected NAME=VALUE for --set, got '{}'", raw))
        })?;
        overrides.insert(name.trim().to_string(), value.to_string());
    }

    Ok(overrides)
}

/// Print public tasks with their parameters
fn print_task_list(config: &Config) {
    println!("Available tasks:");

    for (name, task) in config.tasks.iter().filter(|(_, task)| !task.private) {
        let mut signature = name.bold().to_string();
        for param in &task.params {
            match param.default() {
                Some(default) => signature.push_str(&format!(" [{}={}]", param.name(), default)),
                None => signature.push_str(&format!(" <{}>", param.name())),
            }
        }

        match &task.usage {
            Some(usage) => println!("    {}  {}", signature, format!("# {}", usage).dimmed()),
            None => println!("    {}", signature),
        }
    }
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Run the CLI application with provided arguments
pub fn run() -> Result<(), RunbookError> {
    // Check if --file flag is provided first
    let args: Vec<String> = std::env::args().collect();
    let file_path = extract_file_arg(&args);

    let app = if let Some(path) = file_path {
        App::with_config_file(path)?
    } else {
        App::new()?
    };

    app.run()
}

/// Extract --file argument before clap parsing
///
/// The task subcommands come from the config, so the file has to be known
/// before the full command line can be parsed.
fn extract_file_arg(args: &[String]) -> Option<PathBuf> {
    for (i, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--file=") {
            return Some(PathBuf::from(path));
        }
        if (arg == "--file" || arg == "-f") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}
