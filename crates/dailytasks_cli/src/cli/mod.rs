use clap::{CommandFactory, Parser, Subcommand};
use dailytasks_core::config::{ConfigOverrides, NotificationMode};
use dailytasks_core::error::AppError;
use dailytasks_core::model::Filter;
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[command(author, version, about = "A small daily task list", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: dailytasks add "Buy milk"
    Add {
        #[arg(required = true)]
        text: Vec<String>,
    },
    /// Mark a task completed, or active again
    ///
    /// Example: dailytasks toggle 1
    Toggle { id: u64 },
    /// Change a task's text
    ///
    /// Example: dailytasks edit 1 "Buy oat milk"
    /// Example: dailytasks edit 1 (prompts for the new text)
    Edit { id: u64, text: Vec<String> },
    /// Delete a task
    ///
    /// Example: dailytasks delete 1
    Delete { id: u64 },
    /// Remove every completed task
    ///
    /// Example: dailytasks clear
    Clear,
    /// List tasks
    ///
    /// Example: dailytasks list
    /// Example: dailytasks list --filter active
    /// Example: dailytasks list --plain
    List {
        #[arg(long, value_parser = parse_filter)]
        filter: Option<Filter>,
        /// One line per task instead of a table
        #[arg(long)]
        plain: bool,
    },
    /// Choose which tasks are shown
    ///
    /// Example: dailytasks filter completed
    Filter {
        #[arg(value_parser = parse_filter)]
        filter: Filter,
    },
    /// Show task counts
    ///
    /// Example: dailytasks stats
    Stats,
}

fn parse_filter(raw: &str) -> Result<Filter, String> {
    raw.parse::<Filter>()
        .map_err(|err| err.message().to_string())
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    DefaultFilter,
    Notifications,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field =
        canonicalize_flag_name(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let scalar = |target: ConfigOverrideTarget| {
        if remainder.is_some() {
            Err(format!("{canonical_field} override cannot have subfields"))
        } else {
            Ok(ParsedConfigOverride {
                target,
                value: value.clone(),
            })
        }
    };

    match canonical_field.as_str() {
        "theme" => scalar(ConfigOverrideTarget::Theme),
        "default_filter" | "filter" => scalar(ConfigOverrideTarget::DefaultFilter),
        "notifications" => scalar(ConfigOverrideTarget::Notifications),
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value: value.clone(),
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds raw `KEY=VALUE` strings into overrides, validating typed values.
pub fn build_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::DefaultFilter => {
                overrides.default_filter = Some(parsed.value.parse::<Filter>()?);
            }
            ConfigOverrideTarget::Notifications => {
                overrides.notifications = Some(parsed.value.parse::<NotificationMode>()?);
            }
        }
    }
    Ok(overrides)
}

/// Pulls `--config-override` values out of raw arguments before clap runs, so
/// aliases defined through overrides can be expanded.
pub fn collect_config_overrides(args: &[String]) -> Vec<String> {
    let mut found = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == CONFIG_OVERRIDE_FLAG {
            if let Some(value) = iter.next() {
                found.push(value.clone());
            }
        } else if let Some(value) = arg
            .strip_prefix(CONFIG_OVERRIDE_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            found.push(value.to_string());
        }
    }
    found
}

/// Replaces the first positional argument when it names a configured alias.
/// Built-in subcommands always win over aliases.
pub fn expand_alias(
    args: &[String],
    aliases: &HashMap<String, String>,
) -> Result<Vec<String>, AppError> {
    let mut index = 0;
    while index < args.len() {
        let arg = &args[index];
        if arg == CONFIG_OVERRIDE_FLAG {
            index += 2;
            continue;
        }
        if arg.starts_with('-') {
            index += 1;
            continue;
        }
        break;
    }

    let Some(candidate) = args.get(index) else {
        return Ok(args.to_vec());
    };

    if is_builtin_command(candidate) {
        return Ok(args.to_vec());
    }

    let Some(expansion) = aliases.get(candidate) else {
        return Ok(args.to_vec());
    };

    let mut expanded = Vec::with_capacity(args.len());
    expanded.extend_from_slice(&args[..index]);
    expanded.extend(split_command_line(expansion)?);
    expanded.extend_from_slice(&args[index + 1..]);
    Ok(expanded)
}

fn is_builtin_command(name: &str) -> bool {
    let command = Cli::command();
    let found = command
        .get_subcommands()
        .any(|sub| sub.get_name() == name || sub.get_all_aliases().any(|alias| alias == name));
    found || name == "help"
}

pub fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
            }
            quoted = false;
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
