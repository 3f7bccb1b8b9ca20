use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use dailytasks_cli::cli::{
    Cli, Command, build_overrides, collect_config_overrides, expand_alias, split_command_line,
};
use dailytasks_cli::render;
use dailytasks_core::config::{self, Config, Palette};
use dailytasks_core::error::AppError;
use dailytasks_core::model::Task;
use dailytasks_core::notify::{Notice, notifier_for};
use dailytasks_core::storage::{JsonFileStorage, store_path};
use dailytasks_core::store::{StoreEvent, TaskStore};
use std::io::{self, BufRead, Write};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const LOG_ENV_VAR: &str = "DAILYTASKS_LOG";
const CANCEL_EDIT: &str = ":cancel";

struct App {
    store: TaskStore<JsonFileStorage>,
    palette: Palette,
    interactive: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn load_config(override_args: &[String]) -> Result<Config, AppError> {
    let loaded = config::load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: ignoring config: {}", err);
    }
    let overrides = build_overrides(override_args)?;
    Ok(config::merge_overrides(&loaded.config, &overrides))
}

fn open_app(config: &Config, interactive: bool) -> Result<App, AppError> {
    let path = store_path(config.store_path.as_deref())?;
    let mut store = TaskStore::new(JsonFileStorage::new(&path));
    store.load()?;

    if let Some(filter) = config.default_filter {
        store.set_filter(filter);
    }

    let notifier = notifier_for(config.notifications, config.palette());
    store.subscribe(move |event| {
        if let StoreEvent::Added(_) = event
            && let Err(err) = notifier.notify(&Notice::success("Task added!"))
        {
            warn!(%err, "notification failed");
        }
    });

    Ok(App {
        store,
        palette: config.palette(),
        interactive,
    })
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// `Ok(None)` means clap already printed help or version output.
fn parse_cli(args: Vec<String>) -> Result<Option<Cli>, AppError> {
    let argv = std::iter::once("dailytasks".to_string()).chain(args);
    match Cli::try_parse_from(argv) {
        Ok(cli) => Ok(Some(cli)),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) =>
        {
            err.print()?;
            Ok(None)
        }
        Err(err) => Err(normalize_parse_error(err)),
    }
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn print_json(value: serde_json::Value) {
    println!("{}", value);
}

fn print_task_outcome(cli_json: bool, verb: &str, task: Option<&Task>) {
    if cli_json {
        print_json(render::task_json(task));
    } else if let Some(task) = task {
        println!("{} task: {} ({})", verb, task.text, task.id);
    }
}

fn redraw(app: &App) {
    println!("{}", render::view(&app.store, &app.palette));
}

fn run_edit_session(
    app: &mut App,
    id: u64,
    input: &mut dyn BufRead,
) -> Result<Option<Task>, AppError> {
    let Some(mut session) = app.store.begin_edit(id) else {
        debug!(id, "edit: no such task");
        return Ok(None);
    };

    println!("Editing task {}: {}", session.task_id(), session.seed());
    println!("Enter new text ({CANCEL_EDIT} to keep it unchanged):");
    io::stdout().flush()?;

    let mut line = String::new();
    let bytes = input.read_line(&mut line)?;
    // End of input leaves the editor like losing focus: commit what is there.
    if bytes > 0 {
        let entered = line.trim_end_matches(['\r', '\n']);
        if entered.trim() == CANCEL_EDIT {
            app.store.cancel_edit(session);
            return Ok(None);
        }
        session.set_text(entered);
    }

    app.store.commit_edit(session)
}

fn run_command(app: &mut App, cli: Cli, input: &mut dyn BufRead) -> Result<(), AppError> {
    let json = cli.json;
    let mut changed_view = true;

    match cli.command {
        Command::Add { text } => {
            let task = app.store.add(&text.join(" "))?;
            print_task_outcome(json, "Added", task.as_ref());
        }
        Command::Toggle { id } => {
            let task = app.store.toggle(id)?;
            let verb = match &task {
                Some(task) if task.completed => "Completed",
                _ => "Reopened",
            };
            print_task_outcome(json, verb, task.as_ref());
        }
        Command::Edit { id, text } => {
            let task = if text.is_empty() {
                run_edit_session(app, id, input)?
            } else {
                app.store.edit(id, &text.join(" "))?
            };
            print_task_outcome(json, "Updated", task.as_ref());
        }
        Command::Delete { id } => {
            let task = app.store.delete(id)?;
            print_task_outcome(json, "Deleted", task.as_ref());
        }
        Command::Clear => {
            let had_completed = app.store.has_completed();
            let removed = app.store.clear_completed()?;
            if json {
                print_json(serde_json::json!({ "removed": removed }));
            } else if had_completed {
                println!("Cleared {} completed task(s)", removed);
            } else {
                println!("No completed tasks to clear");
            }
        }
        Command::List { filter, plain } => {
            if let Some(filter) = filter {
                app.store.set_filter(filter);
            }
            changed_view = false;
            if json {
                print_json(render::tasks_json(&app.store.filtered_tasks()));
            } else if plain {
                println!("{}", render::task_lines(&app.store.filtered_tasks()));
            } else if app.interactive {
                redraw(app);
            } else {
                println!("{}", render::task_table(&app.store.filtered_tasks()));
            }
        }
        Command::Filter { filter } => {
            app.store.set_filter(filter);
            if json {
                print_json(render::tasks_json(&app.store.filtered_tasks()));
                changed_view = false;
            } else if !app.interactive {
                redraw(app);
            }
        }
        Command::Stats => {
            changed_view = false;
            if json {
                print_json(render::stats_json(app.store.stats()));
            } else {
                println!("{}", render::stats_line(app.store.stats(), &app.palette));
            }
        }
    }

    if app.interactive && changed_view && !json {
        redraw(app);
    }

    Ok(())
}

fn run_interactive(app: &mut App, config: &Config) -> Result<(), AppError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    redraw(app);

    loop {
        input.clear();
        let bytes = stdin_lock.read_line(&mut input)?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line)
            .and_then(|args| expand_alias(&args, &config.aliases))
        {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let cli = match parse_cli(args) {
            Ok(Some(cli)) => cli,
            Ok(None) => continue,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if !cli.config_override.is_empty() {
            eprintln!(
                "ERROR: {}",
                AppError::invalid_input("config overrides are only accepted on the command line")
            );
            continue;
        }

        if let Err(err) = run_command(app, cli, &mut stdin_lock) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn run(args: Vec<String>) -> Result<(), AppError> {
    let config = load_config(&collect_config_overrides(&args))?;

    if args.is_empty() {
        let mut app = open_app(&config, true)?;
        return run_interactive(&mut app, &config);
    }

    let argv = expand_alias(&args, &config.aliases)?;
    let Some(cli) = parse_cli(argv)? else {
        return Ok(());
    };

    let mut app = open_app(&config, false)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    run_command(&mut app, cli, &mut input)
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(args) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
