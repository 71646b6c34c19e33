//! `sfb`: compile, deploy and preview block programs from the terminal
//!
//! Responses are JSON on stdout; logs go to stderr.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Serialize;
use sfb_core::{Studio, StudioConfig, StudioError};
use sfb_program::Workspace;
use sfb_sim::{render_grid, Frame};
use sfb_store::StoreError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_PARTIAL: u8 = 2;

fn cli() -> Command {
    let workspace_args = [
        Arg::new("workspace")
            .long("workspace")
            .short('w')
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Workspace snapshot (JSON)"),
        Arg::new("blockly")
            .long("blockly")
            .action(ArgAction::SetTrue)
            .help("Snapshot uses the editor's serialization format"),
    ];

    Command::new("sfb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Block programs for the StampFly drone")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("compile")
                .about("Print the direction sequence for a workspace")
                .args(workspace_args.clone()),
        )
        .subcommand(
            Command::new("read")
                .about("Read a file under the base directory")
                .arg(Arg::new("path").long("path").required(true).help("Relative path")),
        )
        .subcommand(
            Command::new("write")
                .about("Write a file under the base directory")
                .arg(Arg::new("path").long("path").required(true).help("Relative path"))
                .arg(
                    Arg::new("content")
                        .long("content")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Local file holding the content to write"),
                ),
        )
        .subcommand(
            Command::new("deploy")
                .about("Patch the firmware header with a workspace, then upload")
                .args(workspace_args.clone())
                .arg(
                    Arg::new("target")
                        .long("target")
                        .help("Header path relative to the base directory"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Preview a workspace on the grid")
                .args(workspace_args)
                .arg(
                    Arg::new("step-ms")
                        .long("step-ms")
                        .value_parser(value_parser!(u64))
                        .help("Delay between steps in milliseconds"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the full trace as JSON instead of drawing frames"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<StudioConfig> {
    let config = match path {
        Some(path) => StudioConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => StudioConfig::default(),
    };
    Ok(config.with_env())
}

fn load_workspace(args: &ArgMatches) -> Result<Workspace, StudioError> {
    let Some(path) = args.get_one::<PathBuf>("workspace") else {
        return Err(StoreError::InvalidInput("missing workspace".to_string()).into());
    };
    let text = read_local(path)?;
    let workspace = if args.get_flag("blockly") {
        Workspace::from_blockly_json(&text)?
    } else {
        Workspace::from_json(&text)?
    };
    Ok(workspace)
}

fn read_local(path: &Path) -> Result<String, StudioError> {
    std::fs::read_to_string(path).map_err(|e| StoreError::io_error(path, e).into())
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str, StudioError> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| StoreError::InvalidInput(format!("missing {name}")).into())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), StudioError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| StudioError::config(format!("encoding response: {e}")))?;
    println!("{text}");
    Ok(())
}

fn print_frame(frame: &Frame, drawn: &str) {
    let label = frame.action.as_deref().unwrap_or("start");
    println!("step {} ({label})\n{drawn}", frame.step);
}

async fn simulate(studio: &Studio, args: &ArgMatches) -> Result<ExitCode, StudioError> {
    let workspace = load_workspace(args)?;
    let handle = studio.simulate(Some(&workspace))?;
    let grid = studio.config().simulator.grid();
    let json = args.get_flag("json");
    // the watch channel keeps only the latest frame, so without pauses
    // between steps the drawing comes from the finished trace instead
    let live = !json && studio.simulator().config().step_delay > Duration::ZERO;

    if live {
        let mut frames = handle.subscribe();
        loop {
            tokio::select! {
                changed = frames.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let frame = frames.borrow_and_update().clone();
                    print_frame(&frame, &render_grid(&frame.state, &grid));
                }
                _ = tokio::signal::ctrl_c() => {
                    handle.cancel();
                    break;
                }
            }
        }
    }

    let outcome = handle.finish().await?;
    if json {
        print_json(&outcome)?;
        return Ok(ExitCode::SUCCESS);
    }

    if !live {
        for (frame, drawn) in outcome.trace.frames().iter().zip(outcome.trace.replay(&grid)) {
            print_frame(frame, &drawn);
        }
    }
    if outcome.cancelled {
        println!("stopped at {}", outcome.final_state);
    } else {
        println!(
            "finished at {} after {} flip(s)",
            outcome.final_state,
            outcome.trace.transition_count()
        );
    }
    Ok(ExitCode::SUCCESS)
}

async fn dispatch(mut config: StudioConfig, matches: &ArgMatches) -> Result<ExitCode, StudioError> {
    if let Some(("simulate", args)) = matches.subcommand() {
        if let Some(ms) = args.get_one::<u64>("step-ms") {
            config.simulator = config.simulator.with_step_delay_ms(*ms);
        }
    }
    let studio = Studio::new(config)?;

    match matches.subcommand() {
        Some(("compile", args)) => {
            let workspace = load_workspace(args)?;
            print_json(&studio.compile(Some(&workspace))?)?;
        }
        Some(("read", args)) => {
            print_json(&studio.read(required(args, "path")?).await?)?;
        }
        Some(("write", args)) => {
            let content = match args.get_one::<PathBuf>("content") {
                Some(file) => read_local(file)?,
                None => String::new(),
            };
            print_json(&studio.write(required(args, "path")?, &content).await?)?;
        }
        Some(("deploy", args)) => {
            let workspace = load_workspace(args)?;
            let report = match args.get_one::<String>("target") {
                Some(target) => studio.persist_to(Some(&workspace), target).await?,
                None => studio.persist(Some(&workspace)).await?,
            };
            print_json(&report)?;
            if report.is_partial() {
                return Ok(ExitCode::from(EXIT_PARTIAL));
            }
        }
        Some(("simulate", args)) => return simulate(&studio, args).await,
        _ => return Err(StudioError::config("unknown command")),
    }
    Ok(ExitCode::SUCCESS)
}

async fn run(matches: ArgMatches) -> anyhow::Result<ExitCode> {
    let config = load_config(matches.get_one::<PathBuf>("config"))?;

    match dispatch(config, &matches).await {
        Ok(code) => Ok(code),
        Err(err) => {
            tracing::error!(kind = %err.kind(), "{err}");
            println!("{}", serde_json::to_string_pretty(&err.to_response())?);
            Ok(ExitCode::from(EXIT_FAILURE))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    match run(matches).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
