use clap::{Parser as ClapParser, Subcommand};
use keypath::Engine;
use keypath::cli::{self, CliError, FindOptions, GetOptions, SetOptions};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "keypath")]
#[command(about = "keypath - Read, write and search nested JSON with compact path expressions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Pretty-print JSON output
    #[arg(short, long, global = true)]
    pretty: bool,

    /// Log resolution details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens a path compiles to
    Tokens {
        path: String,
    },

    /// Validate a path's syntax
    Check {
        path: String,
    },

    /// Read the value at a path
    Get {
        path: String,

        /// Positional arguments for %N and @N (JSON, or plain strings)
        args: Vec<String>,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,
    },

    /// Assign a value at a path and print the updated document
    Set {
        path: String,

        /// New value, as JSON
        value: String,

        /// Positional arguments for %N and @N (JSON, or plain strings)
        args: Vec<String>,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Create missing intermediate objects
        #[arg(short, long)]
        force: bool,
    },

    /// Print the path(s) leading to a value
    Find {
        /// Value to look for, as JSON
        target: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Report every match instead of the first
        #[arg(short, long)]
        all: bool,
    },

    /// Escape every special character in a path segment
    Escape {
        segment: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command, cli.pretty) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "keypath=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(command: Commands, pretty: bool) -> Result<(), CliError> {
    let mut engine = Engine::new();

    match command {
        Commands::Tokens { path } => {
            let tokens = cli::execute_tokens(&engine, &path)?;
            if pretty {
                println!("{:#?}", tokens);
            } else {
                println!("{:?}", tokens);
            }
        }
        Commands::Check { path } => {
            cli::execute_check(&engine, &path)?;
            println!("Syntax is valid");
        }
        Commands::Get { path, args, input } => {
            let options = GetOptions {
                path,
                input: read_input(input)?,
                args,
            };
            print_json(&cli::execute_get(&engine, &options)?, pretty)?;
        }
        Commands::Set {
            path,
            value,
            args,
            input,
            force,
        } => {
            let options = SetOptions {
                path,
                value,
                input: read_input(input)?,
                args,
                force,
            };
            print_json(&cli::execute_set(&mut engine, &options)?, pretty)?;
        }
        Commands::Find { target, input, all } => {
            let options = FindOptions {
                target,
                input: read_input(input)?,
                all,
            };
            for path in cli::execute_find(&engine, &options)? {
                println!("{}", path);
            }
        }
        Commands::Escape { segment } => println!("{}", cli::execute_escape(&engine, &segment)),
    }
    Ok(())
}

fn read_input(input: Option<String>) -> Result<Option<String>, CliError> {
    match input {
        Some(s) => Ok(Some(s)),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(Some(buffer))
        }
        None => Ok(None),
    }
}

fn print_json(value: &serde_json::Value, pretty: bool) -> Result<(), CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }?;
    println!("{}", json);
    Ok(())
}
