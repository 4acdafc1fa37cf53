use clap::{Parser, Subcommand};
use std::io::Read;

use jq_runtime::{registry, CallContext, CallError, Value};

#[derive(Parser)]
#[command(name = "jq-runtime")]
#[command(about = "Call jq builtins on JSON values")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Call a builtin and print its result as JSON
    Call {
        /// Builtin name, e.g. `setpath` or `_index`
        name: String,

        /// Arguments, one JSON document each
        args: Vec<String>,

        /// Input value as JSON; read from stdin when omitted
        #[arg(short = 'i', long = "input")]
        input: Option<String>,

        /// Start from an empty environment instead of the process one
        #[arg(long = "clear-env")]
        clear_env: bool,
    },
    /// List public builtins as name/arity
    List,
}

fn parse_json(what: &str, text: &str) -> Value {
    match Value::from_json(text) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: Invalid {}: {}", what, e);
            std::process::exit(2);
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            for name in registry().listing() {
                println!("{}", name);
            }
        }
        Command::Call {
            name,
            args,
            input,
            clear_env,
        } => {
            let input = match input {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    if let Err(e) = std::io::stdin().read_to_string(&mut buf) {
                        eprintln!("Error: Cannot read stdin: {}", e);
                        std::process::exit(2);
                    }
                    buf
                }
            };
            let input = parse_json("input", &input);
            let args: Vec<Value> = args.iter().map(|a| parse_json("argument", a)).collect();
            let ctx = if clear_env {
                CallContext::new()
            } else {
                CallContext::from_process()
            };

            log::debug!("calling {}/{}", name, args.len());
            let result = registry()
                .call(&ctx, &name, &input, &args)
                .and_then(|v| v.to_json().map_err(CallError::from));
            match result {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("jq-runtime: error: {}", e);
                    std::process::exit(5);
                }
            }
        }
    }
}
