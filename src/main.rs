mod report;

use plaintext::{Options, RuleSource, captions, convert_verbose, load_rules};
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    if config.captions {
        print!("{}", captions::rules_from_captions(&config.input));
        return;
    }

    let palette = report::Palette::new(config.color);
    let source = match &config.rules {
        Some(path) => RuleSource::File(path),
        None => RuleSource::DefaultFile,
    };

    let loaded = load_rules(source, config.options.data);
    report::print_diagnostics(&loaded.diagnostics, &palette);

    let res = convert_verbose(&config.input, &loaded.table, config.options.user);
    print!("{}", res.text);
    report::print_diagnostics(&res.diagnostics, &palette);
    eprintln!("{}", palette.style(report::Style::Emphasis, report::status_line(&res.text, res.changes)));

    if config.stats {
        report::print_stats(&source.to_string(), &loaded.table, &res.details, &palette);
    }
}

struct CliConfig {
    input: String,
    rules: Option<PathBuf>,
    options: Options,
    captions: bool,
    stats: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut input: Option<String> = None;
    let mut rules: Option<PathBuf> = None;
    let mut backslash = 0;
    let mut xml = 0;
    let mut captions = false;
    let mut stats = false;
    let mut color = io::stderr().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("plaintext {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--color" => color = true,
            "--no-color" => color = false,
            "--captions" => captions = true,
            "--stats" => stats = true,
            "-j" => backslash = 1,
            "-m" => xml = 1,
            "-d" | "--rules" => {
                let value = args.next().ok_or_else(|| format!("error: {arg} expects a file name"))?;
                rules = Some(PathBuf::from(value));
            }
            "--input" | "-i" => {
                let value = args.next().ok_or_else(|| "error: --input expects a value".to_string())?;
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value);
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.is_empty() {
                    if input.is_some() {
                        return Err("error: input provided multiple times".to_string());
                    }
                    input = Some(rest);
                }
                break;
            }
            _ if arg.starts_with("--rules=") => {
                rules = Some(PathBuf::from(arg.trim_start_matches("--rules=")));
            }
            _ if arg.starts_with("-d") => {
                rules = Some(PathBuf::from(&arg[2..]));
            }
            _ if arg.starts_with("-j") => backslash = parse_level(&arg)?,
            _ if arg.starts_with("-m") => xml = parse_level(&arg)?,
            _ if arg.starts_with("--input=") => {
                let value = arg.trim_start_matches("--input=");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(value.to_string());
            }
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                if input.is_some() {
                    return Err("error: input provided multiple times".to_string());
                }
                input = Some(rest);
                break;
            }
        }
    }

    let input = match input {
        Some(value) => value,
        None => read_stdin_input()?,
    };

    Ok(CliConfig { input, rules, options: Options::from_levels(backslash, xml), captions, stats, color })
}

/// `-j0`..`-j3` / `-m0`..`-m3`.
fn parse_level(arg: &str) -> Result<u8, String> {
    match &arg[2..] {
        level @ ("0" | "1" | "2" | "3") => level.parse().map_err(|_| format!("error: unknown option '{arg}'")),
        _ => Err(format!("error: unknown option '{arg}' (levels are 0 to 3)")),
    }
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer)
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "plaintext {version}

Rewrite Unicode text to plain text with an ordered rule table.

Usage:
  plaintext [OPTIONS] [--] <text...>
  plaintext [OPTIONS] --input <text>
  plaintext [OPTIONS] < input.txt
  plaintext --captions < captions.txt > {default_rules}

Options:
  -i, --input <text>     Text to convert. If omitted, reads remaining args
                         or stdin when no args are provided.
  -d, --rules <file>     Rule file (also -d<file>). Default: {default_rules}
                         in the working directory, ignored if missing.
  -j0 -j1 -j2 -j3        Backslash escapes: none, rule file (-j), input, both.
  -m0 -m1 -m2 -m3        XML references: none, rule file (-m), input, both.
  --captions             Turn 'U+XXXX = caption' lines into replace rules.
  --stats                Print rule hits and timings to stderr.
  --color                Force ANSI color output.
  --no-color             Disable ANSI color output.
  -h, --help             Show this help message.
  -V, --version          Print version information.

Converted text goes to stdout; diagnostics and the status line go to stderr.
Set RUST_LOG=plaintext=debug to trace rule loading and conversion.

Exit codes:
  0  Success.
  2  Invalid arguments or unreadable input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_rules = plaintext::DEFAULT_RULES_FILE,
    )
}
