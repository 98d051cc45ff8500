// File: ./src/cli.rs
//! Command-line front end: argument handling, command execution and help.
use crate::config::Config;
use crate::model::{
    RecurrenceEngine, format_preview, has_nlp_tokens, interpret, parse_recurrence_rule,
};
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Parse {
        text: String,
        at: Option<NaiveDateTime>,
        json: bool,
    },
    Next {
        /// Date-only inputs are printed back without a time.
        from: NaiveDateTime,
        date_only: bool,
        rule: String,
        count: usize,
    },
    Check {
        text: String,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DD HH:MM`. The flag
/// is true for date-only input.
pub fn parse_instant(s: &str) -> Result<(NaiveDateTime, bool)> {
    for fmt in ["%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok((dt, false));
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD[THH:MM]", s))?;
    Ok((date.and_time(chrono::NaiveTime::MIN), true))
}

/// Parses the arguments after the binary name.
pub fn parse_args(args: &[String]) -> Result<CliArgs> {
    let mut root = None;
    let mut verbose = false;
    let mut json = false;
    let mut at = None;
    let mut count = 1usize;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                return Ok(CliArgs {
                    root,
                    verbose,
                    command: Command::Help,
                });
            }
            "-r" | "--root" => {
                let path = iter.next().context("--root requires a path")?;
                root = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => verbose = true,
            "--json" => json = true,
            "--at" => {
                let value = iter.next().context("--at requires a date")?;
                at = Some(parse_instant(value)?.0);
            }
            "--count" | "-n" => {
                let value = iter.next().context("--count requires a number")?;
                count = value
                    .parse()
                    .with_context(|| format!("Invalid count '{}'", value))?;
            }
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        None | Some("help") => Command::Help,
        Some("parse") => {
            let text = positional.collect::<Vec<_>>().join(" ");
            anyhow::ensure!(!text.trim().is_empty(), "parse requires capture text");
            Command::Parse { text, at, json }
        }
        Some("check") => Command::Check {
            text: positional.collect::<Vec<_>>().join(" "),
        },
        Some("next") => {
            let date = positional.next().context("next requires a date")?;
            let rule = positional.next().context("next requires a rule")?;
            let (from, date_only) = parse_instant(&date)?;
            Command::Next {
                from,
                date_only,
                rule,
                count,
            }
        }
        Some(other) => anyhow::bail!("Unknown command '{}'. Try --help.", other),
    };

    Ok(CliArgs {
        root,
        verbose,
        command,
    })
}

/// Executes a command and returns what should be printed.
pub fn run(command: &Command, config: &Config) -> Result<String> {
    let mut out = Vec::new();
    match command {
        Command::Parse { text, at, json } => {
            let mut task = interpret(text, *at);
            if task.priority.is_none() {
                task.priority = config.default_priority;
            }
            if *json || config.json_output {
                out.push(serde_json::to_string_pretty(&task)?);
            } else {
                out.push(format!("title:      {}", task.title));
                if let Some(d) = task.due_date {
                    out.push(format!("due:        {}", d.format("%Y-%m-%d")));
                }
                if let Some(t) = &task.due_time {
                    out.push(format!("time:       {}", t));
                }
                if let Some(p) = task.priority {
                    out.push(format!("priority:   {}", p));
                }
                if !task.categories.is_empty() {
                    out.push(format!("categories: {}", task.categories.join(", ")));
                }
                if !task.contexts.is_empty() {
                    out.push(format!("contexts:   {}", task.contexts.join(", ")));
                }
                if config.preview && has_nlp_tokens(text) {
                    out.push(format!("preview:    {}", format_preview(&task)));
                }
            }
        }
        Command::Next {
            from,
            date_only,
            rule,
            count,
        } => match parse_recurrence_rule(rule) {
            None => out.push("not recurring".to_string()),
            Some(rule) => {
                log::debug!("Computing {} occurrence(s) of '{}'", count, rule);
                let fmt = if *date_only { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M" };
                for next in RecurrenceEngine::occurrences(*from, &rule).take(*count) {
                    out.push(next.format(fmt).to_string());
                }
            }
        },
        Command::Check { text } => out.push(has_nlp_tokens(text).to_string()),
        Command::Help => out.push(help_text("quickcap")),
    }
    Ok(out.join("\n"))
}

pub fn help_text(binary_name: &str) -> String {
    let mut s = format!(
        "Quickcap v{} - quick-capture text interpreter and recurrence engine\n\n",
        env!("CARGO_PKG_VERSION")
    );
    s.push_str("USAGE:\n");
    s.push_str(&format!(
        "    {} parse <text...> [--at <date>] [--json]\n",
        binary_name
    ));
    s.push_str(&format!(
        "    {} next <date> <rule-json> [--count <n>]\n",
        binary_name
    ));
    s.push_str(&format!("    {} check <text...>\n", binary_name));
    s.push_str(&format!("    {} --help\n\n", binary_name));
    s.push_str("OPTIONS:\n");
    s.push_str("    -r, --root <path>     Use a different directory for config.\n");
    s.push_str("    -v, --verbose         Log debug output to stderr.\n");
    s.push_str("    --at <date>           Reference instant, YYYY-MM-DD[THH:MM] (default: now).\n");
    s.push_str("    --json                Print the parsed task as JSON.\n");
    s.push_str("    -n, --count <n>       Number of upcoming dates to print.\n");
    s.push_str("    -h, --help            Show this help message.\n\n");
    s.push_str("CAPTURE SYNTAX:\n");
    s.push_str("    !urgent !high !medium !low    Priority by name\n");
    s.push_str("    p1 p2 p3 p4                   Priority shorthand (p1 = urgent)\n");
    s.push_str("    !!! / !!                      Urgent / high\n");
    s.push_str("    #tag                          Category\n");
    s.push_str("    @tag                          Context\n");
    s.push_str("    tomorrow at 2pm, next monday, in 3 days, 2025-01-16, mar 5\n");
    s.push_str("                                  Due date and optional time\n\n");
    s.push_str("EXAMPLES:\n");
    s.push_str(&format!(
        "    {} parse \"Call dentist tomorrow at 2pm !high #health @phone\"\n",
        binary_name
    ));
    s.push_str(&format!(
        "    {} next 2025-01-31 '{{\"frequency\":\"monthly\"}}' --count 3\n",
        binary_name
    ));
    s.push_str(&format!(
        "    {} next 2025-03-05 '{{\"frequency\":\"weekly\",\"daysOfWeek\":[1,3,5]}}'",
        binary_name
    ));
    s
}

pub fn print_help(binary_name: &str) {
    println!("{}", help_text(binary_name));
}
