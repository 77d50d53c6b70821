//   Copyright (c) 2024-2026 Anton Kundenko <singaraiona@gmail.com>
//   All rights reserved.
//
//   Permission is hereby granted, free of charge, to any person obtaining a copy
//   of this software and associated documentation files (the "Software"), to deal
//   in the Software without restriction, including without limitation the rights
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//   copies of the Software, and to permit persons to whom the Software is
//   furnished to do so, subject to the following conditions:
//
//   The above copyright notice and this permission notice shall be included in all
//   copies or substantial portions of the Software.
//
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//   SOFTWARE.

mod prompt;
mod session;
mod theme;
mod validator;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::Parser;
use fesql_node::PlanNode;
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use tracing_subscriber::EnvFilter;

use prompt::PlanPrompt;
use session::Session;
use validator::SqlValidator;

#[derive(Parser)]
#[command(name = "fesql", version, about = "Print logical plans for fesql statements")]
struct Args {
    /// SQL to plan; omit to start the REPL
    sql: Option<String>,
    /// Plan every statement in a file
    #[arg(short, long)]
    file: Option<PathBuf>,
    /// Plan in request mode (rejects UNION and sub-query join sources)
    #[arg(long, env = "FESQL_REQUEST_MODE")]
    request: bool,
    /// Log filter used when RUST_LOG is unset, e.g. `debug` or `fesql_plan=trace`
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut session = Session::new(!args.request);
    let color = std::io::stdout().is_terminal();

    if let Some(ref sql) = args.sql {
        if !run_sql(&mut session, sql, color) {
            std::process::exit(1);
        }
        return;
    }

    if let Some(ref file) = args.file {
        if !run_file(&mut session, file, color) {
            std::process::exit(1);
        }
        return;
    }

    run_repl(session);
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Plan and print; returns false when planning failed.
fn run_sql(session: &mut Session, sql: &str, color: bool) -> bool {
    match session.plan(sql) {
        Ok(trees) => {
            print_trees(&trees, color);
            true
        }
        Err(e) => {
            print_error(&e, color);
            false
        }
    }
}

fn run_file(session: &mut Session, path: &Path, color: bool) -> bool {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            return false;
        }
    };
    run_sql(session, &contents, color)
}

fn run_repl(mut session: Session) {
    print_banner();

    let hinter = DefaultHinter::default()
        .with_style(nu_ansi_term::Style::new().fg(nu_ansi_term::Color::DarkGray));

    let history_path = dirs_or_home().join(".fesql_history");
    let history = match FileBackedHistory::with_file(1000, history_path.clone()) {
        Ok(history) => Some(history),
        Err(e) => {
            eprintln!(
                "{}Warning: history disabled ({}): {e}{}",
                theme::ERROR,
                history_path.display(),
                theme::R
            );
            None
        }
    };

    let editor = Reedline::create()
        .with_validator(Box::new(SqlValidator))
        .with_hinter(Box::new(hinter));
    let mut editor = match history {
        Some(history) => editor.with_history(Box::new(history)),
        None => editor,
    };

    loop {
        let prompt = PlanPrompt::new(session.is_batch_mode(), session.database());
        match editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed.starts_with('.') {
                    if !handle_dot_command(trimmed, &mut session) {
                        break;
                    }
                    continue;
                }
                run_sql(&mut session, trimmed, true);
            }
            Ok(Signal::CtrlD) => break,
            Ok(Signal::CtrlC) => continue,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_trees(trees: &[PlanNode], color: bool) {
    for tree in trees {
        let text = tree.to_string();
        for line in text.lines() {
            if color {
                println!("{}", colorize_line(line));
            } else {
                println!("{line}");
            }
        }
    }
}

/// Color the connector, the `[kType]` tag and the node details separately.
fn colorize_line(line: &str) -> String {
    use theme::*;

    let Some(open) = line.find('[') else {
        return format!("{DETAIL}{line}{R}");
    };
    let Some(close) = line[open..].find(']').map(|i| open + i) else {
        return format!("{DETAIL}{line}{R}");
    };
    format!(
        "{BRANCH}{}{R}{NODE}{}{R}{DETAIL}{}{R}",
        &line[..open],
        &line[open..=close],
        &line[close + 1..]
    )
}

fn print_error(err: &fesql_plan::SqlError, color: bool) {
    let status = fesql_plan::Status::from(err);
    if color {
        eprintln!("{}Error {status}{}", theme::ERROR, theme::R);
    } else {
        eprintln!("Error {status}");
    }
}

// ---------------------------------------------------------------------------
// Dot commands
// ---------------------------------------------------------------------------

/// Returns false when the REPL should exit.
fn handle_dot_command(cmd: &str, session: &mut Session) -> bool {
    let parts: Vec<&str> = cmd.split_whitespace().collect();
    match parts.as_slice() {
        [".mode"] => {
            let mode = if session.is_batch_mode() { "batch" } else { "request" };
            println!("Planning mode: {mode}");
        }
        [".mode", "batch"] => {
            session.set_batch_mode(true);
            println!("{}Planning mode: batch{}", theme::SUCCESS, theme::R);
        }
        [".mode", "request"] => {
            session.set_batch_mode(false);
            println!("{}Planning mode: request{}", theme::SUCCESS, theme::R);
        }
        [".mode", ..] => println!("Usage: .mode batch|request"),
        [".tables"] => {
            let names = session.table_names();
            if names.is_empty() {
                println!("No tables.");
            }
            for name in names {
                println!("  {name}");
            }
        }
        [".help"] => print_help(),
        [".quit"] | [".exit"] => return false,
        _ => println!("Unknown command: {}. Type .help for commands.", parts[0]),
    }
    true
}

// ---------------------------------------------------------------------------
// Banner & help
// ---------------------------------------------------------------------------

fn print_banner() {
    use theme::*;

    let tag = format!(
        "v{}  \u{b7}  {}",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );
    let help = "type .help for commands";
    let w = tag.chars().count().max(help.chars().count());
    println!(
        "{BAN_BORDER}\u{256d}\u{2500} {BOLD}{BAN_TITLE}fesql planner{R}{BAN_BORDER} \u{2500}{}\u{256e}{R}",
        "\u{2500}".repeat(w.saturating_sub(15))
    );
    for text in [&tag[..], help] {
        println!(
            "{BAN_BORDER}\u{2502}{R} {DIM}{text}{}{R} {BAN_BORDER}\u{2502}{R}",
            " ".repeat(w - text.chars().count())
        );
    }
    println!("{BAN_BORDER}\u{2570}{}\u{256f}{R}", "\u{2500}".repeat(w + 2));
    println!();
}

fn print_help() {
    use theme::*;

    println!("{BOLD}Commands:{R}");
    println!("  {DOT_CMD}.mode batch|request{R}  {DIM}Switch planning mode{R}");
    println!("  {DOT_CMD}.tables{R}              {DIM}List tables known to the catalog{R}");
    println!("  {DOT_CMD}.help{R}                {DIM}Show this help{R}");
    println!("  {DOT_CMD}.quit{R}                {DIM}Exit{R}");
    println!();
    println!("{BOLD}SQL{R} {DIM}(terminate with ;){R}");
    println!("  CREATE TABLE t1 (col1 int, ts timestamp);");
    println!("  SELECT col1, sum(col1) OVER w FROM t1");
    println!("    WINDOW w AS (PARTITION BY col1 ORDER BY ts ROWS BETWEEN 3 PRECEDING AND CURRENT ROW);");
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorize_splits_tag() {
        let out = colorize_line("  +-[kLimit] limit=10");
        assert!(out.contains("[kLimit]"));
        assert!(out.contains(" limit=10"));
        assert!(out.starts_with(theme::BRANCH));
    }

    #[test]
    fn args_parse() {
        let args = Args::parse_from(["fesql", "--request", "select 1"]);
        assert!(args.request);
        assert_eq!(args.sql.as_deref(), Some("select 1"));
        assert_eq!(args.log_level, "warn");
    }
}
