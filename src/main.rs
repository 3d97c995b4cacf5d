use clap::Parser;
use qa_scheduler::{assign_qa_with_attempts, Assignment, DEFAULT_MAX_ATTEMPTS};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::HashSet;
use std::io::{self, BufRead};
use std::process::ExitCode;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

#[derive(Parser)]
#[command(name = "qa-scheduler")]
#[command(about = "Plans presentation sessions with balanced QA duty assignments")]
#[command(version)]
struct Cli {
    /// Group names; read from stdin when omitted
    groups: Vec<String>,

    /// Seed the random generator for a reproducible plan
    #[arg(long)]
    seed: Option<u64>,

    /// Cap on the search for an order without back-to-back mutual QA pairs
    #[arg(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,
}

enum LineOutcome {
    Added(String),
    Removed(String),
    NotFound(String),
    Duplicate(String),
    Skipped,
}

/// Applies one input line to the collected group list.
///
/// Blank lines are skipped, `delete:NAME` removes a previously entered name,
/// anything else is added unless it is already present.
fn apply_line(line: &str, groups: &mut Vec<String>) -> LineOutcome {
    let line = line.trim();
    if line.is_empty() {
        return LineOutcome::Skipped;
    }

    if line.to_lowercase().starts_with("delete:") {
        let name = line["delete:".len()..].trim().to_string();
        if let Some(pos) = groups.iter().position(|g| g == &name) {
            groups.remove(pos);
            return LineOutcome::Removed(name);
        }
        return LineOutcome::NotFound(name);
    }

    let name = line.to_string();
    if groups.contains(&name) {
        return LineOutcome::Duplicate(name);
    }
    groups.push(name.clone());
    LineOutcome::Added(name)
}

/// Reads group names from stdin until EOF or Ctrl+C.
fn read_groups(running: &AtomicBool) -> Vec<String> {
    // Check if stdin is a TTY (interactive terminal)
    #[cfg(unix)]
    let is_tty = {
        use std::os::unix::io::AsRawFd;
        unsafe { libc::isatty(io::stdin().as_raw_fd()) == 1 }
    };

    #[cfg(not(unix))]
    let is_tty = false;

    if is_tty {
        println!("Enter group names, one per line:");
        println!("  - Ctrl+D finishes input and builds the session plan");
        println!("  - Ctrl+C finishes input with whatever was entered so far");
        println!("  - 'delete:NAME' removes a previously entered name (e.g. delete:team-3)");
        println!();
    }

    let mut groups = Vec::new();
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let Ok(line) = line else { break };
        match apply_line(&line, &mut groups) {
            LineOutcome::Added(name) => {
                if is_tty {
                    println!("  added: {}", name);
                }
            }
            LineOutcome::Removed(name) => {
                if is_tty {
                    println!("  removed: {}", name);
                }
            }
            LineOutcome::NotFound(name) => eprintln!("  no such group: {}", name),
            LineOutcome::Duplicate(name) => eprintln!("  already entered: {}", name),
            LineOutcome::Skipped => {}
        }
    }

    groups
}

fn print_sessions(assignments: &[Assignment<String>]) {
    for (i, assignment) in assignments.iter().enumerate() {
        println!("Presentation {}:", i + 1);
        println!(" - Presenting group: {}", assignment.presenting);
        println!(" - QA groups: {}", assignment.qa.join(", "));
        println!();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let groups = if cli.groups.is_empty() {
        let running = Arc::new(AtomicBool::new(true));
        let r = running.clone();

        ctrlc::set_handler(move || {
            println!("\nCtrl+C received. Press Enter to build the plan from the entered groups.");
            r.store(false, Ordering::SeqCst);
        })
        .expect("Error setting Ctrl-C handler");

        read_groups(&running)
    } else {
        cli.groups
    };

    // Distinct names only; a duplicate would present twice.
    let mut seen = HashSet::new();
    for group in &groups {
        if !seen.insert(group) {
            eprintln!("error: duplicate group name: {}", group);
            return ExitCode::FAILURE;
        }
    }

    let mut rng: Box<dyn RngCore> = match cli.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let schedule = match assign_qa_with_attempts(&groups, &mut *rng, cli.max_attempts) {
        Ok(schedule) => schedule,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if schedule.is_best_effort() {
        eprintln!(
            "warning: no order without back-to-back mutual QA pairs was found after {} attempts",
            cli.max_attempts
        );
    }

    print_sessions(schedule.assignments());
    ExitCode::SUCCESS
}
