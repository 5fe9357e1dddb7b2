//! Console front end
//!
//! Answers resolver requests on stdin/stdout. Runs on a plain thread so a
//! blocked terminal read never holds up the async runtime.

use gamecat_scan::models::{CandidateSummary, LibraryDef};
use gamecat_scan::workflow::{DisambiguationPrompt, ResolverChoice, ResolverRequest};
use std::io::{self, BufRead, Write};
use tokio::sync::mpsc;

/// Serve resolver requests until the worker hangs up or stdin closes
pub fn run(mut requests: mpsc::Receiver<ResolverRequest>) {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    while let Some(request) = requests.blocking_recv() {
        match request {
            ResolverRequest::CreateLibrary {
                path,
                children,
                default_platform,
                reply,
            } => {
                println!();
                println!(
                    "{} contains only folders ({} sub-folders).",
                    path.display(),
                    children.len()
                );
                for child in children.iter().take(5) {
                    println!("    {}", child.display());
                }
                if children.len() > 5 {
                    println!("    ...");
                }

                let question = format!("Create a {} library here? [y/n] ", default_platform);
                let Some(accept) = ask(&mut input, &question, parse_library_answer) else {
                    return;
                };

                let def = accept.then(|| LibraryDef::for_folder(&path, default_platform));
                let _ = reply.send(def);
            }
            ResolverRequest::Disambiguate { prompt, reply } => {
                print_prompt(&prompt);
                let Some(choice) = ask(&mut input, "> ", |line| parse_choice(line, &prompt)) else {
                    return;
                };
                let _ = reply.send(choice);
            }
        }
    }
}

/// Prompt until `parse` accepts a line; `None` on end of input
fn ask<T>(
    input: &mut impl BufRead,
    question: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    loop {
        print!("{}", question);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return None,
            Ok(_) => {}
        }

        if let Some(answer) = parse(&line) {
            return Some(answer);
        }
        println!("Not understood, try again.");
    }
}

fn print_prompt(prompt: &DisambiguationPrompt) {
    println!();
    println!(
        "{}: '{}' ({}, {})",
        prompt.provider,
        prompt.searched_name,
        prompt.path.display(),
        prompt.platform
    );

    if prompt.candidates.is_empty() {
        println!("  No results.");
    }
    for (index, candidate) in prompt.candidates.iter().enumerate() {
        println!("  {:>2}. {}", index + 1, describe(candidate));
    }

    let mut commands = String::from("number = select, r <name> = retry, s = skip, x = exclude");
    if prompt.can_proceed_without {
        commands.push_str(", p = proceed without");
    }
    println!("  [{}]", commands);
}

fn describe(candidate: &CandidateSummary) -> String {
    let mut text = candidate.name.clone();
    if let Some(date) = candidate.release_date {
        text.push_str(&format!(" ({})", date));
    }
    if let Some(score) = candidate.score {
        text.push_str(&format!(" [score {:.0}]", score));
    }
    text
}

/// Parse one answer to a disambiguation prompt
pub fn parse_choice(line: &str, prompt: &DisambiguationPrompt) -> Option<ResolverChoice> {
    let line = line.trim();

    if let Some(name) = line.strip_prefix("r ") {
        let name = name.trim();
        return (!name.is_empty()).then(|| ResolverChoice::RetryWithName(name.to_string()));
    }

    match line {
        "s" => Some(ResolverChoice::Skip),
        "x" => Some(ResolverChoice::Exclude),
        "p" if prompt.can_proceed_without => Some(ResolverChoice::ProceedWithout),
        _ => {
            let index: usize = line.parse().ok()?;
            index
                .checked_sub(1)
                .and_then(|i| prompt.candidates.get(i))
                .map(|c| ResolverChoice::Select(c.clone()))
        }
    }
}

/// Parse a yes/no answer to a library prompt
pub fn parse_library_answer(line: &str) -> Option<bool> {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
