use std::env;
use std::process;

use anyhow::{Context, Result};
use log::debug;

use rexer::{Dfa, Nfa, Regex};

fn compile(pattern: &str) -> Result<Dfa> {
    let regex = Regex::parse(pattern).context("failed to parse pattern")?;
    debug!("pattern tree: {}", regex);

    let nfa = Nfa::from_regex(&regex).context("failed to build NFA")?;
    debug!("NFA:\n{}", nfa);

    let dfa = Dfa::from_nfa(&nfa).context("failed to build DFA")?;
    Ok(dfa)
}

fn main() {
    env_logger::init();

    let patterns: Vec<String> = env::args().skip(1).collect();
    if patterns.is_empty() {
        eprintln!("Usage: rexer <pattern>...");
        process::exit(1);
    }

    let mut failed = false;
    for pattern in &patterns {
        match compile(pattern) {
            Ok(dfa) => println!("{}", dfa),
            Err(e) => {
                eprintln!("error: {:?}: {:#}", pattern, e);
                failed = true;
            }
        }
    }

    if failed {
        process::exit(1);
    }
}
