//! Interactive player reading moves from a terminal

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

use gridbot_core::{Agent, Game, Mark};

/// Reads one move per line; `q` or end of input resigns
pub struct HumanAgent<R> {
    input: R,
}

impl HumanAgent<io::StdinLock<'static>> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock())
    }
}

impl<R: BufRead> HumanAgent<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(err) => {
                tracing::warn!(%err, "failed to read move");
                None
            }
        }
    }
}

impl<G, R> Agent<G> for HumanAgent<R>
where
    G: Game,
    G::Move: FromStr,
    R: BufRead,
{
    fn name(&self) -> &str {
        "human"
    }

    fn next_move(&mut self, game: &G, mark: Mark) -> Option<G::Move> {
        let legal = game.legal_moves();
        if legal.is_empty() {
            return None;
        }

        loop {
            prompt(mark, &legal);
            let line = self.read_line()?;
            if line.eq_ignore_ascii_case("q") {
                return None;
            }

            match line.parse::<G::Move>() {
                Ok(mv) if legal.contains(&mv) => return Some(mv),
                Ok(mv) => println!("{} is not playable here", mv),
                Err(_) => println!("could not read '{}' as a move", line),
            }
        }
    }
}

fn prompt<M: Display>(mark: Mark, legal: &[M]) {
    let options: Vec<String> = legal.iter().map(|m| m.to_string()).collect();
    print!("{} to move [{}], q resigns: ", mark, options.join(" "));
    let _ = io::stdout().flush();
}
