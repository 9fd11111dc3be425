//! Play command - one local game on either variant
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_initial(), play_variant()
//! - Level 3: build_agent()
//! - Level 4: output helpers

use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use gridbot_core::{
    play_game, Agent, Board, Game, GameRecord, GridGame, Mark, RandomAgent, Variant,
    DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH,
};
use gridbot_mcts::{MctsConfig, MctsPlayer, SelectionMode};

use crate::human::HumanAgent;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

/// Who controls a mark
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AgentKind {
    Mcts,
    Random,
    Human,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Game to play
    #[arg(long, default_value = "four-in-a-row")]
    pub variant: Variant,

    /// Player for O (moves first)
    #[arg(long = "o", value_enum, default_value = "human")]
    pub o: AgentKind,

    /// Player for X
    #[arg(long = "x", value_enum, default_value = "mcts")]
    pub x: AgentKind,

    /// MCTS budget per move in seconds
    #[arg(long, default_value = "1.0")]
    pub time: f64,

    /// MCTS samples children by UCT weight
    #[arg(long)]
    pub stochastic: bool,

    /// Grid width for grid-movement
    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    pub width: i32,

    /// Grid height for grid-movement
    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    pub height: i32,

    /// Random seed for MCTS and random players
    #[arg(long)]
    pub seed: Option<u64>,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs) -> Result<()> {
    tracing::info!("Playing {}: O={:?} X={:?}", args.variant, args.o, args.x);

    match args.variant {
        Variant::FourInARow => play_variant(Board::new(), &args),
        Variant::GridMovement => {
            let game = GridGame::new(args.width, args.height)
                .with_context(|| format!("Cannot build a {}x{} grid", args.width, args.height))?;
            play_variant(game, &args)
        }
    }
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn play_variant<G>(initial: G, args: &PlayArgs) -> Result<()>
where
    G: Game + Display,
    G::Move: FromStr,
{
    println!("{}\n", initial);

    let mut o = build_agent::<G>(args.o, args, 0);
    let mut x = build_agent::<G>(args.x, args, 1);

    let record = play_game(initial, Mark::O, [o.as_mut(), x.as_mut()], |state, mark, mv| {
        println!("{} plays {}\n{}\n", mark, mv, state);
    })
    .context("Game stopped on an illegal move")?;

    report_record(&record, args);
    Ok(())
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Agent of `kind`; `slot` keeps two seeded players from mirroring each other
fn build_agent<G>(kind: AgentKind, args: &PlayArgs, slot: u64) -> Box<dyn Agent<G>>
where
    G: Game,
    G::Move: FromStr,
{
    let seed = args.seed.map(|s| s.wrapping_add(slot * 7919));

    match kind {
        AgentKind::Mcts => Box::new(MctsPlayer::new(mcts_config(args, seed))),
        AgentKind::Random => Box::new(match seed {
            Some(seed) => RandomAgent::with_seed(seed),
            None => RandomAgent::new(),
        }),
        AgentKind::Human => Box::new(HumanAgent::stdin()),
    }
}

fn mcts_config(args: &PlayArgs, seed: Option<u64>) -> MctsConfig {
    let mode = if args.stochastic {
        SelectionMode::Stochastic
    } else {
        SelectionMode::Deterministic
    };
    let config = MctsConfig::timed(args.time).with_mode(mode);
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn report_record<G: Game>(record: &GameRecord<G>, args: &PlayArgs) {
    let player = |mark: Mark| match mark {
        Mark::O => args.o,
        Mark::X => args.x,
    };

    if let Some(mark) = record.resigned {
        println!("{} ({:?}) resigned", mark, player(mark));
    }
    match record.outcome.winner() {
        Some(mark) => println!("{} ({:?}) wins after {} moves", mark, player(mark), record.moves.len()),
        None => println!("Draw after {} moves", record.moves.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(o: AgentKind, x: AgentKind) -> PlayArgs {
        PlayArgs {
            variant: Variant::FourInARow,
            o,
            x,
            time: 0.01,
            stochastic: false,
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
            seed: Some(5),
        }
    }

    #[test]
    fn test_build_agent_names() {
        let a = args(AgentKind::Mcts, AgentKind::Random);
        assert_eq!(build_agent::<Board>(AgentKind::Mcts, &a, 0).name(), "mcts");
        assert_eq!(build_agent::<Board>(AgentKind::Random, &a, 1).name(), "random");
        assert_eq!(build_agent::<GridGame>(AgentKind::Human, &a, 0).name(), "human");
    }

    #[test]
    fn test_mcts_config_from_args() {
        let mut a = args(AgentKind::Mcts, AgentKind::Mcts);
        a.stochastic = true;
        let config = mcts_config(&a, Some(9));
        assert_eq!(config.mode, SelectionMode::Stochastic);
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_random_vs_random_game() {
        run(args(AgentKind::Random, AgentKind::Random)).unwrap();
    }

    #[test]
    fn test_grid_game_with_mcts() {
        let mut a = args(AgentKind::Mcts, AgentKind::Random);
        a.variant = Variant::GridMovement;
        a.width = 5;
        a.height = 5;
        run(a).unwrap();
    }

    #[test]
    fn test_grid_too_small() {
        let mut a = args(AgentKind::Random, AgentKind::Random);
        a.variant = Variant::GridMovement;
        a.width = 1;
        assert!(run(a).is_err());
    }
}
