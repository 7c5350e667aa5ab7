//! Grid-maze environment for the planner framework.
//!
//! A simple maze navigation problem implemented as an MDP: an agent moves on
//! a rows×cols grid towards a goal tile, paying a small cost per step, a
//! large cost for bumping the boundary, and risking capture on trap tiles.
//!
//! The generative [`Mdp::step`] interface serves sampling-based planners
//! (UCT); the full-width [`Mdp::expand`] / [`Mdp::list_states`] interface
//! serves exhaustive planners (value iteration) and tree expansion.

use mdp_core::{Mdp, Outcome};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use std::fmt;
use tracing::{debug, warn};

/// Agent location on the grid. The grid itself is persistent and belongs to
/// the maze, so the position is the complete MDP state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub row: usize,
    pub col: usize,
}

impl GridPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// City-block distance to another position.
    pub fn manhattan(&self, other: &GridPos) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The four movement actions. Every state offers all four; moving into the
/// boundary keeps the agent in place at a penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MazeAction {
    Up,
    Down,
    Left,
    Right,
}

impl MazeAction {
    pub const ALL: [MazeAction; 4] = [
        MazeAction::Up,
        MazeAction::Down,
        MazeAction::Left,
        MazeAction::Right,
    ];

    /// One-letter name used in policy grids and step traces.
    pub fn letter(&self) -> char {
        match self {
            MazeAction::Up => 'U',
            MazeAction::Down => 'D',
            MazeAction::Left => 'L',
            MazeAction::Right => 'R',
        }
    }
}

impl fmt::Display for MazeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Reward constants of the maze MDP.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rewards {
    /// Regular movement cost.
    pub step: f64,
    /// Penalty for moving into the boundary (agent stays put).
    pub bump: f64,
    /// Penalty per step spent caught in a trap.
    pub trap: f64,
    /// Reward for entering the goal tile.
    pub goal: f64,
}

impl Default for Rewards {
    fn default() -> Self {
        Self {
            step: -1.0,
            bump: -10.0,
            trap: -5.0,
            goal: 10.0,
        }
    }
}

/// Maze construction parameters.
#[derive(Debug, Clone)]
pub struct MazeConfig {
    pub rows: usize,
    pub cols: usize,
    /// Number of trap tiles placed on random empty tiles.
    pub traps: usize,
    /// Probability of remaining caught when standing on a trap.
    pub p_trap: f64,
    pub start: GridPos,
    pub goal: GridPos,
    pub rewards: Rewards,
}

impl MazeConfig {
    /// Config with the goal in the bottom-right corner, start at the origin
    /// and no traps.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            traps: 0,
            p_trap: 0.5,
            start: GridPos::new(0, 0),
            goal: GridPos::new(rows - 1, cols - 1),
            rewards: Rewards::default(),
        }
    }

    pub fn with_traps(mut self, traps: usize, p_trap: f64) -> Self {
        self.traps = traps;
        self.p_trap = p_trap;
        self
    }

    pub fn with_start(mut self, start: GridPos) -> Self {
        self.start = start;
        self
    }

    pub fn with_goal(mut self, goal: GridPos) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_rewards(mut self, rewards: Rewards) -> Self {
        self.rewards = rewards;
        self
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self::new(6, 6).with_traps(4, 0.5)
    }
}

/// Tile contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Floor,
    Trap,
    Goal,
}

impl Tile {
    fn glyph(&self) -> char {
        match self {
            Tile::Floor => '_',
            Tile::Trap => 'O',
            Tile::Goal => 'X',
        }
    }
}

/// The maze MDP: grid topology, trap layout and reward distribution.
#[derive(Debug, Clone)]
pub struct Maze {
    rows: usize,
    cols: usize,
    p_trap: f64,
    start: GridPos,
    goal: GridPos,
    rewards: Rewards,
    grid: Vec<Tile>,
}

impl Maze {
    /// Build a maze from `config`, placing traps on random empty tiles using
    /// `rng`. Trap layout is a function of the generator state only, so a
    /// dedicated seeded generator reproduces the same maze.
    pub fn new(config: MazeConfig, rng: &mut ChaCha20Rng) -> Self {
        assert!(config.rows > 0 && config.cols > 0, "maze must be non-empty");
        assert!(
            config.goal.row < config.rows && config.goal.col < config.cols,
            "goal must lie on the grid"
        );
        assert!(
            config.start.row < config.rows && config.start.col < config.cols,
            "start must lie on the grid"
        );

        let mut grid = vec![Tile::Floor; config.rows * config.cols];
        grid[config.goal.row * config.cols + config.goal.col] = Tile::Goal;

        // The goal tile never hosts a trap, so at most rows*cols - 1 fit.
        let mut traps = config.traps;
        let capacity = config.rows * config.cols - 1;
        if traps > capacity {
            warn!(
                requested = config.traps,
                capacity, "too many traps requested, clamping"
            );
            traps = capacity;
        }

        let mut placed = 0;
        while placed < traps {
            let row = rng.gen_range(0..config.rows);
            let col = rng.gen_range(0..config.cols);
            let idx = row * config.cols + col;
            if grid[idx] == Tile::Floor {
                grid[idx] = Tile::Trap;
                placed += 1;
            }
        }

        debug!(
            rows = config.rows,
            cols = config.cols,
            traps,
            p_trap = config.p_trap,
            goal = %config.goal,
            "maze created"
        );

        Self {
            rows: config.rows,
            cols: config.cols,
            p_trap: config.p_trap,
            start: config.start,
            goal: config.goal,
            rewards: config.rewards,
            grid,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start(&self) -> GridPos {
        self.start
    }

    pub fn goal(&self) -> GridPos {
        self.goal
    }

    pub fn rewards(&self) -> &Rewards {
        &self.rewards
    }

    pub fn tile(&self, pos: GridPos) -> Tile {
        self.grid[pos.row * self.cols + pos.col]
    }

    /// Resolve a move from `pos`: the destination and the reward for the
    /// attempt (goal entry is rewarded separately).
    fn resolve_move(&self, pos: GridPos, action: MazeAction) -> (GridPos, f64) {
        let mut next = pos;
        let moved = match action {
            MazeAction::Up => {
                if pos.row > 0 {
                    next.row -= 1;
                    true
                } else {
                    false
                }
            }
            MazeAction::Down => {
                if pos.row + 1 < self.rows {
                    next.row += 1;
                    true
                } else {
                    false
                }
            }
            MazeAction::Left => {
                if pos.col > 0 {
                    next.col -= 1;
                    true
                } else {
                    false
                }
            }
            MazeAction::Right => {
                if pos.col + 1 < self.cols {
                    next.col += 1;
                    true
                } else {
                    false
                }
            }
        };

        let mut reward = if moved {
            self.rewards.step
        } else {
            self.rewards.bump
        };
        if next == self.goal {
            reward = self.rewards.goal;
        }
        (next, reward)
    }

    /// Render the grid with an optional agent marker.
    pub fn render(&self, agent: Option<GridPos>) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols * 3 + 1));
        for row in 0..self.rows {
            for col in 0..self.cols {
                let pos = GridPos::new(row, col);
                let glyph = if agent == Some(pos) {
                    '*'
                } else {
                    self.tile(pos).glyph()
                };
                out.push(' ');
                out.push(glyph);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

impl Mdp for Maze {
    type State = GridPos;
    type Action = MazeAction;

    fn actions(&self, _state: &GridPos) -> Vec<MazeAction> {
        MazeAction::ALL.to_vec()
    }

    fn step(&self, state: &mut GridPos, action: MazeAction, rng: &mut ChaCha20Rng) -> (f64, bool) {
        // A trapped agent escapes only with probability 1 - p_trap; while
        // caught, the chosen action is not executed.
        if self.tile(*state) == Tile::Trap && rng.gen_bool(self.p_trap) {
            return (self.rewards.trap, false);
        }

        let (next, reward) = self.resolve_move(*state, action);
        *state = next;
        (reward, next == self.goal)
    }

    fn expand(&self, state: &GridPos, action: MazeAction) -> Vec<Outcome<GridPos>> {
        let mut outcomes = Vec::with_capacity(2);
        let mut move_probability = 1.0;

        if self.tile(*state) == Tile::Trap {
            outcomes.push(Outcome {
                state: *state,
                reward: self.rewards.trap,
                probability: self.p_trap,
            });
            move_probability = 1.0 - self.p_trap;
        }

        let (next, reward) = self.resolve_move(*state, action);
        outcomes.push(Outcome {
            state: next,
            reward,
            probability: move_probability,
        });
        outcomes
    }

    fn list_states(&self) -> Vec<GridPos> {
        let mut states = Vec::with_capacity(self.rows * self.cols);
        for row in 0..self.rows {
            for col in 0..self.cols {
                states.push(GridPos::new(row, col));
            }
        }
        states
    }

    fn is_terminal(&self, state: &GridPos) -> bool {
        *state == self.goal
    }
}
