use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

/// Terminal outcome of a finished game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Ready,
    Playing,
    /// Terminal for this controller; escape is external reconstruction.
    GameOver(Outcome),
}

impl GameState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_over(self) -> bool {
        matches!(self, Self::GameOver(_))
    }
}

/// Notifications for UI/audio collaborators. Returned from the action that
/// produced them and never retained; the engine does not depend on anyone
/// consuming them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    LifeLost { remaining: Lives },
    Won,
    Lost,
}

/// Events emitted by one action. At most two in every reachable path, so they
/// stay inline.
pub type Events = SmallVec<[GameEvent; 2]>;

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    Unchanged,
    Toggled,
}

/// State machine driving one game session: Ready until the first reveal,
/// Playing while lives remain and safe cells are hidden, GameOver after.
///
/// The board is generated lazily on the first primary action so the clicked
/// cell can be excluded from mine placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameController {
    config: GameConfig,
    seed: u64,
    board: Option<Board>,
    state: GameState,
    lives: Lives,
}

impl GameController {
    /// Validates `config` up front; a bad configuration must fail here rather
    /// than degrade into an inconsistent board later.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lives: config.lives,
            config,
            seed,
            board: None,
            state: GameState::Ready,
        })
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn lives_remaining(&self) -> Lives {
        self.lives
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    /// Snapshot of one cell. While `Ready` every in-bounds cell reads as a
    /// default hidden cell, since the layout does not exist yet.
    pub fn cell_at(&self, pos: Pos) -> Result<Cell> {
        match &self.board {
            Some(board) => board.cell_at(pos),
            None if pos.in_bounds(self.config.width, self.config.height) => Ok(Cell::default()),
            None => Err(GameError::OutOfBounds),
        }
    }

    /// `(revealed safe cells, total safe cells)`, for progress displays.
    pub fn progress(&self) -> (CellCount, CellCount) {
        match &self.board {
            Some(board) => (board.revealed_safe_count(), board.safe_cell_count()),
            None => (0, self.config.safe_cells()),
        }
    }

    /// Reveal action. Generates the board on first use (excluding `pos`),
    /// flood-fills blank reveals, and settles lives and win/lose.
    ///
    /// Soft no-ops: after GameOver, on flagged cells, and on already-revealed
    /// cells. Out-of-bounds coordinates are an error in every state.
    pub fn primary_action(&mut self, pos: Pos) -> Result<Events> {
        let mut events = Events::new();

        if !pos.in_bounds(self.config.width, self.config.height) {
            return Err(GameError::OutOfBounds);
        }
        if self.state.is_over() {
            return Ok(events);
        }

        if self.board.is_none() {
            let mut rng = SmallRng::seed_from_u64(self.seed);
            self.board = Some(Board::generate(&self.config, pos, &mut rng)?);
            self.state = GameState::Playing;
            events.push(GameEvent::Started);
            log::debug!(
                "game started: {}x{}, {} mines, {} lives",
                self.config.width,
                self.config.height,
                self.config.mines,
                self.lives
            );
        }

        let board = self.board.as_mut().expect("board exists while playing");
        if board[pos].is_flagged() {
            return Ok(events);
        }

        match reveal_single(board, pos)? {
            RevealResult::Unchanged => return Ok(events),
            RevealResult::Revealed(CellKind::Safe(0)) => {
                reveal_connected(board, pos)?;
            }
            RevealResult::Revealed(CellKind::Safe(_)) => {}
            RevealResult::Revealed(CellKind::Mine) => {
                self.lives -= 1;
                events.push(GameEvent::LifeLost {
                    remaining: self.lives,
                });
                if self.lives == 0 {
                    self.state = GameState::GameOver(Outcome::Lose);
                    reveal_all_mines(board);
                    events.push(GameEvent::Lost);
                    log::debug!("game lost at {pos:?}");
                } else {
                    board[pos].mark_spent();
                }
            }
        }

        // Win is re-checked after every reveal, mine hits included. A mine
        // reveal never advances the safe count, so on that path the branch
        // cannot fire; it stays unconditional to match the reference rules.
        if self.state == GameState::Playing
            && board.revealed_safe_count() == board.safe_cell_count()
        {
            self.state = GameState::GameOver(Outcome::Win);
            reveal_all_mines(board);
            events.push(GameEvent::Won);
            log::debug!("game won");
        }

        Ok(events)
    }

    /// Flag action: toggles the flag on an unrevealed cell. No-op on revealed
    /// cells, after GameOver, and while `Ready` (no board to flag yet).
    pub fn secondary_action(&mut self, pos: Pos) -> Result<FlagOutcome> {
        if !pos.in_bounds(self.config.width, self.config.height) {
            return Err(GameError::OutOfBounds);
        }
        if self.state.is_over() {
            return Ok(FlagOutcome::Unchanged);
        }

        let Some(board) = self.board.as_mut() else {
            return Ok(FlagOutcome::Unchanged);
        };

        if board[pos].toggle_flag() {
            Ok(FlagOutcome::Toggled)
        } else {
            Ok(FlagOutcome::Unchanged)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn controller(
        width: Coord,
        height: Coord,
        mines: CellCount,
        lives: Lives,
        seed: u64,
    ) -> GameController {
        GameController::new(
            GameConfig {
                width,
                height,
                mines,
                lives,
            },
            seed,
        )
        .unwrap()
    }

    fn find_mine(game: &GameController) -> Pos {
        let config = game.config();
        (0..config.width)
            .flat_map(|col| (0..config.height).map(move |row| Pos::new(col, row)))
            .find(|&pos| game.cell_at(pos).unwrap().kind().is_mine())
            .unwrap()
    }

    /// First-clicks (0,0) with increasing seeds until the game is still in
    /// play, so tests that need a mid-game board are not derailed by an
    /// instant flood-fill win.
    fn playing_game(width: Coord, height: Coord, mines: CellCount, lives: Lives) -> GameController {
        for seed in 0..200 {
            let mut game = controller(width, height, mines, lives, seed);
            game.primary_action(Pos::new(0, 0)).unwrap();
            if game.state() == GameState::Playing {
                return game;
            }
        }
        panic!("every seed won on the first click");
    }

    #[test]
    fn new_rejects_bad_configuration() {
        let bad = GameConfig {
            width: 4,
            height: 4,
            mines: 16,
            lives: 3,
        };
        assert_eq!(
            GameController::new(bad, 0),
            Err(GameError::MineCountOutOfRange)
        );

        let no_lives = GameConfig {
            width: 4,
            height: 4,
            mines: 3,
            lives: 0,
        };
        assert_eq!(GameController::new(no_lives, 0), Err(GameError::ZeroLives));
    }

    #[test]
    fn first_reveal_starts_game_and_never_hits_a_mine() {
        for seed in 0..20 {
            let mut game = controller(3, 3, 1, 1, seed);
            assert!(game.state().is_ready());

            let events = game.primary_action(Pos::new(0, 0)).unwrap();

            assert_eq!(events.first(), Some(&GameEvent::Started));
            assert!(!events.contains(&GameEvent::Lost));
            assert_ne!(game.state(), GameState::GameOver(Outcome::Lose));
            assert!(game.cell_at(Pos::new(0, 0)).unwrap().is_revealed());
        }
    }

    #[test]
    fn first_reveal_on_zero_cell_flood_fills_component() {
        // Find a seed where the first click lands on a blank cell, then check
        // against a reference walk that the whole blank-connected component
        // plus its count border opened in that one call, and nothing else.
        for seed in 0..50 {
            let mut game = controller(3, 3, 1, 1, seed);
            game.primary_action(Pos::new(0, 0)).unwrap();

            if !game.cell_at(Pos::new(0, 0)).unwrap().kind().is_blank() {
                continue;
            }

            let mut expected: alloc::collections::BTreeSet<Pos> = [Pos::new(0, 0)].into();
            let mut frontier = alloc::vec![Pos::new(0, 0)];
            while let Some(pos) = frontier.pop() {
                for col in pos.col.saturating_sub(1)..(pos.col + 2).min(3) {
                    for row in pos.row.saturating_sub(1)..(pos.row + 2).min(3) {
                        let next = Pos::new(col, row);
                        let kind = game.cell_at(next).unwrap().kind();
                        if !kind.is_mine() && expected.insert(next) && kind.is_blank() {
                            frontier.push(next);
                        }
                    }
                }
            }

            // If the component covered every safe cell the game is already
            // won, and end-of-game disclosure reveals the mine.
            let won = game.state().is_over();
            for col in 0..3 {
                for row in 0..3 {
                    let pos = Pos::new(col, row);
                    let cell = game.cell_at(pos).unwrap();
                    if cell.kind().is_mine() {
                        assert_eq!(cell.is_revealed(), won, "mine at {pos:?}");
                    } else {
                        assert_eq!(cell.is_revealed(), expected.contains(&pos), "at {pos:?}");
                    }
                }
            }
            return;
        }
        panic!("no seed produced a blank first click");
    }

    #[test]
    fn revealing_last_safe_cell_wins_and_discloses_mines() {
        let mut game = controller(2, 2, 1, 1, 11);
        game.primary_action(Pos::new(0, 0)).unwrap();
        let mine = find_mine(&game);

        let mut last_events = Events::new();
        for col in 0..2 {
            for row in 0..2 {
                let pos = Pos::new(col, row);
                if pos != mine {
                    last_events = game.primary_action(pos).unwrap();
                }
            }
        }

        assert_eq!(game.state(), GameState::GameOver(Outcome::Win));
        assert!(last_events.contains(&GameEvent::Won));
        assert!(game.cell_at(mine).unwrap().is_revealed());
        let (revealed, total) = game.progress();
        assert_eq!(revealed, total);
    }

    #[test]
    fn mine_reveal_with_last_life_loses() {
        let mut game = controller(2, 2, 1, 1, 5);
        game.primary_action(Pos::new(0, 0)).unwrap();
        let mine = find_mine(&game);

        let events = game.primary_action(mine).unwrap();

        assert_eq!(game.state(), GameState::GameOver(Outcome::Lose));
        assert_eq!(game.lives_remaining(), 0);
        assert_eq!(
            events.as_slice(),
            [GameEvent::LifeLost { remaining: 0 }, GameEvent::Lost]
        );
        assert!(game.cell_at(mine).unwrap().is_revealed());
    }

    #[test]
    fn mine_reveal_with_spare_lives_continues_play() {
        let mut game = playing_game(4, 4, 3, 2);
        let mine = find_mine(&game);

        let events = game.primary_action(mine).unwrap();

        assert_eq!(game.state(), GameState::Playing);
        assert_eq!(game.lives_remaining(), 1);
        assert_eq!(events.as_slice(), [GameEvent::LifeLost { remaining: 1 }]);

        let cell = game.cell_at(mine).unwrap();
        assert!(cell.is_revealed());
        assert!(cell.is_spent());

        // Exactly that one mine is revealed.
        let revealed_mines = (0..4)
            .flat_map(|col| (0..4).map(move |row| Pos::new(col, row)))
            .filter(|&pos| {
                let cell = game.cell_at(pos).unwrap();
                cell.kind().is_mine() && cell.is_revealed()
            })
            .count();
        assert_eq!(revealed_mines, 1);
    }

    #[test]
    fn repeated_reveal_is_a_silent_no_op() {
        let mut game = playing_game(4, 4, 3, 2);

        let before = game.clone();
        let events = game.primary_action(Pos::new(0, 0)).unwrap();

        assert!(events.is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn flag_shields_cell_from_primary_action() {
        let mut game = playing_game(4, 4, 3, 1);
        let mine = find_mine(&game);

        assert_eq!(game.secondary_action(mine).unwrap(), FlagOutcome::Toggled);
        let events = game.primary_action(mine).unwrap();

        assert!(events.is_empty());
        assert_eq!(game.state(), GameState::Playing);
        assert!(!game.cell_at(mine).unwrap().is_revealed());

        // Unflag, then the reveal proceeds normally.
        assert_eq!(game.secondary_action(mine).unwrap(), FlagOutcome::Toggled);
        let events = game.primary_action(mine).unwrap();
        assert!(events.contains(&GameEvent::LifeLost { remaining: 0 }));
    }

    #[test]
    fn flagging_is_inert_before_first_reveal_and_after_game_over() {
        let mut game = controller(2, 2, 1, 1, 2);

        assert_eq!(
            game.secondary_action(Pos::new(0, 0)).unwrap(),
            FlagOutcome::Unchanged
        );

        game.primary_action(Pos::new(0, 0)).unwrap();
        let mine = find_mine(&game);
        game.primary_action(mine).unwrap();
        assert!(game.state().is_over());

        assert_eq!(
            game.secondary_action(Pos::new(0, 0)).unwrap(),
            FlagOutcome::Unchanged
        );
    }

    #[test]
    fn flagging_a_revealed_cell_does_nothing() {
        let mut game = playing_game(3, 3, 2, 1);

        assert_eq!(
            game.secondary_action(Pos::new(0, 0)).unwrap(),
            FlagOutcome::Unchanged
        );
        assert!(!game.cell_at(Pos::new(0, 0)).unwrap().is_flagged());
    }

    #[test]
    fn actions_after_game_over_are_silent_no_ops() {
        let mut game = controller(2, 2, 1, 1, 5);
        game.primary_action(Pos::new(0, 0)).unwrap();
        game.primary_action(find_mine(&game)).unwrap();
        assert!(game.state().is_over());

        let before = game.clone();
        assert!(game.primary_action(Pos::new(0, 0)).unwrap().is_empty());
        assert_eq!(game, before);
    }

    #[test]
    fn out_of_bounds_is_an_error_in_every_state() {
        let mut game = controller(2, 2, 1, 1, 0);

        assert_eq!(
            game.primary_action(Pos::new(2, 0)),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            game.secondary_action(Pos::new(0, 9)),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(game.cell_at(Pos::new(2, 2)), Err(GameError::OutOfBounds));
    }

    #[test]
    fn progress_is_available_before_generation() {
        let game = controller(5, 4, 6, 2, 0);

        assert_eq!(game.progress(), (0, 14));
        assert_eq!(game.cell_at(Pos::new(4, 3)), Ok(Cell::default()));
    }

    #[test]
    fn controller_round_trips_through_serde() {
        let mut game = playing_game(4, 4, 3, 2);
        game.secondary_action(find_mine(&game)).unwrap();

        let json = serde_json::to_string(&game).unwrap();
        let restored: GameController = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, game);
    }

    #[test]
    fn same_seed_generates_identical_layouts() {
        let mut first = controller(6, 6, 8, 1, 42);
        let mut second = controller(6, 6, 8, 1, 42);

        first.primary_action(Pos::new(3, 3)).unwrap();
        second.primary_action(Pos::new(3, 3)).unwrap();

        let mines = |game: &GameController| -> Vec<Pos> {
            (0..6)
                .flat_map(|col| (0..6).map(move |row| Pos::new(col, row)))
                .filter(|&pos| game.cell_at(pos).unwrap().kind().is_mine())
                .collect()
        };
        assert_eq!(mines(&first), mines(&second));
    }
}
