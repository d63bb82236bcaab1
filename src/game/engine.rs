use super::{
    action::{Direction, Turn},
    config::GameConfig,
    state::{GameState, Position, Snake},
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

/// Food placement failed because the snake occupies every cell of the grid.
#[derive(Debug, Clone, Error)]
#[error("no free cell for food placement: snake occupies all {cells} cells")]
pub struct InvalidPlacementError {
    pub cells: usize,
}

/// What ended the episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// Frame budget exceeded without progress
    Stall,
}

/// Information about a step
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    /// Whether the snake ate food this step
    pub ate_food: bool,
    /// What terminated the episode, if anything
    pub collision: Option<CollisionType>,
}

/// Result of a game step; the running score travels in [`GameState`]
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Reward for this step
    pub reward: f32,
    /// Whether the episode has terminated
    pub terminated: bool,
    /// Additional information about the step
    pub info: StepInfo,
}

/// The game engine that owns the transition rules
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create an engine with a fixed seed for reproducible food placement
    pub fn seeded(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Reset the game to initial state: snake centered heading right,
    /// score and frame counter zeroed, food on a free cell
    pub fn reset(&mut self) -> Result<GameState, InvalidPlacementError> {
        let center_x = (self.config.grid_width / 2) as i32;
        let center_y = (self.config.grid_height / 2) as i32;

        let snake = Snake::new(
            Position::new(center_x, center_y),
            Direction::Right,
            self.config.initial_snake_length,
        );

        let food = self.place_food(&snake)?;

        Ok(GameState::new(
            snake,
            food,
            self.config.grid_width,
            self.config.grid_height,
        ))
    }

    /// Execute one step of the game with a relative action.
    ///
    /// The heading rotates through the clockwise ring, the new head is
    /// inserted at the front, then termination is decided: wall or body hit,
    /// or the frame counter exceeding `stall_multiplier * snake length`. A
    /// terminal step rewards `death_penalty`; eating food rewards
    /// `food_reward`, bumps the score and retains the tail (net growth of
    /// one); otherwise the reward is zero and the tail is removed.
    pub fn step(
        &mut self,
        state: &mut GameState,
        turn: Turn,
    ) -> Result<StepResult, InvalidPlacementError> {
        if !state.is_alive {
            return Ok(StepResult {
                reward: 0.0,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision: None,
                },
            });
        }

        state.frames += 1;
        state.snake.direction = state.snake.direction.turned(turn);

        // Insert the new head; the tail is only removed further down, on the
        // no-food path of a non-terminal step.
        let new_head = state.snake.head().moved_in_direction(state.snake.direction);
        state.snake.body.insert(0, new_head);

        if let Some(collision) = self.check_termination(state, new_head) {
            state.is_alive = false;

            return Ok(StepResult {
                reward: self.config.death_penalty,
                terminated: true,
                info: StepInfo {
                    ate_food: false,
                    collision: Some(collision),
                },
            });
        }

        let ate_food = new_head == state.food;
        let mut reward = 0.0;

        if ate_food {
            state.score += 1;
            state.food = self.place_food(&state.snake)?;
            reward = self.config.food_reward;
        } else {
            state.snake.body.pop();
        }

        Ok(StepResult {
            reward,
            terminated: false,
            info: StepInfo {
                ate_food,
                collision: None,
            },
        })
    }

    /// Classify what, if anything, ends the episode at this head position
    fn check_termination(&self, state: &GameState, head: Position) -> Option<CollisionType> {
        if !state.is_in_bounds(head) {
            return Some(CollisionType::Wall);
        }

        // body_segments excludes the just-inserted head
        if state.snake.collides_with_body(head) {
            return Some(CollisionType::SelfCollision);
        }

        if state.frames > self.config.stall_multiplier * state.snake.len() as u32 {
            return Some(CollisionType::Stall);
        }

        None
    }

    /// Place food on a random cell not occupied by the snake.
    ///
    /// Rejection-samples for a bounded number of attempts, then falls back to
    /// enumerating the free cells directly. Errors only when the snake fills
    /// the entire grid.
    fn place_food(&mut self, snake: &Snake) -> Result<Position, InvalidPlacementError> {
        let cells = self.config.grid_width * self.config.grid_height;

        if snake.len() < cells {
            // Expected O(1) retries while the board is mostly empty.
            let attempts = 4 * cells;
            for _ in 0..attempts {
                let x = self.rng.gen_range(0..self.config.grid_width) as i32;
                let y = self.rng.gen_range(0..self.config.grid_height) as i32;
                let pos = Position::new(x, y);

                if !snake.occupies(pos) {
                    return Ok(pos);
                }
            }
        }

        let free: Vec<Position> = (0..self.config.grid_height as i32)
            .flat_map(|y| (0..self.config.grid_width as i32).map(move |x| Position::new(x, y)))
            .filter(|pos| !snake.occupies(*pos))
            .collect();

        if free.is_empty() {
            return Err(InvalidPlacementError { cells });
        }

        Ok(free[self.rng.gen_range(0..free.len())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> GameEngine {
        GameEngine::seeded(GameConfig::small(), 7)
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let state = engine.reset().unwrap();

        assert!(state.is_alive);
        assert_eq!(state.score, 0);
        assert_eq!(state.frames, 0);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(!state.snake.occupies(state.food));
    }

    #[test]
    fn test_straight_step_keeps_length() {
        let mut engine = engine();
        let mut state = engine.reset().unwrap();
        // Keep food out of the way
        state.food = Position::new(0, 0);
        let initial_head = state.snake.head();

        let result = engine.step(&mut state, Turn::Straight).unwrap();

        assert!(!result.terminated);
        assert!(!result.info.ate_food);
        assert_eq!(result.reward, 0.0);
        assert_eq!(state.frames, 1);
        assert_eq!(state.snake.len(), 3);
        assert_eq!(state.snake.head(), initial_head.moved_by(1, 0));
    }

    #[test]
    fn test_food_consumption_grows_by_one() {
        let mut engine = engine();
        let mut state = engine.reset().unwrap();

        // Place food directly in front of the snake
        let head = state.snake.head();
        state.food = head.moved_in_direction(state.snake.direction);
        let initial_length = state.snake.len();

        let result = engine.step(&mut state, Turn::Straight).unwrap();

        assert!(result.info.ate_food);
        assert_eq!(result.reward, 10.0);
        assert_eq!(state.score, 1);
        assert_eq!(state.snake.len(), initial_length + 1);
        // Replacement food avoids the grown snake
        assert!(!state.snake.occupies(state.food));
    }

    #[test]
    fn test_wall_collision() {
        let mut engine = engine();
        let mut state = GameState::new(
            Snake::new(Position::new(0, 5), Direction::Left, 3),
            Position::new(5, 5),
            10,
            10,
        );

        let result = engine.step(&mut state, Turn::Straight).unwrap();

        assert!(result.terminated);
        assert!(!state.is_alive);
        assert_eq!(result.reward, -10.0);
        assert_eq!(result.info.collision, Some(CollisionType::Wall));
    }

    #[test]
    fn test_self_collision() {
        let mut engine = engine();

        // Snake at (5, 5) going Right with length 5:
        // (5,5), (4,5), (3,5), (2,5), (1,5)
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 5);
        let mut state = GameState::new(snake, Position::new(8, 8), 10, 10);

        // Right, down, left: the fourth move turns back up into (5,5),
        // still occupied by the body.
        engine.step(&mut state, Turn::Straight).unwrap();
        engine.step(&mut state, Turn::Right).unwrap();
        engine.step(&mut state, Turn::Right).unwrap();
        let result = engine.step(&mut state, Turn::Right).unwrap();

        assert!(result.terminated);
        assert_eq!(result.info.collision, Some(CollisionType::SelfCollision));
    }

    #[test]
    fn test_turns_follow_clockwise_ring() {
        let mut engine = engine();
        let mut state = engine.reset().unwrap();
        state.food = Position::new(0, 0);

        assert_eq!(state.snake.direction, Direction::Right);
        engine.step(&mut state, Turn::Right).unwrap();
        assert_eq!(state.snake.direction, Direction::Down);
        engine.step(&mut state, Turn::Left).unwrap();
        assert_eq!(state.snake.direction, Direction::Right);
    }

    #[test]
    fn test_stall_guard_terminates_episode() {
        let config = GameConfig::small();
        let stall = config.stall_multiplier;
        let mut engine = GameEngine::seeded(config, 3);
        let mut state = engine.reset().unwrap();
        // Unreachable food, so the snake can circle forever
        state.food = Position::new(0, 0);

        let mut last = None;
        // Circle a 2x2 block; never hits a wall or itself
        for turn in std::iter::repeat(Turn::Right) {
            let result = engine.step(&mut state, turn).unwrap();
            if result.terminated {
                last = Some(result);
                break;
            }
        }

        let result = last.unwrap();
        assert_eq!(result.info.collision, Some(CollisionType::Stall));
        assert_eq!(result.reward, -10.0);
        // len is 4 at the check: the new head is inserted before the tail pop
        assert!(state.frames <= stall * 4 + 1);
    }

    #[test]
    fn test_terminated_game_no_update() {
        let mut engine = engine();
        let mut state = engine.reset().unwrap();
        state.is_alive = false;
        let frames_before = state.frames;

        let result = engine.step(&mut state, Turn::Straight).unwrap();

        assert!(result.terminated);
        assert_eq!(state.frames, frames_before);
    }

    #[test]
    fn test_food_placement_fails_on_full_grid() {
        let config = GameConfig::new(2, 2);
        let mut engine = GameEngine::seeded(config, 1);

        // Snake covering the whole 2x2 grid
        let snake = Snake {
            body: vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(0, 1),
            ],
            direction: Direction::Right,
        };

        let err = engine.place_food(&snake).unwrap_err();
        assert_eq!(err.cells, 4);
    }

    #[test]
    fn test_food_placement_finds_single_free_cell() {
        let config = GameConfig::new(2, 2);
        let mut engine = GameEngine::seeded(config, 1);

        let snake = Snake {
            body: vec![
                Position::new(0, 0),
                Position::new(1, 0),
                Position::new(1, 1),
            ],
            direction: Direction::Right,
        };

        let food = engine.place_food(&snake).unwrap();
        assert_eq!(food, Position::new(0, 1));
    }

    #[test]
    fn test_straight_run_hits_wall_within_frame_budget() {
        // Full-size grid: 32x24 cells, as the original 640x480 at 20px
        let mut engine = GameEngine::seeded(GameConfig::default(), 11);
        let mut state = engine.reset().unwrap();
        state.food = Position::new(0, 0);

        let mut frames = 0;
        loop {
            let result = engine.step(&mut state, Turn::Straight).unwrap();
            frames += 1;
            if result.terminated {
                assert_eq!(result.reward, -10.0);
                assert_eq!(result.info.collision, Some(CollisionType::Wall));
                break;
            }
            assert!(frames < 300, "must terminate within the frame budget");
        }
    }
}
