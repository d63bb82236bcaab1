use serde::{Deserialize, Serialize};

/// Configuration for the game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Width of the game grid, in cells
    pub grid_width: usize,
    /// Height of the game grid, in cells
    pub grid_height: usize,
    /// Cell edge length in pixels; only consumed by external renderers
    pub cell_size: usize,
    /// Initial length of the snake
    pub initial_snake_length: usize,

    // Rewards
    /// Reward for eating food
    pub food_reward: f32,
    /// Penalty for dying (wall, self, or stall)
    pub death_penalty: f32,

    /// Episode ends once the frame counter exceeds
    /// `stall_multiplier * snake length`
    pub stall_multiplier: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        // 32x24 cells at 20px is the original 640x480 playfield
        Self {
            grid_width: 32,
            grid_height: 24,
            cell_size: 20,
            initial_snake_length: 3,
            food_reward: 10.0,
            death_penalty: -10.0,
            stall_multiplier: 100,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_width == 0 || self.grid_height == 0 {
            return Err(format!(
                "grid must be non-empty, got {}x{}",
                self.grid_width, self.grid_height
            ));
        }

        if self.initial_snake_length < 1 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        // The snake spawns from the grid center trailing left
        if self.initial_snake_length > self.grid_width / 2 {
            return Err(format!(
                "initial_snake_length ({}) does not fit a grid of width {}",
                self.initial_snake_length, self.grid_width
            ));
        }

        if self.cell_size == 0 {
            return Err("cell_size must be positive".to_string());
        }

        if self.stall_multiplier == 0 {
            return Err("stall_multiplier must be positive".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_width, 32);
        assert_eq!(config.grid_height, 24);
        assert_eq!(config.cell_size, 20);
        assert_eq!(config.initial_snake_length, 3);
        assert_eq!(config.stall_multiplier, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(15, 15);
        assert_eq!(config.grid_width, 15);
        assert_eq!(config.grid_height, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_degenerate_grids() {
        let mut config = GameConfig::new(0, 10);
        assert!(config.validate().is_err());

        config = GameConfig::small();
        config.initial_snake_length = 8;
        assert!(config.validate().is_err());

        config = GameConfig::small();
        config.stall_multiplier = 0;
        assert!(config.validate().is_err());
    }
}
