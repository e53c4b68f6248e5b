use std::time::Duration;

/// Gameplay constants shared by server and clients.
///
/// Sent to every client in the welcome message so both sides of a match
/// simulate with identical tuning. Velocities are arena units per physics step.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize, ts_rs::TS)]
#[ts(export, export_to = "../../web/src/generated/")]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    /// Height of the ground strip at the bottom of the arena
    pub ground_height: f32,
    pub player_speed: f32,
    pub jump_velocity: f32,
    pub boost_down_velocity: f32,
    pub kick_offset_x: f32,
    pub kick_offset_y: f32,
    pub kick_speed: f32,
    pub kick_lifetime_ms: u64,
    /// Horizontal depth of each goal mouth, measured from the side wall
    pub goal_depth: f32,
    pub goal_pause_ms: u64,
    /// Ball spawn vx is an integer drawn from [-max, max]
    pub ball_spawn_max_vx: i32,
    pub ball_spawn_vy: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: 1280.0,
            arena_height: 720.0,
            ground_height: 75.0,
            player_speed: 7.0,
            jump_velocity: 15.0,
            boost_down_velocity: 10.0,
            kick_offset_x: 50.0,
            kick_offset_y: 30.0,
            kick_speed: 15.0,
            kick_lifetime_ms: 220,
            goal_depth: 60.0,
            goal_pause_ms: 3000,
            ball_spawn_max_vx: 3,
            ball_spawn_vy: -5.0,
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("player_speed", self.player_speed),
            ("jump_velocity", self.jump_velocity),
            ("boost_down_velocity", self.boost_down_velocity),
            ("kick_speed", self.kick_speed),
            ("goal_depth", self.goal_depth),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("{name} must be finite and > 0"));
            }
        }
        if !self.ground_height.is_finite()
            || self.ground_height < 0.0
            || self.ground_height >= self.arena_height
        {
            return Err("ground_height must be finite and within the arena".to_string());
        }
        if self.goal_depth * 2.0 >= self.arena_width {
            return Err("goals must not overlap".to_string());
        }
        if self.kick_lifetime_ms == 0 {
            return Err("kick_lifetime_ms must be > 0".to_string());
        }
        if self.ball_spawn_max_vx < 0 {
            return Err("ball_spawn_max_vx must be >= 0".to_string());
        }
        if !self.ball_spawn_vy.is_finite() {
            return Err("ball_spawn_vy must be finite".to_string());
        }
        Ok(())
    }

    pub fn kick_lifetime(&self) -> Duration {
        Duration::from_millis(self.kick_lifetime_ms)
    }

    pub fn goal_pause(&self) -> Duration {
        Duration::from_millis(self.goal_pause_ms)
    }

    /// Y coordinate of the top of the ground strip
    pub fn floor_y(&self) -> f32 {
        self.arena_height - self.ground_height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_game_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn overlapping_goals_invalid() {
        let config = GameConfig {
            goal_depth: 700.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_kick_lifetime_invalid() {
        let config = GameConfig {
            kick_lifetime_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&GameConfig::default()).unwrap();
        assert!(json.contains("\"kickLifetimeMs\":220"));
        assert!(json.contains("\"goalPauseMs\":3000"));
    }
}
