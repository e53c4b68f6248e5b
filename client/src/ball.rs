use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use volley_shared::config::GameConfig;

use crate::physics::{Backend, BodyDesc, BodyHandle, BodyKind, Vec2};

pub const BALL_RADIUS: f32 = 30.0;

/// Spawns the match ball at the fixed start position.
///
/// Both clients of a match seed this from the same value, so they draw the
/// same sequence of launch velocities.
#[derive(Debug)]
pub struct BallSpawner {
    start: Vec2,
    max_vx: i32,
    vy: f32,
    category: u32,
    rng: ChaCha8Rng,
}

impl BallSpawner {
    pub fn new(config: &GameConfig, category: u32, seed: u64) -> Self {
        Self {
            start: Self::start_position(config),
            max_vx: config.ball_spawn_max_vx,
            vy: config.ball_spawn_vy,
            category,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn start_position(config: &GameConfig) -> Vec2 {
        Vec2::new(config.arena_width / 2.0, config.arena_height / 4.0)
    }

    /// Spawn a fresh ball. The collision category is set on every spawn.
    pub fn spawn<B: Backend>(&mut self, backend: &mut B) -> BodyHandle {
        let vx = self.rng.gen_range(-self.max_vx..=self.max_vx) as f32;
        let handle = backend.spawn_body(
            BodyDesc::new(BodyKind::Ball, self.start, BALL_RADIUS)
                .with_velocity(Vec2::new(vx, self.vy))
                .with_restitution(1.0),
        );
        backend.set_collision_category(handle, self.category);
        handle
    }

    pub fn category(&self) -> u32 {
        self.category
    }
}
