//! Scripted player for the headless client. Chases the ball, keeps itself
//! between the ball and its own goal, and jumps or kicks when close.
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use volley_shared::slot::Slot;

use crate::input::InputState;
use crate::physics::Vec2;

#[derive(Clone, Copy, Debug)]
pub struct BotView {
    pub me: Vec2,
    pub ball: Vec2,
    pub ball_velocity: Vec2,
}

const DEAD_ZONE: f32 = 12.0;
const GUARD_OFFSET: f32 = 30.0;
const JUMP_RANGE_X: f32 = 90.0;
const JUMP_MIN_HEIGHT: f32 = 60.0;
const KICK_RANGE: f32 = 110.0;
const KICK_COOLDOWN: f32 = 0.5;
const JUMP_COOLDOWN: f32 = 0.4;

#[derive(Debug)]
pub struct Bot {
    slot: Slot,
    kick_cooldown: f32,
    jump_cooldown: f32,
    rng: ChaCha8Rng,
}

impl Bot {
    pub fn new(slot: Slot, seed: u64) -> Self {
        Self {
            slot,
            kick_cooldown: 0.0,
            jump_cooldown: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn update(&mut self, dt: f32, view: &BotView) -> InputState {
        self.kick_cooldown = (self.kick_cooldown - dt).max(0.0);
        self.jump_cooldown = (self.jump_cooldown - dt).max(0.0);

        // Stand on the own-goal side of the ball.
        let guard = match self.slot {
            Slot::One => -GUARD_OFFSET,
            Slot::Two => GUARD_OFFSET,
        };
        let target_x = view.ball.x + view.ball_velocity.x * 4.0 + guard;
        let dx = target_x - view.me.x;

        let mut input = InputState {
            left: dx < -DEAD_ZONE,
            right: dx > DEAD_ZONE,
            ..Default::default()
        };

        let above = view.me.y - view.ball.y;
        let near_x = (view.ball.x - view.me.x).abs() < JUMP_RANGE_X;
        if near_x && above > JUMP_MIN_HEIGHT && view.ball_velocity.y > 0.0 && self.jump_cooldown <= 0.0 {
            input.up = true;
            self.jump_cooldown = JUMP_COOLDOWN + self.rng.gen_range(0.0..0.3);
        }

        if view.me.distance(view.ball) < KICK_RANGE && self.kick_cooldown <= 0.0 {
            input.kick = true;
            self.kick_cooldown = KICK_COOLDOWN + self.rng.gen_range(0.0..0.4);
            // The kick points the way the left key says; aim at the opponent.
            input.left = self.slot == Slot::Two;
            input.right = self.slot == Slot::One;
        }

        if !input.up && above < -JUMP_MIN_HEIGHT {
            input.down = true;
        }
        input
    }

    pub fn reset(&mut self) {
        self.kick_cooldown = 0.0;
        self.jump_cooldown = 0.0;
    }
}
