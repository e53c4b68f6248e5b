use std::time::Duration;

use volley_shared::config::GameConfig;
use volley_shared::slot::Slot;

use crate::ball::BallSpawner;
use crate::physics::{Backend, BannerHandle, BodyDesc, BodyHandle, BodyKind, Vec2};
use crate::timers::{TimerId, TimerQueue};

const POST_RADIUS: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalRegion {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
}

impl GoalRegion {
    /// Goal mouth defended by `owner`. Slot 1 defends the left wall.
    pub fn for_side(owner: Slot, config: &GameConfig) -> Self {
        let (x_min, x_max) = match owner {
            Slot::One => (0.0, config.goal_depth),
            Slot::Two => (config.arena_width - config.goal_depth, config.arena_width),
        };
        Self {
            x_min,
            x_max,
            y_min: config.arena_height * 3.0 / 5.0,
            y_max: config.arena_height,
        }
    }

    /// Strict interior test. A point on an edge is outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x > self.x_min && p.x < self.x_max && p.y > self.y_min && p.y < self.y_max
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x_min + self.x_max) / 2.0, (self.y_min + self.y_max) / 2.0)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Goal {
    pub owner: Slot,
    pub region: GoalRegion,
    pub post: BodyHandle,
}

impl Goal {
    pub fn spawn<B: Backend>(owner: Slot, config: &GameConfig, backend: &mut B) -> Self {
        let x = match owner {
            Slot::One => 0.0,
            Slot::Two => config.arena_width,
        };
        let post = backend.spawn_body(
            BodyDesc::new(
                BodyKind::GoalPost(owner),
                Vec2::new(x, config.arena_height * 3.0 / 5.0),
                POST_RADIUS,
            )
            .fixed(),
        );
        Self {
            owner,
            region: GoalRegion::for_side(owner, config),
            post,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBoard {
    scores: [u32; 2],
}

impl ScoreBoard {
    /// Add a point and return the new total.
    pub fn add(&mut self, slot: Slot) -> u32 {
        let score = &mut self.scores[slot.index()];
        *score = score.saturating_add(1);
        *score
    }

    pub fn get(&self, slot: Slot) -> u32 {
        self.scores[slot.index()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalPhase {
    Active,
    Paused {
        banner: BannerHandle,
        timer: TimerId,
        scorer: Slot,
    },
}

/// Watches the ball, keeps score and runs the goal pause.
///
/// While paused, containment is not checked at all, so a ball resting in a
/// goal scores once.
#[derive(Debug)]
pub struct GoalEngine {
    goals: [Goal; 2],
    scores: ScoreBoard,
    spawner: BallSpawner,
    ball: BodyHandle,
    phase: GoalPhase,
    winning: Option<Slot>,
    pause: Duration,
}

impl GoalEngine {
    pub fn new<B: Backend>(
        config: &GameConfig,
        mut spawner: BallSpawner,
        backend: &mut B,
    ) -> Self {
        let goals = Slot::ALL.map(|slot| Goal::spawn(slot, config, backend));
        let ball = spawner.spawn(backend);
        for slot in Slot::ALL {
            backend.set_score(slot, 0);
        }
        Self {
            goals,
            scores: ScoreBoard::default(),
            spawner,
            ball,
            phase: GoalPhase::Active,
            winning: None,
            pause: config.goal_pause(),
        }
    }

    /// Which slot scores with the ball at `ball`, if any.
    pub fn check(&self, ball: Vec2) -> Option<Slot> {
        self.goals
            .iter()
            .find(|goal| goal.region.contains(ball))
            .map(|goal| goal.owner.opponent())
    }

    /// Per-tick check. On a goal: score, show the banner and schedule the
    /// end of the pause. Returns the scoring slot.
    pub fn tick<B: Backend, T>(
        &mut self,
        now: Duration,
        backend: &mut B,
        timers: &mut TimerQueue<T>,
        on_resume: T,
    ) -> Option<Slot> {
        if self.phase != GoalPhase::Active {
            return None;
        }
        let scorer = self.check(backend.position(self.ball)?)?;

        let score = self.scores.add(scorer);
        backend.set_score(scorer, score);
        let banner = backend.show_goal_banner();
        let timer = timers.schedule(now + self.pause, on_resume);
        // Only a ball in slot 2's goal raises the flag.
        self.winning = (scorer == Slot::One).then_some(scorer);
        self.phase = GoalPhase::Paused {
            banner,
            timer,
            scorer,
        };

        tracing::info!(
            "Goal for slot {} ({} - {})",
            scorer,
            self.scores.get(Slot::One),
            self.scores.get(Slot::Two)
        );
        Some(scorer)
    }

    /// End the pause: replace the ball and resume watching. Returns the new
    /// ball, or `None` if `timer` is not the current pause.
    pub fn on_pause_elapsed<B: Backend>(
        &mut self,
        timer: TimerId,
        backend: &mut B,
    ) -> Option<BodyHandle> {
        let GoalPhase::Paused { banner, timer: current, .. } = self.phase else {
            return None;
        };
        if current != timer {
            return None;
        }

        backend.destroy_body(self.ball);
        self.ball = self.spawner.spawn(backend);
        backend.hide_goal_banner(banner);
        self.winning = None;
        self.phase = GoalPhase::Active;
        Some(self.ball)
    }

    /// Abort a pending pause without respawning.
    pub fn cancel<B: Backend, T>(&mut self, backend: &mut B, timers: &mut TimerQueue<T>) {
        if let GoalPhase::Paused { banner, timer, .. } = self.phase {
            timers.cancel(timer);
            backend.hide_goal_banner(banner);
            self.winning = None;
            self.phase = GoalPhase::Active;
        }
    }

    /// Remove the ball and posts from the world.
    pub fn despawn<B: Backend>(&mut self, backend: &mut B) {
        backend.destroy_body(self.ball);
        for goal in &self.goals {
            backend.destroy_body(goal.post);
        }
    }

    pub fn ball(&self) -> BodyHandle {
        self.ball
    }

    pub fn ball_category(&self) -> u32 {
        self.spawner.category()
    }

    pub fn goal(&self, owner: Slot) -> &Goal {
        &self.goals[owner.index()]
    }

    pub fn scores(&self) -> &ScoreBoard {
        &self.scores
    }

    pub fn phase(&self) -> GoalPhase {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        matches!(self.phase, GoalPhase::Paused { .. })
    }

    pub fn winning(&self) -> Option<Slot> {
        self.winning
    }
}
