use std::time::Duration;

use volley_shared::config::GameConfig;
use volley_shared::protocol::{ClientMsg, Intent, ServerMsg};
use volley_shared::slot::Slot;

use crate::ball::BallSpawner;
use crate::goal::GoalEngine;
use crate::input::InputState;
use crate::kick::KickController;
use crate::motion::{ContactPolicy, MotionController, MotionTuning};
use crate::physics::{
    Backend, BodyDesc, BodyHandle, BodyKind, CollisionFilter, ContactEvent, Stepped, Vec2,
};
use crate::timers::TimerQueue;

pub const PLAYER_RADIUS: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneTimer {
    KickExpired(Slot),
    GoalPauseOver,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub scored: Option<Slot>,
    pub respawned: bool,
}

#[derive(Debug)]
struct PlayerRig {
    motion: MotionController,
    kick: KickController,
    category: u32,
}

/// One running match on one client.
///
/// Both players are simulated locally from the relayed intent stream. Only
/// `local_slot` is driven by this client's input.
pub struct MatchScene<W: Backend> {
    world: W,
    local_slot: Slot,
    players: [PlayerRig; 2],
    goals: GoalEngine,
    timers: TimerQueue<SceneTimer>,
    clock: Duration,
}

impl<W: Backend> MatchScene<W> {
    pub fn new(
        mut world: W,
        config: &GameConfig,
        local_slot: Slot,
        seed: u64,
        policy: ContactPolicy,
    ) -> Self {
        let player_categories = Slot::ALL.map(|_| world.allocate_category());
        let ball_category = world.allocate_category();

        let goals = GoalEngine::new(config, BallSpawner::new(config, ball_category, seed), &mut world);
        let tuning = MotionTuning::from(config);
        let players = Slot::ALL.map(|slot| {
            let category = player_categories[slot.index()];
            let body = world.spawn_body(BodyDesc::new(
                BodyKind::Player(slot),
                Self::spawn_point(slot, config),
                PLAYER_RADIUS,
            ));
            world.set_collision_category(body, category);
            PlayerRig {
                motion: MotionController::new(body, tuning, policy),
                kick: KickController::new(slot, body, config),
                category,
            }
        });

        tracing::info!("Match scene ready, local slot {}", local_slot);
        Self {
            world,
            local_slot,
            players,
            goals,
            timers: TimerQueue::new(),
            clock: Duration::ZERO,
        }
    }

    /// Player start position, standing on the ground. Slot 1 starts left.
    pub fn spawn_point(slot: Slot, config: &GameConfig) -> Vec2 {
        let x = match slot {
            Slot::One => config.arena_width / 4.0,
            Slot::Two => config.arena_width * 3.0 / 4.0,
        };
        Vec2::new(x, config.floor_y() - PLAYER_RADIUS)
    }

    /// Messages to send for this tick's held input.
    pub fn outgoing_intents(&self, input: &InputState) -> Vec<ClientMsg> {
        input
            .intents()
            .into_iter()
            .map(|intent| ClientMsg::intent(self.local_slot, intent))
            .collect()
    }

    /// Apply held input directly, without a relay round trip.
    pub fn apply_local_input(&mut self, input: &InputState) {
        for intent in input.intents() {
            self.apply_intent(self.local_slot, intent);
        }
    }

    /// Route a relayed intent. Returns false for messages that are not one.
    pub fn handle_server_msg(&mut self, msg: &ServerMsg) -> bool {
        match msg.as_relayed_intent() {
            Some((slot, intent)) => {
                self.apply_intent(slot, intent);
                true
            }
            None => false,
        }
    }

    pub fn apply_intent(&mut self, slot: Slot, intent: Intent) {
        let ball_category = self.goals.ball_category();
        let rig = &mut self.players[slot.index()];
        match intent {
            Intent::Kick(direction) => {
                let filter = CollisionFilter {
                    category: rig.category,
                    mask: ball_category,
                };
                rig.kick.try_kick(
                    direction,
                    filter,
                    self.clock,
                    &mut self.world,
                    &mut self.timers,
                    SceneTimer::KickExpired(slot),
                );
            }
            _ => rig.motion.apply(intent, &mut self.world),
        }
    }

    pub fn handle_contact(&mut self, contact: &ContactEvent) {
        for rig in &mut self.players {
            rig.motion.on_contact(contact);
        }
    }

    /// Advance the scene clock, fire due timers, then look for a goal.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        self.clock += dt;
        let mut report = TickReport::default();

        for (id, timer) in self.timers.drain_due(self.clock) {
            match timer {
                SceneTimer::KickExpired(slot) => {
                    self.players[slot.index()].kick.on_expired(id, &mut self.world);
                }
                SceneTimer::GoalPauseOver => {
                    if self.goals.on_pause_elapsed(id, &mut self.world).is_some() {
                        report.respawned = true;
                    }
                }
            }
        }

        report.scored = self.goals.tick(
            self.clock,
            &mut self.world,
            &mut self.timers,
            SceneTimer::GoalPauseOver,
        );
        report
    }

    /// Cancel pending timers and remove every body this scene spawned.
    pub fn teardown(mut self) -> W {
        for rig in &mut self.players {
            rig.kick.cancel(&mut self.world, &mut self.timers);
            self.world.destroy_body(rig.motion.body());
        }
        self.goals.cancel(&mut self.world, &mut self.timers);
        self.goals.despawn(&mut self.world);
        self.timers.clear();
        self.world
    }

    pub fn local_slot(&self) -> Slot {
        self.local_slot
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn motion(&self, slot: Slot) -> &MotionController {
        &self.players[slot.index()].motion
    }

    pub fn kick(&self, slot: Slot) -> &KickController {
        &self.players[slot.index()].kick
    }

    pub fn player_body(&self, slot: Slot) -> BodyHandle {
        self.players[slot.index()].motion.body()
    }

    pub fn goals(&self) -> &GoalEngine {
        &self.goals
    }

    pub fn ball(&self) -> BodyHandle {
        self.goals.ball()
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

impl<W: Backend + Stepped> MatchScene<W> {
    /// One physics step, its contacts routed to the controllers, then one
    /// scene tick.
    pub fn step(&mut self, dt: Duration) -> TickReport {
        for contact in self.world.step() {
            self.handle_contact(&contact);
        }
        self.tick(dt)
    }
}
