use volley_shared::config::GameConfig;
use volley_shared::protocol::Intent;

use crate::physics::{Animation, Backend, BodyHandle, ContactEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Grounded,
    Airborne,
}

/// Which contacts reset a player's jump and boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContactPolicy {
    /// Only contacts involving the player's own body.
    #[default]
    OwnBodyOnly,
    /// Any contact anywhere in the world resets every player.
    AnyContact,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTuning {
    pub speed: f32,
    pub jump_velocity: f32,
    pub boost_velocity: f32,
}

impl From<&GameConfig> for MotionTuning {
    fn from(config: &GameConfig) -> Self {
        Self {
            speed: config.player_speed,
            jump_velocity: config.jump_velocity,
            boost_velocity: config.boost_down_velocity,
        }
    }
}

const BOOST_CHARGES: u8 = 1;

/// Turns relayed intents into velocity and animation commands for one player.
///
/// Every intent is safe to replay: applying the same one twice leaves the
/// state where one application would.
#[derive(Debug)]
pub struct MotionController {
    body: BodyHandle,
    state: MotionState,
    boost_budget: u8,
    animation: Animation,
    tuning: MotionTuning,
    policy: ContactPolicy,
}

impl MotionController {
    pub fn new(body: BodyHandle, tuning: MotionTuning, policy: ContactPolicy) -> Self {
        Self {
            body,
            state: MotionState::Grounded,
            boost_budget: BOOST_CHARGES,
            animation: Animation::Idle,
            tuning,
            policy,
        }
    }

    /// Apply a movement intent. Kicks are not motion and are ignored here.
    pub fn apply<B: Backend>(&mut self, intent: Intent, backend: &mut B) {
        match intent {
            Intent::MoveLeft => self.move_left(backend),
            Intent::MoveRight => self.move_right(backend),
            Intent::GoIdle => self.go_idle(backend),
            Intent::Jump => self.jump(backend),
            Intent::BoostDown => self.boost_down(backend),
            Intent::Kick(_) => {}
        }
    }

    pub fn move_left<B: Backend>(&mut self, backend: &mut B) {
        backend.set_velocity_x(self.body, -self.tuning.speed);
        self.play(Animation::Left, backend);
    }

    pub fn move_right<B: Backend>(&mut self, backend: &mut B) {
        backend.set_velocity_x(self.body, self.tuning.speed);
        self.play(Animation::Right, backend);
    }

    pub fn go_idle<B: Backend>(&mut self, backend: &mut B) {
        backend.set_velocity_x(self.body, 0.0);
        self.play(Animation::Idle, backend);
    }

    pub fn jump<B: Backend>(&mut self, backend: &mut B) {
        if self.state != MotionState::Grounded {
            return;
        }
        self.state = MotionState::Airborne;
        backend.set_velocity_y(self.body, -self.tuning.jump_velocity);
        self.play(Animation::Up, backend);
    }

    pub fn boost_down<B: Backend>(&mut self, backend: &mut B) {
        if self.state != MotionState::Airborne || self.boost_budget == 0 {
            return;
        }
        self.boost_budget -= 1;
        backend.set_velocity_y(self.body, self.tuning.boost_velocity);
    }

    /// Feed a physics contact. Returns true if it grounded this player.
    pub fn on_contact(&mut self, contact: &ContactEvent) -> bool {
        let relevant = match self.policy {
            ContactPolicy::OwnBodyOnly => contact.involves(self.body),
            ContactPolicy::AnyContact => true,
        };
        if relevant {
            self.state = MotionState::Grounded;
            self.boost_budget = BOOST_CHARGES;
        }
        relevant
    }

    fn play<B: Backend>(&mut self, animation: Animation, backend: &mut B) {
        self.animation = animation;
        backend.play_animation(self.body, animation);
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn boost_budget(&self) -> u8 {
        self.boost_budget
    }

    pub fn animation(&self) -> Animation {
        self.animation
    }

    pub fn policy(&self) -> ContactPolicy {
        self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::RecordingWorld;
    use crate::physics::{BodyDesc, BodyKind, PhysicsWorld, Vec2};
    use volley_shared::slot::Slot;

    fn setup(policy: ContactPolicy) -> (RecordingWorld, MotionController) {
        let config = GameConfig::default();
        let mut world = RecordingWorld::default();
        let body = world.spawn_body(BodyDesc::new(
            BodyKind::Player(Slot::One),
            Vec2::new(320.0, 600.0),
            40.0,
        ));
        let controller = MotionController::new(body, MotionTuning::from(&config), policy);
        (world, controller)
    }

    fn vel(world: &RecordingWorld, c: &MotionController) -> Vec2 {
        world.velocity(c.body()).unwrap()
    }

    #[test]
    fn horizontal_intents_set_velocity_and_animation() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);

        c.apply(Intent::MoveLeft, &mut world);
        assert_eq!(vel(&world, &c).x, -7.0);
        assert_eq!(world.animation(c.body()), Some(Animation::Left));

        c.apply(Intent::MoveRight, &mut world);
        assert_eq!(vel(&world, &c).x, 7.0);
        assert_eq!(world.animation(c.body()), Some(Animation::Right));

        c.apply(Intent::GoIdle, &mut world);
        assert_eq!(vel(&world, &c).x, 0.0);
        assert_eq!(c.animation(), Animation::Idle);
        assert_eq!(c.state(), MotionState::Grounded);
    }

    #[test]
    fn latest_intent_wins() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.apply(Intent::MoveLeft, &mut world);
        c.apply(Intent::MoveRight, &mut world);
        assert_eq!(vel(&world, &c).x, 7.0);
        assert_eq!(c.animation(), Animation::Right);
    }

    #[test]
    fn horizontal_moves_keep_airborne_state() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.jump(&mut world);
        c.move_left(&mut world);
        assert_eq!(c.state(), MotionState::Airborne);
    }

    #[test]
    fn jump_plays_up_until_next_horizontal_intent() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.apply(Intent::Jump, &mut world);
        assert_eq!(world.animation(c.body()), Some(Animation::Up));

        c.apply(Intent::MoveLeft, &mut world);
        assert_eq!(world.animation(c.body()), Some(Animation::Left));
        assert_eq!(c.state(), MotionState::Airborne);
    }

    #[test]
    fn jump_only_from_ground() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.apply(Intent::Jump, &mut world);
        assert_eq!(c.state(), MotionState::Airborne);
        assert_eq!(vel(&world, &c).y, -15.0);

        world.set_velocity_y(c.body(), 3.0);
        c.apply(Intent::Jump, &mut world);
        assert_eq!(vel(&world, &c).y, 3.0, "second jump while airborne is a no-op");
    }

    #[test]
    fn boost_requires_airborne() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.apply(Intent::BoostDown, &mut world);
        assert_eq!(vel(&world, &c).y, 0.0);
        assert_eq!(c.boost_budget(), 1);
    }

    #[test]
    fn boost_consumes_single_charge() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.jump(&mut world);

        c.apply(Intent::BoostDown, &mut world);
        assert_eq!(vel(&world, &c).y, 10.0);
        assert_eq!(c.boost_budget(), 0);

        world.set_velocity_y(c.body(), -2.0);
        c.apply(Intent::BoostDown, &mut world);
        assert_eq!(vel(&world, &c).y, -2.0);
    }

    #[test]
    fn own_contact_resets_jump_and_boost() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.jump(&mut world);
        c.boost_down(&mut world);

        let grounded = c.on_contact(&ContactEvent {
            body: c.body(),
            other: None,
        });
        assert!(grounded);
        assert_eq!(c.state(), MotionState::Grounded);
        assert_eq!(c.boost_budget(), 1);

        c.jump(&mut world);
        assert_eq!(c.state(), MotionState::Airborne);
    }

    #[test]
    fn unrelated_contact_is_ignored_by_default() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.jump(&mut world);
        let grounded = c.on_contact(&ContactEvent {
            body: BodyHandle(900),
            other: Some(BodyHandle(901)),
        });
        assert!(!grounded);
        assert_eq!(c.state(), MotionState::Airborne);
    }

    #[test]
    fn any_contact_policy_resets_on_unrelated_contact() {
        let (mut world, mut c) = setup(ContactPolicy::AnyContact);
        c.jump(&mut world);
        c.boost_down(&mut world);
        assert!(c.on_contact(&ContactEvent {
            body: BodyHandle(900),
            other: None,
        }));
        assert_eq!(c.state(), MotionState::Grounded);
        assert_eq!(c.boost_budget(), 1);
    }

    #[test]
    fn replaying_intents_is_idempotent() {
        let (mut world, mut c) = setup(ContactPolicy::OwnBodyOnly);
        c.jump(&mut world);
        c.boost_down(&mut world);
        let before = (c.state(), c.boost_budget(), vel(&world, &c));
        c.jump(&mut world);
        c.boost_down(&mut world);
        assert_eq!(before, (c.state(), c.boost_budget(), vel(&world, &c)));
    }
}
