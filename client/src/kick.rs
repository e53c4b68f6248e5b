use std::time::Duration;

use volley_shared::config::GameConfig;
use volley_shared::protocol::KickDirection;
use volley_shared::slot::Slot;

use crate::physics::{Backend, BodyDesc, BodyHandle, BodyKind, CollisionFilter, Vec2};
use crate::timers::{TimerId, TimerQueue};

const KICK_RADIUS: f32 = 24.0;

/// The transient body that strikes the ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KickAction {
    pub body: BodyHandle,
    pub timer: TimerId,
    pub origin_x: f32,
    pub velocity_x: f32,
    pub filter: CollisionFilter,
    pub expires_at: Duration,
}

/// At most one live kick per player.
#[derive(Debug)]
pub struct KickController {
    slot: Slot,
    player: BodyHandle,
    offset: Vec2,
    speed: f32,
    lifetime: Duration,
    active: Option<KickAction>,
}

impl KickController {
    pub fn new(slot: Slot, player: BodyHandle, config: &GameConfig) -> Self {
        Self {
            slot,
            player,
            offset: Vec2::new(config.kick_offset_x, config.kick_offset_y),
            speed: config.kick_speed,
            lifetime: config.kick_lifetime(),
            active: None,
        }
    }

    /// Spawn a kick unless one is already live. A request while live is
    /// dropped. Returns whether a kick was spawned.
    ///
    /// A left kick starts on the player's right and sweeps left; a right kick
    /// mirrors it.
    pub fn try_kick<B: Backend, T>(
        &mut self,
        direction: KickDirection,
        filter: CollisionFilter,
        now: Duration,
        backend: &mut B,
        timers: &mut TimerQueue<T>,
        on_expiry: T,
    ) -> bool {
        if self.active.is_some() {
            return false;
        }
        let Some(player) = backend.position(self.player) else {
            return false;
        };

        let (origin_x, velocity_x) = match direction {
            KickDirection::Left => (player.x + self.offset.x, -self.speed),
            KickDirection::Right => (player.x - self.offset.x, self.speed),
        };
        let body = backend.spawn_body(
            BodyDesc::new(
                BodyKind::Kick(self.slot),
                Vec2::new(origin_x, player.y + self.offset.y),
                KICK_RADIUS,
            )
            .with_velocity(Vec2::new(velocity_x, 0.0))
            .with_filter(filter)
            .with_restitution(1.0)
            .ignoring_gravity(),
        );
        let expires_at = now + self.lifetime;
        let timer = timers.schedule(expires_at, on_expiry);

        tracing::debug!("Slot {} kicked {:?}", self.slot, direction);
        self.active = Some(KickAction {
            body,
            timer,
            origin_x,
            velocity_x,
            filter,
            expires_at,
        });
        true
    }

    /// Handle a fired kick timer. Ids that do not match the live kick are
    /// stale and ignored.
    pub fn on_expired<B: Backend>(&mut self, timer: TimerId, backend: &mut B) -> bool {
        match self.active {
            Some(kick) if kick.timer == timer => {
                backend.destroy_body(kick.body);
                self.active = None;
                true
            }
            _ => false,
        }
    }

    /// Tear down a live kick immediately.
    pub fn cancel<B: Backend, T>(&mut self, backend: &mut B, timers: &mut TimerQueue<T>) {
        if let Some(kick) = self.active.take() {
            timers.cancel(kick.timer);
            backend.destroy_body(kick.body);
        }
    }

    pub fn active(&self) -> Option<&KickAction> {
        self.active.as_ref()
    }

    pub fn is_live(&self) -> bool {
        self.active.is_some()
    }
}
