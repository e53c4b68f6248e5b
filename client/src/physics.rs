//! Boundary between the match logic and whatever simulates and draws it.
//!
//! The controllers never integrate motion or render anything themselves. They
//! issue commands through [`PhysicsWorld`] and [`Presenter`] and interpret the
//! contacts and positions handed back.

use volley_shared::slot::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Player(Slot),
    Ball,
    Kick(Slot),
    GoalPost(Slot),
}

/// Category/mask pair. Two bodies collide only when each one's mask accepts
/// the other's category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: u32,
    pub mask: u32,
}

impl CollisionFilter {
    pub const DEFAULT: CollisionFilter = CollisionFilter {
        category: 1,
        mask: u32::MAX,
    };

    pub fn can_collide(&self, other: &CollisionFilter) -> bool {
        (self.mask & other.category) != 0 && (other.mask & self.category) != 0
    }
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub filter: CollisionFilter,
    pub ignore_gravity: bool,
    pub is_static: bool,
    pub restitution: f32,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, position: Vec2, radius: f32) -> Self {
        Self {
            kind,
            position,
            velocity: Vec2::ZERO,
            radius,
            filter: CollisionFilter::DEFAULT,
            ignore_gravity: false,
            is_static: false,
            restitution: 0.0,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn ignoring_gravity(mut self) -> Self {
        self.ignore_gravity = true;
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self.ignore_gravity = true;
        self
    }
}

/// A contact reported by the physics engine. `other` is `None` for world
/// bounds (floor, walls, ceiling).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub body: BodyHandle,
    pub other: Option<BodyHandle>,
}

impl ContactEvent {
    pub fn involves(&self, handle: BodyHandle) -> bool {
        self.body == handle || self.other == Some(handle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Animation {
    #[default]
    Idle,
    Left,
    Right,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BannerHandle(pub u32);

/// Rigid-body engine commands issued by the controllers.
pub trait PhysicsWorld {
    fn spawn_body(&mut self, desc: BodyDesc) -> BodyHandle;
    fn destroy_body(&mut self, handle: BodyHandle);
    fn position(&self, handle: BodyHandle) -> Option<Vec2>;
    fn velocity(&self, handle: BodyHandle) -> Option<Vec2>;
    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2);
    fn set_velocity_x(&mut self, handle: BodyHandle, vx: f32);
    fn set_velocity_y(&mut self, handle: BodyHandle, vy: f32);
    fn set_collision_category(&mut self, handle: BodyHandle, category: u32);
    /// Hand out the next unused collision category bit.
    fn allocate_category(&mut self) -> u32;
}

/// A world its host advances explicitly, one fixed step per call.
pub trait Stepped {
    /// Advance one step and return the contacts that began during it.
    fn step(&mut self) -> Vec<ContactEvent>;
}

/// Rendering side effects. Fire-and-forget.
pub trait Presenter {
    fn play_animation(&mut self, body: BodyHandle, animation: Animation);
    fn show_goal_banner(&mut self) -> BannerHandle;
    fn hide_goal_banner(&mut self, banner: BannerHandle);
    fn set_score(&mut self, slot: Slot, score: u32);
}

/// Everything a match scene needs from its host.
pub trait Backend: PhysicsWorld + Presenter {}

impl<T: PhysicsWorld + Presenter> Backend for T {}
