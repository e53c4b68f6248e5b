//! In-memory world for controller tests.
//!
//! Stores whatever the controllers command and never moves anything on its
//! own. Tests place bodies with [`RecordingWorld::teleport`] and feed contacts
//! by hand.

use std::collections::BTreeMap;

use volley_shared::slot::Slot;

use crate::physics::{
    Animation, BannerHandle, BodyDesc, BodyHandle, CollisionFilter, PhysicsWorld,
    Presenter, Vec2,
};

#[derive(Debug)]
pub struct RecordingWorld {
    bodies: BTreeMap<BodyHandle, BodyDesc>,
    animations: BTreeMap<BodyHandle, Animation>,
    next_handle: u32,
    last_category: u32,
    banner: Option<BannerHandle>,
    next_banner: u32,
    scores: [u32; 2],
}

impl Default for RecordingWorld {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
            animations: BTreeMap::new(),
            next_handle: 1,
            last_category: CollisionFilter::DEFAULT.category,
            banner: None,
            next_banner: 1,
            scores: [0; 2],
        }
    }
}

impl RecordingWorld {
    pub fn teleport(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(desc) = self.bodies.get_mut(&handle) {
            desc.position = position;
            desc.velocity = Vec2::ZERO;
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains_key(&handle)
    }

    pub fn filter(&self, handle: BodyHandle) -> Option<CollisionFilter> {
        self.bodies.get(&handle).map(|d| d.filter)
    }

    pub fn animation(&self, handle: BodyHandle) -> Option<Animation> {
        self.animations.get(&handle).copied()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn banner_visible(&self) -> bool {
        self.banner.is_some()
    }

    pub fn displayed_score(&self, slot: Slot) -> u32 {
        self.scores[slot.index()]
    }
}

impl PhysicsWorld for RecordingWorld {
    fn spawn_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;
        self.bodies.insert(handle, desc);
        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
        self.animations.remove(&handle);
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|d| d.position)
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(&handle).map(|d| d.velocity)
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(desc) = self.bodies.get_mut(&handle) {
            desc.velocity = velocity;
        }
    }

    fn set_velocity_x(&mut self, handle: BodyHandle, vx: f32) {
        if let Some(desc) = self.bodies.get_mut(&handle) {
            desc.velocity.x = vx;
        }
    }

    fn set_velocity_y(&mut self, handle: BodyHandle, vy: f32) {
        if let Some(desc) = self.bodies.get_mut(&handle) {
            desc.velocity.y = vy;
        }
    }

    fn set_collision_category(&mut self, handle: BodyHandle, category: u32) {
        if let Some(desc) = self.bodies.get_mut(&handle) {
            desc.filter.category = category;
        }
    }

    fn allocate_category(&mut self) -> u32 {
        self.last_category <<= 1;
        self.last_category
    }
}

impl Presenter for RecordingWorld {
    fn play_animation(&mut self, body: BodyHandle, animation: Animation) {
        if self.bodies.contains_key(&body) {
            self.animations.insert(body, animation);
        }
    }

    fn show_goal_banner(&mut self) -> BannerHandle {
        let handle = BannerHandle(self.next_banner);
        self.next_banner += 1;
        self.banner = Some(handle);
        handle
    }

    fn hide_goal_banner(&mut self, banner: BannerHandle) {
        if self.banner == Some(banner) {
            self.banner = None;
        }
    }

    fn set_score(&mut self, slot: Slot, score: u32) {
        self.scores[slot.index()] = score;
    }
}
