//! Rigid-body world backed by rapier.
//!
//! Controllers speak in pixels and per-step velocities. Rapier integrates in
//! seconds, so velocities and gravity are scaled by the fixed step rate at
//! the boundary. The y axis points down, as on screen.
//!
//! There is no renderer behind the presenter half: animations, the goal
//! banner and scores are kept as state and logged.

use std::collections::BTreeMap;
use std::sync::Mutex;

use rapier2d::prelude::*;

use volley_shared::config::GameConfig;
use volley_shared::slot::Slot;

use crate::physics::{
    Animation, BannerHandle, BodyDesc, BodyHandle, BodyKind, CollisionFilter, ContactEvent,
    PhysicsWorld, Presenter, Stepped, Vec2,
};

/// Fixed steps per second.
pub const STEP_RATE: f32 = 60.0;
/// Downward acceleration, in pixels per step per step.
pub const GRAVITY: f32 = 0.5;
/// Top of the world bounds, above the visible arena.
pub const CEILING_Y: f32 = -200.0;
/// Half thickness of the floor, wall and ceiling slabs.
const BOUND_HALF_THICKNESS: f32 = 100.0;
/// Collider user data for world bounds. Body handles start at 1.
const BOUND_USER_DATA: u128 = 0;

#[derive(Debug)]
struct Entry {
    rigid_body: RigidBodyHandle,
    collider: ColliderHandle,
    kind: BodyKind,
    animation: Option<Animation>,
}

/// Collects collision starts reported during a step.
#[derive(Default)]
struct StartedCollisions(Mutex<Vec<(ColliderHandle, ColliderHandle)>>);

impl EventHandler for StartedCollisions {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(a, b, _) = event {
            if let Ok(mut started) = self.0.lock() {
                started.push((a, b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    integration: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    rigid_bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: StartedCollisions,
    entries: BTreeMap<BodyHandle, Entry>,
    next_handle: u32,
    last_category: u32,
    banner: Option<BannerHandle>,
    next_banner: u32,
    scores: [u32; 2],
}

impl RapierWorld {
    pub fn new(config: GameConfig) -> Self {
        let mut world = Self {
            gravity: vector![0.0, GRAVITY * STEP_RATE * STEP_RATE],
            integration: IntegrationParameters {
                dt: 1.0 / STEP_RATE,
                ..Default::default()
            },
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: StartedCollisions::default(),
            entries: BTreeMap::new(),
            next_handle: 1,
            last_category: CollisionFilter::DEFAULT.category,
            banner: None,
            next_banner: 1,
            scores: [0; 2],
        };
        world.spawn_bounds(&config);
        world
    }

    /// Floor, both side walls and a ceiling, as fixed slabs outside the arena.
    fn spawn_bounds(&mut self, config: &GameConfig) {
        let t = BOUND_HALF_THICKNESS;
        let width = config.arena_width;
        let floor = config.floor_y();
        let mid_y = (floor + CEILING_Y) / 2.0;
        let half_span_x = width / 2.0 + 2.0 * t;
        let half_span_y = (floor - CEILING_Y) / 2.0 + 2.0 * t;

        let slabs = [
            (vector![width / 2.0, floor + t], half_span_x, t),
            (vector![width / 2.0, CEILING_Y - t], half_span_x, t),
            (vector![-t, mid_y], t, half_span_y),
            (vector![width + t, mid_y], t, half_span_y),
        ];
        for (center, hx, hy) in slabs {
            let body = self
                .rigid_bodies
                .insert(RigidBodyBuilder::fixed().translation(center).build());
            let collider = ColliderBuilder::cuboid(hx, hy)
                .friction(0.0)
                .friction_combine_rule(CoefficientCombineRule::Min)
                .restitution_combine_rule(CoefficientCombineRule::Max)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .user_data(BOUND_USER_DATA)
                .build();
            self.colliders
                .insert_with_parent(collider, body, &mut self.rigid_bodies);
        }
    }

    fn body_of(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        let data = self.colliders.get(collider)?.user_data;
        if data == BOUND_USER_DATA {
            return None;
        }
        u32::try_from(data).ok().map(BodyHandle)
    }

    fn rigid_body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        let entry = self.entries.get(&handle)?;
        self.rigid_bodies.get(entry.rigid_body)
    }

    fn rigid_body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        let entry = self.entries.get(&handle)?;
        self.rigid_bodies.get_mut(entry.rigid_body)
    }

    /// Move a body and stop it.
    pub fn teleport(&mut self, handle: BodyHandle, position: Vec2) {
        if let Some(body) = self.rigid_body_mut(handle) {
            body.set_translation(vector![position.x, position.y], true);
            body.set_linvel(vector![0.0, 0.0], true);
        }
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn filter(&self, handle: BodyHandle) -> Option<CollisionFilter> {
        let entry = self.entries.get(&handle)?;
        let groups = self.colliders.get(entry.collider)?.collision_groups();
        Some(CollisionFilter {
            category: groups.memberships.bits(),
            mask: groups.filter.bits(),
        })
    }

    pub fn animation(&self, handle: BodyHandle) -> Option<Animation> {
        self.entries.get(&handle).and_then(|e| e.animation)
    }

    pub fn body_count(&self) -> usize {
        self.entries.len()
    }

    pub fn banner_visible(&self) -> bool {
        self.banner.is_some()
    }

    pub fn displayed_score(&self, slot: Slot) -> u32 {
        self.scores[slot.index()]
    }
}

fn groups(filter: CollisionFilter) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(filter.category),
        Group::from_bits_truncate(filter.mask),
    )
}

impl Stepped for RapierWorld {
    fn step(&mut self) -> Vec<ContactEvent> {
        self.pipeline.step(
            &self.gravity,
            &self.integration,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.events,
        );

        let started = match self.events.0.lock() {
            Ok(mut started) => std::mem::take(&mut *started),
            Err(_) => Vec::new(),
        };
        started
            .into_iter()
            .filter_map(|(a, b)| match (self.body_of(a), self.body_of(b)) {
                (Some(body), other @ Some(_)) => Some(ContactEvent { body, other }),
                (Some(body), None) | (None, Some(body)) => Some(ContactEvent { body, other: None }),
                (None, None) => None,
            })
            .collect()
    }
}

impl PhysicsWorld for RapierWorld {
    fn spawn_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_handle);
        self.next_handle += 1;

        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let rigid_body = builder
            .translation(vector![desc.position.x, desc.position.y])
            .linvel(vector![desc.velocity.x * STEP_RATE, desc.velocity.y * STEP_RATE])
            .gravity_scale(if desc.ignore_gravity { 0.0 } else { 1.0 })
            .lock_rotations()
            .can_sleep(false)
            .ccd_enabled(desc.kind == BodyKind::Ball)
            .build();
        let rigid_body = self.rigid_bodies.insert(rigid_body);

        let collider = ColliderBuilder::ball(desc.radius)
            .restitution(desc.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .collision_groups(groups(desc.filter))
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .user_data(u128::from(handle.0))
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, rigid_body, &mut self.rigid_bodies);

        self.entries.insert(
            handle,
            Entry {
                rigid_body,
                collider,
                kind: desc.kind,
                animation: None,
            },
        );
        handle
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        let Some(entry) = self.entries.remove(&handle) else {
            return;
        };
        self.rigid_bodies.remove(
            entry.rigid_body,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        let t = self.rigid_body(handle)?.translation();
        Some(Vec2::new(t.x, t.y))
    }

    fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        let v = self.rigid_body(handle)?.linvel();
        Some(Vec2::new(v.x / STEP_RATE, v.y / STEP_RATE))
    }

    fn set_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.rigid_body_mut(handle) {
            body.set_linvel(vector![velocity.x * STEP_RATE, velocity.y * STEP_RATE], true);
        }
    }

    fn set_velocity_x(&mut self, handle: BodyHandle, vx: f32) {
        if let Some(body) = self.rigid_body_mut(handle) {
            let vy = body.linvel().y;
            body.set_linvel(vector![vx * STEP_RATE, vy], true);
        }
    }

    fn set_velocity_y(&mut self, handle: BodyHandle, vy: f32) {
        if let Some(body) = self.rigid_body_mut(handle) {
            let vx = body.linvel().x;
            body.set_linvel(vector![vx, vy * STEP_RATE], true);
        }
    }

    fn set_collision_category(&mut self, handle: BodyHandle, category: u32) {
        let Some(entry) = self.entries.get(&handle) else {
            return;
        };
        if let Some(collider) = self.colliders.get_mut(entry.collider) {
            let current = collider.collision_groups();
            collider.set_collision_groups(InteractionGroups::new(
                Group::from_bits_truncate(category),
                current.filter,
            ));
        }
    }

    fn allocate_category(&mut self) -> u32 {
        self.last_category = self.last_category.checked_shl(1).unwrap_or(0);
        if self.last_category == 0 {
            tracing::warn!("Collision categories exhausted");
        }
        self.last_category
    }
}

impl Presenter for RapierWorld {
    fn play_animation(&mut self, body: BodyHandle, animation: Animation) {
        if let Some(entry) = self.entries.get_mut(&body) {
            if entry.animation != Some(animation) {
                tracing::trace!("{:?} plays {:?}", entry.kind, animation);
            }
            entry.animation = Some(animation);
        }
    }

    fn show_goal_banner(&mut self) -> BannerHandle {
        let handle = BannerHandle(self.next_banner);
        self.next_banner += 1;
        self.banner = Some(handle);
        tracing::debug!("Goal!");
        handle
    }

    fn hide_goal_banner(&mut self, banner: BannerHandle) {
        if self.banner == Some(banner) {
            self.banner = None;
        }
    }

    fn set_score(&mut self, slot: Slot, score: u32) {
        self.scores[slot.index()] = score;
        tracing::debug!("Score for slot {} is now {}", slot, score);
    }
}
