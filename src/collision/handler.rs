//! Per-frame actor movement and collision resolution.
//!
//! # Frame
//!
//! [`Handler::update`] runs these steps in order:
//!
//! 1. Snapshot enabled actors and platform objects, ordered by entity id
//! 2. For each actor: apply pushes from moving platforms, add the carry of the platform it
//!    rides, integrate gravity and velocity, then resolve the sweep in up to
//!    [`MAX_RESOLVE_PASSES`] passes
//! 3. Report crushes and update rider attachment per actor
//! 4. Advance every enabled platform by its velocity
//! 5. Dispatch enter / stay / exit for the frame's contacts
//! 6. Despawn entities queued during the frame

use std::collections::HashSet;

use glam::DVec2;
use tracing::{debug, error, trace, warn};

use crate::ecs::bridge::despawn_collision_entity;
use crate::ecs::components::collision::{Actor, Platform, PlatformObject};
use crate::ecs::components::transform::Transform;

use super::actor::{MovingActor, StationaryActor};
use super::events::CollisionListener;
use super::geometry::{NormalDirection, Rect, EPSILON};
use super::moving::{attach_actor, detach_actor};
use super::platform_object::{ShapeFrame, SweepOptions};
use super::response::{Crush, FrameResponses, Response, ResponseKind};

/// Maximum number of sweeps resolved per actor per frame.
pub const MAX_RESOLVE_PASSES: usize = 3;

/// Configuration for the collision handler.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Acceleration applied to every actor, scaled by its gravity scale. Y grows downward.
    /// Default: zero.
    pub gravity: DVec2,
    /// Longest frame simulated in one update, in seconds. Default: 1/30.
    pub max_delta_time: f64,
    /// Attach actors to moving platform objects they land on. Default: true.
    pub auto_attach: bool,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            gravity: DVec2::ZERO,
            max_delta_time: 1.0 / 30.0,
            auto_attach: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ObjectEntry {
    frame: ShapeFrame,
    moving: bool,
}

type Pair = (hecs::Entity, hecs::Entity);

/// Moves actors, resolves them against platform objects and dispatches events.
pub struct Handler {
    config: HandlerConfig,
    responses: FrameResponses,
    actors: Vec<hecs::Entity>,
    objects: Vec<ObjectEntry>,
    current_pairs: HashSet<Pair>,
    previous_pairs: HashSet<Pair>,
    crushed_pairs: Vec<Pair>,
    pending_despawn: Vec<hecs::Entity>,
}

impl Handler {
    pub fn new(config: HandlerConfig) -> Self {
        Self {
            config,
            responses: FrameResponses::new(),
            actors: Vec::new(),
            objects: Vec::new(),
            current_pairs: HashSet::new(),
            previous_pairs: HashSet::new(),
            crushed_pairs: Vec::new(),
            pending_despawn: Vec::new(),
        }
    }

    pub fn config(&self) -> &HandlerConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut HandlerConfig {
        &mut self.config
    }

    /// Responses produced by the last completed update, in the order they were found.
    pub fn responses(&self) -> &[Response] {
        self.responses.previous()
    }

    /// Despawn `entity` at the end of the current or next update.
    ///
    /// Listeners may call this for entities the update is still iterating over.
    pub fn queue_despawn(&mut self, entity: hecs::Entity) {
        if !self.pending_despawn.contains(&entity) {
            self.pending_despawn.push(entity);
        }
    }

    /// Advance the simulation by `delta_time` seconds.
    ///
    /// `delta_time` is clamped to `[0, max_delta_time]`.
    pub fn update(
        &mut self,
        world: &mut hecs::World,
        delta_time: f64,
        listener: &mut dyn CollisionListener,
    ) {
        // Not `clamp`: a negative or NaN `max_delta_time` must not panic.
        let dt = delta_time.min(self.config.max_delta_time).max(0.0);
        if dt != delta_time {
            trace!("Clamped frame time {} to {}", delta_time, dt);
        }

        self.snapshot(world, dt);

        for i in 0..self.actors.len() {
            let entity = self.actors[i];
            self.resolve_actor(world, entity, dt, listener);
        }

        advance_platforms(world, dt);
        self.dispatch_contacts(world, listener);
        self.responses.recycle_previous();
        self.responses.advance();
        self.flush_despawns(world, listener);
    }

    fn snapshot(&mut self, world: &hecs::World, dt: f64) {
        self.actors.clear();
        for (entity, actor) in world.query::<&Actor>().iter() {
            if actor.enabled {
                self.actors.push(entity);
            }
        }
        self.actors.sort_unstable_by_key(|e| e.id());

        self.objects.clear();
        for (entity, object) in world.query::<&PlatformObject>().iter() {
            if !object.enabled {
                continue;
            }
            let (Ok(platform), Ok(transform)) = (
                world.get::<&Platform>(object.platform),
                world.get::<&Transform>(object.platform),
            ) else {
                warn!("Platform object {:?} has no platform", entity);
                continue;
            };
            if !platform.enabled {
                continue;
            }
            self.objects.push(ObjectEntry {
                frame: ShapeFrame::new(
                    entity,
                    object.platform,
                    transform.position,
                    platform.displacement(dt),
                ),
                moving: object.is_moving(),
            });
        }
        self.objects.sort_unstable_by_key(|o| o.frame.object.id());
    }

    fn resolve_actor(
        &mut self,
        world: &mut hecs::World,
        entity: hecs::Entity,
        dt: f64,
        listener: &mut dyn CollisionListener,
    ) {
        let (position, mut actor) = match (
            world.get::<&Transform>(entity),
            world.get::<&Actor>(entity),
        ) {
            (Ok(transform), Ok(actor)) => (transform.position, *actor),
            _ => return,
        };
        let first_response = self.responses.current().len();
        let stationary = StationaryActor::new(entity, position, &actor);

        // Pushes from moving platforms. All are recorded; the first one not from the ridden
        // object moves the actor.
        let mut start = stationary;
        let mut pushed = false;
        for entry in &self.objects {
            if !entry.moving {
                continue;
            }
            let Ok(object) = world.get::<&PlatformObject>(entry.frame.object) else {
                continue;
            };
            if let Some(response) = object.collide_stationary_actor(&entry.frame, &stationary) {
                trace!("Platform object {:?} pushes actor {:?}", entry.frame.object, entity);
                self.responses.push(response);
                if pushed || actor.attached_to == Some(entry.frame.object) {
                    continue;
                }
                let bounds = settled_bounds(response.reposition, actor.offset, actor.half_extents);
                if blocked_by_static(world, &self.objects, &bounds, actor.collision_mask) {
                    trace!("Push of actor {:?} blocked by static geometry", entity);
                    continue;
                }
                start.position = response.reposition;
                pushed = true;
            }
        }

        let carry = self.carry(world, &actor, &stationary);

        actor.velocity += self.config.gravity * actor.gravity_scale * dt;
        let pos1 = start.position + (actor.velocity + actor.wind) * dt + carry;
        let mut sweep = MovingActor::new(&start, pos1);
        let resolved =
            self.resolve_passes(world, &mut sweep, actor.project_collision, stationary.position);

        if let Ok(mut transform) = world.get::<&mut Transform>(entity) {
            transform.position = resolved;
        }
        if let Ok(mut a) = world.get::<&mut Actor>(entity) {
            a.velocity = actor.velocity;
        }

        self.report_crushes(entity, first_response, actor.crush_angle_threshold, listener);
        if self.config.auto_attach {
            self.update_attachment(world, entity, first_response, listener);
        }
    }

    /// Displacement the ridden platform object applies to the actor this frame.
    fn carry(&self, world: &hecs::World, actor: &Actor, stationary: &StationaryActor) -> DVec2 {
        let Some(attached) = actor.attached_to else {
            return DVec2::ZERO;
        };
        let Some(entry) = self.objects.iter().find(|o| o.frame.object == attached) else {
            return DVec2::ZERO;
        };
        let Ok(object) = world.get::<&PlatformObject>(attached) else {
            return DVec2::ZERO;
        };
        object.as_moving().map_or(DVec2::ZERO, |moving| {
            moving.move_attached_actor(&entry.frame, stationary) - stationary.position
        })
    }

    /// Resolve `sweep` against every platform object and return the actor's final position.
    ///
    /// Falls back to `fallback` when the passes run out at a position inside static geometry.
    fn resolve_passes(
        &mut self,
        world: &hecs::World,
        sweep: &mut MovingActor,
        project_collision: bool,
        fallback: DVec2,
    ) -> DVec2 {
        let mut unverified = false;
        for pass in 0..MAX_RESOLVE_PASSES {
            let options = SweepOptions {
                project: project_collision && pass + 2 < MAX_RESOLVE_PASSES,
                resting_contacts: pass == 0,
            };
            let Some(response) = self.earliest_hit(world, sweep, options) else {
                unverified = false;
                break;
            };

            match response.kind {
                ResponseKind::Bullet => {
                    sweep.pos0 = response.reposition;
                    sweep.pos1 = response.reposition;
                }
                ResponseKind::Project => {
                    sweep.pos0 = response.reposition;
                    sweep.pos1 = response.reposition_project;
                }
                ResponseKind::Intersect => {
                    let remaining = sweep.displacement();
                    sweep.pos0 = response.reposition;
                    sweep.pos1 = response.reposition + remaining;
                }
                ResponseKind::MovingPlatform => {
                    error!(
                        "Moving platform response from {:?} during sweep of actor {:?}",
                        response.platform_object, response.actor
                    );
                    continue;
                }
            }
            trace!(
                "Pass {} resolved actor {:?} against {:?} ({:?}, t = {})",
                pass,
                response.actor,
                response.platform_object,
                response.kind,
                response.time
            );
            self.responses.push(response);

            if sweep.is_at_rest() {
                unverified = false;
                break;
            }
            unverified = true;
        }

        if !unverified {
            return sweep.pos1;
        }
        debug!("Actor {:?} ran out of resolve passes", sweep.actor);
        let bounds = settled_bounds(sweep.pos0, sweep.offset, sweep.half_extents);
        if blocked_by_static(world, &self.objects, &bounds, sweep.collision_mask) {
            debug!(
                "Actor {:?} kept at {:?} instead of ending inside static geometry",
                sweep.actor, fallback
            );
            return fallback;
        }
        sweep.pos0
    }

    /// Earliest response over every object. Ties go to the lowest entity id.
    ///
    /// Responses from platforms that move this frame are dropped when they would put the
    /// actor inside static geometry; the actor is squeezed instead.
    fn earliest_hit(
        &self,
        world: &hecs::World,
        sweep: &MovingActor,
        options: SweepOptions,
    ) -> Option<Response> {
        let mut best: Option<Response> = None;
        for entry in &self.objects {
            let Ok(object) = world.get::<&PlatformObject>(entry.frame.object) else {
                continue;
            };
            let Some(response) = object.collide_moving_actor(&entry.frame, sweep, options) else {
                continue;
            };
            if entry.frame.displacement != DVec2::ZERO {
                let bounds = settled_bounds(response.reposition, sweep.offset, sweep.half_extents);
                if blocked_by_static(world, &self.objects, &bounds, sweep.collision_mask) {
                    trace!(
                        "Dropped {:?} response from {:?}: actor {:?} would enter static geometry",
                        response.kind, entry.frame.object, sweep.actor
                    );
                    continue;
                }
            }
            if best.map_or(true, |b| response.time < b.time) {
                best = Some(response);
            }
        }
        best
    }

    fn report_crushes(
        &mut self,
        entity: hecs::Entity,
        first: usize,
        threshold: f64,
        listener: &mut dyn CollisionListener,
    ) {
        self.crushed_pairs.clear();
        let responses = &self.responses.current()[first..];
        for (i, a) in responses.iter().enumerate() {
            for b in &responses[i + 1..] {
                let Some(crush) = Crush::between(a, b, threshold) else {
                    continue;
                };
                let key = if a.platform_object.id() < b.platform_object.id() {
                    (a.platform_object, b.platform_object)
                } else {
                    (b.platform_object, a.platform_object)
                };
                if self.crushed_pairs.contains(&key) {
                    continue;
                }
                self.crushed_pairs.push(key);
                debug!(
                    "Actor {:?} crushed between {:?} and {:?} ({:.1} degrees)",
                    entity, key.0, key.1, crush.angle
                );
                listener.on_collision_crush(entity, &crush);
            }
        }
    }

    /// Attach to a moving object the actor stands on, or detach once it no longer does.
    fn update_attachment(
        &self,
        world: &mut hecs::World,
        entity: hecs::Entity,
        first: usize,
        listener: &mut dyn CollisionListener,
    ) {
        let Ok(attached) = world.get::<&Actor>(entity).map(|a| a.attached_to) else {
            return;
        };

        let mut standing_on = None;
        for response in &self.responses.current()[first..] {
            if response.normal_direction() != NormalDirection::Up {
                continue;
            }
            if Some(response.platform_object) == attached {
                return;
            }
            if standing_on.is_none() && self.is_moving_object(response.platform_object) {
                standing_on = Some(response.platform_object);
            }
        }

        match (standing_on, attached) {
            (Some(object), _) => {
                if let Err(err) = attach_actor(world, object, entity, listener) {
                    warn!("Failed to attach actor {:?} to {:?}: {}", entity, object, err);
                }
            }
            (None, Some(previous)) => {
                detach_actor(world, previous, entity, listener);
            }
            (None, None) => {}
        }
    }

    fn is_moving_object(&self, object: hecs::Entity) -> bool {
        self.objects
            .iter()
            .any(|o| o.moving && o.frame.object == object)
    }

    /// Enter / stay / exit bookkeeping against the previous frame's contacts.
    fn dispatch_contacts(&mut self, world: &mut hecs::World, listener: &mut dyn CollisionListener) {
        self.current_pairs.clear();
        for response in self.responses.current() {
            if !self.current_pairs.insert(response.pair()) {
                continue;
            }
            if !self.previous_pairs.contains(&response.pair()) {
                notify(world, response, |receiver, r| {
                    listener.on_collision_enter(receiver, r)
                });
            }
            notify(world, response, |receiver, r| {
                listener.on_collision_stay(receiver, r)
            });
            zero_velocity_into_surface(world, response);
        }

        for response in self.responses.previous() {
            let pair = response.pair();
            if self.current_pairs.contains(&pair) || !self.previous_pairs.remove(&pair) {
                continue;
            }
            notify(world, response, |receiver, r| {
                listener.on_collision_exit(receiver, r)
            });
        }

        self.previous_pairs.clear();
        std::mem::swap(&mut self.current_pairs, &mut self.previous_pairs);
    }

    fn flush_despawns(&mut self, world: &mut hecs::World, listener: &mut dyn CollisionListener) {
        for entity in std::mem::take(&mut self.pending_despawn) {
            if let Err(err) = despawn_collision_entity(world, entity, listener) {
                warn!("Queued despawn of {:?} failed: {}", entity, err);
            }
        }
    }
}

impl Default for Handler {
    fn default() -> Self {
        Self::new(HandlerConfig::default())
    }
}

/// Actor box at `position`, shrunk by `EPSILON` so surfaces it merely touches do not count.
fn settled_bounds(position: DVec2, offset: DVec2, half_extents: DVec2) -> Rect {
    let half_extents = (half_extents - DVec2::splat(EPSILON)).max(DVec2::ZERO);
    Rect::from_center(position + offset, half_extents)
}

/// Whether `bounds` overlaps an object whose platform does not move this frame.
fn blocked_by_static(
    world: &hecs::World,
    objects: &[ObjectEntry],
    bounds: &Rect,
    mask: u32,
) -> bool {
    objects
        .iter()
        .filter(|o| o.frame.displacement == DVec2::ZERO)
        .any(|o| {
            world
                .get::<&PlatformObject>(o.frame.object)
                .is_ok_and(|object| object.overlaps_rect(o.frame.origin, bounds, mask))
        })
}

/// Deliver one contact event to the actor and to the platform owning the object.
fn notify(
    world: &hecs::World,
    response: &Response,
    mut deliver: impl FnMut(hecs::Entity, &Response),
) {
    for receiver in [response.actor, response.platform] {
        if world.contains(receiver) {
            deliver(receiver, response);
        }
    }
}

/// Zero the actor's velocity component pointing into the surface of `response`.
fn zero_velocity_into_surface(world: &hecs::World, response: &Response) {
    let Ok(mut actor) = world.get::<&mut Actor>(response.actor) else {
        return;
    };
    if !actor.zero_velocity_on_collision {
        return;
    }
    let v = &mut actor.velocity;
    match response.normal_direction() {
        NormalDirection::Up if v.y > 0.0 => v.y = 0.0,
        NormalDirection::Down if v.y < 0.0 => v.y = 0.0,
        NormalDirection::Left if v.x > 0.0 => v.x = 0.0,
        NormalDirection::Right if v.x < 0.0 => v.x = 0.0,
        _ => {}
    }
}

/// Move every enabled platform by its velocity.
fn advance_platforms(world: &mut hecs::World, dt: f64) {
    for (_, (transform, platform)) in world.query_mut::<(&mut Transform, &Platform)>() {
        transform.translate(platform.displacement(dt));
    }
}
