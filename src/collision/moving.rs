//! Rider attachment for moving platform objects.
//!
//! An actor rides at most one moving platform object. The actor stores which one in
//! [`Actor::attached_platform_object`], the object keeps the reverse list, and both sides
//! are always updated together.

use glam::DVec2;
use tracing::debug;

use crate::ecs::components::collision::{Actor, MovingPlatformObject, PlatformObject};
use crate::error::{CollisionError, Result};

use super::actor::StationaryActor;
use super::events::CollisionListener;
use super::platform_object::ShapeFrame;

impl MovingPlatformObject {
    /// Where an attached actor ends up when carried along for this frame.
    #[inline]
    pub fn move_attached_actor(&self, frame: &ShapeFrame, actor: &StationaryActor) -> DVec2 {
        actor.position + frame.displacement
    }
}

/// Attach `actor` to the moving platform object `platform_object`.
///
/// Detaches the actor from any other object first, so it never rides two at once.
/// Attaching to the object it already rides is a no-op.
pub fn attach_actor(
    world: &mut hecs::World,
    platform_object: hecs::Entity,
    actor: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let current = world.get::<&Actor>(actor)?.attached_to;
    let platform = {
        let object = world.get::<&PlatformObject>(platform_object)?;
        let moving = object
            .as_moving()
            .ok_or(CollisionError::NotMoving(platform_object))?;
        if current == Some(platform_object) && moving.is_attached(actor) {
            return Ok(());
        }
        object.platform
    };

    if let Some(previous) = current {
        detach_actor(world, previous, actor, listener);
    }

    if let Some(moving) = world.get::<&mut PlatformObject>(platform_object)?.moving.as_mut() {
        if !moving.is_attached(actor) {
            moving.attached.push(actor);
        }
    }
    world.get::<&mut Actor>(actor)?.attached_to = Some(platform_object);

    debug!("Attached actor {:?} to platform object {:?}", actor, platform_object);
    listener.on_platform_attach(actor, platform_object);
    if world.contains(platform) {
        listener.on_platform_attach(platform, platform_object);
    }
    Ok(())
}

/// Detach `actor` from `platform_object`. Returns whether it was attached.
///
/// Either entity may already be gone; whatever side still exists is cleaned up.
pub fn detach_actor(
    world: &mut hecs::World,
    platform_object: hecs::Entity,
    actor: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> bool {
    let mut was_attached = false;
    let mut platform = None;

    if let Ok(mut object) = world.get::<&mut PlatformObject>(platform_object) {
        platform = Some(object.platform);
        if let Some(moving) = object.moving.as_mut() {
            if let Some(index) = moving.attached.iter().position(|a| *a == actor) {
                moving.attached.remove(index);
                was_attached = true;
            }
        }
    }
    if let Ok(mut a) = world.get::<&mut Actor>(actor) {
        if a.attached_to == Some(platform_object) {
            a.attached_to = None;
            was_attached = true;
        }
    }
    if !was_attached {
        return false;
    }

    debug!("Detached actor {:?} from platform object {:?}", actor, platform_object);
    if world.contains(actor) {
        listener.on_platform_detach(actor, platform_object);
    }
    if let Some(platform) = platform.filter(|p| world.contains(*p)) {
        listener.on_platform_detach(platform, platform_object);
    }
    true
}

/// Detach every rider of `platform_object`. Returns how many were detached.
pub fn detach_all(
    world: &mut hecs::World,
    platform_object: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> usize {
    let riders = match world.get::<&PlatformObject>(platform_object) {
        Ok(object) => object
            .as_moving()
            .map(|m| m.attached_actors().to_vec())
            .unwrap_or_default(),
        Err(_) => return 0,
    };
    riders
        .into_iter()
        .filter(|actor| detach_actor(world, platform_object, *actor, listener))
        .count()
}
