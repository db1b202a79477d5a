//! Spawning, enabling and despawning collision entities.
//!
//! Actors and platforms carry a [`Transform`]; platform objects do not, they sit at their
//! platform's position. These helpers keep the links between entities consistent, so
//! prefer them over spawning or despawning collision components by hand.

use glam::DVec2;
use tracing::{debug, warn};

use crate::collision::events::CollisionListener;
use crate::collision::moving::{detach_actor, detach_all};
use crate::ecs::components::collision::{Actor, Platform, PlatformObject};
use crate::ecs::components::transform::Transform;
use crate::error::Result;

/// Spawn an actor at `position`.
pub fn spawn_actor(world: &mut hecs::World, position: DVec2, actor: Actor) -> hecs::Entity {
    world.spawn((Transform::from_position(position), actor))
}

/// Spawn a platform at `position` with no objects yet.
pub fn spawn_platform(
    world: &mut hecs::World,
    position: DVec2,
    platform: Platform,
) -> hecs::Entity {
    world.spawn((Transform::from_position(position), platform))
}

/// Spawn `object` as a new entity owned by `platform`.
pub fn add_platform_object(
    world: &mut hecs::World,
    platform: hecs::Entity,
    mut object: PlatformObject,
) -> Result<hecs::Entity> {
    world.get::<&Platform>(platform)?;
    object.platform = platform;
    let entity = world.spawn((object,));
    world.get::<&mut Platform>(platform)?.objects.push(entity);
    Ok(entity)
}

/// Enable or disable one platform object. Disabling a moving object drops its riders.
pub fn set_platform_object_enabled(
    world: &mut hecs::World,
    platform_object: hecs::Entity,
    enabled: bool,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let moving = {
        let mut object = world.get::<&mut PlatformObject>(platform_object)?;
        object.enabled = enabled;
        object.is_moving()
    };
    if !enabled && moving {
        detach_all(world, platform_object, listener);
    }
    Ok(())
}

/// Enable or disable a platform and with it all of its objects.
///
/// A disabled platform neither moves nor collides. Disabling drops the riders of its
/// moving objects.
pub fn set_platform_enabled(
    world: &mut hecs::World,
    platform: hecs::Entity,
    enabled: bool,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let objects = {
        let mut p = world.get::<&mut Platform>(platform)?;
        p.enabled = enabled;
        p.objects.clone()
    };
    if !enabled {
        for object in objects {
            detach_all(world, object, listener);
        }
    }
    Ok(())
}

/// Despawn an actor, detaching it from the platform object it rides.
pub fn despawn_actor(
    world: &mut hecs::World,
    actor: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let attached = world.get::<&Actor>(actor)?.attached_to;
    if let Some(object) = attached {
        detach_actor(world, object, actor, listener);
    }
    world.despawn(actor)?;
    debug!("Despawned actor {:?}", actor);
    Ok(())
}

/// Despawn a platform object, detaching its riders and unlinking it from its platform.
pub fn despawn_platform_object(
    world: &mut hecs::World,
    platform_object: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let platform = world.get::<&PlatformObject>(platform_object)?.platform;
    detach_all(world, platform_object, listener);
    if let Ok(mut p) = world.get::<&mut Platform>(platform) {
        p.objects.retain(|o| *o != platform_object);
    }
    world.despawn(platform_object)?;
    debug!("Despawned platform object {:?}", platform_object);
    Ok(())
}

/// Despawn a platform together with all of its objects.
pub fn despawn_platform(
    world: &mut hecs::World,
    platform: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let objects = world.get::<&Platform>(platform)?.objects.clone();
    for object in objects {
        if let Err(err) = despawn_platform_object(world, object, listener) {
            warn!("Platform object {:?} of {:?} already gone: {}", object, platform, err);
        }
    }
    world.despawn(platform)?;
    debug!("Despawned platform {:?}", platform);
    Ok(())
}

/// Despawn whichever collision entity `entity` is.
pub(crate) fn despawn_collision_entity(
    world: &mut hecs::World,
    entity: hecs::Entity,
    listener: &mut dyn CollisionListener,
) -> Result<()> {
    let (is_actor, is_platform, is_object) = {
        let e = world.entity(entity)?;
        (e.has::<Actor>(), e.has::<Platform>(), e.has::<PlatformObject>())
    };
    if is_actor {
        despawn_actor(world, entity, listener)
    } else if is_platform {
        despawn_platform(world, entity, listener)
    } else if is_object {
        despawn_platform_object(world, entity, listener)
    } else {
        world.despawn(entity)?;
        Ok(())
    }
}
