//! Collision and attachment notifications.

use super::response::{Crush, Response};

/// Receives collision and attachment events.
///
/// Every method has a no-op default, so implementors only override what they care about.
/// `receiver` is the entity the event is addressed to: the actor, or the platform owning
/// the platform object involved.
pub trait CollisionListener {
    fn on_collision_enter(&mut self, _receiver: hecs::Entity, _response: &Response) {}

    /// Fires every frame a contact persists, including the frame it began.
    fn on_collision_stay(&mut self, _receiver: hecs::Entity, _response: &Response) {}

    fn on_collision_exit(&mut self, _receiver: hecs::Entity, _response: &Response) {}

    fn on_collision_crush(&mut self, _receiver: hecs::Entity, _crush: &Crush) {}

    fn on_platform_attach(&mut self, _receiver: hecs::Entity, _platform_object: hecs::Entity) {}

    fn on_platform_detach(&mut self, _receiver: hecs::Entity, _platform_object: hecs::Entity) {}
}

/// Discards every event.
impl CollisionListener for () {}

/// A recorded event.
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionEvent {
    Enter {
        receiver: hecs::Entity,
        response: Response,
    },
    Stay {
        receiver: hecs::Entity,
        response: Response,
    },
    Exit {
        receiver: hecs::Entity,
        response: Response,
    },
    Crush {
        receiver: hecs::Entity,
        crush: Crush,
    },
    PlatformAttach {
        receiver: hecs::Entity,
        platform_object: hecs::Entity,
    },
    PlatformDetach {
        receiver: hecs::Entity,
        platform_object: hecs::Entity,
    },
}

impl CollisionEvent {
    pub fn receiver(&self) -> hecs::Entity {
        match *self {
            CollisionEvent::Enter { receiver, .. }
            | CollisionEvent::Stay { receiver, .. }
            | CollisionEvent::Exit { receiver, .. }
            | CollisionEvent::Crush { receiver, .. }
            | CollisionEvent::PlatformAttach { receiver, .. }
            | CollisionEvent::PlatformDetach { receiver, .. } => receiver,
        }
    }
}

/// Records events in the order they fire.
impl CollisionListener for Vec<CollisionEvent> {
    fn on_collision_enter(&mut self, receiver: hecs::Entity, response: &Response) {
        self.push(CollisionEvent::Enter {
            receiver,
            response: *response,
        });
    }

    fn on_collision_stay(&mut self, receiver: hecs::Entity, response: &Response) {
        self.push(CollisionEvent::Stay {
            receiver,
            response: *response,
        });
    }

    fn on_collision_exit(&mut self, receiver: hecs::Entity, response: &Response) {
        self.push(CollisionEvent::Exit {
            receiver,
            response: *response,
        });
    }

    fn on_collision_crush(&mut self, receiver: hecs::Entity, crush: &Crush) {
        self.push(CollisionEvent::Crush {
            receiver,
            crush: *crush,
        });
    }

    fn on_platform_attach(&mut self, receiver: hecs::Entity, platform_object: hecs::Entity) {
        self.push(CollisionEvent::PlatformAttach {
            receiver,
            platform_object,
        });
    }

    fn on_platform_detach(&mut self, receiver: hecs::Entity, platform_object: hecs::Entity) {
        self.push(CollisionEvent::PlatformDetach {
            receiver,
            platform_object,
        });
    }
}
