//! Composite bodies: the top-level rigid body ("max parent") that owns a set
//! of colliders and receives every impulse and correction aimed at them.

use std::fmt;

use crate::collider::ShapeId;
use crate::contact::Contact;
use crate::rigid_body::RigidBody;

/// Index of a composite inside a [`CollisionWorld`](crate::world::CollisionWorld).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(pub u32);

impl BodyId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Callback run for each solved contact that touches a composite, before the
/// contact's impulse is applied. It only gets a shared view of the contact.
pub type PreCollisionHook = Box<dyn FnMut(&Contact)>;

/// A rigid body together with the colliders rigidly attached to it.
///
/// Colliders are owned by the world; the composite keeps their ids and each
/// collider keeps the composite's id. Colliders of the same composite never
/// collide with each other.
pub struct Composite {
    pub body: RigidBody,
    shapes: Vec<ShapeId>,
    pre_collision: Option<PreCollisionHook>,
}

impl Composite {
    pub fn new(body: RigidBody) -> Self {
        Self {
            body,
            shapes: Vec::new(),
            pre_collision: None,
        }
    }

    /// Colliders attached to this composite, in attachment order.
    #[inline]
    pub fn shapes(&self) -> &[ShapeId] {
        &self.shapes
    }

    pub(crate) fn attach(&mut self, shape: ShapeId) {
        self.shapes.push(shape);
    }

    pub fn set_pre_collision_hook(&mut self, hook: impl FnMut(&Contact) + 'static) {
        self.pre_collision = Some(Box::new(hook));
    }

    pub fn clear_pre_collision_hook(&mut self) {
        self.pre_collision = None;
    }

    #[inline]
    pub fn has_pre_collision_hook(&self) -> bool {
        self.pre_collision.is_some()
    }

    pub(crate) fn notify_pre_collision(&mut self, contact: &Contact) {
        if let Some(hook) = self.pre_collision.as_mut() {
            hook(contact);
        }
    }
}

impl fmt::Debug for Composite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Composite")
            .field("body", &self.body)
            .field("shapes", &self.shapes)
            .field("pre_collision", &self.pre_collision.is_some())
            .finish()
    }
}
