//! Contact aggregation: distributes solved impulses and positional
//! corrections over each composite's simultaneous contacts.

use glam::Vec3;

use crate::composite::{BodyId, Composite};
use crate::contact::{Contact, SolverBody};

/// Per-composite accumulator, rebuilt every step.
#[derive(Debug, Default, Clone)]
struct BodyRecord {
    /// Indices into the step's contact list.
    contacts: Vec<usize>,
    penetration_sum: f32,
    total_impulse: Vec3,
}

impl BodyRecord {
    /// Share of this body's response owed to a contact of the given depth.
    #[inline]
    fn weight(&self, depth: f32) -> f32 {
        if self.penetration_sum > 0.0 {
            depth / self.penetration_sum
        } else {
            0.0
        }
    }
}

/// Groups contacts by composite and applies their results in two passes:
/// velocity first (weighted impulses), then position (one weighted
/// translation per composite).
#[derive(Debug, Default)]
pub struct ContactAggregator {
    records: Vec<BodyRecord>,
    /// Composites with at least one contact, in first-seen order.
    touched: Vec<BodyId>,
}

impl ContactAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn record_mut(&mut self, body: BodyId) -> &mut BodyRecord {
        if self.records.len() <= body.index() {
            self.records.resize_with(body.index() + 1, BodyRecord::default);
        }
        let record = &mut self.records[body.index()];
        if record.contacts.is_empty() {
            self.touched.push(body);
        }
        record
    }

    /// Attribute every contact to both of its composites.
    pub fn add_contacts(&mut self, contacts: &[Contact]) {
        for (index, contact) in contacts.iter().enumerate() {
            let depth = contact.depth();
            for body in [contact.body1, contact.body2] {
                let record = self.record_mut(body);
                record.contacts.push(index);
                record.penetration_sum += depth;
            }
        }
    }

    /// Number of composites with at least one contact.
    #[inline]
    pub fn touched(&self) -> usize {
        self.touched.len()
    }

    /// Accumulated impulse applied to `body` this cycle.
    pub fn total_impulse(&self, body: BodyId) -> Vec3 {
        self.records
            .get(body.index())
            .map_or(Vec3::ZERO, |r| r.total_impulse)
    }

    /// Solve and apply every registered contact. Returns the number of
    /// composites that received a response.
    pub fn resolve(&mut self, bodies: &mut [Composite], contacts: &mut [Contact]) -> usize {
        // Pass 1: velocity
        for &body in &self.touched {
            let record = &mut self.records[body.index()];
            let mut applied = Vec3::ZERO;
            for &index in &record.contacts {
                let contact = &mut contacts[index];
                let b1 = SolverBody::from_body(&bodies[contact.body1.index()].body);
                let b2 = SolverBody::from_body(&bodies[contact.body2.index()].body);
                contact.solve(&b1, &b2);

                let composite = &mut bodies[body.index()];
                composite.notify_pre_collision(contact);

                let mut impulse = contact.impulse() * record.weight(contact.depth());
                if body != contact.body1 {
                    impulse = -impulse;
                }
                composite.body.apply_impulse(impulse, contact.point);
                applied += impulse;
            }
            record.total_impulse += applied;
        }

        // Pass 2: position
        for &body in &self.touched {
            let record = &self.records[body.index()];
            let mut correction = Vec3::ZERO;
            for &index in &record.contacts {
                let contact = &contacts[index];
                let m1 = bodies[contact.body1.index()].body.mass();
                let m2 = bodies[contact.body2.index()].body.mass();
                let (other, sign) = if body == contact.body1 {
                    (m2, 1.0)
                } else {
                    (m1, -1.0)
                };
                let mut fraction = other / (m1 + m2);
                if fraction.is_nan() {
                    fraction = 1.0;
                }
                let weight = record.weight(contact.depth());
                correction += contact.penetration * weight * fraction * sign;
            }

            let composite = &mut bodies[body.index()];
            if composite.body.is_dynamic() {
                tracing::trace!(body = body.0, ?correction, "positional correction");
            }
            composite.body.translate(correction);
        }

        self.touched.len()
    }

    /// Reset every record touched this cycle.
    pub fn clear(&mut self) {
        for body in self.touched.drain(..) {
            let record = &mut self.records[body.index()];
            record.contacts.clear();
            record.penetration_sum = 0.0;
            record.total_impulse = Vec3::ZERO;
        }
    }
}
