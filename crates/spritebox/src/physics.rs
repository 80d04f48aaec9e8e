//! # Sphere Physics
//!
//! Circle-vs-circle overlap tests and a cheap impulse response, enough for
//! a handful of actors shoving each other around an arena. Bodies carry a
//! per-frame `force` (consumed by integration) and a persistent `velocity`
//! (decayed by friction). Collision response splits the separating impulse
//! between the two bodies by weight: a static body absorbs nothing and
//! pushes the other body the full distance.

/// Magnitudes below this are treated as zero to dodge float dust.
pub const NEAR_ZERO: f32 = 0.0001;

/// Divisor applied to the separating impulse per frame. Higher values make
/// overlapping bodies ease apart over several frames instead of teleporting.
pub const BOUNCE: f32 = 10.0;

/// Force applied per frame while a direction is held.
pub const INPUT_FORCE: f32 = 0.6;

/// Per-frame velocity decay for player bodies.
pub const PLAYER_FRICTION: f32 = 0.3;

/// Per-frame velocity decay for prop bodies, heavier than the player's so
/// shoved props skid to a stop quickly.
pub const PROP_FRICTION: f32 = 0.6;

/// A collision circle in arena space.
#[derive(Clone, Copy, Debug)]
pub struct CollisionShape {
    /// Center of the circle.
    pub position: [f32; 2],
    /// Circle radius.
    pub radius: f32,
    /// Static shapes never move in response to a collision.
    pub is_static: bool,
}

impl CollisionShape {
    /// Creates a movable shape.
    #[must_use]
    pub const fn new(position: [f32; 2], radius: f32) -> Self {
        Self {
            position,
            radius,
            is_static: false,
        }
    }

    /// Creates an immovable shape.
    #[must_use]
    pub const fn fixed(position: [f32; 2], radius: f32) -> Self {
        Self {
            position,
            radius,
            is_static: true,
        }
    }
}

/// Result of an overlap test between two shapes.
#[derive(Clone, Copy, Debug)]
pub struct Intersection {
    /// Contact point on the first shape's rim, toward the second.
    pub contact_a: [f32; 2],
    /// Contact point on the second shape's rim, toward the first.
    pub contact_b: [f32; 2],
    /// Overlap depth along the center line.
    pub depth: f32,
}

/// A moving body: a shape plus velocity and the force accumulated this
/// frame.
#[derive(Clone, Copy, Debug)]
pub struct PhysicsBody {
    /// The body's collision circle at its settled position.
    pub collision: CollisionShape,
    /// Carried between frames, decayed by friction.
    pub velocity: [f32; 2],
    /// Accumulated this frame, consumed by [`PhysicsBody::post_update`].
    pub force: [f32; 2],
}

impl PhysicsBody {
    /// Creates a body at rest.
    #[must_use]
    pub const fn new(collision: CollisionShape) -> Self {
        Self {
            collision,
            velocity: [0.0, 0.0],
            force: [0.0, 0.0],
        }
    }

    /// Returns the shape where this body will be after integration.
    ///
    /// Collisions are tested against next-frame positions so two bodies
    /// moving toward each other react before they interpenetrate on
    /// screen.
    #[must_use]
    pub fn world_shape(&self) -> CollisionShape {
        let mut shape = self.collision;
        shape.position[0] += self.velocity[0] + self.force[0];
        shape.position[1] += self.velocity[1] + self.force[1];
        shape
    }

    /// Integrates force into velocity and velocity into position, then
    /// applies friction. Call once per frame after collision resolution.
    pub fn post_update(&mut self, friction: f32) {
        self.velocity[0] += self.force[0];
        self.velocity[1] += self.force[1];
        self.force = [0.0, 0.0];

        self.collision.position[0] += self.velocity[0];
        self.collision.position[1] += self.velocity[1];

        self.velocity[0] *= 1.0 - friction;
        self.velocity[1] *= 1.0 - friction;

        if self.velocity[0].abs() < NEAR_ZERO {
            self.velocity[0] = 0.0;
        }
        if self.velocity[1].abs() < NEAR_ZERO {
            self.velocity[1] = 0.0;
        }
    }
}

/// Tests two shapes for overlap.
///
/// Returns `None` when the shapes are separated or exactly concentric
/// (no usable separation axis).
#[must_use]
pub fn intersect(a: &CollisionShape, b: &CollisionShape) -> Option<Intersection> {
    let delta = [b.position[0] - a.position[0], b.position[1] - a.position[1]];
    let distance_sq = delta[0] * delta[0] + delta[1] * delta[1];
    let reach = a.radius + b.radius;
    if distance_sq >= reach * reach {
        return None;
    }

    let distance = distance_sq.sqrt();
    if distance < NEAR_ZERO {
        return None;
    }

    let axis = [delta[0] / distance, delta[1] / distance];
    Some(Intersection {
        contact_a: [
            a.position[0] + axis[0] * a.radius,
            a.position[1] + axis[1] * a.radius,
        ],
        contact_b: [
            b.position[0] - axis[0] * b.radius,
            b.position[1] - axis[1] * b.radius,
        ],
        depth: reach - distance,
    })
}

/// Resolves an overlap between two bodies by pushing them apart.
///
/// The separating delta (damped by [`BOUNCE`]) is split by weight: if
/// either body is static it takes weight 1 and the other takes the whole
/// push; otherwise the split is even. The push is applied as force, so it
/// feeds the same integration step as input.
///
/// Returns whether the bodies overlapped.
pub fn resolve(a: &mut PhysicsBody, b: &mut PhysicsBody) -> bool {
    let shape_a = a.world_shape();
    let shape_b = b.world_shape();
    let Some(hit) = intersect(&shape_a, &shape_b) else {
        return false;
    };

    let mut delta = [
        (hit.contact_b[0] - hit.contact_a[0]) / BOUNCE,
        (hit.contact_b[1] - hit.contact_a[1]) / BOUNCE,
    ];

    // Weight of a: 1 if b cannot move, 0 if a cannot, otherwise split.
    let weight_a = if shape_b.is_static {
        1.0
    } else if shape_a.is_static {
        0.0
    } else {
        0.5
    };

    if !shape_a.is_static {
        a.force[0] += delta[0] * weight_a;
        a.force[1] += delta[1] * weight_a;
    }
    delta[0] *= 1.0 - weight_a;
    delta[1] *= 1.0 - weight_a;
    if !shape_b.is_static {
        b.force[0] -= delta[0];
        b.force[1] -= delta[1];
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separated_shapes_do_not_intersect() {
        let a = CollisionShape::new([0.0, 0.0], 5.0);
        let b = CollisionShape::new([20.0, 0.0], 5.0);
        assert!(intersect(&a, &b).is_none());
    }

    #[test]
    fn test_overlap_depth_and_contacts() {
        let a = CollisionShape::new([0.0, 0.0], 5.0);
        let b = CollisionShape::new([8.0, 0.0], 5.0);
        let hit = intersect(&a, &b).unwrap();
        assert!((hit.depth - 2.0).abs() < 1e-6);
        assert!((hit.contact_a[0] - 5.0).abs() < 1e-6);
        assert!((hit.contact_b[0] - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_concentric_shapes_have_no_axis() {
        let a = CollisionShape::new([3.0, 3.0], 5.0);
        let b = CollisionShape::new([3.0, 3.0], 2.0);
        assert!(intersect(&a, &b).is_none());
    }

    #[test]
    fn test_resolve_pushes_movable_bodies_apart() {
        let mut a = PhysicsBody::new(CollisionShape::new([0.0, 0.0], 5.0));
        let mut b = PhysicsBody::new(CollisionShape::new([8.0, 0.0], 5.0));
        assert!(resolve(&mut a, &mut b));
        assert!(a.force[0] < 0.0, "a pushed left, got {:?}", a.force);
        assert!(b.force[0] > 0.0, "b pushed right, got {:?}", b.force);
        assert!((a.force[0] + b.force[0]).abs() < 1e-6, "push is symmetric");
    }

    #[test]
    fn test_static_body_takes_no_push() {
        let mut wall = PhysicsBody::new(CollisionShape::fixed([8.0, 0.0], 5.0));
        let mut ball = PhysicsBody::new(CollisionShape::new([0.0, 0.0], 5.0));
        assert!(resolve(&mut ball, &mut wall));
        assert_eq!(wall.force, [0.0, 0.0]);
        assert!(ball.force[0] < 0.0);

        // Order independence: static first.
        let mut wall = PhysicsBody::new(CollisionShape::fixed([8.0, 0.0], 5.0));
        let mut ball = PhysicsBody::new(CollisionShape::new([0.0, 0.0], 5.0));
        assert!(resolve(&mut wall, &mut ball));
        assert_eq!(wall.force, [0.0, 0.0]);
        assert!(ball.force[0] < 0.0);
    }

    #[test]
    fn test_post_update_integrates_and_decays() {
        let mut body = PhysicsBody::new(CollisionShape::new([0.0, 0.0], 5.0));
        body.force = [1.0, 0.0];
        body.post_update(0.5);
        assert!((body.collision.position[0] - 1.0).abs() < 1e-6);
        assert!((body.velocity[0] - 0.5).abs() < 1e-6);
        assert_eq!(body.force, [0.0, 0.0]);
    }

    #[test]
    fn test_tiny_velocity_snaps_to_zero() {
        let mut body = PhysicsBody::new(CollisionShape::new([0.0, 0.0], 5.0));
        body.velocity = [NEAR_ZERO / 2.0, 0.0];
        body.post_update(0.0);
        assert_eq!(body.velocity, [0.0, 0.0]);
    }
}
