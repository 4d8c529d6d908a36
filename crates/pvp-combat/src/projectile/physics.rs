//! Projectile motion and swept collision

use pvp_core::{DVec3, IVec3};

use crate::world::BlockWorld;

/// Velocity kept each tick in flight
pub const DRAG: f64 = 0.99;
/// Downward acceleration per tick
pub const GRAVITY: f64 = 0.05;
/// Entity boxes are grown by this much when testing projectile hits
pub const HIT_BOX_MARGIN: f64 = 0.3;

/// A block crossed by a moving projectile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockHit {
    pub block: IVec3,
    /// Point where the segment enters the block
    pub position: DVec3,
    /// Fraction of the segment travelled before the hit, in `0.0..=1.0`
    pub fraction: f64,
}

/// Velocity after one tick of drag and gravity
pub fn apply_drag_and_gravity(velocity: DVec3) -> DVec3 {
    let mut velocity = velocity * DRAG;
    velocity.y -= GRAVITY;
    velocity
}

/// First solid block along `start..end`, walking the voxel grid cell by cell
pub fn raycast_blocks(world: &dyn BlockWorld, start: DVec3, end: DVec3) -> Option<BlockHit> {
    let mut cell = start.floor().as_ivec3();
    if world.is_solid(cell) {
        return Some(BlockHit {
            block: cell,
            position: start,
            fraction: 0.0,
        });
    }

    let delta = end - start;
    let length = delta.length();
    let direction = delta.try_normalize()?;

    let step = IVec3::new(
        axis_step(direction.x),
        axis_step(direction.y),
        axis_step(direction.z),
    );
    let mut t_max = DVec3::new(
        first_boundary(start.x, cell.x, direction.x),
        first_boundary(start.y, cell.y, direction.y),
        first_boundary(start.z, cell.z, direction.z),
    );
    let t_delta = DVec3::new(
        1.0 / direction.x.abs(),
        1.0 / direction.y.abs(),
        1.0 / direction.z.abs(),
    );

    loop {
        let t = t_max.min_element();
        if t > length {
            return None;
        }
        if t_max.x == t {
            cell.x += step.x;
            t_max.x += t_delta.x;
        } else if t_max.y == t {
            cell.y += step.y;
            t_max.y += t_delta.y;
        } else {
            cell.z += step.z;
            t_max.z += t_delta.z;
        }
        if world.is_solid(cell) {
            return Some(BlockHit {
                block: cell,
                position: start + direction * t,
                fraction: t / length,
            });
        }
    }
}

fn axis_step(direction: f64) -> i32 {
    if direction > 0.0 {
        1
    } else if direction < 0.0 {
        -1
    } else {
        0
    }
}

/// Distance along the ray to the first cell boundary on one axis
fn first_boundary(origin: f64, cell: i32, direction: f64) -> f64 {
    if direction > 0.0 {
        (f64::from(cell) + 1.0 - origin) / direction
    } else if direction < 0.0 {
        (f64::from(cell) - origin) / direction
    } else {
        f64::INFINITY
    }
}

/// Fraction of `start..end` at which the segment enters the box, if it does.
/// A segment starting inside the box enters at `0.0`.
pub fn segment_box_entry(start: DVec3, end: DVec3, min: DVec3, max: DVec3) -> Option<f64> {
    let delta = end - start;
    let mut enter = 0.0_f64;
    let mut exit = 1.0_f64;
    for axis in 0..3 {
        let (origin, d, lo, hi) = (start[axis], delta[axis], min[axis], max[axis]);
        if d.abs() < f64::EPSILON {
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - origin) / d;
        let t2 = (hi - origin) / d;
        enter = enter.max(t1.min(t2));
        exit = exit.min(t1.max(t2));
        if enter > exit {
            return None;
        }
    }
    Some(enter)
}
