use bevy::prelude::*;

/// Ray distance to an oriented box of `size` placed by `xf`.
pub fn ray_hits_obb(origin: Vec3, dir: Vec3, xf: &GlobalTransform, size: Vec3) -> Option<f32> {
    let inv = xf.compute_matrix().inverse();
    let o_local = inv.transform_point3(origin);
    let d_local = inv.transform_vector3(dir);
    let he = size * 0.5;
    ray_aabb_hit_t(o_local, d_local, -he, he)
}

// Slab-method ray–AABB intersection, returns Some(t) or None
pub fn ray_aabb_hit_t(ray_origin: Vec3, ray_direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;

    for axis in 0..3 {
        let origin = ray_origin[axis];
        let direction = ray_direction[axis];

        // Parallel to this slab: inside it or never hits.
        if direction == 0.0 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / direction;
        let (mut t0, mut t1) = ((min[axis] - origin) * inv, (max[axis] - origin) * inv);
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        tmin = tmin.max(t0);
        tmax = tmax.min(t1);
        if tmin > tmax {
            return None;
        }
    }

    if tmax < 0.0 {
        return None;
    }
    Some(if tmin >= 0.0 { tmin } else { tmax })
}
