/// Keyframe sampling.
///
/// Key lists are sorted by strictly increasing time. Sampling finds the
/// segment `[k_i, k_i+1]` around the query time and blends the two values;
/// times outside the key range are clamped to the first or last segment
/// and to its end values (no extrapolation).

use glam::{Quat, Vec3};

/// A value at a point in time (in ticks).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    pub time: f32,
    pub value: T,
}

impl<T> Keyframe<T> {
    pub fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Blend between two key values.
pub trait Interpolate: Copy {
    /// Value at `factor` in `[0, 1]` between `from` and `to`.
    fn interpolate(from: Self, to: Self, factor: f32) -> Self;
}

impl Interpolate for Vec3 {
    fn interpolate(from: Self, to: Self, factor: f32) -> Self {
        from.lerp(to, factor)
    }
}

impl Interpolate for Quat {
    /// Spherical interpolation, renormalized.
    fn interpolate(from: Self, to: Self, factor: f32) -> Self {
        from.slerp(to, factor).normalize()
    }
}

/// Index `i` of the segment with `keys[i].time <= time < keys[i + 1].time`.
///
/// Times before the first key map to segment 0, times at or after the
/// last key map to the last segment (`len - 2`). Needs at least two keys;
/// shorter slices return 0.
pub fn find_segment<T>(time: f32, keys: &[Keyframe<T>]) -> usize {
    if keys.len() < 2 {
        return 0;
    }
    // Number of keys after the first one that are not past `time`
    let upper = keys[1..].partition_point(|k| k.time <= time);
    upper.min(keys.len() - 2)
}

/// Normalized position of `time` between two key times, clamped to `[0, 1]`.
pub fn blend_factor(start: f32, end: f32, time: f32) -> f32 {
    let span = end - start;
    if span <= 0.0 {
        return 0.0;
    }
    ((time - start) / span).clamp(0.0, 1.0)
}

/// Sample a key list at `time`.
///
/// A single key is returned as is for any time. `None` for an empty list.
pub fn interpolate<T: Interpolate>(time: f32, keys: &[Keyframe<T>]) -> Option<T> {
    match keys {
        [] => None,
        [only] => Some(only.value),
        _ => {
            let index = find_segment(time, keys);
            let (from, to) = (&keys[index], &keys[index + 1]);
            let factor = blend_factor(from.time, to.time, time);
            Some(T::interpolate(from.value, to.value, factor))
        }
    }
}

#[cfg(test)]
#[path = "keyframe_tests.rs"]
mod tests;
