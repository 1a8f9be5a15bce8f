//! Angle helpers for rotation analysis.

/// Wraps a degree value into `[-180, 180)`.
#[must_use]
pub fn wrap_degrees(mut value: f32) -> f32 {
    value %= 360.0;
    if value >= 180.0 {
        value -= 360.0;
    }
    if value < -180.0 {
        value += 360.0;
    }
    value
}

/// Shortest angular distance between two absolute degree values.
///
/// `359.0 -> 1.0` is a 2 degree turn, not 358.
#[must_use]
pub fn angle_distance(from: f32, to: f32) -> f32 {
    wrap_degrees(to - from).abs()
}
