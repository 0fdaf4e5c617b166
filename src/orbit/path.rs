use crate::{
    foundation::{
        core::{FrameIndex, SphericalVector, Vector3},
        error::{FlyaroundError, FlyaroundResult},
    },
    render::task::FrameTask,
};

/// Circular camera path around a fixed look-at point.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OrbitSpec {
    /// Look-at target for every frame.
    pub origin: Vector3,
    /// Camera displacement from `origin` at frame 0.
    pub start_offset: Vector3,
    /// Signed increment applied to the polar angle after each frame.
    pub angular_step_degrees: f64,
    pub frame_count: u64,
}

impl Default for OrbitSpec {
    fn default() -> Self {
        crate::config::Preset::FinalScene.config().orbit
    }
}

impl OrbitSpec {
    /// Build an orbit from an absolute start position instead of an offset.
    pub fn from_start_position(
        origin: Vector3,
        start: Vector3,
        angular_step_degrees: f64,
        frame_count: u64,
    ) -> Self {
        Self {
            origin,
            start_offset: start - origin,
            angular_step_degrees,
            frame_count,
        }
    }

    /// Rejects non-finite input. A zero `start_offset` is allowed.
    pub fn validate(&self) -> FlyaroundResult<()> {
        if !self.origin.is_finite() || !self.start_offset.is_finite() {
            return Err(FlyaroundError::validation(
                "orbit origin and start offset must be finite",
            ));
        }
        if !self.angular_step_degrees.is_finite() {
            return Err(FlyaroundError::validation(
                "orbit angular step must be finite",
            ));
        }
        Ok(())
    }

    pub fn angular_step_radians(&self) -> f64 {
        self.angular_step_degrees.to_radians()
    }
}

/// Per-run cursor: the camera's current offset from the orbit origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitState {
    pub delta: SphericalVector,
}

/// Spherical form of the start offset.
///
/// A zero offset is accepted and yields a stationary camera at `origin`.
pub fn initial_state(spec: &OrbitSpec) -> OrbitState {
    OrbitState {
        delta: spec.start_offset.to_spherical(),
    }
}

/// Displacement for the current frame, and the state for the next one.
///
/// Only the polar angle moves, so the camera follows a great circle through the poles rather than
/// an equatorial ring. The angle is never wrapped or clamped.
pub fn advance(state: OrbitState, spec: &OrbitSpec) -> (Vector3, OrbitState) {
    let displacement = state.delta.to_cartesian();
    let next = OrbitState {
        delta: SphericalVector {
            polar: state.delta.polar + spec.angular_step_radians(),
            ..state.delta
        },
    };
    (displacement, next)
}

/// Iterator over every frame task of an orbit, in frame order.
#[derive(Clone, Debug)]
pub struct OrbitPath {
    spec: OrbitSpec,
    state: OrbitState,
    next_index: u64,
}

impl OrbitPath {
    pub fn new(spec: OrbitSpec) -> Self {
        Self {
            state: initial_state(&spec),
            spec,
            next_index: 0,
        }
    }
}

impl Iterator for OrbitPath {
    type Item = FrameTask;

    fn next(&mut self) -> Option<FrameTask> {
        if self.next_index >= self.spec.frame_count {
            return None;
        }
        let (displacement, next) = advance(self.state, &self.spec);
        let task = FrameTask::new(FrameIndex(self.next_index), self.spec.origin, displacement);
        self.state = next;
        self.next_index += 1;
        Some(task)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::try_from(self.spec.frame_count - self.next_index).unwrap_or(usize::MAX);
        (left, Some(left))
    }
}

/// Precompute every pose of the orbit. Poses depend only on the orbit and the frame index, so the
/// result can be handed to independent workers.
pub fn plan_path(spec: &OrbitSpec) -> Vec<FrameTask> {
    OrbitPath::new(*spec).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/orbit/path.rs"]
mod tests;
