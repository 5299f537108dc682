// --- File: camera.rs ---
use crate::config::{FeatureToggles, GlobalParams};
use crate::constants::{CAMERA_FAR, CAMERA_NEAR, LIGHT_HEIGHT_ABOVE_EYE};
use crate::uniforms::{BubbleFrameUniform, FrameUniform, vec4};
use glam::{Mat4, Vec3};
use std::f32::consts::PI;

/// Orbiting camera for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Eye and target sit on opposite sides of the orbit driven by `eye_clock`.
pub fn orbit_points(globals: &GlobalParams, eye_clock: f32) -> (Vec3, Vec3) {
    let eye = Vec3::new(
        eye_clock.sin() * globals.eye_radius,
        globals.eye_height,
        eye_clock.cos() * globals.eye_radius,
    );
    let target = Vec3::new(
        (eye_clock + PI).sin() * globals.target_radius,
        globals.target_height,
        (eye_clock + PI).cos() * globals.target_radius,
    );
    (eye, target)
}

impl Camera {
    pub fn orbit(globals: &GlobalParams, eye_clock: f32, aspect: f32) -> Self {
        let (eye, target) = orbit_points(globals, eye_clock);
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let projection = Mat4::perspective_rh(
            globals.field_of_view.to_radians(),
            aspect.max(f32::EPSILON),
            CAMERA_NEAR,
            CAMERA_FAR,
        );
        Self {
            eye,
            view,
            projection,
        }
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn frame_uniform(&self, globals: &GlobalParams, options: &FeatureToggles) -> FrameUniform {
        let light = self.eye + Vec3::new(0.0, LIGHT_HEIGHT_ABOVE_EYE, 0.0);
        FrameUniform {
            view_projection: self.view_projection().to_cols_array_2d(),
            view_inverse: self.view.inverse().to_cols_array_2d(),
            light_world_pos: vec4(light, 1.0),
            light_color: [1.0; 4],
            ambient: [globals.ambient_red, globals.ambient_green, globals.ambient_blue, 1.0],
            fog_color: [globals.fog_red, globals.fog_green, globals.fog_blue, 1.0],
            fog_params: [
                globals.fog_power,
                globals.fog_mult,
                globals.fog_offset,
                if options.fog { 1.0 } else { 0.0 },
            ],
            _padding: [[0.0; 4]; 3],
        }
    }

    pub fn bubble_uniform(&self, time: f32) -> BubbleFrameUniform {
        BubbleFrameUniform {
            view_projection: self.view_projection().to_cols_array_2d(),
            view_inverse: self.view.inverse().to_cols_array_2d(),
            time: [time, 0.0, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_and_target_orbit_opposite_sides() {
        let globals = GlobalParams::default();
        let (eye, target) = orbit_points(&globals, 0.0);
        assert!(eye.abs_diff_eq(Vec3::new(0.0, 7.5, 13.2), 1e-5));
        assert!((target.z + globals.target_radius).abs() < 1e-3);
        assert!(target.x.abs() < 1e-3);
        assert_eq!(target.y, globals.target_height);
        assert_eq!(Camera::orbit(&globals, 0.0, 16.0 / 9.0).eye, eye);
    }

    #[test]
    fn frame_uniform_places_light_above_eye() {
        let globals = GlobalParams::default();
        let camera = Camera::orbit(&globals, 1.0, 1.0);
        let mut options = FeatureToggles::default();
        let u = camera.frame_uniform(&globals, &options);
        let light = camera.eye + Vec3::new(0.0, 20.0, 0.0);
        assert_eq!(u.light_world_pos, [light.x, light.y, light.z, 1.0]);
        assert_eq!(u.light_color, [1.0; 4]);
        assert_eq!(u.ambient[3], 1.0);
        assert_eq!(u.fog_params, [16.5, 1.5, 0.738, 1.0]);

        options.fog = false;
        assert_eq!(camera.frame_uniform(&globals, &options).fog_params[3], 0.0);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let globals = GlobalParams::default();
        let camera = Camera::orbit(&globals, 0.4, 1.5);
        let (_, target) = orbit_points(&globals, 0.4);
        let clip = camera.view_projection() * target.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn bubble_uniform_carries_time() {
        let camera = Camera::orbit(&GlobalParams::default(), 0.0, 1.0);
        assert_eq!(camera.bubble_uniform(3.5).time, [3.5, 0.0, 0.0, 0.0]);
    }
}
// --- End of File: camera.rs ---
