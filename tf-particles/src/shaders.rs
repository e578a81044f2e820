//! GLSL sources for drawing the particles.
//!
//! The shader sources consist of a generated header, that defines the constants
//! (point size, ...), followed by the static shader body.

use log::debug;

/// Points with an alpha value below this threshold are discarded by the fragment shader.
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// The on-screen size of a point is `point_size * SIZE_FALLOFF / distance`.
pub const SIZE_FALLOFF: f32 = 300.0;

const GLSL_VERSION: &str = "#version 140\n";

mod shader_src_parts {
    pub const PARTICLES_VERT: &str = include_str!("shaders/particles.vert");
    pub const PARTICLES_FRAG: &str = include_str!("shaders/particles.frag");
}

/// The vertex and fragment shader for one particle system.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleShaders {
    point_size: f32,
    vertex_shader: String,
    fragment_shader: String,
}

impl ParticleShaders {
    pub fn new(point_size: f32) -> Self {
        let mut vertex_shader = GLSL_VERSION.to_owned();
        vertex_shader += &glsl_const("point_size", point_size);
        vertex_shader += &glsl_const("size_falloff", SIZE_FALLOFF);
        vertex_shader += shader_src_parts::PARTICLES_VERT;

        let mut fragment_shader = GLSL_VERSION.to_owned();
        fragment_shader += &glsl_const("visibility_threshold", VISIBILITY_THRESHOLD);
        fragment_shader += shader_src_parts::PARTICLES_FRAG;

        debug!("Vertex shader source: \n{}", vertex_shader);
        debug!("Fragment shader source: \n{}", fragment_shader);

        ParticleShaders {
            point_size,
            vertex_shader,
            fragment_shader,
        }
    }

    pub fn vertex_shader(&self) -> &str {
        &self.vertex_shader
    }

    pub fn fragment_shader(&self) -> &str {
        &self.fragment_shader
    }

    /// The size in pixels, that the vertex shader will give a point at the given distance
    /// from the camera.
    pub fn effective_point_size(&self, distance: f32) -> f32 {
        self.point_size * (SIZE_FALLOFF / distance)
    }
}

/// Formats a float constant. Debug formatting of f32 always produces a valid glsl
/// float literal (`1.0`, `0.05`, `1e-7`).
fn glsl_const(name: &str, value: f32) -> String {
    format!("const float {} = {:?};\n", name, value)
}
