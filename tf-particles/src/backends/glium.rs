//! Render backend based on the `glium` crate.

use crate::buffer_attribute::{
    AlphaVertex, BufferAttribute, BufferUsage, ColorVertex, PositionVertex,
};
use crate::error::{ParticlesError, ParticlesResult};
use crate::scene::{ParticlePoints, SceneRoot};
use crate::texture::SpriteImage;
use ::glium::backend::Facade;
use ::glium::index::{NoIndices, PrimitiveType};
use ::glium::program::ProgramCreationInput;
use ::glium::texture::{RawImage2d, Texture2d};
use ::glium::uniforms::MagnifySamplerFilter;
use ::glium::{
    implement_vertex, uniform, Blend, DepthTest, DrawParameters, Program, Surface, Vertex,
    VertexBuffer,
};
use log::debug;
use nalgebra::Matrix4;
use std::error::Error;
use std::rc::Rc;

implement_vertex!(PositionVertex, position);
implement_vertex!(ColorVertex, color);
implement_vertex!(AlphaVertex, alpha);

const DRAW_POINTS: NoIndices = NoIndices(PrimitiveType::Points);

fn graphics_error<E>(e: E) -> ParticlesError
where
    E: Error + Send + Sync + 'static,
{
    ParticlesError::Graphics {
        source: Box::new(e),
    }
}

/// Copies a [Matrix4] matrix from nalgebra into a static array, as
/// understood by glium, and converts it from row-major format (as used by nalgebra)
/// into column-major format (as expected by glium / open gl) during that process.
fn matrix_to_gl(mat: &Matrix4<f64>) -> [[f32; 4]; 4] {
    [
        [mat.m11 as f32, mat.m21 as f32, mat.m31 as f32, mat.m41 as f32],
        [mat.m12 as f32, mat.m22 as f32, mat.m32 as f32, mat.m42 as f32],
        [mat.m13 as f32, mat.m23 as f32, mat.m33 as f32, mat.m43 as f32],
        [mat.m14 as f32, mat.m24 as f32, mat.m34 as f32, mat.m44 as f32],
    ]
}

fn create_vertex_buffer<F, T>(
    facade: &F,
    attribute: &BufferAttribute<T>,
) -> ParticlesResult<VertexBuffer<T>>
where
    F: Facade + ?Sized,
    T: Vertex + Copy,
{
    let result = match attribute.usage() {
        BufferUsage::Dynamic => VertexBuffer::dynamic(facade, attribute.items()),
        BufferUsage::Static => VertexBuffer::new(facade, attribute.items()),
    };
    result.map_err(graphics_error)
}

/// The gpu side of one [ParticlePoints] drawable.
pub struct GliumParticles {
    program: Program,
    sprite: Texture2d,
    positions: VertexBuffer<PositionVertex>,
    colors: VertexBuffer<ColorVertex>,
    alpha: VertexBuffer<AlphaVertex>,
    transparent: bool,
}

impl GliumParticles {
    /// Compiles the shaders, loads the sprite texture and uploads the current point buffer.
    pub fn new<F>(facade: &F, points: &ParticlePoints) -> ParticlesResult<Self>
    where
        F: Facade + ?Sized,
    {
        let material = points.material();
        let program = Program::new(
            facade,
            ProgramCreationInput::SourceCode {
                vertex_shader: material.shaders.vertex_shader(),
                tessellation_control_shader: None,
                tessellation_evaluation_shader: None,
                geometry_shader: None,
                fragment_shader: material.shaders.fragment_shader(),
                transform_feedback_varyings: None,
                outputs_srgb: false,
                uses_point_size: true,
            },
        )
        .map_err(graphics_error)?;

        let image = SpriteImage::load(material.texture.as_deref())?;
        let raw_image = RawImage2d::from_raw_rgba(image.rgba, (image.width, image.height));
        let sprite = Texture2d::new(facade, raw_image).map_err(graphics_error)?;

        let mut geometry = points.geometry_cell().borrow_mut();
        let (positions, colors, alpha) = geometry.attributes_mut();
        positions.take_needs_update();
        colors.take_needs_update();
        alpha.take_needs_update();
        debug!("Uploading particle buffer with {} slots.", alpha.len());

        Ok(GliumParticles {
            program,
            sprite,
            positions: create_vertex_buffer(facade, positions)?,
            colors: create_vertex_buffer(facade, colors)?,
            alpha: create_vertex_buffer(facade, alpha)?,
            transparent: material.transparent,
        })
    }

    /// Re-uploads the attributes, that were modified since the last sync.
    /// Returns the number of uploaded attributes.
    pub fn sync(&mut self, points: &ParticlePoints) -> usize {
        let mut geometry = points.geometry_cell().borrow_mut();
        let (positions, colors, alpha) = geometry.attributes_mut();
        let mut uploaded = 0;
        if positions.take_needs_update() {
            self.positions.write(positions.items());
            uploaded += 1;
        }
        if colors.take_needs_update() {
            self.colors.write(colors.items());
            uploaded += 1;
        }
        if alpha.take_needs_update() {
            self.alpha.write(alpha.items());
            uploaded += 1;
        }
        uploaded
    }

    /// Draws the particles.
    ///
    /// `pose` transforms from the frame of the particles into the world frame,
    /// `view` from the world frame into the camera frame.
    pub fn draw<S>(
        &self,
        surface: &mut S,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
        pose: &Matrix4<f64>,
    ) -> ParticlesResult<()>
    where
        S: Surface + ?Sized,
    {
        let uniforms = uniform! {
            modelViewMatrix: matrix_to_gl(&(view * pose)),
            projectionMatrix: matrix_to_gl(projection),
            sprite: self.sprite.sampled().magnify_filter(MagnifySamplerFilter::Linear),
        };

        let draw_parameters = DrawParameters {
            depth: ::glium::Depth {
                write: true,
                test: DepthTest::IfLess,
                ..Default::default()
            },
            blend: if self.transparent {
                Blend::alpha_blending()
            } else {
                Default::default()
            },
            ..Default::default()
        };

        surface
            .draw(
                (&self.positions, &self.colors, &self.alpha),
                DRAW_POINTS,
                &self.program,
                &uniforms,
                &draw_parameters,
            )
            .map_err(graphics_error)
    }
}

/// Draws all particles in a scene.
///
/// Gpu resources are created lazily, the first time a drawable is encountered.
#[derive(Default)]
pub struct GliumSceneRenderer {
    items: Vec<(Rc<ParticlePoints>, GliumParticles)>,
}

impl GliumSceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draws every node of the scene, whose frame has been resolved.
    /// Returns the number of drawn nodes.
    pub fn draw<F, S>(
        &mut self,
        facade: &F,
        surface: &mut S,
        root: &SceneRoot,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
    ) -> ParticlesResult<usize>
    where
        F: Facade + ?Sized,
        S: Surface + ?Sized,
    {
        let mut drawn = 0;
        for node in root.nodes() {
            let Some(pose) = node.pose().get() else {
                continue;
            };
            let existing = self
                .items
                .iter()
                .position(|(points, _)| Rc::ptr_eq(points, node.object()));
            let index = match existing {
                Some(index) => index,
                None => {
                    let gpu = GliumParticles::new(facade, node.object())?;
                    self.items.push((Rc::clone(node.object()), gpu));
                    self.items.len() - 1
                }
            };
            let gpu = &mut self.items[index].1;
            gpu.sync(node.object());
            gpu.draw(surface, view, projection, &pose)?;
            drawn += 1;
        }
        Ok(drawn)
    }
}
