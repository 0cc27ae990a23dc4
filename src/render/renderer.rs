//! GPU renderer for the galaxy point cloud and its sparkles
//!
//! Draws each point as an instanced screen-facing quad directly into
//! egui's render pass via CallbackTrait. The galaxy buffer is only
//! rewritten when the generator produces a new cloud; sparkles are
//! streamed every frame.

use bytemuck::Zeroable;
use egui_wgpu::wgpu::{self, util::DeviceExt};
use glam::Mat4;
use std::sync::Arc;

use super::{
    galaxy_instances, sparkle_instances, GpuPoint, PointUniforms, GALAXY_CAPACITY,
    SPARKLE_SIZE_SCALE,
};
use crate::frame::{Frame, RenderTarget};
use crate::scene::{Blending, PointsMaterial};
use crate::sparkles::DEFAULT_CAPACITY;

/// Vertices per instance (two triangles)
const QUAD_VERTICES: u32 = 6;

const ADDITIVE_BLENDING: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent::OVER,
};

/// Instance buffer plus its uniforms for one draw.
struct PointLayer {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    instances: wgpu::Buffer,
    capacity: usize,
    count: u32,
}

impl PointLayer {
    fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        capacity: usize,
        label: &str,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_uniforms")),
            contents: bytemuck::bytes_of(&PointUniforms::default()),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}_bind_group")),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let instances = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label}_instances")),
            size: (capacity.max(1) * std::mem::size_of::<GpuPoint>()) as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        });

        Self {
            uniform_buffer,
            bind_group,
            instances,
            capacity,
            count: 0,
        }
    }

    fn upload(&mut self, queue: &wgpu::Queue, points: &[GpuPoint]) {
        let points = &points[..points.len().min(self.capacity)];
        if !points.is_empty() {
            queue.write_buffer(&self.instances, 0, bytemuck::cast_slice(points));
        }
        self.count = points.len() as u32;
    }

    fn draw(&self, render_pass: &mut wgpu::RenderPass<'static>) {
        if self.count == 0 {
            return;
        }
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instances.slice(..));
        render_pass.draw(0..QUAD_VERTICES, 0..self.count);
    }
}

/// Long-lived GPU state, stored in egui's callback resources.
pub struct GalaxyRenderer {
    additive_pipeline: wgpu::RenderPipeline,
    alpha_pipeline: wgpu::RenderPipeline,
    galaxy: PointLayer,
    sparkles: PointLayer,
}

impl GalaxyRenderer {
    pub fn new(device: &wgpu::Device, target_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("galaxy_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("galaxy_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("galaxy_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let additive_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            target_format,
            ADDITIVE_BLENDING,
            "galaxy_additive_pipeline",
        );
        let alpha_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            target_format,
            wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING,
            "galaxy_alpha_pipeline",
        );

        Self {
            additive_pipeline,
            alpha_pipeline,
            galaxy: PointLayer::new(device, &bind_group_layout, GALAXY_CAPACITY, "galaxy"),
            sparkles: PointLayer::new(device, &bind_group_layout, DEFAULT_CAPACITY, "sparkles"),
        }
    }

    fn pipeline(&self, blending: Blending) -> &wgpu::RenderPipeline {
        match blending {
            Blending::Additive => &self.additive_pipeline,
            Blending::Normal => &self.alpha_pipeline,
        }
    }

    pub fn galaxy_count(&self) -> u32 {
        self.galaxy.count
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    target_format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuPoint>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &[
                    wgpu::VertexAttribute {
                        offset: 0,
                        shader_location: 0,
                        format: wgpu::VertexFormat::Float32x3, // position
                    },
                    wgpu::VertexAttribute {
                        offset: 12,
                        shader_location: 1,
                        format: wgpu::VertexFormat::Float32, // alpha
                    },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: target_format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            ..Default::default()
        },
        // egui's pass has no depth attachment; points never write depth
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

/// Per-frame draw data handed to egui.
pub struct GalaxyCallback {
    /// New galaxy instances, only when the cloud was regenerated
    pub galaxy_upload: Option<Arc<Vec<GpuPoint>>>,
    pub galaxy_uniforms: PointUniforms,
    pub galaxy_blending: Blending,
    pub draw_galaxy: bool,
    pub sparkles: Vec<GpuPoint>,
    pub sparkle_uniforms: PointUniforms,
}

impl egui_wgpu::CallbackTrait for GalaxyCallback {
    fn prepare(
        &self,
        _device: &wgpu::Device,
        queue: &wgpu::Queue,
        _screen_descriptor: &egui_wgpu::ScreenDescriptor,
        _encoder: &mut wgpu::CommandEncoder,
        callback_resources: &mut egui_wgpu::CallbackResources,
    ) -> Vec<wgpu::CommandBuffer> {
        let Some(renderer) = callback_resources.get_mut::<GalaxyRenderer>() else {
            return Vec::new();
        };

        if let Some(points) = &self.galaxy_upload {
            renderer.galaxy.upload(queue, points);
        }
        queue.write_buffer(
            &renderer.galaxy.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.galaxy_uniforms),
        );

        renderer.sparkles.upload(queue, &self.sparkles);
        queue.write_buffer(
            &renderer.sparkles.uniform_buffer,
            0,
            bytemuck::bytes_of(&self.sparkle_uniforms),
        );
        Vec::new()
    }

    fn paint(
        &self,
        _info: egui::PaintCallbackInfo,
        render_pass: &mut wgpu::RenderPass<'static>,
        callback_resources: &egui_wgpu::CallbackResources,
    ) {
        let Some(renderer) = callback_resources.get::<GalaxyRenderer>() else {
            return;
        };

        if self.draw_galaxy {
            render_pass.set_pipeline(renderer.pipeline(self.galaxy_blending));
            renderer.galaxy.draw(render_pass);
        }

        render_pass.set_pipeline(&renderer.additive_pipeline);
        renderer.sparkles.draw(render_pass);
    }
}

/// Renders a frame by queueing a [`GalaxyCallback`] on an egui painter.
pub struct GpuTarget<'a> {
    pub painter: &'a egui::Painter,
    pub rect: egui::Rect,
    /// Clamped device pixel ratio
    pub pixel_ratio: f32,
    /// Generation of the cloud currently in the GPU buffer
    pub uploaded_generation: &'a mut Option<u64>,
}

/// egui drops callbacks with an empty rect, so an upload queued on one would be lost.
fn needs_upload(uploaded: Option<u64>, generation: u64, rect: egui::Rect) -> bool {
    rect.is_positive() && uploaded != Some(generation)
}

impl RenderTarget for GpuTarget<'_> {
    fn render(&mut self, frame: &Frame<'_>) {
        if !self.rect.is_positive() {
            return;
        }
        let viewport = [
            self.rect.width() * self.pixel_ratio,
            self.rect.height() * self.pixel_ratio,
        ];

        let mut callback = GalaxyCallback {
            galaxy_upload: None,
            galaxy_uniforms: PointUniforms::zeroed(),
            galaxy_blending: Blending::Additive,
            draw_galaxy: false,
            sparkles: sparkle_instances(frame.sparkles, frame.elapsed as f32),
            sparkle_uniforms: PointUniforms::zeroed(),
        };

        let mut sparkle_material = PointsMaterial::default();
        if let Some((_, object, cloud)) = frame.scene.point_clouds().next() {
            if needs_upload(*self.uploaded_generation, cloud.generation, self.rect) {
                callback.galaxy_upload = Some(Arc::new(galaxy_instances(&cloud.geometry)));
                *self.uploaded_generation = Some(cloud.generation);
            }
            callback.galaxy_uniforms =
                PointUniforms::new(frame, object.transform.matrix(), &cloud.material, viewport);
            callback.galaxy_blending = cloud.material.blending;
            callback.draw_galaxy = true;
            sparkle_material.size = cloud.material.size * SPARKLE_SIZE_SCALE;
        }
        callback.sparkle_uniforms =
            PointUniforms::new(frame, Mat4::IDENTITY, &sparkle_material, viewport);

        self.painter
            .add(egui_wgpu::Callback::new_paint_callback(self.rect, callback));
    }
}
