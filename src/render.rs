use std::ops::Range;

use anyhow::{bail, Result};
use winit::window::Window;

use crate::item::DrawItem;
use crate::texture::{SlotRegistry, TextureAtlas};

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    width: f32,
    height: f32,
    _pad0: f32,
    _pad1: f32,
}

/// One point-sprite instance: pre-offset center, RGBA color, size scalar.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointInstance {
    pub center: [f32; 2],
    pub color: [f32; 4],
    pub size: f32,
}

const POINT_INSTANCE_STRIDE: u64 = std::mem::size_of::<PointInstance>() as u64;

/// Per-quad unit texture coordinates, two triangles over the item's box.
const QUAD_TEXCOORDS: [[f32; 2]; 6] = [
    [0.0, 0.0],
    [1.0, 0.0],
    [0.0, 1.0],
    [0.0, 1.0],
    [1.0, 1.0],
    [1.0, 0.0],
];

/// Expanded vertex data for one textured-quad batch: six positions, six
/// slot indices and six texcoord pairs per item.
#[derive(Default, Debug)]
pub struct QuadBatch {
    pub positions: Vec<[f32; 2]>,
    pub tex_indices: Vec<u32>,
    pub tex_coords: Vec<[f32; 2]>,
}

impl QuadBatch {
    fn push(&mut self, center: [f32; 2], width: f32, height: f32, slot: u32) {
        let left = center[0] - width / 2.0;
        let right = center[0] + width / 2.0;
        let top = center[1] - height / 2.0;
        let bottom = center[1] + height / 2.0;
        self.positions.extend_from_slice(&[
            [left, top],
            [right, top],
            [left, bottom],
            [left, bottom],
            [right, bottom],
            [right, top],
        ]);
        self.tex_indices.extend_from_slice(&[slot; 6]);
        self.tex_coords.extend_from_slice(&QUAD_TEXCOORDS);
    }
}

/// One draw call's worth of homogeneous primitives.
#[derive(Debug)]
pub enum DrawBatch {
    Points(Vec<PointInstance>),
    Quads(QuadBatch),
}

/// Partitions each group's items by primitive kind, points before quads,
/// groups kept in order. An item naming an unregistered texture is a
/// programmer error and fails the whole frame.
pub fn encode_frame(groups: &[Vec<DrawItem>], slots: &SlotRegistry) -> Result<Vec<DrawBatch>> {
    let mut batches = Vec::new();
    for group in groups {
        let mut points = Vec::new();
        let mut quads = QuadBatch::default();
        for item in group {
            match *item {
                DrawItem::PointSprite { pos, color, size } => points.push(PointInstance {
                    center: pos,
                    color,
                    size,
                }),
                DrawItem::TexturedQuad {
                    pos,
                    width,
                    height,
                    texture,
                } => {
                    let slot = slots.lookup(texture)?;
                    quads.push(pos, width, height, slot);
                }
            }
        }
        if !points.is_empty() {
            batches.push(DrawBatch::Points(points));
        }
        if !quads.positions.is_empty() {
            batches.push(DrawBatch::Quads(quads));
        }
    }
    Ok(batches)
}

enum GpuDraw {
    Points { instances: Range<u32> },
    Quads { vertices: Range<u32> },
}

/// Vertex buffer that doubles its capacity when a frame outgrows it.
struct GrowBuffer {
    buf: wgpu::Buffer,
    capacity: u64,
    label: &'static str,
}

impl GrowBuffer {
    fn new(device: &wgpu::Device, label: &'static str, capacity: u64) -> Self {
        Self {
            buf: Self::alloc(device, label, capacity),
            capacity,
            label,
        }
    }

    fn ensure(&mut self, device: &wgpu::Device, bytes: u64) {
        if bytes <= self.capacity {
            return;
        }
        let new_cap = bytes.next_power_of_two().max(self.capacity * 2);
        self.buf = Self::alloc(device, self.label, new_cap);
        self.capacity = new_cap;
    }

    fn alloc(device: &wgpu::Device, label: &'static str, size: u64) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }
}

/// Groups a frame's drawable items into one draw call per primitive batch
/// against two lazily built shader programs. A program build failure is
/// fatal: it is reported once and the renderer goes permanently inert.
pub struct BatchRenderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    uniform_buf: wgpu::Buffer,
    uniform_bg: wgpu::BindGroup,
    uniform_layout: wgpu::BindGroupLayout,
    atlas: TextureAtlas,
    unit_quad_vb: wgpu::Buffer,
    point_pipeline: Option<wgpu::RenderPipeline>,
    quad_pipeline: Option<wgpu::RenderPipeline>,
    point_buf: GrowBuffer,
    quad_pos_buf: GrowBuffer,
    quad_idx_buf: GrowBuffer,
    quad_uv_buf: GrowBuffer,
    poisoned: bool,
}

impl BatchRenderer {
    pub async fn new(window: &Window, width: u32, height: u32) -> Result<Self> {
        use wgpu::util::DeviceExt;

        let instance = wgpu::Instance::default();
        let surface = unsafe { instance.create_surface(window) }?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow::anyhow!("no GPU adapter"))?;
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: caps
                .present_modes
                .get(0)
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: caps
                .alpha_modes
                .get(0)
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        // Fixed orthographic projection derived from the surface once.
        let uniforms = Uniforms {
            width: width as f32,
            height: height as f32,
            _pad0: 0.0,
            _pad1: 0.0,
        };
        let uniform_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniforms"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform-layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let uniform_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform-bg"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buf.as_entire_binding(),
            }],
        });

        let atlas = TextureAtlas::new(&device);

        // unit quad as a strip: (0,0)-(1,0)-(0,1)-(1,1)
        let unit_quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("unit-quad-vb"),
            contents: bytemuck::bytes_of(&[0.0f32, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0]),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let point_buf = GrowBuffer::new(&device, "point-instances", 4096 * POINT_INSTANCE_STRIDE);
        let quad_pos_buf = GrowBuffer::new(&device, "quad-positions", 4096 * 8);
        let quad_idx_buf = GrowBuffer::new(&device, "quad-indices", 4096 * 4);
        let quad_uv_buf = GrowBuffer::new(&device, "quad-texcoords", 4096 * 8);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            uniform_buf,
            uniform_bg,
            uniform_layout,
            atlas,
            unit_quad_vb,
            point_pipeline: None,
            quad_pipeline: None,
            point_buf,
            quad_pos_buf,
            quad_idx_buf,
            quad_uv_buf,
            poisoned: false,
        })
    }

    pub fn atlas_mut(&mut self) -> &mut TextureAtlas {
        &mut self.atlas
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let uniforms = Uniforms {
            width: width as f32,
            height: height as f32,
            _pad0: 0.0,
            _pad1: 0.0,
        };
        self.queue
            .write_buffer(&self.uniform_buf, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Renders one frame's drawable groups. After a fatal program build
    /// failure this is a silent no-op; no further draw calls are attempted.
    pub fn render(&mut self, groups: &[Vec<DrawItem>]) -> Result<()> {
        if self.poisoned {
            return Ok(());
        }
        self.atlas.pump(&self.queue);

        let batches = encode_frame(groups, self.atlas.slots())?;
        let needs_points = batches
            .iter()
            .any(|b| matches!(b, DrawBatch::Points(_)));
        let needs_quads = batches.iter().any(|b| matches!(b, DrawBatch::Quads(_)));
        if needs_points {
            if let Err(e) = self.ensure_point_pipeline() {
                self.poisoned = true;
                return Err(e);
            }
        }
        if needs_quads {
            if let Err(e) = self.ensure_quad_pipeline() {
                self.poisoned = true;
                return Err(e);
            }
        }

        // size the buffers for the whole frame before any write
        let total_instances: u64 = batches
            .iter()
            .map(|b| match b {
                DrawBatch::Points(p) => p.len() as u64,
                DrawBatch::Quads(_) => 0,
            })
            .sum();
        let total_quad_verts: u64 = batches
            .iter()
            .map(|b| match b {
                DrawBatch::Quads(q) => q.positions.len() as u64,
                DrawBatch::Points(_) => 0,
            })
            .sum();
        self.point_buf
            .ensure(&self.device, total_instances * POINT_INSTANCE_STRIDE);
        self.quad_pos_buf.ensure(&self.device, total_quad_verts * 8);
        self.quad_idx_buf.ensure(&self.device, total_quad_verts * 4);
        self.quad_uv_buf.ensure(&self.device, total_quad_verts * 8);

        let mut draws = Vec::with_capacity(batches.len());
        let mut instance_off: u32 = 0;
        let mut vertex_off: u32 = 0;
        for batch in &batches {
            match batch {
                DrawBatch::Points(instances) => {
                    self.queue.write_buffer(
                        &self.point_buf.buf,
                        instance_off as u64 * POINT_INSTANCE_STRIDE,
                        bytemuck::cast_slice(instances),
                    );
                    let n = instances.len() as u32;
                    draws.push(GpuDraw::Points {
                        instances: instance_off..instance_off + n,
                    });
                    instance_off += n;
                }
                DrawBatch::Quads(q) => {
                    self.queue.write_buffer(
                        &self.quad_pos_buf.buf,
                        vertex_off as u64 * 8,
                        bytemuck::cast_slice(&q.positions),
                    );
                    self.queue.write_buffer(
                        &self.quad_idx_buf.buf,
                        vertex_off as u64 * 4,
                        bytemuck::cast_slice(&q.tex_indices),
                    );
                    self.queue.write_buffer(
                        &self.quad_uv_buf.buf,
                        vertex_off as u64 * 8,
                        bytemuck::cast_slice(&q.tex_coords),
                    );
                    let n = q.positions.len() as u32;
                    draws.push(GpuDraw::Quads {
                        vertices: vertex_off..vertex_off + n,
                    });
                    vertex_off += n;
                }
            }
        }

        let frame = self
            .surface
            .get_current_texture()
            .map_err(|e| anyhow::anyhow!("surface acquire failed: {e}"))?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("batches"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                })],
                depth_stencil_attachment: None,
            });

            for draw in &draws {
                match draw {
                    GpuDraw::Points { instances } => {
                        // built above when the frame has point batches
                        let pipeline = self.point_pipeline.as_ref().unwrap();
                        rpass.set_pipeline(pipeline);
                        rpass.set_bind_group(0, &self.uniform_bg, &[]);
                        rpass.set_vertex_buffer(0, self.unit_quad_vb.slice(..));
                        rpass.set_vertex_buffer(
                            1,
                            self.point_buf.buf.slice(
                                instances.start as u64 * POINT_INSTANCE_STRIDE
                                    ..instances.end as u64 * POINT_INSTANCE_STRIDE,
                            ),
                        );
                        rpass.draw(0..4, 0..instances.end - instances.start);
                    }
                    GpuDraw::Quads { vertices } => {
                        let pipeline = self.quad_pipeline.as_ref().unwrap();
                        rpass.set_pipeline(pipeline);
                        rpass.set_bind_group(0, &self.uniform_bg, &[]);
                        rpass.set_bind_group(1, self.atlas.bind_group(), &[]);
                        let (start, end) = (vertices.start as u64, vertices.end as u64);
                        rpass.set_vertex_buffer(
                            0,
                            self.quad_pos_buf.buf.slice(start * 8..end * 8),
                        );
                        rpass.set_vertex_buffer(
                            1,
                            self.quad_idx_buf.buf.slice(start * 4..end * 4),
                        );
                        rpass
                            .set_vertex_buffer(2, self.quad_uv_buf.buf.slice(start * 8..end * 8));
                        rpass.draw(0..vertices.end - vertices.start, 0..1);
                    }
                }
            }
        }
        self.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }

    /// Compiles and links the point program on first use. Validation runs
    /// inside an error scope so a broken shader surfaces as an error instead
    /// of an uncaptured device panic.
    fn ensure_point_pipeline(&mut self) -> Result<()> {
        if self.point_pipeline.is_some() {
            return Ok(());
        }
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("point-shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("point.wgsl").into()),
            });
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("point-pl"),
                bind_group_layouts: &[&self.uniform_layout],
                push_constant_ranges: &[],
            });
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("point-pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs",
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: POINT_INSTANCE_STRIDE,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &wgpu::vertex_attr_array![
                                1 => Float32x2,
                                2 => Float32x4,
                                3 => Float32,
                            ],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleStrip,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            bail!("point program failed to build: {err}");
        }
        self.point_pipeline = Some(pipeline);
        Ok(())
    }

    fn ensure_quad_pipeline(&mut self) -> Result<()> {
        if self.quad_pipeline.is_some() {
            return Ok(());
        }
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("quad-shader"),
                source: wgpu::ShaderSource::Wgsl(include_str!("quad.wgsl").into()),
            });
        let layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("quad-pl"),
                bind_group_layouts: &[&self.uniform_layout, self.atlas.layout()],
                push_constant_ranges: &[],
            });
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("quad-pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: "vs",
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![0 => Float32x2],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<u32>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![1 => Uint32],
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &wgpu::vertex_attr_array![2 => Float32x2],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: "fs",
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
            });
        if let Some(err) = pollster::block_on(self.device.pop_error_scope()) {
            bail!("quad program failed to build: {err}");
        }
        self.quad_pipeline = Some(pipeline);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(names: &[&str]) -> SlotRegistry {
        let mut reg = SlotRegistry::default();
        for name in names {
            reg.register(name).unwrap();
        }
        reg
    }

    fn point(x: f32, y: f32) -> DrawItem {
        DrawItem::PointSprite {
            pos: [x, y],
            color: [0.5, 0.5, 0.5, 1.0],
            size: 2.0,
        }
    }

    fn quad(x: f32, y: f32, texture: &'static str) -> DrawItem {
        DrawItem::TexturedQuad {
            pos: [x, y],
            width: 10.0,
            height: 10.0,
            texture,
        }
    }

    #[test]
    fn n_points_make_one_batch_of_n_instances() {
        let reg = SlotRegistry::default();
        let group: Vec<DrawItem> = (0..7).map(|i| point(i as f32, 0.0)).collect();
        let batches = encode_frame(&[group], &reg).unwrap();
        assert_eq!(batches.len(), 1);
        match &batches[0] {
            DrawBatch::Points(instances) => assert_eq!(instances.len(), 7),
            other => panic!("expected a point batch, got {other:?}"),
        }
    }

    #[test]
    fn m_quads_make_one_batch_with_expanded_attributes() {
        let reg = registry_with(&["logo"]);
        let group: Vec<DrawItem> = (0..5).map(|i| quad(i as f32 * 20.0, 0.0, "logo")).collect();
        let batches = encode_frame(&[group], &reg).unwrap();
        assert_eq!(batches.len(), 1);
        match &batches[0] {
            DrawBatch::Quads(q) => {
                assert_eq!(q.positions.len(), 30); // 6 vertices per quad
                assert_eq!(q.tex_indices.len(), 30); // slot repeated 6 times
                assert_eq!(q.tex_coords.len(), 30); // 6 pairs = 12 floats per quad
            }
            other => panic!("expected a quad batch, got {other:?}"),
        }
    }

    #[test]
    fn quad_expansion_covers_the_axis_aligned_box() {
        let reg = registry_with(&["logo"]);
        let group = vec![DrawItem::TexturedQuad {
            pos: [10.0, 20.0],
            width: 4.0,
            height: 6.0,
            texture: "logo",
        }];
        let batches = encode_frame(&[group], &reg).unwrap();
        match &batches[0] {
            DrawBatch::Quads(q) => {
                assert_eq!(
                    q.positions,
                    vec![
                        [8.0, 17.0],
                        [12.0, 17.0],
                        [8.0, 23.0],
                        [8.0, 23.0],
                        [12.0, 23.0],
                        [12.0, 17.0],
                    ]
                );
                assert_eq!(q.tex_indices, vec![0; 6]);
                assert_eq!(q.tex_coords, QUAD_TEXCOORDS.to_vec());
            }
            other => panic!("expected a quad batch, got {other:?}"),
        }
    }

    #[test]
    fn points_are_batched_before_quads_within_a_group() {
        let reg = registry_with(&["logo"]);
        let group = vec![quad(0.0, 0.0, "logo"), point(1.0, 1.0), quad(20.0, 0.0, "logo")];
        let batches = encode_frame(&[group], &reg).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(matches!(batches[0], DrawBatch::Points(_)));
        assert!(matches!(batches[1], DrawBatch::Quads(_)));
        match &batches[1] {
            DrawBatch::Quads(q) => assert_eq!(q.positions.len(), 12),
            _ => unreachable!(),
        }
    }

    #[test]
    fn groups_keep_their_registration_order() {
        let reg = registry_with(&["logo"]);
        let groups = vec![
            vec![point(0.0, 0.0)],
            vec![quad(0.0, 0.0, "logo")],
            vec![point(5.0, 5.0)],
        ];
        let batches = encode_frame(&groups, &reg).unwrap();
        assert_eq!(batches.len(), 3);
        assert!(matches!(batches[0], DrawBatch::Points(_)));
        assert!(matches!(batches[1], DrawBatch::Quads(_)));
        assert!(matches!(batches[2], DrawBatch::Points(_)));
    }

    #[test]
    fn empty_groups_produce_no_batches() {
        let reg = SlotRegistry::default();
        let batches = encode_frame(&[Vec::new(), Vec::new()], &reg).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn unregistered_texture_fails_the_frame() {
        let reg = registry_with(&["logo"]);
        let group = vec![quad(0.0, 0.0, "ghost")];
        let err = encode_frame(&[group], &reg).unwrap_err();
        assert!(err.to_string().contains("not registered"));
    }

    #[test]
    fn point_instances_carry_position_color_and_size() {
        let reg = SlotRegistry::default();
        let group = vec![DrawItem::PointSprite {
            pos: [30.0, 50.0],
            color: [0.1, 0.2, 0.3, 1.0],
            size: 2.0,
        }];
        let batches = encode_frame(&[group], &reg).unwrap();
        match &batches[0] {
            DrawBatch::Points(instances) => {
                assert_eq!(
                    instances[0],
                    PointInstance {
                        center: [30.0, 50.0],
                        color: [0.1, 0.2, 0.3, 1.0],
                        size: 2.0,
                    }
                );
            }
            other => panic!("expected a point batch, got {other:?}"),
        }
    }
}
