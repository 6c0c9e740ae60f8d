//! wgpu render backend
//!
//! Renders a [`RenderFrame`] into a window surface: one depth buffer, an opaque and a
//! transparent pipeline sharing the lit shader, a global uniform (camera and lights)
//! at group 0 and one uniform per material at group 1. Instances are streamed through
//! a pool of vertex buffers that only grows.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use super::{
    vertex::{InstanceRaw, Vertex3D},
    RenderBackend, RenderFrame,
};
use crate::error::{Result, SceneError};
use crate::gfx::{
    geometry::GeometryData,
    light::GlobalsUniform,
    material::{Material, MaterialUniform},
    scene::{GeometryId, MaterialId},
};

/// Standard depth buffer format
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn destroy(&self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

struct GpuMaterial {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct InstanceSlot {
    buffer: wgpu::Buffer,
    capacity: usize,
}

/// GPU backend drawing into a surface
pub struct WgpuBackend {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    material_layout: wgpu::BindGroupLayout,
    fallback_material: GpuMaterial,
    geometries: HashMap<GeometryId, GpuMesh>,
    materials: HashMap<MaterialId, GpuMaterial>,
    instance_pool: Vec<InstanceSlot>,
    released: bool,
}

impl WgpuBackend {
    /// Creates a backend for the given surface target
    ///
    /// Every failure on the way to a configured surface (no surface, no adapter,
    /// no device, no supported format) is reported as `ContextUnavailable`.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(target)
            .map_err(|e| SceneError::ContextUnavailable(format!("surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| SceneError::ContextUnavailable(format!("adapter: {e}")))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Lumen Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| SceneError::ContextUnavailable(format!("device: {e}")))?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or_else(|| SceneError::ContextUnavailable("surface has no formats".into()))?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let (depth_texture, depth_view) = create_depth_texture(&device, &config);

        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Globals Layout"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Layout"),
            entries: &[uniform_entry(wgpu::ShaderStages::FRAGMENT)],
        });

        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Globals Buffer"),
            size: std::mem::size_of::<GlobalsUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Globals Bind Group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Lit Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Lit Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &material_layout],
            push_constant_ranges: &[],
        });
        let opaque_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, format, true, "Opaque");
        let transparent_pipeline =
            create_pipeline(&device, &pipeline_layout, &shader, format, false, "Transparent");

        let fallback_uniform = Material::matte([0.8, 0.8, 0.8], 0.6).to_uniform();
        let fallback_material =
            create_gpu_material(&device, &material_layout, &fallback_uniform, "Fallback");

        log::info!(
            "wgpu backend ready: {:?} on {}, {}x{}",
            format,
            adapter.get_info().name,
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_texture,
            depth_view,
            opaque_pipeline,
            transparent_pipeline,
            globals_buffer,
            globals_bind_group,
            material_layout,
            fallback_material,
            geometries: HashMap::new(),
            materials: HashMap::new(),
            instance_pool: Vec::new(),
            released: false,
        })
    }

    /// Runs an allocation inside an out-of-memory error scope
    fn checked<T>(&self, what: &str, allocate: impl FnOnce(&wgpu::Device) -> T) -> Result<T> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let value = allocate(&self.device);
        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(SceneError::ResourceExhaustion(format!("{what}: {err}"))),
            None => Ok(value),
        }
    }

    /// Makes sure pool slot `index` can hold `count` instances
    fn reserve_instances(&mut self, index: usize, count: usize) -> Result<()> {
        let fits = self
            .instance_pool
            .get(index)
            .is_some_and(|slot| slot.capacity >= count);
        if fits {
            return Ok(());
        }

        let capacity = count.next_power_of_two().max(4);
        let buffer = self.checked("instance buffer", |device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("Instance Buffer"),
                size: (capacity * std::mem::size_of::<InstanceRaw>()) as wgpu::BufferAddress,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        })?;
        let slot = InstanceSlot { buffer, capacity };

        if let Some(old) = self.instance_pool.get_mut(index) {
            old.buffer.destroy();
            *old = slot;
        } else {
            self.instance_pool.push(slot);
        }
        Ok(())
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    depth_write: bool,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc(), InstanceRaw::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // Extruded outlines are not consistently wound
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_gpu_material(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    uniform: &MaterialUniform,
    label: &str,
) -> GpuMaterial {
    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents: bytemuck::bytes_of(uniform),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    });
    GpuMaterial { buffer, bind_group }
}

impl RenderBackend for WgpuBackend {
    fn upload_geometry(&mut self, id: GeometryId, data: &GeometryData) -> Result<()> {
        data.validate()?;
        let (vertices, indices) = data.to_vertices();

        let mesh = self.checked("geometry buffers", |device| GpuMesh {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Vertex Buffer"),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: indices.len() as u32,
        })?;

        if let Some(previous) = self.geometries.insert(id, mesh) {
            previous.destroy();
        }
        Ok(())
    }

    fn upload_material(&mut self, id: MaterialId, material: &MaterialUniform) -> Result<()> {
        let layout = &self.material_layout;
        let gpu = self.checked("material buffer", |device| {
            create_gpu_material(device, layout, material, "Material")
        })?;
        if let Some(previous) = self.materials.insert(id, gpu) {
            previous.buffer.destroy();
        }
        Ok(())
    }

    fn release_geometry(&mut self, id: GeometryId) {
        match self.geometries.remove(&id) {
            Some(mesh) => mesh.destroy(),
            None => log::debug!("geometry {id:?} already released"),
        }
    }

    fn release_material(&mut self, id: MaterialId) {
        match self.materials.remove(&id) {
            Some(material) => material.buffer.destroy(),
            None => log::debug!("material {id:?} already released"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.released {
            return;
        }
        if (width, height) == (self.config.width, self.config.height) {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture.destroy();
        let (texture, view) = create_depth_texture(&self.device, &self.config);
        self.depth_texture = texture;
        self.depth_view = view;
    }

    fn render(&mut self, frame: &RenderFrame) -> Result<()> {
        if self.released {
            return Err(SceneError::ContextUnavailable("context already released".into()));
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring and skipping frame");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(SceneError::ResourceExhaustion("surface texture".into()));
            }
            Err(err) => {
                log::warn!("skipping frame: {err}");
                return Ok(());
            }
        };

        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&frame.globals));

        for (index, draw) in frame.draws.iter().enumerate() {
            if let Some((id, uniform)) = &draw.material {
                if let Some(gpu) = self.materials.get(id) {
                    self.queue
                        .write_buffer(&gpu.buffer, 0, bytemuck::bytes_of(uniform));
                }
            }
            self.reserve_instances(index, draw.instances.len())?;
            self.queue.write_buffer(
                &self.instance_pool[index].buffer,
                0,
                bytemuck::cast_slice(&draw.instances),
            );
        }

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let [r, g, b, a] = frame.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

            let mut transparent_bound = None;
            for (index, draw) in frame.draws.iter().enumerate() {
                let Some(mesh) = self.geometries.get(&draw.geometry) else {
                    log::debug!("skipping draw of unknown geometry {:?}", draw.geometry);
                    continue;
                };
                if draw.instances.is_empty() {
                    continue;
                }

                if transparent_bound != Some(draw.transparent) {
                    render_pass.set_pipeline(if draw.transparent {
                        &self.transparent_pipeline
                    } else {
                        &self.opaque_pipeline
                    });
                    transparent_bound = Some(draw.transparent);
                }

                let material = draw
                    .material
                    .as_ref()
                    .and_then(|(id, _)| self.materials.get(id))
                    .unwrap_or(&self.fallback_material);
                render_pass.set_bind_group(1, &material.bind_group, &[]);

                let instance_bytes =
                    (draw.instances.len() * std::mem::size_of::<InstanceRaw>()) as u64;
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass
                    .set_vertex_buffer(1, self.instance_pool[index].buffer.slice(..instance_bytes));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..draw.instances.len() as u32);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn release_context(&mut self) {
        if self.released {
            log::debug!("wgpu context already released");
            return;
        }
        if !self.geometries.is_empty() || !self.materials.is_empty() {
            log::warn!(
                "releasing context with {} geometries and {} materials still live",
                self.geometries.len(),
                self.materials.len()
            );
        }
        for (_, mesh) in self.geometries.drain() {
            mesh.destroy();
        }
        for (_, material) in self.materials.drain() {
            material.buffer.destroy();
        }
        for slot in self.instance_pool.drain(..) {
            slot.buffer.destroy();
        }
        self.fallback_material.buffer.destroy();
        self.globals_buffer.destroy();
        self.depth_texture.destroy();
        self.released = true;
        log::info!("wgpu context released");
    }
}
