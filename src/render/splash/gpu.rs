//! 溅射渲染器
//!
//! 一个交错的共享顶点缓冲 + 七个每实例缓冲（共 8 个顶点缓冲槽），
//! 每帧只上传被标脏的实例属性。

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::render::mesh::{GpuMesh, Vertex3D};
use crate::resources::{TextureData, WrapMode};

use super::effect::{SplashEffect, SplashRenderable};
use super::shader::{SplashUniforms, FRAGMENT_ENTRY, SPLASH_SHADER_SOURCE, VERTEX_ENTRY};

const fn instance_attribute(location: u32, format: wgpu::VertexFormat) -> [wgpu::VertexAttribute; 1] {
    [wgpu::VertexAttribute {
        offset: 0,
        shader_location: location,
        format,
    }]
}

/// 每实例属性布局，顺序与粒子池 `instance_attributes()` 一致
static INSTANCE_ATTRIBUTES: [[wgpu::VertexAttribute; 1]; 7] = [
    instance_attribute(3, wgpu::VertexFormat::Float32x3),
    instance_attribute(4, wgpu::VertexFormat::Float32),
    instance_attribute(5, wgpu::VertexFormat::Float32),
    instance_attribute(6, wgpu::VertexFormat::Float32),
    instance_attribute(7, wgpu::VertexFormat::Float32),
    instance_attribute(8, wgpu::VertexFormat::Float32),
    instance_attribute(9, wgpu::VertexFormat::Float32x4),
];

const INSTANCE_STRIDES: [wgpu::BufferAddress; 7] = [12, 4, 4, 4, 4, 4, 16];

/// 每实例顶点缓冲布局
pub fn instance_buffer_layouts() -> [wgpu::VertexBufferLayout<'static>; 7] {
    std::array::from_fn(|i| wgpu::VertexBufferLayout {
        array_stride: INSTANCE_STRIDES[i],
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &INSTANCE_ATTRIBUTES[i],
    })
}

/// 溅射渲染器
pub struct SplashRenderer {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    mesh: GpuMesh,
    instance_buffers: Vec<wgpu::Buffer>,
    instance_count: u32,
    model: Mat4,
}

impl SplashRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        color_format: wgpu::TextureFormat,
        depth_format: Option<wgpu::TextureFormat>,
        instance: &SplashRenderable,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Splash Shader"),
            source: wgpu::ShaderSource::Wgsl(SPLASH_SHADER_SOURCE.into()),
        });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Splash Uniform Buffer"),
            contents: bytemuck::bytes_of(&SplashUniforms::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Splash BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<SplashUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
                texture_entry(1),
                sampler_entry(2),
                texture_entry(3),
                sampler_entry(4),
            ],
        });

        // 遮罩与滚动扭曲共用一张纹理，只有采样器的寻址模式不同
        let texture_view = upload_texture(device, queue, &instance.texture);
        let clamp_sampler = create_sampler(device, WrapMode::ClampToEdge);
        let repeat_sampler = create_sampler(device, WrapMode::Repeat);

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Splash BG"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&clamp_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&repeat_sampler),
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Splash Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let [l0, l1, l2, l3, l4, l5, l6] = instance_buffer_layouts();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Splash Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: VERTEX_ENTRY,
                buffers: &[Vertex3D::desc(), l0, l1, l2, l3, l4, l5, l6],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: FRAGMENT_ENTRY,
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // 双面
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
                format,
                // 透明粒子不写深度
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let pool = &instance.pool;
        let vertices = Vertex3D::interleave(pool.shared_attributes());
        let indices = match pool.index() {
            Some(index) => index.to_vec(),
            None => GpuMesh::sequential_indices(vertices.len()),
        };
        let mesh = GpuMesh::new(device, &vertices, &indices);

        let instance_buffers = pool
            .instance_attributes()
            .iter()
            .map(|attribute| {
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(attribute.name()),
                    contents: attribute.as_bytes(),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                })
            })
            .collect();

        tracing::info!(
            target: "splash",
            vertices = vertices.len(),
            indices = indices.len(),
            instances = pool.particle_count(),
            "Splash renderer created"
        );

        Self {
            pipeline,
            uniform_buffer,
            bind_group,
            mesh,
            instance_buffers,
            instance_count: pool.particle_count() as u32,
            model: Mat4::IDENTITY,
        }
    }

    /// 设置模型矩阵（场景挂载点的世界变换）
    pub fn set_model(&mut self, model: Mat4) {
        self.model = model;
    }

    /// 写入 uniform 并上传脏的实例属性，返回上传的属性数
    pub fn prepare(&self, queue: &wgpu::Queue, effect: &mut SplashEffect, view_proj: Mat4) -> usize {
        let uniforms = SplashUniforms::new(view_proj, self.model, effect.time());
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let Some(renderable) = effect.renderable_mut() else {
            return 0;
        };

        let mut uploaded = 0;
        for (attribute, buffer) in renderable
            .pool
            .instance_attributes_mut()
            .into_iter()
            .zip(&self.instance_buffers)
        {
            if attribute.is_dirty() {
                if !attribute.array().is_empty() {
                    queue.write_buffer(buffer, 0, attribute.as_bytes());
                }
                attribute.clear_dirty();
                uploaded += 1;
            }
        }
        uploaded
    }

    /// 单次实例化绘制
    pub fn draw<'a>(&'a self, render_pass: &mut wgpu::RenderPass<'a>) {
        if self.instance_count == 0 || self.mesh.index_count == 0 {
            return;
        }
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.mesh.vertex_buffer.slice(..));
        for (slot, buffer) in self.instance_buffers.iter().enumerate() {
            render_pass.set_vertex_buffer(slot as u32 + 1, buffer.slice(..));
        }
        render_pass.set_index_buffer(self.mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.mesh.index_count, 0, 0..self.instance_count);
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> wgpu::TextureView {
    let size = wgpu::Extent3d {
        width: data.width(),
        height: data.height(),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Splash Texture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width()),
            rows_per_image: Some(data.height()),
        },
        size,
    );
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_sampler(device: &wgpu::Device, wrap: WrapMode) -> wgpu::Sampler {
    let address_mode = wrap.to_wgpu();
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("Splash Sampler"),
        address_mode_u: address_mode,
        address_mode_v: address_mode,
        address_mode_w: address_mode,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}
