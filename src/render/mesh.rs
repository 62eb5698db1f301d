use std::sync::Arc;
use wgpu::util::DeviceExt;

use super::buffer::BufferAttribute;
use super::geometry::{NORMAL, POSITION, UV};

/// 交错的共享顶点（position/normal/uv），对应着色器 location 0..=2
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex3D {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: 12,
            shader_location: 1,
            format: wgpu::VertexFormat::Float32x3,
        },
        wgpu::VertexAttribute {
            offset: 24,
            shader_location: 2,
            format: wgpu::VertexFormat::Float32x2,
        },
    ];

    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }

    /// 将分离的共享属性交错为顶点数组
    ///
    /// 以 position 的顶点数为准；normal/uv 不足的部分补零。
    pub fn interleave(shared: &[BufferAttribute]) -> Vec<Vertex3D> {
        let find = |name: &str| shared.iter().find(|a| a.name() == name);
        let Some(positions) = find(POSITION) else {
            return Vec::new();
        };
        let normals = find(NORMAL);
        let uvs = find(UV);

        (0..positions.count())
            .map(|i| {
                let normal = normals
                    .filter(|n| i < n.count() && n.item_size() >= 3)
                    .map(|n| n.get_xyz(i))
                    .unwrap_or_default();
                let uv = uvs
                    .filter(|u| i < u.count() && u.item_size() >= 2)
                    .map(|u| {
                        let base = i * u.item_size();
                        [u.array()[base], u.array()[base + 1]]
                    })
                    .unwrap_or_default();
                Vertex3D {
                    pos: positions.get_xyz(i),
                    normal,
                    uv,
                }
            })
            .collect()
    }
}

/// GPU 端共享网格
#[derive(Clone, Debug)]
pub struct GpuMesh {
    pub vertex_buffer: Arc<wgpu::Buffer>,
    pub index_buffer: Arc<wgpu::Buffer>,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, vertices: &[Vertex3D], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Splash Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Splash Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer: Arc::new(vertex_buffer),
            index_buffer: Arc::new(index_buffer),
            index_count: indices.len() as u32,
        }
    }

    /// 无索引模板使用顺序索引
    pub fn sequential_indices(vertex_count: usize) -> Vec<u32> {
        (0..vertex_count as u32).collect()
    }
}
