//! 实例化几何构建器
//!
//! 给定模板网格与固定粒子数，生成实例化几何：
//!
//! ```text
//! MeshTemplate                      InstancedGeometry
//! ┌──────────────┐                  ┌───────────────────────────────┐
//! │ position  v3 │ ──── 原样复制 ──▶ │ shared:   position/normal/uv  │
//! │ normal    v3 │                  │ index:    (同模板)             │
//! │ uv        v2 │                  │ instance: positions (v3, 全零) │
//! │ index        │                  │           + 每个 AttributeSpec │
//! └──────────────┘                  │             count × itemSize  │
//!                                   └───────────────────────────────┘
//! ```
//!
//! 每顶点的 `position` 与每实例的 `positions`（实例偏移）是两个不同的属性。

use crate::core::{GeometryError, GeometryResult};

use super::buffer::{BufferAttribute, StepMode};

/// 共享顶点属性名
pub const POSITION: &str = "position";
pub const NORMAL: &str = "normal";
pub const UV: &str = "uv";

/// 每实例偏移属性名
pub const INSTANCE_OFFSETS: &str = "positions";

/// 模板必须提供的共享属性
pub const REQUIRED_SHARED: [&str; 3] = [POSITION, NORMAL, UV];
/// 对应的分量数，与 `Vertex3D` 的交错布局一致
pub const REQUIRED_ITEM_SIZES: [usize; 3] = [3, 3, 2];

/// 每实例属性描述
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttributeSpec<'a> {
    pub name: &'a str,
    pub item_size: usize,
}

impl<'a> AttributeSpec<'a> {
    pub const fn new(name: &'a str, item_size: usize) -> Self {
        Self { name, item_size }
    }
}

/// 模板网格（由资源加载器产出，只读）
#[derive(Clone, Debug, Default)]
pub struct MeshTemplate {
    attributes: Vec<BufferAttribute>,
    index: Option<Vec<u32>>,
}

impl MeshTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加或替换一个每顶点属性
    pub fn with_attribute(mut self, name: &str, array: Vec<f32>, item_size: usize) -> Self {
        self.attributes.retain(|a| a.name() != name);
        self.attributes
            .push(BufferAttribute::new(name, array, item_size, StepMode::Vertex));
        self
    }

    pub fn with_index(mut self, index: Vec<u32>) -> Self {
        self.index = Some(index);
        self
    }

    /// 由三组顶点数组构建
    pub fn from_arrays(
        positions: &[[f32; 3]],
        normals: &[[f32; 3]],
        uvs: &[[f32; 2]],
        index: Option<Vec<u32>>,
    ) -> Self {
        let template = Self::new()
            .with_attribute(POSITION, positions.iter().flatten().copied().collect(), 3)
            .with_attribute(NORMAL, normals.iter().flatten().copied().collect(), 3)
            .with_attribute(UV, uvs.iter().flatten().copied().collect(), 2);
        match index {
            Some(index) => template.with_index(index),
            None => template,
        }
    }

    /// XZ 平面上的单位四边形，法线朝上
    pub fn quad() -> Self {
        Self::from_arrays(
            &[
                [-0.5, 0.0, -0.5],
                [0.5, 0.0, -0.5],
                [0.5, 0.0, 0.5],
                [-0.5, 0.0, 0.5],
            ],
            &[[0.0, 1.0, 0.0]; 4],
            &[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
            Some(vec![0, 2, 1, 0, 3, 2]),
        )
    }

    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.attributes.iter().find(|a| a.name() == name)
    }

    pub fn attributes(&self) -> &[BufferAttribute] {
        &self.attributes
    }

    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.attribute(POSITION).map(|a| a.count()).unwrap_or(0)
    }
}

/// 实例化几何
#[derive(Clone, Debug)]
pub struct InstancedGeometry {
    /// 每顶点共享属性（position/normal/uv）
    shared: Vec<BufferAttribute>,
    /// 每实例属性，按插入顺序
    instance: Vec<BufferAttribute>,
    /// 索引缓冲
    index: Option<Vec<u32>>,
    /// 实例数
    instance_count: usize,
}

impl InstancedGeometry {
    pub fn instance_count(&self) -> usize {
        self.instance_count
    }

    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    pub fn shared_attributes(&self) -> &[BufferAttribute] {
        &self.shared
    }

    pub fn instance_attributes(&self) -> &[BufferAttribute] {
        &self.instance
    }

    /// 按名称查找（先查共享属性，再查实例属性）
    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        self.shared
            .iter()
            .chain(self.instance.iter())
            .find(|a| a.name() == name)
    }

    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut BufferAttribute> {
        self.shared
            .iter_mut()
            .chain(self.instance.iter_mut())
            .find(|a| a.name() == name)
    }

    /// 添加或替换属性；同名属性被替换
    pub fn set_attribute(&mut self, attribute: BufferAttribute) {
        let target = match attribute.step() {
            StepMode::Vertex => &mut self.shared,
            StepMode::Instance => &mut self.instance,
        };
        match target.iter_mut().find(|a| a.name() == attribute.name()) {
            Some(existing) => *existing = attribute,
            None => target.push(attribute),
        }
    }

    /// 取出实例属性（移动，不复制数据）
    pub fn take_attribute(&mut self, name: &str) -> GeometryResult<BufferAttribute> {
        let pos = self
            .instance
            .iter()
            .position(|a| a.name() == name)
            .ok_or_else(|| GeometryError::missing(name))?;
        Ok(self.instance.remove(pos))
    }

    /// 拆分为共享属性与索引
    pub fn into_shared(self) -> (Vec<BufferAttribute>, Option<Vec<u32>>) {
        (self.shared, self.index)
    }
}

/// 构建实例化几何
///
/// 不修改模板。模板缺少 `position`/`normal`/`uv` 任一属性时返回
/// `GeometryError::MissingAttribute`；分量数不是 3/3/2 时返回
/// `GeometryError::InvalidItemSize`。
pub fn build_instanced_geometry(
    template: &MeshTemplate,
    attribute_specs: &[AttributeSpec<'_>],
    particle_count: usize,
) -> GeometryResult<InstancedGeometry> {
    let mut shared = Vec::with_capacity(REQUIRED_SHARED.len());
    for (name, item_size) in REQUIRED_SHARED.into_iter().zip(REQUIRED_ITEM_SIZES) {
        let attribute = template
            .attribute(name)
            .ok_or_else(|| GeometryError::missing(name))?;
        if attribute.item_size() != item_size {
            return Err(GeometryError::InvalidItemSize {
                name: name.to_string(),
                item_size: attribute.item_size(),
            });
        }
        if attribute.array().len() % attribute.item_size() != 0 {
            return Err(GeometryError::LengthMismatch {
                name: name.to_string(),
                len: attribute.array().len(),
                item_size: attribute.item_size(),
            });
        }
        shared.push(attribute.clone());
    }

    let mut geometry = InstancedGeometry {
        shared,
        instance: Vec::with_capacity(attribute_specs.len() + 1),
        index: template.index.clone(),
        instance_count: particle_count,
    };

    geometry.set_attribute(BufferAttribute::zeroed_instance(
        INSTANCE_OFFSETS,
        particle_count,
        3,
    ));

    for spec in attribute_specs {
        if spec.item_size == 0 {
            return Err(GeometryError::InvalidItemSize {
                name: spec.name.to_string(),
                item_size: 0,
            });
        }
        geometry.set_attribute(BufferAttribute::zeroed_instance(
            spec.name,
            particle_count,
            spec.item_size,
        ));
    }

    Ok(geometry)
}
