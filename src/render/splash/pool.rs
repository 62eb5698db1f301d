//! 粒子池
//!
//! 固定容量的槽位竞技场：每个属性是一列扁平数组，数组下标是粒子的唯一身份。
//! 池持有几何构建器分配的数组本身（移动而非复制），因此模拟状态与
//! GPU 可见缓冲区是同一块内存。

use crate::core::{GeometryError, GeometryResult};
use crate::render::buffer::{BufferAttribute, StepMode};
use crate::render::geometry::{
    build_instanced_geometry, AttributeSpec, InstancedGeometry, MeshTemplate, INSTANCE_OFFSETS,
};

/// 参考粒子数
pub const PARTICLE_COUNT: usize = 5;

/// 每实例属性名（与着色器契约一致）
pub const POSITIONS: &str = INSTANCE_OFFSETS;
pub const SCALES: &str = "scales";
pub const OPACITY: &str = "opacity";
pub const ROTATION_Y: &str = "rotationY";
pub const DISTORTION_SCALE_X: &str = "distortionScaleX";
pub const DISTORTION_SCALE_Y: &str = "distortionScaleY";
pub const QUATERNIONS: &str = "quaternions";

/// 溅射特效向几何构建器请求的每实例属性
pub const SPLASH_ATTRIBUTE_SPECS: [AttributeSpec<'static>; 5] = [
    AttributeSpec::new(ROTATION_Y, 1),
    AttributeSpec::new(OPACITY, 1),
    AttributeSpec::new(SCALES, 1),
    AttributeSpec::new(DISTORTION_SCALE_X, 1),
    AttributeSpec::new(DISTORTION_SCALE_Y, 1),
];

/// 实例属性在着色器中的顺序（location 3..=9）
pub const INSTANCE_ATTRIBUTE_ORDER: [&str; 7] = [
    POSITIONS,
    SCALES,
    OPACITY,
    ROTATION_Y,
    DISTORTION_SCALE_X,
    DISTORTION_SCALE_Y,
    QUATERNIONS,
];

/// 粒子池
#[derive(Clone, Debug)]
pub struct ParticlePool {
    particle_count: usize,
    /// 共享顶点属性
    shared: Vec<BufferAttribute>,
    /// 索引
    index: Option<Vec<u32>>,
    pub(crate) positions: BufferAttribute,
    pub(crate) scales: BufferAttribute,
    pub(crate) opacity: BufferAttribute,
    pub(crate) rotation_y: BufferAttribute,
    pub(crate) distortion_x: BufferAttribute,
    pub(crate) distortion_y: BufferAttribute,
    /// 保留的旋转四元数；当前变换路径不读取，构造后保持单位四元数
    pub(crate) quaternions: BufferAttribute,
}

impl ParticlePool {
    /// 以参考粒子数从模板构建
    pub fn new(template: &MeshTemplate) -> GeometryResult<Self> {
        Self::with_capacity(template, PARTICLE_COUNT)
    }

    /// 以指定粒子数从模板构建；构造后容量不可变
    pub fn with_capacity(template: &MeshTemplate, particle_count: usize) -> GeometryResult<Self> {
        let geometry = build_instanced_geometry(template, &SPLASH_ATTRIBUTE_SPECS, particle_count)?;
        Self::from_geometry(geometry)
    }

    /// 从实例化几何接管属性数组
    pub fn from_geometry(mut geometry: InstancedGeometry) -> GeometryResult<Self> {
        let particle_count = geometry.instance_count();
        let mut take = |name: &str, item_size: usize| -> GeometryResult<BufferAttribute> {
            let attribute = geometry.take_attribute(name)?;
            if attribute.item_size() != item_size {
                return Err(GeometryError::InvalidItemSize {
                    name: name.to_string(),
                    item_size: attribute.item_size(),
                });
            }
            if attribute.count() != particle_count {
                return Err(GeometryError::LengthMismatch {
                    name: name.to_string(),
                    len: attribute.array().len(),
                    item_size,
                });
            }
            Ok(attribute)
        };

        let positions = take(POSITIONS, 3)?;
        let scales = take(SCALES, 1)?;
        let opacity = take(OPACITY, 1)?;
        let rotation_y = take(ROTATION_Y, 1)?;
        let distortion_x = take(DISTORTION_SCALE_X, 1)?;
        let distortion_y = take(DISTORTION_SCALE_Y, 1)?;

        let mut quaternions = BufferAttribute::zeroed_instance(QUATERNIONS, particle_count, 4);
        for i in 0..particle_count {
            quaternions.set_xyzw(i, 0.0, 0.0, 0.0, 1.0);
        }

        let (shared, index) = geometry.into_shared();

        tracing::debug!(target: "splash", particle_count, "Particle pool constructed");

        Ok(Self {
            particle_count,
            shared,
            index,
            positions,
            scales,
            opacity,
            rotation_y,
            distortion_x,
            distortion_y,
            quaternions,
        })
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn shared_attributes(&self) -> &[BufferAttribute] {
        &self.shared
    }

    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    /// 按名称获取属性
    pub fn attribute(&self, name: &str) -> Option<&BufferAttribute> {
        match name {
            POSITIONS => Some(&self.positions),
            SCALES => Some(&self.scales),
            OPACITY => Some(&self.opacity),
            ROTATION_Y => Some(&self.rotation_y),
            DISTORTION_SCALE_X => Some(&self.distortion_x),
            DISTORTION_SCALE_Y => Some(&self.distortion_y),
            QUATERNIONS => Some(&self.quaternions),
            _ => self.shared.iter().find(|a| a.name() == name),
        }
    }

    /// 按名称获取可变属性视图
    pub fn attribute_mut(&mut self, name: &str) -> Option<&mut BufferAttribute> {
        match name {
            POSITIONS => Some(&mut self.positions),
            SCALES => Some(&mut self.scales),
            OPACITY => Some(&mut self.opacity),
            ROTATION_Y => Some(&mut self.rotation_y),
            DISTORTION_SCALE_X => Some(&mut self.distortion_x),
            DISTORTION_SCALE_Y => Some(&mut self.distortion_y),
            QUATERNIONS => Some(&mut self.quaternions),
            _ => self.shared.iter_mut().find(|a| a.name() == name),
        }
    }

    /// 每实例属性，按着色器 location 顺序
    pub fn instance_attributes(&self) -> [&BufferAttribute; 7] {
        [
            &self.positions,
            &self.scales,
            &self.opacity,
            &self.rotation_y,
            &self.distortion_x,
            &self.distortion_y,
            &self.quaternions,
        ]
    }

    pub fn instance_attributes_mut(&mut self) -> [&mut BufferAttribute; 7] {
        [
            &mut self.positions,
            &mut self.scales,
            &mut self.opacity,
            &mut self.rotation_y,
            &mut self.distortion_x,
            &mut self.distortion_y,
            &mut self.quaternions,
        ]
    }

    /// 当前需要上传的实例属性名
    pub fn dirty_attributes(&self) -> Vec<&str> {
        self.instance_attributes()
            .into_iter()
            .filter(|a| a.is_dirty())
            .map(|a| a.name())
            .collect()
    }

    #[inline]
    pub fn position(&self, slot: usize) -> [f32; 3] {
        self.positions.get_xyz(slot)
    }

    #[inline]
    pub fn scale(&self, slot: usize) -> f32 {
        self.scales.get_x(slot)
    }

    #[inline]
    pub fn opacity(&self, slot: usize) -> f32 {
        self.opacity.get_x(slot)
    }

    #[inline]
    pub fn rotation_y(&self, slot: usize) -> f32 {
        self.rotation_y.get_x(slot)
    }

    #[inline]
    pub fn distortion_scale(&self, slot: usize) -> (f32, f32) {
        (self.distortion_x.get_x(slot), self.distortion_y.get_x(slot))
    }

    #[inline]
    pub fn quaternion(&self, slot: usize) -> [f32; 4] {
        self.quaternions.get_xyzw(slot)
    }
}

impl ParticlePool {
    /// 检查所有实例属性都是每实例步进
    pub fn is_well_formed(&self) -> bool {
        self.instance_attributes()
            .iter()
            .all(|a| a.step() == StepMode::Instance && a.count() == self.particle_count)
    }
}
