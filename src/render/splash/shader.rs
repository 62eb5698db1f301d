//! 着色器契约
//!
//! `shader_splash.wgsl` 是 GPU 端实现；本模块给出同一套数学的 CPU 参考
//! 实现，供数值测试使用，并定义与 WGSL 布局一致的 uniform 块。

use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use super::pool::ParticlePool;

/// WGSL 源码
pub const SPLASH_SHADER_SOURCE: &str = include_str!("shader_splash.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// 模型空间的固定缩放
pub const VERTEX_SCALE: f32 = 0.01;
/// 亮度下限
pub const MIN_BRIGHTNESS: f32 = 0.2;
/// 红色色调
pub const TINT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// uniform 块，与 WGSL `SplashUniforms` 对齐（144 字节）
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SplashUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub time: f32,
    _padding: [f32; 3],
}

impl SplashUniforms {
    pub fn new(view_proj: Mat4, model: Mat4, time: f32) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            time,
            _padding: [0.0; 3],
        }
    }

    /// 帧时间戳（毫秒）换算为秒
    pub fn time_from_timestamp(timestamp_ms: f64) -> f32 {
        (timestamp_ms / 1000.0) as f32
    }
}

impl Default for SplashUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, Mat4::IDENTITY, 0.0)
    }
}

/// 顶点阶段读取的每实例参数
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstanceParams {
    pub offset: Vec3,
    pub scale: f32,
    pub rotation_y: f32,
}

impl InstanceParams {
    pub fn from_pool(pool: &ParticlePool, slot: usize) -> Self {
        Self {
            offset: Vec3::from_array(pool.position(slot)),
            scale: pool.scale(slot),
            rotation_y: pool.rotation_y(slot),
        }
    }
}

/// 片元阶段的插值输入
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FragmentInput {
    pub uv: Vec2,
    pub opacity: f32,
    pub distortion_scale_x: f32,
    pub distortion_scale_y: f32,
}

impl FragmentInput {
    pub fn from_pool(pool: &ParticlePool, slot: usize, uv: Vec2) -> Self {
        let (distortion_scale_x, distortion_scale_y) = pool.distortion_scale(slot);
        Self {
            uv,
            opacity: pool.opacity(slot),
            distortion_scale_x,
            distortion_scale_y,
        }
    }
}

/// 纹理采样
pub trait TextureSampler {
    /// 按 UV 取 RGBA（0..=1）
    fn sample(&self, uv: Vec2) -> Vec4;
}

impl<T: TextureSampler + ?Sized> TextureSampler for &T {
    fn sample(&self, uv: Vec2) -> Vec4 {
        (**self).sample(uv)
    }
}

/// 每实例顶点变换：缩放、固定缩放 0.01、绕 Y 轴旋转、平移
pub fn transform_vertex(position: Vec3, instance: &InstanceParams) -> Vec3 {
    let scaled = position * instance.scale * VERTEX_SCALE;
    Mat3::from_rotation_y(instance.rotation_y) * scaled + instance.offset
}

/// 四元数旋转（未接入变换路径）
pub fn rotate_vec_quat(v: Vec3, q: Quat) -> Vec3 {
    let u = Vec3::new(q.x, q.y, q.z);
    v + 2.0 * u.cross(u.cross(v) + q.w * v)
}

/// 可见性门限：`floor(x + 0.5)` 阶跃
#[inline]
pub fn visibility_gate(scroll_red: f32, opacity: f32) -> f32 {
    (scroll_red * opacity + 0.5).floor()
}

/// 滚动纹理的采样坐标
#[inline]
pub fn scroll_uv(uv: Vec2, time: f32) -> Vec2 {
    Vec2::new(uv.x * 2.0, uv.y * 2.0 + time)
}

/// 片元着色的 CPU 参考实现
///
/// `splash` 为静态遮罩（钳制寻址），`scroll` 为滚动扭曲纹理（重复寻址）。
pub fn shade_fragment<A, B>(input: &FragmentInput, time: f32, splash: &A, scroll: &B) -> Vec4
where
    A: TextureSampler + ?Sized,
    B: TextureSampler + ?Sized,
{
    let base = splash.sample(input.uv);
    let flow = scroll.sample(scroll_uv(input.uv, time));

    let distortion = Vec2::new(
        base.y * input.distortion_scale_x,
        flow.x * input.distortion_scale_y,
    );
    let masked = splash.sample(input.uv + distortion);

    let visibility = visibility_gate(flow.x, input.opacity) * masked.z;
    let brightness = flow.x.clamp(MIN_BRIGHTNESS, 1.0);
    let color = TINT * brightness;

    Vec4::new(color.x, color.y, color.z, masked.z * brightness * visibility)
}
