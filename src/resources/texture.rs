//! 纹理数据
//!
//! 解码后的 RGBA8 图像。同一张图片既作为静态遮罩（钳制寻址）也作为
//! 滚动扭曲纹理（重复寻址），寻址模式由采样视图决定，而不是纹理本身。

use std::path::Path;

use glam::{Vec2, Vec4};

use crate::core::{AssetError, AssetResult};
use crate::render::splash::TextureSampler;

/// 纹理寻址模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WrapMode {
    ClampToEdge,
    Repeat,
}

impl WrapMode {
    pub fn to_wgpu(self) -> wgpu::AddressMode {
        match self {
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
        }
    }

    /// 将纹理坐标折回 [0, 1]
    #[inline]
    fn apply(self, coord: f32) -> f32 {
        match self {
            WrapMode::ClampToEdge => coord.clamp(0.0, 1.0),
            WrapMode::Repeat => coord - coord.floor(),
        }
    }
}

/// 解码后的 RGBA 纹理
#[derive(Clone, Debug)]
pub struct TextureData {
    image: image::RgbaImage,
}

impl TextureData {
    pub fn from_image(image: image::RgbaImage) -> Self {
        Self { image }
    }

    /// 从内存解码（PNG/JPEG）
    pub fn decode(bytes: &[u8], path: &Path) -> AssetResult<Self> {
        let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_image(image.to_rgba8()))
    }

    /// 纯色纹理
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_image(image::RgbaImage::from_pixel(
            width.max(1),
            height.max(1),
            image::Rgba(rgba),
        ))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// 紧密排列的 RGBA8 像素
    pub fn pixels(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// 归一化后的纹素
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        let image::Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / 255.0
    }

    /// 以指定寻址模式创建采样视图
    pub fn sampler(&self, wrap: WrapMode) -> SampledTexture<'_> {
        SampledTexture {
            texture: self,
            wrap,
        }
    }
}

/// 带寻址模式的最近邻采样视图
#[derive(Clone, Copy, Debug)]
pub struct SampledTexture<'a> {
    texture: &'a TextureData,
    wrap: WrapMode,
}

impl SampledTexture<'_> {
    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }
}

impl TextureSampler for SampledTexture<'_> {
    fn sample(&self, uv: Vec2) -> Vec4 {
        let w = self.texture.width();
        let h = self.texture.height();
        let u = self.wrap.apply(uv.x);
        let v = self.wrap.apply(uv.y);
        let x = ((u * w as f32) as u32).min(w - 1);
        let y = ((v * h as f32) as u32).min(h - 1);
        self.texture.texel(x, y)
    }
}
