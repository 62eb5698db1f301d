//! 缓冲区属性
//!
//! 模拟状态与 GPU 可见缓冲区是同一块内存：每个属性是一个扁平的 `f32`
//! 数组，附带条目大小、步进模式以及上传脏标记。核心逻辑只负责标脏，
//! 实际上传由渲染器完成。

/// 属性步进模式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepMode {
    /// 每顶点（所有实例共享）
    Vertex,
    /// 每实例
    Instance,
}

impl StepMode {
    pub fn to_wgpu(self) -> wgpu::VertexStepMode {
        match self {
            StepMode::Vertex => wgpu::VertexStepMode::Vertex,
            StepMode::Instance => wgpu::VertexStepMode::Instance,
        }
    }
}

/// 缓冲区属性
#[derive(Clone, Debug)]
pub struct BufferAttribute {
    /// 属性名（与着色器契约一致）
    name: String,
    /// 扁平数据
    array: Vec<f32>,
    /// 每个条目的分量数
    item_size: usize,
    /// 步进模式
    step: StepMode,
    /// 自上次上传以来是否被修改
    needs_update: bool,
    /// 修改计数
    version: u32,
}

impl BufferAttribute {
    /// 由已有数据创建属性
    ///
    /// 新属性默认是脏的，首次上传会携带初始状态。
    pub fn new(name: impl Into<String>, array: Vec<f32>, item_size: usize, step: StepMode) -> Self {
        Self {
            name: name.into(),
            array,
            item_size,
            step,
            needs_update: true,
            version: 0,
        }
    }

    /// 创建零初始化的每实例属性
    pub fn zeroed_instance(name: impl Into<String>, count: usize, item_size: usize) -> Self {
        Self::new(name, vec![0.0; count * item_size], item_size, StepMode::Instance)
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn item_size(&self) -> usize {
        self.item_size
    }

    #[inline]
    pub fn step(&self) -> StepMode {
        self.step
    }

    /// 逻辑条目数
    #[inline]
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.array.len() / self.item_size
        }
    }

    #[inline]
    pub fn array(&self) -> &[f32] {
        &self.array
    }

    /// 可变数据视图（不会自动标脏）
    #[inline]
    pub fn array_mut(&mut self) -> &mut [f32] {
        &mut self.array
    }

    #[inline]
    pub fn get_x(&self, index: usize) -> f32 {
        self.array[index * self.item_size]
    }

    #[inline]
    pub fn set_x(&mut self, index: usize, x: f32) {
        self.array[index * self.item_size] = x;
    }

    #[inline]
    pub fn get_xyz(&self, index: usize) -> [f32; 3] {
        let base = index * self.item_size;
        [self.array[base], self.array[base + 1], self.array[base + 2]]
    }

    #[inline]
    pub fn set_xyz(&mut self, index: usize, x: f32, y: f32, z: f32) {
        let base = index * self.item_size;
        self.array[base] = x;
        self.array[base + 1] = y;
        self.array[base + 2] = z;
    }

    #[inline]
    pub fn get_xyzw(&self, index: usize) -> [f32; 4] {
        let base = index * self.item_size;
        [
            self.array[base],
            self.array[base + 1],
            self.array[base + 2],
            self.array[base + 3],
        ]
    }

    #[inline]
    pub fn set_xyzw(&mut self, index: usize, x: f32, y: f32, z: f32, w: f32) {
        let base = index * self.item_size;
        self.array[base] = x;
        self.array[base + 1] = y;
        self.array[base + 2] = z;
        self.array[base + 3] = w;
    }

    /// 标记需要上传
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.needs_update = true;
        self.version = self.version.wrapping_add(1);
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.needs_update
    }

    /// 上传完成后清除脏标记
    #[inline]
    pub fn clear_dirty(&mut self) {
        self.needs_update = false;
    }

    #[inline]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// 字节视图，用于写入 GPU 缓冲区
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.array)
    }

    /// 每个条目的字节跨度
    pub fn byte_stride(&self) -> wgpu::BufferAddress {
        (self.item_size * std::mem::size_of::<f32>()) as wgpu::BufferAddress
    }

    /// 对应的顶点格式
    pub fn vertex_format(&self) -> Option<wgpu::VertexFormat> {
        match self.item_size {
            1 => Some(wgpu::VertexFormat::Float32),
            2 => Some(wgpu::VertexFormat::Float32x2),
            3 => Some(wgpu::VertexFormat::Float32x3),
            4 => Some(wgpu::VertexFormat::Float32x4),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_instance_layout() {
        let attr = BufferAttribute::zeroed_instance("positions", 5, 3);
        assert_eq!(attr.count(), 5);
        assert_eq!(attr.array().len(), 15);
        assert!(attr.array().iter().all(|v| *v == 0.0));
        assert_eq!(attr.step(), StepMode::Instance);
    }

    #[test]
    fn test_new_attribute_starts_dirty() {
        let mut attr = BufferAttribute::zeroed_instance("opacity", 2, 1);
        assert!(attr.is_dirty());
        attr.clear_dirty();
        assert!(!attr.is_dirty());
        attr.mark_dirty();
        assert!(attr.is_dirty());
        assert_eq!(attr.version(), 1);
    }

    #[test]
    fn test_component_access() {
        let mut attr = BufferAttribute::zeroed_instance("quaternions", 2, 4);
        attr.set_xyzw(1, 0.0, 0.0, 0.0, 1.0);
        assert_eq!(attr.get_xyzw(1), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(attr.get_x(1), 0.0);
        assert_eq!(attr.array()[7], 1.0);
    }

    #[test]
    fn test_setters_do_not_mark_dirty() {
        let mut attr = BufferAttribute::zeroed_instance("positions", 1, 3);
        attr.clear_dirty();
        attr.set_xyz(0, 0.0, 1.0, 0.0);
        assert!(!attr.is_dirty());
        assert_eq!(attr.get_xyz(0), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_vertex_format_and_bytes() {
        let attr = BufferAttribute::zeroed_instance("positions", 5, 3);
        assert_eq!(attr.vertex_format(), Some(wgpu::VertexFormat::Float32x3));
        assert_eq!(attr.byte_stride(), 12);
        assert_eq!(attr.as_bytes().len(), 60);
        let odd = BufferAttribute::zeroed_instance("odd", 1, 5);
        assert_eq!(odd.vertex_format(), None);
    }
}
