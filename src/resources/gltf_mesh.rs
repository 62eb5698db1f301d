//! glTF/GLB 网格导入
//!
//! 只取第一个网格的第一个图元。缺失的顶点属性不在这里补齐，
//! 交给几何构建器报告 `MissingAttribute`。

use std::path::Path;

use crate::core::{AssetError, AssetResult};
use crate::render::geometry::{MeshTemplate, NORMAL, POSITION, UV};

/// 从 glTF/GLB 字节构建模板网格
pub fn mesh_template_from_slice(bytes: &[u8], path: &Path) -> AssetResult<MeshTemplate> {
    let (document, buffers, _images) = gltf::import_slice(bytes).map_err(|e| AssetError::Decode {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let no_mesh = || AssetError::NoMesh {
        path: path.display().to_string(),
    };
    let mesh = document.meshes().next().ok_or_else(no_mesh)?;
    let primitive = mesh.primitives().next().ok_or_else(no_mesh)?;

    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let mut template = MeshTemplate::new();
    if let Some(positions) = reader.read_positions() {
        template = template.with_attribute(POSITION, positions.flatten().collect(), 3);
    }
    if let Some(normals) = reader.read_normals() {
        template = template.with_attribute(NORMAL, normals.flatten().collect(), 3);
    }
    if let Some(uvs) = reader.read_tex_coords(0) {
        template = template.with_attribute(UV, uvs.into_f32().flatten().collect(), 2);
    }
    if let Some(indices) = reader.read_indices() {
        template = template.with_index(indices.into_u32().collect());
    }

    tracing::debug!(
        target: "splash",
        path = %path.display(),
        vertices = template.vertex_count(),
        indexed = template.index().is_some(),
        "Imported splash mesh"
    );

    Ok(template)
}
