//! Synthetic square tubes and LWO2 containers for tests.

use crate::lwo::format::{CHUNK_PNTS, CHUNK_POLS, CHUNK_VMAP, FORM, LWO2, POLS_FACE, VMAP_TXUV};
use crate::lwo::{decode, ChunkWriter};
use crate::math::Float3;
use crate::mesh::Mesh;
use crate::options::DecodeOptions;
use std::f32::consts::TAU;

/// Wraps `body` in a FORM/LWO2 container.
pub(crate) fn write_container(body: impl FnOnce(&mut ChunkWriter)) -> Vec<u8> {
    let mut writer = ChunkWriter::new();
    writer.begin_chunk(FORM);
    writer.write_tag(LWO2);
    body(&mut writer);
    writer.end_chunk();
    writer.into_bytes()
}

/// Triangulated square tube. Ring `k` owns points `4k..4k + 4` in the order
/// top-left, top-right, bottom-right, bottom-left (seen along the ring
/// lateral axis); every side quad is split along one diagonal.
#[derive(Debug, Clone)]
pub(crate) struct TubeMesh {
    pub positions: Vec<Float3>,
    pub triangles: Vec<[u32; 3]>,
    pub uvs: Option<Vec<[f32; 2]>>,
}

impl TubeMesh {
    /// Rings of side 2 along +Z, `spacing` apart, the first centred on
    /// `origin`.
    pub fn straight(ring_count: usize, spacing: f32, origin: Float3) -> Self {
        let centres: Vec<(Float3, Float3)> = (0..ring_count)
            .map(|k| {
                let centre = origin + Float3::new(0.0, 0.0, k as f32 * spacing);
                (centre, Float3::LEFT)
            })
            .collect();
        Self::from_centres(&centres, false)
    }

    /// Closed ring of tube segments on a horizontal circle of `radius`.
    pub fn looped(ring_count: usize, radius: f32) -> Self {
        let centres: Vec<(Float3, Float3)> = (0..ring_count)
            .map(|k| {
                let angle = TAU * k as f32 / ring_count as f32;
                let radial = Float3::new(angle.cos(), 0.0, angle.sin());
                (radial * radius, radial)
            })
            .collect();
        Self::from_centres(&centres, true)
    }

    fn from_centres(centres: &[(Float3, Float3)], closed: bool) -> Self {
        let mut positions = Vec::with_capacity(centres.len() * 4);
        for &(centre, lateral) in centres {
            positions.push(centre - lateral + Float3::UP);
            positions.push(centre + lateral + Float3::UP);
            positions.push(centre + lateral - Float3::UP);
            positions.push(centre - lateral - Float3::UP);
        }

        let count = centres.len() as u32;
        let segments = if closed { count } else { count.saturating_sub(1) };
        let mut triangles = Vec::new();
        for k in 0..segments {
            let k1 = (k + 1) % count;
            for side in 0..4 {
                let (s0, s1) = (side, (side + 1) % 4);
                let (u0, v0) = (4 * k + s0, 4 * k + s1);
                let (u1, v1) = (4 * k1 + s0, 4 * k1 + s1);
                triangles.push([u0, v0, v1]);
                triangles.push([u0, v1, u1]);
            }
        }

        Self {
            positions,
            triangles,
            uvs: None,
        }
    }

    /// Closes the first ring with two triangles.
    pub fn cap_start(&mut self) {
        self.triangles.push([0, 1, 2]);
        self.triangles.push([0, 2, 3]);
    }

    /// Texture V is 1 on the two ring corners in `top`, 0 elsewhere.
    pub fn with_uv_top(mut self, top: [u32; 2]) -> Self {
        let uvs = (0..self.positions.len() as u32)
            .map(|i| {
                let corner = i % 4;
                let v = if top.contains(&corner) { 1.0 } else { 0.0 };
                [corner as f32 * 0.25, v]
            })
            .collect();
        self.uvs = Some(uvs);
        self
    }

    pub fn merged(mut self, other: TubeMesh) -> Self {
        let offset = self.positions.len() as u32;
        self.positions.extend(other.positions);
        self.triangles
            .extend(other.triangles.iter().map(|t| t.map(|i| i + offset)));
        self.uvs = match (self.uvs, other.uvs) {
            (Some(mut a), Some(b)) => {
                a.extend(b);
                Some(a)
            }
            _ => None,
        };
        self
    }

    /// Encodes the tube. Z is written negated so decoding restores it.
    pub fn to_lwo(&self) -> Vec<u8> {
        write_container(|w| {
            w.begin_chunk(CHUNK_PNTS);
            for p in &self.positions {
                w.write_f32(p.x);
                w.write_f32(p.y);
                w.write_f32(-p.z);
            }
            w.end_chunk();

            if let Some(uvs) = &self.uvs {
                w.begin_chunk(CHUNK_VMAP);
                w.write_tag(VMAP_TXUV);
                w.write_u16(2);
                w.write_string("UVMap");
                for (i, uv) in uvs.iter().enumerate() {
                    w.write_vx(i as u32);
                    w.write_f32(uv[0]);
                    w.write_f32(uv[1]);
                }
                w.end_chunk();
            }

            w.begin_chunk(CHUNK_POLS);
            w.write_tag(POLS_FACE);
            for tri in &self.triangles {
                w.write_u16(3);
                for &i in tri {
                    w.write_vx(i);
                }
            }
            w.end_chunk();
        })
    }

    pub fn to_mesh(&self) -> Mesh {
        decode(&self.to_lwo(), &DecodeOptions::default()).expect("fixture decodes")
    }
}
