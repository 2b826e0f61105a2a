//! LightWave LWO2 decoding.
//!
//! Only the chunks needed to recover tube tracks are honoured: `PNTS`,
//! `VMAP` (`TXUV`) and `POLS` (`FACE`, triangles). Everything else is
//! skipped by length.

pub mod chunk;
pub(crate) mod format;

pub use chunk::{ByteOrder, ChunkHeader, ChunkReader, ChunkWriter};

use crate::error::{tag_name, Error, FormatError};
use crate::math::Float3;
use crate::mesh::{Mesh, PointId, Polygon, PolygonVertex};
use crate::options::DecodeOptions;
use crate::track::{discover_tracks, Track};
use format::*;
use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

/// A decoded file: the mesh and every track found in it.
#[derive(Debug, Clone)]
pub struct LwoModel {
    /// Diagnostic name, without the `.lwo` extension.
    pub name: String,
    pub mesh: Mesh,
    pub tracks: Vec<Track>,
}

/// Decodes `data` and assembles all tracks.
pub fn load(data: &[u8], name: &str, options: &DecodeOptions) -> Result<LwoModel, Error> {
    let name = model_name(name);
    info!("Loading {}", name);
    let mesh = decode(data, options)?;
    let tracks = discover_tracks(&mesh, options)?;
    info!("{}: {} track(s)", name, tracks.len());
    Ok(LwoModel { name, mesh, tracks })
}

pub fn load_file(path: impl AsRef<Path>, options: &DecodeOptions) -> Result<LwoModel, Error> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    load(&data, &name, options)
}

fn model_name(name: &str) -> String {
    let split = name.len().saturating_sub(4);
    match (name.get(..split), name.get(split..)) {
        (Some(stem), Some(ext)) if ext.eq_ignore_ascii_case(".lwo") => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Parses an LWO2 container into a mesh graph.
pub fn decode(data: &[u8], options: &DecodeOptions) -> Result<Mesh, Error> {
    let order = ByteOrder::native()?;
    let mut reader = ChunkReader::new(data, order);

    if reader.read_tag()? != FORM {
        return Err(FormatError::NotForm.into());
    }
    let length = reader.read_u32()?;
    reader.limit(CHUNK_HEADER_SIZE.saturating_add(length as usize))?;

    let form_type = reader.read_tag()?;
    if form_type != LWO2 {
        return Err(FormatError::NotLwo2 { found: form_type }.into());
    }

    let mut state = DecodeState::default();
    let mut chunk_count = 0;
    while reader.has_data() {
        if chunk_count == options.max_chunks {
            return Err(FormatError::TooManyChunks {
                limit: options.max_chunks,
            }
            .into());
        }
        chunk_count += 1;

        let header = reader.read_header()?;
        let length = header.length as usize;
        let mut chunk = reader.sub_reader(length)?;
        match header.tag {
            CHUNK_PNTS => state.read_points(&mut chunk, header.length)?,
            CHUNK_VMAP => state.read_vertex_map(&mut chunk)?,
            CHUNK_POLS => state.read_polygons(&mut chunk)?,
            _ => debug!("Skipping {} chunk ({} bytes)", tag_name(&header.tag), length),
        }

        // A final odd chunk may omit its pad byte; the seek clamps to the end.
        let pad = length & 1;
        reader.seek(reader.position() + length + pad);
    }

    let mesh = state.mesh;
    if mesh.is_empty() {
        return Err(FormatError::EmptyMesh.into());
    }
    info!(
        "Decoded {} points, {} polygons, {} edges",
        mesh.point_count(),
        mesh.polygon_count(),
        mesh.edge_count()
    );
    Ok(mesh)
}

#[derive(Default)]
struct DecodeState {
    mesh: Mesh,
    // Local index -> handle for the latest PNTS chunk
    points: Option<Vec<PointId>>,
    // Pending texture coordinates, tagged with the local index they were declared for
    uvs: HashMap<PointId, Vec<(u32, [f32; 2])>>,
}

impl DecodeState {
    fn lookup(points: &[PointId], index: u32) -> Result<PointId, FormatError> {
        points
            .get(index as usize)
            .copied()
            .ok_or(FormatError::IndexOutOfRange {
                index,
                len: points.len(),
            })
    }

    fn read_points(&mut self, chunk: &mut ChunkReader, length: u32) -> Result<(), FormatError> {
        if length % POINT_RECORD_SIZE != 0 {
            return Err(FormatError::InvalidChunkLength {
                tag: CHUNK_PNTS,
                length,
            });
        }

        let count = (length / POINT_RECORD_SIZE) as usize;
        let mut ids = Vec::with_capacity(count);
        let mut unique = 0;
        for _ in 0..count {
            let x = chunk.read_f32()?;
            let y = chunk.read_f32()?;
            let z = chunk.read_f32()?;
            let (id, created) = self.mesh.insert_point(Float3::new(x, y, -z));
            if created {
                unique += 1;
            }
            ids.push(id);
        }

        info!("Read {} points ({} unique)", count, unique);
        self.points = Some(ids);
        Ok(())
    }

    fn read_vertex_map(&mut self, chunk: &mut ChunkReader) -> Result<(), FormatError> {
        let points = self
            .points
            .as_deref()
            .ok_or(FormatError::MissingPoints { tag: CHUNK_VMAP })?;

        let kind = chunk.read_tag()?;
        let dimension = chunk.read_u16()?;
        if kind != VMAP_TXUV || dimension != 2 {
            debug!("Skipping VMAP {} (dimension {})", tag_name(&kind), dimension);
            return Ok(());
        }

        let name = chunk.read_string()?;
        let mut count = 0;
        while chunk.has_data() {
            let index = chunk.read_vx()?;
            let u = chunk.read_f32()?;
            let v = chunk.read_f32()?;
            let point = Self::lookup(points, index)?;
            self.uvs.entry(point).or_default().push((index, [u, v]));
            count += 1;
        }

        debug!("Read {} texture coordinates from map {:?}", count, name);
        Ok(())
    }

    fn read_polygons(&mut self, chunk: &mut ChunkReader) -> Result<(), FormatError> {
        let points = self
            .points
            .as_deref()
            .ok_or(FormatError::MissingPoints { tag: CHUNK_POLS })?;

        let kind = chunk.read_tag()?;
        if kind != POLS_FACE {
            return Err(FormatError::UnsupportedPolygonType { found: kind });
        }

        let mut polygons = Vec::new();
        while chunk.has_data() {
            let count = chunk.read_u16()? & POLYGON_COUNT_MASK;
            if count != 3 {
                return Err(FormatError::NonTriangle { count });
            }

            let mut vertices = [PolygonVertex::new(PointId::new(0), None); 3];
            for slot in &mut vertices {
                let index = chunk.read_vx()?;
                let point = Self::lookup(points, index)?;
                *slot = PolygonVertex::new(point, self.uv_for(point, index));
            }
            polygons.push(Polygon { vertices });
        }

        for polygon in &polygons {
            for vertex in &polygon.vertices {
                self.uvs.remove(&vertex.point);
            }
        }

        let count = polygons.len();
        let mut edges = 0;
        for polygon in polygons {
            let id = self.mesh.add_polygon(polygon);
            edges += self.mesh.connect_polygon(id);
        }

        info!("Read {} polygons ({} new edges)", count, edges);
        Ok(())
    }

    /// Only an entry declared for the same local index counts. A merged
    /// duplicate referenced through another index has no coordinate.
    fn uv_for(&self, point: PointId, index: u32) -> Option<[f32; 2]> {
        self.uvs
            .get(&point)?
            .iter()
            .find(|(declared, _)| *declared == index)
            .map(|&(_, uv)| uv)
    }
}
