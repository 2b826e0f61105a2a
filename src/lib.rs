//! lwotrack - track paths recovered from LightWave LWO2 tube meshes.
//!
//! # Architecture
//!
//! Layered modules with inward-only dependencies:
//!
//! - **math**: Vector and quaternion primitives (Float3, Quaternion)
//! - **mesh**: Point/polygon arena with neighbour adjacency
//! - **lwo**: LWO2 chunk decoding into a mesh
//! - **ring**: Cross-section ring detection, alignment and walking
//! - **track**: Track assembly and arc-length interpolation
//! - **ffi**: C FFI bindings
//!
//! # Usage
//!
//! ```ignore
//! use lwotrack::{lwo, DecodeOptions};
//!
//! let model = lwo::load_file("coaster.lwo", &DecodeOptions::default())?;
//! for track in &model.tracks {
//!     let samples = track.resample(0.5)?;
//! }
//! ```
//!
//! For C/C#/Unity, link the cdylib and use the `lwo_*` FFI functions.

pub mod error;
pub mod lwo;
pub mod math;
pub mod mesh;
pub mod options;
pub mod ring;
pub mod track;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types at crate root
pub use error::{Error, FormatError, TopologyError};
pub use lwo::LwoModel;
pub use math::{Float3, Quaternion};
pub use mesh::{Mesh, PointId};
pub use options::DecodeOptions;
pub use ring::Ring;
pub use track::{PathInterpolator, PathSample, Track};
