//! Vector and orientation primitives.
//!
//! Zero-dependency value types shared by the ring geometry and the path
//! interpolator.

mod float3;
mod quaternion;

pub use float3::Float3;
pub use quaternion::Quaternion;
