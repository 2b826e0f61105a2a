//! Handle-based C FFI for lwotrack.
//!
//! Functions:
//! - `lwo_load` / `lwo_free` - decode a buffer into a model handle
//! - `lwo_track_count` / `lwo_track_info` - inspect the tracks found
//! - `lwo_track_resample` - walk a track at a fixed step
//! - `lwo_track_rings` - one sample per ring, no interpolation
//!
//! # Error Codes
//! - `0`: Success
//! - `-1`: Null pointer
//! - `-2`: Invalid argument (track index, step)
//! - `-3`: Buffer overflow (resize and retry)
//! - `-5`: Invalid format
//! - `-7`: Mesh is not a tube
//! - `-8`: Unsupported host byte order

use crate::error::Error;
use crate::lwo::{self, LwoModel};
use crate::options::DecodeOptions;
use crate::track::{PathSample, Track};

/// Opaque handle to a loaded model.
pub type LwoModelHandle = *mut std::ffi::c_void;

/// Sample layout shared with the caller.
pub type LwoSample = PathSample;

#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct LwoTrackInfo {
    pub ring_count: i32,
    pub chain_count: i32,
    pub looped: i32,
    pub total_length: f32,
}

fn error_code(err: &Error) -> i32 {
    match err {
        Error::InvalidArgument(_) => -2,
        Error::Format(_) | Error::Io(_) => -5,
        Error::Topology(_) => -7,
        Error::UnsupportedHost => -8,
    }
}

/// Decode an LWO2 buffer and assemble its tracks.
///
/// # Safety
/// - `data` must point to a valid buffer of at least `data_len` bytes
/// - `out_handle` must be a valid pointer; it receives null on error
#[no_mangle]
pub unsafe extern "C" fn lwo_load(
    data: *const u8,
    data_len: usize,
    out_handle: *mut LwoModelHandle,
) -> i32 {
    if data.is_null() || out_handle.is_null() {
        return -1;
    }
    *out_handle = std::ptr::null_mut();
    if data_len == 0 {
        return -2;
    }

    let bytes = std::slice::from_raw_parts(data, data_len);
    match lwo::load(bytes, "", &DecodeOptions::default()) {
        Ok(model) => {
            *out_handle = Box::into_raw(Box::new(model)) as LwoModelHandle;
            0
        }
        Err(err) => {
            log::debug!("lwo_load failed: {}", err);
            error_code(&err)
        }
    }
}

/// Free a model handle.
///
/// # Safety
/// - `handle` must be a valid handle returned by `lwo_load`, or null
#[no_mangle]
pub unsafe extern "C" fn lwo_free(handle: LwoModelHandle) {
    if !handle.is_null() {
        drop(Box::from_raw(handle as *mut LwoModel));
    }
}

/// Number of tracks, or `-1` for a null handle.
///
/// # Safety
/// - `handle` must be a valid handle from `lwo_load`, or null
#[no_mangle]
pub unsafe extern "C" fn lwo_track_count(handle: LwoModelHandle) -> i32 {
    if handle.is_null() {
        return -1;
    }
    let model = &*(handle as *const LwoModel);
    model.tracks.len() as i32
}

unsafe fn track_at<'a>(handle: LwoModelHandle, index: usize) -> Result<&'a Track, i32> {
    if handle.is_null() {
        return Err(-1);
    }
    let model = &*(handle as *const LwoModel);
    model.tracks.get(index).ok_or(-2)
}

/// Copy samples into a caller buffer. `-3` when it is too small; `written`
/// then holds the required count.
unsafe fn copy_samples(
    samples: &[PathSample],
    out: *mut LwoSample,
    capacity: usize,
    written: *mut usize,
) -> i32 {
    *written = samples.len();
    if samples.len() > capacity {
        return -3;
    }
    if !samples.is_empty() {
        std::ptr::copy_nonoverlapping(samples.as_ptr(), out, samples.len());
    }
    0
}

/// # Safety
/// - `handle` must be a valid handle from `lwo_load`
/// - `info` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn lwo_track_info(
    handle: LwoModelHandle,
    index: usize,
    info: *mut LwoTrackInfo,
) -> i32 {
    if info.is_null() {
        return -1;
    }
    let track = match track_at(handle, index) {
        Ok(t) => t,
        Err(code) => return code,
    };

    *info = LwoTrackInfo {
        ring_count: track.rings.len() as i32,
        chain_count: track.chains.len() as i32,
        looped: i32::from(track.looped),
        total_length: track.total_length,
    };
    0
}

/// Resample a track every `step` units of arc length.
///
/// # Safety
/// - `handle` must be a valid handle from `lwo_load`
/// - `samples` must point to a buffer of at least `capacity` entries
/// - `written` must be a valid pointer
#[no_mangle]
pub unsafe extern "C" fn lwo_track_resample(
    handle: LwoModelHandle,
    index: usize,
    step: f32,
    samples: *mut LwoSample,
    capacity: usize,
    written: *mut usize,
) -> i32 {
    if samples.is_null() || written.is_null() {
        return -1;
    }
    let track = match track_at(handle, index) {
        Ok(t) => t,
        Err(code) => return code,
    };

    match track.resample(step) {
        Ok(resampled) => copy_samples(&resampled, samples, capacity, written),
        Err(err) => error_code(&err),
    }
}

/// One sample per ring of a track.
///
/// # Safety
/// Same as `lwo_track_resample`.
#[no_mangle]
pub unsafe extern "C" fn lwo_track_rings(
    handle: LwoModelHandle,
    index: usize,
    samples: *mut LwoSample,
    capacity: usize,
    written: *mut usize,
) -> i32 {
    if samples.is_null() || written.is_null() {
        return -1;
    }
    let track = match track_at(handle, index) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let model = &*(handle as *const LwoModel);
    let rings: Vec<PathSample> = track.ring_samples(&model.mesh).collect();
    copy_samples(&rings, samples, capacity, written)
}
