// SPDX-License-Identifier: MIT OR Apache-2.0
/*
 * PLDM firmware update agent: package component access
 *
 * Copyright (c) 2025 Code Construct
 */

//! Firmware package component tables and byte source.
//!
//! The package header has already been parsed by the time an update session
//! starts; the updater works from the component image table, the matching
//! firmware device ID record, and random access reads of the package
//! contents.

use std::collections::HashMap;
use std::os::unix::fs::FileExt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PldmPackageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

type Result<T> = std::result::Result<T, PldmPackageError>;

/// One entry of the package component image table.
#[derive(Debug, Clone)]
pub struct ComponentImageInfo {
    pub classification: u16,
    pub identifier: u16,
    pub comparison_stamp: u32,
    /// Component options bitmap; bit 0 requests a forced update.
    pub options: u16,
    /// Byte offset of the image within the package.
    pub file_offset: u64,
    /// Image size in bytes.
    pub size: u32,
    pub version: String,
}

impl ComponentImageInfo {
    pub fn force_update(&self) -> bool {
        self.options & 0x0001 != 0
    }
}

/// Firmware device ID record matched against the target device.
///
/// Immutable for the lifetime of an update session.
#[derive(Debug, Clone, Default)]
pub struct FirmwareDeviceIdRecord {
    /// Indices into the component image table, in update order.
    pub applicable_components: Vec<usize>,
    /// Opaque blob forwarded to the device with RequestUpdate.
    pub package_data: Vec<u8>,
    pub image_set_version: String,
}

/// Key for [`ComponentInfoMap`]: (classification, identifier).
pub type ComponentKey = (u16, u16);

/// Classification index per component, learned from the device's firmware
/// parameters during discovery.
pub type ComponentInfoMap = HashMap<ComponentKey, u8>;

/// Random access byte source for package contents.
///
/// Reads are synchronous and positional; each update session keeps its own
/// cursor, so a single source may back several sessions.
pub trait PackageSource {
    /// Reads up to `buf.len()` bytes at `offset`, returning the count read.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize>;
}

impl PackageSource for std::fs::File {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        FileExt::read_at(self, buf, offset)
    }
}

impl PackageSource for Vec<u8> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> std::io::Result<usize> {
        let start = (offset as usize).min(self.len());
        let src = &self[start..];
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }
}

/// Reads component image bytes starting `offset` bytes into the component.
pub fn read_component(
    source: &dyn PackageSource,
    component: &ComponentImageInfo,
    offset: u32,
    buf: &mut [u8],
) -> Result<usize> {
    let file_offset = component.file_offset + offset as u64;
    Ok(source.read_at(file_offset, buf)?)
}
