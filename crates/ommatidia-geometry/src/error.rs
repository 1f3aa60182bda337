// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for lattice construction and queries

/// Result type for geometry operations
pub type GeometryResult<T> = Result<T, GeometryError>;

/// Errors that can occur while building or querying the lattice
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Invalid ring {ring}: neighbor lookup needs ring >= 1")]
    InvalidRing { ring: u32 },

    #[error("Local id {local} out of range for ring {ring} (ring size {size})")]
    LocalIdOutOfRange { ring: u32, local: u32, size: u32 },

    #[error("No rule in {table} covers sextant {sextant}, residue {residue} on ring {ring}")]
    UncoveredSextant {
        table: &'static str,
        ring: u32,
        sextant: u32,
        residue: u32,
    },

    #[error("Rule in {table} moves {ring_delta} rings from ring {ring}, below the center")]
    RingUnderflow {
        table: &'static str,
        ring: u32,
        ring_delta: i8,
    },

    #[error("coord attribute must be one of {valid}, got '{given}'")]
    UnknownCoordinateSystem { given: String, valid: String },

    #[error("include attribute must be one of {valid}, got '{given}'")]
    UnknownSubset { given: String, valid: String },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}
