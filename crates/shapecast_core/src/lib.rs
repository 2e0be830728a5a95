//! Runtime structural casts and native materialization for JSON-like values.

/// Value model, record shapes, structural casts, and native materialization.
pub mod cast;
