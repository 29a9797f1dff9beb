//! Expression Tree for Variable Expansion Templates
//!
//! This module defines the tree a template parses into.
//!
//! Architecture:
//!   Input → Parser → Expression → (consumer: resolve + render) → Output

pub mod types;
