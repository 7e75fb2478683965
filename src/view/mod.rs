//! View layer
//!
//! This module contains the presentation components.

pub mod concept_tree;
