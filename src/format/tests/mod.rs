//! Unit tests for the label document codec.
//!
//! These tests cover document construction, validation of imported text,
//! and export/import fidelity through a keypoint store.
