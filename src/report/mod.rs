//! Report presentation.
//!
//! Rendering only; counts and grouping come from
//! [`InstallReport`](crate::reconciler::InstallReport).

pub mod json;
pub mod text;
