//! Narrow bus termination and width adaptation.
//!
//! This module connects the 32-bit CPU-facing protocol to the wide cache. It provides:
//! 1. **Narrow Types:** Requests, responses, status and routing tags.
//! 2. **Bridge:** Validation, lane placement, mask inversion and burst sequencing.

/// Bus-width bridge between narrow requests and line-granular cache commands.
pub mod bridge;

/// Narrow bus request and response types.
pub mod narrow;

pub use bridge::{Busy, BusWidthBridge};
pub use narrow::{NarrowRequest, NarrowResponse, RouteTag, Status};
