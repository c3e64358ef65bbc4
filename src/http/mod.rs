//! Internal HTTP layer for Iris gateway communication.
//!
//! This module is `pub(crate)` - it contains implementation details
//! not exposed to library users.

pub(crate) mod common;
pub(crate) mod error_helpers;
pub(crate) mod gateway;
pub(crate) mod loud_wire;
