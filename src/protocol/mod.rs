// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Host request protocol. Transport agnostic: feed bytes in, frame responses out.

pub mod messages;
pub mod parser;

pub use messages::{Request, Response, StatusCode};
pub use parser::Parser;
