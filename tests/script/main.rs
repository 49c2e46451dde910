//! Integration tests for Layer 2: Script
//!
//! Tests for live handles, the reference codec, and the Lua surface.

mod bindings;
mod codec;
