// crates/darkcut-media/src/helpers/mod.rs
//
// Internal helper modules for darkcut-media.
// Not re-exported from lib.rs: these are decode/seek implementation details.

pub mod seek;
