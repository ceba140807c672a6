// crates/neoncut-core/src/helpers/mod.rs
//
// Small pure utilities shared by the editor and by any host UI.

pub mod scale;
pub mod time;
