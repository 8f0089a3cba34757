pub mod depth;
pub mod draw;
