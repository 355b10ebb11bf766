pub mod concat;
pub mod db;
pub mod eval;
pub mod render;
