pub mod chip;
pub mod db;
pub mod geom;
pub mod util;
