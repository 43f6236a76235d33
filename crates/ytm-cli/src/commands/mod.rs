pub mod interactive;
pub mod yields;
