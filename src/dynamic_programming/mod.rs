pub mod bellman;
pub mod finite;
pub mod infinite;
pub mod model;
pub mod observer;
pub mod reward;
