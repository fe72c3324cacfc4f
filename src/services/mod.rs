pub mod lifecycle;
pub mod prompt;
pub mod renderer;
pub mod worker;
