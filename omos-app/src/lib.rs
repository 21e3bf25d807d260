pub mod assistant;
pub mod managers;
pub mod settings;
pub mod shell;
