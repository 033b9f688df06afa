pub mod collaborators;
pub mod host;
pub mod repo;
