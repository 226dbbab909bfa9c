pub mod client;
pub mod entrance;
pub mod remote_resource;
pub mod states;
