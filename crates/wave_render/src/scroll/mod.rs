pub mod buffer;
pub mod layout;
pub mod velocity;
