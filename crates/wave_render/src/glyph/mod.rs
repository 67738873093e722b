pub mod atlas;
pub mod scramble;
pub mod source;
