pub mod compact;
pub mod instructions;
pub mod payload;
