pub mod grants;
pub mod wallet;
