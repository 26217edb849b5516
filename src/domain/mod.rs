pub mod constants;
pub mod crypto;
pub mod material;
pub mod types;
pub mod verification;
