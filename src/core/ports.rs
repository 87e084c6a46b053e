pub mod repository;
pub mod signer;
pub mod tokener;
