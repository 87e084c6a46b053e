pub mod signer {
    pub mod jwt;
}
pub mod tokener {
    pub mod jwt;
}
