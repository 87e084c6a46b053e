pub mod analysis;
pub mod common;
pub mod practice;
pub mod question;
pub mod response;
pub mod score;
