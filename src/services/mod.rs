pub mod audit;
pub mod auth;
pub mod id_codec;
