//! Settings for encore: schema types plus layered loading (defaults,
//! `config.toml`, `ENCORE__*` environment variables).

mod load;
mod schema;

pub use schema::*;
