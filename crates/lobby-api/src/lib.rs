pub mod chat;
pub mod error;
pub mod function;
pub mod news;
pub mod profile;
pub mod request;
pub mod routes;

mod time;

#[cfg(test)]
pub(crate) mod testing;
