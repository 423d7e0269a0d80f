pub mod buttons;
pub mod channels;
pub mod config;
pub mod conversation;
pub mod error;
pub mod flows;
pub mod gateway;
pub mod readers;
pub mod update;

#[cfg(test)]
pub(crate) mod testing;
