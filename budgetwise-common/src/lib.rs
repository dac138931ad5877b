#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod aggregate;
pub mod db;
pub mod messages;
pub mod models;
pub mod money;
pub mod period;
pub mod schema;
pub mod validators;
