//! Use-case services over the domain model and persistence layer.

pub mod day_session;
