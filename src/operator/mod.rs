//! Per-record persistence operators.
//!
//! An [`Operator`] pairs one stored record with the [`EntityData`] type that
//! knows how to transcode it. Models hold an operator once saved or loaded
//! and route every read and write through it; the standalone entry points
//! ([`Operator::create`], [`Operator::retrieve_one`], [`Operator::find_all`])
//! cover the record-level operations that exist before any model is bound.

mod data;
mod operator;

pub use data::EntityData;
pub use operator::Operator;
