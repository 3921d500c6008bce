//! Runtime values for IB pseudocode.
//!
//! This crate is the object model the parser, evaluator and standard library
//! build on. It defines:
//!
//! - [`TypeId`]: the discriminant, `Integer | Real | String | Boolean | List`
//! - [`Value`]: the tagged union pairing a discriminant with its payload
//! - [`List`]: an owning, doubly-linked sequence of values
//! - [`Error`]: allocation failure, type mismatch, index out of range
//!
//! Strings are [`StrBuf`]s from `ibpc-str-buf`, re-exported here.
//!
//! # Ownership
//!
//! Every payload has exactly one owner. Building a string or list value moves
//! the buffer or list into it; pushing onto a list moves the element into its
//! node; removing from a list moves the element back out to the caller.
//! Copies are always deep ([`Value::try_clone`]). Storage is released exactly
//! once, either by an explicit `destroy`/`release` or when the owner is
//! dropped.
//!
//! # Allocators
//!
//! Values are generic over an [`Allocator`](allocator_api2::alloc::Allocator)
//! and default to the global one. Strings and list nodes inside a value use
//! the same allocator as the value itself, which lets a
//! [`TrackingAlloc`](ibpc_str_buf::tracking::TrackingAlloc) observe every
//! allocation a value tree makes.
//!
//! # Threads
//!
//! Nothing here is synchronized. A value may be moved to another thread (when
//! its allocator allows), but concurrent access must be serialized by the
//! caller.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

extern crate alloc;

mod error;
mod list;
mod type_id;
mod value;

pub use error::Error;
pub use ibpc_str_buf::{AllocationError, GrowthPolicy, StrBuf};
pub use list::{IntoIter, Iter, List};
pub use type_id::TypeId;
pub use value::Value;
