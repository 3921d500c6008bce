//! IBPC - runtime values for IB pseudocode
//!
//! # Overview
//!
//! This crate is the value substrate an IB pseudocode interpreter runs on. It
//! gathers the pieces that live in separate workspace crates:
//!
//! - [`Value`] and [`TypeId`]: the tagged union every runtime datum is stored in
//! - [`List`]: the owning, doubly-linked sequence behind pseudocode collections
//! - [`StrBuf`]: the growable byte string behind pseudocode strings
//! - [`Error`]: what can go wrong while building or inspecting values
//!
//! # Quick Start
//!
//! ```
//! use ibpc::{Error, TypeId, Value};
//!
//! let mut scores = Value::empty_list();
//! scores.push_back(Value::integer(90))?;
//! scores.push_back(Value::string_from("absent")?)?;
//! scores.push_back(Value::real(72.5))?;
//! assert_eq!(scores.to_string(), r#"[90, "absent", 72.5]"#);
//!
//! let absent = scores.remove(1)?;
//! assert_eq!(absent.type_id(), TypeId::String);
//! assert_eq!(
//!     absent.as_integer(),
//!     Err(Error::TypeMismatch { expected: TypeId::Integer, found: TypeId::String })
//! );
//! # Ok::<(), Error>(())
//! ```
//!
//! # Watching allocations
//!
//! Every container is generic over an allocator. Handing the same
//! [`TrackingAlloc`](str_buf::tracking::TrackingAlloc) to a whole value tree
//! makes leaks visible:
//!
//! ```
//! use ibpc::{List, Value};
//! use ibpc::str_buf::tracking::TrackingAlloc;
//!
//! let alloc = TrackingAlloc::new();
//! let mut list = List::new_in(alloc.clone());
//! list.push_back(Value::integer(1))?;
//! list.push_back(Value::empty_list_in(alloc.clone()))?;
//! assert!(!alloc.stats().is_balanced());
//!
//! list.destroy();
//! assert!(alloc.stats().is_balanced());
//! # Ok::<(), ibpc::Error>(())
//! ```

pub use ibpc_str_buf as str_buf;
pub use ibpc_values::{
    AllocationError, Error, GrowthPolicy, IntoIter, Iter, List, StrBuf, TypeId, Value,
};
