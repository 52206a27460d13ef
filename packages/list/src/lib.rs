#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering and pagination over the incidence collection.
//!
//! Both engines are read-only: they derive views from a borrowed
//! collection and never mutate it. The only mutable state here is the
//! current page number held by [`Paginator`].

pub mod filter;
pub mod pagination;

pub use filter::ListFilter;
pub use pagination::{Page, PageSize, Paginator, paginate};
