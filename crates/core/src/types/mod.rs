//! Core types for HuertoHogar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod comment;
pub mod email;
pub mod id;
pub mod price;
pub mod rut;
pub mod status;

pub use comment::{CommentBody, CommentBodyError, Rating, RatingError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::Clp;
pub use rut::{Rut, RutError};
pub use status::*;
