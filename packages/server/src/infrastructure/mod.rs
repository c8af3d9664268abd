//! Infrastructure layer: concrete implementations of the domain trait
//! seams, plus the wire DTOs.

pub mod delivery;
pub mod dto;
pub mod repository;
