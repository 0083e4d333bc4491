//! Domain layer for partner promo-code limits.
//!
//! This crate provides:
//! - the `Partner` aggregate and its ordered history of `PromoCodeLimit`s
//! - the `PartnerRepository` contract and a store-backed implementation
//! - `PartnerLimitService`, which sets and cancels limits against the repository

pub mod aggregate;
pub mod error;
pub mod partner;
pub mod repository;

pub use aggregate::Aggregate;
pub use common::{LimitId, PartnerId};
pub use error::DomainError;
pub use partner::{
    CancelPartnerLimit, ErrorKind, LimitCancelled, LimitChange, LimitSet, Partner, PartnerError,
    PartnerLimitService, PromoCodeLimit, SetPartnerLimit,
};
pub use repository::{AggregateRepository, PartnerRepository};
