//! One compilation rule per intent, grouped by intent family.

pub mod clock;
pub mod custom;
pub mod link;
pub mod message;
pub mod slide;
pub mod stage;
pub mod timeline;
