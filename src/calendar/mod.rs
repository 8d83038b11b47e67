//! Calendar event aggregation & navigation
//!
//! Two independently-updating sources, user-created events (live
//! subscription) and project deadlines (one-shot fetch), merge into a
//! single partitioned event store that the frontend widget renders.
//! Navigation is a pure date/view state machine; presentation is a pure
//! event-to-style projection.

pub mod feed;
pub mod merge;
pub mod navigation;
pub mod presentation;
pub mod source;
