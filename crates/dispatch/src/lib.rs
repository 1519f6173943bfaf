//! Broadcast dispatch core.
//!
//! Takes one logical message and a snapshot of registered recipients, plans
//! provider-grouped batches, drives them through the delivery client under a
//! fixed concurrency cap, and folds the per-batch outcomes into a single
//! run summary. There is no queue and no retry store behind this: a batch
//! either lands within its timeout or contributes nothing.

pub mod coordinator;
pub mod planner;
pub mod provider;
