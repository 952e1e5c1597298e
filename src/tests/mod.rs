//! Scenario tests for the identity bootstrap
//!
//! This module contains test files covering the end-to-end behavior
//! driven through a scripted widget: arming, redirecting, re-arming,
//! deferred initialization, and the host callback bridge.

pub mod context_test;
