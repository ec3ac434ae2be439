//! Gesture-driven soft-body engine for an interactive slime mascot.
//!
//! `slimy` turns drag, fling and pinch gestures into per-frame visual
//! transforms for one or two jelly-like bodies: the body lags behind the
//! finger on a spring, flings with momentum, bounces off the container walls
//! with a doughy squash, and can be pinched apart into two halves that crawl
//! back together and merge.
//!
//! # Features
//!
//! - **Analytical springs**: Closed-form spring-damper (no Euler drift)
//! - **Free-body flicks**: Friction, lossy wall bounces, impact pulses
//! - **Body collisions**: Positional separation and inelastic impulses
//! - **Split/merge**: Pinch-triggered split with a crawl-and-merge reunion
//! - **Deformation mapping**: Clamped, always-finite render transforms
//! - **Observable**: Hook engine events via the `SimObserver` trait
//! - **`no_std` compatible**: Works in embedded and WASM environments
//!
//! Optional cargo features: `serde` (serialize config, commands and
//! snapshots) and `tracing` (spans and debug events from the tick loop).

#![no_std]

extern crate alloc;

pub mod float;
pub mod vec;
pub mod curve;
pub mod spring;
pub mod idle;
pub mod gesture;
pub mod bounds;
pub mod body;
pub mod physics;
pub mod collision;
pub mod split;
pub mod deform;
pub mod simulation;
pub mod observer;
pub mod config;
pub mod error;

// Re-export primary API
pub use float::Float;
pub use vec::{Vec, Scalar, Vec2};
pub use curve::Curve4;
pub use spring::{advance, Spring, Spring1D, Spring2D, SpringParams, DampingMode};
pub use idle::{IdleOscillator, IdlePhases};
pub use gesture::{BodyId, GestureCommand, GestureQueue, GestureState};
pub use bounds::{Bounds, Wall};
pub use body::{Body, BodyMode, Wobble};
pub use physics::{StepOutcome, WallHit};
pub use collision::Contact;
pub use split::{SplitMachine, SplitPhase};
pub use deform::{DeformContext, Transform};
pub use simulation::{FrameSnapshot, Simulation};
pub use config::{
    CollisionParams, DeformParams, FlickParams, IdleParams, PhysicsParams, SimConfig, SplitParams, WobbleParams,
};
pub use observer::{SimObserver, NoOpObserver};
pub use error::SimError;
