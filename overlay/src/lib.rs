//! Site-plan overlay engine.
//!
//! Aligns an independently authored set of stand polygons onto a background
//! artwork, keeps a pan/zoom viewport over the whole scene, and arbitrates
//! hover/lock interaction between the shapes and the canvas pan gesture. The
//! host (a browser shim or the `siteplan` CLI) feeds records and raw input
//! events in and applies the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Scene assembly and the event-driven [`engine::OverlayCore`] |
//! | [`geom`] | Points, bounding boxes, point-list parsing, screen matrices |
//! | [`artwork`] | Scene tree and the artwork locator fallback chain |
//! | [`align`] | Similarity transform from polygon space onto the artwork |
//! | [`viewport`] | Pan/zoom state and screen-to-scene conversion |
//! | [`interaction`] | Hover/lock state machine and click-vs-drag classification |
//! | [`records`] | Status records, status classification, CSV/JSON decoding |
//! | [`config`] | Static configuration surface |
//! | [`render`] | SVG emission for the polygon layer |
//! | [`consts`] | Shared numeric defaults (zoom limits, click slop, etc.) |

pub mod align;
pub mod artwork;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geom;
pub mod interaction;
pub mod records;
pub mod render;
pub mod viewport;
