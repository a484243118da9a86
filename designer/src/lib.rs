//! Interaction core for the certificate designer.
//!
//! This crate is compiled to WebAssembly for the browser and linked natively
//! by the cloud crate. It owns everything the editor does between two
//! explicit save/load actions: the fixed slot layout of the certificate,
//! the drag gesture that moves signature blocks around the canvas, the
//! certificate text, and the background asset selection. Nothing here
//! performs I/O; the host wires DOM events in and renders what comes out.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | Top-level [`editor::Editor`] aggregate and the [`editor::Action`]s it emits |
//! | [`drag`] | Pointer gesture state machine for repositioning slots |
//! | [`layout`] | Layout value and the [`layout::LayoutStore`] that owns it |
//! | [`slot`] | The closed set of draggable anchors |
//! | [`position`] | Canvas coordinates |
//! | [`content`] | Certificate text fields and literal-text helpers |
//! | [`background`] | Background assets, presets and style themes |
//! | [`request`] | In-flight gates for async requests issued by the host |
//! | [`bindings`] | `wasm-bindgen` handle for the browser host |
//! | [`consts`] | Canvas size, layout ranges and defaults |

pub mod background;
pub mod bindings;
pub mod consts;
pub mod content;
pub mod drag;
pub mod editor;
pub mod layout;
pub mod position;
pub mod request;
pub mod slot;
