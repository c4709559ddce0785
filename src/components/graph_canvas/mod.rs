//! Canvas visualization of an argument graph.
//!
//! Renders claims as labelled boxes colored by type and relations as arrows
//! colored by kind, with:
//! - Layered placement for new claims and a short settling simulation
//! - Pan, zoom, claim dragging and click selection
//! - An edge mode in which dragging between claims proposes a relation
//!
//! # Example
//!
//! ```ignore
//! view! {
//!     <GraphCanvas
//!         elements=elements
//!         selection=selection
//!         edge_mode=edge_mode
//!         zoom_sensitivity=1.0
//!         pan_sensitivity=1.0
//!         on_node_select=move |id| select_node(id)
//!         on_edge_select=move |id| select_edge(id)
//!         on_connect=move |(source, target)| connect(source, target)
//!         on_clear=move |_| clear()
//!     />
//! }
//! ```

mod component;
mod layout;
mod render;
pub mod scale;
mod state;
pub mod theme;

pub use component::GraphCanvas;
pub use theme::Theme;
