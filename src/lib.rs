//! # mesa-viz: Interactive Charts for Stellar-Evolution History Logs
//!
//! mesa-viz parses MESA-style history logs (a two-line scalar header
//! followed by a whitespace-delimited numeric table), aligns several runs
//! onto the field vocabulary they share, and emits one static HTML document
//! with an interactive chart: axis-field dropdowns, per-axis scale
//! switching, marker and series visibility toggles, and a reset control.
//!
//! Chart rendering is delegated to a browser plotting library loaded from
//! its CDN; this crate only produces the data sources, the control markup
//! and the wiring script. The rendering backend sits behind a narrow
//! interface (named numeric columns and axis selections in, an embeddable
//! document out) and is swappable via a custom page skeleton.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use mesa_viz::{PlotMode, Plotter};
//!
//! // Compare every run found under two model directories
//! let plotter = Plotter::builder()
//!     .root("runs/model_a")
//!     .root("runs/model_b")
//!     .mode(PlotMode::Multiple)
//!     .build()?;
//!
//! plotter.plot()?.save("plot.html")?;
//! # Ok::<(), mesa_viz::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod align;
pub mod error;
pub mod history;
pub mod plotter;
pub mod render;

pub use error::{Error, Result};
pub use plotter::{Page, Plotter, PlotterBuilder};

/// Comparison mode for a generated plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMode {
    /// One record, no legend
    Single,
    /// Several independent records, one legend entry per record
    Multiple,
    /// Two paired records (a binary system) with per-series visibility
    /// toggles and a header-derived caption
    Binary,
}
