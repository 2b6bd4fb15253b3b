//! Multi-panel graph visualization: pan, zoom, drag and force layout of sampled vertex sets,
//! grids of bucketed ones, and the edges between them, drawn on a 2D canvas.

mod bucketed;
mod color;
mod component;
mod edges;
mod entity;
mod force;
mod highlight;
mod host;
mod interaction;
mod layout;
mod map;
mod offsetter;
mod render;
mod sampled;
mod types;
mod util;
mod vertices;
mod view;

pub use component::{GraphViewCanvas, ViewRequest};
pub use map::{MapConfig, MapFilters};
pub use types::{
	AnimateSettings, AttrMeta, BucketRecord, BucketedSet, DynamicValue, EdgeBundle, EdgeRecord,
	LabelType, Menu, MenuCommand, SampledSet, Side, SideActions, VertexBindings, VertexRecord,
	VertexSet, ViewData,
};
pub use view::{ErrorReporter, LogReporter, ViewConfig, ViewError, parse_view};
