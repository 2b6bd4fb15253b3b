use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// An attribute value as the backend sends it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicValue {
	pub defined: bool,
	pub double: Option<f64>,
	pub string: Option<String>,
	pub x: Option<f64>,
	pub y: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VertexRecord {
	pub id: String,
	pub attrs: HashMap<String, DynamicValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampledSet {
	pub vertices: Vec<VertexRecord>,
}

/// One grid cell: bucket indices and the number of vertices in it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketRecord {
	pub x: usize,
	pub y: usize,
	pub size: f64,
}

/// Whether axis labels sit on bucket boundaries or bucket centers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelType {
	Between,
	#[default]
	Center,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BucketedSet {
	pub vertices: Vec<BucketRecord>,
	pub x_labels: Vec<String>,
	pub y_labels: Vec<String>,
	pub x_label_type: LabelType,
	pub y_label_type: LabelType,
	pub x_filters: Vec<String>,
	pub y_filters: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum VertexSet {
	Sampled(SampledSet),
	Bucketed(BucketedSet),
}

impl VertexSet {
	pub fn mode(&self) -> Mode {
		match self {
			VertexSet::Sampled(_) => Mode::Sampled,
			VertexSet::Bucketed(_) => Mode::Bucketed,
		}
	}
}

/// Rendering mode of a panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
	Sampled,
	Bucketed,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeRecord {
	pub a: usize,
	pub b: usize,
	pub size: f64,
	pub attrs: HashMap<String, DynamicValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeBundle {
	pub src_idx: usize,
	pub dst_idx: usize,
	pub edges: Vec<EdgeRecord>,
	#[serde(rename = "layout3D")]
	pub layout_3d: Option<serde_json::Value>,
}

/// The payload of one redraw: one vertex set per visible panel, plus edge bundles.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewData {
	pub vertex_sets: Vec<VertexSet>,
	pub edge_bundles: Vec<EdgeBundle>,
}

/// An attribute bound to a visual channel.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttrMeta {
	pub id: String,
	pub title: String,
	pub type_name: String,
}

/// An edge attribute with the aggregator used to combine parallel edges.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregatedAttr {
	pub id: String,
	pub title: String,
	pub type_name: String,
	pub aggregator: String,
}

impl AggregatedAttr {
	/// Key of the aggregated value in edge records.
	pub fn key(&self) -> String {
		format!("{}:{}", self.id, self.aggregator)
	}

	pub fn meta(&self) -> AttrMeta {
		AttrMeta {
			id: self.key(),
			title: self.title.clone(),
			type_name: self.type_name.clone(),
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VertexBindings {
	pub label: Option<AttrMeta>,
	pub size: Option<AttrMeta>,
	pub label_size: Option<AttrMeta>,
	pub color: Option<AttrMeta>,
	pub label_color: Option<AttrMeta>,
	pub opacity: Option<AttrMeta>,
	pub icon: Option<AttrMeta>,
	pub image: Option<AttrMeta>,
	pub position: Option<AttrMeta>,
	pub geo: Option<AttrMeta>,
	pub slider: Option<AttrMeta>,
}

impl VertexBindings {
	/// The bound channels as `(channel name, attribute)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AttrMeta)> {
		[
			("label", &self.label),
			("size", &self.size),
			("labelSize", &self.label_size),
			("color", &self.color),
			("labelColor", &self.label_color),
			("opacity", &self.opacity),
			("icon", &self.icon),
			("image", &self.image),
			("position", &self.position),
			("geo", &self.geo),
			("slider", &self.slider),
		]
		.into_iter()
		.filter_map(|(name, attr)| attr.as_ref().map(|a| (name, a)))
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeBindings {
	pub width: Option<AggregatedAttr>,
	pub edge_color: Option<AggregatedAttr>,
	pub edge_label: Option<AggregatedAttr>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimateSettings {
	pub enabled: bool,
	pub style: String,
	pub label_attraction: f64,
}

impl Default for AnimateSettings {
	fn default() -> Self {
		Self {
			enabled: false,
			style: "expand".into(),
			label_attraction: 0.0,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
	#[default]
	Svg,
	#[serde(rename = "3d")]
	ThreeD,
}

/// One panel's configuration. Owned by the caller and read on every redraw.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Side {
	pub vertex_set_id: String,
	pub display: DisplayMode,
	pub vertex_attrs: VertexBindings,
	pub edge_attrs: EdgeBindings,
	pub x_attribute: Option<AttrMeta>,
	pub y_attribute: Option<AttrMeta>,
	pub centers: Vec<String>,
	pub animate: Option<AnimateSettings>,
	pub slider_pos: f64,
	pub has_parent: bool,
	pub parent_segment_filter: Option<String>,
	pub has_segmentation: bool,
	pub segmentation_parent_filter: Option<String>,
	pub vertex_filters: BTreeMap<String, String>,
}

/// Mutations the engine requests from the caller's panel state.
pub trait SideActions {
	fn has_center(&self, id: &str) -> bool;
	fn center_count(&self) -> usize;
	fn add_center(&mut self, id: &str);
	fn remove_center(&mut self, id: &str);
	fn set_center(&mut self, id: &str);
	fn has_parent(&self) -> bool;
	fn is_parent_filtered_to_segment(&self, id: &str) -> bool;
	fn filter_parent_to_segment(&mut self, id: &str);
	fn delete_parents_segment_filter(&mut self);
	fn has_segmentation(&self) -> bool;
	fn is_segmentation_filtered_to_parent(&self, id: &str) -> bool;
	fn filter_segmentation_to_parent(&mut self, id: &str);
	fn delete_segmentations_parent_filter(&mut self);
	fn set_vertex_filter(&mut self, title: &str, filter: &str);
}

impl SideActions for Side {
	fn has_center(&self, id: &str) -> bool {
		self.centers.iter().any(|c| c == id)
	}

	fn center_count(&self) -> usize {
		self.centers.len()
	}

	fn add_center(&mut self, id: &str) {
		if !self.has_center(id) {
			self.centers.push(id.into());
		}
	}

	fn remove_center(&mut self, id: &str) {
		self.centers.retain(|c| c != id);
	}

	fn set_center(&mut self, id: &str) {
		self.centers = vec![id.into()];
	}

	fn has_parent(&self) -> bool {
		self.has_parent
	}

	fn is_parent_filtered_to_segment(&self, id: &str) -> bool {
		self.parent_segment_filter.as_deref() == Some(id)
	}

	fn filter_parent_to_segment(&mut self, id: &str) {
		self.parent_segment_filter = Some(id.into());
	}

	fn delete_parents_segment_filter(&mut self) {
		self.parent_segment_filter = None;
	}

	fn has_segmentation(&self) -> bool {
		self.has_segmentation
	}

	fn is_segmentation_filtered_to_parent(&self, id: &str) -> bool {
		self.segmentation_parent_filter.as_deref() == Some(id)
	}

	fn filter_segmentation_to_parent(&mut self, id: &str) {
		self.segmentation_parent_filter = Some(id.into());
	}

	fn delete_segmentations_parent_filter(&mut self) {
		self.segmentation_parent_filter = None;
	}

	fn set_vertex_filter(&mut self, title: &str, filter: &str) {
		self.vertex_filters.insert(title.into(), filter.into());
	}
}

/// Reference to a vertex: panel (side) index and position in its collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRef {
	pub side: usize,
	pub index: usize,
}

/// What a context-menu action does when picked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum MenuCommand {
	AddCenter { side: usize, id: String },
	RemoveCenter { side: usize, id: String },
	SetCenter { side: usize, id: String },
	FilterParentToSegment { side: usize, id: String },
	DeleteParentsSegmentFilter { side: usize },
	FilterSegmentationToParent { side: usize, id: String },
	DeleteSegmentationsParentFilter { side: usize },
	SetVertexFilters { side: usize, filters: Vec<(String, String)> },
	Freeze(VertexRef),
	Unfreeze(VertexRef),
}

impl MenuCommand {
	/// The panel whose `Side` the command mutates, if any.
	pub fn side(&self) -> Option<usize> {
		match self {
			MenuCommand::AddCenter { side, .. }
			| MenuCommand::RemoveCenter { side, .. }
			| MenuCommand::SetCenter { side, .. }
			| MenuCommand::FilterParentToSegment { side, .. }
			| MenuCommand::DeleteParentsSegmentFilter { side }
			| MenuCommand::FilterSegmentationToParent { side, .. }
			| MenuCommand::DeleteSegmentationsParentFilter { side }
			| MenuCommand::SetVertexFilters { side, .. } => Some(*side),
			MenuCommand::Freeze(_) | MenuCommand::Unfreeze(_) => None,
		}
	}

	/// Applies a side mutation. Returns `false` for engine-local commands.
	pub fn apply_to(&self, side: &mut impl SideActions) -> bool {
		match self {
			MenuCommand::AddCenter { id, .. } => side.add_center(id),
			MenuCommand::RemoveCenter { id, .. } => side.remove_center(id),
			MenuCommand::SetCenter { id, .. } => side.set_center(id),
			MenuCommand::FilterParentToSegment { id, .. } => side.filter_parent_to_segment(id),
			MenuCommand::DeleteParentsSegmentFilter { .. } => side.delete_parents_segment_filter(),
			MenuCommand::FilterSegmentationToParent { id, .. } => {
				side.filter_segmentation_to_parent(id)
			}
			MenuCommand::DeleteSegmentationsParentFilter { .. } => {
				side.delete_segmentations_parent_filter()
			}
			MenuCommand::SetVertexFilters { filters, .. } => {
				for (title, filter) in filters {
					side.set_vertex_filter(title, filter);
				}
			}
			MenuCommand::Freeze(_) | MenuCommand::Unfreeze(_) => return false,
		}
		true
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuAction {
	pub title: String,
	pub command: MenuCommand,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuData {
	pub header: Option<String>,
	#[serde(rename = "type")]
	pub kind: Option<String>,
	pub id: Option<String>,
	pub actions: Vec<MenuAction>,
	pub attributes: Option<BTreeMap<String, String>>,
}

/// The context menu model shared with the caller's UI.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Menu {
	pub x: f64,
	pub y: f64,
	pub enabled: bool,
	pub data: Option<MenuData>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_backend_payload() {
		let json = r#"{
			"vertexSets": [
				{"mode": "sampled", "vertices": [
					{"id": "1", "attrs": {"a": {"defined": true, "double": 2.0, "string": "2"}}}
				]},
				{"mode": "bucketed", "vertices": [{"x": 0, "y": 1, "size": 3}],
				 "xLabels": ["a", "b"], "xLabelType": "between", "yFilters": ["f"]}
			],
			"edgeBundles": [{"srcIdx": 0, "dstIdx": 1, "edges": [{"a": 0, "b": 0, "size": 1}]}]
		}"#;
		let data: ViewData = serde_json::from_str(json).unwrap();
		assert_eq!(data.vertex_sets[0].mode(), Mode::Sampled);
		let VertexSet::Bucketed(b) = &data.vertex_sets[1] else {
			panic!("expected bucketed set");
		};
		assert_eq!(b.x_label_type, LabelType::Between);
		assert_eq!(b.y_label_type, LabelType::Center);
		assert_eq!(data.edge_bundles[0].dst_idx, 1);
	}

	#[test]
	fn side_commands_mutate_centers() {
		let mut side = Side::default();
		let add = MenuCommand::AddCenter { side: 0, id: "7".into() };
		assert!(add.apply_to(&mut side));
		add.apply_to(&mut side);
		assert_eq!(side.centers, vec!["7".to_string()]);
		MenuCommand::SetCenter { side: 0, id: "8".into() }.apply_to(&mut side);
		assert_eq!(side.centers, vec!["8".to_string()]);
		assert!(!MenuCommand::Freeze(VertexRef { side: 0, index: 0 }).apply_to(&mut side));
	}
}
