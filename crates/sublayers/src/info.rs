use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SublayerError;

/// Maximum nesting accepted for sublayer metadata. Building scene layers in the
/// wild stay within a handful of levels.
pub const MAX_DEPTH: usize = 64;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SublayerId(pub u64);

impl fmt::Display for SublayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Display tag carried by the source metadata.
///
/// This never decides whether a node behaves as a group; that is purely
/// structural (see [`SublayerTree::is_leaf`](crate::tree::SublayerTree::is_leaf)).
/// Tags outside the known set are kept verbatim in `Other`, so every tag
/// serializes back to exactly the string it was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerType {
    Group,
    Object3D,
    Point,
    IntegratedMesh,
    PointCloud,
    Building,
    Other(String),
}

impl LayerType {
    pub fn as_str(&self) -> &str {
        match self {
            LayerType::Group => "group",
            LayerType::Object3D => "3DObject",
            LayerType::Point => "point",
            LayerType::IntegratedMesh => "IntegratedMesh",
            LayerType::PointCloud => "PointCloud",
            LayerType::Building => "Building",
            LayerType::Other(tag) => tag,
        }
    }
}

impl From<String> for LayerType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "group" => LayerType::Group,
            "3DObject" => LayerType::Object3D,
            "point" => LayerType::Point,
            "IntegratedMesh" => LayerType::IntegratedMesh,
            "PointCloud" => LayerType::PointCloud,
            "Building" => LayerType::Building,
            _ => LayerType::Other(tag),
        }
    }
}

impl From<LayerType> for String {
    fn from(layer_type: LayerType) -> Self {
        match layer_type {
            LayerType::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for LayerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw sublayer metadata as delivered by the tileset service.
///
/// Children may arrive under `sublayers` (building scene layer naming) or
/// `children`; a missing list means a leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SublayerInfo {
    pub id: SublayerId,
    pub name: String,
    #[serde(rename = "layerType")]
    pub layer_type: LayerType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<bool>,
    #[serde(
        default,
        rename = "sublayers",
        alias = "children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<SublayerInfo>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expanded: bool,
}

impl SublayerInfo {
    pub fn leaf(id: u64, name: impl Into<String>, layer_type: LayerType) -> Self {
        Self {
            id: SublayerId(id),
            name: name.into(),
            layer_type,
            visibility: None,
            children: Vec::new(),
            expanded: false,
        }
    }

    pub fn group(id: u64, name: impl Into<String>, children: Vec<SublayerInfo>) -> Self {
        Self {
            id: SublayerId(id),
            name: name.into(),
            layer_type: LayerType::Group,
            visibility: None,
            children,
            expanded: false,
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visibility = Some(visible);
        self
    }

    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.expanded = expanded;
        self
    }

    pub fn from_json(payload: &str) -> Result<Self, SublayerError> {
        let info: SublayerInfo = serde_json::from_str(payload)?;
        info.validate()?;
        Ok(info)
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Rejects metadata that cannot be wrapped into a tree: repeated ids and
    /// nesting beyond [`MAX_DEPTH`].
    pub fn validate(&self) -> Result<(), SublayerError> {
        let mut seen = HashSet::new();
        let mut stack: Vec<(&SublayerInfo, usize)> = vec![(self, 1)];

        while let Some((info, depth)) = stack.pop() {
            if depth > MAX_DEPTH {
                return Err(SublayerError::TooDeep {
                    depth,
                    max: MAX_DEPTH,
                });
            }
            if !seen.insert(info.id) {
                return Err(SublayerError::DuplicateId(info.id));
            }
            for child in info.children.iter().rev() {
                stack.push((child, depth + 1));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerType, MAX_DEPTH, SublayerId, SublayerInfo};
    use crate::error::SublayerError;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_building_scene_sublayers() {
        let payload = r#"{
            "id": 0,
            "name": "Full Model",
            "layerType": "group",
            "expanded": true,
            "sublayers": [
                { "id": 1, "name": "Walls", "layerType": "3DObject", "visibility": true },
                { "id": 2, "name": "Doors", "layerType": "3DObject" }
            ]
        }"#;

        let info = SublayerInfo::from_json(payload).expect("parse");
        assert_eq!(info.id, SublayerId(0));
        assert!(info.expanded);
        assert_eq!(info.children.len(), 2);
        assert_eq!(info.children[0].visibility, Some(true));
        assert_eq!(info.children[1].visibility, None);
        assert_eq!(info.children[1].layer_type, LayerType::Object3D);
        assert!(info.children[1].children.is_empty());
    }

    #[test]
    fn accepts_children_alias_and_keeps_unrecognised_layer_type() {
        let payload = r#"{
            "id": 5,
            "name": "Site",
            "layerType": "group",
            "children": [ { "id": 6, "name": "Trees", "layerType": "Vegetation" } ]
        }"#;

        let info = SublayerInfo::from_json(payload).expect("parse");
        assert_eq!(
            info.children[0].layer_type,
            LayerType::Other("Vegetation".to_string())
        );
        assert_eq!(info.children[0].layer_type.to_string(), "Vegetation");
    }

    #[test]
    fn layer_type_tags_serialize_back_verbatim() {
        for tag in ["group", "3DObject", "point", "Point", "Vegetation", ""] {
            let layer_type = LayerType::from(tag.to_string());
            assert_eq!(layer_type.as_str(), tag);
            let json = serde_json::to_string(&layer_type).expect("serialize");
            assert_eq!(json, format!("\"{tag}\""));
        }
        assert_eq!(LayerType::from("3DObject".to_string()), LayerType::Object3D);
    }

    #[test]
    fn missing_id_is_a_parse_error() {
        let err = SublayerInfo::from_json(r#"{ "name": "x", "layerType": "group" }"#)
            .expect_err("expect parse error");
        assert!(matches!(err, SublayerError::Parse(_)));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let info = SublayerInfo::group(
            1,
            "root",
            vec![
                SublayerInfo::leaf(2, "a", LayerType::Object3D),
                SublayerInfo::group(3, "b", vec![SublayerInfo::leaf(2, "c", LayerType::Point)]),
            ],
        );

        match info.validate() {
            Err(SublayerError::DuplicateId(id)) => assert_eq!(id, SublayerId(2)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_nesting_beyond_max_depth() {
        let mut info = SublayerInfo::leaf(0, "bottom", LayerType::Object3D);
        for id in 1..=MAX_DEPTH as u64 {
            info = SublayerInfo::group(id, "level", vec![info]);
        }

        match info.validate() {
            Err(SublayerError::TooDeep { depth, max }) => {
                assert_eq!(depth, MAX_DEPTH + 1);
                assert_eq!(max, MAX_DEPTH);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn serializes_with_building_scene_field_names() {
        let info = SublayerInfo::group(
            1,
            "root",
            vec![SublayerInfo::leaf(2, "a", LayerType::Object3D).with_visibility(false)],
        )
        .with_expanded(true);

        let json = serde_json::to_value(&info).expect("serialize");
        assert_eq!(json["layerType"], "group");
        assert_eq!(json["expanded"], true);
        assert_eq!(json["sublayers"][0]["layerType"], "3DObject");
        assert_eq!(json["sublayers"][0]["visibility"], false);
        assert!(json["sublayers"][0].get("sublayers").is_none());
        assert_eq!(info.node_count(), 2);
    }
}
