use serde::{Deserialize, Deserializer};

/// Filter parameters for one graph snapshot request.
///
/// `ego` switches the request to the ego-network endpoint: the subgraph
/// centered on one entity, expanded outward `ego_depth` hops.
#[derive(Clone, Debug)]
pub struct FetchParams {
    pub min_weight: u32,
    pub max_nodes: u32,
    pub ego: Option<String>,
    pub ego_depth: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Message count; drives the rendered disk size.
    #[serde(default)]
    pub count: f32,
    /// Category marker; flagged entities get a distinct visual treatment.
    #[serde(default, rename = "is_epstein", deserialize_with = "int_flag")]
    pub flagged: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub weight: f32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub links: Vec<GraphLink>,
}

// The server encodes the flag as a 0/1 integer column.
fn int_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = i64::deserialize(deserializer)?;
    Ok(value != 0)
}
