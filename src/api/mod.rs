mod client;
mod types;

pub use client::fetch_graph;
pub use types::{FetchParams, GraphData, GraphLink, GraphNode};
