//! API response type definitions.

use serde::Deserialize;

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse {
    pub data: Option<GraphQlData>,
    pub status: Option<String>,
    pub message: Option<String>,
}

/// GraphQL `data` payload for the shortcode media query.
#[derive(Debug, Deserialize)]
pub struct GraphQlData {
    pub xdt_shortcode_media: Option<ShortcodeMedia>,
    pub shortcode_media: Option<ShortcodeMedia>,
}

impl GraphQlData {
    /// The media node, under whichever key the endpoint used.
    pub fn into_media(self) -> Option<ShortcodeMedia> {
        self.xdt_shortcode_media.or(self.shortcode_media)
    }
}

/// A post (or one carousel child) as returned by GraphQL.
#[derive(Debug, Clone, Deserialize)]
pub struct ShortcodeMedia {
    #[serde(rename = "__typename", default)]
    pub typename: String,
    #[serde(default)]
    pub shortcode: String,
    pub display_url: String,
    #[serde(default)]
    pub is_video: bool,
    pub video_url: Option<String>,
    pub owner: Option<Owner>,
    pub taken_at_timestamp: Option<i64>,
    #[serde(default)]
    pub edge_media_to_caption: EdgeList<CaptionNode>,
    pub edge_sidecar_to_children: Option<EdgeList<ShortcodeMedia>>,
}

impl ShortcodeMedia {
    /// Raw caption text, if any.
    pub fn caption(&self) -> Option<&str> {
        self.edge_media_to_caption
            .edges
            .first()
            .map(|edge| edge.node.text.as_str())
    }

    /// Whether the post is a multi-item carousel.
    pub fn is_sidecar(&self) -> bool {
        self.typename.ends_with("Sidecar") && self.edge_sidecar_to_children.is_some()
    }
}

/// Post owner.
#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub username: Option<String>,
}

/// GraphQL connection (`{ edges: [{ node }] }`).
#[derive(Debug, Clone, Deserialize)]
pub struct EdgeList<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

impl<T> Default for EdgeList<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

/// Single GraphQL edge.
#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// Caption node.
#[derive(Debug, Clone, Deserialize)]
pub struct CaptionNode {
    #[serde(default)]
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sidecar() {
        let json = r#"{
            "data": {
                "xdt_shortcode_media": {
                    "__typename": "XDTGraphSidecar",
                    "shortcode": "ABC123",
                    "display_url": "https://cdn.example/0.jpg",
                    "is_video": false,
                    "owner": {"username": "someone"},
                    "taken_at_timestamp": 1700000000,
                    "edge_media_to_caption": {"edges": [{"node": {"text": "hello #world"}}]},
                    "edge_sidecar_to_children": {"edges": [
                        {"node": {"__typename": "XDTGraphImage", "display_url": "https://cdn.example/1.jpg", "is_video": false}},
                        {"node": {"__typename": "XDTGraphVideo", "display_url": "https://cdn.example/2.jpg", "is_video": true, "video_url": "https://cdn.example/2.mp4"}}
                    ]}
                }
            },
            "status": "ok"
        }"#;

        let response: GraphQlResponse = serde_json::from_str(json).unwrap();
        let media = response.data.unwrap().into_media().unwrap();

        assert!(media.is_sidecar());
        assert_eq!(media.caption(), Some("hello #world"));
        let children = media.edge_sidecar_to_children.unwrap();
        assert_eq!(children.edges.len(), 2);
        assert!(children.edges[1].node.is_video);
    }

    #[test]
    fn test_parse_single_without_caption() {
        let json = r#"{
            "__typename": "GraphImage",
            "shortcode": "XYZ",
            "display_url": "https://cdn.example/x.jpg",
            "edge_media_to_caption": {"edges": []}
        }"#;

        let media: ShortcodeMedia = serde_json::from_str(json).unwrap();
        assert!(!media.is_sidecar());
        assert!(!media.is_video);
        assert_eq!(media.caption(), None);
    }
}
