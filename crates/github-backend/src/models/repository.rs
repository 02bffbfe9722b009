use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTopic {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepositoryTopic {
    pub topic: GitHubTopic,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubTopicEdges {
    #[serde(default)]
    pub edges: Vec<GitHubTopicEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubTopicEdge {
    pub node: GitHubRepositoryTopic,
}

/// GitHub repository as returned by the `repositories` connection
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitHubRepository {
    pub id: String,
    pub name: String,
    pub url: String,
    pub is_archived: bool,
    pub name_with_owner: String,
    pub owner: GitHubOwner,
    #[serde(default)]
    pub repository_topics: GitHubTopicEdges,
}

impl GitHubRepository {
    pub fn topic_names(&self) -> Vec<String> {
        self.repository_topics
            .edges
            .iter()
            .map(|e| e.node.topic.name.clone())
            .collect()
    }
}
