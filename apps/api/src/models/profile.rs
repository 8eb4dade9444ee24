use serde::{Deserialize, Serialize};

/// Snapshot of a social profile as produced by the scrape step. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub username: String,
    pub biography: String,
    pub followers_count: u64,
    pub recent_posts: Vec<RecentPost>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentPost {
    pub caption: String,
    pub image_url: String,
    /// The scraper reports hidden like counts as -1, so this stays signed.
    pub likes: i64,
}

impl ProfileSnapshot {
    /// Captions of the recent posts joined with ` | `, as embedded in the analysis prompt.
    pub fn joined_captions(&self) -> String {
        self.recent_posts
            .iter()
            .map(|p| p.caption.as_str())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_captions_keeps_post_order() {
        let profile = ProfileSnapshot {
            username: "someone".to_string(),
            biography: "bio".to_string(),
            followers_count: 10,
            recent_posts: vec![
                RecentPost {
                    caption: "first".to_string(),
                    image_url: "https://example.com/1.jpg".to_string(),
                    likes: 1,
                },
                RecentPost {
                    caption: "second".to_string(),
                    image_url: "https://example.com/2.jpg".to_string(),
                    likes: 2,
                },
            ],
        };
        assert_eq!(profile.joined_captions(), "first | second");
    }

    #[test]
    fn test_joined_captions_empty_profile() {
        let profile = ProfileSnapshot {
            username: "nobody".to_string(),
            biography: String::new(),
            followers_count: 0,
            recent_posts: vec![],
        };
        assert_eq!(profile.joined_captions(), "");
    }
}
