use crate::models::profile::{ProfileSnapshot, RecentPost};

/// Handle of the built-in sample profile.
pub const SAMPLE_USERNAME: &str = "tech_innovators_daily";

/// Built-in profile used whenever a live scrape is unavailable or fails.
pub fn sample_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        username: SAMPLE_USERNAME.to_string(),
        biography: "Bringing you the latest in AI, Robotics, and Future Tech. 🚀 | \
                    Building the future, one bit at a time."
            .to_string(),
        followers_count: 15_400,
        recent_posts: vec![
            RecentPost {
                caption: "The future of robotics is here. Look at this agility! \
                          #robotics #future #tech"
                    .to_string(),
                image_url: "https://picsum.photos/400/400?random=1".to_string(),
                likes: 1200,
            },
            RecentPost {
                caption: "AI is changing how we design code. Swipe to see the comparison."
                    .to_string(),
                image_url: "https://picsum.photos/400/400?random=2".to_string(),
                likes: 850,
            },
            RecentPost {
                caption: "Minimalist desk setup for maximum productivity. What's on your desk?"
                    .to_string(),
                image_url: "https://picsum.photos/400/400?random=3".to_string(),
                likes: 2100,
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_profile_shape() {
        let profile = sample_profile();
        assert_eq!(profile.username, SAMPLE_USERNAME);
        assert_eq!(profile.followers_count, 15_400);
        assert_eq!(profile.recent_posts.len(), 3);
        assert_eq!(
            profile.recent_posts.iter().map(|p| p.likes).collect::<Vec<_>>(),
            vec![1200, 850, 2100]
        );
    }

    #[test]
    fn test_sample_profile_is_stable() {
        assert_eq!(sample_profile(), sample_profile());
    }
}
