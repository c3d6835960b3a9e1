pub mod investing;
pub mod mock_feed;
pub mod telegram;
