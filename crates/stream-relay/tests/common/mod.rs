pub mod mock_bot;
pub mod scripted_provider;
