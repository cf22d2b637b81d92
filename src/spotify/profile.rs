use crate::{error::ApiError, spotify::client::ResilientClient, types::UserProfile};

/// `GET /me`
pub async fn get_user_profile(client: &ResilientClient) -> Result<UserProfile, ApiError> {
    client.get("me").await
}
