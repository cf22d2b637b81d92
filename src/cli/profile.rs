use crate::{info, spotify};

pub async fn profile() {
    let conn = super::connect().await;

    let profile = match spotify::profile::get_user_profile(&conn.client).await {
        Ok(p) => p,
        Err(e) => super::fail(e),
    };

    info!(
        "Signed in as {} ({})",
        profile.display_name.as_deref().unwrap_or(&profile.id),
        profile.id
    );
    if let Some(email) = profile.email {
        info!("E-mail: {}", email);
    }
    if let Some(product) = profile.product {
        info!("Plan: {}", product);
    }
}
