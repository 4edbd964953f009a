use prep_algo::LearningStyle;

use crate::db::operations;
use crate::db::{now_iso, Database};
use crate::models::{LearningProfile, ProfileSource};
use crate::services::ServiceError;

pub async fn get_profile(db: &Database, user_id: &str) -> Result<Option<LearningProfile>, ServiceError> {
    Ok(operations::get_learning_profile(db, user_id).await?)
}

/// Manual override; the only way a profile ends up `kinesthetic`.
pub async fn set_manual_style(
    db: &Database,
    user_id: &str,
    learning_style: LearningStyle,
) -> Result<LearningProfile, ServiceError> {
    let profile = LearningProfile {
        learning_style,
        source: ProfileSource::Manual,
        updated_at: now_iso(),
    };
    operations::save_learning_profile(db, user_id, &profile).await?;
    tracing::info!(user_id, learning_style = learning_style.as_str(), "learning style set manually");
    Ok(profile)
}
