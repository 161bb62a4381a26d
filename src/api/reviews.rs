use serde_json::json;

use super::cache::CacheTier;
use super::client::{ApiClient, ReadOptions};
use super::envelope::Envelope;
use super::error::ApiError;
use super::transport::ApiRequest;
use super::types::Review;

impl ApiClient {
    /// Post a review; the gem's detail entry also goes because it carries
    /// aggregate rating data.
    pub async fn add_review(
        &self,
        gem_id: &str,
        rating: u8,
        comment: &str,
    ) -> Result<(), ApiError> {
        self.request(ApiRequest::post(
            format!("/reviews/{}", gem_id),
            json!({ "rating": rating, "comment": comment }),
        ))
        .await?;
        self.invalidate_owned(&[
            format!("GET:/reviews/gem/{}", gem_id),
            format!("GET:/gems/{}?", gem_id),
        ]);
        Ok(())
    }

    pub async fn gem_reviews(
        &self,
        gem_id: &str,
        options: ReadOptions,
    ) -> Result<Vec<Review>, ApiError> {
        let value = self
            .cached_read(
                &format!("/reviews/gem/{}", gem_id),
                vec![],
                CacheTier::List,
                options,
            )
            .await?;
        Envelope::parse(value)
            .list(&["reviews"])
            .into_iter()
            .map(|v| {
                serde_json::from_value(v)
                    .map_err(|e| ApiError::Malformed(format!("bad review: {}", e)))
            })
            .collect()
    }
}
