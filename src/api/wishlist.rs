use serde_json::json;

use super::cache::CacheTier;
use super::client::{ApiClient, ReadOptions};
use super::envelope::Envelope;
use super::error::ApiError;
use super::transport::ApiRequest;
use super::types::WishlistEntry;

const WISHLIST_PREFIX: &str = "GET:/wishlist";

impl ApiClient {
    pub async fn add_to_wishlist(&self, gem_id: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::post("/wishlist/add", json!({ "gemId": gem_id })))
            .await?;
        self.invalidate(&[WISHLIST_PREFIX]);
        Ok(())
    }

    pub async fn wishlist(&self, options: ReadOptions) -> Result<Vec<WishlistEntry>, ApiError> {
        let value = self
            .cached_read("/wishlist", vec![], CacheTier::List, options)
            .await?;
        Envelope::parse(value)
            .list(&["wishlist", "items"])
            .into_iter()
            .map(|v| {
                serde_json::from_value(v)
                    .map_err(|e| ApiError::Malformed(format!("bad wishlist entry: {}", e)))
            })
            .collect()
    }

    pub async fn remove_from_wishlist(&self, gem_id: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::delete(format!("/wishlist/remove/{}", gem_id)))
            .await?;
        self.invalidate(&[WISHLIST_PREFIX]);
        Ok(())
    }

    /// Membership flips with every add/remove, so this stays uncached.
    pub async fn in_wishlist(&self, gem_id: &str) -> Result<bool, ApiError> {
        let value = self
            .cached_read(
                &format!("/wishlist/check/{}", gem_id),
                vec![],
                CacheTier::Detail,
                ReadOptions::uncached(),
            )
            .await?;
        let envelope = Envelope::parse(value);
        Ok(envelope
            .data
            .get("inWishlist")
            .or_else(|| envelope.data.get("exists"))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false))
    }
}
