use super::cache::CacheTier;
use super::client::{ApiClient, ReadOptions};
use super::envelope::Envelope;
use super::error::ApiError;
use super::types::{AdminStats, Gem, Order, User};

impl ApiClient {
    pub async fn admin_stats(&self, options: ReadOptions) -> Result<AdminStats, ApiError> {
        let value = self
            .cached_read("/admin/stats", vec![], CacheTier::List, options)
            .await?;
        serde_json::from_value(Envelope::parse(value).entity(&["stats"]))
            .map_err(|e| ApiError::Malformed(format!("bad stats: {}", e)))
    }

    pub async fn admin_buyers(&self, options: ReadOptions) -> Result<Vec<User>, ApiError> {
        self.admin_list("/admin/buyers", &["buyers", "users"], options)
            .await
    }

    pub async fn admin_sellers(&self, options: ReadOptions) -> Result<Vec<User>, ApiError> {
        self.admin_list("/admin/sellers", &["sellers", "users"], options)
            .await
    }

    pub async fn admin_products(&self, options: ReadOptions) -> Result<Vec<Gem>, ApiError> {
        self.admin_list("/admin/products", &["products", "gems"], options)
            .await
    }

    pub async fn admin_orders(&self, options: ReadOptions) -> Result<Vec<Order>, ApiError> {
        self.admin_list("/admin/orders", &["orders"], options).await
    }

    async fn admin_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        keys: &[&str],
        options: ReadOptions,
    ) -> Result<Vec<T>, ApiError> {
        let value = self
            .cached_read(path, vec![], CacheTier::List, options)
            .await?;
        Envelope::parse(value)
            .list(keys)
            .into_iter()
            .map(|v| {
                serde_json::from_value(v)
                    .map_err(|e| ApiError::Malformed(format!("bad {} entry: {}", path, e)))
            })
            .collect()
    }
}
