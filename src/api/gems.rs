use serde_json::Value;

use super::cache::CacheTier;
use super::client::{ApiClient, ReadOptions};
use super::envelope::Envelope;
use super::error::ApiError;
use super::transport::ApiRequest;
use super::types::{Gem, GemDetail, GemInput, GemPage, GemQuery};

const GEM_LIST_PREFIX: &str = "GET:/gems?";
const GEM_TAXONOMY_PREFIXES: [&str; 3] = [
    "GET:/gems/categories",
    "GET:/gems/category/",
    "GET:/gems/zodiac/",
];

impl ApiClient {
    /// Paginated, filterable gem listing.
    pub async fn list_gems(
        &self,
        query: &GemQuery,
        options: ReadOptions,
    ) -> Result<GemPage, ApiError> {
        let value = self
            .cached_read("/gems", query.to_query(), CacheTier::List, options)
            .await?;
        parse_gem_page(value)
    }

    /// Single gem with its related products.
    pub async fn get_gem(&self, id: &str, options: ReadOptions) -> Result<GemDetail, ApiError> {
        let value = self
            .cached_read(&format!("/gems/{}", id), vec![], CacheTier::Detail, options)
            .await?;
        let envelope = Envelope::parse(value);
        let gem = parse_gem(envelope.entity(&["gem", "product"]))?;
        let related = parse_gems(envelope.list(&["related", "relatedGems"]))?;
        Ok(GemDetail { gem, related })
    }

    pub async fn list_categories(&self, options: ReadOptions) -> Result<Vec<String>, ApiError> {
        let value = self
            .cached_read("/gems/categories", vec![], CacheTier::Taxonomy, options)
            .await?;
        Ok(Envelope::parse(value)
            .list(&["categories"])
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect())
    }

    pub async fn gems_by_category(
        &self,
        category: &str,
        options: ReadOptions,
    ) -> Result<Vec<Gem>, ApiError> {
        let value = self
            .cached_read(
                &format!("/gems/category/{}", category),
                vec![],
                CacheTier::List,
                options,
            )
            .await?;
        parse_gems(Envelope::parse(value).list(&["gems", "products"]))
    }

    pub async fn gems_by_zodiac(
        &self,
        sign: &str,
        options: ReadOptions,
    ) -> Result<Vec<Gem>, ApiError> {
        let value = self
            .cached_read(
                &format!("/gems/zodiac/{}", sign),
                vec![],
                CacheTier::List,
                options,
            )
            .await?;
        parse_gems(Envelope::parse(value).list(&["gems", "products"]))
    }

    /// Create a listing. Drops every list and taxonomy entry from the cache
    /// since the new gem may appear in any of them.
    pub async fn create_gem(&self, input: &GemInput) -> Result<Gem, ApiError> {
        let body = encode(input)?;
        let value = self.request(ApiRequest::post("/gems", body)).await?;
        self.invalidate_owned(&gem_write_prefixes(None));
        parse_gem(Envelope::parse(value).entity(&["gem", "product"]))
    }

    pub async fn update_gem(&self, id: &str, input: &GemInput) -> Result<Gem, ApiError> {
        let body = encode(input)?;
        let value = self
            .request(ApiRequest::put(format!("/gems/{}", id), body))
            .await?;
        self.invalidate_owned(&gem_write_prefixes(Some(id)));
        parse_gem(Envelope::parse(value).entity(&["gem", "product"]))
    }

    pub async fn delete_gem(&self, id: &str) -> Result<(), ApiError> {
        self.request(ApiRequest::delete(format!("/gems/{}", id)))
            .await?;
        self.invalidate_owned(&gem_write_prefixes(Some(id)));
        Ok(())
    }
}

/// Lists and taxonomy always go; the gem's own detail key goes when the
/// write targets a specific gem.
fn gem_write_prefixes(id: Option<&str>) -> Vec<String> {
    let mut prefixes = vec![GEM_LIST_PREFIX.to_string()];
    prefixes.extend(GEM_TAXONOMY_PREFIXES.iter().map(|p| p.to_string()));
    if let Some(id) = id {
        prefixes.push(format!("GET:/gems/{}?", id));
    }
    prefixes
}

fn encode(input: &GemInput) -> Result<Value, ApiError> {
    serde_json::to_value(input).map_err(|e| ApiError::Malformed(e.to_string()))
}

fn parse_gem(value: Value) -> Result<Gem, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Malformed(format!("bad gem: {}", e)))
}

fn parse_gems(values: Vec<Value>) -> Result<Vec<Gem>, ApiError> {
    values.into_iter().map(parse_gem).collect()
}

fn parse_gem_page(value: Value) -> Result<GemPage, ApiError> {
    let envelope = Envelope::parse(value);
    let gems = parse_gems(envelope.list(&["gems", "products", "items"]))?;
    let total = envelope
        .f64_field(&["total", "count", "totalGems"])
        .unwrap_or(gems.len() as f64) as u64;
    let page = envelope.f64_field(&["page", "currentPage"]).unwrap_or(1.0) as u64;
    let pages = envelope
        .f64_field(&["pages", "totalPages"])
        .unwrap_or(1.0) as u64;
    Ok(GemPage {
        gems,
        total,
        page,
        pages,
    })
}
