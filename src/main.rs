use std::sync::Arc;

use anyhow::Result;

use aurelane::api::types::GemQuery;
use aurelane::api::{ApiClient, HttpTransport, ReadOptions};
use aurelane::config::Config;
use aurelane::storage::SessionStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("aurelane=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load()?;
    let session = Arc::new(SessionStore::open()?);
    let transport = Arc::new(HttpTransport::new(
        config.api_base_url.as_str(),
        Arc::clone(&session),
    )?);
    let client = ApiClient::new(transport, config.cache.tiers());

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("gems") => {
            let query = GemQuery {
                search: args.get(1).cloned(),
                limit: Some(20),
                ..Default::default()
            };
            let page = client.list_gems(&query, ReadOptions::new()).await?;
            for gem in &page.gems {
                println!("{}  {}  {} {}", gem.id, gem.name, gem.price, config.currency);
            }
            println!("({} of {} gems)", page.gems.len(), page.total);
        }
        Some("gem") => {
            let id = args.get(1).ok_or_else(|| anyhow::anyhow!("usage: aurelane gem <id>"))?;
            let detail = client.get_gem(id, ReadOptions::new()).await?;
            println!("{}  {} {}", detail.gem.name, detail.gem.price, config.currency);
            if !detail.gem.description.is_empty() {
                println!("{}", detail.gem.description);
            }
            for related in &detail.related {
                println!("  related: {} ({})", related.name, related.id);
            }
        }
        Some("categories") => {
            for category in client.list_categories(ReadOptions::new()).await? {
                println!("{}", category);
            }
        }
        Some("zodiac") => {
            let sign = args
                .get(1)
                .ok_or_else(|| anyhow::anyhow!("usage: aurelane zodiac <sign>"))?;
            for gem in client.gems_by_zodiac(sign, ReadOptions::new()).await? {
                println!("{}  {}  {} {}", gem.id, gem.name, gem.price, config.currency);
            }
        }
        Some("login") => {
            let (email, password) = match (args.get(1), args.get(2)) {
                (Some(e), Some(p)) => (e, p),
                _ => anyhow::bail!("usage: aurelane login <email> <password>"),
            };
            let auth = client.login(email, password).await?;
            println!("signed in as {}", auth.user.name);
            session.save(auth)?;
            client.invalidate_user_scope();
        }
        Some("logout") => {
            session.clear()?;
            client.invalidate_user_scope();
            println!("signed out");
        }
        Some("orders") => {
            for order in client.list_orders(ReadOptions::new()).await? {
                println!(
                    "{}  {} {}  {}",
                    order.id,
                    order.total,
                    config.currency,
                    order.status.as_deref().unwrap_or("-")
                );
            }
        }
        _ => {
            eprintln!("usage: aurelane <gems [search] | gem <id> | categories | zodiac <sign> | orders | login <email> <password> | logout>");
            std::process::exit(2);
        }
    }

    Ok(())
}
