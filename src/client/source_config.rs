use clap::Args;
use source_client::SourceClient;
use url::Url;

#[derive(Args, Debug, Clone)]
pub struct SourceConfig {
    /// Space to mirror, as the source names it
    #[arg(long, env = "CONTENTCAST_SPACE_ID")]
    pub space_id: String,
    /// Delivery access token for the space
    #[arg(long, env = "CONTENTCAST_ACCESS_TOKEN")]
    pub access_token: String,
    #[arg(long, env = "CONTENTCAST_SOURCE_URL", default_value_t = Url::parse("https://cdn.contentful.com").unwrap())]
    pub source_url: Url,
}

impl SourceConfig {
    pub fn into_client(self) -> SourceClient {
        SourceClient::new_http(self.source_url, self.space_id, self.access_token)
    }
}
