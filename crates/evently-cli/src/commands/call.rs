//! Raw API call command implementation.

use anyhow::{Context, Result};
use clap::Args;

use evently_client::Client;
use evently_core::{ApiRequest, HttpMethod};

use crate::output;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// HTTP method (GET, POST, PUT, PATCH, DELETE)
    pub method: String,

    /// Path relative to the API base URL, e.g. eventApi/3/
    pub path: String,

    /// JSON request body
    #[arg(long)]
    pub body: Option<String>,

    /// Query parameter as key=value (repeatable)
    #[arg(long = "query", value_name = "KEY=VALUE")]
    pub query: Vec<String>,

    /// Send without a token when logged out
    #[arg(long)]
    pub anonymous: bool,
}

fn build_request(args: &CallArgs) -> Result<ApiRequest> {
    let method: HttpMethod = args.method.parse().context("Invalid method")?;
    let mut request = ApiRequest::new(method, args.path.clone());

    for pair in &args.query {
        let (key, value) = pair
            .split_once('=')
            .with_context(|| format!("Query parameter '{}' is not key=value", pair))?;
        request = request.query(key, value);
    }

    if let Some(body) = &args.body {
        let body: serde_json::Value = serde_json::from_str(body).context("Body is not valid JSON")?;
        request = request.json(&body).context("Failed to encode body")?;
    }

    if args.anonymous {
        request = request.optional_auth();
    }

    Ok(request)
}

pub async fn run(args: CallArgs, client: &Client) -> Result<()> {
    let request = build_request(&args)?;

    let response = client
        .pipeline()
        .authorized_call(&request)
        .await
        .with_context(|| format!("{} {} failed", request.method(), request.path()))?;

    tracing::debug!(status = response.status, "Call completed");
    if response.body.is_null() {
        output::success(&format!("HTTP {}", response.status));
        return Ok(());
    }
    output::json_pretty(&response.body)
}
