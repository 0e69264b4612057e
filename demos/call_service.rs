//! Calling Maxemail services
//!
//! This demo shows:
//! - Configuring the client from environment variables
//! - Proxying a service method call
//! - Handling vendor errors
//! - Collecting deprecation notices
//!
//! Required environment variables:
//! - MXM_TOKEN, or MXM_USERNAME and MXM_PASSWORD
//! Optional:
//! - MXM_URI, MXM_DEBUG_LOGGING
//!
//! Run with: cargo run --example call_service

use std::sync::Arc;

use maxemail::{Client, TracingLogger};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Maxemail Service Call ===\n");

    let client = Client::from_env()?;
    client.set_logger(Arc::new(TracingLogger));
    println!("Endpoint: {}", client.uri());

    let folder = client.service("folder")?;
    match folder.invoke("fetchRoot", &[json!("email")]).await {
        Ok(root) => println!("✓ Root email folder:\n{}", serde_json::to_string_pretty(&root)?),
        Err(e) if e.is_vendor_error() => {
            println!("✗ Maxemail rejected the call: {}", e.vendor_message().unwrap_or_default());
        }
        Err(e) => return Err(e.into()),
    }

    for notice in client.take_deprecations() {
        println!("! Deprecated ({}): {}", notice.agent, notice.message);
    }

    Ok(())
}
