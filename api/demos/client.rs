use reqwest::Client;
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new();
    let base_url = std::env::var("NOVA_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_string());
    let token = std::env::var("NOVA_API_TOKEN").ok();

    println!("Testing Nova chat API at {}", base_url);

    println!("\nHealth Check:");
    let health_response = client.get(format!("{}/health", base_url)).send().await?;
    println!("Status: {}", health_response.status());
    let health_json: serde_json::Value = health_response.json().await?;
    println!("Response: {}", serde_json::to_string_pretty(&health_json)?);

    let authorize = |builder: reqwest::RequestBuilder| match &token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    };

    println!("\nNew session:");
    let session: serde_json::Value = authorize(client.post(format!("{}/api/sessions", base_url)))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let session_id = session["session_id"].as_str().ok_or("missing session_id")?.to_string();
    println!("Session: {}", session_id);

    for query in ["What is Starlink?", "How many times has Falcon 9 landed?"] {
        println!("\nQuestion: {}", query);
        let turn: serde_json::Value = authorize(
            client.post(format!("{}/api/sessions/{}/messages", base_url, session_id)),
        )
        .json(&json!({ "query": query }))
        .send()
        .await?
        .json()
        .await?;
        println!("Response: {}", serde_json::to_string_pretty(&turn)?);
    }

    println!("\nClient test completed!");
    Ok(())
}
