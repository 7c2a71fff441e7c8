use anyhow::Result;
use serde_json::json;

pub async fn execute() -> Result<()> {
    super::print_json(&json!({ "status": "Application is running" }))
}
