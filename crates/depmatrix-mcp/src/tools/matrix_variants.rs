//! Tool `matrix_variants`: list the process variants a matrix accepts.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::Deserialize;
use serde_json::{json, Value};

use depmatrix::{acceptance_variants, MAX_VARIANT_ACTIVITIES};

use crate::session::{MatrixSource, SessionStore};
use crate::types::{McpResult, ToolCallResult, ToolDefinition};

use super::{default_session, open_session, parse_params, session_property, source_property};

#[derive(Debug, Deserialize)]
struct VariantsParams {
    #[serde(default = "default_session")]
    session_id: String,
    #[serde(default)]
    matrix_source: MatrixSource,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "matrix_variants".to_string(),
        description: Some(format!(
            "Enumerate the activity sequences a dependency matrix accepts \
             (matrices of at most {MAX_VARIANT_ACTIVITIES} activities)"
        )),
        input_schema: json!({
            "type": "object",
            "properties": {
                "session_id": session_property(),
                "matrix_source": source_property()
            }
        }),
    }
}

pub async fn execute(args: Value, store: &Arc<Mutex<SessionStore>>) -> McpResult<ToolCallResult> {
    let params: VariantsParams = parse_params(args)?;

    let session = open_session(store, &params.session_id).await?;
    let session = session.lock().await;
    let variants = acceptance_variants(session.matrix(params.matrix_source)?)?;

    Ok(ToolCallResult::json(&json!({
        "session_id": params.session_id,
        "matrix_source": params.matrix_source.as_str(),
        "variant_count": variants.len(),
        "variants": variants,
    })))
}
