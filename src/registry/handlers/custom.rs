#![allow(clippy::needless_pass_by_value, clippy::unused_async)]

use serde_json::Value;
use tracing::warn;

use crate::error::DriverError;
use crate::registry::params::CustomActionParams;
use crate::registry::{CompileContext, Compiled};
use crate::variables::VariableResolver;
use crate::wire::WireCommand;

/// Parse option text as a JSON object. Blank text is an empty object when
/// `blank_ok`.
pub(crate) fn parse_object(
    text: &str,
    blank_ok: bool,
) -> Result<serde_json::Map<String, Value>, String> {
    if blank_ok && text.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("custom JSON is not an object".to_string()),
        Err(e) => Err(format!("custom JSON does not parse: {e}")),
    }
}

/// Unparseable input is logged and dropped, never raised.
pub async fn custom_action<V: VariableResolver>(
    _ctx: &CompileContext<'_, V>,
    p: CustomActionParams,
) -> Result<Compiled, DriverError> {
    let object = match parse_object(&p.json, false) {
        Ok(object) => object,
        Err(reason) => {
            warn!(%reason, "dropping custom action");
            return Ok(Compiled::dropped(reason));
        }
    };
    match WireCommand::from_object(object) {
        Some(cmd) => Ok(Compiled::Socket(cmd)),
        None => {
            warn!("dropping custom action without an action field");
            Ok(Compiled::dropped("custom JSON has no string \"action\""))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;
    use crate::state::Instance;
    use crate::variables::NoVariables;
    use serde_json::json;

    async fn compile(text: &str) -> Compiled {
        let instance = Instance::new(ConnectionSettings::default());
        let ctx = CompileContext::new(&instance, &NoVariables);
        custom_action(&ctx, CustomActionParams { json: text.into() })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn valid_object_passes_through() {
        let Compiled::Socket(cmd) = compile(r#"{"action":"audioPlayPause","extra":[1,2]}"#).await
        else {
            panic!("expected socket command")
        };
        assert_eq!(cmd.to_json(), json!({"action": "audioPlayPause", "extra": [1, 2]}));
    }

    #[tokio::test]
    async fn bad_json_is_dropped() {
        assert!(matches!(compile("{nope").await, Compiled::Dropped { .. }));
        assert!(matches!(compile("[1,2]").await, Compiled::Dropped { .. }));
        assert!(matches!(compile(r#"{"x":1}"#).await, Compiled::Dropped { .. }));
    }
}
