#![allow(clippy::needless_pass_by_value, clippy::unused_async)]

use crate::addressing::resolve_presentation_path;
use crate::error::DriverError;
use crate::registry::params::TimelineParams;
use crate::registry::{CompileContext, Compiled};
use crate::variables::VariableResolver;
use crate::wire::{WireCommand, WireField};

fn timeline_command<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    action: &str,
    p: &TimelineParams,
) -> Compiled {
    let path = ctx
        .instance
        .with_session(|s| resolve_presentation_path(&p.presentation_path, &s.presentation_path));
    Compiled::Socket(WireCommand::new(action).with("presentationPath", WireField::Text(path)))
}

pub async fn timeline_play_pause<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: TimelineParams,
) -> Result<Compiled, DriverError> {
    Ok(timeline_command(ctx, "timelinePlayPause", &p))
}

pub async fn timeline_rewind<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: TimelineParams,
) -> Result<Compiled, DriverError> {
    Ok(timeline_command(ctx, "timelineRewind", &p))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;
    use crate::state::Instance;
    use crate::variables::NoVariables;
    use serde_json::json;

    #[tokio::test]
    async fn timeline_paths_resolve_like_slides() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.presentation_path = "2.1:7".into());
        let ctx = CompileContext::new(&instance, &NoVariables);

        let blank = timeline_play_pause(&ctx, TimelineParams::default()).await.unwrap();
        let Compiled::Socket(cmd) = blank else { panic!("expected socket command") };
        assert_eq!(
            cmd.to_json(),
            json!({"action": "timelinePlayPause", "presentationPath": "2.1:7"})
        );

        let relative = timeline_rewind(
            &ctx,
            TimelineParams {
                presentation_path: "3".into(),
            },
        )
        .await
        .unwrap();
        let Compiled::Socket(cmd) = relative else { panic!("expected socket command") };
        assert_eq!(cmd.to_json()["presentationPath"], "2.1:3");
    }
}
