#![allow(clippy::needless_pass_by_value, clippy::unused_async)]

use crate::error::DriverError;
use crate::registry::params::{
    LookParams, MacroParams, StageDisplayIndexParams, StageLayoutParams, StageMessageParams,
};
use crate::registry::{CompileContext, Compiled};
use crate::state::choice_or_first;
use crate::variables::VariableResolver;
use crate::wire::{WireCommand, WireField};

fn parse_number(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

pub async fn stage_display_index<V: VariableResolver>(
    _ctx: &CompileContext<'_, V>,
    p: StageDisplayIndexParams,
) -> Result<Compiled, DriverError> {
    Ok(Compiled::Socket(
        WireCommand::new("stageDisplaySetIndex")
            .with("stageDisplayIndex", WireField::Number(parse_number(&p.index))),
    ))
}

pub async fn stage_layout<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: StageLayoutParams,
) -> Result<Compiled, DriverError> {
    let (screen, layout) = ctx.instance.with_session(|s| {
        (
            choice_or_first(&p.screen, &s.choice_lists.stage_screens),
            choice_or_first(&p.layout, &s.choice_lists.stage_layouts),
        )
    });
    Ok(Compiled::Socket(
        WireCommand::new("stageDisplayChangeLayout")
            .with("stageScreenUUID", WireField::Text(screen))
            .with("stageLayoutUUID", WireField::Text(layout)),
    ))
}

pub async fn stage_message<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: StageMessageParams,
) -> Result<Compiled, DriverError> {
    let message = ctx.var(&p.message).await;
    Ok(Compiled::Socket(
        WireCommand::new("stageDisplaySendMessage")
            .with("stageDisplayMessage", WireField::Text(message)),
    ))
}

pub async fn set_look<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LookParams,
) -> Result<Compiled, DriverError> {
    let look = ctx
        .instance
        .with_session(|s| choice_or_first(&p.look, &s.choice_lists.looks));
    Ok(Compiled::Socket(
        WireCommand::new("looksTrigger").with("lookID", WireField::Text(look)),
    ))
}

pub async fn trigger_macro<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: MacroParams,
) -> Result<Compiled, DriverError> {
    let macro_id = ctx
        .instance
        .with_session(|s| choice_or_first(&p.macro_id, &s.choice_lists.macros));
    Ok(Compiled::Socket(
        WireCommand::new("macrosTrigger").with("macroID", WireField::Text(macro_id)),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::settings::ConnectionSettings;
    use crate::state::{ChoiceItem, Instance};
    use crate::variables::NoVariables;
    use serde_json::json;

    fn socket(compiled: Compiled) -> serde_json::Value {
        match compiled {
            Compiled::Socket(cmd) => cmd.to_json(),
            other => panic!("expected socket command, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn blank_layout_defaults_to_first_choice() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| {
            s.choice_lists.stage_screens = vec![ChoiceItem::new("S1", "Confidence")];
            s.choice_lists.stage_layouts = vec![
                ChoiceItem::new("L1", "Lyrics"),
                ChoiceItem::new("L2", "Clock"),
            ];
        });
        let ctx = CompileContext::new(&instance, &NoVariables);

        let json = socket(
            stage_layout(
                &ctx,
                StageLayoutParams {
                    screen: String::new(),
                    layout: "L2".into(),
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(
            json,
            json!({"action": "stageDisplayChangeLayout", "stageScreenUUID": "S1", "stageLayoutUUID": "L2"})
        );
    }

    #[tokio::test]
    async fn look_and_macro_ids() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.choice_lists.macros = vec![ChoiceItem::new("M9", "Walk-in")]);
        let ctx = CompileContext::new(&instance, &NoVariables);

        let look = socket(set_look(&ctx, LookParams { look: "abc".into() }).await.unwrap());
        assert_eq!(look, json!({"action": "looksTrigger", "lookID": "abc"}));

        let mac = socket(trigger_macro(&ctx, MacroParams::default()).await.unwrap());
        assert_eq!(mac["macroID"], "M9");
    }

    #[tokio::test]
    async fn stage_index_is_string_typed() {
        let instance = Instance::new(ConnectionSettings::default());
        let ctx = CompileContext::new(&instance, &NoVariables);
        let json = socket(
            stage_display_index(&ctx, StageDisplayIndexParams { index: "2".into() })
                .await
                .unwrap(),
        );
        assert_eq!(json["stageDisplayIndex"], "2");
    }
}
