#![allow(clippy::needless_pass_by_value, clippy::unused_async)]

use tracing::debug;

use crate::addressing::{resolve_group_path, resolve_presentation_path, resolve_slide_index};
use crate::correlation::{GroupSlideSlot, SlideByLabelSlot};
use crate::error::DriverError;
use crate::registry::params::{GroupSlideParams, SlideLabelParams, SlideNumberParams};
use crate::registry::{CompileContext, Compiled};
use crate::variables::VariableResolver;
use crate::wire::{action, WireCommand, WireField};

/// Variable holding the presentation path the remote last reported as current.
pub const CURRENT_PRESENTATION_PATH: &str = "current_presentation_path";

pub async fn slide_number<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: SlideNumberParams,
) -> Result<Compiled, DriverError> {
    let (index, path) = ctx.instance.with_session_mut(|session| {
        let index = resolve_slide_index(&p.slide, session.slide_index);
        let path = resolve_presentation_path(&p.path, &session.presentation_path);
        // Optimistic: the broadcast handler overwrites with what the remote accepted.
        if let Some(i) = index {
            session.slide_index = i;
        }
        session.presentation_path.clone_from(&path);
        (index, path)
    });

    Ok(Compiled::Socket(
        WireCommand::new(action::TRIGGER_INDEX)
            .with("slideIndex", WireField::Number(index))
            .with("presentationPath", WireField::Text(path)),
    ))
}

pub async fn slide_label<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: SlideLabelParams,
) -> Result<Compiled, DriverError> {
    let slot = SlideByLabelSlot {
        playlist_name: ctx.var(&p.playlist_name).await,
        presentation_name: ctx.var(&p.presentation_name).await,
        slide_label: ctx.var(&p.slide_label).await,
    };
    if let Some(previous) = ctx.instance.correlation.write_slide_by_label(slot) {
        debug!(?previous, "slide-by-label request superseded");
    }
    Ok(Compiled::Socket(WireCommand::new(action::PLAYLIST_REQUEST_ALL)))
}

pub async fn group_slide<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: GroupSlideParams,
) -> Result<Compiled, DriverError> {
    let group_name = ctx.var(&p.group_name).await;
    let slide_number_text = ctx.var(&p.slide_number).await;
    let requested_path = ctx.var(&p.presentation_path).await;

    let observed = ctx
        .instance
        .with_session(|s| s.variable(CURRENT_PRESENTATION_PATH).map(str::to_string));
    let Some(presentation_path) = resolve_group_path(&requested_path, observed.as_deref()) else {
        return Ok(Compiled::dropped("no presentation to search for the group"));
    };

    let slot = GroupSlideSlot {
        group_name,
        slide_number_text,
        presentation_path: presentation_path.clone(),
    };
    if let Some(previous) = ctx.instance.correlation.write_group_slide(slot) {
        debug!(?previous, "group-slide request superseded");
    }

    Ok(Compiled::Socket(
        WireCommand::new(action::PRESENTATION_REQUEST)
            .with("presentationPath", WireField::Text(presentation_path))
            .with("presentationSlideQuality", WireField::Number(Some(0))),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing, clippy::panic)]
mod tests {
    use super::*;
    use crate::registry::Intent;
    use crate::settings::ConnectionSettings;
    use crate::state::Instance;
    use crate::variables::{NoVariables, SessionVariables};
    use serde_json::json;

    fn socket(compiled: Compiled) -> serde_json::Value {
        match compiled {
            Compiled::Socket(cmd) => cmd.to_json(),
            other => panic!("expected socket command, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn relative_slide_in_current_presentation() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| {
            s.slide_index = 3;
            s.presentation_path = "1:1".into();
        });
        let ctx = CompileContext::new(&instance, &NoVariables);

        let intent = Intent::SlideNumber(SlideNumberParams {
            slide: "+2".into(),
            path: String::new(),
        });
        let json = socket(intent.compile(&ctx).await.unwrap());
        assert_eq!(
            json,
            json!({"action": "presentationTriggerIndex", "slideIndex": "5", "presentationPath": "1:1"})
        );
        assert_eq!(instance.with_session(|s| s.slide_index), 5);
    }

    #[tokio::test]
    async fn bare_digits_path_stays_in_playlist() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.presentation_path = "3:2".into());
        let ctx = CompileContext::new(&instance, &NoVariables);

        let json = socket(
            slide_number(
                &ctx,
                SlideNumberParams {
                    slide: "1".into(),
                    path: "5".into(),
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(json["presentationPath"], "3:5");
        assert_eq!(json["slideIndex"], "0");
    }

    #[tokio::test]
    async fn slide_zero_replays_current() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.slide_index = 8);
        let ctx = CompileContext::new(&instance, &NoVariables);

        let json = socket(
            slide_number(
                &ctx,
                SlideNumberParams {
                    slide: "0".into(),
                    path: String::new(),
                },
            )
            .await
            .unwrap(),
        );
        assert_eq!(json["slideIndex"], "8");
    }

    #[tokio::test]
    async fn slide_label_writes_slot_and_requests_playlists() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.set_variable("song", "Amazing Grace"));
        let vars = SessionVariables {
            instance: &instance,
        };
        let ctx = CompileContext::new(&instance, &vars);

        let compiled = slide_label(
            &ctx,
            SlideLabelParams {
                playlist_name: "Sunday".into(),
                presentation_name: "$(propresenter:song)".into(),
                slide_label: "Chorus".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(socket(compiled), json!({"action": "playlistRequestAll"}));
        let slot = instance.correlation.slide_by_label().unwrap();
        assert_eq!(slot.presentation_name, "Amazing Grace");
        assert_eq!(slot.slide_label, "Chorus");
    }

    #[tokio::test]
    async fn second_label_request_supersedes_first() {
        let instance = Instance::new(ConnectionSettings::default());
        let ctx = CompileContext::new(&instance, &NoVariables);
        for label in ["Verse", "Bridge"] {
            slide_label(
                &ctx,
                SlideLabelParams {
                    playlist_name: "P".into(),
                    presentation_name: "S".into(),
                    slide_label: label.into(),
                },
            )
            .await
            .unwrap();
        }
        assert_eq!(instance.correlation.slide_by_label().unwrap().slide_label, "Bridge");
    }

    #[tokio::test]
    async fn group_slide_uses_observed_path() {
        let instance = Instance::new(ConnectionSettings::default());
        instance.with_session_mut(|s| s.set_variable(CURRENT_PRESENTATION_PATH, "0:4"));
        let ctx = CompileContext::new(&instance, &NoVariables);

        let compiled = group_slide(
            &ctx,
            GroupSlideParams {
                group_name: "Chorus|Refrain".into(),
                slide_number: "2".into(),
                presentation_path: String::new(),
            },
        )
        .await
        .unwrap();

        assert_eq!(
            socket(compiled),
            json!({"action": "presentationRequest", "presentationPath": "0:4", "presentationSlideQuality": "0"})
        );
        let slot = instance.correlation.group_slide().unwrap();
        assert_eq!(slot.presentation_path, "0:4");
        assert_eq!(slot.slide_number_text, "2");
    }

    #[tokio::test]
    async fn group_slide_without_path_is_dropped() {
        let instance = Instance::new(ConnectionSettings::default());
        let ctx = CompileContext::new(&instance, &NoVariables);

        let compiled = group_slide(&ctx, GroupSlideParams::default()).await.unwrap();
        assert!(matches!(compiled, Compiled::Dropped { .. }));
        assert!(instance.correlation.group_slide().is_none());

        instance.with_session_mut(|s| s.set_variable(CURRENT_PRESENTATION_PATH, "undefined"));
        let compiled = group_slide(&ctx, GroupSlideParams::default()).await.unwrap();
        assert!(matches!(compiled, Compiled::Dropped { .. }));
    }
}
