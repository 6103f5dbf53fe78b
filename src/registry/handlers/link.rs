#![allow(clippy::needless_pass_by_value)]

//! REST link intents. Every target carries both an index and a name; the
//! index is `null` when the user left it blank or zero, and the remote
//! prefers whichever is set.

use serde_json::{Map, Value};
use tracing::warn;

use crate::addressing::wire_index;
use crate::error::DriverError;
use crate::registry::handlers::custom::parse_object;
use crate::registry::params::{LinkCustomParams, LinkIdParams, LinkPlaylistItemParams, LinkSlideParams};
use crate::registry::{CompileContext, Compiled};
use crate::variables::VariableResolver;
use crate::wire::{endpoint, index_name, LinkRequest};

/// Resolve an `{index, name}` pair. Both fields support variables.
async fn target<V: VariableResolver>(ctx: &CompileContext<'_, V>, index: &str, name: &str) -> Value {
    let index = ctx.var(index).await;
    let name = ctx.var(name).await;
    index_name(wire_index(&index), &name)
}

fn data(key: &str, value: Value) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    map
}

async fn by_id<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    endpoint: &str,
    p: &LinkIdParams,
) -> Compiled {
    let id = target(ctx, &p.index, &p.name).await;
    Compiled::Link(LinkRequest::new(endpoint, data("id", id)))
}

async fn playlist_item<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    endpoint: &str,
    p: &LinkPlaylistItemParams,
) -> Compiled {
    let path = vec![
        target(ctx, &p.playlist_index, &p.playlist_name).await,
        target(ctx, &p.item_index, &p.item_name).await,
    ];
    Compiled::Link(LinkRequest::new(endpoint, data("path", Value::Array(path))))
}

pub async fn link_trigger_slide<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkSlideParams,
) -> Result<Compiled, DriverError> {
    let path = vec![
        target(ctx, &p.playlist_index, &p.playlist_name).await,
        target(ctx, &p.presentation_index, &p.presentation_name).await,
        target(ctx, &p.slide_index, &p.slide_name).await,
    ];
    Ok(Compiled::Link(LinkRequest::new(
        endpoint::TRIGGER_PLAYLIST,
        data("path", Value::Array(path)),
    )))
}

pub async fn link_prop_trigger<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkIdParams,
) -> Result<Compiled, DriverError> {
    Ok(by_id(ctx, endpoint::PROP_TRIGGER, &p).await)
}

pub async fn link_prop_clear<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkIdParams,
) -> Result<Compiled, DriverError> {
    Ok(by_id(ctx, endpoint::PROP_CLEAR, &p).await)
}

pub async fn link_media_trigger<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkPlaylistItemParams,
) -> Result<Compiled, DriverError> {
    Ok(playlist_item(ctx, endpoint::TRIGGER_MEDIA, &p).await)
}

pub async fn link_audio_trigger<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkPlaylistItemParams,
) -> Result<Compiled, DriverError> {
    Ok(playlist_item(ctx, endpoint::TRIGGER_AUDIO, &p).await)
}

pub async fn link_video_input_trigger<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkIdParams,
) -> Result<Compiled, DriverError> {
    Ok(by_id(ctx, endpoint::TRIGGER_VIDEO_INPUT, &p).await)
}

pub async fn link_message_clear<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkIdParams,
) -> Result<Compiled, DriverError> {
    Ok(by_id(ctx, endpoint::MESSAGE_CLEAR, &p).await)
}

pub async fn link_custom<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: LinkCustomParams,
) -> Result<Compiled, DriverError> {
    let endpoint = ctx.var(p.endpoint.trim()).await;
    if endpoint.trim().is_empty() {
        return Ok(Compiled::dropped("link endpoint is blank"));
    }
    match parse_object(&p.json, true) {
        Ok(body) => Ok(Compiled::Link(LinkRequest::new(endpoint.trim(), body))),
        Err(reason) => {
            warn!(%reason, endpoint = %endpoint, "dropping custom link request");
            Ok(Compiled::dropped(reason))
        }
    }
}
