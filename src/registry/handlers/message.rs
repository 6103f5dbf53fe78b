#![allow(clippy::needless_pass_by_value, clippy::unused_async)]

use crate::error::DriverError;
use crate::registry::params::{MessageIndexParams, MessageSendParams};
use crate::registry::{CompileContext, Compiled};
use crate::tokens::split_tokens;
use crate::variables::VariableResolver;
use crate::wire::{WireCommand, WireField};

fn message_index(text: &str) -> WireField {
    WireField::Number(text.trim().parse().ok())
}

/// Key and value lists are sent in parallel; the remote pairs them by
/// position. Mismatched lengths are sent as entered.
pub async fn message_send<V: VariableResolver>(
    ctx: &CompileContext<'_, V>,
    p: MessageSendParams,
) -> Result<Compiled, DriverError> {
    let keys = split_tokens(&p.keys);
    let mut values = split_tokens(&p.values);
    if values.len() == 1 {
        if let Some(single) = values.pop() {
            values.push(ctx.var(&single).await);
        }
    }

    Ok(Compiled::Socket(
        WireCommand::new("messageSend")
            .with("messageIndex", message_index(&p.message_index))
            .with("messageKeys", WireField::List(keys))
            .with("messageValues", WireField::List(values)),
    ))
}

pub async fn message_hide<V: VariableResolver>(
    _ctx: &CompileContext<'_, V>,
    p: MessageIndexParams,
) -> Result<Compiled, DriverError> {
    Ok(Compiled::Socket(
        WireCommand::new("messageHide").with("messageIndex", message_index(&p.message_index)),
    ))
}
