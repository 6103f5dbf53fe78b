use tracing::{debug, info, warn};

use crate::error::DriverError;
use crate::transport::{LinkSender, SocketSender};
use crate::variables::VariableResolver;

use super::{CompileContext, Compiled, Intent};

/// Compile an intent and hand the result to the matching transport.
/// This is the single dispatch point for all surfaces (CLI, HTTP API).
///
/// Drops succeed without sending anything. Transport failures are returned
/// to the caller and never retried.
pub async fn execute<V, S, L>(
    ctx: &CompileContext<'_, V>,
    intent: Intent,
    socket: &S,
    link: &L,
) -> Result<Compiled, DriverError>
where
    V: VariableResolver,
    S: SocketSender,
    L: LinkSender,
{
    let name = intent.name();
    let compiled = intent.compile(ctx).await?;
    match &compiled {
        Compiled::Socket(cmd) => {
            debug!(intent = name, action = %cmd.action, "sending socket command");
            socket.send(cmd).await?;
        }
        Compiled::Link(req) => {
            debug!(intent = name, endpoint = %req.endpoint, "posting link request");
            link.post(req).await?;
        }
        Compiled::Dropped { reason } => {
            warn!(intent = name, %reason, "intent dropped");
            return Ok(compiled);
        }
    }
    info!(intent = name, "{}", compiled.summary());
    Ok(compiled)
}
