use std::io::Write;

use crate::error::JobError;
use crate::platform::Platform;

/// Where a message ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Posted { channel_id: String },
    Printed,
}

/// Post `body` to `channel_id`, or write it to `sink` when no destination is
/// configured. The sink path never touches the network.
pub async fn post(
    platform: &dyn Platform,
    channel_id: &str,
    body: &str,
    embed: bool,
    sink: &mut (dyn Write + Send),
) -> Result<Delivery, JobError> {
    if channel_id.is_empty() {
        writeln!(sink, "{body}")?;
        sink.flush()?;
        return Ok(Delivery::Printed);
    }

    platform
        .post_message(channel_id, body, embed)
        .await
        .map_err(|source| JobError::Post {
            channel_id: channel_id.to_string(),
            source,
        })?;
    Ok(Delivery::Posted {
        channel_id: channel_id.to_string(),
    })
}
