//! Access grant generation.

use std::time::Duration;

use verbatim_core::models::{GrantSet, MediaAsset, OutputFormat, OutputTargets};
use verbatim_storage::{Storage, StorageResult};

/// Signs one read URL for the staged input and one write URL per output
/// format.
///
/// Only formats that declare a content type get one bound into the grant;
/// the rest are signed without.
pub async fn issue_grants(
    storage: &dyn Storage,
    asset: &MediaAsset,
    targets: &OutputTargets,
    read_ttl: Duration,
    write_ttl: Duration,
) -> StorageResult<GrantSet> {
    let input_url = storage.signed_get_url(asset.storage_key(), read_ttl).await?;

    let json_url = storage
        .signed_put_url(
            targets.key(OutputFormat::Json),
            OutputFormat::Json.content_type(),
            write_ttl,
        )
        .await?;
    let ttml_url = storage
        .signed_put_url(
            targets.key(OutputFormat::Ttml),
            OutputFormat::Ttml.content_type(),
            write_ttl,
        )
        .await?;
    let text_url = storage
        .signed_put_url(
            targets.key(OutputFormat::Text),
            OutputFormat::Text.content_type(),
            write_ttl,
        )
        .await?;

    tracing::info!(
        input_key = %asset.storage_key(),
        read_ttl_secs = read_ttl.as_secs(),
        write_ttl_secs = write_ttl.as_secs(),
        "Issued access grants"
    );

    Ok(GrantSet {
        input_url,
        json_url,
        ttml_url,
        text_url,
    })
}
