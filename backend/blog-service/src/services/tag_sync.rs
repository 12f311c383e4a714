/// Replace a post's tag associations inside an open transaction
use uuid::Uuid;

use crate::db::BlogTx;
use crate::error::Result;
use crate::tags::TagUpdate;

/// What a sync changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagSyncSummary {
    /// Tags that did not exist before this save
    pub created: usize,
    /// Associations written for the post
    pub linked: usize,
}

/// Make the post's tag set equal to `update`.
///
/// `Unchanged` leaves the associations alone. `Replace` drops every existing
/// association, then resolves each tag by slug (reusing an existing tag or
/// inserting it) and links it.
pub async fn sync_post_tags(
    tx: &mut dyn BlogTx,
    post_id: Uuid,
    update: &TagUpdate,
) -> Result<TagSyncSummary> {
    let TagUpdate::Replace(tags) = update else {
        return Ok(TagSyncSummary::default());
    };

    tx.delete_post_tags(post_id).await?;

    let mut summary = TagSyncSummary::default();
    for tag in tags {
        let tag_id = match tx.find_tag_by_slug(&tag.slug).await? {
            Some(existing) => existing.id,
            None => {
                let created = tx.insert_tag(&tag.name, &tag.slug).await?;
                summary.created += 1;
                created.id
            }
        };

        tx.insert_post_tag(post_id, tag_id).await?;
        summary.linked += 1;
    }

    tracing::debug!(%post_id, created = summary.created, linked = summary.linked, "post tags synced");
    Ok(summary)
}
