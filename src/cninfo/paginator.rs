//! Eager pagination over the announcement query endpoint

use crate::cninfo::{Announcement, DisclosureSource};
use crate::query::QueryPayload;
use tracing::{debug, warn};

/// Collect every announcement matching `payload`, page by page.
///
/// The cursor is advanced before each request, so a freshly built payload
/// (page 0) starts at page 1. Stops when the registry reports no further
/// pages or returns an empty page. A failed page ends the walk early and
/// whatever was collected so far is returned.
pub async fn fetch_all<S>(source: &S, payload: &QueryPayload) -> Vec<Announcement>
where
    S: DisclosureSource + ?Sized,
{
    let mut payload = payload.clone();
    let mut announcements = Vec::new();

    loop {
        payload.page_num += 1;

        let page = match source.query_page(&payload).await {
            Ok(page) => page,
            Err(e) => {
                warn!(
                    "Query for {} ({}) failed on page {}, keeping {} announcements: {}",
                    payload.stock,
                    payload.se_date,
                    payload.page_num,
                    announcements.len(),
                    e
                );
                break;
            }
        };

        let has_more = page.has_more;
        let items = page.into_announcements();
        debug!("Page {} returned {} announcements", payload.page_num, items.len());

        if items.is_empty() {
            break;
        }
        announcements.extend(items);

        if !has_more {
            break;
        }
    }

    announcements
}
