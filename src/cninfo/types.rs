//! Shared cninfo wire types

use serde::Deserialize;

/// One page of the announcement query response
#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementPage {
    /// Whether more pages are available after this one
    #[serde(rename = "hasMore", default, deserialize_with = "null_as_default")]
    pub has_more: bool,
    /// Announcements on this page. cninfo sends `null` for empty pages.
    #[serde(default)]
    pub announcements: Option<Vec<Announcement>>,
    /// Total number of matching announcements
    #[serde(rename = "totalAnnouncement", default)]
    pub total_announcement: Option<u64>,
}

impl AnnouncementPage {
    pub fn into_announcements(self) -> Vec<Announcement> {
        self.announcements.unwrap_or_default()
    }
}

/// A single announcement (candidate document) returned by the registry
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Announcement {
    /// Unique announcement id
    #[serde(rename = "announcementId")]
    pub announcement_id: String,

    #[serde(rename = "announcementTitle")]
    pub announcement_title: String,

    /// Securities code of the issuer
    #[serde(rename = "secCode", default, deserialize_with = "null_as_default")]
    pub sec_code: String,

    /// Short display name of the issuer
    #[serde(rename = "secName", default, deserialize_with = "null_as_default")]
    pub sec_name: String,

    #[serde(rename = "orgId", default)]
    pub org_id: Option<String>,

    /// Path of the attachment relative to the static host
    #[serde(rename = "adjunctUrl", default, deserialize_with = "null_as_default")]
    pub adjunct_url: String,

    /// Attachment type, e.g. `PDF`
    #[serde(rename = "adjunctType", default)]
    pub adjunct_type: Option<String>,

    /// Attachment size in KB
    #[serde(rename = "adjunctSize", default)]
    pub adjunct_size: Option<u64>,

    /// Publication time in epoch milliseconds
    #[serde(rename = "announcementTime", default)]
    pub announcement_time: Option<i64>,
}

impl Announcement {
    pub fn is_pdf(&self) -> bool {
        self.adjunct_type.as_deref() == Some("PDF")
    }

    /// Publication date, when the registry supplied a timestamp
    pub fn published_on(&self) -> Option<chrono::NaiveDate> {
        self.announcement_time
            .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
            .map(|dt| dt.date_naive())
    }
}

/// cninfo sends explicit `null` for some string fields
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// cninfo endpoints
pub struct CninfoApi;

impl CninfoApi {
    /// Announcement search endpoint, relative to the base URL
    pub const QUERY_ENDPOINT: &'static str = "/new/hisAnnouncement/query";
    /// Search page used as the referer for query requests
    pub const REFERER_PATH: &'static str =
        "/new/commonUrl/pageOfSearch?url=disclosure/list/search&lastPage=index";
}
