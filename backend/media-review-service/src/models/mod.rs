/// Data models for media-review-service
///
/// This module defines structures for:
/// - Media: a persisted media record
/// - MediaPayload: the field set handed to a store for create and update
/// - CreateMediaRequest / UpdateMediaRequest: validated request bodies
/// - MediaChange: one field of a sparse patch
use serde::{Deserialize, Serialize};
use validator::Validate;

// ========================================
// Media Models
// ========================================

/// Media database entity
///
/// Optional text fields hold an empty string when unset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub mime_type: String,
    pub size: i64,
    pub tags: String,
    pub media_data: String,
}

impl Media {
    /// Build a record from a payload under a freshly minted id
    pub fn from_payload(id: String, payload: &MediaPayload) -> Self {
        Self {
            id,
            title: payload.title.clone(),
            description: payload.description.clone(),
            location: payload.location.clone(),
            media_type: payload.media_type.clone(),
            mime_type: payload.mime_type.clone(),
            size: payload.size,
            tags: payload.tags.clone(),
            media_data: payload.media_data.clone(),
        }
    }

    /// Apply every change of a sparse patch in place
    pub fn apply(&mut self, changes: &[MediaChange<'_>]) {
        for change in changes {
            change.apply_to(self);
        }
    }
}

/// Request body for create and update
///
/// Every field defaults to its zero value, so a partial JSON body decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaPayload {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub mime_type: String,
    pub size: i64,
    pub tags: String,
    pub media_data: String,
}

impl MediaPayload {
    /// Fields that an update would overwrite
    ///
    /// Empty strings and a zero size mean "leave unchanged". A caller
    /// therefore cannot clear a text field or reset size to 0 via update.
    pub fn changes(&self) -> Vec<MediaChange<'_>> {
        let mut changes = Vec::new();

        if !self.title.is_empty() {
            changes.push(MediaChange::Title(&self.title));
        }
        if !self.description.is_empty() {
            changes.push(MediaChange::Description(&self.description));
        }
        if !self.location.is_empty() {
            changes.push(MediaChange::Location(&self.location));
        }
        if !self.media_type.is_empty() {
            changes.push(MediaChange::MediaType(&self.media_type));
        }
        if !self.mime_type.is_empty() {
            changes.push(MediaChange::MimeType(&self.mime_type));
        }
        if self.size != 0 {
            changes.push(MediaChange::Size(self.size));
        }
        if !self.tags.is_empty() {
            changes.push(MediaChange::Tags(&self.tags));
        }
        if !self.media_data.is_empty() {
            changes.push(MediaChange::MediaData(&self.media_data));
        }

        changes
    }
}

/// Body of `POST /api/media/v1`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateMediaRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "type is required"))]
    pub media_type: String,
    #[validate(length(min = 1, message = "mimeType is required"))]
    pub mime_type: String,
    #[validate(range(min = 0, message = "size must not be negative"))]
    pub size: i64,
    pub tags: String,
    pub media_data: String,
}

impl From<CreateMediaRequest> for MediaPayload {
    fn from(req: CreateMediaRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            media_type: req.media_type,
            mime_type: req.mime_type,
            size: req.size,
            tags: req.tags,
            media_data: req.media_data,
        }
    }
}

/// Body of `PUT /api/media/v1/{id}`; empty fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMediaRequest {
    pub title: String,
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub mime_type: String,
    #[validate(range(min = 0, message = "size must not be negative"))]
    pub size: i64,
    pub tags: String,
    pub media_data: String,
}

impl From<UpdateMediaRequest> for MediaPayload {
    fn from(req: UpdateMediaRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            location: req.location,
            media_type: req.media_type,
            mime_type: req.mime_type,
            size: req.size,
            tags: req.tags,
            media_data: req.media_data,
        }
    }
}

/// Value carried by a single patched column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeValue<'a> {
    Text(&'a str),
    Integer(i64),
}

/// One overwritten field of a sparse patch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaChange<'a> {
    Title(&'a str),
    Description(&'a str),
    Location(&'a str),
    MediaType(&'a str),
    MimeType(&'a str),
    Size(i64),
    Tags(&'a str),
    MediaData(&'a str),
}

impl<'a> MediaChange<'a> {
    /// Column name in the `media` table
    pub fn column(&self) -> &'static str {
        match self {
            Self::Title(_) => "title",
            Self::Description(_) => "description",
            Self::Location(_) => "location",
            Self::MediaType(_) => "media_type",
            Self::MimeType(_) => "mime_type",
            Self::Size(_) => "size",
            Self::Tags(_) => "tags",
            Self::MediaData(_) => "media_data",
        }
    }

    pub fn value(&self) -> ChangeValue<'a> {
        match *self {
            Self::Title(v)
            | Self::Description(v)
            | Self::Location(v)
            | Self::MediaType(v)
            | Self::MimeType(v)
            | Self::Tags(v)
            | Self::MediaData(v) => ChangeValue::Text(v),
            Self::Size(v) => ChangeValue::Integer(v),
        }
    }

    fn apply_to(&self, media: &mut Media) {
        match *self {
            Self::Title(v) => media.title = v.to_string(),
            Self::Description(v) => media.description = v.to_string(),
            Self::Location(v) => media.location = v.to_string(),
            Self::MediaType(v) => media.media_type = v.to_string(),
            Self::MimeType(v) => media.mime_type = v.to_string(),
            Self::Size(v) => media.size = v,
            Self::Tags(v) => media.tags = v.to_string(),
            Self::MediaData(v) => media.media_data = v.to_string(),
        }
    }
}

/// Response body for delete
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}
