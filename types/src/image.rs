//! Uploaded images and the request that bundles them.

use thiserror::Error;

/// The three image positions a verification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Front,
    Back,
    Selfie,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 3] = [ImageSlot::Front, ImageSlot::Back, ImageSlot::Selfie];

    /// Inbound multipart part name for this slot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ImageSlot::Front => "front",
            ImageSlot::Back => "back",
            ImageSlot::Selfie => "selfie",
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|slot| slot.as_str() == name)
    }
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type supplied by the uploader. Trusted verbatim; never sniffed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType(String);

impl MediaType {
    /// Blank input falls back to `application/octet-stream`.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self(FALLBACK_MEDIA_TYPE.to_string())
        } else {
            Self(value)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MediaType {
    fn default() -> Self {
        Self(FALLBACK_MEDIA_TYPE.to_string())
    }
}

/// An opaque image blob tagged with its media type.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    media_type: MediaType,
    bytes: Vec<u8>,
}

// Image payloads can be megabytes; keep them out of logs.
impl std::fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBlob")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageBlob {
    #[must_use]
    pub fn new(media_type: MediaType, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            media_type,
            bytes: bytes.into(),
        }
    }

    #[must_use]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("front, back and selfie must all be sent in the same request (missing: {})", join_slots(.0))]
pub struct MissingImages(pub Vec<ImageSlot>);

fn join_slots(slots: &[ImageSlot]) -> String {
    slots
        .iter()
        .map(|slot| slot.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Three images for a single verification attempt.
///
/// All three slots are mandatory by construction, so downstream code never
/// re-checks presence.
#[derive(Debug, Clone)]
pub struct VerificationRequest {
    front: ImageBlob,
    back: ImageBlob,
    selfie: ImageBlob,
}

impl VerificationRequest {
    #[must_use]
    pub fn new(front: ImageBlob, back: ImageBlob, selfie: ImageBlob) -> Self {
        Self { front, back, selfie }
    }

    /// Build from optionally-present parts, reporting every absent slot.
    pub fn from_parts(
        front: Option<ImageBlob>,
        back: Option<ImageBlob>,
        selfie: Option<ImageBlob>,
    ) -> Result<Self, MissingImages> {
        match (front, back, selfie) {
            (Some(front), Some(back), Some(selfie)) => Ok(Self::new(front, back, selfie)),
            (front, back, selfie) => {
                let missing = [
                    (ImageSlot::Front, front.is_none()),
                    (ImageSlot::Back, back.is_none()),
                    (ImageSlot::Selfie, selfie.is_none()),
                ]
                .into_iter()
                .filter_map(|(slot, absent)| absent.then_some(slot))
                .collect();
                Err(MissingImages(missing))
            }
        }
    }

    #[must_use]
    pub fn image(&self, slot: ImageSlot) -> &ImageBlob {
        match slot {
            ImageSlot::Front => &self.front,
            ImageSlot::Back => &self.back,
            ImageSlot::Selfie => &self.selfie,
        }
    }

    /// Images in oracle order: front, back, selfie.
    pub fn images(&self) -> impl Iterator<Item = (ImageSlot, &ImageBlob)> {
        ImageSlot::ALL.into_iter().map(|slot| (slot, self.image(slot)))
    }

    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.front.len() + self.back.len() + self.selfie.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg(bytes: &[u8]) -> ImageBlob {
        ImageBlob::new(MediaType::new("image/jpeg"), bytes)
    }

    #[test]
    fn from_parts_accepts_complete_set() {
        let request =
            VerificationRequest::from_parts(Some(jpeg(b"f")), Some(jpeg(b"b")), Some(jpeg(b"s")))
                .unwrap();
        let order: Vec<_> = request.images().map(|(slot, _)| slot).collect();
        assert_eq!(order, ImageSlot::ALL);
        assert_eq!(request.image(ImageSlot::Back).bytes(), b"b");
        assert_eq!(request.total_bytes(), 3);
    }

    #[test]
    fn from_parts_lists_every_missing_slot() {
        let err = VerificationRequest::from_parts(None, Some(jpeg(b"b")), None).unwrap_err();
        assert_eq!(err.0, vec![ImageSlot::Front, ImageSlot::Selfie]);
        assert!(err.to_string().contains("front, selfie"));
    }

    #[test]
    fn blank_media_type_falls_back() {
        assert_eq!(MediaType::new(" ").as_str(), FALLBACK_MEDIA_TYPE);
        assert_eq!(MediaType::new("image/png").as_str(), "image/png");
    }

    #[test]
    fn slot_parse_matches_part_names() {
        assert_eq!(ImageSlot::parse("selfie"), Some(ImageSlot::Selfie));
        assert_eq!(ImageSlot::parse("Selfie"), None);
        assert_eq!(ImageSlot::parse("avatar"), None);
    }

    #[test]
    fn blob_debug_omits_bytes() {
        let debug = format!("{:?}", jpeg(&[0xFF, 0xD8, 0xFF]));
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("255"));
    }
}
