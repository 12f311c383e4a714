/// Post form input and its shape validation
///
/// Validation runs before any backend call and reports only the first
/// violated constraint, in field order title, content, tags.
use std::borrow::Cow;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::AppError;
use crate::slug::slugify;
use crate::tags::TagUpdate;

pub const TITLE_MIN_CHARS: usize = 5;
pub const TITLE_MAX_CHARS: usize = 200;
pub const CONTENT_MIN_CHARS: usize = 50;
pub const CONTENT_MAX_CHARS: usize = 50_000;

const FIELD_ORDER: [&str; 3] = ["title", "content", "tags"];

/// Submitted post form
#[derive(Debug, Clone, Default, Validate)]
pub struct PostInput {
    #[validate(custom(function = "validate_title"))]
    pub title: String,
    #[validate(custom(function = "validate_content"))]
    pub content: String,
    #[validate(length(max = 200, message = "Tags must be less than 200 characters"))]
    pub tags: String,
}

/// An image file attached to the form
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Lowercased extension from the file name, `bin` when there is none
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.trim().to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or_else(|| "bin".to_string())
    }

    /// Check content type and size before uploading
    pub fn check(&self, max_bytes: usize) -> Result<(), AppError> {
        let is_image = self
            .content_type
            .parse::<mime::Mime>()
            .map(|m| m.type_() == mime::IMAGE)
            .unwrap_or(false);
        if !is_image {
            return Err(AppError::Validation(
                "Featured image must be an image file".to_string(),
            ));
        }
        if self.bytes.is_empty() {
            return Err(AppError::Validation(
                "Featured image file is empty".to_string(),
            ));
        }
        if self.bytes.len() > max_bytes {
            return Err(AppError::Validation(format!(
                "Featured image must be smaller than {} bytes",
                max_bytes
            )));
        }
        Ok(())
    }
}

impl PostInput {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: tags.into(),
        }
    }

    /// Validate the form and parse its tag string
    ///
    /// Returns the first violated constraint as [`AppError::Validation`].
    pub fn check(&self) -> Result<TagUpdate, AppError> {
        if let Err(errors) = self.validate() {
            return Err(AppError::Validation(first_message(&errors)));
        }
        if slugify(&self.title).is_empty() {
            return Err(AppError::Validation(
                "Title must contain letters or digits".to_string(),
            ));
        }
        TagUpdate::parse(&self.tags)
    }
}

fn first_message(errors: &ValidationErrors) -> String {
    let fields = errors.field_errors();
    FIELD_ORDER
        .iter()
        .filter_map(|field| fields.get(*field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input".to_string())
}

fn char_bounds(
    value: &str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    let count = value.chars().count();
    if count < min {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(too_short)));
    }
    if count > max {
        return Err(ValidationError::new("length").with_message(Cow::Borrowed(too_long)));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), ValidationError> {
    char_bounds(
        title,
        TITLE_MIN_CHARS,
        TITLE_MAX_CHARS,
        "Title must be at least 5 characters",
        "Title must be less than 200 characters",
    )
}

fn validate_content(content: &str) -> Result<(), ValidationError> {
    char_bounds(
        content,
        CONTENT_MIN_CHARS,
        CONTENT_MAX_CHARS,
        "Content must be at least 50 characters",
        "Content must be less than 50000 characters",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> String {
        "This body is comfortably longer than the fifty character minimum.".to_string()
    }

    fn message(input: &PostInput) -> String {
        match input.check() {
            Err(AppError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_input_passes() {
        let input = PostInput::new("Big News Today!!!", body(), "politics, world");
        assert!(input.check().is_ok());
    }

    #[test]
    fn test_title_bounds() {
        assert_eq!(
            message(&PostInput::new("Hey", body(), "")),
            "Title must be at least 5 characters"
        );
        assert_eq!(
            message(&PostInput::new("t".repeat(201), body(), "")),
            "Title must be less than 200 characters"
        );
        assert!(PostInput::new("t".repeat(200), body(), "").check().is_ok());
    }

    #[test]
    fn test_content_bounds() {
        assert_eq!(
            message(&PostInput::new("Valid title", "too short", "")),
            "Content must be at least 50 characters"
        );
        assert_eq!(
            message(&PostInput::new("Valid title", "c".repeat(50_001), "")),
            "Content must be less than 50000 characters"
        );
    }

    #[test]
    fn test_tags_bound() {
        assert_eq!(
            message(&PostInput::new("Valid title", body(), "t".repeat(201))),
            "Tags must be less than 200 characters"
        );
    }

    #[test]
    fn test_first_violation_wins() {
        let input = PostInput::new("Hey", "short", "t".repeat(300));
        assert_eq!(message(&input), "Title must be at least 5 characters");

        let input = PostInput::new("Valid title", "short", "t".repeat(300));
        assert_eq!(message(&input), "Content must be at least 50 characters");
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // Four two-byte characters: eight bytes but still too short.
        assert_eq!(
            message(&PostInput::new("éééé", body(), "")),
            "Title must be at least 5 characters"
        );
        assert!(PostInput::new("ééééé", body(), "").check().is_ok());
    }

    #[test]
    fn test_title_without_slug_rejected() {
        assert_eq!(
            message(&PostInput::new("!!!!!!", body(), "")),
            "Title must contain letters or digits"
        );
    }

    #[test]
    fn test_image_extension() {
        let image = |name: &str| ImageUpload {
            file_name: name.into(),
            content_type: "image/png".into(),
            bytes: vec![1],
        };
        assert_eq!(image("photo.PNG").extension(), "png");
        assert_eq!(image("archive.tar.gz").extension(), "gz");
        assert_eq!(image("noext").extension(), "bin");
        assert_eq!(image("weird.p/ng").extension(), "bin");
    }

    #[test]
    fn test_image_check() {
        let mut image = ImageUpload {
            file_name: "a.png".into(),
            content_type: "image/png".into(),
            bytes: vec![0; 10],
        };
        assert!(image.check(10).is_ok());
        assert!(image.check(9).is_err());

        image.content_type = "text/plain".into();
        assert!(image.check(10).is_err());

        image.content_type = "image/jpeg".into();
        image.bytes.clear();
        assert!(image.check(10).is_err());
    }
}
