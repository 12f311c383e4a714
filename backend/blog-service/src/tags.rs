/// Comma-separated tag strings from the post form
use crate::error::AppError;
use crate::slug::slugify;

/// A tag as named in the form, with its derived slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagName {
    pub name: String,
    pub slug: String,
}

/// What a save should do with the post's tag associations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagUpdate {
    /// Blank tag string: keep the current associations
    Unchanged,
    /// Replace all associations with these tags, distinct by slug
    Replace(Vec<TagName>),
}

impl TagUpdate {
    /// Parse the raw form value.
    ///
    /// Entries are trimmed and empty ones dropped. Entries sharing a slug
    /// collapse to the first one, so `"Tech, tech, TECH"` names a single tag.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Ok(TagUpdate::Unchanged);
        }

        let mut tags: Vec<TagName> = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let slug = slugify(entry);
            if slug.is_empty() {
                return Err(AppError::Validation(format!(
                    "Tag '{}' must contain letters or digits",
                    entry
                )));
            }
            if tags.iter().any(|t| t.slug == slug) {
                continue;
            }
            tags.push(TagName {
                name: entry.to_string(),
                slug,
            });
        }

        Ok(TagUpdate::Replace(tags))
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, TagUpdate::Unchanged)
    }
}

/// Tag names joined the way the edit form shows them
pub fn join_names<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names.into_iter().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replaced(raw: &str) -> Vec<TagName> {
        match TagUpdate::parse(raw).unwrap() {
            TagUpdate::Replace(tags) => tags,
            TagUpdate::Unchanged => panic!("expected replacement for {:?}", raw),
        }
    }

    #[test]
    fn test_blank_is_unchanged() {
        assert!(TagUpdate::parse("").unwrap().is_unchanged());
        assert!(TagUpdate::parse("   ").unwrap().is_unchanged());
    }

    #[test]
    fn test_splits_and_trims() {
        let tags = replaced("politics, world");
        assert_eq!(
            tags,
            vec![
                TagName {
                    name: "politics".into(),
                    slug: "politics".into()
                },
                TagName {
                    name: "world".into(),
                    slug: "world".into()
                },
            ]
        );
    }

    #[test]
    fn test_drops_empty_entries() {
        let tags = replaced(" , Rust,, ,Web Dev ,");
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Web Dev"]);
        assert_eq!(tags[1].slug, "web-dev");
    }

    #[test]
    fn test_only_commas_replaces_with_nothing() {
        assert!(replaced(",,,").is_empty());
    }

    #[test]
    fn test_case_variants_collapse_first_wins() {
        let tags = replaced("Tech, tech, TECH");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "Tech");
        assert_eq!(tags[0].slug, "tech");
    }

    #[test]
    fn test_symbol_only_entry_rejected() {
        let err = TagUpdate::parse("rust, !!!").unwrap_err();
        assert_eq!(err.to_string(), "Tag '!!!' must contain letters or digits");
    }

    #[test]
    fn test_join_names() {
        assert_eq!(join_names(["politics", "world"]), "politics, world");
        assert_eq!(join_names(Vec::<&str>::new()), "");
    }
}
