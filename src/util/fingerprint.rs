use crate::model::Posting;

/// Stable content hash of a posting, used as its id when the collector gave none.
///
/// Built from `source`, `url` and `title` (falling back to `text`). Matching never
/// looks at it.
pub fn fingerprint(posting: &Posting) -> String {
    let heading = match posting.title() {
        "" => posting.text(),
        title => title,
    };
    let raw = format!("{}\u{1f}{}\u{1f}{}", posting.source, posting.url(), heading);
    let digest = md5::compute(raw.as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_posting_same_fingerprint() {
        let posting = Posting::new("hackernews")
            .with_url("https://news.ycombinator.com/item?id=1")
            .with_title("Who is hiring?");
        assert_eq!(fingerprint(&posting), fingerprint(&posting.clone()));
        assert_eq!(fingerprint(&posting).len(), 32);
    }

    #[test]
    fn fingerprint_ignores_id_and_body_when_title_present() {
        let a = Posting::new("s").with_title("Need SEO").with_text("one body");
        let b = a.clone().with_id("x").with_text("another body");
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_falls_back_to_text() {
        let a = Posting::new("s").with_text("looking for a copywriter");
        let b = Posting::new("s").with_text("looking for a designer");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_separates_fields() {
        let a = Posting::new("ab").with_title("c");
        let b = Posting::new("a").with_title("bc");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_depends_on_source() {
        let a = Posting::new("reddit").with_title("Need SEO");
        let b = Posting::new("hackernews").with_title("Need SEO");
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
