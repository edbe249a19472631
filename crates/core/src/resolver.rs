//! External course identifiers and their resolution to row keys.
//!
//! Identifiers are minted from a course's title (see [`slugify`]) with the
//! row key appended as a trailing `-<id>` suffix. Courses in the
//! `weekly-checkins` category use `weekly-checkins-<level>-<id>` instead.
//!
//! [`IdentifierResolver::resolve`] tries, in order:
//!
//! 1. the numeric suffix as a direct row-key lookup (an all-digit
//!    identifier is itself the candidate row key),
//! 2. a title-pattern match of the whole normalized identifier,
//! 3. otherwise [`ResolveError::NotFound`].
//!
//! A suffix naming a missing row is never stripped to retry on the title:
//! `ai-course-42` for a deleted course must not resolve to another course
//! titled "AI Course".
//!
//! When two courses normalize to the same pattern the lowest row key wins.
//! That is a known ambiguity of hand-typed identifiers, not a guarantee.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::types::DbId;

/// Category whose identifiers are built from the level instead of the title.
pub const WEEKLY_CHECKINS_CATEGORY: &str = "weekly-checkins";

/// Lower-case `input`, strip everything but ASCII letters, digits and
/// whitespace, and join the remaining words with single hyphens.
///
/// ```
/// use academy_core::resolver::slugify;
///
/// assert_eq!(slugify("AI & Machine Learning"), "ai-machine-learning");
/// assert_eq!(slugify("  Rust: The Basics! "), "rust-the-basics");
/// ```
pub fn slugify(input: &str) -> String {
    let cleaned: String = input
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

/// The fields identifier generation and title matching need from a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseIdentity {
    pub id: DbId,
    pub title: String,
    pub category: Option<String>,
    pub level: Option<String>,
}

impl CourseIdentity {
    fn is_weekly_checkin(&self) -> bool {
        self.category.as_deref() == Some(WEEKLY_CHECKINS_CATEGORY)
    }

    /// Identifier without the row-key suffix.
    pub fn pattern(&self) -> String {
        if self.is_weekly_checkin() {
            let level = slugify(self.level.as_deref().unwrap_or_default());
            format!("{WEEKLY_CHECKINS_CATEGORY}-{level}")
        } else {
            slugify(&self.title)
        }
    }

    /// Whether a normalized candidate names this course by title or pattern.
    fn matches(&self, candidate: &str) -> bool {
        if slugify(&self.title) == candidate {
            return true;
        }
        self.is_weekly_checkin() && self.pattern() == candidate
    }
}

/// Generate the external identifier a client uses to address `course`.
pub fn external_id_for(course: &CourseIdentity) -> String {
    format!("{}-{}", course.pattern(), course.id)
}

/// Parse the trailing `-<digits>` suffix of an identifier, if any. Without a
/// hyphen the whole identifier is the suffix.
pub fn numeric_suffix(external_id: &str) -> Option<DbId> {
    let tail = external_id
        .rsplit_once('-')
        .map_or(external_id, |(_, tail)| tail);
    if tail.is_empty() || !tail.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    tail.parse().ok()
}

/// The form an identifier is compared against normalized titles in.
pub fn title_candidate(external_id: &str) -> String {
    external_id.trim().to_lowercase()
}

/// Return the lowest row key among `courses` whose title or pattern matches
/// the normalized `candidate`.
pub fn match_title_pattern<'a, I>(courses: I, candidate: &str) -> Option<DbId>
where
    I: IntoIterator<Item = &'a CourseIdentity>,
{
    courses
        .into_iter()
        .filter(|c| c.matches(candidate))
        .map(|c| c.id)
        .min()
}

// ---------------------------------------------------------------------------
// Storage port
// ---------------------------------------------------------------------------

/// Storage queries the resolver depends on.
#[async_trait]
pub trait CourseLookup: Send + Sync {
    type Error: Send;

    /// Return `candidate` if a course with that row key exists.
    async fn find_course_row_key(&self, candidate: DbId) -> Result<Option<DbId>, Self::Error>;

    /// Return the row key of the course whose normalized title (or
    /// weekly-checkins pattern) equals `normalized`, lowest key first.
    async fn find_course_by_title_pattern(
        &self,
        normalized: &str,
    ) -> Result<Option<DbId>, Self::Error>;
}

/// Failure to resolve an external identifier.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError<E> {
    /// No course matches the identifier. Surface as "course not found".
    #[error("Course not found: {0}")]
    NotFound(String),

    /// The storage query itself failed.
    #[error("Course lookup failed: {0}")]
    Lookup(E),
}

impl<E> ResolveError<E> {
    /// Convert a resolution failure into a domain error, mapping storage
    /// failures through `on_lookup`.
    pub fn into_core(self, on_lookup: impl FnOnce(E) -> CoreError) -> CoreError {
        match self {
            ResolveError::NotFound(id) => CoreError::CourseNotFound(id),
            ResolveError::Lookup(e) => on_lookup(e),
        }
    }
}

/// How an identifier was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    NumericSuffix,
    TitlePattern,
}

/// Maps external identifiers to row keys through a [`CourseLookup`].
///
/// This is the single place identifier resolution happens; every caller
/// addressing a course by external id goes through it.
#[derive(Debug, Clone)]
pub struct IdentifierResolver<L> {
    lookup: L,
}

impl<L: CourseLookup> IdentifierResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self { lookup }
    }

    /// Resolve `external_id` to the row key of a course.
    pub async fn resolve(&self, external_id: &str) -> Result<DbId, ResolveError<L::Error>> {
        self.resolve_with_path(external_id)
            .await
            .map(|(id, _)| id)
    }

    /// Like [`resolve`](Self::resolve), also reporting which path matched.
    pub async fn resolve_with_path(
        &self,
        external_id: &str,
    ) -> Result<(DbId, ResolvedVia), ResolveError<L::Error>> {
        if let Some(candidate) = numeric_suffix(external_id) {
            if let Some(id) = self
                .lookup
                .find_course_row_key(candidate)
                .await
                .map_err(ResolveError::Lookup)?
            {
                return Ok((id, ResolvedVia::NumericSuffix));
            }
        }

        if let Some(id) = self
            .lookup
            .find_course_by_title_pattern(&title_candidate(external_id))
            .await
            .map_err(ResolveError::Lookup)?
        {
            return Ok((id, ResolvedVia::TitlePattern));
        }

        Err(ResolveError::NotFound(external_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use assert_matches::assert_matches;

    use super::*;

    struct FixedCourses(Vec<CourseIdentity>);

    #[async_trait]
    impl CourseLookup for FixedCourses {
        type Error = Infallible;

        async fn find_course_row_key(&self, candidate: DbId) -> Result<Option<DbId>, Infallible> {
            Ok(self.0.iter().find(|c| c.id == candidate).map(|c| c.id))
        }

        async fn find_course_by_title_pattern(
            &self,
            normalized: &str,
        ) -> Result<Option<DbId>, Infallible> {
            Ok(match_title_pattern(&self.0, normalized))
        }
    }

    fn course(id: DbId, title: &str) -> CourseIdentity {
        CourseIdentity {
            id,
            title: title.to_string(),
            category: None,
            level: None,
        }
    }

    fn weekly(id: DbId, level: &str) -> CourseIdentity {
        CourseIdentity {
            id,
            title: "Weekly Check-in".to_string(),
            category: Some(WEEKLY_CHECKINS_CATEGORY.to_string()),
            level: Some(level.to_string()),
        }
    }

    #[test]
    fn slugify_collapses_whitespace_and_strips_symbols() {
        assert_eq!(slugify("Intro  to   SQL"), "intro-to-sql");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
        assert_eq!(slugify("Full-Stack Dev"), "fullstack-dev");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn external_id_appends_row_key() {
        assert_eq!(external_id_for(&course(42, "AI Course")), "ai-course-42");
    }

    #[test]
    fn weekly_checkins_use_level_pattern() {
        assert_eq!(
            external_id_for(&weekly(9, "Intermediate")),
            "weekly-checkins-intermediate-9"
        );
    }

    #[test]
    fn numeric_suffix_requires_all_digits() {
        assert_eq!(numeric_suffix("ai-course-42"), Some(42));
        assert_eq!(numeric_suffix("ai-course-4a"), None);
        assert_eq!(numeric_suffix("ai-course-"), None);
        assert_eq!(numeric_suffix("42"), Some(42));
        assert_eq!(numeric_suffix("ai-course"), None);
    }

    #[test]
    fn title_match_prefers_lowest_row_key() {
        let courses = vec![course(8, "Rust Basics"), course(3, "Rust: Basics")];
        assert_eq!(match_title_pattern(&courses, "rust-basics"), Some(3));
    }

    #[tokio::test]
    async fn generated_identifiers_round_trip() {
        let courses = vec![
            course(1, "AI Course"),
            course(2, "AI Course"),
            weekly(3, "Beginner"),
            course(4, "Data & Ethics"),
        ];
        let resolver = IdentifierResolver::new(FixedCourses(courses.clone()));
        for c in &courses {
            let id = resolver.resolve(&external_id_for(c)).await.unwrap();
            assert_eq!(id, c.id);
        }
    }

    #[tokio::test]
    async fn fast_path_reports_numeric_suffix() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![course(42, "AI Course")]));
        let (id, via) = resolver.resolve_with_path("ai-course-42").await.unwrap();
        assert_eq!(id, 42);
        assert_eq!(via, ResolvedVia::NumericSuffix);
    }

    #[tokio::test]
    async fn missing_row_does_not_match_same_titled_course() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![course(7, "AI Course")]));
        let err = resolver.resolve("ai-course-42").await.unwrap_err();
        assert_matches!(err, ResolveError::NotFound(_));
    }

    #[tokio::test]
    async fn title_ending_in_digits_matches_whole_identifier() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![course(3, "Rust 2024")]));
        let (id, via) = resolver.resolve_with_path("rust-2024").await.unwrap();
        assert_eq!(id, 3);
        assert_eq!(via, ResolvedVia::TitlePattern);
    }

    #[tokio::test]
    async fn bare_row_key_resolves() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![course(42, "AI Course")]));
        let (id, via) = resolver.resolve_with_path("42").await.unwrap();
        assert_eq!(id, 42);
        assert_eq!(via, ResolvedVia::NumericSuffix);
    }

    #[tokio::test]
    async fn hand_typed_identifier_without_suffix_resolves() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![course(5, "Deep Work")]));
        assert_eq!(resolver.resolve("Deep-Work").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn weekly_pattern_without_suffix_resolves() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![weekly(11, "Advanced")]));
        assert_eq!(
            resolver.resolve("weekly-checkins-advanced").await.unwrap(),
            11
        );
    }

    #[tokio::test]
    async fn unknown_identifier_is_not_found() {
        let resolver = IdentifierResolver::new(FixedCourses(vec![course(1, "Other")]));
        let err = resolver.resolve("ai-course-42").await.unwrap_err();
        assert_matches!(err, ResolveError::NotFound(id) if id == "ai-course-42");
    }

    #[test]
    fn not_found_maps_to_course_not_found() {
        let err: ResolveError<Infallible> = ResolveError::NotFound("x-1".into());
        assert_matches!(
            err.into_core(|e| match e {}),
            CoreError::CourseNotFound(id) if id == "x-1"
        );
    }
}
