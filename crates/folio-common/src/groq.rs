//! GROQ queries for the blog content.
//!
//! Every post query projects the same field list so all of them decode into
//! [`crate::model::Post`].

/// Projection shared by every post query.
pub const POST_FIELDS: &str = r#"
  _id,
  title,
  slug,
  excerpt,
  mainImage,
  publishedAt,
  featured,
  viewCount,
  author->{
    name,
    image
  },
  categories[]->{
    _id,
    title,
    slug
  },
  tags[]->{
    _id,
    title,
    slug,
    color
  },
  body
"#;

pub fn posts() -> String {
    format!(r#"*[_type == "post"] | order(publishedAt desc) {{{POST_FIELDS}}}"#)
}

/// Takes `$slug`.
pub fn post_by_slug() -> String {
    format!(r#"*[_type == "post" && slug.current == $slug][0] {{{POST_FIELDS}}}"#)
}

/// Takes `$categorySlug`.
pub fn posts_by_category() -> String {
    format!(
        r#"*[_type == "post" && references(*[_type == "category" && slug.current == $categorySlug]._id)] | order(publishedAt desc) {{{POST_FIELDS}}}"#
    )
}

/// Takes `$tagSlug`.
pub fn posts_by_tag() -> String {
    format!(
        r#"*[_type == "post" && references(*[_type == "tag" && slug.current == $tagSlug]._id)] | order(publishedAt desc) {{{POST_FIELDS}}}"#
    )
}

/// The three newest featured posts.
pub fn featured_posts() -> String {
    format!(
        r#"*[_type == "post" && featured == true] | order(publishedAt desc) [0...3] {{{POST_FIELDS}}}"#
    )
}

/// Prefix match over title, excerpt, body text, category and tag titles.
/// Takes `$searchQuery`.
pub fn search_posts() -> String {
    format!(
        r#"*[
  _type == "post" && (
    title match $searchQuery + "*" ||
    excerpt match $searchQuery + "*" ||
    pt::text(body) match $searchQuery + "*" ||
    categories[]->title match $searchQuery + "*" ||
    tags[]->title match $searchQuery + "*"
  )
] | order(publishedAt desc) {{{POST_FIELDS}}}"#
    )
}

pub const CATEGORIES: &str = r#"*[_type == "category"] | order(title asc) {
  _id,
  title,
  slug,
  description
}"#;

pub const TAGS: &str = r#"*[_type == "tag"] | order(title asc) {
  _id,
  title,
  slug,
  color
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_queries_share_projection() {
        for query in [
            posts(),
            post_by_slug(),
            posts_by_category(),
            posts_by_tag(),
            featured_posts(),
            search_posts(),
        ] {
            assert!(query.contains(POST_FIELDS), "missing projection in {query}");
            assert!(query.trim_end().ends_with('}'));
        }
    }

    #[test]
    fn parameterized_queries_name_their_params() {
        assert!(post_by_slug().contains("$slug"));
        assert!(posts_by_category().contains("$categorySlug"));
        assert!(posts_by_tag().contains("$tagSlug"));
        assert!(search_posts().contains("$searchQuery"));
    }
}
