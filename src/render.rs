//! HTML rendering.
//!
//! Every page the site serves is produced here with
//! [maud](https://maud.lambda.xyz/). Templates are plain functions from
//! already-fetched data to [`Markup`]; nothing in this module performs I/O,
//! which is what lets the build job, the fallback path and the revalidation
//! timer share them.
//!
//! ## Pages
//!
//! - **Home** (`/`): post list with a "load more" link to `/?pages=N+1`, shown
//!   only while the feed has a next page and `N` is below the page limit.
//! - **Post** (`/post/{slug}`): either the loading placeholder (fallback) or
//!   the full post with its reading time.
//! - **Not found** and **error** pages for the request-time paths.
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time and inlined into every page,
//! after the color custom properties generated from config.

use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::config::{self, SiteConfig};
use crate::dates::format_publication_date;
use crate::pagination::PostFeed;
use crate::reading_time::reading_time_minutes;
use crate::types::{PostDetail, PostSummary};

const CSS_STATIC: &str = include_str!("../static/style.css");
const LOGO_SVG: &str = include_str!("../static/logo.svg");

/// Seconds between reloads of the fallback page while a post is generated.
pub const FALLBACK_REFRESH_SECS: u32 = 2;

/// Loading state of a post page.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailState {
    /// Data not available yet; the page is being generated on demand.
    Fallback,
    Ready(PostDetail),
}

/// Site-wide values every page needs.
#[derive(Debug, Clone)]
pub struct PageContext {
    pub site_title: String,
    pub lang: String,
    pub css: String,
}

impl PageContext {
    pub fn from_config(config: &SiteConfig) -> Self {
        let color_css = config::generate_color_css(&config.colors);
        Self {
            site_title: config.site.title.clone(),
            lang: config.site.lang.clone(),
            css: format!("{}\n\n{}", color_css, CSS_STATIC),
        }
    }

    fn page_title(&self, prefix: &str) -> String {
        format!("{} | {}", prefix, self.site_title)
    }
}

/// Where the list page's "load more" control points.
pub fn load_more_href(pages_shown: usize) -> String {
    format!("/?pages={}", pages_shown + 1)
}

/// URL of a post's detail page.
pub fn post_href(uid: &str) -> String {
    format!("/post/{uid}")
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(
    ctx: &PageContext,
    title: &str,
    refresh_secs: Option<u32>,
    content: Markup,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang=(ctx.lang) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                @if let Some(secs) = refresh_secs {
                    meta http-equiv="refresh" content=(secs);
                }
                title { (title) }
                style { (PreEscaped(&ctx.css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Site header: the logo, linking home.
fn site_header() -> Markup {
    html! {
        header.container {
            nav.site-header {
                a href="/" aria-label="Home" { (PreEscaped(LOGO_SVG)) }
            }
        }
    }
}

/// Date and author line shared by list entries and post pages.
fn post_info(post_date: &str, author: &str, reading_minutes: Option<usize>) -> Markup {
    html! {
        div.info {
            @if !post_date.is_empty() {
                span.info-date { time { (post_date) } }
            }
            @if !author.is_empty() {
                span.info-author { (author) }
            }
            @if let Some(minutes) = reading_minutes {
                span.info-reading-time { (minutes) " min" }
            }
        }
    }
}

fn post_entry(post: &PostSummary) -> Markup {
    let date = format_publication_date(post.first_publication_date.as_ref());
    let body = html! {
        h2 { (post.title) }
        @if !post.subtitle.is_empty() {
            p.subtitle { (post.subtitle) }
        }
        (post_info(&date, &post.author, None))
    };
    html! {
        @match &post.uid {
            Some(uid) => {
                a.post id={ "post-" (uid) } href=(post_href(uid)) { (body) }
            }
            None => {
                div.post { (body) }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the home page from the current feed state.
///
/// `pages_shown` is how many pages the feed holds; it determines the target of
/// the "load more" link. The link is replaced by a notice once `pages_shown`
/// reaches `max_pages`, since a deeper request would be clamped back to the
/// same page. `load_error` is shown above the control when the last load
/// failed, and the control then retries the same page.
pub fn render_home(
    ctx: &PageContext,
    feed: &PostFeed,
    pages_shown: usize,
    max_pages: usize,
    load_error: Option<&str>,
) -> Markup {
    let content = html! {
        (site_header())
        main.container.posts {
            @for post in feed.posts() {
                (post_entry(post))
            }
            @if feed.posts().is_empty() {
                p.empty { "Nenhum post publicado ainda." }
            }
            @if let Some(message) = load_error {
                p.load-error role="alert" {
                    "Não foi possível carregar mais posts. "
                    small { (message) }
                }
            }
            @if feed.has_more() {
                @if pages_shown < max_pages {
                    a.load-more href=(load_more_href(pages_shown)) { "Carregar mais posts" }
                } @else {
                    p.load-limit { "Limite de posts por página atingido." }
                }
            }
        }
    };

    base_document(ctx, &ctx.page_title("Posts"), None, content)
}

/// Renders a post page in its current loading state.
///
/// The fallback state renders only the loading indicator; no reading time or
/// other content is computed.
pub fn render_post(ctx: &PageContext, state: &DetailState) -> Markup {
    match state {
        DetailState::Fallback => {
            let content = html! {
                (site_header())
                div.container.loading {
                    h1 { "Carregando..." }
                }
            };
            base_document(
                ctx,
                &ctx.page_title("Carregando"),
                Some(FALLBACK_REFRESH_SECS),
                content,
            )
        }
        DetailState::Ready(post) => render_post_ready(ctx, post),
    }
}

fn render_post_ready(ctx: &PageContext, post: &PostDetail) -> Markup {
    let date = format_publication_date(post.first_publication_date.as_ref());
    let minutes = reading_time_minutes(&post.content);

    let content = html! {
        (site_header())
        @if let Some(url) = &post.banner_url {
            img.banner src=(url) alt="banner";
        }
        main.container.post-content {
            article {
                h1 { (post.title) }
                (post_info(&date, &post.author, Some(minutes)))
                @for block in &post.content {
                    section.block {
                        @if !block.heading.is_empty() {
                            h2 { (block.heading) }
                        }
                        @for text in &block.body {
                            p { (text) }
                        }
                    }
                }
            }
        }
    };

    base_document(ctx, &ctx.page_title(&post.title), None, content)
}

/// Renders the 404 page.
pub fn render_not_found(ctx: &PageContext) -> Markup {
    let content = html! {
        (site_header())
        main.container.message {
            h1 { "Post não encontrado" }
            a href="/" { "Voltar para a página inicial" }
        }
    };
    base_document(ctx, &ctx.page_title("Não encontrado"), None, content)
}

/// Renders the upstream-failure page. The message is shown to the reader.
pub fn render_error(ctx: &PageContext, message: &str) -> Markup {
    let content = html! {
        (site_header())
        main.container.message {
            h1 { "Algo deu errado" }
            p { "Não foi possível carregar o conteúdo. Tente novamente em instantes." }
            p.detail { small { (message) } }
            a href="/" { "Voltar para a página inicial" }
        }
    };
    base_document(ctx, &ctx.page_title("Erro"), None, content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentBlock, PostPage};
    use chrono::{TimeZone, Utc};

    fn ctx() -> PageContext {
        PageContext::from_config(&SiteConfig::default())
    }

    fn summary(uid: &str, title: &str) -> PostSummary {
        PostSummary {
            uid: Some(uid.to_string()),
            first_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, 15, 10, 0, 0).unwrap()),
            title: title.to_string(),
            subtitle: "Pensando em sincronização".to_string(),
            author: "Joseph Oliveira".to_string(),
        }
    }

    fn feed(posts: Vec<PostSummary>, next: Option<&str>) -> PostFeed {
        PostFeed::new(PostPage {
            results: posts,
            next_page: next.map(str::to_string),
        })
    }

    fn detail(paragraphs: &[&str]) -> PostDetail {
        PostDetail {
            uid: Some("como-utilizar-hooks".to_string()),
            first_publication_date: Some(Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap()),
            title: "Como utilizar Hooks".to_string(),
            subtitle: String::new(),
            author: "Danilo Vieira".to_string(),
            banner_url: Some("https://images.prismic.io/banner.png".to_string()),
            content: vec![ContentBlock {
                heading: "Proin et varius".to_string(),
                body: paragraphs.iter().map(|p| p.to_string()).collect(),
            }],
        }
    }

    #[test]
    fn home_lists_posts_with_links_and_dates() {
        let html = render_home(&ctx(), &feed(vec![summary("a", "Post A")], None), 1, 50, None)
            .into_string();
        assert!(html.contains("Post A"));
        assert!(html.contains(r#"href="/post/a""#));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains("Joseph Oliveira"));
        assert!(html.contains("<title>Posts | spacetraveling</title>"));
    }

    #[test]
    fn home_shows_load_more_only_with_cursor() {
        let with_more = render_home(&ctx(), &feed(vec![summary("a", "A")], Some("c1")), 1, 50, None)
            .into_string();
        assert!(with_more.contains("Carregar mais posts"));
        assert!(with_more.contains(r#"href="/?pages=2""#));

        let last = render_home(&ctx(), &feed(vec![summary("a", "A")], None), 1, 50, None)
            .into_string();
        assert!(!last.contains("Carregar mais posts"));
    }

    #[test]
    fn home_at_page_limit_has_no_load_more_link() {
        let posts = vec![summary("a", "A"), summary("b", "B")];
        let html = render_home(&ctx(), &feed(posts, Some("c2")), 2, 2, None).into_string();
        assert!(!html.contains("Carregar mais posts"));
        assert!(!html.contains(r#"href="/?pages=3""#));
        assert!(html.contains("load-limit"));

        let below = render_home(&ctx(), &feed(vec![summary("a", "A")], Some("c1")), 1, 2, None)
            .into_string();
        assert!(below.contains(r#"href="/?pages=2""#));
        assert!(!below.contains("load-limit"));
    }

    #[test]
    fn home_shows_load_error_and_retry() {
        let html = render_home(
            &ctx(),
            &feed(vec![summary("a", "A")], Some("c1")),
            1,
            50,
            Some("status 503"),
        )
        .into_string();
        assert!(html.contains("load-error"));
        assert!(html.contains("status 503"));
        // retry targets the same next page
        assert!(html.contains(r#"href="/?pages=2""#));
    }

    #[test]
    fn home_renders_unlinked_post_without_uid() {
        let mut post = summary("a", "Orphan");
        post.uid = None;
        let html = render_home(&ctx(), &feed(vec![post], None), 1, 50, None).into_string();
        assert!(html.contains("Orphan"));
        assert!(!html.contains("/post/"));
    }

    #[test]
    fn home_with_no_posts_says_so() {
        let html = render_home(&ctx(), &feed(vec![], None), 1, 50, None).into_string();
        assert!(html.contains("Nenhum post"));
    }

    #[test]
    fn fallback_renders_loading_without_content() {
        let html = render_post(&ctx(), &DetailState::Fallback).into_string();
        assert!(html.contains("Carregando..."));
        assert!(html.contains(r#"http-equiv="refresh""#));
        assert!(!html.contains(" min</span>"));
        assert!(!html.contains(r#"class="info-reading-time""#));
    }

    #[test]
    fn ready_post_renders_content_and_reading_time() {
        let html = render_post(&ctx(), &DetailState::Ready(detail(&["Um dois três"])))
            .into_string();
        assert!(html.contains("<h1>Como utilizar Hooks</h1>"));
        assert!(html.contains("<h2>Proin et varius</h2>"));
        assert!(html.contains("<p>Um dois três</p>"));
        assert!(html.contains("25 mar 2021"));
        assert!(html.contains("1 min"));
        assert!(html.contains("https://images.prismic.io/banner.png"));
        assert!(!html.contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn empty_post_reads_in_zero_minutes() {
        let mut post = detail(&[]);
        post.content.clear();
        post.banner_url = None;
        let html = render_post(&ctx(), &DetailState::Ready(post)).into_string();
        assert!(html.contains("0 min"));
        assert!(!html.contains(r#"alt="banner""#));
    }

    #[test]
    fn not_found_and_error_pages() {
        let nf = render_not_found(&ctx()).into_string();
        assert!(nf.contains("Post não encontrado"));

        let err = render_error(&ctx(), "content API returned status 502").into_string();
        assert!(err.contains("Algo deu errado"));
        assert!(err.contains("status 502"));
    }

    #[test]
    fn css_includes_config_colors() {
        let html = render_not_found(&ctx()).into_string();
        assert!(html.contains("--color-highlight: #ff57b2"));
    }

    #[test]
    fn post_text_is_escaped() {
        let mut post = detail(&["<script>alert('xss')</script>"]);
        post.title = "<b>bold</b>".to_string();
        let html = render_post(&ctx(), &DetailState::Ready(post)).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    }
}
