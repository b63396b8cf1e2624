//! CLI output formatting.
//!
//! Output is **content-centric**: posts are listed by position and title,
//! with the page they were written to as secondary information.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Home → index.html (1 post, more available)
//!
//! Posts
//! 001 Como utilizar Hooks → post/como-utilizar-hooks/index.html
//! 002 Criando um app CRA do zero → post/criando-um-app-cra-do-zero/index.html
//!
//! Generated 1 home page, 2 post pages
//! Cache: 1 unchanged, 2 written (3 total)
//! ```
//!
//! ## Check
//!
//! ```text
//! Config
//!     Endpoint: https://spacetraveling.cdn.prismic.io/api/v2
//!     Access token: none
//!     Document type: posts
//!     Page size: 1
//! Content
//!     1 post on the first page, more available
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure.

use std::net::SocketAddr;

use crate::cache::CacheStats;
use crate::config::SiteConfig;
use crate::generate::{HomePage, Site, post_page_path};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn home_summary(home: &HomePage) -> String {
    let more = if home.has_more {
        ", more available"
    } else {
        ""
    };
    format!("{}{}", plural(home.posts, "post", "posts"), more)
}

pub fn format_build_output(site: &Site, stats: &CacheStats) -> Vec<String> {
    let mut lines = vec![format!("Home \u{2192} index.html ({})", home_summary(&site.home))];

    if !site.posts.is_empty() {
        lines.push(String::new());
        lines.push("Posts".to_string());
        for (i, post) in site.posts.iter().enumerate() {
            let title = if post.title.is_empty() {
                format!("({})", post.slug)
            } else {
                post.title.clone()
            };
            lines.push(format!(
                "{} {} \u{2192} {}",
                format_index(i + 1),
                title,
                post_page_path(&post.slug)
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated 1 home page, {}",
        plural(site.posts.len(), "post page", "post pages")
    ));
    lines.push(format!("Cache: {}", stats));
    lines
}

pub fn print_build_output(site: &Site, stats: &CacheStats) {
    for line in format_build_output(site, stats) {
        println!("{}", line);
    }
}

pub fn format_check_output(config: &SiteConfig, home: &HomePage) -> Vec<String> {
    let token = if config.prismic.access_token.is_empty() {
        "none"
    } else {
        "set"
    };
    vec![
        "Config".to_string(),
        format!("    Endpoint: {}", config.prismic.endpoint),
        format!("    Access token: {}", token),
        format!("    Document type: {}", config.prismic.document_type),
        format!("    Page size: {}", config.listing.page_size),
        "Content".to_string(),
        format!(
            "    {} on the first page{}",
            plural(home.posts, "post", "posts"),
            if home.has_more {
                ", more available"
            } else {
                ""
            }
        ),
    ]
}

pub fn print_check_output(config: &SiteConfig, home: &HomePage) {
    for line in format_check_output(config, home) {
        println!("{}", line);
    }
}

pub fn format_serve_output(addr: SocketAddr, site: &Site, config: &SiteConfig) -> Vec<String> {
    vec![
        format!("Serving on http://{}", addr),
        format!(
            "    {} ready, others generated on first request",
            plural(site.posts.len(), "post page", "post pages")
        ),
        format!(
            "    Home page revalidated every {}",
            plural(config.serve.revalidate_secs as usize, "second", "seconds")
        ),
    ]
}

pub fn print_serve_output(addr: SocketAddr, site: &Site, config: &SiteConfig) {
    for line in format_serve_output(addr, site, config) {
        println!("{}", line);
    }
}
