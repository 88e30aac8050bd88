//! Cached documentation page rendering for DW.
//!
//! [`DocumentationProvider`] turns `{product}/{version}/{page}.md` into HTML
//! through a [`MarkdownParser`], rewrites version placeholders in links, and
//! memoizes the result in a [`Cache`](dw_cache::Cache).
//!
//! Link placeholders:
//!
//! | Markdown                        | Rendered for `guide` at `v2.0` |
//! |---------------------------------|--------------------------------|
//! | `[x](docs/{{version}}/install)` | `docs/guide/v2.0/install`      |
//! | `Release {{version}}`           | `Release v2.0`                 |

mod error;
mod markdown;
mod provider;

pub use error::ProviderError;
pub use markdown::{CommonMarkParser, MarkdownParser};
pub use provider::{DocumentationProvider, INDEX_PAGE};
