//! Tracker site abstraction.
//!
//! A `SiteProvider` lists the torrents a site currently offers and downloads
//! their .torrent files. Scraping and authentication stay behind the trait.

mod types;

pub use types::*;
