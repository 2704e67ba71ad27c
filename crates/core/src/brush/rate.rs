//! Candidate scoring.
//!
//! The score approximates expected upload bytes per second gained for the
//! bandwidth and disk a torrent will consume. The tier tables are
//! empirically tuned and must be kept as they are.

use super::constants::{
    DISCOUNT_END_MARGIN, FRESH_TORRENT_TIMESPAN, GIB, PREDICTED_UPLOAD_SPEED_PER_LEECHER,
    RECENT_TORRENT_MIN_LEECHERS, RECENT_TORRENT_TIMESPAN, RELISTED_TORRENT_TIMESPAN,
};
use super::options::BrushSiteOption;
use super::types::SiteTorrent;

/// Outcome of rating one site torrent.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    /// 0 means the torrent must not be added.
    pub score: f64,
    pub predicted_upload_speed: i64,
    pub note: String,
}

impl Rating {
    fn excluded(note: impl Into<String>) -> Self {
        Self {
            score: 0.0,
            predicted_upload_speed: 0,
            note: note.into(),
        }
    }
}

/// Rate a site torrent for brushing.
pub fn rate_site_torrent(torrent: &SiteTorrent, option: &BrushSiteOption) -> Rating {
    if let Some(reason) = exclusion_reason(torrent, option) {
        return Rating::excluded(reason);
    }
    if let Some(re) = option.matching_exclude(&torrent.name) {
        return Rating::excluded(format!("name matches exclude pattern {}", re.as_str()));
    }
    if let Some(reason) = freshness_reason(torrent, option.now) {
        return Rating::excluded(reason);
    }

    let predicted_upload_speed = torrent
        .leechers
        .saturating_mul(PREDICTED_UPLOAD_SPEED_PER_LEECHER)
        .min(option.torrent_upload_speed_limit);

    let mut score = if torrent.seeders <= 1 {
        50.0
    } else if torrent.seeders <= 3 {
        30.0
    } else {
        10.0
    };
    score += torrent.leechers as f64;
    score *= torrent.upload_multiplier;
    if torrent.download_multiplier != 0.0 {
        score *= 0.5;
    }
    score *= size_factor(torrent.size, torrent.leechers);

    let note = if score > 0.0 {
        String::new()
    } else {
        "too large for its demand".to_string()
    };
    Rating {
        score,
        predicted_upload_speed,
        note,
    }
}

fn exclusion_reason(torrent: &SiteTorrent, option: &BrushSiteOption) -> Option<&'static str> {
    if torrent.is_active {
        return Some("already active");
    }
    if torrent.upload_multiplier == 0.0 {
        return Some("upload does not count");
    }
    if torrent.has_hnr && !option.allow_hr {
        return Some("hit and run");
    }
    if torrent.download_multiplier != 0.0 && !option.allow_none_free {
        return Some("not free");
    }
    if torrent.paid && !torrent.bought && !option.allow_paid {
        return Some("paid torrent");
    }
    if option.torrent_min_size_limit.is_some_and(|min| torrent.size < min) {
        return Some("too small");
    }
    if option.torrent_max_size_limit.is_some_and(|max| torrent.size > max) {
        return Some("too large");
    }
    if torrent.discount_end_time > 0
        && torrent.discount_end_time.saturating_sub(option.now) < DISCOUNT_END_MARGIN
    {
        return Some("discount ends soon");
    }
    if torrent.seeders == 0 && !option.allow_zero_seeders {
        return Some("no seeders");
    }
    if torrent.leechers <= torrent.seeders {
        return Some("not enough leechers");
    }
    None
}

/// Old torrents only come back when a site re-lists them as free.
fn freshness_reason(torrent: &SiteTorrent, now: i64) -> Option<&'static str> {
    let age = now.saturating_sub(torrent.time);
    if age > RELISTED_TORRENT_TIMESPAN {
        if torrent.download_multiplier != 0.0 {
            return Some("too old");
        }
        return None;
    }
    if age > RECENT_TORRENT_TIMESPAN {
        return Some("too old");
    }
    if age > FRESH_TORRENT_TIMESPAN && torrent.leechers < RECENT_TORRENT_MIN_LEECHERS {
        return Some("not fresh and not popular enough");
    }
    None
}

fn size_factor(size: i64, leechers: i64) -> f64 {
    if size <= GIB {
        10.0
    } else if size <= 10 * GIB {
        2.0
    } else if size <= 20 * GIB {
        1.0
    } else if size <= 50 * GIB {
        0.5
    } else if size <= 100 * GIB {
        0.1
    } else if leechers >= 1000 {
        100.0
    } else if leechers >= 500 {
        50.0
    } else if leechers >= 100 {
        10.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::constants::KIB;
    use crate::brush::options::compile_excludes;

    const NOW: i64 = 1_700_000_000;

    fn option() -> BrushSiteOption {
        BrushSiteOption::new(NOW)
    }

    fn torrent(seeders: i64, leechers: i64) -> SiteTorrent {
        SiteTorrent {
            id: "1".to_string(),
            name: "Some.Show.S01E01.1080p".to_string(),
            size: 512 * 1024 * 1024,
            seeders,
            leechers,
            download_url: "https://site/dl/1".to_string(),
            download_multiplier: 0.0,
            time: NOW - 600,
            ..Default::default()
        }
    }

    #[test]
    fn test_score_small_free_torrent() {
        // (50 + 10) * 1.0 * 10
        let rating = rate_site_torrent(&torrent(1, 10), &option());
        assert_eq!(rating.score, 600.0);
        assert_eq!(rating.predicted_upload_speed, 10 * 100 * KIB);
        assert!(rating.note.is_empty());
    }

    #[test]
    fn test_seeder_tiers() {
        assert_eq!(rate_site_torrent(&torrent(3, 10), &option()).score, 400.0);
        assert_eq!(rate_site_torrent(&torrent(4, 10), &option()).score, 200.0);
    }

    #[test]
    fn test_upload_multiplier_and_non_free_halving() {
        let mut opt = option();
        opt.allow_none_free = true;
        let mut t = torrent(1, 10);
        t.upload_multiplier = 2.0;
        t.download_multiplier = 0.5;
        // (50 + 10) * 2 * 0.5 * 10
        assert_eq!(rate_site_torrent(&t, &opt).score, 600.0);
    }

    #[test]
    fn test_predicted_upload_speed_is_capped() {
        let mut opt = option();
        opt.torrent_upload_speed_limit = 500 * KIB;
        let rating = rate_site_torrent(&torrent(1, 10), &opt);
        assert_eq!(rating.predicted_upload_speed, 500 * KIB);
    }

    #[test]
    fn test_huge_leecher_count_is_capped() {
        let rating = rate_site_torrent(&torrent(1, i64::MAX / 1000), &option());
        assert!(rating.score > 0.0);
        assert_eq!(
            rating.predicted_upload_speed,
            crate::brush::constants::DEFAULT_TORRENT_UPLOAD_SPEED_LIMIT
        );
    }

    #[test]
    fn test_zero_seeders_excluded_unless_allowed() {
        let t = torrent(0, 5);
        let rating = rate_site_torrent(&t, &option());
        assert_eq!(rating.score, 0.0);
        assert_eq!(rating.note, "no seeders");

        let mut opt = option();
        opt.allow_zero_seeders = true;
        assert!(rate_site_torrent(&t, &opt).score > 0.0);
    }

    #[test]
    fn test_hard_exclusions() {
        let opt = option();
        let cases: Vec<(Box<dyn Fn(&mut SiteTorrent)>, &str)> = vec![
            (Box::new(|t: &mut SiteTorrent| t.is_active = true), "already active"),
            (Box::new(|t: &mut SiteTorrent| t.upload_multiplier = 0.0), "upload does not count"),
            (Box::new(|t: &mut SiteTorrent| t.has_hnr = true), "hit and run"),
            (Box::new(|t: &mut SiteTorrent| t.download_multiplier = 1.0), "not free"),
            (Box::new(|t: &mut SiteTorrent| t.paid = true), "paid torrent"),
            (
                Box::new(|t: &mut SiteTorrent| t.discount_end_time = NOW + 1800),
                "discount ends soon",
            ),
            (Box::new(|t: &mut SiteTorrent| t.leechers = t.seeders), "not enough leechers"),
        ];
        for (mutate, note) in cases {
            let mut t = torrent(2, 10);
            mutate(&mut t);
            let rating = rate_site_torrent(&t, &opt);
            assert_eq!(rating.score, 0.0, "{}", note);
            assert_eq!(rating.note, note);
        }
    }

    #[test]
    fn test_bought_paid_torrent_allowed() {
        let mut t = torrent(2, 10);
        t.paid = true;
        t.bought = true;
        assert!(rate_site_torrent(&t, &option()).score > 0.0);
    }

    #[test]
    fn test_size_bounds() {
        let mut opt = option();
        opt.torrent_min_size_limit = Some(GIB);
        assert_eq!(rate_site_torrent(&torrent(1, 10), &opt).note, "too small");

        let mut opt = option();
        opt.torrent_max_size_limit = Some(100 * 1024 * 1024);
        assert_eq!(rate_site_torrent(&torrent(1, 10), &opt).note, "too large");
    }

    #[test]
    fn test_exclude_pattern() {
        let mut opt = option();
        opt.excludes = compile_excludes(&["s01e01".to_string()]).unwrap();
        let rating = rate_site_torrent(&torrent(1, 10), &opt);
        assert_eq!(rating.score, 0.0);
        assert!(rating.note.contains("exclude"));
    }

    #[test]
    fn test_freshness_gate() {
        let opt = option();

        let mut t = torrent(1, 100);
        t.time = NOW - 3 * 3600;
        assert_eq!(rate_site_torrent(&t, &opt).score, 0.0);

        t.leechers = 500;
        assert!(rate_site_torrent(&t, &opt).score > 0.0);

        t.time = NOW - 2 * 86400;
        assert_eq!(rate_site_torrent(&t, &opt).note, "too old");

        // re-listed as free long after publication
        t.time = NOW - 60 * 86400;
        assert!(rate_site_torrent(&t, &opt).score > 0.0);

        let mut opt = option();
        opt.allow_none_free = true;
        t.download_multiplier = 0.5;
        assert_eq!(rate_site_torrent(&t, &opt).note, "too old");
    }

    #[test]
    fn test_size_tiers() {
        let mut t = torrent(4, 20);
        let base = 30.0;
        for (size, factor) in [
            (GIB, 10.0),
            (10 * GIB, 2.0),
            (20 * GIB, 1.0),
            (50 * GIB, 0.5),
            (100 * GIB, 0.1),
        ] {
            t.size = size;
            let score = rate_site_torrent(&t, &option()).score;
            assert!((score - base * factor).abs() < 1e-9, "size {}", size);
        }
    }

    #[test]
    fn test_huge_torrent_leecher_tiers() {
        let mut t = torrent(4, 99);
        t.size = 200 * GIB;
        let rating = rate_site_torrent(&t, &option());
        assert_eq!(rating.score, 0.0);
        assert!(!rating.note.is_empty());

        for (leechers, factor) in [(100, 10.0), (500, 50.0), (1000, 100.0)] {
            t.leechers = leechers;
            let expected = (10.0 + leechers as f64) * factor;
            assert_eq!(rate_site_torrent(&t, &option()).score, expected);
        }
    }
}
