//! Applies an engine plan to a torrent client.

use tracing::{debug, warn};

use crate::brush::constants::STALLED_TORRENT_DOWNLOAD_SPEED_LIMIT;
use crate::brush::AlgorithmResult;
use crate::metrics::APPLY_FAILURES_TOTAL;
use crate::site::SiteProvider;
use crate::torrent_client::{AddTorrentRequest, BrushClient, ModifyTorrentRequest};

use super::types::{ApplyAction, ApplyFailure, ApplyReport};

/// Execute a plan in order: delete, stall, resume, modify, add.
///
/// Deletions go first so their disk space is free before anything is added.
/// A failed action is logged and reported; it never aborts the rest of the plan.
pub async fn apply_result(
    client: &dyn BrushClient,
    site: &dyn SiteProvider,
    result: &AlgorithmResult,
    upload_speed_limit: i64,
) -> ApplyReport {
    let mut report = ApplyReport::default();

    for torrent in &result.delete_torrents {
        let outcome = client.delete_torrent(&torrent.info_hash).await;
        record(&mut report, ApplyAction::Delete, &torrent.name, &torrent.msg, outcome);
    }

    for torrent in &result.stall_torrents {
        let request = ModifyTorrentRequest::meta(torrent.meta.clone())
            .with_download_speed_limit(STALLED_TORRENT_DOWNLOAD_SPEED_LIMIT);
        let outcome = client.modify_torrent(&torrent.info_hash, request).await;
        record(&mut report, ApplyAction::Stall, &torrent.name, &torrent.msg, outcome);
    }

    for torrent in &result.resume_torrents {
        let outcome = client.resume_torrent(&torrent.info_hash).await;
        record(&mut report, ApplyAction::Resume, &torrent.name, &torrent.msg, outcome);
    }

    for torrent in &result.modify_torrents {
        let request = ModifyTorrentRequest::meta(torrent.meta.clone());
        let outcome = client.modify_torrent(&torrent.info_hash, request).await;
        record(&mut report, ApplyAction::Modify, &torrent.name, &torrent.msg, outcome);
    }

    for torrent in &result.add_torrents {
        let data = match site
            .download_torrent(&torrent.id, &torrent.download_url)
            .await
        {
            Ok(data) => data,
            Err(e) => {
                record::<(), _>(&mut report, ApplyAction::Add, &torrent.name, &torrent.msg, Err(e));
                continue;
            }
        };
        let request = AddTorrentRequest {
            data,
            name: torrent.name.clone(),
            meta: torrent.meta.clone(),
            upload_speed_limit,
        };
        let outcome = client.add_torrent(request).await;
        record(&mut report, ApplyAction::Add, &torrent.name, &torrent.msg, outcome);
    }

    report
}

fn record<T, E: std::fmt::Display>(
    report: &mut ApplyReport,
    action: ApplyAction,
    name: &str,
    msg: &str,
    outcome: Result<T, E>,
) {
    match outcome {
        Ok(_) => {
            debug!(%action, name, msg, "action applied");
            report.record_success(action);
        }
        Err(e) => {
            warn!(%action, name, error = %e, "action failed");
            APPLY_FAILURES_TOTAL
                .with_label_values(&[action.as_str()])
                .inc();
            report.failures.push(ApplyFailure {
                action,
                name: name.to_string(),
                error: e.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{AddTorrent, MetaMap, ModifyTorrent, OperationTorrent};
    use crate::testing::fixtures::client_torrent;
    use crate::testing::{MockBrushClient, MockSiteProvider, RecordedCall};
    use crate::torrent_client::BrushClientError;

    fn op(hash: &str) -> OperationTorrent {
        OperationTorrent {
            info_hash: hash.to_string(),
            name: hash.to_string(),
            msg: "test".to_string(),
        }
    }

    fn modify(hash: &str, meta: MetaMap) -> ModifyTorrent {
        ModifyTorrent {
            info_hash: hash.to_string(),
            name: hash.to_string(),
            msg: "test".to_string(),
            meta,
        }
    }

    fn add(id: &str) -> AddTorrent {
        AddTorrent {
            id: id.to_string(),
            name: format!("Release.{}", id),
            download_url: format!("https://tracker.example/download/{}", id),
            size: 1024,
            score: 10.0,
            predicted_upload_speed: 0,
            msg: "score 10.0".to_string(),
            meta: MetaMap::new(),
        }
    }

    #[tokio::test]
    async fn test_apply_executes_in_order() {
        let client = MockBrushClient::new();
        for hash in ["del", "stall", "res", "mod"] {
            client.add_mock_torrent(client_torrent(hash)).await;
        }
        let site = MockSiteProvider::new("alpha");

        let stall_meta: MetaMap = [("stt".to_string(), 100)].into_iter().collect();
        let modify_meta: MetaMap = [("sct".to_string(), 200)].into_iter().collect();
        let result = AlgorithmResult {
            delete_torrents: vec![op("del")],
            stall_torrents: vec![modify("stall", stall_meta.clone())],
            resume_torrents: vec![op("res")],
            modify_torrents: vec![modify("mod", modify_meta.clone())],
            add_torrents: vec![add("42")],
            can_add_more: true,
            free_space_change: 0,
        };

        let report = apply_result(&client, &site, &result, 5_000_000).await;
        assert!(report.failures.is_empty());
        assert_eq!(report.applied(), 5);

        let calls = client.calls().await;
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], RecordedCall::Delete("del".to_string()));
        assert_eq!(
            calls[1],
            RecordedCall::Modify {
                info_hash: "stall".to_string(),
                request: ModifyTorrentRequest::meta(stall_meta)
                    .with_download_speed_limit(STALLED_TORRENT_DOWNLOAD_SPEED_LIMIT),
            }
        );
        assert_eq!(calls[2], RecordedCall::Resume("res".to_string()));
        assert_eq!(
            calls[3],
            RecordedCall::Modify {
                info_hash: "mod".to_string(),
                request: ModifyTorrentRequest::meta(modify_meta),
            }
        );
        match &calls[4] {
            RecordedCall::Add(request) => {
                assert_eq!(request.name, "Release.42");
                assert_eq!(request.upload_speed_limit, 5_000_000);
                assert!(!request.data.is_empty());
            }
            other => panic!("expected add, got {:?}", other),
        }
        assert_eq!(site.downloaded().await, vec!["42".to_string()]);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort() {
        let client = MockBrushClient::new();
        client.add_mock_torrent(client_torrent("ok")).await;
        client.fail_hash("bad").await;
        let site = MockSiteProvider::new("alpha");
        site.fail_download("7").await;

        let result = AlgorithmResult {
            delete_torrents: vec![op("bad"), op("ok")],
            add_torrents: vec![add("7"), add("8")],
            ..Default::default()
        };

        let report = apply_result(&client, &site, &result, 0).await;
        assert_eq!(report.deleted, 1);
        assert_eq!(report.added, 1);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].action, ApplyAction::Delete);
        assert_eq!(report.failures[0].name, "bad");
        assert_eq!(report.failures[1].action, ApplyAction::Add);
        assert_eq!(report.failures[1].name, "Release.7");
        assert!(!client.has_torrent("ok").await);
    }

    #[tokio::test]
    async fn test_client_error_recorded() {
        let client = MockBrushClient::new();
        client.set_next_error(BrushClientError::Timeout).await;
        let site = MockSiteProvider::new("alpha");
        let result = AlgorithmResult {
            resume_torrents: vec![op("x")],
            ..Default::default()
        };

        let report = apply_result(&client, &site, &result, 0).await;
        assert_eq!(report.resumed, 0);
        assert_eq!(report.failures[0].error, "Request timeout");
    }

    #[tokio::test]
    async fn test_empty_plan_is_noop() {
        let client = MockBrushClient::new();
        let site = MockSiteProvider::new("alpha");
        let report = apply_result(&client, &site, &AlgorithmResult::default(), 0).await;
        assert_eq!(report, ApplyReport::default());
        assert!(client.calls().await.is_empty());
    }
}
