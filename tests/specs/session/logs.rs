// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log aggregation specs

use crate::prelude::*;

fn numbered(range: std::ops::Range<usize>) -> Vec<String> {
    range.map(|i| format!("line {i}")).collect()
}

#[tokio::test(start_paused = true)]
async fn log_line_after_done_evicts_oldest() {
    let session = Session::start(vec![ActiveJob::new("R1", "J1", JobStatus::Running)]).await;
    let lines = numbered(0..500);
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    session.push(&[log_message("R1", "J1", &refs)]).await;
    session.push(&[status_message("R1", "J1", JobStatus::Done)]).await;

    session.push(&[log_message("R1", "J1", &["line 500"])]).await;

    let snap = session.snapshot("R1");
    assert_eq!(snap.status, JobStatus::Done);
    assert_eq!(snap.log.len(), 500);
    assert_eq!(snap.log.first().map(String::as_str), Some("line 1"));
    assert_eq!(snap.log.last().map(String::as_str), Some("line 500"));
}

#[tokio::test(start_paused = true)]
async fn capacity_keeps_last_lines_in_order() {
    let config = SessionConfig::default().log_capacity(10);
    let session =
        Session::start_with(config, vec![ActiveJob::new("R1", "J1", JobStatus::Running)]).await;

    let messages: Vec<String> =
        numbered(0..15).iter().map(|line| log_message("R1", "J1", &[line.as_str()])).collect();
    session.push(&messages).await;

    similar_asserts::assert_eq!(session.snapshot("R1").log, numbered(5..15));
}

#[tokio::test(start_paused = true)]
async fn new_job_starts_with_empty_log_and_ignores_old_lines() {
    let session = Session::start(vec![ActiveJob::new("R1", "J1", JobStatus::Running)]).await;
    session.push(&[log_message("R1", "J1", &["old output"])]).await;
    session.push(&[status_message("R1", "J1", JobStatus::Error)]).await;

    let controller = session.coordinator.controller("R1");
    let job_id = controller.start(files(&[])).await.unwrap();
    assert!(controller.snapshot().log.is_empty());

    session
        .push(&[
            log_message("R1", "J1", &["late line from old job"]),
            log_message("R1", job_id.as_str(), &["fresh"]),
        ])
        .await;
    assert_eq!(controller.snapshot().log, vec!["fresh"]);
    assert_eq!(session.coordinator.diagnostics().dropped_log_lines, 1);
}

#[tokio::test(start_paused = true)]
async fn lines_keep_arrival_order_while_status_advances() {
    let session = Session::start(vec![]).await;
    session
        .push(&[
            log_message("R1", "J1", &["a"]),
            status_message("R1", "J1", JobStatus::Running),
            log_message("R1", "J1", &["b", "c"]),
            status_message("R1", "J1", JobStatus::Queued),
            log_message("R1", "J1", &["d"]),
        ])
        .await;

    let snap = session.snapshot("R1");
    assert_eq!(snap.status, JobStatus::Running);
    assert_eq!(snap.log, vec!["a", "b", "c", "d"]);
}
