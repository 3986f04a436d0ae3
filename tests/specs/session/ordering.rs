// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status ordering specs
//!
//! Whatever order snapshots, command responses, and stream messages arrive
//! in, a job's status never moves backwards.

use crate::prelude::*;

#[tokio::test(start_paused = true)]
async fn late_queued_event_after_running_snapshot_is_ignored() {
    let session = Session::start(vec![ActiveJob::new("R1", "J1", JobStatus::Running)]).await;
    tokio::time::sleep(Duration::from_millis(400)).await;

    session.push(&[status_message("R1", "J1", JobStatus::Queued)]).await;

    assert_eq!(session.status("R1"), JobStatus::Running);
    assert_eq!(session.coordinator.diagnostics().rejected, 1);
}

#[tokio::test(start_paused = true)]
async fn event_from_previous_job_instance_is_rejected() {
    let session = Session::start(vec![]).await;
    session.transport.respond_create("J2", JobStatus::Queued);
    session.coordinator.controller("R2").start(files(&["a.h5"])).await.unwrap();

    session.push(&[status_message("R2", "J0", JobStatus::Error)]).await;

    let snap = session.snapshot("R2");
    assert_eq!(snap.status, JobStatus::Queued);
    assert_eq!(snap.job_id, Some(JobId::new("J2")));
}

#[tokio::test(start_paused = true)]
async fn out_of_order_stream_events_keep_the_later_state() {
    let session = Session::start(vec![]).await;
    session.transport.respond_create("J3", JobStatus::Queued);
    session.coordinator.controller("R3").start(files(&[])).await.unwrap();

    session
        .push(&[
            status_message("R3", "J3", JobStatus::Initializing),
            status_message("R3", "J3", JobStatus::Queued),
        ])
        .await;

    assert_eq!(session.status("R3"), JobStatus::Initializing);
}

#[tokio::test(start_paused = true)]
async fn every_permutation_converges_to_highest_rank() {
    let statuses = [JobStatus::Queued, JobStatus::Initializing, JobStatus::Running, JobStatus::Done];
    let session = Session::start(vec![]).await;

    // All 24 orderings, each on its own recipe
    let mut recipe = 0;
    for a in 0..4 {
        for b in 0..4 {
            for c in 0..4 {
                for d in 0..4 {
                    let order = [a, b, c, d];
                    if (0..4).any(|i| !order.contains(&i)) {
                        continue;
                    }
                    recipe += 1;
                    let name = format!("R{recipe}");
                    let messages: Vec<String> =
                        order.iter().map(|&i| status_message(&name, "J1", statuses[i])).collect();
                    session.push(&messages).await;
                    assert_eq!(session.status(&name), JobStatus::Done, "order {order:?}");
                }
            }
        }
    }
    assert_eq!(recipe, 24);
}

#[tokio::test(start_paused = true)]
async fn duplicate_delivery_changes_nothing() {
    let session = Session::start(vec![]).await;
    session.push(&[status_message("R1", "J1", JobStatus::Running)]).await;
    let once = session.snapshot("R1");

    session.push(&[status_message("R1", "J1", JobStatus::Running)]).await;
    similar_asserts::assert_eq!(session.snapshot("R1"), once);
    assert_eq!(session.coordinator.diagnostics().duplicates, 1);
}

#[tokio::test(start_paused = true)]
async fn first_terminal_status_wins() {
    let session = Session::start(vec![ActiveJob::new("R1", "J1", JobStatus::Running)]).await;
    let controller = session.coordinator.controller("R1");
    session.transport.respond_cancel(Some(JobStatus::Canceled));
    controller.stop().await.unwrap();

    session.push(&[status_message("R1", "J1", JobStatus::Error)]).await;
    assert_eq!(session.status("R1"), JobStatus::Canceled);
}

#[tokio::test(start_paused = true)]
async fn recipes_do_not_affect_each_other() {
    let session = Session::start(vec![
        ActiveJob::new("R1", "J1", JobStatus::Running),
        ActiveJob::new("R2", "J2", JobStatus::Running),
    ])
    .await;

    session
        .push(&[
            status_message("R1", "J1", JobStatus::Error),
            "{garbage".to_string(),
            log_message("R2", "J2", &["still going"]),
        ])
        .await;

    assert_eq!(session.status("R1"), JobStatus::Error);
    let r2 = session.snapshot("R2");
    assert_eq!(r2.status, JobStatus::Running);
    assert_eq!(r2.log, vec!["still going"]);
}
