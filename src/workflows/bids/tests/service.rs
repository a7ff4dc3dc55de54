use std::sync::Arc;

use super::common::*;
use crate::workflows::bids::domain::{BidId, BidScore, BidStatus};
use crate::workflows::bids::repository::{BidRepository, RepositoryError};
use crate::workflows::bids::service::{
    BidService, BidServiceError, BidSubmission, EvaluationRun,
};
use crate::workflows::players::MemoryPlayerDirectory;

#[test]
fn empty_backlog_is_a_clean_noop() {
    let (service, repository, _) = build_service(2);

    let run = service.run_weekly_evaluation().expect("run succeeds");

    assert!(matches!(run, EvaluationRun::NothingToEvaluate));
    assert!(repository.all().is_empty());
}

#[test]
fn full_week_scenario_ranks_and_settles_every_bid() {
    let (service, repository, _) = build_service(2);
    seed_bids(repository.as_ref(), scenario_bids());

    let run = service.run_weekly_evaluation().expect("run succeeds");
    let summary = match run {
        EvaluationRun::Completed(summary) => summary,
        other => panic!("expected completed run, got {other:?}"),
    };

    let order: Vec<_> = summary
        .ranked
        .iter()
        .map(|view| view.bid_id.0.as_str())
        .collect();
    assert_eq!(order, vec!["bid-c", "bid-a", "bid-b", "bid-e"]);

    let scores: Vec<_> = summary.ranked.iter().map(|view| view.score).collect();
    assert_eq!(scores, vec![Some(1.0), Some(2.0), Some(4.0), None]);

    // Capacity two still awards three ranks; the waiting pair loses.
    let statuses: Vec<_> = summary.ranked.iter().map(|view| view.status).collect();
    assert_eq!(statuses, vec!["won", "won", "won", "lost"]);
    assert_eq!(summary.awarded, 3);
    assert_eq!(summary.rejected, 1);

    for view in &summary.ranked {
        match view.status {
            "won" => assert!(view.ticket_code.is_some()),
            _ => assert!(view.ticket_code.is_none()),
        }
    }

    // The outcome is persisted, not just reported.
    let stored = repository
        .fetch(&BidId("bid-c".to_string()))
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, BidStatus::Won);
    assert_eq!(stored.score, BidScore::Scored(1.0));
}

#[test]
fn second_run_finds_nothing_left_to_evaluate() {
    let (service, repository, _) = build_service(2);
    seed_bids(repository.as_ref(), scenario_bids());

    let first = service.run_weekly_evaluation().expect("first run succeeds");
    assert!(matches!(first, EvaluationRun::Completed(_)));

    let second = service.run_weekly_evaluation().expect("second run succeeds");
    assert!(matches!(second, EvaluationRun::NothingToEvaluate));
}

#[test]
fn failed_batch_persist_aborts_the_run() {
    let repository = Arc::new(ReadOnlyRepository::default());
    let directory = Arc::new(MemoryPlayerDirectory::default());
    let service = BidService::new(
        repository.clone(),
        directory,
        Arc::new(FixedClock::thursday()),
    );
    seed_bids(&repository.inner, scenario_bids());

    match service.run_weekly_evaluation() {
        Err(BidServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected persistence failure, got {other:?}"),
    }

    // Nothing was committed, so the backlog is intact for the retry.
    assert_eq!(repository.inner.unevaluated().expect("readable").len(), 4);
}

#[test]
fn repository_outage_propagates_from_the_first_read() {
    let service = BidService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryPlayerDirectory::default()),
        Arc::new(FixedClock::thursday()),
    );

    match service.run_weekly_evaluation() {
        Err(BidServiceError::Repository(RepositoryError::Unavailable(_))) => {}
        other => panic!("expected repository error, got {other:?}"),
    }
}

#[test]
fn submit_stamps_clock_time_and_partner_dependent_status() {
    let (service, _, _) = build_service(2);

    let solo_bid = service
        .submit(BidSubmission {
            creator: player("alice"),
            partner: None,
        })
        .expect("solo submission succeeds");
    assert_eq!(solo_bid.status, BidStatus::Pending);
    assert_eq!(solo_bid.created_at, FixedClock::thursday().now);
    assert_eq!(solo_bid.score, BidScore::Unscored);

    let pair_bid = service
        .submit(BidSubmission {
            creator: player("clara"),
            partner: Some(player("dan")),
        })
        .expect("paired submission succeeds");
    assert_eq!(pair_bid.status, BidStatus::WaitingForApproval);
}

#[test]
fn submit_rejects_unregistered_participants() {
    let (service, _, _) = build_service(2);

    match service.submit(BidSubmission {
        creator: player("stranger"),
        partner: None,
    }) {
        Err(BidServiceError::UnknownPlayer(id)) => assert_eq!(id, player("stranger")),
        other => panic!("expected unknown player rejection, got {other:?}"),
    }

    match service.submit(BidSubmission {
        creator: player("alice"),
        partner: Some(player("stranger")),
    }) {
        Err(BidServiceError::UnknownPlayer(id)) => assert_eq!(id, player("stranger")),
        other => panic!("expected unknown partner rejection, got {other:?}"),
    }
}

#[test]
fn approval_flips_a_waiting_pair_to_pending() {
    let (service, repository, _) = build_service(2);
    let bid = service
        .submit(BidSubmission {
            creator: player("eva"),
            partner: Some(player("finn")),
        })
        .expect("submission succeeds");

    let approved = service.approve(&bid.id).expect("approval succeeds");
    assert_eq!(approved.status, BidStatus::Pending);

    let stored = repository
        .fetch(&bid.id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.status, BidStatus::Pending);
}

#[test]
fn approval_rejects_solo_and_missing_bids() {
    let (service, _, _) = build_service(2);
    let solo_bid = service
        .submit(BidSubmission {
            creator: player("ben"),
            partner: None,
        })
        .expect("submission succeeds");

    match service.approve(&solo_bid.id) {
        Err(BidServiceError::InvalidApproval { status, .. }) => {
            assert_eq!(status, BidStatus::Pending);
        }
        other => panic!("expected invalid approval, got {other:?}"),
    }

    match service.approve(&BidId("missing".to_string())) {
        Err(BidServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn standings_score_the_pool_without_settling_anything() {
    let (service, repository, _) = build_service(2);
    seed_bids(repository.as_ref(), scenario_bids());

    let standings = service
        .evaluate_current_week()
        .expect("standings computable");

    assert_eq!(standings.len(), 4);
    assert!(standings
        .iter()
        .any(|bid| bid.score == BidScore::Scored(1.0)));

    // Statuses and stored scores are untouched by the read-only pass.
    for bid in repository.all() {
        assert!(matches!(
            bid.status,
            BidStatus::Pending | BidStatus::WaitingForApproval
        ));
        assert_eq!(bid.score, BidScore::Unscored);
    }
}
