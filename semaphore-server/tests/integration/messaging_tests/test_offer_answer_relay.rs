use semaphore_core::{LinkState, SessionId, SignalMessage};
use semaphore_server::SessionCommand;

use crate::integration::{create_test_stack, init_tracing, join, link_between, snapshot};
use crate::utils::{answer, candidate, offer};

#[tokio::test]
async fn test_offer_answer_relay() {
    init_tracing();

    let (manager, output) = create_test_stack();
    let session = SessionId::from("room1");

    let alice = join(&manager, &session, &output, "Alice")
        .await
        .expect("alice join failed");
    let bob = join(&manager, &session, &output, "Bob")
        .await
        .expect("bob join failed");

    // Bob's arrival tells Alice, the earlier joiner, to originate the pair's
    // offer.
    output
        .wait_for(
            alice,
            |m| matches!(m, SignalMessage::PeerJoined { participant_id, .. } if *participant_id == bob),
            1000,
        )
        .await
        .expect("alice was not told about bob");

    // Two-party session, so the target can stay implicit throughout.
    manager
        .dispatch(
            &session,
            SessionCommand::Signal {
                sender: alice,
                message: offer(None, "v=0 alice"),
            },
        )
        .await;

    let relayed = output
        .wait_for(bob, |m| matches!(m, SignalMessage::Offer { .. }), 1000)
        .await
        .expect("offer was not relayed to bob");
    match relayed {
        SignalMessage::Offer { from, offer, .. } => {
            assert_eq!(from, Some(alice), "relayed offers carry their sender");
            assert_eq!(offer.sdp, "v=0 alice", "payload must be untouched");
        }
        other => panic!("unexpected frame: {other:?}"),
    }
    let snap = snapshot(&manager, &session).await;
    assert_eq!(link_between(&snap, alice, bob), Some(LinkState::OfferSent));

    manager
        .dispatch(
            &session,
            SessionCommand::Signal {
                sender: bob,
                message: answer(None, "v=0 bob"),
            },
        )
        .await;

    let relayed = output
        .wait_for(alice, |m| matches!(m, SignalMessage::Answer { .. }), 1000)
        .await
        .expect("answer was not relayed to alice");
    match relayed {
        SignalMessage::Answer { from, answer, .. } => {
            assert_eq!(from, Some(bob));
            assert_eq!(answer.sdp, "v=0 bob");
        }
        other => panic!("unexpected frame: {other:?}"),
    }
    let snap = snapshot(&manager, &session).await;
    assert_eq!(
        link_between(&snap, alice, bob),
        Some(LinkState::AnswerReceived)
    );

    // First trickled candidate flips the link to established; candidates
    // keep flowing in both directions afterwards.
    manager
        .dispatch(
            &session,
            SessionCommand::Signal {
                sender: alice,
                message: candidate(None, "candidate:1 1 udp 1 192.0.2.1 1 typ host"),
            },
        )
        .await;
    output
        .wait_for(bob, |m| matches!(m, SignalMessage::Candidate { .. }), 1000)
        .await
        .expect("candidate was not relayed to bob");

    manager
        .dispatch(
            &session,
            SessionCommand::Signal {
                sender: bob,
                message: candidate(None, "candidate:2 1 udp 1 192.0.2.2 1 typ host"),
            },
        )
        .await;
    output
        .wait_for(
            alice,
            |m| matches!(m, SignalMessage::Candidate { .. }),
            1000,
        )
        .await
        .expect("candidate was not relayed back to alice");

    let snap = snapshot(&manager, &session).await;
    assert_eq!(
        link_between(&snap, alice, bob),
        Some(LinkState::Established)
    );
}
