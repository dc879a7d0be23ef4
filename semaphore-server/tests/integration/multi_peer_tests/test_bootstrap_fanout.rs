use semaphore_core::{LinkState, SessionId, SignalMessage};

use crate::integration::{create_test_stack, init_tracing, join, snapshot};

#[tokio::test]
async fn test_bootstrap_fanout() {
    init_tracing();

    let (manager, output) = create_test_stack();
    let session = SessionId::from("room1");

    let alice = join(&manager, &session, &output, "Alice")
        .await
        .expect("alice join failed");
    let bob = join(&manager, &session, &output, "Bob")
        .await
        .expect("bob join failed");
    let carol = join(&manager, &session, &output, "Carol")
        .await
        .expect("carol join failed");

    // Both existing members are told to call the newcomer.
    for existing in [alice, bob] {
        output
            .wait_for(
                existing,
                |m| matches!(m, SignalMessage::PeerJoined { participant_id, .. } if *participant_id == carol),
                1000,
            )
            .await
            .expect("existing member was not told about carol");
    }

    // The newcomer's welcome lists the members in join order; it only ever
    // answers, so it is never told to originate.
    let carol_frames = output.sent_to(carol).await;
    match carol_frames
        .iter()
        .find(|m| matches!(m, SignalMessage::Welcome { .. }))
    {
        Some(SignalMessage::Welcome { peers, .. }) => {
            let ids: Vec<_> = peers.iter().map(|p| p.id).collect();
            assert_eq!(ids, vec![alice, bob]);
        }
        _ => panic!("carol got no welcome"),
    }
    assert!(
        carol_frames
            .iter()
            .all(|m| !matches!(m, SignalMessage::PeerJoined { .. }))
    );

    // Carol's arrival created exactly the two links that involve her; the
    // pre-existing alice-bob link is untouched.
    let snap = snapshot(&manager, &session).await;
    let carol_links: Vec<_> = snap
        .links
        .iter()
        .filter(|l| l.initiator == carol || l.responder == carol)
        .collect();
    assert_eq!(carol_links.len(), 2);
    for link in carol_links {
        assert_eq!(link.responder, carol, "existing members initiate");
        assert_eq!(link.state, LinkState::Idle);
    }
    assert_eq!(snap.links.len(), 3);
}
