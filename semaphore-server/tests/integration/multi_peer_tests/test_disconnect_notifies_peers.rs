use semaphore_core::{LinkState, SessionId, SignalMessage};
use semaphore_server::SessionCommand;

use crate::integration::{
    create_test_stack, init_tracing, join, link_between, snapshot, wait_for_session_gone,
};
use crate::utils::{answer, candidate, offer};

#[tokio::test]
async fn test_disconnect_notifies_peers() {
    init_tracing();

    let (manager, output) = create_test_stack();
    let session = SessionId::from("room1");

    let alice = join(&manager, &session, &output, "Alice")
        .await
        .expect("alice join failed");
    let bob = join(&manager, &session, &output, "Bob")
        .await
        .expect("bob join failed");

    // Bring the pair all the way to established.
    for (sender, message) in [
        (alice, offer(None, "v=0")),
        (bob, answer(None, "v=0")),
        (alice, candidate(None, "candidate:1")),
    ] {
        manager
            .dispatch(&session, SessionCommand::Signal { sender, message })
            .await;
    }
    let snap = snapshot(&manager, &session).await;
    assert_eq!(
        link_between(&snap, alice, bob),
        Some(LinkState::Established)
    );

    // Alice's channel faults mid-call.
    manager
        .dispatch(
            &session,
            SessionCommand::Disconnect {
                participant: alice,
                fault: true,
            },
        )
        .await;

    output
        .wait_for(
            bob,
            |m| matches!(m, SignalMessage::Leave { from: Some(f) } if *f == alice),
            1000,
        )
        .await
        .expect("bob must be told alice is gone");

    let snap = snapshot(&manager, &session).await;
    assert_eq!(
        output.leaves_for(bob, alice).await,
        1,
        "exactly one synthetic leave per remaining peer"
    );
    assert_eq!(link_between(&snap, alice, bob), Some(LinkState::Failed));
    assert_eq!(snap.participants.len(), 1);
    assert!(manager.is_active(&session), "bob is still in the session");

    // A faulted channel cleans up the same way a polite leave does.
    manager
        .dispatch(
            &session,
            SessionCommand::Signal {
                sender: bob,
                message: SignalMessage::Leave { from: None },
            },
        )
        .await;
    wait_for_session_gone(&manager, &session, 1000)
        .await
        .expect("session must die with its last member");
}
