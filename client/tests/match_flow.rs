//! Two clients fed the same relayed stream stay in lockstep.
//!
//! The relay is simulated in-process: every outgoing intent from either client
//! is mirrored to both, the way the server fans intents out.

use std::time::Duration;

use volley_client::rapier_world::RapierWorld;
use volley_client::input::InputState;
use volley_client::motion::ContactPolicy;
use volley_client::physics::{PhysicsWorld, Vec2};
use volley_client::scene::MatchScene;
use volley_client::session::{Session, SessionAction, SessionState};
use volley_shared::config::GameConfig;
use volley_shared::protocol::{
    ClientMsg, ConnectionId, GotchiProfile, MatchEntryWire, MatchFormedMsg, PeerDisconnectedMsg,
    ServerMsg, WelcomeMsg, PROTOCOL_VERSION,
};
use volley_shared::slot::Slot;

const TICK: Duration = Duration::from_millis(16);

fn profile(name: &str) -> GotchiProfile {
    GotchiProfile {
        name: name.to_string(),
        token_id: format!("{name}-7"),
        haunt_id: "1".to_string(),
        collateral_address: "0x0".to_string(),
        numeric_traits: [10, 20, 30, 40, 50, 60],
        equipped_wearables: [0; 16],
    }
}

fn welcome(id: u32) -> ServerMsg {
    ServerMsg::Welcome(WelcomeMsg {
        protocol_version: PROTOCOL_VERSION,
        server_version: "test".to_string(),
        connection_id: ConnectionId(id),
        config: GameConfig::default(),
    })
}

/// Run both sessions through welcome and match formation; return their scenes.
fn start_pair() -> (Session, MatchScene<RapierWorld>, Session, MatchScene<RapierWorld>) {
    let mut p = Session::new(profile("P"));
    let mut q = Session::new(profile("Q"));

    let mut submitted = Vec::new();
    for (session, id) in [(&mut p, 1), (&mut q, 2)] {
        match session.handle(&welcome(id)) {
            SessionAction::Send(ClientMsg::SubmitProfile { profile }) => submitted.push(profile),
            other => panic!("Expected submission, got {:?}", other),
        }
    }

    let formed = ServerMsg::MatchFormed(MatchFormedMsg {
        players: vec![
            MatchEntryWire {
                slot: Slot::One,
                connection_id: ConnectionId(1),
                profile: submitted[0].clone(),
            },
            MatchEntryWire {
                slot: Slot::Two,
                connection_id: ConnectionId(2),
                profile: submitted[1].clone(),
            },
        ],
    });

    let mut scenes = Vec::new();
    for session in [&mut p, &mut q] {
        let SessionAction::StartMatch(info) = session.handle(&formed) else {
            panic!("Expected match start");
        };
        scenes.push(MatchScene::new(
            RapierWorld::new(info.config),
            &info.config,
            info.slot,
            info.seed,
            ContactPolicy::OwnBodyOnly,
        ));
    }
    let q_scene = scenes.pop().unwrap();
    let p_scene = scenes.pop().unwrap();
    (p, p_scene, q, q_scene)
}

fn relay(
    outgoing: Vec<ClientMsg>,
    mut sessions: [&mut Session; 2],
    mut scenes: [&mut MatchScene<RapierWorld>; 2],
) {
    for msg in outgoing {
        let (slot, intent) = msg.as_intent().expect("only intents are relayed here");
        let mirrored = ServerMsg::relayed(slot, intent);
        for (session, scene) in sessions.iter_mut().zip(scenes.iter_mut()) {
            if let SessionAction::Relay(slot, intent) = session.handle(&mirrored) {
                scene.apply_intent(slot, intent);
            }
        }
    }
}

fn snapshot(scene: &MatchScene<RapierWorld>) -> [Option<Vec2>; 3] {
    let world = scene.world();
    [
        world.position(scene.player_body(Slot::One)),
        world.position(scene.player_body(Slot::Two)),
        world.position(scene.ball()),
    ]
}

#[test]
fn both_clients_agree_on_slots() {
    let (p, p_scene, q, q_scene) = start_pair();
    assert_eq!(p_scene.local_slot(), Slot::One);
    assert_eq!(q_scene.local_slot(), Slot::Two);
    assert!(matches!(p.state(), SessionState::Matched(i) if i.opponent.name == "Q"));
    assert!(matches!(q.state(), SessionState::Matched(i) if i.opponent.name == "P"));
}

#[test]
fn identical_streams_keep_scenes_in_lockstep() {
    let (mut p, mut p_scene, mut q, mut q_scene) = start_pair();
    assert_eq!(snapshot(&p_scene), snapshot(&q_scene));

    for tick in 0..240u32 {
        let p_input = InputState {
            right: tick % 60 < 30,
            up: tick % 45 == 0,
            kick: tick % 50 == 10,
            ..Default::default()
        };
        let q_input = InputState {
            left: tick % 40 < 25,
            down: tick % 45 == 20,
            ..Default::default()
        };

        let mut outgoing = p_scene.outgoing_intents(&p_input);
        outgoing.extend(q_scene.outgoing_intents(&q_input));
        relay(outgoing, [&mut p, &mut q], [&mut p_scene, &mut q_scene]);

        let p_report = p_scene.step(TICK);
        let q_report = q_scene.step(TICK);
        assert_eq!(p_report, q_report, "tick {tick}");
        assert_eq!(snapshot(&p_scene), snapshot(&q_scene), "tick {tick}");
    }

    assert_eq!(p_scene.goals().scores(), q_scene.goals().scores());
}

#[test]
fn opponent_leaving_ends_only_the_match_it_belongs_to() {
    let (mut p, _p_scene, mut q, _q_scene) = start_pair();

    let stranger = ServerMsg::PeerDisconnected(PeerDisconnectedMsg {
        connection_id: ConnectionId(3),
    });
    assert_eq!(p.handle(&stranger), SessionAction::Ignore);

    let p_left = ServerMsg::PeerDisconnected(PeerDisconnectedMsg {
        connection_id: ConnectionId(1),
    });
    assert_eq!(q.handle(&p_left), SessionAction::RequestDisconnect);
    assert!(q.is_ended());
    assert!(!p.is_ended());
}
