use std::time::Duration;

use tracing_subscriber::EnvFilter;

use volley_client::bot::{Bot, BotView};
use volley_client::config::ClientConfig;
use volley_client::connection::{NetEvent, ServerConnection};
use volley_client::rapier_world::RapierWorld;
use volley_client::physics::{PhysicsWorld, Vec2};
use volley_client::scene::MatchScene;
use volley_client::session::{Session, SessionAction};
use volley_shared::slot::Slot;

struct Running {
    scene: MatchScene<RapierWorld>,
    bot: Bot,
}

fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid client configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid client configuration: {}", e);
        std::process::exit(1);
    }

    let mut conn = match ServerConnection::connect(config.ws_url.clone()) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to start connection: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Connecting to {} as {}", config.ws_url, config.player_name);
    let mut session = Session::new(config.profile());
    let mut running: Option<Running> = None;

    while !session.is_ended() {
        for event in conn.poll_events() {
            match event {
                NetEvent::Connected => tracing::info!("Socket open"),
                NetEvent::Message(msg) => match session.handle(&msg) {
                    SessionAction::Send(out) => conn.send(out),
                    SessionAction::StartMatch(info) => {
                        let world = RapierWorld::new(info.config);
                        running = Some(Running {
                            scene: MatchScene::new(
                                world,
                                &info.config,
                                info.slot,
                                info.seed,
                                config.contact_policy,
                            ),
                            bot: Bot::new(info.slot, config.bot_seed),
                        });
                    }
                    SessionAction::Relay(slot, intent) => {
                        if let Some(r) = running.as_mut() {
                            r.scene.apply_intent(slot, intent);
                        }
                    }
                    SessionAction::RequestDisconnect => conn.send_disconnect_request(),
                    SessionAction::Rejected(reason) => {
                        tracing::warn!("Could not join a match: {}", reason);
                    }
                    SessionAction::Ignore => {}
                },
                NetEvent::ProtocolMismatch { server, client } => {
                    tracing::error!("Protocol mismatch: server {} client {}", server, client);
                    session.on_closed();
                }
                NetEvent::Failed(reason) => {
                    tracing::error!("Connection failed: {}", reason);
                    session.on_closed();
                }
                NetEvent::Disconnected => {
                    tracing::info!("Socket closed");
                    session.on_closed();
                }
            }
        }

        if let Some(r) = running.as_mut() {
            tick_match(r, &conn, config.tick);
        }
        std::thread::sleep(config.tick);
    }

    if let Some(r) = running.take() {
        let scores = *r.scene.goals().scores();
        r.scene.teardown();
        tracing::info!(
            "Match over: {} - {}",
            scores.get(Slot::One),
            scores.get(Slot::Two)
        );
    }
}

fn tick_match(r: &mut Running, conn: &ServerConnection, tick: Duration) {
    let slot = r.scene.local_slot();
    let world = r.scene.world();
    let view = BotView {
        me: world.position(r.scene.player_body(slot)).unwrap_or(Vec2::ZERO),
        ball: world.position(r.scene.ball()).unwrap_or(Vec2::ZERO),
        ball_velocity: world.velocity(r.scene.ball()).unwrap_or(Vec2::ZERO),
    };
    let input = r.bot.update(tick.as_secs_f32(), &view);
    for msg in r.scene.outgoing_intents(&input) {
        conn.send(msg);
    }

    let report = r.scene.step(tick);
    if let Some(scorer) = report.scored {
        tracing::debug!("Slot {} scored", scorer);
    }
}
