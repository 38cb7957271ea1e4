use lib::chess::{Color, Game};
use lib::server::{Config, Server};
use lib::session::{Handler, Message};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

async fn recv<R: tokio::io::AsyncBufRead + Unpin>(lines: &mut tokio::io::Lines<R>) -> Message {
    let line = lines.next_line().await.unwrap().unwrap();
    serde_json::from_str(&line).unwrap()
}

#[tokio::test]
async fn clients_exchange_frames_over_tcp() {
    let config: Config = r#"(
        bind: "127.0.0.1:0",
        tokens: {"a": "alice", "b": "bob"},
        games: [(id: 1, name: "casual", white: Some("alice"), black: Some("bob"))],
    )"#
    .parse()
    .unwrap();

    let handler = Handler::new(config.store(), config.identity());
    let server = Server::bind(config.bind, handler).await.unwrap();
    let address = server.local_addr().unwrap();
    tokio::spawn(server.run());

    let (reader, mut alice) = TcpStream::connect(address).await.unwrap().into_split();
    let mut from_alice = BufReader::new(reader).lines();

    let (reader, mut bob) = TcpStream::connect(address).await.unwrap().into_split();
    let mut from_bob = BufReader::new(reader).lines();

    let connect = json!({"commandType": "CONNECT", "authToken": "a", "gameID": 1, "color": "WHITE"});
    alice.write_all(format!("{connect}\n").as_bytes()).await.unwrap();

    match recv(&mut from_alice).await {
        Message::LoadGame { game } => {
            assert_eq!(game.game(), &Game::default());
            assert_eq!(game.seat(Color::White), Some("alice"));
        }
        msg => panic!("unexpected {msg:?}"),
    }

    let connect = json!({"commandType": "CONNECT", "authToken": "b", "gameID": 1, "color": "BLACK"});
    bob.write_all(format!("{connect}\n").as_bytes()).await.unwrap();

    assert!(matches!(recv(&mut from_bob).await, Message::LoadGame { .. }));
    assert_eq!(
        recv(&mut from_alice).await,
        Message::notification("bob is playing BLACK")
    );

    let action = json!({
        "commandType": "MAKE_MOVE",
        "authToken": "a",
        "gameID": 1,
        "move": {"start": {"row": 2, "col": 5}, "end": {"row": 4, "col": 5}},
    });

    alice.write_all(format!("{action}\n").as_bytes()).await.unwrap();

    match recv(&mut from_alice).await {
        Message::LoadGame { game } => assert_eq!(game.game().turn(), Color::Black),
        msg => panic!("unexpected {msg:?}"),
    }

    assert_eq!(
        recv(&mut from_bob).await,
        Message::notification("alice made a move from e2 to e4")
    );

    assert!(matches!(recv(&mut from_bob).await, Message::LoadGame { .. }));

    bob.write_all(b"not json\n").await.unwrap();
    assert!(matches!(recv(&mut from_bob).await, Message::Error { .. }));
}
