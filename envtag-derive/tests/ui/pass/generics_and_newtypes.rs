// Generic structs, newtypes, unit structs and nested options.

use std::collections::BTreeMap;

use envtag::Unmarshal;

#[derive(Debug, Default, Unmarshal)]
struct Pair<A, B> {
    left: A,
    right: B,
}

#[derive(Debug, Default, PartialEq, Unmarshal)]
struct Retries(Option<u8>);

// Newtypes build their value from the wrapped type, so they need no `Default`.
#[derive(Debug, PartialEq, Unmarshal)]
struct Listen(std::net::SocketAddr);

#[derive(Debug, Default, Unmarshal)]
struct Marker;

#[derive(Debug, Default, Unmarshal)]
struct Config {
    #[env(name = "PAIR_")]
    pair: Pair<String, [u16; 2]>,
    retries: Retries,
    #[env(name = "MARKER_")]
    marker: Marker,
    nested: Option<Box<Pair<u8, u8>>>,
    listen: Option<Listen>,
    peers: Vec<Listen>,
}

fn main() {
    let env: BTreeMap<String, String> = [
        ("PAIR_LEFT", "l"),
        ("PAIR_RIGHT", "1,2"),
        ("LISTEN", "127.0.0.1:80"),
        ("PEERS", "10.0.0.1:1,10.0.0.2:2"),
    ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let config: Config = envtag::load_from(&env).unwrap();
    assert_eq!(config.pair.left, "l");
    assert_eq!(config.pair.right, [1, 2]);
    assert_eq!(config.retries, Retries(None));
    assert!(config.nested.is_none());
    assert_eq!(config.listen, Some(Listen(([127, 0, 0, 1], 80).into())));
    assert_eq!(config.peers.len(), 2);
}
